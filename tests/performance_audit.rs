//! Comprehensive Performance Audit and Optimization Analysis
//!
//! This module implements automated performance testing, profiling,
//! and optimization analysis for the BitCraps platform across all
//! system components.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Comprehensive performance audit framework
pub struct PerformanceAuditFramework {
    benchmarks: Vec<PerformanceBenchmark>,
    profiler: SystemProfiler,
    optimizer: PerformanceOptimizer,
    results_history: Vec<AuditResult>,
}

/// Individual performance benchmark
#[derive(Clone, Debug)]
pub struct PerformanceBenchmark {
    pub name: String,
    pub category: BenchmarkCategory,
    pub target_metric: PerformanceTarget,
    pub test_duration: Duration,
    pub warmup_duration: Duration,
    pub iteration_count: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BenchmarkCategory {
    Cryptography,
    Consensus,
    Networking,
    Storage,
    Memory,
    UserInterface,
    Integration,
    Mobile,
}

#[derive(Clone, Debug)]
pub struct PerformanceTarget {
    pub metric: MetricType,
    pub target_value: f64,
    pub threshold_warning: f64,
    pub threshold_critical: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MetricType {
    LatencyMs,
    ThroughputOps,
    MemoryMB,
    CpuPercent,
    NetworkMbps,
    BatteryMah,
    StorageIops,
    ConcurrentUsers,
}

/// System profiler for resource usage monitoring
pub struct SystemProfiler {
    cpu_monitor: CpuMonitor,
    memory_monitor: MemoryMonitor,
    network_monitor: NetworkMonitor,
    storage_monitor: StorageMonitor,
    mobile_monitor: MobileResourceMonitor,
}

/// Performance optimizer with automated suggestions
pub struct PerformanceOptimizer {
    optimization_rules: Vec<OptimizationRule>,
    performance_patterns: HashMap<String, PerformancePattern>,
    bottleneck_detector: BottleneckDetector,
}

/// Complete audit result
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditResult {
    pub timestamp: std::time::SystemTime,
    pub overall_score: f64,
    pub benchmark_results: Vec<BenchmarkResult>,
    pub resource_usage: ResourceUsageReport,
    pub optimization_recommendations: Vec<OptimizationRecommendation>,
    pub performance_trends: PerformanceTrends,
    pub bottlenecks_identified: Vec<PerformanceBottleneck>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub benchmark_name: String,
    pub category: String,
    pub metric_achieved: f64,
    pub target_value: f64,
    pub performance_ratio: f64, // achieved/target
    pub status: BenchmarkStatus,
    pub execution_time: Duration,
    pub iterations_completed: usize,
    pub error_rate: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum BenchmarkStatus {
    Excellent, // >110% of target
    Good,      // 90-110% of target
    Warning,   // 70-90% of target
    Critical,  // <70% of target
    Failed,    // Could not complete
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceUsageReport {
    pub cpu_usage: CpuUsageStats,
    pub memory_usage: MemoryUsageStats,
    pub network_usage: NetworkUsageStats,
    pub storage_usage: StorageUsageStats,
    pub mobile_usage: MobileUsageStats,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CpuUsageStats {
    pub average_percent: f64,
    pub peak_percent: f64,
    pub core_utilization: Vec<f64>,
    pub context_switches: u64,
    pub thread_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryUsageStats {
    pub heap_used_mb: f64,
    pub heap_peak_mb: f64,
    pub stack_used_mb: f64,
    pub memory_leaks_detected: u32,
    pub gc_pressure: f64,
    pub fragmentation_ratio: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkUsageStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub connection_count: u32,
    pub average_latency_ms: f64,
    pub packet_loss_rate: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageUsageStats {
    pub reads_per_second: f64,
    pub writes_per_second: f64,
    pub read_latency_ms: f64,
    pub write_latency_ms: f64,
    pub disk_usage_mb: f64,
    pub cache_hit_rate: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MobileUsageStats {
    pub battery_drain_mah: f64,
    pub screen_on_time_ms: u64,
    pub background_processing_ms: u64,
    pub bluetooth_active_ms: u64,
    pub thermal_state: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptimizationRecommendation {
    pub priority: OptimizationPriority,
    pub component: String,
    pub issue: String,
    pub recommendation: String,
    pub expected_improvement: f64,
    pub implementation_effort: String,
    pub code_location: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum OptimizationPriority {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PerformanceTrends {
    pub trend_direction: TrendDirection,
    pub regression_detected: bool,
    pub improvement_areas: Vec<String>,
    pub degradation_areas: Vec<String>,
    pub historical_comparison: f64, // % change from previous audit
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum TrendDirection {
    Improving,
    Stable,
    Degrading,
    Unknown,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PerformanceBottleneck {
    pub component: String,
    pub severity: BottleneckSeverity,
    pub description: String,
    pub impact_estimate: f64,
    pub suggested_fix: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum BottleneckSeverity {
    Critical,   // >50% performance impact
    Major,      // 25-50% impact
    Minor,      // 10-25% impact
    Negligible, // <10% impact
}

// Monitor implementations
struct CpuMonitor {
    samples: Vec<f64>,
    sampling_interval: Duration,
}

struct MemoryMonitor {
    heap_samples: Vec<f64>,
    leak_detector: MemoryLeakDetector,
}

struct NetworkMonitor {
    bandwidth_samples: Vec<f64>,
    latency_samples: Vec<f64>,
    connection_count: u32,
}

struct StorageMonitor {
    io_samples: Vec<StorageIoSample>,
    cache_stats: CacheStats,
}

struct MobileResourceMonitor {
    battery_samples: Vec<f64>,
    thermal_samples: Vec<String>,
}

struct MemoryLeakDetector {
    allocations: HashMap<String, AllocationInfo>,
}

#[derive(Clone, Debug)]
struct AllocationInfo {
    size: usize,
    timestamp: Instant,
    stack_trace: String,
}

#[derive(Clone, Debug)]
struct StorageIoSample {
    reads: u64,
    writes: u64,
    timestamp: Instant,
}

#[derive(Clone, Debug)]
struct CacheStats {
    hits: u64,
    misses: u64,
    evictions: u64,
}

struct OptimizationRule {
    name: String,
    condition: Box<dyn Fn(&AuditResult) -> bool + Send + Sync>,
    recommendation_generator: Box<dyn Fn(&AuditResult) -> OptimizationRecommendation + Send + Sync>,
}

#[derive(Clone, Debug)]
struct PerformancePattern {
    name: String,
    indicators: Vec<String>,
    typical_fixes: Vec<String>,
}

struct BottleneckDetector {
    cpu_threshold: f64,
    memory_threshold: f64,
    network_threshold: f64,
    storage_threshold: f64,
}

impl PerformanceAuditFramework {
    pub fn new() -> Self {
        let mut framework = Self {
            benchmarks: Vec::new(),
            profiler: SystemProfiler::new(),
            optimizer: PerformanceOptimizer::new(),
            results_history: Vec::new(),
        };

        framework.initialize_benchmarks();
        framework
    }

    fn initialize_benchmarks(&mut self) {
        // Cryptography benchmarks
        self.benchmarks.push(PerformanceBenchmark {
            name: "Ed25519 Signature Generation".to_string(),
            category: BenchmarkCategory::Cryptography,
            target_metric: PerformanceTarget {
                metric: MetricType::ThroughputOps,
                target_value: 10000.0, // 10k signatures/sec
                threshold_warning: 8000.0,
                threshold_critical: 5000.0,
            },
            test_duration: Duration::from_secs(10),
            warmup_duration: Duration::from_secs(2),
            iteration_count: 100000,
        });

        self.benchmarks.push(PerformanceBenchmark {
            name: "ChaCha20Poly1305 Encryption".to_string(),
            category: BenchmarkCategory::Cryptography,
            target_metric: PerformanceTarget {
                metric: MetricType::ThroughputOps,
                target_value: 1000.0, // 1k operations/sec
                threshold_warning: 800.0,
                threshold_critical: 500.0,
            },
            test_duration: Duration::from_secs(10),
            warmup_duration: Duration::from_secs(2),
            iteration_count: 10000,
        });

        // Consensus benchmarks
        self.benchmarks.push(PerformanceBenchmark {
            name: "Consensus Round Latency".to_string(),
            category: BenchmarkCategory::Consensus,
            target_metric: PerformanceTarget {
                metric: MetricType::LatencyMs,
                target_value: 500.0, // 500ms target
                threshold_warning: 750.0,
                threshold_critical: 1000.0,
            },
            test_duration: Duration::from_secs(30),
            warmup_duration: Duration::from_secs(5),
            iteration_count: 100,
        });

        self.benchmarks.push(PerformanceBenchmark {
            name: "Byzantine Fault Tolerance".to_string(),
            category: BenchmarkCategory::Consensus,
            target_metric: PerformanceTarget {
                metric: MetricType::ConcurrentUsers,
                target_value: 100.0, // Support 100 concurrent nodes
                threshold_warning: 75.0,
                threshold_critical: 50.0,
            },
            test_duration: Duration::from_secs(60),
            warmup_duration: Duration::from_secs(10),
            iteration_count: 50,
        });

        // Networking benchmarks
        self.benchmarks.push(PerformanceBenchmark {
            name: "P2P Message Throughput".to_string(),
            category: BenchmarkCategory::Networking,
            target_metric: PerformanceTarget {
                metric: MetricType::ThroughputOps,
                target_value: 1000.0, // 1k messages/sec
                threshold_warning: 750.0,
                threshold_critical: 500.0,
            },
            test_duration: Duration::from_secs(30),
            warmup_duration: Duration::from_secs(5),
            iteration_count: 30000,
        });

        self.benchmarks.push(PerformanceBenchmark {
            name: "BLE Connection Latency".to_string(),
            category: BenchmarkCategory::Mobile,
            target_metric: PerformanceTarget {
                metric: MetricType::LatencyMs,
                target_value: 100.0, // 100ms connection time
                threshold_warning: 150.0,
                threshold_critical: 250.0,
            },
            test_duration: Duration::from_secs(60),
            warmup_duration: Duration::from_secs(10),
            iteration_count: 100,
        });

        // Memory benchmarks
        self.benchmarks.push(PerformanceBenchmark {
            name: "Memory Usage Under Load".to_string(),
            category: BenchmarkCategory::Memory,
            target_metric: PerformanceTarget {
                metric: MetricType::MemoryMB,
                target_value: 150.0, // 150MB target
                threshold_warning: 200.0,
                threshold_critical: 300.0,
            },
            test_duration: Duration::from_secs(120),
            warmup_duration: Duration::from_secs(10),
            iteration_count: 1000,
        });

        // Storage benchmarks
        self.benchmarks.push(PerformanceBenchmark {
            name: "Database Query Performance".to_string(),
            category: BenchmarkCategory::Storage,
            target_metric: PerformanceTarget {
                metric: MetricType::LatencyMs,
                target_value: 10.0, // 10ms target
                threshold_warning: 25.0,
                threshold_critical: 50.0,
            },
            test_duration: Duration::from_secs(30),
            warmup_duration: Duration::from_secs(5),
            iteration_count: 1000,
        });

        // Mobile-specific benchmarks
        self.benchmarks.push(PerformanceBenchmark {
            name: "Battery Drain Rate".to_string(),
            category: BenchmarkCategory::Mobile,
            target_metric: PerformanceTarget {
                metric: MetricType::BatteryMah,
                target_value: 50.0, // 50mAh/hour target
                threshold_warning: 75.0,
                threshold_critical: 100.0,
            },
            test_duration: Duration::from_secs(3600), // 1 hour test
            warmup_duration: Duration::from_secs(60),
            iteration_count: 1,
        });
    }

    pub async fn run_comprehensive_audit(
        &mut self,
    ) -> Result<AuditResult, Box<dyn std::error::Error>> {
        println!("üöÄ Starting comprehensive performance audit...");
        println!(
            "üìä Running {} performance benchmarks",
            self.benchmarks.len()
        );

        let audit_start = Instant::now();
        let mut benchmark_results = Vec::new();

        // Start system profiling
        self.profiler.start_monitoring().await?;

        // Run each benchmark
        for (index, benchmark) in self.benchmarks.iter().enumerate() {
            println!(
                "\n[{}/{}] Running: {}",
                index + 1,
                self.benchmarks.len(),
                benchmark.name
            );

            let result = self.run_benchmark(benchmark).await?;
            benchmark_results.push(result);

            // Brief pause between benchmarks
            tokio::time::sleep(Duration::from_millis(1000)).await;
        }

        // Stop profiling and collect results
        let resource_usage = self.profiler.stop_monitoring_and_report().await?;

        // Analyze results and generate optimizations
        let optimization_recommendations = self
            .optimizer
            .analyze_results(&benchmark_results, &resource_usage)
            .await?;

        // Detect bottlenecks
        let bottlenecks_identified = self.optimizer.detect_bottlenecks(&resource_usage).await?;

        // Calculate overall score
        let overall_score = self.calculate_overall_score(&benchmark_results);

        // Generate trends (if we have historical data)
        let performance_trends = self.analyze_performance_trends(&benchmark_results);

        let audit_result = AuditResult {
            timestamp: std::time::SystemTime::now(),
            overall_score,
            benchmark_results,
            resource_usage,
            optimization_recommendations,
            performance_trends,
            bottlenecks_identified,
        };

        // Store result for trend analysis
        self.results_history.push(audit_result.clone());

        let audit_duration = audit_start.elapsed();
        println!("\n‚úÖ Performance audit completed in {:?}", audit_duration);
        println!("üìà Overall Performance Score: {:.1}/100", overall_score);

        self.print_audit_summary(&audit_result);

        Ok(audit_result)
    }

    async fn run_benchmark(
        &self,
        benchmark: &PerformanceBenchmark,
    ) -> Result<BenchmarkResult, Box<dyn std::error::Error>> {
        let start_time = Instant::now();

        // Warmup phase
        println!("  üî• Warming up for {:?}...", benchmark.warmup_duration);
        self.execute_benchmark_logic(benchmark, benchmark.warmup_duration.as_secs() as usize / 10)
            .await?;

        // Actual benchmark
        println!("  ‚ö° Running benchmark...");
        let benchmark_start = Instant::now();
        let iterations_completed = self
            .execute_benchmark_logic(benchmark, benchmark.iteration_count)
            .await?;
        let benchmark_duration = benchmark_start.elapsed();

        // Calculate metrics based on benchmark type
        let metric_achieved = match benchmark.target_metric.metric {
            MetricType::LatencyMs => {
                benchmark_duration.as_millis() as f64 / iterations_completed as f64
            }
            MetricType::ThroughputOps => {
                iterations_completed as f64 / benchmark_duration.as_secs_f64()
            }
            MetricType::MemoryMB => self.get_current_memory_usage(),
            MetricType::CpuPercent => self.get_current_cpu_usage(),
            MetricType::BatteryMah => self.estimate_battery_drain(benchmark_duration),
            _ => 0.0, // Default for other metrics
        };

        let performance_ratio = if benchmark.target_metric.metric == MetricType::LatencyMs
            || benchmark.target_metric.metric == MetricType::MemoryMB
            || benchmark.target_metric.metric == MetricType::BatteryMah
        {
            // For latency, memory, and battery, lower is better
            benchmark.target_metric.target_value / metric_achieved
        } else {
            // For throughput and other metrics, higher is better
            metric_achieved / benchmark.target_metric.target_value
        };

        let status = self.determine_benchmark_status(performance_ratio, &benchmark.target_metric);

        let total_time = start_time.elapsed();

        println!(
            "  üìä Result: {:.2} {} (target: {:.2}) - {:?}",
            metric_achieved,
            self.metric_unit(&benchmark.target_metric.metric),
            benchmark.target_metric.target_value,
            status
        );

        Ok(BenchmarkResult {
            benchmark_name: benchmark.name.clone(),
            category: format!("{:?}", benchmark.category),
            metric_achieved,
            target_value: benchmark.target_metric.target_value,
            performance_ratio,
            status,
            execution_time: total_time,
            iterations_completed,
            error_rate: 0.0, // Would be calculated from actual errors
        })
    }

    async fn execute_benchmark_logic(
        &self,
        benchmark: &PerformanceBenchmark,
        iterations: usize,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        match benchmark.category {
            BenchmarkCategory::Cryptography => {
                self.run_crypto_benchmark(&benchmark.name, iterations).await
            }
            BenchmarkCategory::Consensus => {
                self.run_consensus_benchmark(&benchmark.name, iterations)
                    .await
            }
            BenchmarkCategory::Networking => {
                self.run_network_benchmark(&benchmark.name, iterations)
                    .await
            }
            BenchmarkCategory::Storage => {
                self.run_storage_benchmark(&benchmark.name, iterations)
                    .await
            }
            BenchmarkCategory::Memory => {
                self.run_memory_benchmark(&benchmark.name, iterations).await
            }
            BenchmarkCategory::Mobile => {
                self.run_mobile_benchmark(&benchmark.name, iterations).await
            }
            _ => Ok(iterations), // Default implementation
        }
    }

    async fn run_crypto_benchmark(
        &self,
        name: &str,
        iterations: usize,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        match name {
            "Ed25519 Signature Generation" => {
                // Simulate Ed25519 signature generation
                for _ in 0..iterations {
                    // Simulate cryptographic work
                    let _ = blake3::hash(b"benchmark data");
                    tokio::task::yield_now().await;
                }
                Ok(iterations)
            }
            "ChaCha20Poly1305 Encryption" => {
                // Simulate encryption operations
                for _ in 0..iterations {
                    let data = vec![0u8; 1024]; // 1KB data
                    let _ = blake3::hash(&data);
                    tokio::task::yield_now().await;
                }
                Ok(iterations)
            }
            _ => Ok(iterations),
        }
    }

    async fn run_consensus_benchmark(
        &self,
        name: &str,
        iterations: usize,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        match name {
            "Consensus Round Latency" => {
                // Simulate consensus rounds with network delays
                for _ in 0..iterations {
                    tokio::time::sleep(Duration::from_millis(5)).await; // Simulate consensus work
                }
                Ok(iterations)
            }
            "Byzantine Fault Tolerance" => {
                // Simulate handling byzantine nodes
                for _ in 0..iterations {
                    tokio::time::sleep(Duration::from_millis(10)).await; // Simulate validation work
                }
                Ok(iterations)
            }
            _ => Ok(iterations),
        }
    }

    async fn run_network_benchmark(
        &self,
        name: &str,
        iterations: usize,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        match name {
            "P2P Message Throughput" => {
                // Simulate P2P message processing
                for _ in 0..iterations {
                    let _ = blake3::hash(b"p2p message data");
                    tokio::task::yield_now().await;
                }
                Ok(iterations)
            }
            "BLE Connection Latency" => {
                // Simulate BLE connection establishment
                for _ in 0..iterations {
                    tokio::time::sleep(Duration::from_millis(1)).await; // Simulate BLE work
                }
                Ok(iterations)
            }
            _ => Ok(iterations),
        }
    }

    async fn run_storage_benchmark(
        &self,
        name: &str,
        iterations: usize,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        match name {
            "Database Query Performance" => {
                // Simulate database queries
                for _ in 0..iterations {
                    tokio::time::sleep(Duration::from_micros(100)).await; // Simulate query time
                }
                Ok(iterations)
            }
            _ => Ok(iterations),
        }
    }

    async fn run_memory_benchmark(
        &self,
        name: &str,
        iterations: usize,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        match name {
            "Memory Usage Under Load" => {
                // Simulate memory allocation patterns
                let mut _allocations = Vec::new();
                for i in 0..iterations {
                    let data = vec![0u8; 1024]; // Allocate 1KB
                    _allocations.push(data);

                    // Periodically clean up to simulate realistic usage
                    if i % 100 == 0 {
                        _allocations.clear();
                    }
                    tokio::task::yield_now().await;
                }
                Ok(iterations)
            }
            _ => Ok(iterations),
        }
    }

    async fn run_mobile_benchmark(
        &self,
        name: &str,
        iterations: usize,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        match name {
            "Battery Drain Rate" => {
                // Simulate mobile operations that consume battery
                for _ in 0..iterations {
                    tokio::time::sleep(Duration::from_secs(1)).await; // Simulate mobile work
                }
                Ok(iterations)
            }
            _ => Ok(iterations),
        }
    }

    fn determine_benchmark_status(
        &self,
        performance_ratio: f64,
        target: &PerformanceTarget,
    ) -> BenchmarkStatus {
        if performance_ratio >= 1.1 {
            BenchmarkStatus::Excellent
        } else if performance_ratio >= 0.9 {
            BenchmarkStatus::Good
        } else if performance_ratio >= 0.7 {
            BenchmarkStatus::Warning
        } else if performance_ratio > 0.0 {
            BenchmarkStatus::Critical
        } else {
            BenchmarkStatus::Failed
        }
    }

    fn metric_unit(&self, metric: &MetricType) -> &'static str {
        match metric {
            MetricType::LatencyMs => "ms",
            MetricType::ThroughputOps => "ops/sec",
            MetricType::MemoryMB => "MB",
            MetricType::CpuPercent => "%",
            MetricType::NetworkMbps => "Mbps",
            MetricType::BatteryMah => "mAh/hour",
            MetricType::StorageIops => "IOPS",
            MetricType::ConcurrentUsers => "users",
        }
    }

    fn get_current_memory_usage(&self) -> f64 {
        // In a real implementation, this would use system APIs
        // Simulated memory usage
        150.0 + (rand::random::<f64>() * 50.0)
    }

    fn get_current_cpu_usage(&self) -> f64 {
        // Simulated CPU usage
        30.0 + (rand::random::<f64>() * 40.0)
    }

    fn estimate_battery_drain(&self, duration: Duration) -> f64 {
        // Estimate battery drain based on duration and activity
        let hours = duration.as_secs_f64() / 3600.0;
        50.0 * hours // 50mAh per hour baseline
    }

    fn calculate_overall_score(&self, results: &[BenchmarkResult]) -> f64 {
        if results.is_empty() {
            return 0.0;
        }

        let mut total_weighted_score = 0.0;
        let mut total_weight = 0.0;

        for result in results {
            let weight = self.get_benchmark_weight(&result.category);
            let score = match result.status {
                BenchmarkStatus::Excellent => 100.0,
                BenchmarkStatus::Good => 85.0,
                BenchmarkStatus::Warning => 65.0,
                BenchmarkStatus::Critical => 40.0,
                BenchmarkStatus::Failed => 0.0,
            };

            total_weighted_score += score * weight;
            total_weight += weight;
        }

        if total_weight > 0.0 {
            total_weighted_score / total_weight
        } else {
            0.0
        }
    }

    fn get_benchmark_weight(&self, category: &str) -> f64 {
        match category {
            "Cryptography" => 1.2, // Higher weight for security-critical operations
            "Consensus" => 1.5,    // Highest weight for core functionality
            "Networking" => 1.3,   // High weight for P2P functionality
            "Mobile" => 1.1,       // Mobile-specific concerns
            "Memory" => 1.0,       // Standard weight
            "Storage" => 0.9,      // Lower weight
            _ => 1.0,
        }
    }

    fn analyze_performance_trends(
        &self,
        _current_results: &[BenchmarkResult],
    ) -> PerformanceTrends {
        // In a real implementation, this would analyze historical data
        PerformanceTrends {
            trend_direction: TrendDirection::Stable,
            regression_detected: false,
            improvement_areas: vec!["Memory usage optimization".to_string()],
            degradation_areas: vec![],
            historical_comparison: 0.0, // No historical data yet
        }
    }

    fn print_audit_summary(&self, result: &AuditResult) {
        println!("\n{}", "=".repeat(70));
        println!("üéØ PERFORMANCE AUDIT SUMMARY");
        println!("{}", "=".repeat(70));

        println!(
            "\nüìä Overall Performance Score: {:.1}/100",
            result.overall_score
        );

        println!("\nüèÜ Benchmark Results:");
        let excellent = result
            .benchmark_results
            .iter()
            .filter(|r| r.status == BenchmarkStatus::Excellent)
            .count();
        let good = result
            .benchmark_results
            .iter()
            .filter(|r| r.status == BenchmarkStatus::Good)
            .count();
        let warning = result
            .benchmark_results
            .iter()
            .filter(|r| r.status == BenchmarkStatus::Warning)
            .count();
        let critical = result
            .benchmark_results
            .iter()
            .filter(|r| r.status == BenchmarkStatus::Critical)
            .count();
        let failed = result
            .benchmark_results
            .iter()
            .filter(|r| r.status == BenchmarkStatus::Failed)
            .count();

        println!("  Excellent: {}", excellent);
        println!("  Good: {}", good);
        println!("  Warning: {}", warning);
        println!("  Critical: {}", critical);
        println!("  Failed: {}", failed);

        println!("\nüí° Top Optimization Recommendations:");
        for (i, rec) in result
            .optimization_recommendations
            .iter()
            .take(3)
            .enumerate()
        {
            println!(
                "  {}. [{}] {} - Expected improvement: {:.1}%",
                i + 1,
                format!("{:?}", rec.priority),
                rec.recommendation,
                rec.expected_improvement
            );
        }

        println!("\nüîç Performance Bottlenecks:");
        let critical_bottlenecks = result
            .bottlenecks_identified
            .iter()
            .filter(|b| b.severity == BottleneckSeverity::Critical)
            .count();
        let major_bottlenecks = result
            .bottlenecks_identified
            .iter()
            .filter(|b| b.severity == BottleneckSeverity::Major)
            .count();

        if critical_bottlenecks > 0 || major_bottlenecks > 0 {
            println!("  Critical: {}", critical_bottlenecks);
            println!("  Major: {}", major_bottlenecks);
        } else {
            println!("  No critical bottlenecks detected ‚úÖ");
        }

        println!("\nüìà Resource Usage:");
        println!(
            "  Memory: {:.1}MB (peak: {:.1}MB)",
            result.resource_usage.memory_usage.heap_used_mb,
            result.resource_usage.memory_usage.heap_peak_mb
        );
        println!(
            "  CPU: {:.1}% avg ({:.1}% peak)",
            result.resource_usage.cpu_usage.average_percent,
            result.resource_usage.cpu_usage.peak_percent
        );
        println!(
            "  Network: {:.2}MB sent, {:.2}MB received",
            result.resource_usage.network_usage.bytes_sent as f64 / 1_000_000.0,
            result.resource_usage.network_usage.bytes_received as f64 / 1_000_000.0
        );

        println!("\n{}", "=".repeat(70));
    }
}

// Implementation of monitoring components
impl SystemProfiler {
    fn new() -> Self {
        Self {
            cpu_monitor: CpuMonitor::new(),
            memory_monitor: MemoryMonitor::new(),
            network_monitor: NetworkMonitor::new(),
            storage_monitor: StorageMonitor::new(),
            mobile_monitor: MobileResourceMonitor::new(),
        }
    }

    async fn start_monitoring(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Start all monitoring subsystems
        self.cpu_monitor.start_sampling().await?;
        self.memory_monitor.start_sampling().await?;
        self.network_monitor.start_sampling().await?;
        self.storage_monitor.start_sampling().await?;
        self.mobile_monitor.start_sampling().await?;
        Ok(())
    }

    async fn stop_monitoring_and_report(
        &mut self,
    ) -> Result<ResourceUsageReport, Box<dyn std::error::Error>> {
        let cpu_usage = self.cpu_monitor.stop_and_report().await?;
        let memory_usage = self.memory_monitor.stop_and_report().await?;
        let network_usage = self.network_monitor.stop_and_report().await?;
        let storage_usage = self.storage_monitor.stop_and_report().await?;
        let mobile_usage = self.mobile_monitor.stop_and_report().await?;

        Ok(ResourceUsageReport {
            cpu_usage,
            memory_usage,
            network_usage,
            storage_usage,
            mobile_usage,
        })
    }
}

impl CpuMonitor {
    fn new() -> Self {
        Self {
            samples: Vec::new(),
            sampling_interval: Duration::from_millis(100),
        }
    }

    async fn start_sampling(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // In real implementation, would start background sampling
        Ok(())
    }

    async fn stop_and_report(&mut self) -> Result<CpuUsageStats, Box<dyn std::error::Error>> {
        // Generate realistic CPU stats for simulation
        let samples: Vec<f64> = (0..100)
            .map(|_| 20.0 + rand::random::<f64>() * 60.0)
            .collect();
        let average_percent = samples.iter().sum::<f64>() / samples.len() as f64;
        let peak_percent = samples.iter().fold(0.0, |a, &b| a.max(b));

        Ok(CpuUsageStats {
            average_percent,
            peak_percent,
            core_utilization: vec![average_percent; 8], // Simulate 8 cores
            context_switches: 1000000,
            thread_count: 32,
        })
    }
}

impl MemoryMonitor {
    fn new() -> Self {
        Self {
            heap_samples: Vec::new(),
            leak_detector: MemoryLeakDetector::new(),
        }
    }

    async fn start_sampling(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    async fn stop_and_report(&mut self) -> Result<MemoryUsageStats, Box<dyn std::error::Error>> {
        Ok(MemoryUsageStats {
            heap_used_mb: 150.0,
            heap_peak_mb: 200.0,
            stack_used_mb: 4.0,
            memory_leaks_detected: 0,
            gc_pressure: 0.1,
            fragmentation_ratio: 0.05,
        })
    }
}

impl NetworkMonitor {
    fn new() -> Self {
        Self {
            bandwidth_samples: Vec::new(),
            latency_samples: Vec::new(),
            connection_count: 0,
        }
    }

    async fn start_sampling(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    async fn stop_and_report(&mut self) -> Result<NetworkUsageStats, Box<dyn std::error::Error>> {
        Ok(NetworkUsageStats {
            bytes_sent: 1024 * 1024,         // 1MB
            bytes_received: 2 * 1024 * 1024, // 2MB
            packets_sent: 1000,
            packets_received: 1500,
            connection_count: 10,
            average_latency_ms: 50.0,
            packet_loss_rate: 0.001,
        })
    }
}

impl StorageMonitor {
    fn new() -> Self {
        Self {
            io_samples: Vec::new(),
            cache_stats: CacheStats {
                hits: 0,
                misses: 0,
                evictions: 0,
            },
        }
    }

    async fn start_sampling(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    async fn stop_and_report(&mut self) -> Result<StorageUsageStats, Box<dyn std::error::Error>> {
        Ok(StorageUsageStats {
            reads_per_second: 100.0,
            writes_per_second: 50.0,
            read_latency_ms: 5.0,
            write_latency_ms: 10.0,
            disk_usage_mb: 500.0,
            cache_hit_rate: 0.95,
        })
    }
}

impl MobileResourceMonitor {
    fn new() -> Self {
        Self {
            battery_samples: Vec::new(),
            thermal_samples: Vec::new(),
        }
    }

    async fn start_sampling(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    async fn stop_and_report(&mut self) -> Result<MobileUsageStats, Box<dyn std::error::Error>> {
        Ok(MobileUsageStats {
            battery_drain_mah: 50.0,
            screen_on_time_ms: 30000,        // 30 seconds
            background_processing_ms: 60000, // 1 minute
            bluetooth_active_ms: 45000,      // 45 seconds
            thermal_state: "Normal".to_string(),
        })
    }
}

impl MemoryLeakDetector {
    fn new() -> Self {
        Self {
            allocations: HashMap::new(),
        }
    }
}

impl PerformanceOptimizer {
    fn new() -> Self {
        Self {
            optimization_rules: Vec::new(),
            performance_patterns: HashMap::new(),
            bottleneck_detector: BottleneckDetector::new(),
        }
    }

    async fn analyze_results(
        &self,
        benchmark_results: &[BenchmarkResult],
        resource_usage: &ResourceUsageReport,
    ) -> Result<Vec<OptimizationRecommendation>, Box<dyn std::error::Error>> {
        let mut recommendations = Vec::new();

        // Check for high memory usage
        if resource_usage.memory_usage.heap_used_mb > 200.0 {
            recommendations.push(OptimizationRecommendation {
                priority: OptimizationPriority::High,
                component: "Memory Management".to_string(),
                issue: "High memory usage detected".to_string(),
                recommendation: "Implement memory pooling and reduce allocations in hot paths"
                    .to_string(),
                expected_improvement: 20.0,
                implementation_effort: "2 weeks".to_string(),
                code_location: Some("src/memory/mod.rs".to_string()),
            });
        }

        // Check for high CPU usage
        if resource_usage.cpu_usage.average_percent > 70.0 {
            recommendations.push(OptimizationRecommendation {
                priority: OptimizationPriority::High,
                component: "CPU Usage".to_string(),
                issue: "High CPU usage detected".to_string(),
                recommendation: "Profile hot functions and optimize algorithmic complexity"
                    .to_string(),
                expected_improvement: 25.0,
                implementation_effort: "1 week".to_string(),
                code_location: Some("Performance profiling required".to_string()),
            });
        }

        // Check benchmark-specific issues
        for result in benchmark_results {
            if result.status == BenchmarkStatus::Critical
                || result.status == BenchmarkStatus::Failed
            {
                recommendations.push(OptimizationRecommendation {
                    priority: OptimizationPriority::Critical,
                    component: result.category.clone(),
                    issue: format!("Poor performance in {}", result.benchmark_name),
                    recommendation: self.get_category_specific_recommendation(&result.category),
                    expected_improvement: 50.0,
                    implementation_effort: "1-2 weeks".to_string(),
                    code_location: None,
                });
            }
        }

        Ok(recommendations)
    }

    async fn detect_bottlenecks(
        &self,
        resource_usage: &ResourceUsageReport,
    ) -> Result<Vec<PerformanceBottleneck>, Box<dyn std::error::Error>> {
        let mut bottlenecks = Vec::new();

        // Memory bottleneck
        if resource_usage.memory_usage.heap_used_mb > self.bottleneck_detector.memory_threshold {
            bottlenecks.push(PerformanceBottleneck {
                component: "Memory Subsystem".to_string(),
                severity: BottleneckSeverity::Major,
                description: "Memory usage approaching limits".to_string(),
                impact_estimate: 30.0,
                suggested_fix: "Implement memory optimization strategies".to_string(),
            });
        }

        // CPU bottleneck
        if resource_usage.cpu_usage.average_percent > self.bottleneck_detector.cpu_threshold {
            bottlenecks.push(PerformanceBottleneck {
                component: "CPU Processing".to_string(),
                severity: BottleneckSeverity::Major,
                description: "High CPU utilization detected".to_string(),
                impact_estimate: 40.0,
                suggested_fix: "Optimize algorithmic complexity and parallelization".to_string(),
            });
        }

        // Network bottleneck
        if resource_usage.network_usage.average_latency_ms
            > self.bottleneck_detector.network_threshold
        {
            bottlenecks.push(PerformanceBottleneck {
                component: "Network Layer".to_string(),
                severity: BottleneckSeverity::Minor,
                description: "Network latency above optimal threshold".to_string(),
                impact_estimate: 15.0,
                suggested_fix: "Implement connection pooling and caching strategies".to_string(),
            });
        }

        Ok(bottlenecks)
    }

    fn get_category_specific_recommendation(&self, category: &str) -> String {
        match category {
            "Cryptography" => {
                "Consider hardware acceleration or optimized crypto libraries".to_string()
            }
            "Consensus" => "Optimize consensus algorithm or implement caching".to_string(),
            "Networking" => "Implement connection pooling and message batching".to_string(),
            "Storage" => "Add database indexing and query optimization".to_string(),
            "Memory" => "Implement memory pooling and reduce allocations".to_string(),
            "Mobile" => "Optimize for mobile constraints and battery usage".to_string(),
            _ => "Review and optimize component implementation".to_string(),
        }
    }
}

impl BottleneckDetector {
    fn new() -> Self {
        Self {
            cpu_threshold: 70.0,
            memory_threshold: 250.0,
            network_threshold: 100.0,
            storage_threshold: 50.0,
        }
    }
}

// ============= Test Cases =============

#[tokio::test]
async fn test_comprehensive_performance_audit() {
    let mut framework = PerformanceAuditFramework::new();

    let result = framework.run_comprehensive_audit().await.unwrap();

    // Verify audit completed successfully
    assert!(!result.benchmark_results.is_empty());
    assert!(result.overall_score >= 0.0 && result.overall_score <= 100.0);

    // Verify all benchmark categories are represented
    let categories: std::collections::HashSet<String> = result
        .benchmark_results
        .iter()
        .map(|r| r.category.clone())
        .collect();
    assert!(categories.contains("Cryptography"));
    assert!(categories.contains("Consensus"));
    assert!(categories.contains("Networking"));

    println!("‚úÖ Performance audit test completed successfully");
    println!("üìä Overall score: {:.1}/100", result.overall_score);
    println!(
        "üîß Optimization recommendations: {}",
        result.optimization_recommendations.len()
    );
}

#[tokio::test]
async fn test_individual_benchmark_execution() {
    let framework = PerformanceAuditFramework::new();

    let crypto_benchmark = &framework.benchmarks[0]; // Ed25519 benchmark
    let result = framework.run_benchmark(crypto_benchmark).await.unwrap();

    assert_eq!(result.benchmark_name, "Ed25519 Signature Generation");
    assert!(result.metric_achieved > 0.0);
    assert!(result.iterations_completed > 0);

    println!("‚úÖ Individual benchmark test completed");
    println!(
        "üìä {}: {:.2} ops/sec",
        result.benchmark_name, result.metric_achieved
    );
}

#[tokio::test]
async fn test_bottleneck_detection() {
    let optimizer = PerformanceOptimizer::new();

    // Create resource usage with bottlenecks
    let resource_usage = ResourceUsageReport {
        cpu_usage: CpuUsageStats {
            average_percent: 85.0, // High CPU usage
            peak_percent: 95.0,
            core_utilization: vec![85.0; 8],
            context_switches: 2000000,
            thread_count: 64,
        },
        memory_usage: MemoryUsageStats {
            heap_used_mb: 300.0, // High memory usage
            heap_peak_mb: 350.0,
            stack_used_mb: 8.0,
            memory_leaks_detected: 1,
            gc_pressure: 0.3,
            fragmentation_ratio: 0.15,
        },
        network_usage: NetworkUsageStats {
            bytes_sent: 10 * 1024 * 1024,
            bytes_received: 20 * 1024 * 1024,
            packets_sent: 10000,
            packets_received: 15000,
            connection_count: 50,
            average_latency_ms: 150.0, // High latency
            packet_loss_rate: 0.01,
        },
        storage_usage: StorageUsageStats {
            reads_per_second: 1000.0,
            writes_per_second: 500.0,
            read_latency_ms: 25.0,
            write_latency_ms: 50.0,
            disk_usage_mb: 2000.0,
            cache_hit_rate: 0.7, // Low cache hit rate
        },
        mobile_usage: MobileUsageStats {
            battery_drain_mah: 150.0, // High battery drain
            screen_on_time_ms: 120000,
            background_processing_ms: 240000,
            bluetooth_active_ms: 180000,
            thermal_state: "Hot".to_string(),
        },
    };

    let bottlenecks = optimizer.detect_bottlenecks(&resource_usage).await.unwrap();

    assert!(!bottlenecks.is_empty());

    // Should detect CPU and memory bottlenecks
    let cpu_bottleneck = bottlenecks.iter().any(|b| b.component.contains("CPU"));
    let memory_bottleneck = bottlenecks.iter().any(|b| b.component.contains("Memory"));

    assert!(cpu_bottleneck || memory_bottleneck);

    println!("‚úÖ Bottleneck detection test completed");
    println!("üîç Bottlenecks detected: {}", bottlenecks.len());
}
