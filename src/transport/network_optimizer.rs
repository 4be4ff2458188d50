#![cfg(feature = "network-optimization")]

//! Production Network Optimization for BitCraps
//!
//! This module provides advanced network optimization features for production deployment:
//! - Adaptive connection pooling
//! - Intelligent load balancing
//! - Dynamic protocol optimization
//! - Bandwidth management
//! - Latency optimization

use std::sync::{Arc, atomic::{AtomicUsize, AtomicU64, Ordering}};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use std::net::SocketAddr;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::{RwLock, Mutex, Semaphore};
use tokio::time::{sleep, interval};
use crate::optimization::connection_pool_optimizer::{AdaptiveConnectionPool, ConnectionPoolConfig};
use parking_lot::RwLock as ParkingRwLock;
use serde::{Serialize, Deserialize};
use tracing::{info, warn, error, debug};

use crate::optimization::connection_pool_optimizer::ConnectionPool;
#[cfg(feature = "monitoring")]
use crate::monitoring::metrics::METRICS;
use crate::utils::LoopBudget;
use crate::utils::task_tracker::{spawn_tracked, TaskType};

type ConnectionFactory = fn() -> Pin<Box<dyn Future<Output = Result<SocketAddr, Box<dyn std::error::Error + Send + Sync>>> + Send>>;
type ConnectionFuture = Pin<Box<dyn Future<Output = Result<SocketAddr, Box<dyn std::error::Error + Send + Sync>>> + Send>>;

/// Network optimization engine
pub struct NetworkOptimizer {
    /// Connection pool with adaptive sizing
    connection_pool: Arc<AdaptiveConnectionPool<SocketAddr, ConnectionFactory, ConnectionFuture>>,
    /// Load balancer for distributing connections
    load_balancer: Arc<LoadBalancer>,
    /// Protocol optimizer for message efficiency
    protocol_optimizer: Arc<ProtocolOptimizer>,
    /// Bandwidth manager for traffic shaping
    bandwidth_manager: Arc<BandwidthManager>,
    /// Latency optimizer for reducing delays
    latency_optimizer: Arc<LatencyOptimizer>,
    /// Network statistics collector
    stats_collector: Arc<NetworkStatsCollector>,
    /// Configuration
    config: NetworkOptimizerConfig,
}

impl NetworkOptimizer {
    pub fn new(config: NetworkOptimizerConfig) -> Self {
        let connection_pool = Arc::new(AdaptiveConnectionPool::new(
            ConnectionPoolConfig {
                min_connections: 1,
                max_connections: config.max_connections,
                idle_timeout: Duration::from_secs(300),
                validation_timeout: Duration::from_secs(5),
                health_check_interval: Duration::from_secs(30),
                expansion_rate: 1.0,
                contraction_rate: 0.5,
                load_threshold: 0.8,
                health_threshold: 0.9,
            },
            || Box::pin(futures::future::ready(Ok("127.0.0.1:8080".parse().unwrap()))),
        ));

        Self {
            connection_pool: Arc::clone(&connection_pool),
            load_balancer: Arc::new(LoadBalancer::new(config.load_balancer)),
            protocol_optimizer: Arc::new(ProtocolOptimizer::new(config.protocol_optimizer)),
            bandwidth_manager: Arc::new(BandwidthManager::new(config.bandwidth_manager)),
            latency_optimizer: Arc::new(LatencyOptimizer::new(config.latency_optimizer)),
            stats_collector: Arc::new(NetworkStatsCollector::new()),
            config,
        }
    }

    /// Start network optimization engine
    pub async fn start(&self) -> Result<(), NetworkOptimizerError> {
        info!("Starting network optimizer");

        // Start all optimization components
        let load_balancer = Arc::clone(&self.load_balancer);
        let protocol_optimizer = Arc::clone(&self.protocol_optimizer);
        let bandwidth_manager = Arc::clone(&self.bandwidth_manager);
        let latency_optimizer = Arc::clone(&self.latency_optimizer);
        let stats_collector = Arc::clone(&self.stats_collector);

        // Start background tasks with tracking
        spawn_tracked(
            "load_balancer_optimization",
            TaskType::Network,
            async move {
                load_balancer.start_optimization().await;
            },
        ).await;

        spawn_tracked(
            "protocol_optimization",
            TaskType::Network,
            async move {
                protocol_optimizer.start_optimization().await;
            },
        ).await;

        spawn_tracked(
            "bandwidth_management",
            TaskType::Network,
            async move {
                bandwidth_manager.start_management().await;
            },
        ).await;

        spawn_tracked(
            "latency_optimization",
            TaskType::Network,
            async move {
                latency_optimizer.start_optimization().await;
            },
        ).await;

        spawn_tracked(
            "network_stats_collection",
            TaskType::Maintenance,
            async move {
                stats_collector.start_collection().await;
            },
        ).await;

        // Start adaptive connection pool management
        self.start_adaptive_pooling().await;

        info!("Network optimizer started successfully");
        Ok(())
    }

    /// Get current network performance metrics
    pub async fn get_performance_metrics(&self) -> NetworkPerformanceMetrics {
        NetworkPerformanceMetrics {
            active_connections: self.connection_pool.active_connections(),
            total_throughput_bps: self.bandwidth_manager.get_current_throughput().await,
            average_latency_ms: self.latency_optimizer.get_average_latency().await,
            packet_loss_rate: self.stats_collector.get_packet_loss_rate().await,
            connection_success_rate: self.stats_collector.get_connection_success_rate().await,
            load_balance_efficiency: self.load_balancer.get_efficiency().await,
            protocol_compression_ratio: self.protocol_optimizer.get_compression_ratio().await,
        }
    }

    /// Optimize network settings based on current conditions
    pub async fn optimize_for_conditions(&self, conditions: NetworkConditions) -> Result<(), NetworkOptimizerError> {
        info!("Optimizing network for conditions: {:?}", conditions);

        match conditions {
            NetworkConditions::HighLatency => {
                self.latency_optimizer.enable_aggressive_optimization().await;
                self.protocol_optimizer.enable_minimal_protocol().await;
            },
            NetworkConditions::HighBandwidthUsage => {
                self.bandwidth_manager.enable_traffic_shaping().await;
                self.protocol_optimizer.enable_maximum_compression().await;
            },
            NetworkConditions::HighConnectionCount => {
                self.load_balancer.enable_connection_pooling().await;
                self.connection_pool.expand_pool(self.config.max_connections * 2).await?;
            },
            NetworkConditions::UnstableConnections => {
                self.connection_pool.enable_connection_retry().await;
                self.load_balancer.enable_health_checking().await;
            },
            NetworkConditions::Normal => {
                // Use balanced optimization
                self.reset_to_balanced_optimization().await;
            },
        }

        Ok(())
    }

    /// Start adaptive connection pooling
    async fn start_adaptive_pooling(&self) {
        let connection_pool = Arc::clone(&self.connection_pool);
        let stats_collector = Arc::clone(&self.stats_collector);
        let config = self.config.clone();

        spawn_tracked(
            "adaptive_connection_pooling",
            TaskType::Network,
            async move {
            let mut interval = interval(Duration::from_secs(30));
            let mut budget = LoopBudget::for_maintenance();

            loop {
                // Check budget before processing
                if !budget.can_proceed() {
                    budget.backoff().await;
                    continue;
                }

                interval.tick().await;
                budget.consume(1);

                let stats = stats_collector.get_current_stats().await;

                // Adaptive pool sizing based on utilization
                let utilization = stats.connection_utilization_percent;
                let target_size = if utilization > 80.0 {
                    // Scale up if utilization is high
                    (connection_pool.capacity() * 130 / 100).min(config.max_connections * 2)
                } else if utilization < 30.0 {
                    // Scale down if utilization is low
                    (connection_pool.capacity() * 80 / 100).max(config.min_connections)
                } else {
                    connection_pool.capacity() // Keep current size
                };

                if target_size != connection_pool.capacity() {
                    debug!("Adjusting connection pool size from {} to {} (utilization: {:.1}%)",
                        connection_pool.capacity(), target_size, utilization);

                    if let Err(e) = connection_pool.resize_pool(target_size).await {
                        warn!("Failed to resize connection pool: {:?}", e);
                    }
                }
            }
        }).await;
    }

    /// Reset to balanced optimization settings
    async fn reset_to_balanced_optimization(&self) {
        self.latency_optimizer.reset_to_default().await;
        self.protocol_optimizer.reset_to_default().await;
        self.bandwidth_manager.reset_to_default().await;
        self.load_balancer.reset_to_default().await;
    }
}

/// Load balancer for distributing network load
pub struct LoadBalancer {
    servers: Arc<RwLock<Vec<ServerInfo>>>,
    current_strategy: Arc<RwLock<LoadBalanceStrategy>>,
    health_checker: Arc<HealthChecker>,
    config: LoadBalancerConfig,
}

impl LoadBalancer {
    pub fn new(config: LoadBalancerConfig) -> Self {
        Self {
            servers: Arc::new(RwLock::new(Vec::new())),
            current_strategy: Arc::new(RwLock::new(config.default_strategy)),
            health_checker: Arc::new(HealthChecker::new()),
            config,
        }
    }

    /// Start load balancer optimization
    pub async fn start_optimization(&self) {
        let mut interval = interval(Duration::from_secs(10));
        let mut budget = LoopBudget::for_network();

        loop {
            // Check budget before processing
            if !budget.can_proceed() {
                budget.backoff().await;
                continue;
            }

            interval.tick().await;
            budget.consume(1);

            // Update server health
            self.health_checker.check_all_servers(&self.servers).await;

            // Optimize load balancing strategy
            self.optimize_strategy().await;
        }
    }

    /// Get load balancing efficiency
    pub async fn get_efficiency(&self) -> f64 {
        // Calculate efficiency based on load distribution variance
        let servers = self.servers.read().await;
        if servers.len() < 2 {
            return 1.0; // Perfect efficiency with single server
        }

        let loads: Vec<f64> = servers.iter().map(|s| s.current_load).collect();
        let avg_load = loads.iter().sum::<f64>() / loads.len() as f64;
        let variance = loads.iter()
            .map(|load| (load - avg_load).powi(2))
            .sum::<f64>() / loads.len() as f64;

        // Efficiency is inversely related to variance (lower variance = higher efficiency)
        1.0 / (1.0 + variance)
    }

    /// Select best server for new connection
    pub async fn select_server(&self) -> Option<SocketAddr> {
        let servers = self.servers.read().await;
        let healthy_servers: Vec<&ServerInfo> = servers.iter()
            .filter(|s| s.is_healthy)
            .collect();

        if healthy_servers.is_empty() {
            return None;
        }

        let strategy = *self.current_strategy.read().await;

        match strategy {
            LoadBalanceStrategy::RoundRobin => {
                // Simple round-robin selection
                let index = self.get_next_round_robin_index().await % healthy_servers.len();
                Some(healthy_servers[index].address)
            },
            LoadBalanceStrategy::LeastConnections => {
                // Select server with fewest active connections
                healthy_servers.iter()
                    .min_by_key(|s| s.active_connections)
                    .map(|s| s.address)
            },
            LoadBalanceStrategy::WeightedRoundRobin => {
                // Weighted selection based on server capacity
                self.select_weighted_server(&healthy_servers).await
            },
            LoadBalanceStrategy::LeastLatency => {
                // Select server with lowest latency
                healthy_servers.iter()
                    .min_by(|a, b| a.average_latency_ms.partial_cmp(&b.average_latency_ms).unwrap())
                    .map(|s| s.address)
            },
        }
    }

    /// Enable connection pooling optimization
    pub async fn enable_connection_pooling(&self) {
        *self.current_strategy.write().await = LoadBalanceStrategy::LeastConnections;
    }

    /// Enable health checking
    pub async fn enable_health_checking(&self) {
        self.health_checker.enable_aggressive_checking().await;
    }

    /// Reset to default settings
    pub async fn reset_to_default(&self) {
        *self.current_strategy.write().await = self.config.default_strategy;
        self.health_checker.reset_to_default().await;
    }

    async fn optimize_strategy(&self) {
        // Analyze current performance and adjust strategy
        let efficiency = self.get_efficiency().await;

        if efficiency < 0.7 {
            // Switch to least connections if efficiency is low
            *self.current_strategy.write().await = LoadBalanceStrategy::LeastConnections;
        }
    }

    async fn get_next_round_robin_index(&self) -> usize {
        // Implementation would maintain a counter
        0 // Simplified for example
    }

    async fn select_weighted_server(&self, servers: &[&ServerInfo]) -> Option<SocketAddr> {
        // Weighted random selection based on server weights
        let total_weight: u32 = servers.iter().map(|s| s.weight).sum();
        if total_weight == 0 {
            return servers.first().map(|s| s.address);
        }

        // Simplified weighted selection
        let mut cumulative_weight = 0;
        let target = fastrand::u32(0..total_weight);

        for server in servers {
            cumulative_weight += server.weight;
            if cumulative_weight > target {
                return Some(server.address);
            }
        }

        servers.first().map(|s| s.address)
    }
}

/// Protocol optimizer for message efficiency
pub struct ProtocolOptimizer {
    compression_enabled: Arc<RwLock<bool>>,
    compression_level: Arc<RwLock<CompressionLevel>>,
    message_batching: Arc<RwLock<bool>>,
    config: ProtocolOptimizerConfig,
    stats: Arc<RwLock<ProtocolStats>>,
}

impl ProtocolOptimizer {
    pub fn new(config: ProtocolOptimizerConfig) -> Self {
        Self {
            compression_enabled: Arc::new(RwLock::new(config.default_compression_enabled)),
            compression_level: Arc::new(RwLock::new(config.default_compression_level)),
            message_batching: Arc::new(RwLock::new(config.default_batching_enabled)),
            config,
            stats: Arc::new(RwLock::new(ProtocolStats::new())),
        }
    }

    /// Start protocol optimization
    pub async fn start_optimization(&self) {
        let mut interval = interval(Duration::from_secs(15));
        let mut budget = LoopBudget::for_consensus();

        loop {
            // Check budget before processing
            if !budget.can_proceed() {
                budget.backoff().await;
                continue;
            }

            interval.tick().await;
            budget.consume(1);

            // Analyze protocol performance and adjust settings
            self.analyze_and_optimize().await;
        }
    }

    /// Get current compression ratio
    pub async fn get_compression_ratio(&self) -> f64 {
        self.stats.read().await.compression_ratio
    }

    /// Enable maximum compression
    pub async fn enable_maximum_compression(&self) {
        *self.compression_enabled.write().await = true;
        *self.compression_level.write().await = CompressionLevel::Maximum;
    }

    /// Enable minimal protocol overhead
    pub async fn enable_minimal_protocol(&self) {
        *self.message_batching.write().await = true;
        *self.compression_level.write().await = CompressionLevel::Fast;
    }

    /// Reset to default settings
    pub async fn reset_to_default(&self) {
        *self.compression_enabled.write().await = self.config.default_compression_enabled;
        *self.compression_level.write().await = self.config.default_compression_level;
        *self.message_batching.write().await = self.config.default_batching_enabled;
    }

    async fn analyze_and_optimize(&self) {
        let mut stats = self.stats.write().await;

        // Update compression ratio based on recent performance
        stats.compression_ratio = self.calculate_compression_ratio().await;

        // Adjust compression based on CPU usage and bandwidth
        #[cfg(feature = "monitoring")]
        let cpu_usage = METRICS.resources.cpu_usage_percent.load(Ordering::Relaxed) as f64;
        #[cfg(not(feature = "monitoring"))]
        let cpu_usage = 50.0; // Default CPU usage when monitoring is disabled
        let bandwidth_usage = self.get_bandwidth_usage().await;

        if cpu_usage > 80.0 && bandwidth_usage < 50.0 {
            // High CPU, low bandwidth - reduce compression
            *self.compression_level.write().await = CompressionLevel::Fast;
        } else if cpu_usage < 50.0 && bandwidth_usage > 80.0 {
            // Low CPU, high bandwidth - increase compression
            *self.compression_level.write().await = CompressionLevel::Maximum;
        }
    }

    async fn calculate_compression_ratio(&self) -> f64 {
        // Calculate actual compression ratio from recent messages
        // This would be based on real compression statistics
        0.75 // Example: 75% compression ratio
    }

    async fn get_bandwidth_usage(&self) -> f64 {
        // Get current bandwidth utilization percentage
        50.0 // Example value
    }
}

/// Bandwidth manager for traffic shaping
pub struct BandwidthManager {
    rate_limiter: Arc<RateLimiter>,
    traffic_shaper: Arc<TrafficShaper>,
    current_throughput: Arc<AtomicU64>,
    config: BandwidthManagerConfig,
}

impl BandwidthManager {
    pub fn new(config: BandwidthManagerConfig) -> Self {
        Self {
            rate_limiter: Arc::new(RateLimiter::new(config.max_bandwidth_bps)),
            traffic_shaper: Arc::new(TrafficShaper::new()),
            current_throughput: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    /// Start bandwidth management
    pub async fn start_management(&self) {
        let current_throughput = Arc::clone(&self.current_throughput);

        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(1));
            let mut budget = LoopBudget::for_network();

            loop {
                // Check budget before processing
                if !budget.can_proceed() {
                    budget.backoff().await;
                    continue;
                }

                interval.tick().await;
                budget.consume(1);

                // Update current throughput measurement
                #[cfg(feature = "monitoring")]
                {
                    let bytes_sent = METRICS.network.bytes_sent.load(Ordering::Relaxed);
                    current_throughput.store(bytes_sent, Ordering::Relaxed);
                }
            }
        });
    }

    /// Get current throughput in bits per second
    pub async fn get_current_throughput(&self) -> u64 {
        self.current_throughput.load(Ordering::Relaxed) * 8 // Convert bytes to bits
    }

    /// Enable traffic shaping for bandwidth control
    pub async fn enable_traffic_shaping(&self) {
        self.traffic_shaper.enable().await;
    }

    /// Reset to default bandwidth settings
    pub async fn reset_to_default(&self) {
        self.traffic_shaper.reset().await;
    }
}

/// Latency optimizer for reducing network delays
pub struct LatencyOptimizer {
    tcp_nodelay_enabled: Arc<RwLock<bool>>,
    keep_alive_enabled: Arc<RwLock<bool>>,
    buffer_optimization: Arc<RwLock<BufferOptimization>>,
    latency_samples: Arc<RwLock<VecDeque<f64>>>,
    config: LatencyOptimizerConfig,
}

impl LatencyOptimizer {
    pub fn new(config: LatencyOptimizerConfig) -> Self {
        Self {
            tcp_nodelay_enabled: Arc::new(RwLock::new(true)),
            keep_alive_enabled: Arc::new(RwLock::new(true)),
            buffer_optimization: Arc::new(RwLock::new(BufferOptimization::Balanced)),
            latency_samples: Arc::new(RwLock::new(VecDeque::with_capacity(100))),
            config,
        }
    }

    /// Start latency optimization
    pub async fn start_optimization(&self) {
        let latency_samples = Arc::clone(&self.latency_samples);

        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(5));
            let mut budget = LoopBudget::for_consensus();

            loop {
                // Check budget before processing
                if !budget.can_proceed() {
                    budget.backoff().await;
                    continue;
                }

                interval.tick().await;
                budget.consume(1);

                // Collect latency sample
                #[cfg(feature = "monitoring")]
                let current_latency = METRICS.consensus.average_latency_ms();
                #[cfg(not(feature = "monitoring"))]
                let current_latency = 0.0;
                let mut samples = latency_samples.write().await;
                if samples.len() >= 100 {
                    samples.pop_front();
                }
                samples.push_back(current_latency);
            }
        });
    }

    /// Get average latency from recent samples
    pub async fn get_average_latency(&self) -> f64 {
        let samples = self.latency_samples.read().await;
        if samples.is_empty() {
            0.0
        } else {
            samples.iter().sum::<f64>() / samples.len() as f64
        }
    }

    /// Enable aggressive latency optimization
    pub async fn enable_aggressive_optimization(&self) {
        *self.tcp_nodelay_enabled.write().await = true;
        *self.keep_alive_enabled.write().await = true;
        *self.buffer_optimization.write().await = BufferOptimization::LowLatency;
    }

    /// Reset to default latency settings
    pub async fn reset_to_default(&self) {
        *self.tcp_nodelay_enabled.write().await = true;
        *self.keep_alive_enabled.write().await = true;
        *self.buffer_optimization.write().await = BufferOptimization::Balanced;
    }
}

/// Network statistics collector
pub struct NetworkStatsCollector {
    stats: Arc<RwLock<NetworkStats>>,
}

impl NetworkStatsCollector {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(NetworkStats::new())),
        }
    }

    /// Start statistics collection
    pub async fn start_collection(&self) {
        let stats = Arc::clone(&self.stats);

        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(5));
            let mut budget = LoopBudget::for_maintenance();

            loop {
                // Check budget before processing
                if !budget.can_proceed() {
                    budget.backoff().await;
                    continue;
                }

                interval.tick().await;
                budget.consume(1);

                // Collect and update network statistics
                let mut current_stats = stats.write().await;
                current_stats.update().await;
            }
        });
    }

    /// Get current network statistics
    pub async fn get_current_stats(&self) -> NetworkStats {
        self.stats.read().await.clone()
    }

    /// Get packet loss rate
    pub async fn get_packet_loss_rate(&self) -> f64 {
        self.stats.read().await.packet_loss_rate
    }

    /// Get connection success rate
    pub async fn get_connection_success_rate(&self) -> f64 {
        self.stats.read().await.connection_success_rate
    }
}

// Supporting types and configurations

#[derive(Debug, Clone)]
pub struct NetworkOptimizerConfig {
    pub max_connections: usize,
    pub min_connections: usize,
    pub load_balancer: LoadBalancerConfig,
    pub protocol_optimizer: ProtocolOptimizerConfig,
    pub bandwidth_manager: BandwidthManagerConfig,
    pub latency_optimizer: LatencyOptimizerConfig,
}

impl Default for NetworkOptimizerConfig {
    fn default() -> Self {
        Self {
            max_connections: 5000,
            min_connections: 100,
            load_balancer: LoadBalancerConfig::default(),
            protocol_optimizer: ProtocolOptimizerConfig::default(),
            bandwidth_manager: BandwidthManagerConfig::default(),
            latency_optimizer: LatencyOptimizerConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadBalancerConfig {
    pub default_strategy: LoadBalanceStrategy,
    pub health_check_interval: Duration,
    pub health_check_timeout: Duration,
}

impl Default for LoadBalancerConfig {
    fn default() -> Self {
        Self {
            default_strategy: LoadBalanceStrategy::LeastConnections,
            health_check_interval: Duration::from_secs(30),
            health_check_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum LoadBalanceStrategy {
    RoundRobin,
    LeastConnections,
    WeightedRoundRobin,
    LeastLatency,
}

#[derive(Debug, Clone)]
pub struct ProtocolOptimizerConfig {
    pub default_compression_enabled: bool,
    pub default_compression_level: CompressionLevel,
    pub default_batching_enabled: bool,
}

impl Default for ProtocolOptimizerConfig {
    fn default() -> Self {
        Self {
            default_compression_enabled: true,
            default_compression_level: CompressionLevel::Balanced,
            default_batching_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum CompressionLevel {
    Fast,
    Balanced,
    Maximum,
}

#[derive(Debug, Clone)]
pub struct BandwidthManagerConfig {
    pub max_bandwidth_bps: u64,
    pub enable_traffic_shaping: bool,
}

impl Default for BandwidthManagerConfig {
    fn default() -> Self {
        Self {
            max_bandwidth_bps: 1_000_000_000, // 1 Gbps
            enable_traffic_shaping: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LatencyOptimizerConfig {
    pub target_latency_ms: f64,
    pub enable_tcp_nodelay: bool,
    pub enable_keep_alive: bool,
}

impl Default for LatencyOptimizerConfig {
    fn default() -> Self {
        Self {
            target_latency_ms: 50.0,
            enable_tcp_nodelay: true,
            enable_keep_alive: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum NetworkConditions {
    Normal,
    HighLatency,
    HighBandwidthUsage,
    HighConnectionCount,
    UnstableConnections,
}

#[derive(Debug, Serialize)]
pub struct NetworkPerformanceMetrics {
    pub active_connections: usize,
    pub total_throughput_bps: u64,
    pub average_latency_ms: f64,
    pub packet_loss_rate: f64,
    pub connection_success_rate: f64,
    pub load_balance_efficiency: f64,
    pub protocol_compression_ratio: f64,
}

#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub address: SocketAddr,
    pub weight: u32,
    pub active_connections: usize,
    pub current_load: f64,
    pub average_latency_ms: f64,
    pub is_healthy: bool,
    pub last_health_check: Instant,
}

#[derive(Debug, Clone)]
pub struct NetworkStats {
    pub connection_utilization_percent: f64,
    pub packet_loss_rate: f64,
    pub connection_success_rate: f64,
    pub average_connection_time_ms: f64,
}

impl NetworkStats {
    pub fn new() -> Self {
        Self {
            connection_utilization_percent: 0.0,
            packet_loss_rate: 0.0,
            connection_success_rate: 100.0,
            average_connection_time_ms: 0.0,
        }
    }

    pub async fn update(&mut self) {
        // Update statistics from global metrics
        #[cfg(feature = "monitoring")]
        let active_conns = METRICS.network.active_connections.load(Ordering::Relaxed);
        #[cfg(not(feature = "monitoring"))]
        let active_conns = 0;
        let total_conns = 1000; // Example capacity
        self.connection_utilization_percent = (active_conns as f64 / total_conns as f64) * 100.0;

        // These would be calculated from actual network monitoring
        self.packet_loss_rate = 0.1; // Example: 0.1% packet loss
        self.connection_success_rate = 99.5; // Example: 99.5% success rate
        self.average_connection_time_ms = 15.0; // Example: 15ms average connection time
    }
}

#[derive(Debug, Clone)]
pub struct ProtocolStats {
    pub compression_ratio: f64,
    pub messages_per_second: u64,
    pub average_message_size: usize,
}

impl ProtocolStats {
    pub fn new() -> Self {
        Self {
            compression_ratio: 1.0,
            messages_per_second: 0,
            average_message_size: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum BufferOptimization {
    LowLatency,
    Balanced,
    HighThroughput,
}

// Placeholder implementations for supporting components
pub struct HealthChecker;
impl HealthChecker {
    pub fn new() -> Self { Self }
    pub async fn check_all_servers(&self, _servers: &Arc<RwLock<Vec<ServerInfo>>>) {}
    pub async fn enable_aggressive_checking(&self) {}
    pub async fn reset_to_default(&self) {}
}

pub struct RateLimiter;
impl RateLimiter {
    pub fn new(_rate: u64) -> Self { Self }
}

pub struct TrafficShaper;
impl TrafficShaper {
    pub fn new() -> Self { Self }
    pub async fn enable(&self) {}
    pub async fn reset(&self) {}
}

#[derive(Debug)]
pub enum NetworkOptimizerError {
    ConfigurationError(String),
    OptimizationFailed(String),
    ResourceExhausted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_network_optimizer_creation() {
        let config = NetworkOptimizerConfig::default();
        let optimizer = NetworkOptimizer::new(config);

        let metrics = optimizer.get_performance_metrics().await;
        assert_eq!(metrics.active_connections, 0);
    }

    #[tokio::test]
    async fn test_load_balancer() {
        let config = LoadBalancerConfig::default();
        let lb = LoadBalancer::new(config);

        let efficiency = lb.get_efficiency().await;
        assert_eq!(efficiency, 1.0); // Perfect efficiency with no servers
    }

    #[tokio::test]
    async fn test_protocol_optimizer() {
        let config = ProtocolOptimizerConfig::default();
        let optimizer = ProtocolOptimizer::new(config);

        let compression_ratio = optimizer.get_compression_ratio().await;
        assert_eq!(compression_ratio, 1.0); // Initial ratio
    }
}