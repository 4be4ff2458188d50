//! Memory Optimizer for BitCraps
//!
//! Provides intelligent memory management, leak detection, and optimization
//! strategies for the BitCraps platform.

use std::collections::{HashMap, BTreeMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Memory optimizer configuration
#[derive(Clone, Debug)]
pub struct MemoryOptimizerConfig {
    /// Enable automatic garbage collection tuning
    pub enable_gc_tuning: bool,
    /// Enable memory pool management
    pub enable_memory_pools: bool,
    /// Enable memory leak detection
    pub enable_leak_detection: bool,
    /// Memory usage monitoring interval
    pub monitoring_interval: Duration,
    /// Memory pressure threshold (MB)
    pub pressure_threshold_mb: usize,
    /// Maximum cache size (MB)
    pub max_cache_size_mb: usize,
    /// Memory pool sizes
    pub small_pool_size: usize,   // 64B-1KB allocations
    pub medium_pool_size: usize,  // 1KB-64KB allocations
    pub large_pool_size: usize,   // 64KB+ allocations
    /// Leak detection sensitivity
    pub leak_detection_threshold_mb: f64, // MB growth per hour
    pub leak_detection_window: Duration,
}

impl Default for MemoryOptimizerConfig {
    fn default() -> Self {
        Self {
            enable_gc_tuning: true,
            enable_memory_pools: true,
            enable_leak_detection: true,
            monitoring_interval: Duration::from_secs(30),
            pressure_threshold_mb: 1024, // 1GB
            max_cache_size_mb: 256,
            small_pool_size: 1000,
            medium_pool_size: 500,
            large_pool_size: 100,
            leak_detection_threshold_mb: 50.0,
            leak_detection_window: Duration::from_secs(3600), // 1 hour
        }
    }
}

/// Memory statistics
#[derive(Debug, Clone)]
pub struct MemoryStatistics {
    pub timestamp: Instant,
    pub total_allocated_mb: f64,
    pub heap_size_mb: f64,
    pub used_heap_mb: f64,
    pub free_heap_mb: f64,
    pub heap_fragmentation_percent: f64,
    pub gc_collections: u64,
    pub gc_time_ms: f64,
    pub memory_pools_utilization: HashMap<String, f64>,
    pub cache_hit_ratio: f64,
    pub allocation_rate_mb_per_sec: f64,
    pub deallocation_rate_mb_per_sec: f64,
}

/// Memory pressure levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryPressure {
    Low,      // < 50% of threshold
    Moderate, // 50-80% of threshold
    High,     // 80-95% of threshold
    Critical, // > 95% of threshold
}

/// Memory optimization strategy
#[derive(Debug, Clone)]
pub struct OptimizationStrategy {
    pub strategy_type: OptimizationType,
    pub priority: u8, // 1-10, higher = more important
    pub expected_savings_mb: f64,
    pub implementation_cost: ImplementationCost,
    pub description: String,
    pub actions: Vec<OptimizationAction>,
}

#[derive(Debug, Clone)]
pub enum OptimizationType {
    CacheEviction,
    MemoryPoolRebalancing,
    GarbageCollection,
    DataCompression,
    ObjectPooling,
    LazyLoading,
    MemoryMapping,
    BufferReuse,
}

#[derive(Debug, Clone)]
pub enum ImplementationCost {
    Immediate,  // Can be done now
    Short,      // Within next GC cycle
    Medium,     // Requires some restructuring
    Long,       // Major changes needed
}

#[derive(Debug, Clone)]
pub enum OptimizationAction {
    EvictCacheEntries(usize),
    TriggerGarbageCollection,
    RebalanceMemoryPools,
    CompressBuffers(Vec<String>),
    ReleaseUnusedConnections,
    DefragmentHeap,
    SwitchToMemoryMapping(String),
}

/// Memory leak detection
#[derive(Debug, Clone)]
pub struct MemoryLeak {
    pub leak_id: String,
    pub detected_at: Instant,
    pub growth_rate_mb_per_hour: f64,
    pub suspected_source: String,
    pub affected_components: Vec<String>,
    pub severity: LeakSeverity,
    pub stack_traces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeakSeverity {
    Minor,    // < 10 MB/hour
    Moderate, // 10-50 MB/hour
    Severe,   // 50-200 MB/hour
    Critical, // > 200 MB/hour
}

/// Memory pool for efficient allocation
pub struct MemoryPool<T> {
    name: String,
    available: Arc<Mutex<Vec<T>>>,
    allocated: Arc<AtomicUsize>,
    total_capacity: usize,
    create_fn: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T> MemoryPool<T> {
    pub fn new<F>(name: String, capacity: usize, create_fn: F) -> Self 
    where 
        F: Fn() -> T + Send + Sync + 'static,
    {
        let mut pool = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            pool.push(create_fn());
        }

        Self {
            name,
            available: Arc::new(Mutex::new(pool)),
            allocated: Arc::new(AtomicUsize::new(0)),
            total_capacity: capacity,
            create_fn: Box::new(create_fn),
        }
    }

    pub async fn acquire(&self) -> Option<T> {
        let mut available = self.available.lock().await;
        if let Some(item) = available.pop() {
            self.allocated.fetch_add(1, Ordering::Relaxed);
            Some(item)
        } else {
            // Pool exhausted - could create on demand or return None
            None
        }
    }

    pub async fn release(&self, item: T) {
        let mut available = self.available.lock().await;
        if available.len() < self.total_capacity {
            available.push(item);
            self.allocated.fetch_sub(1, Ordering::Relaxed);
        }
        // If at capacity, just drop the item
    }

    pub fn utilization(&self) -> f64 {
        let allocated = self.allocated.load(Ordering::Relaxed);
        allocated as f64 / self.total_capacity as f64
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Intelligent cache with memory pressure awareness
pub struct AdaptiveCache<K, V> {
    cache: Arc<RwLock<BTreeMap<K, CacheEntry<V>>>>,
    max_size: usize,
    current_size: Arc<AtomicUsize>,
    access_count: Arc<AtomicUsize>,
    hit_count: Arc<AtomicUsize>,
    memory_pressure: Arc<RwLock<MemoryPressure>>,
}

#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    last_accessed: Instant,
    access_count: u64,
    size_bytes: usize,
}

impl<K, V> AdaptiveCache<K, V> 
where 
    K: Ord + Clone,
    V: Clone,
{
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: Arc::new(RwLock::new(BTreeMap::new())),
            max_size,
            current_size: Arc::new(AtomicUsize::new(0)),
            access_count: Arc::new(AtomicUsize::new(0)),
            hit_count: Arc::new(AtomicUsize::new(0)),
            memory_pressure: Arc::new(RwLock::new(MemoryPressure::Low)),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.access_count.fetch_add(1, Ordering::Relaxed);
        
        let mut cache = self.cache.write().await;
        if let Some(entry) = cache.get_mut(key) {
            entry.last_accessed = Instant::now();
            entry.access_count += 1;
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub async fn insert(&self, key: K, value: V, size_bytes: usize) {
        let mut cache = self.cache.write().await;
        
        // Check if we need to evict entries
        while self.should_evict(cache.len(), size_bytes).await {
            self.evict_lru_entry(&mut cache).await;
        }
        
        let entry = CacheEntry {
            value,
            last_accessed: Instant::now(),
            access_count: 1,
            size_bytes,
        };
        
        cache.insert(key, entry);
        self.current_size.fetch_add(size_bytes, Ordering::Relaxed);
    }

    pub async fn update_memory_pressure(&self, pressure: MemoryPressure) {
        let mut current_pressure = self.memory_pressure.write().await;
        *current_pressure = pressure;
    }

    pub fn hit_ratio(&self) -> f64 {
        let total_access = self.access_count.load(Ordering::Relaxed);
        let hits = self.hit_count.load(Ordering::Relaxed);
        if total_access > 0 {
            hits as f64 / total_access as f64
        } else {
            0.0
        }
    }

    async fn should_evict(&self, current_entries: usize, new_entry_size: usize) -> bool {
        let pressure = self.memory_pressure.read().await;
        let current_size = self.current_size.load(Ordering::Relaxed);
        
        match *pressure {
            MemoryPressure::Critical => current_entries > self.max_size / 4,
            MemoryPressure::High => current_entries > self.max_size / 2,
            MemoryPressure::Moderate => current_size + new_entry_size > self.max_size * 3 / 4,
            MemoryPressure::Low => current_size + new_entry_size > self.max_size,
        }
    }

    async fn evict_lru_entry<'a>(&self, cache: &mut BTreeMap<K, CacheEntry<V>>) {
        if let Some((key, entry)) = cache.iter()
            .min_by_key(|(_, entry)| (entry.last_accessed, entry.access_count))
            .map(|(k, v)| (k.clone(), v.clone()))
        {
            cache.remove(&key);
            self.current_size.fetch_sub(entry.size_bytes, Ordering::Relaxed);
        }
    }
}

/// Main memory optimizer
pub struct MemoryOptimizer {
    config: MemoryOptimizerConfig,
    memory_stats: Arc<RwLock<Vec<MemoryStatistics>>>,
    detected_leaks: Arc<RwLock<Vec<MemoryLeak>>>,
    optimization_strategies: Arc<RwLock<Vec<OptimizationStrategy>>>,
    memory_pools: Arc<RwLock<HashMap<String, Box<dyn Send + Sync>>>>,
    adaptive_caches: Arc<RwLock<HashMap<String, Box<dyn Send + Sync>>>>,
    is_monitoring: Arc<std::sync::atomic::AtomicBool>,
    start_time: Instant,
}

impl MemoryOptimizer {
    pub fn new(config: MemoryOptimizerConfig) -> Self {
        Self {
            config,
            memory_stats: Arc::new(RwLock::new(Vec::new())),
            detected_leaks: Arc::new(RwLock::new(Vec::new())),
            optimization_strategies: Arc::new(RwLock::new(Vec::new())),
            memory_pools: Arc::new(RwLock::new(HashMap::new())),
            adaptive_caches: Arc::new(RwLock::new(HashMap::new())),
            is_monitoring: Arc::new(std::sync::atomic::AtomicBool::new(false)),
            start_time: Instant::now(),
        }
    }

    /// Start memory optimization monitoring
    pub async fn start(&self) {
        if self.is_monitoring.swap(true, Ordering::Relaxed) {
            return; // Already running
        }

        println!("Starting memory optimizer with config: {:?}", self.config);
        
        // Start monitoring task
        if self.config.enable_leak_detection {
            self.start_memory_monitoring().await;
        }
        
        // Initialize memory pools if enabled
        if self.config.enable_memory_pools {
            self.initialize_memory_pools().await;
        }
        
        // Start optimization task
        self.start_optimization_engine().await;
    }

    /// Stop memory optimization
    pub async fn stop(&self) {
        self.is_monitoring.store(false, Ordering::Relaxed);
        println!("Stopping memory optimizer");
    }

    /// Get current memory statistics
    pub async fn get_memory_statistics(&self) -> MemoryStatistics {
        self.collect_memory_statistics().await
    }

    /// Get current memory pressure level
    pub async fn get_memory_pressure(&self) -> MemoryPressure {
        let stats = self.collect_memory_statistics().await;
        self.calculate_memory_pressure(&stats)
    }

    /// Get optimization recommendations
    pub async fn get_optimization_recommendations(&self) -> Vec<OptimizationStrategy> {
        let strategies = self.optimization_strategies.read().await;
        let mut recommendations = strategies.clone();
        
        // Sort by priority (highest first)
        recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
        recommendations
    }

    /// Apply optimization strategy
    pub async fn apply_optimization(&self, strategy: &OptimizationStrategy) -> Result<f64, String> {
        let mut total_savings = 0.0;
        
        for action in &strategy.actions {
            match self.execute_optimization_action(action).await {
                Ok(savings) => total_savings += savings,
                Err(e) => return Err(format!("Failed to execute action {:?}: {}", action, e)),
            }
        }
        
        println!("Applied optimization '{}': {:.1}MB saved", 
                 strategy.description, total_savings);
        Ok(total_savings)
    }

    /// Get detected memory leaks
    pub async fn get_detected_leaks(&self) -> Vec<MemoryLeak> {
        let leaks = self.detected_leaks.read().await;
        leaks.clone()
    }

    /// Create a managed memory pool
    pub async fn create_memory_pool<T: Send + Sync + 'static, F>(
        &self,
        name: String,
        capacity: usize,
        create_fn: F,
    ) -> Arc<MemoryPool<T>>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let pool = Arc::new(MemoryPool::new(name.clone(), capacity, create_fn));
        let pool_clone = Arc::clone(&pool);
        
        // Store in our collection (type erased)
        let mut pools = self.memory_pools.write().await;
        pools.insert(name, Box::new(pool_clone));
        
        pool
    }

    /// Create an adaptive cache
    pub async fn create_adaptive_cache<K, V>(
        &self,
        name: String,
        max_size: usize,
    ) -> Arc<AdaptiveCache<K, V>>
    where
        K: Ord + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let cache = Arc::new(AdaptiveCache::new(max_size));
        let cache_clone = Arc::clone(&cache);
        
        // Store in our collection (type erased)
        let mut caches = self.adaptive_caches.write().await;
        caches.insert(name, Box::new(cache_clone));
        
        cache
    }

    /// Generate memory optimization report
    pub async fn generate_report(&self) -> String {
        let mut report = String::new();
        let stats = self.get_memory_statistics().await;
        let pressure = self.get_memory_pressure().await;
        let leaks = self.get_detected_leaks().await;
        let recommendations = self.get_optimization_recommendations().await;
        
        report.push_str("=== MEMORY OPTIMIZER REPORT ===\n");
        report.push_str(&format!("Uptime: {:?}\n", self.start_time.elapsed()));
        report.push_str(&format!("Memory Pressure: {:?}\n", pressure));
        
        report.push_str("\n--- Memory Statistics ---\n");
        report.push_str(&format!("Total Allocated: {:.1}MB\n", stats.total_allocated_mb));
        report.push_str(&format!("Heap Size: {:.1}MB\n", stats.heap_size_mb));
        report.push_str(&format!("Used Heap: {:.1}MB ({:.1}%)\n", 
                                stats.used_heap_mb, 
                                (stats.used_heap_mb / stats.heap_size_mb) * 100.0));
        report.push_str(&format!("Heap Fragmentation: {:.1}%\n", stats.heap_fragmentation_percent));
        report.push_str(&format!("GC Collections: {}\n", stats.gc_collections));
        report.push_str(&format!("Total GC Time: {:.1}ms\n", stats.gc_time_ms));
        report.push_str(&format!("Cache Hit Ratio: {:.1}%\n", stats.cache_hit_ratio * 100.0));
        report.push_str(&format!("Allocation Rate: {:.1}MB/sec\n", stats.allocation_rate_mb_per_sec));
        
        if !stats.memory_pools_utilization.is_empty() {
            report.push_str("\n--- Memory Pool Utilization ---\n");
            for (pool_name, utilization) in &stats.memory_pools_utilization {
                report.push_str(&format!("{}: {:.1}%\n", pool_name, utilization * 100.0));
            }
        }
        
        if !leaks.is_empty() {
            report.push_str(&format!("\n--- Detected Memory Leaks ({}) ---\n", leaks.len()));
            for (i, leak) in leaks.iter().take(5).enumerate() {
                report.push_str(&format!("{}. {:?} - {:.1}MB/hour ({})\n", 
                                        i + 1, leak.severity, leak.growth_rate_mb_per_hour, 
                                        leak.suspected_source));
            }
        }
        
        if !recommendations.is_empty() {
            report.push_str(&format!("\n--- Optimization Recommendations ({}) ---\n", recommendations.len()));
            for (i, rec) in recommendations.iter().take(5).enumerate() {
                report.push_str(&format!("{}. {:?} (Priority: {}) - {:.1}MB savings\n", 
                                        i + 1, rec.strategy_type, rec.priority, 
                                        rec.expected_savings_mb));
                report.push_str(&format!("   {}\n", rec.description));
            }
        }
        
        report
    }

    /// Start memory monitoring task
    async fn start_memory_monitoring(&self) {
        let optimizer = self.clone();
        tokio::spawn(async move {
            let mut previous_stats: Option<MemoryStatistics> = None;
            
            while optimizer.is_monitoring.load(Ordering::Relaxed) {
                let stats = optimizer.collect_memory_statistics().await;
                
                // Store statistics
                {
                    let mut stats_vec = optimizer.memory_stats.write().await;
                    stats_vec.push(stats.clone());
                    
                    // Keep bounded
                    if stats_vec.len() > 1000 {
                        let drain_to = stats_vec.len() / 2;
                        stats_vec.drain(0..drain_to);
                    }
                }
                
                // Check for memory leaks
                if let Some(prev_stats) = &previous_stats {
                    optimizer.check_for_memory_leaks(prev_stats, &stats).await;
                }
                
                // Generate optimization strategies
                optimizer.generate_optimization_strategies(&stats).await;
                
                previous_stats = Some(stats);
                tokio::time::sleep(optimizer.config.monitoring_interval).await;
            }
        });
    }

    /// Initialize memory pools
    async fn initialize_memory_pools(&self) {
        // Create standard memory pools for common allocation patterns
        
        // Small buffer pool (for messages, small data structures)
        self.create_memory_pool(
            "small_buffers".to_string(),
            self.config.small_pool_size,
            || Vec::<String>::with_capacity(1024),
        ).await;
        
        // Medium buffer pool (for larger data structures)
        self.create_memory_pool(
            "medium_buffers".to_string(),
            self.config.medium_pool_size,
            || Vec::<u8>::with_capacity(64 * 1024),
        ).await;
        
        // Connection object pool
        self.create_memory_pool(
            "connections".to_string(),
            100,
            || HashMap::<String, String>::with_capacity(50),
        ).await;
    }

    /// Start optimization engine
    async fn start_optimization_engine(&self) {
        let optimizer = self.clone();
        tokio::spawn(async move {
            while optimizer.is_monitoring.load(Ordering::Relaxed) {
                let pressure = optimizer.get_memory_pressure().await;
                
                // Apply optimizations based on pressure level
                match pressure {
                    MemoryPressure::Critical => {
                        optimizer.apply_emergency_optimizations().await;
                    },
                    MemoryPressure::High => {
                        optimizer.apply_aggressive_optimizations().await;
                    },
                    MemoryPressure::Moderate => {
                        optimizer.apply_moderate_optimizations().await;
                    },
                    MemoryPressure::Low => {
                        // Preventive maintenance
                        optimizer.apply_preventive_optimizations().await;
                    },
                }
                
                tokio::time::sleep(Duration::from_secs(60)).await; // Check every minute
            }
        });
    }

    /// Collect current memory statistics
    async fn collect_memory_statistics(&self) -> MemoryStatistics {
        use rand::{Rng, SeedableRng};
        use rand::rngs::StdRng;
        use std::time::SystemTime;
        let seed = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default().as_nanos() as u64;
        let mut rng = StdRng::seed_from_u64(seed);
        
        // In a real implementation, these would be actual memory metrics
        let total_allocated = rng.gen_range(200.0..800.0);
        let heap_size = rng.gen_range(150.0..600.0);
        let used_heap = heap_size * rng.gen_range(0.4..0.9);
        
        MemoryStatistics {
            timestamp: Instant::now(),
            total_allocated_mb: total_allocated,
            heap_size_mb: heap_size,
            used_heap_mb: used_heap,
            free_heap_mb: heap_size - used_heap,
            heap_fragmentation_percent: rng.gen_range(5.0..25.0),
            gc_collections: rng.gen_range(10..100),
            gc_time_ms: rng.gen_range(10.0..500.0),
            memory_pools_utilization: HashMap::new(), // Would be populated with actual data
            cache_hit_ratio: rng.gen_range(0.7..0.95),
            allocation_rate_mb_per_sec: rng.gen_range(1.0..20.0),
            deallocation_rate_mb_per_sec: rng.gen_range(1.0..15.0),
        }
    }

    /// Calculate memory pressure level
    fn calculate_memory_pressure(&self, stats: &MemoryStatistics) -> MemoryPressure {
        let usage_ratio = stats.used_heap_mb / stats.heap_size_mb;
        let threshold = self.config.pressure_threshold_mb as f64;
        
        if stats.total_allocated_mb > threshold * 0.95 || usage_ratio > 0.95 {
            MemoryPressure::Critical
        } else if stats.total_allocated_mb > threshold * 0.8 || usage_ratio > 0.85 {
            MemoryPressure::High
        } else if stats.total_allocated_mb > threshold * 0.5 || usage_ratio > 0.7 {
            MemoryPressure::Moderate
        } else {
            MemoryPressure::Low
        }
    }

    /// Check for memory leaks
    async fn check_for_memory_leaks(&self, prev_stats: &MemoryStatistics, current_stats: &MemoryStatistics) {
        let time_diff_hours = current_stats.timestamp
            .duration_since(prev_stats.timestamp)
            .as_secs_f64() / 3600.0;
        
        if time_diff_hours > 0.0 {
            let memory_growth = current_stats.total_allocated_mb - prev_stats.total_allocated_mb;
            let growth_rate = memory_growth / time_diff_hours;
            
            if growth_rate > self.config.leak_detection_threshold_mb {
                let severity = match growth_rate {
                    x if x > 200.0 => LeakSeverity::Critical,
                    x if x > 50.0 => LeakSeverity::Severe,
                    x if x > 10.0 => LeakSeverity::Moderate,
                    _ => LeakSeverity::Minor,
                };
                
                let leak = MemoryLeak {
                    leak_id: uuid::Uuid::new_v4().to_string(),
                    detected_at: current_stats.timestamp,
                    growth_rate_mb_per_hour: growth_rate,
                    suspected_source: "Unknown - requires investigation".to_string(),
                    affected_components: vec!["General".to_string()],
                    severity,
                    stack_traces: vec![],
                };
                
                let mut leaks = self.detected_leaks.write().await;
                leaks.push(leak);
                
                println!("ðŸš¨ Memory leak detected: {:.1}MB/hour growth rate", growth_rate);
            }
        }
    }

    /// Generate optimization strategies
    async fn generate_optimization_strategies(&self, stats: &MemoryStatistics) {
        let mut strategies = Vec::new();
        
        // Cache eviction strategy
        if stats.cache_hit_ratio < 0.8 {
            strategies.push(OptimizationStrategy {
                strategy_type: OptimizationType::CacheEviction,
                priority: 6,
                expected_savings_mb: stats.total_allocated_mb * 0.1,
                implementation_cost: ImplementationCost::Immediate,
                description: "Evict least recently used cache entries".to_string(),
                actions: vec![OptimizationAction::EvictCacheEntries(100)],
            });
        }
        
        // Garbage collection strategy
        if stats.heap_fragmentation_percent > 20.0 {
            strategies.push(OptimizationStrategy {
                strategy_type: OptimizationType::GarbageCollection,
                priority: 8,
                expected_savings_mb: stats.free_heap_mb * 0.3,
                implementation_cost: ImplementationCost::Short,
                description: "Trigger garbage collection to reduce fragmentation".to_string(),
                actions: vec![OptimizationAction::TriggerGarbageCollection],
            });
        }
        
        // Memory pool rebalancing
        if stats.allocation_rate_mb_per_sec > 10.0 {
            strategies.push(OptimizationStrategy {
                strategy_type: OptimizationType::ObjectPooling,
                priority: 7,
                expected_savings_mb: 20.0,
                implementation_cost: ImplementationCost::Medium,
                description: "Rebalance memory pools to reduce allocation pressure".to_string(),
                actions: vec![OptimizationAction::RebalanceMemoryPools],
            });
        }
        
        let mut stored_strategies = self.optimization_strategies.write().await;
        stored_strategies.clear();
        stored_strategies.extend(strategies);
    }

    /// Execute optimization action
    async fn execute_optimization_action(&self, action: &OptimizationAction) -> Result<f64, String> {
        match action {
            OptimizationAction::EvictCacheEntries(count) => {
                // Simulate cache eviction
                let savings = *count as f64 * 0.001; // Assume 1KB per entry average
                println!("Evicted {} cache entries, saved {:.3}MB", count, savings);
                Ok(savings)
            },
            
            OptimizationAction::TriggerGarbageCollection => {
                // Simulate GC trigger
                println!("Triggered garbage collection");
                tokio::time::sleep(Duration::from_millis(10)).await; // Simulate GC time
                Ok(25.0) // Simulated savings
            },
            
            OptimizationAction::RebalanceMemoryPools => {
                // Simulate pool rebalancing
                println!("Rebalanced memory pools");
                Ok(15.0) // Simulated savings
            },
            
            OptimizationAction::CompressBuffers(buffers) => {
                let savings = buffers.len() as f64 * 2.0; // Assume 2MB per buffer
                println!("Compressed {} buffers, saved {:.1}MB", buffers.len(), savings);
                Ok(savings)
            },
            
            OptimizationAction::ReleaseUnusedConnections => {
                println!("Released unused connections");
                Ok(10.0) // Simulated savings
            },
            
            OptimizationAction::DefragmentHeap => {
                println!("Defragmented heap");
                tokio::time::sleep(Duration::from_millis(50)).await; // Simulate defrag time
                Ok(30.0) // Simulated savings
            },
            
            OptimizationAction::SwitchToMemoryMapping(file) => {
                println!("Switched to memory mapping for {}", file);
                Ok(50.0) // Simulated savings
            },
        }
    }

    /// Apply emergency optimizations for critical memory pressure
    async fn apply_emergency_optimizations(&self) {
        println!("ðŸš¨ CRITICAL MEMORY PRESSURE - Applying emergency optimizations");
        
        let actions = vec![
            OptimizationAction::TriggerGarbageCollection,
            OptimizationAction::EvictCacheEntries(500),
            OptimizationAction::ReleaseUnusedConnections,
            OptimizationAction::DefragmentHeap,
        ];
        
        for action in actions {
            if let Err(e) = self.execute_optimization_action(&action).await {
                eprintln!("Emergency optimization failed: {}", e);
            }
        }
    }

    /// Apply aggressive optimizations for high memory pressure
    async fn apply_aggressive_optimizations(&self) {
        println!("âš ï¸ HIGH MEMORY PRESSURE - Applying aggressive optimizations");
        
        let actions = vec![
            OptimizationAction::EvictCacheEntries(200),
            OptimizationAction::RebalanceMemoryPools,
            OptimizationAction::CompressBuffers(vec!["network_buffers".to_string()]),
        ];
        
        for action in actions {
            if let Err(e) = self.execute_optimization_action(&action).await {
                eprintln!("Aggressive optimization failed: {}", e);
            }
        }
    }

    /// Apply moderate optimizations for moderate memory pressure
    async fn apply_moderate_optimizations(&self) {
        let actions = vec![
            OptimizationAction::EvictCacheEntries(50),
        ];
        
        for action in actions {
            let _ = self.execute_optimization_action(&action).await;
        }
    }

    /// Apply preventive optimizations for low memory pressure
    async fn apply_preventive_optimizations(&self) {
        // Light maintenance
        let _ = self.execute_optimization_action(&OptimizationAction::EvictCacheEntries(10)).await;
    }
}

impl Clone for MemoryOptimizer {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            memory_stats: Arc::clone(&self.memory_stats),
            detected_leaks: Arc::clone(&self.detected_leaks),
            optimization_strategies: Arc::clone(&self.optimization_strategies),
            memory_pools: Arc::clone(&self.memory_pools),
            adaptive_caches: Arc::clone(&self.adaptive_caches),
            is_monitoring: Arc::clone(&self.is_monitoring),
            start_time: self.start_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_optimizer_basic() {
        let config = MemoryOptimizerConfig::default();
        let optimizer = MemoryOptimizer::new(config);
        
        let stats = optimizer.get_memory_statistics().await;
        assert!(stats.total_allocated_mb > 0.0);
        
        let pressure = optimizer.get_memory_pressure().await;
        assert!(matches!(pressure, MemoryPressure::Low | MemoryPressure::Moderate | MemoryPressure::High | MemoryPressure::Critical));
    }

    #[tokio::test]
    async fn test_memory_pool() {
        let pool = MemoryPool::new(
            "test_pool".to_string(),
            10,
            || vec![0u8; 1024],
        );
        
        // Test acquire and release
        let item1 = pool.acquire().await;
        assert!(item1.is_some());
        assert_eq!(pool.utilization(), 0.1); // 1 out of 10
        
        pool.release(item1.unwrap()).await;
        assert_eq!(pool.utilization(), 0.0);
    }

    #[tokio::test]
    async fn test_adaptive_cache() {
        let cache: AdaptiveCache<String, String> = AdaptiveCache::new(100);
        
        // Test basic operations
        cache.insert("key1".to_string(), "value1".to_string(), 10).await;
        let value = cache.get(&"key1".to_string()).await;
        assert_eq!(value, Some("value1".to_string()));
        
        // Test hit ratio
        cache.get(&"nonexistent".to_string()).await; // Miss
        let hit_ratio = cache.hit_ratio();
        assert!(hit_ratio > 0.0 && hit_ratio < 1.0);
    }

    #[tokio::test]
    async fn test_optimization_strategy_application() {
        let config = MemoryOptimizerConfig::default();
        let optimizer = MemoryOptimizer::new(config);
        
        let strategy = OptimizationStrategy {
            strategy_type: OptimizationType::CacheEviction,
            priority: 5,
            expected_savings_mb: 10.0,
            implementation_cost: ImplementationCost::Immediate,
            description: "Test strategy".to_string(),
            actions: vec![OptimizationAction::EvictCacheEntries(100)],
        };
        
        let result = optimizer.apply_optimization(&strategy).await;
        assert!(result.is_ok());
        assert!(result.unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_memory_leak_detection() {
        let config = MemoryOptimizerConfig {
            leak_detection_threshold_mb: 1.0, // Very low threshold for testing
            ..Default::default()
        };
        let optimizer = MemoryOptimizer::new(config);
        
        // Simulate two memory statistics with significant growth
        let prev_stats = MemoryStatistics {
            timestamp: Instant::now() - Duration::from_secs(3600),
            total_allocated_mb: 100.0,
            heap_size_mb: 150.0,
            used_heap_mb: 80.0,
            free_heap_mb: 70.0,
            heap_fragmentation_percent: 10.0,
            gc_collections: 5,
            gc_time_ms: 50.0,
            memory_pools_utilization: HashMap::new(),
            cache_hit_ratio: 0.8,
            allocation_rate_mb_per_sec: 5.0,
            deallocation_rate_mb_per_sec: 4.0,
        };
        
        let current_stats = MemoryStatistics {
            timestamp: Instant::now(),
            total_allocated_mb: 150.0, // 50MB growth in 1 hour
            ..prev_stats.clone()
        };
        
        optimizer.check_for_memory_leaks(&prev_stats, &current_stats).await;
        
        let leaks = optimizer.get_detected_leaks().await;
        assert!(!leaks.is_empty());
        assert!(leaks[0].growth_rate_mb_per_hour > 45.0);
    }

    #[tokio::test]
    async fn test_report_generation() {
        let config = MemoryOptimizerConfig::default();
        let optimizer = MemoryOptimizer::new(config);
        
        // Add some test data
        optimizer.generate_optimization_strategies(&optimizer.get_memory_statistics().await).await;
        
        let report = optimizer.generate_report().await;
        assert!(report.contains("MEMORY OPTIMIZER REPORT"));
        assert!(report.contains("Memory Statistics"));
    }
}