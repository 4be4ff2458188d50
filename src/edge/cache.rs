//! Advanced Edge Caching Strategies for BitCraps
//!
//! This module provides sophisticated caching mechanisms optimized for edge computing
//! environments. It implements intelligent cache placement, prefetching, invalidation,
//! and multi-tier caching strategies to minimize latency and maximize hit rates.
//!
//! # Key Features
//!
//! - Multi-tier caching (L1/L2/L3) with intelligent promotion/demotion
//! - Predictive prefetching based on user behavior patterns
//! - Geo-distributed cache coherency and synchronization
//! - Content-aware cache placement and optimization
//! - Real-time cache performance monitoring and adaptation

use crate::edge::{EdgeNode, EdgeNodeId, GeoLocation};
use crate::error::{Error, Result};
use crate::cache::multi_tier::{CacheEntry, CacheKey, CacheValue};
use crate::utils::timeout::TimeoutExt;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, BTreeMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, SystemTime, Instant};
use tokio::sync::{RwLock, Mutex};
use uuid::Uuid;

/// Cache tier levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheTier {
    /// L1: Ultra-fast cache (in-memory, <1ms)
    L1 = 1,
    /// L2: Fast cache (SSD-backed, <10ms)
    L2 = 2,
    /// L3: Capacity cache (distributed, <50ms)
    L3 = 3,
    /// Origin: Source of truth (cloud/core, >100ms)
    Origin = 4,
}

impl CacheTier {
    /// Get typical latency for cache tier
    pub fn typical_latency_ms(&self) -> f32 {
        match self {
            CacheTier::L1 => 0.5,
            CacheTier::L2 => 5.0,
            CacheTier::L3 => 25.0,
            CacheTier::Origin => 100.0,
        }
    }

    /// Get typical capacity for cache tier
    pub fn typical_capacity_mb(&self) -> u64 {
        match self {
            CacheTier::L1 => 512,      // 512 MB
            CacheTier::L2 => 8192,     // 8 GB
            CacheTier::L3 => 102400,   // 100 GB
            CacheTier::Origin => u64::MAX, // Unlimited
        }
    }
}

/// Cache entry metadata with advanced features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeCacheEntry {
    pub key: String,
    pub value: Vec<u8>,
    pub content_type: String,
    pub size_bytes: u64,
    pub created_at: SystemTime,
    pub last_accessed: SystemTime,
    pub access_count: u64,
    pub access_pattern: AccessPattern,
    pub tier: CacheTier,
    pub ttl: Duration,
    pub etag: String,
    pub compression: CompressionType,
    pub popularity_score: f32,
    pub geographic_affinity: HashMap<String, f32>,
    pub replicas: HashSet<EdgeNodeId>,
}

impl EdgeCacheEntry {
    /// Check if cache entry is expired
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed().unwrap_or_default() > self.ttl
    }

    /// Update access information
    pub fn update_access(&mut self, location: Option<&str>) {
        self.last_accessed = SystemTime::now();
        self.access_count += 1;
        
        // Update geographic affinity
        if let Some(loc) = location {
            let current_affinity = self.geographic_affinity.get(loc).unwrap_or(&0.0);
            self.geographic_affinity.insert(loc.to_string(), current_affinity + 1.0);
        }
        
        // Recalculate popularity score
        self.update_popularity_score();
    }

    /// Update popularity score based on access patterns
    fn update_popularity_score(&mut self) {
        let age_seconds = self.created_at.elapsed().unwrap_or_default().as_secs_f32();
        let age_factor = 1.0 / (1.0 + age_seconds / 3600.0); // Decay over hours
        
        let frequency_factor = (self.access_count as f32).ln().max(1.0);
        let recency_factor = 1.0 / (1.0 + self.last_accessed.elapsed().unwrap_or_default().as_secs_f32() / 60.0);
        
        self.popularity_score = age_factor * frequency_factor * recency_factor;
    }
}

/// Access pattern analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessPattern {
    pub pattern_type: PatternType,
    pub peak_hours: Vec<u8>, // Hours of day (0-23)
    pub geographic_distribution: HashMap<String, f32>,
    pub temporal_distribution: TemporalDistribution,
    pub predictability_score: f32,
}

/// Pattern types for cache optimization
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PatternType {
    /// Uniform access across time and space
    Uniform,
    /// Bursty access with peaks
    Bursty,
    /// Seasonal/periodic access
    Seasonal,
    /// Geographic clustering
    Geographic,
    /// Temporal clustering
    Temporal,
}

/// Temporal access distribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalDistribution {
    pub hourly_weights: [f32; 24],
    pub daily_weights: [f32; 7],
    pub monthly_weights: [f32; 12],
}

impl Default for TemporalDistribution {
    fn default() -> Self {
        Self {
            hourly_weights: [1.0 / 24.0; 24],
            daily_weights: [1.0 / 7.0; 7],
            monthly_weights: [1.0 / 12.0; 12],
        }
    }
}

/// Compression types for cache optimization
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum CompressionType {
    None,
    Gzip,
    Brotli,
    Zstd,
    Lz4,
}

impl CompressionType {
    /// Get typical compression ratio
    pub fn compression_ratio(&self) -> f32 {
        match self {
            CompressionType::None => 1.0,
            CompressionType::Gzip => 0.4,
            CompressionType::Brotli => 0.35,
            CompressionType::Zstd => 0.38,
            CompressionType::Lz4 => 0.6,
        }
    }
}

/// Cache eviction policies
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum EvictionPolicy {
    /// Least Recently Used
    Lru,
    /// Least Frequently Used
    Lfu,
    /// Time-aware Least Recently Used
    Tlru,
    /// Adaptive Replacement Cache
    Arc,
    /// Machine Learning based
    ML,
}

/// Prefetching strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefetchStrategy {
    pub strategy_type: PrefetchType,
    pub prediction_window: Duration,
    pub confidence_threshold: f32,
    pub max_prefetch_items: u32,
    pub geographic_radius_km: f32,
}

/// Prefetching types
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PrefetchType {
    /// Based on historical access patterns
    Historical,
    /// Based on user behavior predictions
    Behavioral,
    /// Based on geographic proximity
    Geographic,
    /// Based on temporal patterns
    Temporal,
    /// Machine learning based predictions
    ML,
}

/// Cache synchronization strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStrategy {
    pub sync_type: SyncType,
    pub consistency_level: ConsistencyLevel,
    pub sync_interval: Duration,
    pub conflict_resolution: ConflictResolution,
}

/// Synchronization types
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum SyncType {
    /// Push-based synchronization
    Push,
    /// Pull-based synchronization
    Pull,
    /// Hybrid push-pull
    Hybrid,
    /// Event-driven synchronization
    EventDriven,
}

/// Consistency levels for distributed caching
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ConsistencyLevel {
    /// Strong consistency (synchronous)
    Strong,
    /// Eventual consistency (asynchronous)
    Eventual,
    /// Session consistency
    Session,
    /// Monotonic read consistency
    MonotonicRead,
}

/// Conflict resolution strategies
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ConflictResolution {
    /// Last writer wins
    LastWriterWins,
    /// First writer wins
    FirstWriterWins,
    /// Timestamp-based resolution
    Timestamp,
    /// Vector clock based
    VectorClock,
    /// Application-specific resolver
    Custom,
}

/// Edge cache configuration
#[derive(Debug, Clone)]
pub struct EdgeCacheConfig {
    pub l1_capacity_mb: u64,
    pub l2_capacity_mb: u64,
    pub l3_capacity_mb: u64,
    pub eviction_policy: EvictionPolicy,
    pub enable_prefetching: bool,
    pub prefetch_strategy: PrefetchStrategy,
    pub sync_strategy: SyncStrategy,
    pub enable_compression: bool,
    pub default_ttl: Duration,
    pub max_entry_size_mb: u64,
}

impl Default for EdgeCacheConfig {
    fn default() -> Self {
        Self {
            l1_capacity_mb: 512,
            l2_capacity_mb: 8192,
            l3_capacity_mb: 102400,
            eviction_policy: EvictionPolicy::Arc,
            enable_prefetching: true,
            prefetch_strategy: PrefetchStrategy {
                strategy_type: PrefetchType::Behavioral,
                prediction_window: Duration::from_secs(300),
                confidence_threshold: 0.7,
                max_prefetch_items: 100,
                geographic_radius_km: 50.0,
            },
            sync_strategy: SyncStrategy {
                sync_type: SyncType::Hybrid,
                consistency_level: ConsistencyLevel::Eventual,
                sync_interval: Duration::from_secs(30),
                conflict_resolution: ConflictResolution::LastWriterWins,
            },
            enable_compression: true,
            default_ttl: Duration::from_secs(3600),
            max_entry_size_mb: 100,
        }
    }
}

/// Multi-tier edge cache manager
pub struct EdgeCacheManager {
    /// L1 cache (in-memory)
    l1_cache: Arc<RwLock<HashMap<String, EdgeCacheEntry>>>,
    
    /// L2 cache (SSD-backed)
    l2_cache: Arc<RwLock<HashMap<String, EdgeCacheEntry>>>,
    
    /// L3 cache (distributed)
    l3_cache: Arc<RwLock<HashMap<String, EdgeCacheEntry>>>,
    
    /// Cache access patterns for optimization
    access_patterns: Arc<RwLock<HashMap<String, AccessPattern>>>,
    
    /// Prefetch predictions
    prefetch_queue: Arc<RwLock<VecDeque<PrefetchItem>>>,
    
    /// Geographic cache distribution
    geo_distribution: Arc<RwLock<HashMap<String, HashSet<String>>>>,
    
    /// Performance metrics
    metrics: Arc<RwLock<CacheMetrics>>,
    
    /// Configuration
    config: EdgeCacheConfig,
    
    /// Node ID for this cache instance
    node_id: EdgeNodeId,
    
    /// Background task handles
    _background_tasks: Vec<tokio::task::JoinHandle<()>>,
}

/// Prefetch item information
#[derive(Debug, Clone)]
struct PrefetchItem {
    key: String,
    predicted_access_time: SystemTime,
    confidence: f32,
    source_location: Option<GeoLocation>,
}

/// Cache performance metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetrics {
    pub hit_ratio_l1: f32,
    pub hit_ratio_l2: f32,
    pub hit_ratio_l3: f32,
    pub overall_hit_ratio: f32,
    pub average_latency_ms: f32,
    pub prefetch_accuracy: f32,
    pub storage_efficiency: f32,
    pub bandwidth_saved_mbps: f32,
    pub total_requests: u64,
    pub total_hits: u64,
    pub total_misses: u64,
    pub evictions: u64,
    pub promotions: u64,
    pub demotions: u64,
    pub sync_operations: u64,
    pub last_updated: SystemTime,
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self {
            hit_ratio_l1: 0.0,
            hit_ratio_l2: 0.0,
            hit_ratio_l3: 0.0,
            overall_hit_ratio: 0.0,
            average_latency_ms: 0.0,
            prefetch_accuracy: 0.0,
            storage_efficiency: 0.0,
            bandwidth_saved_mbps: 0.0,
            total_requests: 0,
            total_hits: 0,
            total_misses: 0,
            evictions: 0,
            promotions: 0,
            demotions: 0,
            sync_operations: 0,
            last_updated: SystemTime::now(),
        }
    }
}

impl EdgeCacheManager {
    /// Create new edge cache manager
    pub fn new(config: EdgeCacheConfig, node_id: EdgeNodeId) -> Self {
        Self {
            l1_cache: Arc::new(RwLock::new(HashMap::new())),
            l2_cache: Arc::new(RwLock::new(HashMap::new())),
            l3_cache: Arc::new(RwLock::new(HashMap::new())),
            access_patterns: Arc::new(RwLock::new(HashMap::new())),
            prefetch_queue: Arc::new(RwLock::new(VecDeque::new())),
            geo_distribution: Arc::new(RwLock::new(HashMap::new())),
            metrics: Arc::new(RwLock::new(CacheMetrics::default())),
            config,
            node_id,
            _background_tasks: Vec::new(),
        }
    }

    /// Start cache manager with background services
    pub async fn start(&mut self) -> Result<()> {
        // Start eviction management
        let eviction_task = self.start_eviction_manager().await;
        self._background_tasks.push(eviction_task);

        // Start prefetching if enabled
        if self.config.enable_prefetching {
            let prefetch_task = self.start_prefetch_manager().await;
            self._background_tasks.push(prefetch_task);
        }

        // Start synchronization
        let sync_task = self.start_sync_manager().await;
        self._background_tasks.push(sync_task);

        // Start metrics collection
        let metrics_task = self.start_metrics_collector().await;
        self._background_tasks.push(metrics_task);

        // Start pattern analysis
        let analysis_task = self.start_pattern_analyzer().await;
        self._background_tasks.push(analysis_task);

        tracing::info!("Edge cache manager started with {} background services", 
                      self._background_tasks.len());
        Ok(())
    }

    /// Get value from cache with intelligent tier traversal
    pub async fn get(&self, key: &str, user_location: Option<&str>) -> Result<Option<Vec<u8>>> {
        let start_time = Instant::now();
        let mut metrics = self.metrics.write().await;
        metrics.total_requests += 1;
        drop(metrics);

        // Try L1 cache first
        if let Some(mut entry) = self.get_from_tier(key, CacheTier::L1).await {
            entry.update_access(user_location);
            self.update_entry_in_tier(key, &entry, CacheTier::L1).await?;
            
            let mut metrics = self.metrics.write().await;
            metrics.total_hits += 1;
            metrics.average_latency_ms = Self::update_average(
                metrics.average_latency_ms,
                start_time.elapsed().as_millis() as f32,
                metrics.total_requests as f32,
            );
            
            return Ok(Some(entry.value));
        }

        // Try L2 cache
        if let Some(mut entry) = self.get_from_tier(key, CacheTier::L2).await {
            entry.update_access(user_location);
            
            // Promote to L1 if popular
            if entry.popularity_score > 0.8 {
                self.promote_entry(key, &entry, CacheTier::L2, CacheTier::L1).await?;
                let mut metrics = self.metrics.write().await;
                metrics.promotions += 1;
            } else {
                self.update_entry_in_tier(key, &entry, CacheTier::L2).await?;
            }
            
            let mut metrics = self.metrics.write().await;
            metrics.total_hits += 1;
            
            return Ok(Some(entry.value));
        }

        // Try L3 cache
        if let Some(mut entry) = self.get_from_tier(key, CacheTier::L3).await {
            entry.update_access(user_location);
            
            // Promote to L2 if worthy
            if entry.popularity_score > 0.5 {
                self.promote_entry(key, &entry, CacheTier::L3, CacheTier::L2).await?;
            } else {
                self.update_entry_in_tier(key, &entry, CacheTier::L3).await?;
            }
            
            let mut metrics = self.metrics.write().await;
            metrics.total_hits += 1;
            
            return Ok(Some(entry.value));
        }

        // Cache miss
        let mut metrics = self.metrics.write().await;
        metrics.total_misses += 1;
        metrics.average_latency_ms = Self::update_average(
            metrics.average_latency_ms,
            start_time.elapsed().as_millis() as f32,
            metrics.total_requests as f32,
        );

        Ok(None)
    }

    /// Put value into cache with intelligent tier placement
    pub async fn put(
        &self, 
        key: String, 
        value: Vec<u8>, 
        content_type: String,
        ttl: Option<Duration>,
        user_location: Option<&str>,
    ) -> Result<()> {
        let entry_size = value.len() as u64;
        
        // Check size limits
        if entry_size > self.config.max_entry_size_mb * 1024 * 1024 {
            return Err(Error::InvalidInput(format!("Entry size {}MB exceeds limit", 
                                                  entry_size / 1024 / 1024)));
        }

        // Determine optimal compression
        let compression = if self.config.enable_compression && entry_size > 1024 {
            self.select_optimal_compression(&content_type, entry_size)
        } else {
            CompressionType::None
        };

        // Apply compression
        let (compressed_value, actual_size) = self.compress_data(value, compression)?;

        // Create cache entry
        let mut entry = EdgeCacheEntry {
            key: key.clone(),
            value: compressed_value,
            content_type,
            size_bytes: actual_size,
            created_at: SystemTime::now(),
            last_accessed: SystemTime::now(),
            access_count: 1,
            access_pattern: AccessPattern {
                pattern_type: PatternType::Uniform,
                peak_hours: Vec::new(),
                geographic_distribution: HashMap::new(),
                temporal_distribution: TemporalDistribution::default(),
                predictability_score: 0.0,
            },
            tier: CacheTier::L1,
            ttl: ttl.unwrap_or(self.config.default_ttl),
            etag: format!("{:x}", calculate_hash(&key)),
            compression,
            popularity_score: 1.0,
            geographic_affinity: HashMap::new(),
            replicas: HashSet::new(),
        };

        if let Some(location) = user_location {
            entry.geographic_affinity.insert(location.to_string(), 1.0);
        }

        // Determine initial placement tier
        let initial_tier = self.select_initial_tier(&entry).await;
        entry.tier = initial_tier;

        // Place in appropriate tier
        self.put_in_tier(key.clone(), entry, initial_tier).await?;

        // Update access patterns
        self.update_access_pattern(&key, user_location).await;

        // Trigger prefetch analysis if enabled
        if self.config.enable_prefetching {
            self.analyze_for_prefetch(&key, user_location).await;
        }

        Ok(())
    }

    /// Remove entry from all cache tiers
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let mut removed = false;

        // Remove from all tiers
        for tier in [CacheTier::L1, CacheTier::L2, CacheTier::L3] {
            if self.remove_from_tier(key, tier).await? {
                removed = true;
            }
        }

        // Clean up access patterns
        let mut patterns = self.access_patterns.write().await;
        patterns.remove(key);

        Ok(removed)
    }

    /// Invalidate cache entries matching pattern
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<u32> {
        let mut invalidated = 0;

        // Collect matching keys from all tiers
        let mut matching_keys = HashSet::new();
        
        for tier in [CacheTier::L1, CacheTier::L2, CacheTier::L3] {
            let cache = self.get_cache_for_tier(tier).await;
            let cache_guard = cache.read().await;
            
            for key in cache_guard.keys() {
                if key.contains(pattern) {
                    matching_keys.insert(key.clone());
                }
            }
        }

        // Remove all matching entries
        for key in matching_keys {
            if self.remove(&key).await? {
                invalidated += 1;
            }
        }

        tracing::info!("Invalidated {} cache entries matching pattern '{}'", invalidated, pattern);
        Ok(invalidated)
    }

    /// Get cache entry from specific tier
    async fn get_from_tier(&self, key: &str, tier: CacheTier) -> Option<EdgeCacheEntry> {
        let cache = self.get_cache_for_tier(tier).await;
        let cache_guard = cache.read().await;
        
        if let Some(entry) = cache_guard.get(key) {
            if !entry.is_expired() {
                Some(entry.clone())
            } else {
                None
            }
        } else {
            None
        }
    }

    /// Put cache entry in specific tier
    async fn put_in_tier(&self, key: String, entry: EdgeCacheEntry, tier: CacheTier) -> Result<()> {
        let cache = self.get_cache_for_tier(tier).await;
        let mut cache_guard = cache.write().await;
        
        // Check capacity and evict if necessary
        self.ensure_capacity(&mut cache_guard, tier, entry.size_bytes).await?;
        
        cache_guard.insert(key, entry);
        Ok(())
    }

    /// Remove cache entry from specific tier
    async fn remove_from_tier(&self, key: &str, tier: CacheTier) -> Result<bool> {
        let cache = self.get_cache_for_tier(tier).await;
        let mut cache_guard = cache.write().await;
        Ok(cache_guard.remove(key).is_some())
    }

    /// Update cache entry in specific tier
    async fn update_entry_in_tier(&self, key: &str, entry: &EdgeCacheEntry, tier: CacheTier) -> Result<()> {
        let cache = self.get_cache_for_tier(tier).await;
        let mut cache_guard = cache.write().await;
        cache_guard.insert(key.to_string(), entry.clone());
        Ok(())
    }

    /// Get cache reference for specific tier
    async fn get_cache_for_tier(&self, tier: CacheTier) -> Arc<RwLock<HashMap<String, EdgeCacheEntry>>> {
        match tier {
            CacheTier::L1 => Arc::clone(&self.l1_cache),
            CacheTier::L2 => Arc::clone(&self.l2_cache),
            CacheTier::L3 => Arc::clone(&self.l3_cache),
            CacheTier::Origin => panic!("Origin is not a cache tier"),
        }
    }

    /// Select initial tier for new entry
    async fn select_initial_tier(&self, entry: &EdgeCacheEntry) -> CacheTier {
        // Small, frequently accessed content goes to L1
        if entry.size_bytes < 1024 * 1024 && entry.access_count > 10 {
            return CacheTier::L1;
        }

        // Medium-sized content goes to L2
        if entry.size_bytes < 10 * 1024 * 1024 {
            return CacheTier::L2;
        }

        // Large content goes to L3
        CacheTier::L3
    }

    /// Promote entry between tiers
    async fn promote_entry(
        &self, 
        key: &str, 
        entry: &EdgeCacheEntry, 
        from_tier: CacheTier, 
        to_tier: CacheTier
    ) -> Result<()> {
        // Remove from source tier
        self.remove_from_tier(key, from_tier).await?;
        
        // Add to destination tier
        let mut promoted_entry = entry.clone();
        promoted_entry.tier = to_tier;
        self.put_in_tier(key.to_string(), promoted_entry, to_tier).await?;
        
        Ok(())
    }

    /// Ensure cache tier has capacity for new entry
    async fn ensure_capacity(
        &self, 
        cache: &mut HashMap<String, EdgeCacheEntry>, 
        tier: CacheTier, 
        required_size: u64
    ) -> Result<()> {
        let tier_capacity = match tier {
            CacheTier::L1 => self.config.l1_capacity_mb * 1024 * 1024,
            CacheTier::L2 => self.config.l2_capacity_mb * 1024 * 1024,
            CacheTier::L3 => self.config.l3_capacity_mb * 1024 * 1024,
            CacheTier::Origin => return Ok(()),
        };

        let current_size: u64 = cache.values().map(|e| e.size_bytes).sum();
        
        if current_size + required_size > tier_capacity {
            // Evict entries based on policy
            self.evict_entries(cache, (current_size + required_size) - tier_capacity).await?;
        }

        Ok(())
    }

    /// Evict entries from cache based on policy
    async fn evict_entries(&self, cache: &mut HashMap<String, EdgeCacheEntry>, bytes_to_evict: u64) -> Result<()> {
        let mut evicted_bytes = 0u64;
        let mut entries_to_evict = Vec::new();

        match self.config.eviction_policy {
            EvictionPolicy::Lru => {
                // Sort by last access time (oldest first)
                let mut entries: Vec<_> = cache.iter().collect();
                entries.sort_by_key(|(_, entry)| entry.last_accessed);
                
                for (key, entry) in entries {
                    entries_to_evict.push(key.clone());
                    evicted_bytes += entry.size_bytes;
                    
                    if evicted_bytes >= bytes_to_evict {
                        break;
                    }
                }
            }
            EvictionPolicy::Lfu => {
                // Sort by access count (lowest first)
                let mut entries: Vec<_> = cache.iter().collect();
                entries.sort_by_key(|(_, entry)| entry.access_count);
                
                for (key, entry) in entries {
                    entries_to_evict.push(key.clone());
                    evicted_bytes += entry.size_bytes;
                    
                    if evicted_bytes >= bytes_to_evict {
                        break;
                    }
                }
            }
            EvictionPolicy::Arc => {
                // Adaptive Replacement Cache - evict based on popularity score
                let mut entries: Vec<_> = cache.iter().collect();
                entries.sort_by(|(_, a), (_, b)| a.popularity_score.partial_cmp(&b.popularity_score).unwrap());
                
                for (key, entry) in entries {
                    entries_to_evict.push(key.clone());
                    evicted_bytes += entry.size_bytes;
                    
                    if evicted_bytes >= bytes_to_evict {
                        break;
                    }
                }
            }
            _ => {
                // Default to LRU
                let mut entries: Vec<_> = cache.iter().collect();
                entries.sort_by_key(|(_, entry)| entry.last_accessed);
                
                for (key, entry) in entries {
                    entries_to_evict.push(key.clone());
                    evicted_bytes += entry.size_bytes;
                    
                    if evicted_bytes >= bytes_to_evict {
                        break;
                    }
                }
            }
        }

        // Remove evicted entries
        for key in entries_to_evict {
            cache.remove(&key);
        }

        // Update metrics
        let mut metrics = self.metrics.write().await;
        metrics.evictions += entries_to_evict.len() as u64;

        Ok(())
    }

    /// Select optimal compression for content
    fn select_optimal_compression(&self, content_type: &str, size: u64) -> CompressionType {
        match content_type {
            ct if ct.starts_with("text/") => CompressionType::Brotli,
            ct if ct.starts_with("application/json") => CompressionType::Brotli,
            ct if ct.starts_with("application/javascript") => CompressionType::Brotli,
            ct if ct.starts_with("image/") => CompressionType::None, // Images usually pre-compressed
            ct if ct.starts_with("video/") => CompressionType::None, // Videos usually pre-compressed
            ct if ct.starts_with("audio/") => CompressionType::None, // Audio usually pre-compressed
            _ => {
                if size > 10 * 1024 * 1024 {
                    CompressionType::Lz4 // Fast compression for large files
                } else {
                    CompressionType::Zstd // Good balance of speed and ratio
                }
            }
        }
    }

    /// Compress data using specified algorithm
    fn compress_data(&self, data: Vec<u8>, compression: CompressionType) -> Result<(Vec<u8>, u64)> {
        match compression {
            CompressionType::None => Ok((data.clone(), data.len() as u64)),
            CompressionType::Gzip => {
                use flate2::Compression;
                use flate2::write::GzEncoder;
                use std::io::Write;
                
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&data)?;
                let compressed = encoder.finish()?;
                Ok((compressed.clone(), compressed.len() as u64))
            }
            CompressionType::Zstd => {
                let compressed = zstd::bulk::compress(&data, 3)?;
                Ok((compressed.clone(), compressed.len() as u64))
            }
            CompressionType::Lz4 => {
                let compressed = lz4_flex::compress_prepend_size(&data);
                Ok((compressed.clone(), compressed.len() as u64))
            }
            CompressionType::Brotli => {
                let mut compressed = Vec::new();
                let params = brotli::enc::BrotliEncoderParams::default();
                brotli::BrotliCompress(&mut data.as_slice(), &mut compressed, &params)?;
                Ok((compressed.clone(), compressed.len() as u64))
            }
        }
    }

    /// Update access pattern for key
    async fn update_access_pattern(&self, key: &str, user_location: Option<&str>) {
        let mut patterns = self.access_patterns.write().await;
        let pattern = patterns.entry(key.to_string()).or_insert_with(|| AccessPattern {
            pattern_type: PatternType::Uniform,
            peak_hours: Vec::new(),
            geographic_distribution: HashMap::new(),
            temporal_distribution: TemporalDistribution::default(),
            predictability_score: 0.0,
        });

        // Update geographic distribution
        if let Some(location) = user_location {
            let current_count = pattern.geographic_distribution.get(location).unwrap_or(&0.0);
            pattern.geographic_distribution.insert(location.to_string(), current_count + 1.0);
        }

        // Update temporal distribution
        let now = chrono::Utc::now();
        let hour = now.hour() as usize;
        pattern.temporal_distribution.hourly_weights[hour] += 0.1;
    }

    /// Analyze for prefetch opportunities
    async fn analyze_for_prefetch(&self, key: &str, user_location: Option<&str>) {
        // TODO: Implement sophisticated prefetch analysis
        tracing::debug!("Analyzing prefetch opportunities for key: {}", key);
    }

    /// Update running average
    fn update_average(current_avg: f32, new_value: f32, count: f32) -> f32 {
        (current_avg * (count - 1.0) + new_value) / count
    }

    /// Start eviction manager background task
    async fn start_eviction_manager(&self) -> tokio::task::JoinHandle<()> {
        let l1_cache = Arc::clone(&self.l1_cache);
        let l2_cache = Arc::clone(&self.l2_cache);
        let l3_cache = Arc::clone(&self.l3_cache);
        let metrics = Arc::clone(&self.metrics);
        
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(60));
            
            loop {
                ticker.tick().await;
                
                // Remove expired entries
                for cache in [&l1_cache, &l2_cache, &l3_cache] {
                    let mut cache_guard = cache.write().await;
                    let expired_keys: Vec<String> = cache_guard.iter()
                        .filter(|(_, entry)| entry.is_expired())
                        .map(|(key, _)| key.clone())
                        .collect();
                    
                    for key in expired_keys {
                        cache_guard.remove(&key);
                    }
                }
                
                tracing::debug!("Eviction manager tick completed");
            }
        })
    }

    /// Start prefetch manager background task
    async fn start_prefetch_manager(&self) -> tokio::task::JoinHandle<()> {
        let prefetch_queue = Arc::clone(&self.prefetch_queue);
        
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(30));
            
            loop {
                ticker.tick().await;
                
                // Process prefetch queue
                let mut queue = prefetch_queue.write().await;
                while let Some(item) = queue.pop_front() {
                    // TODO: Implement prefetch logic
                    tracing::debug!("Processing prefetch item: {}", item.key);
                }
            }
        })
    }

    /// Start sync manager background task
    async fn start_sync_manager(&self) -> tokio::task::JoinHandle<()> {
        let sync_interval = self.config.sync_strategy.sync_interval;
        
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sync_interval);
            
            loop {
                ticker.tick().await;
                
                // TODO: Implement cache synchronization with other nodes
                tracing::debug!("Cache synchronization tick");
            }
        })
    }

    /// Start metrics collector background task
    async fn start_metrics_collector(&self) -> tokio::task::JoinHandle<()> {
        let metrics = Arc::clone(&self.metrics);
        let l1_cache = Arc::clone(&self.l1_cache);
        let l2_cache = Arc::clone(&self.l2_cache);
        let l3_cache = Arc::clone(&self.l3_cache);
        
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(60));
            
            loop {
                ticker.tick().await;
                
                let mut metrics_guard = metrics.write().await;
                
                // Update hit ratios
                if metrics_guard.total_requests > 0 {
                    metrics_guard.overall_hit_ratio = 
                        metrics_guard.total_hits as f32 / metrics_guard.total_requests as f32;
                }
                
                // Update storage efficiency
                let l1_count = l1_cache.read().await.len() as f32;
                let l2_count = l2_cache.read().await.len() as f32;
                let l3_count = l3_cache.read().await.len() as f32;
                let total_entries = l1_count + l2_count + l3_count;
                
                if total_entries > 0.0 {
                    metrics_guard.storage_efficiency = 
                        (l1_count * 0.6 + l2_count * 0.3 + l3_count * 0.1) / total_entries;
                }
                
                metrics_guard.last_updated = SystemTime::now();
            }
        })
    }

    /// Start pattern analyzer background task
    async fn start_pattern_analyzer(&self) -> tokio::task::JoinHandle<()> {
        let access_patterns = Arc::clone(&self.access_patterns);
        
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(300)); // 5 minutes
            
            loop {
                ticker.tick().await;
                
                // Analyze access patterns for optimization
                let patterns_guard = access_patterns.read().await;
                for (key, pattern) in patterns_guard.iter() {
                    // TODO: Implement pattern analysis and optimization
                    tracing::debug!("Analyzing access pattern for key: {}", key);
                }
            }
        })
    }

    /// Get cache metrics
    pub async fn get_metrics(&self) -> CacheMetrics {
        let metrics = self.metrics.read().await;
        metrics.clone()
    }

    /// Get cache statistics
    pub async fn get_statistics(&self) -> CacheStatistics {
        let l1_cache = self.l1_cache.read().await;
        let l2_cache = self.l2_cache.read().await;
        let l3_cache = self.l3_cache.read().await;
        let metrics = self.metrics.read().await;

        CacheStatistics {
            l1_entries: l1_cache.len(),
            l2_entries: l2_cache.len(),
            l3_entries: l3_cache.len(),
            total_entries: l1_cache.len() + l2_cache.len() + l3_cache.len(),
            l1_size_mb: l1_cache.values().map(|e| e.size_bytes).sum::<u64>() / 1024 / 1024,
            l2_size_mb: l2_cache.values().map(|e| e.size_bytes).sum::<u64>() / 1024 / 1024,
            l3_size_mb: l3_cache.values().map(|e| e.size_bytes).sum::<u64>() / 1024 / 1024,
            hit_ratio: metrics.overall_hit_ratio,
            average_latency_ms: metrics.average_latency_ms,
            storage_efficiency: metrics.storage_efficiency,
        }
    }
}

/// Cache statistics summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatistics {
    pub l1_entries: usize,
    pub l2_entries: usize,
    pub l3_entries: usize,
    pub total_entries: usize,
    pub l1_size_mb: u64,
    pub l2_size_mb: u64,
    pub l3_size_mb: u64,
    pub hit_ratio: f32,
    pub average_latency_ms: f32,
    pub storage_efficiency: f32,
}

/// Calculate hash for a given key
fn calculate_hash<T: Hash>(t: &T) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    let mut s = DefaultHasher::new();
    t.hash(&mut s);
    s.finish()
}