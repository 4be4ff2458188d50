//! CPU optimization and throttling for mobile devices
//!
//! This module provides intelligent CPU management for mobile devices:
//! - Dynamic CPU throttling based on thermal state and battery level
//! - Consensus algorithm optimization for mobile CPUs
//! - Background task scheduling and prioritization
//! - Thermal management to prevent overheating
//! - Performance/battery balance optimization
//!
//! Target: <20% average CPU usage with <500ms consensus latency

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::{Duration, SystemTime};
use tokio::sync::{Mutex, RwLock, Semaphore};

use super::performance::{PowerState, ThermalState};

/// CPU optimization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuOptimizerConfig {
    /// Target maximum CPU usage percentage
    pub target_cpu_usage: f64,
    /// CPU usage threshold for throttling
    pub throttle_threshold: f64,
    /// Thermal thresholds for CPU throttling
    pub thermal_thresholds: ThermalCpuThresholds,
    /// Consensus optimization settings
    pub consensus_optimization: ConsensusOptimization,
    /// Background task management
    pub background_tasks: BackgroundTaskConfig,
    /// Performance monitoring
    pub monitoring: CpuMonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalCpuThresholds {
    /// Normal operating temperature (°C)
    pub normal_max: f64,
    /// Light throttling threshold (°C)
    pub light_throttle: f64,
    /// Moderate throttling threshold (°C)
    pub moderate_throttle: f64,
    /// Heavy throttling threshold (°C)
    pub heavy_throttle: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusOptimization {
    /// Enable consensus-specific optimizations
    pub enabled: bool,
    /// Maximum consensus latency target (milliseconds)
    pub max_latency_ms: u64,
    /// Batch processing configuration
    pub batch_processing: BatchConfig,
    /// Priority-based scheduling
    pub priority_scheduling: bool,
    /// Adaptive algorithm selection
    pub adaptive_algorithms: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum batch size
    pub max_batch_size: usize,
    /// Batch timeout (milliseconds)
    pub batch_timeout_ms: u64,
    /// Enable dynamic batch sizing
    pub dynamic_sizing: bool,
    /// Minimum batch size
    pub min_batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundTaskConfig {
    /// Maximum concurrent background tasks
    pub max_concurrent_tasks: usize,
    /// Task priority levels
    pub priority_levels: u8,
    /// Task timeout (milliseconds)
    pub task_timeout_ms: u64,
    /// Enable task preemption
    pub enable_preemption: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuMonitoringConfig {
    /// CPU usage sampling interval (milliseconds)
    pub usage_sample_interval_ms: u64,
    /// Temperature monitoring interval (milliseconds)
    pub temperature_interval_ms: u64,
    /// Performance history window size
    pub history_window_size: usize,
}

impl Default for CpuOptimizerConfig {
    fn default() -> Self {
        Self {
            target_cpu_usage: 20.0,
            throttle_threshold: 15.0,
            thermal_thresholds: ThermalCpuThresholds {
                normal_max: 35.0,
                light_throttle: 40.0,
                moderate_throttle: 45.0,
                heavy_throttle: 50.0,
            },
            consensus_optimization: ConsensusOptimization {
                enabled: true,
                max_latency_ms: 500,
                batch_processing: BatchConfig {
                    max_batch_size: 10,
                    batch_timeout_ms: 50,
                    dynamic_sizing: true,
                    min_batch_size: 2,
                },
                priority_scheduling: true,
                adaptive_algorithms: true,
            },
            background_tasks: BackgroundTaskConfig {
                max_concurrent_tasks: 4,
                priority_levels: 5,
                task_timeout_ms: 5000,
                enable_preemption: true,
            },
            monitoring: CpuMonitoringConfig {
                usage_sample_interval_ms: 1000,
                temperature_interval_ms: 2000,
                history_window_size: 60,
            },
        }
    }
}

/// CPU throttling levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ThrottleLevel {
    /// No throttling
    None = 0,
    /// Light throttling (10% performance reduction)
    Light = 1,
    /// Moderate throttling (25% performance reduction)
    Moderate = 2,
    /// Heavy throttling (50% performance reduction)
    Heavy = 3,
    /// Critical throttling (75% performance reduction)
    Critical = 4,
}

/// Task priority levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskPriority {
    /// Background maintenance tasks
    Background = 0,
    /// Normal processing tasks
    Normal = 1,
    /// User-facing tasks
    High = 2,
    /// System-critical tasks
    Critical = 3,
}

/// CPU task definition
#[derive(Debug, Clone)]
pub struct CpuTask {
    /// Task ID
    pub id: u64,
    /// Task name
    pub name: String,
    /// Priority level
    pub priority: TaskPriority,
    /// Estimated execution time (milliseconds)
    pub estimated_duration_ms: u64,
    /// Task creation time
    pub created_at: SystemTime,
    /// Task deadline (optional)
    pub deadline: Option<SystemTime>,
    /// CPU weight (relative importance)
    pub cpu_weight: f64,
    /// Task type for optimization
    pub task_type: TaskType,
}

/// Types of CPU tasks for optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    /// Consensus operations
    Consensus,
    /// Network I/O operations
    Network,
    /// Cryptographic operations
    Crypto,
    /// UI/rendering operations
    UI,
    /// Background maintenance
    Maintenance,
    /// Gaming operations
    Gaming,
}

/// CPU performance metrics
#[derive(Debug, Clone)]
pub struct CpuMetrics {
    /// Current CPU usage percentage
    pub current_usage_percent: f64,
    /// Average CPU usage over time
    pub average_usage_percent: f64,
    /// Peak CPU usage
    pub peak_usage_percent: f64,
    /// Current thermal state
    pub thermal_state: ThermalState,
    /// Current throttle level
    pub throttle_level: ThrottleLevel,
    /// Throttle factor (0.0-1.0, where 1.0 = no throttling)
    pub throttle_factor: f64,
    /// Task queue depth
    pub task_queue_depth: usize,
    /// Tasks completed per second
    pub tasks_per_second: f64,
    /// Average task execution time (milliseconds)
    pub avg_task_time_ms: f64,
    /// Consensus latency (milliseconds)
    pub consensus_latency_ms: u64,
    /// CPU temperature (Celsius)
    pub temperature_celsius: f64,
    /// Power consumption estimate (watts)
    pub power_consumption_watts: f64,
}

/// Consensus batch for processing optimization
#[derive(Debug)]
pub struct ConsensusBatch {
    /// Batch ID
    pub id: u64,
    /// Consensus items in batch
    pub items: Vec<ConsensusItem>,
    /// Batch creation time
    pub created_at: SystemTime,
    /// Batch deadline
    pub deadline: SystemTime,
    /// Batch priority (highest priority of items)
    pub priority: TaskPriority,
}

/// Individual consensus item
#[derive(Debug, Clone)]
pub struct ConsensusItem {
    /// Item ID
    pub id: u64,
    /// Item data
    pub data: Vec<u8>,
    /// Item priority
    pub priority: TaskPriority,
    /// Processing complexity estimate
    pub complexity: ConsensusComplexity,
    /// Creation timestamp
    pub created_at: SystemTime,
}

/// Consensus operation complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConsensusComplexity {
    /// Simple validation
    Simple = 1,
    /// Standard consensus operation
    Standard = 2,
    /// Complex multi-step operation
    Complex = 3,
    /// Very complex operation with heavy computation
    VeryComplex = 4,
}

/// Main CPU optimizer
pub struct CpuOptimizer {
    /// Configuration
    config: Arc<RwLock<CpuOptimizerConfig>>,

    /// Current power state
    power_state: Arc<RwLock<PowerState>>,

    /// Current thermal state
    thermal_state: Arc<RwLock<ThermalState>>,

    /// Current throttle level
    throttle_level: Arc<RwLock<ThrottleLevel>>,

    /// CPU usage history
    usage_history: Arc<RwLock<VecDeque<(SystemTime, f64)>>>,

    /// Temperature history
    temperature_history: Arc<RwLock<VecDeque<(SystemTime, f64)>>>,

    /// Task queue (priority queue)
    task_queue: Arc<Mutex<BinaryHeap<Reverse<TaskQueueItem>>>>,

    /// Consensus batch queue
    consensus_batches: Arc<Mutex<VecDeque<ConsensusBatch>>>,

    /// Active tasks
    active_tasks: Arc<RwLock<HashMap<u64, CpuTask>>>,

    /// CPU metrics
    metrics: Arc<RwLock<CpuMetrics>>,

    /// Task execution semaphore
    task_semaphore: Arc<Semaphore>,

    /// Control flags
    is_running: Arc<AtomicBool>,

    /// Task handles
    scheduler_task: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
    monitor_task: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
    consensus_task: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,

    /// Statistics
    total_tasks_processed: Arc<AtomicU64>,
    total_processing_time: Arc<AtomicU64>,
    next_task_id: Arc<AtomicU64>,
    next_batch_id: Arc<AtomicU64>,
}

/// Task queue item for priority ordering
#[derive(Debug, Clone)]
struct TaskQueueItem {
    task: CpuTask,
    effective_priority: u64, // Lower number = higher priority
}

impl PartialEq for TaskQueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.effective_priority == other.effective_priority
    }
}

impl Eq for TaskQueueItem {}

impl PartialOrd for TaskQueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaskQueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.effective_priority.cmp(&other.effective_priority)
    }
}

impl CpuOptimizer {
    /// Create new CPU optimizer
    pub fn new(config: CpuOptimizerConfig) -> Self {
        let task_semaphore = Arc::new(Semaphore::new(config.background_tasks.max_concurrent_tasks));

        Self {
            config: Arc::new(RwLock::new(config.clone())),
            power_state: Arc::new(RwLock::new(PowerState::Active)),
            thermal_state: Arc::new(RwLock::new(ThermalState::Normal)),
            throttle_level: Arc::new(RwLock::new(ThrottleLevel::None)),
            usage_history: Arc::new(RwLock::new(VecDeque::with_capacity(
                config.monitoring.history_window_size,
            ))),
            temperature_history: Arc::new(RwLock::new(VecDeque::with_capacity(
                config.monitoring.history_window_size,
            ))),
            task_queue: Arc::new(Mutex::new(BinaryHeap::new())),
            consensus_batches: Arc::new(Mutex::new(VecDeque::new())),
            active_tasks: Arc::new(RwLock::new(HashMap::new())),
            metrics: Arc::new(RwLock::new(CpuMetrics::new())),
            task_semaphore,
            is_running: Arc::new(AtomicBool::new(false)),
            scheduler_task: Arc::new(Mutex::new(None)),
            monitor_task: Arc::new(Mutex::new(None)),
            consensus_task: Arc::new(Mutex::new(None)),
            total_tasks_processed: Arc::new(AtomicU64::new(0)),
            total_processing_time: Arc::new(AtomicU64::new(0)),
            next_task_id: Arc::new(AtomicU64::new(1)),
            next_batch_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Start CPU optimization
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.is_running.swap(true, Ordering::Relaxed) {
            return Ok(()); // Already running
        }

        log::info!(
            "Starting CPU optimizer (target usage: {:.1}%)",
            self.config.read().await.target_cpu_usage
        );

        // Start monitoring task
        self.start_monitoring().await;

        // Start task scheduler
        self.start_task_scheduler().await;

        // Start consensus batch processor
        if self.config.read().await.consensus_optimization.enabled {
            self.start_consensus_processor().await;
        }

        log::info!("CPU optimizer started successfully");
        Ok(())
    }

    /// Stop CPU optimization
    pub async fn stop(&self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_running.swap(false, Ordering::Relaxed) {
            return Ok(()); // Already stopped
        }

        log::info!("Stopping CPU optimizer");

        // Stop tasks
        if let Some(task) = self.scheduler_task.lock().await.take() {
            task.abort();
        }

        if let Some(task) = self.monitor_task.lock().await.take() {
            task.abort();
        }

        if let Some(task) = self.consensus_task.lock().await.take() {
            task.abort();
        }

        // Log final statistics
        let total_tasks = self.total_tasks_processed.load(Ordering::Relaxed);
        let total_time = self.total_processing_time.load(Ordering::Relaxed);

        if total_tasks > 0 {
            let avg_time = total_time / total_tasks;
            log::info!(
                "CPU optimizer final stats: {} tasks processed, avg time: {}ms",
                total_tasks,
                avg_time
            );
        }

        log::info!("CPU optimizer stopped");
        Ok(())
    }

    /// Set power state for CPU optimization
    pub async fn set_power_state(
        &self,
        state: PowerState,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let old_state = *self.power_state.read().await;
        *self.power_state.write().await = state;

        if old_state != state {
            log::info!("CPU optimizer power state: {:?} -> {:?}", old_state, state);

            // Adjust throttling based on power state
            let new_throttle = match state {
                PowerState::Critical => ThrottleLevel::Critical,
                PowerState::PowerSaver => ThrottleLevel::Moderate,
                PowerState::Standby => ThrottleLevel::Heavy,
                PowerState::Active => {
                    // Base throttling on thermal state when active
                    match *self.thermal_state.read().await {
                        ThermalState::Critical => ThrottleLevel::Heavy,
                        ThermalState::Hot => ThrottleLevel::Moderate,
                        ThermalState::Warm => ThrottleLevel::Light,
                        ThermalState::Normal => ThrottleLevel::None,
                    }
                }
                PowerState::Charging => ThrottleLevel::None, // No throttling when charging
            };

            self.set_throttle_level(new_throttle).await?;
        }

        Ok(())
    }

    /// Set thermal state for CPU management
    pub async fn set_thermal_state(
        &self,
        state: ThermalState,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let old_state = *self.thermal_state.read().await;
        *self.thermal_state.write().await = state;

        if old_state != state {
            log::info!("CPU thermal state: {:?} -> {:?}", old_state, state);

            // Adjust throttling based on thermal state (if not in power saving mode)
            let power_state = *self.power_state.read().await;
            if power_state == PowerState::Active || power_state == PowerState::Charging {
                let new_throttle = match state {
                    ThermalState::Critical => ThrottleLevel::Critical,
                    ThermalState::Hot => ThrottleLevel::Heavy,
                    ThermalState::Warm => ThrottleLevel::Moderate,
                    ThermalState::Normal => ThrottleLevel::Light,
                };

                self.set_throttle_level(new_throttle).await?;
            }
        }

        Ok(())
    }

    /// Schedule a CPU task
    pub async fn schedule_task(
        &self,
        mut task: CpuTask,
    ) -> Result<u64, Box<dyn std::error::Error>> {
        // Assign task ID
        task.id = self.next_task_id.fetch_add(1, Ordering::Relaxed);

        // Calculate effective priority based on multiple factors
        let effective_priority = self.calculate_effective_priority(&task).await;

        let queue_item = TaskQueueItem {
            task: task.clone(),
            effective_priority,
        };

        // Add to task queue
        self.task_queue.lock().await.push(Reverse(queue_item));

        log::debug!(
            "Scheduled task '{}' with priority {} (effective: {})",
            task.name,
            task.priority as u8,
            effective_priority
        );

        Ok(task.id)
    }

    /// Schedule consensus operation
    pub async fn schedule_consensus(
        &self,
        item: ConsensusItem,
    ) -> Result<u64, Box<dyn std::error::Error>> {
        if !self.config.read().await.consensus_optimization.enabled {
            // Fallback to regular task scheduling
            let task = CpuTask {
                id: 0, // Will be assigned
                name: format!("consensus_{}", item.id),
                priority: item.priority,
                estimated_duration_ms: self.estimate_consensus_duration(&item).await,
                created_at: item.created_at,
                deadline: Some(
                    item.created_at
                        + Duration::from_millis(
                            self.config
                                .read()
                                .await
                                .consensus_optimization
                                .max_latency_ms,
                        ),
                ),
                cpu_weight: 1.0,
                task_type: TaskType::Consensus,
            };

            return self.schedule_task(task).await;
        }

        // Add to consensus batch processing
        let mut batches = self.consensus_batches.lock().await;

        // Try to add to existing batch
        if let Some(batch) = batches.back_mut() {
            let config = self.config.read().await;
            let can_add_to_batch = batch.items.len()
                < config
                    .consensus_optimization
                    .batch_processing
                    .max_batch_size
                && batch
                    .created_at
                    .duration_since(SystemTime::now())
                    .unwrap_or(Duration::ZERO)
                    < Duration::from_millis(
                        config
                            .consensus_optimization
                            .batch_processing
                            .batch_timeout_ms,
                    )
                && batch.priority >= item.priority; // Only add if priority is compatible

            if can_add_to_batch {
                batch.items.push(item.clone());
                batch.priority = batch.priority.max(item.priority); // Upgrade batch priority if needed
                log::debug!(
                    "Added consensus item {} to existing batch {} (size: {})",
                    item.id,
                    batch.id,
                    batch.items.len()
                );
                return Ok(item.id);
            }
        }

        // Create new batch
        let batch_id = self.next_batch_id.fetch_add(1, Ordering::Relaxed);
        let config = self.config.read().await;

        let new_batch = ConsensusBatch {
            id: batch_id,
            items: vec![item.clone()],
            created_at: SystemTime::now(),
            deadline: SystemTime::now()
                + Duration::from_millis(config.consensus_optimization.max_latency_ms),
            priority: item.priority,
        };

        batches.push_back(new_batch);

        log::debug!(
            "Created new consensus batch {} for item {}",
            batch_id,
            item.id
        );

        Ok(item.id)
    }

    /// Get current CPU metrics
    pub async fn get_metrics(&self) -> CpuMetrics {
        self.metrics.read().await.clone()
    }

    /// Get CPU usage for the performance system
    pub async fn get_cpu_usage(&self) -> f64 {
        self.metrics.read().await.current_usage_percent
    }

    /// Calculate effective priority for task scheduling
    async fn calculate_effective_priority(&self, task: &CpuTask) -> u64 {
        let base_priority = (task.priority as u64) * 1000;

        // Adjust for deadline urgency
        let deadline_adjustment = if let Some(deadline) = task.deadline {
            let time_to_deadline = deadline
                .duration_since(SystemTime::now())
                .unwrap_or_default();
            if time_to_deadline < Duration::from_millis(100) {
                0 // Highest urgency
            } else if time_to_deadline < Duration::from_millis(500) {
                100 // High urgency
            } else {
                200 // Normal urgency
            }
        } else {
            300 // No deadline
        };

        // Adjust for task type
        let type_adjustment = match task.task_type {
            TaskType::Consensus => 0,     // Highest priority type
            TaskType::UI => 50,           // User-facing
            TaskType::Crypto => 100,      // Important but can wait
            TaskType::Network => 150,     // Can be batched
            TaskType::Gaming => 200,      // Can wait
            TaskType::Maintenance => 400, // Lowest priority
        };

        // Adjust for CPU weight
        let weight_adjustment = ((1.0 - task.cpu_weight) * 100.0) as u64;

        base_priority + deadline_adjustment + type_adjustment + weight_adjustment
    }

    /// Set CPU throttle level
    async fn set_throttle_level(
        &self,
        level: ThrottleLevel,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let old_level = *self.throttle_level.read().await;
        *self.throttle_level.write().await = level;

        if old_level != level {
            log::info!("CPU throttle level: {:?} -> {:?}", old_level, level);

            // Update metrics
            let throttle_factor = match level {
                ThrottleLevel::None => 1.0,
                ThrottleLevel::Light => 0.9,
                ThrottleLevel::Moderate => 0.75,
                ThrottleLevel::Heavy => 0.5,
                ThrottleLevel::Critical => 0.25,
            };

            self.metrics.write().await.throttle_level = level;
            self.metrics.write().await.throttle_factor = throttle_factor;
        }

        Ok(())
    }

    /// Estimate consensus operation duration
    async fn estimate_consensus_duration(&self, item: &ConsensusItem) -> u64 {
        let base_duration = match item.complexity {
            ConsensusComplexity::Simple => 10,       // 10ms
            ConsensusComplexity::Standard => 50,     // 50ms
            ConsensusComplexity::Complex => 150,     // 150ms
            ConsensusComplexity::VeryComplex => 300, // 300ms
        };

        // Adjust based on data size
        let size_factor = (item.data.len() as f64 / 1024.0).max(1.0);
        let adjusted_duration = (base_duration as f64 * size_factor) as u64;

        // Adjust based on current throttling
        let throttle_factor = self.metrics.read().await.throttle_factor;
        (adjusted_duration as f64 / throttle_factor) as u64
    }

    /// Start CPU monitoring task
    async fn start_monitoring(&self) {
        let config = Arc::clone(&self.config);
        let usage_history = Arc::clone(&self.usage_history);
        let temperature_history = Arc::clone(&self.temperature_history);
        let metrics = Arc::clone(&self.metrics);
        let is_running = Arc::clone(&self.is_running);
        let total_tasks = Arc::clone(&self.total_tasks_processed);
        let total_time = Arc::clone(&self.total_processing_time);

        let task = tokio::spawn(async move {
            let mut usage_interval = tokio::time::interval(Duration::from_millis(
                config.read().await.monitoring.usage_sample_interval_ms,
            ));
            let mut temp_interval = tokio::time::interval(Duration::from_millis(
                config.read().await.monitoring.temperature_interval_ms,
            ));

            while is_running.load(Ordering::Relaxed) {
                tokio::select! {
                    _ = usage_interval.tick() => {
                        // Simulate CPU usage monitoring
                        let current_usage = Self::get_current_cpu_usage().await;

                        // Update history
                        {
                            let mut history = usage_history.write().await;
                            history.push_back((SystemTime::now(), current_usage));

                            let window_size = config.read().await.monitoring.history_window_size;
                            if history.len() > window_size {
                                history.pop_front();
                            }
                        }

                        // Update metrics
                        {
                            let mut metrics_guard = metrics.write().await;
                            metrics_guard.current_usage_percent = current_usage;

                            // Calculate average usage
                            let history = usage_history.read().await;
                            if !history.is_empty() {
                                let sum: f64 = history.iter().map(|(_, usage)| usage).sum();
                                metrics_guard.average_usage_percent = sum / history.len() as f64;
                                metrics_guard.peak_usage_percent = history.iter()
                                    .map(|(_, usage)| *usage)
                                    .fold(0.0, f64::max);
                            }

                            // Calculate tasks per second
                            let tasks = total_tasks.load(Ordering::Relaxed);
                            let time_ms = total_time.load(Ordering::Relaxed);
                            if time_ms > 0 {
                                metrics_guard.tasks_per_second = tasks as f64 / (time_ms as f64 / 1000.0);
                                metrics_guard.avg_task_time_ms = time_ms as f64 / tasks as f64;
                            }
                        }
                    },

                    _ = temp_interval.tick() => {
                        // Simulate temperature monitoring
                        let current_temp = Self::get_current_temperature().await;

                        // Update temperature history
                        {
                            let mut history = temperature_history.write().await;
                            history.push_back((SystemTime::now(), current_temp));

                            let window_size = config.read().await.monitoring.history_window_size;
                            if history.len() > window_size {
                                history.pop_front();
                            }
                        }

                        // Update metrics
                        metrics.write().await.temperature_celsius = current_temp;
                    },
                }
            }
        });

        *self.monitor_task.lock().await = Some(task);
    }

    /// Start task scheduler
    async fn start_task_scheduler(&self) {
        let task_queue = self.task_queue.clone();
        let active_tasks = self.active_tasks.clone();
        let task_semaphore = self.task_semaphore.clone();
        let metrics = self.metrics.clone();
        let is_running = self.is_running.clone();
        let total_tasks = self.total_tasks_processed.clone();
        let total_time = self.total_processing_time.clone();

        let task = tokio::spawn(async move {
            while is_running.load(Ordering::Relaxed) {
                // Get next task from queue
                let next_task = {
                    let mut queue = task_queue.lock().await;
                    queue.pop().map(|item| item.0.task)
                };

                if let Some(task) = next_task {
                    // Acquire semaphore permit
                    if let Ok(permit) = task_semaphore.clone().acquire_owned().await {
                        let task_id = task.id;

                        // Add to active tasks
                        active_tasks.write().await.insert(task_id, task.clone());

                        // Update queue depth metric
                        metrics.write().await.task_queue_depth = task_queue.lock().await.len();

                        // Spawn task execution
                        let active_tasks_clone = active_tasks.clone();
                        let total_tasks_clone = total_tasks.clone();
                        let total_time_clone = total_time.clone();

                        tokio::spawn(async move {
                            let start_time = SystemTime::now();

                            // Execute task (simulated)
                            if let Err(e) = Self::execute_task(&task).await {
                                tracing::warn!("Task execution failed: {:?}", e);
                            }

                            let execution_time = SystemTime::now()
                                .duration_since(start_time)
                                .unwrap_or(Duration::ZERO);

                            // Remove from active tasks
                            active_tasks_clone.write().await.remove(&task_id);

                            // Update statistics
                            total_tasks_clone.fetch_add(1, Ordering::Relaxed);
                            total_time_clone
                                .fetch_add(execution_time.as_millis() as u64, Ordering::Relaxed);

                            log::debug!("Completed task '{}' in {:?}", task.name, execution_time);

                            drop(permit);
                        });
                    }
                } else {
                    // No tasks available, sleep briefly
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        });

        *self.scheduler_task.lock().await = Some(task);
    }

    /// Start consensus batch processor
    async fn start_consensus_processor(&self) {
        let consensus_batches = self.consensus_batches.clone();
        let config = self.config.clone();
        let metrics = self.metrics.clone();
        let is_running = self.is_running.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(10));

            while is_running.load(Ordering::Relaxed) {
                interval.tick().await;

                // Process ready batches
                let ready_batch = {
                    let mut batches = consensus_batches.lock().await;
                    let config = config.read().await;

                    // Check for batches ready for processing
                    if let Some(batch) = batches.front() {
                        let batch_timeout = Duration::from_millis(
                            config
                                .consensus_optimization
                                .batch_processing
                                .batch_timeout_ms,
                        );
                        let min_batch_size = config
                            .consensus_optimization
                            .batch_processing
                            .min_batch_size;

                        let should_process = batch.items.len() >= min_batch_size
                            || batch
                                .created_at
                                .duration_since(SystemTime::now())
                                .unwrap_or(Duration::ZERO)
                                >= batch_timeout
                            || batch.deadline <= SystemTime::now();

                        if should_process {
                            batches.pop_front()
                        } else {
                            None
                        }
                    } else {
                        None
                    }
                };

                if let Some(batch) = ready_batch {
                    let start_time = SystemTime::now();

                    log::debug!(
                        "Processing consensus batch {} with {} items",
                        batch.id,
                        batch.items.len()
                    );

                    // Process batch (simulated)
                    if let Err(e) = Self::process_consensus_batch(&batch).await {
                        tracing::warn!("Consensus batch processing failed: {:?}", e);
                    }

                    let processing_time = SystemTime::now()
                        .duration_since(start_time)
                        .unwrap_or(Duration::ZERO);

                    // Update consensus latency metric
                    metrics.write().await.consensus_latency_ms = processing_time.as_millis() as u64;

                    log::debug!(
                        "Completed consensus batch {} in {:?}",
                        batch.id,
                        processing_time
                    );
                }
            }
        });

        *self.consensus_task.lock().await = Some(task);
    }

    /// Execute a CPU task (simulated)
    async fn execute_task(task: &CpuTask) -> Result<(), Box<dyn std::error::Error>> {
        // Simulate task execution by sleeping for estimated duration
        let sleep_duration = Duration::from_millis(task.estimated_duration_ms);
        tokio::time::sleep(sleep_duration).await;

        // Simulate different task types
        match task.task_type {
            TaskType::Consensus => {
                // Simulate consensus validation
                log::debug!("Executed consensus task: {}", task.name);
            }
            TaskType::Network => {
                // Simulate network I/O
                log::debug!("Executed network task: {}", task.name);
            }
            TaskType::Crypto => {
                // Simulate cryptographic operation
                log::debug!("Executed crypto task: {}", task.name);
            }
            TaskType::UI => {
                // Simulate UI update
                log::debug!("Executed UI task: {}", task.name);
            }
            TaskType::Maintenance => {
                // Simulate maintenance task
                log::debug!("Executed maintenance task: {}", task.name);
            }
            TaskType::Gaming => {
                // Simulate gaming operation
                log::debug!("Executed gaming task: {}", task.name);
            }
        }

        Ok(())
    }

    /// Process consensus batch (simulated)
    async fn process_consensus_batch(
        batch: &ConsensusBatch,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Simulate batch processing with improved efficiency
        let total_complexity: u32 = batch.items.iter().map(|item| item.complexity as u32).sum();

        // Batch processing is more efficient than individual processing
        let batch_efficiency_factor = 0.8; // 20% efficiency improvement
        let processing_time = Duration::from_millis(
            (total_complexity as f64 * 50.0 * batch_efficiency_factor) as u64,
        );

        tokio::time::sleep(processing_time).await;

        log::debug!(
            "Processed consensus batch with {} items in {:?}",
            batch.items.len(),
            processing_time
        );

        Ok(())
    }

    /// Get current CPU usage (simulated)
    async fn get_current_cpu_usage() -> f64 {
        // Simulate CPU usage reading
        // In a real implementation, this would read from /proc/stat or similar
        10.0 + (rand::random::<f64>() * 20.0)
    }

    /// Get current CPU temperature (simulated)
    async fn get_current_temperature() -> f64 {
        // Simulate temperature reading
        // In a real implementation, this would read from thermal sensors
        30.0 + (rand::random::<f64>() * 15.0)
    }
}

impl CpuMetrics {
    fn new() -> Self {
        Self {
            current_usage_percent: 0.0,
            average_usage_percent: 0.0,
            peak_usage_percent: 0.0,
            thermal_state: ThermalState::Normal,
            throttle_level: ThrottleLevel::None,
            throttle_factor: 1.0,
            task_queue_depth: 0,
            tasks_per_second: 0.0,
            avg_task_time_ms: 0.0,
            consensus_latency_ms: 0,
            temperature_celsius: 25.0,
            power_consumption_watts: 2.0,
        }
    }
}

/// CPU throttling manager for the performance system interface
impl CpuOptimizer {
    pub async fn get_processing_delay(&self) -> Duration {
        let throttle_level = *self.throttle_level.read().await;
        match throttle_level {
            ThrottleLevel::None => Duration::from_millis(0),
            ThrottleLevel::Light => Duration::from_millis(5),
            ThrottleLevel::Moderate => Duration::from_millis(15),
            ThrottleLevel::Heavy => Duration::from_millis(50),
            ThrottleLevel::Critical => Duration::from_millis(150),
        }
    }
}
