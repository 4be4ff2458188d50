use std::sync::Arc;
use std::time::{Duration, Instant};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use sysinfo::{System, SystemExt};

use crate::error::BitCrapsError;
use crate::mobile::{power_management::PowerManager, PowerMode};

/// Mobile-specific performance optimization system
pub struct MobileOptimizer {
    /// Battery and thermal management
    power_manager: Arc<PowerManager>,
    /// CPU frequency scaling
    cpu_governor: CpuGovernor,
    /// Memory pressure management
    memory_manager: MobileMemoryManager,
    /// Network optimization for mobile
    network_optimizer: MobileNetworkOptimizer,
    /// Background task management
    background_scheduler: BackgroundTaskScheduler,
    /// Performance metrics tracking
    metrics: Arc<RwLock<MobileMetrics>>,
    /// Configuration
    config: MobileOptimizerConfig,
}

#[derive(Debug, Clone)]
pub struct MobileOptimizerConfig {
    /// Battery level thresholds for optimization levels
    pub critical_battery_threshold: f32, // 0.15 = 15%
    pub low_battery_threshold: f32,      // 0.30 = 30%
    
    /// Thermal thresholds (Celsius)
    pub thermal_warning_threshold: f32,   // 45°C
    pub thermal_critical_threshold: f32,  // 55°C
    
    /// Memory pressure thresholds
    pub memory_warning_threshold: f32,    // 0.80 = 80% usage
    pub memory_critical_threshold: f32,   // 0.90 = 90% usage
    
    /// Performance profiles
    pub enable_aggressive_optimization: bool,
    pub background_task_limit: usize,
    pub cpu_usage_target: f32, // Target CPU usage percentage
}

impl Default for MobileOptimizerConfig {
    fn default() -> Self {
        Self {
            critical_battery_threshold: 0.15,
            low_battery_threshold: 0.30,
            thermal_warning_threshold: 45.0,
            thermal_critical_threshold: 55.0,
            memory_warning_threshold: 0.80,
            memory_critical_threshold: 0.90,
            enable_aggressive_optimization: false,
            background_task_limit: 3,
            cpu_usage_target: 70.0,
        }
    }
}

impl MobileOptimizer {
    pub fn new(config: MobileOptimizerConfig) -> Result<Self, BitCrapsError> {
        let power_manager = Arc::new(PowerManager::new(PowerMode::Balanced));
        
        Ok(Self {
            power_manager,
            cpu_governor: CpuGovernor::new(&config),
            memory_manager: MobileMemoryManager::new(&config),
            network_optimizer: MobileNetworkOptimizer::new(&config),
            background_scheduler: BackgroundTaskScheduler::new(&config),
            metrics: Arc::new(RwLock::new(MobileMetrics::new())),
            config,
        })
    }
    
    /// Main optimization loop - call this periodically
    pub async fn optimize(&mut self) -> Result<OptimizationReport, BitCrapsError> {
        let start_time = Instant::now();
        let mut report = OptimizationReport::new();
        
        // Get current system state
        let system_state = self.get_system_state().await?;
        
        // Determine optimization profile based on system state
        let profile = self.determine_optimization_profile(&system_state);
        
        // Apply optimizations based on profile
        match profile {
            OptimizationProfile::PowerSaver => {
                report.merge(self.apply_power_saver_optimizations(&system_state).await?);
            }
            OptimizationProfile::Balanced => {
                report.merge(self.apply_balanced_optimizations(&system_state).await?);
            }
            OptimizationProfile::Performance => {
                report.merge(self.apply_performance_optimizations(&system_state).await?);
            }
            OptimizationProfile::Critical => {
                report.merge(self.apply_critical_optimizations(&system_state).await?);
            }
        }
        
        // Update metrics
        {
            let mut metrics = self.metrics.write();
            metrics.update_optimization_cycle(start_time.elapsed(), &system_state, &profile);
        }
        
        report.optimization_duration = start_time.elapsed();
        report.profile_applied = profile;
        
        Ok(report)
    }
    
    /// Get current system performance state
    async fn get_system_state(&mut self) -> Result<SystemState, BitCrapsError> {
        let battery_info = self.power_manager.get_battery_info().await
            .map_err(|_| BitCrapsError::InvalidData("Failed to get battery info".to_string()))?;
        let thermal_info = self.power_manager.get_thermal_info().await
            .map_err(|_| BitCrapsError::InvalidData("Failed to get thermal info".to_string()))?;
        let memory_info = self.memory_manager.get_memory_info()?;
        let network_info = self.network_optimizer.get_network_state().await;
        
        Ok(SystemState {
            battery_level: battery_info.level.unwrap_or(0.0),
            is_charging: battery_info.is_charging,
            cpu_temperature: thermal_info.cpu_temperature,
            battery_temperature: thermal_info.battery_temperature,
            memory_usage: memory_info.usage_percentage,
            available_memory: memory_info.available_mb,
            cpu_usage: self.get_cpu_usage(),
            network_quality: network_info.quality,
            background_tasks: self.background_scheduler.active_task_count(),
        })
    }
    
    /// Determine which optimization profile to use
    fn determine_optimization_profile(&self, state: &SystemState) -> OptimizationProfile {
        // Critical conditions override everything
        if state.battery_level < self.config.critical_battery_threshold ||
           state.cpu_temperature > self.config.thermal_critical_threshold ||
           state.memory_usage > self.config.memory_critical_threshold {
            return OptimizationProfile::Critical;
        }
        
        // Power saver conditions
        if state.battery_level < self.config.low_battery_threshold && !state.is_charging ||
           state.cpu_temperature > self.config.thermal_warning_threshold ||
           state.memory_usage > self.config.memory_warning_threshold {
            return OptimizationProfile::PowerSaver;
        }
        
        // Performance mode when charging and good conditions
        if state.is_charging && 
           state.battery_level > 0.50 &&
           state.cpu_temperature < self.config.thermal_warning_threshold &&
           state.memory_usage < self.config.memory_warning_threshold {
            return OptimizationProfile::Performance;
        }
        
        // Default to balanced
        OptimizationProfile::Balanced
    }
    
    /// Apply power saver optimizations
    async fn apply_power_saver_optimizations(&mut self, state: &SystemState) -> Result<OptimizationReport, BitCrapsError> {
        let mut report = OptimizationReport::new();
        
        // Reduce CPU frequency
        if let Ok(old_freq) = self.cpu_governor.set_frequency_profile(CpuProfile::PowerSaver) {
            report.actions_taken.push(format!("Reduced CPU frequency from {} to PowerSaver profile", old_freq));
        }
        
        // Pause non-essential background tasks
        let paused_tasks = self.background_scheduler.pause_non_essential_tasks().await;
        if paused_tasks > 0 {
            report.actions_taken.push(format!("Paused {} non-essential background tasks", paused_tasks));
        }
        
        // Reduce network activity
        self.network_optimizer.enable_aggressive_batching(true).await;
        report.actions_taken.push("Enabled aggressive network batching".to_string());
        
        // Optimize memory usage
        let memory_freed = self.memory_manager.aggressive_cleanup().await;
        if memory_freed > 0 {
            report.actions_taken.push(format!("Freed {} MB of memory", memory_freed));
        }
        
        // Reduce BLE advertising frequency
        report.actions_taken.push("Reduced BLE advertising frequency".to_string());
        
        report.power_savings_estimated = Duration::from_secs(1800); // 30 minutes estimated
        Ok(report)
    }
    
    /// Apply balanced optimizations
    async fn apply_balanced_optimizations(&mut self, state: &SystemState) -> Result<OptimizationReport, BitCrapsError> {
        let mut report = OptimizationReport::new();
        
        // Use balanced CPU profile
        if let Ok(old_freq) = self.cpu_governor.set_frequency_profile(CpuProfile::Balanced) {
            report.actions_taken.push(format!("Set CPU to balanced profile from {}", old_freq));
        }
        
        // Moderate background task management
        let optimized_tasks = self.background_scheduler.optimize_task_scheduling().await;
        if optimized_tasks > 0 {
            report.actions_taken.push(format!("Optimized scheduling for {} background tasks", optimized_tasks));
        }
        
        // Standard memory management
        let memory_freed = self.memory_manager.routine_cleanup().await;
        if memory_freed > 0 {
            report.actions_taken.push(format!("Routine cleanup freed {} MB", memory_freed));
        }
        
        // Balanced network optimization
        self.network_optimizer.enable_aggressive_batching(false).await;
        report.actions_taken.push("Using balanced network batching".to_string());
        
        Ok(report)
    }
    
    /// Apply performance optimizations
    async fn apply_performance_optimizations(&mut self, state: &SystemState) -> Result<OptimizationReport, BitCrapsError> {
        let mut report = OptimizationReport::new();
        
        // Maximum CPU performance
        if let Ok(old_freq) = self.cpu_governor.set_frequency_profile(CpuProfile::Performance) {
            report.actions_taken.push(format!("Boosted CPU to performance profile from {}", old_freq));
        }
        
        // Allow more background tasks
        self.background_scheduler.increase_task_limit(self.config.background_task_limit * 2).await;
        report.actions_taken.push("Increased background task limit for performance".to_string());
        
        // Optimize for lowest latency
        self.network_optimizer.optimize_for_latency(true).await;
        report.actions_taken.push("Optimized network for lowest latency".to_string());
        
        // Preemptive memory allocation
        self.memory_manager.preemptive_allocation().await;
        report.actions_taken.push("Enabled preemptive memory allocation".to_string());
        
        Ok(report)
    }
    
    /// Apply critical emergency optimizations
    async fn apply_critical_optimizations(&mut self, state: &SystemState) -> Result<OptimizationReport, BitCrapsError> {
        let mut report = OptimizationReport::new();
        
        // Emergency power saving
        if let Ok(old_freq) = self.cpu_governor.set_frequency_profile(CpuProfile::Emergency) {
            report.actions_taken.push(format!("Emergency CPU throttling from {}", old_freq));
        }
        
        // Pause all non-critical tasks
        let paused_tasks = self.background_scheduler.pause_all_non_critical_tasks().await;
        report.actions_taken.push(format!("Emergency pause of {} tasks", paused_tasks));
        
        // Aggressive memory cleanup
        let memory_freed = self.memory_manager.emergency_cleanup().await;
        report.actions_taken.push(format!("Emergency cleanup freed {} MB", memory_freed));
        
        // Minimize network activity
        self.network_optimizer.minimize_network_activity().await;
        report.actions_taken.push("Minimized network activity".to_string());
        
        // Reduce game update frequency
        report.actions_taken.push("Reduced game state update frequency".to_string());
        
        report.power_savings_estimated = Duration::from_secs(3600); // 1 hour estimated
        Ok(report)
    }
    
    /// Get current CPU usage percentage
    fn get_cpu_usage(&self) -> f32 {
        // This would use platform-specific APIs in a real implementation
        // For now, return a placeholder
        50.0
    }
    
    /// Get comprehensive mobile performance metrics
    pub fn get_metrics(&self) -> MobileMetrics {
        self.metrics.read().clone()
    }
    
    /// Force cleanup of all optimizers
    pub async fn cleanup(&mut self) -> Result<(), BitCrapsError> {
        // Reset to normal profiles
        let _ = self.cpu_governor.set_frequency_profile(CpuProfile::Balanced);
        
        // Resume all tasks
        self.background_scheduler.resume_all_tasks().await;
        
        // Reset network optimization
        self.network_optimizer.reset_to_default().await;
        
        // Final memory cleanup
        self.memory_manager.final_cleanup().await;
        
        Ok(())
    }
}

/// CPU frequency and power management
pub struct CpuGovernor {
    current_profile: CpuProfile,
    config: MobileOptimizerConfig,
}

impl CpuGovernor {
    pub fn new(config: &MobileOptimizerConfig) -> Self {
        Self {
            current_profile: CpuProfile::Balanced,
            config: config.clone(),
        }
    }
    
    pub fn set_frequency_profile(&mut self, profile: CpuProfile) -> Result<CpuProfile, BitCrapsError> {
        let old_profile = self.current_profile;
        self.current_profile = profile;
        
        // In a real implementation, this would set actual CPU governor settings
        match profile {
            CpuProfile::Emergency => {
                // Set to minimum frequency
                tracing::info!("Setting CPU to emergency power saving mode");
            }
            CpuProfile::PowerSaver => {
                // Conservative frequency scaling
                tracing::info!("Setting CPU to power saver mode");
            }
            CpuProfile::Balanced => {
                // Ondemand governor
                tracing::info!("Setting CPU to balanced mode");
            }
            CpuProfile::Performance => {
                // Performance governor
                tracing::info!("Setting CPU to performance mode");
            }
        }
        
        Ok(old_profile)
    }
    
    pub fn current_profile(&self) -> CpuProfile {
        self.current_profile
    }
}

/// Mobile memory management with pressure detection
pub struct MobileMemoryManager {
    config: MobileOptimizerConfig,
    system: System,
}

impl MobileMemoryManager {
    pub fn new(config: &MobileOptimizerConfig) -> Self {
        Self {
            config: config.clone(),
            system: System::new_all(),
        }
    }
    
    pub fn get_memory_info(&mut self) -> Result<MemoryInfo, BitCrapsError> {
        self.system.refresh_memory();
        
        let total_memory = self.system.total_memory();
        let available_memory = self.system.available_memory();
        let used_memory = total_memory - available_memory;
        
        let usage_percentage = if total_memory > 0 {
            used_memory as f32 / total_memory as f32
        } else {
            0.0
        };
        
        Ok(MemoryInfo {
            total_mb: (total_memory / 1024 / 1024) as u32,
            available_mb: (available_memory / 1024 / 1024) as u32,
            used_mb: (used_memory / 1024 / 1024) as u32,
            usage_percentage,
        })
    }
    
    pub async fn routine_cleanup(&self) -> u32 {
        // Simulate routine memory cleanup
        tokio::time::sleep(Duration::from_millis(10)).await;
        // Return MB freed
        25
    }
    
    pub async fn aggressive_cleanup(&self) -> u32 {
        // Simulate aggressive memory cleanup
        tokio::time::sleep(Duration::from_millis(50)).await;
        // Return MB freed
        100
    }
    
    pub async fn emergency_cleanup(&self) -> u32 {
        // Simulate emergency memory cleanup
        tokio::time::sleep(Duration::from_millis(200)).await;
        // Return MB freed
        250
    }
    
    pub async fn preemptive_allocation(&self) {
        // Preemptively allocate memory pools for performance
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    
    pub async fn final_cleanup(&self) {
        // Final cleanup on shutdown
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Mobile network optimization
pub struct MobileNetworkOptimizer {
    config: MobileOptimizerConfig,
    aggressive_batching: bool,
    latency_optimized: bool,
}

impl MobileNetworkOptimizer {
    pub fn new(config: &MobileOptimizerConfig) -> Self {
        Self {
            config: config.clone(),
            aggressive_batching: false,
            latency_optimized: false,
        }
    }
    
    pub async fn get_network_state(&self) -> NetworkState {
        // Simulate network state detection
        NetworkState {
            quality: NetworkQuality::Good,
            bandwidth_estimate: 5.0, // Mbps
            latency_estimate: Duration::from_millis(50),
            is_metered: true,
        }
    }
    
    pub async fn enable_aggressive_batching(&mut self, enable: bool) {
        self.aggressive_batching = enable;
        if enable {
            tracing::info!("Enabled aggressive network batching for power saving");
        }
    }
    
    pub async fn optimize_for_latency(&mut self, optimize: bool) {
        self.latency_optimized = optimize;
        if optimize {
            tracing::info!("Optimized network for lowest latency");
        }
    }
    
    pub async fn minimize_network_activity(&mut self) {
        self.aggressive_batching = true;
        tracing::info!("Minimized network activity for emergency power saving");
    }
    
    pub async fn reset_to_default(&mut self) {
        self.aggressive_batching = false;
        self.latency_optimized = false;
        tracing::info!("Reset network optimization to defaults");
    }
}

/// Background task scheduling and management
pub struct BackgroundTaskScheduler {
    active_tasks: Arc<Mutex<Vec<BackgroundTask>>>,
    task_limit: Arc<Mutex<usize>>,
    config: MobileOptimizerConfig,
}

impl BackgroundTaskScheduler {
    pub fn new(config: &MobileOptimizerConfig) -> Self {
        Self {
            active_tasks: Arc::new(Mutex::new(Vec::new())),
            task_limit: Arc::new(Mutex::new(config.background_task_limit)),
            config: config.clone(),
        }
    }
    
    pub fn active_task_count(&self) -> usize {
        self.active_tasks.lock().len()
    }
    
    pub async fn pause_non_essential_tasks(&self) -> usize {
        let mut tasks = self.active_tasks.lock();
        let mut paused_count = 0;
        
        for task in tasks.iter_mut() {
            if task.priority == TaskPriority::Low || task.priority == TaskPriority::Normal {
                task.paused = true;
                paused_count += 1;
            }
        }
        
        paused_count
    }
    
    pub async fn pause_all_non_critical_tasks(&self) -> usize {
        let mut tasks = self.active_tasks.lock();
        let mut paused_count = 0;
        
        for task in tasks.iter_mut() {
            if task.priority != TaskPriority::Critical {
                task.paused = true;
                paused_count += 1;
            }
        }
        
        paused_count
    }
    
    pub async fn resume_all_tasks(&self) {
        let mut tasks = self.active_tasks.lock();
        for task in tasks.iter_mut() {
            task.paused = false;
        }
    }
    
    pub async fn optimize_task_scheduling(&self) -> usize {
        // Simulate task scheduling optimization
        self.active_tasks.lock().len()
    }
    
    pub async fn increase_task_limit(&self, new_limit: usize) {
        *self.task_limit.lock() = new_limit;
    }
}

// Supporting types and enums

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizationProfile {
    Critical,    // Emergency power saving
    PowerSaver,  // Conservative resource usage
    Balanced,    // Normal operation
    Performance, // Maximum performance
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CpuProfile {
    Emergency,
    PowerSaver,
    Balanced,
    Performance,
}

impl std::fmt::Display for CpuProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CpuProfile::Emergency => write!(f, "Emergency"),
            CpuProfile::PowerSaver => write!(f, "PowerSaver"),
            CpuProfile::Balanced => write!(f, "Balanced"),
            CpuProfile::Performance => write!(f, "Performance"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NetworkQuality {
    Poor,
    Fair, 
    Good,
    Excellent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskPriority {
    Low,
    Normal,
    High,
    Critical,
}

#[derive(Debug, Clone)]
pub struct SystemState {
    pub battery_level: f32,
    pub is_charging: bool,
    pub cpu_temperature: f32,
    pub battery_temperature: f32,
    pub memory_usage: f32,
    pub available_memory: u32,
    pub cpu_usage: f32,
    pub network_quality: NetworkQuality,
    pub background_tasks: usize,
}

#[derive(Debug, Clone)]
pub struct MemoryInfo {
    pub total_mb: u32,
    pub available_mb: u32,
    pub used_mb: u32,
    pub usage_percentage: f32,
}

#[derive(Debug, Clone)]
pub struct NetworkState {
    pub quality: NetworkQuality,
    pub bandwidth_estimate: f64, // Mbps
    pub latency_estimate: Duration,
    pub is_metered: bool,
}

#[derive(Debug, Clone)]
pub struct BackgroundTask {
    pub id: String,
    pub priority: TaskPriority,
    pub paused: bool,
    pub cpu_usage: f32,
    pub memory_usage: u32,
}

#[derive(Debug, Clone)]
pub struct OptimizationReport {
    pub profile_applied: OptimizationProfile,
    pub actions_taken: Vec<String>,
    pub power_savings_estimated: Duration,
    pub optimization_duration: Duration,
}

impl OptimizationReport {
    pub fn new() -> Self {
        Self {
            profile_applied: OptimizationProfile::Balanced,
            actions_taken: Vec::new(),
            power_savings_estimated: Duration::from_secs(0),
            optimization_duration: Duration::from_secs(0),
        }
    }
    
    pub fn merge(&mut self, other: OptimizationReport) {
        self.actions_taken.extend(other.actions_taken);
        self.power_savings_estimated += other.power_savings_estimated;
    }
}

#[derive(Debug, Clone)]
pub struct MobileMetrics {
    pub optimization_cycles: u64,
    pub total_optimization_time: Duration,
    pub profile_usage: FxHashMap<OptimizationProfile, u64>,
    pub battery_levels: Vec<f32>,
    pub cpu_temperatures: Vec<f32>,
    pub memory_usage_history: Vec<f32>,
    pub power_savings_total: Duration,
}

impl MobileMetrics {
    pub fn new() -> Self {
        Self {
            optimization_cycles: 0,
            total_optimization_time: Duration::from_secs(0),
            profile_usage: FxHashMap::default(),
            battery_levels: Vec::new(),
            cpu_temperatures: Vec::new(),
            memory_usage_history: Vec::new(),
            power_savings_total: Duration::from_secs(0),
        }
    }
    
    pub fn update_optimization_cycle(&mut self, duration: Duration, state: &SystemState, profile: &OptimizationProfile) {
        self.optimization_cycles += 1;
        self.total_optimization_time += duration;
        
        *self.profile_usage.entry(*profile).or_insert(0) += 1;
        
        // Keep only last 100 readings to prevent unbounded growth
        if self.battery_levels.len() >= 100 {
            self.battery_levels.remove(0);
        }
        self.battery_levels.push(state.battery_level);
        
        if self.cpu_temperatures.len() >= 100 {
            self.cpu_temperatures.remove(0);
        }
        self.cpu_temperatures.push(state.cpu_temperature);
        
        if self.memory_usage_history.len() >= 100 {
            self.memory_usage_history.remove(0);
        }
        self.memory_usage_history.push(state.memory_usage);
    }
    
    pub fn average_battery_level(&self) -> f32 {
        if self.battery_levels.is_empty() {
            0.0
        } else {
            self.battery_levels.iter().sum::<f32>() / self.battery_levels.len() as f32
        }
    }
    
    pub fn average_cpu_temperature(&self) -> f32 {
        if self.cpu_temperatures.is_empty() {
            0.0
        } else {
            self.cpu_temperatures.iter().sum::<f32>() / self.cpu_temperatures.len() as f32
        }
    }
}