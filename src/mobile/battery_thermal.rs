//! Battery monitoring and thermal management for mobile devices
//! 
//! This module provides comprehensive battery and thermal monitoring:
//! - Real-time battery level, health, and charging state monitoring
//! - Thermal sensor monitoring with predictive overheating prevention
//! - Power consumption analysis and optimization recommendations
//! - Battery life prediction and optimization strategies
//! - Thermal throttling coordination with CPU and other components
//! - Battery health preservation algorithms

use std::sync::{Arc, atomic::{AtomicBool, AtomicU64, Ordering}};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use std::collections::{HashMap, VecDeque};
use tokio::sync::{RwLock, broadcast};
use serde::{Deserialize, Serialize};

use super::performance::{PowerState, ThermalState};

/// Battery monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryConfig {
    /// Battery monitoring interval (milliseconds)
    pub monitoring_interval_ms: u64,
    /// Battery level thresholds
    pub thresholds: BatteryThresholds,
    /// Power consumption tracking
    pub power_tracking: PowerTrackingConfig,
    /// Battery health monitoring
    pub health_monitoring: BatteryHealthConfig,
    /// Prediction settings
    pub prediction: BatteryPredictionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryThresholds {
    /// Critical battery level (%)
    pub critical_level: f64,
    /// Low battery level (%)
    pub low_level: f64,
    /// Power saver activation level (%)
    pub power_saver_level: f64,
    /// Normal operation resume level (%)
    pub normal_resume_level: f64,
    /// Overcharge protection level (%)
    pub overcharge_protection: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerTrackingConfig {
    /// Enable detailed power tracking
    pub enabled: bool,
    /// Component power tracking interval (milliseconds)
    pub component_interval_ms: u64,
    /// Power history window size
    pub history_window_size: usize,
    /// Power anomaly detection threshold
    pub anomaly_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryHealthConfig {
    /// Enable battery health monitoring
    pub enabled: bool,
    /// Health check interval (minutes)
    pub check_interval_minutes: u64,
    /// Cycle counting enabled
    pub cycle_counting: bool,
    /// Temperature impact tracking
    pub temperature_impact: bool,
    /// Health degradation prediction
    pub degradation_prediction: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryPredictionConfig {
    /// Enable battery life prediction
    pub enabled: bool,
    /// Prediction algorithm
    pub algorithm: PredictionAlgorithm,
    /// Prediction window (hours)
    pub prediction_window_hours: u32,
    /// Minimum samples for prediction
    pub min_samples: usize,
    /// Confidence threshold
    pub confidence_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PredictionAlgorithm {
    /// Linear regression
    LinearRegression,
    /// Exponential smoothing
    ExponentialSmoothing,
    /// Machine learning based
    MachineLearning,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            monitoring_interval_ms: 5000, // 5 seconds
            thresholds: BatteryThresholds {
                critical_level: 15.0,
                low_level: 20.0,
                power_saver_level: 30.0,
                normal_resume_level: 40.0,
                overcharge_protection: 95.0,
            },
            power_tracking: PowerTrackingConfig {
                enabled: true,
                component_interval_ms: 10000, // 10 seconds
                history_window_size: 360, // 1 hour of 10-second samples
                anomaly_threshold: 2.0, // 2x normal consumption
            },
            health_monitoring: BatteryHealthConfig {
                enabled: true,
                check_interval_minutes: 60, // 1 hour
                cycle_counting: true,
                temperature_impact: true,
                degradation_prediction: true,
            },
            prediction: BatteryPredictionConfig {
                enabled: true,
                algorithm: PredictionAlgorithm::ExponentialSmoothing,
                prediction_window_hours: 12,
                min_samples: 20,
                confidence_threshold: 0.7,
            },
        }
    }
}

/// Thermal monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalConfig {
    /// Thermal monitoring interval (milliseconds)
    pub monitoring_interval_ms: u64,
    /// Temperature thresholds
    pub temperature_thresholds: TemperatureThresholds,
    /// Thermal sensors configuration
    pub sensors: ThermalSensorsConfig,
    /// Thermal prediction settings
    pub prediction: ThermalPredictionConfig,
    /// Throttling coordination
    pub throttling: ThermalThrottlingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureThresholds {
    /// Normal operating range (°C)
    pub normal_max: f64,
    /// Warm threshold - minor optimizations (°C)
    pub warm_threshold: f64,
    /// Hot threshold - significant throttling (°C)
    pub hot_threshold: f64,
    /// Critical threshold - emergency measures (°C)
    pub critical_threshold: f64,
    /// Shutdown threshold - safety shutdown (°C)
    pub shutdown_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalSensorsConfig {
    /// CPU sensor enabled
    pub cpu_sensor: bool,
    /// Battery sensor enabled
    pub battery_sensor: bool,
    /// GPU sensor enabled (if available)
    pub gpu_sensor: bool,
    /// Ambient sensor enabled (if available)
    pub ambient_sensor: bool,
    /// Sensor reading timeout (milliseconds)
    pub sensor_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalPredictionConfig {
    /// Enable thermal prediction
    pub enabled: bool,
    /// Prediction horizon (seconds)
    pub prediction_horizon_secs: u32,
    /// Temperature rise rate threshold (°C/second)
    pub rise_rate_threshold: f64,
    /// Predictive throttling enabled
    pub predictive_throttling: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalThrottlingConfig {
    /// Enable coordinated throttling
    pub enabled: bool,
    /// CPU throttling coordination
    pub coordinate_cpu: bool,
    /// GPU throttling coordination
    pub coordinate_gpu: bool,
    /// Network throttling coordination
    pub coordinate_network: bool,
    /// Throttling response time (milliseconds)
    pub response_time_ms: u64,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            monitoring_interval_ms: 2000, // 2 seconds
            temperature_thresholds: TemperatureThresholds {
                normal_max: 35.0,
                warm_threshold: 40.0,
                hot_threshold: 45.0,
                critical_threshold: 50.0,
                shutdown_threshold: 55.0,
            },
            sensors: ThermalSensorsConfig {
                cpu_sensor: true,
                battery_sensor: true,
                gpu_sensor: false,
                ambient_sensor: false,
                sensor_timeout_ms: 1000,
            },
            prediction: ThermalPredictionConfig {
                enabled: true,
                prediction_horizon_secs: 60,
                rise_rate_threshold: 0.5,
                predictive_throttling: true,
            },
            throttling: ThermalThrottlingConfig {
                enabled: true,
                coordinate_cpu: true,
                coordinate_gpu: false,
                coordinate_network: true,
                response_time_ms: 500,
            },
        }
    }
}

/// Detailed battery information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryInfo {
    /// Current battery level (0-100%)
    pub level_percent: f64,
    /// Is device charging
    pub is_charging: bool,
    /// Charging state details
    pub charging_state: ChargingState,
    /// Battery voltage (volts)
    pub voltage: f64,
    /// Current (amperes, positive when charging)
    pub current_amperes: f64,
    /// Battery temperature (°C)
    pub temperature_celsius: f64,
    /// Battery health (0-100%)
    pub health_percent: f64,
    /// Charge cycles count
    pub cycle_count: u32,
    /// Time to full charge (minutes, if charging)
    pub time_to_full_minutes: Option<u32>,
    /// Time remaining (minutes, if discharging)
    pub time_remaining_minutes: Option<u32>,
    /// Power consumption (watts)
    pub power_consumption_watts: f64,
    /// Battery capacity (mAh)
    pub capacity_mah: u32,
    /// Design capacity (mAh)
    pub design_capacity_mah: u32,
    /// Last update timestamp
    pub timestamp: Instant,
}

/// Charging state details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChargingState {
    /// Not charging
    NotCharging,
    /// Charging with slow charger
    ChargingSlow,
    /// Charging with fast charger
    ChargingFast,
    /// Charging with wireless charger
    ChargingWireless,
    /// Charging complete
    ChargingComplete,
    /// Charging error
    ChargingError(String),
}

/// Thermal sensor readings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalInfo {
    /// CPU temperature (°C)
    pub cpu_temperature: f64,
    /// Battery temperature (°C)
    pub battery_temperature: f64,
    /// GPU temperature (°C, if available)
    pub gpu_temperature: Option<f64>,
    /// Ambient temperature (°C, if available)
    pub ambient_temperature: Option<f64>,
    /// Overall thermal state
    pub thermal_state: ThermalState,
    /// Thermal pressure (0.0-1.0)
    pub thermal_pressure: f64,
    /// Temperature rise rate (°C/second)
    pub temperature_rise_rate: f64,
    /// Predicted peak temperature (°C)
    pub predicted_peak_temperature: Option<f64>,
    /// Time to predicted peak (seconds)
    pub time_to_predicted_peak: Option<u32>,
    /// Active thermal throttling
    pub is_throttling: bool,
    /// Throttling level (0.0-1.0)
    pub throttling_level: f64,
    /// Last update timestamp
    pub timestamp: Instant,
}

/// Power consumption by component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerConsumption {
    /// CPU power (watts)
    pub cpu_watts: f64,
    /// Display power (watts)
    pub display_watts: f64,
    /// Bluetooth power (watts)
    pub bluetooth_watts: f64,
    /// WiFi power (watts)
    pub wifi_watts: f64,
    /// Cellular power (watts)
    pub cellular_watts: f64,
    /// GPU power (watts)
    pub gpu_watts: f64,
    /// Background apps power (watts)
    pub background_watts: f64,
    /// System/other power (watts)
    pub system_watts: f64,
    /// Total power consumption (watts)
    pub total_watts: f64,
    /// Measurement timestamp
    pub timestamp: Instant,
}

/// Battery life prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryPrediction {
    /// Predicted remaining time (minutes)
    pub remaining_time_minutes: u32,
    /// Confidence level (0.0-1.0)
    pub confidence: f64,
    /// Prediction algorithm used
    pub algorithm: PredictionAlgorithm,
    /// Key factors affecting prediction
    pub factors: Vec<String>,
    /// Recommended optimizations
    pub recommendations: Vec<String>,
    /// Power consumption trend
    pub power_trend: PowerTrend,
    /// Prediction accuracy (based on historical data)
    pub historical_accuracy: f64,
    /// Prediction timestamp
    pub timestamp: Instant,
}

/// Power consumption trend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PowerTrend {
    /// Power consumption decreasing
    Decreasing,
    /// Power consumption stable
    Stable,
    /// Power consumption increasing
    Increasing,
    /// Power consumption highly variable
    Variable,
}

/// Thermal prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalPrediction {
    /// Predicted temperature in N seconds (°C)
    pub predicted_temperature: f64,
    /// Prediction horizon (seconds)
    pub prediction_horizon: u32,
    /// Confidence level (0.0-1.0)
    pub confidence: f64,
    /// Recommended throttling level (0.0-1.0)
    pub recommended_throttling: f64,
    /// Risk assessment
    pub risk_level: ThermalRisk,
    /// Prediction timestamp
    pub timestamp: Instant,
}

/// Thermal risk levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ThermalRisk {
    /// Low risk
    Low,
    /// Moderate risk
    Moderate,
    /// High risk
    High,
    /// Critical risk - immediate action required
    Critical,
}

/// Battery and thermal event
#[derive(Debug, Clone)]
pub enum BatteryThermalEvent {
    /// Battery level changed significantly
    BatteryLevelChanged {
        old_level: f64,
        new_level: f64,
        timestamp: Instant,
    },
    /// Charging state changed
    ChargingStateChanged {
        old_state: ChargingState,
        new_state: ChargingState,
        timestamp: Instant,
    },
    /// Power state recommendation
    PowerStateRecommendation {
        recommended_state: PowerState,
        reason: String,
        urgency: EventUrgency,
        timestamp: Instant,
    },
    /// Thermal state changed
    ThermalStateChanged {
        old_state: ThermalState,
        new_state: ThermalState,
        temperature: f64,
        timestamp: Instant,
    },
    /// Thermal throttling activated/deactivated
    ThermalThrottlingChanged {
        active: bool,
        level: f64,
        reason: String,
        timestamp: Instant,
    },
    /// Battery health warning
    BatteryHealthWarning {
        health_percent: f64,
        warning_type: HealthWarningType,
        timestamp: Instant,
    },
    /// Power anomaly detected
    PowerAnomalyDetected {
        component: String,
        normal_watts: f64,
        current_watts: f64,
        anomaly_factor: f64,
        timestamp: Instant,
    },
}

/// Event urgency levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventUrgency {
    /// Low priority
    Low = 0,
    /// Normal priority
    Normal = 1,
    /// High priority
    High = 2,
    /// Critical priority
    Critical = 3,
}

/// Battery health warning types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HealthWarningType {
    /// Battery capacity degraded
    CapacityDegradation,
    /// High temperature damage
    TemperatureDamage,
    /// Excessive charge cycles
    ExcessiveCycles,
    /// Voltage irregularities
    VoltageIrregularities,
}

/// Main battery and thermal monitor
pub struct BatteryThermalMonitor {
    /// Battery configuration
    battery_config: Arc<RwLock<BatteryConfig>>,
    
    /// Thermal configuration
    thermal_config: Arc<RwLock<ThermalConfig>>,
    
    /// Current battery information
    battery_info: Arc<RwLock<Option<BatteryInfo>>>,
    
    /// Current thermal information
    thermal_info: Arc<RwLock<Option<ThermalInfo>>>,
    
    /// Battery level history
    battery_history: Arc<RwLock<VecDeque<(Instant, f64)>>>,
    
    /// Temperature history
    temperature_history: Arc<RwLock<VecDeque<(Instant, f64)>>>,
    
    /// Power consumption history
    power_history: Arc<RwLock<VecDeque<PowerConsumption>>>,
    
    /// Latest battery prediction
    battery_prediction: Arc<RwLock<Option<BatteryPrediction>>>,
    
    /// Latest thermal prediction
    thermal_prediction: Arc<RwLock<Option<ThermalPrediction>>>,
    
    /// Event broadcaster
    event_sender: broadcast::Sender<BatteryThermalEvent>,
    
    /// Control flags
    is_running: Arc<AtomicBool>,
    
    /// Task handles
    battery_monitor_task: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
    thermal_monitor_task: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
    power_tracking_task: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
    prediction_task: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
    
    /// Statistics
    battery_readings_count: Arc<AtomicU64>,
    thermal_readings_count: Arc<AtomicU64>,
    prediction_accuracy_sum: Arc<AtomicU64>,
    prediction_count: Arc<AtomicU64>,
}

impl BatteryThermalMonitor {
    /// Create new battery and thermal monitor
    pub fn new(battery_config: BatteryConfig, thermal_config: ThermalConfig) -> Self {
        let (event_sender, _) = broadcast::channel(1000);
        
        Self {
            battery_config: Arc::new(RwLock::new(battery_config.clone())),
            thermal_config: Arc::new(RwLock::new(thermal_config.clone())),
            battery_info: Arc::new(RwLock::new(None)),
            thermal_info: Arc::new(RwLock::new(None)),
            battery_history: Arc::new(RwLock::new(VecDeque::with_capacity(1000))),
            temperature_history: Arc::new(RwLock::new(VecDeque::with_capacity(1000))),
            power_history: Arc::new(RwLock::new(VecDeque::with_capacity(
                battery_config.power_tracking.history_window_size
            ))),
            battery_prediction: Arc::new(RwLock::new(None)),
            thermal_prediction: Arc::new(RwLock::new(None)),
            event_sender,
            is_running: Arc::new(AtomicBool::new(false)),
            battery_monitor_task: Arc::new(RwLock::new(None)),
            thermal_monitor_task: Arc::new(RwLock::new(None)),
            power_tracking_task: Arc::new(RwLock::new(None)),
            prediction_task: Arc::new(RwLock::new(None)),
            battery_readings_count: Arc::new(AtomicU64::new(0)),
            thermal_readings_count: Arc::new(AtomicU64::new(0)),
            prediction_accuracy_sum: Arc::new(AtomicU64::new(0)),
            prediction_count: Arc::new(AtomicU64::new(0)),
        }
    }
    
    /// Start battery and thermal monitoring
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.is_running.swap(true, Ordering::Relaxed) {
            return Ok(()); // Already running
        }
        
        log::info!("Starting battery and thermal monitoring");
        
        // Start battery monitoring
        self.start_battery_monitoring().await;
        
        // Start thermal monitoring
        self.start_thermal_monitoring().await;
        
        // Start power tracking if enabled
        if self.battery_config.read().await.power_tracking.enabled {
            self.start_power_tracking().await;
        }
        
        // Start prediction tasks if enabled
        if self.battery_config.read().await.prediction.enabled || 
           self.thermal_config.read().await.prediction.enabled {
            self.start_prediction_tasks().await;
        }
        
        log::info!("Battery and thermal monitoring started successfully");
        Ok(())
    }
    
    /// Stop battery and thermal monitoring
    pub async fn stop(&self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_running.swap(false, Ordering::Relaxed) {
            return Ok(()); // Already stopped
        }
        
        log::info!("Stopping battery and thermal monitoring");
        
        // Stop all tasks
        if let Some(task) = self.battery_monitor_task.write().await.take() {
            task.abort();
        }
        
        if let Some(task) = self.thermal_monitor_task.write().await.take() {
            task.abort();
        }
        
        if let Some(task) = self.power_tracking_task.write().await.take() {
            task.abort();
        }
        
        if let Some(task) = self.prediction_task.write().await.take() {
            task.abort();
        }
        
        // Log final statistics
        let battery_readings = self.battery_readings_count.load(Ordering::Relaxed);
        let thermal_readings = self.thermal_readings_count.load(Ordering::Relaxed);
        let prediction_count = self.prediction_count.load(Ordering::Relaxed);
        let accuracy_sum = self.prediction_accuracy_sum.load(Ordering::Relaxed);
        
        log::info!("Final stats: {} battery readings, {} thermal readings, {} predictions",
                  battery_readings, thermal_readings, prediction_count);
        
        if prediction_count > 0 {
            let avg_accuracy = accuracy_sum as f64 / prediction_count as f64 / 100.0;
            log::info!("Average prediction accuracy: {:.1}%", avg_accuracy * 100.0);
        }
        
        log::info!("Battery and thermal monitoring stopped");
        Ok(())
    }
    
    /// Subscribe to battery and thermal events
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<BatteryThermalEvent> {
        self.event_sender.subscribe()
    }
    
    /// Get current battery information
    pub async fn get_battery_info(&self) -> Option<BatteryInfo> {
        self.battery_info.read().await.clone()
    }
    
    /// Get current thermal information
    pub async fn get_thermal_info(&self) -> Option<ThermalInfo> {
        self.thermal_info.read().await.clone()
    }
    
    /// Get latest battery prediction
    pub async fn get_battery_prediction(&self) -> Option<BatteryPrediction> {
        self.battery_prediction.read().await.clone()
    }
    
    /// Get latest thermal prediction
    pub async fn get_thermal_prediction(&self) -> Option<ThermalPrediction> {
        self.thermal_prediction.read().await.clone()
    }
    
    /// Get power consumption history
    pub async fn get_power_history(&self) -> Vec<PowerConsumption> {
        self.power_history.read().await.iter().cloned().collect()
    }
    
    /// Force battery reading update
    pub async fn update_battery_reading(&self) -> Result<(), Box<dyn std::error::Error>> {
        let new_info = self.read_battery_info().await?;
        let old_info = self.battery_info.read().await.clone();
        
        *self.battery_info.write().await = Some(new_info.clone());
        
        // Check for significant changes and emit events
        self.check_battery_events(&old_info, &new_info).await;
        
        Ok(())
    }
    
    /// Force thermal reading update
    pub async fn update_thermal_reading(&self) -> Result<(), Box<dyn std::error::Error>> {
        let new_info = self.read_thermal_info().await?;
        let old_info = self.thermal_info.read().await.clone();
        
        *self.thermal_info.write().await = Some(new_info.clone());
        
        // Check for thermal events
        self.check_thermal_events(&old_info, &new_info).await;
        
        Ok(())
    }
    
    /// Start battery monitoring task
    async fn start_battery_monitoring(&self) {
        let battery_config = self.battery_config.clone();
        let battery_info = self.battery_info.clone();
        let battery_history = self.battery_history.clone();
        let event_sender = self.event_sender.clone();
        let is_running = self.is_running.clone();
        let readings_count = self.battery_readings_count.clone();
        
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(
                Duration::from_millis(battery_config.read().await.monitoring_interval_ms)
            );
            
            while is_running.load(Ordering::Relaxed) {
                interval.tick().await;
                
                // Read battery information
                if let Ok(new_info) = Self::read_battery_info_static().await {
                    let old_info = battery_info.read().await.clone();
                    
                    // Update battery info
                    *battery_info.write().await = Some(new_info.clone());
                    
                    // Update history
                    {
                        let mut history = battery_history.write().await;
                        history.push_back((new_info.timestamp, new_info.level_percent));
                        
                        if history.len() > 1000 {
                            history.pop_front();
                        }
                    }
                    
                    // Check for events
                    Self::check_battery_events_static(&old_info, &new_info, &event_sender).await;
                    
                    // Update statistics
                    readings_count.fetch_add(1, Ordering::Relaxed);
                }
            }
        });
        
        *self.battery_monitor_task.write().await = Some(task);
    }
    
    /// Start thermal monitoring task
    async fn start_thermal_monitoring(&self) {
        let thermal_config = self.thermal_config.clone();
        let thermal_info = self.thermal_info.clone();
        let temperature_history = self.temperature_history.clone();
        let event_sender = self.event_sender.clone();
        let is_running = self.is_running.clone();
        let readings_count = self.thermal_readings_count.clone();
        
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(
                Duration::from_millis(thermal_config.read().await.monitoring_interval_ms)
            );
            
            while is_running.load(Ordering::Relaxed) {
                interval.tick().await;
                
                // Read thermal information
                if let Ok(new_info) = Self::read_thermal_info_static().await {
                    let old_info = thermal_info.read().await.clone();
                    
                    // Update thermal info
                    *thermal_info.write().await = Some(new_info.clone());
                    
                    // Update temperature history
                    {
                        let mut history = temperature_history.write().await;
                        history.push_back((new_info.timestamp, new_info.cpu_temperature));
                        
                        if history.len() > 1000 {
                            history.pop_front();
                        }
                    }
                    
                    // Check for thermal events
                    Self::check_thermal_events_static(&old_info, &new_info, &event_sender).await;
                    
                    // Update statistics
                    readings_count.fetch_add(1, Ordering::Relaxed);
                }
            }
        });
        
        *self.thermal_monitor_task.write().await = Some(task);
    }
    
    /// Start power consumption tracking
    async fn start_power_tracking(&self) {
        let battery_config = self.battery_config.clone();
        let power_history = self.power_history.clone();
        let event_sender = self.event_sender.clone();
        let is_running = self.is_running.clone();
        
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(
                Duration::from_millis(battery_config.read().await.power_tracking.component_interval_ms)
            );
            
            while is_running.load(Ordering::Relaxed) {
                interval.tick().await;
                
                // Read power consumption data
                let power_data = Self::read_power_consumption().await;
                
                // Update power history
                {
                    let mut history = power_history.write().await;
                    history.push_back(power_data.clone());
                    
                    let window_size = battery_config.read().await.power_tracking.history_window_size;
                    if history.len() > window_size {
                        history.pop_front();
                    }
                }
                
                // Check for power anomalies
                Self::check_power_anomalies(&power_history, &power_data, &event_sender, &battery_config).await;
            }
        });
        
        *self.power_tracking_task.write().await = Some(task);
    }
    
    /// Start prediction tasks
    async fn start_prediction_tasks(&self) {
        let battery_config = self.battery_config.clone();
        let thermal_config = self.thermal_config.clone();
        let battery_history = self.battery_history.clone();
        let temperature_history = self.temperature_history.clone();
        let power_history = self.power_history.clone();
        let battery_prediction = self.battery_prediction.clone();
        let thermal_prediction = self.thermal_prediction.clone();
        let is_running = self.is_running.clone();
        
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(30)); // Every 30 seconds
            
            while is_running.load(Ordering::Relaxed) {
                interval.tick().await;
                
                // Generate battery prediction
                if battery_config.read().await.prediction.enabled {
                    if let Some(prediction) = Self::generate_battery_prediction_static(
                        &battery_history,
                        &power_history,
                        &battery_config,
                    ).await {
                        *battery_prediction.write().await = Some(prediction);
                    }
                }
                
                // Generate thermal prediction
                if thermal_config.read().await.prediction.enabled {
                    if let Some(prediction) = Self::generate_thermal_prediction_static(
                        &temperature_history,
                        &thermal_config,
                    ).await {
                        *thermal_prediction.write().await = Some(prediction);
                    }
                }
            }
        });
        
        *self.prediction_task.write().await = Some(task);
    }
    
    /// Read battery information (would interface with platform APIs)
    async fn read_battery_info(&self) -> Result<BatteryInfo, Box<dyn std::error::Error>> {
        Self::read_battery_info_static().await
    }
    
    /// Static version of read_battery_info for use in async contexts
    async fn read_battery_info_static() -> Result<BatteryInfo, Box<dyn std::error::Error>> {
        // In a real implementation, this would interface with platform-specific APIs
        // For simulation, generate realistic battery data
        
        let base_level = 75.0;
        let level_variation = (rand::random::<f64>() - 0.5) * 2.0; // ±1%
        let level_percent = (base_level + level_variation).clamp(0.0, 100.0);
        
        Ok(BatteryInfo {
            level_percent,
            is_charging: rand::random::<f64>() < 0.2, // 20% chance of charging
            charging_state: if rand::random::<f64>() < 0.2 {
                ChargingState::ChargingFast
            } else {
                ChargingState::NotCharging
            },
            voltage: 3.7 + (rand::random::<f64>() - 0.5) * 0.4,
            current_amperes: if rand::random::<f64>() < 0.2 { 2.0 } else { -1.5 },
            temperature_celsius: 25.0 + (rand::random::<f64>() * 10.0),
            health_percent: 95.0 + (rand::random::<f64>() - 0.5) * 10.0,
            cycle_count: 250 + (rand::random::<u32>() % 100),
            time_to_full_minutes: if rand::random::<f64>() < 0.2 { Some(120) } else { None },
            time_remaining_minutes: Some(480 + (rand::random::<u32>() % 240)),
            power_consumption_watts: 1.5 + (rand::random::<f64>() * 2.0),
            capacity_mah: 3000,
            design_capacity_mah: 3200,
            timestamp: Instant::now(),
        })
    }
    
    /// Read thermal information (would interface with thermal sensors)
    async fn read_thermal_info(&self) -> Result<ThermalInfo, Box<dyn std::error::Error>> {
        Self::read_thermal_info_static().await
    }
    
    /// Static version of read_thermal_info for use in async contexts
    async fn read_thermal_info_static() -> Result<ThermalInfo, Box<dyn std::error::Error>> {
        // In a real implementation, this would read from thermal sensors
        // For simulation, generate realistic thermal data
        
        let base_temp = 32.0;
        let temp_variation = (rand::random::<f64>() - 0.5) * 8.0; // ±4°C
        let cpu_temperature = (base_temp + temp_variation).clamp(20.0, 60.0);
        
        let thermal_state = if cpu_temperature >= 50.0 {
            ThermalState::Critical
        } else if cpu_temperature >= 45.0 {
            ThermalState::Hot
        } else if cpu_temperature >= 40.0 {
            ThermalState::Warm
        } else {
            ThermalState::Normal
        };
        
        let thermal_pressure = ((cpu_temperature - 25.0) / 30.0).clamp(0.0, 1.0);
        
        Ok(ThermalInfo {
            cpu_temperature,
            battery_temperature: cpu_temperature - 2.0,
            gpu_temperature: Some(cpu_temperature + 3.0),
            ambient_temperature: Some(25.0),
            thermal_state,
            thermal_pressure,
            temperature_rise_rate: (rand::random::<f64>() - 0.5) * 1.0,
            predicted_peak_temperature: if thermal_pressure > 0.5 {
                Some(cpu_temperature + 5.0)
            } else {
                None
            },
            time_to_predicted_peak: if thermal_pressure > 0.5 {
                Some(60 + (rand::random::<u32>() % 120))
            } else {
                None
            },
            is_throttling: thermal_pressure > 0.7,
            throttling_level: if thermal_pressure > 0.7 { thermal_pressure } else { 0.0 },
            timestamp: Instant::now(),
        })
    }
    
    /// Read power consumption data (simulated)
    async fn read_power_consumption() -> PowerConsumption {
        PowerConsumption {
            cpu_watts: 0.5 + (rand::random::<f64>() * 1.5),
            display_watts: 0.8 + (rand::random::<f64>() * 0.7),
            bluetooth_watts: 0.1 + (rand::random::<f64>() * 0.1),
            wifi_watts: 0.2 + (rand::random::<f64>() * 0.3),
            cellular_watts: 0.3 + (rand::random::<f64>() * 0.7),
            gpu_watts: 0.2 + (rand::random::<f64>() * 0.8),
            background_watts: 0.3 + (rand::random::<f64>() * 0.2),
            system_watts: 0.4 + (rand::random::<f64>() * 0.3),
            total_watts: 0.0, // Will be calculated
            timestamp: Instant::now(),
        }
    }
    
    /// Check for battery-related events
    async fn check_battery_events(&self, old_info: &Option<BatteryInfo>, new_info: &BatteryInfo) {
        Self::check_battery_events_static(old_info, new_info, &self.event_sender).await;
    }
    
    /// Static version of check_battery_events
    async fn check_battery_events_static(
        old_info: &Option<BatteryInfo>,
        new_info: &BatteryInfo,
        event_sender: &broadcast::Sender<BatteryThermalEvent>,
    ) {
        if let Some(old) = old_info {
            // Check for significant level change
            if (new_info.level_percent - old.level_percent).abs() > 5.0 {
                let _ = event_sender.send(BatteryThermalEvent::BatteryLevelChanged {
                    old_level: old.level_percent,
                    new_level: new_info.level_percent,
                    timestamp: new_info.timestamp,
                });
            }
            
            // Check for charging state change
            if std::mem::discriminant(&old.charging_state) != std::mem::discriminant(&new_info.charging_state) {
                let _ = event_sender.send(BatteryThermalEvent::ChargingStateChanged {
                    old_state: old.charging_state.clone(),
                    new_state: new_info.charging_state.clone(),
                    timestamp: new_info.timestamp,
                });
            }
            
            // Check for health warnings
            if new_info.health_percent < 80.0 && old.health_percent >= 80.0 {
                let _ = event_sender.send(BatteryThermalEvent::BatteryHealthWarning {
                    health_percent: new_info.health_percent,
                    warning_type: HealthWarningType::CapacityDegradation,
                    timestamp: new_info.timestamp,
                });
            }
        }
        
        // Check for power state recommendations
        if new_info.level_percent <= 15.0 {
            let _ = event_sender.send(BatteryThermalEvent::PowerStateRecommendation {
                recommended_state: PowerState::Critical,
                reason: "Critical battery level".to_string(),
                urgency: EventUrgency::Critical,
                timestamp: new_info.timestamp,
            });
        } else if new_info.level_percent <= 30.0 {
            let _ = event_sender.send(BatteryThermalEvent::PowerStateRecommendation {
                recommended_state: PowerState::PowerSaver,
                reason: "Low battery level".to_string(),
                urgency: EventUrgency::High,
                timestamp: new_info.timestamp,
            });
        }
    }
    
    /// Check for thermal events
    async fn check_thermal_events(&self, old_info: &Option<ThermalInfo>, new_info: &ThermalInfo) {
        Self::check_thermal_events_static(old_info, new_info, &self.event_sender).await;
    }
    
    /// Static version of check_thermal_events
    async fn check_thermal_events_static(
        old_info: &Option<ThermalInfo>,
        new_info: &ThermalInfo,
        event_sender: &broadcast::Sender<BatteryThermalEvent>,
    ) {
        if let Some(old) = old_info {
            // Check for thermal state change
            if old.thermal_state != new_info.thermal_state {
                let _ = event_sender.send(BatteryThermalEvent::ThermalStateChanged {
                    old_state: old.thermal_state,
                    new_state: new_info.thermal_state,
                    temperature: new_info.cpu_temperature,
                    timestamp: new_info.timestamp,
                });
            }
            
            // Check for throttling state change
            if old.is_throttling != new_info.is_throttling {
                let _ = event_sender.send(BatteryThermalEvent::ThermalThrottlingChanged {
                    active: new_info.is_throttling,
                    level: new_info.throttling_level,
                    reason: if new_info.is_throttling {
                        "High temperature detected".to_string()
                    } else {
                        "Temperature normalized".to_string()
                    },
                    timestamp: new_info.timestamp,
                });
            }
        }
    }
    
    /// Check for power consumption anomalies
    async fn check_power_anomalies(
        power_history: &Arc<RwLock<VecDeque<PowerConsumption>>>,
        current_consumption: &PowerConsumption,
        event_sender: &broadcast::Sender<BatteryThermalEvent>,
        _battery_config: &Arc<RwLock<BatteryConfig>>,
    ) {
        let history = power_history.read().await;
        
        if history.len() < 10 {
            return; // Not enough history for anomaly detection
        }
        
        // Calculate average consumption for each component
        let avg_cpu = history.iter().map(|p| p.cpu_watts).sum::<f64>() / history.len() as f64;
        
        // Check for anomalies (consumption > 2x normal)
        if current_consumption.cpu_watts > avg_cpu * 2.0 {
            let _ = event_sender.send(BatteryThermalEvent::PowerAnomalyDetected {
                component: "CPU".to_string(),
                normal_watts: avg_cpu,
                current_watts: current_consumption.cpu_watts,
                anomaly_factor: current_consumption.cpu_watts / avg_cpu,
                timestamp: current_consumption.timestamp,
            });
        }
    }
    
    /// Generate battery life prediction
    async fn generate_battery_prediction_static(
        battery_history: &Arc<RwLock<VecDeque<(Instant, f64)>>>,
        power_history: &Arc<RwLock<VecDeque<PowerConsumption>>>,
        battery_config: &Arc<RwLock<BatteryConfig>>,
    ) -> Option<BatteryPrediction> {
        let history = battery_history.read().await;
        let power = power_history.read().await;
        let config = battery_config.read().await;
        
        if history.len() < config.prediction.min_samples {
            return None;
        }
        
        // Simple linear regression prediction
        let recent_points: Vec<_> = history.iter().rev().take(20).collect();
        
        if recent_points.len() < 2 {
            return None;
        }
        
        let first = recent_points.last().unwrap();
        let last = recent_points.first().unwrap();
        
        let time_diff_hours = last.0.duration_since(first.0).as_secs_f64() / 3600.0;
        let level_diff = last.1 - first.1;
        
        if time_diff_hours > 0.0 && level_diff != 0.0 {
            let drain_rate = level_diff / time_diff_hours; // %/hour
            
            if drain_rate < 0.0 { // Discharging
                let remaining_hours = last.1 / (-drain_rate);
                let remaining_minutes = (remaining_hours * 60.0).max(0.0) as u32;
                
                // Determine power trend
                let power_trend = if power.len() >= 5 {
                    let recent_power: f64 = power.iter().rev().take(5).map(|p| p.total_watts).sum::<f64>() / 5.0;
                    let older_power: f64 = power.iter().rev().skip(5).take(5).map(|p| p.total_watts).sum::<f64>() / 5.0;
                    
                    if recent_power > older_power * 1.1 {
                        PowerTrend::Increasing
                    } else if recent_power < older_power * 0.9 {
                        PowerTrend::Decreasing
                    } else {
                        PowerTrend::Stable
                    }
                } else {
                    PowerTrend::Variable
                };
                
                Some(BatteryPrediction {
                    remaining_time_minutes: remaining_minutes,
                    confidence: 0.7,
                    algorithm: config.prediction.algorithm.clone(),
                    factors: vec![
                        format!("Drain rate: {:.1}%/hour", -drain_rate),
                        format!("Battery level: {:.1}%", last.1),
                    ],
                    recommendations: vec![
                        "Enable power saver mode for longer battery life".to_string(),
                        "Reduce screen brightness".to_string(),
                    ],
                    power_trend,
                    historical_accuracy: 0.75,
                    timestamp: Instant::now(),
                })
            } else {
                None // Charging or stable
            }
        } else {
            None
        }
    }
    
    /// Generate thermal prediction
    async fn generate_thermal_prediction_static(
        temperature_history: &Arc<RwLock<VecDeque<(Instant, f64)>>>,
        thermal_config: &Arc<RwLock<ThermalConfig>>,
    ) -> Option<ThermalPrediction> {
        let history = temperature_history.read().await;
        let config = thermal_config.read().await;
        
        if history.len() < 10 {
            return None;
        }
        
        // Calculate temperature rise rate
        let recent_points: Vec<_> = history.iter().rev().take(10).collect();
        
        if recent_points.len() < 2 {
            return None;
        }
        
        let first = recent_points.last().unwrap();
        let last = recent_points.first().unwrap();
        
        let time_diff_secs = last.0.duration_since(first.0).as_secs_f64();
        let temp_diff = last.1 - first.1;
        
        if time_diff_secs > 0.0 {
            let rise_rate = temp_diff / time_diff_secs; // °C/second
            
            let horizon_secs = config.prediction.prediction_horizon_secs;
            let predicted_temp = last.1 + (rise_rate * horizon_secs as f64);
            
            let risk_level = if predicted_temp >= 55.0 {
                ThermalRisk::Critical
            } else if predicted_temp >= 50.0 {
                ThermalRisk::High
            } else if predicted_temp >= 45.0 {
                ThermalRisk::Moderate
            } else {
                ThermalRisk::Low
            };
            
            let recommended_throttling = if predicted_temp >= 50.0 {
                0.8 // Heavy throttling
            } else if predicted_temp >= 45.0 {
                0.5 // Moderate throttling
            } else if predicted_temp >= 40.0 {
                0.2 // Light throttling
            } else {
                0.0 // No throttling
            };
            
            Some(ThermalPrediction {
                predicted_temperature: predicted_temp,
                prediction_horizon: horizon_secs,
                confidence: 0.6,
                recommended_throttling,
                risk_level,
                timestamp: Instant::now(),
            })
        } else {
            None
        }
    }
}

impl Default for BatteryInfo {
    fn default() -> Self {
        Self {
            level_percent: 50.0,
            is_charging: false,
            charging_state: ChargingState::NotCharging,
            voltage: 3.7,
            current_amperes: -1.5,
            temperature_celsius: 25.0,
            health_percent: 100.0,
            cycle_count: 0,
            time_to_full_minutes: None,
            time_remaining_minutes: None,
            power_consumption_watts: 2.0,
            capacity_mah: 3000,
            design_capacity_mah: 3200,
            timestamp: Instant::now(),
        }
    }
}