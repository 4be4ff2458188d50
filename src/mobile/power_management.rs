//! Power management for mobile battery optimization

use super::*;
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, interval};

/// Power management system for battery optimization
pub struct PowerManager {
    current_mode: Arc<Mutex<PowerMode>>,
    scan_interval: Arc<Mutex<u32>>,
    platform_config: Arc<Mutex<Option<PlatformConfig>>>,
    optimization_state: Arc<Mutex<OptimizationState>>,
}

#[derive(Clone)]
struct OptimizationState {
    battery_level: Option<f32>,
    is_charging: bool,
    background_restricted: bool,
    doze_mode: bool,
    last_optimization_check: u64,
    scan_duty_cycle: f32, // 0.0 to 1.0
}

impl Default for OptimizationState {
    fn default() -> Self {
        Self {
            battery_level: None,
            is_charging: false,
            background_restricted: false,
            doze_mode: false,
            last_optimization_check: current_timestamp(),
            scan_duty_cycle: 1.0,
        }
    }
}

impl PowerManager {
    /// Create a new power manager with the specified initial mode
    pub fn new(initial_mode: PowerMode) -> Self {
        Self {
            current_mode: Arc::new(Mutex::new(initial_mode)),
            scan_interval: Arc::new(Mutex::new(1000)), // Default 1 second
            platform_config: Arc::new(Mutex::new(None)),
            optimization_state: Arc::new(Mutex::new(OptimizationState::default())),
        }
    }

    /// Set the power management mode
    pub fn set_mode(&self, mode: PowerMode) -> Result<(), BitCrapsError> {
        if let Ok(mut current_mode) = self.current_mode.lock() {
            *current_mode = mode;
        }

        // Apply mode-specific optimizations
        self.apply_power_mode(&mode)?;
        
        log::info!("Power mode set to: {:?}", mode);
        Ok(())
    }

    /// Set the Bluetooth scan interval in milliseconds
    pub fn set_scan_interval(&self, milliseconds: u32) -> Result<(), BitCrapsError> {
        if milliseconds < 100 {
            return Err(BitCrapsError::InvalidInput {
                reason: "Scan interval must be at least 100ms".to_string(),
            });
        }

        if let Ok(mut interval) = self.scan_interval.lock() {
            *interval = milliseconds;
        }

        log::info!("Scan interval set to: {}ms", milliseconds);
        Ok(())
    }

    /// Configure platform-specific power optimizations
    pub fn configure_for_platform(&self, config: &PlatformConfig) -> Result<(), BitCrapsError> {
        if let Ok(mut platform_config) = self.platform_config.lock() {
            *platform_config = Some(config.clone());
        }

        // Apply platform-specific optimizations
        match config.platform {
            PlatformType::Android => self.configure_android_optimizations(config)?,
            PlatformType::Ios => self.configure_ios_optimizations(config)?,
            _ => {
                log::warn!("Platform {:?} does not have specific power optimizations", config.platform);
            }
        }

        Ok(())
    }

    /// Configure discovery parameters for power optimization
    pub async fn configure_discovery(&self, platform_config: &Option<PlatformConfig>) -> Result<(), BitCrapsError> {
        if let Some(config) = platform_config {
            // Adjust scan parameters based on power mode and platform
            let current_mode = *self.current_mode.lock().unwrap();
            
            let (scan_window, scan_interval) = self.calculate_scan_parameters(&current_mode, config);
            
            // Update scan interval
            if let Ok(mut interval) = self.scan_interval.lock() {
                *interval = scan_interval;
            }

            log::info!("Discovery configured: window={}ms, interval={}ms", scan_window, scan_interval);
        }

        Ok(())
    }

    /// Start battery optimization monitoring
    pub async fn start_monitoring(&self) -> Result<(), BitCrapsError> {
        let optimization_state = Arc::clone(&self.optimization_state);
        let current_mode = Arc::clone(&self.current_mode);
        let _scan_interval = Arc::clone(&self.scan_interval);
        
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(60)); // Check every minute
            
            loop {
                interval.tick().await;
                
                // Check battery level and system state
                let battery_info = BatteryInfo {
                    level: Some(0.75),
                    is_charging: false,
                };
                
                // Get background restrictions and doze mode first
                let background_restricted = Self::check_background_restrictions().await;
                let doze_mode = Self::check_doze_mode().await;
                
                if let Ok(mut state) = optimization_state.lock() {
                    state.battery_level = battery_info.level;
                    state.is_charging = battery_info.is_charging;
                    state.background_restricted = background_restricted;
                    state.doze_mode = doze_mode;
                    state.last_optimization_check = current_timestamp();

                    // Adjust optimizations based on current state
                    let mode = *current_mode.lock().unwrap();
                    let new_duty_cycle = Self::calculate_duty_cycle(&mode, &state);
                    
                    if (state.scan_duty_cycle - new_duty_cycle).abs() > 0.1 {
                        state.scan_duty_cycle = new_duty_cycle;
                        log::info!("Adjusted scan duty cycle to: {:.1}%", new_duty_cycle * 100.0);
                    }
                }
            }
        });

        Ok(())
    }

    /// Apply power mode specific optimizations
    fn apply_power_mode(&self, mode: &PowerMode) -> Result<(), BitCrapsError> {
        let base_interval = match mode {
            PowerMode::HighPerformance => 500,   // 0.5 seconds - aggressive scanning
            PowerMode::Balanced => 1000,         // 1 second - normal
            PowerMode::BatterySaver => 2000,     // 2 seconds - conservative
            PowerMode::UltraLowPower => 5000,    // 5 seconds - minimal
        };

        if let Ok(mut interval) = self.scan_interval.lock() {
            *interval = base_interval;
        }

        Ok(())
    }

    /// Configure Android-specific power optimizations
    fn configure_android_optimizations(&self, config: &PlatformConfig) -> Result<(), BitCrapsError> {
        log::info!("Configuring Android power optimizations");
        
        // Android-specific optimizations:
        // 1. Respect Doze mode and App Standby
        // 2. Use foreground service for background scanning
        // 3. Implement adaptive scanning based on battery level
        // 4. Handle background app restrictions

        // Set conservative defaults for Android
        if config.low_power_mode {
            if let Ok(mut interval) = self.scan_interval.lock() {
                *interval = std::cmp::max(*interval, 3000); // At least 3 seconds in low power
            }
        }

        Ok(())
    }

    /// Configure iOS-specific power optimizations
    fn configure_ios_optimizations(&self, config: &PlatformConfig) -> Result<(), BitCrapsError> {
        log::info!("Configuring iOS power optimizations");
        
        // iOS-specific optimizations:
        // 1. Handle background app refresh restrictions
        // 2. Use service UUIDs for background scanning
        // 3. Implement connection interval optimization
        // 4. Handle app state transitions

        // iOS background scanning is heavily restricted
        if config.background_scanning {
            log::warn!("iOS background scanning has severe limitations - consider foreground-only operation");
        }

        Ok(())
    }

    /// Calculate optimal scan parameters based on power mode and platform
    fn calculate_scan_parameters(&self, mode: &PowerMode, config: &PlatformConfig) -> (u32, u32) {
        let base_window = match mode {
            PowerMode::HighPerformance => config.scan_window_ms,
            PowerMode::Balanced => config.scan_window_ms / 2,
            PowerMode::BatterySaver => config.scan_window_ms / 4,
            PowerMode::UltraLowPower => config.scan_window_ms / 8,
        };

        let base_interval = match mode {
            PowerMode::HighPerformance => config.scan_interval_ms,
            PowerMode::Balanced => config.scan_interval_ms * 2,
            PowerMode::BatterySaver => config.scan_interval_ms * 4,
            PowerMode::UltraLowPower => config.scan_interval_ms * 8,
        };

        // Ensure window doesn't exceed interval
        let window = std::cmp::min(base_window, base_interval);
        
        (window, base_interval)
    }

    /// Calculate scan duty cycle based on power mode and battery state
    fn calculate_duty_cycle(mode: &PowerMode, state: &OptimizationState) -> f32 {
        let base_duty_cycle = match mode {
            PowerMode::HighPerformance => 1.0,
            PowerMode::Balanced => 0.7,
            PowerMode::BatterySaver => 0.4,
            PowerMode::UltraLowPower => 0.2,
        };

        let mut duty_cycle: f64 = base_duty_cycle;

        // Adjust based on battery level
        if let Some(battery_level) = state.battery_level {
            if battery_level < 0.2 && !state.is_charging {
                duty_cycle *= 0.5; // Reduce by 50% when battery is low
            } else if battery_level < 0.1 && !state.is_charging {
                duty_cycle *= 0.25; // Reduce by 75% when battery is critically low
            }
        }

        // Further reduce if background restricted or in doze mode
        if state.background_restricted {
            duty_cycle *= 0.3;
        }
        
        if state.doze_mode {
            duty_cycle *= 0.1;
        }

        // Ensure minimum duty cycle
        duty_cycle.max(0.05) as f32 // At least 5% duty cycle
    }

    /// Get current battery information (platform-specific implementation needed)
    pub async fn get_battery_info(&self) -> Result<BatteryInfo, BitCrapsError> {
        // TODO: Implement platform-specific battery info retrieval
        // This would use Android BatteryManager or iOS UIDevice.batteryLevel
        Ok(BatteryInfo {
            level: Some(0.75), // Default to 75%
            is_charging: false,
        })
    }

    /// Get current thermal information (platform-specific implementation needed)
    pub async fn get_thermal_info(&self) -> Result<ThermalInfo, BitCrapsError> {
        // TODO: Implement platform-specific thermal info retrieval
        Ok(ThermalInfo {
            cpu_temperature: 40.0,
            battery_temperature: 35.0,
            ambient_temperature: Some(25.0),
            thermal_state: ThermalState::Normal,
        })
    }

    /// Check if app is restricted in background (Android-specific)
    async fn check_background_restrictions() -> bool {
        // TODO: Implement Android background restriction check
        // This would check if the app is whitelisted from battery optimization
        false
    }

    /// Check if device is in Doze mode (Android-specific)
    async fn check_doze_mode() -> bool {
        // TODO: Implement Android Doze mode detection
        // This would check PowerManager.isDeviceIdleMode()
        false
    }
}

#[derive(Clone)]
pub struct BatteryInfo {
    pub level: Option<f32>, // 0.0 to 1.0, None if unavailable
    pub is_charging: bool,
}

/// Thermal information for mobile devices
#[derive(Debug, Clone)]
pub struct ThermalInfo {
    pub cpu_temperature: f32, // Celsius
    pub battery_temperature: f32, // Celsius
    pub ambient_temperature: Option<f32>, // Celsius
    pub thermal_state: ThermalState,
}

/// Thermal state levels
#[derive(Debug, Clone)]
pub enum ThermalState {
    Normal,
    Warning,
    Critical,
}

/// Battery optimization detector for mobile platforms
pub struct BatteryOptimizationDetector {
    last_scan_time: Arc<Mutex<u64>>,
    expected_interval: Arc<Mutex<u32>>,
    violation_count: Arc<Mutex<u32>>,
}

impl Default for BatteryOptimizationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl BatteryOptimizationDetector {
    pub fn new() -> Self {
        Self {
            last_scan_time: Arc::new(Mutex::new(current_timestamp())),
            expected_interval: Arc::new(Mutex::new(1000)),
            violation_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Report a scan event and detect if battery optimization is interfering
    pub fn report_scan_event(&self) -> Option<String> {
        let now = current_timestamp();
        
        let (last_time, expected_interval) = {
            let last_time = if let Ok(mut last) = self.last_scan_time.lock() {
                let prev = *last;
                *last = now;
                prev
            } else {
                return None;
            };

            let expected_interval = if let Ok(interval) = self.expected_interval.lock() {
                *interval as u64
            } else {
                return None;
            };

            (last_time, expected_interval)
        };

        let actual_interval = (now - last_time) * 1000; // Convert to milliseconds
        let expected_interval_ms = expected_interval;

        // Check if actual interval is significantly longer than expected
        if actual_interval > expected_interval_ms * 3 {
            if let Ok(mut violations) = self.violation_count.lock() {
                *violations += 1;
                
                if *violations >= 5 {
                    return Some(format!(
                        "Battery optimization detected: expected {}ms interval, got {}ms. Consider adding app to battery whitelist.",
                        expected_interval_ms, actual_interval
                    ));
                }
            }
        } else {
            // Reset violation count on successful scan
            if let Ok(mut violations) = self.violation_count.lock() {
                *violations = 0;
            }
        }

        None
    }

    /// Set expected scan interval for detection
    pub fn set_expected_interval(&self, interval_ms: u32) {
        if let Ok(mut expected) = self.expected_interval.lock() {
            *expected = interval_ms;
        }
    }
}