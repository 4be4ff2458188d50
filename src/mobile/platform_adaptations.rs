//! Platform-specific adaptations for mobile devices

use super::*;
use serde::{Deserialize, Serialize};

/// Platform type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlatformType {
    Android,
    Ios,
    Desktop,
    Web,
    Unknown,
}

/// Platform adaptation manager for handling platform-specific behavior
pub struct PlatformAdaptationManager {
    platform_type: PlatformType,
    android_adapter: Option<AndroidAdapter>,
    ios_adapter: Option<IOSAdapter>,
}

impl Default for PlatformAdaptationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformAdaptationManager {
    /// Create a new platform adaptation manager
    pub fn new() -> Self {
        let platform_type = PlatformDetection::detect_platform();

        let android_adapter = if matches!(platform_type, PlatformType::Android) {
            Some(AndroidAdapter::new())
        } else {
            None
        };

        let ios_adapter = if matches!(platform_type, PlatformType::Ios) {
            Some(IOSAdapter::new())
        } else {
            None
        };

        Self {
            platform_type,
            android_adapter,
            ios_adapter,
        }
    }

    /// Initialize platform-specific features
    pub async fn initialize(&self) -> Result<(), BitCrapsError> {
        match self.platform_type {
            PlatformType::Android => {
                if let Some(adapter) = &self.android_adapter {
                    adapter.initialize().await?;
                }
            }
            PlatformType::Ios => {
                if let Some(adapter) = &self.ios_adapter {
                    adapter.initialize().await?;
                }
            }
            _ => {
                log::info!(
                    "No platform-specific initialization needed for {:?}",
                    self.platform_type
                );
            }
        }

        Ok(())
    }

    /// Handle app lifecycle changes
    pub async fn handle_lifecycle_change(
        &self,
        state: AppLifecycleState,
    ) -> Result<(), BitCrapsError> {
        match self.platform_type {
            PlatformType::Android => {
                if let Some(adapter) = &self.android_adapter {
                    adapter.handle_lifecycle_change(state).await?;
                }
            }
            PlatformType::Ios => {
                if let Some(adapter) = &self.ios_adapter {
                    adapter.handle_lifecycle_change(state).await?;
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Request required permissions
    pub async fn request_permissions(&self) -> Result<PermissionStatus, BitCrapsError> {
        match self.platform_type {
            PlatformType::Android => {
                if let Some(adapter) = &self.android_adapter {
                    adapter.request_permissions().await
                } else {
                    Ok(PermissionStatus::Granted)
                }
            }
            PlatformType::Ios => {
                if let Some(adapter) = &self.ios_adapter {
                    adapter.request_permissions().await
                } else {
                    Ok(PermissionStatus::Granted)
                }
            }
            _ => Ok(PermissionStatus::Granted),
        }
    }

    /// Configure for battery optimization
    pub async fn configure_battery_optimization(&self) -> Result<(), BitCrapsError> {
        match self.platform_type {
            PlatformType::Android => {
                if let Some(adapter) = &self.android_adapter {
                    adapter.configure_battery_optimization().await?;
                }
            }
            PlatformType::Ios => {
                if let Some(adapter) = &self.ios_adapter {
                    adapter.configure_battery_optimization().await?;
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Get platform-specific Bluetooth configuration
    pub fn get_bluetooth_config(&self) -> BluetoothPlatformConfig {
        match self.platform_type {
            PlatformType::Android => {
                if let Some(adapter) = &self.android_adapter {
                    adapter.get_bluetooth_config()
                } else {
                    BluetoothPlatformConfig::default_android()
                }
            }
            PlatformType::Ios => {
                if let Some(adapter) = &self.ios_adapter {
                    adapter.get_bluetooth_config()
                } else {
                    BluetoothPlatformConfig::default_ios()
                }
            }
            _ => BluetoothPlatformConfig::default_desktop(),
        }
    }

    /// Check if background operation is available
    pub async fn is_background_operation_available(&self) -> bool {
        match self.platform_type {
            PlatformType::Android => {
                if let Some(adapter) = &self.android_adapter {
                    adapter.is_background_operation_available().await
                } else {
                    false
                }
            }
            PlatformType::Ios => {
                if let Some(adapter) = &self.ios_adapter {
                    adapter.is_background_operation_available().await
                } else {
                    false
                }
            }
            _ => true, // Desktop platforms generally support background operation
        }
    }
}

/// Android-specific adapter
struct AndroidAdapter {
    // JNI interface for Android-specific operations
}

impl AndroidAdapter {
    fn new() -> Self {
        Self {}
    }

    async fn initialize(&self) -> Result<(), BitCrapsError> {
        log::info!("Initializing Android-specific features");

        // Initialize logging
        #[cfg(target_os = "android")]
        {
            android_logger::init_once(
                android_logger::Config::default()
                    .with_min_level(log::Level::Info)
                    .with_tag("BitCraps"),
            );
        }

        // Configure foreground service
        self.configure_foreground_service().await?;

        Ok(())
    }

    async fn handle_lifecycle_change(&self, state: AppLifecycleState) -> Result<(), BitCrapsError> {
        match state {
            AppLifecycleState::Foreground => {
                log::info!("App moved to foreground - enabling full features");
                // Enable full scanning and networking
            }
            AppLifecycleState::Background => {
                log::info!("App moved to background - enabling power saving");
                // Switch to background service mode
                self.enable_background_service().await?;
            }
            AppLifecycleState::Suspended => {
                log::info!("App suspended - minimal operation");
                // Stop non-essential operations
            }
        }

        Ok(())
    }

    async fn request_permissions(&self) -> Result<PermissionStatus, BitCrapsError> {
        // TODO: Implement via JNI calls to Android permission system
        log::info!("Requesting Android permissions");

        let required_permissions = [
            "android.permission.BLUETOOTH",
            "android.permission.BLUETOOTH_ADMIN",
            "android.permission.BLUETOOTH_ADVERTISE",
            "android.permission.BLUETOOTH_CONNECT",
            "android.permission.BLUETOOTH_SCAN",
            "android.permission.ACCESS_FINE_LOCATION",
            "android.permission.POST_NOTIFICATIONS",
        ];

        // For now, assume permissions are granted
        // In a real implementation, this would make JNI calls to check and request permissions
        Ok(PermissionStatus::Granted)
    }

    async fn configure_battery_optimization(&self) -> Result<(), BitCrapsError> {
        log::info!("Configuring Android battery optimization");

        // Check if app is whitelisted
        let is_whitelisted = self.check_battery_whitelist().await;

        if !is_whitelisted {
            // Request user to whitelist the app
            self.request_battery_whitelist().await?;
        }

        Ok(())
    }

    async fn configure_foreground_service(&self) -> Result<(), BitCrapsError> {
        log::info!("Configuring Android foreground service");

        // TODO: Implement via JNI calls to start foreground service
        // This would create a persistent notification and keep the service running

        Ok(())
    }

    async fn enable_background_service(&self) -> Result<(), BitCrapsError> {
        log::info!("Enabling Android background service");

        // TODO: Implement transition to background service mode
        // This might involve starting a foreground service or scheduling jobs

        Ok(())
    }

    async fn check_battery_whitelist(&self) -> bool {
        // TODO: Implement via JNI call to PowerManager.isIgnoringBatteryOptimizations()
        false
    }

    async fn request_battery_whitelist(&self) -> Result<(), BitCrapsError> {
        // TODO: Implement via JNI call to start ACTION_IGNORE_BATTERY_OPTIMIZATION_SETTINGS intent
        log::info!("Requesting battery optimization whitelist");
        Ok(())
    }

    fn get_bluetooth_config(&self) -> BluetoothPlatformConfig {
        BluetoothPlatformConfig {
            max_connections: 7, // Most Android devices support 7 concurrent connections
            preferred_mtu: 244, // Android default MTU
            scan_window_ms: 500,
            scan_interval_ms: 1000,
            supports_peripheral_mode: true,
            supports_background_scanning: true,
            requires_location_permission: true,
            service_uuids_required: false,
            connection_priority: ConnectionPriority::Balanced,
        }
    }

    async fn is_background_operation_available(&self) -> bool {
        // Check if background restrictions are in place
        let has_restrictions = self.check_background_restrictions().await;
        let is_whitelisted = self.check_battery_whitelist().await;

        !has_restrictions || is_whitelisted
    }

    async fn check_background_restrictions(&self) -> bool {
        // TODO: Implement via JNI call to ActivityManager.isBackgroundRestricted()
        false
    }
}

/// iOS-specific adapter
struct IOSAdapter {
    // FFI interface for iOS-specific operations
}

impl IOSAdapter {
    fn new() -> Self {
        Self {}
    }

    async fn initialize(&self) -> Result<(), BitCrapsError> {
        log::info!("Initializing iOS-specific features");

        // Configure Core Bluetooth for background operation
        self.configure_core_bluetooth().await?;

        Ok(())
    }

    async fn handle_lifecycle_change(&self, state: AppLifecycleState) -> Result<(), BitCrapsError> {
        match state {
            AppLifecycleState::Foreground => {
                log::info!("App moved to foreground - enabling full features");
                // iOS allows full BLE operations in foreground
            }
            AppLifecycleState::Background => {
                log::info!("App moved to background - switching to background mode");
                // iOS severely limits background BLE operations
                self.enable_background_mode().await?;
            }
            AppLifecycleState::Suspended => {
                log::info!("App suspended - BLE operations will be terminated");
                // iOS terminates most operations when app is suspended
            }
        }

        Ok(())
    }

    async fn request_permissions(&self) -> Result<PermissionStatus, BitCrapsError> {
        // TODO: Implement via FFI calls to iOS permission system
        log::info!("Requesting iOS permissions");

        // iOS automatically prompts for Bluetooth permissions when needed
        // Check current authorization status
        let bluetooth_authorized = self.check_bluetooth_authorization().await;

        if bluetooth_authorized {
            Ok(PermissionStatus::Granted)
        } else {
            Ok(PermissionStatus::Denied)
        }
    }

    async fn configure_battery_optimization(&self) -> Result<(), BitCrapsError> {
        log::info!("Configuring iOS battery optimization");

        // Check if Background App Refresh is enabled
        let background_refresh_enabled = self.check_background_app_refresh().await;

        if !background_refresh_enabled {
            log::warn!("Background App Refresh is disabled - background operation will be limited");
        }

        Ok(())
    }

    async fn configure_core_bluetooth(&self) -> Result<(), BitCrapsError> {
        log::info!("Configuring iOS Core Bluetooth");

        // TODO: Implement via FFI calls to configure CBCentralManager for background operation
        // This would set up service UUID filtering and background modes

        Ok(())
    }

    async fn enable_background_mode(&self) -> Result<(), BitCrapsError> {
        log::info!("Enabling iOS background mode");

        // TODO: Implement transition to background BLE mode
        // This involves switching to service UUID filtering and accepting connection limitations

        Ok(())
    }

    async fn check_bluetooth_authorization(&self) -> bool {
        // TODO: Implement via FFI call to CBManager.authorization
        true
    }

    async fn check_background_app_refresh(&self) -> bool {
        // TODO: Implement via FFI call to UIApplication.backgroundRefreshStatus
        true
    }

    fn get_bluetooth_config(&self) -> BluetoothPlatformConfig {
        BluetoothPlatformConfig {
            max_connections: 10, // iOS typically supports more connections
            preferred_mtu: 185,  // iOS conservative MTU
            scan_window_ms: 300,
            scan_interval_ms: 2000,
            supports_peripheral_mode: true,
            supports_background_scanning: false, // Very limited
            requires_location_permission: false,
            service_uuids_required: true, // Required for background
            connection_priority: ConnectionPriority::LowPower,
        }
    }

    async fn is_background_operation_available(&self) -> bool {
        let background_refresh = self.check_background_app_refresh().await;
        let bluetooth_authorized = self.check_bluetooth_authorization().await;

        background_refresh && bluetooth_authorized
    }
}

// Supporting types and enums

#[derive(Clone, Debug)]
pub enum AppLifecycleState {
    Foreground,
    Background,
    Suspended,
}

#[derive(Clone, Debug)]
pub enum PermissionStatus {
    Granted,
    Denied,
    NotDetermined,
    Restricted,
}

#[derive(Clone, Debug)]
pub struct BluetoothPlatformConfig {
    pub max_connections: u32,
    pub preferred_mtu: u16,
    pub scan_window_ms: u32,
    pub scan_interval_ms: u32,
    pub supports_peripheral_mode: bool,
    pub supports_background_scanning: bool,
    pub requires_location_permission: bool,
    pub service_uuids_required: bool,
    pub connection_priority: ConnectionPriority,
}

#[derive(Clone, Debug)]
pub enum ConnectionPriority {
    HighPerformance,
    Balanced,
    LowPower,
}

impl BluetoothPlatformConfig {
    pub fn default_android() -> Self {
        Self {
            max_connections: 7,
            preferred_mtu: 244,
            scan_window_ms: 500,
            scan_interval_ms: 1000,
            supports_peripheral_mode: true,
            supports_background_scanning: true,
            requires_location_permission: true,
            service_uuids_required: false,
            connection_priority: ConnectionPriority::Balanced,
        }
    }

    pub fn default_ios() -> Self {
        Self {
            max_connections: 10,
            preferred_mtu: 185,
            scan_window_ms: 300,
            scan_interval_ms: 2000,
            supports_peripheral_mode: true,
            supports_background_scanning: false,
            requires_location_permission: false,
            service_uuids_required: true,
            connection_priority: ConnectionPriority::LowPower,
        }
    }

    pub fn default_desktop() -> Self {
        Self {
            max_connections: 20,
            preferred_mtu: 512,
            scan_window_ms: 1000,
            scan_interval_ms: 1000,
            supports_peripheral_mode: true,
            supports_background_scanning: true,
            requires_location_permission: false,
            service_uuids_required: false,
            connection_priority: ConnectionPriority::HighPerformance,
        }
    }
}

/// Cross-platform notification manager
pub struct NotificationManager {
    platform_type: PlatformType,
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            platform_type: PlatformDetection::detect_platform(),
        }
    }

    /// Show a notification to the user
    pub async fn show_notification(
        &self,
        notification: PlatformNotification,
    ) -> Result<(), BitCrapsError> {
        match self.platform_type {
            PlatformType::Android => self.show_android_notification(notification).await,
            PlatformType::Ios => self.show_ios_notification(notification).await,
            _ => {
                log::info!(
                    "Notification: {} - {}",
                    notification.title,
                    notification.body
                );
                Ok(())
            }
        }
    }

    async fn show_android_notification(
        &self,
        notification: PlatformNotification,
    ) -> Result<(), BitCrapsError> {
        // TODO: Implement via JNI calls to Android NotificationManager
        log::info!(
            "Android notification: {} - {}",
            notification.title,
            notification.body
        );
        Ok(())
    }

    async fn show_ios_notification(
        &self,
        notification: PlatformNotification,
    ) -> Result<(), BitCrapsError> {
        // TODO: Implement via FFI calls to iOS UserNotifications framework
        log::info!(
            "iOS notification: {} - {}",
            notification.title,
            notification.body
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct PlatformNotification {
    pub title: String,
    pub body: String,
    pub category: NotificationCategory,
    pub priority: NotificationPriority,
}

#[derive(Clone)]
pub enum NotificationCategory {
    GameInvite,
    GameUpdate,
    PeerDiscovered,
    BatteryOptimization,
    Error,
}

#[derive(Clone)]
pub enum NotificationPriority {
    Low,
    Normal,
    High,
    Critical,
}
