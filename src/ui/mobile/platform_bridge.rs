//! Platform bridge for connecting Rust UI to native Android/iOS renderers

use super::*;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Platform bridge for cross-platform UI rendering
pub struct PlatformBridge {
    ui: Arc<MobileUI>,
    renderer: Box<dyn PlatformRenderer>,
    event_handler: Arc<RwLock<EventHandler>>,
}

impl PlatformBridge {
    /// Create new platform bridge
    pub fn new(ui: Arc<MobileUI>, platform: PlatformType) -> Self {
        let renderer: Box<dyn PlatformRenderer> = match platform {
            PlatformType::Android => Box::new(AndroidRenderer::new()),
            PlatformType::Ios => Box::new(IosRenderer::new()),
            _ => Box::new(MockRenderer::new()),
        };

        Self {
            ui,
            renderer,
            event_handler: Arc::new(RwLock::new(EventHandler::new())),
        }
    }

    /// Initialize the bridge
    pub async fn initialize(&self) -> Result<(), UIError> {
        // Initialize UI
        self.ui.initialize().await?;

        // Setup platform-specific rendering
        self.renderer.setup()?;

        // Navigate to initial screen
        self.ui.navigate_to(Screen::Splash).await?;

        Ok(())
    }

    /// Render current screen
    pub async fn render(&self) -> Result<(), UIError> {
        let state = self.ui.get_state().await;
        let navigation = self.ui.navigation.read().await;

        if let Some(screen) = navigation.current() {
            self.renderer.render_screen(screen, &state, &self.ui.theme);
        }

        Ok(())
    }

    /// Handle platform event
    pub async fn handle_event(&self, event: PlatformEvent) -> Result<(), UIError> {
        match event {
            PlatformEvent::Touch(x, y) => {
                self.handle_touch(x, y).await?;
            }
            PlatformEvent::Back => {
                self.ui.navigate_back().await?;
            }
            PlatformEvent::KeyPress(key) => {
                self.handle_key_press(key).await?;
            }
            PlatformEvent::Lifecycle(state) => {
                self.handle_lifecycle(state).await?;
            }
        }

        // Re-render after event
        self.render().await?;

        Ok(())
    }

    /// Handle touch event
    async fn handle_touch(&self, x: f32, y: f32) -> Result<(), UIError> {
        let mut handler = self.event_handler.write().await;
        handler.process_touch(x, y);
        Ok(())
    }

    /// Handle key press
    async fn handle_key_press(&self, key: KeyCode) -> Result<(), UIError> {
        match key {
            KeyCode::Back => {
                self.ui.navigate_back().await?;
            }
            KeyCode::Menu => {
                // Handle menu key
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle lifecycle events
    async fn handle_lifecycle(&self, state: LifecycleState) -> Result<(), UIError> {
        match state {
            LifecycleState::Resume => {
                // App resumed
                tracing::info!("App resumed");
            }
            LifecycleState::Pause => {
                // App paused - save state
                tracing::info!("App paused");
            }
            LifecycleState::Stop => {
                // App stopped
                tracing::info!("App stopped");
            }
        }
        Ok(())
    }
}

/// Platform-specific renderer trait
pub trait PlatformRenderer: Send + Sync {
    /// Setup the renderer
    fn setup(&self) -> Result<(), UIError>;

    /// Render a screen
    fn render_screen(&self, screen: &Screen, state: &AppState, theme: &Theme);

    /// Show dialog
    fn show_dialog(&self, title: &str, message: &str, buttons: Vec<DialogButton>);

    /// Show toast
    fn show_toast(&self, message: &str, duration: ToastDuration);

    /// Update status bar
    fn update_status_bar(&self, style: StatusBarStyle);
}

/// Android renderer implementation
pub struct AndroidRenderer {
    jni_env: Option<*mut std::ffi::c_void>,
}

impl AndroidRenderer {
    pub fn new() -> Self {
        Self {
            jni_env: None,
        }
    }

    #[cfg(target_os = "android")]
    pub fn set_jni_env(&mut self, env: *mut std::ffi::c_void) {
        self.jni_env = Some(env);
    }
}

impl PlatformRenderer for AndroidRenderer {
    fn setup(&self) -> Result<(), UIError> {
        #[cfg(target_os = "android")]
        {
            // Initialize Android-specific components
            tracing::info!("Setting up Android renderer");
        }
        Ok(())
    }

    fn render_screen(&self, screen: &Screen, state: &AppState, theme: &Theme) {
        #[cfg(target_os = "android")]
        {
            // Call into Android Compose UI via JNI
            match screen {
                Screen::Login => {
                    // Render login screen in Compose
                    self.render_android_login(state, theme);
                }
                Screen::Home => {
                    // Render home screen in Compose
                    self.render_android_home(state, theme);
                }
                Screen::GamePlay => {
                    // Render game screen in Compose
                    self.render_android_game(state, theme);
                }
                _ => {
                    tracing::warn!("Screen {:?} not yet implemented for Android", screen);
                }
            }
        }
    }

    fn show_dialog(&self, title: &str, message: &str, buttons: Vec<DialogButton>) {
        #[cfg(target_os = "android")]
        {
            // Show Android dialog via JNI
            tracing::info!("Showing Android dialog: {}", title);
        }
    }

    fn show_toast(&self, message: &str, duration: ToastDuration) {
        #[cfg(target_os = "android")]
        {
            // Show Android toast via JNI
            tracing::info!("Showing Android toast: {}", message);
        }
    }

    fn update_status_bar(&self, style: StatusBarStyle) {
        #[cfg(target_os = "android")]
        {
            // Update Android status bar via JNI
            tracing::info!("Updating Android status bar: {:?}", style);
        }
    }
}

#[cfg(target_os = "android")]
impl AndroidRenderer {
    fn render_android_login(&self, state: &AppState, theme: &Theme) {
        use jni::objects::{JObject, JValue};
        use jni::JNIEnv;

        if let Some(env_ptr) = self.jni_env {
            if let Some(activity) = self.activity {
                unsafe {
                    let env = match JNIEnv::from_raw(env_ptr) {
                        Ok(env) => env,
                        Err(e) => {
                            tracing::error!("Failed to create JNI environment: {}", e);
                            return;
                        }
                    };

                    // Convert theme to Android values
                    let theme_name = match env.new_string(theme.name()) {
                        Ok(s) => s,
                        Err(e) => {
                            tracing::error!("Failed to create JNI string for theme name: {}", e);
                            return;
                        }
                    };
                    let primary_color = theme.colors.primary.to_hex();
                    let color_string = match env.new_string(&primary_color) {
                        Ok(s) => s,
                        Err(e) => {
                            tracing::error!("Failed to create JNI string for color: {}", e);
                            return;
                        }
                    };

                    // Call renderLoginScreen method on the activity
                    let _ = env.call_method(
                        JObject::from_raw(activity),
                        "renderLoginScreen",
                        "(Ljava/lang/String;Ljava/lang/String;)V",
                        &[
                            JValue::Object(theme_name.into()),
                            JValue::Object(color_string.into()),
                        ],
                    );
                }
            }
        }
    }

    fn render_android_home(&self, state: &AppState, theme: &Theme) {
        use jni::objects::{JObject, JValue};
        use jni::JNIEnv;

        if let Some(env_ptr) = self.jni_env {
            if let Some(activity) = self.activity {
                unsafe {
                    let env = match JNIEnv::from_raw(env_ptr) {
                        Ok(env) => env,
                        Err(e) => {
                            tracing::error!("Failed to create JNI environment: {}", e);
                            return;
                        }
                    };

                    // Get user data from state
                    let username = state.user_profile.as_ref()
                        .map(|p| p.username.as_str())
                        .unwrap_or("Guest");
                    let username_jstring = match env.new_string(username) {
                        Ok(s) => s,
                        Err(e) => {
                            tracing::error!("Failed to create JNI string for username: {}", e);
                            return;
                        }
                    };

                    // Get balance
                    let balance = state.wallet_balance;

                    // Call renderHomeScreen method
                    let _ = env.call_method(
                        JObject::from_raw(activity),
                        "renderHomeScreen",
                        "(Ljava/lang/String;J)V",
                        &[
                            JValue::Object(username_jstring.into()),
                            JValue::Long(balance as i64),
                        ],
                    );
                }
            }
        }
    }

    fn render_android_game(&self, state: &AppState, theme: &Theme) {
        use jni::objects::{JObject, JValue};
        use jni::JNIEnv;

        if let Some(env_ptr) = self.jni_env {
            if let Some(activity) = self.activity {
                unsafe {
                    let env = match JNIEnv::from_raw(env_ptr) {
                        Ok(env) => env,
                        Err(e) => {
                            tracing::error!("Failed to create JNI environment: {}", e);
                            return;
                        }
                    };

                    // Get game state
                    let game_id = state.active_game.as_ref()
                        .map(|g| format!("{:?}", g.id))
                        .unwrap_or_default();
                    let game_id_jstring = match env.new_string(&game_id) {
                        Ok(s) => s,
                        Err(e) => {
                            tracing::error!("Failed to create JNI string for game_id: {}", e);
                            return;
                        }
                    };

                    // Get current round
                    let round = state.active_game.as_ref()
                        .map(|g| g.current_round)
                        .unwrap_or(0);

                    // Call renderGameScreen method
                    let _ = env.call_method(
                        JObject::from_raw(activity),
                        "renderGameScreen",
                        "(Ljava/lang/String;I)V",
                        &[
                            JValue::Object(game_id_jstring.into()),
                            JValue::Int(round as i32),
                        ],
                    );
                }
            }
        }
    }
}

/// iOS renderer implementation
pub struct IosRenderer {
    #[cfg(target_os = "ios")]
    view_controller: Option<*mut std::ffi::c_void>,
}

impl IosRenderer {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "ios")]
            view_controller: None,
        }
    }

    #[cfg(target_os = "ios")]
    pub fn set_view_controller(&mut self, vc: *mut std::ffi::c_void) {
        self.view_controller = Some(vc);
    }
}

impl PlatformRenderer for IosRenderer {
    fn setup(&self) -> Result<(), UIError> {
        #[cfg(target_os = "ios")]
        {
            // Initialize iOS-specific components
            tracing::info!("Setting up iOS renderer");
        }
        Ok(())
    }

    fn render_screen(&self, screen: &Screen, state: &AppState, theme: &Theme) {
        #[cfg(target_os = "ios")]
        {
            // Call into iOS UIKit/SwiftUI via Objective-C bridge
            match screen {
                Screen::Login => {
                    self.render_ios_login(state, theme);
                }
                Screen::Home => {
                    self.render_ios_home(state, theme);
                }
                Screen::GamePlay => {
                    self.render_ios_game(state, theme);
                }
                _ => {
                    tracing::warn!("Screen {:?} not yet implemented for iOS", screen);
                }
            }
        }
    }

    fn show_dialog(&self, title: &str, message: &str, buttons: Vec<DialogButton>) {
        #[cfg(target_os = "ios")]
        {
            // Show iOS alert via Objective-C bridge
            tracing::info!("Showing iOS alert: {}", title);
        }
    }

    fn show_toast(&self, message: &str, duration: ToastDuration) {
        #[cfg(target_os = "ios")]
        {
            // Show iOS notification banner
            tracing::info!("Showing iOS notification: {}", message);
        }
    }

    fn update_status_bar(&self, style: StatusBarStyle) {
        #[cfg(target_os = "ios")]
        {
            // Update iOS status bar
            tracing::info!("Updating iOS status bar: {:?}", style);
        }
    }
}

#[cfg(target_os = "ios")]
impl IosRenderer {
    fn render_ios_login(&self, state: &AppState, theme: &Theme) {
        if let Some(vc) = self.view_controller {
            unsafe {
                // Call Objective-C method to render login screen
                let theme_name = match std::ffi::CString::new(theme.name()) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::error!("Failed to create CString for theme name: {}", e);
                        return;
                    }
                };
                let primary_color = match std::ffi::CString::new(theme.colors.primary.to_hex()) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::error!("Failed to create CString for primary color: {}", e);
                        return;
                    }
                };

                extern "C" {
                    fn ios_render_login_screen(
                        view_controller: *mut std::ffi::c_void,
                        theme_name: *const std::ffi::c_char,
                        primary_color: *const std::ffi::c_char,
                    );
                }

                ios_render_login_screen(
                    vc,
                    theme_name.as_ptr(),
                    primary_color.as_ptr(),
                );
            }
        }
    }

    fn render_ios_home(&self, state: &AppState, theme: &Theme) {
        if let Some(vc) = self.view_controller {
            unsafe {
                let username = state.user_profile.as_ref()
                    .map(|p| p.username.as_str())
                    .unwrap_or("Guest");
                let username_cstr = match std::ffi::CString::new(username) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::error!("Failed to create CString for username: {}", e);
                        return;
                    }
                };
                let balance = state.wallet_balance;

                extern "C" {
                    fn ios_render_home_screen(
                        view_controller: *mut std::ffi::c_void,
                        username: *const std::ffi::c_char,
                        balance: u64,
                    );
                }

                ios_render_home_screen(
                    vc,
                    username_cstr.as_ptr(),
                    balance,
                );
            }
        }
    }

    fn render_ios_game(&self, state: &AppState, theme: &Theme) {
        if let Some(vc) = self.view_controller {
            unsafe {
                let game_id = state.active_game.as_ref()
                    .map(|g| format!("{:?}", g.id))
                    .unwrap_or_default();
                let game_id_cstr = match std::ffi::CString::new(game_id) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::error!("Failed to create CString for game_id: {}", e);
                        return;
                    }
                };
                let round = state.active_game.as_ref()
                    .map(|g| g.current_round)
                    .unwrap_or(0);

                extern "C" {
                    fn ios_render_game_screen(
                        view_controller: *mut std::ffi::c_void,
                        game_id: *const std::ffi::c_char,
                        round: u32,
                    );
                }

                ios_render_game_screen(
                    vc,
                    game_id_cstr.as_ptr(),
                    round,
                );
            }
        }
    }
}

/// Mock renderer for testing
pub struct MockRenderer;

impl MockRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl PlatformRenderer for MockRenderer {
    fn setup(&self) -> Result<(), UIError> {
        tracing::info!("Mock renderer setup");
        Ok(())
    }

    fn render_screen(&self, screen: &Screen, _state: &AppState, _theme: &Theme) {
        tracing::info!("Mock rendering screen: {:?}", screen);
    }

    fn show_dialog(&self, title: &str, message: &str, _buttons: Vec<DialogButton>) {
        tracing::info!("Mock dialog: {} - {}", title, message);
    }

    fn show_toast(&self, message: &str, _duration: ToastDuration) {
        tracing::info!("Mock toast: {}", message);
    }

    fn update_status_bar(&self, style: StatusBarStyle) {
        tracing::info!("Mock status bar: {:?}", style);
    }
}

/// Event handler for platform events
pub struct EventHandler {
    touch_points: Vec<TouchPoint>,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            touch_points: Vec::new(),
        }
    }

    pub fn process_touch(&mut self, x: f32, y: f32) {
        self.touch_points.push(TouchPoint {
            x,
            y,
            timestamp: std::time::SystemTime::now(),
        });

        // Keep only recent touches
        if self.touch_points.len() > 10 {
            self.touch_points.remove(0);
        }
    }
}

/// Touch point
#[derive(Debug, Clone)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
    pub timestamp: std::time::SystemTime,
}

/// Platform events
#[derive(Debug, Clone)]
pub enum PlatformEvent {
    Touch(f32, f32),
    Back,
    KeyPress(KeyCode),
    Lifecycle(LifecycleState),
}

/// Key codes
#[derive(Debug, Clone)]
pub enum KeyCode {
    Back,
    Menu,
    Home,
    Search,
    VolumeUp,
    VolumeDown,
}

/// Lifecycle states
#[derive(Debug, Clone)]
pub enum LifecycleState {
    Resume,
    Pause,
    Stop,
}

/// Platform type
#[derive(Debug, Clone)]
pub enum PlatformType {
    Android,
    Ios,
    Web,
    Desktop,
}

// Export function for Android
#[cfg(target_os = "android")]
#[no_mangle]
pub extern "C" fn Java_com_bitcraps_ui_PlatformBridge_nativeInitialize(
    env: *mut std::ffi::c_void,
    _class: *mut std::ffi::c_void,
) -> i32 {
    // Initialize platform bridge for Android
    0
}

// Export function for iOS
#[cfg(target_os = "ios")]
#[no_mangle]
pub extern "C" fn ios_platform_bridge_initialize() -> i32 {
    // Initialize platform bridge for iOS
    0
}