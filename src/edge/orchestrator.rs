//! Edge Orchestration System for BitCraps
//!
//! This module provides sophisticated workload orchestration and management
//! for distributed edge computing infrastructure. It handles workload placement,
//! scaling, failover, and optimization across multiple edge nodes and clusters.
//!
//! # Key Features
//!
//! - Intelligent workload placement with multi-objective optimization
//! - Auto-scaling based on demand and resource utilization
//! - Edge-to-cloud synchronization and hybrid deployments
//! - Real-time failover and disaster recovery
//! - Resource allocation and quotas management
//! - SLA monitoring and enforcement

use crate::edge::{
    EdgeNode, EdgeNodeId, EdgeWorkload, WorkloadType, GeoLocation,
    EdgeCapabilities, EdgeMetrics, EdgeNodeStatus, MAX_EDGE_LATENCY,
};
use crate::error::{Error, Result};
use crate::utils::timeout::TimeoutExt;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, SystemTime, Instant};
use tokio::sync::{RwLock, Mutex, watch, mpsc};
use uuid::Uuid;

/// Orchestration event types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrchestrationEvent {
    /// New workload submitted
    WorkloadSubmitted { workload_id: Uuid, workload: EdgeWorkload },
    /// Workload completed or terminated
    WorkloadCompleted { workload_id: Uuid, node_id: EdgeNodeId },
    /// Node joined the cluster
    NodeJoined { node: EdgeNode },
    /// Node left or failed
    NodeLeft { node_id: EdgeNodeId, reason: String },
    /// Resource utilization changed
    ResourcesChanged { node_id: EdgeNodeId, metrics: EdgeMetrics },
    /// SLA violation detected
    SlaViolation { workload_id: Uuid, violation_type: String },
    /// Scaling event triggered
    ScalingEvent { cluster_id: Uuid, direction: ScalingDirection },
}

/// Scaling direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ScalingDirection {
    Up,
    Down,
}

/// Edge cluster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeCluster {
    pub id: Uuid,
    pub name: String,
    pub region: String,
    pub location: GeoLocation,
    pub nodes: HashSet<EdgeNodeId>,
    pub capacity: EdgeCapabilities,
    pub utilization: EdgeMetrics,
    pub auto_scaling: AutoScalingConfig,
    pub created_at: SystemTime,
}

impl EdgeCluster {
    pub fn new(name: String, region: String, location: GeoLocation) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            region,
            location,
            nodes: HashSet::new(),
            capacity: EdgeCapabilities::default(),
            utilization: EdgeMetrics::default(),
            auto_scaling: AutoScalingConfig::default(),
            created_at: SystemTime::now(),
        }
    }

    /// Calculate cluster health score
    pub fn health_score(&self) -> f32 {
        if self.nodes.is_empty() {
            return 0.0;
        }

        let cpu_score = (100.0 - self.utilization.cpu_usage) / 100.0;
        let memory_score = (100.0 - self.utilization.memory_usage) / 100.0;
        let latency_score = 1.0 / (1.0 + self.utilization.network_latency_ms / 50.0);
        let error_score = 1.0 - self.utilization.error_rate;

        (cpu_score * 0.25 + memory_score * 0.25 + latency_score * 0.25 + error_score * 0.25).max(0.0)
    }
}

/// Auto-scaling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoScalingConfig {
    pub enabled: bool,
    pub min_nodes: u32,
    pub max_nodes: u32,
    pub target_cpu_utilization: f32,
    pub target_memory_utilization: f32,
    pub scale_up_threshold: f32,
    pub scale_down_threshold: f32,
    pub scale_up_cooldown: Duration,
    pub scale_down_cooldown: Duration,
    pub last_scale_action: Option<SystemTime>,
}

impl Default for AutoScalingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_nodes: 1,
            max_nodes: 10,
            target_cpu_utilization: 70.0,
            target_memory_utilization: 80.0,
            scale_up_threshold: 85.0,
            scale_down_threshold: 50.0,
            scale_up_cooldown: Duration::from_secs(300),  // 5 minutes
            scale_down_cooldown: Duration::from_secs(600), // 10 minutes
            last_scale_action: None,
        }
    }
}

/// Workload scheduling policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum SchedulingPolicy {
    /// Balance across all nodes
    Balanced,
    /// Pack into fewer nodes for efficiency
    BinPacking,
    /// Prioritize latency optimization
    LatencyOptimized,
    /// Prioritize resource utilization
    ResourceOptimized,
    /// Custom algorithm with weighted factors
    Custom { 
        latency_weight: f32,
        resource_weight: f32,
        geographic_weight: f32,
    },
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self::Custom {
            latency_weight: 0.4,
            resource_weight: 0.3,
            geographic_weight: 0.3,
        }
    }
}

/// Service Level Agreement definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceLevelAgreement {
    pub workload_id: Uuid,
    pub max_latency_ms: f32,
    pub min_availability_percent: f32,
    pub max_error_rate: f32,
    pub min_throughput: f32,
    pub violation_actions: Vec<SlaViolationAction>,
}

/// SLA violation response actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SlaViolationAction {
    /// Migrate workload to better node
    Migrate,
    /// Scale up resources
    ScaleUp,
    /// Alert administrators
    Alert { severity: AlertSeverity },
    /// Terminate workload
    Terminate,
}

/// Alert severity levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
    Emergency,
}

/// Workload placement decision
#[derive(Debug, Clone)]
pub struct PlacementDecision {
    pub workload_id: Uuid,
    pub target_node: EdgeNodeId,
    pub placement_score: f32,
    pub reasoning: Vec<String>,
    pub estimated_latency_ms: f32,
    pub resource_fit: f32,
}

/// Edge orchestration engine
pub struct EdgeOrchestrator {
    /// Edge clusters managed by this orchestrator
    clusters: Arc<RwLock<HashMap<Uuid, EdgeCluster>>>,
    
    /// All edge nodes (across clusters)
    nodes: Arc<RwLock<HashMap<EdgeNodeId, EdgeNode>>>,
    
    /// Active workloads
    workloads: Arc<RwLock<HashMap<Uuid, EdgeWorkload>>>,
    
    /// Workload placements
    placements: Arc<RwLock<HashMap<Uuid, EdgeNodeId>>>,
    
    /// SLA definitions
    slas: Arc<RwLock<HashMap<Uuid, ServiceLevelAgreement>>>,
    
    /// Event channel for orchestration events
    event_tx: mpsc::UnboundedSender<OrchestrationEvent>,
    event_rx: Arc<Mutex<mpsc::UnboundedReceiver<OrchestrationEvent>>>,
    
    /// Configuration
    config: OrchestratorConfig,
    
    /// Placement history for learning
    placement_history: Arc<RwLock<VecDeque<PlacementDecision>>>,
    
    /// Background task handles
    _background_tasks: Vec<tokio::task::JoinHandle<()>>,
}

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub scheduling_policy: SchedulingPolicy,
    pub enable_auto_scaling: bool,
    pub enable_sla_monitoring: bool,
    pub enable_predictive_scaling: bool,
    pub placement_optimization_interval: Duration,
    pub health_check_interval: Duration,
    pub max_placement_history: usize,
    pub failover_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            scheduling_policy: SchedulingPolicy::default(),
            enable_auto_scaling: true,
            enable_sla_monitoring: true,
            enable_predictive_scaling: false,
            placement_optimization_interval: Duration::from_secs(60),
            health_check_interval: Duration::from_secs(30),
            max_placement_history: 1000,
            failover_timeout: Duration::from_secs(10),
        }
    }
}

impl EdgeOrchestrator {
    /// Create new edge orchestrator
    pub fn new(config: OrchestratorConfig) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        
        Self {
            clusters: Arc::new(RwLock::new(HashMap::new())),
            nodes: Arc::new(RwLock::new(HashMap::new())),
            workloads: Arc::new(RwLock::new(HashMap::new())),
            placements: Arc::new(RwLock::new(HashMap::new())),
            slas: Arc::new(RwLock::new(HashMap::new())),
            event_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            config,
            placement_history: Arc::new(RwLock::new(VecDeque::new())),
            _background_tasks: Vec::new(),
        }
    }

    /// Start the orchestrator with background services
    pub async fn start(&mut self) -> Result<()> {
        // Start event processing
        let event_task = self.start_event_processing().await;
        self._background_tasks.push(event_task);

        // Start auto-scaling if enabled
        if self.config.enable_auto_scaling {
            let scaling_task = self.start_auto_scaling().await;
            self._background_tasks.push(scaling_task);
        }

        // Start SLA monitoring if enabled
        if self.config.enable_sla_monitoring {
            let sla_task = self.start_sla_monitoring().await;
            self._background_tasks.push(sla_task);
        }

        // Start placement optimization
        let optimization_task = self.start_placement_optimization().await;
        self._background_tasks.push(optimization_task);

        // Start health monitoring
        let health_task = self.start_health_monitoring().await;
        self._background_tasks.push(health_task);

        tracing::info!("Edge orchestrator started with {} background services", 
                      self._background_tasks.len());
        Ok(())
    }

    /// Create a new edge cluster
    pub async fn create_cluster(
        &self,
        name: String,
        region: String,
        location: GeoLocation,
        auto_scaling: Option<AutoScalingConfig>,
    ) -> Result<Uuid> {
        let mut cluster = EdgeCluster::new(name, region, location);
        
        if let Some(scaling_config) = auto_scaling {
            cluster.auto_scaling = scaling_config;
        }
        
        let cluster_id = cluster.id;
        
        let mut clusters = self.clusters.write().await;
        clusters.insert(cluster_id, cluster);
        
        tracing::info!("Created edge cluster {} in region {}", cluster_id, 
                      clusters.get(&cluster_id).unwrap().region);
        Ok(cluster_id)
    }

    /// Add node to cluster
    pub async fn add_node_to_cluster(&self, cluster_id: Uuid, node: EdgeNode) -> Result<()> {
        let mut clusters = self.clusters.write().await;
        let mut nodes = self.nodes.write().await;
        
        if let Some(cluster) = clusters.get_mut(&cluster_id) {
            cluster.nodes.insert(node.id);
            nodes.insert(node.id, node.clone());
            
            // Update cluster capacity
            self.update_cluster_capacity(cluster, &nodes).await;
            
            // Send event
            let _ = self.event_tx.send(OrchestrationEvent::NodeJoined { node });
            
            tracing::info!("Added node {} to cluster {}", node.id, cluster_id);
            Ok(())
        } else {
            Err(Error::NotFound(format!("Cluster {} not found", cluster_id)))
        }
    }

    /// Remove node from cluster
    pub async fn remove_node_from_cluster(&self, cluster_id: Uuid, node_id: EdgeNodeId) -> Result<()> {
        let mut clusters = self.clusters.write().await;
        let mut nodes = self.nodes.write().await;
        
        if let Some(cluster) = clusters.get_mut(&cluster_id) {
            cluster.nodes.remove(&node_id);
            nodes.remove(&node_id);
            
            // Update cluster capacity
            self.update_cluster_capacity(cluster, &nodes).await;
            
            // Send event
            let _ = self.event_tx.send(OrchestrationEvent::NodeLeft { 
                node_id, 
                reason: "Manual removal".to_string() 
            });
            
            tracing::info!("Removed node {} from cluster {}", node_id, cluster_id);
            Ok(())
        } else {
            Err(Error::NotFound(format!("Cluster {} not found", cluster_id)))
        }
    }

    /// Schedule workload across edge infrastructure
    pub async fn schedule_workload(&self, workload: EdgeWorkload) -> Result<PlacementDecision> {
        tracing::debug!("Scheduling workload {} of type {:?}", workload.id, workload.workload_type);
        
        // Find optimal placement
        let placement_decision = self.find_optimal_placement(&workload).await?;
        
        // Record placement
        let mut placements = self.placements.write().await;
        placements.insert(workload.id, placement_decision.target_node);
        drop(placements);
        
        // Store workload
        let mut workloads = self.workloads.write().await;
        workloads.insert(workload.id, workload.clone());
        drop(workloads);
        
        // Update node workload assignment
        let mut nodes = self.nodes.write().await;
        if let Some(node) = nodes.get_mut(&placement_decision.target_node) {
            node.workloads.insert(workload.id);
        }
        
        // Record placement history for learning
        let mut history = self.placement_history.write().await;
        history.push_back(placement_decision.clone());
        
        // Maintain history size limit
        while history.len() > self.config.max_placement_history {
            history.pop_front();
        }
        
        // Send event
        let _ = self.event_tx.send(OrchestrationEvent::WorkloadSubmitted { 
            workload_id: workload.id, 
            workload 
        });
        
        tracing::info!("Scheduled workload {} on node {} with score {:.2}", 
                      placement_decision.workload_id, 
                      placement_decision.target_node,
                      placement_decision.placement_score);
        
        Ok(placement_decision)
    }

    /// Terminate workload
    pub async fn terminate_workload(&self, workload_id: Uuid) -> Result<()> {
        // Get current placement
        let node_id = {
            let placements = self.placements.read().await;
            placements.get(&workload_id).copied()
        };
        
        // Remove from placements and workloads
        let mut placements = self.placements.write().await;
        placements.remove(&workload_id);
        drop(placements);
        
        let mut workloads = self.workloads.write().await;
        workloads.remove(&workload_id);
        drop(workloads);
        
        // Update node workload list
        if let Some(node_id) = node_id {
            let mut nodes = self.nodes.write().await;
            if let Some(node) = nodes.get_mut(&node_id) {
                node.workloads.remove(&workload_id);
            }
            
            // Send event
            let _ = self.event_tx.send(OrchestrationEvent::WorkloadCompleted { 
                workload_id, 
                node_id 
            });
        }
        
        tracing::info!("Terminated workload {}", workload_id);
        Ok(())
    }

    /// Migrate workload to different node
    pub async fn migrate_workload(&self, workload_id: Uuid, target_node: Option<EdgeNodeId>) -> Result<PlacementDecision> {
        // Get current workload
        let workload = {
            let workloads = self.workloads.read().await;
            workloads.get(&workload_id).cloned()
                .ok_or_else(|| Error::NotFound(format!("Workload {} not found", workload_id)))?
        };
        
        // Find new placement (or use specified target)
        let placement_decision = if let Some(target) = target_node {
            // Validate target node can handle workload
            let nodes = self.nodes.read().await;
            let target_node_info = nodes.get(&target)
                .ok_or_else(|| Error::NotFound(format!("Target node {} not found", target)))?;
            
            if !self.can_place_workload(target_node_info, &workload) {
                return Err(Error::ResourceExhausted(
                    format!("Target node {} cannot handle workload", target)
                ));
            }
            
            PlacementDecision {
                workload_id,
                target_node: target,
                placement_score: target_node_info.priority_score(),
                reasoning: vec!["Manual migration target".to_string()],
                estimated_latency_ms: target_node_info.metrics.network_latency_ms,
                resource_fit: 1.0, // Assume good fit since validation passed
            }
        } else {
            // Find optimal new placement
            self.find_optimal_placement(&workload).await?
        };
        
        // Get current placement
        let old_node_id = {
            let mut placements = self.placements.write().await;
            let old_node = placements.get(&workload_id).copied();
            placements.insert(workload_id, placement_decision.target_node);
            old_node
        };
        
        // Update node workload assignments
        let mut nodes = self.nodes.write().await;
        
        // Remove from old node
        if let Some(old_node_id) = old_node_id {
            if let Some(old_node) = nodes.get_mut(&old_node_id) {
                old_node.workloads.remove(&workload_id);
            }
        }
        
        // Add to new node
        if let Some(new_node) = nodes.get_mut(&placement_decision.target_node) {
            new_node.workloads.insert(workload_id);
        }
        
        tracing::info!("Migrated workload {} from {:?} to {}", 
                      workload_id, old_node_id, placement_decision.target_node);
        
        Ok(placement_decision)
    }

    /// Add SLA for workload
    pub async fn add_sla(&self, sla: ServiceLevelAgreement) {
        let mut slas = self.slas.write().await;
        slas.insert(sla.workload_id, sla.clone());
        
        tracing::info!("Added SLA for workload {} with {}ms max latency", 
                      sla.workload_id, sla.max_latency_ms);
    }

    /// Get cluster information
    pub async fn get_cluster(&self, cluster_id: Uuid) -> Option<EdgeCluster> {
        let clusters = self.clusters.read().await;
        clusters.get(&cluster_id).cloned()
    }

    /// Get all clusters
    pub async fn get_clusters(&self) -> HashMap<Uuid, EdgeCluster> {
        let clusters = self.clusters.read().await;
        clusters.clone()
    }

    /// Get orchestration statistics
    pub async fn get_statistics(&self) -> OrchestrationStats {
        let clusters = self.clusters.read().await;
        let nodes = self.nodes.read().await;
        let workloads = self.workloads.read().await;
        let placements = self.placements.read().await;
        let slas = self.slas.read().await;

        OrchestrationStats {
            total_clusters: clusters.len(),
            total_nodes: nodes.len(),
            healthy_nodes: nodes.values().filter(|n| n.is_healthy()).count(),
            total_workloads: workloads.len(),
            active_placements: placements.len(),
            slas_monitored: slas.len(),
            average_cluster_health: clusters.values()
                .map(|c| c.health_score())
                .sum::<f32>() / clusters.len().max(1) as f32,
            average_node_cpu: nodes.values()
                .map(|n| n.metrics.cpu_usage)
                .sum::<f32>() / nodes.len().max(1) as f32,
            average_node_memory: nodes.values()
                .map(|n| n.metrics.memory_usage)  
                .sum::<f32>() / nodes.len().max(1) as f32,
        }
    }

    /// Find optimal placement for workload
    async fn find_optimal_placement(&self, workload: &EdgeWorkload) -> Result<PlacementDecision> {
        let nodes = self.nodes.read().await;
        let eligible_nodes: Vec<_> = nodes.values()
            .filter(|node| node.is_healthy())
            .filter(|node| self.can_place_workload(node, workload))
            .collect();

        if eligible_nodes.is_empty() {
            return Err(Error::ResourceExhausted("No eligible nodes for workload placement".to_string()));
        }

        let mut best_placement = None;
        let mut best_score = 0.0f32;

        for node in &eligible_nodes {
            let (score, reasoning) = self.calculate_placement_score(node, workload).await;
            
            if score > best_score {
                best_score = score;
                best_placement = Some(PlacementDecision {
                    workload_id: workload.id,
                    target_node: node.id,
                    placement_score: score,
                    reasoning,
                    estimated_latency_ms: node.metrics.network_latency_ms,
                    resource_fit: self.calculate_resource_fit(node, workload),
                });
            }
        }

        best_placement.ok_or_else(|| Error::InternalError("Failed to find placement".to_string()))
    }

    /// Calculate placement score for node/workload combination
    async fn calculate_placement_score(&self, node: &EdgeNode, workload: &EdgeWorkload) -> (f32, Vec<String>) {
        let mut score = 0.0f32;
        let mut reasoning = Vec::new();

        match self.config.scheduling_policy {
            SchedulingPolicy::Balanced => {
                // Balanced approach considering multiple factors
                let resource_score = node.priority_score();
                let latency_score = 1.0 / (1.0 + node.metrics.network_latency_ms / 50.0);
                
                score = (resource_score + latency_score) / 2.0;
                reasoning.push(format!("Balanced: resource={:.2}, latency={:.2}", resource_score, latency_score));
            }
            SchedulingPolicy::BinPacking => {
                // Prefer nodes with higher utilization to pack workloads
                let utilization = (node.metrics.cpu_usage + node.metrics.memory_usage) / 200.0;
                score = utilization * node.priority_score();
                reasoning.push(format!("BinPacking: utilization={:.2}", utilization));
            }
            SchedulingPolicy::LatencyOptimized => {
                // Prioritize lowest latency
                score = 1.0 / (1.0 + node.metrics.network_latency_ms / 10.0);
                reasoning.push(format!("LatencyOptimized: latency={}ms", node.metrics.network_latency_ms));
            }
            SchedulingPolicy::ResourceOptimized => {
                // Prioritize best resource availability
                score = node.priority_score();
                reasoning.push(format!("ResourceOptimized: priority={:.2}", score));
            }
            SchedulingPolicy::Custom { latency_weight, resource_weight, geographic_weight } => {
                // Custom weighted approach
                let latency_score = 1.0 / (1.0 + node.metrics.network_latency_ms / 50.0);
                let resource_score = node.priority_score();
                let geo_score = if let Some(target_location) = workload.target_location {
                    1.0 / (1.0 + node.location.distance_km(&target_location) / 1000.0)
                } else {
                    1.0
                };

                score = latency_score * latency_weight + 
                       resource_score * resource_weight +
                       geo_score * geographic_weight;
                
                reasoning.push(format!(
                    "Custom: latency={:.2}*{:.2} + resource={:.2}*{:.2} + geo={:.2}*{:.2}",
                    latency_score, latency_weight,
                    resource_score, resource_weight,
                    geo_score, geographic_weight
                ));
            }
        }

        // Apply workload type specific adjustments
        match workload.workload_type {
            WorkloadType::GameLogic => {
                // Game logic needs ultra-low latency
                if node.metrics.network_latency_ms > 10.0 {
                    score *= 0.5; // Heavy penalty for high latency
                    reasoning.push("GameLogic: high latency penalty applied".to_string());
                }
            }
            WorkloadType::MLInference => {
                // ML inference benefits from GPU acceleration
                if node.capabilities.gpu_acceleration {
                    score *= 1.5; // Bonus for GPU
                    reasoning.push("MLInference: GPU acceleration bonus".to_string());
                }
            }
            _ => {}
        }

        (score.max(0.0), reasoning)
    }

    /// Check if workload can be placed on node
    fn can_place_workload(&self, node: &EdgeNode, workload: &EdgeWorkload) -> bool {
        // Check resource requirements
        let reqs = &workload.resource_requirements;
        let caps = &node.capabilities;

        if reqs.cpu_cores > caps.cpu_cores ||
           reqs.memory_mb > caps.memory_mb ||
           reqs.storage_gb > caps.storage_gb ||
           reqs.bandwidth_mbps > caps.bandwidth_mbps {
            return false;
        }

        // Check special capabilities
        if reqs.gpu_acceleration && !caps.gpu_acceleration {
            return false;
        }
        if reqs.fpga_acceleration && !caps.fpga_acceleration {
            return false;
        }
        if reqs.wasm_runtime && !caps.wasm_runtime {
            return false;
        }

        // Check current utilization
        if node.metrics.cpu_usage > 90.0 || node.metrics.memory_usage > 90.0 {
            return false;
        }

        true
    }

    /// Calculate how well workload fits on node
    fn calculate_resource_fit(&self, node: &EdgeNode, workload: &EdgeWorkload) -> f32 {
        let reqs = &workload.resource_requirements;
        let caps = &node.capabilities;

        let cpu_fit = (caps.cpu_cores as f32 - reqs.cpu_cores as f32) / caps.cpu_cores as f32;
        let memory_fit = (caps.memory_mb as f32 - reqs.memory_mb as f32) / caps.memory_mb as f32;
        let storage_fit = (caps.storage_gb as f32 - reqs.storage_gb as f32) / caps.storage_gb as f32;
        let bandwidth_fit = (caps.bandwidth_mbps as f32 - reqs.bandwidth_mbps as f32) / caps.bandwidth_mbps as f32;

        (cpu_fit + memory_fit + storage_fit + bandwidth_fit) / 4.0
    }

    /// Update cluster capacity based on constituent nodes
    async fn update_cluster_capacity(&self, cluster: &mut EdgeCluster, nodes: &HashMap<EdgeNodeId, EdgeNode>) {
        let mut total_cpu = 0u32;
        let mut total_memory = 0u64;
        let mut total_storage = 0u64;
        let mut total_bandwidth = 0u64;
        let mut gpu_count = 0;
        let mut fpga_count = 0;
        let mut wasm_nodes = 0;

        let mut total_cpu_usage = 0.0f32;
        let mut total_memory_usage = 0.0f32;
        let mut total_latency = 0.0f32;
        let mut total_connections = 0u32;
        let mut total_rps = 0.0f32;
        let mut total_errors = 0.0f32;

        let node_count = cluster.nodes.len() as f32;

        for node_id in &cluster.nodes {
            if let Some(node) = nodes.get(node_id) {
                total_cpu += node.capabilities.cpu_cores;
                total_memory += node.capabilities.memory_mb;
                total_storage += node.capabilities.storage_gb;
                total_bandwidth += node.capabilities.bandwidth_mbps;

                if node.capabilities.gpu_acceleration { gpu_count += 1; }
                if node.capabilities.fpga_acceleration { fpga_count += 1; }
                if node.capabilities.wasm_runtime { wasm_nodes += 1; }

                total_cpu_usage += node.metrics.cpu_usage;
                total_memory_usage += node.metrics.memory_usage;
                total_latency += node.metrics.network_latency_ms;
                total_connections += node.metrics.active_connections;
                total_rps += node.metrics.requests_per_second;
                total_errors += node.metrics.error_rate;
            }
        }

        cluster.capacity = EdgeCapabilities {
            cpu_cores: total_cpu,
            memory_mb: total_memory,
            storage_gb: total_storage,
            bandwidth_mbps: total_bandwidth,
            gpu_acceleration: gpu_count > 0,
            fpga_acceleration: fpga_count > 0,
            wasm_runtime: wasm_nodes > 0,
            protocols: HashSet::new(), // TODO: Aggregate protocols
        };

        if node_count > 0.0 {
            cluster.utilization = EdgeMetrics {
                cpu_usage: total_cpu_usage / node_count,
                memory_usage: total_memory_usage / node_count,
                network_latency_ms: total_latency / node_count,
                active_connections: total_connections,
                requests_per_second: total_rps,
                error_rate: total_errors / node_count,
                timestamp: SystemTime::now(),
            };
        }
    }

    /// Start event processing background task
    async fn start_event_processing(&self) -> tokio::task::JoinHandle<()> {
        let event_rx = Arc::clone(&self.event_rx);
        
        tokio::spawn(async move {
            let mut rx = event_rx.lock().await;
            
            while let Some(event) = rx.recv().await {
                match event {
                    OrchestrationEvent::WorkloadSubmitted { workload_id, workload } => {
                        tracing::debug!("Processing workload submission: {}", workload_id);
                        // TODO: Additional processing logic
                    }
                    OrchestrationEvent::NodeJoined { node } => {
                        tracing::info!("Node {} joined orchestration", node.id);
                        // TODO: Rebalancing logic
                    }
                    OrchestrationEvent::NodeLeft { node_id, reason } => {
                        tracing::warn!("Node {} left: {}", node_id, reason);
                        // TODO: Failover logic
                    }
                    OrchestrationEvent::SlaViolation { workload_id, violation_type } => {
                        tracing::error!("SLA violation for workload {}: {}", workload_id, violation_type);
                        // TODO: SLA response actions
                    }
                    _ => {
                        tracing::debug!("Processed orchestration event: {:?}", event);
                    }
                }
            }
        })
    }

    /// Start auto-scaling background task
    async fn start_auto_scaling(&self) -> tokio::task::JoinHandle<()> {
        let clusters = Arc::clone(&self.clusters);
        
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(60));
            
            loop {
                ticker.tick().await;
                
                let clusters_guard = clusters.read().await;
                for cluster in clusters_guard.values() {
                    if cluster.auto_scaling.enabled {
                        // TODO: Implement scaling logic
                        tracing::debug!("Evaluating scaling for cluster {} (health: {:.2})", 
                                       cluster.id, cluster.health_score());
                    }
                }
            }
        })
    }

    /// Start SLA monitoring background task
    async fn start_sla_monitoring(&self) -> tokio::task::JoinHandle<()> {
        let slas = Arc::clone(&self.slas);
        let nodes = Arc::clone(&self.nodes);
        let placements = Arc::clone(&self.placements);
        let event_tx = self.event_tx.clone();
        
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(10));
            
            loop {
                ticker.tick().await;
                
                let slas_guard = slas.read().await;
                let nodes_guard = nodes.read().await;
                let placements_guard = placements.read().await;
                
                for sla in slas_guard.values() {
                    if let Some(&node_id) = placements_guard.get(&sla.workload_id) {
                        if let Some(node) = nodes_guard.get(&node_id) {
                            // Check SLA violations
                            if node.metrics.network_latency_ms > sla.max_latency_ms {
                                let _ = event_tx.send(OrchestrationEvent::SlaViolation {
                                    workload_id: sla.workload_id,
                                    violation_type: format!("Latency {}ms > {}ms", 
                                                          node.metrics.network_latency_ms,
                                                          sla.max_latency_ms),
                                });
                            }
                            
                            if node.metrics.error_rate > sla.max_error_rate {
                                let _ = event_tx.send(OrchestrationEvent::SlaViolation {
                                    workload_id: sla.workload_id,
                                    violation_type: format!("Error rate {:.2}% > {:.2}%",
                                                          node.metrics.error_rate * 100.0,
                                                          sla.max_error_rate * 100.0),
                                });
                            }
                        }
                    }
                }
            }
        })
    }

    /// Start placement optimization background task
    async fn start_placement_optimization(&self) -> tokio::task::JoinHandle<()> {
        let interval = self.config.placement_optimization_interval;
        
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            
            loop {
                ticker.tick().await;
                
                // TODO: Implement placement rebalancing logic
                tracing::debug!("Placement optimization cycle");
            }
        })
    }

    /// Start health monitoring background task
    async fn start_health_monitoring(&self) -> tokio::task::JoinHandle<()> {
        let nodes = Arc::clone(&self.nodes);
        let clusters = Arc::clone(&self.clusters);
        let event_tx = self.event_tx.clone();
        let interval = self.config.health_check_interval;
        
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            
            loop {
                ticker.tick().await;
                
                let mut unhealthy_nodes = Vec::new();
                
                {
                    let nodes_guard = nodes.read().await;
                    for (node_id, node) in nodes_guard.iter() {
                        if !node.is_healthy() {
                            unhealthy_nodes.push((*node_id, format!("Status: {:?}", node.status)));
                        }
                    }
                }
                
                for (node_id, reason) in unhealthy_nodes {
                    let _ = event_tx.send(OrchestrationEvent::NodeLeft { node_id, reason });
                }
                
                // Update cluster health
                let mut clusters_guard = clusters.write().await;
                let nodes_guard = nodes.read().await;
                for cluster in clusters_guard.values_mut() {
                    // Remove unhealthy nodes from clusters
                    cluster.nodes.retain(|node_id| {
                        nodes_guard.get(node_id)
                            .map(|node| node.is_healthy())
                            .unwrap_or(false)
                    });
                }
            }
        })
    }
}

/// Orchestration statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationStats {
    pub total_clusters: usize,
    pub total_nodes: usize,
    pub healthy_nodes: usize,
    pub total_workloads: usize,
    pub active_placements: usize,
    pub slas_monitored: usize,
    pub average_cluster_health: f32,
    pub average_node_cpu: f32,
    pub average_node_memory: f32,
}