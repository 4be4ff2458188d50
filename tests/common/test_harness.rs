//! Comprehensive Test Harness Framework for BitCraps
//! 
//! This module provides a complete testing infrastructure for validating all
//! aspects of the BitCraps decentralized casino system.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::time::{sleep, timeout};

use bitcraps::{
    Error, Result,
    protocol::{PeerId, GameId, BitchatPacket},
    transport::{TransportCoordinator, TransportAddress},
    mesh::MeshService,
    gaming::GameOrchestrator,
    session::SessionManager,
    monitoring::{NetworkMetrics, HealthCheck},
};

/// Type alias for convenience
pub type TestResult<T = ()> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Network Simulator for Multi-Peer Testing
/// 
/// Simulates a realistic P2P network with configurable latency, 
/// packet loss, partitions, and Byzantine behavior.
#[derive(Debug)]
pub struct NetworkSimulator {
    /// Network topology - who is connected to whom
    pub topology: HashMap<PeerId, Vec<PeerId>>,
    /// Message routing delays
    pub latencies: HashMap<(PeerId, PeerId), Duration>,
    /// Packet loss rates (0.0 = no loss, 1.0 = all lost)
    pub packet_loss: HashMap<(PeerId, PeerId), f64>,
    /// Network partitions - isolated groups of nodes
    pub partitions: Vec<Vec<PeerId>>,
    /// Byzantine nodes that may behave maliciously
    pub byzantine_nodes: HashMap<PeerId, ByzantineMode>,
    /// Message queue for delayed delivery
    pub message_queue: Arc<Mutex<Vec<DelayedMessage>>>,
    /// Network statistics
    pub stats: NetworkStats,
}

/// Byzantine behavior modes for testing fault tolerance
#[derive(Debug, Clone)]
pub enum ByzantineMode {
    /// Node stops responding (crash fault)
    Silent,
    /// Node sends random/garbage messages
    Random,
    /// Node tries to fork consensus
    Equivocation,
    /// Node colludes with other Byzantine nodes
    Collusion(Vec<PeerId>),
    /// Node sends conflicting messages to different peers
    DoubleSending,
}

/// Delayed message for network simulation
#[derive(Debug, Clone)]
pub struct DelayedMessage {
    pub from: PeerId,
    pub to: PeerId,
    pub packet: BitchatPacket,
    pub deliver_at: SystemTime,
}

/// Network statistics for analysis
#[derive(Debug, Default)]
pub struct NetworkStats {
    pub messages_sent: u64,
    pub messages_delivered: u64,
    pub messages_dropped: u64,
    pub average_latency: Duration,
    pub partition_events: u32,
}

impl NetworkSimulator {
    /// Create a new network simulator
    pub fn new() -> Self {
        Self {
            topology: HashMap::new(),
            latencies: HashMap::new(),
            packet_loss: HashMap::new(),
            partitions: Vec::new(),
            byzantine_nodes: HashMap::new(),
            message_queue: Arc::new(Mutex::new(Vec::new())),
            stats: NetworkStats::default(),
        }
    }

    /// Add a node to the network
    pub async fn add_node(&mut self, peer_id: PeerId) -> TestResult {
        self.topology.insert(peer_id, Vec::new());
        Ok(())
    }

    /// Connect two nodes with specified latency
    pub async fn connect_nodes(&mut self, node_a: PeerId, node_b: PeerId, latency: Duration) -> TestResult {
        // Add bidirectional connection
        self.topology.entry(node_a).or_default().push(node_b);
        self.topology.entry(node_b).or_default().push(node_a);
        
        // Set latencies
        self.latencies.insert((node_a, node_b), latency);
        self.latencies.insert((node_b, node_a), latency);
        
        Ok(())
    }

    /// Set packet loss rate between two nodes
    pub fn set_packet_loss(&mut self, node_a: PeerId, node_b: PeerId, loss_rate: f64) {
        self.packet_loss.insert((node_a, node_b), loss_rate);
        self.packet_loss.insert((node_b, node_a), loss_rate);
    }

    /// Create a network partition
    pub async fn create_partition(&mut self, partition_a: Vec<PeerId>, partition_b: Vec<PeerId>) -> TestResult {
        self.partitions = vec![partition_a, partition_b];
        self.stats.partition_events += 1;
        Ok(())
    }

    /// Heal network partition
    pub async fn heal_partition(&mut self) -> TestResult {
        self.partitions.clear();
        Ok(())
    }

    /// Set Byzantine behavior for a node
    pub fn set_byzantine_behavior(&mut self, peer_id: PeerId, mode: ByzantineMode) {
        self.byzantine_nodes.insert(peer_id, mode);
    }

    /// Simulate message sending with network conditions
    pub async fn send_message(&mut self, from: PeerId, to: PeerId, packet: BitchatPacket) -> TestResult {
        self.stats.messages_sent += 1;

        // Check if nodes are in different partitions
        if self.are_partitioned(from, to) {
            self.stats.messages_dropped += 1;
            return Ok(()); // Message dropped due to partition
        }

        // Check packet loss
        let loss_rate = self.packet_loss.get(&(from, to)).unwrap_or(&0.0);
        if fastrand::f64() < *loss_rate {
            self.stats.messages_dropped += 1;
            return Ok(()); // Message lost
        }

        // Calculate delivery time
        let latency = self.latencies.get(&(from, to)).unwrap_or(&Duration::from_millis(10));
        let deliver_at = SystemTime::now() + *latency;

        // Apply Byzantine behavior
        let final_packet = self.apply_byzantine_behavior(from, packet)?;

        // Queue for delayed delivery
        let delayed_msg = DelayedMessage {
            from,
            to,
            packet: final_packet,
            deliver_at,
        };
        
        self.message_queue.lock().await.push(delayed_msg);
        Ok(())
    }

    /// Check if two nodes are partitioned
    fn are_partitioned(&self, node_a: PeerId, node_b: PeerId) -> bool {
        for partition in &self.partitions {
            if partition.contains(&node_a) && !partition.contains(&node_b) {
                return true;
            }
            if partition.contains(&node_b) && !partition.contains(&node_a) {
                return true;
            }
        }
        false
    }

    /// Apply Byzantine behavior to outgoing messages
    fn apply_byzantine_behavior(&self, from: PeerId, mut packet: BitchatPacket) -> TestResult<BitchatPacket> {
        if let Some(mode) = self.byzantine_nodes.get(&from) {
            match mode {
                ByzantineMode::Silent => {
                    // Silently drop message
                    return Err("Byzantine node silent".into());
                }
                ByzantineMode::Random => {
                    // Corrupt packet data
                    if let Some(ref mut payload) = packet.payload {
                        for byte in payload.iter_mut() {
                            if fastrand::f64() < 0.1 { // 10% corruption rate
                                *byte = fastrand::u8(..);
                            }
                        }
                    }
                }
                ByzantineMode::Equivocation => {
                    // This would require more complex logic to fork consensus
                    // For now, just corrupt sequence number
                    packet.sequence = fastrand::u64(..);
                }
                ByzantineMode::DoubleSending => {
                    // Send conflicting message (would need broader context)
                    packet.flags ^= 0xFF; // Flip all flags
                }
                ByzantineMode::Collusion(_) => {
                    // Implement collusion logic based on test scenario
                }
            }
        }
        Ok(packet)
    }

    /// Process queued messages for delivery
    pub async fn process_message_queue(&mut self) -> TestResult<Vec<(PeerId, BitchatPacket)>> {
        let mut queue = self.message_queue.lock().await;
        let now = SystemTime::now();
        let mut delivered = Vec::new();
        
        queue.retain(|msg| {
            if msg.deliver_at <= now {
                delivered.push((msg.to, msg.packet.clone()));
                self.stats.messages_delivered += 1;
                false
            } else {
                true
            }
        });
        
        Ok(delivered)
    }
}

impl Default for NetworkSimulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Device Emulator for Mobile Platform Simulation
/// 
/// Simulates mobile device conditions including battery drain,
/// thermal throttling, network switching, and background processing.
#[derive(Debug)]
pub struct DeviceEmulator {
    /// Current battery level (0.0 = empty, 1.0 = full)
    pub battery_level: f64,
    /// Battery drain rate per second
    pub battery_drain_rate: f64,
    /// Current CPU temperature in Celsius
    pub cpu_temperature: f64,
    /// Thermal throttling threshold
    pub thermal_threshold: f64,
    /// Current network type
    pub network_type: NetworkType,
    /// Background processing allowed
    pub background_allowed: bool,
    /// Memory pressure level (0.0 = none, 1.0 = critical)
    pub memory_pressure: f64,
    /// Device performance mode
    pub performance_mode: PerformanceMode,
}

/// Network connection types
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkType {
    Bluetooth,
    WiFi,
    Cellular4G,
    Cellular5G,
    Offline,
}

/// Device performance modes
#[derive(Debug, Clone, PartialEq)]
pub enum PerformanceMode {
    HighPerformance,
    Balanced,
    PowerSaver,
    Thermal,
}

impl DeviceEmulator {
    /// Create a new device emulator with default mobile conditions
    pub fn new_mobile() -> Self {
        Self {
            battery_level: 0.8, // 80% battery
            battery_drain_rate: 0.001, // 0.1% per second under load
            cpu_temperature: 35.0, // 35°C
            thermal_threshold: 80.0, // 80°C throttling
            network_type: NetworkType::Bluetooth,
            background_allowed: true,
            memory_pressure: 0.3, // 30% memory usage
            performance_mode: PerformanceMode::Balanced,
        }
    }

    /// Simulate passage of time and update device state
    pub async fn simulate_time(&mut self, duration: Duration) -> TestResult {
        let seconds = duration.as_secs_f64();
        
        // Drain battery
        self.battery_level = (self.battery_level - self.battery_drain_rate * seconds).max(0.0);
        
        // Update CPU temperature based on load
        let load_factor = match self.performance_mode {
            PerformanceMode::HighPerformance => 1.2,
            PerformanceMode::Balanced => 1.0,
            PerformanceMode::PowerSaver => 0.7,
            PerformanceMode::Thermal => 0.5,
        };
        
        self.cpu_temperature += load_factor * seconds * 0.5; // Gradual heating
        self.cpu_temperature = self.cpu_temperature.min(100.0); // Cap at 100°C
        
        // Check thermal throttling
        if self.cpu_temperature > self.thermal_threshold {
            self.performance_mode = PerformanceMode::Thermal;
        }
        
        // Update background processing based on battery
        self.background_allowed = self.battery_level > 0.2; // Disable below 20%
        
        Ok(())
    }

    /// Simulate network switching
    pub async fn switch_network(&mut self, network_type: NetworkType) -> TestResult {
        self.network_type = network_type;
        
        // Simulate connection delay
        let delay = match self.network_type {
            NetworkType::Bluetooth => Duration::from_millis(100),
            NetworkType::WiFi => Duration::from_millis(50),
            NetworkType::Cellular4G => Duration::from_millis(200),
            NetworkType::Cellular5G => Duration::from_millis(100),
            NetworkType::Offline => Duration::from_secs(0),
        };
        
        sleep(delay).await;
        Ok(())
    }

    /// Check if device can perform CPU-intensive operations
    pub fn can_perform_heavy_computation(&self) -> bool {
        self.battery_level > 0.1 && 
        self.cpu_temperature < self.thermal_threshold &&
        self.memory_pressure < 0.8
    }

    /// Get current network latency
    pub fn get_network_latency(&self) -> Duration {
        match self.network_type {
            NetworkType::Bluetooth => Duration::from_millis(20),
            NetworkType::WiFi => Duration::from_millis(5),
            NetworkType::Cellular4G => Duration::from_millis(100),
            NetworkType::Cellular5G => Duration::from_millis(30),
            NetworkType::Offline => Duration::from_secs(999),
        }
    }
}

/// Chaos Injector for Failure Testing
/// 
/// Systematically introduces failures to test system resilience.
#[derive(Debug)]
pub struct ChaosInjector {
    /// Currently active chaos scenarios
    pub active_scenarios: Vec<ChaosScenario>,
    /// Failure injection rate (0.0 = none, 1.0 = constant)
    pub injection_rate: f64,
    /// Random seed for reproducible chaos
    pub seed: u64,
}

/// Types of chaos to inject
#[derive(Debug, Clone)]
pub enum ChaosScenario {
    /// Kill random processes/connections
    ProcessKill { target: ProcessTarget, frequency: Duration },
    /// Inject network delays
    NetworkDelay { min_delay: Duration, max_delay: Duration },
    /// Corrupt memory/data
    DataCorruption { corruption_rate: f64 },
    /// Exhaust system resources
    ResourceExhaustion { resource: ResourceType },
    /// Simulate disk failures
    DiskFailure { failure_rate: f64 },
    /// Clock skew between nodes
    ClockSkew { skew_range: Duration },
}

/// Process targets for chaos injection
#[derive(Debug, Clone)]
pub enum ProcessTarget {
    RandomNode,
    ConsensusNodes,
    NetworkTransport,
    DatabaseConnections,
}

/// System resources to exhaust
#[derive(Debug, Clone)]
pub enum ResourceType {
    Memory,
    FileDescriptors,
    NetworkConnections,
    DiskSpace,
}

impl ChaosInjector {
    /// Create a new chaos injector
    pub fn new(seed: u64) -> Self {
        Self {
            active_scenarios: Vec::new(),
            injection_rate: 0.1, // 10% failure rate
            seed,
        }
    }

    /// Add a chaos scenario
    pub fn add_scenario(&mut self, scenario: ChaosScenario) {
        self.active_scenarios.push(scenario);
    }

    /// Remove all chaos scenarios
    pub fn clear_scenarios(&mut self) {
        self.active_scenarios.clear();
    }

    /// Inject chaos based on current scenarios
    pub async fn inject_chaos(&self) -> TestResult<Vec<ChaosEvent>> {
        let mut events = Vec::new();
        
        for scenario in &self.active_scenarios {
            if fastrand::f64() < self.injection_rate {
                let event = self.execute_scenario(scenario).await?;
                events.push(event);
            }
        }
        
        Ok(events)
    }

    /// Execute a specific chaos scenario
    async fn execute_scenario(&self, scenario: &ChaosScenario) -> TestResult<ChaosEvent> {
        match scenario {
            ChaosScenario::ProcessKill { target, .. } => {
                Ok(ChaosEvent::ProcessKilled { target: target.clone() })
            }
            ChaosScenario::NetworkDelay { min_delay, max_delay } => {
                let delay_range = max_delay.as_millis() - min_delay.as_millis();
                let delay = Duration::from_millis(
                    min_delay.as_millis() + fastrand::u64(..=delay_range)
                );
                Ok(ChaosEvent::NetworkDelayed { delay })
            }
            ChaosScenario::DataCorruption { corruption_rate } => {
                Ok(ChaosEvent::DataCorrupted { rate: *corruption_rate })
            }
            ChaosScenario::ResourceExhaustion { resource } => {
                Ok(ChaosEvent::ResourceExhausted { resource: resource.clone() })
            }
            ChaosScenario::DiskFailure { .. } => {
                Ok(ChaosEvent::DiskFailed)
            }
            ChaosScenario::ClockSkew { skew_range } => {
                let skew = Duration::from_millis(
                    fastrand::u64(..=skew_range.as_millis())
                );
                Ok(ChaosEvent::ClockSkewed { skew })
            }
        }
    }
}

/// Chaos events that have been injected
#[derive(Debug, Clone)]
pub enum ChaosEvent {
    ProcessKilled { target: ProcessTarget },
    NetworkDelayed { delay: Duration },
    DataCorrupted { rate: f64 },
    ResourceExhausted { resource: ResourceType },
    DiskFailed,
    ClockSkewed { skew: Duration },
}

/// Test Environment Orchestrator
/// 
/// Coordinates complex test scenarios across multiple components.
#[derive(Debug)]
pub struct TestOrchestrator {
    /// Network simulator
    pub network: NetworkSimulator,
    /// Device emulators keyed by peer ID
    pub devices: HashMap<PeerId, DeviceEmulator>,
    /// Chaos injector
    pub chaos: ChaosInjector,
    /// Test nodes participating in scenarios
    pub nodes: HashMap<PeerId, TestNode>,
    /// Global test metrics
    pub metrics: TestMetrics,
}

/// Test node representing a participant in the network
#[derive(Debug)]
pub struct TestNode {
    pub peer_id: PeerId,
    pub transport: Option<Arc<TransportCoordinator>>,
    pub mesh_service: Option<Arc<MeshService>>,
    pub game_orchestrator: Option<Arc<GameOrchestrator>>,
    pub session_manager: Option<Arc<SessionManager>>,
    pub message_rx: Option<mpsc::Receiver<BitchatPacket>>,
}

/// Test metrics collected during scenarios
#[derive(Debug, Default)]
pub struct TestMetrics {
    pub scenarios_run: u32,
    pub assertions_passed: u32,
    pub assertions_failed: u32,
    pub consensus_rounds: u32,
    pub byzantine_events: u32,
    pub partition_recoveries: u32,
    pub average_consensus_time: Duration,
}

impl TestOrchestrator {
    /// Create a new test orchestrator
    pub fn new() -> Self {
        Self {
            network: NetworkSimulator::new(),
            devices: HashMap::new(),
            chaos: ChaosInjector::new(42), // Fixed seed for reproducibility
            nodes: HashMap::new(),
            metrics: TestMetrics::default(),
        }
    }

    /// Add a test node to the orchestrator
    pub async fn add_node(&mut self, peer_id: PeerId) -> TestResult {
        self.network.add_node(peer_id).await?;
        self.devices.insert(peer_id, DeviceEmulator::new_mobile());
        
        let node = TestNode {
            peer_id,
            transport: None,
            mesh_service: None,
            game_orchestrator: None,
            session_manager: None,
            message_rx: None,
        };
        
        self.nodes.insert(peer_id, node);
        Ok(())
    }

    /// Create a fully connected mesh network
    pub async fn create_mesh_topology(&mut self, node_count: usize) -> TestResult<Vec<PeerId>> {
        let mut nodes = Vec::new();
        
        // Create nodes
        for i in 0..node_count {
            let mut peer_id = [0u8; 32];
            peer_id[0] = i as u8;
            nodes.push(peer_id);
            self.add_node(peer_id).await?;
        }
        
        // Connect all nodes to each other
        for i in 0..nodes.len() {
            for j in i+1..nodes.len() {
                self.network.connect_nodes(
                    nodes[i], 
                    nodes[j], 
                    Duration::from_millis(10 + fastrand::u64(..=40)) // 10-50ms latency
                ).await?;
            }
        }
        
        Ok(nodes)
    }

    /// Run a comprehensive test scenario
    pub async fn run_scenario<F, Fut>(&mut self, scenario_name: &str, test_fn: F) -> TestResult
    where
        F: FnOnce(&mut Self) -> Fut,
        Fut: std::future::Future<Output = TestResult>,
    {
        println!("Starting scenario: {}", scenario_name);
        self.metrics.scenarios_run += 1;
        
        let start_time = SystemTime::now();
        
        // Run the test scenario
        let result = test_fn(self).await;
        
        let elapsed = start_time.elapsed().unwrap_or_default();
        println!("Scenario {} completed in {:?}", scenario_name, elapsed);
        
        match result {
            Ok(_) => {
                println!("✅ Scenario {} PASSED", scenario_name);
                self.metrics.assertions_passed += 1;
            }
            Err(e) => {
                println!("❌ Scenario {} FAILED: {}", scenario_name, e);
                self.metrics.assertions_failed += 1;
            }
        }
        
        result
    }

    /// Generate a test summary report
    pub fn generate_report(&self) -> String {
        format!(
            "Test Report\n\
             ===========\n\
             Scenarios Run: {}\n\
             Assertions Passed: {}\n\
             Assertions Failed: {}\n\
             Consensus Rounds: {}\n\
             Byzantine Events: {}\n\
             Partition Recoveries: {}\n\
             Average Consensus Time: {:?}\n\
             \n\
             Network Stats:\n\
             - Messages Sent: {}\n\
             - Messages Delivered: {}\n\
             - Messages Dropped: {}\n\
             - Partition Events: {}\n",
            self.metrics.scenarios_run,
            self.metrics.assertions_passed,
            self.metrics.assertions_failed,
            self.metrics.consensus_rounds,
            self.metrics.byzantine_events,
            self.metrics.partition_recoveries,
            self.metrics.average_consensus_time,
            self.network.stats.messages_sent,
            self.network.stats.messages_delivered,
            self.network.stats.messages_dropped,
            self.network.stats.partition_events,
        )
    }
}

impl Default for TestOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Utility functions for common test operations
pub mod test_utils {
    use super::*;
    
    /// Generate a random peer ID for testing
    pub fn random_peer_id() -> PeerId {
        let mut id = [0u8; 32];
        use rand::RngCore;
        let mut rng = rand::rngs::OsRng;
        rng.fill_bytes(&mut id);
        id
    }
    
    /// Create a test game ID
    pub fn test_game_id() -> GameId {
        let mut id = [0u8; 16];
        use rand::RngCore;
        let mut rng = rand::rngs::OsRng;
        rng.fill_bytes(&mut id);
        id
    }
    
    /// Wait for a condition with timeout
    pub async fn wait_for_condition<F, Fut>(
        mut condition: F,
        timeout_duration: Duration,
        check_interval: Duration,
    ) -> TestResult<bool>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        let result = timeout(timeout_duration, async {
            loop {
                if condition().await {
                    return true;
                }
                sleep(check_interval).await;
            }
        }).await;
        
        Ok(result.unwrap_or(false))
    }
    
    /// Assert that a condition holds within a timeout
    #[macro_export]
    macro_rules! assert_eventually {
        ($condition:expr, $timeout:expr) => {
            {
                let condition_met = test_utils::wait_for_condition(
                    || async { $condition },
                    $timeout,
                    Duration::from_millis(100),
                ).await?;
                assert!(condition_met, "Condition never became true within timeout");
            }
        };
    }
    
    pub use assert_eventually;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Duration;

    #[tokio::test]
    async fn test_network_simulator() -> TestResult {
        let mut sim = NetworkSimulator::new();
        
        let peer_a = [1u8; 32];
        let peer_b = [2u8; 32];
        
        sim.add_node(peer_a).await?;
        sim.add_node(peer_b).await?;
        sim.connect_nodes(peer_a, peer_b, Duration::from_millis(10)).await?;
        
        // Test basic connectivity
        assert!(sim.topology.contains_key(&peer_a));
        assert!(sim.topology.contains_key(&peer_b));
        assert_eq!(sim.latencies.get(&(peer_a, peer_b)), Some(&Duration::from_millis(10)));
        
        Ok(())
    }

    #[tokio::test]
    async fn test_device_emulator() -> TestResult {
        let mut device = DeviceEmulator::new_mobile();
        
        assert_eq!(device.battery_level, 0.8);
        assert_eq!(device.network_type, NetworkType::Bluetooth);
        
        // Simulate 10 seconds
        device.simulate_time(Duration::from_secs(10)).await?;
        
        // Battery should have drained
        assert!(device.battery_level < 0.8);
        
        Ok(())
    }

    #[tokio::test]
    async fn test_chaos_injector() -> TestResult {
        let mut chaos = ChaosInjector::new(42);
        
        chaos.add_scenario(ChaosScenario::NetworkDelay {
            min_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
        });
        
        let events = chaos.inject_chaos().await?;
        
        // Events may or may not be generated based on injection rate
        // This just tests that the mechanism works without panicking
        println!("Chaos events generated: {:?}", events);
        
        Ok(())
    }

    #[tokio::test]
    async fn test_orchestrator() -> TestResult {
        let mut orchestrator = TestOrchestrator::new();
        
        let nodes = orchestrator.create_mesh_topology(3).await?;
        assert_eq!(nodes.len(), 3);
        
        orchestrator.run_scenario("test_scenario", |_orch| async {
            Ok(()) // Simple passing scenario
        }).await?;
        
        assert_eq!(orchestrator.metrics.scenarios_run, 1);
        assert_eq!(orchestrator.metrics.assertions_passed, 1);
        
        let report = orchestrator.generate_report();
        assert!(report.contains("Scenarios Run: 1"));
        
        Ok(())
    }
}