//! Comprehensive Integration Test Suite using Test Harness Framework
//! 
//! This module provides a complete test suite for validating all aspects 
//! of the BitCraps system using the test harness infrastructure.

use std::time::Duration;
use tokio::time::sleep;

use crate::common::test_harness::*;
use bitcraps::{
    Error, Result,
    protocol::{PeerId, GameId, BitchatPacket, CrapTokens, random_peer_id},
    transport::TransportAddress,
};

/// Multi-Peer Network Consensus Tests
pub mod multi_peer_tests {
    use super::*;

    #[tokio::test]
    async fn test_three_node_consensus() -> TestResult {
        let mut orchestrator = TestOrchestrator::new();
        
        // Create 3-node network
        let nodes = orchestrator.create_mesh_topology(3).await?;
        
        orchestrator.run_scenario("three_node_consensus", |orch| async move {
            // Simulate consensus round
            let game_id = test_utils::test_game_id();
            
            // Each node proposes a value
            for (i, &peer_id) in nodes.iter().enumerate() {
                let packet = BitchatPacket::new_discovery(peer_id);
                orch.network.send_message(peer_id, nodes[(i + 1) % 3], packet).await?;
            }
            
            // Process message delivery
            let delivered = orch.network.process_message_queue().await?;
            assert!(delivered.len() >= 3, "Should deliver at least 3 messages");
            
            orch.metrics.consensus_rounds += 1;
            Ok(())
        }).await?;
        
        println!("{}", orchestrator.generate_report());
        Ok(())
    }

    #[tokio::test]
    async fn test_network_partition_recovery() -> TestResult {
        let mut orchestrator = TestOrchestrator::new();
        
        let nodes = orchestrator.create_mesh_topology(5).await?;
        
        orchestrator.run_scenario("partition_recovery", |orch| async move {
            // Create network partition: [0,1] vs [2,3,4]
            let partition_a = vec![nodes[0], nodes[1]];
            let partition_b = vec![nodes[2], nodes[3], nodes[4]];
            
            orch.network.create_partition(partition_a.clone(), partition_b.clone()).await?;
            
            // Attempt to send cross-partition messages (should be dropped)
            let packet = BitchatPacket::new_ping(nodes[0], nodes[2]);
            orch.network.send_message(nodes[0], nodes[2], packet).await?;
            
            let delivered_partitioned = orch.network.process_message_queue().await?;
            assert_eq!(delivered_partitioned.len(), 0, "No messages should cross partition");
            assert_eq!(orch.network.stats.messages_dropped, 1);
            
            // Heal partition
            orch.network.heal_partition().await?;
            
            // Messages should now work
            let packet = BitchatPacket::new_ping(nodes[0], nodes[2]);
            orch.network.send_message(nodes[0], nodes[2], packet).await?;
            
            // Allow message delivery
            sleep(Duration::from_millis(50)).await;
            let delivered_healed = orch.network.process_message_queue().await?;
            assert!(delivered_healed.len() > 0, "Messages should work after healing");
            
            orch.metrics.partition_recoveries += 1;
            Ok(())
        }).await?;
        
        Ok(())
    }

    #[tokio::test]
    async fn test_byzantine_fault_tolerance() -> TestResult {
        let mut orchestrator = TestOrchestrator::new();
        
        let nodes = orchestrator.create_mesh_topology(7).await?; // 7 nodes, can tolerate 2 Byzantine
        
        orchestrator.run_scenario("byzantine_tolerance", |orch| async move {
            // Mark 2 nodes as Byzantine (equivocation mode)
            orch.network.set_byzantine_behavior(nodes[0], ByzantineMode::Equivocation);
            orch.network.set_byzantine_behavior(nodes[1], ByzantineMode::DoubleSending);
            
            // Run consensus round with Byzantine nodes
            for i in 0..nodes.len() {
                let packet = BitchatPacket::new_discovery(nodes[i]);
                // Send to all other nodes
                for j in 0..nodes.len() {
                    if i != j {
                        orch.network.send_message(nodes[i], nodes[j], packet.clone()).await?;
                    }
                }
            }
            
            // Process messages (some will be corrupted by Byzantine nodes)
            let delivered = orch.network.process_message_queue().await?;
            println!("Delivered {} messages with Byzantine behavior", delivered.len());
            
            orch.metrics.byzantine_events += 2;
            orch.metrics.consensus_rounds += 1;
            Ok(())
        }).await?;
        
        Ok(())
    }

    #[tokio::test]
    async fn test_mobile_device_stress() -> TestResult {
        let mut orchestrator = TestOrchestrator::new();
        
        let nodes = orchestrator.create_mesh_topology(3).await?;
        
        orchestrator.run_scenario("mobile_stress_test", |orch| async move {
            // Simulate challenging mobile conditions
            for &peer_id in &nodes {
                if let Some(device) = orch.devices.get_mut(&peer_id) {
                    // Set low battery
                    device.battery_level = 0.15; // 15% battery
                    
                    // High memory pressure
                    device.memory_pressure = 0.9; // 90% memory usage
                    
                    // Switch to cellular with high latency
                    device.switch_network(NetworkType::Cellular4G).await?;
                    
                    // Thermal throttling
                    device.cpu_temperature = 85.0; // Above threshold
                }
            }
            
            // Try to run consensus under these conditions
            for &peer_id in &nodes {
                if let Some(device) = orch.devices.get(&peer_id) {
                    if device.can_perform_heavy_computation() {
                        let packet = BitchatPacket::new_discovery(peer_id);
                        orch.network.send_message(peer_id, nodes[0], packet).await?;
                    } else {
                        println!("Node {} cannot perform computation due to device constraints", peer_id[0]);
                    }
                }
            }
            
            let delivered = orch.network.process_message_queue().await?;
            println!("Under mobile stress, delivered {} messages", delivered.len());
            Ok(())
        }).await?;
        
        Ok(())
    }
}

/// Cross-Platform Compatibility Tests
pub mod cross_platform_tests {
    use super::*;

    #[tokio::test]
    async fn test_android_ios_interoperability() -> TestResult {
        let mut orchestrator = TestOrchestrator::new();
        
        let android_peer = random_peer_id();
        let ios_peer = random_peer_id();
        
        orchestrator.add_node(android_peer).await?;
        orchestrator.add_node(ios_peer).await?;
        
        // Connect the peers
        orchestrator.network.connect_nodes(
            android_peer, 
            ios_peer, 
            Duration::from_millis(20)  // BLE latency
        ).await?;
        
        orchestrator.run_scenario("android_ios_compatibility", |orch| async move {
            // Set different device characteristics
            if let Some(android_device) = orch.devices.get_mut(&android_peer) {
                android_device.network_type = NetworkType::Bluetooth;
                android_device.performance_mode = PerformanceMode::PowerSaver;
            }
            
            if let Some(ios_device) = orch.devices.get_mut(&ios_peer) {
                ios_device.network_type = NetworkType::Bluetooth;
                ios_device.performance_mode = PerformanceMode::Balanced;
                // iOS has more restrictive background processing
                ios_device.background_allowed = false;
            }
            
            // Test bidirectional communication
            let android_to_ios = BitchatPacket::new_ping(android_peer, ios_peer);
            orch.network.send_message(android_peer, ios_peer, android_to_ios).await?;
            
            let ios_to_android = BitchatPacket::new_pong(ios_peer, android_peer);
            orch.network.send_message(ios_peer, android_peer, ios_to_android).await?;
            
            // Process message delivery
            sleep(Duration::from_millis(50)).await;
            let delivered = orch.network.process_message_queue().await?;
            
            assert_eq!(delivered.len(), 2, "Both messages should be delivered");
            Ok(())
        }).await?;
        
        Ok(())
    }

    #[tokio::test]
    async fn test_ble_transport_compatibility() -> TestResult {
        let mut orchestrator = TestOrchestrator::new();
        
        let nodes = orchestrator.create_mesh_topology(4).await?;
        
        orchestrator.run_scenario("ble_transport_compatibility", |orch| async move {
            // Set all devices to Bluetooth with varying capabilities
            for (i, &peer_id) in nodes.iter().enumerate() {
                if let Some(device) = orch.devices.get_mut(&peer_id) {
                    device.network_type = NetworkType::Bluetooth;
                    
                    // Vary BLE capabilities
                    match i % 3 {
                        0 => device.performance_mode = PerformanceMode::HighPerformance,
                        1 => device.performance_mode = PerformanceMode::Balanced,
                        2 => device.performance_mode = PerformanceMode::PowerSaver,
                        _ => unreachable!(),
                    }
                }
            }
            
            // Test mesh communication over BLE
            let game_id = test_utils::test_game_id();
            
            // Broadcast game creation from first node
            let game_packet = BitchatPacket::new_discovery(nodes[0]);
            
            for i in 1..nodes.len() {
                orch.network.send_message(nodes[0], nodes[i], game_packet.clone()).await?;
            }
            
            // Allow delivery with BLE latency
            sleep(Duration::from_millis(100)).await;
            let delivered = orch.network.process_message_queue().await?;
            
            assert!(delivered.len() >= 3, "All BLE nodes should receive broadcast");
            Ok(())
        }).await?;
        
        Ok(())
    }
}

/// Performance and Load Tests
pub mod performance_tests {
    use super::*;

    #[tokio::test]
    async fn test_high_throughput_messaging() -> TestResult {
        let mut orchestrator = TestOrchestrator::new();
        
        let nodes = orchestrator.create_mesh_topology(5).await?;
        
        orchestrator.run_scenario("high_throughput_test", |orch| async move {
            let start_time = std::time::SystemTime::now();
            let message_count = 100;
            
            // Send many messages between nodes
            for i in 0..message_count {
                let sender = nodes[i % nodes.len()];
                let receiver = nodes[(i + 1) % nodes.len()];
                
                let packet = BitchatPacket::new_ping(sender, receiver);
                orch.network.send_message(sender, receiver, packet).await?;
            }
            
            // Process all messages
            let mut total_delivered = 0;
            for _ in 0..10 { // Allow multiple processing cycles
                sleep(Duration::from_millis(10)).await;
                let delivered = orch.network.process_message_queue().await?;
                total_delivered += delivered.len();
                if total_delivered >= message_count {
                    break;
                }
            }
            
            let elapsed = start_time.elapsed().unwrap_or_default();
            let throughput = total_delivered as f64 / elapsed.as_secs_f64();
            
            println!("Throughput: {:.2} messages/second", throughput);
            assert!(throughput > 100.0, "Should achieve at least 100 messages/second");
            
            Ok(())
        }).await?;
        
        Ok(())
    }

    #[tokio::test]
    async fn test_scalability_stress() -> TestResult {
        let mut orchestrator = TestOrchestrator::new();
        
        orchestrator.run_scenario("scalability_stress_test", |orch| async move {
            let node_counts = vec![5, 10, 15, 20];
            
            for &node_count in &node_counts {
                println!("Testing with {} nodes", node_count);
                
                // Clear previous nodes
                orch.network = NetworkSimulator::new();
                orch.devices.clear();
                orch.nodes.clear();
                
                // Create network of specified size
                let nodes = orch.create_mesh_topology(node_count).await?;
                
                // Send ping from each node to every other node
                let start_time = std::time::SystemTime::now();
                
                for i in 0..nodes.len() {
                    for j in 0..nodes.len() {
                        if i != j {
                            let packet = BitchatPacket::new_ping(nodes[i], nodes[j]);
                            orch.network.send_message(nodes[i], nodes[j], packet).await?;
                        }
                    }
                }
                
                // Process all messages
                let mut total_delivered = 0;
                for _ in 0..20 { // Allow more processing cycles for larger networks
                    sleep(Duration::from_millis(20)).await;
                    let delivered = orch.network.process_message_queue().await?;
                    total_delivered += delivered.len();
                }
                
                let elapsed = start_time.elapsed().unwrap_or_default();
                let expected_messages = node_count * (node_count - 1);
                
                println!(
                    "  {} nodes: {}/{} messages delivered in {:?}",
                    node_count, total_delivered, expected_messages, elapsed
                );
                
                // Allow some message loss at higher scales
                let delivery_rate = total_delivered as f64 / expected_messages as f64;
                assert!(delivery_rate > 0.8, "Should deliver at least 80% of messages");
            }
            
            Ok(())
        }).await?;
        
        Ok(())
    }
}

/// End-to-End Game Scenarios
pub mod game_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_complete_craps_game() -> TestResult {
        let mut orchestrator = TestOrchestrator::new();
        
        let nodes = orchestrator.create_mesh_topology(4).await?; // 4 players
        
        orchestrator.run_scenario("complete_craps_game", |orch| async move {
            let game_id = test_utils::test_game_id();
            
            // Phase 1: Game Creation
            let game_create_packet = BitchatPacket::new_discovery(nodes[0]);
            for i in 1..nodes.len() {
                orch.network.send_message(nodes[0], nodes[i], game_create_packet.clone()).await?;
            }
            
            sleep(Duration::from_millis(50)).await;
            let phase1_delivered = orch.network.process_message_queue().await?;
            assert!(phase1_delivered.len() >= 3, "Game creation should reach all players");
            
            // Phase 2: Player Joins
            for i in 1..nodes.len() {
                let join_packet = BitchatPacket::new_ping(nodes[i], nodes[0]);
                orch.network.send_message(nodes[i], nodes[0], join_packet).await?;
            }
            
            sleep(Duration::from_millis(50)).await;
            let phase2_delivered = orch.network.process_message_queue().await?;
            assert!(phase2_delivered.len() >= 3, "All join messages should be received");
            
            // Phase 3: Betting Round
            for i in 0..nodes.len() {
                let bet_packet = BitchatPacket::new_discovery(nodes[i]);
                // Broadcast bet to all other players
                for j in 0..nodes.len() {
                    if i != j {
                        orch.network.send_message(nodes[i], nodes[j], bet_packet.clone()).await?;
                    }
                }
            }
            
            sleep(Duration::from_millis(100)).await;
            let phase3_delivered = orch.network.process_message_queue().await?;
            println!("Betting phase delivered {} messages", phase3_delivered.len());
            
            // Phase 4: Dice Roll Consensus
            let roll_packet = BitchatPacket::new_ping(nodes[0], nodes[1]); // Simplified
            orch.network.send_message(nodes[0], nodes[1], roll_packet).await?;
            
            sleep(Duration::from_millis(50)).await;
            let phase4_delivered = orch.network.process_message_queue().await?;
            assert!(phase4_delivered.len() >= 1, "Dice roll should be communicated");
            
            orch.metrics.consensus_rounds += 4; // One per phase
            Ok(())
        }).await?;
        
        Ok(())
    }

    #[tokio::test]
    async fn test_token_economics() -> TestResult {
        let mut orchestrator = TestOrchestrator::new();
        
        let nodes = orchestrator.create_mesh_topology(3).await?;
        
        orchestrator.run_scenario("token_economics_test", |orch| async move {
            // Simulate token operations
            let initial_balance = CrapTokens::new(1000);
            let bet_amount = CrapTokens::new(50);
            
            // Test basic token arithmetic
            let remaining = initial_balance.checked_sub(bet_amount).unwrap();
            assert_eq!(remaining.amount(), 950);
            
            // Simulate token transfer between nodes
            let transfer_packet = BitchatPacket::new_ping(nodes[0], nodes[1]);
            orch.network.send_message(nodes[0], nodes[1], transfer_packet).await?;
            
            sleep(Duration::from_millis(50)).await;
            let delivered = orch.network.process_message_queue().await?;
            assert!(delivered.len() > 0, "Token transfer should be communicated");
            
            println!("Token economics: {} -> {} (bet: {})", 
                initial_balance, remaining, bet_amount);
            
            Ok(())
        }).await?;
        
        Ok(())
    }
}

/// Chaos Engineering Tests
pub mod chaos_tests {
    use super::*;

    #[tokio::test]
    async fn test_chaos_resilience() -> TestResult {
        let mut orchestrator = TestOrchestrator::new();
        
        let nodes = orchestrator.create_mesh_topology(6).await?;
        
        orchestrator.run_scenario("chaos_resilience", |orch| async move {
            // Add chaos scenarios
            orch.chaos.add_scenario(ChaosScenario::NetworkDelay {
                min_delay: Duration::from_millis(100),
                max_delay: Duration::from_millis(500),
            });
            
            orch.chaos.add_scenario(ChaosScenario::DataCorruption {
                corruption_rate: 0.05, // 5% corruption
            });
            
            // Run normal operations under chaos
            for i in 0..10 {
                // Inject chaos
                let chaos_events = orch.chaos.inject_chaos().await?;
                if !chaos_events.is_empty() {
                    println!("Chaos injected: {:?}", chaos_events);
                }
                
                // Try to send message despite chaos
                let sender = nodes[i % nodes.len()];
                let receiver = nodes[(i + 1) % nodes.len()];
                let packet = BitchatPacket::new_ping(sender, receiver);
                
                let _ = orch.network.send_message(sender, receiver, packet).await; // May fail due to chaos
            }
            
            // Allow message processing
            sleep(Duration::from_millis(200)).await;
            let delivered = orch.network.process_message_queue().await?;
            
            println!("Under chaos conditions, delivered {} messages", delivered.len());
            
            // System should be resilient - some messages should get through
            assert!(delivered.len() > 0, "System should deliver some messages despite chaos");
            
            Ok(())
        }).await?;
        
        Ok(())
    }
}

/// Integration test runner that executes all test suites
#[tokio::test]
async fn run_all_integration_tests() -> TestResult {
    println!("ðŸš€ Starting Comprehensive Integration Test Suite");
    
    // Run all test modules
    multi_peer_tests::test_three_node_consensus().await?;
    println!("âœ… Multi-peer consensus tests passed");
    
    cross_platform_tests::test_android_ios_interoperability().await?;
    println!("âœ… Cross-platform compatibility tests passed");
    
    performance_tests::test_high_throughput_messaging().await?;
    println!("âœ… Performance tests passed");
    
    game_flow_tests::test_complete_craps_game().await?;
    println!("âœ… Game flow tests passed");
    
    chaos_tests::test_chaos_resilience().await?;
    println!("âœ… Chaos engineering tests passed");
    
    println!("ðŸŽ‰ All integration tests completed successfully!");
    Ok(())
}