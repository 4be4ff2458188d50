//! Testing Framework for BitCraps SDK
//!
//! Comprehensive testing utilities for game development and integration testing

use std::collections::HashMap;
use std::sync::Arc;
use serde::{Serialize, Deserialize};
use tokio::sync::RwLock;

use crate::gaming::{GameEngine, GameSession, PlayerJoinData, GameAction, GameActionResult};
use crate::sdk::client::BitCrapsClient;

/// Testing framework for BitCraps games and integrations
pub struct TestFramework {
    mock_environment: Arc<MockEnvironment>,
    test_scenarios: Vec<TestScenario>,
    test_results: Arc<RwLock<Vec<TestResult>>>,
}

impl TestFramework {
    pub fn new() -> Self {
        Self {
            mock_environment: Arc::new(MockEnvironment::new()),
            test_scenarios: Vec::new(),
            test_results: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Run all test scenarios
    pub async fn run_all_tests(&self) -> TestSummary {
        let mut passed = 0;
        let mut failed = 0;

        for scenario in &self.test_scenarios {
            match self.run_scenario(scenario).await {
                Ok(_) => passed += 1,
                Err(_) => failed += 1,
            }
        }

        TestSummary { passed, failed, total: self.test_scenarios.len() }
    }

    async fn run_scenario(&self, _scenario: &TestScenario) -> Result<(), TestError> {
        // Run individual test scenario
        Ok(())
    }
}

/// Mock environment for testing
pub struct MockEnvironment {
    mock_players: HashMap<String, MockPlayer>,
    mock_network: MockNetwork,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            mock_players: HashMap::new(),
            mock_network: MockNetwork::new(),
        }
    }

    pub fn add_mock_player(&mut self, player: MockPlayer) {
        self.mock_players.insert(player.id.clone(), player);
    }
}

/// Mock player for testing
#[derive(Debug, Clone)]
pub struct MockPlayer {
    pub id: String,
    pub balance: u64,
    pub behavior: PlayerBehavior,
}

#[derive(Debug, Clone)]
pub enum PlayerBehavior {
    Conservative,
    Aggressive,
    Random,
    Scripted(Vec<GameAction>),
}

/// Mock network for testing
pub struct MockNetwork {
    latency_ms: u64,
    packet_loss_rate: f64,
    bandwidth_limit: Option<u64>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self {
            latency_ms: 10,
            packet_loss_rate: 0.0,
            bandwidth_limit: None,
        }
    }
}

/// Test scenario definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestScenario {
    pub name: String,
    pub description: String,
    pub setup: ScenarioSetup,
    pub actions: Vec<TestAction>,
    pub expected_outcomes: Vec<ExpectedOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSetup {
    pub game_type: String,
    pub player_count: usize,
    pub initial_balances: Vec<u64>,
    pub game_config: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TestAction {
    PlayerJoin { player_id: String, balance: u64 },
    PerformAction { player_id: String, action: String },
    Wait { duration_ms: u64 },
    AssertState { condition: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExpectedOutcome {
    PlayerBalance { player_id: String, expected_balance: u64 },
    GameState { state: String },
    EventTriggered { event_type: String },
}

/// Test result
#[derive(Debug, Clone)]
pub struct TestResult {
    pub scenario_name: String,
    pub passed: bool,
    pub duration_ms: u64,
    pub error_message: Option<String>,
}

/// Test summary
#[derive(Debug, Clone)]
pub struct TestSummary {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

#[derive(Debug)]
pub enum TestError {
    SetupFailed(String),
    ActionFailed(String),
    AssertionFailed(String),
    TimeoutError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_creation() {
        let framework = TestFramework::new();
        assert_eq!(framework.test_scenarios.len(), 0);
    }

    #[test]
    fn test_mock_environment() {
        let mut env = MockEnvironment::new();
        let player = MockPlayer {
            id: "test_player".to_string(),
            balance: 1000,
            behavior: PlayerBehavior::Conservative,
        };
        env.add_mock_player(player);
        assert_eq!(env.mock_players.len(), 1);
    }
}