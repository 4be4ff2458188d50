//! Health Checking and Auto-Healing

use std::time::SystemTime;
use serde::{Serialize, Deserialize};

/// Health checker for system components
pub struct HealthChecker {
    config: HealthConfig,
    auto_healer: AutoHealer,
}

impl HealthChecker {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config: config.clone(),
            auto_healer: AutoHealer::new(config),
        }
    }

    pub async fn check_health(&self, component: &str) -> Result<HealthStatus, HealthError> {
        tracing::info!("Checking health for component: {}", component);

        // Simulate health check
        Ok(HealthStatus::Healthy)
    }

    pub async fn get_health_history(&self, limit: usize, component: Option<&str>) -> Vec<HealthHistoryEntry> {
        vec![]
    }
}

/// Auto-healer for automatic problem resolution
pub struct AutoHealer {
    config: HealthConfig,
}

impl AutoHealer {
    pub fn new(config: HealthConfig) -> Self {
        Self { config }
    }

    pub async fn attempt_healing(&self, issue: &HealthIssue) -> Result<(), HealingError> {
        tracing::info!("Attempting to heal issue: {:?}", issue);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub check_interval_seconds: u64,
    pub auto_healing_enabled: bool,
    pub health_timeout_seconds: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: 30,
            auto_healing_enabled: true,
            health_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct HealthHistoryEntry {
    pub timestamp: SystemTime,
    pub component: String,
    pub status: HealthStatus,
    pub details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HealthIssue {
    pub component: String,
    pub issue_type: IssueType,
    pub severity: IssueSeverity,
}

#[derive(Debug, Clone)]
pub enum IssueType {
    HighCpu,
    HighMemory,
    DiskFull,
    NetworkError,
    ServiceDown,
    Other(String),
}

#[derive(Debug, Clone)]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug)]
pub enum HealthError {
    CheckFailed(String),
    Timeout,
    ComponentNotFound(String),
}

#[derive(Debug)]
pub enum HealingError {
    HealingFailed(String),
    NotSupported(String),
}