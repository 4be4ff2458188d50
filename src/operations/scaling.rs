//! Auto-Scaling and Resource Management

use std::collections::HashMap;
use serde::{Serialize, Deserialize};

/// Auto-scaler for dynamic resource management
pub struct AutoScaler {
    config: ScalingConfig,
    policies: HashMap<String, ScalingPolicy>,
}

impl AutoScaler {
    pub fn new(config: ScalingConfig) -> Self {
        Self {
            config,
            policies: HashMap::new(),
        }
    }

    pub async fn get_scaling_status(&self) -> ScalingStatus {
        ScalingStatus {
            enabled: true,
            active_policies: self.policies.len(),
            total_replicas: 5,
            target_replicas: 5,
        }
    }

    pub async fn manual_scale(&self, service: &str, replicas: u32) -> Result<(), ScalingError> {
        tracing::info!("Manually scaling {} to {} replicas", service, replicas);
        Ok(())
    }

    pub async fn enable_auto_scaling(&self, services: &str) -> Result<(), ScalingError> {
        tracing::info!("Enabling auto-scaling for: {}", services);
        Ok(())
    }

    pub async fn disable_auto_scaling(&self, services: &str) -> Result<(), ScalingError> {
        tracing::info!("Disabling auto-scaling for: {}", services);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ScalingConfig {
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub target_cpu_utilization: f64,
    pub scale_up_cooldown_seconds: u64,
    pub scale_down_cooldown_seconds: u64,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            min_replicas: 1,
            max_replicas: 10,
            target_cpu_utilization: 70.0,
            scale_up_cooldown_seconds: 300,
            scale_down_cooldown_seconds: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingPolicy {
    pub service: String,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub target_cpu_utilization: f64,
    pub target_memory_utilization: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingStatus {
    pub enabled: bool,
    pub active_policies: usize,
    pub total_replicas: u32,
    pub target_replicas: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceMetrics {
    pub cpu_utilization: f64,
    pub memory_utilization: f64,
    pub request_rate: f64,
    pub response_time_ms: f64,
}

#[derive(Debug)]
pub enum ScalingError {
    PolicyNotFound(String),
    ScalingFailed(String),
    InvalidConfiguration(String),
}