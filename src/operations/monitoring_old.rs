//! Infrastructure Monitoring for Production Operations

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use serde::{Serialize, Deserialize};

use crate::monitoring::alerting::{Alert, AlertSeverity};

/// Infrastructure monitoring system
pub struct InfrastructureMonitor {
    config: MonitoringConfig,
    metrics: Arc<RwLock<SystemMetrics>>,
    alert_rules: Arc<RwLock<Vec<AlertRule>>>,
}

impl InfrastructureMonitor {
    pub async fn new(config: MonitoringConfig) -> Result<Self, MonitoringError> {
        Ok(Self {
            config,
            metrics: Arc::new(RwLock::new(SystemMetrics::default())),
            alert_rules: Arc::new(RwLock::new(Vec::new())),
        })
    }

    pub async fn get_current_metrics(&self) -> SystemMetrics {
        self.metrics.read().await.clone()
    }

    pub async fn get_active_alerts(&self) -> Vec<Alert> {
        // Return active alerts
        vec![]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub cpu_usage_percent: f64,
    pub memory_usage_percent: f64,
    pub disk_usage_percent: f64,
    pub network_throughput_mbps: f64,
    pub active_connections: usize,
    pub request_rate: f64,
    pub error_rate: f64,
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self {
            cpu_usage_percent: 0.0,
            memory_usage_percent: 0.0,
            disk_usage_percent: 0.0,
            network_throughput_mbps: 0.0,
            active_connections: 0,
            request_rate: 0.0,
            error_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub collection_interval_seconds: u64,
    pub retention_days: u32,
    pub alert_thresholds: HashMap<String, f64>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            collection_interval_seconds: 60,
            retention_days: 30,
            alert_thresholds: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlertRule {
    pub name: String,
    pub metric: String,
    pub threshold: f64,
    pub severity: AlertSeverity,
}

#[derive(Debug)]
pub enum MonitoringError {
    InitializationFailed(String),
    DataCollectionFailed(String),
    AlertingFailed(String),
}