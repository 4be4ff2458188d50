//! Security Monitoring and Incident Response

use serde::{Serialize, Deserialize};

/// Security monitoring system
pub struct SecurityMonitor {
    config: SecurityConfig,
    threat_detector: ThreatDetector,
    incident_responder: IncidentResponder,
}

impl SecurityMonitor {
    pub fn new(config: SecurityConfig) -> Self {
        Self {
            config,
            threat_detector: ThreatDetector::new(),
            incident_responder: IncidentResponder::new(),
        }
    }
}

/// Threat detection system
pub struct ThreatDetector;

impl ThreatDetector {
    pub fn new() -> Self {
        Self
    }
}

/// Incident response system
pub struct IncidentResponder;

impl IncidentResponder {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub monitoring_enabled: bool,
    pub auto_response_enabled: bool,
    pub threat_detection_sensitivity: ThreatSensitivity,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            monitoring_enabled: true,
            auto_response_enabled: true,
            threat_detection_sensitivity: ThreatSensitivity::Medium,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ThreatSensitivity {
    Low,
    Medium,
    High,
}