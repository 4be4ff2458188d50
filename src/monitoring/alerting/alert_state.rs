//! Alert State Management for BitCraps Monitoring
//!
//! This module handles the tracking and management of alert states,
//! including deduplication, history, and lifecycle management.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::alert_types::*;

/// Alert state manager for tracking active alerts and history
pub struct AlertStateManager {
    active_alerts: Arc<RwLock<HashMap<String, Alert>>>,
    alert_fingerprints: Arc<RwLock<HashMap<String, AlertFingerprint>>>,
    resolved_alerts: Arc<RwLock<VecDeque<Alert>>>,
    alert_counts: Arc<RwLock<AlertCounts>>,
    config: AlertStateConfig,
}

/// Alert fingerprint for deduplication
#[derive(Debug, Clone)]
struct AlertFingerprint {
    fingerprint: String,
    first_seen: SystemTime,
    last_seen: SystemTime,
    occurrence_count: u32,
}

/// Alert state configuration
#[derive(Debug, Clone)]
pub struct AlertStateConfig {
    pub dedup_window_minutes: u32,
    pub max_resolved_history: usize,
    pub auto_resolve_timeout_minutes: Option<u32>,
    pub cleanup_interval_minutes: u32,
}

impl Default for AlertStateConfig {
    fn default() -> Self {
        Self {
            dedup_window_minutes: 5,
            max_resolved_history: 1000,
            auto_resolve_timeout_minutes: Some(60), // Auto-resolve after 1 hour if no updates
            cleanup_interval_minutes: 15,
        }
    }
}

/// Counters for alert statistics
#[derive(Debug, Default)]
struct AlertCounts {
    total_processed: u64,
    total_duplicates_suppressed: u64,
    total_auto_resolved: u64,
    alerts_by_severity: HashMap<AlertSeverity, u64>,
    alerts_by_category: HashMap<String, u64>,
}

impl AlertStateManager {
    /// Create new alert state manager
    pub fn new(config: AlertStateConfig) -> Self {
        Self {
            active_alerts: Arc::new(RwLock::new(HashMap::new())),
            alert_fingerprints: Arc::new(RwLock::new(HashMap::new())),
            resolved_alerts: Arc::new(RwLock::new(VecDeque::new())),
            alert_counts: Arc::new(RwLock::new(AlertCounts::default())),
            config,
        }
    }

    /// Add active alert with deduplication
    pub async fn add_active_alert(&self, alert: Alert) -> AlertAddResult {
        let fingerprint = self.calculate_fingerprint(&alert);

        // Check for duplicates
        {
            let mut fingerprints = self.alert_fingerprints.write().await;
            if let Some(existing) = fingerprints.get_mut(&fingerprint) {
                let time_since_last = SystemTime::now()
                    .duration_since(existing.last_seen)
                    .unwrap_or_default();

                if time_since_last < Duration::from_secs(self.config.dedup_window_minutes as u64 * 60) {
                    // This is a duplicate within the dedup window
                    existing.last_seen = SystemTime::now();
                    existing.occurrence_count += 1;

                    // Update counts
                    let mut counts = self.alert_counts.write().await;
                    counts.total_duplicates_suppressed += 1;

                    debug!(
                        "Suppressed duplicate alert: {} (occurrence: {})",
                        alert.name, existing.occurrence_count
                    );
                    return AlertAddResult::Suppressed {
                        fingerprint: fingerprint.clone(),
                        occurrence_count: existing.occurrence_count,
                    };
                }
            }

            // Not a duplicate or outside dedup window, record the fingerprint
            fingerprints.insert(fingerprint.clone(), AlertFingerprint {
                fingerprint: fingerprint.clone(),
                first_seen: SystemTime::now(),
                last_seen: SystemTime::now(),
                occurrence_count: 1,
            });
        }

        // Add to active alerts
        {
            let mut active = self.active_alerts.write().await;
            active.insert(alert.id.clone(), alert.clone());
        }

        // Update statistics
        {
            let mut counts = self.alert_counts.write().await;
            counts.total_processed += 1;
            *counts.alerts_by_severity.entry(alert.severity).or_insert(0) += 1;
            *counts.alerts_by_category.entry(alert.category.clone()).or_insert(0) += 1;
        }

        info!("Added active alert: {} ({})", alert.name, alert.id);
        AlertAddResult::Added { alert_id: alert.id }
    }

    /// Resolve an active alert
    pub async fn resolve_alert(&self, alert_id: &str) -> bool {
        let mut alert = {
            let mut active = self.active_alerts.write().await;
            match active.remove(alert_id) {
                Some(alert) => alert,
                None => {
                    warn!("Attempted to resolve non-existent alert: {}", alert_id);
                    return false;
                }
            }
        };

        // Mark as resolved
        alert.resolve();

        // Add to resolved history
        {
            let mut resolved = self.resolved_alerts.write().await;
            resolved.push_back(alert.clone());

            // Maintain history size limit
            while resolved.len() > self.config.max_resolved_history {
                resolved.pop_front();
            }
        }

        info!("Resolved alert: {} ({})", alert.name, alert.id);
        true
    }

    /// Auto-resolve alerts that have been active too long without updates
    pub async fn auto_resolve_stale_alerts(&self) -> Vec<Alert> {
        if self.config.auto_resolve_timeout_minutes.is_none() {
            return Vec::new();
        }

        let timeout_minutes = self.config.auto_resolve_timeout_minutes.unwrap();
        let timeout_duration = Duration::from_secs(timeout_minutes as u64 * 60);
        let cutoff_time = SystemTime::now() - timeout_duration;

        let mut auto_resolved = Vec::new();
        let alert_ids_to_resolve: Vec<String> = {
            let active = self.active_alerts.read().await;
            active
                .values()
                .filter(|alert| alert.timestamp < cutoff_time)
                .map(|alert| alert.id.clone())
                .collect()
        };

        for alert_id in alert_ids_to_resolve {
            if self.resolve_alert(&alert_id).await {
                if let Some(alert) = self.get_resolved_alert(&alert_id).await {
                    auto_resolved.push(alert);
                }
            }
        }

        if !auto_resolved.is_empty() {
            let mut counts = self.alert_counts.write().await;
            counts.total_auto_resolved += auto_resolved.len() as u64;
            
            info!("Auto-resolved {} stale alerts", auto_resolved.len());
        }

        auto_resolved
    }

    /// Get all active alerts
    pub async fn get_active_alerts(&self) -> Vec<Alert> {
        let active = self.active_alerts.read().await;
        active.values().cloned().collect()
    }

    /// Get active alerts by severity
    pub async fn get_active_alerts_by_severity(&self, severity: AlertSeverity) -> Vec<Alert> {
        let active = self.active_alerts.read().await;
        active
            .values()
            .filter(|alert| alert.severity == severity)
            .cloned()
            .collect()
    }

    /// Get active alerts by category
    pub async fn get_active_alerts_by_category(&self, category: &str) -> Vec<Alert> {
        let active = self.active_alerts.read().await;
        active
            .values()
            .filter(|alert| alert.category == category)
            .cloned()
            .collect()
    }

    /// Get recently resolved alerts
    pub async fn get_recent_resolved_alerts(&self, count: usize) -> Vec<Alert> {
        let resolved = self.resolved_alerts.read().await;
        resolved
            .iter()
            .rev()
            .take(count)
            .cloned()
            .collect()
    }

    /// Get specific resolved alert by ID
    pub async fn get_resolved_alert(&self, alert_id: &str) -> Option<Alert> {
        let resolved = self.resolved_alerts.read().await;
        resolved
            .iter()
            .find(|alert| alert.id == alert_id)
            .cloned()
    }

    /// Check if alert is duplicate
    pub async fn is_duplicate(&self, alert: &Alert) -> bool {
        let fingerprint = self.calculate_fingerprint(alert);
        let fingerprints = self.alert_fingerprints.read().await;

        if let Some(existing) = fingerprints.get(&fingerprint) {
            let time_since_last = SystemTime::now()
                .duration_since(existing.last_seen)
                .unwrap_or_default();

            time_since_last < Duration::from_secs(self.config.dedup_window_minutes as u64 * 60)
        } else {
            false
        }
    }

    /// Get alert statistics
    pub async fn get_statistics(&self) -> AlertStatistics {
        let counts = self.alert_counts.read().await;
        let active = self.active_alerts.read().await;
        let resolved = self.resolved_alerts.read().await;

        // Calculate average resolution time
        let resolution_times: Vec<u64> = resolved
            .iter()
            .filter_map(|alert| alert.resolution_time_seconds())
            .collect();

        let average_resolution_time_minutes = if resolution_times.is_empty() {
            0.0
        } else {
            resolution_times.iter().sum::<u64>() as f64 / resolution_times.len() as f64 / 60.0
        };

        // Calculate false positive rate (simplified)
        let false_positive_rate = if counts.total_processed > 0 {
            (counts.total_auto_resolved as f64 / counts.total_processed as f64) * 100.0
        } else {
            0.0
        };

        AlertStatistics {
            total_alerts_processed: counts.total_processed as usize,
            active_alerts: active.len(),
            alerts_last_hour: self.count_alerts_in_last_hours(1).await,
            alerts_last_24_hours: self.count_alerts_in_last_hours(24).await,
            alerts_by_severity: counts.alerts_by_severity.iter().map(|(k, v)| (*k, *v as usize)).collect(),
            alerts_by_category: counts.alerts_by_category.iter().map(|(k, v)| (k.clone(), *v as usize)).collect(),
            average_resolution_time_minutes,
            false_positive_rate,
        }
    }

    /// Get current alert status
    pub async fn get_alert_status(&self) -> AlertStatus {
        let active = self.active_alerts.read().await;
        let active_count = active.len();
        let critical_count = active
            .values()
            .filter(|alert| alert.severity == AlertSeverity::Critical)
            .count();

        let health = if critical_count > 0 {
            SystemHealth::Critical
        } else if active_count > 10 {
            SystemHealth::Warning
        } else {
            SystemHealth::Healthy
        };

        AlertStatus {
            active_alerts: active_count,
            critical_alerts: critical_count,
            total_alerts_last_24h: self.count_alerts_in_last_hours(24).await,
            system_health: health,
        }
    }

    /// Count alerts in the last N hours (from resolved + active)
    async fn count_alerts_in_last_hours(&self, hours: u32) -> usize {
        let cutoff = SystemTime::now() - Duration::from_secs(hours as u64 * 3600);
        let mut count = 0;

        // Count active alerts
        {
            let active = self.active_alerts.read().await;
            count += active.values().filter(|alert| alert.timestamp > cutoff).count();
        }

        // Count resolved alerts
        {
            let resolved = self.resolved_alerts.read().await;
            count += resolved.iter().filter(|alert| alert.timestamp > cutoff).count();
        }

        count
    }

    /// Cleanup old fingerprints and resolved alerts
    pub async fn cleanup_old_data(&self) {
        let now = SystemTime::now();
        let fingerprint_retention = Duration::from_secs(self.config.dedup_window_minutes as u64 * 60 * 2);

        // Clean up old fingerprints
        {
            let mut fingerprints = self.alert_fingerprints.write().await;
            fingerprints.retain(|_, fp| {
                now.duration_since(fp.last_seen).unwrap_or_default() < fingerprint_retention
            });
            debug!("Cleaned up fingerprints, {} remaining", fingerprints.len());
        }

        // Resolved alerts are already size-limited, but we can clean up very old ones
        {
            let mut resolved = self.resolved_alerts.write().await;
            let retention_days = 7; // Keep resolved alerts for 7 days
            let retention_duration = Duration::from_secs(retention_days * 24 * 3600);
            let cutoff = now - retention_duration;

            let initial_len = resolved.len();
            resolved.retain(|alert| alert.timestamp > cutoff);
            
            if resolved.len() != initial_len {
                debug!(
                    "Cleaned up resolved alerts: {} -> {}",
                    initial_len,
                    resolved.len()
                );
            }
        }
    }

    /// Calculate alert fingerprint for deduplication
    fn calculate_fingerprint(&self, alert: &Alert) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        alert.name.hash(&mut hasher);
        alert.metric_name.hash(&mut hasher);
        alert.category.hash(&mut hasher);
        alert.severity.hash(&mut hasher);
        
        // Include threshold but not current value for better deduplication
        ((alert.threshold_value * 100.0) as i64).hash(&mut hasher);
        
        format!("{:x}", hasher.finish())
    }

    /// Get deduplication statistics
    pub async fn get_dedup_stats(&self) -> DedupStats {
        let fingerprints = self.alert_fingerprints.read().await;
        let counts = self.alert_counts.read().await;

        DedupStats {
            unique_fingerprints: fingerprints.len(),
            total_duplicates_suppressed: counts.total_duplicates_suppressed,
            dedup_window_minutes: self.config.dedup_window_minutes,
            most_frequent_alerts: fingerprints
                .values()
                .filter(|fp| fp.occurrence_count > 1)
                .map(|fp| (fp.fingerprint.clone(), fp.occurrence_count))
                .collect(),
        }
    }

    /// Force cleanup of all data (for testing or maintenance)
    pub async fn force_cleanup(&self) {
        {
            let mut active = self.active_alerts.write().await;
            active.clear();
        }
        {
            let mut fingerprints = self.alert_fingerprints.write().await;
            fingerprints.clear();
        }
        {
            let mut resolved = self.resolved_alerts.write().await;
            resolved.clear();
        }
        {
            let mut counts = self.alert_counts.write().await;
            *counts = AlertCounts::default();
        }

        info!("Force cleaned up all alert state data");
    }
}

impl Default for AlertStateManager {
    fn default() -> Self {
        Self::new(AlertStateConfig::default())
    }
}

/// Result of adding an alert
#[derive(Debug)]
pub enum AlertAddResult {
    Added { alert_id: String },
    Suppressed { fingerprint: String, occurrence_count: u32 },
}

/// Deduplication statistics
#[derive(Debug)]
pub struct DedupStats {
    pub unique_fingerprints: usize,
    pub total_duplicates_suppressed: u64,
    pub dedup_window_minutes: u32,
    pub most_frequent_alerts: Vec<(String, u32)>,
}

/// Alert history storage with retention
pub struct AlertHistory {
    alerts: VecDeque<Alert>,
    retention_days: u32,
}

impl AlertHistory {
    pub fn new(retention_days: u32) -> Self {
        Self {
            alerts: VecDeque::new(),
            retention_days,
        }
    }

    pub fn add_alert(&mut self, alert: Alert) {
        self.alerts.push_back(alert);
        self.cleanup_old_alerts();
    }

    pub fn cleanup_old_alerts(&mut self) {
        let cutoff = SystemTime::now() - Duration::from_secs(self.retention_days as u64 * 24 * 3600);
        while let Some(front) = self.alerts.front() {
            if front.timestamp <= cutoff {
                self.alerts.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn total_count(&self) -> usize {
        self.alerts.len()
    }

    pub fn count_alerts_in_last_hours(&self, hours: u32) -> usize {
        let cutoff = SystemTime::now() - Duration::from_secs(hours as u64 * 3600);
        self.alerts
            .iter()
            .filter(|alert| alert.timestamp > cutoff)
            .count()
    }

    pub fn count_by_severity(&self) -> HashMap<AlertSeverity, usize> {
        let mut counts = HashMap::new();
        for alert in &self.alerts {
            *counts.entry(alert.severity).or_insert(0) += 1;
        }
        counts
    }

    pub fn count_by_category(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for alert in &self.alerts {
            *counts.entry(alert.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn average_resolution_time_minutes(&self) -> f64 {
        let resolved_alerts: Vec<_> = self
            .alerts
            .iter()
            .filter(|alert| alert.resolved_at.is_some())
            .collect();

        if resolved_alerts.is_empty() {
            return 0.0;
        }

        let total_time: Duration = resolved_alerts
            .iter()
            .map(|alert| {
                alert
                    .resolved_at
                    .unwrap()
                    .duration_since(alert.timestamp)
                    .unwrap_or_default()
            })
            .sum();

        total_time.as_secs_f64() / 60.0 / resolved_alerts.len() as f64
    }

    pub fn calculate_false_positive_rate(&self) -> f64 {
        // Simplified false positive calculation
        // In practice, this would require more sophisticated analysis
        let total = self.alerts.len();
        if total == 0 {
            return 0.0;
        }

        let auto_resolved = self
            .alerts
            .iter()
            .filter(|alert| {
                // Consider alerts that were resolved very quickly as potential false positives
                alert.resolution_time_seconds().map_or(false, |t| t < 60) // Resolved in < 1 minute
            })
            .count();

        (auto_resolved as f64 / total as f64) * 100.0
    }
}
