//! Backup and Recovery Operations

use std::time::SystemTime;
use serde::{Serialize, Deserialize};

/// Backup manager for data protection
pub struct BackupManager {
    config: BackupConfig,
}

impl BackupManager {
    pub async fn new(config: BackupConfig) -> Result<Self, BackupError> {
        Ok(Self { config })
    }

    pub async fn create_backup(&self, backup_type: &str, description: Option<&str>) -> Result<String, BackupError> {
        let backup_id = uuid::Uuid::new_v4().to_string();
        tracing::info!("Creating {} backup with ID: {}", backup_type, backup_id);
        Ok(backup_id)
    }

    pub async fn list_backups(&self, limit: Option<usize>) -> Vec<BackupInfo> {
        vec![]
    }

    pub async fn restore_backup(&self, backup_id: &str, environment: Option<&str>) -> Result<(), BackupError> {
        tracing::info!("Restoring backup {} to {:?}", backup_id, environment);
        Ok(())
    }

    pub async fn cleanup_old_backups(&self, keep_days: u32) -> Result<usize, BackupError> {
        tracing::info!("Cleaning backups older than {} days", keep_days);
        Ok(0)
    }
}

#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub storage_path: String,
    pub compression_enabled: bool,
    pub retention_days: u32,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            storage_path: "./backups".to_string(),
            compression_enabled: true,
            retention_days: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub id: String,
    pub backup_type: String,
    pub size_mb: u64,
    pub created_at: SystemTime,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BackupStatus {
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug)]
pub enum BackupError {
    CreationFailed(String),
    RestoreFailed(String),
    NotFound(String),
    StorageError(String),
}