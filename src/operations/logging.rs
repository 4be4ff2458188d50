//! Log Aggregation and Analysis

use serde::{Serialize, Deserialize};

/// Log aggregation and analysis system
pub struct LogAggregator {
    config: LogConfig,
    analyzer: LogAnalyzer,
}

impl LogAggregator {
    pub fn new(config: LogConfig) -> Self {
        Self {
            config,
            analyzer: LogAnalyzer::new(),
        }
    }
}

/// Log analysis system
pub struct LogAnalyzer;

impl LogAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub retention_days: u32,
    pub compression_enabled: bool,
    pub analysis_enabled: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            retention_days: 30,
            compression_enabled: true,
            analysis_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}