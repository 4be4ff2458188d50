//! Metrics Collection
//!
//! Common metrics collection and reporting for microservices.

use crate::error::Result;

/// Metrics collector
pub struct MetricsCollector {
    // Implementation will be added as needed
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {}
    }
    
    pub async fn collect(&self) -> Result<()> {
        Ok(())
    }
}