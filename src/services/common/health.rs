//! Health Check Implementation
//!
//! Common health check functionality for microservices.

use crate::error::Result;

/// Health check implementation
pub struct HealthChecker {
    // Implementation will be added as needed
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {}
    }
    
    pub async fn check(&self) -> Result<()> {
        Ok(())
    }
}