//! Consensus Service API
//!
//! API endpoints for the consensus service.

use super::service::ConsensusService;
use super::types::*;
use crate::error::Result;

/// Consensus API implementation
pub struct ConsensusApi {
    // Implementation will be added as needed
}

impl ConsensusApi {
    pub fn new() -> Self {
        Self {}
    }
}