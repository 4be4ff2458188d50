//! # Emergency Governance
//!
//! Emergency governance mechanisms for critical situations requiring rapid response.

use crate::{Error, Result, PeerId};
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc, Duration};

/// Emergency action types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmergencyActionType {
    /// Pause all protocol operations
    PauseProtocol,
    /// Pause specific module
    PauseModule,
    /// Emergency treasury allocation
    EmergencyAllocation,
    /// Parameter adjustment
    EmergencyParameterChange,
    /// Blacklist address
    BlacklistAddress,
}

/// Emergency proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyProposal {
    /// Proposal ID
    pub id: String,
    /// Action type
    pub action_type: EmergencyActionType,
    /// Target (if applicable)
    pub target: Option<String>,
    /// Duration of emergency measure
    pub duration: Option<Duration>,
    /// Proposed by
    pub proposed_by: PeerId,
    /// When proposed
    pub proposed_at: DateTime<Utc>,
}

/// Emergency action result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyAction {
    /// Action ID
    pub id: String,
    /// Action taken
    pub action_type: EmergencyActionType,
    /// When action was taken
    pub executed_at: DateTime<Utc>,
    /// Action expires at
    pub expires_at: Option<DateTime<Utc>>,
}

/// Emergency governance system
pub struct EmergencyGovernance {
    /// Configuration
    config: EmergencyConfig,
    /// Active emergency actions
    active_actions: Vec<EmergencyAction>,
}

/// Emergency governance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyConfig {
    /// Enable emergency governance
    pub enabled: bool,
    /// Emergency council members
    pub emergency_council: Vec<PeerId>,
    /// Threshold of council members required
    pub council_threshold: u8,
    /// Maximum duration for emergency measures
    pub max_emergency_duration: Duration,
    /// Allowed emergency actions
    pub allowed_emergency_actions: Vec<EmergencyActionType>,
}

impl EmergencyGovernance {
    /// Create new emergency governance
    pub async fn new(config: EmergencyConfig) -> Result<Self> {
        Ok(Self {
            config,
            active_actions: Vec::new(),
        })
    }

    /// Propose emergency action
    pub async fn propose_emergency_action(
        &mut self,
        council_member: PeerId,
        action_type: EmergencyActionType,
        target: Option<String>,
        duration: Option<Duration>,
    ) -> Result<String> {
        // Verify council member
        if !self.config.emergency_council.contains(&council_member) {
            return Err(Error::ValidationError("Not an emergency council member".to_string()));
        }

        // Check if action type is allowed
        if !self.config.allowed_emergency_actions.contains(&action_type) {
            return Err(Error::ValidationError("Emergency action type not allowed".to_string()));
        }

        let proposal_id = uuid::Uuid::new_v4().to_string();
        
        // In production, would implement council voting process
        // For now, return proposal ID
        Ok(proposal_id)
    }
}