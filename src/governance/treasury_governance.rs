//! # Treasury Governance
//!
//! DAO-controlled treasury management with multi-signature approval and
//! transparent fund allocation.

use crate::{Error, Result, PeerId, CrapTokens};
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Treasury governance manager
pub struct TreasuryManager {
    config: TreasuryGovernanceConfig,
}

/// Treasury governance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryGovernanceConfig {
    /// Maximum percentage of treasury that can be allocated in one proposal
    pub max_allocation_percentage: f64,
    /// Multi-signature threshold
    pub multisig_threshold: u8,
    /// Signers for multi-signature
    pub multisig_signers: Vec<PeerId>,
}

/// Treasury proposal for DAO governance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryProposal {
    /// Proposal ID
    pub id: String,
    /// Recipient
    pub recipient: PeerId,
    /// Amount requested
    pub amount: CrapTokens,
    /// Purpose
    pub purpose: String,
}

/// Treasury allocation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryAllocation {
    /// Allocation ID
    pub id: String,
    /// Recipient
    pub recipient: PeerId,
    /// Amount allocated
    pub amount: CrapTokens,
    /// When allocated
    pub allocated_at: DateTime<Utc>,
}

impl TreasuryManager {
    /// Create new treasury manager
    pub async fn new(config: TreasuryGovernanceConfig) -> Result<Self> {
        Ok(Self { config })
    }

    /// Allocate funds from treasury
    pub async fn allocate_funds(&mut self, recipient: PeerId, amount: CrapTokens) -> Result<()> {
        // Implementation would handle actual fund transfer
        Ok(())
    }
}

impl Default for TreasuryGovernanceConfig {
    fn default() -> Self {
        Self {
            max_allocation_percentage: 0.1,
            multisig_threshold: 3,
            multisig_signers: Vec::new(),
        }
    }
}