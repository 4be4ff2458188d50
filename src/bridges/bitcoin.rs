//! Bitcoin Bridge Implementation
//!
//! Feynman Explanation: This is our "Bitcoin translator" - it connects the BitCraps mesh
//! network with Bitcoin's UTXO system. Think of it like a sophisticated escrow service that:
//!
//! 1. **Multisig Escrow**: Creates a secure Bitcoin multisig address where bitcoins are held
//! 2. **PSBT Coordination**: Uses Partially Signed Bitcoin Transactions for secure multi-party signing
//! 3. **Lightning Integration**: Supports Lightning Network for fast, low-cost Bitcoin transfers
//! 4. **Atomic Swaps**: Enables trustless exchanges between Bitcoin and CRAP tokens
//!
//! Unlike Ethereum's smart contracts, Bitcoin requires more complex coordination protocols
//! since Bitcoin Script has limited functionality. We use:
//! - Multisig scripts for security
//! - Time-locked transactions for dispute resolution
//! - Hash-locked contracts for atomic swaps
//! - Lightning Network for scalability

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{RwLock, Mutex};
use tokio::time::interval;

use crate::error::{Error, Result};
use crate::protocol::{Hash256, PeerId, CrapTokens};
use crate::crypto::BitchatKeypair;
use crate::utils::spawn_tracked;
use crate::utils::task::TaskType;

use super::{
    Bridge, BridgeConfig, BridgeTransaction, BridgeTransactionStatus,
    BridgeEvent, ValidatorSignature, ChainId
};

/// Bitcoin-specific bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitcoinBridgeConfig {
    /// Bitcoin RPC endpoint URL
    pub rpc_endpoint: String,
    /// RPC username for authentication
    pub rpc_username: String,
    /// RPC password for authentication  
    pub rpc_password: String,
    /// Network type (mainnet, testnet, regtest)
    pub network: BitcoinNetwork,
    /// Minimum number of Bitcoin confirmations
    pub min_confirmations: u32,
    /// Multisig threshold (M of N signatures required)
    pub multisig_threshold: u8,
    /// Maximum number of multisig participants
    pub max_multisig_participants: u8,
    /// Transaction fee rate (satoshis per byte)
    pub fee_rate: u64,
    /// Lightning Network node configuration
    pub lightning_config: Option<LightningConfig>,
    /// Atomic swap configuration
    pub atomic_swap_config: AtomicSwapConfig,
}

impl Default for BitcoinBridgeConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: "http://127.0.0.1:8332".to_string(),
            rpc_username: "bitcoin".to_string(),
            rpc_password: "password".to_string(),
            network: BitcoinNetwork::Testnet,
            min_confirmations: 6,
            multisig_threshold: 2,
            max_multisig_participants: 3,
            fee_rate: 10, // 10 sat/byte
            lightning_config: None,
            atomic_swap_config: AtomicSwapConfig::default(),
        }
    }
}

/// Bitcoin network types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BitcoinNetwork {
    Mainnet,
    Testnet,
    Signet,
    Regtest,
}

impl BitcoinNetwork {
    /// Get the address prefix for this network
    pub fn address_prefix(&self) -> &'static str {
        match self {
            BitcoinNetwork::Mainnet => "1",
            BitcoinNetwork::Testnet => "m",
            BitcoinNetwork::Signet => "tb1",
            BitcoinNetwork::Regtest => "bcrt1",
        }
    }

    /// Get the default RPC port for this network
    pub fn default_rpc_port(&self) -> u16 {
        match self {
            BitcoinNetwork::Mainnet => 8332,
            BitcoinNetwork::Testnet => 18332,
            BitcoinNetwork::Signet => 38332,
            BitcoinNetwork::Regtest => 18443,
        }
    }
}

/// Lightning Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightningConfig {
    /// Lightning node endpoint
    pub node_endpoint: String,
    /// Lightning node public key
    pub node_pubkey: String,
    /// Channel capacity for bridge operations (satoshis)
    pub bridge_channel_capacity: u64,
    /// Minimum HTLC amount
    pub min_htlc_amount: u64,
    /// Maximum HTLC amount
    pub max_htlc_amount: u64,
    /// HTLC timeout blocks
    pub htlc_timeout_blocks: u32,
    /// Fee rate for Lightning transactions (milli-satoshis)
    pub lightning_fee_rate: u64,
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self {
            node_endpoint: "127.0.0.1:9735".to_string(),
            node_pubkey: "03000000000000000000000000000000000000000000000000000000000000000000".to_string(),
            bridge_channel_capacity: 16_777_216, // 0.16777216 BTC
            min_htlc_amount: 1000,               // 1000 sats
            max_htlc_amount: 4_294_967,          // ~0.04 BTC
            htlc_timeout_blocks: 144,            // ~1 day
            lightning_fee_rate: 1000,            // 1 sat base fee
        }
    }
}

/// Atomic swap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomicSwapConfig {
    /// Hash function used for atomic swaps (SHA256, RIPEMD160)
    pub hash_function: AtomicSwapHashFunction,
    /// Swap timeout in blocks
    pub swap_timeout_blocks: u32,
    /// Minimum swap amount (satoshis)
    pub min_swap_amount: u64,
    /// Maximum swap amount (satoshis)  
    pub max_swap_amount: u64,
    /// Refund timeout buffer (additional blocks for refund)
    pub refund_buffer_blocks: u32,
}

impl Default for AtomicSwapConfig {
    fn default() -> Self {
        Self {
            hash_function: AtomicSwapHashFunction::SHA256,
            swap_timeout_blocks: 72,  // ~12 hours
            min_swap_amount: 100_000, // 0.001 BTC
            max_swap_amount: 100_000_000, // 1 BTC
            refund_buffer_blocks: 6,  // 1 hour buffer
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AtomicSwapHashFunction {
    SHA256,
    RIPEMD160,
    HASH160, // RIPEMD160(SHA256(x))
}

/// Bitcoin UTXO representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitcoinUTXO {
    /// Transaction ID
    pub txid: String,
    /// Output index
    pub vout: u32,
    /// Output value in satoshis
    pub value: u64,
    /// Output script (hex encoded)
    pub script_pubkey: String,
    /// Number of confirmations
    pub confirmations: u32,
    /// Whether this UTXO is spendable
    pub spendable: bool,
}

/// Partially Signed Bitcoin Transaction (PSBT) for multisig coordination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartiallySignedTransaction {
    /// PSBT in base64 encoding
    pub psbt_base64: String,
    /// Transaction ID (once finalized)
    pub txid: Option<String>,
    /// Input UTXOs being spent
    pub inputs: Vec<BitcoinUTXO>,
    /// Output addresses and amounts
    pub outputs: Vec<BitcoinOutput>,
    /// Required signatures
    pub required_signatures: u8,
    /// Current signature count
    pub signature_count: u8,
    /// Validator signatures
    pub validator_signatures: Vec<PSBTSignature>,
    /// Transaction fee (satoshis)
    pub fee: u64,
    /// Creation timestamp
    pub created_at: u64,
    /// Expiration timestamp
    pub expires_at: u64,
}

/// Bitcoin transaction output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitcoinOutput {
    /// Recipient address
    pub address: String,
    /// Amount in satoshis
    pub amount: u64,
}

/// PSBT signature from a validator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PSBTSignature {
    /// Validator identifier
    pub validator_id: PeerId,
    /// Signed PSBT (base64 encoded)
    pub signed_psbt: String,
    /// Validator's public key
    pub public_key: String,
    /// Signature timestamp
    pub timestamp: u64,
}

/// Lightning Network payment details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightningPayment {
    /// Payment hash
    pub payment_hash: String,
    /// Payment preimage (revealed when payment is successful)
    pub preimage: Option<String>,
    /// Amount in milli-satoshis
    pub amount_msat: u64,
    /// Payment description
    pub description: String,
    /// Expiry time
    pub expires_at: u64,
    /// Payment status
    pub status: LightningPaymentStatus,
    /// Route taken for the payment
    pub route: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LightningPaymentStatus {
    Pending,
    InFlight,
    Succeeded,
    Failed,
    Cancelled,
}

/// Atomic swap details for Bitcoin <-> CRAP swaps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomicSwap {
    /// Swap identifier
    pub swap_id: Hash256,
    /// Hash of the secret (commitment)
    pub hash_commitment: Hash256,
    /// The secret (revealed when swap completes)
    pub secret: Option<Hash256>,
    /// Bitcoin amount (satoshis)
    pub bitcoin_amount: u64,
    /// CRAP token amount
    pub crap_amount: u64,
    /// Bitcoin side participant
    pub bitcoin_participant: String,
    /// CRAP side participant  
    pub crap_participant: PeerId,
    /// Bitcoin contract transaction
    pub bitcoin_contract_tx: Option<String>,
    /// Bitcoin redeem transaction
    pub bitcoin_redeem_tx: Option<String>,
    /// CRAP contract transaction
    pub crap_contract_tx: Option<Hash256>,
    /// Swap timeout (block height)
    pub timeout_block: u32,
    /// Current swap status
    pub status: AtomicSwapStatus,
    /// Creation timestamp
    pub created_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AtomicSwapStatus {
    Initiated,
    BitcoinLocked,
    CrapLocked,
    BitcoinRedeemed,
    CrapRedeemed,
    Completed,
    Refunded,
    Failed,
}

/// Main Bitcoin bridge implementation
pub struct BitcoinBridge {
    config: Arc<RwLock<BitcoinBridgeConfig>>,
    multisig_wallets: Arc<RwLock<HashMap<String, MultisigWallet>>>,
    pending_psbts: Arc<RwLock<HashMap<Hash256, PartiallySignedTransaction>>>,
    lightning_payments: Arc<RwLock<HashMap<String, LightningPayment>>>,
    atomic_swaps: Arc<RwLock<HashMap<Hash256, AtomicSwap>>>,
    utxo_tracker: Arc<RwLock<Vec<BitcoinUTXO>>>,
    bridge_config: Arc<RwLock<Option<BridgeConfig>>>,
}

/// Multisig wallet for holding bridged Bitcoin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultisigWallet {
    /// Wallet identifier
    pub wallet_id: String,
    /// Multisig address
    pub address: String,
    /// Required signatures (M of N)
    pub required_signatures: u8,
    /// Total participants (N)
    pub total_participants: u8,
    /// Participant public keys
    pub participant_pubkeys: Vec<String>,
    /// Current balance (satoshis)
    pub balance: u64,
    /// Pending transactions
    pub pending_txs: Vec<String>,
}

impl BitcoinBridge {
    /// Create new Bitcoin bridge instance
    pub fn new(config: BitcoinBridgeConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            multisig_wallets: Arc::new(RwLock::new(HashMap::new())),
            pending_psbts: Arc::new(RwLock::new(HashMap::new())),
            lightning_payments: Arc::new(RwLock::new(HashMap::new())),
            atomic_swaps: Arc::new(RwLock::new(HashMap::new())),
            utxo_tracker: Arc::new(RwLock::new(Vec::new())),
            bridge_config: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a new multisig wallet for bridge operations
    pub async fn create_multisig_wallet(
        &self,
        participant_pubkeys: Vec<String>,
        required_signatures: u8,
    ) -> Result<String> {
        let config = self.config.read().await;
        
        if participant_pubkeys.len() > config.max_multisig_participants as usize {
            return Err(Error::InvalidData("Too many multisig participants".to_string()));
        }

        if required_signatures == 0 || required_signatures > participant_pubkeys.len() as u8 {
            return Err(Error::InvalidData("Invalid signature threshold".to_string()));
        }

        // Generate multisig address
        let address = self.generate_multisig_address(&participant_pubkeys, required_signatures).await?;
        
        let wallet = MultisigWallet {
            wallet_id: format!("multisig_{}", rand::random::<u64>()),
            address: address.clone(),
            required_signatures,
            total_participants: participant_pubkeys.len() as u8,
            participant_pubkeys,
            balance: 0,
            pending_txs: Vec::new(),
        };

        let wallet_id = wallet.wallet_id.clone();
        self.multisig_wallets.write().await.insert(wallet_id.clone(), wallet);

        log::info!("Created multisig wallet {} with address {}", wallet_id, address);
        Ok(wallet_id)
    }

    /// Lock Bitcoin in multisig for bridge operation
    pub async fn lock_bitcoin(
        &self,
        wallet_id: &str,
        amount: u64,
        recipient_crap_address: &PeerId,
        target_chain: &ChainId,
    ) -> Result<String> {
        let mut wallets = self.multisig_wallets.write().await;
        let wallet = wallets.get_mut(wallet_id)
            .ok_or_else(|| Error::InvalidData("Multisig wallet not found".to_string()))?;

        // Create lock transaction
        let lock_tx = self.create_bitcoin_lock_transaction(
            wallet,
            amount,
            recipient_crap_address,
            target_chain,
        ).await?;

        // Generate PSBT for multisig signing
        let psbt_id = self.create_psbt_for_transaction(&lock_tx, wallet).await?;
        
        log::info!("Locked {} satoshis in Bitcoin bridge, PSBT: {}", amount, hex::encode(&psbt_id));
        Ok(hex::encode(psbt_id))
    }

    /// Release Bitcoin from multisig (complete bridge operation)
    pub async fn release_bitcoin(
        &self,
        wallet_id: &str,
        recipient_address: &str,
        amount: u64,
        source_tx_hash: &Hash256,
        validator_signatures: &[ValidatorSignature],
    ) -> Result<String> {
        let config = self.config.read().await;
        let bridge_config = self.bridge_config.read().await;
        
        // Verify we have enough validator signatures
        if let Some(bridge_cfg) = bridge_config.as_ref() {
            if validator_signatures.len() < bridge_cfg.required_signatures as usize {
                return Err(Error::InvalidData("Insufficient validator signatures".to_string()));
            }
        }

        let wallets = self.multisig_wallets.read().await;
        let wallet = wallets.get(wallet_id)
            .ok_or_else(|| Error::InvalidData("Multisig wallet not found".to_string()))?;

        // Create release transaction
        let release_tx = self.create_bitcoin_release_transaction(
            wallet,
            recipient_address,
            amount,
            source_tx_hash,
        ).await?;

        // Create and sign PSBT
        let psbt_id = self.create_psbt_for_transaction(&release_tx, wallet).await?;
        
        // Submit for multisig signing
        self.submit_psbt_for_signing(psbt_id, validator_signatures).await?;
        
        log::info!("Released {} satoshis from Bitcoin bridge to {}", amount, recipient_address);
        Ok(hex::encode(psbt_id))
    }

    /// Initiate Lightning Network payment for fast bridging
    pub async fn initiate_lightning_payment(
        &self,
        amount_msat: u64,
        destination_pubkey: &str,
        payment_description: &str,
    ) -> Result<String> {
        let config = self.config.read().await;
        let lightning_config = config.lightning_config.as_ref()
            .ok_or_else(|| Error::InvalidData("Lightning not configured".to_string()))?;

        if amount_msat < lightning_config.min_htlc_amount * 1000 {
            return Err(Error::InvalidData("Amount below Lightning minimum".to_string()));
        }

        if amount_msat > lightning_config.max_htlc_amount * 1000 {
            return Err(Error::InvalidData("Amount above Lightning maximum".to_string()));
        }

        // Generate payment hash
        let payment_hash = self.generate_payment_hash();
        
        let lightning_payment = LightningPayment {
            payment_hash: payment_hash.clone(),
            preimage: None,
            amount_msat,
            description: payment_description.to_string(),
            expires_at: Self::current_timestamp() + 3600, // 1 hour expiry
            status: LightningPaymentStatus::Pending,
            route: None,
        };

        self.lightning_payments.write().await.insert(payment_hash.clone(), lightning_payment);

        // In production, this would create an actual Lightning invoice
        log::info!("Initiated Lightning payment of {} msat to {}", amount_msat, destination_pubkey);
        Ok(payment_hash)
    }

    /// Create atomic swap contract for trustless Bitcoin <-> CRAP exchange
    pub async fn create_atomic_swap(
        &self,
        bitcoin_amount: u64,
        crap_amount: u64,
        bitcoin_participant: String,
        crap_participant: PeerId,
    ) -> Result<Hash256> {
        let config = self.config.read().await;
        
        if bitcoin_amount < config.atomic_swap_config.min_swap_amount {
            return Err(Error::InvalidData("Bitcoin amount below minimum".to_string()));
        }

        if bitcoin_amount > config.atomic_swap_config.max_swap_amount {
            return Err(Error::InvalidData("Bitcoin amount above maximum".to_string()));
        }

        // Generate swap parameters
        let swap_id = self.generate_swap_id();
        let hash_commitment = self.generate_hash_commitment();
        
        let atomic_swap = AtomicSwap {
            swap_id,
            hash_commitment,
            secret: None,
            bitcoin_amount,
            crap_amount,
            bitcoin_participant,
            crap_participant,
            bitcoin_contract_tx: None,
            bitcoin_redeem_tx: None,
            crap_contract_tx: None,
            timeout_block: self.get_current_block_height().await? + config.atomic_swap_config.swap_timeout_blocks,
            status: AtomicSwapStatus::Initiated,
            created_at: Self::current_timestamp(),
        };

        self.atomic_swaps.write().await.insert(swap_id, atomic_swap);
        
        log::info!("Created atomic swap {} for {} BTC <-> {} CRAP", 
                   hex::encode(&swap_id), bitcoin_amount, crap_amount);
        Ok(swap_id)
    }

    /// Lock Bitcoin side of atomic swap
    pub async fn lock_bitcoin_atomic_swap(&self, swap_id: &Hash256) -> Result<String> {
        let mut swaps = self.atomic_swaps.write().await;
        let swap = swaps.get_mut(swap_id)
            .ok_or_else(|| Error::InvalidData("Atomic swap not found".to_string()))?;

        if swap.status != AtomicSwapStatus::Initiated {
            return Err(Error::InvalidData("Swap not in correct state".to_string()));
        }

        // Create hash-locked transaction
        let contract_tx = self.create_bitcoin_htlc_transaction(
            swap.bitcoin_amount,
            &swap.hash_commitment,
            &swap.bitcoin_participant,
            swap.timeout_block,
        ).await?;

        swap.bitcoin_contract_tx = Some(contract_tx.clone());
        swap.status = AtomicSwapStatus::BitcoinLocked;

        log::info!("Locked Bitcoin side of atomic swap {}", hex::encode(&swap_id[..8]));
        Ok(contract_tx)
    }

    /// Redeem Bitcoin from atomic swap (reveal secret)
    pub async fn redeem_bitcoin_atomic_swap(
        &self, 
        swap_id: &Hash256, 
        secret: Hash256
    ) -> Result<String> {
        let mut swaps = self.atomic_swaps.write().await;
        let swap = swaps.get_mut(swap_id)
            .ok_or_else(|| Error::InvalidData("Atomic swap not found".to_string()))?;

        // Verify secret matches commitment
        if !self.verify_hash_commitment(&secret, &swap.hash_commitment) {
            return Err(Error::InvalidData("Invalid secret for hash commitment".to_string()));
        }

        // Create redeem transaction
        let redeem_tx = self.create_bitcoin_redeem_transaction(
            swap.bitcoin_contract_tx.as_ref()
                .ok_or_else(|| Error::InvalidData("No Bitcoin contract transaction".to_string()))?,
            &secret,
        ).await?;

        swap.secret = Some(secret);
        swap.bitcoin_redeem_tx = Some(redeem_tx.clone());
        swap.status = AtomicSwapStatus::BitcoinRedeemed;

        log::info!("Redeemed Bitcoin from atomic swap {}", hex::encode(&swap_id[..8]));
        Ok(redeem_tx)
    }

    /// Monitor Bitcoin blockchain for relevant transactions
    pub async fn start_bitcoin_monitoring(&self) -> Result<()> {
        let config = self.config.read().await;
        let rpc_endpoint = config.rpc_endpoint.clone();
        let min_confirmations = config.min_confirmations;
        drop(config);

        let multisig_wallets = Arc::clone(&self.multisig_wallets);
        let atomic_swaps = Arc::clone(&self.atomic_swaps);
        let lightning_payments = Arc::clone(&self.lightning_payments);

        spawn_tracked("bitcoin_blockchain_monitor", TaskType::Network, async move {
            let mut monitoring_interval = interval(Duration::from_secs(30)); // Check every 30 seconds

            loop {
                tokio::select! {
                    _ = monitoring_interval.tick() => {
                        // Monitor multisig wallet balances
                        if let Err(e) = Self::monitor_multisig_wallets(&multisig_wallets).await {
                            log::warn!("Failed to monitor multisig wallets: {}", e);
                        }

                        // Monitor atomic swap transactions
                        if let Err(e) = Self::monitor_atomic_swaps(&atomic_swaps).await {
                            log::warn!("Failed to monitor atomic swaps: {}", e);
                        }

                        // Monitor Lightning payments
                        if let Err(e) = Self::monitor_lightning_payments(&lightning_payments).await {
                            log::warn!("Failed to monitor Lightning payments: {}", e);
                        }
                    }
                }
            }
        });

        Ok(())
    }

    // Helper methods for Bitcoin operations

    async fn generate_multisig_address(
        &self,
        pubkeys: &[String],
        required_sigs: u8,
    ) -> Result<String> {
        // In production, this would use Bitcoin Core's createmultisig RPC
        // For now, generate a mock address
        let config = self.config.read().await;
        let prefix = config.network.address_prefix();
        Ok(format!("{}multisig_{:016x}", prefix, rand::random::<u64>()))
    }

    async fn create_bitcoin_lock_transaction(
        &self,
        _wallet: &MultisigWallet,
        _amount: u64,
        _recipient: &PeerId,
        _target_chain: &ChainId,
    ) -> Result<String> {
        // Create transaction that locks Bitcoin in multisig
        // In production, this would create actual Bitcoin transaction
        Ok(format!("lock_tx_{:016x}", rand::random::<u64>()))
    }

    async fn create_bitcoin_release_transaction(
        &self,
        _wallet: &MultisigWallet,
        _recipient: &str,
        _amount: u64,
        _source_tx_hash: &Hash256,
    ) -> Result<String> {
        // Create transaction that releases Bitcoin from multisig
        Ok(format!("release_tx_{:016x}", rand::random::<u64>()))
    }

    async fn create_psbt_for_transaction(
        &self,
        _transaction: &str,
        wallet: &MultisigWallet,
    ) -> Result<Hash256> {
        // Create PSBT for multisig signing
        use sha2::{Digest, Sha256};
        
        let psbt_id = {
            let mut hasher = Sha256::new();
            hasher.update(b"bitcoin_psbt");
            hasher.update(&Self::current_timestamp().to_be_bytes());
            hasher.update(&rand::random::<[u8; 16]>());
            
            let result = hasher.finalize();
            let mut id = [0u8; 32];
            id.copy_from_slice(&result);
            id
        };

        let psbt = PartiallySignedTransaction {
            psbt_base64: "cHNidP8BAH0CAAAAAf...".to_string(), // Mock PSBT
            txid: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            required_signatures: wallet.required_signatures,
            signature_count: 0,
            validator_signatures: Vec::new(),
            fee: 1000, // 1000 sats fee
            created_at: Self::current_timestamp(),
            expires_at: Self::current_timestamp() + 86400, // 24h expiry
        };

        self.pending_psbts.write().await.insert(psbt_id, psbt);
        Ok(psbt_id)
    }

    async fn submit_psbt_for_signing(
        &self,
        psbt_id: Hash256,
        _validator_signatures: &[ValidatorSignature],
    ) -> Result<()> {
        // Submit PSBT to validators for signing
        // In production, this would coordinate with actual Bitcoin validators
        log::info!("Submitted PSBT {} for multisig signing", hex::encode(&psbt_id[..8]));
        Ok(())
    }

    async fn create_bitcoin_htlc_transaction(
        &self,
        _amount: u64,
        _hash_commitment: &Hash256,
        _recipient: &str,
        _timeout_block: u32,
    ) -> Result<String> {
        // Create Hash Time Lock Contract transaction
        Ok(format!("htlc_tx_{:016x}", rand::random::<u64>()))
    }

    async fn create_bitcoin_redeem_transaction(
        &self,
        _contract_tx: &str,
        _secret: &Hash256,
    ) -> Result<String> {
        // Create transaction that redeems from HTLC using secret
        Ok(format!("redeem_tx_{:016x}", rand::random::<u64>()))
    }

    fn generate_payment_hash(&self) -> String {
        format!("{:064x}", rand::random::<u64>())
    }

    fn generate_swap_id(&self) -> Hash256 {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(b"atomic_swap");
        hasher.update(&Self::current_timestamp().to_be_bytes());
        hasher.update(&rand::random::<[u8; 16]>());
        
        let result = hasher.finalize();
        let mut id = [0u8; 32];
        id.copy_from_slice(&result);
        id
    }

    fn generate_hash_commitment(&self) -> Hash256 {
        use sha2::{Digest, Sha256};
        let secret: [u8; 32] = rand::random();
        let mut hasher = Sha256::new();
        hasher.update(&secret);
        
        let result = hasher.finalize();
        let mut commitment = [0u8; 32];
        commitment.copy_from_slice(&result);
        commitment
    }

    fn verify_hash_commitment(&self, secret: &Hash256, commitment: &Hash256) -> bool {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(secret);
        
        let result = hasher.finalize();
        let computed_commitment: [u8; 32] = result.into();
        
        computed_commitment == *commitment
    }

    async fn get_current_block_height(&self) -> Result<u32> {
        // In production, this would call Bitcoin Core's getblockchaininfo RPC
        Ok(750_000) // Mock block height
    }

    async fn monitor_multisig_wallets(
        wallets: &Arc<RwLock<HashMap<String, MultisigWallet>>>,
    ) -> Result<()> {
        let wallets_guard = wallets.read().await;
        for (wallet_id, wallet) in wallets_guard.iter() {
            // In production, check actual Bitcoin balance for each wallet
            log::debug!("Monitoring multisig wallet {} ({})", wallet_id, wallet.address);
        }
        Ok(())
    }

    async fn monitor_atomic_swaps(
        swaps: &Arc<RwLock<HashMap<Hash256, AtomicSwap>>>,
    ) -> Result<()> {
        let mut swaps_guard = swaps.write().await;
        let current_block = 750_000u32; // Mock current block
        
        for (swap_id, swap) in swaps_guard.iter_mut() {
            // Check for timeouts
            if current_block > swap.timeout_block && swap.status != AtomicSwapStatus::Completed {
                swap.status = AtomicSwapStatus::Failed;
                log::warn!("Atomic swap {} timed out", hex::encode(&swap_id[..8]));
            }
            
            // In production, check Bitcoin blockchain for contract/redeem transactions
        }
        Ok(())
    }

    async fn monitor_lightning_payments(
        payments: &Arc<RwLock<HashMap<String, LightningPayment>>>,
    ) -> Result<()> {
        let mut payments_guard = payments.write().await;
        let current_time = Self::current_timestamp();
        
        for (payment_hash, payment) in payments_guard.iter_mut() {
            // Check for expired payments
            if current_time > payment.expires_at && payment.status == LightningPaymentStatus::Pending {
                payment.status = LightningPaymentStatus::Failed;
                log::warn!("Lightning payment {} expired", payment_hash);
            }
        }
        Ok(())
    }

    fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

#[async_trait]
impl Bridge for BitcoinBridge {
    async fn initialize(&self, config: BridgeConfig) -> Result<()> {
        *self.bridge_config.write().await = Some(config);
        
        // Start Bitcoin blockchain monitoring
        self.start_bitcoin_monitoring().await?;
        
        let btc_config = self.config.read().await;
        log::info!("Bitcoin bridge initialized with RPC: {}", btc_config.rpc_endpoint);
        Ok(())
    }

    async fn is_token_supported(&self, token: &str, chain: &ChainId) -> Result<bool> {
        // Bitcoin bridge only supports Bitcoin and Lightning
        if *chain != ChainId::Bitcoin {
            return Ok(false);
        }
        
        // Support native Bitcoin and Lightning payments
        Ok(token == "BTC" || token == "LNBTC")
    }

    async fn calculate_bridge_fee(&self, amount: u64, _source_chain: &ChainId, _target_chain: &ChainId) -> Result<u64> {
        let config = self.config.read().await;
        
        // Bitcoin fee is based on transaction size and fee rate
        let estimated_tx_size = 250; // bytes for typical multisig transaction
        let network_fee = estimated_tx_size * config.fee_rate;
        
        // Bridge service fee (0.1% of amount)
        let service_fee = amount / 1000;
        
        Ok(network_fee + service_fee)
    }

    async fn initiate_bridge(&self, transaction: &BridgeTransaction) -> Result<Hash256> {
        // Validate transaction involves Bitcoin
        if transaction.source_chain != ChainId::Bitcoin && transaction.target_chain != ChainId::Bitcoin {
            return Err(Error::InvalidData("Transaction does not involve Bitcoin".to_string()));
        }

        if transaction.source_chain == ChainId::Bitcoin {
            // Locking Bitcoin to bridge out
            let wallet_id = "default_multisig"; // In production, determine appropriate wallet
            let psbt_hex = self.lock_bitcoin(
                wallet_id,
                transaction.amount,
                &transaction.recipient.as_bytes().try_into()
                    .map_err(|_| Error::InvalidData("Invalid recipient format".to_string()))?,
                &transaction.target_chain,
            ).await?;
            
            // Convert PSBT hex to bridge transaction ID
            use sha2::{Digest, Sha256};
            let mut hasher = Sha256::new();
            hasher.update(psbt_hex.as_bytes());
            let result = hasher.finalize();
            let mut tx_id = [0u8; 32];
            tx_id.copy_from_slice(&result);
            Ok(tx_id)
        } else {
            // Releasing Bitcoin (bridging in from other chain)
            let wallet_id = "default_multisig";
            let psbt_hex = self.release_bitcoin(
                wallet_id,
                &transaction.recipient,
                transaction.amount,
                &transaction.source_tx_hash,
                &transaction.validator_signatures,
            ).await?;
            
            use sha2::{Digest, Sha256};
            let mut hasher = Sha256::new();
            hasher.update(psbt_hex.as_bytes());
            let result = hasher.finalize();
            let mut tx_id = [0u8; 32];
            tx_id.copy_from_slice(&result);
            Ok(tx_id)
        }
    }

    async fn submit_validator_signature(
        &self,
        tx_id: &Hash256,
        signature: &ValidatorSignature,
    ) -> Result<()> {
        // Find corresponding PSBT and add signature
        let mut psbts = self.pending_psbts.write().await;
        
        if let Some(psbt) = psbts.get_mut(tx_id) {
            // Check if validator already signed
            if psbt.validator_signatures.iter().any(|s| s.validator_id == signature.validator_id) {
                return Err(Error::InvalidData("Validator already signed this PSBT".to_string()));
            }

            let psbt_signature = PSBTSignature {
                validator_id: signature.validator_id,
                signed_psbt: format!("signed_psbt_{:016x}", rand::random::<u64>()),
                public_key: hex::encode(&signature.public_key),
                timestamp: signature.timestamp,
            };

            psbt.validator_signatures.push(psbt_signature);
            psbt.signature_count += 1;

            log::info!(
                "Added validator signature to PSBT {}, count: {}/{}",
                hex::encode(&tx_id[..8]),
                psbt.signature_count,
                psbt.required_signatures
            );
        }
        
        Ok(())
    }

    async fn get_transaction_status(&self, tx_id: &Hash256) -> Result<BridgeTransactionStatus> {
        let psbts = self.pending_psbts.read().await;
        
        if let Some(psbt) = psbts.get(tx_id) {
            if psbt.signature_count >= psbt.required_signatures {
                if psbt.txid.is_some() {
                    Ok(BridgeTransactionStatus::Completed)
                } else {
                    Ok(BridgeTransactionStatus::ValidatorsSigned)
                }
            } else {
                Ok(BridgeTransactionStatus::Initiated)
            }
        } else {
            Err(Error::InvalidData("Transaction not found".to_string()))
        }
    }

    async fn get_transaction(&self, _tx_id: &Hash256) -> Result<Option<BridgeTransaction>> {
        // In production, return full BridgeTransaction details
        Ok(None)
    }

    async fn cancel_transaction(&self, tx_id: &Hash256, _canceller: &str) -> Result<()> {
        let mut psbts = self.pending_psbts.write().await;
        
        if psbts.remove(tx_id).is_some() {
            log::info!("Cancelled Bitcoin bridge transaction {}", hex::encode(&tx_id[..8]));
            Ok(())
        } else {
            Err(Error::InvalidData("Transaction not found".to_string()))
        }
    }

    async fn get_supported_chains(&self) -> Result<Vec<ChainId>> {
        Ok(vec![
            ChainId::Bitcoin,
            ChainId::BitcoinCash,
            ChainId::Litecoin,
            ChainId::BitCraps, // Our native chain
        ])
    }

    async fn emergency_pause(&self) -> Result<()> {
        log::warn!("Emergency pause activated for Bitcoin bridge");
        // In production, this would pause all Bitcoin operations
        Ok(())
    }

    async fn resume_operations(&self) -> Result<()> {
        log::info!("Bitcoin bridge operations resumed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_bitcoin_bridge_initialization() {
        let btc_config = BitcoinBridgeConfig::default();
        let bridge = BitcoinBridge::new(btc_config);
        
        let bridge_config = BridgeConfig {
            min_amount: 100_000, // 0.001 BTC
            max_amount: 100_000_000, // 1 BTC
            fee_percentage: 0.001,
            required_signatures: 2,
            timeout_duration: Duration::from_secs(3600),
            confirmation_requirements: HashMap::new(),
            supported_tokens: HashMap::new(),
            validator_keys: Vec::new(),
            emergency_pause: false,
        };

        let result = bridge.initialize(bridge_config).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_multisig_wallet_creation() {
        let btc_config = BitcoinBridgeConfig::default();
        let bridge = BitcoinBridge::new(btc_config);
        
        let pubkeys = vec![
            "03000000000000000000000000000000000000000000000000000000000000000001".to_string(),
            "03000000000000000000000000000000000000000000000000000000000000000002".to_string(),
            "03000000000000000000000000000000000000000000000000000000000000000003".to_string(),
        ];
        
        let wallet_id = bridge.create_multisig_wallet(pubkeys, 2).await.unwrap();
        assert!(!wallet_id.is_empty());
    }

    #[tokio::test]
    async fn test_atomic_swap_creation() {
        let btc_config = BitcoinBridgeConfig::default();
        let bridge = BitcoinBridge::new(btc_config);
        
        let swap_id = bridge.create_atomic_swap(
            1_000_000, // 0.01 BTC
            10_000_000_000, // 10 CRAP
            "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq".to_string(),
            [1u8; 32], // Mock CRAP participant
        ).await.unwrap();
        
        assert_ne!(swap_id, [0u8; 32]);
    }

    #[tokio::test]  
    async fn test_lightning_payment_initiation() {
        let mut btc_config = BitcoinBridgeConfig::default();
        btc_config.lightning_config = Some(LightningConfig::default());
        
        let bridge = BitcoinBridge::new(btc_config);
        
        let payment_hash = bridge.initiate_lightning_payment(
            100_000_000, // 100k msat = 100 sats
            "03000000000000000000000000000000000000000000000000000000000000000001",
            "Bridge payment test",
        ).await.unwrap();
        
        assert!(!payment_hash.is_empty());
    }
}