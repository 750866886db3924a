use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::contracts::htlc::ContractLocation;
use crate::error::{SwapError, SwapResult};
use crate::internal::helper::Unit;
use crate::keys::derivation::DEFAULT_PATH;
use crate::types::{Address, Network};

/// HTLC contract of the reference ropsten run,
/// 0xE5cb615899436A490dBde26d7880A0C2502Fc676.
pub const DEFAULT_CONTRACT_ADDRESS: Address = Address([
    0xe5, 0xcb, 0x61, 0x58, 0x99, 0x43, 0x6a, 0x49, 0x0d, 0xbd, 0xe2, 0x6d, 0x78, 0x80, 0xa0, 0xc2,
    0x50, 0x2f, 0xc6, 0x76,
]);

/// 0x1954C47a5D75bdDA53578CEe5D549bf84b8c6B94
pub const DEFAULT_RECIPIENT_ADDRESS: Address = Address([
    0x19, 0x54, 0xc4, 0x7a, 0x5d, 0x75, 0xbd, 0xda, 0x53, 0x57, 0x8c, 0xee, 0x5d, 0x54, 0x9b, 0xf8,
    0x4b, 0x8c, 0x6b, 0x94,
]);

/// Everything one fund run needs. Defaults reproduce the reference ropsten run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FundConfig {
    pub network: Network,
    /// JSON-RPC endpoint; the network default when absent.
    pub rpc_endpoint: Option<String>,
    pub rpc_retries: u32,
    pub rpc_backoff_ms: u64,
    pub contract: ContractLocation,
    /// Plain-text secret whose SHA-256 becomes the HTLC secret hash.
    pub secret: String,
    pub sender_mnemonic: String,
    pub sender_passphrase: Option<String>,
    pub derivation_path: String,
    pub recipient_address: Address,
    /// Lock duration, added to the current time.
    pub endtime_offset_secs: u64,
    pub amount: String,
    pub amount_unit: Unit,
    pub check_balance: bool,
    pub broadcast: bool,
    /// Run against the in-memory ledger instead of the RPC endpoint.
    pub offline: bool,
    pub offline_ledger: OfflineLedgerConfig,
}

/// Seed state for the in-memory ledger.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OfflineLedgerConfig {
    pub sender_balance: String,
    pub sender_nonce: u64,
    pub gas_price_gwei: String,
    pub gas_limit: u64,
}

impl Default for OfflineLedgerConfig {
    fn default() -> Self {
        OfflineLedgerConfig {
            sender_balance: "1".to_string(),
            sender_nonce: 0,
            gas_price_gwei: "20".to_string(),
            gas_limit: 120_000,
        }
    }
}

impl Default for FundConfig {
    fn default() -> Self {
        FundConfig {
            network: Network::Ropsten,
            rpc_endpoint: None,
            rpc_retries: 3,
            rpc_backoff_ms: 500,
            contract: ContractLocation::Deployed(DEFAULT_CONTRACT_ADDRESS),
            secret: "Hello Meheret!".to_string(),
            sender_mnemonic:
                "unfair divorce remind addict add roof park clown build renew illness fault"
                    .to_string(),
            sender_passphrase: None,
            derivation_path: DEFAULT_PATH.to_string(),
            recipient_address: DEFAULT_RECIPIENT_ADDRESS,
            endtime_offset_secs: 3600,
            amount: "0.1".to_string(),
            amount_unit: Unit::Ether,
            check_balance: false,
            broadcast: false,
            offline: false,
            offline_ledger: OfflineLedgerConfig::default(),
        }
    }
}

impl FundConfig {
    pub fn from_file(path: &Path) -> SwapResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| SwapError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| SwapError::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    pub fn endpoint(&self) -> String {
        self.rpc_endpoint
            .clone()
            .unwrap_or_else(|| self.network.default_endpoint())
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.rpc_backoff_ms)
    }
}
