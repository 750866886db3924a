use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::contracts::abi::{htlc_abi, FundCall, HTLC_BYTECODE, HTLC_BYTECODE_RUNTIME};
use crate::contracts::opcodes::disassemble;
use crate::error::{SwapError, SwapResult};
use crate::internal::helper::{format_amount, get_current_timestamp, keccak256, sha256_bytes, Unit};
use crate::internal::hex_utils::to_vec;
use crate::ledger::Ledger;
use crate::transactions::rlp::RlpStream;
use crate::types::{Address, Network, SecretHash};

/// Terms of one hash time lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtlcParameters {
    pub secret_hash: SecretHash,
    pub sender_address: Address,
    pub recipient_address: Address,
    /// Unix timestamp after which the sender may refund.
    pub endtime: u64,
}

/// Where the HTLC contract lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractLocation {
    /// Contract already deployed at a known address.
    Deployed(Address),
    /// Address the contract gets when `deployer` creates it with `nonce`.
    Create { deployer: Address, nonce: u64 },
}

impl ContractLocation {
    pub fn resolve(&self) -> Address {
        match self {
            ContractLocation::Deployed(address) => *address,
            ContractLocation::Create { deployer, nonce } => create_address(deployer, *nonce),
        }
    }
}

/// CREATE rule: `keccak256(rlp([deployer, nonce]))[12..]`.
pub fn create_address(deployer: &Address, nonce: u64) -> Address {
    let mut stream = RlpStream::new();
    stream.append_bytes(deployer.as_bytes()).append_uint(nonce as u128);
    let hash = keccak256(&stream.out());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address(bytes)
}

/// Per-swap id the contract assigns to a funded lock:
/// `sha256(secret_hash || recipient || sender || endtime_be32)`.
pub fn locked_contract_id(params: &HtlcParameters) -> [u8; 32] {
    let mut preimage = Vec::with_capacity(32 + 20 + 20 + 32);
    preimage.extend_from_slice(params.secret_hash.as_bytes());
    preimage.extend_from_slice(params.recipient_address.as_bytes());
    preimage.extend_from_slice(params.sender_address.as_bytes());
    let mut endtime = [0u8; 32];
    endtime[24..].copy_from_slice(&params.endtime.to_be_bytes());
    preimage.extend_from_slice(&endtime);
    sha256_bytes(&preimage)
}

// ============================================================================
// HTLC DESCRIPTOR
// ============================================================================

/// Validated HTLC terms bound to a contract address. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtlcDescriptor {
    network: Network,
    params: HtlcParameters,
    contract_address: Address,
    locked_contract_id: [u8; 32],
    fund_call_data: Vec<u8>,
}

impl HtlcDescriptor {
    pub fn build(
        network: Network,
        params: HtlcParameters,
        location: ContractLocation,
    ) -> SwapResult<Self> {
        Self::build_at(network, params, location, get_current_timestamp(0)?)
    }

    /// Same as [`HtlcDescriptor::build`] with an explicit clock.
    pub fn build_at(
        network: Network,
        params: HtlcParameters,
        location: ContractLocation,
        now: u64,
    ) -> SwapResult<Self> {
        if params.endtime <= now {
            return Err(SwapError::InvalidParameters(format!(
                "endtime {} is not in the future (now {})",
                params.endtime, now
            )));
        }
        if params.sender_address == params.recipient_address {
            warn!(
                address = %params.sender_address,
                "HTLC sender and recipient are the same account"
            );
        }

        let contract_address = location.resolve();
        let fund_call_data = FundCall {
            secret_hash: params.secret_hash,
            recipient: params.recipient_address,
            sender: params.sender_address,
            endtime: params.endtime,
        }
        .encode();

        let descriptor = HtlcDescriptor {
            network,
            params,
            contract_address,
            locked_contract_id: locked_contract_id(&params),
            fund_call_data,
        };
        info!(
            contract = %descriptor.contract_address,
            locked_contract_id = %descriptor.locked_contract_id(),
            "built HTLC"
        );
        Ok(descriptor)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn params(&self) -> &HtlcParameters {
        &self.params
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn locked_contract_id(&self) -> String {
        hex::encode(self.locked_contract_id)
    }

    pub fn fund_call_data(&self) -> &[u8] {
        &self.fund_call_data
    }

    pub fn agreements(&self) -> Value {
        json!({
            "secret_hash": self.params.secret_hash.to_string(),
            "recipient_address": self.params.recipient_address.to_checksum(),
            "sender_address": self.params.sender_address.to_checksum(),
            "endtime": {
                "timestamp": self.params.endtime,
            },
        })
    }

    pub fn abi(&self) -> Value {
        htlc_abi()
    }

    /// Creation bytecode, `0x`-prefixed hex.
    pub fn bytecode(&self) -> &'static str {
        HTLC_BYTECODE
    }

    pub fn bytecode_runtime(&self) -> &'static str {
        HTLC_BYTECODE_RUNTIME
    }

    /// Disassembly of the runtime bytecode.
    pub fn opcode(&self) -> String {
        disassemble(&to_vec(HTLC_BYTECODE_RUNTIME).unwrap_or_default())
    }

    /// Balance held at the contract address. An address with nothing
    /// deployed reads as zero on Ethereum.
    pub async fn balance<L: Ledger>(&self, ledger: &L, unit: Unit) -> SwapResult<String> {
        let wei = ledger.balance(&self.contract_address).await?;
        Ok(format_amount(wei, unit))
    }
}
