use serde_json::{json, Value};
use tracing::{debug, info};

use crate::contracts::htlc::HtlcDescriptor;
use crate::error::{SwapError, SwapResult};
use crate::internal::helper::keccak256;
use crate::internal::hex_utils::encode_prefixed;
use crate::keys::sign::{FundSolver, Signature};
use crate::ledger::{CallRequest, Ledger};
use crate::transactions::fees::required_balance;
use crate::transactions::legacy::TransactionPayload;
use crate::types::{Address, Network};

pub const UNSIGNED_FUND_TYPE: &str = "ethereum_fund_unsigned";
pub const SIGNED_FUND_TYPE: &str = "ethereum_fund_signed";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FundOptions {
    /// Fail with `InsufficientFunds` before signing instead of leaving the
    /// check to the network at broadcast.
    pub check_balance: bool,
}

// ============================================================================
// BUILDER
// ============================================================================

pub struct FundTransactionBuilder {
    network: Network,
    options: FundOptions,
}

impl FundTransactionBuilder {
    pub fn new(network: Network) -> Self {
        FundTransactionBuilder {
            network,
            options: FundOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FundOptions) -> Self {
        self.options = options;
        self
    }

    /// Assembles the unsigned call of `htlc.fund(...)` carrying `amount` wei.
    pub async fn build_transaction<L: Ledger>(
        &self,
        ledger: &L,
        from_address: Address,
        htlc: &HtlcDescriptor,
        amount: u128,
    ) -> SwapResult<UnsignedFundTransaction> {
        if amount == 0 {
            return Err(SwapError::InvalidParameters(
                "fund amount must be greater than zero".to_string(),
            ));
        }
        if htlc.network() != self.network {
            return Err(SwapError::InvalidParameters(format!(
                "HTLC is on {}, builder is on {}",
                htlc.network(),
                self.network
            )));
        }

        let nonce = ledger.nonce(&from_address).await?;
        let gas_price = ledger.gas_price().await?;
        let call = CallRequest {
            from: from_address,
            to: htlc.contract_address(),
            value: amount,
            data: htlc.fund_call_data().to_vec(),
        };
        let gas = ledger.estimate_gas(&call).await?;
        debug!(nonce, gas, gas_price, "fetched fee parameters");

        if self.options.check_balance {
            let balance = ledger.balance(&from_address).await?;
            let required = required_balance(amount, gas, gas_price)?;
            if balance < required {
                return Err(SwapError::InsufficientFunds { balance, required });
            }
        }

        let payload = TransactionPayload {
            nonce,
            gas_price,
            gas,
            to: call.to,
            value: amount,
            data: call.data,
            chain_id: self.network.chain_id(),
        };
        let unsigned = UnsignedFundTransaction::from_parts(self.network, from_address, payload)?;
        info!(from = %from_address, hash = %unsigned.hash(), "built unsigned fund transaction");
        Ok(unsigned)
    }
}

// ============================================================================
// UNSIGNED
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedFundTransaction {
    network: Network,
    from_address: Address,
    payload: TransactionPayload,
    fee: u128,
}

impl UnsignedFundTransaction {
    /// Pure constructor; the encoding depends on nothing but these fields.
    pub fn from_parts(
        network: Network,
        from_address: Address,
        payload: TransactionPayload,
    ) -> SwapResult<Self> {
        if payload.chain_id != network.chain_id() {
            return Err(SwapError::InvalidParameters(format!(
                "chain id {} does not belong to {}",
                payload.chain_id, network
            )));
        }
        let fee = payload.fee()?;
        Ok(UnsignedFundTransaction {
            network,
            from_address,
            payload,
            fee,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn from_address(&self) -> Address {
        self.from_address
    }

    pub fn payload(&self) -> &TransactionPayload {
        &self.payload
    }

    /// Fee in wei.
    pub fn fee(&self) -> u128 {
        self.fee
    }

    /// Signing digest.
    pub fn hash(&self) -> String {
        encode_prefixed(&self.payload.signing_digest())
    }

    pub fn raw(&self) -> String {
        encode_prefixed(&self.payload.signing_payload())
    }

    /// Canonical raw encoding handed to the raw-path signer.
    pub fn transaction_raw(&self) -> String {
        self.raw()
    }

    pub fn signature(&self) -> Value {
        Value::Null
    }

    pub fn transaction_type(&self) -> &'static str {
        UNSIGNED_FUND_TYPE
    }

    pub fn json(&self) -> Value {
        json!({
            "network": self.network.name(),
            "from": self.from_address.to_checksum(),
            "fee": self.fee.to_string(),
            "transaction": self.payload,
        })
    }

    /// Object-path signing.
    pub fn sign(&self, solver: &FundSolver) -> SwapResult<SignedFundTransaction> {
        let (signer, signature) = solver.sign(&self.payload, Some(&self.from_address))?;
        Ok(SignedFundTransaction::new(
            self.network,
            signer,
            self.payload.clone(),
            signature,
            self.fee,
        ))
    }
}

// ============================================================================
// SIGNED
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedFundTransaction {
    network: Network,
    from_address: Address,
    payload: TransactionPayload,
    signature: Signature,
    fee: u128,
    raw: Vec<u8>,
}

impl SignedFundTransaction {
    pub(crate) fn new(
        network: Network,
        from_address: Address,
        payload: TransactionPayload,
        signature: Signature,
        fee: u128,
    ) -> Self {
        let raw = payload.encode_signed(&signature);
        SignedFundTransaction {
            network,
            from_address,
            payload,
            signature,
            fee,
            raw,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn from_address(&self) -> Address {
        self.from_address
    }

    pub fn payload(&self) -> &TransactionPayload {
        &self.payload
    }

    pub fn fee(&self) -> u128 {
        self.fee
    }

    /// Transaction hash as the network reports it.
    pub fn hash(&self) -> String {
        encode_prefixed(&keccak256(&self.raw))
    }

    pub fn raw(&self) -> String {
        encode_prefixed(&self.raw)
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn transaction_raw(&self) -> String {
        self.raw()
    }

    pub fn signature(&self) -> Value {
        self.signature.to_json()
    }

    pub fn signature_parts(&self) -> &Signature {
        &self.signature
    }

    pub fn transaction_type(&self) -> &'static str {
        SIGNED_FUND_TYPE
    }

    pub fn json(&self) -> Value {
        json!({
            "network": self.network.name(),
            "from": self.from_address.to_checksum(),
            "fee": self.fee().to_string(),
            "transaction": self.payload,
            "signature": self.signature,
        })
    }
}
