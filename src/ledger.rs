use std::collections::HashMap;
use std::sync::Mutex;

use secp256k1::Secp256k1;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{SwapError, SwapResult};
use crate::internal::convert::serialize_decimal;
use crate::internal::helper::keccak256;
use crate::internal::hex_utils::{encode_prefixed, serialize_prefixed, to_vec};
use crate::keys::sign::recover_signer;
use crate::transactions::fees::required_balance;
use crate::transactions::legacy::TransactionPayload;
use crate::types::Address;

/// Call description handed to gas estimation.
#[derive(Debug, Clone, Serialize)]
pub struct CallRequest {
    pub from: Address,
    pub to: Address,
    #[serde(serialize_with = "serialize_decimal")]
    pub value: u128,
    #[serde(serialize_with = "serialize_prefixed")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
}

/// Read/write access to the ledger.
///
/// Every implementation owns its own retry policy; callers never retry.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    async fn balance(&self, address: &Address) -> SwapResult<u128>;
    async fn nonce(&self, address: &Address) -> SwapResult<u64>;
    async fn gas_price(&self) -> SwapResult<u128>;
    async fn estimate_gas(&self, call: &CallRequest) -> SwapResult<u64>;
    async fn submit_raw(&self, signed_raw: &str) -> SwapResult<TransactionReceipt>;
}

// ============================================================================
// IN-MEMORY LEDGER
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Account {
    pub balance: u128,
    pub nonce: u64,
}

/// Deterministic ledger for offline runs and tests.
///
/// Unknown addresses read as empty accounts, so an undeployed contract
/// reports a zero balance. Submitted transactions are checked (signature,
/// chain, nonce, funds) and applied.
pub struct InMemoryLedger {
    chain_id: u64,
    gas_price: u128,
    gas_limit: u64,
    accounts: Mutex<HashMap<Address, Account>>,
    submitted: Mutex<Vec<String>>,
}

impl InMemoryLedger {
    pub fn new(chain_id: u64, gas_price: u128, gas_limit: u64) -> Self {
        InMemoryLedger {
            chain_id,
            gas_price,
            gas_limit,
            accounts: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_account(self, address: Address, balance: u128, nonce: u64) -> Self {
        self.set_account(address, Account { balance, nonce });
        self
    }

    pub fn set_account(&self, address: Address, account: Account) {
        self.lock_accounts().insert(address, account);
    }

    pub fn account(&self, address: &Address) -> Account {
        self.lock_accounts().get(address).copied().unwrap_or_default()
    }

    /// Raw encodings accepted by `submit_raw`, oldest first.
    pub fn submitted(&self) -> Vec<String> {
        match self.submitted.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn lock_accounts(&self) -> std::sync::MutexGuard<'_, HashMap<Address, Account>> {
        match self.accounts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Ledger for InMemoryLedger {
    async fn balance(&self, address: &Address) -> SwapResult<u128> {
        Ok(self.account(address).balance)
    }

    async fn nonce(&self, address: &Address) -> SwapResult<u64> {
        Ok(self.account(address).nonce)
    }

    async fn gas_price(&self) -> SwapResult<u128> {
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> SwapResult<u64> {
        debug!(to = %call.to, value = call.value, "estimating gas");
        Ok(self.gas_limit)
    }

    async fn submit_raw(&self, signed_raw: &str) -> SwapResult<TransactionReceipt> {
        let raw = to_vec(signed_raw)
            .ok_or_else(|| SwapError::MalformedRawEncoding("signed raw is not hex".to_string()))?;
        let (payload, signature) = TransactionPayload::decode_signed(&raw)?;
        if payload.chain_id != self.chain_id {
            return Err(SwapError::Ledger(format!(
                "chain id {} rejected by ledger on chain {}",
                payload.chain_id, self.chain_id
            )));
        }
        let sender = recover_signer(&payload, &signature, &Secp256k1::new())?;

        let mut accounts = self.lock_accounts();
        let account = accounts.get(&sender).copied().unwrap_or_default();
        if payload.nonce != account.nonce {
            return Err(SwapError::Ledger(format!(
                "nonce {} rejected, account nonce is {}",
                payload.nonce, account.nonce
            )));
        }
        let required = required_balance(payload.value, payload.gas, payload.gas_price)?;
        if account.balance < required {
            return Err(SwapError::InsufficientFunds {
                balance: account.balance,
                required,
            });
        }

        accounts.insert(
            sender,
            Account {
                balance: account.balance - required,
                nonce: account.nonce + 1,
            },
        );
        let recipient = accounts.entry(payload.to).or_default();
        recipient.balance = recipient.balance.saturating_add(payload.value);
        drop(accounts);

        let transaction_hash = encode_prefixed(&keccak256(&raw));
        info!(%sender, hash = %transaction_hash, "transaction applied to in-memory ledger");
        match self.submitted.lock() {
            Ok(mut guard) => guard.push(encode_prefixed(&raw)),
            Err(poisoned) => poisoned.into_inner().push(encode_prefixed(&raw)),
        }
        Ok(TransactionReceipt { transaction_hash })
    }
}
