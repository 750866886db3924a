use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{SwapError, SwapResult};
use crate::internal::convert::{parse_quantity, parse_quantity_u64, to_quantity};
use crate::internal::hex_utils::encode_prefixed;
use crate::ledger::{CallRequest, Ledger, TransactionReceipt};
use crate::types::Address;

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// Ethereum JSON-RPC ledger over HTTP.
///
/// Transport failures are retried `retries` times with a fixed backoff.
/// Errors reported by the node are returned as-is.
pub struct JsonRpcLedger {
    endpoint: String,
    client: reqwest::Client,
    retries: u32,
    backoff: Duration,
    next_id: AtomicU64,
}

impl JsonRpcLedger {
    pub fn new(endpoint: String, retries: u32, backoff: Duration) -> SwapResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SwapError::Ledger(format!("cannot build HTTP client: {}", e)))?;
        Ok(JsonRpcLedger {
            endpoint,
            client,
            retries,
            backoff,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn call_method<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> SwapResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let mut attempt = 0;
        let response: RpcResponse<T> = loop {
            attempt += 1;
            debug!(method, attempt, "json-rpc request");
            let sent = self.client.post(&self.endpoint).json(&body).send().await;
            let result = match sent {
                Ok(resp) => resp.error_for_status().map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            match result {
                Ok(resp) => {
                    break resp
                        .json()
                        .await
                        .map_err(|e| SwapError::Ledger(format!("{}: bad response: {}", method, e)))?
                }
                Err(e) if attempt <= self.retries => {
                    warn!(method, attempt, error = %e, "json-rpc request failed, retrying");
                    sleep(self.backoff).await;
                }
                Err(e) => return Err(SwapError::Ledger(format!("{}: {}", method, e))),
            }
        };

        if let Some(err) = response.error {
            return Err(SwapError::Ledger(format!(
                "{} failed ({}): {}",
                method, err.code, err.message
            )));
        }
        response
            .result
            .ok_or_else(|| SwapError::Ledger(format!("{} returned no result", method)))
    }
}

impl Ledger for JsonRpcLedger {
    async fn balance(&self, address: &Address) -> SwapResult<u128> {
        let quantity: String = self
            .call_method("eth_getBalance", json!([address.to_checksum(), "latest"]))
            .await?;
        parse_quantity(&quantity)
    }

    async fn nonce(&self, address: &Address) -> SwapResult<u64> {
        let quantity: String = self
            .call_method("eth_getTransactionCount", json!([address.to_checksum(), "pending"]))
            .await?;
        parse_quantity_u64(&quantity)
    }

    async fn gas_price(&self) -> SwapResult<u128> {
        let quantity: String = self.call_method("eth_gasPrice", json!([])).await?;
        parse_quantity(&quantity)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> SwapResult<u64> {
        let params = json!([{
            "from": call.from.to_checksum(),
            "to": call.to.to_checksum(),
            "value": to_quantity(call.value),
            "data": encode_prefixed(&call.data),
        }]);
        let quantity: String = self.call_method("eth_estimateGas", params).await?;
        parse_quantity_u64(&quantity)
    }

    async fn submit_raw(&self, signed_raw: &str) -> SwapResult<TransactionReceipt> {
        let transaction_hash: String = self
            .call_method("eth_sendRawTransaction", json!([signed_raw]))
            .await?;
        Ok(TransactionReceipt { transaction_hash })
    }
}
