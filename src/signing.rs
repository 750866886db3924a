use tracing::{error, info};

use crate::contracts::abi::FundCall;
use crate::error::{SwapError, SwapResult};
use crate::internal::hex_utils::to_vec;
use crate::keys::sign::FundSolver;
use crate::transactions::fund::SignedFundTransaction;
use crate::transactions::legacy::TransactionPayload;
use crate::types::Network;

// ============================================================================
// RAW-PATH SIGNING
// ============================================================================
//
// Signs from the canonical raw encoding of an unsigned fund transaction
// rather than the in-memory object. The payload is decoded, checked to be a
// fund call, and signed with the same deterministic rule as
// `UnsignedFundTransaction::sign`, so both paths must agree byte for byte.

pub struct FundSignature {
    network: Network,
}

impl FundSignature {
    pub fn new(network: Network) -> Self {
        FundSignature { network }
    }

    pub fn sign(
        &self,
        transaction_raw: &str,
        solver: &FundSolver,
    ) -> SwapResult<SignedFundTransaction> {
        let raw = to_vec(transaction_raw).ok_or_else(|| {
            SwapError::MalformedRawEncoding("transaction raw is not hex".to_string())
        })?;
        let payload = TransactionPayload::decode_unsigned(&raw)?;

        if payload.chain_id != self.network.chain_id() {
            return Err(SwapError::InvalidParameters(format!(
                "raw transaction is for chain {}, signer is on {} ({})",
                payload.chain_id,
                self.network,
                self.network.chain_id()
            )));
        }
        if FundCall::decode(&payload.data).is_none() {
            return Err(SwapError::InvalidTransactionType(
                "calldata is not an HTLC fund call".to_string(),
            ));
        }
        if payload.value == 0 {
            return Err(SwapError::InvalidTransactionType(
                "fund transaction carries no value".to_string(),
            ));
        }

        let fee = payload.fee()?;
        let (signer, signature) = solver.sign(&payload, None)?;
        let signed = SignedFundTransaction::new(self.network, signer, payload, signature, fee);
        info!(signer = %signer, hash = %signed.hash(), "signed fund transaction from raw");
        Ok(signed)
    }
}

// ============================================================================
// EQUIVALENCE CHECK
// ============================================================================

/// Both signing paths must yield the same signed encoding. A difference
/// means encoding, digesting or signing is no longer deterministic.
pub fn assert_equivalent(object_path: &str, raw_path: &str) -> SwapResult<()> {
    if object_path != raw_path {
        error!("object-path and raw-path signed encodings differ");
        return Err(SwapError::EquivalenceViolation {
            object_path: object_path.to_string(),
            raw_path: raw_path.to_string(),
        });
    }
    Ok(())
}
