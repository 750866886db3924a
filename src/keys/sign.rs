use std::fmt;
use std::str::FromStr;

use bitcoin::bip32::{DerivationPath, Xpriv};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use serde::Serialize;
use serde_json::json;

use crate::error::{SwapError, SwapResult};
use crate::internal::hex_utils::{encode_prefixed, serialize_prefixed};
use crate::transactions::legacy::TransactionPayload;
use crate::types::Address;

// ============================================================================
// SIGNATURES
// ============================================================================

/// EIP-155 signature components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub v: u64,
    #[serde(serialize_with = "serialize_prefixed")]
    pub r: [u8; 32],
    #[serde(serialize_with = "serialize_prefixed")]
    pub s: [u8; 32],
}

impl Signature {
    /// Recovery id encoded in `v` for the given chain.
    pub fn recovery_id(&self, chain_id: u64) -> SwapResult<i32> {
        let offset = chain_id
            .checked_mul(2)
            .and_then(|c| c.checked_add(35))
            .ok_or_else(|| SwapError::MalformedRawEncoding("chain id overflows".to_string()))?;
        match self.v.checked_sub(offset) {
            Some(id @ 0..=1) => Ok(id as i32),
            _ => Err(SwapError::MalformedRawEncoding(format!(
                "v = {} does not match chain id {}",
                self.v, chain_id
            ))),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "v": self.v,
            "r": encode_prefixed(&self.r),
            "s": encode_prefixed(&self.s),
        })
    }
}

/// Signs the EIP-155 digest of `payload`.
///
/// RFC 6979 nonces make this a pure function of key and payload, and
/// libsecp256k1 always emits low-s signatures.
pub fn sign_payload(
    payload: &TransactionPayload,
    secret_key: &SecretKey,
    secp_ctx: &Secp256k1<All>,
) -> Signature {
    let msg = Message::from_digest(payload.signing_digest());
    let sig = secp_ctx.sign_ecdsa_recoverable(&msg, secret_key);
    let (recovery_id, compact) = sig.serialize_compact();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&compact[..32]);
    s.copy_from_slice(&compact[32..]);

    Signature {
        v: recovery_id.to_i32() as u64 + payload.chain_id * 2 + 35,
        r,
        s,
    }
}

/// Recovers the sender address from a signed payload.
pub fn recover_signer(
    payload: &TransactionPayload,
    signature: &Signature,
    secp_ctx: &Secp256k1<All>,
) -> SwapResult<Address> {
    let recovery_id = RecoveryId::from_i32(signature.recovery_id(payload.chain_id)?)?;
    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&signature.r);
    compact[32..].copy_from_slice(&signature.s);
    let sig = RecoverableSignature::from_compact(&compact, recovery_id)?;

    let msg = Message::from_digest(payload.signing_digest());
    let public_key: PublicKey = secp_ctx.recover_ecdsa(&msg, &sig)?;
    Ok(Address::from_public_key(&public_key))
}

// ============================================================================
// FUND SOLVER
// ============================================================================

/// Signing capability: a root extended private key plus the account path.
///
/// The account secret is derived inside each signing call and dropped when
/// the call returns. The solver is neither `Clone` nor serializable, and its
/// `Debug` output only shows the path.
pub struct FundSolver {
    xprivate_key: Xpriv,
    path: DerivationPath,
    path_str: String,
    secp_ctx: Secp256k1<All>,
}

impl FundSolver {
    pub fn new(xprivate_key: &str, path: &str) -> SwapResult<Self> {
        Ok(FundSolver {
            xprivate_key: Xpriv::from_str(xprivate_key)?,
            path: DerivationPath::from_str(path)?,
            path_str: path.to_string(),
            secp_ctx: Secp256k1::new(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path_str
    }

    fn with_secret_key<T>(&self, f: impl FnOnce(&SecretKey) -> SwapResult<T>) -> SwapResult<T> {
        let derived = self.xprivate_key.derive_priv(&self.secp_ctx, &self.path)?;
        f(&derived.private_key)
    }

    /// Address controlled by the derived key.
    pub fn address(&self) -> SwapResult<Address> {
        self.with_secret_key(|secret| {
            Ok(Address::from_public_key(&PublicKey::from_secret_key(
                &self.secp_ctx,
                secret,
            )))
        })
    }

    /// Signs `payload`, checking first that the key controls `expected_sender`.
    pub fn sign(
        &self,
        payload: &TransactionPayload,
        expected_sender: Option<&Address>,
    ) -> SwapResult<(Address, Signature)> {
        self.with_secret_key(|secret| {
            let signer =
                Address::from_public_key(&PublicKey::from_secret_key(&self.secp_ctx, secret));
            if let Some(expected) = expected_sender {
                if *expected != signer {
                    return Err(SwapError::SigningKeyMismatch {
                        derived: signer.to_string(),
                        expected: expected.to_string(),
                    });
                }
            }
            Ok((signer, sign_payload(payload, secret, &self.secp_ctx)))
        })
    }
}

impl fmt::Debug for FundSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FundSolver")
            .field("xprivate_key", &"<redacted>")
            .field("path", &self.path_str)
            .finish()
    }
}
