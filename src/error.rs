use thiserror::Error;

/// Errors raised while building, signing or comparing fund transactions.
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("insufficient funds: balance {balance} wei, required {required} wei")]
    InsufficientFunds { balance: u128, required: u128 },

    #[error("signing key mismatch: derived {derived}, transaction sender {expected}")]
    SigningKeyMismatch { derived: String, expected: String },

    #[error("malformed raw encoding: {0}")]
    MalformedRawEncoding(String),

    #[error("invalid transaction type: {0}")]
    InvalidTransactionType(String),

    #[error("signed encodings differ: object path {object_path}, raw path {raw_path}")]
    EquivalenceViolation { object_path: String, raw_path: String },

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error("wallet has no derived key, call from_path first")]
    NoKey,

    #[error("ledger request failed: {0}")]
    Ledger(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type SwapResult<T> = Result<T, SwapError>;

impl From<bitcoin::bip32::Error> for SwapError {
    fn from(err: bitcoin::bip32::Error) -> Self {
        SwapError::Derivation(err.to_string())
    }
}

impl From<secp256k1::Error> for SwapError {
    fn from(err: secp256k1::Error) -> Self {
        SwapError::Derivation(err.to_string())
    }
}

impl From<bip39::Error> for SwapError {
    fn from(err: bip39::Error) -> Self {
        SwapError::InvalidMnemonic(err.to_string())
    }
}
