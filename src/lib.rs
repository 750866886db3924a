//! Hash time lock contract (HTLC) fund transactions for Ethereum-style
//! ledgers: derive the sender wallet, describe the HTLC, build the unsigned
//! fund transaction, sign it from the object and from its raw encoding, and
//! check both signed encodings match.

pub mod config;
pub mod contracts;
pub mod error;
pub mod interactive;
pub mod internal;
pub mod keys;
pub mod ledger;
pub mod signing;
pub mod transactions;
pub mod types;
pub mod workflows;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use config::*;
pub use contracts::*;
pub use error::*;
pub use internal::helper::{
    amount_unit_converter, format_amount, get_current_timestamp, keccak256, parse_amount, sha256,
    Unit,
};
pub use keys::*;
pub use ledger::*;
pub use signing::*;
pub use transactions::*;
pub use types::*;
pub use workflows::*;
