pub mod derivation;
pub mod sign;

pub use derivation::{Wallet, DEFAULT_PATH};
pub use sign::{recover_signer, sign_payload, FundSolver, Signature};
