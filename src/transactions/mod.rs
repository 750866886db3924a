pub mod fees;
pub mod fund;
pub mod legacy;
pub mod rlp;

pub use fees::*;
pub use fund::*;
pub use legacy::TransactionPayload;
