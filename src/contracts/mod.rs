pub mod abi;
pub mod htlc;
pub mod opcodes;

pub use abi::*;
pub use htlc::*;
pub use opcodes::disassemble;
