use crate::error::{SwapError, SwapResult};
use crate::internal::hex_utils::strip_prefix;

// JSON-RPC quantities are `0x`-prefixed big-endian hex without leading zeros.

pub fn to_quantity(value: u128) -> String {
    format!("{:#x}", value)
}

pub fn parse_quantity(quantity: &str) -> SwapResult<u128> {
    let digits = strip_prefix(quantity);
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| SwapError::Ledger(format!("bad quantity {:?}: {}", quantity, e)))
}

pub fn parse_quantity_u64(quantity: &str) -> SwapResult<u64> {
    let value = parse_quantity(quantity)?;
    u64::try_from(value)
        .map_err(|_| SwapError::Ledger(format!("quantity {} does not fit in u64", quantity)))
}

/// Serializes wei amounts as decimal strings; JSON numbers stop at u64.
pub fn serialize_decimal<S: serde::Serializer>(
    value: &u128,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}
