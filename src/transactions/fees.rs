// ============================================================================
// FEE CALCULATIONS
// ============================================================================

use crate::error::{SwapError, SwapResult};

/// Fee paid for a transaction: `gas * gas_price`, in wei.
pub fn calculate_fee(gas: u64, gas_price: u128) -> SwapResult<u128> {
    (gas as u128)
        .checked_mul(gas_price)
        .ok_or_else(|| SwapError::InvalidParameters("fee overflows u128".to_string()))
}

/// Total debited from the sender when the transaction is mined.
pub fn required_balance(amount: u128, gas: u64, gas_price: u128) -> SwapResult<u128> {
    calculate_fee(gas, gas_price)?
        .checked_add(amount)
        .ok_or_else(|| SwapError::InvalidParameters("amount plus fee overflows u128".to_string()))
}
