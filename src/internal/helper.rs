use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::error::{SwapError, SwapResult};
use crate::types::SecretHash;

/// SHA-256 of the UTF-8 bytes of `text`, the commitment used by the HTLC.
pub fn sha256(text: &str) -> SecretHash {
    SecretHash(Sha256::digest(text.as_bytes()).into())
}

pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Current unix time in seconds, shifted by `plus` seconds.
pub fn get_current_timestamp(plus: u64) -> SwapResult<u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    now.checked_add(plus).ok_or_else(|| {
        SwapError::InvalidParameters(format!("timestamp offset {} overflows", plus))
    })
}

// ============================================================================
// AMOUNT UNITS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Wei,
    Gwei,
    Ether,
}

impl Unit {
    pub fn decimals(self) -> u32 {
        match self {
            Unit::Wei => 0,
            Unit::Gwei => 9,
            Unit::Ether => 18,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Unit::Wei => "Wei",
            Unit::Gwei => "Gwei",
            Unit::Ether => "Ether",
        };
        f.write_str(name)
    }
}

impl FromStr for Unit {
    type Err = SwapError;

    fn from_str(s: &str) -> SwapResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "wei" => Ok(Unit::Wei),
            "gwei" => Ok(Unit::Gwei),
            "ether" | "eth" => Ok(Unit::Ether),
            other => Err(SwapError::InvalidParameters(format!("unknown unit {:?}", other))),
        }
    }
}

/// Parses a decimal amount such as `"0.1"` in `unit` into wei.
///
/// Exact decimal arithmetic; more fractional digits than the unit allows
/// is rejected rather than rounded.
pub fn parse_amount(amount: &str, unit: Unit) -> SwapResult<u128> {
    let amount = amount.trim();
    let invalid = || SwapError::InvalidParameters(format!("invalid {} amount {:?}", unit, amount));

    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let decimals = unit.decimals() as usize;
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals {
        return Err(SwapError::InvalidParameters(format!(
            "{:?} has more than {} decimals for {}",
            amount, decimals, unit
        )));
    }

    let scale = 10u128.pow(decimals as u32);
    let whole_value = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| invalid())?
    };
    let fraction_value = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = decimals);
        padded.parse::<u128>().map_err(|_| invalid())?
    };

    whole_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or_else(invalid)
}

/// Formats a wei amount in `unit` without trailing zeros.
pub fn format_amount(wei: u128, unit: Unit) -> String {
    let decimals = unit.decimals() as usize;
    if decimals == 0 {
        return wei.to_string();
    }
    let scale = 10u128.pow(decimals as u32);
    let whole = wei / scale;
    let fraction = wei % scale;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction, width = decimals);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Converts a decimal amount between units, e.g. `("0.1", Ether, Wei)`.
pub fn amount_unit_converter(amount: &str, from: Unit, to: Unit) -> SwapResult<String> {
    Ok(format_amount(parse_amount(amount, from)?, to))
}
