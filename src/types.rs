use std::fmt;
use std::str::FromStr;

use secp256k1::PublicKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{SwapError, SwapResult};
use crate::internal::helper::keccak256;
use crate::internal::hex_utils::strip_prefix;

// ============================================================================
// NETWORKS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Ropsten,
    Rinkeby,
    Goerli,
    Kovan,
    Sepolia,
    Testnet,
}

impl Network {
    /// EIP-155 chain id.
    pub fn chain_id(self) -> u64 {
        match self {
            Network::Mainnet => 1,
            Network::Ropsten => 3,
            Network::Rinkeby => 4,
            Network::Goerli => 5,
            Network::Kovan => 42,
            Network::Sepolia => 11_155_111,
            Network::Testnet => 1337,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        [
            Network::Mainnet,
            Network::Ropsten,
            Network::Rinkeby,
            Network::Goerli,
            Network::Kovan,
            Network::Sepolia,
            Network::Testnet,
        ]
        .into_iter()
        .find(|n| n.chain_id() == chain_id)
    }

    pub fn name(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Ropsten => "ropsten",
            Network::Rinkeby => "rinkeby",
            Network::Goerli => "goerli",
            Network::Kovan => "kovan",
            Network::Sepolia => "sepolia",
            Network::Testnet => "testnet",
        }
    }

    /// Default JSON-RPC endpoint, overridable from config.
    pub fn default_endpoint(self) -> String {
        match self {
            Network::Testnet => "http://localhost:8545".to_string(),
            other => format!("https://{}.infura.io/v3", other.name()),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = SwapError;

    fn from_str(s: &str) -> SwapResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "ropsten" => Ok(Network::Ropsten),
            "rinkeby" => Ok(Network::Rinkeby),
            "goerli" => Ok(Network::Goerli),
            "kovan" => Ok(Network::Kovan),
            "sepolia" => Ok(Network::Sepolia),
            "testnet" => Ok(Network::Testnet),
            other => Err(SwapError::InvalidParameters(format!("unknown network {:?}", other))),
        }
    }
}

// ============================================================================
// ADDRESS
// ============================================================================

/// 20-byte account address, displayed with the EIP-55 checksum.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let uncompressed = public_key.serialize_uncompressed();
        let hash = keccak256(&uncompressed[1..]);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = SwapError;

    fn from_str(s: &str) -> SwapResult<Self> {
        let s = s.trim();
        if !(s.starts_with("0x") || s.starts_with("0X")) {
            return Err(SwapError::InvalidParameters(format!("address {:?} lacks 0x prefix", s)));
        }
        let digits = strip_prefix(s);
        if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SwapError::InvalidParameters(format!("malformed address {:?}", s)));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| {
            SwapError::InvalidParameters(format!("malformed address {:?}: {}", s, e))
        })?;
        let address = Address(bytes);

        // Mixed case carries an EIP-55 checksum that has to match.
        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum()[2..] != *digits {
            return Err(SwapError::InvalidParameters(format!("bad checksum in address {:?}", s)));
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECRET HASH
// ============================================================================

/// SHA-256 digest committing the HTLC claim condition.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SecretHash(pub [u8; 32]);

impl SecretHash {
    pub const LEN: usize = 32;

    pub fn from_slice(bytes: &[u8]) -> SwapResult<Self> {
        let array: [u8; 32] = bytes.try_into().map_err(|_| {
            SwapError::InvalidParameters(format!(
                "secret hash must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(SecretHash(array))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for SecretHash {
    type Err = SwapError;

    fn from_str(s: &str) -> SwapResult<Self> {
        let bytes = hex::decode(strip_prefix(s.trim()))
            .map_err(|e| SwapError::InvalidParameters(format!("secret hash is not hex: {}", e)))?;
        SecretHash::from_slice(&bytes)
    }
}

impl fmt::Display for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretHash({})", hex::encode(self.0))
    }
}

impl Serialize for SecretHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for SecretHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SecretHash::from_str(&s).map_err(serde::de::Error::custom)
    }
}
