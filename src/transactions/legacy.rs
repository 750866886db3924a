use serde::Serialize;

use crate::error::{SwapError, SwapResult};
use crate::internal::convert::serialize_decimal;
use crate::internal::helper::keccak256;
use crate::internal::hex_utils::serialize_prefixed;
use crate::keys::sign::Signature;
use crate::transactions::fees::calculate_fee;
use crate::transactions::rlp::{decode_string_list, decode_u64, decode_uint, RlpStream};
use crate::types::Address;

const FIELD_COUNT: usize = 9;

/// Logical fields of an EIP-155 legacy transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionPayload {
    pub nonce: u64,
    #[serde(serialize_with = "serialize_decimal")]
    pub gas_price: u128,
    pub gas: u64,
    pub to: Address,
    #[serde(serialize_with = "serialize_decimal")]
    pub value: u128,
    #[serde(serialize_with = "serialize_prefixed")]
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl TransactionPayload {
    fn stream_common(&self) -> RlpStream {
        let mut stream = RlpStream::new();
        stream
            .append_uint(self.nonce as u128)
            .append_uint(self.gas_price)
            .append_uint(self.gas as u128)
            .append_bytes(self.to.as_bytes())
            .append_uint(self.value)
            .append_bytes(&self.data);
        stream
    }

    /// `rlp([nonce, gas_price, gas, to, value, data, chain_id, 0, 0])`
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut stream = self.stream_common();
        stream
            .append_uint(self.chain_id as u128)
            .append_uint(0)
            .append_uint(0);
        stream.out()
    }

    pub fn signing_digest(&self) -> [u8; 32] {
        keccak256(&self.signing_payload())
    }

    /// `rlp([nonce, gas_price, gas, to, value, data, v, r, s])`
    pub fn encode_signed(&self, signature: &Signature) -> Vec<u8> {
        // r and s are 256-bit integers, encoded as minimal big-endian bytes.
        let mut stream = self.stream_common();
        stream
            .append_uint(signature.v as u128)
            .append_bytes(&trim_leading_zeros(&signature.r))
            .append_bytes(&trim_leading_zeros(&signature.s));
        stream.out()
    }

    pub fn fee(&self) -> SwapResult<u128> {
        calculate_fee(self.gas, self.gas_price)
    }

    fn from_fields(fields: &[&[u8]]) -> SwapResult<Self> {
        let to: [u8; 20] = fields[3].try_into().map_err(|_| {
            SwapError::MalformedRawEncoding(format!(
                "recipient must be 20 bytes, got {}",
                fields[3].len()
            ))
        })?;
        Ok(TransactionPayload {
            nonce: decode_u64(fields[0], "nonce")?,
            gas_price: decode_uint(fields[1], "gas price")?,
            gas: decode_u64(fields[2], "gas")?,
            to: Address(to),
            value: decode_uint(fields[4], "value")?,
            data: fields[5].to_vec(),
            chain_id: 0,
        })
    }

    /// Inverse of [`TransactionPayload::signing_payload`].
    pub fn decode_unsigned(raw: &[u8]) -> SwapResult<Self> {
        let fields = decode_string_list(raw)?;
        if fields.len() != FIELD_COUNT {
            return Err(SwapError::MalformedRawEncoding(format!(
                "expected {} fields, got {}",
                FIELD_COUNT,
                fields.len()
            )));
        }
        if !fields[7].is_empty() || !fields[8].is_empty() {
            return Err(SwapError::MalformedRawEncoding(
                "unsigned payload must end with two empty fields".to_string(),
            ));
        }
        let mut payload = Self::from_fields(&fields)?;
        payload.chain_id = decode_u64(fields[6], "chain id")?;
        if payload.chain_id == 0 {
            return Err(SwapError::MalformedRawEncoding("chain id must be non-zero".to_string()));
        }
        Ok(payload)
    }

    /// Inverse of [`TransactionPayload::encode_signed`].
    pub fn decode_signed(raw: &[u8]) -> SwapResult<(Self, Signature)> {
        let fields = decode_string_list(raw)?;
        if fields.len() != FIELD_COUNT {
            return Err(SwapError::MalformedRawEncoding(format!(
                "expected {} fields, got {}",
                FIELD_COUNT,
                fields.len()
            )));
        }
        let mut payload = Self::from_fields(&fields)?;
        let v = decode_u64(fields[6], "v")?;
        if v < 35 {
            return Err(SwapError::MalformedRawEncoding(format!(
                "v = {} is not an EIP-155 value",
                v
            )));
        }
        payload.chain_id = (v - 35) / 2;
        let signature = Signature {
            v,
            r: left_pad_32(fields[7], "r")?,
            s: left_pad_32(fields[8], "s")?,
        };
        Ok((payload, signature))
    }
}

fn trim_leading_zeros(bytes: &[u8; 32]) -> Vec<u8> {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

fn left_pad_32(bytes: &[u8], field: &str) -> SwapResult<[u8; 32]> {
    if bytes.len() > 32 || bytes.is_empty() {
        return Err(SwapError::MalformedRawEncoding(format!(
            "{} must be 1 to 32 bytes, got {}",
            field,
            bytes.len()
        )));
    }
    if bytes[0] == 0 {
        return Err(SwapError::MalformedRawEncoding(format!("{} has leading zero", field)));
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(bytes);
    Ok(out)
}
