//! Recursive Length Prefix encoding, restricted to what transactions need:
//! byte strings, unsigned integers and flat lists of strings.
//!
//! The decoder only accepts canonical input, so that decoding then
//! re-encoding any accepted buffer reproduces it byte for byte.

use crate::error::{SwapError, SwapResult};

const STRING_OFFSET: u8 = 0x80;
const LIST_OFFSET: u8 = 0xc0;
const SHORT_LIMIT: usize = 55;

fn malformed(msg: impl Into<String>) -> SwapError {
    SwapError::MalformedRawEncoding(msg.into())
}

// ============================================================================
// ENCODING
// ============================================================================

fn encode_length(len: usize, offset: u8, out: &mut Vec<u8>) {
    if len <= SHORT_LIMIT {
        out.push(offset + len as u8);
    } else {
        let len_bytes = minimal_be_bytes(len as u128);
        out.push(offset + SHORT_LIMIT as u8 + len_bytes.len() as u8);
        out.extend_from_slice(&len_bytes);
    }
}

/// Big-endian bytes without leading zeros; zero is the empty slice.
pub fn minimal_be_bytes(value: u128) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

pub fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    if bytes.len() == 1 && bytes[0] < STRING_OFFSET {
        out.push(bytes[0]);
    } else {
        encode_length(bytes.len(), STRING_OFFSET, out);
        out.extend_from_slice(bytes);
    }
}

pub fn encode_uint(value: u128, out: &mut Vec<u8>) {
    encode_bytes(&minimal_be_bytes(value), out);
}

/// Wraps already-encoded items into a list.
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_len: usize = items.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(payload_len + 9);
    encode_length(payload_len, LIST_OFFSET, &mut out);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

/// Small builder so call sites read as a field list.
#[derive(Default)]
pub struct RlpStream {
    items: Vec<Vec<u8>>,
}

impl RlpStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        let mut item = Vec::new();
        encode_bytes(bytes, &mut item);
        self.items.push(item);
        self
    }

    pub fn append_uint(&mut self, value: u128) -> &mut Self {
        let mut item = Vec::new();
        encode_uint(value, &mut item);
        self.items.push(item);
        self
    }

    pub fn out(&self) -> Vec<u8> {
        encode_list(&self.items)
    }
}

// ============================================================================
// DECODING
// ============================================================================

struct Header {
    is_list: bool,
    header_len: usize,
    payload_len: usize,
}

fn read_length(buf: &[u8], len_of_len: usize) -> SwapResult<usize> {
    if buf.len() < 1 + len_of_len {
        return Err(malformed("unexpected EOF (length)"));
    }
    let len_bytes = &buf[1..1 + len_of_len];
    if len_bytes[0] == 0 {
        return Err(malformed("length has leading zero"));
    }
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(malformed("length overflows"));
    }
    let len = len_bytes.iter().fold(0usize, |acc, b| (acc << 8) | *b as usize);
    if len <= SHORT_LIMIT {
        return Err(malformed("long form used for short payload"));
    }
    Ok(len)
}

fn read_header(buf: &[u8]) -> SwapResult<Header> {
    let prefix = *buf.first().ok_or_else(|| malformed("unexpected EOF (prefix)"))?;
    let header = match prefix {
        0x00..=0x7f => Header {
            is_list: false,
            header_len: 0,
            payload_len: 1,
        },
        0x80..=0xb7 => {
            let payload_len = (prefix - STRING_OFFSET) as usize;
            if payload_len == 1 {
                match buf.get(1) {
                    Some(b) if *b < STRING_OFFSET => {
                        return Err(malformed("single byte below 0x80 must not carry a header"))
                    }
                    _ => {}
                }
            }
            Header {
                is_list: false,
                header_len: 1,
                payload_len,
            }
        }
        0xb8..=0xbf => {
            let len_of_len = (prefix - 0xb7) as usize;
            Header {
                is_list: false,
                header_len: 1 + len_of_len,
                payload_len: read_length(buf, len_of_len)?,
            }
        }
        0xc0..=0xf7 => Header {
            is_list: true,
            header_len: 1,
            payload_len: (prefix - LIST_OFFSET) as usize,
        },
        0xf8..=0xff => {
            let len_of_len = (prefix - 0xf7) as usize;
            Header {
                is_list: true,
                header_len: 1 + len_of_len,
                payload_len: read_length(buf, len_of_len)?,
            }
        }
    };

    let end = header
        .header_len
        .checked_add(header.payload_len)
        .ok_or_else(|| malformed("length overflows"))?;
    if end > buf.len() {
        return Err(malformed("unexpected EOF (payload)"));
    }
    Ok(header)
}

/// Decodes a buffer holding exactly one list of byte strings.
pub fn decode_string_list(buf: &[u8]) -> SwapResult<Vec<&[u8]>> {
    let header = read_header(buf)?;
    if !header.is_list {
        return Err(malformed("expected a list"));
    }
    if header.header_len + header.payload_len != buf.len() {
        return Err(malformed("trailing bytes after list"));
    }

    let mut rest = &buf[header.header_len..];
    let mut items = Vec::new();
    while !rest.is_empty() {
        let item = read_header(rest)?;
        if item.is_list {
            return Err(malformed("nested lists are not expected here"));
        }
        let end = item.header_len + item.payload_len;
        items.push(&rest[item.header_len..end]);
        rest = &rest[end..];
    }
    Ok(items)
}

pub fn decode_uint(bytes: &[u8], field: &str) -> SwapResult<u128> {
    if bytes.len() > 16 {
        return Err(malformed(format!("{} exceeds 128 bits", field)));
    }
    if bytes.first() == Some(&0) {
        return Err(malformed(format!("{} has leading zero", field)));
    }
    Ok(bytes.iter().fold(0u128, |acc, b| (acc << 8) | *b as u128))
}

pub fn decode_u64(bytes: &[u8], field: &str) -> SwapResult<u64> {
    let value = decode_uint(bytes, field)?;
    u64::try_from(value).map_err(|_| malformed(format!("{} exceeds 64 bits", field)))
}
