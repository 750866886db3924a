use serde::Serializer;

/// Strips an optional `0x`/`0X` prefix.
pub fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decodes hex with or without a `0x` prefix.
pub fn to_vec(hex_str: &str) -> Option<Vec<u8>> {
    hex::decode(strip_prefix(hex_str.trim())).ok()
}

pub fn encode_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn serialize_prefixed<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&encode_prefixed(bytes.as_ref()))
}
