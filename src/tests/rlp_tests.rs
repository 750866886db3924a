use crate::transactions::rlp::*;
use crate::*;

#[test]
fn test_encode_strings_and_integers() {
    let mut out = Vec::new();
    encode_bytes(b"dog", &mut out);
    assert_eq!(hex::encode(&out), "83646f67");

    let mut out = Vec::new();
    encode_bytes(&[], &mut out);
    assert_eq!(out, vec![0x80]);

    // A single byte below 0x80 is its own encoding
    let mut out = Vec::new();
    encode_bytes(&[0x0f], &mut out);
    assert_eq!(out, vec![0x0f]);

    let mut out = Vec::new();
    encode_uint(0, &mut out);
    assert_eq!(out, vec![0x80]);

    let mut out = Vec::new();
    encode_uint(1024, &mut out);
    assert_eq!(hex::encode(&out), "820400");

    assert_eq!(minimal_be_bytes(0), Vec::<u8>::new());
    assert_eq!(minimal_be_bytes(0x0100), vec![0x01, 0x00]);
}

#[test]
fn test_encode_list() {
    let mut stream = RlpStream::new();
    stream.append_bytes(b"cat").append_bytes(b"dog");
    assert_eq!(hex::encode(stream.out()), "c88363617483646f67");

    assert_eq!(RlpStream::new().out(), vec![0xc0]);
}

#[test]
fn test_long_string_uses_length_of_length() {
    let long = vec![b'a'; 56];
    let mut out = Vec::new();
    encode_bytes(&long, &mut out);
    assert_eq!(&out[..2], &[0xb8, 0x38]);

    let mut stream = RlpStream::new();
    stream.append_bytes(&long);
    let encoded = stream.out();
    assert_eq!(&encoded[..2], &[0xf8, 0x3a]);

    let items = decode_string_list(&encoded).unwrap();
    assert_eq!(items, vec![long.as_slice()]);
}

#[test]
fn test_decode_string_list() {
    let encoded = hex::decode("c88363617483646f67").unwrap();
    let items = decode_string_list(&encoded).unwrap();
    assert_eq!(items, vec![b"cat".as_slice(), b"dog".as_slice()]);

    let items = decode_string_list(&[0xc2, 0x80, 0x05]).unwrap();
    let expected: Vec<&[u8]> = vec![&[], &[0x05]];
    assert_eq!(items, expected);
}

#[test]
fn test_decoder_rejects_non_canonical_input() {
    let cases: Vec<(&str, Vec<u8>)> = vec![
        ("empty buffer", vec![]),
        ("not a list", hex::decode("83646f67").unwrap()),
        ("trailing bytes", vec![0xc0, 0x00]),
        ("truncated payload", vec![0xc3, 0x82, 0x01]),
        ("single byte wrapped in a header", vec![0xc2, 0x81, 0x05]),
        ("long form for a short list", vec![0xf8, 0x01, 0x80]),
        ("long form for a short string", vec![0xc3, 0xb8, 0x01, 0x80]),
        ("length with leading zero", vec![0xf9, 0x00, 0x38]),
        ("nested list", vec![0xc2, 0xc1, 0x80]),
    ];

    for (name, buf) in cases {
        match decode_string_list(&buf) {
            Err(SwapError::MalformedRawEncoding(_)) => {}
            other => panic!("{}: expected MalformedRawEncoding, got {:?}", name, other),
        }
    }
}

#[test]
fn test_decode_uint() {
    assert_eq!(decode_uint(&[], "nonce").unwrap(), 0);
    assert_eq!(decode_uint(&[0x04, 0x00], "gas").unwrap(), 1024);
    assert!(matches!(
        decode_uint(&[0x00, 0x01], "gas"),
        Err(SwapError::MalformedRawEncoding(_))
    ));
    assert!(matches!(
        decode_uint(&[0x01; 17], "value"),
        Err(SwapError::MalformedRawEncoding(_))
    ));
    assert!(matches!(
        decode_u64(&[0x01; 9], "nonce"),
        Err(SwapError::MalformedRawEncoding(_))
    ));
}
