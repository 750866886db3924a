use crate::*;
use std::str::FromStr;

const NOW: u64 = 1_700_000_000;

fn address(s: &str) -> Address {
    Address::from_str(s).unwrap()
}

fn default_params() -> HtlcParameters {
    HtlcParameters {
        secret_hash: sha256("Hello Meheret!"),
        sender_address: address("0x69e04fe16c9A6A83076B3c2dc4b4Bc21b5d9A20C"),
        recipient_address: address("0x1954C47a5D75bdDA53578CEe5D549bf84b8c6B94"),
        endtime: NOW + 3600,
    }
}

#[test]
fn test_function_selectors() {
    assert_eq!(hex::encode(function_selector("transfer(address,uint256)")), "a9059cbb");
    assert_eq!(hex::encode(function_selector(FUND_SIGNATURE)), "f4fd3062");
}

#[test]
fn test_create_address_vectors() {
    let deployer = address("0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0");
    assert_eq!(
        create_address(&deployer, 0),
        address("0xcd234A471b72ba2F1Ccf0A70FCABA648a5eeCD8d")
    );
    assert_eq!(
        create_address(&deployer, 1),
        address("0x343c43A37D37dfF08AE8C4A11544c718AbB4fCF8")
    );

    let location = ContractLocation::Create { deployer, nonce: 1 };
    assert_eq!(location.resolve(), address("0x343c43A37D37dfF08AE8C4A11544c718AbB4fCF8"));
}

#[test]
fn test_contract_location_from_json() {
    let deployed: ContractLocation = serde_json::from_str(
        r#"{"deployed":"0xE5cb615899436A490dBde26d7880A0C2502Fc676"}"#,
    )
    .unwrap();
    assert_eq!(
        deployed.resolve(),
        address("0xE5cb615899436A490dBde26d7880A0C2502Fc676")
    );

    let create: ContractLocation = serde_json::from_str(
        r#"{"create":{"deployer":"0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0","nonce":0}}"#,
    )
    .unwrap();
    assert_eq!(create.resolve(), address("0xcd234A471b72ba2F1Ccf0A70FCABA648a5eeCD8d"));
}

#[test]
fn test_locked_contract_id() {
    let params = default_params();
    let expected = "9e8410abc991f0a379a87dcf9072864505790e088b9f44195722195165436ab3";
    assert_eq!(hex::encode(locked_contract_id(&params)), expected);

    let htlc = HtlcDescriptor::build_at(
        Network::Ropsten,
        params,
        ContractLocation::Deployed(address("0xE5cb615899436A490dBde26d7880A0C2502Fc676")),
        NOW,
    )
    .unwrap();
    assert_eq!(htlc.locked_contract_id(), expected);

    // Any change in the terms changes the id
    let mut later = params;
    later.endtime += 1;
    assert_ne!(hex::encode(locked_contract_id(&later)), expected);
}

#[test]
fn test_htlc_rejects_past_endtime() {
    let params = default_params();
    let location =
        ContractLocation::Deployed(address("0xE5cb615899436A490dBde26d7880A0C2502Fc676"));

    for now in [params.endtime, params.endtime + 10] {
        assert!(matches!(
            HtlcDescriptor::build_at(Network::Ropsten, params, location, now),
            Err(SwapError::InvalidParameters(_))
        ));
    }
}

#[test]
fn test_same_sender_and_recipient_is_allowed() {
    let mut params = default_params();
    params.recipient_address = params.sender_address;
    let location =
        ContractLocation::Deployed(address("0xE5cb615899436A490dBde26d7880A0C2502Fc676"));
    assert!(HtlcDescriptor::build_at(Network::Ropsten, params, location, NOW).is_ok());
}

#[test]
fn test_fund_call_data() {
    let params = default_params();
    let htlc = HtlcDescriptor::build_at(
        Network::Ropsten,
        params,
        ContractLocation::Deployed(address("0xE5cb615899436A490dBde26d7880A0C2502Fc676")),
        NOW,
    )
    .unwrap();

    let data = htlc.fund_call_data();
    assert_eq!(data.len(), 4 + 4 * 32);
    assert_eq!(hex::encode(&data[..4]), "f4fd3062");
    assert_eq!(&data[4..36], params.secret_hash.as_bytes());
    assert_eq!(&data[48..68], params.recipient_address.as_bytes());
    assert_eq!(&data[80..100], params.sender_address.as_bytes());
    assert_eq!(&data[124..], &(NOW + 3600).to_be_bytes()[..]);

    let call = FundCall::decode(data).unwrap();
    assert_eq!(call.secret_hash, params.secret_hash);
    assert_eq!(call.recipient, params.recipient_address);
    assert_eq!(call.sender, params.sender_address);
    assert_eq!(call.endtime, params.endtime);
}

#[test]
fn test_fund_call_decode_is_strict() {
    let call = FundCall {
        secret_hash: sha256("abc"),
        recipient: address("0x1954C47a5D75bdDA53578CEe5D549bf84b8c6B94"),
        sender: address("0x69e04fe16c9A6A83076B3c2dc4b4Bc21b5d9A20C"),
        endtime: 42,
    };
    let data = call.encode();
    assert_eq!(FundCall::decode(&data), Some(call));

    let mut extra = data.clone();
    extra.push(0);
    assert_eq!(FundCall::decode(&extra), None);

    let mut wrong_selector = data.clone();
    wrong_selector[..4].copy_from_slice(&function_selector("transfer(address,uint256)"));
    assert_eq!(FundCall::decode(&wrong_selector), None);

    // Address words must be left-padded with zeros
    let mut dirty_padding = data.clone();
    dirty_padding[4 + 32] = 1;
    assert_eq!(FundCall::decode(&dirty_padding), None);

    assert_eq!(FundCall::decode(&[]), None);
}

#[test]
fn test_agreements_and_abi() {
    let params = default_params();
    let htlc = HtlcDescriptor::build_at(
        Network::Ropsten,
        params,
        ContractLocation::Deployed(address("0xE5cb615899436A490dBde26d7880A0C2502Fc676")),
        NOW,
    )
    .unwrap();

    let agreements = htlc.agreements();
    assert_eq!(
        agreements["secret_hash"],
        "3a26da82ead15a80533a02696656b14b5dbfd84eb14790f2e1be5e9e45820eeb"
    );
    assert_eq!(
        agreements["recipient_address"],
        "0x1954C47a5D75bdDA53578CEe5D549bf84b8c6B94"
    );
    assert_eq!(agreements["endtime"]["timestamp"], NOW + 3600);

    let abi = htlc.abi();
    let names: Vec<&str> = abi
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["fund", "withdraw", "refund"]);
}

#[tokio::test]
async fn test_htlc_balance_of_undeployed_contract_is_zero() {
    let htlc = HtlcDescriptor::build_at(
        Network::Testnet,
        default_params(),
        ContractLocation::Create {
            deployer: address("0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0"),
            nonce: 7,
        },
        NOW,
    )
    .unwrap();

    let ledger = InMemoryLedger::new(1337, 1, 21_000);
    assert_eq!(htlc.balance(&ledger, Unit::Ether).await.unwrap(), "0");
}

#[test]
fn test_htlc_bytecode() {
    let htlc = HtlcDescriptor::build_at(
        Network::Ropsten,
        default_params(),
        ContractLocation::Deployed(address("0xE5cb615899436A490dBde26d7880A0C2502Fc676")),
        NOW,
    )
    .unwrap();

    let creation = hex::decode(&htlc.bytecode()[2..]).unwrap();
    let runtime = hex::decode(&htlc.bytecode_runtime()[2..]).unwrap();
    assert!(htlc.bytecode().starts_with("0x6080604052"));
    assert!(creation.ends_with(&runtime));

    // The constructor copies exactly the runtime out of its own code
    let init = disassemble(&creation[..creation.len() - runtime.len()]);
    let size = format!("PUSH2 0x{:04x}", runtime.len());
    let offset = format!("PUSH2 0x{:04x}", creation.len() - runtime.len());
    assert!(init.contains(&format!("{} DUP1 {} PUSH1 0x00 CODECOPY", size, offset)));
    assert!(init.ends_with("PUSH1 0x00 RETURN INVALID"));
}

#[test]
fn test_htlc_opcode() {
    let htlc = HtlcDescriptor::build_at(
        Network::Ropsten,
        default_params(),
        ContractLocation::Deployed(address("0xE5cb615899436A490dBde26d7880A0C2502Fc676")),
        NOW,
    )
    .unwrap();

    let opcode = htlc.opcode();
    assert!(opcode.starts_with("PUSH1 0x80 PUSH1 0x40 MSTORE PUSH1 0x04 CALLDATASIZE LT"));

    // The dispatcher knows every function of the ABI
    for signature in [FUND_SIGNATURE, WITHDRAW_SIGNATURE, REFUND_SIGNATURE] {
        let selector = format!("PUSH4 0x{}", hex::encode(function_selector(signature)));
        assert!(opcode.contains(&selector), "{} missing", selector);
    }
    assert_eq!(hex::encode(function_selector(WITHDRAW_SIGNATURE)), "06a53665");
    assert_eq!(hex::encode(function_selector(REFUND_SIGNATURE)), "7249fbb6");

    // locked contract id is computed through the sha256 precompile
    assert!(opcode.contains("PUSH1 0x02 GAS STATICCALL"));
}

#[test]
fn test_disassemble_edges() {
    assert_eq!(disassemble(&[]), "");
    assert_eq!(disassemble(&[0x5f, 0x80, 0x90, 0x9f, 0x8f]), "PUSH0 DUP1 SWAP1 SWAP16 DUP16");
    assert_eq!(disassemble(&[0x0c, 0xef, 0xfe]), "INVALID INVALID INVALID");
    // push data cut off by the end of the code
    assert_eq!(disassemble(&[0x61, 0xab]), "PUSH2 0xab");
    assert_eq!(disassemble(&[0x7f]), "PUSH32 0x");
}
