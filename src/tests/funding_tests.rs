use crate::internal::hex_utils::{encode_prefixed, to_vec};
use crate::tests::key_derivation_tests::TEST_MNEMONIC;
use crate::*;
use std::str::FromStr;

const ONE_ETHER: u128 = 1_000_000_000_000_000_000;
const GAS_PRICE: u128 = 20_000_000_000;
const GAS_LIMIT: u64 = 120_000;
const NOW: u64 = 1_700_000_000;

struct Fixture {
    sender: Address,
    solver: FundSolver,
    htlc: HtlcDescriptor,
}

fn fixture() -> Fixture {
    let mut wallet = Wallet::new(Network::Testnet);
    wallet.from_mnemonic(TEST_MNEMONIC, None).unwrap().from_path(DEFAULT_PATH).unwrap();
    let sender = wallet.address().unwrap();
    let solver = FundSolver::new(&wallet.root_xprivate_key().unwrap(), DEFAULT_PATH).unwrap();

    let params = HtlcParameters {
        secret_hash: sha256("Hello Meheret!"),
        sender_address: sender,
        recipient_address: Address::from_str("0x1954C47a5D75bdDA53578CEe5D549bf84b8c6B94").unwrap(),
        endtime: NOW + 3600,
    };
    let location = ContractLocation::Deployed(
        Address::from_str("0xE5cb615899436A490dBde26d7880A0C2502Fc676").unwrap(),
    );
    let htlc = HtlcDescriptor::build_at(Network::Testnet, params, location, NOW).unwrap();

    Fixture { sender, solver, htlc }
}

fn ledger_with(sender: Address, balance: u128, nonce: u64) -> InMemoryLedger {
    InMemoryLedger::new(Network::Testnet.chain_id(), GAS_PRICE, GAS_LIMIT)
        .with_account(sender, balance, nonce)
}

#[tokio::test]
async fn test_build_unsigned_fund_transaction() {
    let f = fixture();
    let ledger = ledger_with(f.sender, 10 * ONE_ETHER, 4);

    let unsigned = FundTransactionBuilder::new(Network::Testnet)
        .build_transaction(&ledger, f.sender, &f.htlc, ONE_ETHER / 10)
        .await
        .unwrap();

    let payload = unsigned.payload();
    assert_eq!(payload.nonce, 4);
    assert_eq!(payload.gas, GAS_LIMIT);
    assert_eq!(payload.gas_price, GAS_PRICE);
    assert_eq!(payload.to, f.htlc.contract_address());
    assert_eq!(payload.value, ONE_ETHER / 10);
    assert_eq!(payload.data, f.htlc.fund_call_data());
    assert_eq!(payload.chain_id, 1337);

    assert_eq!(unsigned.fee(), 2_400_000_000_000_000);
    assert_eq!(unsigned.transaction_type(), "ethereum_fund_unsigned");
    assert!(unsigned.signature().is_null());
    assert_eq!(unsigned.hash(), encode_prefixed(&payload.signing_digest()));
    assert_eq!(unsigned.raw(), unsigned.transaction_raw());

    let decoded =
        TransactionPayload::decode_unsigned(&to_vec(&unsigned.transaction_raw()).unwrap())
            .unwrap();
    assert_eq!(&decoded, payload);
}

#[tokio::test]
async fn test_unsigned_json() {
    let f = fixture();
    let ledger = ledger_with(f.sender, 10 * ONE_ETHER, 0);
    let unsigned = FundTransactionBuilder::new(Network::Testnet)
        .build_transaction(&ledger, f.sender, &f.htlc, ONE_ETHER / 10)
        .await
        .unwrap();

    let json = unsigned.json();
    assert_eq!(json["network"], "testnet");
    assert_eq!(json["from"], "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    assert_eq!(json["fee"], "2400000000000000");
    assert_eq!(json["transaction"]["value"], "100000000000000000");
    assert_eq!(json["transaction"]["gas"], GAS_LIMIT);
    assert_eq!(
        json["transaction"]["data"],
        encode_prefixed(f.htlc.fund_call_data())
    );
}

#[tokio::test]
async fn test_build_is_deterministic() {
    let f = fixture();
    let ledger = ledger_with(f.sender, 10 * ONE_ETHER, 0);
    let builder = FundTransactionBuilder::new(Network::Testnet);

    let first = builder.build_transaction(&ledger, f.sender, &f.htlc, 12_345).await.unwrap();
    let second = builder.build_transaction(&ledger, f.sender, &f.htlc, 12_345).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.transaction_raw(), second.transaction_raw());
}

#[tokio::test]
async fn test_build_rejects_invalid_parameters() {
    let f = fixture();
    let ledger = ledger_with(f.sender, 10 * ONE_ETHER, 0);

    let zero = FundTransactionBuilder::new(Network::Testnet)
        .build_transaction(&ledger, f.sender, &f.htlc, 0)
        .await;
    assert!(matches!(zero, Err(SwapError::InvalidParameters(_))));

    let wrong_network = FundTransactionBuilder::new(Network::Mainnet)
        .build_transaction(&ledger, f.sender, &f.htlc, 1)
        .await;
    assert!(matches!(wrong_network, Err(SwapError::InvalidParameters(_))));
}

#[tokio::test]
async fn test_balance_check_is_opt_in() {
    let f = fixture();
    let ledger = ledger_with(f.sender, ONE_ETHER / 20, 0);

    let checked = FundTransactionBuilder::new(Network::Testnet)
        .with_options(FundOptions { check_balance: true })
        .build_transaction(&ledger, f.sender, &f.htlc, ONE_ETHER / 10)
        .await;
    match checked {
        Err(SwapError::InsufficientFunds { balance, required }) => {
            assert_eq!(balance, ONE_ETHER / 20);
            assert_eq!(required, ONE_ETHER / 10 + 2_400_000_000_000_000);
        }
        other => panic!("expected InsufficientFunds, got {:?}", other),
    }

    let unchecked = FundTransactionBuilder::new(Network::Testnet)
        .build_transaction(&ledger, f.sender, &f.htlc, ONE_ETHER / 10)
        .await;
    assert!(unchecked.is_ok());
}

#[tokio::test]
async fn test_signed_fund_transaction() {
    let f = fixture();
    let ledger = ledger_with(f.sender, 10 * ONE_ETHER, 0);
    let unsigned = FundTransactionBuilder::new(Network::Testnet)
        .build_transaction(&ledger, f.sender, &f.htlc, ONE_ETHER / 10)
        .await
        .unwrap();

    let signed = unsigned.sign(&f.solver).unwrap();
    assert_eq!(signed.transaction_type(), "ethereum_fund_signed");
    assert_eq!(signed.fee(), unsigned.fee());
    assert_eq!(signed.payload(), unsigned.payload());
    assert_eq!(signed.hash(), encode_prefixed(&keccak256(signed.raw_bytes())));
    assert_eq!(signed.json()["signature"]["v"], signed.signature_parts().v);

    let (payload, signature) = TransactionPayload::decode_signed(signed.raw_bytes()).unwrap();
    assert_eq!(&payload, unsigned.payload());
    assert_eq!(&signature, signed.signature_parts());
}

#[tokio::test]
async fn test_in_memory_ledger_applies_fund_transaction() {
    let f = fixture();
    let ledger = ledger_with(f.sender, ONE_ETHER, 0);
    let unsigned = FundTransactionBuilder::new(Network::Testnet)
        .build_transaction(&ledger, f.sender, &f.htlc, ONE_ETHER / 10)
        .await
        .unwrap();
    let signed = unsigned.sign(&f.solver).unwrap();

    let receipt = ledger.submit_raw(&signed.transaction_raw()).await.unwrap();
    assert_eq!(receipt.transaction_hash, signed.hash());

    let sender = ledger.account(&f.sender);
    assert_eq!(sender.nonce, 1);
    assert_eq!(sender.balance, 897_600_000_000_000_000);
    assert_eq!(ledger.account(&f.htlc.contract_address()).balance, ONE_ETHER / 10);
    assert_eq!(ledger.submitted(), vec![signed.transaction_raw()]);

    // Same nonce twice is a replay
    assert!(matches!(
        ledger.submit_raw(&signed.transaction_raw()).await,
        Err(SwapError::Ledger(_))
    ));
}

#[tokio::test]
async fn test_in_memory_ledger_rejects_underfunded_sender() {
    let f = fixture();
    let ledger = ledger_with(f.sender, ONE_ETHER / 20, 0);
    let unsigned = FundTransactionBuilder::new(Network::Testnet)
        .build_transaction(&ledger, f.sender, &f.htlc, ONE_ETHER / 10)
        .await
        .unwrap();
    let signed = unsigned.sign(&f.solver).unwrap();

    assert!(matches!(
        ledger.submit_raw(&signed.transaction_raw()).await,
        Err(SwapError::InsufficientFunds { .. })
    ));
    assert!(ledger.submitted().is_empty());
    assert_eq!(ledger.account(&f.sender).nonce, 0);
}

#[tokio::test]
async fn test_in_memory_ledger_rejects_other_chain() {
    let f = fixture();
    let ledger = ledger_with(f.sender, ONE_ETHER, 0);
    let unsigned = FundTransactionBuilder::new(Network::Testnet)
        .build_transaction(&ledger, f.sender, &f.htlc, 1)
        .await
        .unwrap();
    let signed = unsigned.sign(&f.solver).unwrap();

    let mainnet = InMemoryLedger::new(1, GAS_PRICE, GAS_LIMIT).with_account(f.sender, ONE_ETHER, 0);
    assert!(matches!(
        mainnet.submit_raw(&signed.transaction_raw()).await,
        Err(SwapError::Ledger(_))
    ));
}
