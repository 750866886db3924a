use std::fmt;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::config::FundConfig;
use crate::contracts::htlc::{HtlcDescriptor, HtlcParameters};
use crate::error::{SwapError, SwapResult};
use crate::internal::helper::{get_current_timestamp, parse_amount, sha256, Unit};
use crate::keys::derivation::Wallet;
use crate::keys::sign::FundSolver;
use crate::ledger::{InMemoryLedger, Ledger, TransactionReceipt};
use crate::signing::{assert_equivalent, FundSignature};
use crate::transactions::fund::{
    FundOptions, FundTransactionBuilder, SignedFundTransaction, UnsignedFundTransaction,
};
use crate::types::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundStage {
    Wallet,
    Htlc,
    UnsignedTransaction,
    ObjectSigning,
    RawSigning,
    Equivalence,
    Broadcast,
}

impl fmt::Display for FundStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FundStage::Wallet => "sender wallet",
            FundStage::Htlc => "HTLC build",
            FundStage::UnsignedTransaction => "unsigned fund transaction",
            FundStage::ObjectSigning => "fund transaction signing",
            FundStage::RawSigning => "fund signature from raw",
            FundStage::Equivalence => "signed raw equivalence",
            FundStage::Broadcast => "broadcast",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    pub stage: FundStage,
    #[source]
    pub source: SwapError,
}

trait AtStage<T> {
    fn at(self, stage: FundStage) -> Result<T, StageError>;
}

impl<T> AtStage<T> for SwapResult<T> {
    fn at(self, stage: FundStage) -> Result<T, StageError> {
        self.map_err(|source| StageError { stage, source })
    }
}

/// Public view of the sender wallet. Private keys stay out of it.
#[derive(Debug, Clone)]
pub struct WalletReport {
    pub root_xpublic_key: String,
    pub public_key: String,
    pub path: String,
    pub address: Address,
    pub balance: String,
}

#[derive(Debug, Clone)]
pub struct FundReport {
    pub wallet: WalletReport,
    pub htlc: HtlcDescriptor,
    pub htlc_balance: String,
    pub unsigned: UnsignedFundTransaction,
    pub signed: SignedFundTransaction,
    pub raw_signed: SignedFundTransaction,
    pub receipt: Option<TransactionReceipt>,
}

impl FundReport {
    pub fn agreements(&self) -> Value {
        self.htlc.agreements()
    }
}

fn sender_wallet(config: &FundConfig) -> SwapResult<Wallet> {
    let mut wallet = Wallet::new(config.network);
    wallet
        .from_mnemonic(&config.sender_mnemonic, config.sender_passphrase.as_deref())?
        .from_path(&config.derivation_path)?;
    Ok(wallet)
}

/// In-memory ledger seeded from `config.offline_ledger` for the sender.
pub fn offline_ledger(config: &FundConfig) -> SwapResult<InMemoryLedger> {
    let sender = sender_wallet(config)?.address()?;
    let seed = &config.offline_ledger;
    let balance = parse_amount(&seed.sender_balance, Unit::Ether)?;
    let gas_price = parse_amount(&seed.gas_price_gwei, Unit::Gwei)?;
    Ok(InMemoryLedger::new(config.network.chain_id(), gas_price, seed.gas_limit)
        .with_account(sender, balance, seed.sender_nonce))
}

pub async fn run_fund_workflow<L: Ledger>(
    config: &FundConfig,
    ledger: &L,
) -> Result<FundReport, StageError> {
    let now = get_current_timestamp(0).at(FundStage::Htlc)?;
    run_fund_workflow_at(config, ledger, now).await
}

/// wallet -> HTLC -> unsigned tx -> {object-path sign, raw-path sign} ->
/// equivalence -> optional broadcast.
pub async fn run_fund_workflow_at<L: Ledger>(
    config: &FundConfig,
    ledger: &L,
    now: u64,
) -> Result<FundReport, StageError> {
    let network = config.network;

    // STEP 1: sender wallet
    let wallet = sender_wallet(config).at(FundStage::Wallet)?;
    let sender_address = wallet.address().at(FundStage::Wallet)?;
    let wallet_report = WalletReport {
        root_xpublic_key: wallet.root_xpublic_key().unwrap_or_default(),
        public_key: wallet.public_key().at(FundStage::Wallet)?,
        path: config.derivation_path.clone(),
        address: sender_address,
        balance: wallet.balance(ledger, Unit::Ether).await.at(FundStage::Wallet)?,
    };

    // STEP 2: HTLC between sender and recipient
    let endtime = now
        .checked_add(config.endtime_offset_secs)
        .ok_or_else(|| {
            SwapError::InvalidParameters(format!(
                "endtime offset {} overflows the clock",
                config.endtime_offset_secs
            ))
        })
        .at(FundStage::Htlc)?;
    let params = HtlcParameters {
        secret_hash: sha256(&config.secret),
        sender_address,
        recipient_address: config.recipient_address,
        endtime,
    };
    let htlc = HtlcDescriptor::build_at(network, params, config.contract, now).at(FundStage::Htlc)?;
    let htlc_balance = htlc.balance(ledger, Unit::Ether).await.at(FundStage::Htlc)?;

    // STEP 3: unsigned fund transaction
    let amount =
        parse_amount(&config.amount, config.amount_unit).at(FundStage::UnsignedTransaction)?;
    let unsigned = FundTransactionBuilder::new(network)
        .with_options(FundOptions { check_balance: config.check_balance })
        .build_transaction(ledger, sender_address, &htlc, amount)
        .await
        .at(FundStage::UnsignedTransaction)?;
    let unsigned_raw = unsigned.transaction_raw();

    // STEP 4: sign twice; the solver does not outlive this block
    let (signed, raw_signed) = {
        let root_xprivate_key = wallet
            .root_xprivate_key()
            .ok_or(SwapError::NoKey)
            .at(FundStage::ObjectSigning)?;
        let solver = FundSolver::new(&root_xprivate_key, &config.derivation_path)
            .at(FundStage::ObjectSigning)?;
        let signed = unsigned.sign(&solver).at(FundStage::ObjectSigning)?;
        let raw_signed = FundSignature::new(network)
            .sign(&unsigned_raw, &solver)
            .at(FundStage::RawSigning)?;
        (signed, raw_signed)
    };
    drop(wallet);

    // STEP 5: both paths must agree
    assert_equivalent(&signed.transaction_raw(), &raw_signed.transaction_raw())
        .at(FundStage::Equivalence)?;
    info!(hash = %signed.hash(), "object and raw signing paths agree");

    // STEP 6: broadcast, if asked to
    let receipt = if config.broadcast {
        Some(
            ledger
                .submit_raw(&signed.transaction_raw())
                .await
                .at(FundStage::Broadcast)?,
        )
    } else {
        None
    };

    Ok(FundReport {
        wallet: wallet_report,
        htlc,
        htlc_balance,
        unsigned,
        signed,
        raw_signed,
        receipt,
    })
}
