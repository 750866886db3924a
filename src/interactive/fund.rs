use anyhow::{Context, Result};

use crate::config::FundConfig;
use crate::internal::helper::{format_amount, Unit};
use crate::internal::hex_utils::encode_prefixed;
use crate::internal::rpc_client::JsonRpcLedger;
use crate::ledger::Ledger;
use crate::workflows::{offline_ledger, run_fund_workflow, FundReport};

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn print_report(report: &FundReport) {
    println!("{} Sender Ethereum Account", "=".repeat(10));
    println!("Root XPublic Key: {}", report.wallet.root_xpublic_key);
    println!("Public Key: {}", report.wallet.public_key);
    println!("Path: {}", report.wallet.path);
    println!("Address: {}", report.wallet.address);
    println!("Balance: {} Ether", report.wallet.balance);

    println!(
        "{} Build Hash Time Lock Contract (HTLC) between Sender and Recipient",
        "=".repeat(10)
    );
    println!("HTLC Agreements: {}", pretty(&report.agreements()));
    println!("HTLC Bytecode: {}", report.htlc.bytecode());
    println!("HTLC Bytecode Runtime: {}", report.htlc.bytecode_runtime());
    println!("HTLC OP_Code: {}", report.htlc.opcode());
    println!("HTLC ABI: {}", report.htlc.abi());
    println!("HTLC Fund Call Data: {}", encode_prefixed(report.htlc.fund_call_data()));
    println!("HTLC Locked Contract ID: {}", report.htlc.locked_contract_id());
    println!("HTLC Contract Address: {}", report.htlc.contract_address());
    println!("HTLC Balance: {} Ether", report.htlc_balance);

    let unsigned = &report.unsigned;
    println!("{} Unsigned Fund Transaction", "=".repeat(10));
    println!(
        "Unsigned Fund Transaction Fee: {} Wei ({} Ether)",
        unsigned.fee(),
        format_amount(unsigned.fee(), Unit::Ether)
    );
    println!("Unsigned Fund Transaction Hash: {}", unsigned.hash());
    println!("Unsigned Fund Transaction Json: {}", pretty(&unsigned.json()));
    println!("Unsigned Fund Transaction Signature: {}", unsigned.signature());
    println!("Unsigned Fund Transaction Type: {}", unsigned.transaction_type());
    println!("Unsigned Fund Transaction Raw: {}", unsigned.transaction_raw());

    let signed = &report.signed;
    println!("{} Signed Fund Transaction", "=".repeat(10));
    println!("Signed Fund Transaction Fee: {} Wei", signed.fee());
    println!("Signed Fund Transaction Hash: {}", signed.hash());
    println!("Signed Fund Transaction Signature: {}", pretty(&signed.signature()));
    println!("Signed Fund Transaction Type: {}", signed.transaction_type());
    println!("Signed Fund Transaction Raw: {}", signed.transaction_raw());

    let raw_signed = &report.raw_signed;
    println!("{} Fund Signature", "=".repeat(10));
    println!("Fund Signature Fee: {} Wei", raw_signed.fee());
    println!("Fund Signature Hash: {}", raw_signed.hash());
    println!("Fund Signature Signature: {}", pretty(&raw_signed.signature()));
    println!("Fund Signature Type: {}", raw_signed.transaction_type());
    println!("Fund Signature Transaction Raw: {}", raw_signed.transaction_raw());

    println!("\n✓ Signed fund transaction raws are equal\n");

    if let Some(receipt) = &report.receipt {
        println!("Submitted Fund Transaction: {}", receipt.transaction_hash);
    }
}

async fn run_with<L: Ledger>(config: &FundConfig, ledger: &L) -> Result<()> {
    let report = run_fund_workflow(config, ledger)
        .await
        .context("HTLC fund workflow stopped")?;
    print_report(&report);
    Ok(())
}

/// Runs the fund workflow against the configured ledger and prints it.
pub async fn run(config: FundConfig) -> Result<()> {
    if config.offline {
        let ledger = offline_ledger(&config).context("cannot seed offline ledger")?;
        run_with(&config, &ledger).await
    } else {
        let ledger = JsonRpcLedger::new(config.endpoint(), config.rpc_retries, config.backoff())
            .context("cannot create JSON-RPC ledger")?;
        run_with(&config, &ledger).await
    }
}
