use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use htlc_fund::interactive;
use htlc_fund::{sha256, Address, FundConfig, Network, DEFAULT_PATH};

// ============================================================================
// CLI DEFINITION
// ============================================================================

/// Main CLI structure
#[derive(Parser)]
#[command(name = "htlc-fund")]
#[command(version = "0.1")]
#[command(about = "Build, sign and cross-check HTLC fund transactions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// CLI Subcommands
#[derive(Subcommand)]
enum Commands {
    /// Build the HTLC fund transaction, sign it both ways and compare
    Fund {
        #[arg(short = 'c', long, help = "JSON config file")]
        config: Option<PathBuf>,
        #[arg(short = 'n', long, help = "Network name (mainnet, ropsten, ..., testnet)")]
        network: Option<String>,
        #[arg(long, help = "JSON-RPC endpoint")]
        rpc: Option<String>,
        #[arg(long, help = "HTLC recipient address")]
        recipient: Option<String>,
        #[arg(short = 'a', long, help = "Amount in Ether")]
        amount: Option<String>,
        #[arg(long, help = "Use the in-memory ledger")]
        offline: bool,
        #[arg(long, help = "Fail early when the sender cannot cover amount plus fee")]
        check_balance: bool,
        #[arg(long, help = "Submit the signed transaction")]
        broadcast: bool,
    },
    /// Print the account derived from a mnemonic
    Wallet {
        #[arg(short = 'm', long, help = "BIP39 mnemonic")]
        mnemonic: String,
        #[arg(long, help = "BIP39 passphrase")]
        passphrase: Option<String>,
        #[arg(short = 'p', long, default_value = DEFAULT_PATH, help = "Derivation path")]
        path: String,
        #[arg(short = 'n', long, default_value = "mainnet", help = "Network name")]
        network: String,
    },
    /// Calculate the SHA256 secret hash of a string
    Sha256 {
        #[arg(short = 'd', long, help = "Input string to hash")]
        input_string: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fund {
            config,
            network,
            rpc,
            recipient,
            amount,
            offline,
            check_balance,
            broadcast,
        } => {
            let mut fund_config = match config {
                Some(path) => FundConfig::from_file(&path)?,
                None => FundConfig::default(),
            };
            if let Some(network) = network {
                fund_config.network = Network::from_str(&network)?;
            }
            if let Some(rpc) = rpc {
                fund_config.rpc_endpoint = Some(rpc);
            }
            if let Some(recipient) = recipient {
                fund_config.recipient_address =
                    Address::from_str(&recipient).context("invalid recipient address")?;
            }
            if let Some(amount) = amount {
                fund_config.amount = amount;
            }
            fund_config.offline |= offline;
            fund_config.check_balance |= check_balance;
            fund_config.broadcast |= broadcast;

            interactive::fund::run(fund_config).await
        }
        Commands::Wallet {
            mnemonic,
            passphrase,
            path,
            network,
        } => interactive::wallet::run(
            Network::from_str(&network)?,
            &mnemonic,
            passphrase.as_deref(),
            &path,
        ),
        Commands::Sha256 { input_string } => {
            println!("SHA256 Hash: {}", sha256(&input_string));
            Ok(())
        }
    }
}
