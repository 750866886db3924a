use anyhow::{Context, Result};

use crate::keys::derivation::Wallet;
use crate::types::Network;

/// Prints the account derived from `mnemonic` at `path`.
pub fn run(network: Network, mnemonic: &str, passphrase: Option<&str>, path: &str) -> Result<()> {
    let mut wallet = Wallet::new(network);
    wallet
        .from_mnemonic(mnemonic, passphrase)
        .context("cannot load mnemonic")?
        .from_path(path)
        .context("cannot derive account key")?;

    println!("{} Ethereum Account ({})", "=".repeat(10), network);
    println!("Root XPublic Key: {}", wallet.root_xpublic_key().unwrap_or_default());
    println!("Public Key: {}", wallet.public_key()?);
    println!("Compressed Public Key: {}", wallet.compressed_public_key()?);
    println!("Path: {}", path);
    println!("Address: {}", wallet.address()?);
    Ok(())
}
