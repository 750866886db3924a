use std::str::FromStr;

use bip39::{Language, Mnemonic};
use bitcoin::bip32::{DerivationPath, Xpriv, Xpub};
use bitcoin::NetworkKind;
use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use tracing::debug;

use crate::error::{SwapError, SwapResult};
use crate::internal::helper::{format_amount, Unit};
use crate::internal::hex_utils::strip_prefix;
use crate::ledger::Ledger;
use crate::types::{Address, Network};

// ============================================================================
// BIP39 / BIP32 WALLET
// ============================================================================
// Keys follow the usual account layout: BIP39 mnemonic -> 64-byte seed ->
// BIP32 master key -> m/44'/60'/0'/0/<index>.

/// BIP44 path of the first external account.
pub const DEFAULT_PATH: &str = "m/44'/60'/0'/0/0";

pub struct Wallet {
    pub network: Network,
    secp_ctx: Secp256k1<All>,
    root_key: Option<Xpriv>,
    path: Option<String>,
    private_key: Option<SecretKey>,
}

impl Wallet {
    pub fn new(network: Network) -> Self {
        Wallet {
            network,
            secp_ctx: Secp256k1::new(),
            root_key: None,
            path: None,
            private_key: None,
        }
    }

    /// Loads the root key from a BIP39 English mnemonic.
    pub fn from_mnemonic(
        &mut self,
        mnemonic: &str,
        passphrase: Option<&str>,
    ) -> SwapResult<&mut Self> {
        let mnemonic = Mnemonic::parse_in(Language::English, mnemonic)?;
        let seed = mnemonic.to_seed(passphrase.unwrap_or(""));
        self.from_seed(&seed)
    }

    pub fn from_seed(&mut self, seed: &[u8]) -> SwapResult<&mut Self> {
        let root_key = Xpriv::new_master(NetworkKind::Main, seed)?;
        self.root_key = Some(root_key);
        self.path = None;
        self.private_key = None;
        Ok(self)
    }

    pub fn from_xprivate_key(&mut self, xprivate_key: &str) -> SwapResult<&mut Self> {
        let root_key = Xpriv::from_str(xprivate_key)?;
        self.root_key = Some(root_key);
        self.path = None;
        self.private_key = None;
        Ok(self)
    }

    /// Path-less wallet holding a single key; it cannot build a solver.
    pub fn from_private_key(&mut self, private_key: &str) -> SwapResult<&mut Self> {
        let bytes = hex::decode(strip_prefix(private_key))
            .map_err(|e| SwapError::Derivation(format!("private key is not hex: {}", e)))?;
        self.root_key = None;
        self.path = None;
        self.private_key = Some(SecretKey::from_slice(&bytes)?);
        Ok(self)
    }

    /// Derives the account key at `path` from the root key.
    pub fn from_path(&mut self, path: &str) -> SwapResult<&mut Self> {
        let root_key = self
            .root_key
            .as_ref()
            .ok_or_else(|| SwapError::Derivation("no root key loaded".to_string()))?;
        let derivation_path = DerivationPath::from_str(path)?;
        let derived = root_key.derive_priv(&self.secp_ctx, &derivation_path)?;
        self.private_key = Some(derived.private_key);
        self.path = Some(path.to_string());
        debug!(path, "derived account key");
        Ok(self)
    }

    pub fn root_xprivate_key(&self) -> Option<String> {
        self.root_key.as_ref().map(|k| k.to_string())
    }

    pub fn root_xpublic_key(&self) -> Option<String> {
        self.root_key
            .as_ref()
            .map(|k| Xpub::from_priv(&self.secp_ctx, k).to_string())
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn secret_key(&self) -> SwapResult<&SecretKey> {
        self.private_key.as_ref().ok_or(SwapError::NoKey)
    }

    pub fn private_key(&self) -> SwapResult<String> {
        Ok(hex::encode(self.secret_key()?.secret_bytes()))
    }

    fn public_key_point(&self) -> SwapResult<PublicKey> {
        Ok(PublicKey::from_secret_key(&self.secp_ctx, self.secret_key()?))
    }

    /// Uncompressed SEC1 public key, hex.
    pub fn public_key(&self) -> SwapResult<String> {
        Ok(hex::encode(self.public_key_point()?.serialize_uncompressed()))
    }

    pub fn compressed_public_key(&self) -> SwapResult<String> {
        Ok(hex::encode(self.public_key_point()?.serialize()))
    }

    pub fn address(&self) -> SwapResult<Address> {
        Ok(Address::from_public_key(&self.public_key_point()?))
    }

    pub async fn balance<L: Ledger>(&self, ledger: &L, unit: Unit) -> SwapResult<String> {
        let wei = ledger.balance(&self.address()?).await?;
        Ok(format_amount(wei, unit))
    }
}
