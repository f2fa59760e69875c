mod keys;
mod ledger;

pub use keys::{compress_public_key, derive_address, COMPRESSED_KEY_LEN};
pub use ledger::{AppVersion, Bip44Path, LedgerCosmosApp};

use async_trait::async_trait;

use crate::error::Result;

/// Address and public key reported by a signing device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerIdentity {
    pub address: String,
    pub public_key: Vec<u8>,
}

/// Capabilities required of a hardware signing device, independent of transport
///
/// Every method talks to the device and may fail with `SignerError::Device`
/// when the device is unreachable or the user cancels.
#[async_trait]
pub trait HardwareSigner: Send + Sync {
    /// Bech32 account address
    async fn address(&self) -> Result<String>;

    /// secp256k1 public key, compressed or uncompressed depending on the device
    async fn public_key(&self) -> Result<Vec<u8>>;

    /// Address and public key together. Implementations that get both in a
    /// single round trip should override this.
    async fn address_and_public_key(&self) -> Result<SignerIdentity> {
        let address = self.address().await?;
        let public_key = self.public_key().await?;
        Ok(SignerIdentity {
            address,
            public_key,
        })
    }

    /// Sign raw bytes. Blocks until the user approves or rejects on the device.
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;

    /// Display the address on the device screen for manual verification
    async fn show_address_on_device(&self) -> Result<()>;
}

#[async_trait]
impl<S: HardwareSigner + ?Sized> HardwareSigner for Box<S> {
    async fn address(&self) -> Result<String> {
        (**self).address().await
    }

    async fn public_key(&self) -> Result<Vec<u8>> {
        (**self).public_key().await
    }

    async fn address_and_public_key(&self) -> Result<SignerIdentity> {
        (**self).address_and_public_key().await
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        (**self).sign(message).await
    }

    async fn show_address_on_device(&self) -> Result<()> {
        (**self).show_address_on_device().await
    }
}
