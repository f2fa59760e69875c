use async_trait::async_trait;

use crate::error::Result;

/// Chain-side facts needed to sign for an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerMetadata {
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
}

/// Looks up the account number, sequence and chain id for a signer
///
/// Fails with `MetadataLookup` when the node is unreachable or answers
/// unexpectedly, and `AccountNotFound` when the address has no account.
#[async_trait]
pub trait SignerMetadataSource: Send + Sync {
    async fn signer_metadata(&self, address: &str) -> Result<SignerMetadata>;
}

#[async_trait]
impl<S: SignerMetadataSource + ?Sized> SignerMetadataSource for Box<S> {
    async fn signer_metadata(&self, address: &str) -> Result<SignerMetadata> {
        (**self).signer_metadata(address).await
    }
}

/// Metadata supplied up front, for offline signing or an explicit sequence
#[derive(Debug, Clone)]
pub struct StaticMetadataSource {
    metadata: SignerMetadata,
}

impl StaticMetadataSource {
    pub fn new(metadata: SignerMetadata) -> Self {
        Self { metadata }
    }
}

#[async_trait]
impl SignerMetadataSource for StaticMetadataSource {
    async fn signer_metadata(&self, address: &str) -> Result<SignerMetadata> {
        log::debug!("Using caller-provided signer metadata for {}", address);
        Ok(self.metadata.clone())
    }
}
