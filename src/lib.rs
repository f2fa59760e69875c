// Library exports for cosmos_ledger_signer

pub mod chain;
pub mod config;
pub mod error;

// Re-export main types for convenience
pub use chain::{
    sign_from_ledger, HardwareSigner, LedgerTxBuilder, MessageRegistry, SignOptions,
    SignerMetadataSource, TxFee,
};
pub use error::{Result, SignerError};
