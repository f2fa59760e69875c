pub mod account_types;
pub mod amino;
pub mod client;
pub mod messages;
pub mod metadata;
pub mod proto;
pub mod rest;
pub mod signing;
pub mod tx_builder;
pub mod wallet;

pub use client::{ClientConfig, GrpcMetadataSource};
pub use messages::{AminoMessage, MessageRegistry};
pub use metadata::{SignerMetadata, SignerMetadataSource, StaticMetadataSource};
pub use rest::RestMetadataSource;
pub use signing::{sign_from_ledger, LedgerTxBuilder, SignOptions, TxFee};
pub use tx_builder::{encode_tx_raw, make_auth_info_bytes, make_signer_infos};
pub use wallet::{HardwareSigner, LedgerCosmosApp, SignerIdentity};
