use thiserror::Error;

/// Errors surfaced while resolving, signing or assembling a transaction.
///
/// Every failure is propagated to the caller as-is; nothing in this crate
/// retries on its own.
#[derive(Debug, Error)]
pub enum SignerError {
    /// Device unreachable, user rejection, or a malformed device response.
    #[error("device error: {0}")]
    Device(String),

    /// Network unreachable or an unexpected response from the node.
    #[error("signer metadata lookup failed: {0}")]
    MetadataLookup(String),

    /// The address has no on-chain account yet (it must be funded first).
    #[error("account {address} not found on chain")]
    AccountNotFound { address: String },

    /// A message has no registered Amino/binary converter.
    #[error("unsupported message type: {0}")]
    UnsupportedMessageType(String),

    /// A numeric string does not fit in the 53-bit safe integer range.
    #[error("numeric overflow: {0} exceeds the safe integer range")]
    NumericOverflow(String),

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// A message payload could not be converted between representations.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("protobuf encode error: {0}")]
    Encode(#[from] prost::EncodeError),

    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SignerError {
    /// True for failures of the metadata lookup step, including a missing account.
    pub fn is_metadata_error(&self) -> bool {
        matches!(
            self,
            SignerError::MetadataLookup(_) | SignerError::AccountNotFound { .. }
        )
    }
}

pub type Result<T, E = SignerError> = std::result::Result<T, E>;
