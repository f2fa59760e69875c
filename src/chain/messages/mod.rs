mod bank;
mod distribution;
mod gov;
mod staking;
mod wasm;

pub use bank::AminoMsgSend;
pub use distribution::AminoMsgWithdrawDelegatorReward;
pub use gov::AminoMsgVote;
pub use staking::{AminoMsgBeginRedelegate, AminoMsgDelegate, AminoMsgUndelegate};
pub use wasm::AminoMsgExecuteContract;

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use prost::Message;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::chain::amino::AminoMsg;
use crate::chain::proto::{Any, TxBody};
use crate::error::{Result, SignerError};

/// A message type with a legacy Amino JSON form
///
/// Implementors are the Amino-side structs; they convert to and from the
/// protobuf message that goes into the transaction body.
pub trait AminoMessage: Serialize + DeserializeOwned + Sized {
    type Proto: Message + Default;

    /// Protobuf type URL, e.g. "/cosmos.bank.v1beta1.MsgSend"
    const TYPE_URL: &'static str;

    /// Amino type name, e.g. "cosmos-sdk/MsgSend"
    const AMINO_TYPE: &'static str;

    fn from_proto(proto: Self::Proto) -> Result<Self>;

    fn into_proto(self) -> Result<Self::Proto>;
}

/// Object-safe converter between an `Any` payload and its Amino JSON value
pub trait AminoConverter: Send + Sync {
    fn type_url(&self) -> &str;

    fn amino_type(&self) -> &str;

    fn to_amino(&self, value: &[u8]) -> Result<Value>;

    fn from_amino(&self, value: &Value) -> Result<Vec<u8>>;
}

/// Converter for any [`AminoMessage`]
pub struct TypedConverter<M>(PhantomData<fn() -> M>);

impl<M> TypedConverter<M> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<M> Default for TypedConverter<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: AminoMessage> AminoConverter for TypedConverter<M> {
    fn type_url(&self) -> &str {
        M::TYPE_URL
    }

    fn amino_type(&self) -> &str {
        M::AMINO_TYPE
    }

    fn to_amino(&self, value: &[u8]) -> Result<Value> {
        let proto = M::Proto::decode(value)?;
        let amino = M::from_proto(proto)?;
        Ok(serde_json::to_value(amino)?)
    }

    fn from_amino(&self, value: &Value) -> Result<Vec<u8>> {
        let amino: M = serde_json::from_value(value.clone()).map_err(|e| {
            SignerError::InvalidMessage(format!("{}: {}", M::AMINO_TYPE, e))
        })?;
        Ok(amino.into_proto()?.encode_to_vec())
    }
}

/// Bidirectional registry between protobuf messages and their Amino JSON form
#[derive(Clone, Default)]
pub struct MessageRegistry {
    by_type_url: HashMap<String, Arc<dyn AminoConverter>>,
    by_amino_type: HashMap<String, Arc<dyn AminoConverter>>,
}

impl MessageRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the bank, staking, distribution, gov and wasm messages
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register::<AminoMsgSend>();
        registry.register::<AminoMsgDelegate>();
        registry.register::<AminoMsgUndelegate>();
        registry.register::<AminoMsgBeginRedelegate>();
        registry.register::<AminoMsgWithdrawDelegatorReward>();
        registry.register::<AminoMsgVote>();
        registry.register::<AminoMsgExecuteContract>();
        registry
    }

    /// Register a typed message. A later registration for the same type wins.
    pub fn register<M: AminoMessage + 'static>(&mut self) {
        self.register_converter(Arc::new(TypedConverter::<M>::new()));
    }

    pub fn register_converter(&mut self, converter: Arc<dyn AminoConverter>) {
        self.by_type_url
            .insert(converter.type_url().to_string(), Arc::clone(&converter));
        self.by_amino_type
            .insert(converter.amino_type().to_string(), converter);
    }

    pub fn is_supported(&self, type_url: &str) -> bool {
        self.by_type_url.contains_key(type_url)
    }

    /// Fail with `UnsupportedMessageType` on the first unknown message
    pub fn ensure_supported(&self, messages: &[Any]) -> Result<()> {
        match messages.iter().find(|m| !self.is_supported(&m.type_url)) {
            Some(msg) => Err(SignerError::UnsupportedMessageType(msg.type_url.clone())),
            None => Ok(()),
        }
    }

    pub fn to_amino(&self, msg: &Any) -> Result<AminoMsg> {
        let converter = self
            .by_type_url
            .get(&msg.type_url)
            .ok_or_else(|| SignerError::UnsupportedMessageType(msg.type_url.clone()))?;

        Ok(AminoMsg {
            msg_type: converter.amino_type().to_string(),
            value: converter.to_amino(&msg.value)?,
        })
    }

    pub fn from_amino(&self, msg: &AminoMsg) -> Result<Any> {
        let converter = self
            .by_amino_type
            .get(&msg.msg_type)
            .ok_or_else(|| SignerError::UnsupportedMessageType(msg.msg_type.clone()))?;

        Ok(Any {
            type_url: converter.type_url().to_string(),
            value: converter.from_amino(&msg.value)?,
        })
    }

    /// Encode a transaction body holding the given messages and memo
    pub fn encode_tx_body(&self, messages: Vec<Any>, memo: &str) -> Result<Vec<u8>> {
        self.ensure_supported(&messages)?;

        let tx_body = TxBody {
            messages,
            memo: memo.to_string(),
            ..Default::default()
        };

        Ok(tx_body.encode_to_vec())
    }
}

impl std::fmt::Debug for MessageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&String> = self.by_type_url.keys().collect();
        types.sort();
        f.debug_struct("MessageRegistry").field("types", &types).finish()
    }
}

/// Wrap a typed protobuf message into an `Any`
pub fn to_any<M: AminoMessage>(proto: &M::Proto) -> Any {
    Any {
        type_url: M::TYPE_URL.to_string(),
        value: proto.encode_to_vec(),
    }
}

/// Parse a decimal string carried in Amino JSON into a u64
pub(crate) fn parse_u64(field: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| SignerError::InvalidNumber(format!("{} '{}'", field, value)))
}
