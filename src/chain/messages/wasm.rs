use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AminoMessage;
use crate::chain::amino::Coin;
use crate::chain::proto::MsgExecuteContract;
use crate::error::{Result, SignerError};

/// Amino form of `cosmwasm.wasm.v1.MsgExecuteContract`
///
/// The contract message travels as raw JSON bytes in protobuf but as an
/// embedded JSON object in Amino, so the device can display it. Numbers in
/// it keep their literal text (u128 amounts included).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AminoMsgExecuteContract {
    pub sender: String,
    pub contract: String,
    pub msg: Value,
    #[serde(default)]
    pub funds: Vec<Coin>,
}

impl AminoMessage for AminoMsgExecuteContract {
    type Proto = MsgExecuteContract;

    const TYPE_URL: &'static str = "/cosmwasm.wasm.v1.MsgExecuteContract";
    const AMINO_TYPE: &'static str = "wasm/MsgExecuteContract";

    fn from_proto(proto: MsgExecuteContract) -> Result<Self> {
        let msg = serde_json::from_slice(&proto.msg).map_err(|e| {
            SignerError::InvalidMessage(format!("contract msg is not valid JSON: {}", e))
        })?;

        Ok(Self {
            sender: proto.sender,
            contract: proto.contract,
            msg,
            funds: proto.funds.into_iter().map(Coin::from).collect(),
        })
    }

    fn into_proto(self) -> Result<MsgExecuteContract> {
        Ok(MsgExecuteContract {
            sender: self.sender,
            contract: self.contract,
            msg: serde_json::to_vec(&self.msg)?,
            funds: self.funds.into_iter().map(Into::into).collect(),
        })
    }
}
