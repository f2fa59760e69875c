use serde::{Deserialize, Serialize};

use super::AminoMessage;
use crate::chain::amino::Coin;
use crate::chain::proto::MsgSend;
use crate::error::Result;

/// Amino form of `cosmos.bank.v1beta1.MsgSend`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AminoMsgSend {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

impl AminoMessage for AminoMsgSend {
    type Proto = MsgSend;

    const TYPE_URL: &'static str = "/cosmos.bank.v1beta1.MsgSend";
    const AMINO_TYPE: &'static str = "cosmos-sdk/MsgSend";

    fn from_proto(proto: MsgSend) -> Result<Self> {
        Ok(Self {
            from_address: proto.from_address,
            to_address: proto.to_address,
            amount: proto.amount.into_iter().map(Coin::from).collect(),
        })
    }

    fn into_proto(self) -> Result<MsgSend> {
        Ok(MsgSend {
            from_address: self.from_address,
            to_address: self.to_address,
            amount: self.amount.into_iter().map(Into::into).collect(),
        })
    }
}
