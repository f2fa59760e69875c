use serde::{Deserialize, Serialize};

use super::AminoMessage;
use crate::chain::amino::Coin;
use crate::chain::proto::{self, MsgBeginRedelegate, MsgDelegate, MsgUndelegate};
use crate::error::{Result, SignerError};

fn required_amount(amount: Option<proto::Coin>, amino_type: &str) -> Result<Coin> {
    amount
        .map(Coin::from)
        .ok_or_else(|| SignerError::InvalidMessage(format!("{} is missing an amount", amino_type)))
}

/// Amino form of `cosmos.staking.v1beta1.MsgDelegate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AminoMsgDelegate {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: Coin,
}

impl AminoMessage for AminoMsgDelegate {
    type Proto = MsgDelegate;

    const TYPE_URL: &'static str = "/cosmos.staking.v1beta1.MsgDelegate";
    const AMINO_TYPE: &'static str = "cosmos-sdk/MsgDelegate";

    fn from_proto(proto: MsgDelegate) -> Result<Self> {
        Ok(Self {
            delegator_address: proto.delegator_address,
            validator_address: proto.validator_address,
            amount: required_amount(proto.amount, Self::AMINO_TYPE)?,
        })
    }

    fn into_proto(self) -> Result<MsgDelegate> {
        Ok(MsgDelegate {
            delegator_address: self.delegator_address,
            validator_address: self.validator_address,
            amount: Some(self.amount.into()),
        })
    }
}

/// Amino form of `cosmos.staking.v1beta1.MsgUndelegate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AminoMsgUndelegate {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: Coin,
}

impl AminoMessage for AminoMsgUndelegate {
    type Proto = MsgUndelegate;

    const TYPE_URL: &'static str = "/cosmos.staking.v1beta1.MsgUndelegate";
    const AMINO_TYPE: &'static str = "cosmos-sdk/MsgUndelegate";

    fn from_proto(proto: MsgUndelegate) -> Result<Self> {
        Ok(Self {
            delegator_address: proto.delegator_address,
            validator_address: proto.validator_address,
            amount: required_amount(proto.amount, Self::AMINO_TYPE)?,
        })
    }

    fn into_proto(self) -> Result<MsgUndelegate> {
        Ok(MsgUndelegate {
            delegator_address: self.delegator_address,
            validator_address: self.validator_address,
            amount: Some(self.amount.into()),
        })
    }
}

/// Amino form of `cosmos.staking.v1beta1.MsgBeginRedelegate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AminoMsgBeginRedelegate {
    pub delegator_address: String,
    pub validator_src_address: String,
    pub validator_dst_address: String,
    pub amount: Coin,
}

impl AminoMessage for AminoMsgBeginRedelegate {
    type Proto = MsgBeginRedelegate;

    const TYPE_URL: &'static str = "/cosmos.staking.v1beta1.MsgBeginRedelegate";
    const AMINO_TYPE: &'static str = "cosmos-sdk/MsgBeginRedelegate";

    fn from_proto(proto: MsgBeginRedelegate) -> Result<Self> {
        Ok(Self {
            delegator_address: proto.delegator_address,
            validator_src_address: proto.validator_src_address,
            validator_dst_address: proto.validator_dst_address,
            amount: required_amount(proto.amount, Self::AMINO_TYPE)?,
        })
    }

    fn into_proto(self) -> Result<MsgBeginRedelegate> {
        Ok(MsgBeginRedelegate {
            delegator_address: self.delegator_address,
            validator_src_address: self.validator_src_address,
            validator_dst_address: self.validator_dst_address,
            amount: Some(self.amount.into()),
        })
    }
}
