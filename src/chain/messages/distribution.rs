use serde::{Deserialize, Serialize};

use super::AminoMessage;
use crate::chain::proto::MsgWithdrawDelegatorReward;
use crate::error::Result;

/// Amino form of `cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AminoMsgWithdrawDelegatorReward {
    pub delegator_address: String,
    pub validator_address: String,
}

impl AminoMessage for AminoMsgWithdrawDelegatorReward {
    type Proto = MsgWithdrawDelegatorReward;

    const TYPE_URL: &'static str = "/cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward";
    // The legacy name predates the "DelegatorReward" rename
    const AMINO_TYPE: &'static str = "cosmos-sdk/MsgWithdrawDelegationReward";

    fn from_proto(proto: MsgWithdrawDelegatorReward) -> Result<Self> {
        Ok(Self {
            delegator_address: proto.delegator_address,
            validator_address: proto.validator_address,
        })
    }

    fn into_proto(self) -> Result<MsgWithdrawDelegatorReward> {
        Ok(MsgWithdrawDelegatorReward {
            delegator_address: self.delegator_address,
            validator_address: self.validator_address,
        })
    }
}
