use serde::{Deserialize, Serialize};

use super::{parse_u64, AminoMessage};
use crate::chain::proto::MsgVote;
use crate::error::Result;

/// Amino form of `cosmos.gov.v1beta1.MsgVote`
///
/// `proposal_id` is a uint64 and therefore a string in Amino JSON, while the
/// vote option enum stays a plain number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AminoMsgVote {
    pub option: i32,
    pub proposal_id: String,
    pub voter: String,
}

impl AminoMessage for AminoMsgVote {
    type Proto = MsgVote;

    const TYPE_URL: &'static str = "/cosmos.gov.v1beta1.MsgVote";
    const AMINO_TYPE: &'static str = "cosmos-sdk/MsgVote";

    fn from_proto(proto: MsgVote) -> Result<Self> {
        Ok(Self {
            option: proto.option,
            proposal_id: proto.proposal_id.to_string(),
            voter: proto.voter,
        })
    }

    fn into_proto(self) -> Result<MsgVote> {
        Ok(MsgVote {
            proposal_id: parse_u64("proposal_id", &self.proposal_id)?,
            voter: self.voter,
            option: self.option,
        })
    }
}
