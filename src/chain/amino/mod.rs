/// Legacy Amino JSON sign documents. Sign bytes always go through
/// `canonical::to_canonical_bytes`, never a general JSON encoder.

pub mod canonical;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::proto;
use crate::error::{Result, SignerError};

/// Coin denomination and amount, both as strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl Coin {
    pub fn new(amount: impl Into<String>, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = SignerError;

    /// Parse format like "20000ufct"
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        // Find where the number ends and denom begins
        let split_pos = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| SignerError::InvalidNumber(format!("coin '{}' has no denom", s)))?;

        let (amount, denom) = s.split_at(split_pos);
        if amount.is_empty() {
            return Err(SignerError::InvalidNumber(format!("coin '{}' has no amount", s)));
        }
        if !denom.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(SignerError::InvalidNumber(format!("coin '{}' has an invalid denom", s)));
        }

        Ok(Coin::new(amount, denom))
    }
}

impl From<Coin> for proto::Coin {
    fn from(coin: Coin) -> Self {
        proto::Coin {
            denom: coin.denom,
            amount: coin.amount,
        }
    }
}

impl From<proto::Coin> for Coin {
    fn from(coin: proto::Coin) -> Self {
        Coin {
            denom: coin.denom,
            amount: coin.amount,
        }
    }
}

/// Fee as it appears inside the Amino sign document: amount and gas only.
/// A fee granter is carried by the auth info, not signed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdFee {
    pub amount: Vec<Coin>,
    pub gas: String,
}

/// A message in its Amino JSON form: `{"type": ..., "value": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AminoMsg {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub value: Value,
}

/// The legacy `StdSignDoc`. Numbers are carried as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StdSignDoc {
    pub account_number: String,
    pub chain_id: String,
    pub fee: StdFee,
    pub memo: String,
    pub msgs: Vec<AminoMsg>,
    pub sequence: String,
}

/// Build a sign document from already converted messages
pub fn make_sign_doc(
    msgs: Vec<AminoMsg>,
    fee: StdFee,
    chain_id: &str,
    memo: &str,
    account_number: u64,
    sequence: u64,
) -> StdSignDoc {
    StdSignDoc {
        account_number: account_number.to_string(),
        chain_id: chain_id.to_string(),
        fee,
        memo: memo.to_string(),
        msgs,
        sequence: sequence.to_string(),
    }
}

/// Serialize a sign document to the exact bytes handed to the device
pub fn serialize_sign_doc(sign_doc: &StdSignDoc) -> Result<Vec<u8>> {
    let value = serde_json::to_value(sign_doc)?;
    Ok(canonical::to_canonical_bytes(&value))
}
