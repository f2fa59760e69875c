/// Polymorphic account decoding for auth module queries
///
/// The auth module returns accounts wrapped in `google.protobuf.Any` (gRPC)
/// or as JSON tagged with `@type` (REST). Every supported variant embeds a
/// `BaseAccount` somewhere; that is where the account number and sequence live.
use prost::Message;
use serde_json::Value;

use crate::chain::proto::{
    BaseAccount, BaseVestingAccount, ContinuousVestingAccount, DelayedVestingAccount,
    PeriodicVestingAccount, PermanentLockedAccount,
};
use crate::error::{Result, SignerError};

/// Every account type the decoder knows about
#[derive(Debug, Clone)]
pub enum Account {
    Base(BaseAccount),

    // Vesting account types
    BaseVesting(BaseVestingAccount),
    ContinuousVesting(ContinuousVestingAccount),
    DelayedVesting(DelayedVestingAccount),
    PeriodicVesting(PeriodicVestingAccount),
    PermanentLocked(PermanentLockedAccount),

    // Forward compatibility for unknown account types
    Unsupported { type_url: String },
}

/// Common account information extracted from any account type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: String,
    pub sequence: u64,
    pub account_number: u64,
}

impl From<&BaseAccount> for AccountInfo {
    fn from(base: &BaseAccount) -> Self {
        Self {
            address: base.address.clone(),
            sequence: base.sequence,
            account_number: base.account_number,
        }
    }
}

fn decode<M: Message + Default>(name: &str, value: &[u8]) -> Result<M> {
    M::decode(value)
        .map_err(|e| SignerError::MetadataLookup(format!("failed to decode {}: {}", name, e)))
}

impl Account {
    /// Decode an account `Any` into the matching variant
    pub fn decode_any(type_url: &str, value: &[u8]) -> Result<Self> {
        let account = match type_url {
            "/cosmos.auth.v1beta1.BaseAccount" => Account::Base(decode("BaseAccount", value)?),
            "/cosmos.vesting.v1beta1.BaseVestingAccount" => {
                Account::BaseVesting(decode("BaseVestingAccount", value)?)
            }
            "/cosmos.vesting.v1beta1.ContinuousVestingAccount" => {
                Account::ContinuousVesting(decode("ContinuousVestingAccount", value)?)
            }
            "/cosmos.vesting.v1beta1.DelayedVestingAccount" => {
                Account::DelayedVesting(decode("DelayedVestingAccount", value)?)
            }
            "/cosmos.vesting.v1beta1.PeriodicVestingAccount" => {
                Account::PeriodicVesting(decode("PeriodicVestingAccount", value)?)
            }
            "/cosmos.vesting.v1beta1.PermanentLockedAccount" => {
                Account::PermanentLocked(decode("PermanentLockedAccount", value)?)
            }
            unsupported_type => {
                log::warn!("Encountered unsupported account type: {}", unsupported_type);
                Account::Unsupported {
                    type_url: unsupported_type.to_string(),
                }
            }
        };

        Ok(account)
    }

    /// The embedded base account, if this variant carries one
    pub fn get_account_info(&self) -> Option<AccountInfo> {
        let base = match self {
            Account::Base(acc) => Some(acc),
            Account::BaseVesting(acc) => acc.base_account.as_ref(),
            Account::ContinuousVesting(acc) => acc
                .base_vesting_account
                .as_ref()
                .and_then(|bva| bva.base_account.as_ref()),
            Account::DelayedVesting(acc) => acc
                .base_vesting_account
                .as_ref()
                .and_then(|bva| bva.base_account.as_ref()),
            Account::PeriodicVesting(acc) => acc
                .base_vesting_account
                .as_ref()
                .and_then(|bva| bva.base_account.as_ref()),
            Account::PermanentLocked(acc) => acc
                .base_vesting_account
                .as_ref()
                .and_then(|bva| bva.base_account.as_ref()),
            Account::Unsupported { .. } => None,
        };

        base.map(AccountInfo::from)
    }

    /// Account type name for logging
    pub fn account_type(&self) -> &str {
        match self {
            Account::Base(_) => "BaseAccount",
            Account::BaseVesting(_) => "BaseVestingAccount",
            Account::ContinuousVesting(_) => "ContinuousVestingAccount",
            Account::DelayedVesting(_) => "DelayedVestingAccount",
            Account::PeriodicVesting(_) => "PeriodicVestingAccount",
            Account::PermanentLocked(_) => "PermanentLockedAccount",
            Account::Unsupported { type_url } => type_url,
        }
    }

    /// Decode and extract in one step; accounts without a base account are an error
    pub fn info_from_any(type_url: &str, value: &[u8]) -> Result<AccountInfo> {
        let account = Self::decode_any(type_url, value)?;
        log::debug!("Decoded account type: {}", account.account_type());

        account.get_account_info().ok_or_else(|| {
            SignerError::MetadataLookup(format!(
                "account type {} carries no base account",
                account.account_type()
            ))
        })
    }
}

/// Extract account info from the REST (JSON) form of an account
///
/// Walks `base_vesting_account` / `base_account` until it reaches the object
/// holding `account_number` and `sequence`, which are decimal strings.
pub fn account_info_from_json(account: &Value) -> Result<AccountInfo> {
    if let Some(account_number) = account.get("account_number") {
        return Ok(AccountInfo {
            address: account
                .get("address")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            account_number: json_u64("account_number", account_number)?,
            sequence: account
                .get("sequence")
                .map(|s| json_u64("sequence", s))
                .transpose()?
                .unwrap_or(0),
        });
    }

    for nested in ["base_vesting_account", "base_account"] {
        if let Some(inner) = account.get(nested) {
            return account_info_from_json(inner);
        }
    }

    let type_url = account
        .get("@type")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    Err(SignerError::MetadataLookup(format!(
        "account type {} carries no base account",
        type_url
    )))
}

fn json_u64(field: &str, value: &Value) -> Result<u64> {
    match value {
        Value::String(s) => s.parse::<u64>().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
    .ok_or_else(|| SignerError::MetadataLookup(format!("invalid {} in account: {}", field, value)))
}
