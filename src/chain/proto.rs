/// Proto definitions for Cosmos SDK chain integration
/// These come from the published `cosmos-sdk-proto` bindings

pub use cosmos_sdk_proto::Any;

pub use cosmos_sdk_proto::cosmos::base::v1beta1::Coin;
pub use cosmos_sdk_proto::cosmos::crypto::secp256k1::PubKey as Secp256k1PubKey;
pub use cosmos_sdk_proto::cosmos::tx::signing::v1beta1::SignMode;
pub use cosmos_sdk_proto::cosmos::tx::v1beta1::{
    mode_info, AuthInfo, Fee, ModeInfo, SignerInfo, TxBody, TxRaw,
};
pub use cosmos_sdk_proto::cosmos::auth::v1beta1::{
    query_client::QueryClient as AuthQueryClient, BaseAccount, QueryAccountRequest,
};
pub use cosmos_sdk_proto::cosmos::vesting::v1beta1::{
    BaseVestingAccount, ContinuousVestingAccount, DelayedVestingAccount,
    PeriodicVestingAccount, PermanentLockedAccount,
};
pub use cosmos_sdk_proto::cosmos::base::tendermint::v1beta1::{
    service_client::ServiceClient as TendermintServiceClient, GetNodeInfoRequest,
};

// Message types with built-in Amino converters
pub use cosmos_sdk_proto::cosmos::bank::v1beta1::MsgSend;
pub use cosmos_sdk_proto::cosmos::distribution::v1beta1::MsgWithdrawDelegatorReward;
pub use cosmos_sdk_proto::cosmos::gov::v1beta1::MsgVote;
pub use cosmos_sdk_proto::cosmos::staking::v1beta1::{
    MsgBeginRedelegate, MsgDelegate, MsgUndelegate,
};
pub use cosmos_sdk_proto::cosmwasm::wasm::v1::MsgExecuteContract;

/// Type URL of the secp256k1 public key wrapper
pub const SECP256K1_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";
