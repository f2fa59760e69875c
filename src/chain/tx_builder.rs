/// Auth info and raw transaction encoding using the Cosmos SDK proto types
use prost::Message;

use crate::chain::amino::Coin;
use crate::chain::proto::{
    self, mode_info, Any, AuthInfo, Fee, ModeInfo, Secp256k1PubKey, SignMode, SignerInfo, TxRaw,
    SECP256K1_PUBKEY_TYPE_URL,
};
use crate::chain::wallet::compress_public_key;
use crate::error::{Result, SignerError};

/// Largest integer a 53-bit mantissa represents exactly, 2^53 - 1
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Parse a non-negative decimal integer limited to the 53-bit safe range
///
/// Anything that is not a plain run of digits is `InvalidNumber`; a value
/// above [`MAX_SAFE_INTEGER`] is `NumericOverflow`.
pub fn parse_int53(value: &str) -> Result<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SignerError::InvalidNumber(format!("'{}'", value)));
    }

    match value.parse::<u64>() {
        Ok(n) if n <= MAX_SAFE_INTEGER => Ok(n),
        _ => Err(SignerError::NumericOverflow(value.to_string())),
    }
}

/// Gas limit from its decimal string form
pub fn parse_gas_limit(gas: &str) -> Result<u64> {
    parse_int53(gas.trim())
}

/// Wrap a secp256k1 public key as `/cosmos.crypto.secp256k1.PubKey`
pub fn encode_secp256k1_pubkey(public_key: &[u8]) -> Result<Any> {
    let compressed = compress_public_key(public_key)?;
    let pub_key = Secp256k1PubKey {
        key: compressed.to_vec(),
    };

    Ok(Any {
        type_url: SECP256K1_PUBKEY_TYPE_URL.to_string(),
        value: pub_key.encode_to_vec(),
    })
}

/// One `SignerInfo` per `(public key, sequence)` pair, all in single-signer mode
pub fn make_signer_infos(signers: &[(Any, u64)], sign_mode: SignMode) -> Vec<SignerInfo> {
    signers
        .iter()
        .map(|(public_key, sequence)| SignerInfo {
            public_key: Some(public_key.clone()),
            mode_info: Some(ModeInfo {
                sum: Some(mode_info::Sum::Single(mode_info::Single {
                    mode: sign_mode as i32,
                })),
            }),
            sequence: *sequence,
        })
        .collect()
}

/// Encode an `AuthInfo` for the given signers and fee
///
/// An empty `granter` leaves the field unset on the wire.
pub fn make_auth_info_bytes(
    signers: &[(Any, u64)],
    fee_amount: &[Coin],
    gas_limit: u64,
    granter: &str,
    sign_mode: SignMode,
) -> Vec<u8> {
    let fee = Fee {
        amount: fee_amount.iter().cloned().map(proto::Coin::from).collect(),
        gas_limit,
        granter: granter.to_string(),
        ..Default::default()
    };

    let auth_info = AuthInfo {
        signer_infos: make_signer_infos(signers, sign_mode),
        fee: Some(fee),
        ..Default::default()
    };

    auth_info.encode_to_vec()
}

/// Encode a `TxRaw` for broadcast
pub fn encode_tx_raw(tx_raw: &TxRaw) -> Vec<u8> {
    tx_raw.encode_to_vec()
}
