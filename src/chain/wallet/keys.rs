use bech32::{self, Hrp};
use ripemd::Ripemd160;
use secp256k1::PublicKey;
use sha2::{Digest, Sha256};

use crate::error::{Result, SignerError};

/// Length of a compressed secp256k1 public key
pub const COMPRESSED_KEY_LEN: usize = 33;

/// Length of an uncompressed secp256k1 public key (0x04 prefix + X + Y)
pub const UNCOMPRESSED_KEY_LEN: usize = 65;

/// Normalize a secp256k1 public key to its 33-byte compressed form
///
/// Devices return either form depending on firmware; the transaction always
/// carries the compressed one.
pub fn compress_public_key(bytes: &[u8]) -> Result<[u8; COMPRESSED_KEY_LEN]> {
    if bytes.len() != COMPRESSED_KEY_LEN && bytes.len() != UNCOMPRESSED_KEY_LEN {
        return Err(SignerError::InvalidPublicKey(format!(
            "expected {} or {} bytes, got {}",
            COMPRESSED_KEY_LEN,
            UNCOMPRESSED_KEY_LEN,
            bytes.len()
        )));
    }

    let public_key = PublicKey::from_slice(bytes)
        .map_err(|e| SignerError::InvalidPublicKey(e.to_string()))?;
    Ok(public_key.serialize())
}

/// Generate a Cosmos address from a secp256k1 public key
/// bech32(hrp, ripemd160(sha256(compressed_key)))
pub fn derive_address(public_key: &[u8], hrp: &str) -> Result<String> {
    let compressed = compress_public_key(public_key)?;

    let sha = Sha256::digest(compressed);
    let addr_bytes = Ripemd160::digest(sha);

    let hrp = Hrp::parse(hrp)
        .map_err(|e| SignerError::InvalidPublicKey(format!("invalid address prefix: {}", e)))?;
    bech32::encode::<bech32::Bech32>(hrp, addr_bytes.as_slice())
        .map_err(|e| SignerError::InvalidPublicKey(format!("bech32 encoding failed: {}", e)))
}
