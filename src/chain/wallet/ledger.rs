/// Cosmos app on Ledger devices (CLA 0x55): version, address and chunked
/// Amino JSON signing over any `ledger_transport::Exchange`.

use std::fmt;
use std::ops::Deref;

use async_trait::async_trait;
use ledger_transport::{APDUAnswer, APDUCommand, APDUErrorCode, Exchange};
use secp256k1::ecdsa::Signature;

use super::keys::{derive_address, COMPRESSED_KEY_LEN};
use super::{HardwareSigner, SignerIdentity};
use crate::error::{Result, SignerError};

const CLA: u8 = 0x55;
const INS_GET_VERSION: u8 = 0x00;
const INS_SIGN_SECP256K1: u8 = 0x02;
const INS_GET_ADDR_SECP256K1: u8 = 0x04;

const P1_ONLY_RETRIEVE: u8 = 0x00;
const P1_SHOW_ADDRESS: u8 = 0x01;

const PAYLOAD_INIT: u8 = 0x00;
const PAYLOAD_ADD: u8 = 0x01;
const PAYLOAD_LAST: u8 = 0x02;

/// P2 selecting the Amino JSON sign mode
const SIGN_MODE_JSON: u8 = 0x00;

const CHUNK_SIZE: usize = 250;

const HARDENED: u32 = 0x8000_0000;

/// Status words outside `APDUErrorCode` that the Cosmos app reports
const SW_APP_NOT_OPEN: u16 = 0x6e01;
const SW_DEVICE_LOCKED: u16 = 0x5515;

/// BIP-44 path `m/44'/coin_type'/account'/change/address_index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bip44Path {
    pub coin_type: u32,
    pub account: u32,
    pub change: u32,
    pub address_index: u32,
}

impl Bip44Path {
    pub fn new(coin_type: u32, account: u32, address_index: u32) -> Self {
        Self {
            coin_type,
            account,
            change: 0,
            address_index,
        }
    }

    /// Five little-endian u32 components, the first three hardened
    pub fn serialize(&self) -> [u8; 20] {
        let components = [
            44 | HARDENED,
            self.coin_type | HARDENED,
            self.account | HARDENED,
            self.change,
            self.address_index,
        ];

        let mut out = [0u8; 20];
        for (i, component) in components.iter().enumerate() {
            out[i * 4..(i + 1) * 4].copy_from_slice(&component.to_le_bytes());
        }
        out
    }
}

impl fmt::Display for Bip44Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m/44'/{}'/{}'/{}/{}",
            self.coin_type, self.account, self.change, self.address_index
        )
    }
}

/// Version of the Cosmos app running on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppVersion {
    pub test_mode: bool,
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.test_mode {
            write!(f, " (test mode)")?;
        }
        Ok(())
    }
}

/// Turn a non-success status word into a `Device` error
fn check_status<B: Deref<Target = [u8]>>(answer: &APDUAnswer<B>) -> Result<()> {
    let reason = match answer.error_code() {
        Ok(APDUErrorCode::NoError) => return Ok(()),
        Ok(APDUErrorCode::CommandNotAllowed) => "transaction rejected on the device".to_string(),
        Ok(APDUErrorCode::ClaNotSupported) | Err(SW_APP_NOT_OPEN) => {
            "the Cosmos app does not seem to be open".to_string()
        }
        Err(SW_DEVICE_LOCKED) => "the device is locked".to_string(),
        Ok(code) => format!("{:?}", code),
        Err(_) => "unknown status".to_string(),
    };
    Err(SignerError::Device(format!(
        "{} (0x{:04x})",
        reason,
        answer.retcode()
    )))
}

/// A Ledger device running the Cosmos app
pub struct LedgerCosmosApp<E> {
    transport: E,
    path: Bip44Path,
    hrp: String,
}

impl<E> LedgerCosmosApp<E>
where
    E: Exchange + Send + Sync,
    E::Error: fmt::Display,
{
    pub fn new(transport: E, path: Bip44Path, hrp: impl Into<String>) -> Self {
        Self {
            transport,
            path,
            hrp: hrp.into(),
        }
    }

    pub fn path(&self) -> &Bip44Path {
        &self.path
    }

    /// Exchange one command and return the answer payload without the status word
    async fn send(&self, ins: u8, p1: u8, p2: u8, data: Vec<u8>) -> Result<Vec<u8>> {
        let command = APDUCommand {
            cla: CLA,
            ins,
            p1,
            p2,
            data,
        };
        let answer = self
            .transport
            .exchange(&command)
            .await
            .map_err(|e| SignerError::Device(format!("transport error: {}", e)))?;
        check_status(&answer)?;
        Ok(answer.data().to_vec())
    }

    /// Query the Cosmos app version
    pub async fn app_version(&self) -> Result<AppVersion> {
        let data = self.send(INS_GET_VERSION, 0, 0, Vec::new()).await?;
        if data.len() < 4 {
            return Err(SignerError::Device(format!(
                "version answer too short: {} bytes",
                data.len()
            )));
        }

        Ok(AppVersion {
            test_mode: data[0] != 0,
            major: data[1],
            minor: data[2],
            patch: data[3],
        })
    }

    async fn fetch_identity(&self, p1: u8) -> Result<SignerIdentity> {
        let hrp = self.hrp.as_bytes();
        let hrp_len = u8::try_from(hrp.len())
            .map_err(|_| SignerError::Device(format!("address prefix too long: {}", self.hrp)))?;

        let mut payload = Vec::with_capacity(1 + hrp.len() + 20);
        payload.push(hrp_len);
        payload.extend_from_slice(hrp);
        payload.extend_from_slice(&self.path.serialize());

        let data = self.send(INS_GET_ADDR_SECP256K1, p1, 0, payload).await?;
        if data.len() <= COMPRESSED_KEY_LEN {
            return Err(SignerError::Device(format!(
                "address answer too short: {} bytes",
                data.len()
            )));
        }

        let (public_key, address) = data.split_at(COMPRESSED_KEY_LEN);
        let address = String::from_utf8(address.to_vec())
            .map_err(|_| SignerError::Device("device returned a non UTF-8 address".to_string()))?;

        // The reported address must belong to the reported key
        let expected = derive_address(public_key, &self.hrp)
            .map_err(|e| SignerError::Device(format!("device returned a bad public key: {}", e)))?;
        if expected != address {
            return Err(SignerError::Device(format!(
                "device address {} does not match its public key ({})",
                address, expected
            )));
        }

        log::debug!("Ledger identity at {}: {}", self.path, address);

        Ok(SignerIdentity {
            address,
            public_key: public_key.to_vec(),
        })
    }
}

#[async_trait]
impl<E> HardwareSigner for LedgerCosmosApp<E>
where
    E: Exchange + Send + Sync,
    E::Error: fmt::Display,
{
    async fn address(&self) -> Result<String> {
        Ok(self.fetch_identity(P1_ONLY_RETRIEVE).await?.address)
    }

    async fn public_key(&self) -> Result<Vec<u8>> {
        Ok(self.fetch_identity(P1_ONLY_RETRIEVE).await?.public_key)
    }

    // One round trip returns both
    async fn address_and_public_key(&self) -> Result<SignerIdentity> {
        self.fetch_identity(P1_ONLY_RETRIEVE).await
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let mut chunks: Vec<Vec<u8>> = vec![self.path.serialize().to_vec()];
        chunks.extend(message.chunks(CHUNK_SIZE).map(<[u8]>::to_vec));

        log::info!(
            "Sending {} bytes to the Ledger for signing, confirm on the device",
            message.len()
        );

        let last = chunks.len() - 1;
        let mut der = Vec::new();
        for (i, chunk) in chunks.into_iter().enumerate() {
            let p1 = match i {
                0 => PAYLOAD_INIT,
                i if i == last => PAYLOAD_LAST,
                _ => PAYLOAD_ADD,
            };
            der = self.send(INS_SIGN_SECP256K1, p1, SIGN_MODE_JSON, chunk).await?;
        }

        if der.is_empty() {
            return Err(SignerError::Device("no signature returned".to_string()));
        }

        let mut signature = Signature::from_der(&der)
            .map_err(|e| SignerError::Device(format!("malformed DER signature: {}", e)))?;
        signature.normalize_s();

        Ok(signature.serialize_compact().to_vec())
    }

    async fn show_address_on_device(&self) -> Result<()> {
        self.fetch_identity(P1_SHOW_ADDRESS).await.map(|_| ())
    }
}
