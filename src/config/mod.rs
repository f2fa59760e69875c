use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::chain::client::ClientConfig;
use crate::chain::wallet::Bip44Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub chain: ChainConfig,
    pub ledger: LedgerConfig,
    pub tx: TxConfig,
}

/// Where signer metadata comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    Grpc,
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub backend: MetadataBackend,
    pub grpc_endpoint: String,
    pub rest_endpoint: String,
    /// Queried from the node when unset
    #[serde(default)]
    pub chain_id: Option<String>,
    pub address_prefix: String,
    pub fee_denom: String,
    pub connection_timeout: u64,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub coin_type: u32,
    pub account: u32,
    pub address_index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxConfig {
    pub gas: u64,
    /// Fee amount in `chain.fee_denom`
    pub fee_amount: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: ChainConfig {
                backend: MetadataBackend::Rest,
                grpc_endpoint: "https://grpc-testnet.firmachain.dev:443".to_string(),
                rest_endpoint: "https://lcd-testnet.firmachain.dev:1317".to_string(),
                chain_id: None,
                address_prefix: "firma".to_string(),
                fee_denom: "ufct".to_string(),
                connection_timeout: 10,
                request_timeout: 30,
            },
            ledger: LedgerConfig {
                coin_type: 7777,
                account: 0,
                address_index: 0,
            },
            tx: TxConfig {
                gas: 200000,
                fee_amount: 20000,
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            grpc_endpoint: self.chain.grpc_endpoint.clone(),
            connection_timeout: self.chain.connection_timeout,
            request_timeout: self.chain.request_timeout,
            chain_id: self.chain.chain_id.clone(),
        }
    }

    pub fn ledger_path(&self) -> Bip44Path {
        Bip44Path::new(
            self.ledger.coin_type,
            self.ledger.account,
            self.ledger.address_index,
        )
    }
}
