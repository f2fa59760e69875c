use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};

use crate::chain::account_types::Account;
use crate::chain::metadata::{SignerMetadata, SignerMetadataSource};
use crate::chain::proto::{
    AuthQueryClient, GetNodeInfoRequest, QueryAccountRequest, TendermintServiceClient,
};
use crate::error::{Result, SignerError};

/// Configuration for the gRPC metadata client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// gRPC endpoint URL (e.g., "https://grpc-testnet.firmachain.dev:443")
    pub grpc_endpoint: String,
    /// Connection timeout in seconds
    pub connection_timeout: u64,
    /// Request timeout in seconds
    pub request_timeout: u64,
    /// Skip the node info query when the chain id is already known
    pub chain_id: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            grpc_endpoint: "https://grpc-testnet.firmachain.dev:443".to_string(),
            connection_timeout: 10,
            request_timeout: 30,
            chain_id: None,
        }
    }
}

/// Signer metadata from a node's gRPC auth and tendermint services
#[derive(Clone)]
pub struct GrpcMetadataSource {
    channel: Channel,
    chain_id: Option<String>,
}

impl GrpcMetadataSource {
    /// Connect to the configured gRPC endpoint
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        log::info!("Connecting to {}", config.grpc_endpoint);

        // For HTTPS endpoints, tonic handles TLS with the native roots
        let endpoint = Endpoint::from_shared(config.grpc_endpoint.clone())
            .map_err(|e| SignerError::MetadataLookup(format!("invalid gRPC endpoint: {}", e)))?
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(Duration::from_secs(config.connection_timeout));

        let channel = endpoint.connect().await.map_err(|e| {
            SignerError::MetadataLookup(format!("failed to connect to {}: {}", config.grpc_endpoint, e))
        })?;

        log::info!("Connected to {}", config.grpc_endpoint);
        Ok(Self::from_channel(channel, config.chain_id.clone()))
    }

    /// Use an existing channel
    pub fn from_channel(channel: Channel, chain_id: Option<String>) -> Self {
        Self { channel, chain_id }
    }

    async fn query_account(&self, address: &str) -> Result<(u64, u64)> {
        let mut client = AuthQueryClient::new(self.channel.clone());
        let request = tonic::Request::new(QueryAccountRequest {
            address: address.to_string(),
        });

        let response = client
            .account(request)
            .await
            .map_err(|status| account_status_error(status, address))?;

        let account_any = response.into_inner().account.ok_or_else(|| {
            SignerError::AccountNotFound {
                address: address.to_string(),
            }
        })?;

        log::debug!("Decoding account with type_url: {}", account_any.type_url);
        let info = Account::info_from_any(&account_any.type_url, &account_any.value)?;
        Ok((info.account_number, info.sequence))
    }

    async fn query_chain_id(&self) -> Result<String> {
        if let Some(chain_id) = &self.chain_id {
            return Ok(chain_id.clone());
        }

        let mut client = TendermintServiceClient::new(self.channel.clone());
        let response = client
            .get_node_info(tonic::Request::new(GetNodeInfoRequest {}))
            .await
            .map_err(|e| SignerError::MetadataLookup(format!("failed to get node info: {}", e)))?;

        let default_node_info = response
            .into_inner()
            .default_node_info
            .ok_or_else(|| SignerError::MetadataLookup("no default node info in response".to_string()))?;

        Ok(default_node_info.network)
    }
}

/// gRPC `NotFound` means the account does not exist yet; anything else is a lookup failure
fn account_status_error(status: Status, address: &str) -> SignerError {
    if status.code() == Code::NotFound {
        SignerError::AccountNotFound {
            address: address.to_string(),
        }
    } else {
        SignerError::MetadataLookup(format!("failed to query account: {}", status))
    }
}

#[async_trait]
impl SignerMetadataSource for GrpcMetadataSource {
    async fn signer_metadata(&self, address: &str) -> Result<SignerMetadata> {
        let (account_number, sequence) = self.query_account(address).await?;
        let chain_id = self.query_chain_id().await?;

        log::info!(
            "Signer {} on {}: account_number={}, sequence={}",
            address,
            chain_id,
            account_number,
            sequence
        );

        Ok(SignerMetadata {
            chain_id,
            account_number,
            sequence,
        })
    }
}
