/// Signer metadata over the Cosmos REST gateway (LCD).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;

use crate::chain::account_types::account_info_from_json;
use crate::chain::metadata::{SignerMetadata, SignerMetadataSource};
use crate::error::{Result, SignerError};

fn http_error(e: reqwest::Error) -> SignerError {
    SignerError::MetadataLookup(format!("REST request failed: {}", e))
}

/// Signer metadata from `/cosmos/auth` and `/cosmos/base/tendermint` REST routes
#[derive(Debug, Clone)]
pub struct RestMetadataSource {
    http: HttpClient,
    base_url: String,
    chain_id: Option<String>,
}

impl RestMetadataSource {
    pub fn new(base_url: &str, request_timeout: u64, chain_id: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .map_err(http_error)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            chain_id,
        })
    }

    async fn get_json(&self, path: &str) -> Result<(StatusCode, Value)> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {}", url);

        let response = self.http.get(&url).send().await.map_err(http_error)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok((status, Value::Null));
        }
        if !status.is_success() {
            return Err(SignerError::MetadataLookup(format!(
                "GET {} returned {}",
                url, status
            )));
        }

        let body = response.json::<Value>().await.map_err(http_error)?;
        Ok((status, body))
    }

    async fn query_chain_id(&self) -> Result<String> {
        if let Some(chain_id) = &self.chain_id {
            return Ok(chain_id.clone());
        }

        let (status, body) = self
            .get_json("/cosmos/base/tendermint/v1beta1/node_info")
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Err(SignerError::MetadataLookup(
                "node info route not found".to_string(),
            ));
        }

        chain_id_from_node_info(&body)
    }
}

fn chain_id_from_node_info(body: &Value) -> Result<String> {
    body.get("default_node_info")
        .and_then(|info| info.get("network"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| SignerError::MetadataLookup("no network in node info".to_string()))
}

#[async_trait]
impl SignerMetadataSource for RestMetadataSource {
    async fn signer_metadata(&self, address: &str) -> Result<SignerMetadata> {
        let (status, body) = self
            .get_json(&format!("/cosmos/auth/v1beta1/accounts/{}", address))
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Err(SignerError::AccountNotFound {
                address: address.to_string(),
            });
        }

        let account = body.get("account").ok_or_else(|| {
            SignerError::MetadataLookup("no account in auth response".to_string())
        })?;
        let info = account_info_from_json(account)?;
        let chain_id = self.query_chain_id().await?;

        log::info!(
            "Signer {} on {}: account_number={}, sequence={}",
            address,
            chain_id,
            info.account_number,
            info.sequence
        );

        Ok(SignerMetadata {
            chain_id,
            account_number: info.account_number,
            sequence: info.sequence,
        })
    }
}
