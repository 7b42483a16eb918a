use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AgencyError, AgencyResult};

/// EIP-1193 "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// Source of wallet accounts (MetaMask or anything speaking its protocol).
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet to expose its accounts; may prompt the user.
    async fn request_accounts(&self) -> AgencyResult<Vec<String>>;

    /// Account already exposed to this application, without prompting.
    async fn selected_address(&self) -> AgencyResult<Option<String>>;
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Wallet reached over Ethereum JSON-RPC (`eth_requestAccounts`,
/// `eth_accounts`).
pub struct JsonRpcWalletProvider {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcWalletProvider {
    pub fn new(url: impl Into<String>) -> AgencyResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AgencyError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call_accounts(&self, method: &str) -> AgencyResult<Vec<String>> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params: Vec::new(),
        };
        debug!(method, url = %self.url, "Wallet RPC call");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgencyError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(AgencyError::HttpError {
                status,
                message: format!("Wallet endpoint answered {}", status),
            });
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| AgencyError::ResponseDecode(e.to_string()))?;

        if let Some(error) = body.error {
            warn!(code = error.code, message = %error.message, "Wallet RPC error");
            return Err(if error.code == USER_REJECTED_CODE {
                AgencyError::WalletRejected(error.message)
            } else {
                AgencyError::WalletRpc {
                    code: error.code,
                    message: error.message,
                }
            });
        }

        let result = body.result.unwrap_or(serde_json::Value::Array(Vec::new()));
        serde_json::from_value(result).map_err(|e| AgencyError::ResponseDecode(e.to_string()))
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWalletProvider {
    async fn request_accounts(&self) -> AgencyResult<Vec<String>> {
        self.call_accounts("eth_requestAccounts").await
    }

    async fn selected_address(&self) -> AgencyResult<Option<String>> {
        Ok(self.call_accounts("eth_accounts").await?.into_iter().next())
    }
}
