//! NeoNS JSON-RPC client.
//!
//! # Responsibilities
//! - Call `resolve` on the NeoNS contract through `invokefunction`
//! - Decode the returned record into a destination URL
//! - Fold every failure into `Resolution::Unresolved`
//!
//! One request per resolution. No retries and no caching.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio::time::timeout;
use url::Url;

use crate::config::NodeConfig;
use crate::observability::metrics;
use crate::resolver::domain::{canonical_domain, decode_target, stack_value};
use crate::resolver::types::{
    ContractParameter, DomainResolver, InvokeFunctionRequest, InvokeResult, Resolution,
    ResolverError, ResolverResult, RpcResponse,
};

/// NeoNS contract operation used for lookups.
const RESOLVE_OPERATION: &str = "resolve";

/// JSON-RPC client for the NeoNS contract.
#[derive(Clone)]
pub struct NeoRpcClient {
    http: reqwest::Client,
    rpc_url: String,
    contract_hash: String,
    record_type: u32,
    timeout_secs: Option<u64>,
}

impl NeoRpcClient {
    /// Create a new client from node configuration.
    pub fn new(config: &NodeConfig) -> ResolverResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ResolverError::Http(e.to_string()))?;

        Ok(Self {
            http,
            rpc_url: config.rpc_url.clone(),
            contract_hash: config.contract_hash.clone(),
            record_type: config.record_type,
            timeout_secs: config.rpc_timeout_secs,
        })
    }

    /// Invoke `resolve(domain, record_type)` and return the raw result.
    pub async fn invoke_resolve(&self, domain: &str) -> ResolverResult<InvokeResult> {
        let body = InvokeFunctionRequest::new(
            &self.contract_hash,
            RESOLVE_OPERATION,
            vec![
                ContractParameter::String(domain.to_string()),
                ContractParameter::Integer(self.record_type),
            ],
        );

        let fut = self.send(&body);
        let response = match self.timeout_secs {
            Some(secs) => timeout(Duration::from_secs(secs), fut)
                .await
                .map_err(|_| ResolverError::Timeout(secs))??,
            None => fut.await?,
        };

        if let Some(error) = response.error {
            return Err(ResolverError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        response.result.ok_or(ResolverError::MissingValue)
    }

    async fn send(&self, body: &InvokeFunctionRequest) -> ResolverResult<RpcResponse> {
        let response = self
            .http
            .post(&self.rpc_url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ResolverError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::Status(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ResolverError::Http(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| ResolverError::MalformedResponse(e.to_string()))
    }

    /// Resolve a canonical domain to its destination URL.
    pub async fn lookup(&self, domain: &str) -> ResolverResult<Url> {
        let result = self.invoke_resolve(domain).await?;
        decode_target(stack_value(&result)?)
    }
}

#[async_trait]
impl DomainResolver for NeoRpcClient {
    async fn resolve(&self, request_url: &str) -> Resolution {
        let domain = canonical_domain(request_url);
        tracing::debug!(%domain, "Resolving domain");

        match self.lookup(&domain).await {
            Ok(url) => {
                tracing::debug!(%domain, destination = %url, "Domain resolved");
                metrics::record_resolution(true);
                Resolution::Resolved(url)
            }
            Err(e) => {
                tracing::info!(%domain, error = %e, "Error resolving domain");
                metrics::record_resolution(false);
                Resolution::Unresolved
            }
        }
    }
}

impl std::fmt::Debug for NeoRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeoRpcClient")
            .field("rpc_url", &self.rpc_url)
            .field("contract_hash", &self.contract_hash)
            .field("record_type", &self.record_type)
            .finish()
    }
}
