//! RPC channel: one call against one of the Odoo services.
//!
//! `HttpRpcChannel` speaks the Odoo JSON-RPC external API: every service call
//! is a `call` request posted to `{base}/jsonrpc` naming the service, the
//! service method and its positional arguments.

use std::sync::atomic::{AtomicU64, Ordering};

use {
    async_trait::async_trait,
    reqwest::Client,
    serde::{Deserialize, Serialize},
    serde_json::Value,
    tracing::{debug, info, warn},
};

use crate::{
    endpoint::{Endpoint, EndpointTarget},
    error::{Context, Result, TransportError},
};

/// A single awaitable call against an Odoo service.
///
/// `HttpRpcChannel` is the production implementation; tests substitute a
/// recording fake.
#[async_trait]
pub trait RpcChannel: Send + Sync {
    async fn call(
        &self,
        endpoint: Endpoint,
        method: &str,
        args: Vec<Value>,
    ) -> std::result::Result<Value, TransportError>;
}

#[derive(Debug, Serialize)]
struct CallRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: CallParams<'a>,
    id: u64,
}

#[derive(Debug, Serialize)]
struct CallParams<'a> {
    service: &'static str,
    method: &'a str,
    args: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct CallResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<CallFault>,
}

#[derive(Debug, Deserialize)]
struct CallFault {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<CallFaultData>,
}

#[derive(Debug, Deserialize)]
struct CallFaultData {
    #[serde(default)]
    message: Option<String>,
}

impl CallFault {
    /// The server-side exception text when present, the generic envelope
    /// message otherwise.
    fn into_transport_error(self) -> TransportError {
        let message = self
            .data
            .and_then(|d| d.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(self.message);
        TransportError::Fault {
            code: self.code,
            message,
        }
    }
}

/// JSON-RPC channel over HTTP(S).
pub struct HttpRpcChannel {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpRpcChannel {
    /// Build a channel for `target`.
    ///
    /// With `insecure_skip_verify` the HTTPS client accepts certificates that
    /// fail chain validation, which self-signed internal deployments need.
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(target: EndpointTarget, insecure_skip_verify: bool) -> Result<Self> {
        if target.is_secure() && insecure_skip_verify {
            info!(
                host = %target.host(),
                "TLS certificate verification disabled for Odoo endpoint"
            );
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(insecure_skip_verify)
            .build()
            .context("failed to build HTTP client for Odoo RPC channel")?;

        Ok(Self {
            client,
            url: target.rpc_url(),
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl RpcChannel for HttpRpcChannel {
    async fn call(
        &self,
        endpoint: Endpoint,
        method: &str,
        args: Vec<Value>,
    ) -> std::result::Result<Value, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let body = CallRequest {
            jsonrpc: "2.0",
            method: "call",
            params: CallParams {
                service: endpoint.service(),
                method,
                args,
            },
            id,
        };

        // args carry the password; only the routing is logged.
        debug!(service = %endpoint, method = %method, id, "client -> odoo");

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|source| TransportError::Http {
                url: self.url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(service = %endpoint, method = %method, status = status.as_u16(), "odoo returned HTTP error");
            return Err(TransportError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let parsed: CallResponse = resp.json().await.map_err(|e| TransportError::Malformed {
            url: self.url.clone(),
            message: e.to_string(),
        })?;

        if let Some(fault) = parsed.error {
            let err = fault.into_transport_error();
            debug!(service = %endpoint, method = %method, id, error = %err, "odoo fault");
            return Err(err);
        }

        Ok(parsed.result.unwrap_or(Value::Null))
    }
}
