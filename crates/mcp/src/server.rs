//! MCP method handling: one JSON-RPC line in, at most one response out.

use {
    serde::de::DeserializeOwned,
    serde_json::Value,
    tracing::{debug, info, warn},
};

use crate::{
    dispatcher::ToolDispatcher,
    types::{
        InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
        PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS, ServerCapabilities, ServerInfo,
        ToolsCallParams, ToolsCapability, ToolsListResult,
    },
};

/// Server side of an MCP session.
pub struct McpServer {
    dispatcher: ToolDispatcher,
    server_info: ServerInfo,
}

impl McpServer {
    pub fn new(dispatcher: ToolDispatcher, name: impl Into<String>) -> Self {
        Self {
            dispatcher,
            server_info: ServerInfo {
                name: name.into(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
        }
    }

    /// Handle one raw message. Notifications produce no response.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unparseable message");
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::new(JsonRpcError::PARSE_ERROR, format!("Parse error: {e}")),
                ));
            },
        };

        let id = raw.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id,
                    JsonRpcError::new(
                        JsonRpcError::INVALID_REQUEST,
                        format!("Invalid request: {e}"),
                    ),
                ));
            },
        };

        if request.is_notification() {
            debug!(method = %request.method, "notification");
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        Some(match self.handle_request(request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::failure(id, err),
        })
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Result<Value, JsonRpcError> {
        debug!(method = %request.method, "request");
        match request.method.as_str() {
            "initialize" => {
                let params: InitializeParams = params_or_default(request.params)?;
                to_value(self.initialize(params))
            },
            "ping" => Ok(Value::Object(serde_json::Map::new())),
            "tools/list" => to_value(ToolsListResult {
                tools: self.dispatcher.tools(),
            }),
            "tools/call" => {
                let params: ToolsCallParams = request
                    .params
                    .ok_or_else(|| {
                        JsonRpcError::new(JsonRpcError::INVALID_PARAMS, "Missing params")
                    })
                    .and_then(parse_params)?;
                let result = self.dispatcher.call(&params.name, params.arguments).await;
                to_value(result)
            },
            other => Err(JsonRpcError::new(
                JsonRpcError::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            )),
        }
    }

    fn initialize(&self, params: InitializeParams) -> InitializeResult {
        let protocol_version = params
            .protocol_version
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(&v.as_str()))
            .unwrap_or_else(|| PROTOCOL_VERSION.to_string());

        match &params.client_info {
            Some(client) => info!(
                client = %client.name,
                client_version = client.version.as_deref().unwrap_or("unknown"),
                protocol_version = %protocol_version,
                "MCP client initialized"
            ),
            None => info!(protocol_version = %protocol_version, "MCP client initialized"),
        }

        InitializeResult {
            protocol_version,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: self.server_info.clone(),
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(params).map_err(|e| {
        JsonRpcError::new(JsonRpcError::INVALID_PARAMS, format!("Invalid params: {e}"))
    })
}

fn params_or_default<T: DeserializeOwned + Default>(
    params: Option<Value>,
) -> Result<T, JsonRpcError> {
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        Some(p) => parse_params(p),
    }
}

fn to_value(value: impl serde::Serialize) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::new(JsonRpcError::INTERNAL_ERROR, e.to_string()))
}
