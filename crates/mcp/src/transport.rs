//! Stdio transport: newline-delimited JSON-RPC on a reader/writer pair.

use std::sync::Arc;

use {
    serde_json::Value,
    tokio::{
        io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
        sync::mpsc,
        task::JoinSet,
    },
    tracing::{debug, info, warn},
};

use crate::{
    error::Result,
    server::McpServer,
    types::{JsonRpcError, JsonRpcResponse},
};

/// Serve MCP on the process's stdin/stdout until stdin closes.
///
/// # Errors
///
/// Fails if stdin cannot be read or stdout cannot be written.
pub async fn serve_stdio(server: Arc<McpServer>) -> Result<()> {
    serve(server, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Read one message per line from `reader`, answer each on `writer`.
///
/// Requests are handled concurrently, so responses may arrive out of order;
/// clients match them by id. Returns once `reader` reaches EOF and every
/// in-flight request has been answered.
///
/// # Errors
///
/// Fails on read or write errors.
pub async fn serve<R, W>(server: Arc<McpServer>, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
    let writer_task = tokio::spawn(write_responses(writer, rx));

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut in_flight = JoinSet::new();

    info!("MCP server listening on stdio");

    let read_result = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                debug!("input closed");
                break Ok(());
            },
            Ok(_) => {},
            Err(e) => break Err(e),
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!(error = %e, "discarding line that is not valid UTF-8");
                let response = JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::new(JsonRpcError::PARSE_ERROR, format!("Parse error: {e}")),
                );
                if tx.send(response).is_err() {
                    debug!("response writer closed, dropping parse error");
                }
                continue;
            },
        };
        if line.is_empty() {
            continue;
        }

        let message = line.to_string();
        let server = Arc::clone(&server);
        let tx = tx.clone();
        in_flight.spawn(async move {
            if let Some(response) = server.handle_line(&message).await
                && tx.send(response).is_err()
            {
                debug!("response writer closed, dropping response");
            }
        });

        // Reap finished handlers so the set does not grow unbounded.
        while let Some(joined) = in_flight.try_join_next() {
            if let Err(e) = joined {
                warn!(error = %e, "request handler panicked");
            }
        }
    };

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "request handler panicked");
        }
    }
    drop(tx);

    let write_result = match writer_task.await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "response writer panicked");
            Ok(())
        },
    };

    read_result?;
    write_result?;
    info!("MCP server stopped");
    Ok(())
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut payload = serde_json::to_string(&response)?;
        payload.push('\n');
        writer.write_all(payload.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        odoo_mcp_odoo::{
            Credentials, InMemorySessionStore, OdooClient, RpcChannel, testing::RecordingChannel,
        },
        secrecy::Secret,
        tokio::io::AsyncReadExt,
    };

    use {super::*, crate::dispatcher::ToolDispatcher};

    fn server() -> Arc<McpServer> {
        let client = OdooClient::new(
            Arc::new(RecordingChannel::new()) as Arc<dyn RpcChannel>,
            Arc::new(InMemorySessionStore::new()),
            Credentials::new("admin", Secret::new("admin".to_string())),
        );
        Arc::new(McpServer::new(
            ToolDispatcher::new(Arc::new(client), None),
            "mcp-odoo-server",
        ))
    }

    async fn run(input: impl AsRef<[u8]>) -> String {
        let (writer, mut output) = tokio::io::duplex(64 * 1024);
        serve(server(), input.as_ref(), writer).await.unwrap();
        let mut text = String::new();
        output.read_to_string(&mut text).await.unwrap();
        text
    }

    #[tokio::test]
    async fn answers_each_request_line_and_skips_notifications() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            "\n",
        );
        let text = run(input).await;
        let mut ids: Vec<i64> = text
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["id"].as_i64().unwrap())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn empty_input_stops_cleanly() {
        assert!(run("").await.is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_line_gets_parse_error_and_serving_continues() {
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#);
        input.push(b'\n');

        let text = run(input).await;
        let responses: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 3);

        let parse_errors: Vec<&Value> = responses
            .iter()
            .filter(|r| r["error"]["code"] == JsonRpcError::PARSE_ERROR)
            .collect();
        assert_eq!(parse_errors.len(), 1);
        assert!(parse_errors[0]["id"].is_null());

        let mut ids: Vec<i64> = responses.iter().filter_map(|r| r["id"].as_i64()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn last_line_without_newline_is_answered() {
        let text = run(r#"{"jsonrpc":"2.0","id":5,"method":"ping"}"#).await;
        let resp: Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(resp["id"], 5);
    }
}
