#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Drive a full MCP session over an in-memory pipe.

use std::sync::Arc;

use {
    odoo_mcp_odoo::{
        Credentials, Endpoint, InMemorySessionStore, OdooClient, RpcChannel,
        testing::RecordingChannel,
    },
    odoo_mcp_server::{McpServer, ToolDispatcher, serve},
    secrecy::Secret,
    serde_json::{Value, json},
    tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines},
};

struct Session {
    input: DuplexStream,
    output: Lines<BufReader<DuplexStream>>,
    server: tokio::task::JoinHandle<odoo_mcp_server::Result<()>>,
}

impl Session {
    fn start(channel: &Arc<RecordingChannel>, default_database: Option<&str>) -> Self {
        let client = OdooClient::new(
            Arc::clone(channel) as Arc<dyn RpcChannel>,
            Arc::new(InMemorySessionStore::new()),
            Credentials::new("admin", Secret::new("admin".to_string())),
        );
        let server = Arc::new(McpServer::new(
            ToolDispatcher::new(Arc::new(client), default_database.map(String::from)),
            "mcp-odoo-server",
        ));

        let (input, server_in) = tokio::io::duplex(64 * 1024);
        let (server_out, output) = tokio::io::duplex(64 * 1024);
        let server = tokio::spawn(serve(server, server_in, server_out));

        Self {
            input,
            output: BufReader::new(output).lines(),
            server,
        }
    }

    async fn send(&mut self, message: Value) {
        let mut line = message.to_string();
        line.push('\n');
        self.input.write_all(line.as_bytes()).await.unwrap();
    }

    /// Send a request and wait for its response. Requests are issued one at a
    /// time, so the next line is always the answer.
    async fn request(&mut self, message: Value) -> Value {
        self.send(message).await;
        let line = self.output.next_line().await.unwrap().unwrap();
        serde_json::from_str(&line).unwrap()
    }

    async fn close(self) {
        drop(self.input);
        self.server.await.unwrap().unwrap();
    }
}

fn call(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments},
    })
}

#[tokio::test]
async fn handshake_list_and_call() {
    let channel = Arc::new(RecordingChannel::new());
    channel
        .reply(json!(7))
        .reply(json!([{"id": 1, "name": "Azure Interior"}]))
        .reply(json!(2));
    let mut session = Session::start(&channel, None);

    let init = session
        .request(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "1.0"}
            }
        }))
        .await;
    assert_eq!(init["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(init["result"]["serverInfo"]["name"], "mcp-odoo-server");

    session
        .send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .await;

    let list = session
        .request(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))
        .await;
    let names: Vec<&str> = list["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"odoo_search_read"));
    assert!(names.contains(&"odoo_list_databases"));

    let read = session
        .request(call(
            3,
            "odoo_search_read",
            json!({"database": "acme", "model": "res.partner", "fields": ["name"], "limit": 1}),
        ))
        .await;
    assert_eq!(read["id"], 3);
    assert_eq!(read["result"]["isError"], false);
    let records: Value =
        serde_json::from_str(read["result"]["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(records[0]["name"], "Azure Interior");

    let count = session
        .request(call(
            4,
            "odoo_search_count",
            json!({"database": "acme", "model": "res.partner"}),
        ))
        .await;
    assert_eq!(count["result"]["content"][0]["text"], "Count: 2");

    session.close().await;

    // One login for both calls on the same database.
    assert_eq!(channel.calls_to(Endpoint::Common), 1);
    assert_eq!(channel.calls_to(Endpoint::Object), 2);
}

#[tokio::test]
async fn bad_credentials_surface_as_tool_error() {
    let channel = Arc::new(RecordingChannel::new());
    channel.reply(json!(false));
    let mut session = Session::start(&channel, Some("acme"));

    let resp = session
        .request(call(1, "odoo_search", json!({"model": "res.partner"})))
        .await;
    assert!(resp.get("error").is_none());
    assert_eq!(resp["result"]["isError"], true);
    assert_eq!(
        resp["result"]["content"][0]["text"],
        "Error: Authentication failed: Invalid credentials"
    );

    session.close().await;
    assert_eq!(channel.calls_to(Endpoint::Object), 0);
}

#[tokio::test]
async fn protocol_errors_keep_the_session_alive() {
    let channel = Arc::new(RecordingChannel::new());
    let mut session = Session::start(&channel, None);

    session.input.write_all(b"not json\n").await.unwrap();
    let line = session.output.next_line().await.unwrap().unwrap();
    let parse: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(parse["error"]["code"], -32700);

    let unknown = session
        .request(json!({"jsonrpc": "2.0", "id": 9, "method": "prompts/list"}))
        .await;
    assert_eq!(unknown["error"]["code"], -32601);

    let ping = session
        .request(json!({"jsonrpc": "2.0", "id": 10, "method": "ping"}))
        .await;
    assert_eq!(ping["result"], json!({}));

    session.close().await;
}
