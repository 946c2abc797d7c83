use std::sync::Arc;

use {
    anyhow::Result,
    odoo_mcp_config::{DEFAULT_DATABASE, OdooMcpConfig},
    odoo_mcp_odoo::{Credentials, OdooClient},
    odoo_mcp_server::{McpServer, ToolDispatcher},
    tracing::info,
};

fn connect(config: &OdooMcpConfig) -> Result<OdooClient> {
    let odoo = &config.odoo;
    let credentials = Credentials::new(odoo.username.clone(), odoo.password.clone());
    Ok(OdooClient::connect(
        &odoo.url,
        credentials,
        odoo.insecure_skip_verify,
    )?)
}

pub async fn serve(config: &OdooMcpConfig) -> Result<()> {
    let client = Arc::new(connect(config)?);
    let default_database = config.odoo.default_database().map(String::from);
    if let Some(db) = &default_database {
        info!(database = %db, "tools default to configured database");
    }

    let dispatcher = ToolDispatcher::new(client, default_database);
    let server = Arc::new(McpServer::new(dispatcher, config.server.name.clone()));
    odoo_mcp_server::serve_stdio(server).await?;
    Ok(())
}

pub async fn databases(config: &OdooMcpConfig) -> Result<()> {
    let client = connect(config)?;
    for name in client.list_databases().await? {
        println!("{name}");
    }
    Ok(())
}

pub async fn check(config: &OdooMcpConfig, database: Option<&str>) -> Result<()> {
    let database = database
        .or_else(|| config.odoo.default_database())
        .unwrap_or(DEFAULT_DATABASE);
    let client = connect(config)?;
    let uid = client.authenticate(database).await?;
    println!(
        "{}",
        serde_json::json!({
            "url": config.odoo.url,
            "database": database,
            "username": client.username(),
            "uid": uid,
        })
    );
    Ok(())
}
