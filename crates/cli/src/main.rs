mod odoo_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    odoo_mcp_config::OdooMcpConfig,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "odoo-mcp", about = "MCP server for Odoo", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (default: ./odoo-mcp.toml, then ~/.config/odoo-mcp/).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Odoo base URL (overrides config and ODOO_URL).
    #[arg(long, global = true)]
    url: Option<String>,

    /// Odoo login (overrides config and ODOO_USERNAME).
    #[arg(long, global = true)]
    username: Option<String>,

    /// Fixed database; tools may then omit `database`.
    #[arg(long, global = true)]
    database: Option<String>,

    /// Accept invalid TLS certificates (true/false).
    #[arg(long, global = true, num_args = 0..=1, default_missing_value = "true")]
    insecure_skip_verify: Option<bool>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdio (default when no subcommand is provided).
    Serve,
    /// List the databases on the Odoo server.
    Databases,
    /// Authenticate against one database and print the uid.
    Check {
        /// Database to log into (default: configured database, else "odoo").
        #[arg(long = "db")]
        db: Option<String>,
    },
}

/// Logs go to stderr: stdout carries the protocol.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// File (or defaults), then `ODOO_*` environment, then command-line flags.
fn load_settings(cli: &Cli) -> anyhow::Result<OdooMcpConfig> {
    let config = match &cli.config {
        Some(path) => odoo_mcp_config::load_config(path)?,
        None => odoo_mcp_config::discover_and_load(),
    };
    let config = odoo_mcp_config::apply_env_overrides(config);
    Ok(apply_cli_overrides(config, cli))
}

fn apply_cli_overrides(mut config: OdooMcpConfig, cli: &Cli) -> OdooMcpConfig {
    if let Some(url) = &cli.url {
        config.odoo.url = url.clone();
    }
    if let Some(username) = &cli.username {
        config.odoo.username = username.clone();
    }
    if let Some(database) = &cli.database {
        config.odoo.database = Some(database.clone());
    }
    if let Some(flag) = cli.insecure_skip_verify {
        config.odoo.insecure_skip_verify = flag;
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "odoo-mcp starting");

    let config = load_settings(&cli)?;

    match cli.command {
        None | Some(Commands::Serve) => odoo_commands::serve(&config).await,
        Some(Commands::Databases) => odoo_commands::databases(&config).await,
        Some(Commands::Check { db }) => odoo_commands::check(&config, db.as_deref()).await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["odoo-mcp"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "info");
        assert!(cli.insecure_skip_verify.is_none());
    }

    #[test]
    fn bare_insecure_flag_means_true() {
        let cli = Cli::try_parse_from(["odoo-mcp", "serve", "--insecure-skip-verify"]).unwrap();
        assert_eq!(cli.insecure_skip_verify, Some(true));

        let cli = Cli::try_parse_from(["odoo-mcp", "--insecure-skip-verify=false"]).unwrap();
        assert_eq!(cli.insecure_skip_verify, Some(false));
    }

    #[test]
    fn check_takes_a_database() {
        let cli = Cli::try_parse_from(["odoo-mcp", "check", "--db", "acme"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Check { db: Some(ref d) }) if d == "acme"));
    }

    #[test]
    fn flags_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odoo-mcp.toml");
        std::fs::write(
            &path,
            "[odoo]\nurl = \"http://file:8069\"\nusername = \"file-user\"\ndatabase = \"file-db\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "odoo-mcp",
            "--url",
            "https://flag.example.com",
            "--database",
            "flag-db",
            "--insecure-skip-verify=false",
        ])
        .unwrap();
        let config = apply_cli_overrides(odoo_mcp_config::load_config(&path).unwrap(), &cli);

        assert_eq!(config.odoo.url, "https://flag.example.com");
        assert_eq!(config.odoo.username, "file-user");
        assert_eq!(config.odoo.database.as_deref(), Some("flag-db"));
        assert!(!config.odoo.insecure_skip_verify);
    }
}
