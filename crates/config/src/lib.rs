//! Configuration loading for the Odoo MCP bridge.
//!
//! Config files: `odoo-mcp.toml`, `odoo-mcp.yaml` or `odoo-mcp.json`,
//! searched in `./` then `~/.config/odoo-mcp/`. String values support
//! `${ENV_VAR}` substitution, and `ODOO_*` environment variables override
//! whatever the file says.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{
        apply_env_overrides, config_dir, discover_and_load, find_config_file, load_config,
    },
    schema::{DEFAULT_DATABASE, OdooConfig, OdooMcpConfig, ServerConfig},
};
