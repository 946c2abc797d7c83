//! Config schema types.

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Database name assumed by single-database commands when none is configured.
pub const DEFAULT_DATABASE: &str = "odoo";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OdooMcpConfig {
    pub odoo: OdooConfig,
    pub server: ServerConfig,
}

/// Connection to the Odoo server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OdooConfig {
    /// Base URL (scheme, host, port and optional mount path).
    pub url: String,
    pub username: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: Secret<String>,
    /// Fixed database. When set, tools may omit `database` and use this one.
    pub database: Option<String>,
    /// Accept TLS certificates that fail chain validation. On by default so
    /// self-signed internal deployments work out of the box.
    pub insecure_skip_verify: bool,
}

impl Default for OdooConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8069".into(),
            username: "admin".into(),
            password: Secret::new("admin".into()),
            database: None,
            insecure_skip_verify: true,
        }
    }
}

impl OdooConfig {
    /// The fixed database, ignoring blank values.
    pub fn default_database(&self) -> Option<&str> {
        self.database
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// Identity reported to MCP clients during `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "mcp-odoo-server".into(),
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_dev_server() {
        let cfg = OdooMcpConfig::default();
        assert_eq!(cfg.odoo.url, "http://localhost:8069");
        assert_eq!(cfg.odoo.username, "admin");
        assert_eq!(cfg.odoo.password.expose_secret(), "admin");
        assert!(cfg.odoo.database.is_none());
        assert!(cfg.odoo.insecure_skip_verify);
        assert_eq!(cfg.server.name, "mcp-odoo-server");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: OdooMcpConfig = toml::from_str(
            r#"
            [odoo]
            url = "https://erp.internal"
            database = "acme"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.odoo.url, "https://erp.internal");
        assert_eq!(cfg.odoo.username, "admin");
        assert_eq!(cfg.odoo.default_database(), Some("acme"));
        assert!(cfg.odoo.insecure_skip_verify);
    }

    #[test]
    fn blank_database_is_no_database() {
        let cfg = OdooConfig {
            database: Some("  ".into()),
            ..OdooConfig::default()
        };
        assert_eq!(cfg.default_database(), None);
    }

    #[test]
    fn password_round_trips_through_serialization() {
        let cfg = OdooMcpConfig::default();
        let text = toml::to_string(&cfg).unwrap();
        assert!(text.contains("password = \"admin\""));
    }
}
