use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::OdooMcpConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "odoo-mcp.toml",
    "odoo-mcp.yaml",
    "odoo-mcp.yml",
    "odoo-mcp.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<OdooMcpConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./odoo-mcp.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/odoo-mcp/odoo-mcp.{toml,yaml,yml,json}` (user-global)
///
/// Returns `OdooMcpConfig::default()` if no config file is found or the file
/// cannot be parsed.
pub fn discover_and_load() -> OdooMcpConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    OdooMcpConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/odoo-mcp/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "odoo-mcp").map(|d| d.config_dir().to_path_buf())
}

/// Overlay `ODOO_*` environment variables onto `config`.
///
/// Recognised: `ODOO_URL`, `ODOO_USERNAME`, `ODOO_PASSWORD`, `ODOO_DATABASE`
/// (or `ODOO_DB`), `ODOO_INSECURE_SKIP_VERIFY`. Empty values are ignored.
pub fn apply_env_overrides(config: OdooMcpConfig) -> OdooMcpConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: OdooMcpConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> OdooMcpConfig {
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = var("ODOO_URL") {
        config.odoo.url = url;
    }
    if let Some(username) = var("ODOO_USERNAME") {
        config.odoo.username = username;
    }
    if let Some(password) = var("ODOO_PASSWORD") {
        config.odoo.password = Secret::new(password);
    }
    if let Some(database) = var("ODOO_DATABASE").or_else(|| var("ODOO_DB")) {
        config.odoo.database = Some(database);
    }
    if let Some(raw) = var("ODOO_INSECURE_SKIP_VERIFY") {
        match parse_bool(&raw) {
            Some(flag) => config.odoo.insecure_skip_verify = flag,
            None => warn!(value = %raw, "ignoring unrecognised ODOO_INSECURE_SKIP_VERIFY"),
        }
    }

    config
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<OdooMcpConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn loads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odoo-mcp.toml");
        std::fs::write(
            &path,
            "[odoo]\nurl = \"https://erp.internal:8443\"\nusername = \"bot\"\ninsecure_skip_verify = false\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.odoo.url, "https://erp.internal:8443");
        assert_eq!(cfg.odoo.username, "bot");
        assert!(!cfg.odoo.insecure_skip_verify);
    }

    #[test]
    fn loads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("odoo-mcp.yaml");
        std::fs::write(&yaml, "odoo:\n  database: acme\n").unwrap();
        assert_eq!(
            load_config(&yaml).unwrap().odoo.database.as_deref(),
            Some("acme")
        );

        let json = dir.path().join("odoo-mcp.json");
        std::fs::write(&json, r#"{"server": {"name": "erp-bridge"}}"#).unwrap();
        assert_eq!(load_config(&json).unwrap().server.name, "erp-bridge");
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odoo-mcp.ini");
        std::fs::write(&path, "").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let cfg = apply_env_overrides_with(
            OdooMcpConfig::default(),
            env(&[
                ("ODOO_URL", "https://erp.example.com"),
                ("ODOO_USERNAME", "integration"),
                ("ODOO_PASSWORD", "s3cret"),
                ("ODOO_DB", "acme"),
                ("ODOO_INSECURE_SKIP_VERIFY", "false"),
            ]),
        );
        assert_eq!(cfg.odoo.url, "https://erp.example.com");
        assert_eq!(cfg.odoo.username, "integration");
        assert_eq!(cfg.odoo.password.expose_secret(), "s3cret");
        assert_eq!(cfg.odoo.database.as_deref(), Some("acme"));
        assert!(!cfg.odoo.insecure_skip_verify);
    }

    #[test]
    fn database_takes_precedence_over_db_alias() {
        let cfg = apply_env_overrides_with(
            OdooMcpConfig::default(),
            env(&[("ODOO_DATABASE", "primary"), ("ODOO_DB", "alias")]),
        );
        assert_eq!(cfg.odoo.database.as_deref(), Some("primary"));
    }

    #[test]
    fn empty_or_invalid_values_are_ignored() {
        let cfg = apply_env_overrides_with(
            OdooMcpConfig::default(),
            env(&[("ODOO_URL", "  "), ("ODOO_INSECURE_SKIP_VERIFY", "maybe")]),
        );
        assert_eq!(cfg.odoo.url, "http://localhost:8069");
        assert!(cfg.odoo.insecure_skip_verify);
    }
}
