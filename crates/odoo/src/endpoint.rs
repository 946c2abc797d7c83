//! Remote endpoint addressing.

use std::fmt;

use url::Url;

use crate::error::{Error, Result};

/// Path of the Odoo JSON-RPC external API, relative to the base URL.
pub const JSONRPC_PATH: &str = "/jsonrpc";

/// One of the three Odoo external API services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `common`: version and authentication.
    Common,
    /// `object`: `execute_kw` against business models.
    Object,
    /// `db`: database management, unauthenticated.
    Db,
}

impl Endpoint {
    pub fn service(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Object => "object",
            Self::Db => "db",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service())
    }
}

/// Where the Odoo server lives. Derived once from the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTarget {
    host: String,
    port: u16,
    base_path: String,
    secure: bool,
}

impl EndpointTarget {
    /// Parse a base URL such as `https://erp.internal:8443` or
    /// `http://localhost:8069/odoo`.
    ///
    /// # Errors
    ///
    /// Fails when the URL does not parse, has no host, or uses a scheme other
    /// than `http`/`https`.
    pub fn parse(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url.trim())?;

        let secure = match url.scheme() {
            "https" => true,
            "http" => false,
            other => {
                return Err(Error::message(format!(
                    "unsupported URL scheme '{other}' in {base_url} (expected http or https)"
                )));
            },
        };

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::message(format!("no host in URL {base_url}")))?
            .to_string();

        let port = url
            .port_or_known_default()
            .unwrap_or(if secure { 443 } else { 80 });

        Ok(Self {
            host,
            port,
            base_path: url.path().trim_end_matches('/').to_string(),
            secure,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path prefix under which Odoo is mounted; empty at the root.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Absolute URL that every service call is posted to.
    pub fn rpc_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!(
            "{scheme}://{}:{}{}{JSONRPC_PATH}",
            self.host, self.port, self.base_path
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn default_local_target() {
        let target = EndpointTarget::parse("http://localhost:8069").unwrap();
        assert_eq!(target.host(), "localhost");
        assert_eq!(target.port(), 8069);
        assert!(!target.is_secure());
        assert_eq!(target.base_path(), "");
        assert_eq!(target.rpc_url(), "http://localhost:8069/jsonrpc");
    }

    #[test]
    fn https_without_port_uses_443() {
        let target = EndpointTarget::parse("https://erp.example.com/").unwrap();
        assert!(target.is_secure());
        assert_eq!(target.port(), 443);
        assert_eq!(target.rpc_url(), "https://erp.example.com:443/jsonrpc");
    }

    #[test]
    fn keeps_mount_path() {
        let target = EndpointTarget::parse("http://10.0.0.5:8080/odoo/").unwrap();
        assert_eq!(target.base_path(), "/odoo");
        assert_eq!(target.rpc_url(), "http://10.0.0.5:8080/odoo/jsonrpc");
    }

    #[test]
    fn rejects_unknown_scheme() {
        let err = EndpointTarget::parse("ftp://localhost").unwrap_err();
        assert!(err.to_string().contains("unsupported URL scheme"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            EndpointTarget::parse("not a url"),
            Err(Error::UrlParse(_))
        ));
    }

    #[test]
    fn service_names() {
        assert_eq!(Endpoint::Common.service(), "common");
        assert_eq!(Endpoint::Object.service(), "object");
        assert_eq!(Endpoint::Db.to_string(), "db");
    }
}
