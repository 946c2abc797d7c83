use odoo_mcp_common::FromMessage;

/// Failure of a single exchange with the Odoo server.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    /// Fault reported by the server. Displays the remote message verbatim.
    #[error("{message}")]
    Fault { code: Option<i64>, message: String },
    #[error("malformed response from {url}: {message}")]
    Malformed { url: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad credentials, or the authentication endpoint could not be reached.
    #[error("Authentication failed: {message}")]
    Authentication { database: String, message: String },
    /// `execute_kw` failed in transport or was rejected by the server.
    #[error("Odoo API error: {message}")]
    RemoteCall {
        model: String,
        method: String,
        message: String,
    },
    #[error("Failed to list databases: {message}")]
    DatabaseList { message: String },
    /// The server answered, but not with the shape the operation returns.
    #[error("unexpected result from {model}.{method}: {message}")]
    InvalidResponse {
        model: String,
        method: String,
        message: String,
    },
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    pub(crate) fn authentication(database: &str, message: impl Into<String>) -> Self {
        Self::Authentication {
            database: database.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn remote_call(model: &str, method: &str, source: &TransportError) -> Self {
        Self::RemoteCall {
            model: model.to_string(),
            method: method.to_string(),
            message: source.to_string(),
        }
    }

    pub(crate) fn invalid_response(model: &str, method: &str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            model: model.to_string(),
            method: method.to_string(),
            message: message.into(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

odoo_mcp_common::impl_context!();
