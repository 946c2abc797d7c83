//! Odoo session client: authentication and `execute_kw` dispatch.

use std::{fmt, sync::Arc};

use {
    secrecy::{ExposeSecret, Secret},
    serde_json::{Map, Value, json},
    tracing::{debug, info, warn},
};

use crate::{
    channel::{HttpRpcChannel, RpcChannel},
    endpoint::{Endpoint, EndpointTarget},
    error::{Error, Result},
    session::{InMemorySessionStore, SessionStore, Uid},
    value::is_truthy,
};

/// Login used for every database on the server.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: Secret<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: Secret<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Authenticated access to one Odoo server, any number of databases.
///
/// A uid is obtained lazily per database on first use and cached for the
/// lifetime of the session store. A uid that the server later rejects is not
/// refreshed; the rejection surfaces as [`Error::RemoteCall`].
pub struct OdooClient {
    channel: Arc<dyn RpcChannel>,
    sessions: Arc<dyn SessionStore>,
    credentials: Credentials,
}

impl OdooClient {
    pub fn new(
        channel: Arc<dyn RpcChannel>,
        sessions: Arc<dyn SessionStore>,
        credentials: Credentials,
    ) -> Self {
        Self {
            channel,
            sessions,
            credentials,
        }
    }

    /// Build a client for the server at `base_url` with a fresh in-memory
    /// session store.
    ///
    /// # Errors
    ///
    /// Fails if the URL is invalid or the HTTP client cannot be built.
    pub fn connect(
        base_url: &str,
        credentials: Credentials,
        insecure_skip_verify: bool,
    ) -> Result<Self> {
        let target = EndpointTarget::parse(base_url)?;
        info!(
            host = %target.host(),
            port = target.port(),
            secure = target.is_secure(),
            username = %credentials.username(),
            "configured Odoo endpoint"
        );
        let channel = HttpRpcChannel::new(target, insecure_skip_verify)?;
        Ok(Self::new(
            Arc::new(channel),
            Arc::new(InMemorySessionStore::new()),
            credentials,
        ))
    }

    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    /// Return the uid for `database`, authenticating on first use.
    ///
    /// # Errors
    ///
    /// [`Error::Authentication`] when the common endpoint cannot be reached or
    /// rejects the credentials. Nothing is cached on failure.
    pub async fn authenticate(&self, database: &str) -> Result<Uid> {
        if let Some(uid) = self.sessions.get(database).await {
            return Ok(uid);
        }

        let args = vec![
            json!(database),
            json!(self.credentials.username()),
            json!(self.credentials.password()),
            json!({}),
        ];

        let result = self
            .channel
            .call(Endpoint::Common, "authenticate", args)
            .await
            .map_err(|e| {
                warn!(database = %database, error = %e, "odoo authentication request failed");
                Error::authentication(database, e.to_string())
            })?;

        if !is_truthy(&result) {
            warn!(database = %database, username = %self.credentials.username(), "odoo rejected credentials");
            return Err(Error::authentication(database, "Invalid credentials"));
        }

        let uid = result.as_i64().ok_or_else(|| {
            Error::authentication(database, format!("unexpected authentication result: {result}"))
        })?;

        self.sessions.put(database, uid).await;
        info!(database = %database, uid, "authenticated with odoo");
        Ok(uid)
    }

    /// Call `model.method(*args, **kwargs)` on `database` through `execute_kw`.
    ///
    /// # Errors
    ///
    /// [`Error::Authentication`] if no uid can be obtained, otherwise
    /// [`Error::RemoteCall`] carrying the server's message.
    pub async fn invoke(
        &self,
        database: &str,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value> {
        let uid = self.authenticate(database).await?;

        debug!(database = %database, model = %model, method = %method, "execute_kw");

        let call_args = vec![
            json!(database),
            json!(uid),
            json!(self.credentials.password()),
            json!(model),
            json!(method),
            Value::Array(args),
            Value::Object(kwargs),
        ];

        self.channel
            .call(Endpoint::Object, "execute_kw", call_args)
            .await
            .map_err(|e| {
                warn!(database = %database, model = %model, method = %method, error = %e, "execute_kw failed");
                Error::remote_call(model, method, &e)
            })
    }

    /// List the databases hosted on the server. Needs no authentication.
    ///
    /// # Errors
    ///
    /// [`Error::DatabaseList`] on transport failure, or when database listing
    /// is disabled on the server.
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        let result = self
            .channel
            .call(Endpoint::Db, "list", Vec::new())
            .await
            .map_err(|e| {
                warn!(error = %e, "odoo database listing failed");
                Error::DatabaseList {
                    message: e.to_string(),
                }
            })?;

        serde_json::from_value(result).map_err(|e| Error::DatabaseList {
            message: format!("unexpected response: {e}"),
        })
    }
}
