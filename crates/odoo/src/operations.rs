//! Named record operations on top of [`OdooClient::invoke`].
//!
//! Each operation fixes the model method and the shape of its positional and
//! keyword arguments. Omitted keys are omitted on the wire too: Odoo treats a
//! missing `order` as "server default ordering" and a missing `fields` as
//! "all fields".

use {
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    serde_json::{Map, Value, json},
};

use crate::{
    client::OdooClient,
    error::{Error, Result},
    value::is_truthy,
};

/// Database id of a record.
pub type RecordId = i64;

/// Page size used when the caller does not give one.
pub const DEFAULT_LIMIT: u64 = 100;

/// Odoo search domain. Clauses are passed through untouched; an empty domain
/// matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(Vec<Value>);

impl Domain {
    pub fn new(clauses: Vec<Value>) -> Self {
        Self(clauses)
    }

    /// The empty domain.
    pub fn all() -> Self {
        Self::default()
    }

    fn into_value(self) -> Value {
        Value::Array(self.0)
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Value>> for Domain {
    fn from(clauses: Vec<Value>) -> Self {
        Self(clauses)
    }
}

/// Paging and ordering for `search` and `search_read`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub offset: u64,
    /// Zero means "not given" and falls back to [`DEFAULT_LIMIT`].
    pub limit: u64,
    /// `None` or an empty string leaves ordering to the server.
    pub order: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
            order: None,
        }
    }
}

impl SearchOptions {
    fn apply(self, kwargs: &mut Map<String, Value>) {
        let limit = if self.limit == 0 {
            DEFAULT_LIMIT
        } else {
            self.limit
        };
        kwargs.insert("offset".into(), json!(self.offset));
        kwargs.insert("limit".into(), json!(limit));
        if let Some(order) = self.order.filter(|o| !o.is_empty()) {
            kwargs.insert("order".into(), json!(order));
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value, model: &str, method: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::invalid_response(model, method, e.to_string()))
}

impl OdooClient {
    /// Ids of the records matching `domain`.
    ///
    /// # Errors
    ///
    /// See [`OdooClient::invoke`].
    pub async fn search(
        &self,
        database: &str,
        model: &str,
        domain: Domain,
        options: SearchOptions,
    ) -> Result<Vec<RecordId>> {
        let mut kwargs = Map::new();
        options.apply(&mut kwargs);
        let result = self
            .invoke(database, model, "search", vec![domain.into_value()], kwargs)
            .await?;
        decode(result, model, "search")
    }

    /// Records matching `domain`, with `fields` (all fields when empty).
    ///
    /// # Errors
    ///
    /// See [`OdooClient::invoke`].
    pub async fn search_read(
        &self,
        database: &str,
        model: &str,
        domain: Domain,
        fields: &[String],
        options: SearchOptions,
    ) -> Result<Vec<Value>> {
        let mut kwargs = Map::new();
        kwargs.insert("fields".into(), json!(fields));
        options.apply(&mut kwargs);
        let result = self
            .invoke(database, model, "search_read", vec![domain.into_value()], kwargs)
            .await?;
        decode(result, model, "search_read")
    }

    /// Read records by id.
    ///
    /// # Errors
    ///
    /// See [`OdooClient::invoke`].
    pub async fn read(
        &self,
        database: &str,
        model: &str,
        ids: &[RecordId],
        fields: &[String],
    ) -> Result<Vec<Value>> {
        let mut kwargs = Map::new();
        if !fields.is_empty() {
            kwargs.insert("fields".into(), json!(fields));
        }
        let result = self
            .invoke(database, model, "read", vec![json!(ids)], kwargs)
            .await?;
        decode(result, model, "read")
    }

    /// Create one record and return its id.
    ///
    /// # Errors
    ///
    /// See [`OdooClient::invoke`].
    pub async fn create(
        &self,
        database: &str,
        model: &str,
        values: Map<String, Value>,
    ) -> Result<RecordId> {
        let result = self
            .invoke(database, model, "create", vec![Value::Object(values)], Map::new())
            .await?;
        decode(result, model, "create")
    }

    /// Update records. Returns the server's verdict as a boolean.
    ///
    /// # Errors
    ///
    /// See [`OdooClient::invoke`].
    pub async fn write(
        &self,
        database: &str,
        model: &str,
        ids: &[RecordId],
        values: Map<String, Value>,
    ) -> Result<bool> {
        let result = self
            .invoke(
                database,
                model,
                "write",
                vec![json!(ids), Value::Object(values)],
                Map::new(),
            )
            .await?;
        Ok(is_truthy(&result))
    }

    /// Delete records. Returns the server's verdict as a boolean.
    ///
    /// # Errors
    ///
    /// See [`OdooClient::invoke`].
    pub async fn unlink(&self, database: &str, model: &str, ids: &[RecordId]) -> Result<bool> {
        let result = self
            .invoke(database, model, "unlink", vec![json!(ids)], Map::new())
            .await?;
        Ok(is_truthy(&result))
    }

    /// Field definitions of `model`, keyed by field name.
    ///
    /// # Errors
    ///
    /// See [`OdooClient::invoke`].
    pub async fn fields_get(
        &self,
        database: &str,
        model: &str,
        fields: &[String],
        attributes: &[String],
    ) -> Result<Map<String, Value>> {
        let args = if fields.is_empty() {
            Vec::new()
        } else {
            vec![json!(fields)]
        };
        let mut kwargs = Map::new();
        if !attributes.is_empty() {
            kwargs.insert("attributes".into(), json!(attributes));
        }
        let result = self
            .invoke(database, model, "fields_get", args, kwargs)
            .await?;
        decode(result, model, "fields_get")
    }

    /// Number of records matching `domain`.
    ///
    /// # Errors
    ///
    /// See [`OdooClient::invoke`].
    pub async fn search_count(&self, database: &str, model: &str, domain: Domain) -> Result<u64> {
        let result = self
            .invoke(
                database,
                model,
                "search_count",
                vec![domain.into_value()],
                Map::new(),
            )
            .await?;
        decode(result, model, "search_count")
    }
}
