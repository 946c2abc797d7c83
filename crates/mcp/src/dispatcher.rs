//! Route `tools/call` invocations onto the Odoo client.

use std::sync::Arc;

use {
    odoo_mcp_odoo::{DEFAULT_LIMIT, Domain, OdooClient, RecordId, SearchOptions},
    serde::{
        Deserialize, Deserializer,
        de::{DeserializeOwned, Error as _},
    },
    serde_json::{Map, Value},
    tracing::{debug, warn},
};

use crate::{
    error::{Error, Result},
    tools::{ToolName, tool_definitions},
    types::{McpToolDef, ToolsCallResult},
};

#[derive(Debug, Deserialize)]
struct SearchArgs {
    database: Option<String>,
    model: String,
    #[serde(default, deserialize_with = "nullable_domain")]
    domain: Domain,
    #[serde(default, deserialize_with = "optional_count")]
    limit: Option<u64>,
    #[serde(default, deserialize_with = "optional_count")]
    offset: Option<u64>,
    order: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchReadArgs {
    database: Option<String>,
    model: String,
    #[serde(default, deserialize_with = "nullable_domain")]
    domain: Domain,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default, deserialize_with = "optional_count")]
    limit: Option<u64>,
    #[serde(default, deserialize_with = "optional_count")]
    offset: Option<u64>,
    order: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReadArgs {
    database: Option<String>,
    model: String,
    #[serde(deserialize_with = "record_ids")]
    ids: Vec<RecordId>,
    #[serde(default)]
    fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CreateArgs {
    database: Option<String>,
    model: String,
    values: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct WriteArgs {
    database: Option<String>,
    model: String,
    #[serde(deserialize_with = "record_ids")]
    ids: Vec<RecordId>,
    values: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct DeleteArgs {
    database: Option<String>,
    model: String,
    #[serde(deserialize_with = "record_ids")]
    ids: Vec<RecordId>,
}

#[derive(Debug, Deserialize)]
struct FieldsGetArgs {
    database: Option<String>,
    model: String,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    attributes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchCountArgs {
    database: Option<String>,
    model: String,
    #[serde(default, deserialize_with = "nullable_domain")]
    domain: Domain,
}

/// An integer, or a float with no fractional part. JSON clients are free to
/// encode `10` as `10.0`.
fn integral(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && (i64::MIN as f64..=i64::MAX as f64).contains(f))
            .map(|f| f as i64)
    })
}

fn optional_count<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => integral(&value)
            .and_then(|n| u64::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a non-negative integer, got {value}"))),
    }
}

fn record_ids<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<RecordId>, D::Error> {
    Vec::<Value>::deserialize(deserializer)?
        .iter()
        .map(|value| {
            integral(value)
                .ok_or_else(|| D::Error::custom(format!("expected an integer record id, got {value}")))
        })
        .collect()
}

/// `null` means the same as an absent domain: match everything.
fn nullable_domain<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Domain, D::Error> {
    Ok(Option::<Domain>::deserialize(deserializer)?.unwrap_or_default())
}

fn search_options(limit: Option<u64>, offset: Option<u64>, order: Option<String>) -> SearchOptions {
    SearchOptions {
        offset: offset.unwrap_or(0),
        limit: limit.unwrap_or(DEFAULT_LIMIT),
        order,
    }
}

fn pretty(value: &impl serde::Serialize) -> Result<ToolsCallResult> {
    Ok(ToolsCallResult::text(serde_json::to_string_pretty(value)?))
}

/// Turns a tool name plus flat argument map into an Odoo operation and its
/// result into tool content.
pub struct ToolDispatcher {
    client: Arc<OdooClient>,
    default_database: Option<String>,
}

impl ToolDispatcher {
    /// `default_database` is used when a call omits `database`.
    pub fn new(client: Arc<OdooClient>, default_database: Option<String>) -> Self {
        Self {
            client,
            default_database: default_database.filter(|d| !d.trim().is_empty()),
        }
    }

    pub fn tools(&self) -> Vec<McpToolDef> {
        tool_definitions(self.default_database.is_some())
    }

    /// Run a tool. Failures become an `isError` result; they never escape.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolsCallResult {
        match self.dispatch(name, arguments).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = %name, error = %e, "tool call failed");
                ToolsCallResult::error(format!("Error: {e}"))
            },
        }
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> Result<ToolsCallResult> {
        let tool = ToolName::from_name(name).ok_or_else(|| Error::UnknownOperation {
            name: name.to_string(),
        })?;
        debug!(tool = %tool, "dispatching tool call");

        match tool {
            ToolName::Search => {
                let args: SearchArgs = parse_args(tool, arguments)?;
                let database = self.database(tool, args.database)?;
                let ids = self
                    .client
                    .search(
                        &database,
                        &args.model,
                        args.domain,
                        search_options(args.limit, args.offset, args.order),
                    )
                    .await?;
                pretty(&ids)
            },
            ToolName::SearchRead => {
                let args: SearchReadArgs = parse_args(tool, arguments)?;
                let database = self.database(tool, args.database)?;
                let records = self
                    .client
                    .search_read(
                        &database,
                        &args.model,
                        args.domain,
                        &args.fields,
                        search_options(args.limit, args.offset, args.order),
                    )
                    .await?;
                pretty(&records)
            },
            ToolName::Read => {
                let args: ReadArgs = parse_args(tool, arguments)?;
                let database = self.database(tool, args.database)?;
                let records = self
                    .client
                    .read(&database, &args.model, &args.ids, &args.fields)
                    .await?;
                pretty(&records)
            },
            ToolName::Create => {
                let args: CreateArgs = parse_args(tool, arguments)?;
                let database = self.database(tool, args.database)?;
                let id = self
                    .client
                    .create(&database, &args.model, args.values)
                    .await?;
                Ok(ToolsCallResult::text(format!(
                    "Record created successfully with ID: {id}"
                )))
            },
            ToolName::Write => {
                let args: WriteArgs = parse_args(tool, arguments)?;
                let database = self.database(tool, args.database)?;
                let updated = self
                    .client
                    .write(&database, &args.model, &args.ids, args.values)
                    .await?;
                Ok(if updated {
                    ToolsCallResult::text("Records updated successfully")
                } else {
                    ToolsCallResult::error("Update failed")
                })
            },
            ToolName::Delete => {
                let args: DeleteArgs = parse_args(tool, arguments)?;
                let database = self.database(tool, args.database)?;
                let deleted = self
                    .client
                    .unlink(&database, &args.model, &args.ids)
                    .await?;
                Ok(if deleted {
                    ToolsCallResult::text("Records deleted successfully")
                } else {
                    ToolsCallResult::error("Delete failed")
                })
            },
            ToolName::FieldsGet => {
                let args: FieldsGetArgs = parse_args(tool, arguments)?;
                let database = self.database(tool, args.database)?;
                let fields = self
                    .client
                    .fields_get(&database, &args.model, &args.fields, &args.attributes)
                    .await?;
                pretty(&fields)
            },
            ToolName::SearchCount => {
                let args: SearchCountArgs = parse_args(tool, arguments)?;
                let database = self.database(tool, args.database)?;
                let count = self
                    .client
                    .search_count(&database, &args.model, args.domain)
                    .await?;
                Ok(ToolsCallResult::text(format!("Count: {count}")))
            },
            ToolName::ListDatabases => {
                let databases = self.client.list_databases().await?;
                pretty(&databases)
            },
        }
    }

    fn database(&self, tool: ToolName, given: Option<String>) -> Result<String> {
        given
            .filter(|d| !d.trim().is_empty())
            .or_else(|| self.default_database.clone())
            .ok_or_else(|| Error::invalid_arguments(tool.as_str(), "missing required argument 'database'"))
    }
}

/// Destructure tool arguments; absent arguments are treated as `{}`.
fn parse_args<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| Error::invalid_arguments(tool.as_str(), e.to_string()))
}
