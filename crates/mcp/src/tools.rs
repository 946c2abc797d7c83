//! Tool names and their input schemas.

use std::fmt;

use serde_json::{Value, json};

use crate::types::McpToolDef;

/// The tools this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    Search,
    SearchRead,
    Read,
    Create,
    Write,
    Delete,
    FieldsGet,
    SearchCount,
    ListDatabases,
}

impl ToolName {
    pub const ALL: [Self; 9] = [
        Self::Search,
        Self::SearchRead,
        Self::Read,
        Self::Create,
        Self::Write,
        Self::Delete,
        Self::FieldsGet,
        Self::SearchCount,
        Self::ListDatabases,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "odoo_search",
            Self::SearchRead => "odoo_search_read",
            Self::Read => "odoo_read",
            Self::Create => "odoo_create",
            Self::Write => "odoo_write",
            Self::Delete => "odoo_delete",
            Self::FieldsGet => "odoo_fields_get",
            Self::SearchCount => "odoo_search_count",
            Self::ListDatabases => "odoo_list_databases",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    fn description(self) -> &'static str {
        match self {
            Self::Search => {
                "Search for records in an Odoo model using domain filters. Returns a list of record IDs."
            },
            Self::SearchRead => {
                "Search and read records from an Odoo model in one call. Returns full record data."
            },
            Self::Read => "Read specific records by their IDs from an Odoo model.",
            Self::Create => "Create a new record in an Odoo model.",
            Self::Write => "Update existing records in an Odoo model.",
            Self::Delete => "Delete records from an Odoo model.",
            Self::FieldsGet => "Get field definitions for an Odoo model.",
            Self::SearchCount => "Count records matching a domain in an Odoo model.",
            Self::ListDatabases => {
                "List all available databases on the Odoo server. This helps discover which databases are available to connect to."
            },
        }
    }

    /// Tool-specific properties, added after `database` and `model`.
    fn properties(self) -> Value {
        match self {
            Self::Search => json!({
                "domain": domain_prop(
                    "Search domain as array of tuples [[\"field\", \"operator\", \"value\"]]. Example: [[\"name\", \"ilike\", \"John\"]]"
                ),
                "limit": limit_prop(),
                "offset": offset_prop(),
                "order": order_prop("Order by field (e.g., \"name ASC\", \"create_date DESC\")"),
            }),
            Self::SearchRead => json!({
                "domain": domain_prop("Search domain as array of tuples [[\"field\", \"operator\", \"value\"]]"),
                "fields": string_list_prop("List of field names to return. Empty array returns all fields."),
                "limit": limit_prop(),
                "offset": offset_prop(),
                "order": order_prop("Order by field"),
            }),
            Self::Read => json!({
                "ids": ids_prop("Array of record IDs to read"),
                "fields": string_list_prop("List of field names to return. Empty array returns all fields."),
            }),
            Self::Create => json!({
                "values": values_prop("Object with field names and values for the new record"),
            }),
            Self::Write => json!({
                "ids": ids_prop("Array of record IDs to update"),
                "values": values_prop("Object with field names and new values"),
            }),
            Self::Delete => json!({
                "ids": ids_prop("Array of record IDs to delete"),
            }),
            Self::FieldsGet => json!({
                "fields": string_list_prop("List of specific field names to get info for. Empty returns all fields."),
                "attributes": string_list_prop("List of attributes to return for each field (e.g., [\"string\", \"type\", \"required\"])"),
            }),
            Self::SearchCount => json!({
                "domain": domain_prop("Search domain as array of tuples"),
            }),
            Self::ListDatabases => json!({}),
        }
    }

    /// Tool-specific required arguments, after `database` and `model`.
    fn required(self) -> &'static [&'static str] {
        match self {
            Self::Read | Self::Delete => &["ids"],
            Self::Create => &["values"],
            Self::Write => &["ids", "values"],
            Self::Search
            | Self::SearchRead
            | Self::FieldsGet
            | Self::SearchCount
            | Self::ListDatabases => &[],
        }
    }

    /// JSON Schema of the tool's arguments. `database` is only required when
    /// the server has no fixed database to fall back on.
    fn input_schema(self, fixed_database: bool) -> Value {
        if self == Self::ListDatabases {
            return json!({
                "type": "object",
                "properties": {},
                "required": [],
            });
        }

        let mut properties = serde_json::Map::new();
        properties.insert("database".into(), database_prop(fixed_database));
        properties.insert(
            "model".into(),
            json!({
                "type": "string",
                "description": "The Odoo model name (e.g., \"res.partner\", \"sale.order\")",
            }),
        );
        if let Value::Object(extra) = self.properties() {
            properties.extend(extra);
        }

        let mut required: Vec<&str> = Vec::new();
        if !fixed_database {
            required.push("database");
        }
        required.push("model");
        required.extend_from_slice(self.required());

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn definition(self, fixed_database: bool) -> McpToolDef {
        McpToolDef {
            name: self.as_str().into(),
            description: Some(self.description().into()),
            input_schema: self.input_schema(fixed_database),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every tool definition, in a stable order.
pub fn tool_definitions(fixed_database: bool) -> Vec<McpToolDef> {
    ToolName::ALL
        .into_iter()
        .map(|t| t.definition(fixed_database))
        .collect()
}

fn database_prop(fixed_database: bool) -> Value {
    let description = if fixed_database {
        "The Odoo database name to connect to. Defaults to the configured database."
    } else {
        "The Odoo database name to connect to"
    };
    json!({ "type": "string", "description": description })
}

fn domain_prop(description: &str) -> Value {
    json!({ "type": "array", "description": description, "items": {}, "default": [] })
}

fn string_list_prop(description: &str) -> Value {
    json!({
        "type": "array",
        "description": description,
        "items": { "type": "string" },
        "default": [],
    })
}

fn ids_prop(description: &str) -> Value {
    json!({ "type": "array", "description": description, "items": { "type": "number" } })
}

fn values_prop(description: &str) -> Value {
    json!({ "type": "object", "description": description })
}

fn limit_prop() -> Value {
    json!({
        "type": "number",
        "description": "Maximum number of records to return",
        "default": odoo_mcp_odoo::DEFAULT_LIMIT,
    })
}

fn offset_prop() -> Value {
    json!({ "type": "number", "description": "Number of records to skip", "default": 0 })
}

fn order_prop(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}
