//! Error plumbing shared by the odoo-mcp crates.

pub mod error;

pub use error::FromMessage;
