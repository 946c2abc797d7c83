//! Odoo RPC session client.
//!
//! This crate provides:
//! - Endpoint derivation from a configured base URL (`endpoint`)
//! - JSON-RPC channel to the Odoo external API (`channel`)
//! - Per-database uid cache (`session`)
//! - Authenticated `execute_kw` dispatch (`client`)
//! - Named record operations built on top of it (`operations`)

pub mod channel;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod operations;
pub mod session;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use {
    channel::{HttpRpcChannel, RpcChannel},
    client::{Credentials, OdooClient},
    endpoint::{Endpoint, EndpointTarget},
    error::{Error, Result, TransportError},
    operations::{DEFAULT_LIMIT, Domain, RecordId, SearchOptions},
    session::{InMemorySessionStore, SessionStore, Uid},
};
