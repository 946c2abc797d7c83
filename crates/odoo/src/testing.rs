//! Scripted [`RpcChannel`] for exercising the client without a server.

use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

use {async_trait::async_trait, serde_json::Value};

use crate::{channel::RpcChannel, endpoint::Endpoint, error::TransportError};

/// A call observed by [`RecordingChannel`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: Endpoint,
    pub method: String,
    pub args: Vec<Value>,
}

/// Replies to calls from a FIFO script and records every call it receives.
///
/// A call with nothing left in the script fails with a fault, so a test that
/// expects no further remote traffic can leave the script empty.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    script: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn reply(&self, value: Value) -> &Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(value));
        self
    }

    /// Queue a server fault with the given message.
    pub fn fault(&self, message: &str) -> &Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(TransportError::Fault {
                code: None,
                message: message.to_string(),
            }));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .count()
    }

    /// The most recent `execute_kw` as (model, method, args, kwargs).
    pub fn last_execute_kw(&self) -> Option<(String, String, Value, Value)> {
        let calls = self.calls();
        let call = calls
            .iter()
            .rev()
            .find(|c| c.endpoint == Endpoint::Object && c.method == "execute_kw")?;
        let model = call.args.get(3)?.as_str()?.to_string();
        let method = call.args.get(4)?.as_str()?.to_string();
        Some((
            model,
            method,
            call.args.get(5).cloned().unwrap_or(Value::Null),
            call.args.get(6).cloned().unwrap_or(Value::Null),
        ))
    }
}

#[async_trait]
impl RpcChannel for RecordingChannel {
    async fn call(
        &self,
        endpoint: Endpoint,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, TransportError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                endpoint,
                method: method.to_string(),
                args,
            });

        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Fault {
                    code: None,
                    message: format!("unscripted call to {endpoint}.{method}"),
                })
            })
    }
}
