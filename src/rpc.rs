//! Request and response envelope
//!
//! The orchestrator-facing shapes: a request names the actions to run, the
//! model type, and carries the context payload; a response carries a status,
//! result data, and at most one carried error. Controller faults are
//! recorded here rather than raised, so `call` boundaries always return a
//! response object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    #[default]
    Success,
    Failure,
}

/// One incoming action invocation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ActionRequest {
    /// Comma-separated action names to execute. Absent for pure
    /// directive-evaluation sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Model type the payload materializes against.
    pub model: String,

    /// The record payload plus ambient request fields.
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl ActionRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }
}

/// The uniform reply shape.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ActionResponse {
    pub status: ResponseStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Carried failure from a recovered boundary (controller resolution or
    /// invocation). Callers must check this; it is never raised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn success(data: Option<Value>) -> Self {
        Self {
            status: ResponseStatus::Success,
            data,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    pub fn set_data(&mut self, data: Value) {
        self.data = Some(data);
    }

    /// Record a carried failure and flip the status.
    pub fn set_error(&mut self, error: impl std::fmt::Display) {
        self.status = ResponseStatus::Failure;
        self.error = Some(error.to_string());
    }
}
