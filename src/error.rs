//! Error types for the action engine
//!
//! One crate-level taxonomy (`ActionError`) plus narrow error types for the
//! collaborator seams. Degradation paths (pass-through directives, missing
//! actions, swallowed multi-row query faults) never surface here; only the
//! hard failures do.

use thiserror::Error;

/// Top-level error for directive evaluation and request execution
#[derive(Error, Debug)]
pub enum ActionError {
    /// The request carried no action name at all. The one hard failure of
    /// `execute()`; everything else degrades to null or a carried error.
    #[error("no action name provided on the request")]
    MissingAction,

    #[error("script error: {0}")]
    Script(#[from] ScriptError),

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors crossing the scripting-evaluator boundary
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("evaluation failed: {message}")]
    Eval { message: String },

    #[error("template rendering failed: {message}")]
    Render { message: String },

    #[error("unknown host object '{name}'")]
    UnknownHost { name: String },

    #[error("host object '{host}' has no method '{method}'")]
    UnknownMethod { host: String, method: String },

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Errors raised by the persistence gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("unknown model '{model}'")]
    UnknownModel { model: String },

    #[error("query failed: {message}")]
    Query { message: String },

    #[error("backend unavailable: {message}")]
    Unavailable { message: String },
}

/// Errors loading declarative configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("duplicate action name '{name}'")]
    DuplicateAction { name: String },
}

/// Result alias used throughout the crate
pub type EngineResult<T> = Result<T, ActionError>;
