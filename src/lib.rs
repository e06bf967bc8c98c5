//! Directive dispatch and templating engine for workflow actions.
//!
//! A short textual directive, bound to the evaluation context of one
//! request, is classified by its prefix tag and routed to an evaluation
//! strategy; free-form templates interpolate the same context with
//! selection-label lookup and XML-safe escaping.
//!
//! ## Pipeline
//!
//! ```text
//! Request → Context Binder → ActionHandler.evaluate(directive)
//!                                 │
//!                        Directive Classifier
//!                                 │
//!          ┌──────────┬──────────┼───────────┬────────────┐
//!        eval:     action:     call:      select:     select[]:
//!          │          │          │           │            │
//!      evaluator  ActionDef  Controller  QueryHost    QueryHost
//!                 (by name)  (registry)  selectOne    selectAll
//! ```
//!
//! ## Directive grammar
//!
//! `select[]:`, `select:`, `action:`, `call:`, `eval:` — checked in that
//! priority order; anything else is a literal pass-through value, and an
//! empty directive evaluates to null.
//!
//! The persistence layer, the script evaluator and the session are
//! collaborator traits ([`gateway::EntityGateway`],
//! [`script::ScriptEvaluator`], [`gateway::SessionProvider`]); the engine
//! owns classification, routing, query binding, template rewriting and the
//! declarative action model.

pub mod actions;
pub mod config;
pub mod context;
pub mod controllers;
pub mod directive;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod model;
pub mod query;
pub mod rpc;
pub mod script;
pub mod template;

pub use actions::{ActionConfig, ActionDef, ActionRegistry};
pub use config::EngineConfig;
pub use context::EvaluationContext;
pub use controllers::{Controller, ControllerRegistry};
pub use directive::{classify, Directive};
pub use engine::{Engine, EngineBuilder};
pub use error::{ActionError, ConfigError, EngineResult, GatewayError, ScriptError};
pub use gateway::{EntityGateway, NoSession, SessionProvider, StaticSession};
pub use handler::ActionHandler;
pub use model::{FieldType, ModelMeta, ModelRegistry, PropertyMeta, SelectionItem, SelectionList};
pub use query::{QueryHost, QUERY_HOST};
pub use rpc::{ActionRequest, ActionResponse, ResponseStatus};
pub use script::{EvalScope, HostObject, ScriptEvaluator};
pub use template::{FormatHelper, FORMAT_HOST};
