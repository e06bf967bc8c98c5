//! Evaluation context
//!
//! The per-request named-value environment one [`ActionHandler`] owns for the
//! duration of a single evaluation session. Reserved names bind the incoming
//! record (`__this__`), its persisted counterpart (`__self__`), an optional
//! cross-reference (`__ref__`) and the session user (`__user__`); every other
//! payload field is bound under its own name at the top level.
//!
//! [`ActionHandler`]: crate::handler::ActionHandler

use serde_json::{Map, Value};
use tracing::debug;

use crate::gateway::{EntityGateway, SessionProvider};
use crate::model::ModelRegistry;

/// The freshly materialized record built from the request payload.
pub const THIS: &str = "__this__";
/// The persisted counterpart of `__this__`, or the same record when the
/// payload carries no identity.
pub const SELF: &str = "__self__";
/// A resolved cross-reference record, bound only when `_ref` resolution
/// succeeds.
pub const REF: &str = "__ref__";
/// The current session user, bound only when a session is available.
pub const USER: &str = "__user__";

/// Payload key carrying a cross-reference substructure.
const REF_KEY: &str = "_ref";
/// Key naming the model type inside a `_ref` substructure and inside
/// materialized records.
pub const MODEL_KEY: &str = "_model";

/// Mutable name-to-value environment for one evaluation session.
///
/// Exclusively owned by one handler; never shared across concurrent
/// evaluations, so no internal locking.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    vars: Map<String, Value>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.vars.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// All current bindings, by reference.
    pub fn vars(&self) -> &Map<String, Value> {
        &self.vars
    }

    /// Clone of the current bindings, used to hand the full environment to
    /// collaborators (named query parameters, template helpers) without
    /// holding a borrow across the evaluator boundary.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.vars.clone()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Build the evaluation context for one request.
///
/// An empty payload still yields a context seeded from the model type alone.
/// Reference resolution is best-effort: any `_ref` failure mode leaves
/// `__ref__` unbound, never raises.
pub fn bind(
    models: &ModelRegistry,
    gateway: &dyn EntityGateway,
    session: &dyn SessionProvider,
    model: &str,
    payload: &Map<String, Value>,
) -> EvaluationContext {
    let mut ctx = EvaluationContext::new();

    for (name, value) in payload {
        ctx.set(name.clone(), value.clone());
    }

    let this = models.materialize(model, payload);

    let persisted = match this.get("id") {
        Some(id) if !id.is_null() => match gateway.find_by_id(model, id) {
            Ok(found) => Some(found.unwrap_or(Value::Null)),
            Err(e) => {
                debug!(model, error = %e, "could not load persisted record, using __this__");
                None
            }
        },
        _ => None,
    };
    let self_record = persisted.unwrap_or_else(|| this.clone());

    if let Some(reference) = resolve_ref(gateway, payload) {
        ctx.set(REF, reference);
    }

    ctx.set(THIS, this);
    ctx.set(SELF, self_record);

    if let Some(user) = session.current_user() {
        ctx.set(USER, user);
    }

    ctx
}

/// Resolve the `_ref` payload substructure, swallowing every failure mode.
fn resolve_ref(gateway: &dyn EntityGateway, payload: &Map<String, Value>) -> Option<Value> {
    let reference = payload.get(REF_KEY)?.as_object()?;
    let model = reference.get(MODEL_KEY)?.as_str()?;
    let id = reference.get("id")?;
    if id.is_null() {
        return None;
    }
    match gateway.find_by_id(model, id) {
        Ok(Some(found)) => Some(found),
        Ok(None) => {
            debug!(model, "reference record not found");
            None
        }
        Err(e) => {
            debug!(model, error = %e, "could not resolve reference");
            None
        }
    }
}
