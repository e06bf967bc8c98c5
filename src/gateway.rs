//! Persistence and session collaborator seams
//!
//! The engine never talks to a database directly; it consumes these traits.
//! Implementations decide query-language semantics, identity shapes and
//! how named parameters bind. All methods are synchronous: one evaluation
//! blocks on at most a single lookup or query at a time.

use serde_json::{Map, Value};

use crate::error::GatewayError;

/// Read access to persisted records and selection labels.
pub trait EntityGateway: Send + Sync {
    /// Fetch one record by model name and identity. `Ok(None)` when no such
    /// record exists; `Err` only for infrastructure faults.
    fn find_by_id(&self, model: &str, id: &Value) -> Result<Option<Value>, GatewayError>;

    /// Execute a one-shot read query. Positional parameters bind in
    /// declaration order; every entry of `named` is available to the query
    /// language as a named parameter.
    fn execute_query(
        &self,
        query: &str,
        positional: &[Value],
        named: &Map<String, Value>,
    ) -> Result<Vec<Value>, GatewayError>;

    /// Look up the display label of a coded value in a named selection
    /// list. `Ok(None)` when the list has no matching entry.
    fn lookup_selection_label(
        &self,
        selection: &str,
        code: &Value,
    ) -> Result<Option<String>, GatewayError>;
}

/// Ambient session state.
pub trait SessionProvider: Send + Sync {
    /// The current user's record, or `None` outside an authenticated
    /// session. Absence is not an error; `__user__` is simply left unbound.
    fn current_user(&self) -> Option<Value>;
}

/// Session provider for unauthenticated or out-of-band evaluations.
pub struct NoSession;

impl SessionProvider for NoSession {
    fn current_user(&self) -> Option<Value> {
        None
    }
}

/// Session provider carrying one fixed user record.
pub struct StaticSession {
    user: Value,
}

impl StaticSession {
    pub fn new(user: Value) -> Self {
        Self { user }
    }
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<Value> {
        Some(self.user.clone())
    }
}
