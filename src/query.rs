//! Query building and execution host
//!
//! Turns a query-text fragment plus positional parameters into a bound,
//! executable read against the gateway. Bound here means two things: the
//! positional values in declaration order, and every name in the current
//! evaluation context handed along as a named parameter, so query text can
//! reference context variables directly.
//!
//! [`QueryHost`] is the `__me__` host object the select strategies bind into
//! the evaluator scope; script-side `selectOne(...)`/`selectAll(...)` calls
//! land here.
//!
//! The two entry points deliberately fail differently: `select_one` treats
//! zero rows as null but surfaces execution faults, while `select_all`
//! swallows any fault into null. Both behaviors are load-bearing for
//! callers; do not unify them.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ScriptError;
use crate::gateway::EntityGateway;
use crate::script::HostObject;

/// Name the select strategies bind the query host under.
pub const QUERY_HOST: &str = "__me__";

/// Validate query text and supply the leading keyword when omitted.
pub fn build_query_text(text: &str) -> Result<String, ScriptError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ScriptError::InvalidArgument {
            message: "empty query text".to_string(),
        });
    }
    let leading = text.split_whitespace().next().unwrap_or_default();
    if leading.eq_ignore_ascii_case("select") {
        Ok(text.to_string())
    } else {
        Ok(format!("SELECT {text}"))
    }
}

/// One-shot query facade bound to a context snapshot.
pub struct QueryHost {
    gateway: Arc<dyn EntityGateway>,
    named: Map<String, Value>,
}

impl QueryHost {
    pub fn new(gateway: Arc<dyn EntityGateway>, named: Map<String, Value>) -> Self {
        Self { gateway, named }
    }

    fn run(&self, query: &str, params: &[Value]) -> Result<Vec<Value>, ScriptError> {
        let query = build_query_text(query)?;
        tracing::trace!(query = %query, positional = params.len(), "executing query");
        Ok(self.gateway.execute_query(&query, params, &self.named)?)
    }

    /// Single result, or null when there are zero rows. Execution faults
    /// surface.
    pub fn select_one(&self, query: &str, params: &[Value]) -> Result<Value, ScriptError> {
        let mut rows = self.run(query, params)?;
        if rows.is_empty() {
            Ok(Value::Null)
        } else {
            Ok(rows.swap_remove(0))
        }
    }

    /// Full result sequence, or null when anything faults, the empty-text
    /// precondition included.
    pub fn select_all(&self, query: &str, params: &[Value]) -> Value {
        match self.run(query, params) {
            Ok(rows) => Value::Array(rows),
            Err(e) => {
                debug!(error = %e, "multi-row query failed, returning null");
                Value::Null
            }
        }
    }
}

impl HostObject for QueryHost {
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, ScriptError> {
        let (query, params) = split_query_args(args)?;
        match method {
            "selectOne" => self.select_one(query, params),
            "selectAll" => Ok(self.select_all(query, params)),
            other => Err(ScriptError::UnknownMethod {
                host: QUERY_HOST.to_string(),
                method: other.to_string(),
            }),
        }
    }
}

fn split_query_args(args: &[Value]) -> Result<(&str, &[Value]), ScriptError> {
    let Some((first, rest)) = args.split_first() else {
        return Err(ScriptError::InvalidArgument {
            message: "query call takes at least the query text".to_string(),
        });
    };
    let Some(query) = first.as_str() else {
        return Err(ScriptError::InvalidArgument {
            message: "query text must be a string".to_string(),
        });
    };
    Ok((query, rest))
}
