//! Scripting evaluator seam
//!
//! The engine treats the script language as an opaque service: it hands over
//! rewritten text and a scope, and gets back a value or rendered string.
//! Host objects are the callback channel in the other direction; the engine
//! binds them under reserved names (`__me__` for queries, `__fmt__` for
//! template formatting) and the evaluator routes method calls on those names
//! through [`HostObject::invoke`].

use std::collections::HashMap;

use serde_json::Value;

use crate::context::EvaluationContext;
use crate::error::ScriptError;

/// An engine-side object callable from script code.
pub trait HostObject {
    /// Invoke a named method with already-evaluated arguments.
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, ScriptError>;
}

/// Everything one evaluator call may see: the mutable variable environment
/// plus the host objects bound for this call.
pub struct EvalScope<'a> {
    vars: &'a mut EvaluationContext,
    hosts: HashMap<&'static str, &'a dyn HostObject>,
}

impl<'a> EvalScope<'a> {
    pub fn new(vars: &'a mut EvaluationContext) -> Self {
        Self {
            vars,
            hosts: HashMap::new(),
        }
    }

    pub fn vars(&self) -> &EvaluationContext {
        self.vars
    }

    pub fn vars_mut(&mut self) -> &mut EvaluationContext {
        self.vars
    }

    pub fn bind_host(&mut self, name: &'static str, host: &'a dyn HostObject) {
        self.hosts.insert(name, host);
    }

    pub fn host(&self, name: &str) -> Option<&'a dyn HostObject> {
        self.hosts.get(name).copied()
    }
}

/// The opaque expression evaluator and template interpolator.
///
/// Implementations own the script grammar entirely; the engine only
/// guarantees what the scope contains and how the text was rewritten.
pub trait ScriptEvaluator: Send + Sync {
    /// Evaluate an expression against the scope.
    fn eval(&self, script: &str, scope: &mut EvalScope<'_>) -> Result<Value, ScriptError>;

    /// Interpolate a (pre-rewritten) template against the scope.
    fn render(&self, template: &str, scope: &mut EvalScope<'_>) -> Result<String, ScriptError>;
}
