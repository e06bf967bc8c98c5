//! Action handler
//!
//! The directive-level entry point the workflow orchestrator talks to. One
//! handler is created per incoming request, owns that request's evaluation
//! context exclusively, and runs to completion on the caller's thread;
//! nested evaluations (action within action, call within action) recurse
//! synchronously through the same instance.
//!
//! `evaluate` routes a classified directive to its strategy. `execute` is
//! the aggregate entry point over the request's action-name list, and the
//! one place a missing action name is a hard failure; every other
//! degradation in this module returns null or a carried error instead.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::actions::ActionConfig;
use crate::context::{self, EvaluationContext};
use crate::directive::{classify, Directive};
use crate::engine::Engine;
use crate::error::{ActionError, EngineResult};
use crate::query::{QueryHost, QUERY_HOST};
use crate::rpc::{ActionRequest, ActionResponse, ResponseStatus};
use crate::script::EvalScope;
use crate::template::{self, FormatHelper, FORMAT_HOST};

pub struct ActionHandler {
    engine: Arc<Engine>,
    request: ActionRequest,
    context: EvaluationContext,
}

impl ActionHandler {
    /// Create the handler for one request, binding its evaluation context
    /// from the payload and ambient session state.
    pub fn new(engine: Arc<Engine>, request: ActionRequest) -> Self {
        let context = context::bind(
            engine.models(),
            engine.gateway().as_ref(),
            engine.session().as_ref(),
            &request.model,
            &request.context,
        );
        Self {
            engine,
            request,
            context,
        }
    }

    pub fn request(&self) -> &ActionRequest {
        &self.request
    }

    pub fn context(&self) -> &EvaluationContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut EvaluationContext {
        &mut self.context
    }

    /// Evaluate one directive. The result's shape is directive-kind
    /// dependent (scalar, record, sequence, nested response) and opaque
    /// here; the orchestrator interprets it.
    pub fn evaluate(&mut self, directive: &str) -> EngineResult<Value> {
        let Some(directive) = classify(directive) else {
            return Ok(Value::Null);
        };
        match directive {
            Directive::Eval(body) => self.eval_script(&body),
            Directive::Action(name) => self.eval_action(name.trim()),
            Directive::Call(body) => self.eval_call(&body),
            Directive::SelectOne(body) => self.eval_select(&body, "selectOne"),
            Directive::SelectAll(body) => self.eval_select(&body, "selectAll"),
            Directive::PassThrough(text) => Ok(Value::String(text)),
        }
    }

    /// Execute the request's comma-separated action names as one group and
    /// wrap the aggregate result. Fails only when no name was supplied.
    pub fn execute(&mut self) -> EngineResult<ActionResponse> {
        let names = self
            .request
            .action
            .clone()
            .filter(|names| !names.trim().is_empty())
            .ok_or(ActionError::MissingAction)?;
        let group = ActionConfig::group_of(&names);
        let data = group.evaluate(self)?;
        Ok(ActionResponse::success(Some(data)))
    }

    /// Invoke a registered controller method with `(request, response)`.
    /// Every fault is caught and carried in the returned response; this
    /// boundary never raises.
    pub fn call(&mut self, controller: &str, method: &str) -> ActionResponse {
        let mut response = ActionResponse::default();
        let Some(target) = self.engine.controllers().get(controller).cloned() else {
            warn!(controller, "unknown controller");
            response.set_error(format!("unknown controller '{controller}'"));
            return response;
        };
        match target.invoke(method, &self.request, &mut response) {
            Ok(()) => response.status = ResponseStatus::Success,
            Err(e) => {
                warn!(controller, method, error = %e, "controller call failed");
                response.set_error(format!("{e:#}"));
            }
        }
        response
    }

    /// Render a free-form template against the context.
    pub fn render_template(&mut self, text: &str) -> EngineResult<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        let rewritten = template::rewrite(text);
        let engine = Arc::clone(&self.engine);
        let fmt = FormatHelper::new(
            engine.models(),
            engine.gateway().as_ref(),
            &self.request.model,
            self.context.snapshot(),
        );
        let scripting = Arc::clone(engine.scripting());
        let mut scope = EvalScope::new(&mut self.context);
        scope.bind_host(FORMAT_HOST, &fmt);
        Ok(scripting.render(&rewritten, &mut scope)?)
    }

    pub(crate) fn empty_record(&self, model: &str) -> Value {
        self.engine.models().empty_record(model)
    }

    fn eval_script(&mut self, script: &str) -> EngineResult<Value> {
        let scripting = Arc::clone(self.engine.scripting());
        let mut scope = EvalScope::new(&mut self.context);
        Ok(scripting.eval(script, &mut scope)?)
    }

    fn eval_action(&mut self, name: &str) -> EngineResult<Value> {
        let Some(action) = self.engine.actions().resolve(name).cloned() else {
            debug!(action = name, "no such action found");
            return Ok(Value::Null);
        };
        action.evaluate(self)
    }

    fn eval_call(&mut self, body: &str) -> EngineResult<Value> {
        let parts: Vec<&str> = body.split(':').collect();
        let &[controller, method] = parts.as_slice() else {
            warn!(expression = body, "invalid call expression");
            return Ok(Value::Null);
        };
        let action = ActionConfig::method_of(controller, method);
        action.evaluate(self)
    }

    fn eval_select(&mut self, body: &str, method: &str) -> EngineResult<Value> {
        let script = make_method_call(&format!("{QUERY_HOST}.{method}"), body);
        let host = QueryHost::new(Arc::clone(self.engine.gateway()), self.context.snapshot());
        let scripting = Arc::clone(self.engine.scripting());
        let mut scope = EvalScope::new(&mut self.context);
        scope.bind_host(QUERY_HOST, &host);
        Ok(scripting.eval(&script, &mut scope)?)
    }
}

/// Wrap a query body into a method call. Bare text is first made a
/// triple-quoted literal so embedded quotes and newlines survive; an
/// already-parenthesized body is taken as a full argument list, letting
/// callers pass positional parameters themselves.
fn make_method_call(method: &str, expression: &str) -> String {
    let expression = expression.trim();
    if expression.starts_with('(') {
        return format!("{method}{expression}");
    }
    let quoted = if expression.starts_with('\'') || expression.starts_with('"') {
        expression.to_string()
    } else {
        format!("\"\"\"{expression}\"\"\"")
    };
    format!("{method}({quoted})")
}
