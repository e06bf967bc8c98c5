//! Declarative action definitions
//!
//! Named units of business logic declared in config and resolved by name at
//! evaluation time. The vocabulary is a closed set of variants, each with
//! its own evaluation function dispatched by tag; there is no open-ended
//! subclassing behind `resolve` + `evaluate`.
//!
//! Every variant evaluates against an [`ActionHandler`], which is how nested
//! directives (guard conditions, field expressions, member actions) recurse
//! through the same dispatch pipeline.
//!
//! [`ActionHandler`]: crate::handler::ActionHandler

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::error::{ConfigError, EngineResult};
use crate::handler::ActionHandler;

// =============================================================================
// DEFINITION TYPES
// =============================================================================

/// One named action: an optional guard plus the variant body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionConfig {
    pub name: String,

    /// Guard expression; a falsy result short-circuits the whole action to
    /// null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(flatten)]
    pub def: ActionDef,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionDef {
    /// Ordered validation checks; the first triggered one is the result.
    Validate {
        #[serde(default)]
        checks: Vec<ValidateCheck>,
    },
    /// Per-field conditions collected into an error map.
    Condition {
        #[serde(default)]
        checks: Vec<ConditionCheck>,
    },
    /// Build a record of the target model from field expressions.
    Record {
        model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        copy_from: Option<String>,
        #[serde(default)]
        fields: Vec<FieldAssign>,
    },
    /// Controller-method call; the synthetic target of `call:` directives.
    Method { controller: String, method: String },
    /// Per-field attribute toggles.
    Attrs {
        #[serde(default)]
        attrs: Vec<AttrAssign>,
    },
    /// Open-view descriptor.
    View {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default)]
        views: Vec<String>,
        #[serde(default)]
        params: Vec<FieldAssign>,
    },
    /// Web-service call descriptor.
    Ws {
        service: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
        #[serde(default)]
        fields: Vec<FieldAssign>,
    },
    /// Aggregate of member actions evaluated in order.
    Group {
        #[serde(default)]
        actions: Vec<String>,
    },
    /// Workflow-transition descriptor.
    Workflow {
        workflow: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transition: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidateCheck {
    #[serde(default)]
    pub level: ValidateLevel,
    pub condition: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidateLevel {
    #[default]
    Error,
    Alert,
}

impl ValidateLevel {
    fn key(self) -> &'static str {
        match self {
            ValidateLevel::Error => "error",
            ValidateLevel::Alert => "alert",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConditionCheck {
    pub field: String,
    /// Expression that must hold for the field to be valid.
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One field assignment: either a directive expression or a literal value.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldAssign {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AttrAssign {
    pub field: String,
    pub name: String,
    pub expr: String,
}

// =============================================================================
// EVALUATION
// =============================================================================

impl ActionConfig {
    /// Synthetic group over a comma-separated name list, as built by
    /// `execute()` for the request's action names.
    pub fn group_of(names: &str) -> Self {
        let actions = names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            name: names.to_string(),
            condition: None,
            def: ActionDef::Group { actions },
        }
    }

    /// Synthetic controller-method action, as built by the `call:` strategy.
    pub fn method_of(controller: &str, method: &str) -> Self {
        Self {
            name: format!("{controller}:{method}"),
            condition: None,
            def: ActionDef::Method {
                controller: controller.to_string(),
                method: method.to_string(),
            },
        }
    }

    pub fn evaluate(&self, handler: &mut ActionHandler) -> EngineResult<Value> {
        if let Some(guard) = &self.condition {
            let held = handler.evaluate(&format!("eval: {guard}"))?;
            if !truthy(&held) {
                return Ok(Value::Null);
            }
        }
        self.def.evaluate(handler)
    }
}

impl ActionDef {
    /// Member action names, for the group variant.
    pub fn members(&self) -> &[String] {
        match self {
            ActionDef::Group { actions } => actions,
            _ => &[],
        }
    }

    pub fn evaluate(&self, handler: &mut ActionHandler) -> EngineResult<Value> {
        match self {
            ActionDef::Validate { checks } => eval_validate(handler, checks),
            ActionDef::Condition { checks } => eval_condition(handler, checks),
            ActionDef::Record {
                model,
                copy_from,
                fields,
            } => eval_record(handler, model, copy_from.as_deref(), fields),
            ActionDef::Method { controller, method } => {
                let response = handler.call(controller, method);
                Ok(serde_json::to_value(response)?)
            }
            ActionDef::Attrs { attrs } => eval_attrs(handler, attrs),
            ActionDef::View {
                title,
                model,
                views,
                params,
            } => {
                let context = eval_assigns(handler, params)?;
                Ok(json!({
                    "title": title,
                    "model": model,
                    "views": views,
                    "context": context,
                }))
            }
            ActionDef::Ws {
                service,
                method,
                fields,
            } => {
                let data = eval_assigns(handler, fields)?;
                Ok(json!({
                    "service": service,
                    "method": method,
                    "data": data,
                }))
            }
            ActionDef::Group { actions } => eval_group(handler, actions),
            ActionDef::Workflow {
                workflow,
                node,
                transition,
            } => Ok(json!({
                "workflow": workflow,
                "node": node,
                "transition": transition,
            })),
        }
    }
}

fn eval_validate(handler: &mut ActionHandler, checks: &[ValidateCheck]) -> EngineResult<Value> {
    for check in checks {
        let triggered = handler.evaluate(&format!("eval: {}", check.condition))?;
        if truthy(&triggered) {
            let mut detail = Map::new();
            detail.insert("message".to_string(), Value::String(check.message.clone()));
            let mut outcome = Map::new();
            outcome.insert(check.level.key().to_string(), Value::Object(detail));
            return Ok(Value::Object(outcome));
        }
    }
    Ok(Value::Null)
}

fn eval_condition(handler: &mut ActionHandler, checks: &[ConditionCheck]) -> EngineResult<Value> {
    let mut failures = Map::new();
    for check in checks {
        let held = handler.evaluate(&format!("eval: {}", check.condition))?;
        if !truthy(&held) {
            let message = check
                .message
                .clone()
                .unwrap_or_else(|| format!("{} is invalid", check.field));
            failures.insert(check.field.clone(), Value::String(message));
        }
    }
    if failures.is_empty() {
        Ok(Value::Bool(true))
    } else {
        Ok(json!({ "errors": failures }))
    }
}

fn eval_record(
    handler: &mut ActionHandler,
    model: &str,
    copy_from: Option<&str>,
    fields: &[FieldAssign],
) -> EngineResult<Value> {
    let mut record = match copy_from {
        Some(source) => {
            let copied = handler.evaluate(source)?;
            match copied {
                Value::Object(mut base) => {
                    base.insert(
                        crate::context::MODEL_KEY.to_string(),
                        Value::String(model.to_string()),
                    );
                    Value::Object(base)
                }
                _ => {
                    warn!(model, "copy_from did not evaluate to a record, ignoring");
                    handler.empty_record(model)
                }
            }
        }
        None => handler.empty_record(model),
    };
    let assigns = eval_assigns(handler, fields)?;
    if let Value::Object(record) = &mut record {
        for (name, value) in assigns {
            record.insert(name, value);
        }
    }
    Ok(record)
}

fn eval_attrs(handler: &mut ActionHandler, attrs: &[AttrAssign]) -> EngineResult<Value> {
    let mut by_field: Map<String, Value> = Map::new();
    for attr in attrs {
        let value = handler.evaluate(&attr.expr)?;
        let entry = by_field
            .entry(attr.field.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(entry) = entry {
            entry.insert(attr.name.clone(), value);
        }
    }
    Ok(Value::Object(by_field))
}

fn eval_assigns(handler: &mut ActionHandler, fields: &[FieldAssign]) -> EngineResult<Map<String, Value>> {
    let mut out = Map::new();
    for field in fields {
        if let Some(guard) = &field.condition {
            let held = handler.evaluate(&format!("eval: {guard}"))?;
            if !truthy(&held) {
                continue;
            }
        }
        let value = match (&field.expr, &field.value) {
            (Some(expr), _) => handler.evaluate(expr)?,
            (None, Some(value)) => value.clone(),
            (None, None) => Value::Null,
        };
        out.insert(field.name.clone(), value);
    }
    Ok(out)
}

/// Evaluate member actions in order through the `action:` strategy. A member
/// whose result carries a failure stops the group; its result is still
/// collected so the caller sees what failed.
fn eval_group(handler: &mut ActionHandler, actions: &[String]) -> EngineResult<Value> {
    let mut results = Vec::new();
    for name in actions {
        let result = handler.evaluate(&format!("action:{name}"))?;
        let failed = is_failure(&result);
        if !result.is_null() {
            results.push(result);
        }
        if failed {
            break;
        }
    }
    Ok(Value::Array(results))
}

fn is_failure(result: &Value) -> bool {
    let Some(fields) = result.as_object() else {
        return false;
    };
    if fields.get("error").is_some_and(|e| !e.is_null()) {
        return true;
    }
    fields.get("status").and_then(Value::as_str) == Some("failure")
}

/// Script-style truthiness for guard and check results.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "false",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// All named actions known to one engine.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, ActionConfig>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_actions(actions: Vec<ActionConfig>) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for action in actions {
            if registry.actions.contains_key(&action.name) {
                return Err(ConfigError::DuplicateAction { name: action.name });
            }
            registry.actions.insert(action.name.clone(), action);
        }
        Ok(registry)
    }

    pub fn resolve(&self, name: &str) -> Option<&ActionConfig> {
        self.actions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
