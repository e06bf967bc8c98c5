//! Template rewriting and the format helper
//!
//! Free-form templates pass through an ordered sequence of textual rewrite
//! passes before any interpolation runs. The passes turn `| text` and `| e`
//! filter tokens into calls on the `__fmt__` host object, and XML documents
//! additionally get every remaining interpolation wrapped in an escape call.
//! Correctness is defined by the substitution grammar, not by any parser:
//! these are literal pattern substitutions over the raw text.
//!
//! Pass order matters. A `| text` token consumed by the first pass is no
//! longer visible to the second, and the XML pass runs last so it wraps the
//! output of the earlier passes too.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ScriptError;
use crate::gateway::EntityGateway;
use crate::model::{resolve_path, Bean, ModelRegistry};
use crate::script::HostObject;

/// Name the renderer binds the format helper under.
pub const FORMAT_HOST: &str = "__fmt__";

fn text_bean_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{\s*(\w+)(\?)?\.([^}]*?)\s*\|\s*text\s*\}").unwrap()
    })
}

fn text_expr_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{\s*([^}]*?)\s*\|\s*text\s*\}").unwrap())
}

fn null_safe_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{\s*([^}]*?)\s*\|\s*e\s*\}").unwrap())
}

fn xml_wrap_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{(.*?)\}").unwrap())
}

/// Apply the four rewrite passes, in order, over the raw template.
pub fn rewrite(text: &str) -> String {
    let text = text_bean_pattern().replace_all(text, "$${__fmt__.text(${1}, '${3}')}");
    let text = text_expr_pattern().replace_all(&text, "$${__fmt__.text('${1}')}");
    let text = null_safe_pattern().replace_all(&text, "$${(${1}) ?: ''}");
    if text.trim().starts_with("<?xml ") {
        xml_wrap_pattern()
            .replace_all(&text, "$${__fmt__.escape(${1})}")
            .into_owned()
    } else {
        text.into_owned()
    }
}

/// Escape the five XML-significant characters.
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// The plain string form of a value: null renders empty, strings render
/// bare, composites render as their JSON text.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The `__fmt__` host object: label lookup and XML escaping for templates.
pub struct FormatHelper<'a> {
    models: &'a ModelRegistry,
    gateway: &'a dyn EntityGateway,
    /// Model the one-argument `text` form resolves metadata against.
    model: &'a str,
    /// Context snapshot the one-argument `text` form reads values from.
    vars: Map<String, Value>,
}

impl<'a> FormatHelper<'a> {
    pub fn new(
        models: &'a ModelRegistry,
        gateway: &'a dyn EntityGateway,
        model: &'a str,
        vars: Map<String, Value>,
    ) -> Self {
        Self {
            models,
            gateway,
            model,
            vars,
        }
    }

    /// `escape(value)`: null renders empty, everything else XML-escaped.
    pub fn escape(&self, value: &Value) -> String {
        if value.is_null() {
            return String::new();
        }
        xml_escape(&display_string(value))
    }

    /// `text(expr)`: the context value under `expr`, resolved to its
    /// selection label against the request model.
    pub fn text(&self, expr: &str) -> String {
        let value = self.vars.get(expr).cloned().unwrap_or(Value::Null);
        self.select_title(Some(self.model), expr, &value)
    }

    /// `text(bean, expr)`: walk the bean's value chain and the bean's type
    /// chain independently; nullable-hop markers are stripped first.
    pub fn text_on(&self, bean: &Value, expr: &str) -> String {
        if bean.is_null() {
            return String::new();
        }
        let expr = expr.replace('?', "");
        let value = resolve_path(bean, &expr);
        let model = Bean::classify(bean).and_then(|b| b.model().map(str::to_string));
        self.select_title(model.as_deref(), &expr, &value)
    }

    fn select_title(&self, model: Option<&str>, path: &str, value: &Value) -> String {
        if value.is_null() {
            return String::new();
        }
        let selection = model
            .and_then(|m| self.models.property_of(m, path))
            .and_then(|p| p.selection);
        let Some(selection) = selection else {
            return display_string(value);
        };
        match self.gateway.lookup_selection_label(&selection, value) {
            Ok(Some(title)) => title,
            Ok(None) => display_string(value),
            Err(e) => {
                debug!(selection = %selection, error = %e, "selection lookup failed");
                display_string(value)
            }
        }
    }
}

impl HostObject for FormatHelper<'_> {
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, ScriptError> {
        match (method, args) {
            ("escape", [value]) => Ok(Value::String(self.escape(value))),
            ("text", [expr]) => {
                let expr = string_arg(expr, "text")?;
                Ok(Value::String(self.text(expr)))
            }
            ("text", [bean, expr]) => {
                let expr = string_arg(expr, "text")?;
                Ok(Value::String(self.text_on(bean, expr)))
            }
            (other, _) => Err(ScriptError::UnknownMethod {
                host: FORMAT_HOST.to_string(),
                method: other.to_string(),
            }),
        }
    }
}

fn string_arg<'v>(value: &'v Value, method: &str) -> Result<&'v str, ScriptError> {
    value.as_str().ok_or_else(|| ScriptError::InvalidArgument {
        message: format!("{method} expects a string path argument"),
    })
}
