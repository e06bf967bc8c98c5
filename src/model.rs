//! Model metadata registry
//!
//! Declarative descriptions of the entity types the engine evaluates
//! against: field names, type tags, selection-list associations and
//! relational targets. Loaded once at startup from YAML config and consulted
//! per lookup; the engine never caches resolved properties.
//!
//! Dotted-path traversal comes in two independent flavours, both needed by
//! the template renderer: walking the *type* chain (for selection metadata)
//! and walking a *value* (for the bound data). Values dispatch on a small
//! tagged classification (record vs. plain mapping) rather than runtime type
//! inspection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::MODEL_KEY;

// =============================================================================
// METADATA TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    Datetime,
    Text,
    /// Single-valued relation to another model; `target` names it.
    Reference,
    /// Multi-valued relation to another model.
    Collection,
}

/// One attribute on a model type.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PropertyMeta {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Name of the selection list this field's coded values belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
    /// Target model for relational hops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl PropertyMeta {
    /// A plain string field with no selection and no target.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::default(),
            selection: None,
            target: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelMeta {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<PropertyMeta>,
}

impl ModelMeta {
    pub fn property(&self, name: &str) -> Option<&PropertyMeta> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// An externally persisted enumeration of coded value to label pairs.
///
/// The engine only consumes selections through
/// [`EntityGateway::lookup_selection_label`]; these types exist so config
/// files and in-memory gateways share one shape.
///
/// [`EntityGateway::lookup_selection_label`]: crate::gateway::EntityGateway::lookup_selection_label
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionList {
    pub name: String,
    #[serde(default)]
    pub items: Vec<SelectionItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionItem {
    pub value: Value,
    pub title: String,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// All model metadata known to one engine, keyed by model name.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelMeta>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_models(models: Vec<ModelMeta>) -> Self {
        let mut registry = Self::new();
        for model in models {
            registry.register(model);
        }
        registry
    }

    pub fn register(&mut self, model: ModelMeta) {
        self.models.insert(model.name.clone(), model);
    }

    pub fn get(&self, name: &str) -> Option<&ModelMeta> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Resolve the property at a dotted path, hopping through `target`
    /// models segment by segment. `None` on any miss along the chain.
    ///
    /// This walks types only; it is independent of any bound value, so a
    /// null intermediate value does not stop metadata resolution.
    pub fn property_of(&self, model: &str, path: &str) -> Option<PropertyMeta> {
        let mut segments = path.split('.');
        let mut current = self.get(model)?.property(segments.next()?)?;
        for segment in segments {
            let target = current.target.as_deref()?;
            current = self.get(target)?.property(segment)?;
        }
        Some(current.clone())
    }

    /// Fresh record of the given model: every declared field present (null
    /// by default) merged with the payload, tagged with the model name.
    pub fn materialize(&self, model: &str, payload: &Map<String, Value>) -> Value {
        let mut record = Map::new();
        record.insert(MODEL_KEY.to_string(), Value::String(model.to_string()));
        if let Some(meta) = self.get(model) {
            for field in &meta.fields {
                record.insert(field.name.clone(), Value::Null);
            }
        }
        for (name, value) in payload {
            if name == "_ref" {
                continue;
            }
            record.insert(name.clone(), value.clone());
        }
        Value::Object(record)
    }

    /// An empty record of the given model.
    pub fn empty_record(&self, model: &str) -> Value {
        self.materialize(model, &Map::new())
    }
}

// =============================================================================
// VALUE TRAVERSAL
// =============================================================================

/// How a bean value resolves property lookups.
pub enum Bean<'a> {
    /// A materialized record carrying its model tag.
    Record {
        model: &'a str,
        fields: &'a Map<String, Value>,
    },
    /// A plain key-value mapping with no model identity.
    Mapping(&'a Map<String, Value>),
}

impl<'a> Bean<'a> {
    /// Classify a value; non-objects resolve no properties at all.
    pub fn classify(value: &'a Value) -> Option<Bean<'a>> {
        let fields = value.as_object()?;
        match fields.get(MODEL_KEY).and_then(Value::as_str) {
            Some(model) => Some(Bean::Record { model, fields }),
            None => Some(Bean::Mapping(fields)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&'a Value> {
        match self {
            Bean::Record { fields, .. } | Bean::Mapping(fields) => fields.get(name),
        }
    }

    /// Model name, for record-like beans only.
    pub fn model(&self) -> Option<&'a str> {
        match self {
            Bean::Record { model, .. } => Some(model),
            Bean::Mapping(_) => None,
        }
    }
}

/// Resolve a dotted path against a bean value.
///
/// The first segment resolves through the bean's own lookup; when more
/// segments remain and the intermediate value is non-null, recurse on that
/// value with the remaining path, otherwise return the (possibly null)
/// resolved value.
pub fn resolve_path(bean: &Value, path: &str) -> Value {
    let Some(classified) = Bean::classify(bean) else {
        return Value::Null;
    };
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let value = classified.get(head).cloned().unwrap_or(Value::Null);
    match rest {
        Some(rest) if !value.is_null() => resolve_path(&value, rest),
        _ => value,
    }
}
