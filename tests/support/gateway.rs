//! In-memory gateway over JSON fixtures
//!
//! Records live in per-model vectors; the query language is a deliberately
//! tiny subset (`SELECT <Model> [where self.<field> = <rhs>]`) where the
//! right-hand side may be a quoted literal, an integer, `?N` positional
//! parameter or `:name` context parameter. Anything else is a query fault,
//! which is exactly what the fault-swallowing tests need.

use std::collections::HashMap;

use action_engine::{EntityGateway, GatewayError, SelectionList};
use serde_json::{Map, Value};

#[derive(Default)]
pub struct MemoryGateway {
    records: HashMap<String, Vec<Value>>,
    selections: Vec<SelectionList>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, model: impl Into<String>, records: Vec<Value>) -> Self {
        self.records.insert(model.into(), records);
        self
    }

    pub fn with_selections(mut self, selections: Vec<SelectionList>) -> Self {
        self.selections = selections;
        self
    }

    fn resolve_rhs(
        &self,
        token: &str,
        positional: &[Value],
        named: &Map<String, Value>,
    ) -> Result<Value, GatewayError> {
        let malformed = || GatewayError::Query {
            message: format!("unresolvable operand {token:?}"),
        };
        if let Some(inner) = token
            .strip_prefix('\'')
            .and_then(|t| t.strip_suffix('\''))
        {
            return Ok(Value::String(inner.to_string()));
        }
        if let Some(index) = token.strip_prefix('?') {
            let index: usize = index.parse().map_err(|_| malformed())?;
            if index == 0 {
                return Err(malformed());
            }
            return positional.get(index - 1).cloned().ok_or_else(malformed);
        }
        if let Some(name) = token.strip_prefix(':') {
            return named.get(name).cloned().ok_or_else(malformed);
        }
        if let Ok(n) = token.parse::<i64>() {
            return Ok(Value::from(n));
        }
        Err(malformed())
    }
}

impl EntityGateway for MemoryGateway {
    fn find_by_id(&self, model: &str, id: &Value) -> Result<Option<Value>, GatewayError> {
        let Some(rows) = self.records.get(model) else {
            return Ok(None);
        };
        Ok(rows.iter().find(|r| r.get("id") == Some(id)).cloned())
    }

    fn execute_query(
        &self,
        query: &str,
        positional: &[Value],
        named: &Map<String, Value>,
    ) -> Result<Vec<Value>, GatewayError> {
        let malformed = |message: &str| GatewayError::Query {
            message: format!("{message}: {query}"),
        };
        let tokens: Vec<&str> = query.split_whitespace().collect();
        let (keyword, model, clause) = match tokens.as_slice() {
            [keyword, model, clause @ ..] => (*keyword, *model, clause),
            _ => return Err(malformed("too short")),
        };
        if !keyword.eq_ignore_ascii_case("select") {
            return Err(malformed("missing keyword"));
        }
        let rows = self.records.get(model).cloned().unwrap_or_default();
        match clause {
            [] => Ok(rows),
            [where_kw, path, "=", rhs] if where_kw.eq_ignore_ascii_case("where") => {
                let field = path
                    .strip_prefix("self.")
                    .ok_or_else(|| malformed("predicate must address self"))?;
                let expected = self.resolve_rhs(rhs, positional, named)?;
                Ok(rows
                    .into_iter()
                    .filter(|r| r.get(field) == Some(&expected))
                    .collect())
            }
            _ => Err(malformed("unsupported clause")),
        }
    }

    fn lookup_selection_label(
        &self,
        selection: &str,
        code: &Value,
    ) -> Result<Option<String>, GatewayError> {
        let Some(list) = self.selections.iter().find(|l| l.name == selection) else {
            return Ok(None);
        };
        Ok(list
            .items
            .iter()
            .find(|item| &item.value == code)
            .map(|item| item.title.clone()))
    }
}
