//! Miniature expression evaluator
//!
//! Just enough of a script language to exercise the engine end to end:
//! literals (including triple-quoted strings), context variable paths,
//! addition and comparison, the `?:` operator, and method calls on bound
//! host objects. Rendering interpolates `${...}` segments through `eval`.

use action_engine::{EvalScope, ScriptError, ScriptEvaluator};
use serde_json::Value;

pub struct MiniEvaluator;

fn err(message: String) -> ScriptError {
    ScriptError::Eval { message }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ScriptEvaluator for MiniEvaluator {
    fn eval(&self, script: &str, scope: &mut EvalScope<'_>) -> Result<Value, ScriptError> {
        let mut parser = Parser::new(script);
        let value = parser.expr(scope)?;
        parser.skip_ws();
        if !parser.done() {
            return Err(err(format!(
                "trailing input at byte {} of {script:?}",
                parser.pos
            )));
        }
        Ok(value)
    }

    fn render(&self, template: &str, scope: &mut EvalScope<'_>) -> Result<String, ScriptError> {
        let mut out = String::new();
        let mut rest = template;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after
                .find('}')
                .ok_or_else(|| err("unterminated interpolation".to_string()))?;
            let value = self.eval(&after[..end], scope)?;
            out.push_str(&stringify(&value));
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

struct Parser<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn done(&self) -> bool {
        self.rest().is_empty()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expr(&mut self, scope: &mut EvalScope<'_>) -> Result<Value, ScriptError> {
        let left = self.comparison(scope)?;
        self.skip_ws();
        if self.eat("?:") {
            let right = self.comparison(scope)?;
            return Ok(if truthy(&left) { left } else { right });
        }
        Ok(left)
    }

    fn comparison(&mut self, scope: &mut EvalScope<'_>) -> Result<Value, ScriptError> {
        let left = self.additive(scope)?;
        self.skip_ws();
        for op in ["==", "!=", "<=", ">=", "<", ">"] {
            if self.eat(op) {
                let right = self.additive(scope)?;
                return compare(op, &left, &right);
            }
        }
        Ok(left)
    }

    fn additive(&mut self, scope: &mut EvalScope<'_>) -> Result<Value, ScriptError> {
        let mut acc = self.primary(scope)?;
        loop {
            self.skip_ws();
            // `?:` must not be mistaken for arithmetic
            if self.rest().starts_with("?:") {
                break;
            }
            let op = match self.peek() {
                Some('+') => '+',
                Some('-') => '-',
                _ => break,
            };
            self.pos += 1;
            let rhs = self.primary(scope)?;
            acc = arith(op, &acc, &rhs)?;
        }
        Ok(acc)
    }

    fn primary(&mut self, scope: &mut EvalScope<'_>) -> Result<Value, ScriptError> {
        self.skip_ws();
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let value = self.expr(scope)?;
                self.skip_ws();
                if !self.eat(")") {
                    return Err(err("expected ')'".to_string()));
                }
                Ok(value)
            }
            Some('\'') => self.quoted("'"),
            Some('"') => {
                if self.rest().starts_with("\"\"\"") {
                    self.triple_quoted()
                } else {
                    self.quoted("\"")
                }
            }
            Some(c) if c.is_ascii_digit() => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.path_or_call(scope),
            other => Err(err(format!("unexpected input {other:?}"))),
        }
    }

    fn quoted(&mut self, delim: &str) -> Result<Value, ScriptError> {
        self.pos += 1;
        let end = self
            .rest()
            .find(delim)
            .ok_or_else(|| err("unterminated string".to_string()))?;
        let text = self.rest()[..end].to_string();
        self.pos += end + 1;
        Ok(Value::String(text))
    }

    fn triple_quoted(&mut self) -> Result<Value, ScriptError> {
        self.pos += 3;
        let end = self
            .rest()
            .find("\"\"\"")
            .ok_or_else(|| err("unterminated triple-quoted string".to_string()))?;
        let text = self.rest()[..end].to_string();
        self.pos += end + 3;
        Ok(Value::String(text))
    }

    fn number(&mut self) -> Result<Value, ScriptError> {
        let digits: String = self
            .rest()
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        self.pos += digits.len();
        if let Ok(n) = digits.parse::<i64>() {
            return Ok(Value::from(n));
        }
        digits
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| err(format!("bad number {digits:?}")))
    }

    fn ident(&mut self) -> String {
        let name: String = self
            .rest()
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        self.pos += name.len();
        name
    }

    fn path_or_call(&mut self, scope: &mut EvalScope<'_>) -> Result<Value, ScriptError> {
        let mut segments = vec![self.ident()];
        while self.rest().starts_with('.') {
            let next = self.src[self.pos + 1..].chars().next();
            if !next.is_some_and(|c| c.is_alphabetic() || c == '_') {
                break;
            }
            self.pos += 1;
            segments.push(self.ident());
        }

        match segments[0].as_str() {
            "null" if segments.len() == 1 => return Ok(Value::Null),
            "true" if segments.len() == 1 => return Ok(Value::Bool(true)),
            "false" if segments.len() == 1 => return Ok(Value::Bool(false)),
            _ => {}
        }

        if self.peek() == Some('(') {
            if segments.len() != 2 {
                return Err(err(format!("cannot call {}", segments.join("."))));
            }
            let args = self.args(scope)?;
            let host = scope
                .host(&segments[0])
                .ok_or_else(|| err(format!("unknown object '{}'", segments[0])))?;
            return host.invoke(&segments[1], &args);
        }

        let mut value = scope
            .vars()
            .get(&segments[0])
            .cloned()
            .unwrap_or(Value::Null);
        for segment in &segments[1..] {
            value = value.get(segment).cloned().unwrap_or(Value::Null);
        }
        Ok(value)
    }

    fn args(&mut self, scope: &mut EvalScope<'_>) -> Result<Vec<Value>, ScriptError> {
        self.pos += 1;
        let mut args = Vec::new();
        self.skip_ws();
        if self.eat(")") {
            return Ok(args);
        }
        loop {
            args.push(self.expr(scope)?);
            self.skip_ws();
            if self.eat(",") {
                continue;
            }
            if self.eat(")") {
                return Ok(args);
            }
            return Err(err("expected ',' or ')'".to_string()));
        }
    }
}

fn arith(op: char, left: &Value, right: &Value) -> Result<Value, ScriptError> {
    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        return Ok(match op {
            '+' => Value::from(l + r),
            _ => Value::from(l - r),
        });
    }
    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        return Ok(match op {
            '+' => Value::from(l + r),
            _ => Value::from(l - r),
        });
    }
    if op == '+' {
        return Ok(Value::String(format!(
            "{}{}",
            stringify(left),
            stringify(right)
        )));
    }
    Err(err(format!("cannot apply '{op}' to {left} and {right}")))
}

fn compare(op: &str, left: &Value, right: &Value) -> Result<Value, ScriptError> {
    match op {
        "==" => return Ok(Value::Bool(left == right)),
        "!=" => return Ok(Value::Bool(left != right)),
        _ => {}
    }
    let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) else {
        return Err(err(format!("cannot compare {left} and {right}")));
    };
    Ok(Value::Bool(match op {
        "<" => l < r,
        ">" => l > r,
        "<=" => l <= r,
        _ => l >= r,
    }))
}
