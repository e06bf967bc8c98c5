//! Directive classification
//!
//! A directive is a short expression string with a recognized prefix tag.
//! Exactly one of five kinds matches, checked in priority order through a
//! single anchored pattern; anything else passes through unchanged as a
//! literal value, which is not a failure.

use std::sync::OnceLock;

use regex::Regex;

/// A classified directive, body verbatim and unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `eval:` inline script expression.
    Eval(String),
    /// `action:` nested named action.
    Action(String),
    /// `call:` controller-method invocation.
    Call(String),
    /// `select:` single-row query expression.
    SelectOne(String),
    /// `select[]:` multi-row query expression.
    SelectAll(String),
    /// No recognized tag; the original text is the value.
    PassThrough(String),
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(select\[\]|select|action|call|eval):\s*(?s:(.*))$").unwrap()
    })
}

/// Classify a directive string. `None` for empty or all-whitespace input,
/// before any classification runs.
pub fn classify(text: &str) -> Option<Directive> {
    if text.trim().is_empty() {
        return None;
    }
    let Some(captures) = pattern().captures(text.trim()) else {
        return Some(Directive::PassThrough(text.to_string()));
    };
    let body = captures[2].to_string();
    let directive = match &captures[1] {
        "eval" => Directive::Eval(body),
        "action" => Directive::Action(body),
        "call" => Directive::Call(body),
        "select" => Directive::SelectOne(body),
        "select[]" => Directive::SelectAll(body),
        _ => unreachable!("pattern alternation is exhaustive"),
    };
    Some(directive)
}
