// Built-in predicates and name-based dispatch

use crate::parser::dispatch_name;
use formgate_log::{trace, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A named check. Receives the field's normalized values (never empty) and
/// the literal parameters from the rule string.
pub type PredicateFn = Arc<dyn Fn(&[Value], &[String]) -> bool + Send + Sync>;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Text form of a value for the string predicates.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn param_number(params: &[String], index: usize) -> Option<f64> {
    params.get(index)?.trim().parse::<f64>().ok()
}

fn param_length(params: &[String]) -> Option<usize> {
    params.first()?.trim().parse::<usize>().ok()
}

fn char_len(value: &Value) -> usize {
    value_text(value).chars().count()
}

fn is_required(values: &[Value], _: &[String]) -> bool {
    values.iter().all(|value| match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    })
}

fn is_float(values: &[Value], _: &[String]) -> bool {
    values.iter().all(|value| value_number(value).is_some())
}

fn is_integer(values: &[Value], _: &[String]) -> bool {
    values.iter().all(|value| match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    })
}

fn matches_all(values: &[Value], regex: &Regex) -> bool {
    values.iter().all(|value| regex.is_match(&value_text(value)))
}

fn is_min_length(values: &[Value], params: &[String]) -> bool {
    param_length(params).is_some_and(|min| values.iter().all(|v| char_len(v) >= min))
}

fn is_max_length(values: &[Value], params: &[String]) -> bool {
    param_length(params).is_some_and(|max| values.iter().all(|v| char_len(v) <= max))
}

fn is_listed(values: &[Value], params: &[String]) -> bool {
    values.iter().all(|value| {
        let text = value_text(value);
        params.iter().any(|allowed| *allowed == text)
    })
}

fn is_min(values: &[Value], params: &[String]) -> bool {
    param_number(params, 0).is_some_and(|min| {
        values
            .iter()
            .all(|v| value_number(v).is_some_and(|n| n >= min))
    })
}

fn is_max(values: &[Value], params: &[String]) -> bool {
    param_number(params, 0).is_some_and(|max| {
        values
            .iter()
            .all(|v| value_number(v).is_some_and(|n| n <= max))
    })
}

fn is_between(values: &[Value], params: &[String]) -> bool {
    match (param_number(params, 0), param_number(params, 1)) {
        (Some(min), Some(max)) => values
            .iter()
            .all(|v| value_number(v).is_some_and(|n| n >= min && n <= max)),
        _ => false,
    }
}

/// `matches[pattern]`: every value matches the regex.
///
/// The pattern is rebuilt by joining the params with `,`. The parser has
/// already collapsed `, ` into `,`, so `matches[a, b]` tests against `a,b`;
/// write `a,\s+b` or `a,[ ]b` to require the space.
fn is_matches(values: &[Value], params: &[String]) -> bool {
    let pattern = params.join(",");
    match Regex::new(&pattern) {
        Ok(regex) => matches_all(values, &regex),
        Err(e) => {
            warn!("Invalid pattern `{}` in matches rule: {}", pattern, e);
            false
        }
    }
}

/// Name-addressed table of predicates.
///
/// Predicates are stored under their dispatch name (`isMinLength`), so a rule
/// written `minLength`, `min_length` or `min-length` reaches the same check.
#[derive(Clone, Default)]
pub struct PredicateSet {
    table: HashMap<String, PredicateFn>,
}

impl PredicateSet {
    /// An empty set; every rule will be reported as unknown.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in predicates.
    pub fn builtin() -> Self {
        let mut set = Self::empty();
        set.register("required", is_required)
            .register("float", is_float)
            .register("integer", is_integer)
            .register("email", |v, _| matches_all(v, &EMAIL_REGEX))
            .register("minLength", is_min_length)
            .register("maxLength", is_max_length)
            .register("listed", is_listed)
            .register("numeric", |v, _| matches_all(v, &NUMERIC_REGEX))
            .register("alpha", |v, _| matches_all(v, &ALPHA_REGEX))
            .register("alphaNumeric", |v, _| matches_all(v, &ALPHANUMERIC_REGEX))
            .register("url", |v, _| matches_all(v, &URL_REGEX))
            .register("uuid", |v, _| matches_all(v, &UUID_REGEX))
            .register("min", is_min)
            .register("max", is_max)
            .register("between", is_between)
            .register("matches", is_matches);
        set
    }

    /// Register a predicate under a rule name, replacing any existing one.
    pub fn register<F>(&mut self, name: &str, predicate: F) -> &mut Self
    where
        F: Fn(&[Value], &[String]) -> bool + Send + Sync + 'static,
    {
        let key = dispatch_name(name);
        trace!("Registering predicate {}", key);
        self.table.insert(key, Arc::new(predicate));
        self
    }

    /// Look a predicate up by dispatch name (`isRequired`).
    pub fn get(&self, dispatch_name: &str) -> Option<&PredicateFn> {
        self.table.get(dispatch_name)
    }

    pub fn contains(&self, dispatch_name: &str) -> bool {
        self.table.contains_key(dispatch_name)
    }

    /// Dispatch names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for PredicateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateSet")
            .field("names", &self.names())
            .finish()
    }
}
