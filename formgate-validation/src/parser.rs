// Rule string parsing

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static PARAM_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s+").unwrap());

/// One `|`-delimited segment of a rule string, e.g. `minLength[3]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleToken {
    /// Predicate name as written (`minLength`)
    pub name: String,
    /// Literal parameters from the bracket block, in order
    pub params: Vec<String>,
}

impl RuleToken {
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Name the predicate is registered under (`minLength` -> `isMinLength`).
    pub fn dispatch_name(&self) -> String {
        dispatch_name(&self.name)
    }

    /// Key used for per-rule and default message lookup (`min_length` -> `minLength`).
    pub fn message_key(&self) -> String {
        lower_first(&studly_case(&self.name))
    }

    /// Resource key used when no template applies (`minLength` -> `IS_MINLENGTH`).
    pub fn fallback_key(&self) -> String {
        format!("IS_{}", studly_case(&self.name).to_uppercase())
    }
}

/// Parse a rule string such as `required|minLength[3]|listed[a, b]`.
///
/// A blank rule string has no tokens. Otherwise every segment becomes a
/// token, so a stray `|` yields an empty name that fails dispatch. A segment
/// with `[` but no closing `]` is kept whole as the predicate name, so it
/// fails later as an unknown predicate too.
pub fn parse(rule_string: &str) -> Vec<RuleToken> {
    if rule_string.trim().is_empty() {
        return Vec::new();
    }

    rule_string
        .split('|')
        .map(str::trim)
        .map(parse_segment)
        .collect()
}

fn parse_segment(segment: &str) -> RuleToken {
    let (Some(open), Some(close)) = (segment.find('['), segment.rfind(']')) else {
        return RuleToken::new(segment, Vec::new());
    };
    if close < open {
        return RuleToken::new(segment, Vec::new());
    }

    let name = format!("{}{}", &segment[..open], &segment[close + 1..]);
    let inner = PARAM_SEPARATOR.replace_all(&segment[open + 1..close], ",");

    let params = if inner.is_empty() {
        Vec::new()
    } else {
        inner.split(',').map(str::to_string).collect()
    };

    RuleToken::new(name.trim(), params)
}

/// `min_length`, `min-length` and `minLength` all become `MinLength`.
pub fn studly_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(upper_first)
        .collect()
}

/// Registered name of the predicate behind a rule name.
pub fn dispatch_name(name: &str) -> String {
    format!("is{}", studly_case(name))
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
