// Error message resolution and formatting

use crate::messages::{DefaultMessages, MessageSource, RuleMessages};
use crate::parser::RuleToken;
use formgate_log::trace;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static PRINTF_SPEC: Lazy<Regex> = Lazy::new(|| Regex::new(r"%(?:(\d+)\$)?([sdf%])").unwrap());

/// Templates that look like this are treated as message keys first.
static MESSAGE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.\-]*$").unwrap());

/// Everything the formatter needs to know about one failed rule.
#[derive(Debug, Clone, Copy)]
pub struct Failure<'a> {
    pub field: &'a str,
    pub label: &'a str,
    pub token: &'a RuleToken,
    /// Text of the field's normalized values, printed by `%s` before params
    pub values: &'a [String],
    pub messages: &'a RuleMessages,
}

/// Resolves failures into final messages.
///
/// Resolution order, first hit wins:
///
/// 1. the rule's message map, keyed by predicate name
/// 2. the rule's message map, keyed by field name
/// 3. the rule's single message
/// 4. a registry override for the field name
/// 5. a registry override for the predicate name
/// 6. the built-in template for the predicate
/// 7. the message source, by `IS_<PREDICATE>` key, or that key verbatim
pub struct ErrorFormatter<'a> {
    overrides: &'a HashMap<String, String>,
    defaults: &'a DefaultMessages,
    source: Option<&'a dyn MessageSource>,
}

impl<'a> ErrorFormatter<'a> {
    pub fn new(
        overrides: &'a HashMap<String, String>,
        defaults: &'a DefaultMessages,
        source: Option<&'a dyn MessageSource>,
    ) -> Self {
        Self {
            overrides,
            defaults,
            source,
        }
    }

    /// Resolve, substitute placeholders and apply printf-style arguments.
    pub fn format(&self, failure: &Failure<'_>) -> String {
        let template = self.resolve(failure);
        let params = &failure.token.params;

        let mut message = template
            .replace(":attribute", failure.field)
            .replace(":label", failure.label);
        if !params.is_empty() {
            message = message.replace(":params", &params.join(","));
        }

        let args: Vec<&str> = failure
            .values
            .iter()
            .chain(params.iter())
            .map(String::as_str)
            .collect();

        let message = sprintf(&message, &args);
        if message.is_empty() {
            return failure.token.fallback_key();
        }
        message
    }

    /// The template a failure resolves to, before any substitution.
    pub fn resolve(&self, failure: &Failure<'_>) -> String {
        let predicate = failure.token.message_key();

        // Empty candidates never count; resolution moves on to the next step.
        let custom = match failure.messages {
            RuleMessages::Map(map) => non_empty(map.get(&predicate))
                .or_else(|| non_empty(map.get(failure.field))),
            RuleMessages::Single(message) => non_empty(Some(message)),
            RuleMessages::None => None,
        };

        let template = custom
            .or_else(|| non_empty(self.overrides.get(failure.field)))
            .or_else(|| non_empty(self.overrides.get(&predicate)))
            .or_else(|| self.defaults.get(&predicate).filter(|t| !t.is_empty()))
            .map(str::to_string);

        match template {
            Some(template) => self.expand_key(template),
            None => {
                let key = failure.token.fallback_key();
                self.lookup(&key).unwrap_or(key)
            }
        }
    }

    /// A template that is a bare key may name another override or a line in
    /// the message source.
    fn expand_key(&self, template: String) -> String {
        if !MESSAGE_KEY.is_match(&template) {
            return template;
        }

        non_empty(self.overrides.get(&template))
            .map(str::to_string)
            .or_else(|| self.lookup(&template))
            .unwrap_or(template)
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let line = self.source?.get_line(key).filter(|line| !line.is_empty());
        if line.is_none() {
            trace!("No message line for {}", key);
        }
        line
    }
}

fn non_empty(message: Option<&String>) -> Option<&str> {
    message.map(String::as_str).filter(|m| !m.is_empty())
}

/// Apply `%s`, `%d`, `%f`, `%N$s` and `%%` against positional arguments.
///
/// Specifiers without a matching argument are kept as written.
pub fn sprintf(template: &str, args: &[&str]) -> String {
    let mut next = 0;

    PRINTF_SPEC
        .replace_all(template, |caps: &Captures<'_>| {
            let conversion = &caps[2];
            if conversion == "%" {
                return "%".to_string();
            }

            let arg = match caps.get(1) {
                Some(position) => position
                    .as_str()
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| args.get(i)),
                None => {
                    let arg = args.get(next);
                    next += 1;
                    arg
                }
            };

            match arg {
                Some(arg) => convert(conversion, arg),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn convert(conversion: &str, arg: &str) -> String {
    let number = arg.trim().parse::<f64>().ok().filter(|n| n.is_finite());
    match conversion {
        "d" => format!("{}", number.map_or(0, |n| n.trunc() as i64)),
        "f" => format!("{:.6}", number.unwrap_or(0.0)),
        _ => arg.to_string(),
    }
}
