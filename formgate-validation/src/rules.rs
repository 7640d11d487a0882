// Rule registry and validation session

use crate::errors::{Result, RulesError, ValidationError, ValidationErrors};
use crate::messages::{DefaultMessages, MessageSource, RuleMessages};
use crate::parser::{self, RuleToken};
use crate::predicates::PredicateSet;
use formgate_log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Rules registered for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub field: String,
    pub label: String,
    /// The rule string as registered
    pub rule_string: String,
    pub messages: RuleMessages,
    tokens: Vec<RuleToken>,
}

impl FieldRule {
    /// Build a rule, parsing `rule_string` once.
    pub fn new(
        field: impl Into<String>,
        label: impl Into<String>,
        rule_string: impl Into<String>,
        messages: RuleMessages,
    ) -> Self {
        let rule_string = rule_string.into();
        let tokens = parser::parse(&rule_string);
        Self {
            field: field.into(),
            label: label.into(),
            rule_string,
            messages,
            tokens,
        }
    }

    /// Parsed form of `rule_string`.
    pub fn tokens(&self) -> &[RuleToken] {
        &self.tokens
    }
}

/// Serializable rule declaration, as accepted by [`Rules::add_rules`].
///
/// ```
/// use formgate_validation::RuleDescriptor;
///
/// let descriptor: RuleDescriptor = serde_json::from_str(
///     r#"{"field": "email", "label": "E-mail", "rules": "required|email"}"#,
/// ).unwrap();
/// assert!(descriptor.messages.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    pub field: String,
    /// Display name; the field name when omitted
    #[serde(default)]
    pub label: String,
    pub rules: String,
    #[serde(default, skip_serializing_if = "RuleMessages::is_none")]
    pub messages: RuleMessages,
}

impl RuleDescriptor {
    pub fn new(
        field: impl Into<String>,
        label: impl Into<String>,
        rules: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            rules: rules.into(),
            messages: RuleMessages::None,
        }
    }

    pub fn with_messages(mut self, messages: impl Into<RuleMessages>) -> Self {
        self.messages = messages.into();
        self
    }
}

/// Where a session is in its validation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Nothing has run, or the last pass was aborted
    #[default]
    Idle,
    /// A pass is in progress
    Running,
    /// The last pass recorded no failures
    Passed,
    /// The last pass recorded at least one failure
    Failed,
}

/// A validation session: registered rules, source values and the errors of
/// the last pass.
///
/// ```
/// use formgate_validation::Rules;
/// use serde_json::json;
///
/// let mut rules = Rules::new();
/// rules.add_source("username", json!("jo"));
/// rules.add_rule("username", "Username", "required|minLength[3]");
///
/// assert!(!rules.validate().unwrap());
/// assert_eq!(rules.errors(), vec!["username should be more than 3"]);
/// ```
pub struct Rules {
    pub(crate) rules: Vec<FieldRule>,
    index: HashMap<String, usize>,
    pub(crate) overrides: HashMap<String, String>,
    pub(crate) defaults: DefaultMessages,
    pub(crate) source: HashMap<String, Value>,
    pub(crate) predicates: PredicateSet,
    pub(crate) message_source: Option<Arc<dyn MessageSource>>,
    pub(crate) errors: Vec<ValidationError>,
    pub(crate) state: RunState,
}

impl Rules {
    /// Empty session with the built-in predicates and messages.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            index: HashMap::new(),
            overrides: HashMap::new(),
            defaults: DefaultMessages::default(),
            source: HashMap::new(),
            predicates: PredicateSet::builtin(),
            message_source: None,
            errors: Vec::new(),
            state: RunState::Idle,
        }
    }

    /// Session over the given source values.
    pub fn with_source<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut rules = Self::new();
        rules.set_source(values);
        rules
    }

    /// Session over a JSON object.
    pub fn from_json(values: Value) -> Result<Self> {
        let mut rules = Self::new();
        rules.set_source_json(values)?;
        Ok(rules)
    }

    /// Replace the predicate set.
    pub fn with_predicates(mut self, predicates: PredicateSet) -> Self {
        self.predicates = predicates;
        self
    }

    /// Replace the built-in message table.
    pub fn with_default_messages(mut self, defaults: DefaultMessages) -> Self {
        self.defaults = defaults;
        self
    }

    /// Use `source` for messages no template covers.
    pub fn with_message_source(mut self, source: Arc<dyn MessageSource>) -> Self {
        self.message_source = Some(source);
        self
    }

    pub fn set_message_source(&mut self, source: Option<Arc<dyn MessageSource>>) {
        self.message_source = source;
    }

    /// Mutable access to the predicate set, for registering custom checks.
    pub fn predicates_mut(&mut self) -> &mut PredicateSet {
        &mut self.predicates
    }

    // ------------------------------------------------------------------
    // Source values
    // ------------------------------------------------------------------

    /// Replace all source values.
    pub fn set_source<I, K>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.source = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
    }

    /// Replace all source values with the members of a JSON object.
    pub fn set_source_json(&mut self, values: Value) -> Result<()> {
        match values {
            Value::Object(map) => {
                self.set_source(map);
                Ok(())
            }
            other => Err(RulesError::Config(format!(
                "source values must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Replace all source values with a serialized struct.
    pub fn set_source_from<T: Serialize>(&mut self, values: &T) -> Result<()> {
        self.set_source_json(serde_json::to_value(values)?)
    }

    /// Set or replace a single source value.
    pub fn add_source(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.source.insert(key.into(), value.into());
    }

    pub fn source(&self) -> &HashMap<String, Value> {
        &self.source
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register rules for a field with no custom messages.
    pub fn add_rule(
        &mut self,
        field: impl Into<String>,
        label: impl Into<String>,
        rules: impl Into<String>,
    ) -> &mut Self {
        self.add_rule_with_messages(field, label, rules, RuleMessages::None)
    }

    /// Register rules for a field. A field registered before keeps its
    /// position but loses its previous rules and messages.
    pub fn add_rule_with_messages(
        &mut self,
        field: impl Into<String>,
        label: impl Into<String>,
        rules: impl Into<String>,
        messages: impl Into<RuleMessages>,
    ) -> &mut Self {
        let rule = FieldRule::new(field, label, rules, messages.into());
        debug!(
            "Registering {} rule(s) for {}: {}",
            rule.tokens().len(),
            rule.field,
            rule.rule_string
        );

        let existing = self.index.get(&rule.field).copied();
        match existing {
            Some(position) => self.rules[position] = rule,
            None => {
                self.index.insert(rule.field.clone(), self.rules.len());
                self.rules.push(rule);
            }
        }
        self
    }

    /// Register several descriptors in order.
    pub fn add_rules<I>(&mut self, descriptors: I) -> &mut Self
    where
        I: IntoIterator<Item = RuleDescriptor>,
    {
        for descriptor in descriptors {
            let label = if descriptor.label.is_empty() {
                descriptor.field.clone()
            } else {
                descriptor.label
            };
            self.add_rule_with_messages(
                descriptor.field,
                label,
                descriptor.rules,
                descriptor.messages,
            );
        }
        self
    }

    pub fn has_rule(&self, field: &str) -> bool {
        self.index.contains_key(field)
    }

    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.index.get(field).map(|&position| &self.rules[position])
    }

    /// Registered rules, in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.iter()
    }

    /// Override the message for a field name or predicate name.
    ///
    /// Beats the built-in table; a rule's own messages beat this.
    pub fn set_message(&mut self, key: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.overrides.insert(key.into(), message.into());
        self
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    /// Messages from the last pass, in the order they were recorded.
    pub fn errors(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    /// Structured failures from the last pass.
    pub fn failures(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Failures from the last pass as a collection, e.g. for a JSON response.
    pub fn report(&self) -> ValidationErrors {
        ValidationErrors::new(self.errors.clone())
    }

    pub fn state(&self) -> RunState {
        self.state
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rules")
            .field("rules", &self.rules)
            .field("overrides", &self.overrides)
            .field("source", &self.source)
            .field("predicates", &self.predicates)
            .field("has_message_source", &self.message_source.is_some())
            .field("errors", &self.errors)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_rule_parses_once() {
        let mut rules = Rules::new();
        rules.add_rule("name", "Name", "required|minLength[3]");

        let rule = rules.rule("name").unwrap();
        assert_eq!(rule.tokens().len(), 2);
        assert_eq!(rule.tokens()[1].params, vec!["3".to_string()]);
        assert!(rules.has_rule("name"));
        assert!(!rules.has_rule("email"));
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let mut rules = Rules::new();
        rules
            .add_rule("a", "A", "required")
            .add_rule("b", "B", "email")
            .add_rule_with_messages("a", "A2", "integer", "custom");

        let fields: Vec<&str> = rules.rules().map(|r| r.field.as_str()).collect();
        assert_eq!(fields, vec!["a", "b"]);

        let a = rules.rule("a").unwrap();
        assert_eq!(a.label, "A2");
        assert_eq!(a.rule_string, "integer");
        assert_eq!(a.messages, RuleMessages::from("custom"));
    }

    #[test]
    fn test_add_rules_defaults_label_to_field() {
        let mut rules = Rules::new();
        rules.add_rules(vec![
            RuleDescriptor::new("email", "", "required|email"),
            RuleDescriptor::new("age", "Age", "integer").with_messages([("integer", "Whole years")]),
        ]);

        assert_eq!(rules.rule("email").unwrap().label, "email");
        assert_eq!(
            rules.rule("age").unwrap().messages,
            RuleMessages::from([("integer", "Whole years")])
        );
    }

    #[test]
    fn test_source_replace_and_merge() {
        let mut rules = Rules::with_source([("a", json!(1)), ("b", json!(2))]);
        rules.add_source("c", "three");
        assert_eq!(rules.source().len(), 3);

        rules.set_source([("z", json!(null))]);
        assert_eq!(rules.source().len(), 1);
        assert!(rules.source().contains_key("z"));
    }

    #[test]
    fn test_source_from_json_requires_object() {
        assert!(Rules::from_json(json!({"a": 1})).is_ok());
        let err = Rules::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, RulesError::Config(ref msg) if msg.contains("an array")));
    }

    #[test]
    fn test_source_from_struct() {
        #[derive(Serialize)]
        struct SignUp {
            email: String,
            tags: Vec<String>,
        }

        let mut rules = Rules::new();
        rules
            .set_source_from(&SignUp {
                email: "a@b.co".to_string(),
                tags: vec!["x".to_string()],
            })
            .unwrap();

        assert_eq!(rules.source()["email"], json!("a@b.co"));
        assert_eq!(rules.source()["tags"], json!(["x"]));
    }

    #[test]
    fn test_report_mirrors_failures() {
        let mut rules = Rules::with_source([("a", json!("")), ("b", json!("x"))]);
        rules
            .add_rule("a", "A", "required")
            .add_rule("b", "B", "minLength[2]");
        assert!(!rules.validate().unwrap());

        let report = rules.report();
        assert_eq!(report.len(), 2);
        assert_eq!(report.messages(), rules.errors());
        assert_eq!(report.get_field_errors("b")[0].params, vec!["2".to_string()]);
        assert_eq!(report.to_json()["errors"][0]["constraint"], "required");
    }

    #[test]
    fn test_initial_state() {
        let rules = Rules::new();
        assert_eq!(rules.state(), RunState::Idle);
        assert!(rules.errors().is_empty());
    }
}
