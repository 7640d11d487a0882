// Validation pass

use crate::errors::{Result, RulesError, ValidationError};
use crate::formatter::{ErrorFormatter, Failure};
use crate::messages::MESSAGE_DOMAIN;
use crate::predicates::value_text;
use crate::rules::{Rules, RunState};
use formgate_log::{debug, trace, warn};
use serde_json::Value;

/// Predicates always see a list: scalars are wrapped, and an empty sequence
/// becomes a single `null` so there is something to check.
pub fn normalize(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) if items.is_empty() => vec![Value::Null],
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

impl Rules {
    /// Run every registered rule against the source values.
    ///
    /// Returns `Ok(true)` when nothing failed. Failed rules are collected in
    /// [`errors`](Rules::errors); a pass cannot run at all when the source is
    /// empty, a registered field has no value, or a rule names an unknown
    /// predicate. Errors recorded before such an abort stay readable.
    pub fn validate(&mut self) -> Result<bool> {
        self.errors.clear();
        self.state = RunState::Running;
        debug!(
            "Validating {} field(s) against {} source value(s)",
            self.rules.len(),
            self.source.len()
        );

        if let Err(e) = self.run() {
            warn!("Validation aborted: {}", e);
            self.state = RunState::Idle;
            return Err(e);
        }

        let passed = self.errors.is_empty();
        self.state = if passed {
            RunState::Passed
        } else {
            RunState::Failed
        };
        debug!("Validation finished with {} error(s)", self.errors.len());

        Ok(passed)
    }

    fn run(&mut self) -> Result<()> {
        if self.source.is_empty() {
            return Err(RulesError::MissingSource);
        }

        let source = self.message_source.as_deref();
        if let Some(source) = source {
            source.load_domain(MESSAGE_DOMAIN);
        }
        let formatter = ErrorFormatter::new(&self.overrides, &self.defaults, source);

        for rule in &self.rules {
            let value = self
                .source
                .get(&rule.field)
                .ok_or_else(|| RulesError::FieldNotInSource {
                    field: rule.field.clone(),
                })?;

            let args = normalize(value);
            let values: Vec<String> = args.iter().map(|v| value_text(v).into_owned()).collect();

            for token in rule.tokens() {
                let name = token.dispatch_name();
                let predicate =
                    self.predicates
                        .get(&name)
                        .ok_or_else(|| RulesError::UnknownPredicate {
                            field: rule.field.clone(),
                            predicate: name.clone(),
                        })?;

                if predicate(&args, &token.params) {
                    continue;
                }

                let message = formatter.format(&Failure {
                    field: &rule.field,
                    label: &rule.label,
                    token,
                    values: &values,
                    messages: &rule.messages,
                });
                trace!("{} failed {}: {}", rule.field, name, message);

                self.errors.push(ValidationError {
                    field: rule.field.clone(),
                    message,
                    constraint: token.message_key(),
                    params: token.params.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::RuleMessages;
    use serde_json::json;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(&json!("a")), vec![json!("a")]);
        assert_eq!(normalize(&json!([])), vec![Value::Null]);
        assert_eq!(normalize(&json!([1, 2])), vec![json!(1), json!(2)]);
        assert_eq!(normalize(&json!(null)), vec![Value::Null]);
    }

    #[test]
    fn test_all_rules_run_for_a_field() {
        let mut rules = Rules::with_source([("code", json!(""))]);
        rules.add_rule("code", "Code", "required|minLength[2]|email");

        assert!(!rules.validate().unwrap());
        assert_eq!(
            rules.errors(),
            vec![
                "code is required",
                "code should be more than 2",
                "code not a valid email format",
            ]
        );
        assert_eq!(rules.state(), RunState::Failed);
    }

    #[test]
    fn test_state_after_pass() {
        let mut rules = Rules::with_source([("name", json!("Ann"))]);
        rules.add_rule("name", "Name", "required");

        assert!(rules.validate().unwrap());
        assert_eq!(rules.state(), RunState::Passed);
    }

    #[test]
    fn test_abort_returns_to_idle_and_keeps_earlier_errors() {
        let mut rules = Rules::with_source([("a", json!(""))]);
        rules
            .add_rule("a", "A", "required")
            .add_rule("b", "B", "required");

        let err = rules.validate().unwrap_err();
        assert!(matches!(err, RulesError::FieldNotInSource { ref field } if field == "b"));
        assert_eq!(rules.state(), RunState::Idle);
        assert_eq!(rules.errors(), vec!["a is required"]);
    }

    #[test]
    fn test_unknown_predicate_names_dispatch_name() {
        let mut rules = Rules::with_source([("a", json!("x"))]);
        rules.add_rule("a", "A", "required|prime");

        match rules.validate() {
            Err(RulesError::UnknownPredicate { field, predicate }) => {
                assert_eq!(field, "a");
                assert_eq!(predicate, "isPrime");
            }
            other => panic!("expected UnknownPredicate, got {:?}", other),
        }
    }

    #[test]
    fn test_stray_separator_aborts_as_unknown_predicate() {
        for rule_string in ["required||", "required|", "|email"] {
            let mut rules = Rules::with_source([("a", json!("x@y.io"))]);
            rules.add_rule("a", "A", rule_string);

            match rules.validate() {
                Err(RulesError::UnknownPredicate { predicate, .. }) => {
                    assert_eq!(predicate, "is", "rule string {:?}", rule_string)
                }
                other => panic!("expected UnknownPredicate for {:?}, got {:?}", rule_string, other),
            }
        }
    }

    #[test]
    fn test_blank_rule_string_checks_nothing() {
        let mut rules = Rules::with_source([("a", json!(""))]);
        rules.add_rule("a", "A", "");

        assert!(rules.validate().unwrap());
    }

    #[test]
    fn test_values_feed_printf_arguments() {
        let mut rules = Rules::with_source([("tags", json!(["x", "yy"]))]);
        rules.add_rule_with_messages(
            "tags",
            "Tags",
            "minLength[2]",
            RuleMessages::from("%s and %s need %s characters"),
        );

        assert!(!rules.validate().unwrap());
        assert_eq!(rules.errors(), vec!["x and yy need 2 characters"]);
        assert_eq!(rules.failures()[0].params, vec!["2".to_string()]);
        assert_eq!(rules.failures()[0].constraint, "minLength");
    }

    #[test]
    fn test_empty_sequence_is_checked_as_null() {
        let mut rules = Rules::with_source([("items", json!([]))]);
        rules.add_rule("items", "Items", "required");

        assert!(!rules.validate().unwrap());
        assert_eq!(rules.errors(), vec!["items is required"]);
    }
}
