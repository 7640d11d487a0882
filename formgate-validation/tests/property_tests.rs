//! Property-based tests for rule parsing and validation passes.

use formgate_validation::*;
use proptest::prelude::*;
use serde_json::json;

fn rule_name() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z]{0,10}"
}

fn param() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,6}"
}

proptest! {
    #[test]
    fn parse_yields_one_token_per_segment(
        names in prop::collection::vec(rule_name(), 0..6)
    ) {
        let rule_string = names.join("|");
        let tokens = parse(&rule_string);

        prop_assert_eq!(tokens.len(), names.len());
        for (token, name) in tokens.iter().zip(&names) {
            prop_assert_eq!(&token.name, name);
            prop_assert!(token.params.is_empty());
        }
    }

    #[test]
    fn parse_recovers_params_regardless_of_spacing(
        name in rule_name(),
        params in prop::collection::vec(param(), 1..5),
        spaces in 0usize..3,
    ) {
        let separator = format!(",{}", " ".repeat(spaces));
        let rule_string = format!("{}[{}]", name, params.join(&separator));
        let tokens = parse(&rule_string);

        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(&tokens[0].name, &name);
        prop_assert_eq!(&tokens[0].params, &params);
    }

    #[test]
    fn min_length_fails_exactly_when_short(value in "[a-z]{0,8}", min in 1usize..8) {
        let mut rules = Rules::with_source([("field", json!(value.clone()))]);
        rules.add_rule("field", "Field", &format!("minLength[{}]", min));

        let passed = rules.validate().unwrap();
        prop_assert_eq!(passed, value.chars().count() >= min);

        if !passed {
            let errors = rules.errors();
            prop_assert_eq!(errors.len(), 1);
            prop_assert!(errors[0].contains("field"));
            prop_assert!(errors[0].contains(&min.to_string()));
        }
    }

    #[test]
    fn validate_is_deterministic(
        values in prop::collection::vec("[a-z@.]{0,12}", 1..5)
    ) {
        let mut rules = Rules::new();
        for (i, value) in values.iter().enumerate() {
            let field = format!("f{}", i);
            rules.add_source(field.clone(), value.as_str());
            rules.add_rule(field, "", "required|email|maxLength[6]");
        }

        let first = rules.validate().unwrap();
        let first_errors: Vec<String> = rules.errors().iter().map(|s| s.to_string()).collect();
        let second = rules.validate().unwrap();
        let second_errors: Vec<String> = rules.errors().iter().map(|s| s.to_string()).collect();

        prop_assert_eq!(first, second);
        prop_assert_eq!(first_errors, second_errors);
    }

    #[test]
    fn recorded_messages_are_never_empty(
        value in "[a-z]{0,4}",
        override_message in prop::option::of(prop_oneof![Just(String::new()), "[a-z :%]{0,10}"]),
        rule_message in prop_oneof![Just(String::new()), Just("%s".to_string()), "[a-z :]{0,10}"],
    ) {
        let mut rules = Rules::with_source([("field", json!(value))]);
        if let Some(message) = override_message {
            rules.set_message("minLength", message);
        }
        rules.add_rule_with_messages(
            "field",
            "Field",
            "required|minLength[5]|email",
            [("required", rule_message.clone()), ("email", rule_message)],
        );

        rules.validate().unwrap();
        for message in rules.errors() {
            prop_assert!(!message.is_empty());
        }
    }

    #[test]
    fn sprintf_without_specifiers_is_identity(template in "[a-zA-Z :,.]{0,40}") {
        prop_assert_eq!(sprintf(&template, &["x", "y"]), template);
    }
}
