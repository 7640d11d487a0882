// Rule sets loaded from configuration files

use crate::errors::{Result, RulesError};
use crate::rules::{RuleDescriptor, Rules};
use formgate_log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Rules and message overrides as they appear in a configuration file.
///
/// ```toml
/// [messages]
/// required = ":attribute must be filled in"
///
/// [[rules]]
/// field = "email"
/// label = "E-mail"
/// rules = "required|email"
///
/// [[rules]]
/// field = "age"
/// rules = "integer|min[18]"
/// messages = { min = "Adults only" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub rules: Vec<RuleDescriptor>,
    /// Registry-level overrides keyed by field or predicate name
    pub messages: HashMap<String, String>,
}

impl RuleSet {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a `.toml` or `.json` file, chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let set = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            other => {
                return Err(RulesError::Config(format!(
                    "unsupported rule file extension {:?} for {}",
                    other.unwrap_or(""),
                    path.display()
                )));
            }
        };

        debug!(
            "Loaded {} rule(s) and {} message override(s) from {}",
            set.rules.len(),
            set.messages.len(),
            path.display()
        );
        Ok(set)
    }
}

impl Rules {
    /// Register every rule and message override of `set`.
    pub fn apply_rule_set(&mut self, set: RuleSet) -> &mut Self {
        for (key, message) in set.messages {
            self.set_message(key, message);
        }
        self.add_rules(set.rules)
    }

    pub fn with_rule_set(mut self, set: RuleSet) -> Self {
        self.apply_rule_set(set);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::RuleMessages;

    const TOML: &str = r#"
[messages]
required = ":attribute must be filled in"

[[rules]]
field = "email"
label = "E-mail"
rules = "required|email"

[[rules]]
field = "age"
rules = "integer|min[18]"
messages = { min = "Adults only" }

[[rules]]
field = "nickname"
rules = "maxLength[12]"
messages = "Nickname is too long"
"#;

    #[test]
    fn test_from_toml() {
        let set = RuleSet::from_toml_str(TOML).unwrap();

        assert_eq!(set.rules.len(), 3);
        assert_eq!(set.rules[0].label, "E-mail");
        assert_eq!(set.rules[1].label, "");
        assert_eq!(
            set.rules[1].messages,
            RuleMessages::from([("min", "Adults only")])
        );
        assert_eq!(
            set.rules[2].messages,
            RuleMessages::from("Nickname is too long")
        );
        assert_eq!(set.messages["required"], ":attribute must be filled in");
    }

    #[test]
    fn test_from_json() {
        let set = RuleSet::from_json_str(
            r#"{"rules": [{"field": "name", "rules": "required", "messages": null}]}"#,
        )
        .unwrap();

        assert_eq!(set.rules.len(), 1);
        assert!(set.rules[0].messages.is_none());
        assert!(set.messages.is_empty());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            RuleSet::from_toml_str("[[rules]]\nfield = 3"),
            Err(RulesError::Config(_))
        ));
        assert!(matches!(
            RuleSet::from_json_str("{"),
            Err(RulesError::Config(_))
        ));
    }

    #[test]
    fn test_apply_rule_set() {
        let set = RuleSet::from_toml_str(TOML).unwrap();
        let rules = Rules::new().with_rule_set(set);

        assert!(rules.has_rule("email"));
        assert_eq!(rules.rule("age").unwrap().label, "age");
        assert_eq!(
            rules.rules().map(|r| r.field.as_str()).collect::<Vec<_>>(),
            vec!["email", "age", "nickname"]
        );
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("rules.toml");
        fs::write(&toml_path, TOML).unwrap();
        assert_eq!(RuleSet::load(&toml_path).unwrap().rules.len(), 3);

        let yaml_path = dir.path().join("rules.yaml");
        fs::write(&yaml_path, "rules: []").unwrap();
        assert!(matches!(
            RuleSet::load(&yaml_path),
            Err(RulesError::Config(_))
        ));

        assert!(matches!(
            RuleSet::load(dir.path().join("missing.toml")),
            Err(RulesError::Io(_))
        ));
    }
}
