// Message templates and the external message source

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Domain the formatter asks the message source to load.
pub const MESSAGE_DOMAIN: &str = "validation";

/// Per-rule message override.
///
/// Rule descriptors accept either a single string, applied to every failure
/// of the field, or a map keyed by predicate name or field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleMessages {
    #[default]
    None,
    Single(String),
    Map(HashMap<String, String>),
}

impl RuleMessages {
    pub fn is_none(&self) -> bool {
        matches!(self, RuleMessages::None)
    }
}

impl From<&str> for RuleMessages {
    fn from(message: &str) -> Self {
        RuleMessages::Single(message.to_string())
    }
}

impl From<String> for RuleMessages {
    fn from(message: String) -> Self {
        RuleMessages::Single(message)
    }
}

impl From<HashMap<String, String>> for RuleMessages {
    fn from(map: HashMap<String, String>) -> Self {
        RuleMessages::Map(map)
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for RuleMessages {
    fn from(pairs: [(K, V); N]) -> Self {
        RuleMessages::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Built-in templates keyed by predicate name.
///
/// `:attribute` becomes the field name, `:params` the comma-joined rule
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultMessages {
    templates: HashMap<String, String>,
}

impl DefaultMessages {
    /// A table with no templates; every failure falls through to the
    /// message source.
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn get(&self, predicate: &str) -> Option<&str> {
        self.templates.get(predicate).map(String::as_str)
    }

    pub fn insert(&mut self, predicate: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(predicate.into(), template.into());
    }
}

impl Default for DefaultMessages {
    fn default() -> Self {
        let templates = [
            ("required", ":attribute is required"),
            ("float", ":attribute data format should be float"),
            ("email", ":attribute not a valid email format"),
            ("integer", ":attribute should be an integer"),
            ("minLength", ":attribute should be more than :params"),
            ("maxLength", ":attribute should be less than :params"),
            ("listed", ":attribute not listed in :params"),
            ("numeric", ":attribute should contain only numbers"),
            ("alpha", ":attribute should contain only letters"),
            ("alphaNumeric", ":attribute should contain only letters and numbers"),
            ("url", ":attribute not a valid URL"),
            ("uuid", ":attribute not a valid UUID"),
            ("min", ":attribute should be at least :params"),
            ("max", ":attribute should be at most :params"),
            ("between", ":attribute should be between :params"),
            ("matches", ":attribute does not match the required pattern"),
        ];

        Self {
            templates: templates
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Lookup service for messages no template covers.
///
/// The formatter calls `load_domain(MESSAGE_DOMAIN)` once per validation pass
/// before asking for lines.
pub trait MessageSource: Send + Sync {
    /// Prepare the named domain. Sources without domains ignore this.
    fn load_domain(&self, _domain: &str) {}

    /// Resolve a key, or `None` when the source has no line for it.
    fn get_line(&self, key: &str) -> Option<String>;
}

impl MessageSource for HashMap<String, String> {
    fn get_line(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[cfg(feature = "i18n")]
mod i18n {
    use super::MessageSource;
    use formgate_i18n::{I18n, MessageBundle};
    use formgate_log::warn;

    impl MessageSource for I18n {
        fn load_domain(&self, domain: &str) {
            if let Err(e) = I18n::load_domain(self, domain) {
                warn!("Could not load message domain {}: {}", domain, e);
            }
        }

        fn get_line(&self, key: &str) -> Option<String> {
            I18n::get_line(self, key).filter(|line| !line.is_empty())
        }
    }

    impl MessageSource for MessageBundle {
        fn get_line(&self, key: &str) -> Option<String> {
            self.get(key)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
        }
    }
}
