//! Rule-string validation for formgate
//!
//! Fields are declared with short rule strings such as
//! `required|minLength[3]`, checked against a map of source values, and
//! every failure is turned into a readable message.
//!
//! # Examples
//!
//! ## Registering rules
//!
//! ```
//! use formgate_validation::{Rules, RuleMessages};
//! use serde_json::json;
//!
//! let mut rules = Rules::from_json(json!({
//!     "username": "jo",
//!     "email": "not-an-email",
//!     "color": "purple",
//! }))
//! .unwrap();
//!
//! rules
//!     .add_rule("username", "Username", "required|minLength[3]")
//!     .add_rule("color", "Color", "listed[red, green, blue]")
//!     .add_rule_with_messages(
//!         "email",
//!         "E-mail",
//!         "required|email",
//!         RuleMessages::from([("email", "Please enter a valid e-mail")]),
//!     );
//!
//! assert!(!rules.validate().unwrap());
//! assert_eq!(
//!     rules.errors(),
//!     vec![
//!         "username should be more than 3",
//!         "color not listed in red,green,blue",
//!         "Please enter a valid e-mail",
//!     ]
//! );
//! ```
//!
//! ## Configuration errors
//!
//! A pass that cannot run is an error, not a failed validation:
//!
//! ```
//! use formgate_validation::{Rules, RulesError};
//!
//! let mut rules = Rules::new();
//! rules.add_rule("name", "Name", "required");
//!
//! assert!(matches!(rules.validate(), Err(RulesError::MissingSource)));
//! ```
//!
//! ## Custom predicates
//!
//! ```
//! use formgate_validation::Rules;
//! use serde_json::json;
//!
//! let mut rules = Rules::with_source([("port", json!(8081))]);
//! rules
//!     .predicates_mut()
//!     .register("even", |values, _| values.iter().all(|v| v.as_i64().is_some_and(|n| n % 2 == 0)));
//! rules.set_message("even", ":attribute must be even");
//! rules.add_rule("port", "Port", "even");
//!
//! assert!(!rules.validate().unwrap());
//! assert_eq!(rules.errors(), vec!["port must be even"]);
//! ```

mod config;
mod errors;
mod formatter;
mod messages;
mod parser;
mod predicates;
mod rules;
mod runner;

pub use config::RuleSet;
pub use errors::{Result, RulesError, ValidationError, ValidationErrors};
pub use formatter::{ErrorFormatter, Failure, sprintf};
pub use messages::{DefaultMessages, MESSAGE_DOMAIN, MessageSource, RuleMessages};
pub use parser::{RuleToken, dispatch_name, parse, studly_case};
pub use predicates::{PredicateFn, PredicateSet, value_text};
pub use rules::{FieldRule, RuleDescriptor, Rules, RunState};
pub use runner::normalize;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        MessageSource, PredicateSet, RuleDescriptor, RuleMessages, RuleSet, Rules, RulesError,
        ValidationError,
    };
}
