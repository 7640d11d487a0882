// formgate - rule-string validation for form and request data
//
// Fields are declared with compact rule strings such as `required|minLength[3]`
// and every failed rule becomes a readable, optionally translated message.

// Re-export the validation engine
pub use formgate_validation::*;

// Re-export supporting crates
pub use formgate_log;

#[cfg(feature = "i18n")]
pub use formgate_i18n;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        DefaultMessages, MessageSource, PredicateSet, RuleDescriptor, RuleMessages, RuleSet,
        Rules, RulesError, RunState, ValidationError, ValidationErrors,
    };

    #[cfg(feature = "i18n")]
    pub use formgate_i18n::{I18n, Locale, MessageBundle};
}
