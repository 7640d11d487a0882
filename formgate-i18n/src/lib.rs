//! Localized message lookup for formgate
//!
//! Validation error templates are resolved through this crate when no
//! custom or default template applies:
//!
//! - **Message bundles**: per-locale key/value tables, loaded from JSON
//! - **Locale fallback**: `en-US` falls back to `en`, then to the configured
//!   fallback and default locales
//! - **Domains**: files such as `locales/en/validation.json` are loaded on
//!   demand and their keys scoped as `validation.KEY`
//!
//! # Quick Start
//!
//! ```rust
//! use formgate_i18n::{I18n, Locale, MessageBundle};
//!
//! let i18n = I18n::new().with_default_locale(Locale::en());
//!
//! let mut en = MessageBundle::new();
//! en.add("validation.IS_REQUIRED", "This field is required");
//! i18n.add_bundle(&Locale::en(), en);
//!
//! i18n.load_domain("validation").unwrap();
//! assert_eq!(
//!     i18n.get_line("IS_REQUIRED").as_deref(),
//!     Some("This field is required")
//! );
//! assert_eq!(i18n.get_line("IS_UNKNOWN"), None);
//! ```

mod error;
mod locale;
mod messages;

pub use error::I18nError;
pub use locale::Locale;
pub use messages::{I18n, MessageBundle, Messages};

/// Result type for i18n operations
pub type Result<T> = std::result::Result<T, I18nError>;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{I18n, I18nError, Locale, MessageBundle, Messages, Result};
}
