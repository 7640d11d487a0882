//! Locale representation
//!
//! Only the parts of a BCP 47 tag that matter for bundle lookup are kept:
//! language, optional script and optional region.

use crate::{I18nError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A locale (language + optional script and region).
///
/// ```
/// use formgate_i18n::Locale;
///
/// let en_us: Locale = "en_us".parse().unwrap();
/// assert_eq!(en_us.tag(), "en-US");
/// assert_eq!(en_us.language_only().tag(), "en");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    /// Language code (ISO 639-1, e.g., "en", "id", "de")
    pub language: String,
    /// Optional script (e.g., "Latn", "Hans")
    pub script: Option<String>,
    /// Optional region code (ISO 3166-1, e.g., "US", "ID")
    pub region: Option<String>,
}

impl Locale {
    /// Create a new locale.
    pub fn new(language: impl Into<String>, region: Option<impl Into<String>>) -> Self {
        Self {
            language: language.into().to_lowercase(),
            script: None,
            region: region.map(|r| r.into().to_uppercase()),
        }
    }

    /// Parse a tag such as `en`, `en-US`, `en_us` or `zh-Hans-CN`.
    pub fn parse(tag: &str) -> Result<Self> {
        let mut parts = tag.trim().split(['-', '_']);

        let language = parts.next().unwrap_or_default().to_lowercase();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(I18nError::InvalidLocale(tag.to_string()));
        }

        let mut script = None;
        let mut region = None;

        for part in parts {
            let alpha = part.chars().all(|c| c.is_ascii_alphabetic());
            match part.len() {
                4 if alpha => script = Some(title_case(part)),
                2 if alpha => region = Some(part.to_uppercase()),
                3 if part.chars().all(|c| c.is_ascii_digit()) => region = Some(part.to_string()),
                _ => return Err(I18nError::InvalidLocale(tag.to_string())),
            }
        }

        Ok(Self {
            language,
            script,
            region,
        })
    }

    /// Get the language tag (e.g., "en-US").
    pub fn tag(&self) -> String {
        let mut tag = self.language.clone();
        if let Some(ref script) = self.script {
            tag.push('-');
            tag.push_str(script);
        }
        if let Some(ref region) = self.region {
            tag.push('-');
            tag.push_str(region);
        }
        tag
    }

    /// Get the language-only locale (strips region, keeps script).
    pub fn language_only(&self) -> Self {
        Self {
            language: self.language.clone(),
            script: self.script.clone(),
            region: None,
        }
    }

    /// English (no region)
    pub fn en() -> Self {
        Self::new("en", None::<&str>)
    }

    /// English (US)
    pub fn en_us() -> Self {
        Self::new("en", Some("US"))
    }

    /// Indonesian (no region)
    pub fn id() -> Self {
        Self::new("id", None::<&str>)
    }

    /// German (no region)
    pub fn de() -> Self {
        Self::new("de", None::<&str>)
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Locale {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
