//! Message bundles and the `I18n` lookup service.

use crate::{I18nError, Locale, Result};
use formgate_log::{debug, trace, warn};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A bundle of messages for a single locale.
#[derive(Debug, Clone, Default)]
pub struct MessageBundle {
    /// Messages keyed by (possibly dotted) message ID
    messages: HashMap<String, String>,
}

impl MessageBundle {
    /// Create a new empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from JSON.
    ///
    /// Nested objects flatten into dotted keys, so
    /// `{"validation": {"IS_EMAIL": "..."}}` yields `validation.IS_EMAIL`.
    /// Non-string leaves are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(map) = data else {
            return Err(I18nError::ParseError(
                "message file must contain a JSON object".to_string(),
            ));
        };

        let mut bundle = Self::new();
        bundle.flatten_into(None, map);
        Ok(bundle)
    }

    /// Load from JSON, prefixing every key with `domain.`.
    pub fn from_json_scoped(domain: &str, json: &str) -> Result<Self> {
        let inner = Self::from_json(json)?;
        let mut bundle = Self::new();
        for (key, message) in inner.messages {
            bundle.messages.insert(format!("{}.{}", domain, key), message);
        }
        Ok(bundle)
    }

    fn flatten_into(
        &mut self,
        prefix: Option<&str>,
        map: serde_json::Map<String, serde_json::Value>,
    ) {
        for (key, value) in map {
            let key = match prefix {
                Some(prefix) => format!("{}.{}", prefix, key),
                None => key,
            };
            match value {
                serde_json::Value::String(s) => {
                    self.messages.insert(key, s);
                }
                serde_json::Value::Object(obj) => self.flatten_into(Some(&key), obj),
                _ => {}
            }
        }
    }

    /// Add a message.
    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    /// Copy every message of `other` into this bundle, overwriting duplicates.
    pub fn merge(&mut self, other: MessageBundle) {
        self.messages.extend(other.messages);
    }

    /// Get a message.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(|s| s.as_str())
    }

    /// Check if bundle has a message.
    pub fn has(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }

    /// Number of messages in the bundle.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the bundle is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Get all message keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.messages.keys()
    }
}

/// Collection of message bundles for multiple locales.
#[derive(Debug, Default)]
pub struct Messages {
    /// Bundles keyed by locale tag
    bundles: HashMap<String, MessageBundle>,
}

impl Messages {
    /// Create a new messages collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bundle for a locale, merging into any bundle already present.
    pub fn add_bundle(&mut self, locale: &Locale, bundle: MessageBundle) {
        self.bundles.entry(locale.tag()).or_default().merge(bundle);
    }

    /// Get a bundle for a locale, trying the language-only locale next.
    pub fn get_bundle(&self, locale: &Locale) -> Option<&MessageBundle> {
        if let Some(bundle) = self.bundles.get(&locale.tag()) {
            return Some(bundle);
        }

        if locale.region.is_some() {
            return self.bundles.get(&locale.language_only().tag());
        }

        None
    }

    /// Load every `<locale>.json` file found directly in `dir`.
    ///
    /// Expected structure:
    /// - `locales/en.json`
    /// - `locales/en-US.json`
    /// - `locales/id.json`
    pub fn load_from_dir(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            return Err(I18nError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Directory not found: {:?}", dir),
            )));
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();

            if path.extension().is_some_and(|ext| ext == "json") {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .ok_or_else(|| I18nError::ParseError("Invalid filename".to_string()))?;

                let locale = Locale::parse(stem)?;
                let bundle = MessageBundle::from_json(&fs::read_to_string(&path)?)?;
                debug!("Loaded {} messages for {}", bundle.len(), locale);

                self.add_bundle(&locale, bundle);
            }
        }

        Ok(())
    }
}

/// Main i18n interface.
///
/// Lookups walk the active locale, the fallback locale and finally the
/// default locale. Cloning shares the underlying bundles.
pub struct I18n {
    messages: Arc<RwLock<Messages>>,
    default_locale: Locale,
    fallback_locale: Option<Locale>,
    locale: Option<Locale>,
    base_dir: Option<PathBuf>,
    loaded_domains: Arc<RwLock<HashSet<String>>>,
    active_domain: Arc<RwLock<Option<String>>>,
}

impl I18n {
    /// Create a new i18n instance with `en` as default locale.
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Messages::new())),
            default_locale: Locale::en(),
            fallback_locale: None,
            locale: None,
            base_dir: None,
            loaded_domains: Arc::new(RwLock::new(HashSet::new())),
            active_domain: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the default locale.
    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    /// Set the fallback locale.
    pub fn with_fallback(mut self, locale: Locale) -> Self {
        self.fallback_locale = Some(locale);
        self
    }

    /// Set the locale used by `get_line`.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Directory holding `<locale>/<domain>.json` files for `load_domain`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Load `<locale>.json` bundles from a directory.
    pub fn load_from_dir(self, dir: impl AsRef<Path>) -> Result<Self> {
        self.messages.write().load_from_dir(dir)?;
        Ok(self)
    }

    /// Add a message bundle.
    pub fn add_bundle(&self, locale: &Locale, bundle: MessageBundle) {
        self.messages.write().add_bundle(locale, bundle);
    }

    /// Get the default locale.
    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    /// The locale `get_line` resolves against.
    pub fn active_locale(&self) -> &Locale {
        self.locale.as_ref().unwrap_or(&self.default_locale)
    }

    fn locale_chain<'a>(&'a self, locale: &'a Locale) -> impl Iterator<Item = &'a Locale> {
        std::iter::once(locale)
            .chain(self.fallback_locale.iter())
            .chain(std::iter::once(&self.default_locale))
    }

    /// Look a key up through the locale chain starting at `locale`.
    pub fn lookup(&self, key: &str, locale: &Locale) -> Option<String> {
        let messages = self.messages.read();

        self.locale_chain(locale)
            .filter_map(|l| messages.get_bundle(l))
            .find_map(|bundle| bundle.get(key))
            .map(str::to_string)
    }

    /// Make `domain` the scope for `get_line`, reading its files from the
    /// base directory the first time it is requested.
    ///
    /// Missing files are skipped; unreadable or malformed ones are reported.
    pub fn load_domain(&self, domain: &str) -> Result<()> {
        if domain.is_empty() || domain.contains(['/', '\\', '.']) {
            return Err(I18nError::InvalidDomain(domain.to_string()));
        }

        *self.active_domain.write() = Some(domain.to_string());

        if !self.loaded_domains.write().insert(domain.to_string()) {
            return Ok(());
        }

        let Some(base_dir) = self.base_dir.as_ref() else {
            return Ok(());
        };

        let locales: Vec<Locale> = self.locale_chain(self.active_locale()).cloned().collect();
        for locale in locales {
            let path = base_dir
                .join(locale.tag())
                .join(format!("{}.json", domain));
            if !path.is_file() {
                trace!("No {} messages at {:?}", domain, path);
                continue;
            }

            let bundle = fs::read_to_string(&path)
                .map_err(I18nError::from)
                .and_then(|json| MessageBundle::from_json_scoped(domain, &json));

            match bundle {
                Ok(bundle) => {
                    debug!("Loaded {} {} messages for {}", bundle.len(), domain, locale);
                    self.add_bundle(&locale, bundle);
                }
                Err(e) => {
                    warn!("Failed to load {:?}: {}", path, e);
                    // Allow a retry once the file is fixed.
                    self.loaded_domains.write().remove(domain);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Resolve a key in the active locale, scoped to the active domain first.
    pub fn get_line(&self, key: &str) -> Option<String> {
        let locale = self.active_locale();

        if let Some(domain) = self.active_domain.read().as_deref() {
            if let Some(line) = self.lookup(&format!("{}.{}", domain, key), locale) {
                return Some(line);
            }
        }

        self.lookup(key, locale)
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for I18n {
    fn clone(&self) -> Self {
        Self {
            messages: Arc::clone(&self.messages),
            default_locale: self.default_locale.clone(),
            fallback_locale: self.fallback_locale.clone(),
            locale: self.locale.clone(),
            base_dir: self.base_dir.clone(),
            loaded_domains: Arc::clone(&self.loaded_domains),
            active_domain: Arc::clone(&self.active_domain),
        }
    }
}

impl std::fmt::Debug for I18n {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18n")
            .field("default_locale", &self.default_locale)
            .field("fallback_locale", &self.fallback_locale)
            .field("locale", &self.locale)
            .field("base_dir", &self.base_dir)
            .finish_non_exhaustive()
    }
}
