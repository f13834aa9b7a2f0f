//! Storage key scheme.
//!
//! All keys share one namespace per banner:
//!
//!   consent_<categoryId><ns>     "true" | "false"
//!   consent_initialChoice<ns>    presence flag
//!   consent_version<ns>          opaque string
//!   consent_date<ns>             opaque string
//!
//! where `<ns>` is empty, or `_<bannerSuffix>` when a suffix is configured.
//! The `cookieConsent_` prefix belongs to the older layout and is only read
//! during migration.

const PREFIX: &str = "consent_";
const LEGACY_PREFIX: &str = "cookieConsent_";

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StorageKeys {
    namespace: String,
}

impl StorageKeys {
    /// Build the key scheme for an optional banner suffix. An empty suffix
    /// counts as no suffix.
    pub fn new(banner_suffix: Option<&str>) -> Self {
        let namespace = match banner_suffix {
            Some(s) if !s.is_empty() => format!("_{}", s),
            _ => String::new(),
        };
        Self { namespace }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn consent(&self, category_id: &str) -> String {
        format!("{PREFIX}{category_id}{}", self.namespace)
    }

    pub fn initial_choice(&self) -> String {
        format!("{PREFIX}initialChoice{}", self.namespace)
    }

    pub fn version(&self) -> String {
        format!("{PREFIX}version{}", self.namespace)
    }

    pub fn date(&self) -> String {
        format!("{PREFIX}date{}", self.namespace)
    }

    pub fn legacy_consent(&self, category_id: &str) -> String {
        format!("{LEGACY_PREFIX}{category_id}{}", self.namespace)
    }

    pub fn legacy_initial_choice(&self) -> String {
        format!("{LEGACY_PREFIX}InitialChoice{}", self.namespace)
    }
}
