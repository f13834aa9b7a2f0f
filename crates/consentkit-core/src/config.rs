//! Consent settings: the serde half of the banner configuration.
//!
//! Field names follow the widget's camelCase configuration object so the
//! same JSON can drive both. Callbacks are not data and live in
//! `consentkit-engine::ConsentConfig`.

use crate::error::{Error, Result};
use crate::keys::StorageKeys;
use crate::types::CategoryId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level consent settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsentSettings {
    /// Show the banner on first visit. When false the icon appears directly.
    pub show_banner: bool,
    /// Namespaces every storage key so several banners can share an origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_suffix: Option<String>,
    /// Persisted alongside each finalized decision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent_date: Option<String>,
    pub mode: PresentationMode,
    pub background: BackgroundConfig,
    pub position: PositionConfig,
    pub cookie_icon: CookieIconConfig,
    pub text: TextConfig,
    /// Consent categories, in display order.
    pub cookie_types: Vec<CategoryDefinition>,
}

/// Immutable definition of one consent category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDefinition {
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Always granted; the toggle is locked.
    #[serde(default)]
    pub required: bool,
    /// Fallback used only before any stored choice exists.
    #[serde(default)]
    pub default_value: bool,
}

impl CategoryDefinition {
    pub fn new(id: impl Into<CategoryId>) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            description: String::new(),
            required: false,
            default_value: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_on(mut self) -> Self {
        self.default_value = true;
        self
    }

    pub fn named(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.name = name.into();
        self.description = description.into();
        self
    }
}

/// `wizard` suppresses auto-focus on the initial banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationMode {
    Wizard,
    #[default]
    #[serde(other)]
    Standard,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackgroundConfig {
    pub show_background: bool,
}

/// Opaque CSS placement token, passed through to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CookieIconConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub banner: BannerText,
    pub preferences: PreferencesText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BannerText {
    pub description: String,
    pub accept_all_button_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_all_button_accessible_label: Option<String>,
    pub reject_non_essential_button_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_non_essential_button_accessible_label: Option<String>,
    pub preferences_button_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences_button_accessible_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesText {
    pub title: String,
    pub description: String,
}

// ============================================================
// Defaults
// ============================================================

impl Default for ConsentSettings {
    fn default() -> Self {
        Self {
            show_banner: true,
            banner_suffix: None,
            consent_version: None,
            consent_date: None,
            mode: PresentationMode::default(),
            background: BackgroundConfig::default(),
            position: PositionConfig::default(),
            cookie_icon: CookieIconConfig::default(),
            text: TextConfig::default(),
            cookie_types: Vec::new(),
        }
    }
}

impl Default for BannerText {
    fn default() -> Self {
        Self {
            description: "We use cookies on our site to enhance your user experience, \
                provide personalized content, and analyze our traffic."
                .into(),
            accept_all_button_text: "Accept all".into(),
            accept_all_button_accessible_label: None,
            reject_non_essential_button_text: "Reject non-essential".into(),
            reject_non_essential_button_accessible_label: None,
            preferences_button_text: "Preferences".into(),
            preferences_button_accessible_label: None,
        }
    }
}

impl Default for PreferencesText {
    fn default() -> Self {
        Self {
            title: "Privacy preferences".into(),
            description: String::new(),
        }
    }
}

// ============================================================
// Loading
// ============================================================

impl ConsentSettings {
    /// Load settings from a TOML or JSON file (by extension), falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::parse(path, &content) {
                Ok(settings) => {
                    tracing::info!("Loaded consent settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}; using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No settings at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(content)
        } else {
            Self::from_toml_str(content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write the current settings as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Shallow merge: each top-level key of `patch` replaces the matching
    /// setting wholesale; nested tables are not merged.
    pub fn merged_with(&self, patch: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let mut base = match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => map,
            _ => return Err(Error::config("settings did not serialize to an object")),
        };
        for (key, value) in patch {
            base.insert(key.clone(), value.clone());
        }
        Ok(serde_json::from_value(serde_json::Value::Object(base))?)
    }

    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::new(self.banner_suffix.as_deref())
    }

    pub fn backdrop_enabled(&self) -> bool {
        self.background.show_background
    }

    pub fn auto_focus_banner(&self) -> bool {
        self.mode != PresentationMode::Wizard
    }
}
