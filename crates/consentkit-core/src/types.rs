//! Core types for Consentkit

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Consent category identifier - cheaply cloneable
#[derive(Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CategoryId(Arc<str>);

impl CategoryId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CategoryId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for CategoryId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<CategoryId> for String {
    fn from(id: CategoryId) -> Self {
        id.0.to_string()
    }
}

impl Borrow<str> for CategoryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Per-category grant map, ordered by id.
pub type ConsentMap = BTreeMap<CategoryId, bool>;

/// Lifecycle of a visitor's decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Uninitialized,
    AwaitingDecision,
    Decided,
}

/// The single visible consent surface. The backdrop is tracked separately.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceState {
    #[default]
    None,
    Icon,
    Banner,
    Modal,
}

impl std::fmt::Display for SurfaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SurfaceState::None => "none",
            SurfaceState::Icon => "icon",
            SurfaceState::Banner => "banner",
            SurfaceState::Modal => "modal",
        };
        f.write_str(name)
    }
}

/// Where input focus goes when a surface opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusTarget {
    /// The banner's accept-all button.
    BannerPrimaryAction,
    /// The preferences surface's close affordance.
    ModalClose,
}

/// Discrete inputs delivered by the rendering layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    AcceptAll,
    RejectAll,
    OpenPreferences,
    TogglePreference { id: CategoryId, granted: bool },
    ConfirmPreferences,
    ClosePreferences,
    EscapePressed,
    IconClicked,
}

/// One row of the preferences surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PreferenceRow {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub checked: bool,
    /// Required categories render checked and cannot be toggled.
    pub locked: bool,
}

/// Everything a renderer needs to draw the preferences surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PreferencesView {
    pub title: String,
    pub description: String,
    pub rows: Vec<PreferenceRow>,
}

impl PreferencesView {
    pub fn row(&self, id: &str) -> Option<&PreferenceRow> {
        self.rows.iter().find(|r| r.id.as_str() == id)
    }
}
