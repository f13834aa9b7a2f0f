//! ConsentConfig: settings plus the callbacks the host registers.

use crate::dispatch::CallbackFailure;
use consentkit_core::{CategoryDefinition, CategoryId, ConsentSettings, Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// A zero-argument side effect. Returning `Err` (or panicking) counts as a
/// failed callback and is isolated by the dispatcher.
pub type Callback = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// Receives every isolated callback failure.
pub type ErrorHook = Arc<dyn Fn(&CallbackFailure) + Send + Sync>;

pub fn callback<F>(f: F) -> Callback
where
    F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Global lifecycle hooks.
#[derive(Clone, Default)]
pub struct Hooks {
    pub on_accept_all: Option<Callback>,
    pub on_reject_all: Option<Callback>,
    pub on_banner_open: Option<Callback>,
    pub on_banner_close: Option<Callback>,
    pub on_preferences_open: Option<Callback>,
    pub on_preferences_close: Option<Callback>,
    pub on_backdrop_open: Option<Callback>,
    pub on_backdrop_close: Option<Callback>,
    pub on_callback_error: Option<ErrorHook>,
}

/// Accept/reject callbacks for one category.
#[derive(Clone, Default)]
pub struct CategoryHooks {
    pub on_accept: Option<Callback>,
    pub on_reject: Option<Callback>,
}

pub type CategoryCallbacks = HashMap<CategoryId, CategoryHooks>;

/// Everything needed to build an engine.
#[derive(Clone, Default)]
pub struct ConsentConfig {
    pub settings: ConsentSettings,
    pub hooks: Hooks,
    pub callbacks: CategoryCallbacks,
}

impl ConsentConfig {
    pub fn new(settings: ConsentSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Append a category definition.
    pub fn category(mut self, definition: CategoryDefinition) -> Self {
        self.settings.cookie_types.push(definition);
        self
    }

    pub fn on_accept<F>(mut self, id: impl Into<CategoryId>, f: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.callbacks.entry(id.into()).or_default().on_accept = Some(callback(f));
        self
    }

    pub fn on_reject<F>(mut self, id: impl Into<CategoryId>, f: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.callbacks.entry(id.into()).or_default().on_reject = Some(callback(f));
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn on_accept_all<F>(mut self, f: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.on_accept_all = Some(callback(f));
        self
    }

    pub fn on_reject_all<F>(mut self, f: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.on_reject_all = Some(callback(f));
        self
    }

    pub fn on_callback_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&CallbackFailure) + Send + Sync + 'static,
    {
        self.hooks.on_callback_error = Some(Arc::new(f));
        self
    }

    /// Merge a partial update into a new config. Settings merge shallowly by
    /// top-level key; hooks and callbacks are replaced only when supplied.
    pub fn apply(&self, patch: ConfigPatch) -> Result<Self> {
        let settings = if patch.settings.is_empty() {
            self.settings.clone()
        } else {
            self.settings.merged_with(&patch.settings)?
        };
        Ok(Self {
            settings,
            hooks: patch.hooks.unwrap_or_else(|| self.hooks.clone()),
            callbacks: patch.callbacks.unwrap_or_else(|| self.callbacks.clone()),
        })
    }
}

/// Partial configuration for `ConsentManager::update_config`.
#[derive(Clone, Default)]
pub struct ConfigPatch {
    pub settings: serde_json::Map<String, serde_json::Value>,
    pub hooks: Option<Hooks>,
    pub callbacks: Option<CategoryCallbacks>,
}

impl ConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one top-level setting, using its camelCase name.
    pub fn set(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    /// Take every top-level key of a JSON object.
    pub fn settings_json(mut self, value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => {
                self.settings.extend(map);
                Ok(self)
            }
            other => Err(Error::config(format!(
                "settings patch must be a JSON object, got {}",
                other
            ))),
        }
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn callbacks(mut self, callbacks: CategoryCallbacks) -> Self {
        self.callbacks = Some(callbacks);
        self
    }
}
