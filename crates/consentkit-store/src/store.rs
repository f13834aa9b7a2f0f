//! Namespaced consent persistence.

use crate::storage::KeyValueStorage;
use consentkit_core::StorageKeys;
use std::sync::Arc;
use tracing::{debug, warn};

const INITIAL_CHOICE_MARKER: &str = "1";

/// Per-banner view over a shared key-value backend.
///
/// Every mutating call writes through immediately. Backend failures never
/// escape: reads fall back to "absent", writes are dropped with a warning.
#[derive(Clone)]
pub struct ConsentStore {
    storage: Arc<dyn KeyValueStorage>,
    keys: StorageKeys,
}

impl ConsentStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, keys: StorageKeys) -> Self {
        Self { storage, keys }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStorage> {
        &self.storage
    }

    /// Stored grant, or `false` when nothing is recorded.
    pub fn get_consent(&self, category_id: &str) -> bool {
        self.stored_consent(category_id).unwrap_or(false)
    }

    /// Stored grant, distinguishing "never recorded" from "rejected".
    pub fn stored_consent(&self, category_id: &str) -> Option<bool> {
        self.read(&self.keys.consent(category_id)).map(|v| v == "true")
    }

    pub fn set_consent(&self, category_id: &str, granted: bool) {
        self.write(&self.keys.consent(category_id), if granted { "true" } else { "false" });
    }

    pub fn has_initial_choice(&self) -> bool {
        self.read(&self.keys.initial_choice())
            .is_some_and(|v| !v.is_empty())
    }

    /// Sets the flag permanently. Nothing unsets it.
    pub fn mark_initial_choice_made(&self) {
        self.write(&self.keys.initial_choice(), INITIAL_CHOICE_MARKER);
    }

    /// No-op when no version is configured.
    pub fn set_version(&self, version: Option<&str>) {
        if let Some(v) = version {
            self.write(&self.keys.version(), v);
        }
    }

    /// No-op when no date is configured.
    pub fn set_date(&self, date: Option<&str>) {
        if let Some(d) = date {
            self.write(&self.keys.date(), d);
        }
    }

    pub fn version(&self) -> Option<String> {
        self.read(&self.keys.version())
    }

    pub fn date(&self) -> Option<String> {
        self.read(&self.keys.date())
    }

    /// Raw read of an arbitrary key, with the same degradation rules.
    pub(crate) fn read(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Storage read of {} failed ({}): {}", key, self.storage.backend(), e);
                None
            }
        }
    }

    pub(crate) fn write(&self, key: &str, value: &str) {
        debug!("storage set {} = {}", key, value);
        if let Err(e) = self.storage.set_item(key, value) {
            warn!("Storage write of {} dropped ({}): {}", key, self.storage.backend(), e);
        }
    }
}
