//! LegacyMigration: carries decisions stored under the older
//! `cookieConsent_*` layout forward to the current `consent_*` layout.
//!
//! Non-destructive: legacy keys are left in place and an existing current
//! key is never overwritten, so running it again is harmless.

use crate::store::ConsentStore;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The current layout already records a choice.
    AlreadyCurrent,
    /// Neither layout records a choice.
    NothingToMigrate,
    /// Legacy decisions copied forward.
    Migrated { categories: usize },
}

pub struct LegacyMigration<'a> {
    store: &'a ConsentStore,
}

impl<'a> LegacyMigration<'a> {
    pub fn new(store: &'a ConsentStore) -> Self {
        Self { store }
    }

    /// Bring the store up to the current layout for the given categories.
    pub fn run<'id, I>(&self, category_ids: I) -> MigrationOutcome
    where
        I: IntoIterator<Item = &'id str>,
    {
        let keys = self.store.keys();

        if self.store.has_initial_choice() {
            debug!("Consent layout current for namespace '{}'", keys.namespace());
            return MigrationOutcome::AlreadyCurrent;
        }

        let legacy_flag = self
            .store
            .read(&keys.legacy_initial_choice())
            .is_some_and(|v| !v.is_empty());
        if !legacy_flag {
            return MigrationOutcome::NothingToMigrate;
        }

        info!("Migrating legacy consent keys for namespace '{}'", keys.namespace());

        let mut categories = 0;
        for id in category_ids {
            if self.store.stored_consent(id).is_some() {
                continue;
            }
            if let Some(value) = self.store.read(&keys.legacy_consent(id)) {
                self.store.set_consent(id, value == "true");
                categories += 1;
            }
        }

        // Flag last: an interrupted run is detected and resumed next load.
        self.store.mark_initial_choice_made();
        info!("Legacy migration complete ({} categories)", categories);

        MigrationOutcome::Migrated { categories }
    }
}
