//! ConsentEngine: the consent state machine.
//!
//! Phases: `Uninitialized -> AwaitingDecision -> Decided`, or straight to
//! `Decided` when a stored choice exists at bootstrap.
//!
//! Replay asymmetry: bootstrap replays only accept callbacks (required
//! categories unconditionally, others when stored as granted). Rejected
//! integrations simply never load. Dismissing a reopened preferences
//! surface replays both accept and reject callbacks from storage.

use crate::config::{CategoryCallbacks, ConsentConfig, Hooks};
use crate::dispatch::CallbackDispatcher;
use crate::registry::CategoryRegistry;
use crate::surface::{SurfaceController, SurfaceRenderer};
use consentkit_core::{
    CategoryDefinition, CategoryId, ConsentMap, ConsentSettings, Phase, PreferenceRow,
    PreferencesView, SurfaceState, UiEvent,
};
use consentkit_store::{ConsentStore, KeyValueStorage, LegacyMigration, MigrationOutcome};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ConsentEngine {
    settings: Arc<ConsentSettings>,
    registry: CategoryRegistry,
    callbacks: CategoryCallbacks,
    hooks: Hooks,
    store: ConsentStore,
    dispatcher: CallbackDispatcher,
    surfaces: SurfaceController,
    phase: Phase,
    /// Toggle states collected while the preferences surface is open.
    pending: ConsentMap,
}

impl ConsentEngine {
    pub fn new(
        config: ConsentConfig,
        storage: Arc<dyn KeyValueStorage>,
        renderer: Box<dyn SurfaceRenderer>,
    ) -> Self {
        let ConsentConfig {
            settings,
            hooks,
            callbacks,
        } = config;
        let settings = Arc::new(settings);
        let registry = CategoryRegistry::new(&settings.cookie_types);
        let store = ConsentStore::new(storage, settings.storage_keys());
        let dispatcher = CallbackDispatcher::new(hooks.on_callback_error.clone());
        let surfaces =
            SurfaceController::new(renderer, settings.clone(), hooks.clone(), dispatcher.clone());

        Self {
            settings,
            registry,
            callbacks,
            hooks,
            store,
            dispatcher,
            surfaces,
            phase: Phase::Uninitialized,
            pending: ConsentMap::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn surface(&self) -> SurfaceState {
        self.surfaces.state()
    }

    pub fn surfaces(&self) -> &SurfaceController {
        &self.surfaces
    }

    pub fn settings(&self) -> &ConsentSettings {
        &self.settings
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ConsentStore {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Page load
    // -----------------------------------------------------------------------

    /// Runs once per page load.
    pub fn bootstrap(&mut self) {
        if self.phase != Phase::Uninitialized {
            debug!("bootstrap ignored: already {:?}", self.phase);
            return;
        }

        if let MigrationOutcome::Migrated { categories } =
            LegacyMigration::new(&self.store).run(self.registry.ids())
        {
            info!("Carried {} legacy consent decisions forward", categories);
        }

        if self.store.has_initial_choice() {
            self.phase = Phase::Decided;
            info!("Stored consent found; replaying accepted categories");
            self.load_required_categories();
            self.run_accepted_callbacks();
            self.surfaces.show_icon();
        } else {
            self.phase = Phase::AwaitingDecision;
            if self.settings.show_banner {
                info!("No stored consent; showing banner");
                self.surfaces.show_backdrop();
                self.surfaces.show_banner();
            } else {
                info!("No stored consent; banner suppressed");
                self.surfaces.show_icon();
            }
        }
    }

    fn load_required_categories(&self) {
        for def in self.registry.required() {
            self.dispatch_category(def, true);
        }
    }

    fn run_accepted_callbacks(&self) {
        for def in self.registry.iter().filter(|d| !d.required) {
            if self.store.get_consent(def.id.as_str()) {
                self.dispatch_category(def, true);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Decisions
    // -----------------------------------------------------------------------

    /// Accept or reject every non-required category.
    pub fn decide_all(&mut self, accepted: bool) {
        if !self.ready("decide_all") {
            return;
        }
        info!("Visitor chose {}", if accepted { "accept all" } else { "reject non-essential" });
        self.apply_outcome(|_| accepted);

        if accepted {
            self.dispatcher.dispatch("onAcceptAll", self.hooks.on_accept_all.as_ref());
        } else {
            self.dispatcher.dispatch("onRejectAll", self.hooks.on_reject_all.as_ref());
        }
        self.finalize();
    }

    /// Per-category decision from the preferences surface. Categories missing
    /// from `choices` keep their seeded preference state.
    pub fn decide_from_preferences(&mut self, choices: &ConsentMap) {
        if !self.ready("decide_from_preferences") {
            return;
        }
        info!("Visitor confirmed preferences");
        let has_choice = self.store.has_initial_choice();
        let seeded: ConsentMap = self
            .registry
            .iter()
            .map(|d| (d.id.clone(), self.seed_value(d, has_choice)))
            .collect();
        self.apply_outcome(|def| {
            choices
                .get(def.id.as_str())
                .or_else(|| seeded.get(def.id.as_str()))
                .copied()
                .unwrap_or(false)
        });
        self.finalize();
    }

    /// Dismissed before any choice: required and default-on categories are
    /// accepted, the rest rejected.
    pub fn close_without_choice(&mut self) {
        if !self.ready("close_without_choice") {
            return;
        }
        if self.store.has_initial_choice() {
            debug!("close_without_choice ignored: a choice is already stored");
            return;
        }
        info!("Preferences dismissed without a choice; applying defaults");
        self.apply_outcome(|def| def.default_value);
        self.finalize();
    }

    /// Persist and dispatch one outcome per category. Required categories are
    /// forced to granted regardless of `decide`.
    fn apply_outcome<F>(&self, decide: F)
    where
        F: Fn(&CategoryDefinition) -> bool,
    {
        for def in self.registry.iter() {
            let granted = def.required || decide(def);
            self.store.set_consent(def.id.as_str(), granted);
            self.dispatch_category(def, granted);
        }
    }

    fn finalize(&mut self) {
        self.store.mark_initial_choice_made();
        self.store.set_version(self.settings.consent_version.as_deref());
        self.store.set_date(self.settings.consent_date.as_deref());
        self.phase = Phase::Decided;
        self.pending.clear();
        self.surfaces.hide_all();
        self.surfaces.show_icon();
    }

    // -----------------------------------------------------------------------
    // Preferences surface
    // -----------------------------------------------------------------------

    /// Open the preferences surface, seeded from storage.
    pub fn reopen_preferences(&mut self) {
        if !self.ready("reopen_preferences") {
            return;
        }
        let has_choice = self.store.has_initial_choice();
        self.pending = self
            .registry
            .iter()
            .map(|d| (d.id.clone(), self.seed_value(d, has_choice)))
            .collect();
        let view = self.preferences_view();
        self.surfaces.show_modal(&view);
    }

    /// Record a toggle. Unknown and required categories are ignored, as is
    /// any toggle while the preferences surface is closed.
    pub fn toggle_preference(&mut self, id: &str, granted: bool) {
        if self.surfaces.state() != SurfaceState::Modal {
            debug!("toggle of '{}' ignored: preferences closed", id);
            return;
        }
        match self.registry.find(id) {
            Some(def) if !def.required => {
                self.pending.insert(def.id.clone(), granted);
            }
            Some(_) => debug!("toggle of required '{}' ignored", id),
            None => debug!("toggle of unknown '{}' ignored", id),
        }
    }

    pub fn confirm_preferences(&mut self) {
        if self.surfaces.state() != SurfaceState::Modal {
            debug!("confirm ignored: preferences closed");
            return;
        }
        let choices = std::mem::take(&mut self.pending);
        self.decide_from_preferences(&choices);
    }

    /// Close the preferences surface without confirming.
    pub fn dismiss_preferences(&mut self) {
        if self.surfaces.state() != SurfaceState::Modal {
            return;
        }
        if self.store.has_initial_choice() {
            debug!("Preferences dismissed; replaying stored decisions");
            self.pending.clear();
            self.surfaces.hide_all();
            self.surfaces.show_icon();
            self.replay_stored_decisions();
        } else {
            self.close_without_choice();
        }
    }

    /// Escape or outside click: drop pending toggles and close. Nothing is
    /// dispatched once a choice is stored.
    pub fn cancel_preferences(&mut self) {
        if self.surfaces.state() != SurfaceState::Modal {
            return;
        }
        if self.store.has_initial_choice() {
            debug!("Preferences cancelled; stored decisions unchanged");
            self.pending.clear();
            self.surfaces.hide_all();
            self.surfaces.show_icon();
        } else {
            self.close_without_choice();
        }
    }

    fn replay_stored_decisions(&self) {
        for def in self.registry.iter() {
            let granted = def.required || self.store.get_consent(def.id.as_str());
            self.dispatch_category(def, granted);
        }
    }

    /// Route a UI event to its transition.
    pub fn handle(&mut self, event: UiEvent) {
        debug!("ui event {:?}", event);
        match event {
            UiEvent::AcceptAll => self.decide_all(true),
            UiEvent::RejectAll => self.decide_all(false),
            UiEvent::OpenPreferences => self.reopen_preferences(),
            UiEvent::TogglePreference { id, granted } => {
                self.toggle_preference(id.as_str(), granted)
            }
            UiEvent::ConfirmPreferences => self.confirm_preferences(),
            UiEvent::ClosePreferences => self.dismiss_preferences(),
            UiEvent::EscapePressed => self.cancel_preferences(),
            UiEvent::IconClicked => {
                if self.surfaces.state() == SurfaceState::Modal {
                    self.dismiss_preferences();
                } else {
                    self.reopen_preferences();
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Effective consent per category. Required categories always read granted.
    pub fn accepted_categories(&self) -> ConsentMap {
        self.registry
            .iter()
            .map(|d| (d.id.clone(), d.required || self.store.get_consent(d.id.as_str())))
            .collect()
    }

    pub fn rejected_categories(&self) -> Vec<CategoryId> {
        self.accepted_categories()
            .into_iter()
            .filter_map(|(id, granted)| (!granted).then_some(id))
            .collect()
    }

    pub fn consent_version(&self) -> Option<String> {
        self.store.version()
    }

    pub fn consent_date(&self) -> Option<String> {
        self.store.date()
    }

    /// True when a version is configured and differs from the stored one.
    pub fn consent_outdated(&self) -> bool {
        match self.settings.consent_version.as_deref() {
            Some(current) => self.store.version().as_deref() != Some(current),
            None => false,
        }
    }

    /// Rows for the preferences surface, reflecting pending toggles.
    pub fn preferences_view(&self) -> PreferencesView {
        let has_choice = self.store.has_initial_choice();
        let rows = self
            .registry
            .iter()
            .map(|d| PreferenceRow {
                id: d.id.clone(),
                name: d.name.clone(),
                description: d.description.clone(),
                checked: d.required
                    || self
                        .pending
                        .get(d.id.as_str())
                        .copied()
                        .unwrap_or_else(|| self.seed_value(d, has_choice)),
                locked: d.required,
            })
            .collect();
        PreferencesView {
            title: self.settings.text.preferences.title.clone(),
            description: self.settings.text.preferences.description.clone(),
            rows,
        }
    }

    /// Discard every surface. The engine is unusable for UI afterwards;
    /// stored consent is untouched.
    pub fn teardown(&mut self) {
        self.surfaces.teardown();
        self.pending.clear();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Checkbox state before any toggle: stored grant, else the default when
    /// no choice has ever been made.
    fn seed_value(&self, def: &CategoryDefinition, has_choice: bool) -> bool {
        if def.required || self.store.get_consent(def.id.as_str()) {
            true
        } else if !has_choice {
            def.default_value
        } else {
            false
        }
    }

    fn dispatch_category(&self, def: &CategoryDefinition, granted: bool) {
        let hooks = self.callbacks.get(def.id.as_str());
        if granted {
            let name = format!("{}.onAccept", def.id);
            self.dispatcher
                .dispatch(&name, hooks.and_then(|h| h.on_accept.as_ref()));
        } else {
            let name = format!("{}.onReject", def.id);
            self.dispatcher
                .dispatch(&name, hooks.and_then(|h| h.on_reject.as_ref()));
        }
    }

    fn ready(&self, op: &str) -> bool {
        if self.phase == Phase::Uninitialized {
            debug!("{} ignored: engine not bootstrapped", op);
            return false;
        }
        true
    }
}
