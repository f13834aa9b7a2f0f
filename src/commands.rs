//! Command plumbing for `consentctl`: settings resolution, integration
//! callbacks, and the event sequence each action drives.

use consentkit_core::{CategoryId, ConsentMap, ConsentSettings, UiEvent};
use consentkit_engine::{ConsentConfig, ConsentEngine, ConsentManager, NullRenderer, RendererFactory};
use consentkit_store::{FileStorage, KeyValueStorage};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Where a run reads its settings and stored decisions from.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub config: PathBuf,
    pub storage: PathBuf,
    /// Overrides `bannerSuffix` from the settings file.
    pub suffix: Option<String>,
}

/// A visitor action replayed against a freshly bootstrapped engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Page load only.
    Load,
    AcceptAll,
    RejectAll,
    /// Open preferences, toggle, confirm.
    Set { grant: Vec<String>, deny: Vec<String> },
    /// Open preferences and close them again.
    Dismiss,
}

impl Action {
    pub fn events(&self) -> Vec<UiEvent> {
        match self {
            Action::Load => Vec::new(),
            Action::AcceptAll => vec![UiEvent::AcceptAll],
            Action::RejectAll => vec![UiEvent::RejectAll],
            Action::Set { grant, deny } => {
                let mut events = vec![UiEvent::OpenPreferences];
                events.extend(grant.iter().map(|id| UiEvent::TogglePreference {
                    id: CategoryId::new(id.as_str()),
                    granted: true,
                }));
                events.extend(deny.iter().map(|id| UiEvent::TogglePreference {
                    id: CategoryId::new(id.as_str()),
                    granted: false,
                }));
                events.push(UiEvent::ConfirmPreferences);
                events
            }
            Action::Dismiss => vec![UiEvent::OpenPreferences, UiEvent::ClosePreferences],
        }
    }
}

pub fn load_settings(opts: &SessionOptions) -> ConsentSettings {
    let mut settings = ConsentSettings::load(&opts.config);
    if let Some(suffix) = &opts.suffix {
        settings.banner_suffix = Some(suffix.clone());
    }
    settings
}

/// Wire every category to log its integrations loading or being blocked.
pub fn integration_config(settings: ConsentSettings) -> ConsentConfig {
    let ids: Vec<CategoryId> = settings.cookie_types.iter().map(|d| d.id.clone()).collect();
    let mut config = ConsentConfig::new(settings);
    for id in ids {
        let (accepted, rejected) = (id.clone(), id.clone());
        config = config
            .on_accept(id.clone(), move || {
                info!("Loading integrations for '{}'", accepted);
                Ok(())
            })
            .on_reject(id, move || {
                info!("Blocking integrations for '{}'", rejected);
                Ok(())
            });
    }
    config
        .on_accept_all(|| {
            info!("Visitor accepted all categories");
            Ok(())
        })
        .on_reject_all(|| {
            info!("Visitor rejected non-essential categories");
            Ok(())
        })
        .on_callback_error(|failure| {
            warn!("Integration {} failed: {}", failure.source, failure.message);
        })
}

/// Validate an action's category ids against the configured categories.
pub fn check_action(settings: &ConsentSettings, action: &Action) -> anyhow::Result<()> {
    let Action::Set { grant, deny } = action else {
        return Ok(());
    };
    for id in grant.iter().chain(deny) {
        match settings.cookie_types.iter().find(|d| d.id.as_str() == id.as_str()) {
            None => anyhow::bail!("unknown category '{}'", id),
            Some(def) if def.required && deny.contains(id) => {
                warn!("'{}' is required and stays granted", id);
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Bootstrap against file storage and drive `action` through the engine.
pub fn run(
    opts: &SessionOptions,
    action: &Action,
    renderers: RendererFactory,
) -> anyhow::Result<ConsentManager> {
    let settings = load_settings(opts);
    check_action(&settings, action)?;

    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::open(&opts.storage));
    let mut manager = ConsentManager::initialize(integration_config(settings), storage, renderers);
    for event in action.events() {
        manager.handle(event);
    }
    Ok(manager)
}

/// Read the stored decision without bootstrapping: no migration, no
/// callbacks, no writes.
pub fn status(opts: &SessionOptions) -> StatusReport {
    let settings = load_settings(opts);
    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::open(&opts.storage));
    let engine = ConsentEngine::new(ConsentConfig::new(settings), storage, Box::new(NullRenderer));
    StatusReport::from_engine(&engine)
}

/// Snapshot of the stored decision for one namespace.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub namespace: String,
    pub decided: bool,
    pub categories: ConsentMap,
    pub required: Vec<CategoryId>,
    pub consent_version: Option<String>,
    pub consent_date: Option<String>,
    pub outdated: bool,
}

impl StatusReport {
    pub fn from_engine(engine: &ConsentEngine) -> Self {
        Self {
            namespace: engine.store().keys().namespace().to_string(),
            decided: engine.store().has_initial_choice(),
            categories: engine.accepted_categories(),
            required: engine.registry().required().map(|d| d.id.clone()).collect(),
            consent_version: engine.consent_version(),
            consent_date: engine.consent_date(),
            outdated: engine.consent_outdated(),
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let namespace = if self.namespace.is_empty() {
            "(default)"
        } else {
            self.namespace.as_str()
        };
        writeln!(f, "namespace: {}", namespace)?;
        writeln!(
            f,
            "decision:  {}",
            if self.decided { "recorded" } else { "none yet" }
        )?;

        let width = self.categories.keys().map(|id| id.as_str().len()).max().unwrap_or(0);
        for (id, granted) in &self.categories {
            let state = if *granted { "granted" } else { "denied" };
            let note = if self.required.contains(id) { " (required)" } else { "" };
            writeln!(f, "  {:<width$}  {}{}", id.as_str(), state, note, width = width)?;
        }

        match &self.consent_version {
            Some(v) if self.outdated => writeln!(f, "version:   {} (outdated)", v)?,
            Some(v) => writeln!(f, "version:   {}", v)?,
            None if self.outdated => writeln!(f, "version:   none (outdated)")?,
            None => {}
        }
        if let Some(date) = &self.consent_date {
            writeln!(f, "date:      {}", date)?;
        }
        Ok(())
    }
}
