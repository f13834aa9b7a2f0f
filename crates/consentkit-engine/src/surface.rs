//! SurfaceController: which consent surface is visible, and the lifecycle
//! hooks that go with each change.
//!
//! Drawing is delegated to a [`SurfaceRenderer`]; the controller never
//! decides consent, it only moves between icon, banner and preferences
//! surfaces and keeps the backdrop, focus and scroll lock in step.

use crate::config::{Callback, Hooks};
use crate::dispatch::CallbackDispatcher;
use consentkit_core::{ConsentSettings, FocusTarget, PreferencesView, SurfaceState};
use std::sync::Arc;
use tracing::debug;

/// The rendering layer. Every method defaults to a no-op so headless hosts
/// only implement what they draw.
pub trait SurfaceRenderer {
    fn render_banner(&mut self, _settings: &ConsentSettings) {}
    fn remove_banner(&mut self) {}
    fn render_preferences(&mut self, _view: &PreferencesView) {}
    fn hide_preferences(&mut self) {}
    fn show_icon(&mut self, _settings: &ConsentSettings) {}
    fn hide_icon(&mut self) {}
    fn show_backdrop(&mut self) {}
    fn hide_backdrop(&mut self) {}
    fn focus(&mut self, _target: FocusTarget) {}
    /// Suspend (`true`) or restore (`false`) background scrolling.
    fn set_scroll_locked(&mut self, _locked: bool) {}
    /// Drop everything drawn and every input binding.
    fn teardown(&mut self) {}
}

/// Renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl SurfaceRenderer for NullRenderer {}

pub struct SurfaceController {
    renderer: Box<dyn SurfaceRenderer>,
    settings: Arc<ConsentSettings>,
    hooks: Hooks,
    dispatcher: CallbackDispatcher,
    state: SurfaceState,
    backdrop_visible: bool,
    scroll_locked: bool,
}

impl SurfaceController {
    pub fn new(
        renderer: Box<dyn SurfaceRenderer>,
        settings: Arc<ConsentSettings>,
        hooks: Hooks,
        dispatcher: CallbackDispatcher,
    ) -> Self {
        Self {
            renderer,
            settings,
            hooks,
            dispatcher,
            state: SurfaceState::None,
            backdrop_visible: false,
            scroll_locked: false,
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn backdrop_visible(&self) -> bool {
        self.backdrop_visible
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn show_banner(&mut self) {
        if self.state == SurfaceState::Banner {
            return;
        }
        self.leave_current();
        self.renderer.render_banner(&self.settings);
        self.state = SurfaceState::Banner;
        debug!("surface -> banner");
        if self.settings.auto_focus_banner() {
            self.renderer.focus(FocusTarget::BannerPrimaryAction);
        }
        self.fire("onBannerOpen", self.hooks.on_banner_open.clone());
    }

    /// Open the preferences surface. Closes the banner or icon first and
    /// brings up the backdrop.
    pub fn show_modal(&mut self, view: &PreferencesView) {
        if self.state == SurfaceState::Modal {
            self.renderer.render_preferences(view);
            return;
        }
        self.leave_current();
        self.show_backdrop();
        self.renderer.render_preferences(view);
        self.state = SurfaceState::Modal;
        debug!("surface -> modal");
        self.set_scroll_locked(true);
        self.renderer.focus(FocusTarget::ModalClose);
        self.fire("onPreferencesOpen", self.hooks.on_preferences_open.clone());
    }

    pub fn show_icon(&mut self) {
        if self.state == SurfaceState::Icon {
            return;
        }
        self.leave_current();
        self.renderer.show_icon(&self.settings);
        self.state = SurfaceState::Icon;
        debug!("surface -> icon");
    }

    /// No-op unless the backdrop is enabled by configuration.
    pub fn show_backdrop(&mut self) {
        if !self.settings.backdrop_enabled() || self.backdrop_visible {
            return;
        }
        self.renderer.show_backdrop();
        self.backdrop_visible = true;
        self.fire("onBackdropOpen", self.hooks.on_backdrop_open.clone());
    }

    pub fn hide_backdrop(&mut self) {
        if !self.backdrop_visible {
            return;
        }
        self.renderer.hide_backdrop();
        self.backdrop_visible = false;
        self.fire("onBackdropClose", self.hooks.on_backdrop_close.clone());
    }

    /// Hide every surface and the backdrop, firing close hooks.
    pub fn hide_all(&mut self) {
        self.leave_current();
        self.hide_backdrop();
        self.state = SurfaceState::None;
    }

    /// Discard all drawn surfaces without firing hooks.
    pub fn teardown(&mut self) {
        if self.scroll_locked {
            self.set_scroll_locked(false);
        }
        self.renderer.teardown();
        self.state = SurfaceState::None;
        self.backdrop_visible = false;
    }

    fn leave_current(&mut self) {
        match self.state {
            SurfaceState::None => {}
            SurfaceState::Icon => self.renderer.hide_icon(),
            SurfaceState::Banner => {
                self.renderer.remove_banner();
                self.state = SurfaceState::None;
                self.fire("onBannerClose", self.hooks.on_banner_close.clone());
            }
            SurfaceState::Modal => {
                self.renderer.hide_preferences();
                self.state = SurfaceState::None;
                self.set_scroll_locked(false);
                self.fire("onPreferencesClose", self.hooks.on_preferences_close.clone());
            }
        }
        self.state = SurfaceState::None;
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        self.renderer.set_scroll_locked(locked);
        self.scroll_locked = locked;
    }

    fn fire(&self, name: &str, hook: Option<Callback>) {
        self.dispatcher.dispatch(name, hook.as_ref());
    }
}
