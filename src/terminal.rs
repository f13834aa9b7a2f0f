//! TerminalRenderer: draws consent surfaces as plain text lines.

use consentkit_core::{ConsentSettings, FocusTarget, PreferencesView};
use consentkit_engine::SurfaceRenderer;
use std::io::Write;
use tracing::debug;

pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            debug!("terminal write failed: {}", e);
        }
    }
}

impl<W: Write> SurfaceRenderer for TerminalRenderer<W> {
    fn render_banner(&mut self, settings: &ConsentSettings) {
        let text = &settings.text.banner;
        let position = settings.position.banner.as_deref().unwrap_or("default");
        self.line(&format!("[banner] ({}) {}", position, text.description));
        self.line(&format!(
            "  [ {} ]  [ {} ]  [ {} ]",
            text.accept_all_button_text,
            text.reject_non_essential_button_text,
            text.preferences_button_text
        ));
    }

    fn remove_banner(&mut self) {
        self.line("[banner] closed");
    }

    fn render_preferences(&mut self, view: &PreferencesView) {
        self.line(&format!("[preferences] {}", view.title));
        if !view.description.is_empty() {
            self.line(&format!("  {}", view.description));
        }
        for row in &view.rows {
            let mark = if row.checked { "x" } else { " " };
            let lock = if row.locked { " (required)" } else { "" };
            self.line(&format!("  [{}] {}{}", mark, row.name, lock));
            if !row.description.is_empty() {
                self.line(&format!("      {}", row.description));
            }
        }
    }

    fn hide_preferences(&mut self) {
        self.line("[preferences] closed");
    }

    fn show_icon(&mut self, settings: &ConsentSettings) {
        let icon = &settings.cookie_icon;
        self.line(&format!(
            "[icon] shown ({}, {})",
            icon.position.as_deref().unwrap_or("bottom-left"),
            icon.color_scheme.as_deref().unwrap_or("light")
        ));
    }

    fn hide_icon(&mut self) {
        self.line("[icon] hidden");
    }

    fn show_backdrop(&mut self) {
        self.line("[backdrop] shown");
    }

    fn hide_backdrop(&mut self) {
        self.line("[backdrop] hidden");
    }

    fn focus(&mut self, target: FocusTarget) {
        debug!("focus -> {:?}", target);
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        debug!("scroll locked: {}", locked);
    }

    fn teardown(&mut self) {
        if let Err(e) = self.out.flush() {
            debug!("terminal flush failed: {}", e);
        }
    }
}
