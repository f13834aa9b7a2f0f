//! Consentkit Engine - the consent state machine
//!
//! Flow:
//! - `bootstrap()` on page load: no stored choice shows the banner; a stored
//!   choice replays accept callbacks and shows only the icon.
//! - Visitor actions (accept all, reject non-essential, toggle + confirm,
//!   dismiss) persist through [`ConsentStore`](consentkit_store::ConsentStore),
//!   fire category callbacks through the [`CallbackDispatcher`], then move the
//!   [`SurfaceController`] to the icon.
//! - [`ConsentManager`] owns the engine on behalf of the host and rebuilds it
//!   from scratch on every configuration update.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod manager;
pub mod registry;
pub mod surface;

pub use config::{
    callback, Callback, CategoryCallbacks, CategoryHooks, ConfigPatch, ConsentConfig, ErrorHook,
    Hooks,
};
pub use dispatch::{CallbackDispatcher, CallbackFailure, DispatchOutcome};
pub use engine::ConsentEngine;
pub use manager::{ConsentManager, RendererFactory};
pub use registry::CategoryRegistry;
pub use surface::{NullRenderer, SurfaceController, SurfaceRenderer};

pub use consentkit_core::*;
