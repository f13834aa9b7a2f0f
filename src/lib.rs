//! consentkit: consent banner state machine with a terminal front end.
//!
//! The engine lives in the workspace crates; this crate adds the text
//! renderer and the command plumbing behind `consentctl`.

pub mod commands;
pub mod terminal;

pub use commands::{Action, SessionOptions, StatusReport};
pub use terminal::TerminalRenderer;
