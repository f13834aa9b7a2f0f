//! Consentkit Core - Types, configuration, storage keys, and error handling

pub mod config;
pub mod error;
pub mod keys;
pub mod types;

pub use config::*;
pub use error::{Error, Result};
pub use keys::StorageKeys;
pub use types::*;
