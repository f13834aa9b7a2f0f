//! Consentkit Store - key-value backends and namespaced consent persistence
//!
//! Backends implement [`KeyValueStorage`]. [`ConsentStore`] layers the key
//! scheme on top and is the only place where storage failures are absorbed:
//! reads degrade to "nothing recorded", writes degrade to no-ops.

pub mod migrate;
pub mod storage;
pub mod store;

pub use migrate::{LegacyMigration, MigrationOutcome};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, UnavailableStorage};
pub use store::ConsentStore;
