//! Connection profiles: the data model, the persisted store, and the
//! connectivity checker.

pub mod backend;
pub mod model;
pub mod probe;
pub mod store;

pub use backend::{JsonFileBackend, MemoryBackend, SettingsBackend};
pub use model::{ConnectionProfile, ProfileId};
pub use probe::{ConnectivityChecker, ProbeOutcome, ProbeReport};
pub use store::ConnectionStore;
