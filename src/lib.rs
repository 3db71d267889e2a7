pub mod batch;
pub mod classify;
pub mod config;
pub mod credential;
pub mod digest;
pub mod engine;
pub mod export;
pub mod io;
pub mod report;
pub mod stats;
pub mod store;
pub mod walker;

pub mod prelude {
    pub use crate::classify::{Heuristic, classify};
    pub use crate::config::{IngestConfig, Separators};
    pub use crate::credential::{CredentialCandidate, PersistableRecord};
    pub use crate::store::{CredentialStore, SqliteStore};
}
