//! `taxsync-recon`: jurisdiction reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables for the APEX, COMMAND and
//! rate-edit sources, returns the joined record set and the records that need
//! a manual update. No CLI or IO dependencies.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod key;
pub mod matcher;
pub mod model;
pub mod report;
pub mod source;
pub mod states;
pub mod summary;
pub mod table;

pub use config::ReconConfig;
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use model::{ActionRequired, ReconInput, ReconResult, UpdatePlatform, UpdateRecord};
pub use table::{Cell, Table};
