//! Core modules: the record store, the validation/repair/reconcile engine,
//! companion config checks, and the shared plumbing they run on.

pub mod backup;
pub mod config;
pub mod confirm;
pub mod error;
pub mod init;
pub mod interactions;
pub mod logging;
pub mod output;
pub mod reconcile;
pub mod references;
pub mod repair;
pub mod store;
pub mod time;
pub mod validate;
