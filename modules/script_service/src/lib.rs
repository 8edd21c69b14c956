//! Script Service Module
//!
//! Batch edit-queue processing for script elements (cues, notes and groups).
//! A batch of client-authored edit operations is replayed against an in-memory
//! working copy of one script and committed in a single transaction, or not at all.

// Public exports
pub mod contract;
pub use contract::{
    client::ScriptEditApi, error::ScriptError, ActingUser, BatchResult, EditOperation,
    ElementType, OperationKind, OperationResult, OperationStatus, Script, ScriptElement,
    ScriptStatus,
};

pub mod module;
pub use module::ScriptServiceModule;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
