//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.
//! NO serde derives on models - these are pure domain types.

pub mod client;
pub mod error;
pub mod model;
pub mod operation;

pub use client::ScriptEditApi;
pub use error::ScriptError;
pub use model::{
    ActingUser, BatchResult, ElementType, FailedOperation, OperationResult, OperationStatus,
    Script, ScriptElement, ScriptStatus,
};
pub use operation::{EditOperation, NewElement, OperationKind, SequenceUpdate};
