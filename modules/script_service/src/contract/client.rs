//! Native client trait for inter-module communication
//!
//! This trait defines the API that other modules (e.g. the realtime edit
//! channel) use to submit edit batches. NO HTTP - direct function calls.

use super::{
    error::ScriptError,
    model::{ActingUser, BatchResult, Script, ScriptElement},
    operation::EditOperation,
};
use async_trait::async_trait;
use uuid::Uuid;

/// Script service API for inter-module communication
#[async_trait]
pub trait ScriptEditApi: Send + Sync {
    /// Apply a batch of edit operations atomically
    async fn process_batch(
        &self,
        script_id: Uuid,
        operations: Vec<EditOperation>,
        user: &ActingUser,
    ) -> Result<BatchResult, ScriptError>;

    /// Get a script by id
    async fn get_script(&self, script_id: Uuid) -> Result<Script, ScriptError>;

    /// Get all elements of a script ordered by sequence
    async fn get_elements(&self, script_id: Uuid) -> Result<Vec<ScriptElement>, ScriptError>;
}
