//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs

use super::changeset::ChangeSet;
use crate::contract::{Script, ScriptElement};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Durable store for scripts and their elements
#[async_trait]
pub trait ScriptRepository: Send + Sync {
    /// Find a script by identifier
    async fn find_script(&self, script_id: Uuid) -> Result<Option<Script>>;

    /// Load all elements of a script ordered by sequence
    async fn find_elements(&self, script_id: Uuid) -> Result<Vec<ScriptElement>>;

    /// Apply a change set as one transaction.
    ///
    /// Group inserts must be written before element inserts and updates, since
    /// `parent_element_id` is a foreign key. Sequences are unique per script
    /// once the change set is applied. On error nothing is persisted.
    async fn commit(&self, changes: &ChangeSet) -> Result<()>;
}
