//! Domain service - batch driver and read operations

use super::appliers;
use super::changeset::ChangeSet;
use super::events::{EventPublisher, ScriptEvent};
use super::post_process;
use super::repository::ScriptRepository;
use super::working_set::WorkingSet;
use crate::config::Config;
use crate::contract::{
    ActingUser, BatchResult, EditOperation, FailedOperation, OperationResult, Script,
    ScriptElement, ScriptError,
};
use std::sync::Arc;
use uuid::Uuid;

/// Domain service for script element editing
pub struct Service {
    repo: Arc<dyn ScriptRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    config: Config,
}

impl Service {
    /// Create a new service instance
    pub fn new(
        repo: Arc<dyn ScriptRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        config: Config,
    ) -> Self {
        Self {
            repo,
            event_publisher,
            config,
        }
    }

    // ===== Reads =====

    /// Get a script by identifier
    pub async fn get_script(&self, script_id: Uuid) -> Result<Script, ScriptError> {
        self.repo
            .find_script(script_id)
            .await
            .map_err(|e| {
                tracing::error!(%script_id, error = %e, "failed to load script");
                ScriptError::Internal
            })?
            .ok_or_else(|| ScriptError::not_found("script", script_id))
    }

    /// Get all elements of a script ordered by sequence
    pub async fn get_elements(&self, script_id: Uuid) -> Result<Vec<ScriptElement>, ScriptError> {
        self.get_script(script_id).await?;
        self.repo.find_elements(script_id).await.map_err(|e| {
            tracing::error!(%script_id, error = %e, "failed to load script elements");
            ScriptError::Internal
        })
    }

    // ===== Batch processing =====

    /// Apply an ordered batch of edit operations to one script, all or nothing.
    ///
    /// Every operation is attempted even after a failure so the caller gets the
    /// full list of problems. Any failure discards the working set; nothing is
    /// written.
    pub async fn process_batch(
        &self,
        script_id: Uuid,
        operations: Vec<EditOperation>,
        actor: &ActingUser,
    ) -> Result<BatchResult, ScriptError> {
        let decoded = operations.into_iter().map(Ok).collect();
        self.process_decoded_batch(script_id, decoded, actor).await
    }

    /// Batch entry point for wire input: operations that failed to decode are
    /// carried as `Err` and count as failed operations of the batch.
    #[tracing::instrument(
        skip(self, operations, actor),
        fields(operations = operations.len(), user_id = %actor.user_id)
    )]
    pub async fn process_decoded_batch(
        &self,
        script_id: Uuid,
        operations: Vec<Result<EditOperation, FailedOperation>>,
        actor: &ActingUser,
    ) -> Result<BatchResult, ScriptError> {
        if operations.len() > self.config.max_operations_per_batch {
            return Err(ScriptError::validation(format!(
                "batch of {} operations exceeds the limit of {}",
                operations.len(),
                self.config.max_operations_per_batch
            )));
        }

        let script = self.get_script(script_id).await?;
        let elements = self.repo.find_elements(script_id).await.map_err(|e| {
            tracing::error!(%script_id, error = %e, "failed to load script elements");
            ScriptError::Internal
        })?;
        let mut ws = WorkingSet::new(
            script,
            elements,
            actor.user_id,
            self.config.temp_id_fragment_fallback,
        );

        let attempted = operations.len();
        let mut results = Vec::with_capacity(attempted);
        let mut failed = Vec::new();
        for decoded in &operations {
            let op = match decoded {
                Ok(op) => op,
                Err(malformed) => {
                    tracing::debug!(operation_id = %malformed.operation_id, error = %malformed.error, "operation malformed");
                    results.push(OperationResult::error(
                        malformed.operation_id.clone(),
                        malformed.error.clone(),
                    ));
                    failed.push(malformed.clone());
                    continue;
                }
            };
            match appliers::apply(&mut ws, &op.kind) {
                Ok(payload) => {
                    tracing::debug!(operation_id = %op.id, kind = op.kind.type_name(), "operation applied");
                    results.push(OperationResult::success(op.id.clone(), payload));
                }
                Err(e) => {
                    tracing::debug!(operation_id = %op.id, kind = op.kind.type_name(), error = %e, "operation failed");
                    failed.push(FailedOperation {
                        operation_id: op.id.clone(),
                        error: e.to_string(),
                    });
                    results.push(OperationResult::error(op.id.clone(), e.to_string()));
                }
            }
        }

        if !failed.is_empty() {
            tracing::warn!(
                failed = failed.len(),
                attempted,
                "batch rejected, working set discarded"
            );
            return Err(ScriptError::BatchRejected { failed, attempted });
        }

        let report = post_process::finalize(&mut ws, actor.auto_sort_cues)
            .map_err(|e| ScriptError::validation(e.to_string()))?;
        tracing::debug!(?report, "post-processing complete");

        let changes = ChangeSet::from_working_set(ws);
        if changes.is_empty() {
            tracing::info!(attempted, "batch produced no changes, commit skipped");
        } else {
            self.repo.commit(&changes).await.map_err(|e| {
                tracing::error!(error = %e, "batch commit failed, rolled back");
                ScriptError::CommitFailed {
                    reason: e.to_string(),
                }
            })?;
            tracing::info!(attempted, rows = changes.row_count(), "batch committed");
            self.publish_changes(&changes, attempted, actor).await;
        }

        Ok(BatchResult {
            success: true,
            message: format!("Processed {} operations", attempted),
            script_id,
            operations_processed: attempted,
            results,
        })
    }

    async fn publish_changes(&self, changes: &ChangeSet, attempted: usize, actor: &ActingUser) {
        if !self.config.publish_events {
            return;
        }
        let event = ScriptEvent::elements_changed(
            changes.script_id,
            attempted,
            changes.inserted_ids(),
            changes.updated_ids(),
            changes.deletes.clone(),
            changes.script.is_some(),
            actor.user_id,
        );
        if let Err(e) = self.event_publisher.publish(event).await {
            tracing::warn!(script_id = %changes.script_id, error = %e, "failed to publish change event");
        }
    }
}
