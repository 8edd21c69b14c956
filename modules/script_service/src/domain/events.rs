/// Domain events for the script service
///
/// Events are handed to an `EventPublisher` after a batch commits. The
/// broadcast layer that fans changes out to connected editors subscribes there.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain event types for scripts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// A batch of element edits was committed
    ElementsChanged(ElementsChangedEvent),
}

/// Event data for a committed batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementsChangedEvent {
    /// Script the batch targeted
    pub script_id: Uuid,
    /// Number of operations in the batch
    pub operations_processed: usize,
    /// Elements created in the batch (groups first)
    pub inserted: Vec<Uuid>,
    /// Existing elements whose rows changed
    pub updated: Vec<Uuid>,
    /// Elements deleted in the batch
    pub deleted: Vec<Uuid>,
    /// Whether script-level info changed
    pub script_info_changed: bool,
    /// Timestamp of the event
    pub timestamp: DateTime<Utc>,
    /// User who submitted the batch
    pub user_id: Uuid,
}

/// Event publisher trait for publishing domain events
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event; failures are reported but never undo the commit
    async fn publish(&self, event: ScriptEvent) -> anyhow::Result<()>;
}

/// No-op event publisher for testing or when events are disabled
pub struct NoOpEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: ScriptEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

impl ScriptEvent {
    /// Create a new ElementsChanged event
    pub fn elements_changed(
        script_id: Uuid,
        operations_processed: usize,
        inserted: Vec<Uuid>,
        updated: Vec<Uuid>,
        deleted: Vec<Uuid>,
        script_info_changed: bool,
        user_id: Uuid,
    ) -> Self {
        ScriptEvent::ElementsChanged(ElementsChangedEvent {
            script_id,
            operations_processed,
            inserted,
            updated,
            deleted,
            script_info_changed,
            timestamp: Utc::now(),
            user_id,
        })
    }

    pub fn script_id(&self) -> Uuid {
        match self {
            ScriptEvent::ElementsChanged(e) => e.script_id,
        }
    }
}
