//! Edit operations accepted by the batch processor
//!
//! Element references are raw strings: they may be server UUIDs or temporary
//! client identifiers for elements created earlier in the same batch.

use super::model::ElementType;
use serde_json::{Map, Value};
use uuid::Uuid;

/// One client-authored edit in a batch
#[derive(Debug, Clone, PartialEq)]
pub struct EditOperation {
    /// Client-supplied operation id, echoed back in results
    pub id: String,
    pub kind: OperationKind,
}

impl EditOperation {
    pub fn new(id: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// `(element, target sequence)` pair used by bulk resequencing operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceUpdate {
    pub element_id: String,
    pub new_sequence: i32,
}

/// Payload of CREATE_ELEMENT
#[derive(Debug, Clone, PartialEq)]
pub struct NewElement {
    /// Temporary client id, mapped to the allocated id
    pub temp_id: Option<String>,
    pub element_type: ElementType,
    pub element_name: String,
    pub cue_notes: Option<String>,
    pub custom_color: Option<String>,
    pub department_id: Option<Uuid>,
    pub offset_ms: i64,
    pub duration_ms: Option<i64>,
    /// Group to place the element in (may be a temporary id)
    pub parent_element_id: Option<String>,
    /// 0-based position; takes precedence over `sequence`
    pub insert_index: Option<usize>,
    pub sequence: Option<i32>,
}

impl NewElement {
    pub fn new(element_type: ElementType, element_name: impl Into<String>) -> Self {
        Self {
            temp_id: None,
            element_type,
            element_name: element_name.into(),
            cue_notes: None,
            custom_color: None,
            department_id: None,
            offset_ms: 0,
            duration_ms: None,
            parent_element_id: None,
            insert_index: None,
            sequence: None,
        }
    }
}

/// Type-specific payload of an edit operation
#[derive(Debug, Clone, PartialEq)]
pub enum OperationKind {
    Reorder {
        element_id: String,
        old_sequence: Option<i32>,
        new_sequence: i32,
    },
    BulkReorder {
        updates: Vec<SequenceUpdate>,
    },
    CreateGroup {
        element_ids: Vec<String>,
        group_name: String,
        background_color: Option<String>,
        temp_group_id: Option<String>,
    },
    UngroupElements {
        group_element_id: String,
    },
    UpdateElement {
        element_id: String,
        changes: Map<String, Value>,
    },
    UpdateField {
        element_id: String,
        field_name: String,
        new_value: Value,
    },
    UpdateTimeOffset {
        element_id: String,
        new_offset_ms: i64,
    },
    ToggleGroupCollapse {
        element_id: String,
        is_collapsed: Option<bool>,
    },
    BulkOffsetAdjustment {
        element_ids: Vec<String>,
        delta_ms: i64,
    },
    EnableAutoSort {
        sequence_updates: Vec<SequenceUpdate>,
    },
    DisableAutoSort,
    BatchCollapseGroups {
        group_ids: Vec<String>,
        collapse_state: bool,
    },
    UpdateGroupWithPropagation {
        element_id: String,
        field_updates: Map<String, Value>,
        offset_delta_ms: Option<i64>,
        affected_children: Vec<String>,
    },
    CreateElement(NewElement),
    DeleteElement {
        element_id: String,
    },
    UpdateScriptInfo {
        changes: Map<String, Value>,
    },
}

impl OperationKind {
    /// Wire tag of the operation
    pub fn type_name(&self) -> &'static str {
        match self {
            OperationKind::Reorder { .. } => "REORDER",
            OperationKind::BulkReorder { .. } => "BULK_REORDER",
            OperationKind::CreateGroup { .. } => "CREATE_GROUP",
            OperationKind::UngroupElements { .. } => "UNGROUP_ELEMENTS",
            OperationKind::UpdateElement { .. } => "UPDATE_ELEMENT",
            OperationKind::UpdateField { .. } => "UPDATE_FIELD",
            OperationKind::UpdateTimeOffset { .. } => "UPDATE_TIME_OFFSET",
            OperationKind::ToggleGroupCollapse { .. } => "TOGGLE_GROUP_COLLAPSE",
            OperationKind::BulkOffsetAdjustment { .. } => "BULK_OFFSET_ADJUSTMENT",
            OperationKind::EnableAutoSort { .. } => "ENABLE_AUTO_SORT",
            OperationKind::DisableAutoSort => "DISABLE_AUTO_SORT",
            OperationKind::BatchCollapseGroups { .. } => "BATCH_COLLAPSE_GROUPS",
            OperationKind::UpdateGroupWithPropagation { .. } => "UPDATE_GROUP_WITH_PROPAGATION",
            OperationKind::CreateElement(_) => "CREATE_ELEMENT",
            OperationKind::DeleteElement { .. } => "DELETE_ELEMENT",
            OperationKind::UpdateScriptInfo { .. } => "UPDATE_SCRIPT_INFO",
        }
    }
}
