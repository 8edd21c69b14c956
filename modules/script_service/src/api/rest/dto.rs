//! REST DTOs with serde derives for HTTP API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

// ===== Script DTOs =====

/// Script response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScriptDto {
    pub script_id: Uuid,
    pub show_id: Uuid,

    #[schema(example = "Hamlet - Tech Run")]
    pub script_name: String,

    #[schema(example = "WORKING")]
    pub script_status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_notes: Option<String>,

    pub date_created: chrono::DateTime<chrono::Utc>,
    pub date_updated: chrono::DateTime<chrono::Utc>,
}

/// Script element response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScriptElementDto {
    pub element_id: Uuid,
    pub script_id: Uuid,

    /// CUE, NOTE or GROUP
    #[schema(example = "CUE")]
    pub element_type: String,

    pub sequence: i32,
    pub offset_ms: i64,
    pub duration_ms: Option<i64>,

    #[schema(example = "LX 12")]
    pub element_name: String,

    pub cue_notes: Option<String>,
    pub custom_color: Option<String>,
    pub department_id: Option<Uuid>,
    pub parent_element_id: Option<Uuid>,
    pub group_level: i32,
    pub is_collapsed: bool,
    pub date_updated: chrono::DateTime<chrono::Utc>,
}

/// List of script elements
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScriptElementsListResponse {
    /// Elements ordered by sequence
    pub items: Vec<ScriptElementDto>,

    /// Total count
    pub total: usize,
}

// ===== Batch DTOs =====

/// Batch of edit operations
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    /// Applied in order, all or nothing. Kept raw so one malformed operation
    /// is reported against its own id instead of failing the request body.
    pub operations: Vec<Value>,
}

/// One edit operation: `{"id": "...", "type": "REORDER", ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct OperationDto {
    /// Client operation id, echoed in results
    pub id: String,

    #[serde(flatten)]
    pub payload: OperationPayloadDto,
}

/// `(element, target sequence)` pair
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SequenceUpdateDto {
    pub element_id: String,
    pub new_sequence: i32,
}

/// Element kind on the wire
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ElementTypeDto {
    #[serde(alias = "cue")]
    Cue,
    #[serde(alias = "note")]
    Note,
    #[serde(alias = "group")]
    Group,
}

/// CREATE_ELEMENT payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewElementDto {
    #[serde(default)]
    pub temp_id: Option<String>,
    pub element_type: ElementTypeDto,
    pub element_name: String,
    #[serde(default)]
    pub cue_notes: Option<String>,
    #[serde(default)]
    pub custom_color: Option<String>,
    #[serde(default)]
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub offset_ms: i64,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub parent_element_id: Option<String>,
    #[serde(default)]
    pub insert_index: Option<usize>,
    #[serde(default)]
    pub sequence: Option<i32>,
}

/// Operation payload, discriminated by `type`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationPayloadDto {
    Reorder {
        element_id: String,
        #[serde(default)]
        old_sequence: Option<i32>,
        new_sequence: i32,
    },
    BulkReorder {
        updates: Vec<SequenceUpdateDto>,
    },
    CreateGroup {
        element_ids: Vec<String>,
        group_name: String,
        #[serde(default)]
        background_color: Option<String>,
        #[serde(default)]
        temp_group_id: Option<String>,
    },
    UngroupElements {
        group_element_id: String,
    },
    UpdateElement {
        element_id: String,
        #[serde(default)]
        changes: Map<String, Value>,
    },
    UpdateField {
        element_id: String,
        field_name: String,
        #[serde(default)]
        new_value: Value,
    },
    UpdateTimeOffset {
        element_id: String,
        new_offset_ms: i64,
    },
    ToggleGroupCollapse {
        element_id: String,
        #[serde(default)]
        is_collapsed: Option<bool>,
    },
    BulkOffsetAdjustment {
        #[serde(default)]
        element_ids: Vec<String>,
        delta_ms: i64,
    },
    EnableAutoSort {
        #[serde(default)]
        sequence_updates: Vec<SequenceUpdateDto>,
    },
    DisableAutoSort,
    BatchCollapseGroups {
        group_ids: Vec<String>,
        collapse_state: bool,
    },
    UpdateGroupWithPropagation {
        element_id: String,
        #[serde(default)]
        field_updates: Map<String, Value>,
        #[serde(default)]
        offset_delta_ms: Option<i64>,
        #[serde(default)]
        affected_children: Vec<String>,
    },
    CreateElement(NewElementDto),
    DeleteElement {
        element_id: String,
    },
    UpdateScriptInfo {
        #[serde(default)]
        changes: Map<String, Value>,
    },
}

/// Outcome of one operation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OperationResultDto {
    pub operation_id: String,

    /// "success" or "error"
    #[schema(example = "success")]
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a committed batch
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchResultDto {
    pub success: bool,

    #[schema(example = "Processed 3 operations")]
    pub message: String,

    pub script_id: Uuid,
    pub operations_processed: usize,
    pub results: Vec<OperationResultDto>,
}

/// One failed operation in a rejected batch
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OperationErrorDto {
    pub operation_id: String,
    pub error: String,
}

// Note: Conversion implementations live in mapper.rs
