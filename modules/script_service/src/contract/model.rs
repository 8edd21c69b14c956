//! Contract models for script service
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Script lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    Draft,
    Copy,
    Working,
    Final,
    Imported,
}

impl ScriptStatus {
    /// Wire/storage representation (upper case)
    pub fn as_str(self) -> &'static str {
        match self {
            ScriptStatus::Draft => "DRAFT",
            ScriptStatus::Copy => "COPY",
            ScriptStatus::Working => "WORKING",
            ScriptStatus::Final => "FINAL",
            ScriptStatus::Imported => "IMPORTED",
        }
    }

    /// Parse a status, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Some(ScriptStatus::Draft),
            "COPY" => Some(ScriptStatus::Copy),
            "WORKING" => Some(ScriptStatus::Working),
            "FINAL" => Some(ScriptStatus::Final),
            "IMPORTED" => Some(ScriptStatus::Imported),
            _ => None,
        }
    }
}

/// A script (one draft of a show's running order)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub script_id: Uuid,
    /// Owning show
    pub show_id: Uuid,
    pub script_name: String,
    pub script_status: ScriptStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub script_notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Kind of script element (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Cue,
    Note,
    Group,
}

impl ElementType {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Cue => "CUE",
            ElementType::Note => "NOTE",
            ElementType::Group => "GROUP",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CUE" => Some(ElementType::Cue),
            "NOTE" => Some(ElementType::Note),
            "GROUP" => Some(ElementType::Group),
            _ => None,
        }
    }
}

/// A single cue, note or group row belonging to a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptElement {
    pub element_id: Uuid,
    pub script_id: Uuid,
    pub element_type: ElementType,
    /// Dense 1..N ordering key within the script
    pub sequence: i32,
    /// Time position within the script
    pub offset_ms: i64,
    /// Derived for groups (max child offset - min child offset)
    pub duration_ms: Option<i64>,
    pub element_name: String,
    pub cue_notes: Option<String>,
    pub custom_color: Option<String>,
    pub department_id: Option<Uuid>,
    /// Set only for children of a group
    pub parent_element_id: Option<Uuid>,
    /// 0 = top level, 1 = inside a group
    pub group_level: i32,
    pub is_collapsed: bool,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl ScriptElement {
    pub fn is_group(&self) -> bool {
        self.element_type == ElementType::Group
    }
}

/// The user a batch is processed on behalf of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    /// Used for created_by / updated_by stamping
    pub user_id: Uuid,
    /// "Auto-sort cues on save" preference, read once per batch
    pub auto_sort_cues: bool,
}

impl ActingUser {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            auto_sort_cues: false,
        }
    }

    pub fn with_auto_sort(mut self, auto_sort_cues: bool) -> Self {
        self.auto_sort_cues = auto_sort_cues;
        self
    }
}

/// Per-operation outcome status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Success,
    Error,
}

/// Outcome of one operation in a batch
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    /// Client-supplied operation id
    pub operation_id: String,
    pub status: OperationStatus,
    /// Applier-specific payload (success only)
    pub result: Option<serde_json::Value>,
    /// Error message (error only)
    pub error: Option<String>,
}

impl OperationResult {
    pub fn success(operation_id: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            operation_id: operation_id.into(),
            status: OperationStatus::Success,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(operation_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            status: OperationStatus::Error,
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }
}

/// One failed operation of a rejected batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedOperation {
    pub operation_id: String,
    pub error: String,
}

/// Result of a committed batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub success: bool,
    pub message: String,
    pub script_id: Uuid,
    pub operations_processed: usize,
    pub results: Vec<OperationResult>,
}
