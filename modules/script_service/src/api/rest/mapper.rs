//! Mapper implementations for converting between DTOs and contract models
//!
//! This module contains all From/Into implementations for bidirectional
//! conversion between REST DTOs and transport-agnostic contract models.

use super::dto::*;
use crate::contract;

// ===== Script conversions =====

impl From<contract::Script> for ScriptDto {
    fn from(script: contract::Script) -> Self {
        Self {
            script_id: script.script_id,
            show_id: script.show_id,
            script_name: script.script_name,
            script_status: script.script_status.as_str().to_string(),
            start_time: script.start_time,
            end_time: script.end_time,
            script_notes: script.script_notes,
            date_created: script.date_created,
            date_updated: script.date_updated,
        }
    }
}

impl From<contract::ScriptElement> for ScriptElementDto {
    fn from(element: contract::ScriptElement) -> Self {
        Self {
            element_id: element.element_id,
            script_id: element.script_id,
            element_type: element.element_type.as_str().to_string(),
            sequence: element.sequence,
            offset_ms: element.offset_ms,
            duration_ms: element.duration_ms,
            element_name: element.element_name,
            cue_notes: element.cue_notes,
            custom_color: element.custom_color,
            department_id: element.department_id,
            parent_element_id: element.parent_element_id,
            group_level: element.group_level,
            is_collapsed: element.is_collapsed,
            date_updated: element.date_updated,
        }
    }
}

// ===== Batch conversions =====

impl From<ElementTypeDto> for contract::ElementType {
    fn from(dto: ElementTypeDto) -> Self {
        match dto {
            ElementTypeDto::Cue => Self::Cue,
            ElementTypeDto::Note => Self::Note,
            ElementTypeDto::Group => Self::Group,
        }
    }
}

impl From<SequenceUpdateDto> for contract::SequenceUpdate {
    fn from(dto: SequenceUpdateDto) -> Self {
        Self {
            element_id: dto.element_id,
            new_sequence: dto.new_sequence,
        }
    }
}

impl From<NewElementDto> for contract::NewElement {
    fn from(dto: NewElementDto) -> Self {
        Self {
            temp_id: dto.temp_id,
            element_type: dto.element_type.into(),
            element_name: dto.element_name,
            cue_notes: dto.cue_notes,
            custom_color: dto.custom_color,
            department_id: dto.department_id,
            offset_ms: dto.offset_ms,
            duration_ms: dto.duration_ms,
            parent_element_id: dto.parent_element_id,
            insert_index: dto.insert_index,
            sequence: dto.sequence,
        }
    }
}

fn sequence_updates(updates: Vec<SequenceUpdateDto>) -> Vec<contract::SequenceUpdate> {
    updates.into_iter().map(Into::into).collect()
}

impl From<OperationPayloadDto> for contract::OperationKind {
    fn from(dto: OperationPayloadDto) -> Self {
        use contract::OperationKind as Kind;

        match dto {
            OperationPayloadDto::Reorder {
                element_id,
                old_sequence,
                new_sequence,
            } => Kind::Reorder {
                element_id,
                old_sequence,
                new_sequence,
            },
            OperationPayloadDto::BulkReorder { updates } => Kind::BulkReorder {
                updates: sequence_updates(updates),
            },
            OperationPayloadDto::CreateGroup {
                element_ids,
                group_name,
                background_color,
                temp_group_id,
            } => Kind::CreateGroup {
                element_ids,
                group_name,
                background_color,
                temp_group_id,
            },
            OperationPayloadDto::UngroupElements { group_element_id } => {
                Kind::UngroupElements { group_element_id }
            }
            OperationPayloadDto::UpdateElement {
                element_id,
                changes,
            } => Kind::UpdateElement {
                element_id,
                changes,
            },
            OperationPayloadDto::UpdateField {
                element_id,
                field_name,
                new_value,
            } => Kind::UpdateField {
                element_id,
                field_name,
                new_value,
            },
            OperationPayloadDto::UpdateTimeOffset {
                element_id,
                new_offset_ms,
            } => Kind::UpdateTimeOffset {
                element_id,
                new_offset_ms,
            },
            OperationPayloadDto::ToggleGroupCollapse {
                element_id,
                is_collapsed,
            } => Kind::ToggleGroupCollapse {
                element_id,
                is_collapsed,
            },
            OperationPayloadDto::BulkOffsetAdjustment {
                element_ids,
                delta_ms,
            } => Kind::BulkOffsetAdjustment {
                element_ids,
                delta_ms,
            },
            OperationPayloadDto::EnableAutoSort { sequence_updates: updates } => {
                Kind::EnableAutoSort {
                    sequence_updates: sequence_updates(updates),
                }
            }
            OperationPayloadDto::DisableAutoSort => Kind::DisableAutoSort,
            OperationPayloadDto::BatchCollapseGroups {
                group_ids,
                collapse_state,
            } => Kind::BatchCollapseGroups {
                group_ids,
                collapse_state,
            },
            OperationPayloadDto::UpdateGroupWithPropagation {
                element_id,
                field_updates,
                offset_delta_ms,
                affected_children,
            } => Kind::UpdateGroupWithPropagation {
                element_id,
                field_updates,
                offset_delta_ms,
                affected_children,
            },
            OperationPayloadDto::CreateElement(new_element) => {
                Kind::CreateElement(new_element.into())
            }
            OperationPayloadDto::DeleteElement { element_id } => Kind::DeleteElement { element_id },
            OperationPayloadDto::UpdateScriptInfo { changes } => Kind::UpdateScriptInfo { changes },
        }
    }
}

impl From<OperationDto> for contract::EditOperation {
    fn from(dto: OperationDto) -> Self {
        Self::new(dto.id, dto.payload.into())
    }
}

/// Decode the `index`-th raw operation of a batch.
///
/// The operation id is recovered even when the payload is malformed, so the
/// failure can be reported against it.
pub fn decode_operation(
    index: usize,
    raw: serde_json::Value,
) -> Result<contract::EditOperation, contract::FailedOperation> {
    let operation_id = match raw.get("id") {
        Some(serde_json::Value::String(id)) => id.clone(),
        Some(other) if !other.is_null() => other.to_string(),
        _ => format!("operations[{}]", index),
    };

    serde_json::from_value::<OperationDto>(raw)
        .map(Into::into)
        .map_err(|e| contract::FailedOperation {
            operation_id,
            error: format!("malformed operation: {}", e),
        })
}

impl From<contract::OperationResult> for OperationResultDto {
    fn from(result: contract::OperationResult) -> Self {
        let status = match result.status {
            contract::OperationStatus::Success => "success",
            contract::OperationStatus::Error => "error",
        };
        Self {
            operation_id: result.operation_id,
            status: status.to_string(),
            result: result.result,
            error: result.error,
        }
    }
}

impl From<contract::BatchResult> for BatchResultDto {
    fn from(result: contract::BatchResult) -> Self {
        Self {
            success: result.success,
            message: result.message,
            script_id: result.script_id,
            operations_processed: result.operations_processed,
            results: result.results.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<contract::FailedOperation> for OperationErrorDto {
    fn from(failed: contract::FailedOperation) -> Self {
        Self {
            operation_id: failed.operation_id,
            error: failed.error,
        }
    }
}
