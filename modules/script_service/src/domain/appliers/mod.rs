//! Operation appliers
//!
//! Each applier mutates the working set in place and returns a small JSON
//! payload describing what it did. Appliers never touch storage.

mod fields;
mod grouping;
mod lifecycle;
mod reorder;

use super::working_set::WorkingSet;
use crate::contract::OperationKind;
use serde_json::{json, Value};
use uuid::Uuid;

/// Failure of a single operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("{0}")]
    Validation(String),
}

impl ApplyError {
    pub fn element_not_found(id: Uuid) -> Self {
        Self::NotFound {
            resource: "element",
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Apply one operation to the working set
pub fn apply(ws: &mut WorkingSet, kind: &OperationKind) -> Result<Value, ApplyError> {
    match kind {
        OperationKind::Reorder {
            element_id,
            old_sequence,
            new_sequence,
        } => reorder::reorder(ws, element_id, *old_sequence, *new_sequence),
        OperationKind::BulkReorder { updates } => reorder::apply_sequence_updates(ws, updates),
        OperationKind::EnableAutoSort { sequence_updates } => {
            let mut payload = reorder::apply_sequence_updates(ws, sequence_updates)?;
            payload["auto_sort"] = json!(true);
            Ok(payload)
        }
        OperationKind::DisableAutoSort => Ok(json!({ "auto_sort": false })),
        OperationKind::CreateGroup {
            element_ids,
            group_name,
            background_color,
            temp_group_id,
        } => grouping::create_group(
            ws,
            element_ids,
            group_name,
            background_color.as_deref(),
            temp_group_id.as_deref(),
        ),
        OperationKind::UngroupElements { group_element_id } => {
            grouping::ungroup(ws, group_element_id)
        }
        OperationKind::ToggleGroupCollapse {
            element_id,
            is_collapsed,
        } => grouping::toggle_collapse(ws, element_id, is_collapsed.unwrap_or(false)),
        OperationKind::BatchCollapseGroups {
            group_ids,
            collapse_state,
        } => grouping::batch_collapse(ws, group_ids, *collapse_state),
        OperationKind::UpdateGroupWithPropagation {
            element_id,
            field_updates,
            offset_delta_ms,
            affected_children,
        } => grouping::update_with_propagation(
            ws,
            element_id,
            field_updates,
            *offset_delta_ms,
            affected_children,
        ),
        OperationKind::UpdateElement {
            element_id,
            changes,
        } => fields::update_element(ws, element_id, changes),
        OperationKind::UpdateField {
            element_id,
            field_name,
            new_value,
        } => fields::update_field(ws, element_id, field_name, new_value),
        OperationKind::UpdateTimeOffset {
            element_id,
            new_offset_ms,
        } => fields::update_time_offset(ws, element_id, *new_offset_ms),
        OperationKind::BulkOffsetAdjustment {
            element_ids,
            delta_ms,
        } => fields::bulk_offset_adjustment(ws, element_ids, *delta_ms),
        OperationKind::UpdateScriptInfo { changes } => fields::update_script_info(ws, changes),
        OperationKind::CreateElement(new_element) => lifecycle::create_element(ws, new_element),
        OperationKind::DeleteElement { element_id } => lifecycle::delete_element(ws, element_id),
    }
}
