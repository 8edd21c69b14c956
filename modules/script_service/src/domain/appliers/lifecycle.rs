//! CREATE_ELEMENT and DELETE_ELEMENT

use super::{grouping::detach_children, ApplyError};
use crate::contract::{ElementType, NewElement, ScriptElement};
use crate::domain::working_set::WorkingSet;
use serde_json::{json, Value};
use uuid::Uuid;

pub(super) fn create_element(ws: &mut WorkingSet, new: &NewElement) -> Result<Value, ApplyError> {
    let parent = match &new.parent_element_id {
        Some(raw) => {
            let parent_id = ws.resolve_existing(raw)?;
            if !ws.require(parent_id)?.is_group() {
                return Err(ApplyError::validation(format!("parent {} is not a group", raw)));
            }
            if new.element_type == ElementType::Group {
                return Err(ApplyError::validation("nested groups are not supported"));
            }
            Some(parent_id)
        }
        None => None,
    };

    let append_at = ws.max_sequence() + 1;
    let sequence = match (new.insert_index, new.sequence) {
        (Some(index), _) => i32::try_from(index)
            .map(|i| i.saturating_add(1))
            .unwrap_or(append_at)
            .clamp(1, append_at),
        (None, Some(sequence)) => sequence.clamp(1, append_at),
        (None, None) => append_at,
    };
    if sequence < append_at {
        ws.shift_from(sequence, 1)?;
    }

    let element_id = Uuid::new_v4();
    let (actor, now) = (ws.actor(), ws.now());
    let element = ScriptElement {
        element_id,
        script_id: ws.script_id(),
        element_type: new.element_type,
        sequence,
        offset_ms: new.offset_ms,
        duration_ms: new.duration_ms,
        element_name: new.element_name.clone(),
        cue_notes: new.cue_notes.clone(),
        custom_color: new.custom_color.clone(),
        department_id: new.department_id,
        parent_element_id: None,
        group_level: 0,
        is_collapsed: false,
        created_by: Some(actor),
        updated_by: Some(actor),
        date_created: now,
        date_updated: now,
    };
    ws.insert_pending(element, new.temp_id.clone());

    if let Some(parent_id) = parent {
        ws.defer_link(element_id, parent_id);
        ws.recompute_group_duration(parent_id)?;
    }

    Ok(json!({
        "element_id": element_id,
        "temp_id": new.temp_id,
        "sequence": sequence,
        "parent_element_id": parent,
    }))
}

pub(super) fn delete_element(ws: &mut WorkingSet, element_id: &str) -> Result<Value, ApplyError> {
    let id = ws.resolve_existing(element_id)?;
    let detached = if ws.require(id)?.is_group() {
        detach_children(ws, id)?
    } else {
        Vec::new()
    };
    let parent = ws.parent_of(id);

    let removed = ws.remove(id)?;
    ws.shift_from(removed.sequence + 1, -1)?;

    if let Some(parent_id) = parent.filter(|p| ws.contains(*p)) {
        ws.recompute_group_duration(parent_id)?;
    }

    Ok(json!({
        "element_id": id,
        "deleted": true,
        "detached_children": detached,
    }))
}
