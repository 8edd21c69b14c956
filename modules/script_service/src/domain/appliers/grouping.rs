//! CREATE_GROUP, UNGROUP_ELEMENTS, collapse toggles and group propagation

use super::{fields::apply_field_changes, ApplyError};
use crate::contract::{ElementType, ScriptElement};
use crate::domain::working_set::{offset_span, WorkingSet};
use serde_json::{json, Map, Value};
use uuid::Uuid;

pub(super) fn create_group(
    ws: &mut WorkingSet,
    element_ids: &[String],
    group_name: &str,
    background_color: Option<&str>,
    temp_group_id: Option<&str>,
) -> Result<Value, ApplyError> {
    let mut members: Vec<Uuid> = Vec::with_capacity(element_ids.len());
    for raw in element_ids {
        let id = ws.resolve_existing(raw)?;
        if !members.contains(&id) {
            members.push(id);
        }
    }
    if members.len() < 2 {
        return Err(ApplyError::validation(format!(
            "CREATE_GROUP requires at least 2 distinct elements, got {}",
            members.len()
        )));
    }

    let mut min_sequence = i32::MAX;
    let mut min_offset = i64::MAX;
    let mut max_offset = i64::MIN;
    for id in &members {
        let element = ws.require(*id)?;
        if element.is_group() {
            return Err(ApplyError::validation(format!(
                "element {} is a group; nested groups are not supported",
                id
            )));
        }
        min_sequence = min_sequence.min(element.sequence);
        min_offset = min_offset.min(element.offset_ms);
        max_offset = max_offset.max(element.offset_ms);
    }
    let duration = offset_span(min_offset, max_offset)?;

    // Make room: the group takes the first member's slot
    ws.shift_from(min_sequence, 1)?;

    let group_id = Uuid::new_v4();
    let (actor, now) = (ws.actor(), ws.now());
    let group = ScriptElement {
        element_id: group_id,
        script_id: ws.script_id(),
        element_type: ElementType::Group,
        sequence: min_sequence,
        offset_ms: min_offset,
        duration_ms: Some(duration),
        element_name: group_name.to_string(),
        cue_notes: None,
        custom_color: background_color.map(str::to_string),
        department_id: None,
        parent_element_id: None,
        group_level: 0,
        is_collapsed: false,
        created_by: Some(actor),
        updated_by: Some(actor),
        date_created: now,
        date_updated: now,
    };
    ws.insert_pending(group, temp_group_id.map(str::to_string));

    // Children are wired once the group row exists
    for id in &members {
        ws.defer_link(*id, group_id);
    }

    Ok(json!({
        "group_id": group_id,
        "temp_group_id": temp_group_id,
        "sequence": min_sequence,
        "offset_ms": min_offset,
        "duration_ms": duration,
        "deferred_children": members,
    }))
}

/// Detach every child of a group: no parent, top level
pub(super) fn detach_children(ws: &mut WorkingSet, group_id: Uuid) -> Result<Vec<Uuid>, ApplyError> {
    let children = ws.children_of(group_id);
    for child in &children {
        ws.clear_deferred_link(*child);
        let element = ws.touch(*child)?;
        element.parent_element_id = None;
        element.group_level = 0;
    }
    Ok(children)
}

fn require_group(ws: &WorkingSet, raw: &str) -> Result<Uuid, ApplyError> {
    let id = ws.resolve_existing(raw)?;
    if !ws.require(id)?.is_group() {
        return Err(ApplyError::validation(format!("element {} is not a group", raw)));
    }
    Ok(id)
}

pub(super) fn ungroup(ws: &mut WorkingSet, group_element_id: &str) -> Result<Value, ApplyError> {
    let group_id = require_group(ws, group_element_id)?;
    let detached = detach_children(ws, group_id)?;

    let removed = ws.remove(group_id)?;
    ws.shift_from(removed.sequence + 1, -1)?;

    Ok(json!({
        "group_id": group_id,
        "detached_children": detached,
        "deleted": true,
    }))
}

pub(super) fn toggle_collapse(
    ws: &mut WorkingSet,
    element_id: &str,
    is_collapsed: bool,
) -> Result<Value, ApplyError> {
    let group_id = require_group(ws, element_id)?;
    ws.touch(group_id)?.is_collapsed = is_collapsed;

    Ok(json!({ "element_id": group_id, "is_collapsed": is_collapsed }))
}

pub(super) fn batch_collapse(
    ws: &mut WorkingSet,
    group_ids: &[String],
    collapse_state: bool,
) -> Result<Value, ApplyError> {
    let mut updated = Vec::with_capacity(group_ids.len());
    for raw in group_ids {
        let group_id = require_group(ws, raw)?;
        ws.touch(group_id)?.is_collapsed = collapse_state;
        updated.push(group_id);
    }

    Ok(json!({ "updated": updated, "is_collapsed": collapse_state }))
}

/// Group field updates plus an optional offset shift of the listed children
pub(super) fn update_with_propagation(
    ws: &mut WorkingSet,
    element_id: &str,
    field_updates: &Map<String, Value>,
    offset_delta_ms: Option<i64>,
    affected_children: &[String],
) -> Result<Value, ApplyError> {
    let group_id = require_group(ws, element_id)?;
    let mut children = Vec::with_capacity(affected_children.len());
    for raw in affected_children {
        let child = ws.resolve_existing(raw)?;
        if ws.parent_of(child) != Some(group_id) {
            return Err(ApplyError::validation(format!(
                "element {} is not a child of group {}",
                raw, group_id
            )));
        }
        children.push(child);
    }
    let report = apply_field_changes(ws, group_id, field_updates)?;

    let mut children_updated = 0;
    if let Some(delta) = offset_delta_ms.filter(|d| *d != 0) {
        for child in children {
            let element = ws.touch(child)?;
            element.offset_ms = element.offset_ms.saturating_add(delta);
            children_updated += 1;
        }
    }
    ws.recompute_group_duration(group_id)?;

    let mut payload = report.to_json();
    payload["element_id"] = json!(group_id);
    payload["children_updated"] = json!(children_updated);
    Ok(payload)
}
