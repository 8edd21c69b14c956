//! Field-level updates on elements and on the script itself

use super::{reorder, ApplyError};
use crate::contract::ScriptStatus;
use crate::domain::coercion::{
    coerce_bool, coerce_datetime, coerce_i32, coerce_i64, coerce_string, coerce_uuid,
};
use crate::domain::working_set::WorkingSet;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Which fields of an update were written and which were skipped (with why)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldReport {
    pub applied: Vec<String>,
    pub skipped: Vec<(String, String)>,
}

impl FieldReport {
    fn skip(&mut self, field: &str, reason: impl Into<String>) {
        self.skipped.push((field.to_string(), reason.into()));
    }

    pub(super) fn to_json(&self) -> Value {
        json!({
            "applied_fields": self.applied,
            "skipped_fields": self
                .skipped
                .iter()
                .map(|(field, reason)| json!({ "field": field, "reason": reason }))
                .collect::<Vec<_>>(),
        })
    }
}

enum FieldOutcome {
    Applied,
    Skipped(String),
}

/// Apply `field -> value` changes to one element.
///
/// Nulls never overwrite a column and values that fail coercion are skipped;
/// both are reported rather than failing the operation.
pub(super) fn apply_field_changes(
    ws: &mut WorkingSet,
    id: Uuid,
    changes: &Map<String, Value>,
) -> Result<FieldReport, ApplyError> {
    let mut report = FieldReport::default();
    for (field, value) in changes {
        if value.is_null() {
            report.skip(field, "null value ignored");
            continue;
        }
        match apply_field(ws, id, field, value)? {
            FieldOutcome::Applied => report.applied.push(field.clone()),
            FieldOutcome::Skipped(reason) => report.skip(field, reason),
        }
    }
    Ok(report)
}

fn apply_field(
    ws: &mut WorkingSet,
    id: Uuid,
    field: &str,
    value: &Value,
) -> Result<FieldOutcome, ApplyError> {
    let is_group = ws.require(id)?.is_group();

    macro_rules! coerce {
        ($f:ident) => {
            match $f(value) {
                Ok(v) => v,
                Err(e) => return Ok(FieldOutcome::Skipped(e.to_string())),
            }
        };
    }

    match field {
        "element_name" => {
            let name = coerce!(coerce_string);
            ws.touch(id)?.element_name = name;
        }
        "cue_notes" => {
            let notes = coerce!(coerce_string);
            ws.touch(id)?.cue_notes = Some(notes);
        }
        "custom_color" => {
            let color = coerce!(coerce_string);
            ws.touch(id)?.custom_color = Some(color);
        }
        "department_id" => {
            let department = coerce!(coerce_uuid);
            ws.touch(id)?.department_id = Some(department);
        }
        "is_collapsed" => {
            let collapsed = coerce!(coerce_bool);
            ws.touch(id)?.is_collapsed = collapsed;
        }
        "offset_ms" => {
            let offset = coerce!(coerce_i64);
            set_offset(ws, id, offset)?;
        }
        "duration_ms" => {
            if is_group {
                return Ok(FieldOutcome::Skipped(
                    "duration is derived from children for groups".to_string(),
                ));
            }
            let duration = coerce!(coerce_i64);
            ws.touch(id)?.duration_ms = Some(duration);
        }
        "sequence" => {
            let target = coerce!(coerce_i32);
            if ws.require(id)?.sequence != target {
                reorder::move_to_sequence(ws, id, target)?;
            }
        }
        "parent_element_id" | "group_level" => {
            return Ok(FieldOutcome::Skipped(
                "managed by grouping operations".to_string(),
            ))
        }
        "element_id" | "script_id" | "element_type" | "created_by" | "updated_by"
        | "date_created" | "date_updated" => {
            return Ok(FieldOutcome::Skipped("read-only field".to_string()))
        }
        _ => return Ok(FieldOutcome::Skipped("unknown field".to_string())),
    }
    Ok(FieldOutcome::Applied)
}

/// Set an offset and keep the enclosing group's duration in step
fn set_offset(ws: &mut WorkingSet, id: Uuid, offset_ms: i64) -> Result<(), ApplyError> {
    ws.touch(id)?.offset_ms = offset_ms;
    if let Some(parent) = ws.parent_of(id) {
        if ws.contains(parent) {
            ws.recompute_group_duration(parent)?;
        }
    }
    Ok(())
}

pub(super) fn update_element(
    ws: &mut WorkingSet,
    element_id: &str,
    changes: &Map<String, Value>,
) -> Result<Value, ApplyError> {
    let id = ws.resolve_existing(element_id)?;
    let report = apply_field_changes(ws, id, changes)?;

    let mut payload = report.to_json();
    payload["element_id"] = json!(id);
    Ok(payload)
}

pub(super) fn update_field(
    ws: &mut WorkingSet,
    element_id: &str,
    field_name: &str,
    new_value: &Value,
) -> Result<Value, ApplyError> {
    let mut changes = Map::new();
    changes.insert(field_name.to_string(), new_value.clone());
    update_element(ws, element_id, &changes)
}

pub(super) fn update_time_offset(
    ws: &mut WorkingSet,
    element_id: &str,
    new_offset_ms: i64,
) -> Result<Value, ApplyError> {
    let id = ws.resolve_existing(element_id)?;
    let old = ws.require(id)?.offset_ms;
    set_offset(ws, id, new_offset_ms)?;

    Ok(json!({
        "element_id": id,
        "old_offset_ms": old,
        "new_offset_ms": new_offset_ms,
    }))
}

/// Shift the listed elements by `delta_ms`; unknown ids are skipped
pub(super) fn bulk_offset_adjustment(
    ws: &mut WorkingSet,
    element_ids: &[String],
    delta_ms: i64,
) -> Result<Value, ApplyError> {
    if element_ids.is_empty() || delta_ms == 0 {
        return Ok(json!({ "updated": 0, "no_change": true }));
    }

    let mut updated = Vec::new();
    let mut skipped = Vec::new();
    let mut parents = BTreeSet::new();
    for raw in element_ids {
        let resolved = ws.resolve(raw).ok().filter(|id| ws.contains(*id));
        match resolved {
            Some(id) => {
                let element = ws.touch(id)?;
                element.offset_ms = element.offset_ms.saturating_add(delta_ms);
                updated.push(id);
                if let Some(parent) = ws.parent_of(id) {
                    parents.insert(parent);
                }
            }
            None => skipped.push(raw.clone()),
        }
    }
    for parent in parents {
        if ws.contains(parent) {
            ws.recompute_group_duration(parent)?;
        }
    }

    Ok(json!({
        "updated": updated.len(),
        "delta_ms": delta_ms,
        "skipped": skipped,
    }))
}

/// Script metadata changes (name, status, times, notes)
pub(super) fn update_script_info(
    ws: &mut WorkingSet,
    changes: &Map<String, Value>,
) -> Result<Value, ApplyError> {
    let mut report = FieldReport::default();

    for (field, value) in changes {
        if value.is_null() {
            report.skip(field, "null value ignored");
            continue;
        }
        let outcome = match field.as_str() {
            "script_name" => coerce_string(value).map(|v| ws.script_mut().script_name = v),
            "script_notes" => coerce_string(value).map(|v| ws.script_mut().script_notes = Some(v)),
            "start_time" => coerce_datetime(value).map(|v| ws.script_mut().start_time = Some(v)),
            "end_time" => coerce_datetime(value).map(|v| ws.script_mut().end_time = Some(v)),
            "script_status" => {
                let Some(status) = value.as_str().and_then(ScriptStatus::parse) else {
                    report.skip(field, format!("unknown script status {}", value));
                    continue;
                };
                ws.script_mut().script_status = status;
                Ok(())
            }
            _ => {
                report.skip(field, "unknown field");
                continue;
            }
        };
        match outcome {
            Ok(()) => report.applied.push(field.clone()),
            Err(e) => report.skip(field, e.to_string()),
        }
    }

    let mut payload = report.to_json();
    payload["script_id"] = json!(ws.script_id());
    Ok(payload)
}
