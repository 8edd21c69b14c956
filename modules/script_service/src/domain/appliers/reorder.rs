//! REORDER, BULK_REORDER and ENABLE_AUTO_SORT

use super::ApplyError;
use crate::contract::SequenceUpdate;
use crate::domain::working_set::WorkingSet;
use serde_json::{json, Value};
use uuid::Uuid;

/// Sequence base for a block lifted out of the ordering during a group move
const PARKED_SEQUENCE_BASE: i32 = 1_000_000;

pub(super) fn reorder(
    ws: &mut WorkingSet,
    element_id: &str,
    old_sequence: Option<i32>,
    new_sequence: i32,
) -> Result<Value, ApplyError> {
    let id = ws.resolve_existing(element_id)?;
    let current = ws.require(id)?.sequence;

    if old_sequence == Some(new_sequence) || current == new_sequence {
        return Ok(json!({
            "element_id": id,
            "sequence": current,
            "no_change": true,
        }));
    }

    move_to_sequence(ws, id, new_sequence)
}

/// Move an element (or a group with its children) so it lands on `target`
pub(super) fn move_to_sequence(ws: &mut WorkingSet, id: Uuid, target: i32) -> Result<Value, ApplyError> {
    if ws.require(id)?.is_group() {
        move_group_block(ws, id, target)
    } else {
        move_single(ws, id, target)
    }
}

fn move_single(ws: &mut WorkingSet, id: Uuid, target: i32) -> Result<Value, ApplyError> {
    let old = ws.require(id)?.sequence;
    let target = target.clamp(1, ws.max_sequence().max(1));
    if old == target {
        return Ok(json!({ "element_id": id, "sequence": old, "no_change": true }));
    }

    // Moving down pulls the in-between elements up, and vice versa
    let (low, high, delta) = if target > old {
        (old + 1, target, -1)
    } else {
        (target, old - 1, 1)
    };
    let between: Vec<Uuid> = ws
        .elements()
        .filter(|e| e.element_id != id && (low..=high).contains(&e.sequence))
        .map(|e| e.element_id)
        .collect();
    for other in &between {
        ws.touch(*other)?.sequence += delta;
    }
    ws.touch(id)?.sequence = target;

    Ok(json!({
        "element_id": id,
        "old_sequence": old,
        "new_sequence": target,
        "shifted": between.len(),
    }))
}

/// Two-phase move of a group and its children.
///
/// Phase 1 parks the block outside the valid range and compacts the hole it
/// left. Phase 2 opens a gap of `block_size` at the target and drops the block
/// into it, parent first.
fn move_group_block(ws: &mut WorkingSet, group_id: Uuid, target: i32) -> Result<Value, ApplyError> {
    let old = ws.require(group_id)?.sequence;
    let mut block = vec![group_id];
    block.extend(ws.children_of(group_id));
    let block_size = block.len() as i32;

    // Phase 1: lift and compact
    for (idx, id) in block.iter().enumerate() {
        ws.touch(*id)?.sequence = PARKED_SEQUENCE_BASE + idx as i32;
    }
    let rest: Vec<Uuid> = ws
        .ordered_ids()
        .into_iter()
        .filter(|id| !block.contains(id))
        .collect();
    ws.renumber(&rest)?;

    // Phase 2: open the gap and re-insert
    let target = target.clamp(1, rest.len() as i32 + 1);
    for id in &rest {
        if ws.require(*id)?.sequence >= target {
            ws.touch(*id)?.sequence += block_size;
        }
    }
    for (idx, id) in block.iter().enumerate() {
        ws.touch(*id)?.sequence = target + idx as i32;
    }

    Ok(json!({
        "element_id": group_id,
        "old_sequence": old,
        "new_sequence": target,
        "block_size": block_size,
    }))
}

/// Apply caller-computed sequences verbatim; the result must be dense
pub(super) fn apply_sequence_updates(
    ws: &mut WorkingSet,
    updates: &[SequenceUpdate],
) -> Result<Value, ApplyError> {
    let mut changed = 0;
    for update in updates {
        let id = ws.resolve_existing(&update.element_id)?;
        if ws.require(id)?.sequence != update.new_sequence {
            ws.touch(id)?.sequence = update.new_sequence;
            changed += 1;
        }
    }

    if !ws.is_dense() {
        return Err(ApplyError::validation(format!(
            "sequence updates do not form a permutation of 1..{}",
            ws.len()
        )));
    }

    Ok(json!({
        "requested": updates.len(),
        "updated": changed,
    }))
}
