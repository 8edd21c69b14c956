//! Post-processing of a working set after every operation succeeded
//!
//! Runs once per batch, in this order: deferred wiring, normalization, group
//! duration propagation, optional auto-sort and the final density check.

use super::appliers::ApplyError;
use super::working_set::WorkingSet;
use uuid::Uuid;

/// Summary of what post-processing changed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PostProcessReport {
    pub links_wired: usize,
    pub levels_fixed: usize,
    pub durations_recomputed: usize,
    pub auto_sorted: usize,
}

/// Run the whole post-processing pipeline
pub fn finalize(ws: &mut WorkingSet, auto_sort: bool) -> Result<PostProcessReport, ApplyError> {
    let mut report = PostProcessReport {
        links_wired: wire_deferred_links(ws)?,
        levels_fixed: normalize(ws)?,
        ..Default::default()
    };
    report.durations_recomputed = propagate_group_durations(ws)?;
    if auto_sort {
        report.auto_sorted = auto_sort_by_offset(ws)?;
    }
    ensure_dense(ws)?;

    Ok(report)
}

/// Write every recorded child -> group link onto the child
pub fn wire_deferred_links(ws: &mut WorkingSet) -> Result<usize, ApplyError> {
    let links = ws.take_deferred_links();
    let mut wired = 0;
    for link in links {
        // Either end may have been removed later in the batch
        if !ws.contains(link.child_id) || !ws.contains(link.parent_id) {
            continue;
        }
        let child = ws.touch(link.child_id)?;
        child.parent_element_id = Some(link.parent_id);
        child.group_level = 1;
        wired += 1;
    }
    Ok(wired)
}

/// Re-derive `group_level` from the parent link, dropping dangling parents
pub fn normalize(ws: &mut WorkingSet) -> Result<usize, ApplyError> {
    let fixes: Vec<(Uuid, Option<Uuid>, i32)> = ws
        .elements()
        .filter_map(|e| {
            let parent = e
                .parent_element_id
                .filter(|p| ws.get(*p).is_some_and(|g| g.is_group()));
            let level = i32::from(parent.is_some());
            (parent != e.parent_element_id || level != e.group_level)
                .then_some((e.element_id, parent, level))
        })
        .collect();

    for (id, parent, level) in &fixes {
        let element = ws.touch(*id)?;
        element.parent_element_id = *parent;
        element.group_level = *level;
    }
    Ok(fixes.len())
}

/// Recompute the duration of every group that has children
pub fn propagate_group_durations(ws: &mut WorkingSet) -> Result<usize, ApplyError> {
    let groups: Vec<Uuid> = ws
        .elements()
        .filter(|e| e.is_group())
        .map(|e| e.element_id)
        .collect();
    let mut changed = 0;
    for group_id in groups {
        if ws.recompute_group_duration(group_id)? {
            changed += 1;
        }
    }
    Ok(changed)
}

/// Stable sort by `(offset_ms, sequence)` and renumber 1..N
pub fn auto_sort_by_offset(ws: &mut WorkingSet) -> Result<usize, ApplyError> {
    let mut keyed: Vec<(i64, i32, Uuid)> = ws
        .elements()
        .map(|e| (e.offset_ms, e.sequence, e.element_id))
        .collect();
    keyed.sort_by_key(|(offset, sequence, _)| (*offset, *sequence));
    let order: Vec<Uuid> = keyed.into_iter().map(|(_, _, id)| id).collect();
    ws.renumber(&order)
}

pub fn ensure_dense(ws: &WorkingSet) -> Result<(), ApplyError> {
    if ws.is_dense() {
        return Ok(());
    }
    let mut sequences: Vec<i32> = ws.elements().map(|e| e.sequence).collect();
    sequences.sort_unstable();
    Err(ApplyError::validation(format!(
        "sequences are not a contiguous 1..{} permutation: {:?}",
        ws.len(),
        sequences
    )))
}
