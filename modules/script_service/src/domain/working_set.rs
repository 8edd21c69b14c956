//! Per-batch working copy of a script and its elements
//!
//! A `WorkingSet` is created by the batch driver, threaded through every
//! applier and dropped when the batch ends. Nothing in here touches storage.

use super::appliers::ApplyError;
use crate::contract::{Script, ScriptElement};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::HashMap;
use uuid::Uuid;

/// Minimum digit run treated as an embedded creation timestamp in a temp id
const TIMESTAMP_FRAGMENT_MIN_LEN: usize = 10;

/// An element as seen by the appliers
#[derive(Debug, Clone, PartialEq)]
pub enum WorkingElement {
    /// Loaded from storage; `dirty` once any applier touched it
    Existing { element: ScriptElement, dirty: bool },
    /// Created in this batch, not yet written
    Pending {
        element: ScriptElement,
        temp_id: Option<String>,
    },
}

impl WorkingElement {
    pub fn element(&self) -> &ScriptElement {
        match self {
            WorkingElement::Existing { element, .. } => element,
            WorkingElement::Pending { element, .. } => element,
        }
    }

    fn element_mut(&mut self) -> &mut ScriptElement {
        match self {
            WorkingElement::Existing { element, dirty } => {
                *dirty = true;
                element
            }
            WorkingElement::Pending { element, .. } => element,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, WorkingElement::Pending { .. })
    }

    /// Pending elements always need a write
    pub fn is_dirty(&self) -> bool {
        match self {
            WorkingElement::Existing { dirty, .. } => *dirty,
            WorkingElement::Pending { .. } => true,
        }
    }
}

/// A child -> group link postponed until the group row exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredLink {
    pub child_id: Uuid,
    pub parent_id: Uuid,
}

/// Working copy owned by one batch invocation
#[derive(Debug)]
pub struct WorkingSet {
    script: Script,
    script_dirty: bool,
    elements: IndexMap<Uuid, WorkingElement>,
    temp_ids: HashMap<String, Uuid>,
    temp_fragments: HashMap<String, Uuid>,
    deferred_links: Vec<DeferredLink>,
    removed: Vec<Uuid>,
    actor: Uuid,
    now: DateTime<Utc>,
    fragment_fallback: bool,
}

impl WorkingSet {
    /// Build a working set from the loaded script and its elements
    pub fn new(
        script: Script,
        elements: Vec<ScriptElement>,
        actor: Uuid,
        fragment_fallback: bool,
    ) -> Self {
        let mut elements: Vec<ScriptElement> = elements;
        elements.sort_by_key(|e| e.sequence);

        Self {
            script,
            script_dirty: false,
            elements: elements
                .into_iter()
                .map(|element| {
                    (
                        element.element_id,
                        WorkingElement::Existing {
                            element,
                            dirty: false,
                        },
                    )
                })
                .collect(),
            temp_ids: HashMap::new(),
            temp_fragments: HashMap::new(),
            deferred_links: Vec::new(),
            removed: Vec::new(),
            actor,
            now: Utc::now(),
            fragment_fallback,
        }
    }

    // ===== Script =====

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Mutable script access; stamps audit fields
    pub fn script_mut(&mut self) -> &mut Script {
        self.script_dirty = true;
        self.script.updated_by = Some(self.actor);
        self.script.date_updated = self.now;
        &mut self.script
    }

    pub fn script_changed(&self) -> bool {
        self.script_dirty
    }

    pub fn script_id(&self) -> Uuid {
        self.script.script_id
    }

    pub fn actor(&self) -> Uuid {
        self.actor
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    // ===== Element access =====

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn get(&self, id: Uuid) -> Option<&ScriptElement> {
        self.elements.get(&id).map(WorkingElement::element)
    }

    pub fn require(&self, id: Uuid) -> Result<&ScriptElement, ApplyError> {
        self.get(id).ok_or_else(|| ApplyError::element_not_found(id))
    }

    /// Mutable element access; marks it dirty and stamps audit fields
    pub fn touch(&mut self, id: Uuid) -> Result<&mut ScriptElement, ApplyError> {
        let (actor, now) = (self.actor, self.now);
        let element = self
            .elements
            .get_mut(&id)
            .ok_or_else(|| ApplyError::element_not_found(id))?
            .element_mut();
        element.updated_by = Some(actor);
        element.date_updated = now;
        Ok(element)
    }

    pub fn working_elements(&self) -> impl Iterator<Item = &WorkingElement> {
        self.elements.values()
    }

    pub fn elements(&self) -> impl Iterator<Item = &ScriptElement> {
        self.elements.values().map(WorkingElement::element)
    }

    /// Add an element created in this batch
    pub fn insert_pending(&mut self, element: ScriptElement, temp_id: Option<String>) {
        let id = element.element_id;
        if let Some(temp) = &temp_id {
            self.record_temp_id(temp, id);
        }
        self.elements
            .insert(id, WorkingElement::Pending { element, temp_id });
    }

    /// Remove an element; existing rows are scheduled for durable deletion
    pub fn remove(&mut self, id: Uuid) -> Result<ScriptElement, ApplyError> {
        let removed = self
            .elements
            .shift_remove(&id)
            .ok_or_else(|| ApplyError::element_not_found(id))?;
        self.deferred_links
            .retain(|link| link.child_id != id && link.parent_id != id);

        match removed {
            WorkingElement::Existing { element, .. } => {
                self.removed.push(id);
                Ok(element)
            }
            WorkingElement::Pending { element, .. } => Ok(element),
        }
    }

    /// Existing rows removed during the batch
    pub fn removed_ids(&self) -> &[Uuid] {
        &self.removed
    }

    // ===== Temp-ID resolution =====

    /// Map a client temp id to the allocated element id
    pub fn record_temp_id(&mut self, temp_id: &str, real_id: Uuid) {
        self.temp_ids.insert(temp_id.to_string(), real_id);
        if let Some(fragment) = timestamp_fragment(temp_id) {
            self.temp_fragments.insert(fragment.to_string(), real_id);
        }
    }

    /// Resolve an element reference from an operation payload.
    ///
    /// Exact temp-id match first, then a server UUID, then (if enabled) the
    /// embedded timestamp fragment of a previously recorded temp id.
    pub fn resolve(&self, raw: &str) -> Result<Uuid, ApplyError> {
        if let Some(id) = self.temp_ids.get(raw) {
            return Ok(*id);
        }
        if let Ok(id) = Uuid::parse_str(raw) {
            return Ok(id);
        }
        if self.fragment_fallback {
            if let Some(id) = timestamp_fragment(raw).and_then(|f| self.temp_fragments.get(f)) {
                tracing::debug!(temp_id = raw, element_id = %id, "resolved temp id by timestamp fragment");
                return Ok(*id);
            }
        }
        Err(ApplyError::NotFound {
            resource: "element",
            id: raw.to_string(),
        })
    }

    /// Resolve and check the element is present
    pub fn resolve_existing(&self, raw: &str) -> Result<Uuid, ApplyError> {
        let id = self.resolve(raw)?;
        self.require(id)?;
        Ok(id)
    }

    // ===== Group membership =====

    /// Postpone `child -> parent` wiring until the parent row is written
    pub fn defer_link(&mut self, child_id: Uuid, parent_id: Uuid) {
        self.deferred_links.retain(|link| link.child_id != child_id);
        self.deferred_links.push(DeferredLink {
            child_id,
            parent_id,
        });
    }

    pub fn deferred_links(&self) -> &[DeferredLink] {
        &self.deferred_links
    }

    pub fn take_deferred_links(&mut self) -> Vec<DeferredLink> {
        std::mem::take(&mut self.deferred_links)
    }

    /// Drop the deferred link of a child, if any
    pub fn clear_deferred_link(&mut self, child_id: Uuid) {
        self.deferred_links.retain(|link| link.child_id != child_id);
    }

    /// Effective parent, counting links not yet wired
    pub fn parent_of(&self, id: Uuid) -> Option<Uuid> {
        self.deferred_links
            .iter()
            .find(|link| link.child_id == id)
            .map(|link| link.parent_id)
            .or_else(|| self.get(id).and_then(|e| e.parent_element_id))
    }

    /// Children of a group ordered by sequence
    pub fn children_of(&self, group_id: Uuid) -> Vec<Uuid> {
        let mut children: Vec<&ScriptElement> = self
            .elements()
            .filter(|e| e.element_id != group_id && self.parent_of(e.element_id) == Some(group_id))
            .collect();
        children.sort_by_key(|e| e.sequence);
        children.into_iter().map(|e| e.element_id).collect()
    }

    /// Recompute a group's derived duration; returns true when it changed
    pub fn recompute_group_duration(&mut self, group_id: Uuid) -> Result<bool, ApplyError> {
        let offsets: Vec<i64> = self
            .children_of(group_id)
            .into_iter()
            .filter_map(|id| self.get(id).map(|e| e.offset_ms))
            .collect();
        let (Some(min), Some(max)) = (offsets.iter().min(), offsets.iter().max()) else {
            return Ok(false);
        };
        let duration = Some(offset_span(*min, *max)?);

        if self.require(group_id)?.duration_ms == duration {
            return Ok(false);
        }
        self.touch(group_id)?.duration_ms = duration;
        Ok(true)
    }

    // ===== Sequencing =====

    /// Element ids in current sequence order (ties keep insertion order)
    pub fn ordered_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<(i32, usize, Uuid)> = self
            .elements
            .values()
            .enumerate()
            .map(|(idx, e)| (e.element().sequence, idx, e.element().element_id))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Assign sequence = position + 1 along `order`, touching only changed rows
    pub fn renumber(&mut self, order: &[Uuid]) -> Result<usize, ApplyError> {
        let mut changed = 0;
        for (idx, id) in order.iter().enumerate() {
            let sequence = idx as i32 + 1;
            if self.require(*id)?.sequence != sequence {
                self.touch(*id)?.sequence = sequence;
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Add `delta` to the sequence of every element at or after `from`
    pub fn shift_from(&mut self, from: i32, delta: i32) -> Result<usize, ApplyError> {
        let ids: Vec<Uuid> = self
            .elements()
            .filter(|e| e.sequence >= from)
            .map(|e| e.element_id)
            .collect();
        for id in &ids {
            self.touch(*id)?.sequence += delta;
        }
        Ok(ids.len())
    }

    pub fn max_sequence(&self) -> i32 {
        self.elements().map(|e| e.sequence).max().unwrap_or(0)
    }

    /// Sequences form exactly 1..=N
    pub fn is_dense(&self) -> bool {
        let mut sequences: Vec<i32> = self.elements().map(|e| e.sequence).collect();
        sequences.sort_unstable();
        sequences
            .iter()
            .enumerate()
            .all(|(idx, seq)| *seq == idx as i32 + 1)
    }

    /// Consume into the parts needed for persistence translation
    pub fn into_parts(self) -> (Script, bool, Vec<WorkingElement>, Vec<Uuid>) {
        (
            self.script,
            self.script_dirty,
            self.elements.into_values().collect(),
            self.removed,
        )
    }
}

/// `max - min` of a set of offsets; a span wider than `i64` is rejected
pub fn offset_span(min: i64, max: i64) -> Result<i64, ApplyError> {
    max.checked_sub(min).ok_or_else(|| {
        ApplyError::validation(format!(
            "offsets {}..{} span more than the representable duration",
            min, max
        ))
    })
}

/// First run of at least `TIMESTAMP_FRAGMENT_MIN_LEN` ascii digits in a temp id
fn timestamp_fragment(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    let mut start = None;
    for (idx, b) in bytes.iter().enumerate() {
        match (b.is_ascii_digit(), start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                if idx - s >= TIMESTAMP_FRAGMENT_MIN_LEN {
                    return Some(&raw[s..idx]);
                }
                start = None;
            }
            _ => {}
        }
    }
    match start {
        Some(s) if raw.len() - s >= TIMESTAMP_FRAGMENT_MIN_LEN => Some(&raw[s..]),
        _ => None,
    }
}
