//! Persistence translation of a finished working set

use super::working_set::{WorkingElement, WorkingSet};
use crate::contract::{Script, ScriptElement};
use uuid::Uuid;

/// Net writes of one batch, in commit order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub script_id: Uuid,
    /// Present when script-level info changed
    pub script: Option<Script>,
    /// New GROUP rows; written first so children can reference them
    pub group_inserts: Vec<ScriptElement>,
    pub element_inserts: Vec<ScriptElement>,
    pub updates: Vec<ScriptElement>,
    pub deletes: Vec<Uuid>,
}

impl ChangeSet {
    pub fn from_working_set(ws: WorkingSet) -> Self {
        let script_id = ws.script_id();
        let (script, script_dirty, elements, removed) = ws.into_parts();

        let mut changes = ChangeSet {
            script_id,
            script: script_dirty.then_some(script),
            deletes: removed,
            ..Default::default()
        };
        for working in elements {
            match working {
                WorkingElement::Pending { element, .. } if element.is_group() => {
                    changes.group_inserts.push(element)
                }
                WorkingElement::Pending { element, .. } => changes.element_inserts.push(element),
                WorkingElement::Existing {
                    element,
                    dirty: true,
                } => changes.updates.push(element),
                WorkingElement::Existing { .. } => {}
            }
        }
        changes
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_none()
            && self.group_inserts.is_empty()
            && self.element_inserts.is_empty()
            && self.updates.is_empty()
            && self.deletes.is_empty()
    }

    pub fn inserted_ids(&self) -> Vec<Uuid> {
        self.group_inserts
            .iter()
            .chain(&self.element_inserts)
            .map(|e| e.element_id)
            .collect()
    }

    pub fn updated_ids(&self) -> Vec<Uuid> {
        self.updates.iter().map(|e| e.element_id).collect()
    }

    /// Number of rows written, script row included
    pub fn row_count(&self) -> usize {
        usize::from(self.script.is_some())
            + self.group_inserts.len()
            + self.element_inserts.len()
            + self.updates.len()
            + self.deletes.len()
    }
}
