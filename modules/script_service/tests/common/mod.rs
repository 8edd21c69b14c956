//! Common test utilities: fixtures, mock repository and recording publisher

#![allow(dead_code)]

use chrono::Utc;
use script_service::config::Config;
use script_service::contract::*;
use script_service::domain::{EventPublisher, Service};
use std::sync::Arc;
use uuid::Uuid;

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

// ===== Fixtures =====

pub fn script() -> Script {
    Script {
        script_id: Uuid::new_v4(),
        show_id: Uuid::new_v4(),
        script_name: "Hamlet - Tech Run".to_string(),
        script_status: ScriptStatus::Working,
        start_time: None,
        end_time: None,
        script_notes: None,
        created_by: None,
        updated_by: None,
        date_created: Utc::now(),
        date_updated: Utc::now(),
    }
}

pub fn element(
    script_id: Uuid,
    element_type: ElementType,
    name: &str,
    sequence: i32,
    offset_ms: i64,
) -> ScriptElement {
    ScriptElement {
        element_id: Uuid::new_v4(),
        script_id,
        element_type,
        sequence,
        offset_ms,
        duration_ms: None,
        element_name: name.to_string(),
        cue_notes: None,
        custom_color: None,
        department_id: None,
        parent_element_id: None,
        group_level: 0,
        is_collapsed: false,
        created_by: None,
        updated_by: None,
        date_created: Utc::now(),
        date_updated: Utc::now(),
    }
}

/// A script plus its elements, as loaded into a repository
pub struct ScriptFixture {
    pub script: Script,
    pub elements: Vec<ScriptElement>,
}

impl ScriptFixture {
    /// Cues named "LX 1".."LX n" at the given offsets, sequences 1..=n
    pub fn with_cues(offsets: &[i64]) -> Self {
        let script = script();
        let elements = offsets
            .iter()
            .enumerate()
            .map(|(idx, offset)| {
                let seq = idx as i32 + 1;
                element(
                    script.script_id,
                    ElementType::Cue,
                    &format!("LX {}", seq),
                    seq,
                    *offset,
                )
            })
            .collect();
        Self { script, elements }
    }

    /// G(1) [c1(2) c2(3)] then top-level cues, one per trailing offset
    pub fn with_group(child_offsets: [i64; 2], trailing_offsets: &[i64]) -> Self {
        let script = script();
        let sid = script.script_id;
        let mut group = element(sid, ElementType::Group, "Storm", 1, child_offsets[0]);
        group.duration_ms = Some(child_offsets[1] - child_offsets[0]);
        let gid = group.element_id;

        let mut elements = vec![group];
        for (idx, offset) in child_offsets.iter().enumerate() {
            let mut child = element(sid, ElementType::Cue, &format!("SQ {}", idx + 1), idx as i32 + 2, *offset);
            child.parent_element_id = Some(gid);
            child.group_level = 1;
            elements.push(child);
        }
        for (idx, offset) in trailing_offsets.iter().enumerate() {
            elements.push(element(sid, ElementType::Note, &format!("Note {}", idx + 1), idx as i32 + 4, *offset));
        }
        Self { script, elements }
    }

    pub fn script_id(&self) -> Uuid {
        self.script.script_id
    }

    pub fn id(&self, idx: usize) -> Uuid {
        self.elements[idx].element_id
    }
}

pub fn build_service(
    repo: Arc<mocks::MockScriptRepository>,
    publisher: Arc<dyn EventPublisher>,
) -> Service {
    Service::new(repo, publisher, Config::default())
}

pub fn user() -> ActingUser {
    ActingUser::new(Uuid::new_v4())
}

pub fn op(id: &str, kind: OperationKind) -> EditOperation {
    EditOperation::new(id, kind)
}

pub fn assert_dense(elements: &[ScriptElement]) {
    let mut sequences: Vec<i32> = elements.iter().map(|e| e.sequence).collect();
    sequences.sort_unstable();
    let expected: Vec<i32> = (1..=elements.len() as i32).collect();
    assert_eq!(sequences, expected, "sequences must be exactly 1..=N");
}

// ===== Mocks =====

pub mod mocks {
    use super::*;
    use anyhow::bail;
    use async_trait::async_trait;
    use parking_lot::RwLock;
    use script_service::domain::{ChangeSet, ScriptEvent, ScriptRepository};
    use std::collections::{HashMap, HashSet};

    #[derive(Debug, Clone, Default)]
    struct Store {
        scripts: HashMap<Uuid, Script>,
        elements: HashMap<Uuid, ScriptElement>,
    }

    impl Store {
        fn check_parent(&self, element: &ScriptElement) -> anyhow::Result<()> {
            if let Some(parent) = element.parent_element_id {
                if !self.elements.contains_key(&parent) {
                    bail!(
                        "foreign key violation: {} references missing parent {}",
                        element.element_id,
                        parent
                    );
                }
            }
            Ok(())
        }

        /// Mirrors the unique `(script_id, sequence)` index
        fn check_unique_sequences(&self, script_id: Uuid) -> anyhow::Result<()> {
            let mut seen = HashSet::new();
            for element in self.elements.values().filter(|e| e.script_id == script_id) {
                if !seen.insert(element.sequence) {
                    bail!(
                        "unique violation: sequence {} is taken twice in script {}",
                        element.sequence,
                        script_id
                    );
                }
            }
            Ok(())
        }
    }

    /// In-memory repository that applies change sets transactionally
    #[derive(Clone, Default)]
    pub struct MockScriptRepository {
        store: Arc<RwLock<Store>>,
        commits: Arc<RwLock<Vec<ChangeSet>>>,
        fail_commits: Arc<RwLock<bool>>,
    }

    impl MockScriptRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_fixture(fixture: &ScriptFixture) -> Self {
            let repo = Self::new();
            {
                let mut store = repo.store.write();
                store
                    .scripts
                    .insert(fixture.script.script_id, fixture.script.clone());
                for element in &fixture.elements {
                    store.elements.insert(element.element_id, element.clone());
                }
            }
            repo
        }

        /// Make every subsequent commit fail
        pub fn fail_commits(&self) {
            *self.fail_commits.write() = true;
        }

        pub fn commit_count(&self) -> usize {
            self.commits.read().len()
        }

        pub fn last_commit(&self) -> Option<ChangeSet> {
            self.commits.read().last().cloned()
        }

        pub fn script(&self, script_id: Uuid) -> Option<Script> {
            self.store.read().scripts.get(&script_id).cloned()
        }

        /// Stored elements of a script ordered by sequence
        pub fn elements(&self, script_id: Uuid) -> Vec<ScriptElement> {
            let mut elements: Vec<ScriptElement> = self
                .store
                .read()
                .elements
                .values()
                .filter(|e| e.script_id == script_id)
                .cloned()
                .collect();
            elements.sort_by_key(|e| e.sequence);
            elements
        }

        pub fn element(&self, element_id: Uuid) -> Option<ScriptElement> {
            self.store.read().elements.get(&element_id).cloned()
        }

        /// Print verbose information about repository state
        pub fn print_state(&self, script_id: Uuid, context: &str) {
            println!("\n========== ScriptRepository State: {} ==========", context);
            for e in self.elements(script_id) {
                println!(
                    "  {:>3}  {:<5} {:<12} offset={:<6} dur={:?} parent={:?} level={}",
                    e.sequence,
                    e.element_type.as_str(),
                    e.element_name,
                    e.offset_ms,
                    e.duration_ms,
                    e.parent_element_id,
                    e.group_level
                );
            }
            println!("====================================================\n");
        }
    }

    #[async_trait]
    impl ScriptRepository for MockScriptRepository {
        async fn find_script(&self, script_id: Uuid) -> anyhow::Result<Option<Script>> {
            Ok(self.script(script_id))
        }

        async fn find_elements(&self, script_id: Uuid) -> anyhow::Result<Vec<ScriptElement>> {
            Ok(self.elements(script_id))
        }

        async fn commit(&self, changes: &ChangeSet) -> anyhow::Result<()> {
            if *self.fail_commits.read() {
                bail!("simulated database outage");
            }

            // Work on a copy so a failure leaves the store untouched
            let mut next = self.store.read().clone();
            if let Some(script) = &changes.script {
                next.scripts.insert(script.script_id, script.clone());
            }
            for element in changes.group_inserts.iter().chain(&changes.element_inserts) {
                next.check_parent(element)?;
                if next.elements.insert(element.element_id, element.clone()).is_some() {
                    bail!("duplicate primary key {}", element.element_id);
                }
            }
            for element in &changes.updates {
                next.check_parent(element)?;
                if next.elements.insert(element.element_id, element.clone()).is_none() {
                    bail!("update of missing row {}", element.element_id);
                }
            }
            for id in &changes.deletes {
                next.elements.remove(id);
            }
            next.check_unique_sequences(changes.script_id)?;

            *self.store.write() = next;
            self.commits.write().push(changes.clone());
            Ok(())
        }
    }

    /// Publisher that remembers every event
    #[derive(Clone, Default)]
    pub struct RecordingEventPublisher {
        events: Arc<RwLock<Vec<ScriptEvent>>>,
    }

    impl RecordingEventPublisher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<ScriptEvent> {
            self.events.read().clone()
        }
    }

    #[async_trait]
    impl EventPublisher for RecordingEventPublisher {
        async fn publish(&self, event: ScriptEvent) -> anyhow::Result<()> {
            self.events.write().push(event);
            Ok(())
        }
    }

    /// Publisher whose every publish fails
    pub struct FailingEventPublisher;

    #[async_trait]
    impl EventPublisher for FailingEventPublisher {
        async fn publish(&self, _event: ScriptEvent) -> anyhow::Result<()> {
            bail!("broadcast channel closed")
        }
    }
}
