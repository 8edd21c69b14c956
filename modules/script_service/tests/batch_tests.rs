//! Integration tests for batch edit processing

use script_service::contract::*;
use script_service::domain::{NoOpEventPublisher, ScriptEvent, Service};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

mod common;
use common::mocks::{FailingEventPublisher, MockScriptRepository, RecordingEventPublisher};
use common::*;

fn service_for(fixture: &ScriptFixture) -> (Service, Arc<MockScriptRepository>) {
    let repo = Arc::new(MockScriptRepository::with_fixture(fixture));
    let service = build_service(repo.clone(), Arc::new(NoOpEventPublisher));
    (service, repo)
}

#[tokio::test]
async fn test_create_group_scenario() {
    print_test_header(
        "test_create_group_scenario",
        &["A, B, C grouped as [A, B] under \"Intro\" lands G at 1 and shifts the rest."],
    );
    let fixture = ScriptFixture::with_cues(&[1_000, 3_500, 9_000]);
    let (service, repo) = service_for(&fixture);
    let (a, b, c) = (fixture.id(0), fixture.id(1), fixture.id(2));
    repo.print_state(fixture.script_id(), "Initial state");

    let result = service
        .process_batch(
            fixture.script_id(),
            vec![op(
                "op-1",
                OperationKind::CreateGroup {
                    element_ids: vec![a.to_string(), b.to_string()],
                    group_name: "Intro".to_string(),
                    background_color: Some("#445566".to_string()),
                    temp_group_id: None,
                },
            )],
            &user(),
        )
        .await
        .expect("batch should commit");
    repo.print_state(fixture.script_id(), "After CREATE_GROUP");

    assert!(result.success);
    assert_eq!(result.operations_processed, 1);
    let group_id: Uuid = serde_json::from_value(
        result.results[0].result.clone().expect("payload")["group_id"].clone(),
    )
    .expect("group id");

    let group = repo.element(group_id).expect("group persisted");
    assert_eq!(group.element_type, ElementType::Group);
    assert_eq!(group.sequence, 1);
    assert_eq!(group.duration_ms, Some(2_500));
    assert_eq!(group.custom_color.as_deref(), Some("#445566"));

    for (id, seq) in [(a, 2), (b, 3)] {
        let child = repo.element(id).expect("child");
        assert_eq!(child.sequence, seq);
        assert_eq!(child.parent_element_id, Some(group_id));
        assert_eq!(child.group_level, 1);
    }
    let c = repo.element(c).expect("c");
    assert_eq!(c.sequence, 4);
    assert_eq!(c.parent_element_id, None);

    let commit = repo.last_commit().expect("one commit");
    assert_eq!(commit.group_inserts.len(), 1);
    assert!(commit.element_inserts.is_empty());
    assert_dense(&repo.elements(fixture.script_id()));
}

#[tokio::test]
async fn test_uncoercible_field_value_is_skipped_not_fatal() {
    print_test_header(
        "test_uncoercible_field_value_is_skipped_not_fatal",
        &["UPDATE_FIELD offset_ms=\"not-a-number\" is reported per field and changes nothing."],
    );
    let fixture = ScriptFixture::with_cues(&[0, 100]);
    let (service, repo) = service_for(&fixture);
    let a = fixture.id(0);

    let result = service
        .process_batch(
            fixture.script_id(),
            vec![op(
                "op-1",
                OperationKind::UpdateField {
                    element_id: a.to_string(),
                    field_name: "offset_ms".to_string(),
                    new_value: json!("not-a-number"),
                },
            )],
            &user(),
        )
        .await
        .expect("batch should not be rejected");

    let payload = result.results[0].result.clone().expect("payload");
    assert!(result.results[0].is_success());
    assert_eq!(payload["applied_fields"], json!([]));
    assert_eq!(payload["skipped_fields"][0]["field"], "offset_ms");

    assert_eq!(repo.commit_count(), 0, "no effective change, no commit");
    assert_eq!(repo.element(a).map(|e| e.offset_ms), Some(0));
}

#[tokio::test]
async fn test_failed_operation_rejects_whole_batch() {
    print_test_header(
        "test_failed_operation_rejects_whole_batch",
        &[
            "Valid operations before and after a malformed one are not persisted.",
            "Every failing operation is reported.",
        ],
    );
    let fixture = ScriptFixture::with_cues(&[0, 100, 200]);
    let (service, repo) = service_for(&fixture);
    let before = repo.elements(fixture.script_id());
    let script_before = repo.script(fixture.script_id());

    let ghost = Uuid::new_v4().to_string();
    let operations = vec![
        op(
            "op-1",
            OperationKind::Reorder {
                element_id: fixture.id(0).to_string(),
                old_sequence: Some(1),
                new_sequence: 3,
            },
        ),
        op(
            "op-2",
            OperationKind::UpdateScriptInfo {
                changes: json!({ "script_name": "Renamed" })
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
            },
        ),
        op("op-3", OperationKind::DeleteElement { element_id: ghost }),
        op(
            "op-4",
            OperationKind::UngroupElements {
                group_element_id: fixture.id(1).to_string(),
            },
        ),
        op(
            "op-5",
            OperationKind::UpdateTimeOffset {
                element_id: fixture.id(2).to_string(),
                new_offset_ms: 999,
            },
        ),
    ];

    let err = service
        .process_batch(fixture.script_id(), operations, &user())
        .await
        .expect_err("batch must be rejected");

    match err {
        ScriptError::BatchRejected { failed, attempted } => {
            assert_eq!(attempted, 5);
            let ids: Vec<&str> = failed.iter().map(|f| f.operation_id.as_str()).collect();
            assert_eq!(ids, vec!["op-3", "op-4"]);
        }
        e => panic!("Expected BatchRejected, got: {:?}", e),
    }

    assert_eq!(repo.commit_count(), 0);
    assert_eq!(repo.elements(fixture.script_id()), before);
    assert_eq!(repo.script(fixture.script_id()), script_before);
}

#[tokio::test]
async fn test_temp_id_resolves_within_batch() {
    print_test_header(
        "test_temp_id_resolves_within_batch",
        &["CREATE_GROUP with temp id \"tmp-1\" then UPDATE_FIELD on \"tmp-1\" hits the new group."],
    );
    let fixture = ScriptFixture::with_cues(&[0, 100, 200]);
    let (service, repo) = service_for(&fixture);

    let operations = vec![
        op(
            "op-1",
            OperationKind::CreateGroup {
                element_ids: vec![fixture.id(1).to_string(), fixture.id(2).to_string()],
                group_name: "Act Two".to_string(),
                background_color: None,
                temp_group_id: Some("tmp-1".to_string()),
            },
        ),
        op(
            "op-2",
            OperationKind::UpdateField {
                element_id: "tmp-1".to_string(),
                field_name: "element_name".to_string(),
                new_value: json!("Act II"),
            },
        ),
        op(
            "op-3",
            OperationKind::ToggleGroupCollapse {
                element_id: "tmp-1".to_string(),
                is_collapsed: Some(true),
            },
        ),
        op(
            "op-4",
            OperationKind::CreateElement({
                let mut new = NewElement::new(ElementType::Cue, "SQ 9");
                new.temp_id = Some("cue-tmp".to_string());
                new.parent_element_id = Some("tmp-1".to_string());
                new.offset_ms = 600;
                new
            }),
        ),
    ];

    let result = service
        .process_batch(fixture.script_id(), operations, &user())
        .await
        .expect("batch should commit");
    repo.print_state(fixture.script_id(), "After temp-id batch");

    let group_id: Uuid = serde_json::from_value(
        result.results[0].result.clone().expect("payload")["group_id"].clone(),
    )
    .expect("group id");
    let group = repo.element(group_id).expect("group persisted");
    assert_eq!(group.element_name, "Act II");
    assert!(group.is_collapsed);
    // children at 100, 200 and the new one at 600
    assert_eq!(group.duration_ms, Some(500));

    let children: Vec<ScriptElement> = repo
        .elements(fixture.script_id())
        .into_iter()
        .filter(|e| e.parent_element_id == Some(group_id))
        .collect();
    assert_eq!(children.len(), 3);
    assert!(children.iter().all(|c| c.group_level == 1));

    let commit = repo.last_commit().expect("commit");
    assert_eq!(commit.group_inserts.len(), 1);
    assert_eq!(commit.element_inserts.len(), 1);
    assert_dense(&repo.elements(fixture.script_id()));
}

#[tokio::test]
async fn test_timestamp_fragment_fallback() {
    print_test_header(
        "test_timestamp_fragment_fallback",
        &["A differently-prefixed temp id with the same timestamp digits still resolves."],
    );
    let fixture = ScriptFixture::with_cues(&[0, 100]);
    let (service, repo) = service_for(&fixture);

    let operations = vec![
        op(
            "op-1",
            OperationKind::CreateGroup {
                element_ids: vec![fixture.id(0).to_string(), fixture.id(1).to_string()],
                group_name: "Prologue".to_string(),
                background_color: None,
                temp_group_id: Some("temp-group-1712345678901".to_string()),
            },
        ),
        op(
            "op-2",
            OperationKind::ToggleGroupCollapse {
                element_id: "group_1712345678901".to_string(),
                is_collapsed: Some(true),
            },
        ),
    ];

    service
        .process_batch(fixture.script_id(), operations, &user())
        .await
        .expect("fallback should resolve the group");

    let group = repo
        .elements(fixture.script_id())
        .into_iter()
        .find(|e| e.is_group())
        .expect("group");
    assert!(group.is_collapsed);
}

#[tokio::test]
async fn test_noop_reorder_changes_nothing() {
    print_test_header(
        "test_noop_reorder_changes_nothing",
        &["REORDER with old == new returns no_change and leaves storage untouched."],
    );
    let fixture = ScriptFixture::with_cues(&[0, 100, 200]);
    let (service, repo) = service_for(&fixture);
    let before = repo.elements(fixture.script_id());

    let result = service
        .process_batch(
            fixture.script_id(),
            vec![op(
                "op-1",
                OperationKind::Reorder {
                    element_id: fixture.id(1).to_string(),
                    old_sequence: Some(2),
                    new_sequence: 2,
                },
            )],
            &user(),
        )
        .await
        .expect("batch should succeed");

    assert_eq!(
        result.results[0].result.as_ref().map(|r| r["no_change"].clone()),
        Some(json!(true))
    );
    assert_eq!(repo.commit_count(), 0);
    assert_eq!(repo.elements(fixture.script_id()), before);
}

#[tokio::test]
async fn test_ungroup_detaches_children() {
    print_test_header(
        "test_ungroup_detaches_children",
        &["UNGROUP_ELEMENTS removes G, detaches its children and keeps 1..N."],
    );
    let fixture = ScriptFixture::with_group([1_000, 2_000], &[5_000]);
    let (service, repo) = service_for(&fixture);
    let (g, c1, c2, note) = (fixture.id(0), fixture.id(1), fixture.id(2), fixture.id(3));

    service
        .process_batch(
            fixture.script_id(),
            vec![op(
                "op-1",
                OperationKind::UngroupElements {
                    group_element_id: g.to_string(),
                },
            )],
            &user(),
        )
        .await
        .expect("ungroup should commit");
    repo.print_state(fixture.script_id(), "After UNGROUP");

    assert!(repo.element(g).is_none());
    for (id, seq) in [(c1, 1), (c2, 2)] {
        let child = repo.element(id).expect("child kept");
        assert_eq!(child.parent_element_id, None);
        assert_eq!(child.group_level, 0);
        assert_eq!(child.sequence, seq);
    }
    assert_eq!(repo.element(note).map(|e| e.sequence), Some(3));
    assert_dense(&repo.elements(fixture.script_id()));

    let commit = repo.last_commit().expect("commit");
    assert_eq!(commit.deletes, vec![g]);
}

#[tokio::test]
async fn test_child_offset_change_updates_group_duration() {
    print_test_header(
        "test_child_offset_change_updates_group_duration",
        &["Group duration follows child offsets across every offset-changing operation."],
    );
    let fixture = ScriptFixture::with_group([1_000, 2_000], &[5_000]);
    let (service, repo) = service_for(&fixture);
    let (g, c1, c2) = (fixture.id(0), fixture.id(1), fixture.id(2));

    service
        .process_batch(
            fixture.script_id(),
            vec![
                op(
                    "op-1",
                    OperationKind::UpdateTimeOffset {
                        element_id: c2.to_string(),
                        new_offset_ms: 4_000,
                    },
                ),
                op(
                    "op-2",
                    OperationKind::BulkOffsetAdjustment {
                        element_ids: vec![c1.to_string(), Uuid::new_v4().to_string()],
                        delta_ms: -500,
                    },
                ),
            ],
            &user(),
        )
        .await
        .expect("batch should commit");

    assert_eq!(repo.element(g).and_then(|e| e.duration_ms), Some(3_500));
}

#[tokio::test]
async fn test_extreme_offsets_reject_batch_without_panic() {
    print_test_header(
        "test_extreme_offsets_reject_batch_without_panic",
        &["Child offsets whose span does not fit a duration fail their operations."],
    );
    let fixture = ScriptFixture::with_group([0, 100], &[]);
    let (service, repo) = service_for(&fixture);
    let before = repo.elements(fixture.script_id());

    let operations = vec![
        op(
            "op-1",
            OperationKind::UpdateTimeOffset {
                element_id: fixture.id(1).to_string(),
                new_offset_ms: i64::MIN,
            },
        ),
        op(
            "op-2",
            OperationKind::UpdateTimeOffset {
                element_id: fixture.id(2).to_string(),
                new_offset_ms: i64::MAX,
            },
        ),
    ];

    let err = service
        .process_batch(fixture.script_id(), operations, &user())
        .await
        .expect_err("batch must be rejected");

    match err {
        ScriptError::BatchRejected { failed, attempted } => {
            assert_eq!(attempted, 2);
            let ids: Vec<&str> = failed.iter().map(|f| f.operation_id.as_str()).collect();
            assert_eq!(ids, vec!["op-1", "op-2"]);
            println!("✅ rejected: {}", failed[0].error);
        }
        e => panic!("Expected BatchRejected, got: {:?}", e),
    }

    assert_eq!(repo.commit_count(), 0);
    assert_eq!(repo.elements(fixture.script_id()), before);
}

#[tokio::test]
async fn test_delete_group_keeps_children() {
    let fixture = ScriptFixture::with_group([0, 400], &[]);
    let (service, repo) = service_for(&fixture);
    let (g, c1, c2) = (fixture.id(0), fixture.id(1), fixture.id(2));

    service
        .process_batch(
            fixture.script_id(),
            vec![op("op-1", OperationKind::DeleteElement { element_id: g.to_string() })],
            &user(),
        )
        .await
        .expect("delete should commit");

    assert!(repo.element(g).is_none());
    for id in [c1, c2] {
        let child = repo.element(id).expect("child kept");
        assert_eq!(child.parent_element_id, None);
        assert_eq!(child.group_level, 0);
    }
    assert_dense(&repo.elements(fixture.script_id()));
}

#[tokio::test]
async fn test_group_reorder_keeps_block_together() {
    let fixture = ScriptFixture::with_group([0, 100], &[200, 300]);
    let (service, repo) = service_for(&fixture);
    let (g, c1, c2, n1, n2) = (
        fixture.id(0),
        fixture.id(1),
        fixture.id(2),
        fixture.id(3),
        fixture.id(4),
    );

    service
        .process_batch(
            fixture.script_id(),
            vec![op(
                "op-1",
                OperationKind::Reorder {
                    element_id: g.to_string(),
                    old_sequence: Some(1),
                    new_sequence: 3,
                },
            )],
            &user(),
        )
        .await
        .expect("reorder should commit");

    let seq = |id| repo.element(id).map(|e| e.sequence).unwrap_or(-1);
    assert_eq!(
        [seq(n1), seq(n2), seq(g), seq(c1), seq(c2)],
        [1, 2, 3, 4, 5]
    );
}

#[tokio::test]
async fn test_auto_sort_preference_orders_by_offset() {
    print_test_header(
        "test_auto_sort_preference_orders_by_offset",
        &["With auto-sort on, the committed order follows offsets including new elements."],
    );
    let fixture = ScriptFixture::with_cues(&[0, 100, 200]);
    let (service, repo) = service_for(&fixture);
    let actor = user().with_auto_sort(true);

    service
        .process_batch(
            fixture.script_id(),
            vec![
                op(
                    "op-1",
                    OperationKind::UpdateTimeOffset {
                        element_id: fixture.id(0).to_string(),
                        new_offset_ms: 150,
                    },
                ),
                op(
                    "op-2",
                    OperationKind::CreateElement({
                        let mut new = NewElement::new(ElementType::Note, "House lights");
                        new.offset_ms = 50;
                        new
                    }),
                ),
            ],
            &actor,
        )
        .await
        .expect("batch should commit");

    let names: Vec<String> = repo
        .elements(fixture.script_id())
        .into_iter()
        .map(|e| e.element_name)
        .collect();
    assert_eq!(names, vec!["House lights", "LX 2", "LX 1", "LX 3"]);
}

#[tokio::test]
async fn test_bulk_reorder_must_be_permutation() {
    let fixture = ScriptFixture::with_cues(&[0, 100, 200]);
    let (service, repo) = service_for(&fixture);

    let err = service
        .process_batch(
            fixture.script_id(),
            vec![op(
                "op-1",
                OperationKind::BulkReorder {
                    updates: vec![SequenceUpdate {
                        element_id: fixture.id(0).to_string(),
                        new_sequence: 7,
                    }],
                },
            )],
            &user(),
        )
        .await
        .expect_err("gap must be rejected");

    assert!(matches!(err, ScriptError::BatchRejected { .. }));
    assert_eq!(repo.commit_count(), 0);
}

#[tokio::test]
async fn test_script_info_update_is_committed() {
    let fixture = ScriptFixture::with_cues(&[0]);
    let (service, repo) = service_for(&fixture);
    let actor = user();

    service
        .process_batch(
            fixture.script_id(),
            vec![op(
                "op-1",
                OperationKind::UpdateScriptInfo {
                    changes: json!({
                        "script_name": "Hamlet - Final",
                        "script_status": "final",
                        "start_time": "2026-03-01T19:30:00Z",
                        "script_notes": null
                    })
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
                },
            )],
            &actor,
        )
        .await
        .expect("batch should commit");

    let script = repo.script(fixture.script_id()).expect("script");
    assert_eq!(script.script_name, "Hamlet - Final");
    assert_eq!(script.script_status, ScriptStatus::Final);
    assert!(script.start_time.is_some());
    assert_eq!(script.updated_by, Some(actor.user_id));
    assert!(repo.last_commit().is_some_and(|c| c.script.is_some()));
}

#[tokio::test]
async fn test_commit_failure_reports_commit_failed() {
    let fixture = ScriptFixture::with_cues(&[0, 100]);
    let (service, repo) = service_for(&fixture);
    repo.fail_commits();
    let before = repo.elements(fixture.script_id());

    let err = service
        .process_batch(
            fixture.script_id(),
            vec![op(
                "op-1",
                OperationKind::Reorder {
                    element_id: fixture.id(0).to_string(),
                    old_sequence: None,
                    new_sequence: 2,
                },
            )],
            &user(),
        )
        .await
        .expect_err("commit must fail");

    assert!(matches!(err, ScriptError::CommitFailed { .. }));
    assert_eq!(repo.elements(fixture.script_id()), before);
}

#[tokio::test]
async fn test_unknown_script_is_not_found() {
    let fixture = ScriptFixture::with_cues(&[0]);
    let (service, _repo) = service_for(&fixture);

    let err = service
        .process_batch(Uuid::new_v4(), vec![], &user())
        .await
        .expect_err("unknown script");
    assert!(matches!(err, ScriptError::NotFound { .. }));
}

#[tokio::test]
async fn test_empty_batch_succeeds() {
    let fixture = ScriptFixture::with_cues(&[0]);
    let (service, repo) = service_for(&fixture);

    let result = service
        .process_batch(fixture.script_id(), vec![], &user())
        .await
        .expect("empty batch");
    assert!(result.success);
    assert_eq!(result.operations_processed, 0);
    assert_eq!(repo.commit_count(), 0);
}

#[tokio::test]
async fn test_oversized_batch_is_rejected_up_front() {
    let fixture = ScriptFixture::with_cues(&[0]);
    let repo = Arc::new(MockScriptRepository::with_fixture(&fixture));
    let config = script_service::config::Config {
        max_operations_per_batch: 1,
        ..Default::default()
    };
    let service = Service::new(repo, Arc::new(NoOpEventPublisher), config);

    let operations = (0..2)
        .map(|i| op(&format!("op-{}", i), OperationKind::DisableAutoSort))
        .collect();
    let err = service
        .process_batch(fixture.script_id(), operations, &user())
        .await
        .expect_err("too many operations");
    assert!(matches!(err, ScriptError::Validation { .. }));
}

#[tokio::test]
async fn test_committed_batch_publishes_event() {
    let fixture = ScriptFixture::with_cues(&[0, 100]);
    let repo = Arc::new(MockScriptRepository::with_fixture(&fixture));
    let publisher = Arc::new(RecordingEventPublisher::new());
    let service = build_service(repo.clone(), publisher.clone());
    let actor = user();

    service
        .process_batch(
            fixture.script_id(),
            vec![op(
                "op-1",
                OperationKind::DeleteElement {
                    element_id: fixture.id(0).to_string(),
                },
            )],
            &actor,
        )
        .await
        .expect("delete should commit");

    let events = publisher.events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        ScriptEvent::ElementsChanged(e) => {
            assert_eq!(e.script_id, fixture.script_id());
            assert_eq!(e.deleted, vec![fixture.id(0)]);
            assert_eq!(e.updated, vec![fixture.id(1)]);
            assert_eq!(e.user_id, actor.user_id);
        }
    }
}

#[tokio::test]
async fn test_publish_failure_does_not_fail_batch() {
    let fixture = ScriptFixture::with_cues(&[0, 100]);
    let repo = Arc::new(MockScriptRepository::with_fixture(&fixture));
    let service = build_service(repo.clone(), Arc::new(FailingEventPublisher));

    let result = service
        .process_batch(
            fixture.script_id(),
            vec![op(
                "op-1",
                OperationKind::UpdateTimeOffset {
                    element_id: fixture.id(1).to_string(),
                    new_offset_ms: 250,
                },
            )],
            &user(),
        )
        .await;

    assert!(result.is_ok());
    assert_eq!(repo.commit_count(), 1);
}
