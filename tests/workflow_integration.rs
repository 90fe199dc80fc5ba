//! Integration tests for the transfer workflow over a shared store.
//!
//! These exercise the public API the way a front end would: one store,
//! one workflow, observers and alert sinks attached.

use std::sync::Arc;
use std::thread;

use cadastre::core::code::code_for_node;
use cadastre::core::config::Config;
use cadastre::core::error::TransferError;
use cadastre::core::request::RequestStatus;
use cadastre::core::selection::{CascadeForm, DraftPolicy, TransferDraft};
use cadastre::core::types::{NodeId, NodeKind};
use cadastre::core::verify::fast_verify;
use cadastre::engine::{AlertKind, Engine, HierarchyStore, RecordingSink, TransferWorkflow};

fn id(s: &str) -> NodeId {
    NodeId::new(s).unwrap()
}

fn setup() -> (Arc<HierarchyStore>, TransferWorkflow, RecordingSink) {
    let store = Arc::new(HierarchyStore::seeded());
    let sink = RecordingSink::new();
    store.subscribe(Arc::new(sink.clone()));
    let workflow = TransferWorkflow::new(Arc::clone(&store)).with_alerts(Arc::new(sink.clone()));
    (store, workflow, sink)
}

#[test]
fn rebalance_state_between_countries() {
    let (store, workflow, sink) = setup();
    let state_food = store.find_node(&id("s-c1-1")).unwrap().resources.food;
    let c2_food = store.find_node(&id("c2")).unwrap().resources.food;
    let subtree_before = store.snapshot().tree.descendants(&id("s-c1-1"));
    assert!(store
        .find_node(&id("s-c1-1"))
        .unwrap()
        .children()
        .contains(&id("ci-s-c1-1-1")));

    let request = workflow
        .submit_request(&id("s-c1-1"), &id("c2"), "Admin", "rebalance", true)
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(workflow.list_pending().len(), 1);

    workflow.approve(&request.id).unwrap();

    assert_eq!(store.find_parent(&id("s-c1-1")).unwrap().id, id("c2"));
    assert_eq!(
        store.find_node(&id("c2")).unwrap().resources.food,
        c2_food + state_food
    );
    assert!(!store
        .find_node(&id("c1"))
        .unwrap()
        .children()
        .contains(&id("s-c1-1")));
    assert_eq!(
        store.snapshot().tree.descendants(&id("s-c1-1")),
        subtree_before
    );
    // Descendant quantities are not redistributed.
    assert_eq!(store.find_node(&id("ci-s-c1-1-1")).unwrap().resources.food, 50);

    assert_eq!(store.version(), 1);
    assert_eq!(sink.versions(), vec![1]);
    assert!(fast_verify(&store.snapshot().tree).ok);
}

#[test]
fn empty_reason_queues_nothing() {
    let (_, workflow, sink) = setup();
    let err = workflow
        .submit_request(&id("s-c1-1"), &id("c2"), "Admin", "", true)
        .unwrap_err();
    assert!(matches!(err, TransferError::ValidationError(_)));
    assert!(workflow.list_pending().is_empty());
    assert_eq!(sink.alerts_of(AlertKind::Error).len(), 1);
}

#[test]
fn double_approve_moves_once() {
    let (store, workflow, _) = setup();
    let request = workflow
        .submit_request(&id("ci-s-c2-1-1"), &id("s-c3-1"), "Admin", "x", true)
        .unwrap();

    workflow.approve(&request.id).unwrap();
    let after_first = store.snapshot().fingerprint();
    let err = workflow.approve(&request.id).unwrap_err();

    assert!(matches!(err, TransferError::AlreadyResolved { .. }));
    assert_eq!(store.snapshot().fingerprint(), after_first);
    assert_eq!(store.version(), 1);
}

#[test]
fn concurrent_approvals_apply_exactly_once() {
    let (store, workflow, sink) = setup();
    let workflow = Arc::new(workflow);
    let request = workflow
        .submit_request(&id("s-c1-2"), &id("c3"), "Admin", "race", true)
        .unwrap();
    let c3_food = store.find_node(&id("c3")).unwrap().resources.food;
    let moved_food = store.find_node(&id("s-c1-2")).unwrap().resources.food;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let workflow = Arc::clone(&workflow);
            let request_id = request.id.clone();
            thread::spawn(move || workflow.approve(&request_id).is_ok())
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(store.version(), 1);
    assert_eq!(
        store.find_node(&id("c3")).unwrap().resources.food,
        c3_food + moved_food
    );
    assert_eq!(sink.versions(), vec![1]);
}

#[test]
fn concurrent_moves_keep_tree_consistent() {
    let store = Arc::new(HierarchyStore::seeded());
    let moves = [
        ("s-c1-1", "c2"),
        ("s-c1-2", "c3"),
        ("s-c2-1", "c1"),
        ("s-c3-1", "c1"),
        ("ci-s-c2-2-1", "s-c3-2"),
        ("b-d-ci-s-c3-3-1-1-1", "d-ci-s-c1-5-3-2"),
    ];

    let handles: Vec<_> = moves
        .iter()
        .map(|(source, target)| {
            let store = Arc::clone(&store);
            let (source, target) = (id(source), id(target));
            thread::spawn(move || store.move_node(&source, &target, false))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(store.version(), moves.len() as u64);
    let snapshot = store.snapshot();
    assert!(fast_verify(&snapshot.tree).ok);
    for (source, target) in moves {
        assert_eq!(snapshot.tree.find_parent(&id(source)).unwrap().id, id(target));
    }
}

#[test]
fn structural_failure_keeps_request_pending_and_can_be_rejected() {
    let (store, workflow, _) = setup();
    // A state cannot sit under a city.
    let request = workflow
        .submit_request(&id("s-c1-1"), &id("ci-s-c2-1-1"), "Admin", "x", false)
        .unwrap();

    let err = workflow.approve(&request.id).unwrap_err();
    assert!(matches!(err, TransferError::LevelMismatch { .. }));
    assert_eq!(workflow.list_pending().len(), 1);
    assert_eq!(store.version(), 0);

    workflow.reject(&request.id).unwrap();
    assert!(workflow.list_pending().is_empty());
    assert_eq!(workflow.list_by_status(RequestStatus::Rejected).len(), 1);
}

#[test]
fn city_approved_directly_under_country() {
    let (store, workflow, sink) = setup();
    let c2_food = store.find_node(&id("c2")).unwrap().resources.food;
    let request = workflow
        .submit_request(&id("ci-s-c1-1-1"), &id("c2"), "Admin", "annex", true)
        .unwrap();

    workflow.approve(&request.id).unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.tree.find_parent(&id("ci-s-c1-1-1")).unwrap().id, id("c2"));
    assert_eq!(snapshot.tree.find_node(&id("c2")).unwrap().resources.food, c2_food + 50);
    assert!(fast_verify(&snapshot.tree).ok);
    assert_eq!(
        code_for_node(&snapshot.tree, &id("b-d-ci-s-c1-1-1-2-2")).unwrap().as_str(),
        "2000010002"
    );
    assert_eq!(sink.versions(), vec![1]);
}

#[test]
fn inconsistent_draft_path_queues_nothing() {
    let (store, workflow, sink) = setup();
    let snapshot = store.snapshot();
    let mut source = snapshot.tree.path_of(&id("c1")).unwrap();
    // s-c2-1 belongs to c2, not the selected c1.
    source.set_level(NodeKind::State, Some(id("s-c2-1")));
    let draft = TransferDraft {
        source,
        target: snapshot.tree.path_of(&id("c2")).unwrap(),
        reason: "rebalance".to_string(),
        transfer_resources: false,
        requested_by: String::new(),
    };

    let err = workflow.submit_draft(&draft, DraftPolicy::default()).unwrap_err();

    assert!(matches!(err, TransferError::ValidationError(_)));
    assert!(workflow.list_all().is_empty());
    assert_eq!(sink.alerts_of(AlertKind::Error).len(), 1);
}

#[test]
fn cycle_rejected_at_approval() {
    let (store, workflow, _) = setup();
    let request = workflow
        .submit_request(&id("ci-s-c1-1-1"), &id("d-ci-s-c1-1-1-1"), "Admin", "x", false)
        .unwrap();
    let before = store.snapshot().fingerprint();

    let err = workflow.approve(&request.id).unwrap_err();

    assert!(matches!(err, TransferError::InvalidMove(_)));
    assert_eq!(store.snapshot().fingerprint(), before);
}

#[test]
fn cascade_form_draft_to_approval() {
    let (store, workflow, _) = setup();
    let snapshot = store.snapshot();

    let mut source = CascadeForm::new(&snapshot.tree);
    source.select(NodeKind::Country, &id("c1")).unwrap();
    source.select(NodeKind::State, &id("s-c1-3")).unwrap();
    source.select(NodeKind::City, &id("ci-s-c1-3-2")).unwrap();
    let mut target = CascadeForm::new(&snapshot.tree);
    target.select(NodeKind::Country, &id("c3")).unwrap();
    target.select(NodeKind::State, &id("s-c3-5")).unwrap();

    // Changing the state clears the stale city.
    source.select(NodeKind::State, &id("s-c1-2")).unwrap();
    assert_eq!(source.effective(), Some(&id("s-c1-2")));
    source.select(NodeKind::City, &id("ci-s-c1-2-2")).unwrap();

    let draft = TransferDraft {
        source: source.into_selection(),
        target: target.into_selection(),
        reason: "consolidate".to_string(),
        transfer_resources: false,
        requested_by: String::new(),
    };
    let request = workflow.submit_draft(&draft, DraftPolicy::default()).unwrap();
    let codes = request.codes.clone().unwrap();
    assert_eq!(codes.source.as_str(), "1020020000");
    assert_eq!(codes.target.as_str(), "3050000000");
    assert_eq!(codes.combined.as_str(), "3050000000");
    assert_eq!(request.requested_by, "Admin");

    workflow.approve(&request.id).unwrap();

    let moved = store.snapshot();
    assert_eq!(moved.tree.find_parent(&id("ci-s-c1-2-2")).unwrap().id, id("s-c3-5"));
    // Appended last among the target's cities.
    assert_eq!(
        code_for_node(&moved.tree, &id("ci-s-c1-2-2")).unwrap().as_str(),
        "3050040000"
    );
}

#[test]
fn engine_wires_config_and_alerts() {
    let sink = Arc::new(RecordingSink::new());
    let engine = Engine::seeded(&Config::default(), sink.clone());

    let request = engine
        .workflow
        .submit_request(&id("s-c2-2"), &id("c1"), "ops", "audit", false)
        .unwrap();
    engine.workflow.reject(&request.id).unwrap();

    let titles: Vec<_> = sink.alerts().into_iter().map(|a| a.title).collect();
    assert_eq!(titles, vec!["Request Submitted", "Transfer Rejected"]);
    assert!(sink.alerts().iter().all(|a| a.duration_ms == 5000));
    assert!(engine.verify().ok);
}
