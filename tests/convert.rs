//! Tests for importing, planning and persisting flowcharts against the in-memory backend.
mod common;
use blockflow::error::ExportError;
use blockflow::remote::ApiCall;
use blockflow::prelude::*;
use blockflow::convert::ImportLayout;
use common::*;
use tokio_test::block_on;

fn pairs(flowchart: &Flowchart) -> Vec<(String, BlockRequest)> {
    flowchart
        .blocks
        .iter()
        .map(|b| (b.id.clone(), b.block.clone()))
        .collect()
}

fn import(flowchart: &Flowchart) -> std::result::Result<GraphState, ImportError> {
    import_flowchart(flowchart, &TimingPolicy::default(), &ImportLayout::default())
}

#[test]
fn test_import_rebuilds_edges_from_references() {
    let state = import(&branching_flowchart()).expect("Failed to import");

    assert_eq!(state.len(), 3);
    assert_eq!(
        edge_triples(&state),
        vec![
            ("A".to_string(), Handle::Plain, "B".to_string()),
            ("B".to_string(), Handle::No, "A".to_string()),
            ("B".to_string(), Handle::Yes, "C".to_string()),
        ]
    );
    let b = &state.node("B").unwrap().data;
    assert!(b.has_condition);
    assert_eq!(b.condition_question, "Deseja continuar?");
    assert_eq!(b.yes_destination.as_deref(), Some("C"));
    assert_eq!(b.no_destination.as_deref(), Some("A"));
    assert_eq!(state.start_node().map(|n| n.id.as_str()), Some("A"));
}

#[test]
fn test_import_lays_blocks_out_vertically() {
    let state = import(&branching_flowchart()).unwrap();
    let ys: Vec<f64> = state.nodes().iter().map(|n| n.position.y).collect();
    assert_eq!(ys, vec![100.0, 300.0, 500.0]);
    assert!(state.nodes().iter().all(|n| n.position.x == 250.0));
}

#[test]
fn test_import_skips_plain_edge_from_branching_previous() {
    let mut flowchart = branching_flowchart();
    flowchart.blocks.push(remote_block("D", Some("B"), None, None));

    let state = import(&flowchart).unwrap();
    assert!(state.incoming("D").next().is_none());
    assert!(state.outgoing_edge("B", Handle::Plain).is_none());
}

#[test]
fn test_import_settles_timing() {
    let mut flowchart = branching_flowchart();
    flowchart.blocks[0].block.interval = 45;
    flowchart.blocks[0].block.max_wait = 120;
    flowchart.blocks[2].block.interval = 10;

    let state = import(&flowchart).unwrap();
    let a = &state.node("A").unwrap().data;
    assert_eq!(a.timing, Timing::new(45, 120));
    assert!(a.manual_timing_edit);

    let b = &state.node("B").unwrap().data;
    assert_eq!(b.timing, Timing::new(10, 3600));
    assert!(!b.manual_timing_edit);

    // Stored values equal to the inferred ones are not a manual edit.
    let c = &state.node("C").unwrap().data;
    assert_eq!(c.timing, Timing::new(10, 0));
    assert!(!c.manual_timing_edit);
}

#[test]
fn test_import_rejects_unknown_reference() {
    let mut flowchart = branching_flowchart();
    flowchart.blocks[2].block.previous_message_block_id = Some("ghost".to_string());

    let result = import(&flowchart);
    assert_eq!(
        result,
        Err(ImportError::UnknownBlock {
            block_id: "C".to_string(),
            missing_id: "ghost".to_string(),
            relation: "previous block",
        })
    );
}

#[test]
fn test_import_rejects_duplicate_ids() {
    let mut flowchart = branching_flowchart();
    flowchart.blocks.push(remote_block("A", None, None, None));
    assert_eq!(
        import(&flowchart),
        Err(ImportError::DuplicateBlock("A".to_string()))
    );
}

#[test]
fn test_import_without_first_message_promotes_first_block() {
    let mut flowchart = branching_flowchart();
    flowchart.blocks[0].block.is_first_message = false;
    let state = import(&flowchart).unwrap();
    assert_eq!(state.start_node().map(|n| n.id.as_str()), Some("A"));
}

#[test]
fn test_round_trip_preserves_relations() {
    let original = branching_flowchart();
    let api = InMemoryBlockApi::new()
        .with_blocks("source", "Branching", original.blocks.clone())
        .with_flowchart("copy", "Branching copy");

    let loaded = block_on(load_flowchart(
        &api,
        "source",
        &TimingPolicy::default(),
        &ImportLayout::default(),
    ))
    .expect("Failed to load");
    assert_eq!(loaded.block_ids, vec!["A", "B", "C"]);

    let report = block_on(save_flowchart(
        &api,
        "copy",
        "Branching copy",
        &loaded.state,
        &SaveMode::Create,
    ))
    .expect("Failed to save");
    assert_eq!(report.created.len(), 3);
    assert_eq!(report.deleted, 0);
    // B's yes branch points at C, which is created after B.
    assert_eq!(report.patched, 1);

    let saved = block_on(api.get_flowchart("copy")).unwrap();
    assert_eq!(relations(&pairs(&saved)), relations(&pairs(&original)));

    let first: Vec<_> = saved
        .blocks
        .iter()
        .filter(|b| b.block.is_first_message)
        .map(|b| b.block.title.as_str())
        .collect();
    assert_eq!(first, vec!["Block A"]);
    let last: Vec<_> = saved
        .blocks
        .iter()
        .filter(|b| b.block.is_last_message)
        .map(|b| b.block.title.as_str())
        .collect();
    assert_eq!(last, vec!["Block C"]);
}

#[test]
fn test_forward_references_are_patched_after_creation() {
    let mut graph = graph_with(&["S", "M"]);
    graph.connect("S", Handle::Plain, "M").unwrap();
    graph
        .update_node_data(
            "M",
            NodePatch::default()
                .has_condition(true)
                .condition_question("Deseja continuar?")
                .yes_destination(Some("S".to_string())),
        )
        .unwrap();

    let api = InMemoryBlockApi::new().with_flowchart("flow", "Loop");
    let report = block_on(save_flowchart(
        &api,
        "flow",
        "Loop",
        graph.state(),
        &SaveMode::Create,
    ))
    .unwrap();

    let m = report.id_map["M"].clone();
    let s = report.id_map["S"].clone();
    assert_eq!(report.created, vec![m.clone(), s.clone()]);
    assert_eq!(
        api.calls(),
        vec![
            ApiCall::Create {
                flowchart_id: "flow".to_string(),
                block_id: m.clone()
            },
            ApiCall::Create {
                flowchart_id: "flow".to_string(),
                block_id: s.clone()
            },
            ApiCall::Update { block_id: m.clone() },
        ]
    );

    let stored = api.block(&m).unwrap();
    assert_eq!(stored.previous_message_block_id.as_deref(), Some(s.as_str()));
    assert_eq!(stored.positive_block_id.as_deref(), Some(s.as_str()));
    assert_eq!(stored.negative_block_id, None);
    assert_eq!(stored.condition.as_deref(), Some("Deseja continuar?"));
}

#[test]
fn test_save_aborts_on_first_failure_and_reports_orphans() {
    let graph = linear_chain(3);
    let api = InMemoryBlockApi::new()
        .with_flowchart("flow", "Chain")
        .fail_creates_after(1);

    let error = block_on(save_flowchart(
        &api,
        "flow",
        "Chain",
        graph.state(),
        &SaveMode::Create,
    ))
    .unwrap_err();

    match error {
        PersistError::Remote {
            operation, created, ..
        } => {
            assert_eq!(operation, "create_block");
            assert_eq!(created, vec!["blk-1".to_string()]);
        }
        other => panic!("Expected a remote failure, got {:?}", other),
    }
    // Nothing is rolled back.
    assert_eq!(api.block_count(), 1);
}

#[test]
fn test_save_rejects_dangling_destination() {
    // A state whose destination names a node that is not in the graph can only
    // come from outside the store, e.g. a hand-edited snapshot.
    let mut state = import(&branching_flowchart()).unwrap();
    let json = serde_json::to_string(&state)
        .unwrap()
        .replace("\"yesDestination\":\"C\"", "\"yesDestination\":\"Z\"");
    state = serde_json::from_str(&json).unwrap();

    let api = InMemoryBlockApi::new().with_flowchart("flow", "Broken");
    let error =
        block_on(save_flowchart(&api, "flow", "Broken", &state, &SaveMode::Create)).unwrap_err();
    assert_eq!(
        error,
        PersistError::Plan(ExportError::UnresolvedReference {
            node_id: "B".to_string(),
            handle: Handle::Yes,
            missing_id: "Z".to_string(),
        })
    );
    assert!(api.calls().is_empty());
}

#[test]
fn test_loading_unknown_flowchart_fails() {
    let api = InMemoryBlockApi::new();
    let result = block_on(load_flowchart(
        &api,
        "missing",
        &TimingPolicy::default(),
        &ImportLayout::default(),
    ));
    assert!(matches!(
        result,
        Err(PersistError::Remote {
            operation: "get_flowchart",
            ..
        })
    ));
}

#[test]
fn test_editor_replaces_previous_blocks_on_save() {
    let api = InMemoryBlockApi::new().with_blocks("flow", "Branching", branching_flowchart().blocks);
    let mut editor =
        block_on(FlowEditor::load(&api, "flow", EditorConfig::default())).expect("Failed to load");
    assert_eq!(editor.name(), "Branching");
    assert_eq!(
        editor.persisted_block_ids(),
        Some(&["A".to_string(), "B".to_string(), "C".to_string()][..])
    );

    editor
        .on_update_node_data("C", NodePatch::default().title("Goodbye"))
        .unwrap();
    let report = block_on(editor.save(&api, "flow")).expect("Failed to save");

    assert_eq!(report.deleted, 3);
    assert_eq!(api.block_count(), 3);
    assert_eq!(api.sequence("flow"), Some(report.created.clone()));
    assert_eq!(editor.persisted_block_ids(), Some(report.created.as_slice()));

    let calls = api.calls();
    assert!(matches!(&calls[0], ApiCall::Get { .. }));
    assert!(matches!(&calls[1], ApiCall::Delete { block_id } if block_id == "A"));
    assert!(matches!(calls.last(), Some(ApiCall::SetSequence { .. })));

    let saved = block_on(api.get_flowchart("flow")).unwrap();
    let titles: Vec<_> = saved.blocks.iter().map(|b| b.block.title.as_str()).collect();
    assert_eq!(titles, vec!["Block A", "Block B", "Goodbye"]);

    // A second save replaces the blocks of the first one.
    let second = block_on(editor.save(&api, "flow")).unwrap();
    assert_eq!(second.deleted, 3);
    assert!(second.created.iter().all(|id| !report.created.contains(id)));
    assert_eq!(api.block_count(), 3);
}

#[test]
fn test_first_editor_save_only_creates() {
    let api = InMemoryBlockApi::new().with_flowchart("flow", "New");
    let mut editor = FlowEditor::new("New", EditorConfig::default());
    let start = editor.graph().nodes()[0].id.clone();
    let next = editor.add_block(Position::new(250.0, 300.0));
    editor.on_connect(&start, Handle::Plain, &next).unwrap();

    let report = block_on(editor.save(&api, "flow")).unwrap();
    assert_eq!(report.created.len(), 2);
    assert!(api.sequence("flow").is_none());
    assert!(api
        .calls()
        .iter()
        .all(|c| matches!(c, ApiCall::Create { .. })));
}

#[test]
fn test_replace_skips_previous_blocks_already_gone() {
    let graph = linear_chain(2);
    let api = InMemoryBlockApi::new().with_flowchart("flow", "Chain");
    let mode = SaveMode::Replace {
        previous_block_ids: vec!["gone".to_string()],
    };

    let report = block_on(save_flowchart(&api, "flow", "Chain", graph.state(), &mode))
        .expect("Failed to save");
    assert_eq!(report.deleted, 0);
    assert_eq!(report.created.len(), 2);
    assert_eq!(api.sequence("flow"), Some(report.created.clone()));
}

#[test]
fn test_editor_save_recovers_after_partial_failure() {
    let api = InMemoryBlockApi::new()
        .with_blocks("flow", "Branching", branching_flowchart().blocks)
        .fail_creates_after(1);
    let mut editor =
        block_on(FlowEditor::load(&api, "flow", EditorConfig::default())).expect("Failed to load");

    let error = block_on(editor.save(&api, "flow")).unwrap_err();
    assert!(matches!(
        &error,
        PersistError::Remote { operation: "create_block", created, .. } if created == &vec!["blk-1".to_string()]
    ));
    // The deletes went through, so the orphan is what the next save replaces.
    assert_eq!(api.block_count(), 1);
    assert_eq!(editor.persisted_block_ids(), Some(&["blk-1".to_string()][..]));

    api.clear_failures();
    let report = block_on(editor.save(&api, "flow")).expect("Retry should succeed");
    assert_eq!(report.deleted, 1);
    assert_eq!(report.created.len(), 3);
    assert_eq!(api.block_count(), 3);
    assert_eq!(api.sequence("flow"), Some(report.created.clone()));

    let saved = block_on(api.get_flowchart("flow")).unwrap();
    assert_eq!(
        relations(&pairs(&saved)),
        relations(&pairs(&branching_flowchart()))
    );
}
