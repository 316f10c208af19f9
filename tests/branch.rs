//! Tests for keeping branch edges in sync with the condition flag.
mod common;
use blockflow::prelude::*;
use blockflow::validation::node_issues;
use common::*;

fn toggle(graph: &mut FlowGraph, id: &str, on: bool) {
    graph
        .update_node_data(id, NodePatch::default().has_condition(on))
        .expect("Failed to toggle condition");
}

#[test]
fn test_enabling_condition_turns_plain_edge_into_yes() {
    let mut graph = graph_with(&["a", "b"]);
    let plain = graph.connect("a", Handle::Plain, "b").unwrap();

    toggle(&mut graph, "a", true);

    let edge = graph.edge(&plain.id).expect("edge id should survive the toggle");
    assert_eq!(edge.source_handle, Handle::Yes);
    assert_eq!(edge.target, "b");
    assert_eq!(graph.edges().len(), 1);
    assert_eq!(graph.node("a").unwrap().data.yes_destination.as_deref(), Some("b"));
    assert_eq!(graph.node("a").unwrap().data.no_destination, None);
}

#[test]
fn test_disabling_condition_turns_yes_edge_back_into_plain() {
    let mut graph = graph_with(&["a", "b"]);
    let plain = graph.connect("a", Handle::Plain, "b").unwrap();
    toggle(&mut graph, "a", true);
    toggle(&mut graph, "a", false);

    let edge = graph.edge(&plain.id).unwrap();
    assert_eq!(edge.source_handle, Handle::Plain);
    let data = &graph.node("a").unwrap().data;
    assert_eq!(data.yes_destination, None);
    assert_eq!(data.no_destination, None);
}

#[test]
fn test_disabling_condition_leaves_no_edge_for_diagnostics() {
    let mut graph = graph_with(&["q", "yes", "no"]);
    toggle(&mut graph, "q", true);
    graph.connect("q", Handle::Yes, "yes").unwrap();
    let no_edge = graph.connect("q", Handle::No, "no").unwrap();

    toggle(&mut graph, "q", false);

    assert_eq!(
        edge_triples(graph.state()),
        vec![
            ("q".to_string(), Handle::No, "no".to_string()),
            ("q".to_string(), Handle::Plain, "yes".to_string()),
        ]
    );
    assert_eq!(graph.node("q").unwrap().data.no_destination, None);

    let issues = node_issues(graph.state(), graph.node("q").unwrap());
    assert!(issues.contains(&Issue::NoBranchWithoutCondition {
        edge_id: no_edge.id.clone()
    }));
}

#[test]
fn test_enabling_condition_with_existing_yes_drops_plain_edge() {
    let mut graph = graph_with(&["q", "b", "c"]);
    graph.connect("q", Handle::Plain, "b").unwrap();
    graph.connect("q", Handle::Yes, "c").unwrap();

    toggle(&mut graph, "q", true);

    assert_eq!(
        edge_triples(graph.state()),
        vec![("q".to_string(), Handle::Yes, "c".to_string())]
    );
    assert_eq!(graph.node("q").unwrap().data.yes_destination.as_deref(), Some("c"));
}

#[test]
fn test_enabling_condition_without_edges_only_sets_flag() {
    let mut graph = graph_with(&["q"]);
    toggle(&mut graph, "q", true);

    let node = graph.node("q").unwrap();
    assert!(node.data.has_condition);
    assert!(graph.edges().is_empty());
    assert_eq!(node.data.yes_destination, None);
}

#[test]
fn test_repeated_patch_without_toggle_keeps_edges() {
    let mut graph = graph_with(&["q", "b"]);
    toggle(&mut graph, "q", true);
    let yes = graph.connect("q", Handle::Yes, "b").unwrap();

    graph
        .update_node_data(
            "q",
            NodePatch::default()
                .has_condition(true)
                .condition_question("Deseja continuar?"),
        )
        .unwrap();

    assert_eq!(graph.edge(&yes.id).unwrap().source_handle, Handle::Yes);
    assert_eq!(graph.node("q").unwrap().data.condition_question, "Deseja continuar?");
}

#[test]
fn test_node_kind_follows_flags() {
    let mut graph = graph_with(&["s", "q"]);
    assert_eq!(
        NodeKind::of(&graph.node("s").unwrap().data),
        NodeKind::Start { branching: false }
    );
    assert_eq!(NodeKind::of(&graph.node("q").unwrap().data), NodeKind::Plain);

    toggle(&mut graph, "q", true);
    toggle(&mut graph, "s", true);
    assert_eq!(NodeKind::of(&graph.node("q").unwrap().data), NodeKind::Conditional);
    assert!(NodeKind::of(&graph.node("s").unwrap().data).branches());
}

#[test]
fn test_toggling_condition_back_on_restores_both_branches() {
    let mut graph = graph_with(&["q", "y", "n"]);
    toggle(&mut graph, "q", true);
    graph.connect("q", Handle::Yes, "y").unwrap();
    graph.connect("q", Handle::No, "n").unwrap();

    toggle(&mut graph, "q", false);
    toggle(&mut graph, "q", true);

    let data = &graph.node("q").unwrap().data;
    assert_eq!(data.yes_destination.as_deref(), Some("y"));
    assert_eq!(data.no_destination.as_deref(), Some("n"));
    assert_eq!(
        graph.state().outgoing_edge("q", Handle::No).map(|e| e.target.as_str()),
        Some("n")
    );

    let issues = node_issues(graph.state(), graph.node("q").unwrap());
    assert!(!issues.contains(&Issue::MissingNoDestination));

    let plan = plan_export(graph.state()).expect("Failed to plan export");
    let q = plan
        .blocks
        .iter()
        .find(|b| b.node_id == "q")
        .expect("q missing from plan");
    assert_eq!(q.positive.as_deref(), Some("y"));
    assert_eq!(q.negative.as_deref(), Some("n"));
}
