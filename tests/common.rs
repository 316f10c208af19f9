//! Common test utilities for building flow graphs and block sequences.
use blockflow::prelude::*;

/// A complete, non-branching message block.
#[allow(dead_code)]
pub fn message(id: &str) -> Node {
    Node::new(
        id,
        NodeData {
            title: format!("Block {}", id),
            message_purpose: format!("Say something as {}", id),
            examples: vec![format!("Hello from {}", id)],
            ..NodeData::default()
        },
    )
}

/// A graph with one complete message block per id, in the given order.
#[allow(dead_code)]
pub fn graph_with(ids: &[&str]) -> FlowGraph {
    let mut graph = FlowGraph::new();
    for id in ids {
        graph.add_node(message(id)).expect("Failed to add node");
    }
    graph
}

/// `n0 -> n1 -> ... -> n{len-1}` with plain edges.
#[allow(dead_code)]
pub fn linear_chain(len: usize) -> FlowGraph {
    let ids: Vec<String> = (0..len).map(|i| format!("n{}", i)).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut graph = graph_with(&refs);
    for pair in refs.windows(2) {
        graph
            .connect(pair[0], Handle::Plain, pair[1])
            .expect("Failed to connect chain");
    }
    graph
}

/// Number of nodes flagged as start node.
#[allow(dead_code)]
pub fn start_count(graph: &FlowGraph) -> usize {
    graph
        .nodes()
        .iter()
        .filter(|n| n.data.is_start_node)
        .count()
}

/// Every edge as `(source, handle, target)`.
#[allow(dead_code)]
pub fn edge_triples(state: &GraphState) -> Vec<(String, Handle, String)> {
    let mut triples: Vec<_> = state
        .edges()
        .iter()
        .map(|e| (e.source.clone(), e.source_handle, e.target.clone()))
        .collect();
    triples.sort_by(|a, b| (&a.0, &a.2).cmp(&(&b.0, &b.2)));
    triples
}

/// A remote block with content and the given references.
#[allow(dead_code)]
pub fn remote_block(
    id: &str,
    previous: Option<&str>,
    positive: Option<&str>,
    negative: Option<&str>,
) -> RemoteBlock {
    let branching = positive.is_some() || negative.is_some();
    RemoteBlock {
        id: id.to_string(),
        block: BlockRequest {
            title: format!("Block {}", id),
            message_purpose: format!("Purpose of {}", id),
            examples: vec![format!("Example for {}", id)],
            condition: branching.then(|| "Deseja continuar?".to_string()),
            previous_message_block_id: previous.map(str::to_string),
            positive_block_id: positive.map(str::to_string),
            negative_block_id: negative.map(str::to_string),
            ..BlockRequest::default()
        },
    }
}

/// The three-block flow: `A -> B` plain, `B` branches yes to `C` and no back to `A`.
#[allow(dead_code)]
pub fn branching_flowchart() -> Flowchart {
    let mut a = remote_block("A", None, None, None);
    a.block.is_first_message = true;
    Flowchart {
        name: "Branching".to_string(),
        blocks: vec![
            a,
            remote_block("B", Some("A"), Some("C"), Some("A")),
            remote_block("C", None, None, None),
        ],
    }
}

/// The previous/positive/negative relations of a block sequence, expressed with
/// the titles of the referenced blocks so remote id renaming does not matter.
#[allow(dead_code)]
pub fn relations(blocks: &[(String, BlockRequest)]) -> Vec<(String, &'static str, String)> {
    let title_of = |id: &String| -> String {
        blocks
            .iter()
            .find(|(remote_id, _)| remote_id == id)
            .map(|(_, b)| b.title.clone())
            .unwrap_or_else(|| format!("<missing {}>", id))
    };

    let mut out = Vec::new();
    for (_, block) in blocks {
        for (relation, target) in [
            ("previous", &block.previous_message_block_id),
            ("positive", &block.positive_block_id),
            ("negative", &block.negative_block_id),
        ] {
            if let Some(target) = target {
                out.push((block.title.clone(), relation, title_of(target)));
            }
        }
    }
    out.sort();
    out
}

/// A fresh scratch directory for tests that write files.
#[allow(dead_code)]
pub fn test_output_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir()
        .join("blockflow-tests")
        .join(format!("{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).expect("Failed to create test directory");
    dir
}
