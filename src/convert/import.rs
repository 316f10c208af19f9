use crate::error::ImportError;
use crate::graph::{GraphState, normalize_start_node};
use crate::model::{Handle, Node, NodeData, Position, Timing};
use crate::remote::{Flowchart, RemoteBlock};
use crate::timing::TimingPolicy;
use ahash::AHashMap;
use itertools::Itertools;

/// Where imported blocks are placed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportLayout {
    pub origin: Position,
    pub vertical_spacing: f64,
}

impl Default for ImportLayout {
    fn default() -> Self {
        Self {
            origin: Position::new(250.0, 100.0),
            vertical_spacing: 200.0,
        }
    }
}

/// Builds the editor graph from the backend's flat block sequence.
///
/// Node ids are the remote block ids. Edges are rebuilt from the block
/// references: `positive` gives a `yes` edge and `negative` a `no` edge.
///
/// A `previous` reference gives a plain edge only when the referenced
/// predecessor has no condition. The check is made on the predecessor, not on
/// the block holding the reference: a branching block leaves through its `yes`
/// and `no` edges only, while a branching block may itself follow a plain one.
pub fn import_flowchart(
    flowchart: &Flowchart,
    policy: &TimingPolicy,
    layout: &ImportLayout,
) -> Result<GraphState, ImportError> {
    let mut by_id: AHashMap<&str, &RemoteBlock> = AHashMap::with_capacity(flowchart.blocks.len());
    for block in &flowchart.blocks {
        if by_id.insert(block.id.as_str(), block).is_some() {
            return Err(ImportError::DuplicateBlock(block.id.clone()));
        }
    }

    let mut state = GraphState::new();
    for (index, block) in flowchart.blocks.iter().enumerate() {
        let position = Position::new(
            layout.origin.x,
            layout.origin.y + index as f64 * layout.vertical_spacing,
        );
        state.insert_node(Node::new(&block.id, node_data(block)).with_position(position))?;
    }

    for block in &flowchart.blocks {
        if let Some(previous) = &block.block.previous_message_block_id {
            let parent = lookup(&by_id, &block.id, previous, "previous block")?;
            if !is_conditional(parent) {
                let (_, replaced) = state.insert_edge(previous, Handle::Plain, &block.id)?;
                if let Some(replaced) = replaced {
                    tracing::warn!(
                        block = %previous,
                        dropped = %replaced.target,
                        kept = %block.id,
                        "block is the previous of several blocks; keeping the last"
                    );
                }
            }
        }
        if let Some(positive) = &block.block.positive_block_id {
            lookup(&by_id, &block.id, positive, "positive branch")?;
            state.insert_edge(&block.id, Handle::Yes, positive)?;
        }
        if let Some(negative) = &block.block.negative_block_id {
            lookup(&by_id, &block.id, negative, "negative branch")?;
            state.insert_edge(&block.id, Handle::No, negative)?;
        }
    }

    normalize_start_node(&mut state);
    settle_timing(&mut state, policy);

    tracing::debug!(
        name = %flowchart.name,
        nodes = state.len(),
        edges = state.edges().len(),
        "flowchart imported"
    );
    Ok(state)
}

fn node_data(block: &RemoteBlock) -> NodeData {
    let remote = &block.block;
    NodeData {
        title: remote.title.clone(),
        message_purpose: remote.message_purpose.clone(),
        examples: remote.examples.clone(),
        data_collection: remote.data_collection.iter().unique().cloned().collect(),
        has_condition: is_conditional(block),
        condition_question: remote.condition.clone().unwrap_or_default(),
        yes_destination: None,
        no_destination: None,
        timing: Timing::new(remote.interval, remote.max_wait),
        is_start_node: remote.is_first_message,
        manual_timing_edit: false,
    }
}

fn is_conditional(block: &RemoteBlock) -> bool {
    let remote = &block.block;
    remote.condition.is_some()
        || remote.positive_block_id.is_some()
        || remote.negative_block_id.is_some()
}

fn lookup<'a>(
    by_id: &AHashMap<&str, &'a RemoteBlock>,
    block_id: &str,
    reference: &str,
    relation: &'static str,
) -> Result<&'a RemoteBlock, ImportError> {
    by_id
        .get(reference)
        .copied()
        .ok_or_else(|| ImportError::UnknownBlock {
            block_id: block_id.to_string(),
            missing_id: reference.to_string(),
            relation,
        })
}

/// Blocks without stored timing get the inferred one. Stored timing that differs
/// from inference was edited by hand and is kept.
fn settle_timing(state: &mut GraphState, policy: &TimingPolicy) {
    let outgoing: AHashMap<String, bool> = state
        .nodes()
        .iter()
        .map(|n| (n.id.clone(), state.has_outgoing(&n.id)))
        .collect();
    for node in state.nodes_mut() {
        let has_outgoing = outgoing.get(&node.id).copied().unwrap_or(false);
        let inferred = policy.compute(&node.data, has_outgoing);
        if node.data.timing == Timing::default() {
            node.data.timing = inferred;
        } else {
            node.data.manual_timing_edit = node.data.timing != inferred;
        }
    }
}
