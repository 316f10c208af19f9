use crate::error::ExportError;
use crate::graph::GraphState;
use crate::model::{Handle, Node};
use crate::order::creation_order;
use crate::remote::BlockRequest;
use ahash::AHashMap;

/// The remote request for one node, with references still expressed as node ids.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockPlan {
    pub node_id: String,
    /// Request content with every reference left empty.
    pub content: BlockRequest,
    pub previous: Option<String>,
    pub positive: Option<String>,
    pub negative: Option<String>,
}

/// A reference that points at a node which is created later than its referrer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardReference {
    pub node_id: String,
    pub relation: &'static str,
    pub target: String,
}

impl BlockPlan {
    /// Builds the request, substituting remote ids from `ids`.
    ///
    /// The second element lists the referenced node ids that have no remote id
    /// yet; their fields are left empty in the request.
    pub fn resolve(&self, ids: &AHashMap<String, String>) -> (BlockRequest, Vec<String>) {
        let mut pending = Vec::new();
        let mut lookup = |reference: &Option<String>| -> Option<String> {
            let node_id = reference.as_ref()?;
            match ids.get(node_id) {
                Some(remote) => Some(remote.clone()),
                None => {
                    pending.push(node_id.clone());
                    None
                }
            }
        };

        let request = BlockRequest {
            previous_message_block_id: lookup(&self.previous),
            positive_block_id: lookup(&self.positive),
            negative_block_id: lookup(&self.negative),
            ..self.content.clone()
        };
        (request, pending)
    }

    fn references(&self) -> impl Iterator<Item = (&'static str, &String)> {
        [
            ("previous", self.previous.as_ref()),
            ("positive", self.positive.as_ref()),
            ("negative", self.negative.as_ref()),
        ]
        .into_iter()
        .filter_map(|(relation, target)| target.map(|t| (relation, t)))
    }
}

/// Everything needed to persist a graph, computed without touching the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    /// Blocks in creation order.
    pub blocks: Vec<BlockPlan>,
}

impl ExportPlan {
    pub fn order(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.node_id.as_str()).collect()
    }

    /// References that cannot be filled in at creation time and need an edit call
    /// once the target exists.
    pub fn forward_references(&self) -> Vec<ForwardReference> {
        let position: AHashMap<&str, usize> = self
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.node_id.as_str(), i))
            .collect();

        self.blocks
            .iter()
            .enumerate()
            .flat_map(|(index, block)| {
                let position = &position;
                block
                    .references()
                    .filter(move |(_, target)| position.get(target.as_str()).is_none_or(|p| *p >= index))
                    .map(move |(relation, target)| ForwardReference {
                        node_id: block.node_id.clone(),
                        relation,
                        target: target.clone(),
                    })
            })
            .collect()
    }
}

/// Plans the export of `state`: creation order plus one request per node.
pub fn plan_export(state: &GraphState) -> Result<ExportPlan, ExportError> {
    if state.is_empty() {
        return Err(ExportError::EmptyGraph);
    }

    let blocks = creation_order(state)
        .into_iter()
        .filter_map(|id| state.node(&id))
        .map(|node| plan_block(state, node))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ExportPlan { blocks })
}

fn plan_block(state: &GraphState, node: &Node) -> Result<BlockPlan, ExportError> {
    let data = &node.data;
    let has_plain_output = state.outgoing_edge(&node.id, Handle::Plain).is_some();

    let (positive, negative) = if data.has_condition {
        (
            checked_destination(state, node, Handle::Yes, &data.yes_destination)?,
            checked_destination(state, node, Handle::No, &data.no_destination)?,
        )
    } else {
        (None, None)
    };

    let content = BlockRequest {
        title: data.title.clone(),
        message_purpose: data.message_purpose.clone(),
        examples: data.examples.clone(),
        data_collection: data.data_collection.clone(),
        condition: data
            .has_condition
            .then(|| data.condition_question.clone()),
        previous_message_block_id: None,
        positive_block_id: None,
        negative_block_id: None,
        is_first_message: data.is_start_node,
        is_last_message: !data.has_condition && !has_plain_output,
        interval: data.timing.interval,
        max_wait: data.timing.max_wait,
    };

    Ok(BlockPlan {
        node_id: node.id.clone(),
        content,
        previous: state.plain_predecessor(&node.id).map(str::to_string),
        positive,
        negative,
    })
}

fn checked_destination(
    state: &GraphState,
    node: &Node,
    handle: Handle,
    destination: &Option<String>,
) -> Result<Option<String>, ExportError> {
    match destination {
        Some(target) if !state.contains_node(target) => Err(ExportError::UnresolvedReference {
            node_id: node.id.clone(),
            handle,
            missing_id: target.clone(),
        }),
        other => Ok(other.clone()),
    }
}
