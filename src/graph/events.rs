use crate::model::{Edge, Node, NodeData};

/// A structural or data change that has already been applied to the graph.
///
/// Reducers receive every event in emission order and may apply follow-up
/// changes; they never see an event before the change it describes.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    NodeAdded {
        node_id: String,
    },
    /// Carries the data as it was before the merge so reducers can diff.
    NodeUpdated {
        node_id: String,
        before: NodeData,
    },
    /// The removed node plus every edge that went with it.
    NodeRemoved {
        node: Node,
        removed_edges: Vec<Edge>,
    },
    EdgeAdded {
        edge: Edge,
    },
    EdgeRemoved {
        edge: Edge,
    },
    EdgeRetargeted {
        edge: Edge,
        previous_target: String,
    },
}

impl GraphEvent {
    /// Whether the event changes the node set, which is what start-node
    /// normalisation cares about.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            GraphEvent::NodeAdded { .. } | GraphEvent::NodeRemoved { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            GraphEvent::NodeAdded { .. } => "NodeAdded",
            GraphEvent::NodeUpdated { .. } => "NodeUpdated",
            GraphEvent::NodeRemoved { .. } => "NodeRemoved",
            GraphEvent::EdgeAdded { .. } => "EdgeAdded",
            GraphEvent::EdgeRemoved { .. } => "EdgeRemoved",
            GraphEvent::EdgeRetargeted { .. } => "EdgeRetargeted",
        }
    }
}
