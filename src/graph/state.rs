use crate::error::GraphError;
use crate::model::{Edge, Handle, Node};
use serde::{Deserialize, Serialize};

/// The canonical node and edge sets of one flow.
///
/// Mutators here are primitives: they keep the edge/destination invariant intact
/// but trigger no side effects. Reducers and [`super::FlowGraph`] build on them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphState {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    next_node_seq: u64,
    next_edge_seq: u64,
}

impl GraphState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn outgoing<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == source)
    }

    pub fn incoming<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == target)
    }

    pub fn outgoing_edge(&self, source: &str, handle: Handle) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.source_handle == handle)
    }

    pub fn has_outgoing(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e.source == id)
    }

    /// The node whose plain output leads into `id`, i.e. its declared previous block.
    pub fn plain_predecessor(&self, id: &str) -> Option<&str> {
        self.edges
            .iter()
            .find(|e| e.target == id && e.source_handle == Handle::Plain)
            .map(|e| e.source.as_str())
    }

    pub fn start_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.data.is_start_node)
    }

    /// Returns a fresh `node-N` id that is not used by any node yet.
    pub fn next_node_id(&mut self) -> String {
        loop {
            self.next_node_seq += 1;
            let id = format!("node-{}", self.next_node_seq);
            if !self.contains_node(&id) {
                return id;
            }
        }
    }

    fn next_edge_id(&mut self) -> String {
        loop {
            self.next_edge_seq += 1;
            let id = format!("edge-{}", self.next_edge_seq);
            if self.edge(&id).is_none() {
                return id;
            }
        }
    }

    /// Inserts a node. Destination fields are cleared because a new node has no
    /// outgoing edges to back them.
    pub(crate) fn insert_node(&mut self, mut node: Node) -> Result<(), GraphError> {
        if self.contains_node(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        if node.data.yes_destination.is_some() || node.data.no_destination.is_some() {
            tracing::debug!(node = %node.id, "dropping destinations not backed by edges");
        }
        node.data.yes_destination = None;
        node.data.no_destination = None;
        self.nodes.push(node);
        Ok(())
    }

    /// Removes a node together with every edge that touches it.
    pub(crate) fn remove_node(&mut self, id: &str) -> Option<(Node, Vec<Edge>)> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(index);

        let (removed, kept): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.edges)
                .into_iter()
                .partition(|e| e.touches(id));
        self.edges = kept;

        for edge in removed.iter().filter(|e| e.source != id) {
            self.write_destination(&edge.source, edge.source_handle, None);
        }
        Some((node, removed))
    }

    /// Inserts a fresh edge, replacing whatever occupied the same `(source, handle)`.
    ///
    /// Returns the new edge and the one it replaced, if any.
    pub(crate) fn insert_edge(
        &mut self,
        source: &str,
        handle: Handle,
        target: &str,
    ) -> Result<(Edge, Option<Edge>), GraphError> {
        if !self.contains_node(source) {
            return Err(GraphError::NodeNotFound(source.to_string()));
        }
        if !self.contains_node(target) {
            return Err(GraphError::NodeNotFound(target.to_string()));
        }

        let occupied = self.outgoing_edge(source, handle).map(|e| e.id.clone());
        let replaced = occupied.and_then(|id| self.remove_edge(&id));

        let edge = Edge::new(self.next_edge_id(), source, handle, target);
        self.edges.push(edge.clone());
        self.write_destination(source, handle, Some(target.to_string()));
        Ok((edge, replaced))
    }

    pub(crate) fn remove_edge(&mut self, edge_id: &str) -> Option<Edge> {
        let index = self.edges.iter().position(|e| e.id == edge_id)?;
        let edge = self.edges.remove(index);
        self.write_destination(&edge.source, edge.source_handle, None);
        Some(edge)
    }

    /// Moves an edge to a new target, keeping its id and handle.
    pub(crate) fn set_edge_target(
        &mut self,
        edge_id: &str,
        target: &str,
    ) -> Result<String, GraphError> {
        if !self.contains_node(target) {
            return Err(GraphError::NodeNotFound(target.to_string()));
        }
        let edge = self
            .edges
            .iter_mut()
            .find(|e| e.id == edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.to_string()))?;
        let previous = std::mem::replace(&mut edge.target, target.to_string());
        let (source, handle) = (edge.source.clone(), edge.source_handle);
        self.write_destination(&source, handle, Some(target.to_string()));
        Ok(previous)
    }

    /// Rewrites an edge's handle in place. Destination fields are left to the caller.
    pub(crate) fn set_edge_handle(&mut self, edge_id: &str, handle: Handle) -> bool {
        match self.edges.iter_mut().find(|e| e.id == edge_id) {
            Some(edge) => {
                edge.source_handle = handle;
                true
            }
            None => false,
        }
    }

    fn write_destination(&mut self, source: &str, handle: Handle, target: Option<String>) {
        let Some(node) = self.node_mut(source) else {
            return;
        };
        match handle {
            Handle::Yes => node.data.yes_destination = target,
            Handle::No => node.data.no_destination = target,
            Handle::Plain => {}
        }
    }
}
