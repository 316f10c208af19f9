use crate::branch::BranchSynchronizer;
use crate::error::GraphError;
use crate::model::{Edge, Handle, Node, NodePatch, Position};
use crate::timing::{TimingPolicy, TimingReducer, refresh_timing};

mod events;
mod reducer;
mod state;

pub use events::GraphEvent;
pub use reducer::{Reducer, StartNodeReducer, normalize_start_node};
pub use state::GraphState;

/// The graph store of one editing session.
///
/// Every public mutation applies a primitive change to the [`GraphState`], turns
/// it into [`GraphEvent`]s and hands each event to the registered reducers in
/// order. With the default reducers this keeps branches in sync, keeps one start
/// node and re-infers timing.
pub struct FlowGraph {
    state: GraphState,
    reducers: Vec<Box<dyn Reducer>>,
    timing_policy: TimingPolicy,
}

pub struct FlowGraphBuilder {
    state: GraphState,
    timing_policy: TimingPolicy,
    extra_reducers: Vec<Box<dyn Reducer>>,
    default_reducers: bool,
    seed_start_node: bool,
}

impl FlowGraphBuilder {
    pub fn new() -> Self {
        Self {
            state: GraphState::new(),
            timing_policy: TimingPolicy::default(),
            extra_reducers: Vec::new(),
            default_reducers: true,
            seed_start_node: false,
        }
    }

    /// Starts from an existing state, e.g. an imported flowchart or a snapshot.
    pub fn with_state(mut self, state: GraphState) -> Self {
        self.state = state;
        self
    }

    pub fn with_timing_policy(mut self, policy: TimingPolicy) -> Self {
        self.timing_policy = policy;
        self
    }

    /// Registers a reducer that runs after the default ones.
    pub fn with_reducer(mut self, reducer: Box<dyn Reducer>) -> Self {
        self.extra_reducers.push(reducer);
        self
    }

    /// Skips the default reducers. Only the ones added with `with_reducer` run.
    pub fn without_default_reducers(mut self) -> Self {
        self.default_reducers = false;
        self
    }

    /// Adds a blank start node if the graph would otherwise be empty.
    pub fn with_seed_start_node(mut self, seed: bool) -> Self {
        self.seed_start_node = seed;
        self
    }

    pub fn build(self) -> FlowGraph {
        let mut reducers: Vec<Box<dyn Reducer>> = Vec::new();
        if self.default_reducers {
            register_default_reducers(&mut reducers, self.timing_policy);
        }
        reducers.extend(self.extra_reducers);

        let mut graph = FlowGraph {
            state: self.state,
            reducers,
            timing_policy: self.timing_policy,
        };
        normalize_start_node(&mut graph.state);
        if self.seed_start_node && graph.state.is_empty() {
            graph.create_node(Position::new(250.0, 100.0));
        }
        graph
    }
}

impl Default for FlowGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn register_default_reducers(reducers: &mut Vec<Box<dyn Reducer>>, policy: TimingPolicy) {
    reducers.push(Box::new(BranchSynchronizer));
    reducers.push(Box::new(StartNodeReducer));
    reducers.push(Box::new(TimingReducer::new(policy)));
}

impl FlowGraph {
    pub fn builder() -> FlowGraphBuilder {
        FlowGraphBuilder::new()
    }

    /// An empty graph with the default reducers.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn state(&self) -> &GraphState {
        &self.state
    }

    pub fn into_state(self) -> GraphState {
        self.state
    }

    pub fn nodes(&self) -> &[Node] {
        self.state.nodes()
    }

    pub fn edges(&self) -> &[Edge] {
        self.state.edges()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.state.node(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.state.edge(id)
    }

    pub fn timing_policy(&self) -> &TimingPolicy {
        &self.timing_policy
    }

    pub fn reducer_names(&self) -> Vec<&str> {
        self.reducers.iter().map(|r| r.name()).collect()
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        let node_id = node.id.clone();
        self.state.insert_node(node)?;
        self.dispatch(vec![GraphEvent::NodeAdded { node_id }]);
        Ok(())
    }

    /// Adds a blank block with a generated id and returns the id.
    pub fn create_node(&mut self, position: Position) -> String {
        let id = self.state.next_node_id();
        let node_id = id.clone();
        // The id was generated against the current node set, so insertion cannot clash.
        if self.state.insert_node(Node::blank(&id, position)).is_ok() {
            self.dispatch(vec![GraphEvent::NodeAdded { node_id }]);
        }
        id
    }

    /// Shallow-merges `patch` into one node. Destination fields are applied as
    /// edge operations so the branch edges and fields never disagree.
    ///
    /// Unknown destination targets are rejected before anything is applied.
    pub fn update_node_data(&mut self, id: &str, patch: NodePatch) -> Result<(), GraphError> {
        if !self.state.contains_node(id) {
            return Err(GraphError::NodeNotFound(id.to_string()));
        }
        if let Some(missing) = [&patch.yes_destination, &patch.no_destination]
            .into_iter()
            .flatten()
            .flatten()
            .find(|target| !self.state.contains_node(target))
        {
            return Err(GraphError::NodeNotFound(missing.clone()));
        }

        let node = self
            .state
            .node_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        let before = node.data.clone();
        let changed = patch.merge_fields(&mut node.data);

        if changed {
            if patch.is_start_node == Some(true) {
                reducer::make_start_node(&mut self.state, id);
            }
            self.dispatch(vec![GraphEvent::NodeUpdated {
                node_id: id.to_string(),
                before,
            }]);
        }

        for (handle, destination) in [
            (Handle::Yes, patch.yes_destination),
            (Handle::No, patch.no_destination),
        ] {
            match destination {
                Some(Some(target)) => {
                    self.connect(id, handle, &target)?;
                }
                Some(None) => {
                    let existing = self.state.outgoing_edge(id, handle).map(|e| e.id.clone());
                    if let Some(edge_id) = existing {
                        self.disconnect_edge(&edge_id)?;
                    }
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Removes a node and every edge that touches it.
    pub fn delete_node(&mut self, id: &str) -> Result<Node, GraphError> {
        let (node, removed_edges) = self
            .state
            .remove_node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        tracing::debug!(node = %id, edges = removed_edges.len(), "node deleted");
        self.dispatch(vec![GraphEvent::NodeRemoved {
            node: node.clone(),
            removed_edges,
        }]);
        Ok(node)
    }

    /// Connects `source`'s `handle` to `target`, replacing any edge that already
    /// leaves from the same handle.
    pub fn connect(&mut self, source: &str, handle: Handle, target: &str) -> Result<Edge, GraphError> {
        let (edge, replaced) = self.state.insert_edge(source, handle, target)?;
        let mut events = Vec::with_capacity(2);
        if let Some(old) = replaced {
            tracing::debug!(source = %source, handle = %handle, old_target = %old.target, "edge replaced");
            events.push(GraphEvent::EdgeRemoved { edge: old });
        }
        events.push(GraphEvent::EdgeAdded { edge: edge.clone() });
        self.dispatch(events);
        Ok(edge)
    }

    pub fn disconnect_edge(&mut self, edge_id: &str) -> Result<Edge, GraphError> {
        let edge = self
            .state
            .remove_edge(edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.to_string()))?;
        self.dispatch(vec![GraphEvent::EdgeRemoved { edge: edge.clone() }]);
        Ok(edge)
    }

    /// Points an existing edge at a new target without changing its id or handle.
    pub fn retarget_edge(&mut self, edge_id: &str, target: &str) -> Result<(), GraphError> {
        let previous_target = self.state.set_edge_target(edge_id, target)?;
        let edge = self
            .state
            .edge(edge_id)
            .cloned()
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.to_string()))?;
        self.dispatch(vec![GraphEvent::EdgeRetargeted {
            edge,
            previous_target,
        }]);
        Ok(())
    }

    pub fn set_start_node(&mut self, id: &str) -> Result<(), GraphError> {
        self.update_node_data(id, NodePatch::default().start_node(true))
    }

    /// Re-runs timing inference for one node. `force` overrides a manual edit.
    pub fn refresh_timing(&mut self, id: &str, force: bool) -> Result<bool, GraphError> {
        if !self.state.contains_node(id) {
            return Err(GraphError::NodeNotFound(id.to_string()));
        }
        Ok(refresh_timing(
            &mut self.state,
            &self.timing_policy,
            id,
            force,
        ))
    }

    fn dispatch(&mut self, events: Vec<GraphEvent>) {
        for event in &events {
            tracing::trace!(event = event.name(), "dispatching graph event");
            for reducer in &self.reducers {
                reducer.reduce(&mut self.state, event);
            }
        }
    }
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new()
    }
}
