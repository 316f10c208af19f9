use super::events::GraphEvent;
use super::state::GraphState;

/// A side effect that reacts to applied graph events.
///
/// Reducers are independent of each other: each one inspects the event it is
/// handed and decides on its own whether to touch the state.
pub trait Reducer: Send + Sync {
    fn name(&self) -> &str;
    fn reduce(&self, state: &mut GraphState, event: &GraphEvent);
}

/// Keeps exactly one start node in a non-empty graph.
pub struct StartNodeReducer;

impl Reducer for StartNodeReducer {
    fn name(&self) -> &str {
        "start-node"
    }

    fn reduce(&self, state: &mut GraphState, event: &GraphEvent) {
        let start_flag_touched = match event {
            GraphEvent::NodeUpdated { node_id, before } => state
                .node(node_id)
                .is_some_and(|n| n.data.is_start_node != before.is_start_node),
            _ => false,
        };
        if event.is_structural() || start_flag_touched {
            normalize_start_node(state);
        }
    }
}

/// Promotes the first marked start node (or the first node if none is marked) and
/// demotes every other node. Returns `true` if any flag changed.
pub fn normalize_start_node(state: &mut GraphState) -> bool {
    let chosen = state
        .start_node()
        .or_else(|| state.nodes().first())
        .map(|n| n.id.clone());
    let Some(chosen) = chosen else {
        return false;
    };

    let mut changed = false;
    for node in state.nodes_mut() {
        let should_start = node.id == chosen;
        if node.data.is_start_node != should_start {
            node.data.is_start_node = should_start;
            changed = true;
        }
    }
    if changed {
        tracing::debug!(start = %chosen, "start node normalised");
    }
    changed
}

/// Marks `id` as the only start node.
pub(crate) fn make_start_node(state: &mut GraphState, id: &str) {
    for node in state.nodes_mut() {
        node.data.is_start_node = node.id == id;
    }
}
