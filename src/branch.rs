//! Keeps a block's `has_condition` flag and its outgoing handles in agreement.

use crate::graph::{GraphEvent, GraphState, Reducer};
use crate::model::Handle;

/// Reacts to `has_condition` toggles by reinterpreting existing edges in place.
pub struct BranchSynchronizer;

impl Reducer for BranchSynchronizer {
    fn name(&self) -> &str {
        "branch-sync"
    }

    fn reduce(&self, state: &mut GraphState, event: &GraphEvent) {
        let GraphEvent::NodeUpdated { node_id, before } = event else {
            return;
        };
        let Some(now) = state.node(node_id).map(|n| n.data.has_condition) else {
            return;
        };
        match (before.has_condition, now) {
            (false, true) => enable_condition(state, node_id),
            (true, false) => disable_condition(state, node_id),
            _ => {}
        }
    }
}

/// Turns the plain output into the `yes` branch, keeping the edge id.
///
/// Both destination fields are then read back from the branch edges, so a `no`
/// edge kept through an earlier toggle is picked up again.
pub fn enable_condition(state: &mut GraphState, node_id: &str) {
    if let Some(plain) = state.outgoing_edge(node_id, Handle::Plain).cloned() {
        if state.outgoing_edge(node_id, Handle::Yes).is_some() {
            // Only one yes branch may exist; the plain edge has nowhere to go.
            tracing::warn!(node = %node_id, edge = %plain.id, "dropping plain edge, yes branch already connected");
            state.remove_edge(&plain.id);
        } else {
            state.set_edge_handle(&plain.id, Handle::Yes);
            tracing::debug!(node = %node_id, edge = %plain.id, "plain edge became yes branch");
        }
    }

    let yes = state
        .outgoing_edge(node_id, Handle::Yes)
        .map(|e| e.target.clone());
    let no = state
        .outgoing_edge(node_id, Handle::No)
        .map(|e| e.target.clone());
    if let Some(node) = state.node_mut(node_id) {
        node.data.yes_destination = yes;
        node.data.no_destination = no;
    }
}

/// Turns the `yes` branch back into the plain output and clears both destinations.
///
/// A `no` edge is left in place; validation reports it.
pub fn disable_condition(state: &mut GraphState, node_id: &str) {
    if let Some(yes) = state.outgoing_edge(node_id, Handle::Yes).cloned() {
        if state.outgoing_edge(node_id, Handle::Plain).is_some() {
            tracing::warn!(node = %node_id, edge = %yes.id, "dropping yes edge, plain output already connected");
            state.remove_edge(&yes.id);
        } else {
            state.set_edge_handle(&yes.id, Handle::Plain);
            tracing::debug!(node = %node_id, edge = %yes.id, "yes branch became plain edge");
        }
    }

    if let Some(node) = state.node_mut(node_id) {
        node.data.yes_destination = None;
        node.data.no_destination = None;
    }
}
