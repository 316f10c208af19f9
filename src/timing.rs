//! Automatic timing for message blocks.
//!
//! A block's `interval` grows with the number of data-collection fields it asks
//! for, and its `max_wait` is only non-zero when the flow continues after it.

use crate::graph::{GraphEvent, GraphState, Reducer};
use crate::model::{NodeData, Timing};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Thresholds and values used by timing inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingPolicy {
    pub base_interval: u32,
    /// Used when the block collects at least one and fewer than `many_fields` fields.
    pub few_fields_interval: u32,
    pub many_fields_interval: u32,
    pub many_fields: usize,
    /// `max_wait` for blocks followed by another block.
    pub continued_max_wait: u32,
    /// `max_wait` for blocks that end the flow.
    pub terminal_max_wait: u32,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            base_interval: 10,
            few_fields_interval: 20,
            many_fields_interval: 30,
            many_fields: 3,
            continued_max_wait: 3600,
            terminal_max_wait: 0,
        }
    }
}

impl TimingPolicy {
    /// Computes the timing the block should have, ignoring any manual override.
    pub fn compute(&self, data: &NodeData, has_outgoing_edge: bool) -> Timing {
        let fields = data.data_collection.len();
        let interval = if fields >= self.many_fields {
            self.many_fields_interval
        } else if fields >= 1 {
            self.few_fields_interval
        } else {
            self.base_interval
        };
        let max_wait = if has_outgoing_edge {
            self.continued_max_wait
        } else {
            self.terminal_max_wait
        };
        Timing::new(interval, max_wait)
    }

    /// Like [`TimingPolicy::compute`], but a manually edited timing is returned as is.
    pub fn infer(&self, data: &NodeData, has_outgoing_edge: bool) -> Timing {
        if data.manual_timing_edit {
            data.timing
        } else {
            self.compute(data, has_outgoing_edge)
        }
    }
}

/// Infers a block's timing with the default policy.
pub fn infer_timing(data: &NodeData, has_outgoing_edge: bool) -> Timing {
    TimingPolicy::default().infer(data, has_outgoing_edge)
}

/// Re-applies inference to one node. Returns `true` if the node changed.
///
/// A forced recompute overrides and clears `manual_timing_edit`; otherwise the
/// node is only written when the inferred values differ from the current ones.
pub fn refresh_timing(state: &mut GraphState, policy: &TimingPolicy, id: &str, force: bool) -> bool {
    let has_outgoing = state.has_outgoing(id);
    let Some(node) = state.node_mut(id) else {
        return false;
    };

    if force {
        let timing = policy.compute(&node.data, has_outgoing);
        let changed = node.data.timing != timing || node.data.manual_timing_edit;
        node.data.timing = timing;
        node.data.manual_timing_edit = false;
        return changed;
    }

    let timing = policy.infer(&node.data, has_outgoing);
    if timing == node.data.timing {
        return false;
    }
    tracing::debug!(node = %id, interval = timing.interval, max_wait = timing.max_wait, "timing inferred");
    node.data.timing = timing;
    node.data.manual_timing_edit = false;
    true
}

/// Re-infers timing for every node whose outgoing edges or data fields changed.
pub struct TimingReducer {
    policy: TimingPolicy,
}

impl TimingReducer {
    pub fn new(policy: TimingPolicy) -> Self {
        Self { policy }
    }
}

impl Reducer for TimingReducer {
    fn name(&self) -> &str {
        "timing"
    }

    fn reduce(&self, state: &mut GraphState, event: &GraphEvent) {
        match event {
            GraphEvent::NodeAdded { node_id } => {
                refresh_timing(state, &self.policy, node_id, false);
            }
            GraphEvent::NodeUpdated { node_id, before } => {
                let fields_changed = state
                    .node(node_id)
                    .is_some_and(|n| n.data.data_collection != before.data_collection);
                if fields_changed {
                    refresh_timing(state, &self.policy, node_id, false);
                }
            }
            GraphEvent::EdgeAdded { edge }
            | GraphEvent::EdgeRemoved { edge }
            | GraphEvent::EdgeRetargeted { edge, .. } => {
                refresh_timing(state, &self.policy, &edge.source, false);
            }
            GraphEvent::NodeRemoved {
                node,
                removed_edges,
            } => {
                let sources: Vec<&str> = removed_edges
                    .iter()
                    .map(|e| e.source.as_str())
                    .filter(|s| *s != node.id)
                    .unique()
                    .collect();
                for source in sources {
                    refresh_timing(state, &self.policy, source, false);
                }
            }
        }
    }
}
