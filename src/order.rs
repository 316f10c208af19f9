//! Creation order for persisting a flow.
//!
//! Blocks reference their previous block by remote id, so a block can only be
//! created once its predecessors have ids. The order is found with a depth-first
//! walk that starts at the terminal blocks and emits predecessors before the
//! block itself.

use crate::graph::GraphState;
use ahash::{AHashMap, AHashSet};

/// Computes the order in which the graph's nodes should be created remotely.
///
/// Every node appears exactly once. Cycles are not rejected: the walk stops at
/// already visited nodes, so a node inside a cycle may come before one of its
/// predecessors.
pub fn creation_order(state: &GraphState) -> Vec<String> {
    let mut predecessors: AHashMap<&str, Vec<&str>> = AHashMap::new();
    for edge in state.edges() {
        predecessors
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }

    let mut resolver = OrderResolver {
        predecessors,
        visited: AHashSet::with_capacity(state.len()),
        order: Vec::with_capacity(state.len()),
    };

    let terminals = state
        .nodes()
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| !state.has_outgoing(id));
    for id in terminals {
        resolver.visit(id);
    }

    // Isolated nodes and cycles with no exit are not reachable from a terminal.
    for node in state.nodes() {
        resolver.visit(&node.id);
    }

    resolver.order.into_iter().map(str::to_string).collect()
}

/// The ids of the nodes with no outgoing edge of any kind.
pub fn terminal_nodes(state: &GraphState) -> Vec<&str> {
    state
        .nodes()
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| !state.has_outgoing(id))
        .collect()
}

struct OrderResolver<'a> {
    predecessors: AHashMap<&'a str, Vec<&'a str>>,
    visited: AHashSet<&'a str>,
    order: Vec<&'a str>,
}

impl<'a> OrderResolver<'a> {
    /// Post-order walk over predecessors with an explicit stack. Each frame holds
    /// a node and the index of the next predecessor to look at.
    fn visit(&mut self, root: &'a str) {
        if !self.visited.insert(root) {
            return;
        }
        let mut stack: Vec<(&'a str, usize)> = vec![(root, 0)];
        while let Some((id, next)) = stack.last_mut() {
            let parent = self
                .predecessors
                .get(*id)
                .and_then(|parents| parents.get(*next))
                .copied();
            match parent {
                Some(parent) => {
                    *next += 1;
                    if self.visited.insert(parent) {
                        stack.push((parent, 0));
                    }
                }
                None => {
                    self.order.push(*id);
                    stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FlowGraph;
    use crate::model::{Handle, Node, NodeData, NodePatch};

    fn graph_with(ids: &[&str]) -> FlowGraph {
        let mut graph = FlowGraph::new();
        for id in ids {
            graph.add_node(Node::new(*id, NodeData::default())).unwrap();
        }
        graph
    }

    fn position(order: &[String], id: &str) -> usize {
        order.iter().position(|o| o == id).unwrap()
    }

    #[test]
    fn diamond_puts_predecessors_first() {
        let mut graph = graph_with(&["a", "b", "c", "d"]);
        graph
            .update_node_data("a", NodePatch::default().has_condition(true))
            .unwrap();
        graph.connect("a", Handle::Yes, "b").unwrap();
        graph.connect("a", Handle::No, "c").unwrap();
        graph.connect("b", Handle::Plain, "d").unwrap();
        graph.connect("c", Handle::Plain, "d").unwrap();

        let order = creation_order(graph.state());
        assert_eq!(order.len(), 4);
        assert!(position(&order, "a") < position(&order, "b"));
        assert!(position(&order, "a") < position(&order, "c"));
        assert!(position(&order, "b") < position(&order, "d"));
        assert!(position(&order, "c") < position(&order, "d"));
    }

    #[test]
    fn isolated_nodes_are_included() {
        let graph = graph_with(&["x", "y"]);
        assert_eq!(creation_order(graph.state()), vec!["x", "y"]);
        assert_eq!(terminal_nodes(graph.state()), vec!["x", "y"]);
    }

    #[test]
    fn pure_cycle_terminates() {
        let mut graph = graph_with(&["a", "b"]);
        graph.connect("a", Handle::Plain, "b").unwrap();
        graph.connect("b", Handle::Plain, "a").unwrap();

        let order = creation_order(graph.state());
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn long_chain_runs_on_a_small_stack() {
        const LEN: usize = 5_000;
        let mut state = GraphState::new();
        for i in 0..LEN {
            state
                .insert_node(Node::new(format!("n{}", i), NodeData::default()))
                .unwrap();
        }
        for i in 1..LEN {
            state
                .insert_edge(&format!("n{}", i - 1), Handle::Plain, &format!("n{}", i))
                .unwrap();
        }

        let order = std::thread::Builder::new()
            .stack_size(128 * 1024)
            .spawn(move || creation_order(&state))
            .unwrap()
            .join()
            .expect("creation order overflowed the stack");
        assert_eq!(order.len(), LEN);
        assert_eq!(order.first().map(String::as_str), Some("n0"));
        assert_eq!(order.last().map(String::as_str), Some("n4999"));
    }
}
