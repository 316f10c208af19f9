//! Non-blocking diagnostics for the editor.
//!
//! Nothing here rejects a mutation. Issues are shown inline on the node and in
//! the sidebar and are expected to be fixed before a meaningful save.

use crate::graph::GraphState;
use crate::model::{Handle, Node};
use ahash::AHashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The block content is incomplete.
    Validation,
    /// The block is wired in a way the flow cannot follow.
    Structural,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Issue {
    MissingPurpose,
    MissingExamples,
    MissingConditionQuestion,
    MissingYesDestination,
    MissingNoDestination,
    /// Not the start node and nothing leads into it.
    Disconnected,
    /// A `no` edge leaves a block that does not branch.
    NoBranchWithoutCondition { edge_id: String },
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::Disconnected | Issue::NoBranchWithoutCondition { .. } => Severity::Structural,
            _ => Severity::Validation,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::MissingPurpose => write!(f, "message purpose is empty"),
            Issue::MissingExamples => write!(f, "no message examples"),
            Issue::MissingConditionQuestion => write!(f, "condition has no question"),
            Issue::MissingYesDestination => write!(f, "condition has no 'yes' destination"),
            Issue::MissingNoDestination => write!(f, "condition has no 'no' destination"),
            Issue::Disconnected => write!(f, "not reachable: no incoming connection"),
            Issue::NoBranchWithoutCondition { edge_id } => {
                write!(f, "'no' edge {} leaves a block without a condition", edge_id)
            }
        }
    }
}

/// Content issues of a single block, independent of the rest of the graph.
pub fn content_issues(node: &Node) -> Vec<Issue> {
    let data = &node.data;
    let mut issues = Vec::new();
    if data.message_purpose.trim().is_empty() {
        issues.push(Issue::MissingPurpose);
    }
    if data.examples.iter().all(|e| e.trim().is_empty()) {
        issues.push(Issue::MissingExamples);
    }
    if data.has_condition {
        if data.condition_question.trim().is_empty() {
            issues.push(Issue::MissingConditionQuestion);
        }
        if data.yes_destination.is_none() {
            issues.push(Issue::MissingYesDestination);
        }
        if data.no_destination.is_none() {
            issues.push(Issue::MissingNoDestination);
        }
    }
    issues
}

/// Every issue of one node, including how it sits in the graph.
pub fn node_issues(state: &GraphState, node: &Node) -> Vec<Issue> {
    let mut issues = content_issues(node);
    if !node.data.is_start_node && state.incoming(&node.id).next().is_none() {
        issues.push(Issue::Disconnected);
    }
    if !node.data.has_condition {
        if let Some(edge) = state.outgoing_edge(&node.id, Handle::No) {
            issues.push(Issue::NoBranchWithoutCondition {
                edge_id: edge.id.clone(),
            });
        }
    }
    issues
}

/// Whether the block passes every content check.
pub fn is_complete(node: &Node) -> bool {
    content_issues(node).is_empty()
}

/// Issues per node id. Nodes without issues are left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    issues: AHashMap<String, Vec<Issue>>,
}

impl Diagnostics {
    pub fn collect(state: &GraphState) -> Self {
        let issues = state
            .nodes()
            .iter()
            .filter_map(|node| {
                let found = node_issues(state, node);
                (!found.is_empty()).then(|| (node.id.clone(), found))
            })
            .collect();
        Self { issues }
    }

    pub fn for_node(&self, id: &str) -> &[Issue] {
        self.issues.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Issue])> {
        self.issues.iter().map(|(id, v)| (id.as_str(), v.as_slice()))
    }

    pub fn has_structural(&self) -> bool {
        self.issues
            .values()
            .flatten()
            .any(|i| i.severity() == Severity::Structural)
    }
}
