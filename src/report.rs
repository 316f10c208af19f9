use crate::convert::{BlockPlan, ExportPlan};
use crate::graph::GraphState;
use crate::model::NodeKind;
use crate::validation::Diagnostics;
use itertools::Itertools;

/// Formats export plans and diagnostics into human-readable text
pub struct PlanFormatter;

impl PlanFormatter {
    /// One line per block in creation order.
    pub fn format_plan(plan: &ExportPlan, state: &GraphState) -> String {
        plan.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| Self::format_block(index + 1, block, state))
            .join("\n")
    }

    fn format_block(position: usize, block: &BlockPlan, state: &GraphState) -> String {
        let title = state
            .node(&block.node_id)
            .map(|n| n.data.title.as_str())
            .unwrap_or("");
        let kind = state
            .node(&block.node_id)
            .map(|n| Self::format_kind(NodeKind::of(&n.data)))
            .unwrap_or("?");

        let mut flags = Vec::new();
        if block.content.is_first_message {
            flags.push("first");
        }
        if block.content.is_last_message {
            flags.push("last");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };

        format!(
            "{:>3}. {} \"{}\" ({}) prev={} yes={} no={} wait={}s/{}s{}",
            position,
            block.node_id,
            title,
            kind,
            Self::format_ref(&block.previous),
            Self::format_ref(&block.positive),
            Self::format_ref(&block.negative),
            block.content.interval,
            block.content.max_wait,
            flags
        )
    }

    /// One line per node with issues, sorted by node id.
    pub fn format_diagnostics(diagnostics: &Diagnostics) -> String {
        diagnostics
            .iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(id, issues)| format!("{}: {}", id, issues.iter().join("; ")))
            .join("\n")
    }

    fn format_ref(reference: &Option<String>) -> &str {
        reference.as_deref().unwrap_or("-")
    }

    fn format_kind(kind: NodeKind) -> &'static str {
        match kind {
            NodeKind::Start { branching: true } => "start, branching",
            NodeKind::Start { branching: false } => "start",
            NodeKind::Conditional => "branching",
            NodeKind::Plain => "message",
        }
    }
}
