use super::NodeData;

/// The role a block plays in the flow, derived from its flags.
///
/// A start block that also branches is reported as [`NodeKind::Start`] with
/// `branching: true`, so matching on the kind stays exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Start { branching: bool },
    Plain,
    Conditional,
}

impl NodeKind {
    pub fn of(data: &NodeData) -> Self {
        match (data.is_start_node, data.has_condition) {
            (true, branching) => NodeKind::Start { branching },
            (false, true) => NodeKind::Conditional,
            (false, false) => NodeKind::Plain,
        }
    }

    pub fn branches(self) -> bool {
        matches!(
            self,
            NodeKind::Conditional | NodeKind::Start { branching: true }
        )
    }
}
