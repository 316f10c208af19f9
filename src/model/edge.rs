use serde::{Deserialize, Serialize};
use std::fmt;

/// The output port an edge leaves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    /// The default output of a non-branching block.
    #[default]
    Plain,
    Yes,
    No,
}

impl Handle {
    pub fn is_conditional(self) -> bool {
        !matches!(self, Handle::Plain)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handle::Plain => write!(f, "plain"),
            Handle::Yes => write!(f, "yes"),
            Handle::No => write!(f, "no"),
        }
    }
}

/// A transition from one block's output handle to another block's input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Handle,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        source_handle: Handle,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}
