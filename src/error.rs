use crate::model::Handle;
use thiserror::Error;

/// Errors raised by structural mutations of the graph store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node '{0}' not found in the flow graph")]
    NodeNotFound(String),

    #[error("Edge '{0}' not found in the flow graph")]
    EdgeNotFound(String),

    #[error("A node with id '{0}' already exists in the flow graph")]
    DuplicateNode(String),
}

/// Errors that can occur when turning a remote block sequence into a graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Block '{block_id}' references unknown block '{missing_id}' as its {relation}")]
    UnknownBlock {
        block_id: String,
        missing_id: String,
        relation: &'static str,
    },

    #[error("Block id '{0}' appears more than once in the flowchart")]
    DuplicateBlock(String),

    #[error("Failed to build graph from flowchart: {0}")]
    Graph(#[from] GraphError),
}

/// Errors detected while planning an export, before any remote call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error(
        "Node '{node_id}' points its {handle} branch at '{missing_id}', which is not part of the graph"
    )]
    UnresolvedReference {
        node_id: String,
        handle: Handle,
        missing_id: String,
    },

    #[error("Cannot save an empty flowchart")]
    EmptyGraph,
}

/// Errors reported by a remote block API implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Remote request failed: {0}")]
    Request(String),

    #[error("Remote resource '{0}' not found")]
    NotFound(String),
}

/// Errors that abort a save or load against the remote block API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    #[error("Export planning failed: {0}")]
    Plan(#[from] ExportError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Remote call '{operation}' failed after {} block(s) were created: {source}", created.len())]
    Remote {
        operation: &'static str,
        /// Remote ids created during this attempt. They are left in place.
        created: Vec<String>,
        #[source]
        source: RemoteError,
    },
}

/// Errors raised while reading or writing a local graph snapshot.
#[derive(Error, Debug, Clone)]
pub enum SnapshotError {
    #[error("Snapshot error: {0}")]
    Generic(String),
}
