//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the blockflow
//! crate. Import this module to get access to the core functionality without having
//! to import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use blockflow::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let mut graph = FlowGraph::new();
//! graph.add_node(Node::new("welcome", NodeData::default()))?;
//! graph.add_node(Node::new("goodbye", NodeData::default()))?;
//! graph.connect("welcome", Handle::Plain, "goodbye")?;
//!
//! assert_eq!(creation_order(graph.state()), vec!["welcome", "goodbye"]);
//! # Ok(())
//! # }
//! ```

// Graph store and session
pub use crate::editor::{EditorConfig, EditorView, FlowEditor, Selection};
pub use crate::graph::{FlowGraph, GraphEvent, GraphState, Reducer};

// Data model
pub use crate::model::{Edge, Handle, Node, NodeData, NodeKind, NodePatch, Position, Timing};

// Algorithms
pub use crate::order::creation_order;
pub use crate::timing::{TimingPolicy, infer_timing};
pub use crate::validation::{Diagnostics, Issue};

// Persistence
pub use crate::convert::{
    ExportPlan, SaveMode, SaveReport, import_flowchart, load_flowchart, plan_export,
    save_flowchart,
};
pub use crate::remote::{BlockApi, BlockRequest, Flowchart, InMemoryBlockApi, RemoteBlock};
pub use crate::snapshot::FlowSnapshot;

// Formatting
pub use crate::report::PlanFormatter;

// Error types
pub use crate::error::{GraphError, ImportError, PersistError, RemoteError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
