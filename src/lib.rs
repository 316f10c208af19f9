//! # Blockflow - Conversational Flow Graph Editor Core
//!
//! **Blockflow** holds the model behind a visual editor for conversational flows:
//! message blocks (nodes) connected by transitions (edges), with optional yes/no
//! branching. It keeps the graph consistent while the user edits it and turns it
//! into the flat, ordered block sequence a backend persists, and back again.
//!
//! ## Core Workflow
//!
//! 1.  **Open a session**: Create a `FlowEditor` for a new flow, or load one from a
//!     backend implementing `BlockApi`.
//! 2.  **Edit**: Forward host events (`on_node_click`, `on_connect`,
//!     `on_update_node_data`, `on_delete_key`, ...) to the editor. Every mutation
//!     runs through the graph store's reducers, which keep branch edges in sync
//!     with the condition flags, keep exactly one start node and infer timing.
//! 3.  **Inspect**: The `EditorView` reported after each change carries the
//!     current nodes, edges, selection and non-blocking diagnostics.
//! 4.  **Save**: `FlowEditor::save` computes the creation order and creates the
//!     blocks one by one, substituting remote ids as they are assigned.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blockflow::prelude::*;
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let mut editor = FlowEditor::new("Onboarding", EditorConfig::default());
//!     let start = editor.graph().nodes()[0].id.clone();
//!
//!     let question = editor.add_block(Position::new(250.0, 300.0));
//!     editor.on_connect(&start, Handle::Plain, &question)?;
//!     editor.on_update_node_data(
//!         &question,
//!         NodePatch::default()
//!             .message_purpose("Ask whether the customer wants to continue")
//!             .has_condition(true)
//!             .condition_question("Deseja continuar?"),
//!     )?;
//!
//!     let plan = plan_export(editor.graph().state())?;
//!     println!("{}", PlanFormatter::format_plan(&plan, editor.graph().state()));
//!
//!     let api = InMemoryBlockApi::new().with_flowchart("flow-1", "Onboarding");
//!     let report = tokio_test::block_on(editor.save(&api, "flow-1"))?;
//!     println!("created {} blocks", report.created.len());
//!     Ok(())
//! }
//! ```

pub mod branch;
pub mod convert;
pub mod editor;
pub mod error;
pub mod graph;
pub mod model;
pub mod order;
pub mod prelude;
pub mod remote;
pub mod report;
pub mod snapshot;
pub mod timing;
pub mod validation;
