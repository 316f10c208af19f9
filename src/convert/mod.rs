//! Conversion between the editor graph and the backend's flat block sequence.

mod export;
mod import;
mod persist;

pub use export::{BlockPlan, ExportPlan, ForwardReference, plan_export};
pub use import::{ImportLayout, import_flowchart};
pub use persist::{LoadedFlowchart, SaveMode, SaveReport, load_flowchart, save_flowchart};
