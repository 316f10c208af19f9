pub mod edge;
pub mod kind;
pub mod node;

pub use edge::*;
pub use kind::*;
pub use node::*;
