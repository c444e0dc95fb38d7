//! Player programs: the block tree, its transforms, and structural rules.
//!
//! ## Key Types
//!
//! - `Program`: ordered top-level nodes, an immutable snapshot
//! - `ProgramNode`: a block with params, bug flag, capacity, and children
//! - `NodeDraft`: client-side node before card resolution
//! - `ValidationError`: why a tree was rejected

pub mod node;
pub mod transform;
pub mod validator;

pub use node::{ContainerKind, NodeDraft, NodeId, Program, ProgramNode};
pub use transform::SubtreeIds;
pub use validator::{ensure_ready, validate, ValidationError, NESTING_CAPACITY};
