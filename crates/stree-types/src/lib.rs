//! Foundation types for StateTree diffing.
//!
//! Every other `stree-*` crate depends on these identity and addressing
//! primitives.
//!
//! # Key Types
//!
//! - [`StateId`] -- Stable identity of a state, preserved across revisions
//! - [`NodeId`] -- Stable identity of an editor node (task, condition,
//!   consideration, evaluator), a transition, or a parameter bag
//! - [`PropertyPath`] -- Owner-relative property address used by bindings

pub mod error;
pub mod identity;
pub mod path;

pub use error::TypeError;
pub use identity::{NodeId, StateId};
pub use path::{PathSegment, PropertyPath};
