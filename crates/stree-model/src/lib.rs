//! In-memory StateTree asset model.
//!
//! The diff engine never owns or mutates states; it reads them through the
//! capability traits in [`traits`]. This crate provides the host-side model
//! those traits are implemented for: an arena of [`State`]s keyed by
//! [`StateId`](stree_types::StateId), plus the tree-level global data and
//! the property-binding collection.
//!
//! # Design Rules
//!
//! 1. A state handle is its stable ID. A lookup that misses is the normal
//!    way a stale handle shows up; nothing panics on it.
//! 2. Every structural or content mutation of states bumps
//!    [`StateTree::revision`], so readers can tell when cached results are
//!    out of date.
//! 3. Binding targets are unique within one [`PropertyBindings`] collection.

pub mod bindings;
pub mod error;
pub mod node;
pub mod state;
pub mod traits;
pub mod tree;
pub mod value;

pub use bindings::{Binding, PropertyBindings};
pub use error::{ModelError, ModelResult};
pub use node::{
    EditorNode, ExpressionOperand, InstancedValue, Transition, TransitionDelay,
    TransitionPriority, TransitionTarget, TransitionTrigger,
};
pub use state::{ColorRef, SelectionBehavior, State, StateParameters, StateType};
pub use traits::{BindingCollection, ForestProvider, StatePayload};
pub use tree::StateTree;
pub use value::{PropertyBag, PropertyDesc, PropertyType, PropertyValue};
