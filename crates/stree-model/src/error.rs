//! Error types for the StateTree model.

use stree_types::{PropertyPath, StateId};

/// Errors produced while building, editing or loading a [`StateTree`].
///
/// [`StateTree`]: crate::StateTree
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A referenced state does not exist in the tree.
    #[error("state not found: {0:?}")]
    StateNotFound(StateId),

    /// Attempted to add a state whose ID is already in use.
    #[error("duplicate state: {0:?}")]
    DuplicateState(StateId),

    /// A state is referenced as a child by more than one parent, or as both
    /// a root and a child.
    #[error("state {0:?} has more than one parent")]
    MultipleParents(StateId),

    /// Moving a state under itself or one of its descendants.
    #[error("cannot move {state:?} under its own descendant {parent:?}")]
    CycleDetected { state: StateId, parent: StateId },

    /// A property value does not match its declared type.
    #[error("property `{name}` expects {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// A property with this name already exists in the bag.
    #[error("duplicate property `{0}`")]
    DuplicateProperty(String),

    /// The bag declares no property with this name.
    #[error("unknown property `{0}`")]
    UnknownProperty(String),

    /// A property value cannot be exported to its canonical text form.
    #[error("cannot export property value: {0}")]
    Export(String),

    /// Two bindings share the same target path.
    #[error("duplicate binding target: {0}")]
    DuplicateBindingTarget(PropertyPath),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
