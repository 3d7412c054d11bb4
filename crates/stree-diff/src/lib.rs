//! Structural diff engine for StateTree assets.
//!
//! Compares two revisions of a state tree and produces an ordered list of
//! semantic differences: states added, removed, moved, enabled, disabled or
//! changed, tree-level property changes, and property-binding changes.
//!
//! # Pipeline
//!
//! 1. [`TreeAligner`] pairs states across the two forests by stable ID, one
//!    sibling level at a time, and tags every position as identical,
//!    changed, or present on one side only. Work can be spread over several
//!    [`TreeAligner::process_slice`] calls and forced with
//!    [`TreeAligner::flush`].
//! 2. [`classify_states`] walks the alignment in pre-order and emits
//!    [`DiffEntry`] values, collapsing a removal and an addition of the same
//!    state into one [`DiffKind::StateMoved`] entry.
//! 3. [`diff_bindings`] reconciles the two binding collections by target
//!    path.
//!
//! [`StateTreeDiffer`] bundles the three steps behind one session object;
//! [`diff_state_trees`] is the one-shot form.
//!
//! # Key Types
//!
//! - [`DiffEntry`] / [`DiffKind`] -- one reported difference
//! - [`PathSoftReference`] -- name+ID address of a state, re-resolvable
//!   against another tree
//! - [`DiffNavigator`] -- next/previous cursor over a report
//! - [`DiffConfig`] -- slice budget and presentation toggles

pub mod aligner;
pub mod binding_diff;
pub mod classifier;
pub mod config;
pub mod differ;
pub mod entry;
pub mod equality;
pub mod error;
pub mod navigator;
pub mod path;

pub use aligner::{AlignResult, AlignedNode, AlignerState, TreeAligner, Visit};
pub use binding_diff::{binding_path_for_target, diff_bindings};
pub use classifier::{classify_states, global_properties_entry};
pub use config::DiffConfig;
pub use differ::{
    diff_state_trees, state_tree_aligner, StateComparator, StateTreeAligner, StateTreeDiffer,
};
pub use entry::{describe, DiffEntry, DiffKind, DiffLabels, DiffSeverity, DiffSummary};
pub use equality::{
    are_global_data_equal, are_node_lists_equal, are_nodes_equal, are_property_bags_equal,
    are_states_equal, are_transitions_equal, are_values_equal,
};
pub use error::{DiffError, DiffResult};
pub use navigator::DiffNavigator;
pub use path::{PathElement, PathSoftReference};
