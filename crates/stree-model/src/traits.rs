use std::fmt::Debug;
use std::hash::Hash;

use stree_types::PropertyPath;

use crate::bindings::Binding;
use crate::state::State;

/// Read-only view of an ordered forest of nodes.
///
/// Implementations must satisfy these invariants:
/// - Handles are cheap to copy and may go stale at any time. Every method
///   taking a handle treats a stale handle as absent rather than panicking:
///   `children` returns an empty list and `stable_id` returns `None`.
/// - `stable_id` is the only key used to pair nodes across two forests.
/// - `revision` changes whenever the root list, any child list, or any
///   node's content changes.
pub trait ForestProvider {
    /// Opaque node handle.
    type Handle: Copy + Eq + Hash + Debug;
    /// Stable identity shared by the same node across revisions.
    type Key: Clone + Eq + Hash + Debug;

    /// Monotonic change counter.
    fn revision(&self) -> u64;

    /// Root nodes, in order.
    fn root_nodes(&self) -> Vec<Self::Handle>;

    /// Children of `node`, in order.
    fn children(&self, node: Self::Handle) -> Vec<Self::Handle>;

    /// Stable identity of `node`, or `None` if the handle is stale.
    fn stable_id(&self, node: Self::Handle) -> Option<Self::Key>;

    /// Whether `node` still resolves.
    fn is_valid(&self, node: Self::Handle) -> bool {
        self.stable_id(node).is_some()
    }
}

/// Access to the state stored behind a forest handle.
pub trait StatePayload: ForestProvider {
    /// The state for `node`, or `None` if the handle is stale.
    fn state_payload(&self, node: Self::Handle) -> Option<&State>;
}

/// A tree's property bindings, keyed by target path.
pub trait BindingCollection {
    /// All bindings, in no particular order.
    fn bindings(&self) -> Vec<&Binding>;

    /// Whether some binding writes to `target`.
    fn has_binding(&self, target: &PropertyPath) -> bool;

    /// Source bound to `target`, if any.
    fn binding_source(&self, target: &PropertyPath) -> Option<&PropertyPath>;
}
