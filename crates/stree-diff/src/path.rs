//! Soft references to states: the chain of (name, ID) pairs from a root
//! down to a state.
//!
//! A soft reference outlives the tree it was taken from. It can be shown
//! as a display path (`Root/Locomotion/Run`) and resolved against another
//! revision of the tree, matching each level by ID first and by name as a
//! fallback.

use std::fmt;

use serde::{Deserialize, Serialize};

use stree_model::StateTree;
use stree_types::StateId;

/// One level of a soft reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathElement {
    pub name: String,
    pub id: StateId,
}

/// Root-to-state address of a state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSoftReference {
    elements: Vec<PathElement>,
}

impl PathSoftReference {
    pub fn new(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }

    /// Build the reference for `id` in `tree`. `None` if the state is gone.
    pub fn from_state(tree: &StateTree, id: StateId) -> Option<Self> {
        let chain = tree.ancestry(id)?;
        let elements = chain
            .into_iter()
            .map(|id| {
                tree.state(id).map(|state| PathElement {
                    name: state.name.clone(),
                    id,
                })
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self { elements })
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    /// ID of the addressed state.
    pub fn leaf_id(&self) -> Option<StateId> {
        self.elements.last().map(|e| e.id)
    }

    /// Name of the addressed state.
    pub fn leaf_name(&self) -> Option<&str> {
        self.elements.last().map(|e| e.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Walk `tree` from its roots, matching each element by ID or, failing
    /// that, by name. Stops at the first level with no match.
    pub fn resolve(&self, tree: &StateTree) -> Option<StateId> {
        let mut level = tree.roots();
        let mut found = None;

        for element in &self.elements {
            let by_id = level.iter().copied().find(|id| *id == element.id);
            let matched = by_id.or_else(|| {
                level.iter().copied().find(|id| {
                    tree.state(*id)
                        .is_some_and(|state| state.name == element.name)
                })
            })?;
            found = Some(matched);
            level = tree.children_of(matched);
        }

        found
    }

    /// Display path, optionally with each state's short ID.
    pub fn display_string(&self, display_ids: bool) -> String {
        self.elements
            .iter()
            .map(|e| {
                if display_ids {
                    format!("{}[{}]", e.name, e.id.short_id())
                } else {
                    e.name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for PathSoftReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_string(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stree_model::State;

    fn sid(n: u128) -> StateId {
        StateId::from_u128(n)
    }

    fn tree() -> StateTree {
        let mut tree = StateTree::new();
        tree.add_root(State::with_id(sid(1), "Root")).unwrap();
        tree.add_child(sid(1), State::with_id(sid(2), "Locomotion")).unwrap();
        tree.add_child(sid(2), State::with_id(sid(3), "Run")).unwrap();
        tree
    }

    #[test]
    fn display_path_joins_names() {
        let path = PathSoftReference::from_state(&tree(), sid(3)).unwrap();
        assert_eq!(path.to_string(), "Root/Locomotion/Run");
        assert_eq!(path.leaf_id(), Some(sid(3)));
        assert_eq!(path.leaf_name(), Some("Run"));
    }

    #[test]
    fn display_with_ids() {
        let path = PathSoftReference::from_state(&tree(), sid(1)).unwrap();
        assert_eq!(path.display_string(true), format!("Root[{}]", sid(1).short_id()));
    }

    #[test]
    fn missing_state_has_no_path() {
        assert!(PathSoftReference::from_state(&tree(), sid(9)).is_none());
    }

    #[test]
    fn resolves_in_same_tree() {
        let t = tree();
        let path = PathSoftReference::from_state(&t, sid(3)).unwrap();
        assert_eq!(path.resolve(&t), Some(sid(3)));
    }

    #[test]
    fn resolves_by_name_when_ids_differ() {
        let path = PathSoftReference::from_state(&tree(), sid(3)).unwrap();

        let mut other = StateTree::new();
        other.add_root(State::with_id(sid(11), "Root")).unwrap();
        other
            .add_child(sid(11), State::with_id(sid(12), "Locomotion"))
            .unwrap();
        other.add_child(sid(12), State::with_id(sid(13), "Run")).unwrap();

        assert_eq!(path.resolve(&other), Some(sid(13)));
    }

    #[test]
    fn resolves_by_id_after_rename() {
        let path = PathSoftReference::from_state(&tree(), sid(3)).unwrap();
        let mut renamed = tree();
        renamed.state_mut(sid(2)).unwrap().name = "Movement".into();
        assert_eq!(path.resolve(&renamed), Some(sid(3)));
    }

    #[test]
    fn resolution_stops_at_first_miss() {
        let path = PathSoftReference::from_state(&tree(), sid(3)).unwrap();
        let mut pruned = tree();
        pruned.remove_state(sid(2)).unwrap();
        assert_eq!(path.resolve(&pruned), None);
    }
}
