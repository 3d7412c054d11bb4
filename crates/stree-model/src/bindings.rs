//! Property bindings: data-flow edges from a source property to a target
//! property, keyed by target.

use serde::{Deserialize, Serialize};

use stree_types::PropertyPath;

use crate::error::{ModelError, ModelResult};
use crate::traits::BindingCollection;

/// One binding: `target` receives the value of `source`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub source: PropertyPath,
    pub target: PropertyPath,
}

impl Binding {
    pub fn new(source: PropertyPath, target: PropertyPath) -> Self {
        Self { source, target }
    }
}

/// A tree's binding collection. Each target path appears at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBindings {
    bindings: Vec<Binding>,
}

impl PropertyBindings {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, rejecting duplicate targets.
    pub fn from_bindings(bindings: Vec<Binding>) -> ModelResult<Self> {
        let mut collection = Self::new();
        for binding in bindings {
            if collection.has_binding(&binding.target) {
                return Err(ModelError::DuplicateBindingTarget(binding.target));
            }
            collection.bindings.push(binding);
        }
        Ok(collection)
    }

    /// Bind `target` to `source`, replacing any existing binding for the
    /// same target. Returns the previous source, if any.
    pub fn add_binding(
        &mut self,
        source: PropertyPath,
        target: PropertyPath,
    ) -> Option<PropertyPath> {
        match self.bindings.iter_mut().find(|b| b.target == target) {
            Some(existing) => Some(std::mem::replace(&mut existing.source, source)),
            None => {
                self.bindings.push(Binding::new(source, target));
                None
            }
        }
    }

    /// Remove the binding for `target`. Returns `true` if one existed.
    pub fn remove_binding(&mut self, target: &PropertyPath) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| &b.target != target);
        self.bindings.len() != before
    }

    /// Keep only the bindings for which `keep` returns `true`.
    pub fn retain(&mut self, keep: impl FnMut(&Binding) -> bool) {
        self.bindings.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }
}

impl BindingCollection for PropertyBindings {
    fn bindings(&self) -> Vec<&Binding> {
        self.bindings.iter().collect()
    }

    fn has_binding(&self, target: &PropertyPath) -> bool {
        self.bindings.iter().any(|b| &b.target == target)
    }

    fn binding_source(&self, target: &PropertyPath) -> Option<&PropertyPath> {
        self.bindings
            .iter()
            .find(|b| &b.target == target)
            .map(|b| &b.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stree_types::NodeId;

    fn path(owner: u128, text: &str) -> PropertyPath {
        PropertyPath::parse(NodeId::from_u128(owner), text).unwrap()
    }

    #[test]
    fn add_and_query() {
        let mut bindings = PropertyBindings::new();
        assert!(bindings.add_binding(path(1, "Out"), path(2, "In")).is_none());
        assert!(bindings.has_binding(&path(2, "In")));
        assert_eq!(bindings.binding_source(&path(2, "In")), Some(&path(1, "Out")));
        assert!(!bindings.has_binding(&path(2, "Other")));
    }

    #[test]
    fn add_replaces_same_target() {
        let mut bindings = PropertyBindings::new();
        bindings.add_binding(path(1, "Out"), path(2, "In"));
        let previous = bindings.add_binding(path(3, "Out"), path(2, "In"));
        assert_eq!(previous, Some(path(1, "Out")));
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.binding_source(&path(2, "In")), Some(&path(3, "Out")));
    }

    #[test]
    fn remove_binding() {
        let mut bindings = PropertyBindings::new();
        bindings.add_binding(path(1, "Out"), path(2, "In"));
        assert!(bindings.remove_binding(&path(2, "In")));
        assert!(!bindings.remove_binding(&path(2, "In")));
        assert!(bindings.is_empty());
    }

    #[test]
    fn from_bindings_rejects_duplicate_targets() {
        let result = PropertyBindings::from_bindings(vec![
            Binding::new(path(1, "A"), path(2, "In")),
            Binding::new(path(1, "B"), path(2, "In")),
        ]);
        assert!(matches!(result, Err(ModelError::DuplicateBindingTarget(_))));
    }
}
