//! The StateTree asset: global data, bindings and an arena of states.
//!
//! States live in a [`BTreeMap`] keyed by [`StateId`]; the hierarchy is
//! recorded by each state's ordered child list plus the ordered root list.
//! A reverse index (`parents`) is rebuilt on load and maintained on every
//! mutation.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use stree_types::{NodeId, StateId};

use crate::bindings::PropertyBindings;
use crate::error::{ModelError, ModelResult};
use crate::node::EditorNode;
use crate::state::{State, StateParameters};
use crate::traits::{ForestProvider, StatePayload};

/// A hierarchical state machine asset as edited by the host.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateTree {
    /// Schema the tree is authored against.
    #[serde(default)]
    pub schema: Option<String>,
    /// Root-level parameters.
    #[serde(default)]
    pub parameters: StateParameters,
    #[serde(default)]
    pub evaluators: Vec<EditorNode>,
    #[serde(default)]
    pub global_tasks: Vec<EditorNode>,
    #[serde(default)]
    bindings: PropertyBindings,
    #[serde(default)]
    roots: Vec<StateId>,
    #[serde(default)]
    states: BTreeMap<StateId, State>,
    #[serde(skip)]
    parents: HashMap<StateId, StateId>,
    #[serde(skip)]
    revision: u64,
}

impl StateTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a tree from its JSON snapshot, validating the hierarchy.
    pub fn from_json(text: &str) -> ModelResult<Self> {
        let mut tree: StateTree =
            serde_json::from_str(text).map_err(|e| ModelError::Serialization(e.to_string()))?;
        tree.rebuild_index()?;
        Ok(tree)
    }

    /// Pretty-printed JSON snapshot.
    pub fn to_json_pretty(&self) -> ModelResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ModelError::Serialization(e.to_string()))
    }

    /// Monotonic counter bumped by every state mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Total number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if the tree has no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn roots(&self) -> &[StateId] {
        &self.roots
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(&id)
    }

    /// Mutable access to a state's payload. Counts as a content change.
    pub fn state_mut(&mut self, id: StateId) -> Option<&mut State> {
        let state = self.states.get_mut(&id)?;
        self.revision += 1;
        Some(state)
    }

    /// Child IDs of `id`, or an empty slice if `id` is unknown.
    pub fn children_of(&self, id: StateId) -> &[StateId] {
        self.states
            .get(&id)
            .map(|s| s.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: StateId) -> Option<StateId> {
        self.parents.get(&id).copied()
    }

    pub fn bindings(&self) -> &PropertyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut PropertyBindings {
        &mut self.bindings
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Append a new root state.
    pub fn add_root(&mut self, state: State) -> ModelResult<StateId> {
        let id = self.insert_state(state)?;
        self.roots.push(id);
        Ok(id)
    }

    /// Append a new state as the last child of `parent`.
    pub fn add_child(&mut self, parent: StateId, state: State) -> ModelResult<StateId> {
        if !self.states.contains_key(&parent) {
            return Err(ModelError::StateNotFound(parent));
        }
        let id = self.insert_state(state)?;
        self.attach(id, Some(parent), usize::MAX);
        Ok(id)
    }

    /// Remove a state and its whole subtree. Returns the removed states in
    /// pre-order. Bindings whose target is owned by a removed state are
    /// dropped with it.
    pub fn remove_state(&mut self, id: StateId) -> ModelResult<Vec<State>> {
        if !self.states.contains_key(&id) {
            return Err(ModelError::StateNotFound(id));
        }
        self.detach(id);

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            self.parents.remove(&current);
            if let Some(state) = self.states.remove(&current) {
                stack.extend(state.children.iter().rev().copied());
                removed.push(state);
            }
        }

        let owned: HashSet<NodeId> = removed.iter().flat_map(State::owned_ids).collect();
        let bindings_before = self.bindings.len();
        self.bindings.retain(|b| !owned.contains(&b.target.owner));

        self.revision += 1;
        debug!(
            state = %id.short_id(),
            removed = removed.len(),
            bindings_dropped = bindings_before - self.bindings.len(),
            "removed subtree"
        );
        Ok(removed)
    }

    /// Re-parent `id` under `new_parent` (or make it a root when `None`),
    /// inserting it at `index` among its new siblings. Indices past the end
    /// append.
    pub fn move_state(
        &mut self,
        id: StateId,
        new_parent: Option<StateId>,
        index: usize,
    ) -> ModelResult<()> {
        if !self.states.contains_key(&id) {
            return Err(ModelError::StateNotFound(id));
        }
        if let Some(parent) = new_parent {
            if !self.states.contains_key(&parent) {
                return Err(ModelError::StateNotFound(parent));
            }
            let mut cursor = Some(parent);
            while let Some(current) = cursor {
                if current == id {
                    return Err(ModelError::CycleDetected { state: id, parent });
                }
                cursor = self.parent(current);
            }
        }

        self.detach(id);
        self.attach(id, new_parent, index);
        self.revision += 1;
        debug!(state = %id.short_id(), index, "moved state");
        Ok(())
    }

    fn insert_state(&mut self, mut state: State) -> ModelResult<StateId> {
        let id = state.id;
        if self.states.contains_key(&id) {
            return Err(ModelError::DuplicateState(id));
        }
        state.children.clear();
        self.states.insert(id, state);
        self.revision += 1;
        Ok(id)
    }

    fn attach(&mut self, id: StateId, parent: Option<StateId>, index: usize) {
        let siblings = match parent {
            Some(p) => match self.states.get_mut(&p) {
                Some(state) => &mut state.children,
                None => return,
            },
            None => &mut self.roots,
        };
        let index = index.min(siblings.len());
        siblings.insert(index, id);
        match parent {
            Some(p) => {
                self.parents.insert(id, p);
            }
            None => {
                self.parents.remove(&id);
            }
        }
    }

    fn detach(&mut self, id: StateId) {
        match self.parents.get(&id).copied() {
            Some(parent) => {
                if let Some(state) = self.states.get_mut(&parent) {
                    state.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// IDs from a root down to `id`, inclusive. `None` if `id` is unknown.
    pub fn ancestry(&self, id: StateId) -> Option<Vec<StateId>> {
        if !self.states.contains_key(&id) {
            return None;
        }
        let mut chain = vec![id];
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            chain.push(parent);
            cursor = self.parent(parent);
        }
        chain.reverse();
        Some(chain)
    }

    /// All states in pre-order (parents before children, siblings in
    /// order).
    pub fn iter_preorder(&self) -> Vec<&State> {
        let mut out = Vec::with_capacity(self.states.len());
        let mut stack: Vec<StateId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(state) = self.states.get(&id) {
                stack.extend(state.children.iter().rev().copied());
                out.push(state);
            }
        }
        out
    }

    /// The state that owns the struct identified by `owner`: the state
    /// itself, its parameters, or one of its editor nodes or transitions.
    /// Returns `None` for tree-level owners (root parameters, evaluators,
    /// global tasks) and for unknown IDs.
    ///
    /// Scans every state; use [`owner_index`](Self::owner_index) when
    /// resolving many owners.
    pub fn find_owning_state(&self, owner: NodeId) -> Option<StateId> {
        self.iter_preorder()
            .into_iter()
            .find(|state| state.owns(owner))
            .map(|state| state.id)
    }

    /// Map from every struct ID owned by a state to that state's ID.
    pub fn owner_index(&self) -> HashMap<NodeId, StateId> {
        let mut index = HashMap::new();
        for state in self.iter_preorder() {
            for owned in state.owned_ids() {
                index.entry(owned).or_insert(state.id);
            }
        }
        index
    }

    /// Whether `owner` names one of the tree-level structs.
    pub fn is_global_owner(&self, owner: NodeId) -> bool {
        self.parameters.id == owner
            || self.evaluators.iter().any(|n| n.id == owner)
            || self.global_tasks.iter().any(|n| n.id == owner)
    }

    fn rebuild_index(&mut self) -> ModelResult<()> {
        self.parents.clear();

        for (key, state) in &self.states {
            if *key != state.id {
                return Err(ModelError::Serialization(format!(
                    "state stored under {key} has id {}",
                    state.id
                )));
            }
            for child in &state.children {
                if !self.states.contains_key(child) {
                    return Err(ModelError::StateNotFound(*child));
                }
                if self.parents.insert(*child, state.id).is_some() {
                    return Err(ModelError::MultipleParents(*child));
                }
            }
        }

        let mut seen_roots = HashSet::with_capacity(self.roots.len());
        for root in &self.roots {
            if !self.states.contains_key(root) {
                return Err(ModelError::StateNotFound(*root));
            }
            if self.parents.contains_key(root) || !seen_roots.insert(*root) {
                return Err(ModelError::MultipleParents(*root));
            }
        }

        let reachable = self.iter_preorder().len();
        if reachable < self.states.len() {
            return Err(ModelError::Serialization(format!(
                "{} states are not reachable from any root",
                self.states.len() - reachable
            )));
        }

        let mut targets = HashSet::with_capacity(self.bindings.len());
        for binding in self.bindings.iter() {
            if !targets.insert(&binding.target) {
                return Err(ModelError::DuplicateBindingTarget(binding.target.clone()));
            }
        }
        Ok(())
    }
}

impl ForestProvider for StateTree {
    type Handle = StateId;
    type Key = StateId;

    fn revision(&self) -> u64 {
        self.revision
    }

    fn root_nodes(&self) -> Vec<StateId> {
        self.roots.clone()
    }

    fn children(&self, node: StateId) -> Vec<StateId> {
        self.children_of(node).to_vec()
    }

    fn stable_id(&self, node: StateId) -> Option<StateId> {
        self.states.contains_key(&node).then_some(node)
    }
}

impl StatePayload for StateTree {
    fn state_payload(&self, node: StateId) -> Option<&State> {
        self.states.get(&node)
    }
}
