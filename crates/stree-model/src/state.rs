//! States and their authored payload.

use serde::{Deserialize, Serialize};

use stree_types::{NodeId, StateId};

use crate::node::{EditorNode, Transition};
use crate::value::PropertyBag;

/// Kind of state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateType {
    #[default]
    State,
    Group,
    Linked,
    LinkedAsset,
    Subtree,
}

/// How a state picks what to run when it is selected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionBehavior {
    None,
    TryEnterState,
    #[default]
    TrySelectChildrenInOrder,
    TrySelectChildrenAtRandom,
    TrySelectChildrenWithHighestUtility,
    TrySelectChildrenAtRandomWeightedByUtility,
    TryFollowTransitions,
}

/// Reference to an entry in the tree's editor color table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorRef(pub String);

/// A parameter bag with its own identity, so bindings can target it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateParameters {
    pub id: NodeId,
    #[serde(default)]
    pub bag: PropertyBag,
}

impl StateParameters {
    pub fn new(id: NodeId, bag: PropertyBag) -> Self {
        Self { id, bag }
    }
}

/// A state: identity, display name, payload and ordered children.
///
/// Children are owned by the [`StateTree`](crate::StateTree) arena; a state
/// only records their IDs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub color_ref: Option<ColorRef>,
    #[serde(default)]
    pub state_type: StateType,
    #[serde(default)]
    pub selection_behavior: SelectionBehavior,
    #[serde(default)]
    pub parameters: StateParameters,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub enter_conditions: Vec<EditorNode>,
    #[serde(default)]
    pub tasks: Vec<EditorNode>,
    #[serde(default)]
    pub considerations: Vec<EditorNode>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
    #[serde(default)]
    pub(crate) children: Vec<StateId>,
}

fn enabled_by_default() -> bool {
    true
}

impl State {
    /// A new enabled state with a fresh ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(StateId::new(), name)
    }

    /// A new enabled state with a caller-chosen ID.
    pub fn with_id(id: StateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tag: None,
            color_ref: None,
            state_type: StateType::State,
            selection_behavior: SelectionBehavior::TrySelectChildrenInOrder,
            parameters: StateParameters::new(NodeId::from(id), PropertyBag::new()),
            enabled: true,
            enter_conditions: Vec::new(),
            tasks: Vec::new(),
            considerations: Vec::new(),
            transitions: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_type(mut self, state_type: StateType) -> Self {
        self.state_type = state_type;
        self
    }

    pub fn with_selection(mut self, behavior: SelectionBehavior) -> Self {
        self.selection_behavior = behavior;
        self
    }

    pub fn with_parameters(mut self, bag: PropertyBag) -> Self {
        self.parameters.bag = bag;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_condition(mut self, condition: EditorNode) -> Self {
        self.enter_conditions.push(condition);
        self
    }

    pub fn with_task(mut self, task: EditorNode) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_consideration(mut self, consideration: EditorNode) -> Self {
        self.considerations.push(consideration);
        self
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// IDs of the child states, in order.
    pub fn children(&self) -> &[StateId] {
        &self.children
    }

    /// IDs of everything a binding can target on this state: the state
    /// itself, its parameters, and its editor nodes and transitions.
    pub fn owned_ids(&self) -> Vec<NodeId> {
        let mut ids = vec![NodeId::from(self.id), self.parameters.id];
        ids.extend(self.enter_conditions.iter().map(|n| n.id));
        ids.extend(self.tasks.iter().map(|n| n.id));
        ids.extend(self.considerations.iter().map(|n| n.id));
        for transition in &self.transitions {
            ids.push(transition.id);
            ids.extend(transition.conditions.iter().map(|c| c.id));
        }
        ids
    }

    /// Whether `id` names this state, its parameters, or any editor node or
    /// transition authored on it.
    pub fn owns(&self, id: NodeId) -> bool {
        NodeId::from(self.id) == id
            || self.parameters.id == id
            || self.enter_conditions.iter().any(|n| n.id == id)
            || self.tasks.iter().any(|n| n.id == id)
            || self.considerations.iter().any(|n| n.id == id)
            || self
                .transitions
                .iter()
                .any(|t| t.id == id || t.conditions.iter().any(|c| c.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{TransitionTarget, TransitionTrigger};
    use serde_json::json;

    #[test]
    fn new_state_defaults() {
        let state = State::new("Idle");
        assert!(state.enabled);
        assert_eq!(state.state_type, StateType::State);
        assert_eq!(
            state.selection_behavior,
            SelectionBehavior::TrySelectChildrenInOrder
        );
        assert!(state.children().is_empty());
    }

    #[test]
    fn owns_nested_ids() {
        let task = NodeId::from_u128(10);
        let transition = NodeId::from_u128(11);
        let transition_condition = NodeId::from_u128(12);
        let state = State::with_id(StateId::from_u128(1), "Run")
            .with_task(EditorNode::new(task, "MoveTo", json!({})))
            .with_transition(
                Transition::new(transition, TransitionTrigger::OnTick, TransitionTarget::Succeeded)
                    .with_condition(EditorNode::new(transition_condition, "IsDead", json!({}))),
            );

        assert!(state.owns(task));
        assert!(state.owns(transition));
        assert!(state.owns(transition_condition));
        assert!(state.owns(NodeId::from_u128(1)));
        assert!(!state.owns(NodeId::from_u128(99)));

        let owned = state.owned_ids();
        assert!(owned.contains(&task));
        assert!(owned.contains(&transition_condition));
        assert!(owned.iter().all(|id| state.owns(*id)));
    }

    #[test]
    fn state_deserializes_with_defaults() {
        let id = StateId::from_u128(3);
        let json = format!(r#"{{"id":"{id}","name":"Idle"}}"#);
        let state: State = serde_json::from_str(&json).unwrap();
        assert!(state.enabled);
        assert_eq!(state.name, "Idle");
        assert!(state.tasks.is_empty());
    }
}
