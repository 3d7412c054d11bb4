//! Editor nodes (tasks, conditions, considerations, evaluators) and
//! transitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use stree_types::{NodeId, StateId};

/// A typed struct instance: the concrete type path plus its field values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstancedValue {
    pub type_name: String,
    #[serde(default)]
    pub value: Value,
}

impl InstancedValue {
    pub fn new(type_name: impl Into<String>, value: Value) -> Self {
        Self {
            type_name: type_name.into(),
            value,
        }
    }

    /// An instance without a concrete type is treated as absent.
    pub fn is_valid(&self) -> bool {
        !self.type_name.is_empty()
    }
}

/// How a condition combines with the expression to its left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpressionOperand {
    /// First operand of an expression.
    #[default]
    Copy,
    And,
    Or,
}

/// A task, condition, consideration or evaluator as authored in the editor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditorNode {
    pub id: NodeId,
    /// The node struct itself.
    #[serde(default)]
    pub node: Option<InstancedValue>,
    /// Struct instance data.
    #[serde(default)]
    pub instance: Option<InstancedValue>,
    /// Object instance data, used instead of `instance` by object-based nodes.
    #[serde(default)]
    pub instance_object: Option<InstancedValue>,
    #[serde(default)]
    pub expression_indent: u8,
    #[serde(default)]
    pub expression_operand: ExpressionOperand,
}

impl EditorNode {
    /// A node of the given type with struct instance data.
    pub fn new(id: NodeId, type_name: impl Into<String>, instance: Value) -> Self {
        let type_name = type_name.into();
        Self {
            id,
            node: Some(InstancedValue::new(type_name.clone(), Value::Null)),
            instance: Some(InstancedValue::new(
                format!("{type_name}InstanceData"),
                instance,
            )),
            instance_object: None,
            expression_indent: 0,
            expression_operand: ExpressionOperand::Copy,
        }
    }

    /// A node whose instance data is an object rather than a struct.
    pub fn with_instance_object(id: NodeId, type_name: impl Into<String>, object: Value) -> Self {
        let type_name = type_name.into();
        Self {
            id,
            node: Some(InstancedValue::new(type_name.clone(), Value::Null)),
            instance: None,
            instance_object: Some(InstancedValue::new(format!("{type_name}Object"), object)),
            expression_indent: 0,
            expression_operand: ExpressionOperand::Copy,
        }
    }

    pub fn with_operand(mut self, operand: ExpressionOperand, indent: u8) -> Self {
        self.expression_operand = operand;
        self.expression_indent = indent;
        self
    }

    /// Name of the node's type, if it has one.
    pub fn type_name(&self) -> Option<&str> {
        self.node
            .as_ref()
            .filter(|n| n.is_valid())
            .map(|n| n.type_name.as_str())
    }
}

/// Event that makes a transition fire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionTrigger {
    #[default]
    OnStateCompleted,
    OnStateSucceeded,
    OnStateFailed,
    OnTick,
    OnEvent,
}

/// Where a transition leads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionTarget {
    #[default]
    None,
    Succeeded,
    Failed,
    NextState,
    NextSelectableState,
    GotoState(StateId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionPriority {
    Low,
    #[default]
    Normal,
    Medium,
    High,
    Critical,
}

/// Delay before a triggered transition is taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionDelay {
    pub duration: f32,
    #[serde(default)]
    pub random_variance: f32,
}

/// A transition authored on a state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub id: NodeId,
    #[serde(default)]
    pub trigger: TransitionTrigger,
    #[serde(default)]
    pub required_event: Option<String>,
    #[serde(default)]
    pub target: TransitionTarget,
    #[serde(default)]
    pub priority: TransitionPriority,
    #[serde(default)]
    pub delay: Option<TransitionDelay>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub conditions: Vec<EditorNode>,
}

fn enabled_by_default() -> bool {
    true
}

impl Transition {
    pub fn new(id: NodeId, trigger: TransitionTrigger, target: TransitionTarget) -> Self {
        Self {
            id,
            trigger,
            required_event: None,
            target,
            priority: TransitionPriority::Normal,
            delay: None,
            enabled: true,
            conditions: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: EditorNode) -> Self {
        self.conditions.push(condition);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_node_has_struct_instance() {
        let node = EditorNode::new(NodeId::from_u128(1), "DelayTask", json!({"Duration": 1.0}));
        assert_eq!(node.type_name(), Some("DelayTask"));
        assert!(node.instance.is_some());
        assert!(node.instance_object.is_none());
    }

    #[test]
    fn object_node_has_object_instance() {
        let node = EditorNode::with_instance_object(NodeId::from_u128(1), "BPTask", json!({}));
        assert!(node.instance.is_none());
        assert!(node.instance_object.is_some());
    }

    #[test]
    fn untyped_instance_is_invalid() {
        let value = InstancedValue::new("", Value::Null);
        assert!(!value.is_valid());
    }

    #[test]
    fn transition_deserializes_with_defaults() {
        let id = NodeId::from_u128(9);
        let json = format!(r#"{{"id":"{id}"}}"#);
        let t: Transition = serde_json::from_str(&json).unwrap();
        assert!(t.enabled);
        assert_eq!(t.trigger, TransitionTrigger::OnStateCompleted);
        assert_eq!(t.target, TransitionTarget::None);
        assert!(t.conditions.is_empty());
    }
}
