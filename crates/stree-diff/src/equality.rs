//! Deep value equality over state payloads.
//!
//! Identity fields (state, node and transition IDs) are ignored; everything
//! a user can observe is compared. All list comparisons are positional: the
//! same elements in a different order are not equal. Every check
//! short-circuits on the first mismatch and runs in time linear in the size
//! of the payload.

use std::collections::BTreeMap;

use stree_model::{
    BindingCollection, EditorNode, InstancedValue, PropertyBag, State, StateTree, Transition,
};
use stree_types::PropertyPath;

/// Compare two optional states. If either side is absent the result is
/// whether both are absent.
pub fn are_values_equal(a: Option<&State>, b: Option<&State>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => are_states_equal(a, b),
        (a, b) => a.is_none() && b.is_none(),
    }
}

/// Deep comparison of two states' payloads.
///
/// The enabled flag is deliberately not part of this comparison; the
/// classifier reports it separately.
pub fn are_states_equal(a: &State, b: &State) -> bool {
    a.name == b.name
        && a.tag == b.tag
        && a.color_ref == b.color_ref
        && a.state_type == b.state_type
        && a.selection_behavior == b.selection_behavior
        && are_property_bags_equal(&a.parameters.bag, &b.parameters.bag)
        && are_node_lists_equal(&a.enter_conditions, &b.enter_conditions)
        && are_node_lists_equal(&a.tasks, &b.tasks)
        && are_transition_lists_equal(&a.transitions, &b.transitions)
        && are_node_lists_equal(&a.considerations, &b.considerations)
}

/// Element-wise comparison of two editor-node lists.
pub fn are_node_lists_equal(a: &[EditorNode], b: &[EditorNode]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| are_nodes_equal(x, y))
}

/// Two editor nodes are equal when their node struct, instance data and
/// expression layout match.
pub fn are_nodes_equal(a: &EditorNode, b: &EditorNode) -> bool {
    are_instances_equal(a.node.as_ref(), b.node.as_ref())
        && are_instances_equal(a.instance.as_ref(), b.instance.as_ref())
        && are_instances_equal(a.instance_object.as_ref(), b.instance_object.as_ref())
        && a.expression_indent == b.expression_indent
        && a.expression_operand == b.expression_operand
}

/// An instance without a concrete type counts as absent.
fn are_instances_equal(a: Option<&InstancedValue>, b: Option<&InstancedValue>) -> bool {
    let a = a.filter(|v| v.is_valid());
    let b = b.filter(|v| v.is_valid());
    match (a, b) {
        (Some(a), Some(b)) => a.type_name == b.type_name && a.value == b.value,
        (a, b) => a.is_none() && b.is_none(),
    }
}

fn are_transition_lists_equal(a: &[Transition], b: &[Transition]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| are_transitions_equal(x, y))
}

/// Compare every field of two transitions except their IDs.
pub fn are_transitions_equal(a: &Transition, b: &Transition) -> bool {
    a.trigger == b.trigger
        && a.required_event == b.required_event
        && a.target == b.target
        && a.priority == b.priority
        && a.delay == b.delay
        && a.enabled == b.enabled
        && are_node_lists_equal(&a.conditions, &b.conditions)
}

/// Compare two property bags by descriptor and canonical value text.
///
/// Fails closed: a descriptor mismatch, a missing value, or a value that
/// cannot be exported makes the bags unequal.
pub fn are_property_bags_equal(a: &PropertyBag, b: &PropertyBag) -> bool {
    if a.len() != b.len() {
        return false;
    }

    for (desc_a, desc_b) in a.descs().iter().zip(b.descs()) {
        if desc_a.name != desc_b.name || !desc_a.value_type.is_compatible_with(&desc_b.value_type)
        {
            return false;
        }

        let (Some(value_a), Some(value_b)) = (a.value(&desc_a.name), b.value(&desc_b.name)) else {
            return false;
        };

        match (value_a.export_text(), value_b.export_text()) {
            (Ok(text_a), Ok(text_b)) if text_a == text_b => {}
            _ => return false,
        }
    }

    true
}

/// Compare the tree-level data of two trees: schema, root parameters,
/// evaluators, global tasks, and the bindings that target something other
/// than a state.
///
/// This never descends into states.
pub fn are_global_data_equal(a: &StateTree, b: &StateTree) -> bool {
    a.schema == b.schema
        && are_property_bags_equal(&a.parameters.bag, &b.parameters.bag)
        && are_node_lists_equal(&a.evaluators, &b.evaluators)
        && are_node_lists_equal(&a.global_tasks, &b.global_tasks)
        && global_binding_summary(a) == global_binding_summary(b)
}

/// Target -> source map of bindings whose target is a tree-level struct
/// (root parameters, evaluators, global tasks).
fn global_binding_summary(tree: &StateTree) -> BTreeMap<&PropertyPath, &PropertyPath> {
    tree.bindings()
        .bindings()
        .into_iter()
        .filter(|binding| tree.is_global_owner(binding.target.owner))
        .map(|binding| (&binding.target, &binding.source))
        .collect()
}
