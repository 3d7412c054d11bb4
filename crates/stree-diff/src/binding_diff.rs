//! Property-binding reconciliation between two trees.
//!
//! Bindings are keyed by target path. Every target bound in either tree
//! becomes a candidate holding the A-side and B-side sources; candidates
//! whose sources differ are reported. A candidate is only reported when its
//! target's owning state resolves in both trees.

use std::collections::HashMap;

use tracing::debug;

use stree_model::{BindingCollection, EditorNode, State, StateTree};
use stree_types::{NodeId, PathSegment, PropertyPath};

use crate::entry::{DiffEntry, DiffKind};
use crate::path::PathSoftReference;

#[derive(Debug)]
struct Candidate<'a> {
    target: &'a PropertyPath,
    source_a: Option<&'a PropertyPath>,
    source_b: Option<&'a PropertyPath>,
}

/// Compute binding differences between tree `a` and tree `b`.
pub fn diff_bindings(a: &StateTree, b: &StateTree) -> Vec<DiffEntry> {
    let mut candidates: Vec<Candidate<'_>> = Vec::new();
    let mut by_target: HashMap<&PropertyPath, usize> = HashMap::new();

    for binding in a.bindings().bindings() {
        by_target.insert(&binding.target, candidates.len());
        candidates.push(Candidate {
            target: &binding.target,
            source_a: Some(&binding.source),
            source_b: None,
        });
    }

    for binding in b.bindings().bindings() {
        match by_target.get(&binding.target) {
            Some(&i) => candidates[i].source_b = Some(&binding.source),
            None => {
                by_target.insert(&binding.target, candidates.len());
                candidates.push(Candidate {
                    target: &binding.target,
                    source_a: None,
                    source_b: Some(&binding.source),
                });
            }
        }
    }

    let owners_a = a.owner_index();
    let owners_b = b.owner_index();

    let mut entries = Vec::new();
    for candidate in candidates {
        if candidate.source_a == candidate.source_b {
            continue;
        }

        let kind = match (candidate.source_a, candidate.source_b) {
            (None, _) => DiffKind::BindingAddedToB,
            (_, None) => DiffKind::BindingAddedToA,
            _ => DiffKind::BindingChanged,
        };

        let owner = candidate.target.owner;
        let (Some(&state_a), Some(_)) = (owners_a.get(&owner), owners_b.get(&owner)) else {
            debug!(
                binding_target = %candidate.target,
                ?kind,
                "binding owner not found in both trees; dropped"
            );
            continue;
        };
        let (Some(path), Some(state)) = (PathSoftReference::from_state(a, state_a), a.state(state_a))
        else {
            continue;
        };

        entries.push(DiffEntry::binding(
            kind,
            path,
            binding_path_for_target(state, candidate.target),
        ));
    }

    debug!(count = entries.len(), "binding diff complete");
    entries
}

/// Property path of `target` relative to `state`.
///
/// Searches the state's enter conditions, then tasks, then transitions,
/// then considerations for the struct that owns the target, and anchors the
/// target's segments below it: `[Tasks[i], Instance, ...segments]`. If no
/// container matches, only the target's own segments are returned.
pub fn binding_path_for_target(state: &State, target: &PropertyPath) -> Vec<PathSegment> {
    let owner = target.owner;
    let mut path = container_prefix(state, owner).unwrap_or_default();
    path.extend(target.segments.iter().cloned());
    path
}

fn container_prefix(state: &State, owner: NodeId) -> Option<Vec<PathSegment>> {
    if let Some(prefix) = node_prefix("EnterConditions", &state.enter_conditions, owner) {
        return Some(prefix);
    }
    if let Some(prefix) = node_prefix("Tasks", &state.tasks, owner) {
        return Some(prefix);
    }
    for (i, transition) in state.transitions.iter().enumerate() {
        if transition.id == owner {
            return Some(vec![PathSegment::indexed("Transitions", i)]);
        }
        if let Some(nested) = node_prefix("Conditions", &transition.conditions, owner) {
            let mut prefix = vec![PathSegment::indexed("Transitions", i)];
            prefix.extend(nested);
            return Some(prefix);
        }
    }
    node_prefix("Considerations", &state.considerations, owner)
}

fn node_prefix(container: &str, nodes: &[EditorNode], owner: NodeId) -> Option<Vec<PathSegment>> {
    let i = nodes.iter().position(|n| n.id == owner)?;
    let instance = if nodes[i].instance_object.is_some() {
        "InstanceObject"
    } else {
        "Instance"
    };
    Some(vec![
        PathSegment::indexed(container, i),
        PathSegment::new(instance),
    ])
}
