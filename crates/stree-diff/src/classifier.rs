//! Turns raw alignment results into report entries.
//!
//! A single pre-order walk over the alignment:
//!
//! - `OnlyInLeft` becomes `StateAddedToA`, `OnlyInRight` becomes
//!   `StateAddedToB`. Their subtrees are reported once, not per descendant.
//! - `Changed` becomes `StateChanged`; the walk continues into children.
//! - `Identical` is dropped unless the enabled flag differs, which becomes
//!   `StateEnabled` or `StateDisabled` according to the right side.
//!
//! A state that shows up once as A-only and once as B-only (same stable ID
//! under different parents) is a move: the second half upgrades the entry
//! emitted for the first half to `StateMoved`, which keeps the first half's
//! position in the report.

use std::collections::HashMap;

use tracing::debug;

use stree_model::StateTree;
use stree_types::StateId;

use crate::aligner::{AlignResult, TreeAligner, Visit};
use crate::entry::{DiffEntry, DiffKind};
use crate::equality::are_global_data_equal;
use crate::path::PathSoftReference;

/// Classify every aligned position of `aligner` into report entries.
///
/// Handles that no longer resolve in their tree are treated as absent: a
/// matched pair with one stale side is reported as one-sided, and a
/// position with both sides stale is skipped with its subtree.
pub fn classify_states<C>(
    aligner: &TreeAligner<StateTree, C>,
    left: &StateTree,
    right: &StateTree,
) -> Vec<DiffEntry>
where
    C: Fn(&StateTree, StateId, &StateTree, StateId) -> bool,
{
    let mut entries: Vec<DiffEntry> = Vec::new();
    // Stable ID -> index of the pending one-sided entry.
    let mut only_in_a: HashMap<StateId, usize> = HashMap::new();
    let mut only_in_b: HashMap<StateId, usize> = HashMap::new();
    let mut moves = 0usize;

    aligner.traverse(|node| {
        let left_state = node.left().and_then(|id| left.state(id));
        let right_state = node.right().and_then(|id| right.state(id));

        match (node.result(), left_state, right_state) {
            (AlignResult::Identical, Some(l), Some(r)) => {
                if l.enabled != r.enabled {
                    let kind = if r.enabled {
                        DiffKind::StateEnabled
                    } else {
                        DiffKind::StateDisabled
                    };
                    if let Some(path) = PathSoftReference::from_state(left, l.id) {
                        entries.push(DiffEntry::state(kind, path));
                    }
                }
                Visit::Continue
            }
            (AlignResult::Changed, Some(l), Some(_)) => {
                if let Some(path) = PathSoftReference::from_state(left, l.id) {
                    entries.push(DiffEntry::state(DiffKind::StateChanged, path));
                }
                Visit::Continue
            }
            (_, Some(l), None) => {
                let Some(path) = PathSoftReference::from_state(left, l.id) else {
                    return Visit::SkipChildren;
                };
                match only_in_b.remove(&l.id) {
                    Some(i) => {
                        let entry = &mut entries[i];
                        entry.secondary_identifier = entry.identifier.replace(path);
                        entry.kind = DiffKind::StateMoved;
                        moves += 1;
                    }
                    None => {
                        only_in_a.insert(l.id, entries.len());
                        entries.push(DiffEntry::state(DiffKind::StateAddedToA, path));
                    }
                }
                Visit::SkipChildren
            }
            (_, None, Some(r)) => {
                let Some(path) = PathSoftReference::from_state(right, r.id) else {
                    return Visit::SkipChildren;
                };
                match only_in_a.remove(&r.id) {
                    Some(i) => {
                        let entry = &mut entries[i];
                        entry.secondary_identifier = Some(path);
                        entry.kind = DiffKind::StateMoved;
                        moves += 1;
                    }
                    None => {
                        only_in_b.insert(r.id, entries.len());
                        entries.push(DiffEntry::state(DiffKind::StateAddedToB, path));
                    }
                }
                Visit::SkipChildren
            }
            _ => Visit::SkipChildren,
        }
    });

    debug!(entries = entries.len(), moves, "classified state differences");
    entries
}

/// The tree-level entry, if the two trees' global data differ.
pub fn global_properties_entry(left: &StateTree, right: &StateTree) -> Option<DiffEntry> {
    (!are_global_data_equal(left, right)).then(DiffEntry::global)
}
