//! Diff session over two state trees.

use tracing::{debug, info};

use stree_model::{StatePayload, StateTree};
use stree_types::StateId;

use crate::aligner::{AlignerState, TreeAligner};
use crate::binding_diff::diff_bindings;
use crate::classifier::{classify_states, global_properties_entry};
use crate::config::DiffConfig;
use crate::entry::{DiffEntry, DiffSummary};
use crate::equality::are_values_equal;

/// Comparator signature used to align state trees.
pub type StateComparator = fn(&StateTree, StateId, &StateTree, StateId) -> bool;

/// Aligner over two [`StateTree`]s, comparing matched states by value.
pub type StateTreeAligner = TreeAligner<StateTree, StateComparator>;

fn compare_states(left: &StateTree, a: StateId, right: &StateTree, b: StateId) -> bool {
    are_values_equal(left.state_payload(a), right.state_payload(b))
}

/// A fresh, dirty aligner using state value equality.
pub fn state_tree_aligner() -> StateTreeAligner {
    TreeAligner::new(compare_states as StateComparator)
}

/// Long-lived comparison between a left (A) and a right (B) tree.
///
/// Alignment can be advanced in bounded steps with [`tick`](Self::tick)
/// while the caller keeps editing either tree; edits are picked up by
/// revision and restart the alignment. [`report`](Self::report) assembles
/// the entries once the alignment is clean.
#[derive(Debug)]
pub struct StateTreeDiffer {
    config: DiffConfig,
    aligner: StateTreeAligner,
}

impl StateTreeDiffer {
    pub fn new(config: DiffConfig) -> Self {
        Self {
            config,
            aligner: state_tree_aligner(),
        }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    pub fn aligner(&self) -> &StateTreeAligner {
        &self.aligner
    }

    /// Run one alignment slice. A slice stops once `slice_budget` nodes
    /// have been processed; a sibling level is never split, so the last
    /// level may overshoot the budget.
    pub fn tick(&mut self, left: &StateTree, right: &StateTree) -> AlignerState {
        self.aligner.process_slice(left, right, self.config.slice_budget)
    }

    /// Finish alignment and return the full report.
    pub fn flush(&mut self, left: &StateTree, right: &StateTree) -> Vec<DiffEntry> {
        self.aligner.flush(left, right);
        assemble(&self.aligner, left, right, &self.config)
    }

    /// The report, if alignment is clean for the trees' current revisions.
    pub fn report(&self, left: &StateTree, right: &StateTree) -> Option<Vec<DiffEntry>> {
        self.aligner
            .is_clean_for(left, right)
            .then(|| assemble(&self.aligner, left, right, &self.config))
    }

    /// Discard the alignment; the next tick starts over.
    pub fn mark_dirty(&mut self) {
        self.aligner.mark_dirty();
    }
}

/// One-shot diff of `left` (A) against `right` (B).
pub fn diff_state_trees(left: &StateTree, right: &StateTree, config: &DiffConfig) -> Vec<DiffEntry> {
    let mut differ = StateTreeDiffer::new(config.clone());
    differ.flush(left, right)
}

/// Report order: the tree-level entry, state entries in pre-order, then
/// binding entries.
fn assemble(
    aligner: &StateTreeAligner,
    left: &StateTree,
    right: &StateTree,
    config: &DiffConfig,
) -> Vec<DiffEntry> {
    let mut entries = Vec::new();

    if config.report_global_changes {
        entries.extend(global_properties_entry(left, right));
    }
    entries.extend(classify_states(aligner, left, right));
    if config.report_bindings {
        entries.extend(diff_bindings(left, right));
    }

    let summary = DiffSummary::from_entries(&entries);
    info!(entries = summary.total(), "state tree diff complete");
    for (kind, count) in summary.iter() {
        debug!(?kind, count, "diff entries by kind");
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::DiffKind;
    use crate::path::PathSoftReference;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashSet;
    use stree_model::{EditorNode, State};
    use stree_types::{NodeId, PropertyPath};

    fn sid(n: u128) -> StateId {
        StateId::from_u128(n)
    }

    fn path(owner: u128, text: &str) -> PropertyPath {
        PropertyPath::parse(NodeId::from_u128(owner), text).unwrap()
    }

    fn tree(idle_enabled: bool) -> StateTree {
        let mut tree = StateTree::new();
        tree.add_root(State::with_id(sid(100), "Root")).unwrap();
        tree.add_child(
            sid(100),
            State::with_id(sid(1), "Idle")
                .with_enabled(idle_enabled)
                .with_task(EditorNode::new(
                    NodeId::from_u128(10),
                    "Wait",
                    json!({ "Duration": 1.0 }),
                )),
        )
        .unwrap();
        tree.add_child(sid(100), State::with_id(sid(2), "Run")).unwrap();
        tree
    }

    fn kinds(entries: &[DiffEntry]) -> Vec<DiffKind> {
        entries.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn identical_trees_report_nothing() {
        let entries = diff_state_trees(&tree(true), &tree(true), &DiffConfig::default());
        assert!(entries.is_empty());
    }

    #[test]
    fn disabling_a_state_reports_one_entry() {
        let entries = diff_state_trees(&tree(true), &tree(false), &DiffConfig::default());
        assert_eq!(kinds(&entries), [DiffKind::StateDisabled]);
        assert_eq!(entries[0].identifier.as_ref().unwrap().to_string(), "Root/Idle");
    }

    #[test]
    fn report_order_is_global_states_bindings() {
        let left = tree(true);
        let mut right = tree(false);
        right.schema = Some("/Script/Schema".into());
        right
            .bindings_mut()
            .add_binding(path(100, "Speed"), path(10, "Duration"));

        let entries = diff_state_trees(&left, &right, &DiffConfig::default());
        assert_eq!(
            kinds(&entries),
            [
                DiffKind::StateTreePropertiesChanged,
                DiffKind::StateDisabled,
                DiffKind::BindingAddedToB,
            ]
        );
    }

    #[test]
    fn config_toggles_suppress_sections() {
        let left = tree(true);
        let mut right = tree(false);
        right.schema = Some("/Script/Schema".into());
        right
            .bindings_mut()
            .add_binding(path(100, "Speed"), path(10, "Duration"));

        let config = DiffConfig {
            report_global_changes: false,
            report_bindings: false,
            ..DiffConfig::default()
        };
        let entries = diff_state_trees(&left, &right, &config);
        assert_eq!(kinds(&entries), [DiffKind::StateDisabled]);
    }

    #[test]
    fn ticks_converge_to_flush() {
        let left = tree(true);
        let right = tree(false);
        let config = DiffConfig {
            slice_budget: 1,
            ..DiffConfig::default()
        };

        let mut differ = StateTreeDiffer::new(config.clone());
        assert!(differ.report(&left, &right).is_none());

        let mut ticks = 0;
        while differ.tick(&left, &right) != AlignerState::Clean {
            ticks += 1;
            assert!(ticks < 16, "alignment did not converge");
        }
        assert!(ticks > 0);

        let reported = differ.report(&left, &right).unwrap();
        assert_eq!(reported, diff_state_trees(&left, &right, &config));
    }

    #[test]
    fn edits_invalidate_the_report() {
        let left = tree(true);
        let mut right = tree(true);
        let mut differ = StateTreeDiffer::new(DiffConfig::default());
        assert!(differ.flush(&left, &right).is_empty());
        assert!(differ.report(&left, &right).is_some());

        right.state_mut(sid(2)).unwrap().enabled = false;
        assert!(differ.report(&left, &right).is_none());

        let entries = differ.flush(&left, &right);
        assert_eq!(kinds(&entries), [DiffKind::StateDisabled]);
        assert_eq!(entries[0].identifier.as_ref().unwrap().to_string(), "Root/Run");
    }

    #[test]
    fn mark_dirty_requires_new_alignment() {
        let left = tree(true);
        let right = tree(true);
        let mut differ = StateTreeDiffer::new(DiffConfig::default());
        differ.flush(&left, &right);
        differ.mark_dirty();
        assert!(differ.report(&left, &right).is_none());
        assert_eq!(differ.tick(&left, &right), AlignerState::Clean);
        assert!(differ.report(&left, &right).is_some());
    }

    #[test]
    fn removing_a_bound_state_is_not_a_global_change() {
        let mut left = tree(true);
        let source = PropertyPath::new(left.parameters.id, Vec::new());
        left.bindings_mut().add_binding(source, path(10, "Duration"));
        let mut right = left.clone();
        right.remove_state(sid(1)).unwrap();

        let entries = diff_state_trees(&left, &right, &DiffConfig::default());
        assert_eq!(kinds(&entries), [DiffKind::StateAddedToA]);
        assert_eq!(entries[0].identifier.as_ref().unwrap().to_string(), "Root/Idle");
    }

    /// `(parent selector, enabled, duration)` per state. State `i` hangs
    /// under state `selector % (i + 1)`, or becomes a root when that is
    /// `i` itself.
    fn forest(specs: &[(usize, bool, u8)]) -> StateTree {
        let mut tree = StateTree::new();
        for (i, (selector, enabled, duration)) in specs.iter().enumerate() {
            let state = State::with_id(sid(i as u128 + 1), format!("S{}", i % 3))
                .with_enabled(*enabled)
                .with_task(EditorNode::new(
                    NodeId::from_u128(1000 + i as u128),
                    "Wait",
                    json!({ "Duration": duration }),
                ));
            let parent = selector % (i + 1);
            if parent == i {
                tree.add_root(state).unwrap();
            } else {
                tree.add_child(sid(parent as u128 + 1), state).unwrap();
            }
        }
        tree
    }

    /// Applies `(op, a, b)` edits; edits the model rejects are skipped.
    fn edit(tree: &mut StateTree, edits: &[(u8, usize, usize)], count: usize) {
        for (op, a, b) in edits {
            let index = (a % count) as u128;
            let a = sid(index + 1);
            let b = sid((b % count) as u128 + 1);
            let task = NodeId::from_u128(1000 + index);
            match op % 6 {
                0 => {
                    if let Some(state) = tree.state_mut(a) {
                        state.enabled = !state.enabled;
                    }
                }
                1 => {
                    if let Some(state) = tree.state_mut(a) {
                        state.tasks = vec![EditorNode::new(task, "Wait", json!({ "Duration": 99 }))];
                    }
                }
                2 => {
                    if let Some(state) = tree.state_mut(a) {
                        state.name.push('x');
                    }
                }
                3 => {
                    let _ = tree.move_state(a, Some(b), 0);
                }
                4 => {
                    let _ = tree.remove_state(a);
                }
                _ => {
                    if tree.contains(a) {
                        let source = PropertyPath::new(tree.parameters.id, Vec::new());
                        let target = PropertyPath::parse(task, "Duration").unwrap();
                        tree.bindings_mut().add_binding(source, target);
                    }
                }
            }
        }
    }

    fn specs() -> impl Strategy<Value = Vec<(usize, bool, u8)>> {
        proptest::collection::vec((any::<usize>(), any::<bool>(), 0u8..4), 1..12)
    }

    proptest! {
        #[test]
        fn diff_is_deterministic(
            states in specs(),
            edits in proptest::collection::vec((any::<u8>(), any::<usize>(), any::<usize>()), 0..12),
        ) {
            let left = forest(&states);
            let mut right = left.clone();
            edit(&mut right, &edits, states.len());

            let config = DiffConfig::default();
            let first = diff_state_trees(&left, &right, &config);
            let second = diff_state_trees(&left.clone(), &right.clone(), &config);
            prop_assert_eq!(&first, &second);

            for entry in &first {
                prop_assert!(!matches!(
                    entry.kind,
                    DiffKind::Invalid | DiffKind::Identical | DiffKind::StateTreePropertiesChanged
                ));
            }
        }

        #[test]
        fn identity_wins_over_content(states in specs()) {
            let left = forest(&states);
            let mut right = left.clone();
            for i in 0..states.len() {
                let id = sid(i as u128 + 1);
                let task = NodeId::from_u128(1000 + i as u128);
                let state = right.state_mut(id).unwrap();
                state.name = format!("Renamed{i}");
                state.tag = Some("Edited".into());
                state.tasks = vec![EditorNode::new(task, "MoveTo", json!({ "Speed": 3 }))];
            }

            let entries = diff_state_trees(&left, &right, &DiffConfig::default());
            prop_assert_eq!(entries.len(), states.len());
            prop_assert!(entries.iter().all(|e| e.kind == DiffKind::StateChanged));

            let reported: HashSet<StateId> = entries
                .iter()
                .filter_map(|e| e.identifier.as_ref().and_then(PathSoftReference::leaf_id))
                .collect();
            prop_assert_eq!(reported.len(), states.len());
        }
    }
}
