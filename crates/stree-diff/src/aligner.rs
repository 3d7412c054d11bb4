//! Incremental top-down alignment of two ordered forests.
//!
//! [`TreeAligner`] pairs nodes across a left and a right forest by stable
//! identity, one sibling level at a time:
//!
//! 1. Index the right siblings by stable ID.
//! 2. Walk the left siblings in order. A left node whose ID is found on the
//!    right forms a matched pair, tagged [`AlignResult::Identical`] or
//!    [`AlignResult::Changed`] by the value comparator; its children are
//!    queued as a new level. A left node with no partner is
//!    [`AlignResult::OnlyInLeft`].
//! 3. Right siblings left unconsumed are [`AlignResult::OnlyInRight`], in
//!    their original order.
//!
//! Each level costs one hash-map build plus one lookup per node, so a full
//! pass is linear in the size of both forests.
//!
//! # Incremental computation
//!
//! Pending levels sit in a work queue. [`TreeAligner::process_slice`]
//! drains levels until a node budget is spent; [`TreeAligner::flush`]
//! drains everything. When either forest's revision changes, the next call
//! discards the result and starts over. Between slices the result tree is
//! partial but always safe to traverse.
//!
//! # Invariants
//!
//! - `OnlyInLeft` nodes carry a left handle and no right handle;
//!   `OnlyInRight` the reverse; `Identical` and `Changed` carry both.
//! - Children of every result node appear in left sibling order followed by
//!   right-only nodes in right sibling order.
//! - Stale handles are skipped as if absent; alignment never fails.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace};

use stree_model::ForestProvider;

/// Outcome of aligning one position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlignResult {
    /// Matched pair whose values compare equal.
    Identical,
    /// Matched pair whose values differ.
    Changed,
    /// Present only in the left forest.
    OnlyInLeft,
    /// Present only in the right forest.
    OnlyInRight,
}

/// Traversal control returned by a visitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Descend into this node's children.
    Continue,
    /// Do not descend; continue with the next sibling.
    SkipChildren,
    /// End the traversal.
    Stop,
}

/// Lifecycle of the alignment result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignerState {
    /// No valid result; the next slice restarts from the roots.
    Dirty,
    /// Levels are still queued; the result tree is partial.
    Computing,
    /// The result tree reflects the forests at the recorded revisions.
    Clean,
}

/// One aligned position in the result tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignedNode<H> {
    left: Option<H>,
    right: Option<H>,
    result: AlignResult,
    depth: usize,
    children: Vec<usize>,
}

impl<H: Copy> AlignedNode<H> {
    /// Handle in the left forest, if this position exists there.
    pub fn left(&self) -> Option<H> {
        self.left
    }

    /// Handle in the right forest, if this position exists there.
    pub fn right(&self) -> Option<H> {
        self.right
    }

    /// How the two sides of this position compare.
    pub fn result(&self) -> AlignResult {
        self.result
    }

    /// Distance from the forest roots (roots are at depth 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Indices of the child positions, for [`TreeAligner::node`].
    pub fn children(&self) -> &[usize] {
        &self.children
    }
}

/// A sibling level waiting to be aligned.
#[derive(Debug)]
struct PendingLevel<H> {
    parent: Option<usize>,
    depth: usize,
    left: Vec<H>,
    right: Vec<H>,
}

/// Alignment between two forests of the same provider type.
///
/// `C` decides whether a matched pair is identical:
/// `compare(left_forest, left_node, right_forest, right_node)`.
pub struct TreeAligner<P: ForestProvider, C> {
    compare: C,
    nodes: Vec<AlignedNode<P::Handle>>,
    roots: Vec<usize>,
    pending: VecDeque<PendingLevel<P::Handle>>,
    state: AlignerState,
    revisions: Option<(u64, u64)>,
}

impl<P, C> TreeAligner<P, C>
where
    P: ForestProvider,
    C: Fn(&P, P::Handle, &P, P::Handle) -> bool,
{
    /// A new aligner in the [`AlignerState::Dirty`] state.
    pub fn new(compare: C) -> Self {
        Self {
            compare,
            nodes: Vec::new(),
            roots: Vec::new(),
            pending: VecDeque::new(),
            state: AlignerState::Dirty,
            revisions: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AlignerState {
        self.state
    }

    /// Returns `true` once every queued level has been aligned.
    pub fn is_clean(&self) -> bool {
        self.state == AlignerState::Clean
    }

    /// Clean, and computed against the forests' current revisions.
    pub fn is_clean_for(&self, left: &P, right: &P) -> bool {
        self.is_clean() && self.revisions == Some((left.revision(), right.revision()))
    }

    /// Force the next slice to restart from the roots.
    pub fn mark_dirty(&mut self) {
        self.state = AlignerState::Dirty;
    }

    /// Number of aligned positions produced so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no position has been aligned yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Indices of the top-level positions.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Aligned position at `index`, as listed by [`roots`](Self::roots)
    /// and [`AlignedNode::children`].
    pub fn node(&self, index: usize) -> Option<&AlignedNode<P::Handle>> {
        self.nodes.get(index)
    }

    /// Align queued levels until at least `budget` nodes have been
    /// processed or the queue is empty. Restarts first if the aligner is
    /// dirty or either forest changed since the last slice.
    pub fn process_slice(&mut self, left: &P, right: &P, budget: usize) -> AlignerState {
        let current = (left.revision(), right.revision());
        if self.state != AlignerState::Dirty && self.revisions != Some(current) {
            debug!(
                left_revision = current.0,
                right_revision = current.1,
                "forest changed; restarting alignment"
            );
            self.state = AlignerState::Dirty;
        }

        if self.state == AlignerState::Dirty {
            self.restart(left, right, current);
        }

        let mut processed = 0usize;
        while processed < budget.max(1) {
            let Some(level) = self.pending.pop_front() else {
                break;
            };
            processed += self.align_level(left, right, level);
        }

        if self.pending.is_empty() {
            self.state = AlignerState::Clean;
        }
        trace!(
            processed,
            queued = self.pending.len(),
            aligned = self.nodes.len(),
            "alignment slice"
        );
        self.state
    }

    /// Run slices until the result is clean.
    pub fn flush(&mut self, left: &P, right: &P) {
        while self.process_slice(left, right, usize::MAX) != AlignerState::Clean {}
        debug!(aligned = self.nodes.len(), "alignment flushed");
    }

    /// Pre-order walk over the result tree.
    ///
    /// The visitor sees each position before its children; siblings are
    /// visited in order. Returns `false` if the visitor stopped the walk.
    pub fn traverse<F>(&self, mut visitor: F) -> bool
    where
        F: FnMut(&AlignedNode<P::Handle>) -> Visit,
    {
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            match visitor(node) {
                Visit::Continue => stack.extend(node.children.iter().rev().copied()),
                Visit::SkipChildren => {}
                Visit::Stop => return false,
            }
        }
        true
    }

    fn restart(&mut self, left: &P, right: &P, revisions: (u64, u64)) {
        self.nodes.clear();
        self.roots.clear();
        self.pending.clear();
        self.pending.push_back(PendingLevel {
            parent: None,
            depth: 0,
            left: left.root_nodes(),
            right: right.root_nodes(),
        });
        self.revisions = Some(revisions);
        self.state = AlignerState::Computing;
    }

    /// Align one sibling level, queueing child levels. Returns the number
    /// of input nodes examined.
    fn align_level(&mut self, left: &P, right: &P, level: PendingLevel<P::Handle>) -> usize {
        let PendingLevel {
            parent,
            depth,
            left: left_nodes,
            right: right_nodes,
        } = level;
        let examined = left_nodes.len() + right_nodes.len();

        let mut right_index: HashMap<P::Key, usize> = HashMap::with_capacity(right_nodes.len());
        for (i, node) in right_nodes.iter().enumerate() {
            if let Some(key) = right.stable_id(*node) {
                right_index.entry(key).or_insert(i);
            }
        }
        let mut consumed = vec![false; right_nodes.len()];
        let mut produced = Vec::with_capacity(examined);

        for left_node in left_nodes {
            let Some(key) = left.stable_id(left_node) else {
                continue;
            };

            let partner = right_index
                .get(&key)
                .copied()
                .filter(|i| !consumed[*i]);

            match partner {
                Some(i) => {
                    consumed[i] = true;
                    let right_node = right_nodes[i];
                    let result = if (self.compare)(left, left_node, right, right_node) {
                        AlignResult::Identical
                    } else {
                        AlignResult::Changed
                    };
                    let index = self.push(Some(left_node), Some(right_node), result, depth);
                    self.enqueue(
                        index,
                        depth + 1,
                        left.children(left_node),
                        right.children(right_node),
                    );
                    produced.push(index);
                }
                None => {
                    let index = self.push(Some(left_node), None, AlignResult::OnlyInLeft, depth);
                    self.enqueue(index, depth + 1, left.children(left_node), Vec::new());
                    produced.push(index);
                }
            }
        }

        for (i, right_node) in right_nodes.into_iter().enumerate() {
            if consumed[i] || !right.is_valid(right_node) {
                continue;
            }
            let index = self.push(None, Some(right_node), AlignResult::OnlyInRight, depth);
            self.enqueue(index, depth + 1, Vec::new(), right.children(right_node));
            produced.push(index);
        }

        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent_node) => parent_node.children = produced,
            None => self.roots = produced,
        }

        examined
    }

    fn push(
        &mut self,
        left: Option<P::Handle>,
        right: Option<P::Handle>,
        result: AlignResult,
        depth: usize,
    ) -> usize {
        self.nodes.push(AlignedNode {
            left,
            right,
            result,
            depth,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn enqueue(
        &mut self,
        parent: usize,
        depth: usize,
        left: Vec<P::Handle>,
        right: Vec<P::Handle>,
    ) {
        if left.is_empty() && right.is_empty() {
            return;
        }
        self.pending.push_back(PendingLevel {
            parent: Some(parent),
            depth,
            left,
            right,
        });
    }
}

impl<P: ForestProvider, C> std::fmt::Debug for TreeAligner<P, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeAligner")
            .field("state", &self.state)
            .field("aligned", &self.nodes.len())
            .field("queued_levels", &self.pending.len())
            .finish()
    }
}
