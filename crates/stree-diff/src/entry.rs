//! Diff report entries and their presentation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stree_types::PathSegment;

use crate::path::PathSoftReference;

/// Category of a reported difference.
///
/// Polarity: the left tree is `A` (old), the right tree is `B` (new).
/// `...AddedToA` means the item exists only in A; `...AddedToB` means it
/// exists only in B.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum DiffKind {
    /// Sentinel; never emitted.
    #[default]
    Invalid,
    /// Internal only; filtered out before reaching a report.
    Identical,
    StateAddedToA,
    StateAddedToB,
    StateChanged,
    StateEnabled,
    StateDisabled,
    StateMoved,
    StateTreePropertiesChanged,
    BindingAddedToA,
    BindingAddedToB,
    BindingChanged,
}

impl DiffKind {
    /// Display severity, a pure function of the kind.
    pub fn severity(self) -> DiffSeverity {
        match self {
            Self::Invalid | Self::Identical => DiffSeverity::Neutral,
            Self::StateAddedToA | Self::BindingAddedToA => DiffSeverity::Removal,
            Self::StateAddedToB | Self::BindingAddedToB => DiffSeverity::Addition,
            Self::StateChanged | Self::StateEnabled | Self::StateDisabled | Self::BindingChanged => {
                DiffSeverity::Modification
            }
            Self::StateMoved => DiffSeverity::Relocation,
            Self::StateTreePropertiesChanged => DiffSeverity::Global,
        }
    }

    pub fn is_state_kind(self) -> bool {
        matches!(
            self,
            Self::StateAddedToA
                | Self::StateAddedToB
                | Self::StateChanged
                | Self::StateEnabled
                | Self::StateDisabled
                | Self::StateMoved
        )
    }

    pub fn is_binding_kind(self) -> bool {
        matches!(
            self,
            Self::BindingAddedToA | Self::BindingAddedToB | Self::BindingChanged
        )
    }
}

/// How a difference should be highlighted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffSeverity {
    Neutral,
    /// Present only in the new tree.
    Addition,
    /// Present only in the old tree.
    Removal,
    Modification,
    Relocation,
    Global,
}

/// One reported difference.
///
/// Immutable once the report is complete. The classifier upgrades a
/// one-sided state entry into [`DiffKind::StateMoved`] in place when the
/// other half of the move turns up.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    /// Affected state. Absent for tree-level entries. For moves, the
    /// location in A.
    pub identifier: Option<PathSoftReference>,
    /// Location in B, set only for moves.
    pub secondary_identifier: Option<PathSoftReference>,
    pub kind: DiffKind,
    /// Owner-relative property path, set only for binding entries.
    pub binding_path: Option<Vec<PathSegment>>,
}

impl DiffEntry {
    /// Entry about a single state.
    pub fn state(kind: DiffKind, path: PathSoftReference) -> Self {
        Self {
            identifier: Some(path),
            secondary_identifier: None,
            kind,
            binding_path: None,
        }
    }

    /// Entry about tree-level data.
    pub fn global() -> Self {
        Self {
            kind: DiffKind::StateTreePropertiesChanged,
            ..Self::default()
        }
    }

    /// Entry about a binding whose target lives on the state at `path`.
    pub fn binding(kind: DiffKind, path: PathSoftReference, binding_path: Vec<PathSegment>) -> Self {
        Self {
            identifier: Some(path),
            secondary_identifier: None,
            kind,
            binding_path: Some(binding_path),
        }
    }

    /// Dotted form of the binding path, e.g. `Tasks[1].Instance.Duration`.
    pub fn binding_path_string(&self) -> Option<String> {
        self.binding_path.as_ref().map(|segments| {
            segments
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(".")
        })
    }

    pub fn severity(&self) -> DiffSeverity {
        self.kind.severity()
    }
}

/// Labels naming the two sides in user-facing text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLabels {
    pub left: String,
    pub right: String,
    /// Show state IDs next to names.
    pub display_ids: bool,
}

impl Default for DiffLabels {
    fn default() -> Self {
        Self {
            left: "A".into(),
            right: "B".into(),
            display_ids: false,
        }
    }
}

impl DiffLabels {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            display_ids: false,
        }
    }
}

/// Human-readable sentence for an entry.
pub fn describe(entry: &DiffEntry, labels: &DiffLabels) -> String {
    let show = |path: &Option<PathSoftReference>| {
        path.as_ref()
            .map(|p| p.display_string(labels.display_ids))
            .unwrap_or_default()
    };
    let state = show(&entry.identifier);
    let binding = entry.binding_path_string().unwrap_or_default();

    match entry.kind {
        DiffKind::Invalid | DiffKind::Identical => "No difference".to_string(),
        DiffKind::StateAddedToA => format!("State '{state}' only exists in {}", labels.left),
        DiffKind::StateAddedToB => format!("State '{state}' only exists in {}", labels.right),
        DiffKind::StateChanged => format!("State '{state}' changed"),
        DiffKind::StateEnabled => format!("State '{state}' was enabled in {}", labels.right),
        DiffKind::StateDisabled => format!("State '{state}' was disabled in {}", labels.right),
        DiffKind::StateMoved => format!(
            "State moved from '{state}' to '{}'",
            show(&entry.secondary_identifier)
        ),
        DiffKind::StateTreePropertiesChanged => "StateTree properties changed".to_string(),
        DiffKind::BindingAddedToA => {
            format!("Binding '{binding}' on '{state}' only exists in {}", labels.left)
        }
        DiffKind::BindingAddedToB => {
            format!("Binding '{binding}' on '{state}' only exists in {}", labels.right)
        }
        DiffKind::BindingChanged => format!("Binding '{binding}' on '{state}' changed"),
    }
}

/// Per-kind counts over a report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    counts: BTreeMap<DiffKind, usize>,
}

impl DiffSummary {
    pub fn from_entries(entries: &[DiffEntry]) -> Self {
        let mut counts = BTreeMap::new();
        for entry in entries {
            *counts.entry(entry.kind).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, kind: DiffKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Non-zero counts in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (DiffKind, usize)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }
}
