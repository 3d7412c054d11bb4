//! Owner-relative property addressing.
//!
//! A [`PropertyPath`] names a property by the ID of the struct that owns it
//! (a state, editor node, transition or parameter bag) and a chain of member
//! segments below it, e.g. `Params.Targets[2].Radius`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::NodeId;

/// One member access in a property path, optionally indexing into an array.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathSegment {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl PathSegment {
    /// Plain member access.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    /// Member access followed by an array index.
    pub fn indexed(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{}]", self.name, i),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A property address: owning struct ID plus member segments.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyPath {
    pub owner: NodeId,
    #[serde(default)]
    pub segments: Vec<PathSegment>,
}

impl PropertyPath {
    pub fn new(owner: NodeId, segments: Vec<PathSegment>) -> Self {
        Self { owner, segments }
    }

    /// Parse the dotted segment form (`A.B[1].C`) for a given owner.
    pub fn parse(owner: NodeId, text: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidPath {
            path: text.to_string(),
            reason: reason.to_string(),
        };

        if text.is_empty() {
            return Ok(Self::new(owner, Vec::new()));
        }

        let mut segments = Vec::new();
        for part in text.split('.') {
            if part.is_empty() {
                return Err(invalid("empty segment"));
            }
            match part.find('[') {
                Some(open) => {
                    let close = part
                        .strip_suffix(']')
                        .ok_or_else(|| invalid("unterminated index"))?;
                    let index = close[open + 1..]
                        .parse::<usize>()
                        .map_err(|_| invalid("index is not a number"))?;
                    if open == 0 {
                        return Err(invalid("index without member name"));
                    }
                    segments.push(PathSegment::indexed(&part[..open], index));
                }
                None => segments.push(PathSegment::new(part)),
            }
        }
        Ok(Self::new(owner, segments))
    }

    /// Returns `true` if the path addresses the owner itself.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The dotted segment form without the owner.
    pub fn segments_string(&self) -> String {
        self.segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner.short_id(), self.segments_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn owner() -> NodeId {
        NodeId::from_u128(1)
    }

    #[test]
    fn parse_plain_and_indexed_segments() {
        let path = PropertyPath::parse(owner(), "Params.Targets[2].Radius").unwrap();
        assert_eq!(
            path.segments,
            vec![
                PathSegment::new("Params"),
                PathSegment::indexed("Targets", 2),
                PathSegment::new("Radius"),
            ]
        );
    }

    #[test]
    fn parse_empty_is_owner_path() {
        let path = PropertyPath::parse(owner(), "").unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["A..B", "A[", "A[x]", "[3]", "A."] {
            assert!(
                PropertyPath::parse(owner(), bad).is_err(),
                "`{bad}` should be rejected"
            );
        }
    }

    #[test]
    fn display_includes_short_owner() {
        let path = PropertyPath::parse(owner(), "Speed").unwrap();
        assert_eq!(path.to_string(), format!("{}:Speed", owner().short_id()));
    }

    proptest! {
        #[test]
        fn segments_string_reparses(
            names in proptest::collection::vec("[A-Za-z][A-Za-z0-9_]{0,8}", 1..5),
            indices in proptest::collection::vec(proptest::option::of(0usize..64), 5),
        ) {
            let segments: Vec<PathSegment> = names
                .iter()
                .zip(indices.iter())
                .map(|(n, i)| PathSegment { name: n.clone(), index: *i })
                .collect();
            let path = PropertyPath::new(owner(), segments);
            let reparsed = PropertyPath::parse(owner(), &path.segments_string()).unwrap();
            prop_assert_eq!(path, reparsed);
        }
    }
}
