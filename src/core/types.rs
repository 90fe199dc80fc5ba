//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`NodeId`] - Validated location identifier
//! - [`NodeKind`] - Administrative level (country > state > city > district > block)
//! - [`Resources`] - Quantities carried by a location
//! - [`UtcTimestamp`] - RFC3339 timestamp
//! - [`Fingerprint`] - Stable hash over a tree walk
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use cadastre::core::types::{NodeId, NodeKind};
//!
//! let id = NodeId::new("s-c1-1").unwrap();
//! assert_eq!(id.as_str(), "s-c1-1");
//!
//! assert_eq!(NodeKind::State.parent_kind(), Some(NodeKind::Country));
//! assert!(NodeId::new("has space").is_err());
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid node id: {0}")]
    InvalidNodeId(String),

    #[error("invalid node kind: {0}")]
    InvalidKind(String),
}

/// A validated location identifier.
///
/// Identifiers are opaque strings that must be:
/// - Non-empty
/// - Free of whitespace and ASCII control characters
///
/// # Example
///
/// ```
/// use cadastre::core::types::NodeId;
///
/// let id = NodeId::new("ci-s-c1-1-1").unwrap();
/// assert_eq!(id.to_string(), "ci-s-c1-1-1");
///
/// assert!(NodeId::new("").is_err());
/// assert!(NodeId::new("a\tb").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    /// Create a new validated node id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidNodeId` if the id is empty or contains
    /// whitespace or control characters.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    fn validate(id: &str) -> Result<(), TypeError> {
        if id.is_empty() {
            return Err(TypeError::InvalidNodeId("node id cannot be empty".into()));
        }
        if id.chars().any(|c| c.is_whitespace()) {
            return Err(TypeError::InvalidNodeId(format!(
                "node id cannot contain whitespace: '{id}'"
            )));
        }
        if id.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidNodeId(
                "node id cannot contain control characters".into(),
            ));
        }
        Ok(())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl FromStr for NodeId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for NodeId {
    type Error = TypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Administrative level of a location.
///
/// Levels form a fixed chain. Every child sits below its parent's level,
/// usually exactly one level down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Country,
    State,
    City,
    District,
    Block,
}

impl NodeKind {
    /// All kinds, shallowest first.
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Country,
        NodeKind::State,
        NodeKind::City,
        NodeKind::District,
        NodeKind::Block,
    ];

    /// Zero-based depth (country = 0, block = 4).
    pub fn depth(self) -> usize {
        match self {
            NodeKind::Country => 0,
            NodeKind::State => 1,
            NodeKind::City => 2,
            NodeKind::District => 3,
            NodeKind::Block => 4,
        }
    }

    /// The kind one level above, or `None` for countries.
    pub fn parent_kind(self) -> Option<NodeKind> {
        self.depth().checked_sub(1).map(|d| Self::ALL[d])
    }

    /// The kind one level below, or `None` for blocks.
    pub fn child_kind(self) -> Option<NodeKind> {
        Self::ALL.get(self.depth() + 1).copied()
    }

    /// Whether a node of this kind can be relocated at all.
    pub fn is_transferable(self) -> bool {
        self.parent_kind().is_some()
    }

    /// Lowercase name, as used in config and CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Country => "country",
            NodeKind::State => "state",
            NodeKind::City => "city",
            NodeKind::District => "district",
            NodeKind::Block => "block",
        }
    }

    /// Plural label used when summarizing children.
    pub fn plural(self) -> &'static str {
        match self {
            NodeKind::Country => "countries",
            NodeKind::State => "states",
            NodeKind::City => "cities",
            NodeKind::District => "districts",
            NodeKind::Block => "blocks",
        }
    }
}

impl FromStr for NodeKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "country" => Ok(NodeKind::Country),
            "state" => Ok(NodeKind::State),
            "city" => Ok(NodeKind::City),
            "district" => Ok(NodeKind::District),
            "block" => Ok(NodeKind::Block),
            other => Err(TypeError::InvalidKind(format!(
                "'{other}', must be one of: country, state, city, district, block"
            ))),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource quantities held by a location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// Food stock
    pub food: u64,
}

impl Resources {
    /// Resources holding only food.
    pub fn food(food: u64) -> Self {
        Self { food }
    }

    /// Add another set of quantities into this one.
    ///
    /// Saturates instead of wrapping.
    pub fn absorb(&mut self, other: &Resources) {
        self.food = self.food.saturating_add(other.food);
    }
}

/// A UTC timestamp in RFC3339 format.
///
/// # Example
///
/// ```
/// use cadastre::core::types::UtcTimestamp;
///
/// let now = UtcTimestamp::now();
/// println!("Current time: {}", now);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Create a timestamp from a chrono DateTime.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt)
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// A stable hash over an ordered tree walk.
///
/// Unlike a set hash, input order matters: sibling order is part of the
/// tree's identity.
///
/// # Example
///
/// ```
/// use cadastre::core::types::Fingerprint;
///
/// let fp = Fingerprint::compute(["c1|country|-|1000", "s-c1-1|state|c1|100"]);
/// let fp2 = Fingerprint::compute(["c1|country|-|1000", "s-c1-1|state|c1|100"]);
/// assert_eq!(fp, fp2);
///
/// let swapped = Fingerprint::compute(["s-c1-1|state|c1|100", "c1|country|-|1000"]);
/// assert_ne!(fp, swapped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint from an ordered sequence of records.
    pub fn compute<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hasher = Sha256::new();
        for record in records {
            hasher.update(record.as_ref().as_bytes());
            hasher.update(b"\n");
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// Get the fingerprint as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod node_id {
        use super::*;

        #[test]
        fn valid_ids() {
            assert!(NodeId::new("c1").is_ok());
            assert!(NodeId::new("s-c1-1").is_ok());
            assert!(NodeId::new("b-d-ci-s-c2-3-1-2-1").is_ok());
            assert!(NodeId::new("UPPER_case.ok").is_ok());
        }

        #[test]
        fn empty_rejected() {
            assert!(NodeId::new("").is_err());
        }

        #[test]
        fn whitespace_rejected() {
            assert!(NodeId::new("has space").is_err());
            assert!(NodeId::new(" lead").is_err());
            assert!(NodeId::new("trail\n").is_err());
        }

        #[test]
        fn control_chars_rejected() {
            assert!(NodeId::new("a\x07b").is_err());
        }

        #[test]
        fn serde_rejects_invalid() {
            let parsed: Result<NodeId, _> = serde_json::from_str("\"\"");
            assert!(parsed.is_err());
        }
    }

    mod node_kind {
        use super::*;

        #[test]
        fn chain_is_linear() {
            for pair in NodeKind::ALL.windows(2) {
                assert_eq!(pair[0].child_kind(), Some(pair[1]));
                assert_eq!(pair[1].parent_kind(), Some(pair[0]));
            }
            assert_eq!(NodeKind::Country.parent_kind(), None);
            assert_eq!(NodeKind::Block.child_kind(), None);
        }

        #[test]
        fn only_countries_are_fixed() {
            assert!(!NodeKind::Country.is_transferable());
            assert!(NodeKind::State.is_transferable());
            assert!(NodeKind::Block.is_transferable());
        }

        #[test]
        fn parse_is_case_insensitive() {
            assert_eq!("District".parse::<NodeKind>(), Ok(NodeKind::District));
            assert!("village".parse::<NodeKind>().is_err());
        }

        #[test]
        fn serde_uses_lowercase() {
            let json = serde_json::to_string(&NodeKind::City).unwrap();
            assert_eq!(json, "\"city\"");
        }
    }

    mod resources {
        use super::*;

        #[test]
        fn absorb_adds() {
            let mut a = Resources::food(100);
            a.absorb(&Resources::food(250));
            assert_eq!(a.food, 350);
        }

        #[test]
        fn absorb_saturates() {
            let mut a = Resources::food(u64::MAX - 1);
            a.absorb(&Resources::food(10));
            assert_eq!(a.food, u64::MAX);
        }
    }

    mod fingerprint {
        use super::*;

        #[test]
        fn deterministic() {
            let fp1 = Fingerprint::compute(["a", "b"]);
            let fp2 = Fingerprint::compute(vec!["a".to_string(), "b".to_string()]);
            assert_eq!(fp1, fp2);
            assert_eq!(fp1.as_str().len(), 64);
        }

        #[test]
        fn order_dependent() {
            assert_ne!(Fingerprint::compute(["a", "b"]), Fingerprint::compute(["b", "a"]));
        }

        #[test]
        fn record_boundaries_matter() {
            assert_ne!(Fingerprint::compute(["ab"]), Fingerprint::compute(["a", "b"]));
        }
    }

    mod utc_timestamp {
        use super::*;

        #[test]
        fn now_works() {
            let ts = UtcTimestamp::now();
            assert!(ts.to_string().contains('T'));
        }

        #[test]
        fn serde_roundtrip() {
            let ts = UtcTimestamp::now();
            let json = serde_json::to_string(&ts).unwrap();
            let parsed: UtcTimestamp = serde_json::from_str(&json).unwrap();
            assert_eq!(ts, parsed);
        }
    }
}
