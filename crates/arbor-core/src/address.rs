use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A single component of an [`Address`] as written in topology files and on
/// the command line.
///
/// Integers and text labels never compare equal to each other, so `/1` and
/// `/one` are distinct addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    /// Numeric segment, e.g. the `2` in `/1/2`.
    Index(i64),
    /// Free-form text segment.
    Label(String),
}

impl Segment {
    /// Parse a single textual component.
    ///
    /// Only the canonical decimal form of an `i64` becomes a
    /// [`Segment::Index`], so `007` and `+5` stay labels. A component wrapped
    /// in single quotes is always a label with the quotes removed; this is how
    /// `Display` writes labels that would otherwise read back as integers.
    pub fn parse(component: &str) -> Result<Self, CoreError> {
        if component.is_empty() {
            return Err(CoreError::InvalidAddress {
                input: component.to_string(),
                reason: "empty segment".into(),
            });
        }
        if component.contains('/') {
            return Err(CoreError::InvalidAddress {
                input: component.to_string(),
                reason: "segment must not contain '/'".into(),
            });
        }
        if let Some(inner) = unquote(component) {
            return Ok(Segment::Label(inner.to_string()));
        }
        Ok(match canonical_index(component) {
            Some(i) => Segment::Index(i),
            None => Segment::Label(component.to_string()),
        })
    }
}

fn canonical_index(component: &str) -> Option<i64> {
    component
        .parse::<i64>()
        .ok()
        .filter(|i| i.to_string() == component)
}

fn unquote(component: &str) -> Option<&str> {
    if component.len() < 2 {
        return None;
    }
    component.strip_prefix('\'')?.strip_suffix('\'')
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(i) => write!(f, "{}", i),
            Segment::Label(label)
                if canonical_index(label).is_some() || unquote(label).is_some() =>
            {
                write!(f, "'{}'", label)
            }
            Segment::Label(label) => write!(f, "{}", label),
        }
    }
}

impl From<i64> for Segment {
    fn from(value: i64) -> Self {
        Segment::Index(value)
    }
}

impl From<i32> for Segment {
    fn from(value: i32) -> Self {
        Segment::Index(i64::from(value))
    }
}

impl From<&str> for Segment {
    fn from(value: &str) -> Self {
        Segment::Label(value.to_string())
    }
}

impl From<String> for Segment {
    fn from(value: String) -> Self {
        Segment::Label(value)
    }
}

/// An ordered sequence of segments identifying a position in a routing tree.
///
/// Addresses are compared segment by segment for equality only; segment
/// values are never ordered against each other. The empty address belongs to
/// the root of a tree and is a prefix of every address, itself included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address<S = Segment> {
    segments: Vec<S>,
}

impl<S> Address<S> {
    /// Build an address from anything that yields segments.
    pub fn new<I>(segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<S>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The empty address.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the empty (root) address.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments in order.
    pub fn segments(&self) -> &[S] {
        &self.segments
    }

    /// Consume the address and return its segments.
    pub fn into_segments(self) -> Vec<S> {
        self.segments
    }
}

impl<S: PartialEq> Address<S> {
    /// The first index at which `self` and `other` disagree.
    ///
    /// When one address is a prefix of the other (or they are equal) this is
    /// the length of the shorter one, so the result never exceeds
    /// `min(self.len(), other.len())`.
    pub fn divergence_index(&self, other: &Address<S>) -> usize {
        self.segments
            .iter()
            .zip(other.segments.iter())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| self.len().min(other.len()))
    }

    /// True iff both addresses have the same length and equal segments.
    pub fn matches_exactly(&self, other: &Address<S>) -> bool {
        self.len() == other.len() && self.divergence_index(other) == self.len()
    }

    /// True iff every segment of `self` equals the segment at the same
    /// position in `other`. Equal addresses are prefixes of each other.
    pub fn is_prefix_of(&self, other: &Address<S>) -> bool {
        self.len() <= other.len() && self.divergence_index(other) == self.len()
    }

    /// Like [`Address::is_prefix_of`] but excludes equality.
    pub fn is_strict_prefix_of(&self, other: &Address<S>) -> bool {
        self.len() < other.len() && self.is_prefix_of(other)
    }
}

impl<S: Clone> Address<S> {
    /// A new address with `segment` appended.
    pub fn child(&self, segment: impl Into<S>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// The address with its last segment removed, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.segments.split_last()?;
        Some(Self {
            segments: head.to_vec(),
        })
    }
}

impl<S> Default for Address<S> {
    fn default() -> Self {
        Self::root()
    }
}

impl<S> From<Vec<S>> for Address<S> {
    fn from(segments: Vec<S>) -> Self {
        Self { segments }
    }
}

impl<S> FromIterator<S> for Address<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl<S: fmt::Display> fmt::Display for Address<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// Parses the `/`-separated form produced by `Display`. Both `"/"` and `""`
/// denote the root; the leading slash is optional.
impl FromStr for Address<Segment> {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
        if body.is_empty() {
            return Ok(Self::root());
        }
        body.split('/')
            .map(|component| {
                Segment::parse(component).map_err(|_| CoreError::InvalidAddress {
                    input: s.to_string(),
                    reason: format!("invalid segment {:?}", component),
                })
            })
            .collect()
    }
}
