use std::fmt;

use thiserror::Error;

/// A single component of a [`Name`]: either a text label or a sequence number.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    Text(String),
    Seq(u64),
}

impl Component {
    pub fn text(s: impl Into<String>) -> Self {
        Component::Text(s.into())
    }

    pub fn seq(n: u64) -> Self {
        Component::Seq(n)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Component::Text(s) => Some(s.as_str()),
            Component::Seq(_) => None,
        }
    }

    pub fn as_seq(&self) -> Option<u64> {
        match self {
            Component::Seq(n) => Some(*n),
            Component::Text(_) => None,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Text(s) => write!(f, "{s}"),
            Component::Seq(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("component index {index} out of range for name of length {len}")]
    ComponentOutOfRange { index: usize, len: usize },
    #[error("component {index} is not a sequence number")]
    NotASequenceNumber { index: usize },
    #[error("component {index} is not a text label")]
    NotAText { index: usize },
    #[error("name has {actual} components, expected {expected}")]
    WrongComponentCount { expected: usize, actual: usize },
}

/// An ordered sequence of name components, the fundamental addressing unit of the
/// request/response substrate. Equality and prefix relations are component-wise.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Name {
    components: Vec<Component>,
}

impl Name {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    pub fn from_components(components: Vec<Component>) -> Self {
        Self { components }
    }

    /// Parses a "/"-separated URI-like string into a [`Name`]. Components that parse as
    /// a non-negative integer become [`Component::Seq`]; everything else is a text label.
    /// Leading/trailing slashes and empty segments are ignored.
    pub fn parse(uri: &str) -> Self {
        let components = uri
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.parse::<u64>() {
                Ok(n) => Component::Seq(n),
                Err(_) => Component::Text(s.to_owned()),
            })
            .collect();
        Self { components }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Component, NameError> {
        self.components
            .get(index)
            .ok_or(NameError::ComponentOutOfRange {
                index,
                len: self.components.len(),
            })
    }

    pub fn text_at(&self, index: usize) -> Result<&str, NameError> {
        self.get(index)?
            .as_text()
            .ok_or(NameError::NotAText { index })
    }

    pub fn seq_at(&self, index: usize) -> Result<u64, NameError> {
        self.get(index)?
            .as_seq()
            .ok_or(NameError::NotASequenceNumber { index })
    }

    /// Returns a copy of this name with `n` components appended.
    pub fn appended(&self, extra: impl IntoIterator<Item = Component>) -> Self {
        let mut components = self.components.clone();
        components.extend(extra);
        Self { components }
    }

    pub fn with_text(&self, s: impl Into<String>) -> Self {
        self.appended([Component::Text(s.into())])
    }

    pub fn with_seq(&self, n: u64) -> Self {
        self.appended([Component::Seq(n)])
    }

    /// Returns a copy of this name with its last `k` components removed, i.e. `prefix(-k)`
    /// in spec.md's notation.
    pub fn prefix_minus(&self, k: usize) -> Self {
        let keep = self.components.len().saturating_sub(k);
        Self {
            components: self.components[..keep].to_vec(),
        }
    }

    /// Returns a copy of this name truncated to its first `n` components.
    pub fn prefix(&self, n: usize) -> Self {
        let keep = n.min(self.components.len());
        Self {
            components: self.components[..keep].to_vec(),
        }
    }

    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.components.len() <= other.components.len()
            && self
                .components
                .iter()
                .zip(other.components.iter())
                .all(|(a, b)| a == b)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in &self.components {
            write!(f, "/{component}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_through_display() {
        let name = Name::parse("/conf/producer/delta/3/paired-key/1/0");
        assert_eq!(name.len(), 7);
        assert_eq!(name.to_string(), "/conf/producer/delta/3/paired-key/1/0");
    }

    #[test]
    fn prefix_minus_removes_trailing_components() {
        let name = Name::parse("/conf/producer/key/1/0");
        assert_eq!(name.prefix_minus(2), Name::parse("/conf/producer/key"));
        assert_eq!(name.prefix_minus(0), name);
    }

    #[test]
    fn is_prefix_of_is_component_wise() {
        let base = Name::parse("/conf/producer");
        let full = Name::parse("/conf/producer/key/1/0");
        assert!(base.is_prefix_of(&full));
        assert!(!full.is_prefix_of(&base));
    }

    #[test]
    fn seq_at_rejects_text_components() {
        let name = Name::parse("/conf/producer/key");
        assert_eq!(name.seq_at(2), Err(NameError::NotASequenceNumber { index: 2 }));
    }
}
