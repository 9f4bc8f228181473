#![doc = r#"
Pattern matching over MIDI port descriptors.

A [`PortDescriptor`] is the immutable attribute map a transport layer
reports for an endpoint (at minimum `manufacturer` and `name`). A
[`MatchSpec`] pairs attribute names with patterns; a pattern of `"*"`
matches anything, any other pattern matches case-insensitively as a
substring. All keys in the spec must match (logical AND).

# Example
```rust
use midiwire::port::{MatchSpec, PortDescriptor};

let port = PortDescriptor::new("KORG INC.", "SLIDER/KNOB");

let spec = MatchSpec::new().with("manufacturer", "korg");
assert!(spec.matches(&port));

let spec = MatchSpec::new()
    .with("manufacturer", "AKAI")
    .with("name", "SLIDER");
assert!(!spec.matches(&port));
```
"#]

use std::collections::BTreeMap;

/// Named string attributes describing an addressable MIDI endpoint.
///
/// Supplied by the transport collaborator; this crate only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortDescriptor {
    attributes: BTreeMap<String, String>,
}

impl PortDescriptor {
    /// Creates a descriptor with the two attributes every transport reports.
    pub fn new(manufacturer: impl Into<String>, name: impl Into<String>) -> Self {
        Self::default()
            .with("manufacturer", manufacturer)
            .with("name", name)
    }

    /// Adds or replaces an attribute, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Looks up an attribute by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A mapping from attribute name to pattern string.
///
/// The pattern `"*"` matches any value; anything else must occur as a
/// case-folded substring of the descriptor's attribute. A spec with no
/// keys matches every descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchSpec {
    patterns: BTreeMap<String, String>,
}

impl MatchSpec {
    /// An empty spec (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pattern for an attribute, builder style.
    pub fn with(mut self, key: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.patterns.insert(key.into(), pattern.into());
        self
    }

    /// True if every pattern in this spec matches the descriptor.
    pub fn matches(&self, port: &PortDescriptor) -> bool {
        self.patterns.iter().all(|(key, pattern)| {
            if pattern == "*" {
                return true;
            }
            match port.get(key) {
                Some(value) => value.to_lowercase().contains(&pattern.to_lowercase()),
                None => false,
            }
        })
    }

    /// Consumes the spec into a reusable predicate.
    pub fn into_matcher(self) -> impl Fn(&PortDescriptor) -> bool {
        move |port| self.matches(port)
    }

    /// Returns the first descriptor in `ports` that this spec matches.
    pub fn find_in<'a, I>(&self, ports: I) -> Option<&'a PortDescriptor>
    where
        I: IntoIterator<Item = &'a PortDescriptor>,
    {
        ports.into_iter().find(|port| self.matches(port))
    }
}

#[cfg(test)]
fn test_port() -> PortDescriptor {
    PortDescriptor::new("KORG INC.", "SLIDER/KNOB")
}

#[test]
fn single_property_complete_match() {
    let spec = MatchSpec::new().with("manufacturer", "KORG INC.");
    assert!(spec.matches(&test_port()));
}

#[test]
fn single_property_mismatch() {
    let spec = MatchSpec::new().with("manufacturer", "AKAI");
    assert!(!spec.matches(&test_port()));
}

#[test]
fn multiple_property_complete_match() {
    let spec = MatchSpec::new()
        .with("manufacturer", "KORG INC.")
        .with("name", "SLIDER/KNOB");
    assert!(spec.matches(&test_port()));
}

#[test]
fn multiple_property_mismatch() {
    // one bad key sinks the whole spec
    let spec = MatchSpec::new()
        .with("manufacturer", "AKAI")
        .with("name", "SLIDER/KNOB");
    assert!(!spec.matches(&test_port()));
}

#[test]
fn partial_matches_are_substring_and_case_folded() {
    let spec = MatchSpec::new().with("manufacturer", "korg");
    assert!(spec.matches(&test_port()));

    let spec = MatchSpec::new()
        .with("manufacturer", "KORG")
        .with("name", "SLIDER");
    assert!(spec.matches(&test_port()));
}

#[test]
fn wildcard_matches_any_value() {
    let spec = MatchSpec::new().with("name", "*");
    assert!(spec.matches(&test_port()));

    let spec = MatchSpec::new()
        .with("manufacturer", "KORG INC.")
        .with("name", "*");
    assert!(spec.matches(&test_port()));
}

#[test]
fn wildcard_does_not_require_the_attribute() {
    let spec = MatchSpec::new().with("version", "*");
    assert!(spec.matches(&test_port()));
}

#[test]
fn missing_attribute_fails_a_concrete_pattern() {
    let spec = MatchSpec::new().with("version", "2");
    assert!(!spec.matches(&test_port()));
}

#[test]
fn empty_spec_matches_everything() {
    assert!(MatchSpec::new().matches(&test_port()));
    assert!(MatchSpec::new().matches(&PortDescriptor::default()));
}

#[test]
fn find_in_returns_first_match() {
    let ports = vec![
        PortDescriptor::new("AKAI", "MPK mini"),
        PortDescriptor::new("KORG INC.", "SLIDER/KNOB"),
        PortDescriptor::new("KORG INC.", "nanoKEY"),
    ];
    let spec = MatchSpec::new().with("manufacturer", "korg");
    assert_eq!(spec.find_in(&ports), Some(&ports[1]));

    let spec = MatchSpec::new().with("name", "launchpad");
    assert_eq!(spec.find_in(&ports), None);
}

#[test]
fn matcher_closure_agrees_with_matches() {
    let matcher = MatchSpec::new().with("name", "knob").into_matcher();
    assert!(matcher(&test_port()));
    assert!(!matcher(&PortDescriptor::new("KORG INC.", "nanoKEY")));
}
