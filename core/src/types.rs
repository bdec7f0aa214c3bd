//! Value types shared by the client, the transport and the decomposer.
//!
//! # Design
//! Header maps keep the order in which names were first seen and use
//! case-sensitive names, exactly as received on the wire. A plain
//! `Vec<(String, String)>` backs them so they stay cheap to build and easy to
//! compare in tests.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Transport diagnostics keyed by name. The `request_header` entry carries the
/// literal outgoing request header block; every other entry is passed through
/// untouched.
pub type RequestInfo = serde_json::Map<String, serde_json::Value>;

/// Key of the captured outgoing request header block in a [`RequestInfo`].
pub const REQUEST_HEADER: &str = "request_header";

/// Ordered header map with case-sensitive names.
///
/// Inserting a name that is already present replaces its value but keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields(Vec<(String, String)>);

impl HeaderFields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Apply `f` to every value in place.
    pub(crate) fn map_values(&mut self, f: impl Fn(&str) -> String) {
        for (_, value) in &mut self.0 {
            *value = f(value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = HeaderFields::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

impl IntoIterator for HeaderFields {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for HeaderFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Request payload: nothing, a pre-encoded string, or named fields that the
/// client encodes according to the request's enctype.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Vars {
    #[default]
    Empty,
    Encoded(String),
    Fields(Vec<(String, String)>),
}

impl Vars {
    pub fn is_empty(&self) -> bool {
        match self {
            Vars::Empty => true,
            Vars::Encoded(s) => s.is_empty(),
            Vars::Fields(fields) => fields.is_empty(),
        }
    }

    /// Serialize as `application/x-www-form-urlencoded`. Pre-encoded strings
    /// are returned verbatim.
    pub fn to_form_urlencoded(&self) -> String {
        match self {
            Vars::Empty => String::new(),
            Vars::Encoded(s) => s.clone(),
            Vars::Fields(fields) => url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(fields)
                .finish(),
        }
    }
}

impl From<()> for Vars {
    fn from(_: ()) -> Self {
        Vars::Empty
    }
}

impl From<&str> for Vars {
    fn from(s: &str) -> Self {
        Vars::Encoded(s.to_string())
    }
}

impl From<String> for Vars {
    fn from(s: String) -> Self {
        Vars::Encoded(s)
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for Vars {
    fn from(fields: Vec<(K, V)>) -> Self {
        Vars::Fields(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Vars {
    fn from(fields: [(K, V); N]) -> Self {
        Vars::Fields(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> From<std::collections::BTreeMap<K, V>> for Vars {
    fn from(fields: std::collections::BTreeMap<K, V>) -> Self {
        Vars::Fields(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
