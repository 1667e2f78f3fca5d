//! Typed activity selection and its wire encoding.
//!
//! The remote store keeps the activities of a trip as one opaque text
//! column. On the client they are an ordered, duplicate-free set of
//! [`Activity`] values; the serde impls of [`ActivitySet`] are the only
//! place where the text form is produced or parsed.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, SeqAccess, Visitor},
};

const SEPARATORS: [char; 3] = [',', ';', '\n'];

/// An activity a traveller plans to do during a trip.
///
/// Values outside the catalog are kept verbatim in [`Activity::Other`] so
/// that editing a trip never drops what the remote already stores.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Activity {
    Hiking,
    Beach,
    Sightseeing,
    Dining,
    Shopping,
    Business,
    Skiing,
    Camping,
    Nightlife,
    Museums,
    Other(String),
}

static CATALOG: [Activity; 10] = [
    Activity::Hiking,
    Activity::Beach,
    Activity::Sightseeing,
    Activity::Dining,
    Activity::Shopping,
    Activity::Business,
    Activity::Skiing,
    Activity::Camping,
    Activity::Nightlife,
    Activity::Museums,
];

impl Activity {
    /// Activities offered by the multi-select, in display order.
    pub fn catalog() -> &'static [Activity] {
        &CATALOG
    }

    /// Returns the identifier used on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hiking => "hiking",
            Self::Beach => "beach",
            Self::Sightseeing => "sightseeing",
            Self::Dining => "dining",
            Self::Shopping => "shopping",
            Self::Business => "business",
            Self::Skiing => "skiing",
            Self::Camping => "camping",
            Self::Nightlife => "nightlife",
            Self::Museums => "museums",
            Self::Other(label) => label,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Hiking => "Hiking",
            Self::Beach => "Beach",
            Self::Sightseeing => "Sightseeing",
            Self::Dining => "Dining",
            Self::Shopping => "Shopping",
            Self::Business => "Business meetings",
            Self::Skiing => "Skiing",
            Self::Camping => "Camping",
            Self::Nightlife => "Nightlife",
            Self::Museums => "Museums",
            Self::Other(label) => label,
        }
    }

    /// Parses a single identifier. Catalog names match case-insensitively,
    /// anything else becomes [`Activity::Other`]. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let known = Self::catalog()
            .iter()
            .find(|activity| activity.as_str().eq_ignore_ascii_case(trimmed))
            .cloned();
        Some(known.unwrap_or_else(|| Self::Other(trimmed.to_string())))
    }

    pub fn is_catalog(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of activities; insertion order is preserved and repeats are
/// ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivitySet {
    items: Vec<Activity>,
}

impl ActivitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `activity` at the end. Returns `false` if it was already present.
    pub fn insert(&mut self, activity: Activity) -> bool {
        if self.items.contains(&activity) {
            return false;
        }
        self.items.push(activity);
        true
    }

    pub fn remove(&mut self, activity: &Activity) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item != activity);
        before != self.items.len()
    }

    /// Flips the selection of `activity`; returns whether it is now selected.
    pub fn toggle(&mut self, activity: Activity) -> bool {
        if self.remove(&activity) {
            return false;
        }
        self.items.push(activity);
        true
    }

    pub fn contains(&self, activity: &Activity) -> bool {
        self.items.contains(activity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Identifiers in selection order.
    pub fn identifiers(&self) -> Vec<String> {
        self.items.iter().map(|a| a.as_str().to_string()).collect()
    }

    /// Wire form: comma separated identifiers, e.g. `hiking,beach`.
    ///
    /// When a label itself contains a separator the set is written as a JSON
    /// array instead, which [`ActivitySet::decode`] reads back unchanged.
    pub fn encode(&self) -> String {
        let ids: Vec<&str> = self.items.iter().map(Activity::as_str).collect();
        if ids.iter().any(|id| id.contains(SEPARATORS)) {
            return serde_json::to_string(&ids).unwrap_or_default();
        }
        ids.join(",")
    }

    /// Parses the wire form. Accepts the comma separated encoding (also
    /// split on `;` and newlines, as free-text input used to be stored) and a
    /// JSON array of strings.
    pub fn decode(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('[') {
            match serde_json::from_str::<Vec<String>>(trimmed) {
                Ok(tokens) => {
                    return tokens.iter().filter_map(|t| Activity::parse(t)).collect();
                }
                Err(err) => {
                    tracing::warn!(
                        "activities look like JSON but do not parse ({err}), splitting as text"
                    );
                }
            }
        }
        trimmed
            .split(SEPARATORS)
            .filter_map(Activity::parse)
            .collect()
    }
}

impl FromIterator<Activity> for ActivitySet {
    fn from_iter<T: IntoIterator<Item = Activity>>(iter: T) -> Self {
        let mut set = Self::new();
        for activity in iter {
            set.insert(activity);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ActivitySet {
    type Item = &'a Activity;
    type IntoIter = std::slice::Iter<'a, Activity>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for ActivitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

struct ActivitySetVisitor;

impl<'de> Visitor<'de> for ActivitySetVisitor {
    type Value = ActivitySet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an encoded activity string, a list of activities or null")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(ActivitySet::decode(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ActivitySet::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ActivitySet::new())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut set = ActivitySet::new();
        while let Some(token) = seq.next_element::<String>()? {
            if let Some(activity) = Activity::parse(&token) {
                set.insert(activity);
            }
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for ActivitySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ActivitySetVisitor)
    }
}
