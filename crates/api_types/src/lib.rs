use serde::{Deserialize, Deserializer, Serialize};

mod activity;

pub use activity::{Activity, ActivitySet};

/// Deserializes `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts ids sent either as JSON numbers or strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    }))
}

pub mod trip {
    use std::{fmt, num::ParseIntError, str::FromStr};

    use super::*;
    use crate::packing::PackingList;

    /// Identifier assigned by the remote store.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TripId(pub u64);

    impl fmt::Display for TripId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.fmt(f)
        }
    }

    impl FromStr for TripId {
        type Err = ParseIntError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            s.trim().parse().map(TripId)
        }
    }

    /// Selects which optional trip fields apply.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TravelerType {
        #[default]
        Casual,
        Business,
    }

    impl TravelerType {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Casual => "casual",
                Self::Business => "business",
            }
        }
    }

    impl FromStr for TravelerType {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim().to_ascii_lowercase().as_str() {
                "casual" => Ok(Self::Casual),
                "business" => Ok(Self::Business),
                other => Err(format!("unknown traveler type \"{other}\"")),
            }
        }
    }

    /// One entry of a business trip's meeting schedule.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MeetingSlot {
        pub time: String,
        #[serde(default)]
        pub location: String,
        #[serde(default)]
        pub description: String,
    }

    /// A trip as returned by `GET /api/trips/`.
    ///
    /// Dates are literal `YYYY-MM-DD` strings and are never converted.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Trip {
        pub id: TripId,
        pub destination: String,
        #[serde(default)]
        pub latitude: Option<f64>,
        #[serde(default)]
        pub longitude: Option<f64>,
        pub travel_start: String,
        pub travel_end: String,
        #[serde(default)]
        pub activities: ActivitySet,
        #[serde(default, deserialize_with = "null_as_default")]
        pub traveler_type: TravelerType,
        #[serde(default)]
        pub gender: Option<String>,
        #[serde(default)]
        pub style_preference: Option<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        pub meeting_schedule: Vec<MeetingSlot>,
        #[serde(default)]
        pub packing_list: PackingList,
        #[serde(default)]
        pub created_at: Option<String>,
    }

    /// Body of `POST /api/trips/` and `PUT /api/trips/{id}/`.
    ///
    /// Always a full replacement of the mutable fields. Fields of the traveler
    /// type not in use are left out of the JSON entirely.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TripPayload {
        pub destination: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub latitude: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub longitude: Option<f64>,
        pub travel_start: String,
        pub travel_end: String,
        pub activities: ActivitySet,
        pub traveler_type: TravelerType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub gender: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub style_preference: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub meeting_schedule: Option<Vec<MeetingSlot>>,
    }
}

pub mod packing {
    use std::collections::BTreeMap;

    use serde::Serializer;
    use serde_json::Value;

    use super::*;

    /// A packing list entry as stored remotely. Every field may be missing.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PackingItem {
        #[serde(default, deserialize_with = "string_or_number")]
        pub id: Option<String>,
        #[serde(default)]
        pub name: Option<String>,
        #[serde(default)]
        pub category: Option<String>,
        #[serde(default)]
        pub description: Option<String>,
    }

    /// Packing list cached on a trip.
    ///
    /// Persisted as a JSON string blob. Reading never fails: a list the
    /// remote mangled comes back empty rather than failing the whole trip.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct PackingList(pub Vec<PackingItem>);

    impl PackingList {
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        pub fn items(&self) -> &[PackingItem] {
            &self.0
        }

        /// Reads whatever shape the remote cached: an array, an id-keyed
        /// object, or either of them JSON-encoded in a string. Entries that
        /// are not packing items are skipped and anything unreadable yields
        /// an empty list.
        fn from_value(value: Value) -> Self {
            let entries = match value {
                Value::Null => Vec::new(),
                Value::String(blob) if blob.trim().is_empty() => Vec::new(),
                Value::String(blob) => match serde_json::from_str::<Value>(&blob) {
                    Ok(inner @ (Value::Array(_) | Value::Object(_))) => {
                        return Self::from_value(inner);
                    }
                    Ok(_) | Err(_) => {
                        tracing::warn!("ignoring unreadable packing list blob {blob:?}");
                        Vec::new()
                    }
                },
                Value::Array(items) => items,
                Value::Object(map) => map
                    .into_iter()
                    .collect::<BTreeMap<_, _>>()
                    .into_values()
                    .collect(),
                other => {
                    tracing::warn!("ignoring packing list of unexpected shape: {other}");
                    Vec::new()
                }
            };

            PackingList(
                entries
                    .into_iter()
                    .filter_map(|entry| match serde_json::from_value::<PackingItem>(entry) {
                        Ok(item) => Some(item),
                        Err(err) => {
                            tracing::warn!("skipping malformed packing item: {err}");
                            None
                        }
                    })
                    .collect(),
            )
        }
    }

    impl Serialize for PackingList {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let blob = serde_json::to_string(&self.0)
                .map_err(<S::Error as serde::ser::Error>::custom)?;
            serializer.serialize_str(&blob)
        }
    }

    impl<'de> Deserialize<'de> for PackingList {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Value::deserialize(deserializer).map(Self::from_value)
        }
    }

    /// Body of `POST /api/trips/{id}/packing-list/`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PackingRequest {
        pub activities: Vec<String>,
    }

    /// The packing list endpoint answers with one of several shapes.
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum PackingListResponse {
        List(Vec<PackingItem>),
        Wrapped { items: Vec<PackingItem> },
        Keyed(BTreeMap<String, PackingItem>),
    }

    impl PackingListResponse {
        pub fn into_items(self) -> Vec<PackingItem> {
            match self {
                Self::List(items) | Self::Wrapped { items } => items,
                Self::Keyed(map) => map.into_values().collect(),
            }
        }
    }

    /// Body of `PATCH /api/trips/{id}/` when saving a packing list.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PackingPatch {
        pub packing_list: PackingList,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TokenRequest {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TokenPair {
        pub access: String,
        pub refresh: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TokenRefresh {
        pub refresh: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccessToken {
        pub access: String,
    }

    /// Body of `POST /api/signup/`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignupRequest {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SignupResponse {
        #[serde(default)]
        pub message: String,
    }
}

/// Read-only per-trip data rendered by the detail views.
pub mod details {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct WeatherReport {
        #[serde(default, deserialize_with = "null_as_default")]
        pub forecast: Vec<ForecastDay>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ForecastDay {
        pub date: String,
        /// Degrees Celsius.
        pub temperature: f64,
        #[serde(default)]
        pub conditions: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CulturalInsight {
        #[serde(default, deserialize_with = "string_or_number")]
        pub id: Option<String>,
        #[serde(default)]
        pub category: String,
        #[serde(default)]
        pub title: String,
        #[serde(default)]
        pub description: String,
    }

    impl CulturalInsight {
        pub const DRESS_CODE: &'static str = "dress_code";

        pub fn is_dress_code(&self) -> bool {
            self.category == Self::DRESS_CODE
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TravelTip {
        #[serde(default, deserialize_with = "string_or_number")]
        pub id: Option<String>,
        #[serde(default)]
        pub title: Option<String>,
        #[serde(default)]
        pub category: Option<String>,
        #[serde(default)]
        pub description: String,
    }

    /// Body of `POST /api/trips/{id}/activities/`: one entry of the trip's
    /// itinerary.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ItineraryActivity {
        pub name: String,
        #[serde(default)]
        pub description: String,
        /// `YYYY-MM-DD`, or empty when not scheduled.
        #[serde(default)]
        pub date: String,
        #[serde(default)]
        pub location: String,
        #[serde(default)]
        pub packing_requirements: Vec<String>,
        #[serde(default)]
        pub weather_considerations: Vec<String>,
    }

    impl TravelTip {
        /// Title, falling back to the category.
        pub fn heading(&self) -> &str {
            self.title
                .as_deref()
                .or(self.category.as_deref())
                .unwrap_or("")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        packing::{PackingList, PackingListResponse},
        trip::{TravelerType, Trip, TripId},
    };

    #[test]
    fn trip_defaults_missing_variant_fields() {
        let trip: Trip = serde_json::from_str(
            r#"{"id": 5, "destination": "Paris", "travel_start": "2024-06-01",
                "travel_end": "2024-06-10", "activities": "beach",
                "meeting_schedule": null, "packing_list": []}"#,
        )
        .unwrap();
        assert_eq!(trip.id, TripId(5));
        assert_eq!(trip.traveler_type, TravelerType::Casual);
        assert!(trip.meeting_schedule.is_empty());
        assert!(trip.packing_list.is_empty());
        assert_eq!(trip.activities.encode(), "beach");
    }

    #[test]
    fn packing_list_reads_blob_and_array() {
        let from_blob: PackingList =
            serde_json::from_str(r#""[{\"id\":\"a\",\"name\":\"Hat\"}]""#).unwrap();
        let from_array: PackingList = serde_json::from_str(r#"[{"id":"a","name":"Hat"}]"#).unwrap();
        assert_eq!(from_blob, from_array);
        assert_eq!(from_blob.items()[0].name.as_deref(), Some("Hat"));
    }

    #[test]
    fn bad_packing_list_does_not_fail_the_trip() {
        let trips: Vec<Trip> = serde_json::from_str(
            r#"[
                {"id": 1, "destination": "Rome", "travel_start": "2024-05-01",
                 "travel_end": "2024-05-03", "packing_list": "oops"},
                {"id": 2, "destination": "Nice", "travel_start": "2024-05-04",
                 "travel_end": "2024-05-06", "packing_list": {"a": {"name": "Hat"}}},
                {"id": 3, "destination": "Bern", "travel_start": "2024-05-07",
                 "travel_end": "2024-05-09", "packing_list": [{"name": "Map"}, 42]},
                {"id": 4, "destination": "Oslo", "travel_start": "2024-05-10",
                 "travel_end": "2024-05-12", "packing_list": 7}
            ]"#,
        )
        .unwrap();

        assert_eq!(trips.len(), 4);
        assert!(trips[0].packing_list.is_empty());
        assert_eq!(trips[1].packing_list.items()[0].name.as_deref(), Some("Hat"));
        assert_eq!(trips[2].packing_list.items().len(), 1);
        assert_eq!(trips[2].packing_list.items()[0].name.as_deref(), Some("Map"));
        assert!(trips[3].packing_list.is_empty());
    }

    #[test]
    fn packing_list_blob_may_hold_keyed_object() {
        let list: PackingList =
            serde_json::from_str(r#""{\"b\":{\"name\":\"Map\"},\"a\":{\"name\":\"Hat\"}}""#)
                .unwrap();
        let names: Vec<_> = list.items().iter().filter_map(|i| i.name.as_deref()).collect();
        assert_eq!(names, vec!["Hat", "Map"]);
    }

    #[test]
    fn packing_list_serializes_as_blob() {
        let list: PackingList = serde_json::from_str(r#"[{"id":7,"name":"Hat"}]"#).unwrap();
        let json = serde_json::to_value(&list).unwrap();
        let blob = json.as_str().unwrap();
        assert!(blob.starts_with('['));
        assert!(blob.contains(r#""id":"7""#));
    }

    #[test]
    fn packing_response_shapes() {
        let list: PackingListResponse = serde_json::from_str(r#"[{"name":"Boots"}]"#).unwrap();
        assert_eq!(list.into_items().len(), 1);

        let wrapped: PackingListResponse =
            serde_json::from_str(r#"{"items":[{"name":"Boots"},{"name":"Map"}]}"#).unwrap();
        assert_eq!(wrapped.into_items().len(), 2);

        let keyed: PackingListResponse =
            serde_json::from_str(r#"{"a":{"name":"Boots"},"b":{"name":"Map"}}"#).unwrap();
        let names: Vec<_> = keyed
            .into_items()
            .into_iter()
            .filter_map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["Boots", "Map"]);
    }
}
