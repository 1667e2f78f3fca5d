//! Packing list of a single trip.
//!
//! Edits are applied locally first and then the whole list is saved back to
//! the trip. A failed save keeps the local edit and reports the error.

use std::collections::HashSet;

use api_types::{
    ActivitySet,
    details::CulturalInsight,
    packing::{PackingItem, PackingList},
    trip::{Trip, TripId},
};
use uuid::Uuid;

use crate::{client::PackingApi, error::FetchError};

const DEFAULT_NAME: &str = "Unnamed Item";
const DEFAULT_CATEGORY: &str = "General";
const CUSTOM_CATEGORY: &str = "Other";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackingEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
}

impl PackingEntry {
    /// Fills in whatever the remote left out.
    pub fn from_remote(item: PackingItem) -> Self {
        Self {
            id: item.id.unwrap_or_else(new_id),
            name: non_empty(item.name).unwrap_or_else(|| DEFAULT_NAME.to_string()),
            category: non_empty(item.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            description: item.description.unwrap_or_default(),
        }
    }

    fn to_item(&self) -> PackingItem {
        PackingItem {
            id: Some(self.id.clone()),
            name: Some(self.name.clone()),
            category: Some(self.category.clone()),
            description: Some(self.description.clone()),
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct PackingListEditor {
    trip_id: TripId,
    items: Vec<PackingEntry>,
    checked: HashSet<String>,
}

impl PackingListEditor {
    pub fn new(trip_id: TripId, items: Vec<PackingItem>) -> Self {
        Self {
            trip_id,
            items: items.into_iter().map(PackingEntry::from_remote).collect(),
            checked: HashSet::new(),
        }
    }

    /// Starts from the list cached on the trip.
    pub fn from_trip(trip: &Trip) -> Self {
        Self::new(trip.id, trip.packing_list.items().to_vec())
    }

    /// Asks the remote for a fresh list based on the trip's activities.
    pub async fn generate<P: PackingApi>(
        api: &P,
        trip_id: TripId,
        activities: &ActivitySet,
    ) -> Result<Self, FetchError> {
        let items = api.generate_packing_list(trip_id, activities).await?;
        tracing::debug!("generated {} packing items for trip {trip_id}", items.len());
        Ok(Self::new(trip_id, items))
    }

    pub fn trip_id(&self) -> TripId {
        self.trip_id
    }

    pub fn items(&self) -> &[PackingEntry] {
        &self.items
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.checked.contains(id)
    }

    /// Ticks or unticks an item. Checks are never persisted.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.items.iter().any(|item| item.id == id) {
            return false;
        }
        if !self.checked.remove(id) {
            self.checked.insert(id.to_string());
        }
        self.checked.contains(id)
    }

    /// Adds a custom item and saves. Blank names are ignored and return
    /// `Ok(None)`; otherwise the new item id is returned.
    pub async fn add<P: PackingApi>(
        &mut self,
        api: &P,
        name: &str,
    ) -> Result<Option<String>, FetchError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let entry = PackingEntry {
            id: new_id(),
            name: name.to_string(),
            category: CUSTOM_CATEGORY.to_string(),
            description: String::new(),
        };
        let id = entry.id.clone();
        self.items.push(entry);

        self.save(api).await?;
        Ok(Some(id))
    }

    /// Removes an item and saves. Returns `Ok(false)` for unknown ids without
    /// saving.
    pub async fn remove<P: PackingApi>(&mut self, api: &P, id: &str) -> Result<bool, FetchError> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return Ok(false);
        }
        self.checked.remove(id);

        self.save(api).await?;
        Ok(true)
    }

    pub fn to_list(&self) -> PackingList {
        PackingList(self.items.iter().map(PackingEntry::to_item).collect())
    }

    /// Persists the whole list on the trip.
    pub async fn save<P: PackingApi>(&self, api: &P) -> Result<(), FetchError> {
        api.save_packing_list(self.trip_id, &self.to_list())
            .await
            .map_err(|err| {
                let err = FetchError::from(err);
                tracing::warn!("saving packing list of trip {} failed: {err}", self.trip_id);
                err
            })
    }
}

/// Cultural insights about how to dress at the destination.
pub fn dress_codes(insights: &[CulturalInsight]) -> Vec<&CulturalInsight> {
    insights
        .iter()
        .filter(|insight| insight.is_dress_code())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::error::ClientError;

    use super::*;

    #[derive(Default)]
    struct RecordingApi {
        saved: Mutex<Vec<PackingList>>,
        fail: bool,
    }

    impl PackingApi for RecordingApi {
        async fn generate_packing_list(
            &self,
            _id: TripId,
            activities: &ActivitySet,
        ) -> Result<Vec<PackingItem>, ClientError> {
            Ok(activities
                .iter()
                .map(|activity| PackingItem {
                    name: Some(format!("{activity} gear")),
                    ..PackingItem::default()
                })
                .collect())
        }

        async fn save_packing_list(
            &self,
            _id: TripId,
            list: &PackingList,
        ) -> Result<(), ClientError> {
            if self.fail {
                return Err(ClientError::Server("down".to_string()));
            }
            self.saved.lock().unwrap().push(list.clone());
            Ok(())
        }
    }

    #[test]
    fn remote_items_get_defaults() {
        let entry = PackingEntry::from_remote(PackingItem {
            id: None,
            name: Some(" ".to_string()),
            category: None,
            description: None,
        });
        assert_eq!(entry.name, "Unnamed Item");
        assert_eq!(entry.category, "General");
        assert_eq!(entry.description, "");
        assert!(!entry.id.is_empty());
    }

    #[tokio::test]
    async fn generate_uses_activities() {
        let api = RecordingApi::default();
        let activities = ActivitySet::decode("hiking,beach");
        let editor = PackingListEditor::generate(&api, TripId(1), &activities)
            .await
            .unwrap();
        let names: Vec<_> = editor.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["hiking gear", "beach gear"]);
    }

    #[tokio::test]
    async fn add_and_remove_persist_whole_list() {
        let api = RecordingApi::default();
        let mut editor = PackingListEditor::new(TripId(1), Vec::new());

        assert_eq!(editor.add(&api, "   ").await.unwrap(), None);
        let id = editor.add(&api, " Sunscreen ").await.unwrap().unwrap();
        assert_eq!(editor.items()[0].name, "Sunscreen");
        assert_eq!(editor.items()[0].category, "Other");

        assert!(editor.toggle(&id));
        assert!(editor.is_checked(&id));

        assert!(!editor.remove(&api, "missing").await.unwrap());
        assert!(editor.remove(&api, &id).await.unwrap());
        assert!(!editor.is_checked(&id));

        let saved = api.saved.lock().unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].items().len(), 1);
        assert!(saved[1].is_empty());
    }

    #[tokio::test]
    async fn failed_save_keeps_local_edit() {
        let api = RecordingApi {
            fail: true,
            ..RecordingApi::default()
        };
        let mut editor = PackingListEditor::new(TripId(1), Vec::new());

        let err = editor.add(&api, "Hat").await.unwrap_err();
        assert_eq!(err.message, "Server error: down");
        assert_eq!(editor.items().len(), 1);
    }

    #[test]
    fn toggle_unknown_item_is_noop() {
        let mut editor = PackingListEditor::new(TripId(1), Vec::new());
        assert!(!editor.toggle("nope"));
        assert!(!editor.is_checked("nope"));
    }

    #[test]
    fn dress_codes_filter_by_category() {
        let insights: Vec<CulturalInsight> = serde_json::from_value(serde_json::json!([
            {"id": 1, "category": "dress_code", "title": "Cover shoulders"},
            {"id": 2, "category": "etiquette", "title": "Tipping"},
        ]))
        .unwrap();
        let codes = dress_codes(&insights);
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].title, "Cover shoulders");
    }
}
