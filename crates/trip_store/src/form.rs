//! Editable form state for creating or editing a trip.
//!
//! The form keeps the fields of both traveler types: switching the type only
//! changes which group is shown, and [`TripForm::to_draft`] drops the hidden
//! group before anything is submitted.

use api_types::{
    Activity, ActivitySet,
    trip::{MeetingSlot, TravelerType, Trip},
};

use crate::validate::{Place, TravelerDetails, TripDraft};

/// One row of the activity multi-select.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityOption {
    pub activity: Activity,
    pub selected: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TripForm {
    destination: String,
    place: Option<Place>,
    pub travel_start: String,
    pub travel_end: String,
    activities: ActivitySet,
    traveler_type: TravelerType,
    pub gender: Option<String>,
    pub style_preference: Option<String>,
    meeting_schedule: Vec<MeetingSlot>,
}

impl TripForm {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Seeds the form from a stored trip. The stored destination counts as a
    /// selected place.
    pub fn from_trip(trip: &Trip) -> Self {
        Self {
            destination: trip.destination.clone(),
            place: Some(Place {
                name: trip.destination.clone(),
                latitude: trip.latitude,
                longitude: trip.longitude,
            }),
            travel_start: trip.travel_start.clone(),
            travel_end: trip.travel_end.clone(),
            activities: trip.activities.clone(),
            traveler_type: trip.traveler_type,
            gender: trip.gender.clone(),
            style_preference: trip.style_preference.clone(),
            meeting_schedule: trip.meeting_schedule.clone(),
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn place(&self) -> Option<&Place> {
        self.place.as_ref()
    }

    /// Free-text edit of the destination. Any edit that no longer matches
    /// the selected place clears the selection.
    pub fn set_destination_text(&mut self, text: &str) {
        self.destination = text.to_string();
        if self
            .place
            .as_ref()
            .is_some_and(|place| place.name != self.destination)
        {
            self.place = None;
        }
    }

    pub fn select_place(&mut self, place: Place) {
        self.destination = place.name.clone();
        self.place = Some(place);
    }

    pub fn activities(&self) -> &ActivitySet {
        &self.activities
    }

    /// The catalog with the current selection, followed by any selected
    /// activity outside the catalog.
    pub fn activity_options(&self) -> Vec<ActivityOption> {
        let catalog = Activity::catalog().iter().map(|activity| ActivityOption {
            activity: activity.clone(),
            selected: self.activities.contains(activity),
        });
        let extra = self
            .activities
            .iter()
            .filter(|activity| !activity.is_catalog())
            .map(|activity| ActivityOption {
                activity: activity.clone(),
                selected: true,
            });
        catalog.chain(extra).collect()
    }

    pub fn toggle_activity(&mut self, activity: Activity) -> bool {
        self.activities.toggle(activity)
    }

    pub fn set_activities(&mut self, activities: ActivitySet) {
        self.activities = activities;
    }

    pub fn traveler_type(&self) -> TravelerType {
        self.traveler_type
    }

    /// Switches the visible field group; hidden values are kept.
    pub fn set_traveler_type(&mut self, traveler_type: TravelerType) {
        self.traveler_type = traveler_type;
    }

    pub fn meetings(&self) -> &[MeetingSlot] {
        &self.meeting_schedule
    }

    pub fn add_meeting(&mut self, slot: MeetingSlot) {
        self.meeting_schedule.push(slot);
    }

    pub fn meeting_mut(&mut self, index: usize) -> Option<&mut MeetingSlot> {
        self.meeting_schedule.get_mut(index)
    }

    pub fn remove_meeting(&mut self, index: usize) -> Option<MeetingSlot> {
        (index < self.meeting_schedule.len()).then(|| self.meeting_schedule.remove(index))
    }

    /// Snapshot for submission, carrying only the active traveler group.
    pub fn to_draft(&self) -> TripDraft {
        let traveler = match self.traveler_type {
            TravelerType::Casual => TravelerDetails::Casual {
                gender: self.gender.clone(),
                style_preference: self.style_preference.clone(),
            },
            TravelerType::Business => TravelerDetails::Business {
                meeting_schedule: self.meeting_schedule.clone(),
            },
        };

        TripDraft {
            destination: self.destination.clone(),
            place: self.place.clone(),
            travel_start: self.travel_start.clone(),
            travel_end: self.travel_end.clone(),
            activities: self.activities.clone(),
            traveler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_trip() -> Trip {
        serde_json::from_value(serde_json::json!({
            "id": 5,
            "destination": "Lisbon",
            "latitude": 38.72,
            "longitude": -9.14,
            "travel_start": "2024-09-01",
            "travel_end": "2024-09-05",
            "activities": "beach,dining,wine tasting",
            "traveler_type": "casual",
            "gender": "male",
            "style_preference": "relaxed",
        }))
        .unwrap()
    }

    #[test]
    fn from_trip_expands_activities_and_place() {
        let form = TripForm::from_trip(&stored_trip());
        assert_eq!(form.place().unwrap().latitude, Some(38.72));

        let options = form.activity_options();
        assert_eq!(options.len(), Activity::catalog().len() + 1);
        let selected: Vec<_> = options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.activity.as_str().to_string())
            .collect();
        assert_eq!(selected, vec!["beach", "dining", "wine tasting"]);
    }

    #[test]
    fn editing_destination_clears_selected_place() {
        let mut form = TripForm::from_trip(&stored_trip());
        form.set_destination_text("Lisbon");
        assert!(form.place().is_some());

        form.set_destination_text("Lisb");
        assert!(form.place().is_none());

        form.select_place(Place::named("Porto"));
        assert_eq!(form.destination(), "Porto");
        assert!(form.place().is_some());
    }

    #[test]
    fn toggling_traveler_type_keeps_hidden_values() {
        let mut form = TripForm::from_trip(&stored_trip());
        form.set_traveler_type(TravelerType::Business);
        form.add_meeting(MeetingSlot {
            time: "09:00".to_string(),
            location: "HQ".to_string(),
            description: "kickoff".to_string(),
        });

        form.set_traveler_type(TravelerType::Casual);
        assert_eq!(form.gender.as_deref(), Some("male"));
        assert_eq!(form.meetings().len(), 1);

        form.set_traveler_type(TravelerType::Business);
        assert_eq!(form.meetings()[0].location, "HQ");
    }

    #[test]
    fn draft_strips_hidden_group() {
        let mut form = TripForm::from_trip(&stored_trip());
        form.set_traveler_type(TravelerType::Business);
        form.add_meeting(MeetingSlot {
            time: "10:00".to_string(),
            ..MeetingSlot::default()
        });

        let payload = form.to_draft().validate().unwrap();
        assert_eq!(payload.traveler_type, TravelerType::Business);
        assert_eq!(payload.gender, None);
        assert_eq!(payload.style_preference, None);

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("gender").is_none());
        assert!(json.get("style_preference").is_none());
        assert_eq!(json["activities"], "beach,dining,wine tasting");
    }

    #[test]
    fn remove_meeting_out_of_range_is_none() {
        let mut form = TripForm::empty();
        assert!(form.remove_meeting(0).is_none());
        form.add_meeting(MeetingSlot::default());
        assert!(form.remove_meeting(0).is_some());
        assert!(form.meetings().is_empty());
    }

    #[test]
    fn dates_stay_literal() {
        let form = TripForm::from_trip(&stored_trip());
        let draft = form.to_draft();
        assert_eq!(draft.travel_start, "2024-09-01");
        assert_eq!(draft.travel_end, "2024-09-05");
    }
}
