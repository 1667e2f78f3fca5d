//! Client-side checks run before a trip is sent to the remote store.

use api_types::{
    ActivitySet,
    trip::{MeetingSlot, TravelerType, TripPayload},
};
use chrono::NaiveDate;

use crate::error::ValidationError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A place picked from the lookup suggestions.
#[derive(Clone, Debug, PartialEq)]
pub struct Place {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Place {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            latitude: None,
            longitude: None,
        }
    }
}

/// Fields that only apply to one traveler type.
#[derive(Clone, Debug, PartialEq)]
pub enum TravelerDetails {
    Casual {
        gender: Option<String>,
        style_preference: Option<String>,
    },
    Business {
        meeting_schedule: Vec<MeetingSlot>,
    },
}

impl TravelerDetails {
    pub fn traveler_type(&self) -> TravelerType {
        match self {
            Self::Casual { .. } => TravelerType::Casual,
            Self::Business { .. } => TravelerType::Business,
        }
    }
}

/// A trip about to be created or updated.
#[derive(Clone, Debug, PartialEq)]
pub struct TripDraft {
    /// Text typed in the destination field.
    pub destination: String,
    /// Explicitly selected place; required for submission.
    pub place: Option<Place>,
    pub travel_start: String,
    pub travel_end: String,
    pub activities: ActivitySet,
    pub traveler: TravelerDetails,
}

impl TripDraft {
    /// Checks the draft and builds the request body.
    pub fn validate(&self) -> Result<TripPayload, ValidationError> {
        let place = match &self.place {
            Some(place) if !place.name.trim().is_empty() => place,
            Some(_) => return Err(ValidationError::MissingDestination),
            None if self.destination.trim().is_empty() => {
                return Err(ValidationError::MissingDestination);
            }
            None => {
                return Err(ValidationError::UnresolvedPlace(
                    self.destination.trim().to_string(),
                ));
            }
        };

        let travel_start = self.travel_start.trim();
        let travel_end = self.travel_end.trim();
        if travel_start.is_empty() {
            return Err(ValidationError::MissingStartDate);
        }
        if travel_end.is_empty() {
            return Err(ValidationError::MissingEndDate);
        }
        let start = parse_date(travel_start)?;
        let end = parse_date(travel_end)?;
        if start > end {
            return Err(ValidationError::InvertedRange {
                start: travel_start.to_string(),
                end: travel_end.to_string(),
            });
        }

        let mut payload = TripPayload {
            destination: place.name.trim().to_string(),
            latitude: place.latitude,
            longitude: place.longitude,
            travel_start: travel_start.to_string(),
            travel_end: travel_end.to_string(),
            activities: self.activities.clone(),
            traveler_type: self.traveler.traveler_type(),
            gender: None,
            style_preference: None,
            meeting_schedule: None,
        };

        match &self.traveler {
            TravelerDetails::Casual {
                gender,
                style_preference,
            } => {
                payload.gender = non_blank(gender.as_deref());
                payload.style_preference = non_blank(style_preference.as_deref());
            }
            TravelerDetails::Business { meeting_schedule } => {
                if let Some(pos) = meeting_schedule
                    .iter()
                    .position(|slot| slot.time.trim().is_empty())
                {
                    return Err(ValidationError::MeetingWithoutTime(pos + 1));
                }
                payload.meeting_schedule = Some(meeting_schedule.clone());
            }
        }

        Ok(payload)
    }
}

/// Parses a literal calendar date. Only the canonical zero-padded form is
/// accepted since dates are compared and searched as text.
fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .filter(|date| date.format(DATE_FORMAT).to_string() == raw)
        .ok_or_else(|| ValidationError::InvalidDate(raw.to_string()))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use api_types::Activity;

    use super::*;

    fn draft() -> TripDraft {
        TripDraft {
            destination: "Paris".to_string(),
            place: Some(Place {
                name: "Paris".to_string(),
                latitude: Some(48.85),
                longitude: Some(2.35),
            }),
            travel_start: "2024-06-01".to_string(),
            travel_end: "2024-06-10".to_string(),
            activities: [Activity::Sightseeing].into_iter().collect(),
            traveler: TravelerDetails::Casual {
                gender: Some("female".to_string()),
                style_preference: Some("  ".to_string()),
            },
        }
    }

    #[test]
    fn valid_casual_draft() {
        let payload = draft().validate().unwrap();
        assert_eq!(payload.destination, "Paris");
        assert_eq!(payload.latitude, Some(48.85));
        assert_eq!(payload.traveler_type, TravelerType::Casual);
        assert_eq!(payload.gender.as_deref(), Some("female"));
        assert_eq!(payload.style_preference, None);
        assert_eq!(payload.meeting_schedule, None);
    }

    #[test]
    fn same_day_trip_is_valid() {
        let mut d = draft();
        d.travel_end = d.travel_start.clone();
        assert!(d.validate().is_ok());
    }

    #[test]
    fn typed_but_unselected_place_is_rejected() {
        let mut d = draft();
        d.place = None;
        assert_eq!(
            d.validate().unwrap_err(),
            ValidationError::UnresolvedPlace("Paris".to_string())
        );
    }

    #[test]
    fn empty_destination_is_rejected() {
        let mut d = draft();
        d.place = None;
        d.destination = "   ".to_string();
        assert_eq!(d.validate().unwrap_err(), ValidationError::MissingDestination);
    }

    #[test]
    fn missing_dates_are_rejected() {
        let mut d = draft();
        d.travel_start.clear();
        assert_eq!(d.validate().unwrap_err(), ValidationError::MissingStartDate);

        let mut d = draft();
        d.travel_end.clear();
        assert_eq!(d.validate().unwrap_err(), ValidationError::MissingEndDate);
    }

    #[test]
    fn non_canonical_dates_are_rejected() {
        for bad in ["2024-6-1", "01/06/2024", "2024-02-30", "tomorrow"] {
            let mut d = draft();
            d.travel_start = bad.to_string();
            assert_eq!(
                d.validate().unwrap_err(),
                ValidationError::InvalidDate(bad.to_string())
            );
        }
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut d = draft();
        d.travel_start = "2024-06-11".to_string();
        assert_eq!(
            d.validate().unwrap_err(),
            ValidationError::InvertedRange {
                start: "2024-06-11".to_string(),
                end: "2024-06-10".to_string(),
            }
        );
    }

    #[test]
    fn business_draft_carries_schedule_only() {
        let mut d = draft();
        d.traveler = TravelerDetails::Business {
            meeting_schedule: vec![MeetingSlot {
                time: "09:00".to_string(),
                location: "HQ".to_string(),
                description: "kickoff".to_string(),
            }],
        };
        let payload = d.validate().unwrap();
        assert_eq!(payload.traveler_type, TravelerType::Business);
        assert_eq!(payload.gender, None);
        assert_eq!(payload.meeting_schedule.unwrap().len(), 1);
    }

    #[test]
    fn meeting_without_time_is_rejected() {
        let mut d = draft();
        d.traveler = TravelerDetails::Business {
            meeting_schedule: vec![
                MeetingSlot {
                    time: "09:00".to_string(),
                    ..MeetingSlot::default()
                },
                MeetingSlot::default(),
            ],
        };
        assert_eq!(d.validate().unwrap_err(), ValidationError::MeetingWithoutTime(2));
    }
}
