use api_types::{
    details::{CulturalInsight, ItineraryActivity, TravelTip, WeatherReport},
    trip::{Trip, TripId},
};

use crate::{
    client::HttpClient,
    error::FetchError,
    packing::{PackingEntry, dress_codes},
};

/// Everything the trip detail view shows.
#[derive(Debug, Clone)]
pub struct TripDetails {
    pub trip: Trip,
    pub cultural_insights: Vec<CulturalInsight>,
    pub travel_tips: Vec<TravelTip>,
    pub packing_list: Vec<PackingEntry>,
    pub weather: WeatherReport,
}

impl TripDetails {
    pub fn dress_codes(&self) -> Vec<&CulturalInsight> {
        dress_codes(&self.cultural_insights)
    }
}

/// Loads the detail view of a trip; all reads run concurrently and the first
/// failure fails the whole load.
pub async fn load_details(client: &HttpClient, id: TripId) -> Result<TripDetails, FetchError> {
    let (trip, cultural_insights, travel_tips, packing, weather) = tokio::try_join!(
        client.trip(id),
        client.cultural_insights(id),
        client.travel_tips(id),
        client.packing_list(id),
        client.weather(id),
    )
    .map_err(|err| {
        tracing::warn!("loading details of trip {id} failed: {err}");
        FetchError::from(err)
    })?;

    Ok(TripDetails {
        trip,
        cultural_insights,
        travel_tips,
        packing_list: packing.into_iter().map(PackingEntry::from_remote).collect(),
        weather,
    })
}

/// Adds an itinerary entry to the trip, then reloads the detail view so it
/// reflects whatever the remote derived from the new entry.
pub async fn add_activity(
    client: &HttpClient,
    id: TripId,
    activity: &ItineraryActivity,
) -> Result<TripDetails, FetchError> {
    client
        .add_itinerary_activity(id, activity)
        .await
        .map_err(|err| {
            tracing::warn!("adding activity to trip {id} failed: {err}");
            FetchError::from(err)
        })?;
    tracing::info!("added activity {:?} to trip {id}", activity.name);

    load_details(client, id).await
}
