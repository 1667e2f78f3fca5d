use std::collections::HashSet;

use api_types::trip::Trip;

/// Identity of a trip for de-duplication and conflict checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TripKey<'a> {
    pub destination: &'a str,
    pub travel_start: &'a str,
    pub travel_end: &'a str,
}

impl<'a> TripKey<'a> {
    pub fn new(destination: &'a str, travel_start: &'a str, travel_end: &'a str) -> Self {
        Self {
            destination,
            travel_start,
            travel_end,
        }
    }

    pub fn of(trip: &'a Trip) -> Self {
        Self::new(&trip.destination, &trip.travel_start, &trip.travel_end)
    }
}

/// Keeps the first trip of every key, in the order the remote returned them.
pub fn dedup_trips(trips: Vec<Trip>) -> Vec<Trip> {
    let firsts: Vec<bool> = {
        let mut seen = HashSet::with_capacity(trips.len());
        trips.iter().map(|trip| seen.insert(TripKey::of(trip))).collect()
    };

    trips
        .into_iter()
        .zip(firsts)
        .filter_map(|(trip, first)| {
            if !first {
                tracing::warn!(
                    "dropping duplicate trip {} ({} - {} to {})",
                    trip.id,
                    trip.destination,
                    trip.travel_start,
                    trip.travel_end
                );
            }
            first.then_some(trip)
        })
        .collect()
}

/// Whether any trip in `trips` has `key`.
pub fn contains_key(trips: &[Trip], key: TripKey<'_>) -> bool {
    trips.iter().any(|trip| TripKey::of(trip) == key)
}
