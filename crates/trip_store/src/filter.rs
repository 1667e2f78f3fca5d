use std::borrow::Cow;

use api_types::trip::Trip;

/// Trips matching `query`.
///
/// The destination matches case-insensitively; dates are matched as the raw
/// `YYYY-MM-DD` text, so `"06"` finds every trip touching June. An empty
/// query borrows the input unchanged.
pub fn visible<'a>(trips: &'a [Trip], query: &str) -> Cow<'a, [Trip]> {
    if query.is_empty() {
        return Cow::Borrowed(trips);
    }

    let needle = query.to_lowercase();
    Cow::Owned(
        trips
            .iter()
            .filter(|trip| matches(trip, &needle))
            .cloned()
            .collect(),
    )
}

fn matches(trip: &Trip, needle: &str) -> bool {
    trip.destination.to_lowercase().contains(needle)
        || trip.travel_start.to_lowercase().contains(needle)
        || trip.travel_end.to_lowercase().contains(needle)
}
