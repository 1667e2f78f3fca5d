use std::collections::BTreeMap;

use api_types::trip::{TravelerType, Trip};
use trip_store::{details::TripDetails, packing::PackingEntry};

pub fn trip_line(trip: &Trip) -> String {
    let line = format!(
        "#{} {}, {} to {}",
        trip.id, trip.destination, trip.travel_start, trip.travel_end
    );
    if trip.activities.is_empty() {
        return line;
    }
    format!("{line} [{}]", trip.activities.encode())
}

pub fn details(details: &TripDetails) -> String {
    let trip = &details.trip;
    let mut lines = vec![trip_line(trip)];

    if let (Some(lat), Some(lng)) = (trip.latitude, trip.longitude) {
        lines.push(format!("  at {lat:.4}, {lng:.4}"));
    }
    match trip.traveler_type {
        TravelerType::Casual => {
            lines.push("  casual traveler".to_string());
            if let Some(gender) = &trip.gender {
                lines.push(format!("  gender: {gender}"));
            }
            if let Some(style) = &trip.style_preference {
                lines.push(format!("  style: {style}"));
            }
        }
        TravelerType::Business => {
            lines.push("  business traveler".to_string());
            lines.extend(trip.meeting_schedule.iter().map(|slot| {
                format!("  meeting {} {} {}", slot.time, slot.location, slot.description)
            }));
        }
    }

    if !details.weather.forecast.is_empty() {
        lines.push("\nWeather".to_string());
        lines.extend(details.weather.forecast.iter().map(|day| {
            format!("  {} {:>5.1}°C {}", day.date, day.temperature, day.conditions)
        }));
    }

    let dress_codes = details.dress_codes();
    if !dress_codes.is_empty() {
        lines.push("\nWhat to wear".to_string());
        lines.extend(dress_codes.iter().map(|insight| format!("  {}", insight.title)));
    }

    let others: Vec<_> = details
        .cultural_insights
        .iter()
        .filter(|insight| !insight.is_dress_code())
        .map(|insight| format!("  {}: {}", insight.category, insight.title))
        .collect();
    if !others.is_empty() {
        lines.push("\nCulture".to_string());
        lines.extend(others);
    }

    if !details.travel_tips.is_empty() {
        lines.push("\nTips".to_string());
        lines.extend(
            details
                .travel_tips
                .iter()
                .map(|tip| format!("  {}: {}", tip.heading(), tip.description)),
        );
    }

    let mut out = lines.join("\n");
    out.push('\n');
    if !details.packing_list.is_empty() {
        out.push_str("\nPacking list\n");
        out.push_str(&packing(&details.packing_list));
    }
    out
}

/// Items grouped by category, categories in alphabetical order.
pub fn packing(items: &[PackingEntry]) -> String {
    let mut groups: BTreeMap<&str, Vec<&PackingEntry>> = BTreeMap::new();
    for item in items {
        groups.entry(item.category.as_str()).or_default().push(item);
    }

    let mut out = String::new();
    for (category, entries) in groups {
        out.push_str(&format!("  {category}\n"));
        for entry in entries {
            out.push_str(&format!("    [{}] {}\n", entry.id, entry.name));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str, category: &str) -> PackingEntry {
        PackingEntry {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn trip_line_lists_activities() {
        let trip: Trip = serde_json::from_value(serde_json::json!({
            "id": 2,
            "destination": "Oslo",
            "travel_start": "2025-01-10",
            "travel_end": "2025-01-14",
            "activities": "skiing,museums"
        }))
        .unwrap();
        assert_eq!(
            trip_line(&trip),
            "#2 Oslo, 2025-01-10 to 2025-01-14 [skiing,museums]"
        );
    }

    #[test]
    fn details_lists_each_section_once() {
        let details = TripDetails {
            trip: serde_json::from_value(serde_json::json!({
                "id": 3,
                "destination": "Kyoto",
                "latitude": 35.0116,
                "longitude": 135.7681,
                "travel_start": "2024-04-01",
                "travel_end": "2024-04-05",
                "traveler_type": "business",
                "meeting_schedule": [{"time": "09:00", "location": "HQ", "description": "Kickoff"}]
            }))
            .unwrap(),
            cultural_insights: serde_json::from_value(serde_json::json!([
                {"category": "dress_code", "title": "Remove shoes indoors"},
                {"category": "etiquette", "title": "Bow when greeting"}
            ]))
            .unwrap(),
            travel_tips: serde_json::from_value(serde_json::json!([
                {"category": "transport", "description": "Get an ICOCA card"}
            ]))
            .unwrap(),
            packing_list: vec![entry("a", "Umbrella", "Weather")],
            weather: serde_json::from_value(serde_json::json!({
                "forecast": [{"date": "2024-04-01", "temperature": 14.0, "conditions": "Cloudy"}]
            }))
            .unwrap(),
        };

        assert_eq!(
            super::details(&details),
            "#3 Kyoto, 2024-04-01 to 2024-04-05\n\
             \x20 at 35.0116, 135.7681\n\
             \x20 business traveler\n\
             \x20 meeting 09:00 HQ Kickoff\n\
             \nWeather\n\
             \x20 2024-04-01  14.0°C Cloudy\n\
             \nWhat to wear\n\
             \x20 Remove shoes indoors\n\
             \nCulture\n\
             \x20 etiquette: Bow when greeting\n\
             \nTips\n\
             \x20 transport: Get an ICOCA card\n\
             \nPacking list\n\
             \x20 Weather\n\
             \x20   [a] Umbrella\n"
        );
    }

    #[test]
    fn packing_groups_by_category() {
        let out = packing(&[
            entry("a", "Boots", "Shoes"),
            entry("b", "Hat", "Clothes"),
            entry("c", "Sandals", "Shoes"),
        ]);
        assert_eq!(
            out,
            "  Clothes\n    [b] Hat\n  Shoes\n    [a] Boots\n    [c] Sandals\n"
        );
    }
}
