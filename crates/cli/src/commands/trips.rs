use api_types::{Activity, ActivitySet, details::ItineraryActivity, trip::TripId};
use chrono::NaiveDate;
use trip_store::{
    ConfirmedDelete, HttpClient, Place, TripCollectionStore, TripForm,
    details::{self as trip_details, load_details},
};

use super::prompt;
use crate::{
    config::{ActivityArgs, TripArgs},
    error::{AppError, Result},
    render,
};

impl TripArgs {
    /// Copies the given flags onto the form; absent flags leave the field as
    /// it is.
    pub fn apply(self, form: &mut TripForm) -> Result<()> {
        let coordinates = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            (None, None) => None,
            _ => {
                return Err(AppError::Input(
                    "--lat and --lng must be given together".to_string(),
                ));
            }
        };

        if let Some(destination) = &self.destination {
            form.set_destination_text(destination.trim());
        }
        if let Some((lat, lng)) = coordinates {
            form.select_place(Place {
                name: form.destination().to_string(),
                latitude: Some(lat),
                longitude: Some(lng),
            });
        }

        if let Some(start) = self.start {
            form.travel_start = start;
        }
        if let Some(end) = self.end {
            form.travel_end = end;
        }
        if !self.activities.is_empty() {
            form.set_activities(parse_activities(&self.activities)?);
        }

        if let Some(traveler) = self.traveler {
            form.set_traveler_type(traveler);
        }
        if self.gender.is_some() {
            form.gender = self.gender;
        }
        if self.style.is_some() {
            form.style_preference = self.style;
        }
        if !self.meetings.is_empty() {
            while form.remove_meeting(0).is_some() {}
            for slot in self.meetings {
                form.add_meeting(slot);
            }
        }
        Ok(())
    }
}

impl ActivityArgs {
    pub fn into_activity(self) -> Result<ItineraryActivity> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Input("activity name must not be empty".to_string()));
        }
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => String::new(),
            Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|_| AppError::Input(format!("\"{date}\" is not a YYYY-MM-DD date")))?
                .to_string(),
        };
        Ok(ItineraryActivity {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            date,
            location: self.location.trim().to_string(),
            packing_requirements: self.packing_requirements,
            weather_considerations: self.weather_considerations,
        })
    }
}

fn parse_activities(raw: &[String]) -> Result<ActivitySet> {
    let mut activities = ActivitySet::new();
    for value in raw {
        match Activity::parse(value) {
            Some(activity) if activity.is_catalog() => {
                activities.insert(activity);
            }
            _ => {
                let known: Vec<_> = Activity::catalog().iter().map(Activity::as_str).collect();
                return Err(AppError::Input(format!(
                    "unknown activity \"{value}\" (expected one of: {})",
                    known.join(", ")
                )));
            }
        }
    }
    Ok(activities)
}

pub async fn list(client: &HttpClient, search: Option<String>) -> Result<()> {
    let mut store = TripCollectionStore::new(client.clone());
    store.refresh().await?;
    store.set_query(search.unwrap_or_default());

    let visible = store.visible();
    if visible.is_empty() {
        println!("No trips found.");
        return Ok(());
    }
    for trip in visible.iter() {
        println!("{}", render::trip_line(trip));
    }
    Ok(())
}

pub async fn create(client: &HttpClient, fields: TripArgs) -> Result<()> {
    let mut store = TripCollectionStore::new(client.clone());
    store.refresh().await?;

    fields.apply(store.open_create())?;
    submit(&mut store).await
}

pub async fn edit(client: &HttpClient, id: TripId, fields: TripArgs) -> Result<()> {
    let mut store = TripCollectionStore::new(client.clone());
    store.refresh().await?;

    let form = store.open_edit(id).ok_or(AppError::TripNotFound(id))?;
    fields.apply(form)?;
    submit(&mut store).await
}

async fn submit(store: &mut TripCollectionStore<HttpClient>) -> Result<()> {
    let Some(result) = store.submit_pending().await else {
        return Ok(());
    };
    let trip = result?;
    println!("Saved trip {}.", render::trip_line(&trip));
    warn_banner(store);
    Ok(())
}

pub async fn delete(client: &HttpClient, id: TripId, yes: bool) -> Result<()> {
    let mut store = TripCollectionStore::new(client.clone());
    store.refresh().await?;
    let trip = store.trip(id).ok_or(AppError::TripNotFound(id))?;

    if !yes {
        let answer = prompt(&format!("Delete {}? [y/N] ", render::trip_line(trip)))?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Kept trip {id}.");
            return Ok(());
        }
    }

    store.delete(ConfirmedDelete::new(id)).await?;
    println!("Deleted trip {id}.");
    warn_banner(&store);
    Ok(())
}

pub async fn show(client: &HttpClient, id: TripId) -> Result<()> {
    let details = load_details(client, id).await?;
    print!("{}", render::details(&details));
    Ok(())
}

pub async fn add_activity(client: &HttpClient, id: TripId, fields: ActivityArgs) -> Result<()> {
    let activity = fields.into_activity()?;
    let details = trip_details::add_activity(client, id, &activity).await?;
    println!("Added {} to trip {id}.", activity.name);
    print!("{}", render::details(&details));
    Ok(())
}

/// The mutation went through but the list could not be reloaded.
fn warn_banner(store: &TripCollectionStore<HttpClient>) {
    if let Some(banner) = store.banner() {
        eprintln!("warning: {banner}");
    }
}
