//! The client-side view of "my trips".
//!
//! Every successful mutation is followed by a full [`refresh`]: the cached
//! list is always what the remote returned last, never a local patch.
//! Mutations take `&mut self`, so one store can only have one mutation in
//! flight at a time.
//!
//! [`refresh`]: TripCollectionStore::refresh

use std::borrow::Cow;

use api_types::trip::{Trip, TripId};

use crate::{
    client::TripApi,
    error::{ClientError, FetchError, MutateError},
    filter,
    form::TripForm,
    normalize::{TripKey, contains_key, dedup_trips},
    validate::TripDraft,
};

/// Proof that the user confirmed the deletion of a trip.
///
/// Only construct it from a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedDelete(TripId);

impl ConfirmedDelete {
    pub fn new(id: TripId) -> Self {
        Self(id)
    }

    pub fn id(&self) -> TripId {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(TripId),
}

/// Form of the open create/edit dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingForm {
    pub mode: FormMode,
    pub form: TripForm,
}

pub struct TripCollectionStore<A> {
    api: A,
    trips: Vec<Trip>,
    query: String,
    pending: Option<PendingForm>,
    banner: Option<String>,
}

impl<A: TripApi> TripCollectionStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            trips: Vec::new(),
            query: String::new(),
            pending: None,
            banner: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Every cached trip.
    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn trip(&self, id: TripId) -> Option<&Trip> {
        self.trips.iter().find(|trip| trip.id == id)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Cached trips matching the current search query.
    pub fn visible(&self) -> Cow<'_, [Trip]> {
        filter::visible(&self.trips, &self.query)
    }

    /// Last remote failure, shown until dismissed.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Replaces the cached list with the remote one, minus duplicates.
    ///
    /// On failure the cached list is left as it was.
    pub async fn refresh(&mut self) -> Result<&[Trip], FetchError> {
        match self.api.list_trips().await {
            Ok(trips) => {
                let received = trips.len();
                self.trips = dedup_trips(trips);
                tracing::info!(
                    "refreshed trips: {} received, {} kept",
                    received,
                    self.trips.len()
                );
                Ok(&self.trips)
            }
            Err(err) => {
                let err = FetchError::from(err);
                tracing::warn!("trip refresh failed: {err}");
                self.banner = Some(err.message.clone());
                Err(err)
            }
        }
    }

    /// Creates a trip. The new trip shows up once the following refresh
    /// completes.
    pub async fn create(&mut self, draft: &TripDraft) -> Result<Trip, MutateError> {
        let payload = draft.validate()?;

        let key = TripKey::new(
            &payload.destination,
            &payload.travel_start,
            &payload.travel_end,
        );
        if contains_key(&self.trips, key) {
            return Err(MutateError::Duplicate {
                destination: payload.destination.clone(),
                travel_start: payload.travel_start.clone(),
                travel_end: payload.travel_end.clone(),
            });
        }

        let created = match self.api.create_trip(&payload).await {
            Ok(trip) => trip,
            Err(err) => return Err(self.remote_failure("create", err)),
        };
        tracing::info!("created trip {} to {}", created.id, created.destination);

        self.refresh_after_mutation().await;
        Ok(created)
    }

    /// Replaces every mutable field of trip `id`. Keeping the trip's own key
    /// is not a conflict, so no duplicate check is made.
    pub async fn update(&mut self, id: TripId, draft: &TripDraft) -> Result<Trip, MutateError> {
        let payload = draft.validate()?;

        let updated = match self.api.update_trip(id, &payload).await {
            Ok(trip) => trip,
            Err(err) => return Err(self.remote_failure("update", err)),
        };
        tracing::info!("updated trip {id}");

        self.refresh_after_mutation().await;
        Ok(updated)
    }

    pub async fn delete(&mut self, confirmed: ConfirmedDelete) -> Result<(), MutateError> {
        let id = confirmed.id();
        if let Err(err) = self.api.delete_trip(id).await {
            return Err(self.remote_failure("delete", err));
        }
        tracing::info!("deleted trip {id}");

        self.trips.retain(|trip| trip.id != id);
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Opens an empty create dialog, replacing any open one.
    pub fn open_create(&mut self) -> &mut TripForm {
        &mut self
            .pending
            .insert(PendingForm {
                mode: FormMode::Create,
                form: TripForm::empty(),
            })
            .form
    }

    /// Opens the edit dialog for a cached trip.
    pub fn open_edit(&mut self, id: TripId) -> Option<&mut TripForm> {
        let form = TripForm::from_trip(self.trip(id)?);
        Some(
            &mut self
                .pending
                .insert(PendingForm {
                    mode: FormMode::Edit(id),
                    form,
                })
                .form,
        )
    }

    pub fn pending(&self) -> Option<&PendingForm> {
        self.pending.as_ref()
    }

    pub fn pending_mut(&mut self) -> Option<&mut TripForm> {
        self.pending.as_mut().map(|pending| &mut pending.form)
    }

    /// Closes the dialog; its content is discarded.
    pub fn cancel_pending(&mut self) -> Option<PendingForm> {
        self.pending.take()
    }

    /// Submits the open dialog. It is closed on success and kept open on
    /// failure. Returns `None` when no dialog is open.
    pub async fn submit_pending(&mut self) -> Option<Result<Trip, MutateError>> {
        let pending = self.pending.as_ref()?;
        let mode = pending.mode;
        let draft = pending.form.to_draft();

        let result = match mode {
            FormMode::Create => self.create(&draft).await,
            FormMode::Edit(id) => self.update(id, &draft).await,
        };
        if result.is_ok() {
            self.pending = None;
        }
        Some(result)
    }

    fn remote_failure(&mut self, action: &str, err: ClientError) -> MutateError {
        let err = MutateError::from(err);
        tracing::warn!("trip {action} failed: {err}");
        self.banner = Some(err.to_string());
        err
    }

    /// The mutation already went through; a failed refresh only leaves the
    /// cache stale and is reported in the banner.
    async fn refresh_after_mutation(&mut self) {
        if let Err(err) = self.refresh().await {
            tracing::warn!("refresh after mutation failed, cached trips may be stale: {err}");
        }
    }
}
