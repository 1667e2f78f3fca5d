//! Client-side trip collection.
//!
//! Keeps one user's list of trips in sync with the remote trip API: fetches
//! and de-duplicates the list, filters it by a search query, validates and
//! submits creates, updates and deletes, and maps trips to and from an
//! editable form.

pub mod auth;
pub mod client;
pub mod details;
pub mod error;
pub mod filter;
pub mod form;
pub mod normalize;
pub mod packing;
pub mod store;
pub mod validate;

pub use auth::{AuthContext, Session};
pub use client::{HttpClient, PackingApi, TripApi};
pub use error::{ClientError, FetchError, MutateError, ValidationError};
pub use form::TripForm;
pub use store::{ConfirmedDelete, FormMode, PendingForm, TripCollectionStore};
pub use validate::{Place, TravelerDetails, TripDraft};
