//! Errors raised by the trip store.
//!
//! - [`ClientError`] is what a single HTTP exchange can fail with.
//! - [`ValidationError`] is raised before any network call.
//! - [`FetchError`] wraps a failed refresh or read with a message fit for a
//!   banner.
//! - [`MutateError`] is returned by create/update/delete.
use thiserror::Error;

/// Failure of one request to the remote trip API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("no credentials available")]
    MissingCredentials,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// True when the user has to sign in again.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::MissingCredentials | Self::Unauthorized)
    }
}

/// Returns the message shown to the user for a failed request.
pub fn user_message(err: &ClientError) -> String {
    match err {
        ClientError::InvalidBaseUrl(message) => format!("Invalid server address: {message}"),
        ClientError::MissingCredentials | ClientError::Unauthorized => {
            "Your session has expired. Please log in again.".to_string()
        }
        ClientError::Forbidden => "You are not allowed to access this trip.".to_string(),
        ClientError::NotFound => "Trip not found.".to_string(),
        ClientError::Conflict(message) => format!("Conflict: {message}"),
        ClientError::Validation(message) => format!("Rejected by the server: {message}"),
        ClientError::Server(message) => format!("Server error: {message}"),
        ClientError::Transport(err) => format!("Server unreachable: {err}"),
    }
}

/// Field validation of a candidate trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("destination is required")]
    MissingDestination,
    #[error("select a place from the suggestions for \"{0}\"")]
    UnresolvedPlace(String),
    #[error("start date is required")]
    MissingStartDate,
    #[error("end date is required")]
    MissingEndDate,
    #[error("\"{0}\" is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },
    #[error("meeting #{0} has no time")]
    MeetingWithoutTime(usize),
}

/// A refresh or read that failed. `message` is meant for a banner.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
    #[source]
    pub source: ClientError,
}

impl From<ClientError> for FetchError {
    fn from(source: ClientError) -> Self {
        Self {
            message: user_message(&source),
            source,
        }
    }
}

/// Failure of a create, update or delete.
#[derive(Debug, Error)]
pub enum MutateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a trip to {destination} from {travel_start} to {travel_end} already exists")]
    Duplicate {
        destination: String,
        travel_start: String,
        travel_end: String,
    },
    #[error("{message}")]
    Remote {
        message: String,
        #[source]
        source: ClientError,
    },
}

impl MutateError {
    /// Validation and duplicate failures are shown next to the form, remote
    /// ones in the banner.
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Duplicate { .. })
    }
}

impl From<ClientError> for MutateError {
    fn from(source: ClientError) -> Self {
        Self::Remote {
            message: user_message(&source),
            source,
        }
    }
}
