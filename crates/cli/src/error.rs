use api_types::trip::TripId;
use thiserror::Error;
use trip_store::{ClientError, FetchError, MutateError};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{}", trip_store::error::user_message(.0))]
    Client(#[from] ClientError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Mutate(#[from] MutateError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file error: {0}")]
    Session(#[from] serde_json::Error),
    #[error("not signed in; run `travelmate login` first")]
    NotSignedIn,
    #[error("trip {0} not found")]
    TripNotFound(TripId),
    #[error("{0}")]
    Input(String),
}

impl AppError {
    /// True when the stored session is no longer accepted.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Client(err) => err.is_auth(),
            Self::Fetch(err) => err.source.is_auth(),
            Self::Mutate(MutateError::Remote { source, .. }) => source.is_auth(),
            _ => false,
        }
    }
}
