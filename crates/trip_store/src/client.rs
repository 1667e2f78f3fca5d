//! HTTP access to the remote trip API.
//!
//! [`TripApi`] and [`PackingApi`] are the seams the store and the packing
//! editor are written against; [`HttpClient`] implements both over `reqwest`.

use std::{future::Future, time::Duration};

use api_types::{
    ActivitySet,
    auth::{AccessToken, SignupRequest, SignupResponse, TokenPair, TokenRefresh, TokenRequest},
    details::{CulturalInsight, ItineraryActivity, TravelTip, WeatherReport},
    packing::{PackingItem, PackingList, PackingListResponse, PackingPatch, PackingRequest},
    trip::{Trip, TripId, TripPayload},
};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    auth::{AuthContext, Session},
    error::ClientError,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote operations on the trip collection.
pub trait TripApi {
    fn list_trips(&self) -> impl Future<Output = Result<Vec<Trip>, ClientError>> + Send;

    fn create_trip(
        &self,
        payload: &TripPayload,
    ) -> impl Future<Output = Result<Trip, ClientError>> + Send;

    fn update_trip(
        &self,
        id: TripId,
        payload: &TripPayload,
    ) -> impl Future<Output = Result<Trip, ClientError>> + Send;

    fn delete_trip(&self, id: TripId) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Remote operations on a trip's packing list.
pub trait PackingApi {
    /// Asks the remote to suggest a packing list for the given activities.
    fn generate_packing_list(
        &self,
        id: TripId,
        activities: &ActivitySet,
    ) -> impl Future<Output = Result<Vec<PackingItem>, ClientError>> + Send;

    /// Persists the whole list on the trip.
    fn save_packing_list(
        &self,
        id: TripId,
        list: &PackingList,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: Url,
    http: reqwest::Client,
    auth: AuthContext,
}

impl HttpClient {
    pub fn new(base_url: &str, auth: AuthContext) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, auth, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        auth: AuthContext,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        // `Url::join` replaces the last segment unless the base ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|err| ClientError::InvalidBaseUrl(err.to_string()))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            http,
            auth,
        })
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ClientError::InvalidBaseUrl(err.to_string()))
    }

    /// Attaches the bearer token of the current session.
    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self
            .auth
            .current_token()
            .ok_or(ClientError::MissingCredentials)?;
        Ok(req.bearer_auth(token))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let endpoint = self.endpoint(path)?;
        tracing::debug!("GET {endpoint}");
        let req = self.authorized(self.http.get(endpoint))?;
        read_json(req.send().await?).await
    }

    async fn send_json<TReq, TResp>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &TReq,
    ) -> Result<TResp, ClientError>
    where
        TReq: serde::Serialize + ?Sized,
        TResp: DeserializeOwned,
    {
        let endpoint = self.endpoint(path)?;
        tracing::debug!("{method} {endpoint}");
        let req = self.authorized(self.http.request(method, endpoint).json(body))?;
        read_json(req.send().await?).await
    }

    /// Registers a new account and returns the server's confirmation. The
    /// context stays signed out; call [`HttpClient::login`] afterwards.
    pub async fn signup(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let endpoint = self.endpoint("api/signup/")?;
        tracing::debug!("POST {endpoint}");
        let res = self
            .http
            .post(endpoint)
            .json(&SignupRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let created: SignupResponse = read_json(res).await?;
        tracing::info!("created account {username}");
        Ok(created.message)
    }

    /// Exchanges credentials for a token pair and signs the context in.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let endpoint = self.endpoint("token/")?;
        tracing::debug!("POST {endpoint}");
        let res = self
            .http
            .post(endpoint)
            .json(&TokenRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let tokens: TokenPair = read_json(res).await?;
        let session = Session::from_tokens(username, tokens);
        self.auth.sign_in(session.clone());
        Ok(session)
    }

    /// Trades the refresh token for a new access token.
    ///
    /// A rejected refresh token signs the context out.
    pub async fn refresh_access(&self) -> Result<(), ClientError> {
        let refresh = self
            .auth
            .session()
            .and_then(|session| session.refresh)
            .ok_or(ClientError::MissingCredentials)?;

        let endpoint = self.endpoint("token/refresh/")?;
        tracing::debug!("POST {endpoint}");
        let res = self
            .http
            .post(endpoint)
            .json(&TokenRefresh { refresh })
            .send()
            .await?;

        match read_json::<AccessToken>(res).await {
            Ok(token) => {
                self.auth.replace_access(token.access);
                Ok(())
            }
            Err(err) => {
                if err.is_auth() {
                    self.auth.sign_out();
                }
                Err(err)
            }
        }
    }

    pub async fn trip(&self, id: TripId) -> Result<Trip, ClientError> {
        self.get_json(&format!("api/trips/{id}/")).await
    }

    pub async fn weather(&self, id: TripId) -> Result<WeatherReport, ClientError> {
        self.get_json(&format!("api/trips/{id}/weather/")).await
    }

    pub async fn cultural_insights(&self, id: TripId) -> Result<Vec<CulturalInsight>, ClientError> {
        self.get_json(&format!("api/trips/{id}/cultural-insights/"))
            .await
    }

    pub async fn travel_tips(&self, id: TripId) -> Result<Vec<TravelTip>, ClientError> {
        self.get_json(&format!("api/trips/{id}/travel-tips/")).await
    }

    /// Packing list as currently computed by the remote.
    pub async fn packing_list(&self, id: TripId) -> Result<Vec<PackingItem>, ClientError> {
        let res: PackingListResponse = self
            .get_json(&format!("api/trips/{id}/packing-list/"))
            .await?;
        Ok(res.into_items())
    }

    /// Adds an entry to the trip's itinerary.
    pub async fn add_itinerary_activity(
        &self,
        id: TripId,
        activity: &ItineraryActivity,
    ) -> Result<(), ClientError> {
        let endpoint = self.endpoint(&format!("api/trips/{id}/activities/"))?;
        tracing::debug!("POST {endpoint}");
        let req = self.authorized(self.http.post(endpoint).json(activity))?;
        expect_success(req.send().await?).await
    }
}

impl TripApi for HttpClient {
    async fn list_trips(&self) -> Result<Vec<Trip>, ClientError> {
        self.get_json("api/trips/").await
    }

    async fn create_trip(&self, payload: &TripPayload) -> Result<Trip, ClientError> {
        self.send_json(reqwest::Method::POST, "api/trips/", payload)
            .await
    }

    async fn update_trip(&self, id: TripId, payload: &TripPayload) -> Result<Trip, ClientError> {
        self.send_json(reqwest::Method::PUT, &format!("api/trips/{id}/"), payload)
            .await
    }

    async fn delete_trip(&self, id: TripId) -> Result<(), ClientError> {
        let endpoint = self.endpoint(&format!("api/trips/{id}/"))?;
        tracing::debug!("DELETE {endpoint}");
        let req = self.authorized(self.http.delete(endpoint))?;
        expect_success(req.send().await?).await
    }
}

impl PackingApi for HttpClient {
    async fn generate_packing_list(
        &self,
        id: TripId,
        activities: &ActivitySet,
    ) -> Result<Vec<PackingItem>, ClientError> {
        let body = PackingRequest {
            activities: activities.identifiers(),
        };
        let res: PackingListResponse = self
            .send_json(
                reqwest::Method::POST,
                &format!("api/trips/{id}/packing-list/"),
                &body,
            )
            .await?;
        Ok(res.into_items())
    }

    async fn save_packing_list(&self, id: TripId, list: &PackingList) -> Result<(), ClientError> {
        let endpoint = self.endpoint(&format!("api/trips/{id}/"))?;
        tracing::debug!("PATCH {endpoint}");
        let body = PackingPatch {
            packing_list: list.clone(),
        };
        let req = self.authorized(self.http.patch(endpoint).json(&body))?;
        expect_success(req.send().await?).await
    }
}

async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    if res.status().is_success() {
        return res.json::<T>().await.map_err(ClientError::Transport);
    }
    Err(error_for(res).await)
}

/// For calls whose response body is not needed.
async fn expect_success(res: Response) -> Result<(), ClientError> {
    if res.status().is_success() {
        return Ok(());
    }
    Err(error_for(res).await)
}

async fn error_for(res: Response) -> ClientError {
    let status = res.status();
    let body = res
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| error_message(&body))
        .unwrap_or_else(|| "unknown error".to_string());

    error_from_status(status, body)
}

fn error_from_status(status: StatusCode, body: String) -> ClientError {
    match status.as_u16() {
        401 => ClientError::Unauthorized,
        403 => ClientError::Forbidden,
        404 => ClientError::NotFound,
        409 => ClientError::Conflict(body),
        400 | 422 => ClientError::Validation(body),
        _ => ClientError::Server(body),
    }
}

/// Extracts a readable message from an error body.
///
/// The API answers with `{"detail": ...}`, `{"error": ...}` or a map of
/// field names to lists of messages.
fn error_message(body: &Value) -> Option<String> {
    match body {
        Value::String(message) => Some(message.clone()),
        Value::Array(items) => {
            let parts: Vec<_> = items.iter().filter_map(error_message).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) => {
            for key in ["detail", "error"] {
                if let Some(Value::String(message)) = map.get(key) {
                    return Some(message.clone());
                }
            }
            let fields: Vec<_> = map
                .iter()
                .filter_map(|(field, value)| {
                    error_message(value).map(|message| format!("{field}: {message}"))
                })
                .collect();
            (!fields.is_empty()).then(|| fields.join("; "))
        }
        _ => None,
    }
}
