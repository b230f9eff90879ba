//! WaterMe REST API client

mod dates;
mod dto;
#[cfg(test)]
mod fake;

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::util::{is_http_url, normalize_text_option};

pub use dates::{format_wire_date, parse_wire_date, try_parse_wire_date, WIRE_DATE_FORMAT};
pub use dto::{
    ChangePasswordRequest, CreatePlantResponse, LoginRequest, LoginResponse, PlantRequest,
    PlantResponse, RegisterRequest, RegisterResponse,
};
#[cfg(test)]
pub(crate) use fake::FakePlantApi;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API configuration: {0}")]
    InvalidConfiguration(String),
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {message}")]
    Api { status: u16, message: String },
    #[error("Invalid API payload: {0}")]
    InvalidPayload(String),
}

impl ApiError {
    /// HTTP status of a rejected request
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Operations the backend offers
#[allow(async_fn_in_trait)]
pub trait PlantApi {
    /// `GET /plants/{user_id}`
    async fn list_plants(&self, user_id: i64) -> ApiResult<Vec<PlantResponse>>;

    /// `POST /plants`; returns the server id
    async fn create_plant(&self, plant: &PlantRequest) -> ApiResult<i64>;

    /// `PUT /plants/{id}`
    async fn update_plant(&self, id: i64, plant: &PlantRequest) -> ApiResult<()>;

    /// `DELETE /plants/{id}`
    async fn delete_plant(&self, id: i64) -> ApiResult<()>;

    /// `POST /auth/login`
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse>;

    /// `POST /auth/register`
    async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse>;

    /// `PUT /auth/change-password`
    async fn change_password(&self, request: &ChangePasswordRequest) -> ApiResult<()>;
}

/// `PlantApi` over HTTP
#[derive(Debug, Clone)]
pub struct HttpPlantApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPlantApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let base_url = normalize_endpoint(base_url.into())?;
        Ok(Self {
            base_url,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(request: RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = request.header("Accept", "application/json").send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: parse_api_error(status, &body),
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ApiResult<T> {
        let response = Self::send(request).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|error| ApiError::InvalidPayload(error.to_string()))
    }
}

impl PlantApi for HttpPlantApi {
    async fn list_plants(&self, user_id: i64) -> ApiResult<Vec<PlantResponse>> {
        let url = self.url(&format!("plants/{user_id}"));
        Self::send_json(self.client.get(url)).await
    }

    async fn create_plant(&self, plant: &PlantRequest) -> ApiResult<i64> {
        let created: CreatePlantResponse =
            Self::send_json(self.client.post(self.url("plants")).json(plant)).await?;
        tracing::debug!("Backend created plant {}", created.id);
        Ok(created.id)
    }

    async fn update_plant(&self, id: i64, plant: &PlantRequest) -> ApiResult<()> {
        let url = self.url(&format!("plants/{id}"));
        Self::send(self.client.put(url).json(plant)).await?;
        Ok(())
    }

    async fn delete_plant(&self, id: i64) -> ApiResult<()> {
        let url = self.url(&format!("plants/{id}"));
        Self::send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        Self::send_json(self.client.post(self.url("auth/login")).json(request)).await
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        Self::send_json(self.client.post(self.url("auth/register")).json(request)).await
    }

    async fn change_password(&self, request: &ChangePasswordRequest) -> ApiResult<()> {
        let url = self.url("auth/change-password");
        Self::send(self.client.put(url).json(request)).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.error.or(payload.message) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

pub(crate) fn normalize_endpoint(raw: String) -> ApiResult<String> {
    let endpoint = normalize_text_option(Some(raw)).ok_or_else(|| {
        ApiError::InvalidConfiguration("API URL must not be empty".to_string())
    })?;
    if is_http_url(&endpoint) {
        Ok(endpoint.trim_end_matches('/').to_string())
    } else {
        Err(ApiError::InvalidConfiguration(
            "API URL must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_endpoint_rejects_invalid_values() {
        assert!(normalize_endpoint(String::new()).is_err());
        assert!(normalize_endpoint("   ".to_string()).is_err());
        assert!(normalize_endpoint("waterme.example.com".to_string()).is_err());
    }

    #[test]
    fn normalize_endpoint_trims_trailing_slash() {
        assert_eq!(
            normalize_endpoint(" https://waterme.example.com/ ".to_string()).unwrap(),
            "https://waterme.example.com"
        );
    }

    #[test]
    fn urls_are_joined_without_double_slashes() {
        let api = HttpPlantApi::new("https://waterme.example.com/", Duration::from_secs(5))
            .unwrap();
        assert_eq!(api.url("/plants/4"), "https://waterme.example.com/plants/4");
        assert_eq!(api.url("auth/login"), "https://waterme.example.com/auth/login");
    }

    #[test]
    fn api_error_prefers_error_field() {
        let message = parse_api_error(StatusCode::UNAUTHORIZED, r#"{"error":"Wrong credentials"}"#);
        assert_eq!(message, "Wrong credentials (401)");

        let message = parse_api_error(StatusCode::OK, r#"{"message":"Saved"}"#);
        assert_eq!(message, "Saved (200)");
    }

    #[test]
    fn api_error_falls_back_to_body_or_status() {
        assert_eq!(
            parse_api_error(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "HTTP 500"
        );
        assert_eq!(
            parse_api_error(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down (502)"
        );
    }

    #[test]
    fn status_is_exposed_for_rejected_requests() {
        let error = ApiError::Api {
            status: 401,
            message: "nope".to_string(),
        };
        assert_eq!(error.status(), Some(401));
        assert_eq!(ApiError::InvalidPayload("x".into()).status(), None);
    }
}
