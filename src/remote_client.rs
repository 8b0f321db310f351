use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use crate::catalog::ObjectiveCatalog;
use crate::errors::{AppError, EstimationError};
use crate::models::{EstimationInput, EstimationResult};

/// Request fields an upstream `InvalidInput` may name.
const REQUEST_FIELDS: [&str; 7] = [
    "objective",
    "budget",
    "duration",
    "cpc",
    "cpm",
    "ctr",
    "conversionRate",
];

/// Error body returned by an estimation service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    objective: Option<String>,
}

impl ErrorBody {
    /// Rebuilds the typed failure when the upstream speaks the same error
    /// taxonomy. Bodies that name an unknown kind or field yield `None`.
    fn to_estimation_error(&self) -> Option<EstimationError> {
        match self.error.as_str() {
            "InvalidInput" => {
                let field = REQUEST_FIELDS
                    .iter()
                    .copied()
                    .find(|f| Some(*f) == self.field.as_deref())?;
                let message = self.message.as_deref().unwrap_or("is invalid");
                let prefix = format!("Invalid value for '{}': ", field);
                let reason = message.strip_prefix(prefix.as_str()).unwrap_or(message);
                Some(EstimationError::invalid_input(field, reason))
            }
            "UnknownObjective" => Some(EstimationError::UnknownObjective {
                objective: self.objective.clone()?,
            }),
            "DivisionGuard" => Some(EstimationError::DivisionGuard {
                objective: self.objective.clone()?,
            }),
            _ => None,
        }
    }
}

/// Client for a remote estimation service.
///
/// Speaks the same JSON contract this service exposes: `GET /objectives`
/// returns objective names and `POST /calculate` returns an estimate. Every
/// call is a single request with a fixed timeout and no retry.
#[derive(Clone)]
pub struct RemoteEstimator {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RemoteEstimator {
    /// Creates a new `RemoteEstimator`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the estimation service.
    /// * `timeout` - Upper bound for each request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create estimation client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turns transport failures into a message fit for end users.
    fn transport_error(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::ExternalApiError(format!(
                "Estimation service did not answer within {}s. Please try again.",
                self.timeout.as_secs()
            ))
        } else {
            tracing::debug!("Estimation service transport error: {:?}", err);
            AppError::ExternalApiError(
                "Estimation service unavailable. Please try again.".to_string(),
            )
        }
    }

    /// Fetches the ordered list of objective names.
    pub async fn fetch_objective_names(&self) -> Result<Vec<String>, AppError> {
        let url = format!("{}/objectives", self.base_url);
        tracing::info!("Fetching objectives from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Objective provider returned {}: {}",
                status, error_text
            )));
        }

        let names: Vec<String> = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse objective list: {}", e))
        })?;

        tracing::info!("Fetched {} objectives", names.len());
        Ok(names)
    }

    /// Fetches objective names and builds a catalog from them.
    ///
    /// The provider only supplies names, so every default rate is zero and
    /// requests against this catalog must carry their own CPM.
    pub async fn fetch_catalog(&self) -> Result<ObjectiveCatalog, AppError> {
        let names = self.fetch_objective_names().await?;
        Ok(ObjectiveCatalog::from_names(names)?)
    }

    /// Delegates one estimate to the remote service.
    ///
    /// Rejections in the `InvalidInput` / `UnknownObjective` / `DivisionGuard`
    /// taxonomy come back as `AppError::Estimation` with their field or
    /// objective intact. Anything else the upstream reports is an
    /// `ExternalApiError`.
    pub async fn estimate(&self, input: &EstimationInput) -> Result<EstimationResult, AppError> {
        let url = format!("{}/calculate", self.base_url);
        tracing::info!(
            "Delegating estimate to {}: objective={}, budget={}",
            url,
            input.objective,
            input.budget
        );

        let response = self
            .client
            .post(&url)
            .json(input)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if let Ok(error) = serde_json::from_str::<ErrorBody>(&body) {
            if let Some(rejection) = error.to_estimation_error() {
                tracing::debug!("Estimation service rejected the request: {}", rejection);
                return Err(AppError::Estimation(rejection));
            }
            let message = error.message.unwrap_or(error.error);
            return Err(AppError::ExternalApiError(format!(
                "Estimation service rejected the request: {}",
                message
            )));
        }

        if !status.is_success() {
            return Err(AppError::ExternalApiError(match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    "Estimation service is busy. Please try again shortly.".to_string()
                }
                _ => format!("Estimation service returned {}", status),
            }));
        }

        serde_json::from_str(&body).map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse estimation response: {}", e))
        })
    }
}
