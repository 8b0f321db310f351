use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Failures of a single `estimate` call.
///
/// Each variant carries the field or objective name a caller needs to render a
/// precise message.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimationError {
    /// Missing or out-of-range request field.
    InvalidInput {
        field: &'static str,
        reason: String,
    },
    /// Objective not present in the catalog.
    UnknownObjective { objective: String },
    /// Resolved CPM is zero, so impressions are undefined.
    DivisionGuard { objective: String },
}

impl EstimationError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        EstimationError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Taxonomy name used as the `error` value of JSON responses.
    pub fn kind(&self) -> &'static str {
        match self {
            EstimationError::InvalidInput { .. } => "InvalidInput",
            EstimationError::UnknownObjective { .. } => "UnknownObjective",
            EstimationError::DivisionGuard { .. } => "DivisionGuard",
        }
    }

    /// The offending request field, for `InvalidInput`.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            EstimationError::InvalidInput { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// The objective involved, for catalog-related failures.
    pub fn objective(&self) -> Option<&str> {
        match self {
            EstimationError::UnknownObjective { objective }
            | EstimationError::DivisionGuard { objective } => Some(objective.as_str()),
            EstimationError::InvalidInput { .. } => None,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            EstimationError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            EstimationError::UnknownObjective { .. } => StatusCode::NOT_FOUND,
            EstimationError::DivisionGuard { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl fmt::Display for EstimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimationError::InvalidInput { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            EstimationError::UnknownObjective { objective } => {
                write!(f, "Unknown objective: {}", objective)
            }
            EstimationError::DivisionGuard { objective } => write!(
                f,
                "No CPM available for objective '{}': enter a CPM greater than zero",
                objective
            ),
        }
    }
}

impl std::error::Error for EstimationError {}

/// Failures while building an objective catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The source produced no objectives.
    Empty,
    /// Two entries share a name after normalization.
    DuplicateObjective(String),
    /// Name does not normalize to lowercase snake-case.
    InvalidName(String),
    /// A default rate is negative or not finite.
    InvalidDefault {
        objective: String,
        field: &'static str,
    },
    /// The source could not be read or parsed.
    Source(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Empty => write!(f, "Catalog source contains no objectives"),
            CatalogError::DuplicateObjective(name) => {
                write!(f, "Duplicate objective in catalog: {}", name)
            }
            CatalogError::InvalidName(name) => write!(f, "Invalid objective name: '{}'", name),
            CatalogError::InvalidDefault { objective, field } => write!(
                f,
                "Default '{}' of objective '{}' must be a non-negative number",
                field, objective
            ),
            CatalogError::Source(msg) => write!(f, "Catalog source error: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Typed estimation failure.
    Estimation(EstimationError),
    /// Catalog could not be built.
    Catalog(CatalogError),
    /// Bad request error (malformed body or query).
    BadRequest(String),
    /// Error interacting with a remote estimation service.
    ExternalApiError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Estimation(e) => write!(f, "{}", e),
            AppError::Catalog(e) => write!(f, "{}", e),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each error variant to an HTTP status code and a JSON body whose
    /// `error` field names the failure.
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Estimation(e) => {
                tracing::warn!("Estimation rejected: {}", e);
                let mut body = json!({
                    "error": e.kind(),
                    "message": e.to_string(),
                });
                if let Some(field) = e.field() {
                    body["field"] = json!(field);
                }
                if let Some(objective) = e.objective() {
                    body["objective"] = json!(objective);
                }
                (e.status(), body)
            }
            AppError::Catalog(e) => {
                tracing::error!("Catalog error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Objective catalog unavailable" }),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                (StatusCode::BAD_GATEWAY, json!({ "error": msg }))
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return (**source).clone().into_response();
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<EstimationError> for AppError {
    fn from(err: EstimationError) -> Self {
        AppError::Estimation(err)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::Catalog(err)
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: f(),
        })
    }
}
