use serde::{Deserialize, Serialize};

use crate::errors::EstimationError;

// ============ Catalog Models ============

/// The primary outcome an objective is measured by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultMetric {
    Impressions,
    Engagements,
    Clicks,
    Leads,
}

impl ResultMetric {
    /// Guesses the outcome metric from an objective name.
    ///
    /// Used when a catalog source only supplies names. Anything that does not
    /// look like an engagement, traffic or lead objective is measured in
    /// impressions.
    pub fn infer_from_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name.contains("lead") || name.contains("conversion") {
            ResultMetric::Leads
        } else if name.contains("engag") || name.contains("like") {
            ResultMetric::Engagements
        } else if name.contains("traffic") || name.contains("click") {
            ResultMetric::Clicks
        } else {
            ResultMetric::Impressions
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultMetric::Impressions => "Impressions",
            ResultMetric::Engagements => "Engagements",
            ResultMetric::Clicks => "Clicks",
            ResultMetric::Leads => "Leads",
        }
    }
}

/// Default rate assumptions for one advertising objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveDefinition {
    /// Lowercase snake-case identifier, unique within a catalog.
    pub name: String,
    /// Default cost per thousand impressions.
    pub default_cpm: f64,
    /// Default click-through rate, in percent.
    pub default_ctr: f64,
    /// Default conversion rate, in percent of clicks.
    pub default_conversion_rate: f64,
    /// Human label for the objective's primary outcome.
    pub result_metric_label: ResultMetric,
}

impl ObjectiveDefinition {
    pub fn new(
        name: impl Into<String>,
        default_cpm: f64,
        default_ctr: f64,
        default_conversion_rate: f64,
        result_metric_label: ResultMetric,
    ) -> Self {
        Self {
            name: name.into(),
            default_cpm,
            default_ctr,
            default_conversion_rate,
            result_metric_label,
        }
    }
}

/// One entry of an external catalog source.
///
/// Providers may send bare objective names or objects carrying some or all of
/// the default rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogEntry {
    Name(String),
    Detailed(ObjectiveSource),
}

/// Partially specified objective as supplied by a catalog source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveSource {
    pub name: String,
    #[serde(default)]
    pub default_cpm: Option<f64>,
    #[serde(default)]
    pub default_ctr: Option<f64>,
    #[serde(default)]
    pub default_conversion_rate: Option<f64>,
    #[serde(default)]
    pub result_metric_label: Option<ResultMetric>,
}

/// Objective as exposed to selection UIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveView {
    pub display_name: String,
    #[serde(flatten)]
    pub definition: ObjectiveDefinition,
}

// ============ Estimation Models ============

/// A validated-shape estimation request, ready for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationInput {
    pub objective: String,
    pub budget: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
}

impl EstimationInput {
    /// Creates an input that relies on catalog defaults for every rate.
    pub fn new(objective: impl Into<String>, budget: f64) -> Self {
        Self {
            objective: objective.into(),
            budget,
            duration: None,
            cpc: None,
            cpm: None,
            ctr: None,
            conversion_rate: None,
        }
    }

    pub fn with_duration(mut self, days: u32) -> Self {
        self.duration = Some(days);
        self
    }

    pub fn with_cpc(mut self, cpc: f64) -> Self {
        self.cpc = Some(cpc);
        self
    }

    pub fn with_cpm(mut self, cpm: f64) -> Self {
        self.cpm = Some(cpm);
        self
    }

    pub fn with_ctr(mut self, ctr: f64) -> Self {
        self.ctr = Some(ctr);
        self
    }

    pub fn with_conversion_rate(mut self, conversion_rate: f64) -> Self {
        self.conversion_rate = Some(conversion_rate);
        self
    }
}

/// A numeric form field as it arrives over the wire.
///
/// Browser forms post numbers as text, so both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    /// Parses the field. Blank text counts as absent.
    fn parse(&self, field: &'static str) -> Result<Option<f64>, EstimationError> {
        match self {
            NumberOrText::Number(n) => Ok(Some(*n)),
            NumberOrText::Text(s) if s.trim().is_empty() => Ok(None),
            NumberOrText::Text(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
                EstimationError::invalid_input(field, format!("'{}' is not a number", s.trim()))
            }),
        }
    }
}

/// Raw JSON body of `POST /api/v1/estimate` (and the legacy `/calculate`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationRequest {
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub budget: Option<NumberOrText>,
    #[serde(default)]
    pub duration: Option<NumberOrText>,
    #[serde(default)]
    pub cpc: Option<NumberOrText>,
    #[serde(default)]
    pub cpm: Option<NumberOrText>,
    #[serde(default)]
    pub ctr: Option<NumberOrText>,
    #[serde(default)]
    pub conversion_rate: Option<NumberOrText>,
}

fn parse_field(
    value: &Option<NumberOrText>,
    field: &'static str,
) -> Result<Option<f64>, EstimationError> {
    match value {
        Some(v) => v.parse(field),
        None => Ok(None),
    }
}

impl TryFrom<EstimationRequest> for EstimationInput {
    type Error = EstimationError;

    /// Resolves wire shapes into typed fields.
    ///
    /// Only presence and parseability are checked here; range checks belong to
    /// the engine.
    fn try_from(request: EstimationRequest) -> Result<Self, Self::Error> {
        let objective = request
            .objective
            .filter(|o| !o.trim().is_empty())
            .ok_or_else(|| EstimationError::invalid_input("objective", "is required"))?;

        let budget = parse_field(&request.budget, "budget")?
            .ok_or_else(|| EstimationError::invalid_input("budget", "is required"))?;

        let duration = match parse_field(&request.duration, "duration")? {
            None => None,
            Some(days) if days >= 0.0 && days.fract() == 0.0 && days <= u32::MAX as f64 => {
                Some(days as u32)
            }
            Some(_) => {
                return Err(EstimationError::invalid_input(
                    "duration",
                    "must be a whole, non-negative number of days",
                ))
            }
        };

        Ok(EstimationInput {
            objective,
            budget,
            duration,
            cpc: parse_field(&request.cpc, "cpc")?,
            cpm: parse_field(&request.cpm, "cpm")?,
            ctr: parse_field(&request.ctr, "ctr")?,
            conversion_rate: parse_field(&request.conversion_rate, "conversionRate")?,
        })
    }
}

/// Predicted outcomes of one estimation request. Never mutated after the
/// engine builds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationResult {
    pub objective: String,
    pub budget: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Cost-per-click assumption as supplied; no formula reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpc: Option<f64>,
    pub estimated_impressions: u64,
    pub estimated_reach: u64,
    pub estimated_clicks: u64,
    pub estimated_conversions: u64,
    /// `budget / clicks`, or 0 when no clicks are expected.
    pub cost_per_click: f64,
    /// `budget / conversions`, or 0 when no conversions are expected.
    pub cost_per_conversion: f64,
    pub effective_cpm: f64,
    pub effective_ctr: f64,
    pub effective_conversion_rate: f64,
    pub result_metric_label: ResultMetric,
    /// The count matching `result_metric_label`.
    pub estimated_result: u64,
}

/// Query string of `GET /api/v1/predict`.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictParams {
    pub objective: String,
    pub spend: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub metrics: EstimationResult,
}
