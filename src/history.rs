//! Aggregation of historical campaign performance into catalog defaults.
//!
//! Each row is one past campaign (or ad set) with its objective, spend and
//! delivery counts. Rows are grouped by normalized objective name in
//! first-seen order and turned into per-objective CPM / CTR / conversion rate.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::catalog::{normalize_objective_name, ObjectiveCatalog};
use crate::errors::CatalogError;
use crate::models::{ObjectiveDefinition, ResultMetric};

/// One historical delivery row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    pub objective: String,
    pub spend: f64,
    pub impressions: f64,
    pub clicks: f64,
    /// Outcomes counted by the platform (leads, engagements, ...).
    #[serde(default)]
    pub results: f64,
}

/// Summed delivery for a group of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTotals {
    pub spend: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub results: f64,
}

impl DeliveryTotals {
    fn add(&mut self, record: &CampaignRecord) {
        self.spend += record.spend;
        self.impressions += record.impressions;
        self.clicks += record.clicks;
        self.results += record.results;
    }

    /// Spend per thousand impressions; 0 without impressions.
    pub fn cpm(&self) -> f64 {
        ratio(self.spend * 1000.0, self.impressions)
    }

    /// Clicks per hundred impressions; 0 without impressions.
    pub fn ctr(&self) -> f64 {
        ratio(self.clicks * 100.0, self.impressions)
    }

    pub fn cpc(&self) -> f64 {
        ratio(self.spend, self.clicks)
    }

    /// Results per hundred clicks; 0 without clicks.
    pub fn conversion_rate(&self) -> f64 {
        ratio(self.results * 100.0, self.clicks)
    }

    pub fn cost_per_result(&self) -> f64 {
        ratio(self.spend, self.results)
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveHistory {
    pub objective: String,
    #[serde(flatten)]
    pub totals: DeliveryTotals,
}

/// Overall and per-objective delivery totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub overall: DeliveryTotals,
    pub by_objective: Vec<ObjectiveHistory>,
}

impl HistorySummary {
    /// Turns the per-objective totals into a catalog.
    pub fn to_catalog(&self) -> Result<ObjectiveCatalog, CatalogError> {
        let objectives = self
            .by_objective
            .iter()
            .map(|entry| {
                ObjectiveDefinition::new(
                    entry.objective.clone(),
                    entry.totals.cpm(),
                    entry.totals.ctr(),
                    entry.totals.conversion_rate(),
                    ResultMetric::infer_from_name(&entry.objective),
                )
            })
            .collect();

        ObjectiveCatalog::new(objectives)
    }
}

/// Groups records by objective, keeping first-seen order.
///
/// Rows whose objective normalizes to nothing are skipped.
pub fn aggregate(records: &[CampaignRecord]) -> HistorySummary {
    let mut summary = HistorySummary::default();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in records {
        let objective = normalize_objective_name(&record.objective);
        if objective.is_empty() {
            tracing::warn!("Skipping history row without objective: {:?}", record);
            continue;
        }

        summary.overall.add(record);

        let position = *positions.entry(objective.clone()).or_insert_with(|| {
            summary.by_objective.push(ObjectiveHistory {
                objective,
                totals: DeliveryTotals::default(),
            });
            summary.by_objective.len() - 1
        });
        summary.by_objective[position].totals.add(record);
    }

    summary
}

pub fn load_records(path: &Path) -> Result<Vec<CampaignRecord>, CatalogError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| CatalogError::Source(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&json)
        .map_err(|e| CatalogError::Source(format!("invalid history JSON: {}", e)))
}
