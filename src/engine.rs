//! Estimation engine: campaign inputs to predicted outcomes.
//!
//! `estimate` is pure and deterministic. It validates the whole input before
//! computing anything, so a call either returns a complete
//! [`EstimationResult`] or a typed [`EstimationError`].

use std::sync::Arc;

use crate::catalog::ObjectiveCatalog;
use crate::errors::EstimationError;
use crate::models::{EstimationInput, EstimationResult, ObjectiveDefinition, ResultMetric};

/// Share of impressions assumed to reach unique viewers.
pub const REACH_FACTOR: f64 = 0.8;

/// Override wins when present and positive, otherwise the catalog default.
///
/// A zero override falls through to the default, matching how blank form
/// fields were always treated.
pub fn resolve_rate(override_value: Option<f64>, default: f64) -> f64 {
    match override_value {
        Some(value) if value > 0.0 => value,
        _ => default,
    }
}

pub fn resolve_cpm(input: &EstimationInput, objective: &ObjectiveDefinition) -> f64 {
    resolve_rate(input.cpm, objective.default_cpm)
}

pub fn resolve_ctr(input: &EstimationInput, objective: &ObjectiveDefinition) -> f64 {
    resolve_rate(input.ctr, objective.default_ctr)
}

pub fn resolve_conversion_rate(input: &EstimationInput, objective: &ObjectiveDefinition) -> f64 {
    resolve_rate(input.conversion_rate, objective.default_conversion_rate)
}

/// Rounds a non-negative estimate to the nearest whole count, halves up.
///
/// Estimates that do not fit a `u64` are rejected against `field`, the input
/// that drove them out of range, instead of saturating.
fn round_count(value: f64, field: &'static str) -> Result<u64, EstimationError> {
    let rounded = value.round();
    // u64::MAX as f64 rounds up to 2^64, which is itself out of range
    if !rounded.is_finite() || rounded >= u64::MAX as f64 {
        return Err(EstimationError::invalid_input(
            field,
            "is too large: the estimate exceeds the countable range",
        ));
    }
    Ok(rounded as u64)
}

/// Cost of one unit, or the 0 sentinel when no units are expected.
fn cost_per(budget: f64, units: u64) -> f64 {
    if units > 0 {
        budget / units as f64
    } else {
        0.0
    }
}

fn validate_rate(field: &'static str, value: Option<f64>) -> Result<(), EstimationError> {
    match value {
        Some(v) if !v.is_finite() => Err(EstimationError::invalid_input(field, "must be a finite number")),
        Some(v) if v < 0.0 => Err(EstimationError::invalid_input(field, "must not be negative")),
        _ => Ok(()),
    }
}

fn validate(input: &EstimationInput) -> Result<(), EstimationError> {
    if !(input.budget.is_finite() && input.budget > 0.0) {
        return Err(EstimationError::invalid_input(
            "budget",
            "must be greater than zero",
        ));
    }
    if input.objective.trim().is_empty() {
        return Err(EstimationError::invalid_input("objective", "is required"));
    }
    validate_rate("cpc", input.cpc)?;
    validate_rate("cpm", input.cpm)?;
    validate_rate("ctr", input.ctr)?;
    validate_rate("conversionRate", input.conversion_rate)?;
    Ok(())
}

/// Computes predicted campaign outcomes against an injected catalog.
#[derive(Debug, Clone)]
pub struct EstimationEngine {
    catalog: Arc<ObjectiveCatalog>,
}

impl EstimationEngine {
    pub fn new(catalog: Arc<ObjectiveCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ObjectiveCatalog {
        &self.catalog
    }

    /// Estimates impressions, reach, clicks, conversions and unit costs.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - non-positive budget, empty objective, a negative
    ///   rate override, or inputs whose counts do not fit a `u64`.
    /// * `UnknownObjective` - the objective is not in the catalog.
    /// * `DivisionGuard` - neither the input nor the catalog supplies a CPM.
    pub fn estimate(&self, input: &EstimationInput) -> Result<EstimationResult, EstimationError> {
        validate(input)?;

        let objective = self.catalog.lookup(&input.objective)?;

        let cpm = resolve_cpm(input, objective);
        let ctr = resolve_ctr(input, objective);
        let conversion_rate = resolve_conversion_rate(input, objective);
        if cpm <= 0.0 {
            return Err(EstimationError::DivisionGuard {
                objective: objective.name.clone(),
            });
        }

        let impressions = input.budget / (cpm / 1000.0);
        let clicks = impressions * (ctr / 100.0);
        let conversions = clicks * (conversion_rate / 100.0);

        let estimated_impressions = round_count(impressions, "budget")?;
        let estimated_reach = round_count(impressions * REACH_FACTOR, "budget")?;
        let estimated_clicks = round_count(clicks, "ctr")?;
        let estimated_conversions = round_count(conversions, "conversionRate")?;

        let estimated_result = match objective.result_metric_label {
            ResultMetric::Impressions => estimated_impressions,
            ResultMetric::Engagements | ResultMetric::Clicks => estimated_clicks,
            ResultMetric::Leads => estimated_conversions,
        };

        Ok(EstimationResult {
            objective: objective.name.clone(),
            budget: input.budget,
            duration: input.duration,
            cpc: input.cpc,
            estimated_impressions,
            estimated_reach,
            estimated_clicks,
            estimated_conversions,
            cost_per_click: cost_per(input.budget, estimated_clicks),
            cost_per_conversion: cost_per(input.budget, estimated_conversions),
            effective_cpm: cpm,
            effective_ctr: ctr,
            effective_conversion_rate: conversion_rate,
            result_metric_label: objective.result_metric_label,
            estimated_result,
        })
    }
}
