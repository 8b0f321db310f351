//! Campaign Budget Estimator Library
//!
//! Predicts campaign outcomes (impressions, reach, clicks, conversions and
//! unit costs) from a budget and rate assumptions, and serves the estimate
//! over a small JSON API.
//!
//! # Modules
//!
//! - `api`: Router and HTTP middleware.
//! - `core`: Domain-layer namespace (engine, catalog, models, errors).
//! - `integrations`: External sources (remote estimator, campaign history).
//! - `bootstrap`: Catalog loading and application state wiring.
//! - `catalog`: Objective catalog and name normalization.
//! - `config`: Configuration management.
//! - `engine`: Estimation engine.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `history`: Aggregation of historical delivery into catalog defaults.
//! - `models`: Core data models.
//! - `remote_client`: Client for a remote estimation service.

pub mod api;
pub mod core;
pub mod integrations;

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod models;
pub mod remote_client;
