//! Start-up wiring: catalog loading and application state.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::ObjectiveCatalog;
use crate::config::Config;
use crate::engine::EstimationEngine;
use crate::errors::{AppError, ResultExt};
use crate::handlers::AppState;
use crate::history;
use crate::remote_client::RemoteEstimator;

/// Loads the catalog from the highest-precedence configured source:
/// `CATALOG_URL`, then `CATALOG_PATH`, then `HISTORY_PATH`, then built-in
/// defaults.
pub async fn load_catalog(config: &Config) -> Result<ObjectiveCatalog, AppError> {
    if let Some(url) = &config.catalog_url {
        let remote = RemoteEstimator::new(url.clone(), Duration::from_secs(config.upstream_timeout_secs))?;
        return remote
            .fetch_catalog()
            .await
            .with_context(|| format!("loading objective catalog from {}", url));
    }

    if let Some(path) = &config.catalog_path {
        return ObjectiveCatalog::from_json_file(path)
            .with_context(|| format!("loading objective catalog from {}", path.display()));
    }

    if let Some(path) = &config.history_path {
        let records = history::load_records(path)
            .with_context(|| format!("loading campaign history from {}", path.display()))?;
        let summary = history::aggregate(&records);
        tracing::info!(
            "Aggregated {} history rows into {} objectives",
            records.len(),
            summary.by_objective.len()
        );
        return summary
            .to_catalog()
            .context("deriving objective catalog from campaign history");
    }

    Ok(ObjectiveCatalog::builtin())
}

/// Loads the catalog, falling back to built-in defaults when the configured
/// source fails so the form still has objectives to offer.
pub async fn load_catalog_or_builtin(config: &Config) -> ObjectiveCatalog {
    match load_catalog(config).await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("{}; using built-in objectives", e);
            ObjectiveCatalog::builtin()
        }
    }
}

/// Builds the shared state handed to every request handler.
pub fn build_state(config: Config, catalog: ObjectiveCatalog) -> Result<Arc<AppState>, AppError> {
    let remote = match &config.estimator_url {
        Some(url) => Some(RemoteEstimator::new(
            url.clone(),
            Duration::from_secs(config.upstream_timeout_secs),
        )?),
        None => None,
    };

    Ok(Arc::new(AppState {
        config,
        engine: EstimationEngine::new(Arc::new(catalog)),
        remote,
    }))
}
