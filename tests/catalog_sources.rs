/// Start-up catalog loading from files
/// Covers CATALOG_PATH and HISTORY_PATH and their precedence
use campaign_budget_api::bootstrap;
use campaign_budget_api::catalog::ObjectiveCatalog;
use campaign_budget_api::config::Config;
use campaign_budget_api::errors::CatalogError;
use campaign_budget_api::history;
use campaign_budget_api::models::ResultMetric;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CATALOG_JSON: &str = r#"[
    {"name": "Notoriety", "defaultCpm": 4, "defaultCtr": 0.5, "defaultConversionRate": 1},
    "link_clicks"
]"#;

const HISTORY_JSON: &str = r#"[
    {"objective": "Lead Generation", "spend": 300, "impressions": 20000, "clicks": 200, "results": 20},
    {"objective": "video_views", "spend": 40, "impressions": 10000, "clicks": 0},
    {"objective": "lead_generation", "spend": 100, "impressions": 5000, "clicks": 50, "results": 5}
]"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn config(catalog_path: Option<&Path>, history_path: Option<&Path>) -> Config {
    Config {
        catalog_path: catalog_path.map(Path::to_path_buf),
        history_path: history_path.map(Path::to_path_buf),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_catalog_path_beats_history() {
    let dir = TempDir::new().unwrap();
    let catalog_path = write(&dir, "objectives.json", CATALOG_JSON);
    let history_path = write(&dir, "history.json", HISTORY_JSON);

    let catalog = bootstrap::load_catalog(&config(Some(&catalog_path), Some(&history_path)))
        .await
        .unwrap();

    assert_eq!(catalog.names(), vec!["notoriety", "link_clicks"]);
    assert_eq!(catalog.lookup("Notoriety").unwrap().default_cpm, 4.0);
}

#[tokio::test]
async fn test_history_beats_builtin() {
    let dir = TempDir::new().unwrap();
    let history_path = write(&dir, "history.json", HISTORY_JSON);

    let catalog = bootstrap::load_catalog(&config(None, Some(&history_path)))
        .await
        .unwrap();

    assert_eq!(catalog.names(), vec!["lead_generation", "video_views"]);

    // 400 spend over 25 000 impressions, 250 clicks and 25 results
    let leads = catalog.lookup("lead_generation").unwrap();
    assert_eq!(leads.default_cpm, 16.0);
    assert_eq!(leads.default_ctr, 1.0);
    assert_eq!(leads.default_conversion_rate, 10.0);
    assert_eq!(leads.result_metric_label, ResultMetric::Leads);

    let views = catalog.lookup("video_views").unwrap();
    assert_eq!(views.default_conversion_rate, 0.0);
}

#[tokio::test]
async fn test_no_source_gives_builtin() {
    let catalog = bootstrap::load_catalog(&config(None, None)).await.unwrap();
    assert_eq!(catalog.names(), ObjectiveCatalog::builtin().names());
}

#[tokio::test]
async fn test_malformed_history_file() {
    let dir = TempDir::new().unwrap();
    let history_path = write(&dir, "history.json", r#"[{"objective": "traffic", "spend": "lots"}]"#);

    let err = history::load_records(&history_path).unwrap_err();
    assert!(matches!(err, CatalogError::Source(_)));

    let config = config(None, Some(&history_path));
    let err = bootstrap::load_catalog(&config).await.unwrap_err();
    assert!(err.to_string().starts_with("loading campaign history from"));

    let catalog = bootstrap::load_catalog_or_builtin(&config).await;
    assert_eq!(catalog.names(), ObjectiveCatalog::builtin().names());
}

#[tokio::test]
async fn test_missing_catalog_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.json");

    let err = ObjectiveCatalog::from_json_file(&missing).unwrap_err();
    assert!(matches!(err, CatalogError::Source(_)));

    let err = bootstrap::load_catalog(&config(Some(&missing), None))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("loading objective catalog from"));
}

#[test]
fn test_load_records_reads_rows() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "history.json", HISTORY_JSON);

    let records = history::load_records(&path).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].objective, "video_views");
    assert_eq!(records[1].results, 0.0);
}
