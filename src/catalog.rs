//! Objective catalog: default rate assumptions per advertising objective.
//!
//! A catalog is built once at start-up (built-in defaults, a JSON file, a
//! remote provider or aggregated history) and only read afterwards. It is
//! shared behind an `Arc` rather than through any global.

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::errors::{CatalogError, EstimationError};
use crate::models::{CatalogEntry, ObjectiveDefinition, ObjectiveSource, ObjectiveView, ResultMetric};

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Lowercase snake-case over any script: a letter first, then letters,
    // digits or underscores, none of them uppercase
    PATTERN.get_or_init(|| {
        Regex::new(r"^[\p{Alphabetic}--\p{Uppercase}][\p{Alphabetic}\p{N}_--\p{Uppercase}]*$")
            .expect("valid objective name pattern")
    })
}

/// Normalizes a user- or provider-supplied objective name.
///
/// Lowercases and collapses every run of non-alphanumeric characters into a
/// single underscore, so "Lead Generation" and "lead-generation" both become
/// `lead_generation`. Letters outside ASCII are kept ("Notoriété" becomes
/// `notoriété`).
pub fn normalize_objective_name(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            if pending_separator && !normalized.is_empty() {
                normalized.push('_');
            }
            pending_separator = false;
            // Some lowercase forms carry combining marks; only letters and digits survive
            normalized.extend(c.to_lowercase().filter(|l| l.is_alphanumeric()));
        } else {
            pending_separator = true;
        }
    }

    normalized
}

/// Human label for selection UIs: `lead_generation` -> "Lead generation".
pub fn display_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn check_rate(objective: &str, field: &'static str, value: f64) -> Result<(), CatalogError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CatalogError::InvalidDefault {
            objective: objective.to_string(),
            field,
        })
    }
}

/// Read-only, insertion-ordered set of objective definitions.
#[derive(Debug, Clone)]
pub struct ObjectiveCatalog {
    objectives: Vec<ObjectiveDefinition>,
    index: HashMap<String, usize>,
}

impl ObjectiveCatalog {
    /// Builds a catalog, validating names, uniqueness and default rates.
    pub fn new(objectives: Vec<ObjectiveDefinition>) -> Result<Self, CatalogError> {
        if objectives.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(objectives.len());
        for (position, objective) in objectives.iter().enumerate() {
            if !name_pattern().is_match(&objective.name) {
                return Err(CatalogError::InvalidName(objective.name.clone()));
            }
            check_rate(&objective.name, "defaultCpm", objective.default_cpm)?;
            check_rate(&objective.name, "defaultCtr", objective.default_ctr)?;
            check_rate(
                &objective.name,
                "defaultConversionRate",
                objective.default_conversion_rate,
            )?;
            if index.insert(objective.name.clone(), position).is_some() {
                return Err(CatalogError::DuplicateObjective(objective.name.clone()));
            }
        }

        Ok(Self { objectives, index })
    }

    /// Statically configured defaults used when no external source is set.
    pub fn builtin() -> Self {
        let objectives = vec![
            ObjectiveDefinition::new("awareness", 5.0, 0.9, 1.0, ResultMetric::Impressions),
            ObjectiveDefinition::new("engagement", 7.5, 1.5, 2.0, ResultMetric::Engagements),
            ObjectiveDefinition::new("traffic", 10.0, 2.0, 3.0, ResultMetric::Clicks),
            ObjectiveDefinition::new("lead_generation", 15.0, 1.2, 8.0, ResultMetric::Leads),
        ];
        let index = objectives
            .iter()
            .enumerate()
            .map(|(position, objective)| (objective.name.clone(), position))
            .collect();

        Self { objectives, index }
    }

    /// Builds a catalog from a provider's entries.
    ///
    /// Names are normalized; missing rates default to zero and a missing
    /// label is inferred from the name.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let objectives = entries
            .into_iter()
            .map(|entry| {
                let source = match entry {
                    CatalogEntry::Name(name) => ObjectiveSource {
                        name,
                        default_cpm: None,
                        default_ctr: None,
                        default_conversion_rate: None,
                        result_metric_label: None,
                    },
                    CatalogEntry::Detailed(source) => source,
                };
                let name = normalize_objective_name(&source.name);
                if name.is_empty() {
                    return Err(CatalogError::InvalidName(source.name));
                }
                let label = source
                    .result_metric_label
                    .unwrap_or_else(|| ResultMetric::infer_from_name(&name));
                Ok(ObjectiveDefinition::new(
                    name,
                    source.default_cpm.unwrap_or(0.0),
                    source.default_ctr.unwrap_or(0.0),
                    source.default_conversion_rate.unwrap_or(0.0),
                    label,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(objectives)
    }

    /// Builds a catalog from bare objective names, as served by `/objectives`.
    pub fn from_names<I, S>(names: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_entries(
            names
                .into_iter()
                .map(|name| CatalogEntry::Name(name.into()))
                .collect(),
        )
    }

    /// Parses a JSON array of names and/or objective objects.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)
            .map_err(|e| CatalogError::Source(format!("invalid catalog JSON: {}", e)))?;
        Self::from_entries(entries)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Source(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Resolves an objective by name, normalizing the requested name first.
    pub fn lookup(&self, name: &str) -> Result<&ObjectiveDefinition, EstimationError> {
        let key = normalize_objective_name(name);
        self.index
            .get(&key)
            .map(|&position| &self.objectives[position])
            .ok_or_else(|| EstimationError::UnknownObjective {
                objective: name.trim().to_string(),
            })
    }

    /// All objectives in insertion order.
    pub fn list_all(&self) -> &[ObjectiveDefinition] {
        &self.objectives
    }

    pub fn names(&self) -> Vec<String> {
        self.objectives.iter().map(|o| o.name.clone()).collect()
    }

    pub fn views(&self) -> Vec<ObjectiveView> {
        self.objectives.iter().cloned().map(ObjectiveView::from).collect()
    }

    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }
}

impl From<ObjectiveDefinition> for ObjectiveView {
    fn from(definition: ObjectiveDefinition) -> Self {
        Self {
            display_name: display_label(&definition.name),
            definition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_objective_name() {
        assert_eq!(normalize_objective_name("Lead Generation"), "lead_generation");
        assert_eq!(normalize_objective_name("  lead-generation "), "lead_generation");
        assert_eq!(normalize_objective_name("actions:link_click"), "actions_link_click");
        assert_eq!(normalize_objective_name("__traffic__"), "traffic");
        assert_eq!(normalize_objective_name("   "), "");
        assert_eq!(normalize_objective_name("Notoriété"), "notoriété");
        assert_eq!(normalize_objective_name("Génération de prospects"), "génération_de_prospects");
    }

    #[test]
    fn test_non_ascii_names_accepted() {
        let catalog = ObjectiveCatalog::from_names(["Notoriété", "Trafic"]).unwrap();
        assert_eq!(catalog.names(), vec!["notoriété", "trafic"]);
        assert_eq!(catalog.lookup("NOTORIÉTÉ").unwrap().name, "notoriété");
        assert_eq!(display_label("notoriété"), "Notoriété");

        let err = ObjectiveCatalog::new(vec![ObjectiveDefinition::new(
            "Notoriété",
            5.0,
            1.0,
            1.0,
            ResultMetric::Impressions,
        )])
        .unwrap_err();
        assert_eq!(err, CatalogError::InvalidName("Notoriété".to_string()));
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("lead_generation"), "Lead generation");
        assert_eq!(display_label("awareness"), "Awareness");
        assert_eq!(display_label(""), "");
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let builtin = ObjectiveCatalog::builtin();
        let rebuilt = ObjectiveCatalog::new(builtin.list_all().to_vec()).unwrap();
        assert_eq!(rebuilt.names(), builtin.names());
        assert_eq!(
            builtin.names(),
            vec!["awareness", "engagement", "traffic", "lead_generation"]
        );
    }

    #[test]
    fn test_lookup_normalizes() {
        let catalog = ObjectiveCatalog::builtin();
        let def = catalog.lookup("Lead Generation").unwrap();
        assert_eq!(def.name, "lead_generation");
        assert_eq!(def.result_metric_label, ResultMetric::Leads);
    }

    #[test]
    fn test_lookup_unknown() {
        let catalog = ObjectiveCatalog::builtin();
        let err = catalog.lookup("unknown_thing").unwrap_err();
        assert_eq!(
            err,
            EstimationError::UnknownObjective {
                objective: "unknown_thing".to_string()
            }
        );
    }

    #[test]
    fn test_list_all_keeps_insertion_order() {
        let catalog = ObjectiveCatalog::from_names(["video_views", "awareness", "link_clicks"]).unwrap();
        let names: Vec<&str> = catalog.list_all().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["video_views", "awareness", "link_clicks"]);
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let err = ObjectiveCatalog::from_names(["Traffic", "traffic"]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateObjective("traffic".to_string()));
    }

    #[test]
    fn test_new_rejects_bad_names_and_rates() {
        let err = ObjectiveCatalog::new(vec![ObjectiveDefinition::new(
            "Awareness",
            1.0,
            1.0,
            1.0,
            ResultMetric::Impressions,
        )])
        .unwrap_err();
        assert_eq!(err, CatalogError::InvalidName("Awareness".to_string()));

        let err = ObjectiveCatalog::new(vec![ObjectiveDefinition::new(
            "awareness",
            -1.0,
            1.0,
            1.0,
            ResultMetric::Impressions,
        )])
        .unwrap_err();
        assert_eq!(
            err,
            CatalogError::InvalidDefault {
                objective: "awareness".to_string(),
                field: "defaultCpm"
            }
        );

        let err = ObjectiveCatalog::from_names(["9lives"]).unwrap_err();
        assert_eq!(err, CatalogError::InvalidName("9lives".to_string()));

        assert_eq!(
            ObjectiveCatalog::new(Vec::new()).unwrap_err(),
            CatalogError::Empty
        );
    }

    #[test]
    fn test_from_json_mixed_entries() {
        let catalog = ObjectiveCatalog::from_json_str(
            r#"[
                "post_engagement",
                {"name": "Traffic", "defaultCpm": 12.5, "defaultCtr": 2.2},
                {"name": "lead_generation", "defaultCpm": 20, "defaultCtr": 1, "defaultConversionRate": 10, "resultMetricLabel": "Leads"}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 3);

        let engagement = catalog.lookup("post_engagement").unwrap();
        assert_eq!(engagement.default_cpm, 0.0);
        assert_eq!(engagement.result_metric_label, ResultMetric::Engagements);

        let traffic = catalog.lookup("traffic").unwrap();
        assert_eq!(traffic.default_cpm, 12.5);
        assert_eq!(traffic.default_conversion_rate, 0.0);
        assert_eq!(traffic.result_metric_label, ResultMetric::Clicks);

        let leads = catalog.lookup("lead_generation").unwrap();
        assert_eq!(leads.default_conversion_rate, 10.0);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = ObjectiveCatalog::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, CatalogError::Source(_)));
    }

    #[test]
    fn test_views_carry_display_name() {
        let views = ObjectiveCatalog::builtin().views();
        assert_eq!(views[3].display_name, "Lead generation");
        assert_eq!(views[3].definition.name, "lead_generation");
    }
}
