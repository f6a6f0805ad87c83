use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::columns::{AliasTable, CanonicalField, FieldAliases};
use crate::error::ConfigError;

/// Category given to rows whose category cell is missing or blank.
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// One tracked mobility test and its pass threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    pub threshold: f64,
    #[serde(default)]
    pub unit: Option<String>,
    /// Other header spellings for this metric.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl MetricDefinition {
    pub fn new(name: &str, threshold: f64, unit: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            threshold,
            unit: Some(unit.to_string()),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Everything the pipeline needs, fixed for the lifetime of a [`Pipeline`].
///
/// [`Pipeline`]: crate::pipeline::Pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub aliases: AliasTable,
    pub metrics: Vec<MetricDefinition>,
    pub default_category: String,
    /// CSV delimiter; sniffed from the header line when unset.
    pub delimiter: Option<char>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            aliases: default_aliases(),
            metrics: default_metrics(),
            default_category: DEFAULT_CATEGORY.to_string(),
            delimiter: None,
        }
    }
}

fn aliases(field: CanonicalField, names: &[&str], required: bool) -> FieldAliases {
    FieldAliases {
        field,
        aliases: names.iter().map(|n| n.to_string()).collect(),
        required,
    }
}

fn default_aliases() -> AliasTable {
    vec![
        aliases(
            CanonicalField::Subject,
            &["subject", "jugador", "player", "nombre", "name", "atleta", "deportista"],
            true,
        ),
        aliases(
            CanonicalField::Category,
            &["category", "categoria", "grupo", "group", "equipo", "team"],
            false,
        ),
        aliases(
            CanonicalField::ObservedAt,
            &[
                "observed_at",
                "fecha",
                "date",
                "fecha prueba",
                "fecha de prueba",
                "fecha evaluacion",
            ],
            true,
        ),
    ]
}

fn default_metrics() -> Vec<MetricDefinition> {
    vec![
        MetricDefinition::new("THOMAS PSOAS (D)", 10.0, "°", &["THOMAS PSOAS D", "PSOAS D"]),
        MetricDefinition::new("THOMAS PSOAS (I)", 10.0, "°", &["THOMAS PSOAS I", "PSOAS I"]),
        MetricDefinition::new(
            "THOMAS CUADRICEPS (D)",
            50.0,
            "°",
            &["THOMAS CUADRICEPS D", "CUADRICEPS D"],
        ),
        MetricDefinition::new(
            "THOMAS CUADRICEPS (I)",
            50.0,
            "°",
            &["THOMAS CUADRICEPS I", "CUADRICEPS I"],
        ),
        MetricDefinition::new(
            "THOMAS SARTORIO (D)",
            80.0,
            "°",
            &["THOMAS SARTORIO D", "SARTORIO D"],
        ),
        MetricDefinition::new(
            "THOMAS SARTORIO (I)",
            80.0,
            "°",
            &["THOMAS SARTORIO I", "SARTORIO I"],
        ),
        MetricDefinition::new("JURDAN (D)", 75.0, "cm", &["JURDAN D", "JURDAN DER"]),
        MetricDefinition::new("JURDAN (I)", 75.0, "cm", &["JURDAN I", "JURDAN IZQ"]),
    ]
}

impl PipelineConfig {
    /// Parse and validate a TOML config.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut fields = BTreeSet::new();
        for entry in &self.aliases {
            if entry.aliases.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "no aliases configured for '{}'",
                    entry.field
                )));
            }
            if !fields.insert(entry.field) {
                return Err(ConfigError::Invalid(format!(
                    "field '{}' configured twice",
                    entry.field
                )));
            }
        }
        for field in [CanonicalField::Subject, CanonicalField::ObservedAt] {
            if !fields.contains(&field) {
                return Err(ConfigError::Invalid(format!(
                    "no aliases configured for '{field}'"
                )));
            }
        }

        let mut names = BTreeSet::new();
        for metric in &self.metrics {
            if !names.insert(metric.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate metric '{}'",
                    metric.name
                )));
            }
            if !metric.threshold.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "threshold for '{}' is not a finite number",
                    metric.name
                )));
            }
        }

        if self.default_category.trim().is_empty() {
            return Err(ConfigError::Invalid("default_category is empty".into()));
        }
        Ok(())
    }

    pub fn metric_names(&self) -> Vec<String> {
        self.metrics.iter().map(|m| m.name.clone()).collect()
    }
}
