use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::config::MetricDefinition;
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Canonical fields and their accepted spellings
// ---------------------------------------------------------------------------

/// Pipeline-internal names every variant header is resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Subject,
    Category,
    ObservedAt,
}

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Subject => "subject",
            CanonicalField::Category => "category",
            CanonicalField::ObservedAt => "observed_at",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Accepted header spellings for one canonical field, highest priority first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAliases {
    pub field: CanonicalField,
    pub aliases: Vec<String>,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// Ordered canonical field → spellings table. Static configuration.
pub type AliasTable = Vec<FieldAliases>;

/// Fold a header for comparison: NFKD, drop combining marks, lowercase,
/// trim and collapse inner whitespace.
///
/// `"CATEGORÍA"`, `"categoria"` and `" Categoría "` all fold to `"categoria"`.
pub fn fold_header(text: &str) -> String {
    let stripped: String = text
        .nfkd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect();
    stripped
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Canonical field / metric name → header actually present in the export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnResolution {
    pub fields: BTreeMap<CanonicalField, String>,
    /// Metric name → header. Metrics without a matching header are absent.
    pub metrics: BTreeMap<String, String>,
}

impl ColumnResolution {
    pub fn header(&self, field: CanonicalField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }
}

/// Find the first header (in source order) that folds to one of `aliases`,
/// trying aliases in priority order.
fn find_header<'h>(folded: &[(String, &'h str)], aliases: &[String]) -> Option<&'h str> {
    aliases.iter().find_map(|alias| {
        let want = fold_header(alias);
        folded
            .iter()
            .find(|(key, _)| *key == want)
            .map(|(_, header)| *header)
    })
}

/// Map canonical fields and metrics to the headers present in `headers`.
///
/// Fails with [`PipelineError::MissingColumns`] when a required field has no
/// matching header. Optional fields and metrics are simply left unresolved.
pub fn resolve_columns(
    headers: &[String],
    aliases: &[FieldAliases],
    metrics: &[MetricDefinition],
) -> Result<ColumnResolution, PipelineError> {
    let folded: Vec<(String, &str)> = headers
        .iter()
        .map(|h| (fold_header(h), h.as_str()))
        .collect();

    let mut resolution = ColumnResolution::default();
    let mut missing = Vec::new();

    for entry in aliases {
        match find_header(&folded, &entry.aliases) {
            Some(header) => {
                resolution.fields.insert(entry.field, header.to_string());
            }
            None if entry.required => missing.push(entry.field),
            None => {}
        }
    }

    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns {
            missing,
            present: headers.to_vec(),
        });
    }

    for metric in metrics {
        let spellings: Vec<String> = std::iter::once(metric.name.clone())
            .chain(metric.aliases.iter().cloned())
            .collect();
        if let Some(header) = find_header(&folded, &spellings) {
            resolution
                .metrics
                .insert(metric.name.clone(), header.to_string());
        }
    }

    Ok(resolution)
}
