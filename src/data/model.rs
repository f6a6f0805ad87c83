use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::RowError;

// ---------------------------------------------------------------------------
// RawRecord / RawTable – what the loader hands to the pipeline
// ---------------------------------------------------------------------------

/// One source row: header → raw cell text. Absent cells are simply missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    cells: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: impl Into<String>, cell: impl Into<String>) {
        self.cells.insert(header.into(), cell.into());
    }

    /// Raw cell for an exact header name.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(header).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A loaded export before any interpretation.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Header names in source order (kept for diagnostics).
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

// ---------------------------------------------------------------------------
// MetricValue / Classification
// ---------------------------------------------------------------------------

/// A metric cell after numeric normalization.
///
/// `Unresolved` is distinct from a real zero: it means the cell was empty or
/// could not be read as a number. Serializes as a number or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Value(f64),
    Unresolved,
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Value(v) => Some(*v),
            MetricValue::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, MetricValue::Value(_))
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Value(v) => write!(f, "{v}"),
            MetricValue::Unresolved => write!(f, "-"),
        }
    }
}

/// Tri-state outcome of comparing a metric value with its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Pass,
    Fail,
    Unknown,
}

impl Classification {
    /// Glyph used by the table view.
    pub fn glyph(&self) -> &'static str {
        match self {
            Classification::Pass => "👍",
            Classification::Fail => "👎",
            Classification::Unknown => "?",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Pass => write!(f, "pass"),
            Classification::Fail => write!(f, "fail"),
            Classification::Unknown => write!(f, "unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// NormalizedRecord – one typed row
// ---------------------------------------------------------------------------

/// A row after column resolution and field normalization.
///
/// `subject` is never empty and `observed_at` is always a real date; rows that
/// cannot satisfy that are dropped by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub subject: String,
    pub category: String,
    pub observed_at: NaiveDate,
    /// Metric name → value. Only metrics whose column exists in the export
    /// have an entry.
    pub metrics: BTreeMap<String, MetricValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    pub metric_name: String,
    pub classification: Classification,
}

/// A normalized row together with its classifications, in metric
/// configuration order. Computed once; filtering never touches it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedRecord {
    #[serde(flatten)]
    pub record: NormalizedRecord,
    pub results: Vec<EvaluationResult>,
}

impl EvaluatedRecord {
    /// `(value, classification)` for one metric, if it was evaluated.
    pub fn metric(&self, name: &str) -> Option<(MetricValue, Classification)> {
        let result = self.results.iter().find(|r| r.metric_name == name)?;
        let value = self
            .record
            .metrics
            .get(name)
            .copied()
            .unwrap_or(MetricValue::Unresolved);
        Some((value, result.classification))
    }
}

// ---------------------------------------------------------------------------
// NormalizationReport – what was absorbed on the way
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedRow {
    /// 1-based data row number (header excluded).
    pub row: usize,
    #[serde(serialize_with = "serialize_display")]
    pub reason: RowError,
}

fn serialize_display<S: serde::Serializer>(err: &RowError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

/// Per-row and per-cell issues recovered during normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationReport {
    pub total_rows: usize,
    pub dropped: Vec<DroppedRow>,
    /// Metric cells that could not be read as numbers.
    pub unresolved_cells: usize,
}

impl NormalizationReport {
    pub fn kept(&self) -> usize {
        self.total_rows - self.dropped.len()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete evaluated dataset
// ---------------------------------------------------------------------------

/// The full evaluated dataset with pre-computed unique values per filter
/// dimension. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All kept records, in source order.
    pub records: Vec<EvaluatedRecord>,
    /// Metric names in configuration order (columns of the view).
    pub metric_names: Vec<String>,
    pub subjects: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub dates: BTreeSet<NaiveDate>,
    pub report: NormalizationReport,
}

impl Dataset {
    /// Build dimension indices from the evaluated records.
    pub fn from_records(
        records: Vec<EvaluatedRecord>,
        metric_names: Vec<String>,
        report: NormalizationReport,
    ) -> Self {
        let mut subjects = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut dates = BTreeSet::new();

        for rec in &records {
            subjects.insert(rec.record.subject.clone());
            categories.insert(rec.record.category.clone());
            dates.insert(rec.record.observed_at);
        }

        Dataset {
            records,
            metric_names,
            subjects,
            categories,
            dates,
            report,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
