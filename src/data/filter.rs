use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

use super::model::{Dataset, EvaluatedRecord};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per dimension
// ---------------------------------------------------------------------------

/// A filterable dimension of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Subject,
    Category,
    Date,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Subject => write!(f, "subject"),
            Dimension::Category => write!(f, "category"),
            Dimension::Date => write!(f, "date"),
        }
    }
}

/// Per-dimension selections. An empty set means "no constraint" (show all),
/// never "exclude all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub subjects: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub dates: BTreeSet<NaiveDate>,
}

impl FilterCriteria {
    /// Whether no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty() && self.categories.is_empty() && self.dates.is_empty()
    }

    /// Whether a record satisfies every constrained dimension.
    pub fn matches(&self, rec: &EvaluatedRecord) -> bool {
        let r = &rec.record;
        (self.subjects.is_empty() || self.subjects.contains(&r.subject))
            && (self.categories.is_empty() || self.categories.contains(&r.category))
            && (self.dates.is_empty() || self.dates.contains(&r.observed_at))
    }
}

/// Return indices of records that pass all active filters, in dataset order.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    if criteria.is_empty() {
        return (0..dataset.len()).collect();
    }
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Borrowed view of the records that pass all active filters.
pub fn apply<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> Vec<&'a EvaluatedRecord> {
    dataset
        .records
        .iter()
        .filter(|rec| criteria.matches(rec))
        .collect()
}
