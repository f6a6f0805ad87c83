use std::sync::Arc;

use chrono::NaiveDate;

use crate::data::filter::{Dimension, FilterCriteria, filtered_indices};
use crate::data::model::{Dataset, EvaluatedRecord};

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// A value selectable in one filter dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Text(String),
    Date(NaiveDate),
}

/// Presentation-side state, independent of rendering.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Current dataset (None until the first successful load). Replaced as a
    /// whole on refresh; readers holding the old `Arc` keep a consistent view.
    pub dataset: Option<Arc<Dataset>>,

    /// Per-dimension selections.
    pub criteria: FilterCriteria,

    /// Indices of records passing the current criteria (cached).
    pub visible: Vec<usize>,

    /// Status / error message for the operator.
    pub status_message: Option<String>,
}

impl ViewState {
    /// Swap in a freshly built dataset. Selections that no longer exist in
    /// the new data are dropped.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.criteria.subjects.retain(|s| dataset.subjects.contains(s));
        self.criteria.categories.retain(|c| dataset.categories.contains(c));
        self.criteria.dates.retain(|d| dataset.dates.contains(d));

        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible` after a criteria change.
    pub fn refilter(&mut self) {
        self.visible = match &self.dataset {
            Some(ds) => filtered_indices(ds, &self.criteria),
            None => Vec::new(),
        };
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle(&mut self, dimension: Dimension, value: Selection) {
        fn flip<T: Ord>(set: &mut std::collections::BTreeSet<T>, v: T) {
            if !set.remove(&v) {
                set.insert(v);
            }
        }
        match (dimension, value) {
            (Dimension::Subject, Selection::Text(s)) => flip(&mut self.criteria.subjects, s),
            (Dimension::Category, Selection::Text(c)) => flip(&mut self.criteria.categories, c),
            (Dimension::Date, Selection::Date(d)) => flip(&mut self.criteria.dates, d),
            (dimension, value) => {
                log::warn!("ignoring {value:?} for {dimension} filter");
                return;
            }
        }
        self.refilter();
    }

    /// Clear a dimension's selection, i.e. show every value.
    pub fn select_all(&mut self, dimension: Dimension) {
        match dimension {
            Dimension::Subject => self.criteria.subjects.clear(),
            Dimension::Category => self.criteria.categories.clear(),
            Dimension::Date => self.criteria.dates.clear(),
        }
        self.refilter();
    }

    /// Replace all criteria at once.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refilter();
    }

    /// Records currently visible, in dataset order.
    pub fn visible_records(&self) -> Vec<&EvaluatedRecord> {
        match &self.dataset {
            Some(ds) => self.visible.iter().filter_map(|&i| ds.records.get(i)).collect(),
            None => Vec::new(),
        }
    }

    /// `(shown, total)` record counts.
    pub fn summary(&self) -> (usize, usize) {
        let total = self.dataset.as_ref().map_or(0, |ds| ds.len());
        (self.visible.len(), total)
    }
}
