use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::columns::{CanonicalField, ColumnResolution};
use super::model::{MetricValue, NormalizedRecord, RawRecord};
use crate::error::RowError;

// ---------------------------------------------------------------------------
// Numeric
// ---------------------------------------------------------------------------

/// Read a locale-formatted metric cell.
///
/// Decimal commas become points, then everything that is not a digit or a
/// point is dropped (units, stray spaces). A leading minus sign survives.
/// Empty or unparseable input is `Unresolved`, never zero.
pub fn normalize_number(raw: &str) -> MetricValue {
    let trimmed = raw.trim();
    let negative = trimmed.starts_with('-');
    let digits: String = trimmed
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if digits.is_empty() {
        return MetricValue::Unresolved;
    }

    match digits.parse::<f64>() {
        Ok(v) if negative => MetricValue::Value(-v),
        Ok(v) => MetricValue::Value(v),
        Err(_) => MetricValue::Unresolved,
    }
}

// ---------------------------------------------------------------------------
// Date
// ---------------------------------------------------------------------------

/// Parse a date cell, day first.
///
/// Accepts `dd/mm/yyyy` with `/`, `-` or `.` separators, and year-first
/// `yyyy-mm-dd`. A trailing time of day (`05/06/2024 10:30`,
/// `2024-06-05T10:30:00`) is ignored. Every component must be plain digits;
/// two-digit years are rejected as ambiguous.
pub fn parse_date(raw: &str) -> Result<NaiveDate, RowError> {
    let fail = || RowError::UnparseableDate(raw.to_string());

    let date_part = raw
        .trim()
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or("");
    let sep = date_part
        .chars()
        .find(|c| matches!(c, '/' | '-' | '.'))
        .ok_or_else(fail)?;

    let parts: Vec<&str> = date_part.split(sep).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(fail());
    }

    let format = if parts[0].len() == 4 {
        format!("%Y{sep}%m{sep}%d")
    } else if parts[2].len() == 4 {
        format!("%d{sep}%m{sep}%Y")
    } else {
        return Err(fail());
    };

    NaiveDate::parse_from_str(date_part, &format).map_err(|_| fail())
}

// ---------------------------------------------------------------------------
// Categorical
// ---------------------------------------------------------------------------

/// Trimmed category, or `default` when the cell is missing or blank.
pub fn normalize_category(raw: Option<&str>, default: &str) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}

/// Trimmed subject name. A missing or blank name drops the row.
pub fn normalize_subject(raw: Option<&str>) -> Result<String, RowError> {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(RowError::EmptySubject),
    }
}

// ---------------------------------------------------------------------------
// Whole record
// ---------------------------------------------------------------------------

/// Turn one raw row into a typed record using a column resolution.
///
/// Row-level problems (no subject, bad or missing date) are errors; metric
/// cells that do not parse become [`MetricValue::Unresolved`].
pub fn normalize_record(
    raw: &RawRecord,
    resolution: &ColumnResolution,
    default_category: &str,
) -> Result<NormalizedRecord, RowError> {
    let cell = |field: CanonicalField| resolution.header(field).and_then(|h| raw.get(h));

    let subject = normalize_subject(cell(CanonicalField::Subject))?;
    let observed_at = parse_date(cell(CanonicalField::ObservedAt).unwrap_or(""))?;
    let category = normalize_category(cell(CanonicalField::Category), default_category);

    let metrics: BTreeMap<String, MetricValue> = resolution
        .metrics
        .iter()
        .map(|(name, header)| {
            let value = raw
                .get(header)
                .map(normalize_number)
                .unwrap_or(MetricValue::Unresolved);
            (name.clone(), value)
        })
        .collect();

    Ok(NormalizedRecord {
        subject,
        category,
        observed_at,
        metrics,
    })
}
