use unicode_width::UnicodeWidthStr;

use crate::data::model::EvaluatedRecord;

/// Display format for dates, matching the source locale.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Terminal columns taken by `s`; the pass/fail glyphs are double width.
fn width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

fn pad(out: &mut String, cell: &str, w: usize) {
    out.push_str(cell);
    for _ in width(cell)..w {
        out.push(' ');
    }
}

/// Render visible records as a fixed-width text table.
///
/// Each metric cell shows the value and its pass/fail glyph; metrics a record
/// does not carry are left blank.
pub fn table(records: &[&EvaluatedRecord], metric_names: &[String]) -> String {
    let mut header: Vec<String> = vec!["Subject".into(), "Category".into(), "Date".into()];
    header.extend(metric_names.iter().cloned());

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|rec| {
            let mut row = vec![
                rec.record.subject.clone(),
                rec.record.category.clone(),
                rec.record.observed_at.format(DATE_FORMAT).to_string(),
            ];
            row.extend(metric_names.iter().map(|name| match rec.metric(name) {
                Some((value, class)) => format!("{value} {}", class.glyph()),
                None => String::new(),
            }));
            row
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            rows.iter()
                .map(|r| width(&r[col]))
                .chain(std::iter::once(width(&header[col])))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for line in std::iter::once(&header).chain(rows.iter()) {
        for (col, cell) in line.iter().enumerate() {
            if col > 0 {
                out.push_str(" | ");
            }
            pad(&mut out, cell, widths[col]);
        }
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push('\n');
    }
    out
}

/// `Records: shown/total` footer.
pub fn footer(shown: usize, total: usize) -> String {
    format!("Records: {shown}/{total}")
}

/// Visible records as a JSON array.
pub fn json(records: &[&EvaluatedRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}
