//! Temporal aggregation: issue events → stacked per-label series.
//!
//! Three explicit stages, each reading only the previous stage's
//! finished output:
//!
//! 1. raw cumulative open/closed counts per label and date,
//! 2. stacking across labels in rank order,
//! 3. reconciliation of the open counts against closures.
//!
//! Stage 1's "open" count is *ever opened by date D*, not currently
//! open; stage 3 subtracts the label's accumulated closures so the
//! final open series counts only issues not yet closed, stacked across
//! labels. The closed-stack baseline is not baked into the open values;
//! the renderer adds it back when drawing, so the series here stay free
//! of double counting.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::IssueRecord;

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LabelSeries {
    pub label: String,
    /// One count per [`SeriesTable::dates`] entry.
    pub values: Vec<u64>,
}

/// Stacked open/closed series, aligned to a shared date axis.
///
/// Both halves are in rank order (index 0 = bottom of the stack).
/// Series that are zero at every date are omitted from their half; by
/// monotonicity along the stack those form a prefix of the rank order,
/// so the last series of each half is always the full running total.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SeriesTable {
    pub dates: Vec<NaiveDate>,
    pub open: Vec<LabelSeries>,
    pub closed: Vec<LabelSeries>,
}

impl SeriesTable {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Total closed count per date across all labels: the top of the
    /// closed stack, or zeros when nothing was ever closed.
    pub fn closed_total(&self) -> Vec<u64> {
        self.closed
            .last()
            .map_or_else(|| vec![0; self.dates.len()], |s| s.values.clone())
    }
}

/// Every date on which anything happened: all creation and closure
/// dates, sorted and deduplicated. The series are step functions
/// sampled only at these points, not on a daily grid. Dates after
/// `until` are excluded.
pub fn date_axis(records: &[IssueRecord], until: Option<NaiveDate>) -> Vec<NaiveDate> {
    let mut dates = BTreeSet::new();
    for record in records {
        dates.insert(record.created_at);
        if let Some(closed) = record.closed_at {
            dates.insert(closed);
        }
    }
    dates
        .into_iter()
        .filter(|date| until.map_or(true, |limit| *date <= limit))
        .collect()
}

fn raw_counts(records: &[IssueRecord], label: &str, dates: &[NaiveDate]) -> (Vec<u64>, Vec<u64>) {
    let mut created: Vec<NaiveDate> = records
        .iter()
        .filter(|r| r.label == label)
        .map(|r| r.created_at)
        .collect();
    created.sort_unstable();
    let mut closed: Vec<NaiveDate> = records
        .iter()
        .filter(|r| r.label == label)
        .filter_map(|r| r.closed_at)
        .collect();
    closed.sort_unstable();

    let open_counts = dates
        .iter()
        .map(|d| created.partition_point(|c| c <= d) as u64)
        .collect();
    let closed_counts = dates
        .iter()
        .map(|d| closed.partition_point(|c| c <= d) as u64)
        .collect();
    (open_counts, closed_counts)
}

fn add_rows(current: &[u64], below: &[u64]) -> Vec<u64> {
    current
        .iter()
        .zip(below)
        .map(|(cur, below)| cur + below)
        .collect()
}

/// Build the [`SeriesTable`] for `records` over `dates`, stacking in
/// `label_set` order. Pure: identical inputs give identical output.
pub fn aggregate(
    records: &[IssueRecord],
    label_set: &[String],
    dates: &[NaiveDate],
) -> SeriesTable {
    if dates.is_empty() {
        return SeriesTable::default();
    }

    // Stage 1: raw cumulative counts per label.
    let raw: Vec<(Vec<u64>, Vec<u64>)> = label_set
        .iter()
        .map(|label| raw_counts(records, label, dates))
        .collect();

    // Stage 2: stack across labels, bottom of the stack first.
    let mut stacked_open: Vec<Vec<u64>> = Vec::with_capacity(raw.len());
    let mut stacked_closed: Vec<Vec<u64>> = Vec::with_capacity(raw.len());
    for (open_row, closed_row) in &raw {
        let open_next = match stacked_open.last() {
            Some(below) => add_rows(open_row, below),
            None => open_row.clone(),
        };
        let closed_next = match stacked_closed.last() {
            Some(below) => add_rows(closed_row, below),
            None => closed_row.clone(),
        };
        stacked_open.push(open_next);
        stacked_closed.push(closed_next);
    }

    // Stage 3: the stacked open counts include issues already closed;
    // subtract the label's accumulated closures. Closures never exceed
    // creations for any stack prefix, so this cannot underflow.
    let open = label_set
        .iter()
        .zip(stacked_open.iter().zip(&stacked_closed))
        .map(|(label, (open_row, closed_row))| LabelSeries {
            label: label.clone(),
            values: open_row
                .iter()
                .zip(closed_row)
                .map(|(o, c)| o.saturating_sub(*c))
                .collect(),
        })
        .filter(|series| series.values.iter().any(|v| *v != 0))
        .collect();
    let closed = label_set
        .iter()
        .zip(&stacked_closed)
        .map(|(label, closed_row)| LabelSeries {
            label: label.clone(),
            values: closed_row.clone(),
        })
        .filter(|series| series.values.iter().any(|v| *v != 0))
        .collect();

    SeriesTable {
        dates: dates.to_vec(),
        open,
        closed,
    }
}
