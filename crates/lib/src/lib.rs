//! Turn a GitHub repository's issue history into stacked open/closed
//! time series, one series per classification label.
//!
//! The pipeline is a sequence of pure functions:
//! [`ingest()`] → [`rank_labels()`] → [`date_axis()`] → [`aggregate()`].
//! Each stage takes its inputs by reference and returns fresh data; no
//! stage mutates another stage's output.

use chrono::NaiveDate;

pub mod aggregate;
pub mod ingest;
pub mod rank;

pub use aggregate::{aggregate, date_axis, LabelSeries, SeriesTable};
pub use ingest::{ingest, Ingested, RawIssue, RawLabel};
pub use rank::{rank_labels, KeywordTable};

/// Pseudo-label assigned to issues that carry no label at all.
pub const NO_LABEL: &str = "No Label";

/// Neutral display color for [`NO_LABEL`] (RGB hex, no `#`).
pub const NO_LABEL_COLOR: &str = "aaaaaa";

/// One classified issue, reduced to what the aggregator needs.
///
/// Exactly one label per issue: the first label the tracker reports wins,
/// even if the issue has several. `closed_at`, when present, is on or
/// after `created_at`.
#[derive(
    Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Deserialize, serde::Serialize,
)]
pub struct IssueRecord {
    pub label: String,
    /// RGB hex without `#`, e.g. `fc2929`.
    pub color: String,
    pub created_at: NaiveDate,
    pub closed_at: Option<NaiveDate>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed timestamp {value:?}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::format::ParseError,
    },
}
