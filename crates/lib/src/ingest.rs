//! Normalization of raw tracker entries into [`IssueRecord`]s.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{Error, IssueRecord, NO_LABEL, NO_LABEL_COLOR};

/// GitHub's fixed timestamp format, e.g. `2023-05-27T14:03:11Z`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// The issues endpoint also returns pull requests; their node ids carry
/// this prefix while genuine issues start with `I_`.
const PULL_REQUEST_PREFIX: &str = "PR_";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawLabel {
    pub name: String,
    /// RGB hex without `#`.
    pub color: String,
}

/// An issue entry as the tracker API serves it, reduced to the fields
/// this pipeline reads.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawIssue {
    pub node_id: String,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    pub created_at: String,
    pub closed_at: Option<String>,
}

/// Output of [`ingest`]: the classified records, the labels in
/// first-discovery order, and the display color last seen per label.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ingested {
    pub records: Vec<IssueRecord>,
    pub labels: Vec<String>,
    pub colors: HashMap<String, String>,
}

fn parse_date(value: &str) -> Result<NaiveDate, Error> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|dt| dt.date())
        .map_err(|source| Error::Timestamp {
            value: value.to_owned(),
            source,
        })
}

/// Classify raw tracker entries.
///
/// Pull requests are dropped entirely. Unlabeled issues get the
/// [`NO_LABEL`] pseudo-label so they are never silently lost. Only the
/// first label of a multi-labeled issue is used. The first malformed
/// timestamp fails the whole ingestion; nothing partial is returned.
pub fn ingest(raw: &[RawIssue]) -> Result<Ingested, Error> {
    let mut out = Ingested::default();
    for issue in raw {
        if issue.node_id.starts_with(PULL_REQUEST_PREFIX) {
            continue;
        }
        let (label, color) = match issue.labels.first() {
            Some(l) => (l.name.clone(), l.color.clone()),
            None => (NO_LABEL.to_owned(), NO_LABEL_COLOR.to_owned()),
        };
        let created_at = parse_date(&issue.created_at)?;
        let closed_at = issue.closed_at.as_deref().map(parse_date).transpose()?;
        debug_assert!(closed_at.map_or(true, |c| c >= created_at));
        if !out.labels.iter().any(|known| *known == label) {
            out.labels.push(label.clone());
        }
        // Last write wins; in practice colors are stable per label.
        out.colors.insert(label.clone(), color.clone());
        out.records.push(IssueRecord {
            label,
            color,
            created_at,
            closed_at,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(value: serde_json::Value) -> RawIssue {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn classifies_by_first_label() {
        let issues = [raw(serde_json::json!({
            "node_id": "I_kwDOA1",
            "labels": [
                {"name": "bug-high-prio", "color": "780000"},
                {"name": "bug-low-prio", "color": "00ac46"},
            ],
            "created_at": "2023-05-01T09:00:00Z",
            "closed_at": null,
        }))];
        let out = ingest(&issues).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].label, "bug-high-prio");
        assert_eq!(out.records[0].color, "780000");
        assert_eq!(out.records[0].closed_at, None);
        assert_eq!(out.labels, vec!["bug-high-prio".to_owned()]);
    }

    #[test]
    fn drops_pull_requests() {
        let issues = [
            raw(serde_json::json!({
                "node_id": "PR_kwDOA9",
                "labels": [{"name": "bug-high-prio", "color": "780000"}],
                "created_at": "2023-05-01T09:00:00Z",
                "closed_at": null,
            })),
            raw(serde_json::json!({
                "node_id": "I_kwDOA2",
                "labels": [],
                "created_at": "2023-05-02T09:00:00Z",
                "closed_at": null,
            })),
        ];
        let out = ingest(&issues).unwrap();
        assert_eq!(out.records.len(), 1);
        // The pull request must not contribute to the label set either.
        assert_eq!(out.labels, vec![NO_LABEL.to_owned()]);
    }

    #[test]
    fn unlabeled_issue_gets_pseudo_label() {
        let issues = [raw(serde_json::json!({
            "node_id": "I_kwDOA3",
            "labels": [],
            "created_at": "2023-05-01T09:00:00Z",
            "closed_at": "2023-05-03T10:30:00Z",
        }))];
        let out = ingest(&issues).unwrap();
        assert_eq!(out.records[0].label, NO_LABEL);
        assert_eq!(out.records[0].color, NO_LABEL_COLOR);
        assert_eq!(out.colors[NO_LABEL], NO_LABEL_COLOR);
        assert_eq!(
            out.records[0].closed_at,
            NaiveDate::from_ymd_opt(2023, 5, 3)
        );
    }

    #[test]
    fn label_discovery_order_is_preserved() {
        let issues = [
            raw(serde_json::json!({
                "node_id": "I_1",
                "labels": [{"name": "feature", "color": "0000ff"}],
                "created_at": "2023-05-01T09:00:00Z",
                "closed_at": null,
            })),
            raw(serde_json::json!({
                "node_id": "I_2",
                "labels": [{"name": "bug-high-prio", "color": "780000"}],
                "created_at": "2023-05-02T09:00:00Z",
                "closed_at": null,
            })),
            raw(serde_json::json!({
                "node_id": "I_3",
                "labels": [{"name": "feature", "color": "0000cc"}],
                "created_at": "2023-05-03T09:00:00Z",
                "closed_at": null,
            })),
        ];
        let out = ingest(&issues).unwrap();
        assert_eq!(
            out.labels,
            vec!["feature".to_owned(), "bug-high-prio".to_owned()]
        );
        // Color is last-write-wins.
        assert_eq!(out.colors["feature"], "0000cc");
    }

    #[test]
    fn malformed_timestamp_fails_whole_ingestion() {
        let issues = [
            raw(serde_json::json!({
                "node_id": "I_1",
                "labels": [],
                "created_at": "2023-05-01T09:00:00Z",
                "closed_at": null,
            })),
            raw(serde_json::json!({
                "node_id": "I_2",
                "labels": [],
                "created_at": "May 2nd, 2023",
                "closed_at": null,
            })),
        ];
        let err = ingest(&issues).unwrap_err();
        assert!(matches!(err, Error::Timestamp { ref value, .. } if value == "May 2nd, 2023"));
    }
}
