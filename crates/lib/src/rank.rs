//! Severity ordering of labels for stacking.
//!
//! The order is a presentation concern, but a load-bearing one: the
//! aggregator stacks series in exactly this order, so swapping two
//! labels changes the numeric output.

/// Ordered `(keyword, weight)` pairs. A label's rank key is the weight
/// of the first entry whose keyword occurs as a case-sensitive substring
/// of the label; table order breaks ties between matching keywords.
/// Labels matching nothing sort after everything else.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeywordTable {
    entries: Vec<(String, u32)>,
}

impl KeywordTable {
    pub fn new(entries: Vec<(String, u32)>) -> Self {
        Self { entries }
    }

    pub fn rank_key(&self, label: &str) -> u32 {
        self.entries
            .iter()
            .find(|(keyword, _)| label.contains(keyword.as_str()))
            .map_or(u32::MAX, |(_, weight)| *weight)
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new(vec![
            ("critical".to_owned(), 0),
            ("high".to_owned(), 1),
            ("medium".to_owned(), 2),
            ("low".to_owned(), 3),
        ])
    }
}

/// Sort labels ascending by rank key. The sort is stable, so labels with
/// equal keys (including all unmatched ones) keep first-discovery order.
pub fn rank_labels(discovered: &[String], table: &KeywordTable) -> Vec<String> {
    let mut labels = discovered.to_vec();
    labels.sort_by_key(|label| table.rank_key(label));
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    #[test]
    fn orders_by_keyword_weight() {
        let ranked = rank_labels(
            &labels(&["bug-low-prio", "bug-high-prio", "bug-medium-prio"]),
            &KeywordTable::default(),
        );
        assert_eq!(
            ranked,
            labels(&["bug-high-prio", "bug-medium-prio", "bug-low-prio"])
        );
    }

    #[test]
    fn unmatched_labels_sort_last_in_discovery_order() {
        let ranked = rank_labels(
            &labels(&["question", "bug-low-prio", "docs", "bug-critical"]),
            &KeywordTable::default(),
        );
        assert_eq!(
            ranked,
            labels(&["bug-critical", "bug-low-prio", "question", "docs"])
        );
    }

    #[test]
    fn first_table_entry_breaks_keyword_ties() {
        // "high-low" contains both keywords; "high" comes first in the table.
        let table = KeywordTable::default();
        assert_eq!(table.rank_key("high-low"), 1);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let table = KeywordTable::default();
        assert_eq!(table.rank_key("HIGH"), u32::MAX);
    }

    #[test]
    fn custom_table_is_honored() {
        let table = KeywordTable::new(vec![("p0".to_owned(), 0), ("p1".to_owned(), 1)]);
        let ranked = rank_labels(&labels(&["sev-p1", "sev-p0", "other"]), &table);
        assert_eq!(ranked, labels(&["sev-p0", "sev-p1", "other"]));
    }
}
