//! Best-translation selection: one record per chapter-number label.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::mangadex::models::ChapterRecord;

/// Numeric value of a chapter label, when the label is purely numeric
/// (ASCII digits with at most one decimal point). Anything else sorts after
/// all numeric labels.
pub fn chapter_number(label: &str) -> Option<f64> {
    let mut dots = 0usize;
    let mut digits = 0usize;
    for ch in label.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' if dots == 0 => dots += 1,
            _ => return None,
        }
    }
    if digits == 0 {
        return None;
    }
    label.parse::<f64>().ok()
}

/// Display/iteration order for chapter labels: numeric ascending first,
/// non-numeric after (stable among themselves).
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    let ka = chapter_number(a).unwrap_or(f64::INFINITY);
    let kb = chapter_number(b).unwrap_or(f64::INFINITY);
    ka.total_cmp(&kb)
}

/// The deduplicated, single-winner-per-label view of the fetched records,
/// in display order. Built once per run; read-only afterward.
#[derive(Debug, Default)]
pub struct ResolvedChapters {
    entries: Vec<(String, ChapterRecord)>,
}

impl ResolvedChapters {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChapterRecord)> {
        self.entries.iter().map(|(l, r)| (l.as_str(), r))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn get(&self, label: &str) -> Option<&ChapterRecord> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, r)| r)
    }
}

/// Group records by chapter-number label and pick, per label, the record in
/// the most preferred language present.
///
/// `preferred` is most-preferred first. A label with no record in any
/// preferred language is dropped. Two records sharing (label, language) are
/// resolved last-seen-wins.
pub fn resolve_best_translations(
    records: Vec<ChapterRecord>,
    preferred: &[String],
) -> ResolvedChapters {
    // Per label: language -> record, insertion overwrites so the last record
    // seen for a (label, language) pair wins.
    let mut groups: HashMap<String, HashMap<String, ChapterRecord>> = HashMap::new();
    for record in records {
        let label = record.label().to_string();
        let language = record.language().to_string();
        let by_language = groups.entry(label).or_default();
        if by_language.contains_key(&language) {
            debug!(
                target: "catalog",
                label = record.label(),
                %language,
                id = %record.id,
                "duplicate (label, language) record, keeping the later one"
            );
        }
        by_language.insert(language, record);
    }

    let mut labels: Vec<String> = groups.keys().cloned().collect();
    labels.sort_by(|a, b| compare_labels(a, b));

    let mut entries = Vec::with_capacity(labels.len());
    for label in labels {
        let Some(by_language) = groups.get_mut(&label) else {
            continue;
        };
        let winner = preferred
            .iter()
            .find_map(|language| by_language.remove(language));
        match winner {
            Some(record) => {
                debug!(
                    target: "catalog",
                    %label,
                    language = record.language(),
                    "chapter translation selected"
                );
                entries.push((label, record));
            }
            None => {
                debug!(target: "catalog", %label, "no preferred language, chapter dropped");
            }
        }
    }

    ResolvedChapters { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mangadex::models::chapter_record;

    #[test]
    fn picks_the_most_preferred_language() {
        let records = vec![
            chapter_record("fr-3", Some("3"), "fr"),
            chapter_record("en-3", Some("3"), "en"),
        ];
        let resolved = resolve_best_translations(
            records,
            &["en".to_string(), "fr".to_string()],
        );
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.get("3").unwrap().id, "en-3");
    }

    #[test]
    fn drops_labels_with_no_preferred_language() {
        let records = vec![
            chapter_record("de-4", Some("4"), "de"),
            chapter_record("en-5", Some("5"), "en"),
        ];
        let resolved =
            resolve_best_translations(records, &["en".to_string(), "fr".to_string()]);
        assert!(resolved.get("4").is_none());
        assert_eq!(resolved.get("5").unwrap().id, "en-5");
    }

    #[test]
    fn absent_label_groups_under_zero() {
        let records = vec![chapter_record("oneshot", None, "en")];
        let resolved = resolve_best_translations(records, &["en".to_string()]);
        assert_eq!(resolved.get("0").unwrap().id, "oneshot");
    }

    #[test]
    fn duplicate_label_and_language_keeps_the_last_record() {
        let records = vec![
            chapter_record("first", Some("9"), "en"),
            chapter_record("second", Some("9"), "en"),
        ];
        let resolved = resolve_best_translations(records, &["en".to_string()]);
        assert_eq!(resolved.get("9").unwrap().id, "second");
    }

    #[test]
    fn labels_sort_numerically_then_non_numeric_last() {
        let records = vec![
            chapter_record("a", Some("10"), "en"),
            chapter_record("b", Some("2"), "en"),
            chapter_record("c", Some("abc"), "en"),
            chapter_record("d", Some("1"), "en"),
            chapter_record("e", Some("1.5"), "en"),
        ];
        let resolved = resolve_best_translations(records, &["en".to_string()]);
        let order: Vec<&str> = resolved.labels().collect();
        assert_eq!(order, vec!["1", "1.5", "2", "10", "abc"]);
    }

    #[test]
    fn chapter_number_rejects_mixed_labels() {
        assert_eq!(chapter_number("10.5"), Some(10.5));
        assert_eq!(chapter_number("0"), Some(0.0));
        assert_eq!(chapter_number("1.2.3"), None);
        assert_eq!(chapter_number("extra"), None);
        assert_eq!(chapter_number("-1"), None);
        assert_eq!(chapter_number("."), None);
    }
}
