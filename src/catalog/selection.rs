//! Chapter-selection expressions: comma-separated labels and ranges.
//!
//! Deliberately permissive: bare tokens pass through untouched so non-numeric
//! labels stay selectable, and whatever never matches a known chapter is
//! filtered out later against the resolved chapter map.

use std::collections::HashSet;

/// Parse an expression like `5,6,10-15` or `1.5-2.5,20` into a set of
/// chapter-number labels.
///
/// Range bounds are decimal numbers. Enumeration steps by 1 while both the
/// running value and the end are whole, otherwise by 0.1, rounding the running
/// value to one decimal each step so the fractional walk cannot drift.
/// Malformed ranges contribute nothing; no error is ever raised.
pub fn parse_chapter_selection(expression: &str) -> HashSet<String> {
    let mut selected = HashSet::new();
    for token in expression.split(',') {
        let token = token.trim();
        if let Some((start, end)) = token.split_once('-') {
            let (Ok(start), Ok(end)) = (start.trim().parse::<f64>(), end.trim().parse::<f64>())
            else {
                continue;
            };
            let mut current = start;
            while current <= end {
                selected.insert(render_label(current));
                current += if is_whole(current) && is_whole(end) {
                    1.0
                } else {
                    0.1
                };
                current = (current * 10.0).round() / 10.0;
            }
        } else if !token.is_empty() {
            selected.insert(token.to_string());
        }
    }
    selected
}

fn is_whole(value: f64) -> bool {
    value.fract() == 0.0
}

/// Whole values render without a decimal point, fractional ones with one
/// decimal digit, matching the catalog's label style.
fn render_label(value: f64) -> String {
    if is_whole(value) {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(labels: &[&str]) -> HashSet<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn integer_range_is_inclusive() {
        assert_eq!(parse_chapter_selection("5-8"), set(&["5", "6", "7", "8"]));
    }

    #[test]
    fn fractional_range_steps_by_tenths() {
        assert_eq!(
            parse_chapter_selection("1.5-2.5"),
            set(&[
                "1.5", "1.6", "1.7", "1.8", "1.9", "2", "2.1", "2.2", "2.3", "2.4", "2.5"
            ])
        );
    }

    #[test]
    fn whole_values_render_without_decimal_point() {
        let labels = parse_chapter_selection("1.8-2.2");
        assert!(labels.contains("2"));
        assert!(!labels.contains("2.0"));
    }

    #[test]
    fn malformed_tokens_are_skipped_and_tokens_union() {
        assert_eq!(
            parse_chapter_selection("5,10-12,x-y"),
            set(&["5", "10", "11", "12"])
        );
    }

    #[test]
    fn bare_tokens_pass_through_verbatim() {
        assert_eq!(
            parse_chapter_selection(" 0 , extra , 7.5"),
            set(&["0", "extra", "7.5"])
        );
    }

    #[test]
    fn empty_and_reversed_ranges_yield_nothing() {
        assert!(parse_chapter_selection("").is_empty());
        assert!(parse_chapter_selection("9-5").is_empty());
    }
}
