//! Read-only views derived from a fetched list.

/// Case-insensitive substring match over the space-joined fields.
/// An empty query matches everything.
pub fn matches_text(query: &str, fields: &[Option<&str>]) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let haystack = fields
        .iter()
        .map(|f| f.unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    haystack.contains(&needle)
}

/// Inclusive bounds on `YYYY-MM-DD` strings. Records without a date pass.
pub fn within_dates(date: Option<&str>, from: Option<&str>, to: Option<&str>) -> bool {
    let Some(date) = date.filter(|d| !d.is_empty()) else {
        return true;
    };
    // Timestamps compare on their calendar-date prefix
    let day = date.get(..10).unwrap_or(date);
    if let Some(from) = from.filter(|f| !f.is_empty()) {
        if day < from {
            return false;
        }
    }
    if let Some(to) = to.filter(|t| !t.is_empty()) {
        if day > to {
            return false;
        }
    }
    true
}

/// Compact view: the first `n` items
pub fn first_n<T>(items: &[T], n: usize) -> &[T] {
    &items[..n.min(items.len())]
}

pub fn summary(shown: usize, total: usize) -> String {
    format!("Showing {} of {}", shown.min(total), total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_match_is_case_insensitive_across_fields() {
        let fields = [Some("Maria Sitoe"), None, Some("pendente")];
        assert!(matches_text("SITOE", &fields));
        assert!(matches_text("pend", &fields));
        assert!(matches_text("", &fields));
        assert!(!matches_text("paga", &fields));
    }

    #[test]
    fn text_match_spans_field_boundary() {
        let fields = [Some("Fixa"), Some("Energia")];
        assert!(matches_text("fixa energia", &fields));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        assert!(within_dates(Some("2026-10-01"), Some("2026-10-01"), Some("2026-10-31")));
        assert!(within_dates(Some("2026-10-31"), Some("2026-10-01"), Some("2026-10-31")));
        assert!(!within_dates(Some("2026-09-30"), Some("2026-10-01"), None));
        assert!(!within_dates(Some("2026-11-01"), None, Some("2026-10-31")));
        assert!(within_dates(Some("2026-10-31T23:59:00"), None, Some("2026-10-31")));
    }

    #[test]
    fn undated_records_are_kept() {
        assert!(within_dates(None, Some("2026-01-01"), Some("2026-01-31")));
        assert!(within_dates(Some(""), Some("2026-01-01"), None));
    }

    #[test]
    fn first_n_and_summary() {
        let items = [1, 2, 3, 4, 5, 6, 7];
        assert_eq!(first_n(&items, 5), &[1, 2, 3, 4, 5]);
        assert_eq!(first_n(&items[..2], 5), &[1, 2]);
        assert_eq!(summary(5, 7), "Showing 5 of 7");
        assert_eq!(summary(5, 2), "Showing 2 of 2");
    }
}
