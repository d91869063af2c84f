//! Value-level matching for exact and substring conditions.

use std::fmt;

use memchr::memmem::Finder;

use crate::options::CaseFolding;

/// A substring needle with a prebuilt searcher.
///
/// The needle text is already case-folded when the query is compiled.
#[derive(Clone)]
pub(crate) struct Needle {
    text: String,
    finder: Finder<'static>,
}

impl Needle {
    pub(crate) fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let finder = Finder::new(text.as_bytes()).into_owned();
        Self { text, finder }
    }

    pub(crate) fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub(crate) fn is_found_in(&self, haystack: &str) -> bool {
        self.finder.find(haystack.as_bytes()).is_some()
    }
}

impl fmt::Debug for Needle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Needle").field(&self.as_str()).finish()
    }
}

impl PartialEq for Needle {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Needle {}

/// Exact comparison of one tag value.
///
/// `None` on either side means "tag absent"; two absents are equal.
pub(crate) fn exact_value_matches(value: Option<&str>, content: Option<&str>, case: CaseFolding) -> bool {
    match (value, content) {
        (None, None) => true,
        (Some(value), Some(content)) => case.fold(value) == content,
        _ => false,
    }
}

/// Substring test of one tag value. Absent and empty values never match.
pub(crate) fn value_contains(value: Option<&str>, needle: &Needle, case: CaseFolding) -> bool {
    match value {
        Some(value) if !value.is_empty() => needle.is_found_in(&case.fold(value)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needle_finds_contiguous_runs_only() {
        let needle = Needle::new("a b");
        assert!(needle.is_found_in("xa by"));
        assert!(!needle.is_found_in("a_b"));
        assert!(Needle::new("").is_found_in("anything"));
    }

    #[test]
    fn exact_match_treats_absent_as_its_own_value() {
        let case = CaseFolding::Sensitive;
        assert!(exact_value_matches(None, None, case));
        assert!(!exact_value_matches(Some(""), None, case));
        assert!(!exact_value_matches(None, Some(""), case));
        assert!(exact_value_matches(Some(""), Some(""), case));
    }

    #[test]
    fn exact_match_folds_the_record_value() {
        assert!(exact_value_matches(
            Some("Tool"),
            Some("tool"),
            CaseFolding::Insensitive
        ));
        assert!(!exact_value_matches(
            Some("Tool"),
            Some("tool"),
            CaseFolding::Sensitive
        ));
    }

    #[test]
    fn contains_rejects_absent_and_empty_values() {
        let needle = Needle::new("");
        let case = CaseFolding::Sensitive;
        assert!(!value_contains(None, &needle, case));
        assert!(!value_contains(Some(""), &needle, case));
        assert!(value_contains(Some("x"), &needle, case));
        assert!(value_contains(
            Some("Heavy METAL"),
            &Needle::new("metal"),
            CaseFolding::Insensitive
        ));
    }
}
