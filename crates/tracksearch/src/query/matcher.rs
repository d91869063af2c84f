//! Query matcher for track searches.

use std::fmt;

use crate::error::{QueryDiagnostic, Result};
use crate::options::{CaseFolding, SearchOptions};
use crate::types::{MatchResult, Searchable};

use super::compile::compile_expressions;
use super::expression::{write_joined, QueryExpression};
use super::node::MatcherNode;
use super::optimizer::optimize_expressions;
use super::parser::{ParsedQuery, QueryParser};

/// A compiled query: top-level conditions that must all hold.
///
/// Compiled once and reusable across any number of record streams. It holds
/// no per-record state, so it is `Send + Sync` and can be shared between
/// concurrent evaluations.
#[derive(Debug, Clone)]
pub struct TracksMatcher {
    expressions: Vec<QueryExpression>,
    matchers: Vec<MatcherNode>,
    case_folding: CaseFolding,
    diagnostics: Vec<QueryDiagnostic>,
}

impl TracksMatcher {
    /// Compiles a query string, recovering from malformed syntax.
    pub fn new(search: &str, case_sensitive: bool, keyword_tags: &[&str]) -> Self {
        let options = SearchOptions::new()
            .with_case_sensitive(case_sensitive)
            .with_keyword_tags(keyword_tags.iter().copied());
        Self::with_options(search, &options)
    }

    /// Compiles a query string with explicit options, recovering from
    /// malformed syntax. Each recovered construct is logged as a warning.
    pub fn with_options(search: &str, options: &SearchOptions) -> Self {
        let parsed = QueryParser::parse(search);
        for diagnostic in &parsed.diagnostics {
            log::warn!("Malformed search query {search:?}: {diagnostic}");
        }
        Self::from_parsed(parsed, options)
    }

    /// Compiles a query string, failing on the first malformed construct.
    pub fn try_new(search: &str, options: &SearchOptions) -> Result<Self> {
        let expressions = QueryParser::parse_strict(search)?;
        Ok(Self::from_parsed(
            ParsedQuery {
                expressions,
                diagnostics: Vec::new(),
            },
            options,
        ))
    }

    fn from_parsed(parsed: ParsedQuery, options: &SearchOptions) -> Self {
        let expressions = if options.optimize {
            optimize_expressions(parsed.expressions)
        } else {
            parsed.expressions
        };
        let matchers =
            compile_expressions(&expressions, options.case_folding, &options.keyword_tags);

        let matcher = Self {
            expressions,
            matchers,
            case_folding: options.case_folding,
            diagnostics: parsed.diagnostics,
        };
        log::debug!(
            "Compiled search query {matcher} ({} conditions, {:?})",
            matcher.matchers().len(),
            matcher.case_folding
        );
        matcher
    }

    /// Returns true if every top-level condition holds for `record`.
    ///
    /// Provenance is not tracked; use [`TracksMatcher::match_result`] for that.
    pub fn matches<R: Searchable + ?Sized>(&self, record: &R) -> bool {
        self.matchers
            .iter()
            .all(|matcher| matcher.matches(record, self.case_folding))
    }

    /// Evaluates the conditions in order against a wrapped record, stopping
    /// at the first failure. Tags of satisfied conditions are appended to
    /// the result's `on_tags`, including those evaluated before a failure.
    pub fn match_result<R: Searchable>(&self, result: &mut MatchResult<R>) -> bool {
        let (record, on_tags) = result.split_mut();
        self.matchers
            .iter()
            .all(|matcher| matcher.matches_recording(record, self.case_folding, on_tags))
    }

    /// Returns the top-level expressions in evaluation order.
    pub fn expression(&self) -> &[QueryExpression] {
        &self.expressions
    }

    /// Returns the compiled top-level conditions.
    pub(crate) fn matchers(&self) -> &[MatcherNode] {
        &self.matchers
    }

    pub fn case_folding(&self) -> CaseFolding {
        self.case_folding
    }

    /// Returns the malformed constructs recovered while parsing.
    pub fn diagnostics(&self) -> &[QueryDiagnostic] {
        &self.diagnostics
    }
}

impl fmt::Display for TracksMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.expressions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::types::Track;

    fn tool() -> Track {
        Track::new()
            .with_tag("artist", "Tool")
            .with_tag("album", "Lateralus")
    }

    #[test]
    fn compiles_and_matches_lenient_query() {
        let matcher = TracksMatcher::new("artist=Tool album=Lateralus", true, &[]);
        assert!(matcher.matches(&tool()));
        assert!(!TracksMatcher::new("artist=tool", true, &[]).matches(&tool()));
        assert!(TracksMatcher::new("artist=tool", false, &[]).matches(&tool()));
    }

    #[test]
    fn empty_query_matches_everything() {
        let matcher = TracksMatcher::new("", true, &[]);
        assert!(matcher.matchers().is_empty());
        assert!(matcher.matches(&Track::new()));
    }

    #[test]
    fn display_shows_optimized_order() {
        let matcher = TracksMatcher::new("album=Lateralus a", true, &[]);
        assert_eq!(matcher.to_string(), "a album=Lateralus");

        let options = SearchOptions::new().with_optimize(false);
        let matcher = TracksMatcher::with_options("album=Lateralus a", &options);
        assert_eq!(matcher.to_string(), "album=Lateralus a");
    }

    #[test]
    fn lenient_compile_keeps_diagnostics() {
        let matcher = TracksMatcher::new("(artist=Tool", true, &[]);
        assert_eq!(
            matcher.diagnostics(),
            [QueryDiagnostic::UnclosedGroup { position: 0 }]
        );
        assert!(matcher.matches(&tool()));
    }

    #[test]
    fn strict_compile_rejects_malformed_query() {
        let err = TracksMatcher::try_new("artist=Tool |", &SearchOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            SearchError::QueryParse(QueryDiagnostic::MissingOperand { operator: '|', .. })
        ));
        let matcher = TracksMatcher::try_new("artist=Tool", &SearchOptions::default()).unwrap();
        assert!(matcher.diagnostics().is_empty());
    }

    #[test]
    fn match_result_records_provenance_in_evaluation_order() {
        let matcher = TracksMatcher::new("album=Lat tool", false, &["title", "artist"]);
        let mut result = MatchResult::new(tool());
        assert!(matcher.match_result(&mut result));
        assert_eq!(result.on_tags(), ["artist", "album"]);
    }

    #[test]
    fn match_result_keeps_tags_recorded_before_a_failure() {
        let options = SearchOptions::new().with_optimize(false);
        let matcher = TracksMatcher::with_options("artist=Tool album=Undertow", &options);
        let mut result = MatchResult::new(tool());
        assert!(!matcher.match_result(&mut result));
        assert_eq!(result.on_tags(), ["artist"]);
    }

    #[test]
    fn matcher_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TracksMatcher>();
    }
}
