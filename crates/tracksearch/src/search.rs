//! Evaluation of compiled queries over record streams.
//!
//! The sequential entry points are lazy: records are pulled from the input
//! only as results are consumed, so a caller can stop early without scanning
//! the rest of the stream.

use rayon::prelude::*;

use crate::options::SearchOptions;
use crate::query::TracksMatcher;
use crate::types::{MatchResult, Searchable};

/// Filters raw records through every matcher, wrapping each one that passes.
///
/// Input order is preserved.
pub fn search_tracks<I, M>(records: I, matchers: M) -> impl Iterator<Item = MatchResult<I::Item>>
where
    I: IntoIterator,
    I::Item: Searchable,
    M: AsRef<[TracksMatcher]>,
{
    refine_results(records.into_iter().map(MatchResult::new), matchers)
}

/// Narrows results of an earlier search, keeping the tags they already
/// accumulated.
pub fn refine_results<I, R, M>(results: I, matchers: M) -> impl Iterator<Item = MatchResult<R>>
where
    I: IntoIterator<Item = MatchResult<R>>,
    R: Searchable,
    M: AsRef<[TracksMatcher]>,
{
    results.into_iter().filter_map(move |mut result| {
        matches_all(matchers.as_ref(), &mut result).then_some(result)
    })
}

/// Compiles `search` once and filters `records` through it.
///
/// Malformed syntax is recovered and logged; this never fails.
pub fn search_tracks_from_string<I>(
    records: I,
    search: &str,
    case_sensitive: bool,
    keyword_tags: &[&str],
) -> impl Iterator<Item = MatchResult<I::Item>>
where
    I: IntoIterator,
    I::Item: Searchable,
{
    let matcher = TracksMatcher::new(search, case_sensitive, keyword_tags);
    search_tracks(records, [matcher])
}

/// Like [`search_tracks_from_string`], with explicit options.
pub fn search_tracks_with_options<I>(
    records: I,
    search: &str,
    options: &SearchOptions,
) -> impl Iterator<Item = MatchResult<I::Item>>
where
    I: IntoIterator,
    I::Item: Searchable,
{
    let matcher = TracksMatcher::with_options(search, options);
    search_tracks(records, [matcher])
}

/// Evaluates every record of a slice in parallel.
///
/// Results keep slice order. Compiled matchers hold no per-record state, so
/// they are shared across worker threads as-is.
pub fn par_search_tracks<'r, R>(
    records: &'r [R],
    matchers: &[TracksMatcher],
) -> Vec<MatchResult<&'r R>>
where
    R: Searchable + Sync,
{
    let results: Vec<_> = records
        .par_iter()
        .filter_map(|record| {
            let mut result = MatchResult::new(record);
            matches_all(matchers, &mut result).then_some(result)
        })
        .collect();

    log::debug!(
        "Parallel track search matched {} of {} records",
        results.len(),
        records.len()
    );
    results
}

fn matches_all<R: Searchable>(matchers: &[TracksMatcher], result: &mut MatchResult<R>) -> bool {
    matchers.iter().all(|matcher| matcher.match_result(result))
}
