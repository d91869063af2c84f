//! Boolean search queries over tagged music tracks.
//!
//! This crate provides:
//! - A compact query language with exact, substring and keyword terms,
//!   grouping, NOT, OR and implicit AND
//! - Compilation of queries into reusable, thread-safe matchers
//! - Lazy and parallel evaluation over record collections, reporting which
//!   tags caused each match

pub mod error;
pub mod options;
pub mod query;
pub mod search;
pub mod types;

// Re-export main types
pub use error::{QueryDiagnostic, Result, SearchError};
pub use options::{CaseFolding, SearchOptions, DEFAULT_KEYWORD_TAGS};
pub use query::{QueryExpression, QueryParser, QueryTerm, TracksMatcher};
pub use search::{
    par_search_tracks, refine_results, search_tracks, search_tracks_from_string,
    search_tracks_with_options,
};
pub use types::{MatchResult, Searchable, TagValue, Track, NULL_SENTINEL};
