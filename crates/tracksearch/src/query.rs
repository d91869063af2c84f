//! Query parsing, compilation, and matching for track search.
//!
//! This module provides the query language for track search, including:
//! - Tokenization with quoting and escapes
//! - Expression types (terms, NOT, OR, groups)
//! - Recursive-descent parsing with malformed-input recovery
//! - Query optimization (reordering top-level conditions)
//! - Compilation into matcher nodes and matching against records

mod compile;
mod expression;
mod matcher;
mod node;
mod optimizer;
mod parser;
mod text_match;
mod tokenizer;

// Re-export public types
pub use expression::{parse_query_term, QueryExpression, QueryTerm};
pub use matcher::TracksMatcher;
pub use optimizer::optimize_expressions;
pub use parser::{ParsedQuery, QueryParser, MAX_NESTING_DEPTH};
