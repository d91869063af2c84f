//! Query optimization.
//!
//! Reorders the top-level conjunction so that conditions run by the length
//! of their query text as typed, shortest first. Escapes are not counted.
//! The sort is stable and never looks inside groups, negations or
//! disjunctions, so the matched set is the same for every order; only
//! evaluation work and provenance order change.

use super::expression::QueryExpression;

/// Reorders top-level AND-ed expressions by text length.
///
/// Ties keep their query order.
pub fn optimize_expressions(mut parts: Vec<QueryExpression>) -> Vec<QueryExpression> {
    if parts.len() <= 1 {
        return parts;
    }

    let mut keyed: Vec<_> = parts
        .drain(..)
        .map(|expr| (expr.text_len(), expr))
        .collect();
    keyed.sort_by_key(|(len, _)| *len);
    parts.extend(keyed.into_iter().map(|(_, expr)| expr));
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parser::QueryParser;

    fn optimized(input: &str) -> Vec<String> {
        optimize_expressions(QueryParser::parse(input).expressions)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn sorts_by_text_length() {
        assert_eq!(
            optimized("album=Lateralus a artist=Tool"),
            ["a", "artist=Tool", "album=Lateralus"]
        );
    }

    #[test]
    fn escapes_do_not_count_towards_length() {
        assert_eq!(optimized(r"abcd a\ b"), [r"a\ b", "abcd"]);
    }

    #[test]
    fn equal_lengths_keep_query_order() {
        assert_eq!(optimized("bb aa cc"), ["bb", "aa", "cc"]);
    }

    #[test]
    fn nested_expressions_are_left_alone() {
        assert_eq!(
            optimized("(ccc b) !(zz y) long_word"),
            ["(ccc b)", "!(zz y)", "long_word"]
        );
        assert_eq!(optimized("xxxx | y"), ["xxxx | y"]);
    }

    #[test]
    fn single_and_empty_lists_pass_through() {
        assert!(optimized("").is_empty());
        assert_eq!(optimized("only"), ["only"]);
    }
}
