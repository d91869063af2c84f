//! Query parser.
//!
//! # Grammar
//!
//! ```text
//! query    := and_list
//! and_list := or_expr*
//! or_expr  := not_expr ('|' not_expr)*
//! not_expr := '!' not_expr | primary
//! primary  := '(' and_list ')' | word
//! ```
//!
//! Parentheses bind tightest, then `!`, then `|`; adjacent expressions are
//! AND-ed. Malformed input never fails the lenient parse: each problem is
//! recorded as a [`QueryDiagnostic`] and the construct is recovered.
//!
//! Nesting through `(`, `!` and `|` is limited to [`MAX_NESTING_DEPTH`]
//! levels. A construct that would go deeper is dropped together with the
//! rest of its enclosing group.

use crate::error::{QueryDiagnostic, Result, SearchError};

use super::expression::{parse_query_term, QueryExpression};
use super::tokenizer::{tokenize_query, QueryToken, QueryTokenKind};

/// Top-level expressions of one query plus recovered problems.
#[derive(Debug, Clone, Default)]
pub struct ParsedQuery {
    pub expressions: Vec<QueryExpression>,
    pub diagnostics: Vec<QueryDiagnostic>,
}

/// Maximum nesting depth of groups, negations and OR chains.
pub const MAX_NESTING_DEPTH: usize = 256;

pub struct QueryParser {
    tokens: Vec<QueryToken>,
    index: usize,
    depth: usize,
    diagnostics: Vec<QueryDiagnostic>,
}

impl QueryParser {
    /// Parses a query, recovering from malformed constructs.
    pub fn parse(input: &str) -> ParsedQuery {
        let tokenized = tokenize_query(input);
        let tokens = tokenized
            .tokens
            .into_iter()
            .filter(|token| !token.is_empty_word())
            .collect();

        let mut parser = Self {
            tokens,
            index: 0,
            depth: 0,
            diagnostics: tokenized.diagnostics,
        };
        let expressions = parser.parse_and_list(None);
        parser.diagnostics.sort_by_key(QueryDiagnostic::position);

        ParsedQuery {
            expressions,
            diagnostics: parser.diagnostics,
        }
    }

    /// Parses a query, failing on the first malformed construct.
    pub fn parse_strict(input: &str) -> Result<Vec<QueryExpression>> {
        let parsed = Self::parse(input);
        match parsed.diagnostics.into_iter().next() {
            Some(diagnostic) => Err(SearchError::QueryParse(diagnostic)),
            None => Ok(parsed.expressions),
        }
    }

    /// `open` is the position of the `(` this list belongs to, if any.
    fn parse_and_list(&mut self, open: Option<usize>) -> Vec<QueryExpression> {
        let mut parts = Vec::new();

        loop {
            let Some(token) = self.peek() else {
                if let Some(position) = open {
                    self.diagnostics
                        .push(QueryDiagnostic::UnclosedGroup { position });
                }
                break;
            };
            let position = token.position;

            match token.kind {
                QueryTokenKind::RParen => {
                    self.index += 1;
                    if open.is_some() {
                        break;
                    }
                    self.diagnostics
                        .push(QueryDiagnostic::UnmatchedClose { position });
                }
                QueryTokenKind::Pipe => {
                    // No left operand; the right one stands alone.
                    self.index += 1;
                    self.diagnostics.push(QueryDiagnostic::MissingOperand {
                        operator: '|',
                        position,
                    });
                }
                _ => {
                    if let Some(expression) = self.parse_or_expression() {
                        parts.push(expression);
                    }
                }
            }
        }

        parts
    }

    fn parse_or_expression(&mut self) -> Option<QueryExpression> {
        let mut left = self.parse_not_expression()?;
        // Each `|` nests the chain so far one level deeper.
        let mut chained = 0;

        while let Some(position) = self.consume(|kind| matches!(kind, QueryTokenKind::Pipe)) {
            if !self.enter_nesting(position) {
                break;
            }
            chained += 1;
            match self.parse_not_expression() {
                Some(right) => left = QueryExpression::or(left, right),
                None => {
                    self.diagnostics.push(QueryDiagnostic::MissingOperand {
                        operator: '|',
                        position,
                    });
                    break;
                }
            }
        }
        self.depth -= chained;

        Some(left)
    }

    fn parse_not_expression(&mut self) -> Option<QueryExpression> {
        let Some(position) = self.consume(|kind| matches!(kind, QueryTokenKind::Bang)) else {
            return self.parse_primary_expression();
        };

        if !self.next_starts_operand() {
            self.diagnostics.push(QueryDiagnostic::MissingOperand {
                operator: '!',
                position,
            });
            return None;
        }
        if !self.enter_nesting(position) {
            return None;
        }
        let operand = self.parse_not_expression();
        self.depth -= 1;
        operand.map(QueryExpression::negate)
    }

    fn parse_primary_expression(&mut self) -> Option<QueryExpression> {
        let token = self.peek()?;
        match &token.kind {
            QueryTokenKind::Word(word) => {
                let term = parse_query_term(word);
                self.index += 1;
                Some(QueryExpression::Term(term))
            }
            QueryTokenKind::LParen => {
                let position = token.position;
                if !self.enter_nesting(position) {
                    return None;
                }
                self.index += 1;
                let parts = self.parse_and_list(Some(position));
                self.depth -= 1;
                Some(QueryExpression::Group(parts))
            }
            _ => None,
        }
    }

    /// Enters one nesting level. At the limit, records the problem, skips
    /// the rest of the enclosing group and returns false.
    fn enter_nesting(&mut self, position: usize) -> bool {
        if self.depth >= MAX_NESTING_DEPTH {
            self.diagnostics
                .push(QueryDiagnostic::NestingTooDeep { position });
            self.skip_to_group_end();
            return false;
        }
        self.depth += 1;
        true
    }

    /// Skips tokens up to, not including, the `)` closing the current group.
    fn skip_to_group_end(&mut self) {
        let mut open = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                QueryTokenKind::LParen => open += 1,
                QueryTokenKind::RParen if open == 0 => break,
                QueryTokenKind::RParen => open -= 1,
                _ => {}
            }
            self.index += 1;
        }
    }

    fn next_starts_operand(&self) -> bool {
        matches!(
            self.peek().map(|token| &token.kind),
            Some(QueryTokenKind::Word(_) | QueryTokenKind::LParen | QueryTokenKind::Bang)
        )
    }

    /// Consumes the next token if `accept` takes its kind, returning its position.
    fn consume(&mut self, accept: impl Fn(&QueryTokenKind) -> bool) -> Option<usize> {
        let token = self.peek().filter(|token| accept(&token.kind))?;
        let position = token.position;
        self.index += 1;
        Some(position)
    }

    fn peek(&self) -> Option<&QueryToken> {
        self.tokens.get(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::expression::QueryTerm;

    fn parse(input: &str) -> Vec<QueryExpression> {
        let parsed = QueryParser::parse(input);
        assert!(
            parsed.diagnostics.is_empty(),
            "unexpected diagnostics: {:?}",
            parsed.diagnostics
        );
        parsed.expressions
    }

    fn rendered(input: &str) -> Vec<String> {
        QueryParser::parse(input)
            .expressions
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn siblings_are_implicitly_anded() {
        let expressions = parse("artist=Tool album==Lateralus rock");
        assert_eq!(expressions.len(), 3);
        assert!(matches!(
            &expressions[0],
            QueryExpression::Term(QueryTerm::Contains { tag, .. }) if tag == "artist"
        ));
        assert!(matches!(
            &expressions[1],
            QueryExpression::Term(QueryTerm::Exact { tag, .. }) if tag == "album"
        ));
        assert!(matches!(
            &expressions[2],
            QueryExpression::Term(QueryTerm::Keyword(word)) if word == "rock"
        ));
    }

    #[test]
    fn or_binds_adjacent_operands_and_folds_left() {
        assert_eq!(rendered("a b | c d"), ["a", "b | c", "d"]);
        assert_eq!(rendered("a | b | c"), ["a | b | c"]);
        assert!(matches!(
            &parse("a | b | c")[0],
            QueryExpression::Or(left, _) if matches!(**left, QueryExpression::Or(..))
        ));
    }

    #[test]
    fn not_binds_tighter_than_or() {
        let expressions = parse("!a | b");
        assert!(matches!(
            &expressions[0],
            QueryExpression::Or(left, _) if matches!(**left, QueryExpression::Not(_))
        ));
    }

    #[test]
    fn double_negation_nests() {
        let expressions = parse("!!a");
        assert!(matches!(
            &expressions[0],
            QueryExpression::Not(inner) if matches!(**inner, QueryExpression::Not(_))
        ));
    }

    #[test]
    fn groups_nest_and_bind_first() {
        assert_eq!(rendered("(a (b c)) | d"), ["(a (b c)) | d"]);
        assert_eq!(rendered("!(a | b) c"), ["!(a | b)", "c"]);
        assert_eq!(rendered("()"), ["()"]);
    }

    #[test]
    fn empty_and_blank_queries_have_no_expressions() {
        assert!(parse("").is_empty());
        assert!(parse("    ").is_empty());
    }

    #[test]
    fn unclosed_group_extends_to_end() {
        let parsed = QueryParser::parse("a (b c");
        assert_eq!(
            parsed.diagnostics,
            vec![QueryDiagnostic::UnclosedGroup { position: 2 }]
        );
        assert_eq!(rendered("a (b c"), ["a", "(b c)"]);
    }

    #[test]
    fn unmatched_close_is_ignored() {
        let parsed = QueryParser::parse("a ) b");
        assert_eq!(
            parsed.diagnostics,
            vec![QueryDiagnostic::UnmatchedClose { position: 2 }]
        );
        assert_eq!(rendered("a ) b"), ["a", "b"]);
    }

    #[test]
    fn dangling_not_contributes_nothing() {
        let parsed = QueryParser::parse("a !");
        assert_eq!(
            parsed.diagnostics,
            vec![QueryDiagnostic::MissingOperand {
                operator: '!',
                position: 2
            }]
        );
        assert_eq!(rendered("a !"), ["a"]);
        assert_eq!(rendered("(a !) b"), ["(a)", "b"]);
    }

    #[test]
    fn or_missing_an_operand_keeps_the_other() {
        assert_eq!(rendered("| a"), ["a"]);
        assert_eq!(rendered("a |"), ["a"]);
        assert_eq!(rendered("(a |) b"), ["(a)", "b"]);
        let parsed = QueryParser::parse("a |");
        assert_eq!(
            parsed.diagnostics,
            vec![QueryDiagnostic::MissingOperand {
                operator: '|',
                position: 2
            }]
        );
    }

    #[test]
    fn strict_parse_reports_first_problem() {
        let err = QueryParser::parse_strict("a ) (b").unwrap_err();
        assert!(matches!(
            err,
            SearchError::QueryParse(QueryDiagnostic::UnmatchedClose { position: 2 })
        ));
        assert_eq!(QueryParser::parse_strict("a b").unwrap().len(), 2);
    }

    #[test]
    fn nesting_at_the_limit_is_kept() {
        let depth = MAX_NESTING_DEPTH;
        let input = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
        let parsed = QueryParser::parse(&input);
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.expressions.len(), 1);
        assert_eq!(parsed.expressions[0].to_string(), input);
    }

    #[test]
    fn deep_groups_are_cut_at_the_limit() {
        let input = format!("{}a=b", "(".repeat(100_000));
        let parsed = QueryParser::parse(&input);
        assert!(parsed.diagnostics.contains(&QueryDiagnostic::NestingTooDeep {
            position: MAX_NESTING_DEPTH
        }));
        let unclosed = parsed
            .diagnostics
            .iter()
            .filter(|d| matches!(d, QueryDiagnostic::UnclosedGroup { .. }))
            .count();
        assert_eq!(unclosed, MAX_NESTING_DEPTH);
        assert_eq!(parsed.expressions.len(), 1);
        assert!(!parsed.expressions[0].to_string().contains("a=b"));
    }

    #[test]
    fn deep_negations_are_dropped() {
        let input = format!("{}a=b", "!".repeat(100_000));
        let parsed = QueryParser::parse(&input);
        assert_eq!(
            parsed.diagnostics,
            vec![QueryDiagnostic::NestingTooDeep {
                position: MAX_NESTING_DEPTH
            }]
        );
        assert!(parsed.expressions.is_empty());
    }

    #[test]
    fn overly_deep_construct_drops_only_its_group() {
        let input = format!("x ({}a y) z", "!".repeat(MAX_NESTING_DEPTH + 10));
        assert_eq!(rendered(&input), ["x", "()", "z"]);
    }

    #[test]
    fn long_or_chains_are_cut_at_the_limit() {
        let input = vec!["a"; 100_000].join(" | ");
        let parsed = QueryParser::parse(&input);
        assert!(matches!(
            &parsed.diagnostics[..],
            [QueryDiagnostic::NestingTooDeep { .. }]
        ));
        assert_eq!(parsed.expressions.len(), 1);
        let terms = parsed.expressions[0].to_string().matches('a').count();
        assert_eq!(terms, MAX_NESTING_DEPTH + 1);
    }

    #[test]
    fn strict_parse_rejects_deep_nesting() {
        let input = format!("{}a", "!".repeat(MAX_NESTING_DEPTH + 1));
        assert!(matches!(
            QueryParser::parse_strict(&input),
            Err(SearchError::QueryParse(QueryDiagnostic::NestingTooDeep { .. }))
        ));
    }

    #[test]
    fn escaped_operators_are_plain_words() {
        assert_eq!(rendered(r"title=\(live\)"), [r"title=\(live\)"]);
        assert!(matches!(
            &parse(r"\!")[0],
            QueryExpression::Term(QueryTerm::Keyword(word)) if word == "!"
        ));
    }
}
