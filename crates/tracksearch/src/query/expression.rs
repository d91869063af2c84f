//! Query expression types and AST nodes.

use std::fmt;

/// A parsed query expression (AST node).
///
/// Sibling expressions in a list are implicitly AND-ed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpression {
    Term(QueryTerm),
    Not(Box<QueryExpression>),
    Or(Box<QueryExpression>, Box<QueryExpression>),
    /// A parenthesized list of AND-ed expressions.
    Group(Vec<QueryExpression>),
}

/// A single query term (leaf node in the AST).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTerm {
    /// `tag==content`. Content is kept verbatim, including `__null__`.
    Exact { tag: String, content: String },
    /// `tag=content`
    Contains { tag: String, content: String },
    /// A bare keyword, searched in every configured keyword tag.
    Keyword(String),
}

impl QueryExpression {
    pub fn term(term: QueryTerm) -> Self {
        Self::Term(term)
    }

    pub fn negate(inner: QueryExpression) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn or(left: QueryExpression, right: QueryExpression) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    /// Length in chars of the query text as typed, without escapes.
    pub fn text_len(&self) -> usize {
        match self {
            Self::Term(term) => term.text_len(),
            Self::Not(inner) => 1 + inner.text_len(),
            Self::Or(left, right) => left.text_len() + 3 + right.text_len(),
            Self::Group(parts) => {
                let separators = parts.len().saturating_sub(1);
                2 + separators + parts.iter().map(Self::text_len).sum::<usize>()
            }
        }
    }
}

impl QueryTerm {
    fn text_len(&self) -> usize {
        match self {
            Self::Exact { tag, content } => tag.chars().count() + 2 + content.chars().count(),
            Self::Contains { tag, content } => tag.chars().count() + 1 + content.chars().count(),
            Self::Keyword(content) => content.chars().count(),
        }
    }
}

/// Classifies a plain word into a term.
///
/// `==` anywhere makes an exact match, split at its first occurrence;
/// otherwise the first `=` makes a substring match.
pub fn parse_query_term(raw: &str) -> QueryTerm {
    if let Some((tag, content)) = raw.split_once("==") {
        return QueryTerm::Exact {
            tag: tag.to_string(),
            content: content.to_string(),
        };
    }
    if let Some((tag, content)) = raw.split_once('=') {
        return QueryTerm::Contains {
            tag: tag.to_string(),
            content: strip_enclosing_quotes(content.trim()).to_string(),
        };
    }
    QueryTerm::Keyword(strip_enclosing_quotes(raw.trim()).to_string())
}

fn strip_enclosing_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(value)
}

impl fmt::Display for QueryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Term(term) => fmt::Display::fmt(term, f),
            Self::Not(inner) => write!(f, "!{inner}"),
            Self::Or(left, right) => write!(f, "{left} | {right}"),
            Self::Group(parts) => {
                f.write_str("(")?;
                write_joined(f, parts)?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact { tag, content } => {
                write_escaped(f, tag)?;
                f.write_str("==")?;
                write_escaped(f, content)
            }
            Self::Contains { tag, content } => {
                write_escaped(f, tag)?;
                f.write_str("=")?;
                write_escaped(f, content)
            }
            Self::Keyword(content) => write_escaped(f, content),
        }
    }
}

/// Writes expressions separated by single spaces.
pub(crate) fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[QueryExpression]) -> fmt::Result {
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{part}")?;
    }
    Ok(())
}

/// Writes text so that the tokenizer reads it back as the same word.
fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    for ch in text.chars() {
        if matches!(ch, ' ' | '"' | '\\' | '(' | ')' | '!' | '|') {
            f.write_str("\\")?;
        }
        write!(f, "{ch}")?;
    }
    Ok(())
}
