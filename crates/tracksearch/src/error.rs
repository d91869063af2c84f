use std::fmt;

/// A malformed construct found while tokenizing or structuring a query.
///
/// Positions are char offsets into the raw query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryDiagnostic {
    TrailingEscape { position: usize },
    UnterminatedQuote { position: usize },
    UnclosedGroup { position: usize },
    UnmatchedClose { position: usize },
    MissingOperand { operator: char, position: usize },
    NestingTooDeep { position: usize },
}

impl QueryDiagnostic {
    pub fn position(&self) -> usize {
        match self {
            Self::TrailingEscape { position }
            | Self::UnterminatedQuote { position }
            | Self::UnclosedGroup { position }
            | Self::UnmatchedClose { position }
            | Self::MissingOperand { position, .. }
            | Self::NestingTooDeep { position } => *position,
        }
    }
}

impl fmt::Display for QueryDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrailingEscape { position } => {
                write!(f, "trailing escape with no character near char {position}")
            }
            Self::UnterminatedQuote { position } => {
                write!(f, "missing closing quote near char {position}")
            }
            Self::UnclosedGroup { position } => {
                write!(f, "missing closing ')' for group near char {position}")
            }
            Self::UnmatchedClose { position } => {
                write!(f, "unexpected ')' near char {position}")
            }
            Self::MissingOperand { operator, position } => {
                write!(f, "'{operator}' is missing an operand near char {position}")
            }
            Self::NestingTooDeep { position } => {
                write!(f, "query nested too deeply near char {position}")
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Query parse error: {0}")]
    QueryParse(QueryDiagnostic),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
