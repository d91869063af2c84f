//! Query tokenizer.
//!
//! Splits a raw query on unquoted, unescaped spaces. `(`, `)`, `!` and `|`
//! are standalone tokens outside quotes; `"` toggles quoting and is dropped;
//! `\` inserts the next character literally.

use crate::error::QueryDiagnostic;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueryToken {
    pub(crate) kind: QueryTokenKind,
    /// Char offset of the token in the raw query.
    pub(crate) position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueryTokenKind {
    /// Accumulated text. May be empty when spaces run together.
    Word(String),
    LParen,
    RParen,
    Bang,
    Pipe,
}

impl QueryToken {
    pub(crate) fn is_empty_word(&self) -> bool {
        matches!(&self.kind, QueryTokenKind::Word(word) if word.is_empty())
    }
}

/// Tokens of one query plus anything malformed found on the way.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tokenized {
    pub(crate) tokens: Vec<QueryToken>,
    pub(crate) diagnostics: Vec<QueryDiagnostic>,
}

pub(crate) fn tokenize_query(input: &str) -> Tokenized {
    let mut tokenizer = Tokenizer::default();
    // The query behaves as if padded with a space on both sides.
    tokenizer.flush(0);

    let mut chars = input.chars().enumerate();
    while let Some((position, ch)) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some((_, escaped)) => tokenizer.push_char(escaped, position),
                None => tokenizer
                    .diagnostics
                    .push(QueryDiagnostic::TrailingEscape { position }),
            }
            continue;
        }

        if tokenizer.quote_start.is_some() && ch != '"' {
            tokenizer.push_char(ch, position);
            continue;
        }

        match ch {
            '"' => {
                tokenizer.quote_start = match tokenizer.quote_start {
                    Some(_) => None,
                    None => Some(position),
                };
                // An empty quoted phrase still starts a token here.
                tokenizer.start.get_or_insert(position);
            }
            '(' => tokenizer.push_operator(QueryTokenKind::LParen, position),
            ')' => tokenizer.push_operator(QueryTokenKind::RParen, position),
            '!' => tokenizer.push_operator(QueryTokenKind::Bang, position),
            '|' => tokenizer.push_operator(QueryTokenKind::Pipe, position),
            ' ' => tokenizer.flush(position),
            _ => tokenizer.push_char(ch, position),
        }
    }

    if let Some(position) = tokenizer.quote_start.take() {
        tokenizer
            .diagnostics
            .push(QueryDiagnostic::UnterminatedQuote { position });
    }
    tokenizer.flush(input.chars().count());

    Tokenized {
        tokens: tokenizer.tokens,
        diagnostics: tokenizer.diagnostics,
    }
}

#[derive(Default)]
struct Tokenizer {
    tokens: Vec<QueryToken>,
    diagnostics: Vec<QueryDiagnostic>,
    current: String,
    start: Option<usize>,
    quote_start: Option<usize>,
}

impl Tokenizer {
    fn push_char(&mut self, ch: char, position: usize) {
        self.start.get_or_insert(position);
        self.current.push(ch);
    }

    fn push_operator(&mut self, kind: QueryTokenKind, position: usize) {
        if !self.current.is_empty() {
            self.flush(position);
        }
        self.start = None;
        self.tokens.push(QueryToken { kind, position });
    }

    /// Ends the current word, even when it is empty.
    fn flush(&mut self, position: usize) {
        let word = std::mem::take(&mut self.current);
        let position = self.start.take().unwrap_or(position);
        self.tokens.push(QueryToken {
            kind: QueryTokenKind::Word(word),
            position,
        });
    }
}
