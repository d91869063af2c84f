//! Search configuration.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Tags searched by bare keywords when no other set is configured by the
/// caller's device or library layer.
pub const DEFAULT_KEYWORD_TAGS: [&str; 3] = ["artist", "album", "title"];

/// Case-folding policy applied to both query content and record values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFolding {
    #[default]
    Sensitive,
    Insensitive,
}

impl CaseFolding {
    pub fn from_case_sensitive(case_sensitive: bool) -> Self {
        if case_sensitive {
            Self::Sensitive
        } else {
            Self::Insensitive
        }
    }

    pub fn is_case_sensitive(self) -> bool {
        self == Self::Sensitive
    }

    /// Applies the policy to a value, borrowing when nothing changes.
    pub fn fold(self, value: &str) -> Cow<'_, str> {
        match self {
            Self::Sensitive => Cow::Borrowed(value),
            Self::Insensitive => Cow::Owned(value.to_lowercase()),
        }
    }
}

/// Options controlling how a query string is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub case_folding: CaseFolding,
    /// Tags a bare keyword is searched in.
    pub keyword_tags: Vec<String>,
    /// Reorder top-level conditions before compiling.
    pub optimize: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_folding: CaseFolding::Sensitive,
            keyword_tags: Vec::new(),
            optimize: true,
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_folding = CaseFolding::from_case_sensitive(case_sensitive);
        self
    }

    pub fn with_keyword_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keyword_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Uses [`DEFAULT_KEYWORD_TAGS`] for bare keywords.
    pub fn with_default_keyword_tags(self) -> Self {
        self.with_keyword_tags(DEFAULT_KEYWORD_TAGS)
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Decodes options from JSON. Missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| SearchError::Config(err.to_string()))
    }
}
