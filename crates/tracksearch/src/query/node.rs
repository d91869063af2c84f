//! Compiled matcher nodes and their evaluation against records.

use crate::options::CaseFolding;
use crate::types::{push_tag, Searchable};

use super::text_match::{exact_value_matches, value_contains, Needle};

/// A compiled condition.
///
/// Leaves inspect record tag values; combinators are built from other nodes.
/// Nodes hold no per-record state, so one tree can evaluate any number of
/// records concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MatcherNode {
    /// Some value of `tag` equals `content`; `None` content means "tag absent".
    Exact { tag: String, content: Option<String> },
    /// Some value of `tag` contains the needle.
    Substring { tag: String, needle: Needle },
    /// Any of `tags` contains the needle.
    Keyword { tags: Vec<String>, needle: Needle },
    Not(Box<MatcherNode>),
    Or(Box<MatcherNode>, Box<MatcherNode>),
    /// Every child matches. An empty list matches everything.
    And(Vec<MatcherNode>),
}

impl MatcherNode {
    pub(crate) fn matches<R: Searchable + ?Sized>(&self, record: &R, case: CaseFolding) -> bool {
        match self {
            Self::Exact { tag, content } => exact_matches(record, tag, content.as_deref(), case),
            Self::Substring { tag, needle } => substring_matches(record, tag, needle, case),
            Self::Keyword { tags, needle } => tags
                .iter()
                .any(|tag| substring_matches(record, tag, needle, case)),
            Self::Not(inner) => !inner.matches(record, case),
            Self::Or(left, right) => left.matches(record, case) || right.matches(record, case),
            Self::And(parts) => parts.iter().all(|part| part.matches(record, case)),
        }
    }

    /// Evaluates a top-level node, appending the tags responsible for a
    /// successful match to `on_tags`.
    ///
    /// Leaves report their own tag. A keyword checks every one of its tags
    /// and reports all that matched. Combinators report nothing.
    pub(crate) fn matches_recording<R: Searchable + ?Sized>(
        &self,
        record: &R,
        case: CaseFolding,
        on_tags: &mut Vec<String>,
    ) -> bool {
        match self {
            Self::Exact { tag, .. } | Self::Substring { tag, .. } => {
                let matched = self.matches(record, case);
                if matched {
                    push_tag(on_tags, tag);
                }
                matched
            }
            Self::Keyword { tags, needle } => {
                let mut matched = false;
                for tag in tags {
                    if substring_matches(record, tag, needle, case) {
                        push_tag(on_tags, tag);
                        matched = true;
                    }
                }
                matched
            }
            Self::Not(_) | Self::Or(..) | Self::And(_) => self.matches(record, case),
        }
    }
}

fn exact_matches<R: Searchable + ?Sized>(
    record: &R,
    tag: &str,
    content: Option<&str>,
    case: CaseFolding,
) -> bool {
    record
        .tag_search(tag, false)
        .any_value(|value| exact_value_matches(value, content, case))
}

fn substring_matches<R: Searchable + ?Sized>(
    record: &R,
    tag: &str,
    needle: &Needle,
    case: CaseFolding,
) -> bool {
    record
        .tag_search(tag, false)
        .any_value(|value| value_contains(value, needle, case))
}
