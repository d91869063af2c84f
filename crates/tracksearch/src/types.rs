//! Record-facing types: tag values, searchable records, and match results.
//!
//! The engine never owns a storage model. Anything that can answer
//! `tag_search` for a tag name can be searched; [`Track`] is a small
//! in-memory record for callers without one of their own.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Literal text of the absent-tag sentinel in `tag==__null__` queries.
pub const NULL_SENTINEL: &str = "__null__";

/// Separator used when multiple values are requested in display format.
pub const MULTIVALUE_SEPARATOR: &str = " / ";

/// The value(s) a record holds for one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue<'a> {
    Single(Cow<'a, str>),
    Multiple(Vec<Cow<'a, str>>),
    Absent,
}

impl<'a> TagValue<'a> {
    /// Returns true if the tag carries no value.
    ///
    /// A single `__null__` value and an empty value list both count as absent.
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Single(value) => value == NULL_SENTINEL,
            Self::Multiple(values) => values.is_empty(),
        }
    }

    /// Returns true if `predicate` holds for any value.
    ///
    /// An absent tag is presented to the predicate once, as `None`.
    pub fn any_value<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(Option<&str>) -> bool,
    {
        if self.is_absent() {
            return predicate(None);
        }
        match self {
            Self::Single(value) => predicate(Some(value.as_ref())),
            Self::Multiple(values) => values.iter().any(|value| predicate(Some(value.as_ref()))),
            Self::Absent => predicate(None),
        }
    }
}

/// A record that exposes tagged, possibly multi-valued string fields.
pub trait Searchable {
    /// Looks up `tag`. With `multivalued_format`, multiple values may be
    /// joined into one display string instead of returned separately.
    fn tag_search(&self, tag: &str, multivalued_format: bool) -> TagValue<'_>;
}

impl<T: Searchable + ?Sized> Searchable for &T {
    fn tag_search(&self, tag: &str, multivalued_format: bool) -> TagValue<'_> {
        (**self).tag_search(tag, multivalued_format)
    }
}

impl<T: Searchable + ?Sized> Searchable for Box<T> {
    fn tag_search(&self, tag: &str, multivalued_format: bool) -> TagValue<'_> {
        (**self).tag_search(tag, multivalued_format)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum TrackTag {
    Single(String),
    Multiple(Vec<String>),
}

/// An in-memory track: an ordered map of tag names to one or more values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track {
    tags: BTreeMap<String, TrackTag>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a single-valued tag, replacing any previous value.
    pub fn with_tag(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .insert(tag.into(), TrackTag::Single(value.into()));
        self
    }

    /// Sets a multi-valued tag, replacing any previous value.
    pub fn with_values<I, S>(mut self, tag: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.tags.insert(tag.into(), TrackTag::Multiple(values));
        self
    }

    /// Decodes a JSON array of tag objects, e.g.
    /// `[{"artist": "Tool", "genre": ["metal", "prog"]}]`.
    pub fn from_json_list(raw: &str) -> Result<Vec<Track>> {
        serde_json::from_str(raw).map_err(|err| SearchError::Serialization(err.to_string()))
    }
}

impl Searchable for Track {
    fn tag_search(&self, tag: &str, multivalued_format: bool) -> TagValue<'_> {
        match self.tags.get(tag) {
            None => TagValue::Absent,
            Some(TrackTag::Single(value)) => TagValue::Single(Cow::Borrowed(value.as_str())),
            Some(TrackTag::Multiple(values)) if multivalued_format => {
                TagValue::Single(Cow::Owned(values.join(MULTIVALUE_SEPARATOR)))
            }
            Some(TrackTag::Multiple(values)) => {
                TagValue::Multiple(values.iter().map(|v| Cow::Borrowed(v.as_str())).collect())
            }
        }
    }
}

/// A record that entered evaluation, plus the tags that caused it to match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult<R> {
    track: R,
    on_tags: Vec<String>,
}

impl<R> MatchResult<R> {
    pub fn new(track: R) -> Self {
        Self {
            track,
            on_tags: Vec::new(),
        }
    }

    pub fn track(&self) -> &R {
        &self.track
    }

    pub fn into_track(self) -> R {
        self.track
    }

    /// Tags responsible for the match, in first-satisfied order.
    pub fn on_tags(&self) -> &[String] {
        &self.on_tags
    }

    /// Borrows the track alongside its provenance list for evaluation.
    pub(crate) fn split_mut(&mut self) -> (&R, &mut Vec<String>) {
        (&self.track, &mut self.on_tags)
    }
}

/// Appends `tag` to a provenance list unless it is already recorded.
pub(crate) fn push_tag(on_tags: &mut Vec<String>, tag: &str) {
    if !on_tags.iter().any(|existing| existing == tag) {
        on_tags.push(tag.to_string());
    }
}
