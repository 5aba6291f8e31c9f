//! Tag-based selection shared by `list`, `suite` and `clean`.

use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeSet;

/// How the tags of a query combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Candidate needs at least one of the query tags
    Any,
    /// Candidate needs every query tag
    All,
}

impl Combinator {
    /// Parse from string, case-insensitive. Anything but `any`/`all` is an error.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "any" => Ok(Combinator::Any),
            "all" => Ok(Combinator::All),
            _ => Err(Error::InvalidCombinator(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::Any => "any",
            Combinator::All => "all",
        }
    }
}

impl std::fmt::Display for Combinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Anything that can be selected by tags.
pub trait Taggable {
    fn tags(&self) -> &[String];
}

/// A set of required tags and how they combine.
///
/// Tags are case-folded on construction. A query without tags matches
/// every candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagQuery {
    tags: BTreeSet<String>,
    combinator: Combinator,
}

impl TagQuery {
    pub fn new<I, S>(tags: I, combinator: Combinator) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(|t| fold(t.as_ref()))
                .filter(|t| !t.is_empty())
                .collect(),
            combinator,
        }
    }

    /// Build a query from a raw operator string.
    pub fn parse<I, S>(tags: I, combinator: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::new(tags, Combinator::parse(combinator)?))
    }

    /// A query that matches everything.
    pub fn everything() -> Self {
        Self::new(Vec::<String>::new(), Combinator::Any)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn matches<T: Taggable + ?Sized>(&self, candidate: &T) -> bool {
        matches(candidate, self)
    }
}

/// Whether `candidate` satisfies `query`.
pub fn matches<T: Taggable + ?Sized>(candidate: &T, query: &TagQuery) -> bool {
    if query.tags.is_empty() {
        return true;
    }

    let candidate_tags: BTreeSet<String> = candidate.tags().iter().map(|t| fold(t)).collect();

    match query.combinator {
        Combinator::Any => query.tags.iter().any(|t| candidate_tags.contains(t)),
        Combinator::All => query.tags.is_subset(&candidate_tags),
    }
}

fn fold(tag: &str) -> String {
    tag.trim().to_lowercase()
}
