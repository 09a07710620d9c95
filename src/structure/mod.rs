//! URL structure document
//!
//! The document a crawl session produces from its discovered URLs:
//! group name -> parent URL -> ordered child URLs. It is the value stored in the
//! structure slot of the cache, and flattening it yields the fetch batch for the
//! content pages.

use crate::fetch::{FetchBatch, FetchContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Context key holding the group a fetched page belongs to
pub const GROUP_KEY: &str = "group";

/// Context key holding the parent URL a fetched page was listed under
pub const PARENT_KEY: &str = "parent";

/// Nested grouping of parent URLs to their child URLs
///
/// Group names are unique within a document. A child URL may appear under
/// more than one parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlStructure {
    groups: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl UrlStructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `child` to the children of `parent` in `group`
    pub fn insert(
        &mut self,
        group: impl Into<String>,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) {
        self.groups
            .entry(group.into())
            .or_default()
            .entry(parent.into())
            .or_default()
            .push(child.into());
    }

    pub fn groups(&self) -> &BTreeMap<String, BTreeMap<String, Vec<String>>> {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&BTreeMap<String, Vec<String>>> {
        self.groups.get(name)
    }

    /// Total number of child URLs across all groups and parents
    pub fn child_count(&self) -> usize {
        self.groups
            .values()
            .flat_map(|parents| parents.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.child_count() == 0
    }

    /// Iterates every (group, parent, child) triple
    pub fn triples(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.groups.iter().flat_map(|(group, parents)| {
            parents.iter().flat_map(move |(parent, children)| {
                children
                    .iter()
                    .map(move |child| (group.as_str(), parent.as_str(), child.as_str()))
            })
        })
    }

    /// Flattens the document into one context-carrying fetch task per child
    ///
    /// Each task's context holds the `group` and `parent` it came from.
    pub fn to_fetch_batch(&self) -> FetchBatch {
        FetchBatch::with_context(self.triples().map(|(group, parent, child)| {
            let context = FetchContext::from([
                (GROUP_KEY.to_string(), group.to_string()),
                (PARENT_KEY.to_string(), parent.to_string()),
            ]);
            (child.to_string(), context)
        }))
    }
}

impl From<BTreeMap<String, BTreeMap<String, Vec<String>>>> for UrlStructure {
    fn from(groups: BTreeMap<String, BTreeMap<String, Vec<String>>>) -> Self {
        Self { groups }
    }
}
