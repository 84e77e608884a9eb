//! Per-path validation flags.
//!
//! Flags are stored flat, keyed by path string. Edits that affect a whole
//! subtree (clearing it, splicing a list) rebuild the subtree as a
//! [`StateNode`] tree, edit it, and write it back.

use crate::path::{is_descendant, join, parse_path, Segment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The validation state persisted between round-trips, `{"validated": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionState {
    #[serde(default)]
    pub validated: BTreeMap<String, bool>,
}

impl SubmissionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_validated(&self, path: &str) -> bool {
        self.validated.get(path).copied().unwrap_or(false)
    }

    pub fn validate(&mut self, path: impl Into<String>) {
        self.validated.insert(path.into(), true);
    }

    pub fn invalidate(&mut self, path: &str) {
        self.validated.remove(path);
    }

    pub fn clear(&mut self) {
        self.validated.clear();
    }

    /// Paths recorded strictly below `path`.
    pub fn descendants<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.validated
            .keys()
            .map(String::as_str)
            .filter(move |key| is_descendant(path, key))
    }

    /// Rebuilds the entries strictly below `path` as a [`StateNode`], hands it
    /// to `edit`, then replaces those entries with the edited subtree.
    ///
    /// The entry for `path` itself is left untouched.
    pub fn update<R, F>(&mut self, path: &str, edit: F) -> R
    where
        F: FnOnce(&mut StateNode) -> R,
    {
        let keys: Vec<String> = self.descendants(path).map(str::to_string).collect();
        let mut node = StateNode::default();
        for key in keys {
            if let Some(flag) = self.validated.remove(&key) {
                node.insert(&parse_path(&key[path.len()..]), flag);
            }
        }
        log::trace!("Rebuilt validation subtree at `{path}` ({} nodes)", node.len());

        let result = edit(&mut node);

        for (segment, child) in &node.children {
            child.flatten_into(join(path.to_string(), segment), &mut self.validated);
        }
        result
    }
}

/// A validation subtree: the flag recorded at this node, if any, plus the
/// flags recorded below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateNode {
    pub flag: Option<bool>,
    pub children: BTreeMap<Segment, StateNode>,
}

impl StateNode {
    /// Drops everything below this node.
    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn len(&self) -> usize {
        self.children.values().map(|child| 1 + child.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn insert(&mut self, segments: &[Segment], flag: bool) {
        match segments.split_first() {
            None => self.flag = Some(flag),
            Some((head, rest)) => self
                .children
                .entry(head.clone())
                .or_default()
                .insert(rest, flag),
        }
    }

    /// Detaches the indexed children as a dense list of `len` slots, with
    /// `None` for holes.
    ///
    /// Children indexed at or past `len` have no element to describe and are
    /// dropped.
    pub fn take_list(&mut self, len: usize) -> Vec<Option<StateNode>> {
        let indices: Vec<usize> = self
            .children
            .keys()
            .filter_map(|segment| match segment {
                Segment::Index(index) => Some(*index),
                Segment::Key(_) => None,
            })
            .collect();
        let mut list = vec![None; len];
        for index in indices {
            let child = self.children.remove(&Segment::Index(index));
            match list.get_mut(index) {
                Some(slot) => *slot = child,
                None => log::debug!("Dropping validation state for missing list item {index}"),
            }
        }
        list
    }

    /// Re-attaches a list produced by [`StateNode::take_list`].
    pub fn put_list(&mut self, list: Vec<Option<StateNode>>) {
        for (index, item) in list.into_iter().enumerate() {
            if let Some(item) = item {
                self.children.insert(Segment::Index(index), item);
            }
        }
    }

    fn flatten_into(&self, path: String, validated: &mut BTreeMap<String, bool>) {
        for (segment, child) in &self.children {
            child.flatten_into(join(path.clone(), segment), validated);
        }
        if let Some(flag) = self.flag {
            validated.insert(path, flag);
        }
    }
}
