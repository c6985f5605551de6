//! Path-segment trie.
//!
//! # Responsibilities
//! - Store registered route patterns one segment per node
//! - Resolve a concrete request path to the node it terminates on
//! - Produce the canonical pattern and captured parameters of a match
//!
//! # Design Decisions
//! - Children are kept in registration order; among non-literal siblings the
//!   first registered wins
//! - Literal beats `:param`/`*`, which beat `**`
//! - Matching is greedy: once a level commits to a child there is no backtracking
//! - Lookup never writes into the trie; the canonical pattern is part of the
//!   returned [`RouteMatch`], so concurrent lookups share nothing mutable

use crate::routing::error::RouteError;

const WILDCARD: &str = "*";
const CATCH_ALL: &str = "**";

/// One registered path segment.
#[derive(Debug, Clone)]
pub struct TrieNode {
    segment: String,
    children: Vec<TrieNode>,
    terminal: bool,
}

impl TrieNode {
    fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            children: Vec::new(),
            terminal: false,
        }
    }

    /// The segment as registered (`"usr"`, `":id"`, `"*"`, `"**"`, or `"/"` for the root).
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// True if a registered pattern ends at this node.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Child nodes in registration order.
    pub fn children(&self) -> &[TrieNode] {
        &self.children
    }

    fn is_catch_all(&self) -> bool {
        self.segment == CATCH_ALL
    }

    fn is_wildcard(&self) -> bool {
        self.segment == WILDCARD
    }

    /// Name captured by a parameter segment (`":id"` → `"id"`).
    fn param_name(&self) -> Option<&str> {
        self.segment.split_once(':').map(|(_, name)| name)
    }

    /// Pick the child that consumes `segment`, honouring literal precedence.
    ///
    /// A `**` child is never picked here, even for a literal `**` segment; it
    /// is only reached as the fallback in [`PathTrie::lookup`].
    fn match_child(&self, segment: &str) -> Option<&TrieNode> {
        if let Some(literal) = self
            .children
            .iter()
            .find(|c| !c.is_catch_all() && c.segment == segment)
        {
            return Some(literal);
        }
        if segment.is_empty() {
            return None;
        }
        self.children
            .iter()
            .find(|c| c.param_name().is_some() || c.is_wildcard())
    }
}

/// Values captured from the request path, in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Value captured by `:name`, or the remainder captured by `**`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Captured `(name, value)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of captured values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// Node the path resolved to.
    pub node: &'a TrieNode,
    /// Registered pattern of that node, e.g. `/usr/get/:id`.
    pub pattern: String,
    pub params: Params,
}

impl<'a> RouteMatch<'a> {
    fn new(node: &'a TrieNode, matched: &[&str], params: Params) -> Self {
        Self {
            node,
            pattern: join_pattern(matched),
            params,
        }
    }
}

/// Trie of route patterns for one route group.
#[derive(Debug, Clone)]
pub struct PathTrie {
    root: TrieNode,
}

impl PathTrie {
    /// Create an empty trie holding only the root node.
    pub fn new() -> Self {
        Self {
            root: TrieNode::new("/"),
        }
    }

    /// The root node, segment `"/"`.
    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    /// Check a pattern without inserting it.
    pub fn validate(pattern: &str) -> Result<(), RouteError> {
        if !pattern.starts_with('/') {
            return Err(RouteError::InvalidPattern(pattern.to_string()));
        }
        let segments = split_segments(pattern);
        if let Some(pos) = segments.iter().position(|s| *s == CATCH_ALL) {
            if pos != segments.len() - 1 {
                return Err(RouteError::CatchAllNotLast(pattern.to_string()));
            }
        }
        Ok(())
    }

    /// Insert a pattern, creating nodes for segments not yet present.
    ///
    /// Inserting the same pattern again is harmless; duplicates are policed
    /// per method by the route table.
    pub fn insert(&mut self, pattern: &str) -> Result<(), RouteError> {
        Self::validate(pattern)?;

        let mut node = &mut self.root;
        for segment in split_segments(pattern) {
            let idx = match node.children.iter().position(|c| c.segment == segment) {
                Some(idx) => idx,
                None => {
                    node.children.push(TrieNode::new(segment));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[idx];
        }
        node.terminal = true;
        Ok(())
    }

    /// Resolve a concrete path such as `/usr/get/1`.
    ///
    /// Returns `None` when a level has no matching child and no `**` sibling,
    /// or when the path ends on a node no pattern terminates at.
    pub fn lookup(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = if path.is_empty() { "/" } else { path };
        let segments = split_segments(path);

        let mut node = &self.root;
        let mut matched: Vec<&str> = Vec::with_capacity(segments.len());
        let mut params = Params::default();

        for (depth, segment) in segments.iter().enumerate() {
            match node.match_child(segment) {
                Some(child) => {
                    if let Some(name) = child.param_name() {
                        params.push(name, *segment);
                    }
                    matched.push(&child.segment);
                    node = child;
                }
                None => {
                    let catch_all = node.children.iter().find(|c| c.is_catch_all())?;
                    matched.push(&catch_all.segment);
                    params.push(CATCH_ALL, segments[depth..].join("/"));
                    return Some(RouteMatch::new(catch_all, &matched, params));
                }
            }
        }

        node.terminal.then(|| RouteMatch::new(node, &matched, params))
    }
}

impl Default for PathTrie {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `/a/b/c` into `["a", "b", "c"]`; `/` yields no segments.
fn split_segments(path: &str) -> Vec<&str> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.is_empty() {
        Vec::new()
    } else {
        rest.split('/').collect()
    }
}

fn join_pattern(segments: &[&str]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut pattern = String::new();
    for segment in segments {
        pattern.push('/');
        pattern.push_str(segment);
    }
    pattern
}
