//! URI Matcher/Dispatcher
//!
//! Resolves an arbitrary catalog URI to exactly one registered
//! [`Resource`], or fails with [`CatalogError::UnknownUri`]. This is the
//! single validation gate for every content-store operation; downstream code
//! assumes the URI has already been matched.
//!
//! Patterns compile into a segment trie at construction time. At each depth a
//! literal edge is tried before the wildcard edge, with backtracking, so
//! `categories/*` and `categories/*/videos` coexist without shadowing each
//! other. The compiled trie is immutable, making concurrent `match_uri` calls
//! safe without locking.

use crate::error::{CatalogError, Result};
use crate::registry::Resource;
use crate::uri::CatalogUri;
use std::collections::HashMap;
use std::sync::OnceLock;

/// A successful match: the resolved resource plus the identifier captured by
/// the pattern's wildcard segment, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMatch {
    pub resource: Resource,
    /// The path segment matched by `*` (`None` for plain collections).
    pub id: Option<String>,
}

#[derive(Debug, Default)]
struct Node {
    literals: HashMap<&'static str, Node>,
    wildcard: Option<Box<Node>>,
    terminal: Option<Resource>,
}

/// Compiled pattern index over [`Resource::ALL`].
#[derive(Debug)]
pub struct UriMatcher {
    root: Node,
}

impl UriMatcher {
    /// Compile the full registry into a matching trie.
    pub fn new() -> Self {
        let mut root = Node::default();
        for resource in Resource::ALL {
            insert(&mut root, resource.pattern(), resource);
        }
        Self { root }
    }

    /// Process-wide matcher instance, lazily constructed and safe under
    /// racing first access. Prefer holding an owned instance where one is
    /// already wired in (the content store constructs its own).
    pub fn global() -> &'static UriMatcher {
        static GLOBAL: OnceLock<UriMatcher> = OnceLock::new();
        GLOBAL.get_or_init(UriMatcher::new)
    }

    /// Resolve `uri` to a registered resource.
    ///
    /// # Errors
    ///
    /// [`CatalogError::UnknownUri`] (naming the offending URI) when no
    /// registered pattern matches the full path.
    pub fn match_uri(&self, uri: &CatalogUri) -> Result<ResourceMatch> {
        let mut captured = Vec::new();
        match walk(&self.root, uri.segments(), &mut captured) {
            Some(resource) => Ok(ResourceMatch {
                resource,
                id: captured.into_iter().next(),
            }),
            None => Err(CatalogError::UnknownUri {
                uri: uri.to_string(),
            }),
        }
    }
}

impl Default for UriMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn insert(root: &mut Node, pattern: &'static str, resource: Resource) {
    let mut node = root;
    for segment in pattern.split('/') {
        node = if segment == "*" {
            node.wildcard.get_or_insert_with(Default::default)
        } else {
            node.literals.entry(segment).or_default()
        };
    }
    debug_assert!(
        node.terminal.is_none(),
        "duplicate registration for pattern {pattern}"
    );
    node.terminal = Some(resource);
}

/// Depth-first match preferring literal edges over the wildcard edge,
/// backtracking when a branch dead-ends. Wildcard-matched segments accumulate
/// in `captured` along the successful path.
fn walk(node: &Node, segments: &[String], captured: &mut Vec<String>) -> Option<Resource> {
    let Some((head, rest)) = segments.split_first() else {
        return node.terminal;
    };

    if let Some(child) = node.literals.get(head.as_str()) {
        if let Some(resource) = walk(child, rest, captured) {
            return Some(resource);
        }
    }

    if let Some(child) = &node.wildcard {
        captured.push(head.clone());
        if let Some(resource) = walk(child, rest, captured) {
            return Some(resource);
        }
        captured.pop();
    }

    None
}
