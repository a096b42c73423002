//! Sheet nodes: one per ingested sheet, stored in an arena and addressed by [`NodeId`].

use std::cell::OnceCell;
use std::fmt;

use crate::domain_path::PathResolution;

/// Position of a node in the forest arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An ordered composite key: variable names, rendered comma-joined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(Vec<String>);

impl Key {
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(components.into_iter().map(Into::into).collect())
    }

    /// Parses a comma-joined key.
    pub fn parse(text: &str) -> Self {
        Self::new(text.split(',').map(str::trim).filter(|part| !part.is_empty()))
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.0.iter().any(|component| component == variable)
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The key without its last component; `None` for single-component keys.
    pub fn head(&self) -> Option<Key> {
        if self.0.len() < 2 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The single component, when the key has exactly one.
    pub fn single(&self) -> Option<&str> {
        match self.0.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// One sheet and everything learned about it during discovery and graph building.
///
/// `parent` and `references` are non-owning links into the same arena;
/// `children` lists the nodes this node owns.
#[derive(Debug, Clone)]
pub struct SheetNode {
    id: NodeId,
    sheet: usize,
    name: String,
    variables: Vec<String>,
    defined_key: OnceCell<Key>,
    index_key: Option<Key>,
    root_field: Option<String>,
    pub(crate) link_chain: Vec<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) references: Vec<NodeId>,
    pub(crate) is_reference: bool,
    pub(crate) assigned: bool,
    pub(crate) domain_path: OnceCell<PathResolution>,
}

impl SheetNode {
    pub fn new(id: NodeId, sheet: usize, name: impl Into<String>, variables: Vec<String>) -> Self {
        Self {
            id,
            sheet,
            name: name.into(),
            variables,
            defined_key: OnceCell::new(),
            index_key: None,
            root_field: None,
            link_chain: Vec::new(),
            parent: None,
            children: Vec::new(),
            references: Vec::new(),
            is_reference: false,
            assigned: false,
            domain_path: OnceCell::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Id of the sheet in its source.
    pub fn sheet(&self) -> usize {
        self.sheet
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn has_variable(&self, variable: &str) -> bool {
        self.variables.iter().any(|v| v == variable)
    }

    pub fn defined_key(&self) -> Option<&Key> {
        self.defined_key.get()
    }

    pub fn defines(&self) -> bool {
        self.defined_key.get().is_some()
    }

    /// Records the key this sheet uniquely indexes. A key, once set, is kept:
    /// returns `false` when one was already defined.
    pub(crate) fn define(&mut self, key: Key) -> bool {
        self.defined_key.set(key).is_ok()
    }

    pub fn index_key(&self) -> Option<&Key> {
        self.index_key.as_ref()
    }

    pub(crate) fn set_index_key(&mut self, key: Key) {
        self.index_key = Some(key);
    }

    /// The canonical root field this sheet is rooted on, if any.
    pub fn root_field(&self) -> Option<&str> {
        self.root_field.as_deref()
    }

    pub fn is_rooted(&self) -> bool {
        self.root_field.is_some()
    }

    pub(crate) fn set_root_field(&mut self, field: impl Into<String>) {
        self.root_field = Some(field.into());
    }

    /// Join-key variables collected while attaching the node, root first.
    pub fn link_chain(&self) -> &[String] {
        &self.link_chain
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn references(&self) -> &[NodeId] {
        &self.references
    }

    /// Whether the node was attached as a reference of another node.
    pub fn is_reference(&self) -> bool {
        self.is_reference
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned
    }

    /// The memoized domain path resolution, once resolved.
    pub fn resolution(&self) -> Option<&PathResolution> {
        self.domain_path.get()
    }

    pub fn domain_path(&self) -> Option<&str> {
        self.resolution().and_then(PathResolution::path)
    }

    /// Appends the components of `key` to the link chain, skipping known ones.
    ///
    /// Components go in back to front so the chain reads root to leaf once
    /// it is reversed after the last attachment pass.
    pub(crate) fn link(&mut self, key: &Key) {
        for component in key.components().iter().rev() {
            if !self.link_chain.contains(component) {
                self.link_chain.push(component.clone());
            }
        }
    }
}
