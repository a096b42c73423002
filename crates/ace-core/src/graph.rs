//! The sheet forest: roots, owned children and shared references.
//!
//! Built by five ordered passes over the node pool. Every pass decides on a
//! snapshot of the pool taken when the pass starts and commits its
//! attachments afterwards, so the outcome does not depend on the order in
//! which pairs are visited.

use std::collections::HashSet;
use std::fmt::Write as _;

use ace_standards::is_root_field;
use tracing::{debug, info, warn};

use crate::domain_path::{DomainPathResolver, PathResolution};
use crate::node::{Key, NodeId, SheetNode};

/// Arena of sheet nodes with the roots and orphans found by [`Forest::build`].
#[derive(Debug, Clone)]
pub struct Forest {
    nodes: Vec<SheetNode>,
    roots: Vec<NodeId>,
    orphans: Vec<NodeId>,
}

impl Forest {
    /// Attaches every node it can and reports the rest as orphans.
    pub fn build(nodes: Vec<SheetNode>) -> Self {
        let mut forest = Self {
            nodes,
            roots: Vec::new(),
            orphans: Vec::new(),
        };
        forest.attach_children();
        forest.attach_references();
        forest.attach_roots();
        forest.attach_nested_children();
        for node in &mut forest.nodes {
            node.link_chain.reverse();
        }
        forest.orphans = forest
            .nodes
            .iter()
            .filter(|node| !node.assigned)
            .map(SheetNode::id)
            .collect();
        for orphan in &forest.orphans {
            warn!(sheet = %forest.node(*orphan).name(), "sheet not attached to any root");
        }
        forest
    }

    pub fn node(&self, id: NodeId) -> &SheetNode {
        &self.nodes[id.index()]
    }

    pub fn nodes(&self) -> &[SheetNode] {
        &self.nodes
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn orphans(&self) -> &[NodeId] {
        &self.orphans
    }

    pub fn find(&self, name: &str) -> Option<&SheetNode> {
        self.nodes.iter().find(|node| node.name() == name)
    }

    /// Whether `ancestor` lies on the parent chain of `id` (or is `id` itself).
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.node(node).parent();
        }
        false
    }

    /// Number of parent links between the node and its root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).parent();
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent).parent();
        }
        depth
    }

    /// Resolves the domain path of every root, its references and its
    /// subtree. Returns the nodes left untyped.
    pub fn resolve_paths(&self, resolver: &DomainPathResolver<'_>) -> Vec<NodeId> {
        let mut untyped = Vec::new();
        let mut pending: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = pending.pop() {
            let node = self.node(id);
            for target in std::iter::once(id).chain(node.references().iter().copied()) {
                if !resolver.resolve(self.node(target)).is_resolved() && !untyped.contains(&target) {
                    untyped.push(target);
                }
            }
            pending.extend(node.children().iter().rev().copied());
        }
        untyped
    }

    /// Indented text rendering: roots marked with their root field, parents
    /// in parentheses, references in brackets, resolved paths in angle brackets.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            self.render_node(&mut out, *root, 0);
        }
        if !self.orphans.is_empty() {
            let names: Vec<&str> = self.orphans.iter().map(|id| self.node(*id).name()).collect();
            let _ = writeln!(out, "orphans: {}", names.join(", "));
        }
        out
    }

    fn render_node(&self, out: &mut String, id: NodeId, level: usize) {
        let node = self.node(id);
        let _ = write!(out, "{}{}", "  ".repeat(level), node.name());
        match node.parent() {
            Some(parent) => {
                let _ = write!(out, " ({})", self.node(parent).name());
            }
            None => {
                let _ = write!(out, " *{}*", node.root_field().unwrap_or("?"));
            }
        }
        if !node.references().is_empty() {
            let names: Vec<&str> = node
                .references()
                .iter()
                .map(|reference| self.node(*reference).name())
                .collect();
            let _ = write!(out, " [{}]", names.join(", "));
        }
        if let Some(PathResolution::Resolved(path)) = node.resolution() {
            let _ = write!(out, " <{path}>");
        }
        out.push('\n');
        for child in node.children() {
            self.render_node(out, *child, level + 1);
        }
    }

    fn snapshot(&self) -> Vec<bool> {
        self.nodes.iter().map(|node| node.assigned).collect()
    }

    /// Pairs `(base, check)` of distinct nodes, base defining a key, in pool order.
    fn candidate_pairs(&self) -> impl Iterator<Item = (&SheetNode, &Key, &SheetNode)> {
        self.nodes.iter().flat_map(move |base| {
            base.defined_key().into_iter().flat_map(move |defined| {
                self.nodes
                    .iter()
                    .filter(move |check| check.id() != base.id())
                    .map(move |check| (base, defined, check))
            })
        })
    }

    /// Pass 1: a node whose index key equals another's defined key is its child.
    fn attach_children(&mut self) {
        let assigned = self.snapshot();
        let mut claimed = HashSet::new();
        let mut decisions = Vec::new();
        for (base, defined, check) in self.candidate_pairs() {
            if assigned[base.id().index()] || assigned[check.id().index()] {
                continue;
            }
            if check.index_key() == Some(defined) && claimed.insert(check.id()) {
                decisions.push((base.id(), check.id(), defined.clone()));
            }
        }
        for (base, check, key) in decisions {
            if self.adopt(base, check, &key) {
                info!(
                    child = %self.node(check).name(),
                    parent = %self.node(base).name(),
                    key = %key,
                    "child attached"
                );
            }
        }
    }

    /// Pass 2: a node carrying the last index variable of a defining node
    /// references it. A reference may be shared by several nodes.
    fn attach_references(&mut self) {
        let assigned = self.snapshot();
        let mut decisions = Vec::new();
        for (base, _, check) in self.candidate_pairs() {
            if assigned[base.id().index()] || assigned[check.id().index()] {
                continue;
            }
            let Some(last) = base.index_key().and_then(Key::last) else {
                continue;
            };
            if !is_root_field(last) && check.has_variable(last) {
                decisions.push((base.id(), check.id(), last.to_string()));
            }
        }
        for (base, check, variable) in decisions {
            let link = Key::new([variable]);
            let node = &mut self.nodes[check.index()];
            node.references.push(base);
            node.link(&link);
            let reference = &mut self.nodes[base.index()];
            reference.assigned = true;
            reference.is_reference = true;
            let released = std::mem::take(&mut reference.children);
            self.release(base, released);
            info!(
                sheet = %self.node(check).name(),
                reference = %self.node(base).name(),
                key = %link,
                "reference attached"
            );
        }
    }

    /// Pass 3: unattached nodes defining a root field become roots.
    fn attach_roots(&mut self) {
        for node in &mut self.nodes {
            if node.assigned {
                continue;
            }
            let Some(field) = node.defined_key().and_then(Key::single) else {
                continue;
            };
            if !is_root_field(field) {
                continue;
            }
            if node.root_field().is_none() {
                let field = field.to_string();
                node.set_root_field(field);
            }
            node.assigned = true;
            info!(sheet = %node.name(), root = %node.root_field().unwrap_or_default(), "root found");
            self.roots.push(node.id());
        }
    }

    /// Pass 4: a node with a composite index key is the child of the node
    /// defining that key minus its last component. The parent may already
    /// be attached.
    fn attach_nested_children(&mut self) {
        let assigned = self.snapshot();
        let mut claimed = HashSet::new();
        let mut decisions = Vec::new();
        for (base, defined, check) in self.candidate_pairs() {
            if assigned[check.id().index()] {
                continue;
            }
            let Some(head) = check.index_key().and_then(Key::head) else {
                continue;
            };
            if &head == defined && claimed.insert(check.id()) {
                decisions.push((base.id(), check.id(), head));
            }
        }
        for (base, check, key) in decisions {
            if self.adopt(base, check, &key) {
                info!(
                    child = %self.node(check).name(),
                    parent = %self.node(base).name(),
                    key = %key,
                    "nested child attached"
                );
            }
        }
    }

    /// Returns the pass-1 children of a node that became a reference to the
    /// pool; references are merged by key and never walk their own children.
    fn release(&mut self, reference: NodeId, children: Vec<NodeId>) {
        for child in children {
            warn!(
                child = %self.node(child).name(),
                reference = %self.node(reference).name(),
                "child released: its parent became a reference"
            );
            let node = &mut self.nodes[child.index()];
            node.parent = None;
            node.assigned = false;
            node.link_chain.clear();
        }
    }

    /// Makes `child` an owned child of `parent`, refusing attachments that
    /// would close a cycle.
    fn adopt(&mut self, parent: NodeId, child: NodeId, key: &Key) -> bool {
        if self.is_ancestor(child, parent) {
            warn!(
                child = %self.node(child).name(),
                parent = %self.node(parent).name(),
                "attachment refused: would create a cycle"
            );
            return false;
        }
        let node = &mut self.nodes[child.index()];
        node.parent = Some(parent);
        node.link(key);
        node.assigned = true;
        self.nodes[parent.index()].children.push(child);
        debug!(child = %child, parent = %parent, "adopted");
        true
    }
}
