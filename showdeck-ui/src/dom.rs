//! Retained element tree standing in for the browser DOM
//!
//! The orchestration layer only ever touches the DOM through this surface:
//! an arena of nodes with ids, classes, attributes, inline styles, and
//! children, plus a scroll target and a mutation counter. Component logic
//! stays pure with respect to its inputs; tests inspect the tree directly
//! instead of driving a real browser.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Index into the document's node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Where the page was last asked to scroll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollTarget {
    Top,
    Element(String),
}

/// One element in the tree
#[derive(Debug, Clone)]
pub struct Node {
    pub tag: String,
    pub id: Option<String>,
    pub classes: BTreeSet<String>,
    pub attrs: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    detached: bool,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: BTreeSet::new(),
            attrs: BTreeMap::new(),
            styles: BTreeMap::new(),
            text: None,
            children: Vec::new(),
            parent: None,
            detached: false,
        }
    }
}

/// The page: a body node, an id index, and scroll state.
///
/// Every mutating operation bumps `mutation_count`, which lets tests assert
/// that a code path performed zero DOM work.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    id_index: HashMap<String, NodeId>,
    pub mutation_count: u64,
    pub last_scroll: Option<ScrollTarget>,
}

impl Document {
    pub fn new() -> Self {
        let body = Node::new("body");
        Self {
            nodes: vec![body],
            body: NodeId(0),
            id_index: HashMap::new(),
            mutation_count: 0,
            last_scroll: None,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn touch(&mut self) {
        self.mutation_count += 1;
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.touch();
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(tag));
        id
    }

    /// Create a detached element carrying an id
    pub fn create_with_id(&mut self, tag: &str, id: &str) -> NodeId {
        let node = self.create_element(tag);
        self.set_id(node, id);
        node
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) {
        self.touch();
        if let Some(old) = self.nodes[node.0].id.take() {
            self.id_index.remove(&old);
        }
        self.nodes[node.0].id = Some(id.to_string());
        self.id_index.insert(id.to_string(), node);
    }

    /// Look up a live element by id
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index
            .get(id)
            .copied()
            .filter(|n| !self.nodes[n.0].detached)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn element_id(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.0].id.as_deref()
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.touch();
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].detached = false;
        self.nodes[parent.0].children.push(child);
    }

    /// Detach every child of `parent`, recursively removing ids from the
    /// index so stale lookups fail instead of resurrecting dead nodes.
    pub fn remove_children(&mut self, parent: NodeId) {
        self.touch();
        let children = std::mem::take(&mut self.nodes[parent.0].children);
        for child in children {
            self.detach(child);
        }
    }

    fn detach(&mut self, node: NodeId) {
        self.nodes[node.0].detached = true;
        self.nodes[node.0].parent = None;
        if let Some(id) = self.nodes[node.0].id.clone() {
            // Only drop the index entry if it still points at this node
            if self.id_index.get(&id) == Some(&node) {
                self.id_index.remove(&id);
            }
        }
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.detach(child);
        }
    }

    /// Replace `old` with `new` in place, keeping child order
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        self.touch();
        if let Some(pos) = self.nodes[parent.0].children.iter().position(|c| *c == old) {
            self.nodes[parent.0].children[pos] = new;
            self.nodes[new.0].parent = Some(parent);
            self.nodes[new.0].detached = false;
            self.detach(old);
        }
    }

    pub fn children(&self, parent: NodeId) -> &[NodeId] {
        &self.nodes[parent.0].children
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        !self.nodes[node.0].detached
    }

    /// True if `node` sits somewhere under `ancestor`
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(n) = cursor {
            if n == ancestor {
                return true;
            }
            cursor = self.nodes[n.0].parent;
        }
        false
    }

    /// All live descendants of `root` with the given tag, document order
    pub fn descendants_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.nodes[node.0].tag == tag {
                out.push(node);
            }
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        self.touch();
        self.nodes[node.0]
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    pub fn attr<'a>(&'a self, node: NodeId, name: &str) -> Option<&'a str> {
        self.nodes[node.0].attrs.get(name).map(|s| s.as_str())
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        self.touch();
        self.nodes[node.0].attrs.remove(name);
    }

    pub fn set_style(&mut self, node: NodeId, name: &str, value: &str) {
        self.touch();
        self.nodes[node.0]
            .styles
            .insert(name.to_string(), value.to_string());
    }

    pub fn style<'a>(&'a self, node: NodeId, name: &str) -> Option<&'a str> {
        self.nodes[node.0].styles.get(name).map(|s| s.as_str())
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        self.touch();
        self.nodes[node.0].classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        self.touch();
        self.nodes[node.0].classes.remove(class);
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.contains(class)
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.touch();
        self.nodes[node.0].text = Some(text.to_string());
    }

    pub fn scroll_to_top(&mut self) {
        self.last_scroll = Some(ScrollTarget::Top);
    }

    pub fn scroll_to_element(&mut self, id: &str) {
        self.last_scroll = Some(ScrollTarget::Element(id.to_string()));
    }

    /// Indented text outline of the live tree, for the CLI dump
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.outline_node(self.body, 0, &mut out);
        out
    }

    fn outline_node(&self, node: NodeId, depth: usize, out: &mut String) {
        let n = &self.nodes[node.0];
        out.push_str(&"  ".repeat(depth));
        out.push_str(&n.tag);
        if let Some(id) = &n.id {
            out.push('#');
            out.push_str(id);
        }
        for class in &n.classes {
            out.push('.');
            out.push_str(class);
        }
        if let Some(src) = n.attrs.get("src") {
            out.push_str(" src=");
            out.push_str(src);
        }
        if let Some(text) = &n.text {
            out.push_str(" \"");
            out.push_str(text);
            out.push('"');
        }
        out.push('\n');
        for child in &n.children {
            self.outline_node(*child, depth + 1, out);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
