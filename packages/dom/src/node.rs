//! Arena document with explicit sibling order.
//!
//! Nodes live in a flat arena and link to parent/siblings/children by id.
//! Detached nodes stay allocated in their arena, so a removed run can still
//! be inspected for diffing against its replacement.

use std::collections::HashMap;

/// Index into a [`Document`]'s arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element {
        tag: String,
        attrs: HashMap<String, String>,
    },
    Comment(String),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
        }
    }
}

/// A document tree. [`Document::new_html`] builds the `html → head + body`
/// skeleton; [`Document::new_fragment`] builds an empty arena for holding
/// detached runs (e.g. markup fetched over the network).
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    head: Option<NodeId>,
    body: Option<NodeId>,
}

impl Document {
    pub fn new_html() -> Self {
        let mut doc = Self::new_fragment();
        let root = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(root, head);
        doc.append_child(root, body);
        doc.root = Some(root);
        doc.head = Some(head);
        doc.body = Some(body);
        doc
    }

    pub fn new_fragment() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            head: None,
            body: None,
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element {
            tag: tag.to_string(),
            attrs: HashMap::new(),
        })
    }

    pub fn create_element_with_attrs(
        &mut self,
        tag: &str,
        attrs: impl IntoIterator<Item = (String, String)>,
    ) -> NodeId {
        self.alloc(NodeData::Element {
            tag: tag.to_string(),
            attrs: attrs.into_iter().collect(),
        })
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Comment(text.to_string()))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    pub fn body(&self) -> Option<NodeId> {
        self.body
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev_sibling
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next_sibling
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first_child
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.nodes[parent.0].last_child;
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].prev_sibling = last;
        match last {
            Some(last) => self.nodes[last.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let first = self.nodes[parent.0].first_child;
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].next_sibling = first;
        match first {
            Some(first) => self.nodes[first.0].prev_sibling = Some(child),
            None => self.nodes[parent.0].last_child = Some(child),
        }
        self.nodes[parent.0].first_child = Some(child);
    }

    /// Insert `node` immediately after `anchor` (same parent)
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) {
        self.detach(node);
        let parent = self.nodes[anchor.0].parent;
        let next = self.nodes[anchor.0].next_sibling;

        self.nodes[node.0].parent = parent;
        self.nodes[node.0].prev_sibling = Some(anchor);
        self.nodes[node.0].next_sibling = next;
        self.nodes[anchor.0].next_sibling = Some(node);

        match next {
            Some(next) => self.nodes[next.0].prev_sibling = Some(node),
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].last_child = Some(node);
                }
            }
        }
    }

    /// Unlink a node from its parent and siblings. The node (and its
    /// subtree) stays in the arena.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.0];
            (node.parent, node.prev_sibling, node.next_sibling)
        };

        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.nodes[next.0].prev_sibling = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].last_child = prev;
                }
            }
        }

        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Children of `parent` in sibling order
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.nodes[parent.0].first_child;
        while let Some(id) = cur {
            out.push(id);
            cur = self.nodes[id.0].next_sibling;
        }
        out
    }

    /// Subtree of `root` in document (pre-)order, excluding `root` itself
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root);
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut kids = self.children(id);
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// Deep-copy a node (and subtree) out of `src` into this arena,
    /// returning the detached copy. Nodes cannot be moved by reference
    /// across documents; they are always cloned and relinked.
    pub fn import_subtree(&mut self, src: &Document, id: NodeId) -> NodeId {
        let copy = self.alloc(src.nodes[id.0].data.clone());
        for child in src.children(id) {
            let child_copy = self.import_subtree(src, child);
            self.append_child(copy, child_copy);
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_skeleton() {
        let doc = Document::new_html();
        let head = doc.head().unwrap();
        let body = doc.body().unwrap();
        assert!(matches!(doc.data(head), NodeData::Element { tag, .. } if tag == "head"));
        assert_eq!(doc.next_sibling(head), Some(body));
    }

    #[test]
    fn test_sibling_links_after_append() {
        let mut doc = Document::new_html();
        let head = doc.head().unwrap();
        let a = doc.create_comment("a");
        let b = doc.create_comment("b");
        doc.append_child(head, a);
        doc.append_child(head, b);

        assert_eq!(doc.children(head), vec![a, b]);
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.prev_sibling(b), Some(a));
    }

    #[test]
    fn test_insert_after_maintains_order() {
        let mut doc = Document::new_html();
        let head = doc.head().unwrap();
        let a = doc.create_comment("a");
        let c = doc.create_comment("c");
        doc.append_child(head, a);
        doc.append_child(head, c);

        let b = doc.create_comment("b");
        doc.insert_after(a, b);
        assert_eq!(doc.children(head), vec![a, b, c]);
    }

    #[test]
    fn test_detach_relinks_neighbors() {
        let mut doc = Document::new_html();
        let head = doc.head().unwrap();
        let a = doc.create_comment("a");
        let b = doc.create_comment("b");
        let c = doc.create_comment("c");
        doc.append_child(head, a);
        doc.append_child(head, b);
        doc.append_child(head, c);

        doc.detach(b);
        assert_eq!(doc.children(head), vec![a, c]);
        assert_eq!(doc.parent(b), None);
        assert_eq!(doc.next_sibling(a), Some(c));
    }

    #[test]
    fn test_import_subtree_clones_across_documents() {
        let mut src = Document::new_fragment();
        let div = src.create_element("div");
        let text = src.create_text("hello");
        src.append_child(div, text);

        let mut dst = Document::new_html();
        let copy = dst.import_subtree(&src, div);
        let body = dst.body().unwrap();
        dst.append_child(body, copy);

        let kids = dst.children(copy);
        assert_eq!(kids.len(), 1);
        assert_eq!(dst.data(kids[0]), &NodeData::Text("hello".to_string()));
        // source untouched
        assert_eq!(src.children(div).len(), 1);
    }
}
