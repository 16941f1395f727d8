use crate::dom::{Document, Element, Node};

/// Strip everything that carries no semantic content: comment nodes, and
/// text nodes that are empty or whitespace-only. Mutates the tree in place.
///
/// Idempotent: normalizing an already-normalized tree is a no-op.
pub fn normalize(doc: &mut Document) {
    normalize_element(&mut doc.root);
}

/// Post-order: children are normalized before the filter pass, so an
/// element is only ever pruned at text-node granularity, never wholesale.
fn normalize_element(element: &mut Element) {
    for child in &mut element.children {
        if let Node::Element(e) = child {
            normalize_element(e);
        }
    }
    element.children.retain(significant);
}

fn significant(node: &Node) -> bool {
    match node {
        Node::Comment(_) => false,
        Node::Text(text) => !text.trim().is_empty(),
        Node::Element(_) => true,
    }
}

impl Document {
    /// See [`normalize`].
    pub fn normalize(&mut self) {
        normalize(self);
    }
}
