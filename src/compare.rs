use crate::dom::{Document, Element, Name, Node};

/// Deep structural equality over two normalized documents.
///
/// Element names compare by (resolved namespace URI, local part); attribute
/// collections compare as unordered (name, value) sets; child sequences
/// compare in order and must be of equal length. Total and deterministic —
/// no diff is produced, only the verdict.
pub fn structural_eq(a: &Document, b: &Document) -> bool {
    element_eq(&a.root, &b.root)
}

fn element_eq(a: &Element, b: &Element) -> bool {
    a.name == b.name
        && attributes_eq(&a.attributes, &b.attributes)
        && a.children.len() == b.children.len()
        && a.children
            .iter()
            .zip(&b.children)
            .all(|(x, y)| node_eq(x, y))
}

/// Declaration order is insignificant; compare as sorted pairs.
fn attributes_eq(a: &[(Name, String)], b: &[(Name, String)]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<_> = a.iter().collect();
    let mut b: Vec<_> = b.iter().collect();
    a.sort();
    b.sort();
    a == b
}

fn node_eq(a: &Node, b: &Node) -> bool {
    match (a, b) {
        (Node::Element(x), Node::Element(y)) => element_eq(x, y),
        // Remaining text is compared verbatim; whitespace-only runs are
        // already gone by the time comparison happens.
        (Node::Text(x), Node::Text(y)) => x == y,
        _ => false,
    }
}

impl Document {
    /// See [`structural_eq`].
    pub fn structural_eq(&self, other: &Document) -> bool {
        structural_eq(self, other)
    }
}
