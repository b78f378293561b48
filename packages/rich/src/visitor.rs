use crate::tree::{EditableTree, NodeKind};

/// Visitor pattern for walking an editable tree depth-first
///
/// Default implementations walk every element's children. Override the
/// `visit_*` methods to act on specific node kinds; an override of
/// [`TreeVisitor::visit_element`] decides whether to recurse by calling
/// [`walk_children`].
pub trait TreeVisitor<T: EditableTree + ?Sized>: Sized {
    fn visit_element(&mut self, tree: &T, node: &T::Node) {
        walk_children(self, tree, node);
    }

    fn visit_text(&mut self, _tree: &T, _node: &T::Node) {
        // Leaf node, no children to walk
    }

    fn visit_comment(&mut self, _tree: &T, _node: &T::Node) {
        // Leaf node, no children to walk
    }

    fn visit_other(&mut self, _tree: &T, _node: &T::Node) {
        // Unknown kinds are inert
    }
}

/// Dispatch on the node's kind
pub fn walk_node<T, V>(visitor: &mut V, tree: &T, node: &T::Node)
where
    T: EditableTree + ?Sized,
    V: TreeVisitor<T>,
{
    match tree.kind(node) {
        NodeKind::Element => visitor.visit_element(tree, node),
        NodeKind::Text => visitor.visit_text(tree, node),
        NodeKind::Comment => visitor.visit_comment(tree, node),
        NodeKind::Other => visitor.visit_other(tree, node),
    }
}

/// Visit each child of `node` in order
pub fn walk_children<T, V>(visitor: &mut V, tree: &T, node: &T::Node)
where
    T: EditableTree + ?Sized,
    V: TreeVisitor<T>,
{
    for child in tree.children(node) {
        walk_node(visitor, tree, &child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{MemoryTree, NodeId};

    #[derive(Default)]
    struct Counter {
        elements: usize,
        texts: usize,
        comments: usize,
    }

    impl TreeVisitor<MemoryTree> for Counter {
        fn visit_element(&mut self, tree: &MemoryTree, node: &NodeId) {
            self.elements += 1;
            walk_children(self, tree, node);
        }

        fn visit_text(&mut self, _tree: &MemoryTree, _node: &NodeId) {
            self.texts += 1;
        }

        fn visit_comment(&mut self, _tree: &MemoryTree, _node: &NodeId) {
            self.comments += 1;
        }
    }

    #[test]
    fn test_walks_every_node() {
        let tree = MemoryTree::from_markup("a<div>b<span>c</span></div><!--x--><br>");
        let mut counter = Counter::default();
        walk_children(&mut counter, &tree, &tree.root());

        assert_eq!(counter.elements, 3);
        assert_eq!(counter.texts, 3);
        assert_eq!(counter.comments, 1);
    }
}
