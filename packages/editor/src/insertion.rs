//! # Chip Insertion
//!
//! Places a token chip at the caret (or over a ranged selection), followed
//! by a single space text node, and reports where the caret goes next.
//!
//! ## Insertion point
//!
//! 1. A selection whose both ends lie inside the surface is used as is;
//!    a ranged selection has its contents deleted first.
//! 2. Anything else (no selection, or a selection elsewhere on the page)
//!    falls back to the end of the surface.
//! 3. A point inside an existing chip moves to just after that chip. Range
//!    ends inside a chip widen to cover the whole chip.
//!
//! Points are compared by their child-index path from the surface root, a
//! path prefix ordering before its extensions.

use composer_rich::{
    build_chip, ChipStyle, EditableTree, NodeKind, Position, Selection, TokenRegistry,
    TOKEN_ID_ATTRIBUTE,
};
use tracing::{debug, warn};

/// Nodes created by [`insert_token`]
#[derive(Debug, Clone, PartialEq)]
pub struct Insertion<N> {
    pub chip: N,
    /// The `" "` text node following the chip
    pub space: N,
    /// Collapsed caret right after the space
    pub caret: Position<N>,
}

/// Child slot of an element: insert before `reference`, or append when None
struct Slot<N> {
    parent: N,
    reference: Option<N>,
}

/// Insert a chip for `token_id` into the surface under `root`
pub fn insert_token<T: EditableTree + ?Sized>(
    tree: &mut T,
    root: &T::Node,
    selection: Option<&Selection<T::Node>>,
    token_id: &str,
    registry: &TokenRegistry,
    style: &ChipStyle,
) -> Insertion<T::Node> {
    if !registry.contains(token_id) {
        warn!(token_id, "Inserting chip for a token missing from the registry");
    }

    let chip = build_chip(tree, token_id, registry, style);

    let (parent, index) = match selection {
        Some(selection) if selection_inside(&*tree, root, selection) => {
            if selection.is_collapsed() {
                let slot = resolve_point(tree, root, &selection.anchor, ChipEdge::After);
                slot_index(&*tree, slot)
            } else {
                delete_range(tree, root, selection)
            }
        }
        Some(_) => {
            debug!("Selection outside the surface, inserting at the end");
            (root.clone(), tree.child_count(root))
        }
        None => {
            debug!("No selection, inserting at the end");
            (root.clone(), tree.child_count(root))
        }
    };

    let reference = tree.child_at(&parent, index);
    tree.insert_before(&parent, &chip, reference.as_ref());

    let space = tree.create_text(" ");
    tree.insert_before(&parent, &space, reference.as_ref());

    debug!(token_id, index, "Inserted chip");

    Insertion {
        chip,
        caret: Position::new(space.clone(), 1),
        space,
    }
}

fn selection_inside<T: EditableTree + ?Sized>(
    tree: &T,
    root: &T::Node,
    selection: &Selection<T::Node>,
) -> bool {
    tree.contains(root, &selection.anchor.node) && tree.contains(root, &selection.focus.node)
}

/// Which side of an enclosing chip a point snaps to
#[derive(Clone, Copy)]
enum ChipEdge {
    Before,
    After,
}

/// Outermost chip element containing `node`, below `root`
fn enclosing_chip<T: EditableTree + ?Sized>(
    tree: &T,
    root: &T::Node,
    node: &T::Node,
) -> Option<T::Node> {
    let mut chip = None;
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if &n == root {
            break;
        }
        if is_chip(tree, &n) {
            chip = Some(n.clone());
        }
        current = tree.parent(&n);
    }
    chip
}

fn is_chip<T: EditableTree + ?Sized>(tree: &T, node: &T::Node) -> bool {
    tree.kind(node) == NodeKind::Element
        && tree
            .attribute(node, TOKEN_ID_ATTRIBUTE)
            .map(|id| !id.is_empty())
            .unwrap_or(false)
}

fn next_sibling<T: EditableTree + ?Sized>(tree: &T, node: &T::Node) -> Option<T::Node> {
    let parent = tree.parent(node)?;
    let index = tree.index_in_parent(node)?;
    tree.child_at(&parent, index + 1)
}

/// Turn a boundary point into a child slot, splitting text when it falls
/// mid-node
fn resolve_point<T: EditableTree + ?Sized>(
    tree: &mut T,
    root: &T::Node,
    point: &Position<T::Node>,
    edge: ChipEdge,
) -> Slot<T::Node> {
    if let Some(chip) = enclosing_chip(&*tree, root, &point.node) {
        if let Some(parent) = tree.parent(&chip) {
            let reference = match edge {
                ChipEdge::Before => Some(chip.clone()),
                ChipEdge::After => next_sibling(&*tree, &chip),
            };
            return Slot { parent, reference };
        }
    }

    match tree.kind(&point.node) {
        NodeKind::Text => {
            let Some(parent) = tree.parent(&point.node) else {
                return Slot {
                    parent: root.clone(),
                    reference: None,
                };
            };
            let reference = if point.offset == 0 {
                Some(point.node.clone())
            } else if point.offset >= tree.text_len(&point.node) {
                next_sibling(&*tree, &point.node)
            } else {
                Some(tree.split_text(&point.node, point.offset))
            };
            Slot { parent, reference }
        }
        _ => Slot {
            reference: tree.child_at(&point.node, point.offset),
            parent: point.node.clone(),
        },
    }
}

fn slot_index<T: EditableTree + ?Sized>(tree: &T, slot: Slot<T::Node>) -> (T::Node, usize) {
    let index = match &slot.reference {
        Some(reference) => tree
            .index_in_parent(reference)
            .unwrap_or_else(|| tree.child_count(&slot.parent)),
        None => tree.child_count(&slot.parent),
    };
    (slot.parent, index)
}

/// Child-index path from `root` down to `node`
fn path_of<T: EditableTree + ?Sized>(tree: &T, root: &T::Node, node: &T::Node) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = node.clone();
    while &current != root {
        let (Some(parent), Some(index)) = (tree.parent(&current), tree.index_in_parent(&current))
        else {
            break;
        };
        path.push(index);
        current = parent;
    }
    path.reverse();
    path
}

fn point_key<T: EditableTree + ?Sized>(
    tree: &T,
    root: &T::Node,
    point: &Position<T::Node>,
) -> Vec<usize> {
    let mut key = path_of(tree, root, &point.node);
    key.push(point.offset);
    key
}

/// Delete the selected contents; returns the collapsed slot left behind
fn delete_range<T: EditableTree + ?Sized>(
    tree: &mut T,
    root: &T::Node,
    selection: &Selection<T::Node>,
) -> (T::Node, usize) {
    let (start, end) = {
        let anchor = point_key(&*tree, root, &selection.anchor);
        let focus = point_key(&*tree, root, &selection.focus);
        if anchor <= focus {
            (&selection.anchor, &selection.focus)
        } else {
            (&selection.focus, &selection.anchor)
        }
    };

    // end first: splitting the start node never moves nodes after it
    let end_slot = resolve_point(tree, root, end, ChipEdge::After);
    let start_slot = resolve_point(tree, root, start, ChipEdge::Before);

    let (end_parent, end_index) = slot_index(&*tree, end_slot);
    let (start_parent, start_index) = slot_index(&*tree, start_slot);

    let mut end_key = path_of(&*tree, root, &end_parent);
    end_key.push(end_index);
    let mut start_key = path_of(&*tree, root, &start_parent);
    start_key.push(start_index);

    let mut contained = Vec::new();
    collect_contained(&*tree, root, Vec::new(), &start_key, &end_key, &mut contained);
    debug!(removed = contained.len(), "Deleted selected contents");
    for node in &contained {
        tree.remove(node);
    }

    (start_parent, start_index)
}

/// Maximal subtrees lying entirely between `start` and `end`
fn collect_contained<T: EditableTree + ?Sized>(
    tree: &T,
    node: &T::Node,
    path: Vec<usize>,
    start: &[usize],
    end: &[usize],
    out: &mut Vec<T::Node>,
) {
    for (index, child) in tree.children(node).into_iter().enumerate() {
        let mut before = path.clone();
        before.push(index);
        let mut after = path.clone();
        after.push(index + 1);

        if start <= before.as_slice() && after.as_slice() <= end {
            out.push(child);
        } else if after.as_slice() > start && before.as_slice() < end {
            collect_contained(tree, &child, before, start, end, out);
        }
    }
}
