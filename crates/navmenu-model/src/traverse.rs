//! Tree traversal and structural edits
//!
//! Free functions over sibling lists (`Vec<MenuItem>`); a menu root's
//! `items` is the top list and has no parent node. All searches are
//! depth-first pre-order and stop at the first match.
//!
//! Structural edits take the list by `&mut`, so a remove-then-insert move
//! is atomic to every observer: no caller can see the tree between the two
//! halves.

use crate::item::{ItemId, MenuItem};

/// Where to place a node relative to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Sibling immediately before the target
    Before,
    /// Sibling immediately after the target
    After,
    /// Appended to the target's children
    #[default]
    Child,
    /// Prepended to the target's children
    First,
}

/// Structural edit failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The node to move or delete is not in the tree
    #[error("source item not found: {0}")]
    SourceNotFound(ItemId),

    /// The insertion target is not in the tree
    #[error("target item not found: {0}")]
    TargetNotFound(ItemId),

    /// The new parent is not in the tree
    #[error("parent item not found: {0}")]
    ParentNotFound(ItemId),

    /// Source and target are the same node
    #[error("cannot move item {0} relative to itself")]
    MoveIntoSelf(ItemId),
}

/// First node matching the predicate, pre-order
pub fn find<'a, P>(items: &'a [MenuItem], pred: &P) -> Option<&'a MenuItem>
where
    P: Fn(&MenuItem) -> bool,
{
    for item in items {
        if pred(item) {
            return Some(item);
        }
        if let Some(found) = find(&item.items, pred) {
            return Some(found);
        }
    }
    None
}

/// Node with the given client id
#[must_use]
pub fn find_by_id(items: &[MenuItem], id: ItemId) -> Option<&MenuItem> {
    find(items, &|n| n.id == Some(id))
}

/// First node matching the predicate, mutably
pub fn find_mut_by<'a, P>(items: &'a mut [MenuItem], pred: &P) -> Option<&'a mut MenuItem>
where
    P: Fn(&MenuItem) -> bool,
{
    for item in items.iter_mut() {
        if pred(item) {
            return Some(item);
        }
        if let Some(found) = find_mut_by(&mut item.items, pred) {
            return Some(found);
        }
    }
    None
}

/// Node with the given client id, mutably
pub fn find_mut(items: &mut [MenuItem], id: ItemId) -> Option<&mut MenuItem> {
    find_mut_by(items, &|n| n.id == Some(id))
}

/// Whether any node in the tree carries the given client id
#[must_use]
pub fn contains(items: &[MenuItem], id: ItemId) -> bool {
    find_by_id(items, id).is_some()
}

/// Immediate container of the given node
///
/// Returns `None` when the node sits in the root list (the menu root has
/// no parent) or is absent entirely.
#[must_use]
pub fn parent_of(items: &[MenuItem], id: ItemId) -> Option<&MenuItem> {
    for item in items {
        if item.items.iter().any(|c| c.id == Some(id)) {
            return Some(item);
        }
        if let Some(parent) = parent_of(&item.items, id) {
            return Some(parent);
        }
    }
    None
}

/// Whether `id` names a strict descendant of `node`
#[must_use]
pub fn is_descendant(node: &MenuItem, id: ItemId) -> bool {
    node.items
        .iter()
        .flat_map(|c| c.descend())
        .any(|n| n.id == Some(id))
}

/// Detach the node with the given id from wherever it sits
pub fn remove(items: &mut Vec<MenuItem>, id: ItemId) -> Option<MenuItem> {
    if let Some(pos) = items.iter().position(|n| n.id == Some(id)) {
        return Some(items.remove(pos));
    }
    for item in items.iter_mut() {
        if let Some(found) = remove(&mut item.items, id) {
            return Some(found);
        }
    }
    None
}

/// Insert a node relative to the target
///
/// Hands the node back when the target is not in the tree, so ownership is
/// never lost on failure.
pub fn insert(
    items: &mut Vec<MenuItem>,
    node: MenuItem,
    target: ItemId,
    position: Position,
) -> Result<(), MenuItem> {
    if let Some(pos) = items.iter().position(|n| n.id == Some(target)) {
        match position {
            Position::Before => items.insert(pos, node),
            Position::After => items.insert(pos + 1, node),
            Position::Child => items[pos].items.push(node),
            Position::First => items[pos].items.insert(0, node),
        }
        return Ok(());
    }
    let mut node = node;
    for item in items.iter_mut() {
        match insert(&mut item.items, node, target, position) {
            Ok(()) => return Ok(()),
            Err(back) => node = back,
        }
    }
    Err(node)
}

/// Apply a visitor to every node, pre-order
///
/// The id allocator and the homepage transform are expressed as visitors
/// over this.
pub fn for_each_mut<F>(items: &mut [MenuItem], f: &mut F)
where
    F: FnMut(&mut MenuItem),
{
    for item in items.iter_mut() {
        f(item);
        for_each_mut(&mut item.items, f);
    }
}

/// Sibling list that directly contains the given id
fn containing_list_mut(items: &mut Vec<MenuItem>, id: ItemId) -> Option<&mut Vec<MenuItem>> {
    if items.iter().any(|n| n.id == Some(id)) {
        return Some(items);
    }
    for item in items.iter_mut() {
        if let Some(list) = containing_list_mut(&mut item.items, id) {
            return Some(list);
        }
    }
    None
}

/// Move a node's children one level up, appended to its parent's list
///
/// No-op when the node is absent or childless. Subtree order is preserved.
pub fn promote_children(items: &mut Vec<MenuItem>, of: ItemId) {
    let children = match find_mut(items, of) {
        Some(node) => std::mem::take(&mut node.items),
        None => return,
    };
    if children.is_empty() {
        return;
    }
    if let Some(list) = containing_list_mut(items, of) {
        list.extend(children);
    }
}

/// Move a node relative to a target, atomically
///
/// When the target is a descendant of the source, the source's children
/// are first promoted one level up so the moved subtree cannot contain its
/// own destination; the move itself then proceeds on the childless source.
pub fn move_item(
    items: &mut Vec<MenuItem>,
    source: ItemId,
    target: ItemId,
    position: Position,
) -> Result<(), TreeError> {
    if source == target {
        return Err(TreeError::MoveIntoSelf(source));
    }
    let target_inside_source = match find_by_id(items, source) {
        Some(node) => is_descendant(node, target),
        None => return Err(TreeError::SourceNotFound(source)),
    };
    if !contains(items, target) {
        return Err(TreeError::TargetNotFound(target));
    }
    if target_inside_source {
        promote_children(items, source);
    }

    let node = remove(items, source).ok_or(TreeError::SourceNotFound(source))?;
    insert(items, node, target, position).map_err(|node| {
        // Both ids were just verified, so the target cannot be gone; keep
        // the node reachable regardless.
        items.push(node);
        TreeError::TargetNotFound(target)
    })
}

/// Delete a node, promoting its children to its former parent
///
/// Returns the detached, now-childless node; no subtree is discarded.
pub fn delete_item(items: &mut Vec<MenuItem>, id: ItemId) -> Result<MenuItem, TreeError> {
    if !contains(items, id) {
        return Err(TreeError::SourceNotFound(id));
    }
    promote_children(items, id);
    remove(items, id).ok_or(TreeError::SourceNotFound(id))
}

/// Detach each listed node and append it under the new parent
///
/// Ancestors of the destination are skipped rather than detached, so the
/// parent can never end up inside one of the moved subtrees. Returns how
/// many nodes actually moved.
pub fn reparent(
    items: &mut Vec<MenuItem>,
    moved: &[ItemId],
    new_parent: ItemId,
) -> Result<usize, TreeError> {
    if !contains(items, new_parent) {
        return Err(TreeError::ParentNotFound(new_parent));
    }
    let mut count = 0;
    for &id in moved {
        if id == new_parent {
            continue;
        }
        let is_ancestor = find_by_id(items, id).is_some_and(|n| is_descendant(n, new_parent));
        if is_ancestor {
            continue;
        }
        if let Some(node) = remove(items, id) {
            if let Some(parent) = find_mut(items, new_parent) {
                parent.items.push(node);
                count += 1;
            } else {
                items.push(node);
            }
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(name: &str, id: u64) -> MenuItem {
        MenuItem::custom(name, format!("/{name}")).with_id(ItemId(id))
    }

    /// 1:a (2:b (3:c), 4:d), 5:e
    fn sample() -> Vec<MenuItem> {
        vec![
            leaf("a", 1).with_children(vec![
                leaf("b", 2).with_children(vec![leaf("c", 3)]),
                leaf("d", 4),
            ]),
            leaf("e", 5),
        ]
    }

    fn names(items: &[MenuItem]) -> Vec<&str> {
        items.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn find_is_pre_order_first_match() {
        let tree = sample();
        let hit = find(&tree, &|n| n.name.len() == 1).unwrap();
        assert_eq!(hit.name, "a");

        assert_eq!(find_by_id(&tree, ItemId(3)).unwrap().name, "c");
        assert!(find_by_id(&tree, ItemId(9)).is_none());
    }

    #[test]
    fn parent_of_root_items_is_none() {
        let tree = sample();
        assert!(parent_of(&tree, ItemId(1)).is_none());
        assert_eq!(parent_of(&tree, ItemId(3)).unwrap().name, "b");
        assert_eq!(parent_of(&tree, ItemId(4)).unwrap().name, "a");
        assert!(parent_of(&tree, ItemId(9)).is_none());
    }

    #[test]
    fn insert_positions() {
        let mut tree = sample();
        insert(&mut tree, leaf("x", 10), ItemId(4), Position::Before).unwrap();
        insert(&mut tree, leaf("y", 11), ItemId(4), Position::After).unwrap();
        insert(&mut tree, leaf("z", 12), ItemId(4), Position::Child).unwrap();
        insert(&mut tree, leaf("w", 13), ItemId(4), Position::First).unwrap();

        let a = &tree[0];
        assert_eq!(names(&a.items), vec!["b", "x", "d", "y"]);
        let d = find_by_id(&tree, ItemId(4)).unwrap();
        assert_eq!(names(&d.items), vec!["w", "z"]);
    }

    #[test]
    fn insert_unknown_target_returns_node() {
        let mut tree = sample();
        let back = insert(&mut tree, leaf("x", 10), ItemId(99), Position::Child);
        assert_eq!(back.unwrap_err().name, "x");
        assert_eq!(tree.iter().map(|i| i.subtree_len()).sum::<usize>(), 5);
    }

    #[test]
    fn remove_detaches_anywhere() {
        let mut tree = sample();
        let node = remove(&mut tree, ItemId(2)).unwrap();
        assert_eq!(node.name, "b");
        assert_eq!(node.items.len(), 1); // subtree travels with the node
        assert!(!contains(&tree, ItemId(2)));
        assert!(!contains(&tree, ItemId(3)));
    }

    #[test]
    fn move_to_sibling_position() {
        let mut tree = sample();
        move_item(&mut tree, ItemId(5), ItemId(2), Position::Before).unwrap();
        assert_eq!(names(&tree), vec!["a"]);
        assert_eq!(names(&tree[0].items), vec!["e", "b", "d"]);
    }

    #[test]
    fn move_into_own_descendant_promotes_children_first() {
        let mut tree = sample();
        // c sits under b: moving b into c must not orbit the subtree
        move_item(&mut tree, ItemId(2), ItemId(3), Position::Child).unwrap();

        // c was promoted to b's former parent (a), and now owns b
        let c = find_by_id(&tree, ItemId(3)).unwrap();
        assert_eq!(names(&c.items), vec!["b"]);
        assert!(c.items[0].is_leaf());
        assert_eq!(parent_of(&tree, ItemId(3)).unwrap().name, "a");
    }

    #[test]
    fn move_rejects_self_and_unknown_ids() {
        let mut tree = sample();
        assert_eq!(
            move_item(&mut tree, ItemId(1), ItemId(1), Position::Child),
            Err(TreeError::MoveIntoSelf(ItemId(1)))
        );
        assert_eq!(
            move_item(&mut tree, ItemId(9), ItemId(1), Position::Child),
            Err(TreeError::SourceNotFound(ItemId(9)))
        );
        assert_eq!(
            move_item(&mut tree, ItemId(1), ItemId(9), Position::Child),
            Err(TreeError::TargetNotFound(ItemId(9)))
        );
    }

    #[test]
    fn delete_promotes_children_to_parent() {
        let mut tree = sample();
        let gone = delete_item(&mut tree, ItemId(2)).unwrap();
        assert_eq!(gone.name, "b");
        assert!(gone.is_leaf());

        // c is now a child of a, after d
        assert_eq!(names(&tree[0].items), vec!["d", "c"]);
        assert!(!contains(&tree, ItemId(2)));
    }

    #[test]
    fn delete_root_item_promotes_to_root_list() {
        let mut tree = sample();
        delete_item(&mut tree, ItemId(1)).unwrap();
        assert_eq!(names(&tree), vec!["e", "b", "d"]);
    }

    #[test]
    fn reparent_appends_under_new_parent() {
        let mut tree = sample();
        let moved = reparent(&mut tree, &[ItemId(3), ItemId(5)], ItemId(4)).unwrap();
        assert_eq!(moved, 2);
        let d = find_by_id(&tree, ItemId(4)).unwrap();
        assert_eq!(names(&d.items), vec!["c", "e"]);
    }

    #[test]
    fn reparent_skips_ancestors_of_destination() {
        let mut tree = sample();
        // a is an ancestor of d; moving it under d would orphan the subtree
        let moved = reparent(&mut tree, &[ItemId(1)], ItemId(4)).unwrap();
        assert_eq!(moved, 0);
        assert!(contains(&tree, ItemId(1)));
    }

    #[test]
    fn for_each_mut_visits_every_node() {
        let mut tree = sample();
        let mut seen = Vec::new();
        for_each_mut(&mut tree, &mut |n| seen.push(n.name.clone()));
        assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
    }
}
