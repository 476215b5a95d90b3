//! Priority ordering and parent/child reconstruction for ranked lists
//!
//! Goals and topics are kept in one flat, ordered `Vec`. Hierarchy is never
//! expressed through shared references: a child holds its parent's id in a
//! [`ParentRef`], and [`TreeIndex`] answers parent/child questions by id
//! lookup over the flat list.
//!
//! Sort order is rank ascending, then items without a parent before items
//! with one, then name ascending.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::error::ValidationError;
use crate::goal::{Goal, ParentRef};
use crate::id::EntityId;
use crate::topic::Topic;

/// An item that can live in a rank-ordered list
pub trait PriorityOrderable {
    fn id(&self) -> &EntityId;
    fn rank(&self) -> i64;
    fn set_rank(&mut self, rank: i64);
    fn name(&self) -> &str;
    fn parent(&self) -> Option<&ParentRef>;

    fn parent_id(&self) -> Option<&EntityId> {
        self.parent().map(ParentRef::id)
    }
}

impl PriorityOrderable for Goal {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn rank(&self) -> i64 {
        self.rank
    }

    fn set_rank(&mut self, rank: i64) {
        self.rank = rank;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }
}

impl PriorityOrderable for Topic {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn rank(&self) -> i64 {
        self.rank
    }

    fn set_rank(&mut self, rank: i64) {
        self.rank = rank;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<&ParentRef> {
        None
    }
}

fn mixed_forms(left: &ParentRef, right: &ParentRef) -> bool {
    left.is_resolved() != right.is_resolved()
}

fn mixed_forms_error(left: &ParentRef, right: &ParentRef) -> ValidationError {
    let describe = |parent: &ParentRef| match parent {
        ParentRef::Raw(id) => format!("raw id {}", id),
        ParentRef::Resolved(id) => format!("resolved {}", id),
    };
    ValidationError::MixedParentForms {
        left: describe(left),
        right: describe(right),
    }
}

fn priority_order<T: PriorityOrderable>(a: &T, b: &T) -> Ordering {
    a.rank()
        .cmp(&b.rank())
        .then_with(|| a.parent().is_some().cmp(&b.parent().is_some()))
        .then_with(|| a.name().cmp(b.name()))
}

/// Compare two items by priority.
///
/// Fails if both items have a parent and one reference is raw while the
/// other is resolved.
pub fn compare_by_priority<T: PriorityOrderable>(a: &T, b: &T) -> Result<Ordering, ValidationError> {
    match (a.parent(), b.parent()) {
        (Some(left), Some(right)) if mixed_forms(left, right) => {
            Err(mixed_forms_error(left, right))
        }
        _ => Ok(priority_order(a, b)),
    }
}

/// Stable sort by priority.
///
/// The whole list is checked for mixed parent forms before anything moves,
/// so a rejected sort leaves the list untouched.
pub fn sort_by_priority<T: PriorityOrderable>(items: &mut [T]) -> Result<(), ValidationError> {
    let first_raw = items
        .iter()
        .filter_map(|item| item.parent())
        .find(|p| !p.is_resolved());
    let first_resolved = items
        .iter()
        .filter_map(|item| item.parent())
        .find(|p| p.is_resolved());

    if let (Some(raw), Some(resolved)) = (first_raw, first_resolved) {
        return Err(mixed_forms_error(raw, resolved));
    }

    items.sort_by(priority_order);
    Ok(())
}

/// Resolve every goal's parent reference against the same list.
///
/// First pass collects the ids present; second pass marks each parent
/// reference as resolved. A child may appear before its parent. References
/// to ids absent from the list (or to the goal itself) are cleared and
/// returned.
pub fn resolve_parents(goals: &mut [Goal]) -> Vec<EntityId> {
    let known: HashSet<EntityId> = goals.iter().map(|g| g.id.clone()).collect();
    let mut dangling = Vec::new();

    for goal in goals.iter_mut() {
        let Some(parent) = goal.parent.take() else {
            continue;
        };
        let parent_id = parent.id().clone();

        if parent_id != goal.id && known.contains(&parent_id) {
            goal.parent = Some(ParentRef::Resolved(parent_id));
        } else {
            warn!(goal = %goal.id, parent = %parent_id, "Dropping unknown parent reference");
            dangling.push(goal.id.clone());
        }
    }

    dangling
}

/// Id-keyed parent/child view over a flat list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeIndex {
    children: HashMap<EntityId, Vec<EntityId>>,
    parents: HashMap<EntityId, EntityId>,
    roots: Vec<EntityId>,
}

impl TreeIndex {
    /// Index `items`; every id gets an entry, children keep list order
    pub fn build<T: PriorityOrderable>(items: &[T]) -> Self {
        let mut index = TreeIndex::default();
        for item in items {
            index.children.entry(item.id().clone()).or_default();
        }

        for item in items {
            match item.parent_id() {
                Some(parent) if index.children.contains_key(parent) => {
                    index.parents.insert(item.id().clone(), parent.clone());
                    if let Some(children) = index.children.get_mut(parent) {
                        children.push(item.id().clone());
                    }
                }
                _ => index.roots.push(item.id().clone()),
            }
        }

        index
    }

    /// Direct children of `id`, empty for leaves and unknown ids
    pub fn children_of(&self, id: &EntityId) -> &[EntityId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent_of(&self, id: &EntityId) -> Option<&EntityId> {
        self.parents.get(id)
    }

    /// Items without a known parent, in list order
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.children.contains_key(id)
    }
}

/// Find the item a child's parent reference points at
pub fn find_parent<'a, T: PriorityOrderable>(items: &'a [T], child: &T) -> Option<&'a T> {
    let parent_id = child.parent_id()?;
    items.iter().find(|item| item.id() == parent_id)
}

/// Where a new child of `parent_id` goes: directly after the parent's last
/// contiguous child, or directly after the parent when it has none.
///
/// `None` if the parent is not in the list.
pub fn child_insertion_index<T: PriorityOrderable>(items: &[T], parent_id: &EntityId) -> Option<usize> {
    let parent_index = items.iter().position(|item| item.id() == parent_id)?;

    let mut index = parent_index + 1;
    while index < items.len() && items[index].parent_id() == Some(parent_id) {
        index += 1;
    }

    Some(index)
}

/// Insert `item`, keeping it next to its siblings.
///
/// Items with a parent present in the list go through
/// [`child_insertion_index`]; everything else is appended. Returns the index
/// the item landed at.
pub fn insert_by_parent<T: PriorityOrderable>(items: &mut Vec<T>, item: T) -> usize {
    let index = item
        .parent_id()
        .and_then(|parent| child_insertion_index(items, parent))
        .unwrap_or(items.len());
    items.insert(index, item);
    index
}

/// Give `id` a new rank and re-sort.
///
/// Returns `Ok(false)` if no item has that id.
pub fn move_to_rank<T: PriorityOrderable>(
    items: &mut [T],
    id: &EntityId,
    new_rank: i64,
) -> Result<bool, ValidationError> {
    let Some(item) = items.iter_mut().find(|item| item.id() == id) else {
        return Ok(false);
    };
    item.set_rank(new_rank);
    sort_by_priority(items)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::GoalStatus;

    fn goal(id: &str, rank: i64, name: &str, parent: Option<&str>) -> Goal {
        Goal {
            id: id.into(),
            name: name.to_string(),
            description: String::new(),
            rank,
            status: GoalStatus::Active,
            progress: 0,
            deleted: false,
            parent: parent.map(|p| ParentRef::Raw(p.into())),
        }
    }

    fn ids<T: PriorityOrderable>(items: &[T]) -> Vec<&str> {
        items.iter().map(|item| item.id().as_str()).collect()
    }

    #[test]
    fn test_resolve_parents_two_pass() {
        // Child listed before its parent
        let mut goals = vec![
            goal("B", 0, "b", Some("A")),
            goal("A", 0, "a", None),
            goal("C", 0, "c", None),
        ];
        let dangling = resolve_parents(&mut goals);

        assert!(dangling.is_empty());
        assert_eq!(goals[0].parent, Some(ParentRef::Resolved("A".into())));

        let parent = find_parent(&goals, &goals[0]).unwrap();
        assert_eq!(parent.id.as_str(), "A");
        assert_eq!(parent.name, "a");
    }

    #[test]
    fn test_resolve_parents_drops_unknown() {
        let mut goals = vec![goal("A", 0, "a", Some("ghost")), goal("B", 0, "b", Some("B"))];
        let dangling = resolve_parents(&mut goals);

        assert_eq!(dangling, vec![EntityId::from("A"), EntityId::from("B")]);
        assert!(goals.iter().all(|g| g.parent.is_none()));
    }

    #[test]
    fn test_tree_index() {
        let mut goals = vec![
            goal("A", 0, "a", None),
            goal("B", 0, "b", Some("A")),
            goal("C", 0, "c", None),
        ];
        resolve_parents(&mut goals);
        let tree = TreeIndex::build(&goals);

        assert_eq!(tree.children_of(&"A".into()), [EntityId::from("B")]);
        assert!(tree.children_of(&"C".into()).is_empty());
        assert!(tree.children_of(&"B".into()).is_empty());
        assert_eq!(tree.parent_of(&"B".into()), Some(&EntityId::from("A")));
        assert_eq!(tree.roots(), [EntityId::from("A"), EntityId::from("C")]);
        assert!(tree.contains(&"C".into()));
        assert!(!tree.contains(&"Z".into()));
    }

    #[test]
    fn test_insertion_after_last_sibling() {
        let mut goals = vec![
            goal("A", 0, "a", None),
            goal("B", 0, "b", Some("A")),
            goal("D", 1, "d", None),
        ];
        let index = insert_by_parent(&mut goals, goal("C", 0, "c", Some("A")));

        assert_eq!(index, 2);
        assert_eq!(ids(&goals), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_insertion_directly_after_childless_parent() {
        let mut goals = vec![goal("A", 0, "a", None), goal("D", 1, "d", None)];
        assert_eq!(child_insertion_index(&goals, &"A".into()), Some(1));

        insert_by_parent(&mut goals, goal("C", 0, "c", Some("A")));
        assert_eq!(ids(&goals), ["A", "C", "D"]);
    }

    #[test]
    fn test_insertion_appends_without_parent() {
        let mut goals = vec![goal("A", 0, "a", None)];
        insert_by_parent(&mut goals, goal("X", 0, "x", Some("missing")));
        insert_by_parent(&mut goals, goal("Y", 0, "y", None));
        assert_eq!(ids(&goals), ["A", "X", "Y"]);
        assert_eq!(child_insertion_index(&goals, &"missing".into()), None);
    }

    #[test]
    fn test_sort_rank_then_parent_then_name() {
        let mut goals = vec![
            goal("b", 1, "b", None),
            goal("a", 1, "a", None),
            goal("child", 1, "0 first by name", Some("a")),
            goal("top", 0, "z", None),
        ];
        resolve_parents(&mut goals);
        sort_by_priority(&mut goals).unwrap();

        assert_eq!(ids(&goals), ["top", "a", "b", "child"]);
    }

    #[test]
    fn test_compare_rejects_mixed_forms() {
        let raw = goal("x", 1, "x", Some("p"));
        let mut resolved = goal("y", 1, "y", Some("p"));
        resolved.parent = Some(ParentRef::Resolved("p".into()));

        assert!(matches!(
            compare_by_priority(&raw, &resolved),
            Err(ValidationError::MixedParentForms { .. })
        ));
        assert_eq!(
            compare_by_priority(&raw, &goal("z", 1, "z", None)).unwrap(),
            Ordering::Greater
        );
    }

    #[test]
    fn test_sort_rejects_mixed_forms_without_moving() {
        let mut resolved = goal("y", 0, "y", Some("x"));
        resolved.parent = Some(ParentRef::Resolved("x".into()));
        let mut goals = vec![goal("z", 5, "z", Some("x")), goal("x", 1, "x", None), resolved];

        assert!(sort_by_priority(&mut goals).is_err());
        assert_eq!(ids(&goals), ["z", "x", "y"]);
    }

    #[test]
    fn test_move_to_rank() {
        let mut goals = vec![
            goal("a", 0, "a", None),
            goal("b", 1, "b", None),
            goal("c", 2, "c", None),
        ];
        assert!(move_to_rank(&mut goals, &"c".into(), -1).unwrap());
        assert_eq!(ids(&goals), ["c", "a", "b"]);
        assert_eq!(goals[0].rank, -1);

        assert!(!move_to_rank(&mut goals, &"nope".into(), 3).unwrap());
    }
}
