//! Goal list reducer

use memoneo_core::{
    EntityId, Goal, GoalRequest, GoalResponse, ParentRef, insert_by_parent, move_to_rank,
    resolve_parents, sort_by_priority,
};
use tracing::{debug, warn};

use super::RequestStatus;

/// Goals in flat priority order: rank, then roots before children, then name.
///
/// Fetches and rank changes re-sort the whole list, so siblings are not kept
/// next to their parent. Only a created child is placed after its last
/// sibling. Views that render the tree group through
/// [`TreeIndex`](memoneo_core::TreeIndex).
///
/// Every parent reference held here is [`ParentRef::Resolved`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalSlice {
    pub goals: Vec<Goal>,
    pub fetch: RequestStatus,
    pub create: RequestStatus,
    pub update: RequestStatus,
    pub delete: RequestStatus,
    pub priority: RequestStatus,
}

impl GoalSlice {
    pub fn get(&self, id: &EntityId) -> Option<&Goal> {
        self.goals.iter().find(|g| &g.id == id)
    }

    pub(super) fn begin(&mut self, request: &GoalRequest) {
        match request {
            GoalRequest::Fetch => self.fetch.start(),
            GoalRequest::Create(_) => self.create.start(),
            GoalRequest::Update { .. } => self.update.start(),
            GoalRequest::Delete { .. } => self.delete.start(),
            GoalRequest::ChangePriority { .. } => self.priority.start(),
        }
    }

    pub(super) fn apply(&mut self, response: &GoalResponse) {
        match response {
            GoalResponse::Fetched(outcome) => {
                self.fetch.finish(outcome);
                if let Ok(goals) = outcome {
                    let mut goals = goals.clone();
                    resolve_parents(&mut goals);
                    if let Err(e) = sort_by_priority(&mut goals) {
                        warn!(error = %e, "Goal list left in server order");
                    }
                    self.goals = goals;
                }
            }
            GoalResponse::Created(outcome) => {
                self.create.finish(outcome);
                if let Ok(goal) = outcome {
                    let goal = self.normalize_parent(goal.clone());
                    match self.position(&goal) {
                        Some(index) => self.goals[index] = goal,
                        None => {
                            let index = insert_by_parent(&mut self.goals, goal);
                            debug!(index, "Inserted created goal");
                        }
                    }
                }
            }
            GoalResponse::Updated(outcome) => {
                self.update.finish(outcome);
                if let Ok(goal) = outcome {
                    let goal = self.normalize_parent(goal.clone());
                    if let Some(index) = self.position(&goal) {
                        self.goals[index] = goal;
                    }
                }
            }
            GoalResponse::Deleted(outcome) => {
                self.delete.finish(outcome);
                if let Ok(deletion) = outcome {
                    if deletion.hard {
                        self.goals.retain(|g| g.id != deletion.id);
                        for goal in &mut self.goals {
                            if goal.parent_id() == Some(&deletion.id) {
                                goal.parent = None;
                            }
                        }
                    } else if let Some(goal) = self.goals.iter_mut().find(|g| g.id == deletion.id) {
                        goal.deleted = true;
                    }
                }
            }
            GoalResponse::PriorityChanged(outcome) => {
                self.priority.finish(outcome);
                if let Ok(change) = outcome {
                    match move_to_rank(&mut self.goals, &change.id, change.new_rank) {
                        Ok(true) => {}
                        Ok(false) => debug!(goal = %change.id, "Rank change for unknown goal"),
                        Err(e) => warn!(error = %e, "Goal rank change left list unsorted"),
                    }
                }
            }
        }
    }

    fn position(&self, goal: &Goal) -> Option<usize> {
        self.goals.iter().position(|g| g.id == goal.id)
    }

    /// Bring a goal from the wire into this slice's resolved form
    fn normalize_parent(&self, mut goal: Goal) -> Goal {
        if let Some(parent) = goal.parent.take() {
            let id = parent.id().clone();
            if id != goal.id && self.goals.iter().any(|g| g.id == id) {
                goal.parent = Some(ParentRef::Resolved(id));
            } else {
                warn!(goal = %goal.id, parent = %id, "Dropping unknown parent reference");
            }
        }
        goal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoneo_core::{Deletion, EntityId, Failure, FailureKind, GoalStatus, RankChange};

    fn goal(id: &str, rank: i64, parent: Option<&str>) -> Goal {
        Goal {
            id: id.into(),
            name: id.to_lowercase(),
            description: String::new(),
            rank,
            status: GoalStatus::Active,
            progress: 0,
            deleted: false,
            parent: parent.map(|p| ParentRef::Raw(p.into())),
        }
    }

    fn ids(slice: &GoalSlice) -> Vec<&str> {
        slice.goals.iter().map(|g| g.id.as_str()).collect()
    }

    fn fetched(goals: Vec<Goal>) -> GoalSlice {
        let mut slice = GoalSlice::default();
        slice.apply(&GoalResponse::Fetched(Ok(goals)));
        slice
    }

    #[test]
    fn test_fetch_resolves_and_sorts() {
        let slice = fetched(vec![
            goal("B", 0, Some("A")),
            goal("C", 1, None),
            goal("A", 0, None),
        ]);
        assert_eq!(ids(&slice), ["A", "B", "C"]);
        assert!(
            slice
                .goals
                .iter()
                .filter_map(|g| g.parent.as_ref())
                .all(ParentRef::is_resolved)
        );
    }

    #[test]
    fn test_fetch_keeps_flat_priority_order() {
        let slice = fetched(vec![
            goal("child-b", 3, Some("root")),
            goal("other", 2, None),
            goal("child-a", 1, Some("root")),
            goal("root", 0, None),
        ]);
        assert_eq!(ids(&slice), ["root", "child-a", "other", "child-b"]);
    }

    #[test]
    fn test_rank_change_resorts_flat() {
        let mut slice = fetched(vec![
            goal("root", 0, None),
            goal("child-a", 1, Some("root")),
            goal("child-b", 2, Some("root")),
            goal("other", 3, None),
        ]);
        slice.apply(&GoalResponse::PriorityChanged(Ok(RankChange {
            id: "other".into(),
            new_rank: 1,
        })));

        // Same rank as child-a: the root-level goal wins the tie
        assert_eq!(ids(&slice), ["root", "other", "child-a", "child-b"]);
    }

    #[test]
    fn test_create_with_parent_inserts_after_siblings() {
        let mut slice = fetched(vec![
            goal("A", 0, None),
            goal("B", 0, Some("A")),
            goal("D", 1, None),
        ]);
        slice.apply(&GoalResponse::Created(Ok(goal("C", 0, Some("A")))));

        assert_eq!(ids(&slice), ["A", "B", "C", "D"]);
        assert_eq!(
            slice.get(&"C".into()).unwrap().parent,
            Some(ParentRef::Resolved("A".into()))
        );
    }

    #[test]
    fn test_create_applied_twice_yields_one_entry() {
        let mut slice = fetched(vec![goal("A", 0, None)]);
        let response = GoalResponse::Created(Ok(goal("N", 2, None)));
        slice.apply(&response);
        let once = slice.clone();
        slice.apply(&response);

        assert_eq!(slice, once);
        assert_eq!(ids(&slice), ["A", "N"]);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut slice = fetched(vec![goal("A", 0, None), goal("B", 1, Some("A"))]);
        let mut updated = goal("B", 1, Some("A"));
        updated.progress = 80;
        slice.apply(&GoalResponse::Updated(Ok(updated)));

        let b = slice.get(&"B".into()).unwrap();
        assert_eq!(b.progress, 80);
        assert!(b.parent.as_ref().is_some_and(ParentRef::is_resolved));

        slice.apply(&GoalResponse::Updated(Ok(goal("Z", 0, None))));
        assert_eq!(slice.goals.len(), 2);
    }

    #[test]
    fn test_soft_and_hard_delete() {
        let mut slice = fetched(vec![goal("A", 0, None), goal("B", 0, Some("A"))]);

        slice.apply(&GoalResponse::Deleted(Ok(Deletion {
            id: "B".into(),
            hard: false,
        })));
        assert!(slice.get(&"B".into()).unwrap().deleted);

        slice.apply(&GoalResponse::Deleted(Ok(Deletion {
            id: "A".into(),
            hard: true,
        })));
        assert_eq!(ids(&slice), ["B"]);
        assert!(slice.goals[0].parent.is_none());
    }

    #[test]
    fn test_priority_change_resorts() {
        let mut slice = fetched(vec![goal("A", 0, None), goal("B", 1, None)]);
        slice.apply(&GoalResponse::PriorityChanged(Ok(RankChange {
            id: "B".into(),
            new_rank: -5,
        })));
        assert_eq!(ids(&slice), ["B", "A"]);
    }

    #[test]
    fn test_failed_create_keeps_list() {
        let mut slice = fetched(vec![goal("A", 0, None)]);
        slice.apply(&GoalResponse::Created(Err(Failure::new(
            FailureKind::Network,
            "boom",
        ))));
        assert_eq!(ids(&slice), ["A"]);
        assert_eq!(slice.create.error.as_deref(), Some("boom"));
        assert!(slice.get(&EntityId::from("A")).is_some());
    }
}
