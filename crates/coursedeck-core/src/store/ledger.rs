// ── Optimistic edit ledger ──
//
// The published collection is never stored directly. It is derived from
// the last server-confirmed collection with every unresolved edit replayed
// on top, in submission order. A failed edit is dropped from the
// ledger, so whatever else is in flight stays visible and nothing that the
// server never accepted can linger.
//
// Acknowledged edits fold into the confirmed collection only once no
// earlier edit to the same course is still unresolved, which keeps the
// per-course order the server saw. While a refresh is in flight, folded
// edits are also logged so they can be replayed onto a fetch that may
// predate them.

use std::collections::HashSet;
use std::sync::Arc;

use crate::model::{Course, CourseChanges};
use crate::stream::Snapshot;

struct Edit {
    seq: u64,
    id: String,
    changes: CourseChanges,
    acknowledged: bool,
}

#[derive(Default)]
pub(crate) struct Ledger {
    confirmed: Snapshot<Course>,
    pending: Vec<Edit>,
    /// Edits folded while at least one refresh was in flight.
    settled: Vec<Edit>,
    /// Start markers of in-flight refreshes.
    refreshes: Vec<u64>,
    next_seq: u64,
}

/// Outcome of resolving one edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Settled {
    /// The edit was resolved against a course that is still present.
    Applied,
    /// The course disappeared (a refresh dropped it) before the edit resolved.
    Orphaned,
}

impl Ledger {
    /// The collection consumers should see.
    pub(crate) fn view(&self) -> Vec<Arc<Course>> {
        self.confirmed
            .iter()
            .map(|course| {
                let mut value: Option<Course> = None;
                for edit in self.pending.iter().filter(|e| e.id == course.id) {
                    let base = value.as_ref().unwrap_or(&**course);
                    value = Some(base.apply(&edit.changes));
                }
                value.map_or_else(|| Arc::clone(course), Arc::new)
            })
            .collect()
    }

    /// Record an unresolved edit. `None` if no course has this id.
    pub(crate) fn begin_edit(&mut self, id: &str, changes: CourseChanges) -> Option<u64> {
        if !self.confirmed.iter().any(|c| c.id == id) {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Edit {
            seq,
            id: id.to_owned(),
            changes,
            acknowledged: false,
        });
        Some(seq)
    }

    /// Resolve edit `seq`: drop it on failure, fold it in on success.
    pub(crate) fn settle(&mut self, seq: u64, succeeded: bool) -> Settled {
        let Some(index) = self.pending.iter().position(|e| e.seq == seq) else {
            return Settled::Orphaned;
        };
        let present = self
            .pending
            .get(index)
            .is_some_and(|edit| self.confirmed.iter().any(|c| c.id == edit.id));

        if succeeded {
            if let Some(edit) = self.pending.get_mut(index) {
                edit.acknowledged = true;
            }
        } else {
            self.pending.remove(index);
        }
        self.fold_acknowledged();

        if present {
            Settled::Applied
        } else {
            Settled::Orphaned
        }
    }

    /// Note that a refresh is starting; pass the marker to `end_refresh`.
    pub(crate) fn begin_refresh(&mut self) -> u64 {
        let marker = self
            .pending
            .iter()
            .map(|e| e.seq)
            .min()
            .unwrap_or(self.next_seq);
        self.refreshes.push(marker);
        marker
    }

    /// Finish the refresh started with `marker`. `fetched` replaces the
    /// confirmed collection; edits that settled during the fetch are
    /// replayed onto it since the server may have answered before them.
    pub(crate) fn end_refresh(&mut self, marker: u64, fetched: Option<Vec<Arc<Course>>>) {
        if let Some(index) = self.refreshes.iter().position(|m| *m == marker) {
            self.refreshes.remove(index);
        }

        if let Some(mut fetched) = fetched {
            for edit in self.settled.iter().filter(|e| e.seq >= marker) {
                apply_to(&mut fetched, &edit.id, &edit.changes);
            }
            self.confirmed = Arc::new(fetched);
            self.fold_acknowledged();
        }

        match self.refreshes.iter().min() {
            Some(&oldest) => self.settled.retain(|e| e.seq >= oldest),
            None => self.settled.clear(),
        }
    }

    fn fold_acknowledged(&mut self) {
        let mut blocked: HashSet<String> = HashSet::new();
        let mut remaining = Vec::with_capacity(self.pending.len());
        let mut confirmed: Option<Vec<Arc<Course>>> = None;

        for edit in std::mem::take(&mut self.pending) {
            if edit.acknowledged && !blocked.contains(&edit.id) {
                let next = confirmed.get_or_insert_with(|| Vec::clone(&self.confirmed));
                apply_to(next, &edit.id, &edit.changes);
                if !self.refreshes.is_empty() {
                    self.settled.push(edit);
                }
            } else {
                blocked.insert(edit.id.clone());
                remaining.push(edit);
            }
        }

        self.pending = remaining;
        if let Some(confirmed) = confirmed {
            self.confirmed = Arc::new(confirmed);
        }
    }
}

fn apply_to(courses: &mut [Arc<Course>], id: &str, changes: &CourseChanges) {
    if let Some(slot) = courses.iter_mut().find(|c| c.id == id) {
        *slot = Arc::new(slot.apply(changes));
    }
}

/// Value equality, short-circuiting on shared allocations.
pub(crate) fn same_view(a: &[Arc<Course>], b: &[Arc<Course>]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| Arc::ptr_eq(x, y) || x == y)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn course(id: &str) -> Arc<Course> {
        Arc::new(Course {
            id: id.into(),
            seq_no: 1,
            category: Category::Beginner,
            description: None,
            long_description: None,
            icon_url: None,
            course_list_icon: None,
            lessons_count: None,
            promo: false,
        })
    }

    fn loaded() -> Ledger {
        let mut ledger = Ledger::default();
        let marker = ledger.begin_refresh();
        ledger.end_refresh(marker, Some(vec![course("1"), course("2")]));
        ledger
    }

    fn promo(ledger: &Ledger, id: &str) -> bool {
        ledger.view().iter().find(|c| c.id == id).unwrap().promo
    }

    fn set_promo(value: bool) -> CourseChanges {
        CourseChanges::new().with_promo(value)
    }

    #[test]
    fn unknown_id_is_rejected() {
        let mut ledger = loaded();
        assert!(ledger.begin_edit("9", set_promo(true)).is_none());
    }

    #[test]
    fn failures_in_submission_order_restore_confirmed() {
        let mut ledger = loaded();
        let a = ledger.begin_edit("1", set_promo(true)).unwrap();
        let b = ledger.begin_edit("1", set_promo(false)).unwrap();

        ledger.settle(a, false);
        assert!(!promo(&ledger, "1"));
        ledger.settle(b, false);
        assert!(!promo(&ledger, "1"));
    }

    #[test]
    fn failures_in_reverse_order_restore_confirmed() {
        let mut ledger = loaded();
        let a = ledger.begin_edit("1", set_promo(true)).unwrap();
        let b = ledger.begin_edit("1", set_promo(false)).unwrap();

        ledger.settle(b, false);
        assert!(promo(&ledger, "1"), "the in-flight edit stays visible");
        ledger.settle(a, false);
        assert!(!promo(&ledger, "1"));
    }

    #[test]
    fn lone_failure_restores_the_confirmed_allocation() {
        let mut ledger = loaded();
        let before = ledger.view();
        let a = ledger.begin_edit("1", set_promo(true)).unwrap();
        ledger.settle(a, false);

        let after = ledger.view();
        assert!(Arc::ptr_eq(&before[0], &after[0]));
    }

    #[test]
    fn acknowledged_edit_waits_for_earlier_edit_to_same_course() {
        let mut ledger = loaded();
        let a = ledger.begin_edit("1", set_promo(true)).unwrap();
        let b = ledger
            .begin_edit("1", CourseChanges::new().with_description("Kept"))
            .unwrap();

        ledger.settle(b, true);
        assert!(promo(&ledger, "1"));
        ledger.settle(a, false);

        let one = ledger.view().into_iter().find(|c| c.id == "1").unwrap();
        assert!(!one.promo);
        assert_eq!(one.description.as_deref(), Some("Kept"));
    }

    #[test]
    fn refresh_keeps_pending_and_settled_edits() {
        let mut ledger = loaded();
        let marker = ledger.begin_refresh();

        let saved = ledger
            .begin_edit("1", CourseChanges::new().with_description("Saved"))
            .unwrap();
        ledger.settle(saved, true);
        ledger.begin_edit("2", set_promo(true)).unwrap();

        // The fetch was answered before either edit reached the server.
        ledger.end_refresh(marker, Some(vec![course("1"), course("2")]));

        let view = ledger.view();
        assert_eq!(view[0].description.as_deref(), Some("Saved"));
        assert!(view[1].promo);
    }

    #[test]
    fn edit_to_dropped_course_is_orphaned() {
        let mut ledger = loaded();
        let a = ledger.begin_edit("2", set_promo(true)).unwrap();
        let marker = ledger.begin_refresh();
        ledger.end_refresh(marker, Some(vec![course("1")]));

        assert_eq!(ledger.settle(a, false), Settled::Orphaned);
        assert_eq!(ledger.view().len(), 1);
    }
}
