//! The selection shared by every view of a session.
//!
//! Selection is kept in terms of [`LogicalEntity`]s, never per-phase ids, so
//! a node selected in one phase lights up its counterparts everywhere.
//!
//! The broadcaster is single-threaded. Every `select` notifies all
//! subscribers synchronously, in subscription order, before it returns,
//! even when the set did not change. A listener that calls `select` while being notified does not
//! recurse: the request is queued and applied after the current round, in
//! a round of its own.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use irscope_identity::{EntityRef, LogicalEntity};
use irscope_ir::ElementId;

/// How a `select` call combines with the current selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// Selection becomes exactly the given set.
    #[default]
    Replace,
    /// Given entities are added.
    Add,
    /// Each given entity flips between selected and not.
    Toggle,
}

/// Snapshot of the selected entities.
///
/// Entities are keyed (and iterated) by their id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    entities: BTreeMap<EntityRef, Arc<LogicalEntity>>,
    revision: u64,
}

impl Selection {
    pub fn entities(&self) -> impl Iterator<Item = &Arc<LogicalEntity>> {
        self.entities.values()
    }

    /// Ids of the selected entities, ascending.
    pub fn ids(&self) -> Vec<EntityRef> {
        self.entities.keys().copied().collect()
    }

    pub fn contains(&self, id: EntityRef) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Bumped on every effective change; never decreases.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Local ids the selected entities have in `phase`, ascending.
    ///
    /// Empty when no selected entity has a member there.
    pub fn members_in(&self, phase: usize) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = self
            .entities
            .values()
            .flat_map(|e| e.members_in(phase))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Apply one request. Returns whether the set changed.
    fn apply(&mut self, entities: Vec<Arc<LogicalEntity>>, mode: SelectionMode) -> bool {
        let mut changed = false;
        match mode {
            SelectionMode::Replace => {
                let next: BTreeMap<_, _> = entities.into_iter().map(|e| (e.id(), e)).collect();
                if next.keys().ne(self.entities.keys()) {
                    self.entities = next;
                    changed = true;
                }
            }
            SelectionMode::Add => {
                for entity in entities {
                    if let std::collections::btree_map::Entry::Vacant(slot) =
                        self.entities.entry(entity.id())
                    {
                        slot.insert(entity);
                        changed = true;
                    }
                }
            }
            SelectionMode::Toggle => {
                for entity in entities {
                    let id = entity.id();
                    if self.entities.remove(&id).is_none() {
                        self.entities.insert(id, entity);
                    }
                    changed = true;
                }
            }
        }
        if changed {
            self.revision = self.revision.saturating_add(1);
        }
        changed
    }
}

/// Receives the selection after every `select` call.
pub trait SelectionListener {
    fn selection_changed(&self, selection: &Selection);
}

impl<F: Fn(&Selection)> SelectionListener for F {
    fn selection_changed(&self, selection: &Selection) {
        self(selection);
    }
}

/// Token returned by [`SelectionBroadcaster::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

struct Request {
    entities: Vec<Arc<LogicalEntity>>,
    mode: SelectionMode,
}

/// Owner of the selection and its subscriber list.
///
/// One per session; shared with views through `Rc`.
#[derive(Default)]
pub struct SelectionBroadcaster {
    state: RefCell<Selection>,
    listeners: RefCell<Vec<(SubscriptionHandle, Rc<dyn SelectionListener>)>>,
    next_handle: Cell<u64>,
    queue: RefCell<VecDeque<Request>>,
    notifying: Cell<bool>,
}

/// Clears the notifying flag even if a listener panics.
struct RoundGuard<'a>(&'a Cell<bool>);

impl Drop for RoundGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl SelectionBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the selection and notify every subscriber.
    ///
    /// Called from inside a notification, the request is queued instead and
    /// applied once the current round finishes.
    pub fn select(
        &self,
        entities: impl IntoIterator<Item = Arc<LogicalEntity>>,
        mode: SelectionMode,
    ) {
        self.queue.borrow_mut().push_back(Request {
            entities: entities.into_iter().collect(),
            mode,
        });
        if self.notifying.get() {
            tracing::trace!(?mode, "queued re-entrant selection");
            return;
        }
        self.drain();
    }

    /// Deselect everything.
    pub fn clear(&self) {
        self.select(Vec::new(), SelectionMode::Replace);
    }

    pub fn current(&self) -> Selection {
        self.state.borrow().clone()
    }

    pub fn revision(&self) -> u64 {
        self.state.borrow().revision
    }

    pub fn subscribe(&self, listener: Rc<dyn SelectionListener>) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.listeners.borrow_mut().push((handle, listener));
        handle
    }

    /// Remove a subscriber. Returns `false` if the handle was not subscribed.
    ///
    /// A listener removed during a round is not called for the rest of it.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(h, _)| *h != handle);
        listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn is_subscribed(&self, handle: SubscriptionHandle) -> bool {
        self.listeners.borrow().iter().any(|(h, _)| *h == handle)
    }

    fn drain(&self) {
        self.notifying.set(true);
        let _guard = RoundGuard(&self.notifying);
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(request) = next else { break };
            let changed = self.state.borrow_mut().apply(request.entities, request.mode);
            let snapshot = self.current();
            let listeners: Vec<_> = self
                .listeners
                .borrow()
                .iter()
                .map(|(h, l)| (*h, Rc::clone(l)))
                .collect();
            tracing::trace!(
                revision = snapshot.revision,
                selected = snapshot.len(),
                changed,
                listeners = listeners.len(),
                "selection round"
            );
            for (handle, listener) in listeners {
                if self.is_subscribed(handle) {
                    listener.selection_changed(&snapshot);
                }
            }
        }
    }
}

impl fmt::Debug for SelectionBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionBroadcaster")
            .field("selection", &self.state.borrow().ids())
            .field("revision", &self.revision())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}
