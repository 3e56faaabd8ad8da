//! Wiring between one view, the broadcaster and the identity resolver.

use std::cell::{Ref, RefCell};
use std::ops::Range;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use irscope_identity::{IdentityResolver, LogicalEntity};
use irscope_ir::{ElementId, Phase};
use irscope_layout::Rect;
use rustc_hash::FxHashSet;

use crate::frame::Container;
use crate::selection::{Selection, SelectionBroadcaster, SelectionListener, SelectionMode, SubscriptionHandle};
use crate::views::{Gesture, View, ViewKind};

/// Forwards notifications to a view without keeping it alive.
struct ViewListener {
    view: Weak<RefCell<Box<dyn View>>>,
}

impl SelectionListener for ViewListener {
    fn selection_changed(&self, selection: &Selection) {
        if let Some(view) = self.view.upgrade() {
            view.borrow_mut().on_selection_changed(selection);
        }
    }
}

/// A view subscribed to a session's selection.
///
/// Gestures go through the host: the view maps them to phase-local
/// elements, the host maps those to logical entities and calls
/// [`SelectionBroadcaster::select`]. The view's borrow is released before
/// the broadcast, so the view is notified like every other subscriber.
pub struct ViewHost {
    view: Rc<RefCell<Box<dyn View>>>,
    subscription: SubscriptionHandle,
    broadcaster: Rc<SelectionBroadcaster>,
    resolver: Arc<IdentityResolver>,
}

impl ViewHost {
    /// Subscribe an initialized view and show it the current selection.
    pub fn attach(
        view: Box<dyn View>,
        broadcaster: Rc<SelectionBroadcaster>,
        resolver: Arc<IdentityResolver>,
    ) -> Self {
        let view = Rc::new(RefCell::new(view));
        let listener = Rc::new(ViewListener {
            view: Rc::downgrade(&view),
        });
        let subscription = broadcaster.subscribe(listener);
        view.borrow_mut().on_selection_changed(&broadcaster.current());
        ViewHost {
            view,
            subscription,
            broadcaster,
            resolver,
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.view.borrow().kind()
    }

    pub fn view(&self) -> Ref<'_, Box<dyn View>> {
        self.view.borrow()
    }

    pub fn phase_index(&self) -> Option<usize> {
        self.view.borrow().phase().map(|p| p.index)
    }

    pub fn render(&self) {
        self.view.borrow_mut().render();
    }

    pub fn highlighted(&self) -> Vec<ElementId> {
        self.view.borrow().highlighted()
    }

    /// Bind the view to another phase, keeping its container.
    pub fn rebind(&self, phase: Arc<Phase>) {
        let mut view = self.view.borrow_mut();
        view.initialize(phase);
        view.on_selection_changed(&self.broadcaster.current());
    }

    /// Apply a gesture. Returns the number of entities it picked.
    pub fn gesture(&self, gesture: &Gesture<'_>, mode: SelectionMode) -> usize {
        let picked = self.view.borrow_mut().pick(gesture);
        let mut seen = FxHashSet::default();
        let entities: Vec<Arc<LogicalEntity>> = picked
            .into_iter()
            .map(|element| self.resolver.entity(element))
            .filter(|e| seen.insert(e.id()))
            .collect();
        tracing::debug!(?gesture, ?mode, entities = entities.len(), "selection gesture");
        let count = entities.len();
        self.broadcaster.select(entities, mode);
        count
    }

    pub fn click(&self, id: ElementId, mode: SelectionMode) -> usize {
        self.gesture(&Gesture::Click(id), mode)
    }

    pub fn select_rect(&self, area: Rect, mode: SelectionMode) -> usize {
        self.gesture(&Gesture::Rect(area), mode)
    }

    pub fn search(&self, text: &str, mode: SelectionMode) -> usize {
        self.gesture(&Gesture::Search(text), mode)
    }

    pub fn select_source(&self, range: Range<u32>, mode: SelectionMode) -> usize {
        self.gesture(&Gesture::SourceRange(range), mode)
    }

    /// Unsubscribe, tear the view down and return its container.
    pub fn detach(self) -> Option<Box<dyn Container>> {
        self.broadcaster.unsubscribe(self.subscription);
        let container = self.view.borrow_mut().teardown();
        container
    }
}
