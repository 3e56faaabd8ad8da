//! Views and selection for the irscope IR inspector.
//!
//! A [`Session`] owns one loaded trace and the views looking at it. Views
//! draw a phase into a caller-provided [`Container`] and talk to each other
//! only through the session's [`SelectionBroadcaster`]:
//!
//! 1. a gesture (click, rectangle drag, search, source range) picks
//!    elements of the view's phase;
//! 2. the [`ViewHost`] maps them to [`LogicalEntity`]s and selects them;
//! 3. every subscribed view maps the new selection back to its own phase
//!    and updates highlighting.
//!
//! The whole crate is single-threaded (`Rc`/`RefCell`); only layout runs
//! on a worker thread.
//!
//! [`LogicalEntity`]: irscope_identity::LogicalEntity

mod frame;
mod host;
mod selection;
mod session;
mod views;

#[cfg(test)]
mod test_helpers;

pub use frame::{Container, Frame, FrameLine, TextContainer};
pub use host::ViewHost;
pub use selection::{
    Selection, SelectionBroadcaster, SelectionListener, SelectionMode, SubscriptionHandle,
};
pub use session::{Session, SessionConfig, SessionError};
pub use views::{
    search, DisassemblyView, Gesture, GraphView, InfoView, ScheduleView, SequenceView, SourceView,
    View, ViewKind,
};
