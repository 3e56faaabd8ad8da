//! One inspector session: a loaded trace plus the views looking at it.

use std::ops::Range;
use std::rc::Rc;
use std::sync::Arc;

use irscope_identity::{IdentityResolver, OriginPolicy};
use irscope_ir::ElementId;
use irscope_layout::{CancellationToken, LayoutConfig, LayoutEngine, Rect};
use irscope_trace::{ParseError, PhaseRegistry};
use thiserror::Error;

use crate::frame::Container;
use crate::host::ViewHost;
use crate::selection::{Selection, SelectionBroadcaster, SelectionMode};
use crate::views::{
    DisassemblyView, GraphView, InfoView, ScheduleView, SequenceView, SourceView, View, ViewKind,
};

/// Session settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionConfig {
    pub layout: LayoutConfig,
    pub origin_policy: OriginPolicy,
    /// Lay out every graph phase in parallel right after loading.
    pub prewarm: bool,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to load trace: {0}")]
    Load(#[from] ParseError),
    #[error("no trace loaded")]
    NoTrace,
    #[error("phase {index} out of range ({count} phases)")]
    PhaseOutOfRange { index: usize, count: usize },
    #[error("no active view")]
    NoActiveView,
    #[error("no source view attached")]
    NoSourceView,
}

struct Loaded {
    registry: PhaseRegistry,
    resolver: Arc<IdentityResolver>,
}

/// Owns the registry, resolver, broadcaster, layout engine and views.
///
/// Holds at most one phase view (the active phase) and one source view.
/// Loading a new trace tears both down and clears the selection; phase
/// data is never mutated.
pub struct Session {
    config: SessionConfig,
    loaded: Option<Loaded>,
    broadcaster: Rc<SelectionBroadcaster>,
    engine: Arc<LayoutEngine>,
    active: Option<ViewHost>,
    source: Option<ViewHost>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let engine = Arc::new(LayoutEngine::new(config.layout.clone()));
        Session {
            config,
            loaded: None,
            broadcaster: Rc::new(SelectionBroadcaster::new()),
            engine,
            active: None,
            source: None,
        }
    }

    /// Replace the loaded trace.
    ///
    /// On a fatal parse error the previous trace stays loaded. On success
    /// the containers of the torn-down views are handed back.
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = text.len()))]
    pub fn load(&mut self, text: &str) -> Result<Vec<Box<dyn Container>>, SessionError> {
        let registry = PhaseRegistry::load(text)?;

        let released: Vec<Box<dyn Container>> = [self.active.take(), self.source.take()]
            .into_iter()
            .flatten()
            .filter_map(ViewHost::detach)
            .collect();
        self.broadcaster.clear();
        self.engine.clear();

        let resolver = Arc::new(IdentityResolver::new(&registry, self.config.origin_policy));
        if self.config.prewarm {
            let laid_out = self
                .engine
                .prewarm(registry.phases(), &CancellationToken::new());
            tracing::debug!(laid_out, "prewarmed layouts");
        }
        tracing::debug!(
            phases = registry.phase_count(),
            links = resolver.link_count(),
            dropped = resolver.diagnostics().len(),
            "trace loaded"
        );
        self.loaded = Some(Loaded { registry, resolver });
        Ok(released)
    }

    fn loaded(&self) -> Result<&Loaded, SessionError> {
        self.loaded.as_ref().ok_or(SessionError::NoTrace)
    }

    pub fn registry(&self) -> Option<&PhaseRegistry> {
        self.loaded.as_ref().map(|l| &l.registry)
    }

    pub fn resolver(&self) -> Option<&Arc<IdentityResolver>> {
        self.loaded.as_ref().map(|l| &l.resolver)
    }

    pub fn broadcaster(&self) -> &Rc<SelectionBroadcaster> {
        &self.broadcaster
    }

    pub fn engine(&self) -> &Arc<LayoutEngine> {
        &self.engine
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn selection(&self) -> Selection {
        self.broadcaster.current()
    }

    /// Show phase `index` in `container`.
    ///
    /// The previous phase view is torn down first (cancelling its layout if
    /// one is still running) and its container handed back.
    pub fn activate(
        &mut self,
        index: usize,
        container: Box<dyn Container>,
    ) -> Result<Option<Box<dyn Container>>, SessionError> {
        let loaded = self.loaded()?;
        let count = loaded.registry.phase_count();
        let phase = loaded
            .registry
            .phase(index)
            .cloned()
            .ok_or(SessionError::PhaseOutOfRange { index, count })?;
        let resolver = Arc::clone(&loaded.resolver);

        let previous = self.active.take().and_then(ViewHost::detach);

        let mut view: Box<dyn View> = match ViewKind::for_phase(&phase) {
            ViewKind::Graph => Box::new(GraphView::new(container, Arc::clone(&self.engine))),
            ViewKind::Schedule => Box::new(ScheduleView::new(container)),
            ViewKind::Sequence => Box::new(SequenceView::new(container)),
            ViewKind::Disassembly => Box::new(DisassemblyView::new(container)),
            ViewKind::Info | ViewKind::Source => Box::new(InfoView::new(container)),
        };
        tracing::debug!(index, phase = %phase.name, view = %view.kind(), "activating phase");
        view.initialize(Arc::clone(&phase));
        self.active = Some(ViewHost::attach(
            view,
            Rc::clone(&self.broadcaster),
            resolver,
        ));
        if let Some(source) = &self.source {
            source.rebind(phase);
        }
        Ok(previous)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.as_ref().and_then(ViewHost::phase_index)
    }

    pub fn active_view(&self) -> Option<&ViewHost> {
        self.active.as_ref()
    }

    pub fn source_view(&self) -> Option<&ViewHost> {
        self.source.as_ref()
    }

    /// Move to the next phase that is not broken.
    ///
    /// Returns the new index, or `None` (staying put) at the end.
    pub fn next(&mut self) -> Result<Option<usize>, SessionError> {
        let current = self.active_index().ok_or(SessionError::NoActiveView)?;
        let target = self
            .loaded()?
            .registry
            .phases()
            .iter()
            .skip(current + 1)
            .find(|p| !p.is_broken())
            .map(|p| p.index);
        self.step_to(target)
    }

    /// Move to the previous phase that is not broken.
    pub fn previous(&mut self) -> Result<Option<usize>, SessionError> {
        let current = self.active_index().ok_or(SessionError::NoActiveView)?;
        let target = self.loaded()?.registry.phases()[..current]
            .iter()
            .rev()
            .find(|p| !p.is_broken())
            .map(|p| p.index);
        self.step_to(target)
    }

    fn step_to(&mut self, target: Option<usize>) -> Result<Option<usize>, SessionError> {
        let Some(target) = target else {
            return Ok(None);
        };
        let container = self
            .active
            .take()
            .and_then(ViewHost::detach)
            .ok_or(SessionError::NoActiveView)?;
        self.activate(target, container)?;
        Ok(Some(target))
    }

    /// Show the function source in `container`, replacing any source view.
    pub fn attach_source(
        &mut self,
        container: Box<dyn Container>,
    ) -> Result<Option<Box<dyn Container>>, SessionError> {
        let loaded = self.loaded()?;
        let mut view = SourceView::new(
            container,
            loaded.registry.function().clone(),
            loaded.registry.phases().to_vec(),
        );
        let active_phase = self
            .active
            .as_ref()
            .and_then(|host| host.view().phase().cloned());
        if let Some(phase) = active_phase {
            view.initialize(phase);
        }
        let resolver = Arc::clone(&loaded.resolver);
        let previous = self.source.take().and_then(ViewHost::detach);
        self.source = Some(ViewHost::attach(
            Box::new(view),
            Rc::clone(&self.broadcaster),
            resolver,
        ));
        Ok(previous)
    }

    /// Render every attached view.
    pub fn render(&self) -> Result<(), SessionError> {
        let active = self.active.as_ref().ok_or(SessionError::NoActiveView)?;
        active.render();
        if let Some(source) = &self.source {
            source.render();
        }
        Ok(())
    }

    fn active_host(&self) -> Result<&ViewHost, SessionError> {
        self.active.as_ref().ok_or(SessionError::NoActiveView)
    }

    pub fn click(&self, id: ElementId, mode: SelectionMode) -> Result<usize, SessionError> {
        Ok(self.active_host()?.click(id, mode))
    }

    pub fn select_rect(&self, area: Rect, mode: SelectionMode) -> Result<usize, SessionError> {
        Ok(self.active_host()?.select_rect(area, mode))
    }

    pub fn search(&self, text: &str, mode: SelectionMode) -> Result<usize, SessionError> {
        Ok(self.active_host()?.search(text, mode))
    }

    pub fn select_source(
        &self,
        range: Range<u32>,
        mode: SelectionMode,
    ) -> Result<usize, SessionError> {
        let source = self.source.as_ref().ok_or(SessionError::NoSourceView)?;
        Ok(source.select_source(range, mode))
    }

    /// Local ids highlighted in the active view.
    pub fn highlighted(&self) -> Vec<ElementId> {
        self.active
            .as_ref()
            .map(ViewHost::highlighted)
            .unwrap_or_default()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests;
