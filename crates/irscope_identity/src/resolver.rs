//! Link index over origin annotations, and the closures built from it.

use std::sync::Arc;

use irscope_ir::{ElementId, Origin, Phase};
use irscope_trace::PhaseRegistry;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::{EntityRef, IdentityError, LogicalEntity};

/// How elements without origin annotations are linked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OriginPolicy {
    /// No origin means a fresh element.
    #[default]
    Explicit,
    /// A graph node without origins links to the node with the same id in
    /// the latest earlier graph-like phase, if that phase has one.
    ExplicitOrSameId,
}

type Links = SmallVec<[EntityRef; 2]>;

/// Resolves cross-phase identity for one loaded trace.
///
/// Built once per trace; a new trace gets a new resolver, which is the only
/// way memoized entities are invalidated.
pub struct IdentityResolver {
    phases: Vec<Arc<Phase>>,
    policy: OriginPolicy,
    /// element → the elements it was derived from
    backward: FxHashMap<EntityRef, Links>,
    /// element → the elements derived from it
    forward: FxHashMap<EntityRef, Links>,
    diagnostics: Vec<IdentityError>,
    /// Every member of a computed entity maps to the shared entity.
    memo: RwLock<FxHashMap<EntityRef, Arc<LogicalEntity>>>,
}

impl IdentityResolver {
    /// Build the link index for every phase of `registry`.
    #[tracing::instrument(level = "debug", skip_all, fields(phases = registry.phase_count()))]
    pub fn new(registry: &PhaseRegistry, policy: OriginPolicy) -> Self {
        let phases = registry.phases().to_vec();
        let mut resolver = IdentityResolver {
            phases,
            policy,
            backward: FxHashMap::default(),
            forward: FxHashMap::default(),
            diagnostics: Vec::new(),
            memo: RwLock::new(FxHashMap::default()),
        };
        resolver.index_links();
        tracing::debug!(
            links = resolver.link_count(),
            dropped = resolver.diagnostics.len(),
            "built identity index"
        );
        resolver
    }

    fn index_links(&mut self) {
        let mut links = Vec::new();
        for (index, phase) in self.phases.iter().enumerate() {
            let same_id_source = match self.policy {
                OriginPolicy::ExplicitOrSameId if phase.kind().is_graph_like() => {
                    self.phases[..index]
                        .iter()
                        .rposition(|p| p.kind().is_graph_like())
                }
                _ => None,
            };
            for member in phase.members() {
                let element = EntityRef::new(index, member.id);
                if member.origins.is_empty() {
                    if let Some(prev) = same_id_source {
                        if self.phases[prev].contains(member.id) {
                            links.push((element, EntityRef::new(prev, member.id)));
                        }
                    }
                    continue;
                }
                for origin in member.origins {
                    match resolve_origin(&self.phases, element, origin) {
                        Ok(target) => links.push((element, target)),
                        Err(err) => {
                            tracing::warn!(%err, "dropping origin link");
                            self.diagnostics.push(err);
                        }
                    }
                }
            }
        }

        for (element, target) in links {
            push_unique(self.backward.entry(element).or_default(), target);
            push_unique(self.forward.entry(target).or_default(), element);
        }
    }

    pub fn policy(&self) -> OriginPolicy {
        self.policy
    }

    /// Origin annotations that were dropped while indexing.
    pub fn diagnostics(&self) -> &[IdentityError] {
        &self.diagnostics
    }

    /// Number of resolved one-hop links.
    pub fn link_count(&self) -> usize {
        self.backward.values().map(SmallVec::len).sum()
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// Whether `element` names an existing element of a loaded phase.
    pub fn is_member(&self, element: EntityRef) -> bool {
        self.phases
            .get(element.phase)
            .is_some_and(|p| p.contains(element.id))
    }

    /// One-hop origins of an element.
    pub fn origins_of(&self, element: EntityRef) -> &[EntityRef] {
        self.backward.get(&element).map(SmallVec::as_slice).unwrap_or_default()
    }

    /// One-hop derivations of an element.
    pub fn derivations_of(&self, element: EntityRef) -> &[EntityRef] {
        self.forward.get(&element).map(SmallVec::as_slice).unwrap_or_default()
    }

    /// Every element in later phases reachable by following derivations.
    ///
    /// Splits and merges contribute every branch. The result is sorted and
    /// excludes the element itself.
    pub fn resolve_forward(&self, phase: usize, id: ElementId) -> Vec<EntityRef> {
        closure(EntityRef::new(phase, id), &[&self.forward])
    }

    /// Every element in earlier phases reachable by following origins.
    pub fn resolve_backward(&self, phase: usize, id: ElementId) -> Vec<EntityRef> {
        closure(EntityRef::new(phase, id), &[&self.backward])
    }

    /// The logical entity holding an element.
    ///
    /// This is the connected component of the link graph, so an entity
    /// reached through a merge includes the merge's other inputs. Results
    /// are memoized for every member. An element with no links (or one that
    /// does not exist) is an entity of its own.
    pub fn entity_of(&self, phase: usize, id: ElementId) -> Arc<LogicalEntity> {
        let key = EntityRef::new(phase, id);
        if let Some(entity) = self.memo.read().get(&key) {
            return Arc::clone(entity);
        }

        let mut members = closure(key, &[&self.forward, &self.backward]);
        members.push(key);
        let entity = Arc::new(LogicalEntity::from_members(members));

        let mut memo = self.memo.write();
        if let Some(existing) = memo.get(&key) {
            return Arc::clone(existing);
        }
        for &member in entity.members() {
            memo.insert(member, Arc::clone(&entity));
        }
        tracing::trace!(entity = %entity.id(), members = entity.len(), "computed entity");
        entity
    }

    /// Entity whose id is `id`.
    #[inline]
    pub fn entity(&self, id: EntityRef) -> Arc<LogicalEntity> {
        self.entity_of(id.phase, id.id)
    }

    /// Entities of several elements of one phase, deduplicated, in id order.
    pub fn entities_for(
        &self,
        phase: usize,
        ids: impl IntoIterator<Item = ElementId>,
    ) -> Vec<Arc<LogicalEntity>> {
        let mut seen = FxHashSet::default();
        let mut entities: Vec<_> = ids
            .into_iter()
            .map(|id| self.entity_of(phase, id))
            .filter(|e| seen.insert(e.id()))
            .collect();
        entities.sort_by_key(|e| e.id());
        entities
    }

    /// Number of memoized elements.
    pub fn memoized(&self) -> usize {
        self.memo.read().len()
    }
}

fn push_unique(links: &mut Links, target: EntityRef) {
    if !links.contains(&target) {
        links.push(target);
    }
}

/// Resolve one origin annotation of `element` to a concrete element.
fn resolve_origin(
    phases: &[Arc<Phase>],
    element: EntityRef,
    origin: &Origin,
) -> Result<EntityRef, IdentityError> {
    let target_phase = match &origin.phase {
        None => element
            .phase
            .checked_sub(1)
            .ok_or(IdentityError::NoPrecedingPhase {
                element,
                target: origin.target,
            })?,
        Some(name) => phases[..element.phase]
            .iter()
            .rposition(|p| &p.name == name)
            .ok_or_else(|| {
                if phases[element.phase..].iter().any(|p| &p.name == name) {
                    IdentityError::NotEarlier {
                        element,
                        phase: name.clone(),
                    }
                } else {
                    IdentityError::UnknownPhase {
                        element,
                        phase: name.clone(),
                    }
                }
            })?,
    };
    let target = EntityRef::new(target_phase, origin.target);
    if phases[target_phase].contains(origin.target) {
        Ok(target)
    } else {
        Err(IdentityError::MissingTarget { element, target })
    }
}

/// Elements reachable from `start` over the union of `maps`, sorted,
/// excluding `start`.
fn closure(start: EntityRef, maps: &[&FxHashMap<EntityRef, Links>]) -> Vec<EntityRef> {
    let mut seen = FxHashSet::default();
    seen.insert(start);
    let mut stack = vec![start];
    while let Some(current) = stack.pop() {
        for map in maps {
            if let Some(next) = map.get(&current) {
                for &n in next {
                    if seen.insert(n) {
                        stack.push(n);
                    }
                }
            }
        }
    }
    seen.remove(&start);
    let mut out: Vec<_> = seen.into_iter().collect();
    out.sort_unstable();
    out
}
