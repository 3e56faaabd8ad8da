//! Cross-phase identity classes.

use std::fmt;

use irscope_ir::ElementId;

/// One element of one phase.
///
/// Ordered by phase index first, so sorting a member list groups it by
/// phase in pipeline order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    /// Registry index of the phase.
    pub phase: usize,
    pub id: ElementId,
}

impl EntityRef {
    #[inline]
    pub const fn new(phase: usize, id: ElementId) -> Self {
        EntityRef { phase, id }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in phase {}", self.id, self.phase)
    }
}

/// The set of elements, across all phases, that are "the same value".
///
/// Members are kept sorted and deduplicated. The entity's id is its
/// smallest member, which makes it independent of the element the entity
/// was first computed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogicalEntity {
    members: Vec<EntityRef>,
}

impl LogicalEntity {
    /// Build from a non-empty member list in any order.
    pub(crate) fn from_members(mut members: Vec<EntityRef>) -> Self {
        members.sort_unstable();
        members.dedup();
        debug_assert!(!members.is_empty());
        LogicalEntity { members }
    }

    /// Deterministic id: the smallest member.
    #[inline]
    pub fn id(&self) -> EntityRef {
        self.members[0]
    }

    pub fn members(&self) -> &[EntityRef] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, member: EntityRef) -> bool {
        self.members.binary_search(&member).is_ok()
    }

    /// Local ids this entity has in `phase`, ascending.
    pub fn members_in(&self, phase: usize) -> impl Iterator<Item = ElementId> + '_ {
        let start = self.members.partition_point(|m| m.phase < phase);
        self.members[start..]
            .iter()
            .take_while(move |m| m.phase == phase)
            .map(|m| m.id)
    }

    /// Distinct phases holding at least one member, ascending.
    pub fn phases(&self) -> impl Iterator<Item = usize> + '_ {
        let mut last = None;
        self.members.iter().filter_map(move |m| {
            if last == Some(m.phase) {
                None
            } else {
                last = Some(m.phase);
                Some(m.phase)
            }
        })
    }
}
