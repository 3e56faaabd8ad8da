//! Dropped origin links.

use thiserror::Error;

use irscope_ir::ElementId;

use crate::EntityRef;

/// An origin annotation that could not be turned into a link.
///
/// None of these are fatal: the link is dropped and closures proceed
/// without it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("origin {target} of {element} has no preceding phase")]
    NoPrecedingPhase { element: EntityRef, target: ElementId },

    #[error("origin of {element} names unknown phase `{phase}`")]
    UnknownPhase { element: EntityRef, phase: String },

    #[error("origin of {element} names phase `{phase}`, which is not earlier")]
    NotEarlier { element: EntityRef, phase: String },

    #[error("origin of {element} points at missing {target}")]
    MissingTarget { element: EntityRef, target: EntityRef },
}

impl IdentityError {
    /// The element whose origin was dropped.
    pub fn element(&self) -> EntityRef {
        match self {
            IdentityError::NoPrecedingPhase { element, .. }
            | IdentityError::UnknownPhase { element, .. }
            | IdentityError::NotEarlier { element, .. }
            | IdentityError::MissingTarget { element, .. } => *element,
        }
    }
}
