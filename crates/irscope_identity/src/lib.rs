//! Cross-phase identity for the irscope IR inspector.
//!
//! Every element of a phase may carry origin annotations pointing at the
//! element(s) of an earlier phase it was derived from. The
//! [`IdentityResolver`] turns those annotations into a link index once per
//! trace and answers three questions:
//!
//! - what did this element come from ([`IdentityResolver::resolve_backward`]),
//! - what did it become ([`IdentityResolver::resolve_forward`]),
//! - which elements of all phases are the same value
//!   ([`IdentityResolver::entity_of`], a [`LogicalEntity`]).
//!
//! Links always point strictly backward in pipeline order, so the link graph
//! is acyclic. Annotations that would break that (or that name nothing) are
//! dropped and reported as [`IdentityError`] diagnostics.

mod entity;
mod error;
mod resolver;

#[cfg(test)]
mod test_helpers;

pub use entity::{EntityRef, LogicalEntity};
pub use error::IdentityError;
pub use resolver::{IdentityResolver, OriginPolicy};
