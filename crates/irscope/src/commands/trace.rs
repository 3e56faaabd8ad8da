//! `irscope trace`: follow one element across phases.

use irscope_identity::{EntityRef, IdentityResolver};
use irscope_ir::ElementId;
use irscope_trace::PhaseRegistry;

use super::phase_at;
use crate::{CliError, Options};

/// The logical entity of `--node` in `--phase`, member by member.
#[tracing::instrument(level = "debug", skip_all, fields(phase = ?options.phase, node = ?options.node))]
pub fn trace_entity(text: &str, options: &Options) -> Result<String, CliError> {
    let registry = PhaseRegistry::load(text)?;
    let index = options.require_phase()?;
    let id = ElementId::new(options.require_node()?);
    let phase = phase_at(&registry, index)?;
    if !phase.contains(id) {
        return Err(CliError::NoSuchElement { phase: index, id });
    }

    let resolver = IdentityResolver::new(&registry, options.origin_policy());
    let entity = resolver.entity_of(index, id);
    let mut lines = vec![format!(
        "entity {}: {} members",
        entity.id(),
        entity.len()
    )];
    for member_phase in entity.phases() {
        let Some(phase) = registry.phase(member_phase) else {
            continue;
        };
        lines.push(format!("{member_phase:>3}  {}", phase.name));
        for member in entity.members_in(member_phase) {
            let text = phase.element_text(member).unwrap_or_default();
            lines.push(format!("       {:<6} {text}", member.to_string()));
        }
    }

    let chain = |refs: Vec<EntityRef>| {
        refs.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    lines.push(format!("derived from: {}", chain(resolver.resolve_backward(index, id))));
    lines.push(format!("derives: {}", chain(resolver.resolve_forward(index, id))));
    Ok(lines.join("\n"))
}
