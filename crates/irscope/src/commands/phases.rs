//! `irscope phases`: list the phases of a trace.

use irscope_identity::IdentityResolver;
use irscope_trace::PhaseRegistry;

use crate::{CliError, Options};

/// One line per phase, then a summary of cross-phase links.
///
/// Broken phases are listed with their error; links that could not be
/// resolved are listed after the summary.
#[tracing::instrument(level = "debug", skip_all)]
pub fn list_phases(text: &str, options: &Options) -> Result<String, CliError> {
    let registry = PhaseRegistry::load(text)?;
    let resolver = IdentityResolver::new(&registry, options.origin_policy());

    let function = registry.function();
    let mut lines = vec![format!(
        "function {} ({} phases)",
        function.name,
        registry.phase_count()
    )];
    for phase in registry.phases() {
        let detail = match phase.broken() {
            Some(broken) => format!("unavailable: {}", broken.message),
            None => format!("{} members", phase.member_count()),
        };
        lines.push(format!(
            "{:>3}  #{:<3} {:<16} {}  {}",
            phase.index,
            phase.ordinal,
            phase.kind().as_str(),
            phase.name,
            detail
        ));
    }

    let dropped = resolver.diagnostics();
    lines.push(format!(
        "{} origin links, {} dropped",
        resolver.link_count(),
        dropped.len()
    ));
    lines.extend(dropped.iter().map(|error| format!("  {error}")));
    Ok(lines.join("\n"))
}
