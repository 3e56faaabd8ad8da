//! Command-line flags shared by every command.

use irscope_identity::OriginPolicy;
use irscope_layout::LayoutConfig;
use irscope_view::SessionConfig;

use crate::CliError;

/// Parsed `--flag` / `--flag=value` arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// Registry index of the phase to act on.
    pub phase: Option<usize>,
    pub node: Option<u32>,
    pub search: Option<String>,
    /// Also show the function source.
    pub source: bool,
    /// Ordering passes; the layout default when absent.
    pub passes: Option<usize>,
    /// Link unannotated elements to the same id one phase back.
    pub same_id_origins: bool,
    /// Lay out every graph phase up front.
    pub prewarm: bool,
}

impl Options {
    /// Parse everything after the trace path.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, CliError> {
        let mut options = Options::default();
        for arg in args {
            let arg = arg.as_ref();
            if let Some(value) = arg.strip_prefix("--phase=") {
                options.phase = Some(number("phase", value)?);
            } else if let Some(value) = arg.strip_prefix("--node=") {
                options.node = Some(number("node", value)?);
            } else if let Some(value) = arg.strip_prefix("--search=") {
                options.search = Some(value.to_string());
            } else if let Some(value) = arg.strip_prefix("--passes=") {
                options.passes = Some(number("passes", value)?);
            } else if arg == "--source" {
                options.source = true;
            } else if arg == "--same-id-origins" {
                options.same_id_origins = true;
            } else if arg == "--prewarm" {
                options.prewarm = true;
            } else {
                return Err(CliError::UnknownOption(arg.to_string()));
            }
        }
        Ok(options)
    }

    pub fn layout_config(&self) -> LayoutConfig {
        let config = LayoutConfig::default();
        match self.passes {
            Some(passes) => config.with_ordering_passes(passes),
            None => config,
        }
    }

    pub fn origin_policy(&self) -> OriginPolicy {
        if self.same_id_origins {
            OriginPolicy::ExplicitOrSameId
        } else {
            OriginPolicy::Explicit
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            layout: self.layout_config(),
            origin_policy: self.origin_policy(),
            prewarm: self.prewarm,
        }
    }

    pub(crate) fn require_phase(&self) -> Result<usize, CliError> {
        self.phase.ok_or(CliError::MissingOption("phase"))
    }

    pub(crate) fn require_node(&self) -> Result<u32, CliError> {
        self.node.ok_or(CliError::MissingOption("node"))
    }
}

fn number<T: std::str::FromStr>(option: &'static str, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::InvalidOption {
        option,
        value: value.to_string(),
    })
}
