//! Phase registry: the ordered, immutable set of phases of one trace.
//!
//! Loading is two-level. Structural problems with the document itself
//! (not JSON, no `phases` array, two entries claiming one ordinal) fail the
//! whole load. Anything wrong inside a single phase entry is confined to
//! that entry, which keeps its slot as a [`PhaseBody::Broken`] placeholder.

use std::sync::Arc;

use irscope_ir::{BrokenPhase, Origin, Origins, Phase, PhaseBody, PhaseKind};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::convert::convert_payload;
use crate::raw::RawFunction;
use crate::ParseError;

/// Function the trace was recorded for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,
    /// Function source text, when the trace embeds it.
    pub source: Option<String>,
    /// Script offset of `source`. Source positions in phases are script
    /// offsets, so `position - source_start` indexes into `source`.
    pub source_start: u32,
}

impl From<RawFunction> for FunctionInfo {
    fn from(raw: RawFunction) -> Self {
        FunctionInfo {
            name: raw.name,
            source: raw.source,
            source_start: raw.source_start,
        }
    }
}

/// Ordered phases of one loaded trace.
///
/// Phases are shared through `Arc` so views and background layouts can hold
/// them without borrowing the registry.
#[derive(Clone, Debug, Default)]
pub struct PhaseRegistry {
    function: FunctionInfo,
    phases: Vec<Arc<Phase>>,
    by_name: FxHashMap<String, usize>,
}

/// One phase entry before sorting.
struct Entry {
    /// Declared or positional ordinal; `None` when it could not be read.
    ordinal: Option<u32>,
    position: usize,
    name: String,
    body: PhaseBody,
}

impl PhaseRegistry {
    /// Parse a trace document.
    pub fn load(text: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(text).map_err(ParseError::Json)?;
        Self::from_value(value)
    }

    /// Build a registry from an already-parsed trace document.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        let Value::Object(mut root) = value else {
            return Err(ParseError::NotAnObject);
        };
        let function = read_function(&root);
        let Some(Value::Array(raw_phases)) = root.remove("phases") else {
            return Err(ParseError::MissingPhases);
        };

        // Entries without a readable ordinal sort right after the entry
        // listed before them.
        let mut entries = Vec::with_capacity(raw_phases.len());
        let mut ordinal_owner: FxHashMap<u32, usize> = FxHashMap::default();
        let mut anchor: Option<u32> = None;
        for (position, raw) in raw_phases.iter().enumerate() {
            let entry = parse_entry(position, raw);
            let key = match entry.ordinal {
                Some(ordinal) => {
                    if let Some(&first) = ordinal_owner.get(&ordinal) {
                        return Err(ParseError::DuplicateOrdinal {
                            ordinal,
                            first,
                            second: position,
                        });
                    }
                    ordinal_owner.insert(ordinal, position);
                    anchor = Some(ordinal);
                    (ordinal, false, position)
                }
                None => (anchor.unwrap_or(0), anchor.is_some(), position),
            };
            entries.push((key, entry));
        }
        entries.sort_by_key(|(key, _)| *key);

        let mut phases: Vec<Phase> = entries
            .into_iter()
            .enumerate()
            .map(|(index, ((ordinal, _, _), e))| {
                if e.position != index {
                    tracing::trace!(position = e.position, index, "phase reordered by ordinal");
                }
                Phase {
                    name: e.name,
                    ordinal,
                    index,
                    body: e.body,
                }
            })
            .collect();
        derive_line_origins(&mut phases);

        let mut by_name = FxHashMap::default();
        for phase in &phases {
            by_name.entry(phase.name.clone()).or_insert(phase.index);
        }
        let broken = phases.iter().filter(|p| p.is_broken()).count();
        tracing::debug!(
            function = %function.name,
            phases = phases.len(),
            broken,
            "loaded trace"
        );

        Ok(PhaseRegistry {
            function,
            phases: phases.into_iter().map(Arc::new).collect(),
            by_name,
        })
    }

    /// Phase at `index`, in pipeline order.
    #[inline]
    pub fn phase(&self, index: usize) -> Option<&Arc<Phase>> {
        self.phases.get(index)
    }

    /// Number of phase entries, broken ones included.
    #[inline]
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn phases(&self) -> &[Arc<Phase>] {
        &self.phases
    }

    /// First phase with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<Phase>> {
        self.by_name.get(name).and_then(|&i| self.phases.get(i))
    }

    pub fn function(&self) -> &FunctionInfo {
        &self.function
    }

    /// Diagnostic of a broken phase.
    pub fn phase_error(&self, index: usize) -> Option<&str> {
        self.phase(index)
            .and_then(|p| p.broken())
            .map(|b| b.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

fn read_function(root: &Map<String, Value>) -> FunctionInfo {
    match root.get("function") {
        Some(Value::String(name)) => FunctionInfo {
            name: name.clone(),
            source: root.get("source").and_then(Value::as_str).map(str::to_string),
            source_start: 0,
        },
        Some(value @ Value::Object(_)) => match RawFunction::deserialize(value) {
            Ok(raw) => raw.into(),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed function metadata");
                FunctionInfo::default()
            }
        },
        _ => FunctionInfo {
            name: String::new(),
            source: root.get("source").and_then(Value::as_str).map(str::to_string),
            source_start: 0,
        },
    }
}

// ── Phase entries ───────────────────────────────────────────────────

fn parse_entry(position: usize, raw: &Value) -> Entry {
    let Value::Object(obj) = raw else {
        return broken_entry(position, None, None, None, &ParseError::PhaseNotAnObject);
    };
    let name = obj.get("name").and_then(Value::as_str).map(str::to_string);
    let declared_kind = obj.get("kind").and_then(Value::as_str).map(str::to_string);

    let declared = match obj.get("ordinal") {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_u64().and_then(|o| u32::try_from(o).ok()) {
            Some(o) => Some(o),
            None => {
                let err = ParseError::WrongType { field: "ordinal" };
                return broken_entry(position, None, name, declared_kind, &err);
            }
        },
    };

    match parse_body(obj) {
        Ok((name, body)) => {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "phase lists are far below u32::MAX entries"
            )]
            let ordinal = declared.unwrap_or(position as u32);
            Entry {
                ordinal: Some(ordinal),
                position,
                name,
                body,
            }
        }
        Err(err) => broken_entry(position, declared, name, declared_kind, &err),
    }
}

fn parse_body(obj: &Map<String, Value>) -> Result<(String, PhaseBody), ParseError> {
    let name = required_str(obj, "name")?;
    let kind_name = required_str(obj, "kind")?;
    let kind = PhaseKind::from_trace_name(kind_name)
        .ok_or_else(|| ParseError::UnknownKind(kind_name.to_string()))?;
    let data = obj
        .get("data")
        .or_else(|| obj.get("payload"))
        .ok_or(ParseError::MissingField("data"))?;
    let body = convert_payload(kind, data)?;
    Ok((name.to_string(), body))
}

fn required_str<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, ParseError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(ParseError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ParseError::WrongType { field }),
    }
}

fn broken_entry(
    position: usize,
    ordinal: Option<u32>,
    name: Option<String>,
    declared_kind: Option<String>,
    err: &ParseError,
) -> Entry {
    let name = name.unwrap_or_else(|| format!("<phase {position}>"));
    tracing::warn!(position, %name, error = %err, "phase failed to parse");
    Entry {
        ordinal,
        position,
        name,
        body: PhaseBody::Broken(BrokenPhase {
            declared_kind,
            message: err.to_string(),
        }),
    }
}

// ── Derived origins ─────────────────────────────────────────────────

/// Give disassembly lines without explicit origins the nodes whose pc range
/// covers them, in the latest earlier graph-like phase.
fn derive_line_origins(phases: &mut [Phase]) {
    for index in 0..phases.len() {
        let Some(source) = phases[..index]
            .iter()
            .rev()
            .find(|p| p.kind().is_graph_like())
            .map(|p| p.name.clone())
        else {
            continue;
        };
        let PhaseBody::Instructions(payload) = &mut phases[index].body else {
            continue;
        };
        if payload.node_ranges.is_empty() {
            continue;
        }
        let derived: Vec<Origins> = payload
            .lines
            .iter()
            .map(|line| {
                if line.origins.is_empty() {
                    payload
                        .nodes_at(line.pc_offset)
                        .map(|node| Origin::in_phase(node, source.clone()))
                        .collect()
                } else {
                    Origins::new()
                }
            })
            .collect();
        let mut count = 0usize;
        for (line, origins) in payload.lines.iter_mut().zip(derived) {
            if !origins.is_empty() {
                count += 1;
                line.origins = origins;
            }
        }
        tracing::debug!(phase = index, lines = count, %source, "derived disassembly origins");
    }
}

#[cfg(test)]
mod tests;
