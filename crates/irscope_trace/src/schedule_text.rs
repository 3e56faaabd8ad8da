//! Parser for the compiler's textual schedule listing.
//!
//! The listing is a sequence of blocks, each opened by a header line and
//! holding one node per line, optionally closed by a terminator line:
//!
//! ```text
//! --- BLOCK B0 ---
//!   0: Start
//!   3: Parameter[0](0)
//! Goto -> B1
//! --- BLOCK B1 (deferred) <- B0, B2 ---
//!   7: Phi(3, 9) : Number
//!   8: Branch(7) -> B2, B3
//! ```
//!
//! Lines are tokenized with `logos`. Unrecognized characters (operator
//! parameters can contain arbitrary text) are skipped rather than rejected;
//! only structural problems make the phase fail.

use irscope_ir::{Block, BlockId, GraphPayload, Node, NodeFlags, NodeId};
use logos::Logos;
use rustc_hash::FxHashMap;

use crate::ParseError;

/// Token of one schedule line.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
enum ScheduleToken {
    #[regex(r"-{3,}")]
    Dashes,

    #[token("BLOCK")]
    Block,

    #[regex(r"B[0-9]+", |lex| lex.slice()[1..].parse::<u32>().ok(), priority = 10)]
    BlockRef(u32),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u32>().ok())]
    Int(u32),

    #[token(":")]
    Colon,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token("->")]
    Arrow,

    #[token("<-")]
    BackArrow,

    /// Operator parameter list, e.g. `[kRepTagged]`.
    #[regex(r"\[[^\]\n]*\]")]
    Param,

    #[regex(r"[A-Za-z_][A-Za-z0-9_.]*")]
    Ident,
}

/// A token with its byte range in the line.
type Spanned = (ScheduleToken, std::ops::Range<usize>);

fn lex_line(line: &str) -> Vec<Spanned> {
    ScheduleToken::lexer(line)
        .spanned()
        .filter_map(|(token, span)| token.ok().map(|t| (t, span)))
        .collect()
}

/// Block refs following the first token matching `marker`.
fn refs_after(tokens: &[Spanned], marker: ScheduleToken) -> Vec<BlockId> {
    tokens
        .iter()
        .skip_while(|(t, _)| *t != marker)
        .filter_map(|(t, _)| match t {
            ScheduleToken::BlockRef(id) => Some(BlockId::new(*id)),
            _ => None,
        })
        .collect()
}

/// Parse a textual schedule into a graph payload with blocks.
pub(crate) fn parse_schedule_text(text: &str) -> Result<GraphPayload, ParseError> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut nodes: Vec<Node> = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let tokens = lex_line(line);
        match tokens.first() {
            Some((ScheduleToken::Dashes, _)) => {
                blocks.push(parse_header(&tokens, line, line_no)?);
            }
            Some((ScheduleToken::Int(_), _))
                if matches!(tokens.get(1), Some((ScheduleToken::Colon, _))) =>
            {
                let Some(block) = blocks.last_mut() else {
                    return Err(ParseError::Schedule {
                        line: line_no,
                        message: "node listed before any block header".to_string(),
                    });
                };
                let (mut node, successors) = parse_node_line(&tokens, line);
                if block.nodes.is_empty() {
                    node.flags |= NodeFlags::BLOCK_START;
                }
                block.nodes.push(node.id);
                block.successors.extend(successors);
                nodes.push(node);
            }
            Some(_) => {
                // Terminator without a node id, e.g. `Goto -> B1`.
                let successors = refs_after(&tokens, ScheduleToken::Arrow);
                if !successors.is_empty() {
                    let Some(block) = blocks.last_mut() else {
                        return Err(ParseError::Schedule {
                            line: line_no,
                            message: "terminator listed before any block header".to_string(),
                        });
                    };
                    block.successors.extend(successors);
                }
            }
            None => {}
        }
    }

    if blocks.is_empty() {
        return Err(ParseError::MissingBlocks { kind: "schedule" });
    }
    complete_cfg(&mut blocks);

    tracing::debug!(
        blocks = blocks.len(),
        nodes = nodes.len(),
        "parsed textual schedule"
    );
    Ok(GraphPayload::from_inputs(
        nodes,
        blocks,
        &FxHashMap::default(),
    )?)
}

fn parse_header(tokens: &[Spanned], line: &str, line_no: usize) -> Result<Block, ParseError> {
    let id = match (tokens.get(1), tokens.get(2)) {
        (Some((ScheduleToken::Block, _)), Some((ScheduleToken::BlockRef(id), _))) => *id,
        _ => {
            return Err(ParseError::Schedule {
                line: line_no,
                message: format!("malformed block header `{}`", line.trim()),
            })
        }
    };
    let deferred = tokens
        .iter()
        .any(|(t, span)| *t == ScheduleToken::Ident && &line[span.clone()] == "deferred");
    Ok(Block {
        deferred,
        predecessors: refs_after(tokens, ScheduleToken::BackArrow),
        ..Block::new(BlockId::new(id))
    })
}

/// Parse `id: Op[params](inputs) : Type -> succs`.
///
/// The caller has checked that the line starts with `Int Colon`.
fn parse_node_line(tokens: &[Spanned], line: &str) -> (Node, Vec<BlockId>) {
    let id = match tokens[0].0 {
        ScheduleToken::Int(id) => id,
        _ => 0,
    };
    let rest_start = tokens[1].1.end;
    let arrow = tokens.iter().position(|(t, _)| *t == ScheduleToken::Arrow);
    let rest_end = arrow.map_or(line.len(), |pos| tokens[pos].1.start);
    let rest = line[rest_start..rest_end].trim();

    let opcode = tokens[2..]
        .iter()
        .find(|(t, _)| *t == ScheduleToken::Ident)
        .map_or("Unknown", |(_, span)| &line[span.clone()]);

    // Inputs are the integers inside the first top-level parenthesis group.
    let mut inputs = Vec::new();
    let mut depth = 0usize;
    let mut group_end = None;
    for (pos, (token, _)) in tokens.iter().enumerate().skip(2) {
        match token {
            ScheduleToken::LParen => depth += 1,
            ScheduleToken::RParen if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    group_end = Some(pos);
                    break;
                }
            }
            ScheduleToken::Int(input) if depth == 1 => inputs.push(NodeId::new(*input)),
            ScheduleToken::Arrow => break,
            _ => {}
        }
    }

    let output_type = group_end
        .and_then(|pos| tokens.get(pos + 1))
        .filter(|(t, _)| *t == ScheduleToken::Colon)
        .map(|(_, span)| line[span.end..rest_end].trim().to_string())
        .filter(|ty| !ty.is_empty());

    let successors = refs_after(tokens, ScheduleToken::Arrow);
    let mut node = Node::new(NodeId::new(id), opcode)
        .with_inputs(inputs)
        .with_label(format!("{id}: {rest}"));
    node.output_type = output_type;
    if !successors.is_empty() {
        node.flags |= NodeFlags::CONTROL;
    }
    (node, successors)
}

/// Fill in whichever side of the block CFG the listing left out.
///
/// Listings usually print both `<-` predecessor lists and terminators; when
/// only one side is present the other is derived from it.
fn complete_cfg(blocks: &mut [Block]) {
    for block in blocks.iter_mut() {
        dedup_in_order(&mut block.successors);
        dedup_in_order(&mut block.predecessors);
    }

    let has_preds = blocks.iter().any(|b| !b.predecessors.is_empty());
    let has_succs = blocks.iter().any(|b| !b.successors.is_empty());
    let position: FxHashMap<BlockId, usize> =
        blocks.iter().enumerate().map(|(i, b)| (b.id, i)).collect();

    if has_succs && !has_preds {
        let edges: Vec<(BlockId, BlockId)> = blocks
            .iter()
            .flat_map(|b| b.successors.iter().map(move |&s| (b.id, s)))
            .collect();
        for (from, to) in edges {
            if let Some(&idx) = position.get(&to) {
                blocks[idx].predecessors.push(from);
            }
        }
    } else if has_preds && !has_succs {
        let edges: Vec<(BlockId, BlockId)> = blocks
            .iter()
            .flat_map(|b| b.predecessors.iter().map(move |&p| (p, b.id)))
            .collect();
        for (from, to) in edges {
            if let Some(&idx) = position.get(&from) {
                blocks[idx].successors.push(to);
            }
        }
    }
}

fn dedup_in_order(ids: &mut Vec<BlockId>) {
    let mut seen = rustc_hash::FxHashSet::default();
    ids.retain(|id| seen.insert(*id));
}
