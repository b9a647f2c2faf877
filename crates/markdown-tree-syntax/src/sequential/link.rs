use std::ops::Range;

use super::{
    ParsingResult, SequentialNode, SequentialParser, TokensCache, indices_of, ranges_from_indices,
    unclaimed,
};
use crate::syntax_kind::SyntaxKind;

/// `[text](destination "title")` and `![alt](source "title")`.
///
/// The bracketed text is offered to later parsers as its own parse space,
/// so emphasis can nest inside link text but never cross its brackets.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineLinkParser;

/// Parentheses nested deeper than this end a destination unrecognized.
const MAX_PAREN_NESTING: usize = 32;

/// Positions (into the parse space) of one recognized link.
struct LinkParts {
    start: usize,
    text_open: usize,
    text_close: usize,
    destination: Option<(usize, usize)>,
    title: Option<(usize, usize)>,
    end: usize,
}

impl SequentialParser for InlineLinkParser {
    fn parse(&self, cache: &TokensCache<'_>, ranges: &[Range<usize>]) -> ParsingResult {
        let space = indices_of(ranges);
        let mut claimed = vec![false; space.len()];
        let mut result = ParsingResult::default();
        let closers = matching_brackets(cache, &space);

        let mut pos = 0;
        while pos < space.len() {
            if cache.kind(space[pos]) != SyntaxKind::LBRACKET {
                pos += 1;
                continue;
            }
            let Some(parts) = parse_link(cache, &space, &claimed, &closers, pos) else {
                pos += 1;
                continue;
            };

            let is_image = parts.start != parts.text_open;
            let kind = if is_image {
                SyntaxKind::IMAGE
            } else {
                SyntaxKind::INLINE_LINK
            };
            result.nodes.push(SequentialNode::new(
                space[parts.start]..space[parts.end] + 1,
                kind,
            ));
            result.nodes.push(SequentialNode::new(
                space[parts.text_open]..space[parts.text_close] + 1,
                SyntaxKind::LINK_TEXT,
            ));
            if let Some((from, to)) = parts.destination {
                result.nodes.push(SequentialNode::new(
                    space[from]..space[to - 1] + 1,
                    SyntaxKind::LINK_DESTINATION,
                ));
            }
            if let Some((from, to)) = parts.title {
                result.nodes.push(SequentialNode::new(
                    space[from]..space[to] + 1,
                    SyntaxKind::LINK_TITLE,
                ));
            }

            let interior = ranges_from_indices(&space[parts.text_open + 1..parts.text_close]);
            if !interior.is_empty() {
                result.ranges_to_process_further.push(interior);
            }
            claimed[parts.start..=parts.end]
                .iter_mut()
                .for_each(|c| *c = true);
            pos = parts.end + 1;
        }

        result
            .ranges_to_process_further
            .insert(0, unclaimed(&space, &claimed));
        result
    }
}

/// For every `[` in the parse space, the position of its balancing `]`.
fn matching_brackets(cache: &TokensCache<'_>, space: &[usize]) -> Vec<Option<usize>> {
    let mut closers = vec![None; space.len()];
    let mut open = Vec::new();
    for (p, &i) in space.iter().enumerate() {
        match cache.kind(i) {
            SyntaxKind::LBRACKET => open.push(p),
            SyntaxKind::RBRACKET => {
                if let Some(o) = open.pop() {
                    closers[o] = Some(p);
                }
            }
            _ => {}
        }
    }
    closers
}

fn parse_link(
    cache: &TokensCache<'_>,
    space: &[usize],
    claimed: &[bool],
    closers: &[Option<usize>],
    open: usize,
) -> Option<LinkParts> {
    let kind = |p: usize| space.get(p).map_or(SyntaxKind::EOF, |&i| cache.kind(i));
    let adjacent = |a: usize, b: usize| space[b] == space[a] + 1;

    let start = if open > 0
        && kind(open - 1) == SyntaxKind::EXCLAMATION_MARK
        && adjacent(open - 1, open)
        && !claimed[open - 1]
    {
        open - 1
    } else {
        open
    };

    let text_close = closers[open]?;

    let paren = text_close + 1;
    if kind(paren) != SyntaxKind::LPAREN || !adjacent(text_close, paren) {
        return None;
    }

    let skip_space = |mut p: usize| {
        while matches!(kind(p), SyntaxKind::WHITE_SPACE | SyntaxKind::EOL) {
            p += 1;
        }
        p
    };

    let mut p = skip_space(paren + 1);
    let dest_start = p;
    let mut nesting = 0usize;
    loop {
        match kind(p) {
            SyntaxKind::WHITE_SPACE | SyntaxKind::EOL | SyntaxKind::EOF => break,
            SyntaxKind::LPAREN if nesting == MAX_PAREN_NESTING => return None,
            SyntaxKind::LPAREN => nesting += 1,
            SyntaxKind::RPAREN if nesting == 0 => break,
            SyntaxKind::RPAREN => nesting -= 1,
            _ => {}
        }
        p += 1;
    }
    let destination = (p > dest_start).then_some((dest_start, p));

    p = skip_space(p);
    let mut title = None;
    if kind(p) == SyntaxKind::DOUBLE_QUOTE {
        let title_open = p;
        p += 1;
        while !matches!(kind(p), SyntaxKind::DOUBLE_QUOTE | SyntaxKind::EOF) {
            p += 1;
        }
        if kind(p) != SyntaxKind::DOUBLE_QUOTE {
            return None;
        }
        title = Some((title_open, p));
        p = skip_space(p + 1);
    }

    if kind(p) != SyntaxKind::RPAREN {
        return None;
    }

    Some(LinkParts {
        start,
        text_open: open,
        text_close,
        destination,
        title,
        end: p,
    })
}
