//! # Sequential inline parsing
//!
//! Inline constructs are recognized by an ordered pipeline of
//! [`SequentialParser`]s working on token indices of a [`TokensCache`].
//!
//! A parser receives a *parse space*: a list of token index ranges glued
//! together into one stream. Quote markers and anything claimed by an
//! earlier parser are already cut out of it. The parser returns the
//! nodes it recognized and the parse spaces that later parsers should
//! see. Those are usually the unclaimed remainder, plus the interiors of
//! constructs that may contain further inlines.
//!
//! ```text
//! [*a* `b*` [c](d)]
//!   CodeSpanParser    claims `b*`             -> remainder
//!   AutolinkParser    nothing                 -> remainder
//!   InlineLinkParser  claims [c](d)           -> remainder + "c"
//!   EmphStrongParser  *a* in the remainder, nothing in "c"
//! ```

use std::cmp::Reverse;
use std::ops::Range;

use crate::syntax_kind::SyntaxKind;

mod autolink;
mod code_span;
mod emphasis;
mod link;
pub mod tokens_cache;

pub use autolink::AutolinkParser;
pub use code_span::CodeSpanParser;
pub use emphasis::EmphStrongParser;
pub use link::InlineLinkParser;
pub use tokens_cache::TokensCache;

/// A recognized inline node over the token index range `range`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequentialNode {
    pub range: Range<usize>,
    pub kind: SyntaxKind,
}

impl SequentialNode {
    pub fn new(range: Range<usize>, kind: SyntaxKind) -> Self {
        Self { range, kind }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsingResult {
    pub nodes: Vec<SequentialNode>,
    pub ranges_to_process_further: Vec<Vec<Range<usize>>>,
}

pub trait SequentialParser {
    fn parse(&self, cache: &TokensCache<'_>, ranges: &[Range<usize>]) -> ParsingResult;
}

/// The recognizers run for every inline range, in order.
pub fn default_parsers() -> Vec<Box<dyn SequentialParser>> {
    vec![
        Box::new(CodeSpanParser),
        Box::new(AutolinkParser),
        Box::new(InlineLinkParser),
        Box::new(EmphStrongParser),
    ]
}

/// Feed `ranges` through every parser in order.
pub fn run_parsing_sequence(
    cache: &TokensCache<'_>,
    ranges: Vec<Range<usize>>,
    parsers: &[Box<dyn SequentialParser>],
) -> Vec<SequentialNode> {
    let mut nodes = Vec::new();
    let mut spaces = vec![ranges];

    for parser in parsers {
        let mut next = Vec::new();
        for space in spaces.iter().filter(|s| !s.is_empty()) {
            let result = parser.parse(cache, space);
            nodes.extend(result.nodes);
            next.extend(result.ranges_to_process_further);
        }
        spaces = next;
    }

    nodes
}

/// Keep the nodes nested at most `max_depth` constructs deep.
///
/// Link text, destination and title do not add a level of their own. A
/// dropped node takes all nodes inside it along, and their tokens stay in
/// the tree as plain text.
pub fn limit_nesting(mut nodes: Vec<SequentialNode>, max_depth: usize) -> Vec<SequentialNode> {
    nodes.sort_by_key(|n| (n.range.start, Reverse(n.range.end)));

    // (end, depth, kept) of the enclosing nodes.
    let mut open: Vec<(usize, usize, bool)> = Vec::new();
    let mut kept = Vec::with_capacity(nodes.len());
    let mut dropped = 0;
    for node in nodes {
        while open.last().is_some_and(|&(end, ..)| end <= node.range.start) {
            open.pop();
        }
        let (parent_depth, parent_kept) = open.last().map_or((0, true), |&(_, d, k)| (d, k));
        let depth = parent_depth + usize::from(!is_link_part(node.kind));
        let keep = parent_kept && depth <= max_depth;
        open.push((node.range.end, depth, keep));
        if keep {
            kept.push(node);
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        log::warn!("inline nesting deeper than {max_depth}, {dropped} nodes left as text");
    }
    kept
}

fn is_link_part(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::LINK_TEXT | SyntaxKind::LINK_DESTINATION | SyntaxKind::LINK_TITLE
    )
}

/// Split `range` into runs that skip `QUOTE_MARKER` tokens.
pub fn filter_block_quotes(cache: &TokensCache<'_>, range: Range<usize>) -> Vec<Range<usize>> {
    let indices: Vec<usize> = range
        .filter(|&i| cache.kind(i) != SyntaxKind::QUOTE_MARKER)
        .collect();
    ranges_from_indices(&indices)
}

/// Flatten a parse space into its token indices.
pub(crate) fn indices_of(ranges: &[Range<usize>]) -> Vec<usize> {
    ranges.iter().flat_map(|r| r.clone()).collect()
}

/// Group ascending token indices into maximal consecutive ranges.
pub(crate) fn ranges_from_indices(indices: &[usize]) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for &index in indices {
        match ranges.last_mut() {
            Some(last) if last.end == index => last.end = index + 1,
            _ => ranges.push(index..index + 1),
        }
    }
    ranges
}

/// Indices of `space` not marked in `claimed`, as a parse space.
pub(crate) fn unclaimed(space: &[usize], claimed: &[bool]) -> Vec<Range<usize>> {
    let rest: Vec<usize> = space
        .iter()
        .zip(claimed)
        .filter(|(_, c)| !**c)
        .map(|(i, _)| *i)
        .collect();
    ranges_from_indices(&rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn recognize(text: &str) -> Vec<(SyntaxKind, String)> {
        let cache = TokensCache::new(text, 0..text.len());
        let ranges = filter_block_quotes(&cache, 0..cache.len());
        let mut nodes = run_parsing_sequence(&cache, ranges, &default_parsers());
        nodes.sort_by_key(|n| (n.range.start, std::cmp::Reverse(n.range.end)));
        nodes
            .into_iter()
            .map(|n| (n.kind, text[cache.byte_range(n.range)].to_string()))
            .collect()
    }

    #[test]
    fn ranges_from_indices_groups_runs() {
        assert_eq!(ranges_from_indices(&[0, 1, 2, 5, 6, 9]), vec![0..3, 5..7, 9..10]);
        assert_eq!(ranges_from_indices(&[]), Vec::<Range<usize>>::new());
    }

    #[test]
    fn quote_markers_are_cut_out() {
        let text = "a\n> b";
        let cache = TokensCache::new(text, 0..text.len());
        assert_eq!(filter_block_quotes(&cache, 0..cache.len()), vec![0..2, 3..5]);
    }

    #[test]
    fn code_spans_shield_emphasis() {
        assert_eq!(
            recognize("*a `b*` c*"),
            vec![
                (SyntaxKind::EMPH, "*a `b*` c*".to_string()),
                (SyntaxKind::CODE_SPAN, "`b*`".to_string()),
            ]
        );
    }

    #[test]
    fn emphasis_inside_link_text() {
        assert_eq!(
            recognize("[*a*](b)"),
            vec![
                (SyntaxKind::INLINE_LINK, "[*a*](b)".to_string()),
                (SyntaxKind::LINK_TEXT, "[*a*]".to_string()),
                (SyntaxKind::EMPH, "*a*".to_string()),
                (SyntaxKind::LINK_DESTINATION, "b".to_string()),
            ]
        );
    }

    #[test]
    fn emphasis_does_not_cross_link_text() {
        assert_eq!(
            recognize("*a [b*](c)"),
            vec![
                (SyntaxKind::INLINE_LINK, "[b*](c)".to_string()),
                (SyntaxKind::LINK_TEXT, "[b*]".to_string()),
                (SyntaxKind::LINK_DESTINATION, "c".to_string()),
            ]
        );
    }

    fn kinds_within(text: &str, max_depth: usize) -> Vec<SyntaxKind> {
        let cache = TokensCache::new(text, 0..text.len());
        let ranges = filter_block_quotes(&cache, 0..cache.len());
        let nodes = run_parsing_sequence(&cache, ranges, &default_parsers());
        limit_nesting(nodes, max_depth)
            .into_iter()
            .map(|n| n.kind)
            .collect()
    }

    #[test]
    fn nesting_limit_keeps_outer_constructs() {
        assert_eq!(kinds_within("***a***", 1), vec![SyntaxKind::EMPH]);
        assert_eq!(
            kinds_within("***a***", 2),
            vec![SyntaxKind::EMPH, SyntaxKind::STRONG]
        );
    }

    #[test]
    fn link_parts_do_not_count_as_levels() {
        assert_eq!(
            kinds_within("[*a*](b)", 1),
            vec![
                SyntaxKind::INLINE_LINK,
                SyntaxKind::LINK_TEXT,
                SyntaxKind::LINK_DESTINATION,
            ]
        );
    }

    #[test]
    fn emphasis_spans_quote_continuation() {
        assert_eq!(
            recognize("*a\n> b*"),
            vec![(SyntaxKind::EMPH, "*a\n> b*".to_string())]
        );
    }
}
