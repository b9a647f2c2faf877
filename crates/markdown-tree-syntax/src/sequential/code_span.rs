use std::ops::Range;

use super::{ParsingResult, SequentialNode, SequentialParser, TokensCache, indices_of, unclaimed};
use crate::syntax_kind::SyntaxKind;

/// `` `code` ``: a backtick run closed by the next run of equal length.
///
/// Code span content is never offered to later parsers.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeSpanParser;

impl SequentialParser for CodeSpanParser {
    fn parse(&self, cache: &TokensCache<'_>, ranges: &[Range<usize>]) -> ParsingResult {
        let space = indices_of(ranges);
        let mut claimed = vec![false; space.len()];
        let mut nodes = Vec::new();

        let mut pos = 0;
        while pos < space.len() {
            let open = space[pos];
            if cache.kind(open) != SyntaxKind::BACKTICK {
                pos += 1;
                continue;
            }
            let width = cache.token_text(open).len();
            let close = (pos + 1..space.len()).find(|&p| {
                cache.kind(space[p]) == SyntaxKind::BACKTICK
                    && cache.token_text(space[p]).len() == width
            });
            match close {
                Some(end) => {
                    nodes.push(SequentialNode::new(
                        open..space[end] + 1,
                        SyntaxKind::CODE_SPAN,
                    ));
                    claimed[pos..=end].iter_mut().for_each(|c| *c = true);
                    pos = end + 1;
                }
                None => pos += 1,
            }
        }

        ParsingResult {
            nodes,
            ranges_to_process_further: vec![unclaimed(&space, &claimed)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> ParsingResult {
        let cache = TokensCache::new(text, 0..text.len());
        CodeSpanParser.parse(&cache, &[0..cache.len()])
    }

    #[test]
    fn matches_equal_length_runs() {
        let result = parse("a ``b ` c`` d");
        assert_eq!(
            result.nodes,
            vec![SequentialNode::new(2..9, SyntaxKind::CODE_SPAN)]
        );
        assert_eq!(result.ranges_to_process_further, vec![vec![0..2, 9..11]]);
    }

    #[test]
    fn unmatched_backticks_stay_literal() {
        let result = parse("`a");
        assert!(result.nodes.is_empty());
        assert_eq!(result.ranges_to_process_further, vec![vec![0..2]]);
    }
}
