use std::ops::Range;

use super::{ParsingResult, SequentialNode, SequentialParser, TokensCache, indices_of};
use crate::syntax_kind::SyntaxKind;

/// `*em*`, `_em_`, `**strong**` and `__strong__`.
///
/// Implements the delimiter-run algorithm: runs of `*` or `_` are
/// classified as left- and right-flanking from their neighbouring
/// characters, then closers are matched against the nearest compatible
/// opener. Two delimiters from each side make a `STRONG` node, one makes an
/// `EMPH` node.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmphStrongParser;

#[derive(Debug)]
struct Delimiter {
    marker: SyntaxKind,
    /// Token indices still available in this run, in source order.
    tokens: Vec<usize>,
    original_len: usize,
    can_open: bool,
    can_close: bool,
}

impl SequentialParser for EmphStrongParser {
    fn parse(&self, cache: &TokensCache<'_>, ranges: &[Range<usize>]) -> ParsingResult {
        let space = indices_of(ranges);
        let mut delimiters = collect_delimiters(cache, &space);
        let mut nodes = Vec::new();

        let mut closer = 0;
        while closer < delimiters.len() {
            if !delimiters[closer].can_close || delimiters[closer].tokens.is_empty() {
                closer += 1;
                continue;
            }

            let Some(opener) = find_opener(&delimiters, closer) else {
                if !delimiters[closer].can_open {
                    delimiters[closer].tokens.clear();
                }
                closer += 1;
                continue;
            };

            let used = if delimiters[opener].tokens.len() >= 2 && delimiters[closer].tokens.len() >= 2
            {
                2
            } else {
                1
            };
            let kind = if used == 2 {
                SyntaxKind::STRONG
            } else {
                SyntaxKind::EMPH
            };

            let open_tokens = &mut delimiters[opener].tokens;
            let open_start = open_tokens[open_tokens.len() - used];
            open_tokens.truncate(open_tokens.len() - used);

            let close_tokens = &mut delimiters[closer].tokens;
            let close_end = close_tokens[used - 1];
            close_tokens.drain(..used);

            nodes.push(SequentialNode::new(open_start..close_end + 1, kind));

            // Delimiters between the pair can no longer match anything.
            for between in &mut delimiters[opener + 1..closer] {
                between.tokens.clear();
            }
        }

        ParsingResult {
            nodes,
            ranges_to_process_further: Vec::new(),
        }
    }
}

fn find_opener(delimiters: &[Delimiter], closer: usize) -> Option<usize> {
    let close = &delimiters[closer];
    (0..closer).rev().find(|&i| {
        let open = &delimiters[i];
        if open.marker != close.marker || !open.can_open || open.tokens.is_empty() {
            return false;
        }
        // The rule of 3: a delimiter that can both open and close only
        // pairs up when the run lengths do not sum to a multiple of 3.
        let both = open.can_close || close.can_open;
        let sum = open.original_len + close.original_len;
        !(both && sum % 3 == 0 && !(open.original_len % 3 == 0 && close.original_len % 3 == 0))
    })
}

fn collect_delimiters(cache: &TokensCache<'_>, space: &[usize]) -> Vec<Delimiter> {
    let mut delimiters = Vec::new();
    let mut p = 0;
    while p < space.len() {
        let marker = cache.kind(space[p]);
        if !matches!(marker, SyntaxKind::STAR | SyntaxKind::UNDERSCORE) {
            p += 1;
            continue;
        }
        let mut tokens = vec![space[p]];
        while p + 1 < space.len()
            && space[p + 1] == space[p] + 1
            && cache.kind(space[p + 1]) == marker
        {
            p += 1;
            tokens.push(space[p]);
        }
        p += 1;

        let first = &cache.tokens()[tokens[0]];
        let last = &cache.tokens()[tokens[tokens.len() - 1]];
        let before = cache.char_before(first.range.start);
        let after = cache.char_at(last.range.end);
        let (left, right) = flanking(before, after);
        let (can_open, can_close) = if marker == SyntaxKind::UNDERSCORE {
            (
                left && (!right || before.is_some_and(is_punctuation)),
                right && (!left || after.is_some_and(is_punctuation)),
            )
        } else {
            (left, right)
        };

        delimiters.push(Delimiter {
            marker,
            original_len: tokens.len(),
            tokens,
            can_open,
            can_close,
        });
    }
    delimiters
}

/// Left- and right-flanking classification of a delimiter run.
fn flanking(before: Option<char>, after: Option<char>) -> (bool, bool) {
    let ws_before = before.is_none_or(char::is_whitespace);
    let ws_after = after.is_none_or(char::is_whitespace);
    let punct_before = before.is_some_and(is_punctuation);
    let punct_after = after.is_some_and(is_punctuation);

    let left = !ws_after && (!punct_after || ws_before || punct_before);
    let right = !ws_before && (!punct_before || ws_after || punct_after);
    (left, right)
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
}
