use std::ops::Range;

use crate::lexer::{LexedToken, lex_range};
use crate::parser::builder::TokenSource;
use crate::syntax_kind::SyntaxKind;

/// The tokens of one inline range, in absolute byte offsets.
///
/// `>` tokens that continue a block quote are reclassified as
/// `QUOTE_MARKER` so the inline parsers can step over them.
#[derive(Debug, Clone)]
pub struct TokensCache<'a> {
    text: &'a str,
    range: Range<usize>,
    tokens: Vec<LexedToken>,
}

impl<'a> TokensCache<'a> {
    /// Lex `range`, reading every `>` whose preceding non-whitespace token is
    /// a line ending or another quote marker as a quote marker.
    pub fn new(text: &'a str, range: Range<usize>) -> Self {
        let mut tokens = lex_range(text, range.clone());
        let mut line_start = false;
        for token in &mut tokens {
            match token.kind {
                SyntaxKind::EOL | SyntaxKind::QUOTE_MARKER => line_start = true,
                SyntaxKind::WHITE_SPACE => {}
                SyntaxKind::GT if line_start => token.kind = SyntaxKind::QUOTE_MARKER,
                _ => line_start = false,
            }
            if token.kind == SyntaxKind::QUOTE_MARKER {
                line_start = true;
            }
        }
        Self {
            text,
            range,
            tokens,
        }
    }

    /// Lex `range`, reading only the `>` starting at one of `quote_markers`
    /// as a quote marker.
    pub fn with_quote_markers(text: &'a str, range: Range<usize>, quote_markers: &[usize]) -> Self {
        let mut tokens = lex_range(text, range.clone());
        for token in &mut tokens {
            if token.kind == SyntaxKind::GT && quote_markers.contains(&token.range.start) {
                token.kind = SyntaxKind::QUOTE_MARKER;
            }
        }
        Self {
            text,
            range,
            tokens,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn tokens(&self) -> &[LexedToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn kind(&self, index: usize) -> SyntaxKind {
        self.tokens
            .get(index)
            .map_or(SyntaxKind::EOF, |t| t.kind)
    }

    pub fn token_text(&self, index: usize) -> &'a str {
        self.tokens.get(index).map_or("", |t| t.text(self.text))
    }

    /// Byte range covered by the token index range `indices`.
    pub fn byte_range(&self, indices: Range<usize>) -> Range<usize> {
        let start = self
            .tokens
            .get(indices.start)
            .map_or(self.range.end, |t| t.range.start);
        let end = indices
            .end
            .checked_sub(1)
            .and_then(|last| self.tokens.get(last))
            .map_or(start, |t| t.range.end);
        start..end.max(start)
    }

    /// The character just before byte `offset`, or `None` at the start of
    /// the range.
    pub fn char_before(&self, offset: usize) -> Option<char> {
        if offset <= self.range.start {
            return None;
        }
        self.text[self.range.start..offset].chars().next_back()
    }

    /// The character at byte `offset`, or `None` at the end of the range.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset >= self.range.end {
            return None;
        }
        self.text[offset..self.range.end].chars().next()
    }
}

impl TokenSource for &TokensCache<'_> {
    fn tokens_in(&self, range: Range<usize>) -> Vec<LexedToken> {
        let first = self.tokens.partition_point(|t| t.range.start < range.start);
        self.tokens[first..]
            .iter()
            .take_while(|t| t.range.end <= range.end)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(cache: &TokensCache<'_>) -> Vec<SyntaxKind> {
        cache.tokens().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn reclassifies_line_leading_gt() {
        let text = "a\n> > b > c";
        let cache = TokensCache::new(text, 0..text.len());
        assert_eq!(
            kinds(&cache),
            vec![
                SyntaxKind::TEXT,
                SyntaxKind::EOL,
                SyntaxKind::QUOTE_MARKER,
                SyntaxKind::WHITE_SPACE,
                SyntaxKind::QUOTE_MARKER,
                SyntaxKind::WHITE_SPACE,
                SyntaxKind::TEXT,
                SyntaxKind::WHITE_SPACE,
                SyntaxKind::GT,
                SyntaxKind::WHITE_SPACE,
                SyntaxKind::TEXT,
            ]
        );
    }

    #[test]
    fn leading_gt_of_range_is_not_a_quote_marker() {
        let text = "> a";
        let cache = TokensCache::new(text, 0..text.len());
        assert_eq!(cache.kind(0), SyntaxKind::GT);
    }

    #[test]
    fn only_listed_gt_become_quote_markers() {
        let text = "a\n> b\n    > c";
        let cache = TokensCache::with_quote_markers(text, 0..text.len(), &[2]);
        let quote_markers: Vec<usize> = cache
            .tokens()
            .iter()
            .filter(|t| t.kind == SyntaxKind::QUOTE_MARKER)
            .map(|t| t.range.start)
            .collect();
        assert_eq!(quote_markers, vec![2]);
        assert_eq!(cache.kind(cache.len() - 3), SyntaxKind::GT);
    }

    #[test]
    fn byte_ranges_and_neighbours() {
        let text = "xx*ab*";
        let cache = TokensCache::new(text, 2..text.len());
        assert_eq!(cache.byte_range(0..3), 2..6);
        assert_eq!(cache.char_before(2), None);
        assert_eq!(cache.char_before(3), Some('*'));
        assert_eq!(cache.char_at(6), None);
    }

    #[test]
    fn token_source_slices_by_bytes() {
        let text = "a *b* c";
        let cache = TokensCache::new(text, 0..text.len());
        let slice = (&cache).tokens_in(2..5);
        assert_eq!(
            slice.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![SyntaxKind::STAR, SyntaxKind::TEXT, SyntaxKind::STAR]
        );
    }
}
