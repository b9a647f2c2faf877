use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::{ParsingResult, SequentialNode, SequentialParser, TokensCache, indices_of, unclaimed};
use crate::syntax_kind::SyntaxKind;

static URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]{1,31}:[^\s<>]*$").unwrap());

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~\-]+@[A-Za-z0-9]([A-Za-z0-9\-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9\-]{0,61}[A-Za-z0-9])?)*$",
    )
    .unwrap()
});

/// Whether `target` (the text between `<` and `>`) is an absolute URI or an
/// email address.
pub fn is_autolink_target(target: &str) -> bool {
    URI.is_match(target) || EMAIL.is_match(target)
}

/// `<scheme:rest>` and `<local@domain>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutolinkParser;

impl SequentialParser for AutolinkParser {
    fn parse(&self, cache: &TokensCache<'_>, ranges: &[Range<usize>]) -> ParsingResult {
        let space = indices_of(ranges);
        let mut claimed = vec![false; space.len()];
        let mut nodes = Vec::new();

        let mut pos = 0;
        while pos < space.len() {
            if cache.kind(space[pos]) != SyntaxKind::LT {
                pos += 1;
                continue;
            }
            match find_close(cache, &space, pos) {
                Some(end) => {
                    nodes.push(SequentialNode::new(
                        space[pos]..space[end] + 1,
                        SyntaxKind::AUTOLINK,
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

fn find_close(cache: &TokensCache<'_>, space: &[usize], open: usize) -> Option<usize> {
    let mut target = String::new();
    for p in open + 1..space.len() {
        // The whole autolink must be contiguous in the source.
        if space[p] != space[p - 1] + 1 {
            return None;
        }
        match cache.kind(space[p]) {
            SyntaxKind::GT => return is_autolink_target(&target).then_some(p),
            SyntaxKind::LT | SyntaxKind::WHITE_SPACE | SyntaxKind::EOL => return None,
            _ => target.push_str(cache.token_text(space[p])),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com/a?b=c", true)]
    #[case("mailto:me@example.com", true)]
    #[case("me@example.com", true)]
    #[case("a:b", false)]
    #[case("no scheme", false)]
    #[case("example.com", false)]
    fn autolink_targets(#[case] target: &str, #[case] expected: bool) {
        assert_eq!(is_autolink_target(target), expected);
    }

    #[test]
    fn claims_the_whole_autolink() {
        let text = "see <https://x.org> now";
        let cache = TokensCache::new(text, 0..text.len());
        let result = AutolinkParser.parse(&cache, &[0..cache.len()]);
        assert_eq!(result.nodes.len(), 1);
        assert_eq!(&text[cache.byte_range(result.nodes[0].range.clone())], "<https://x.org>");
    }

    #[test]
    fn rejects_whitespace() {
        let text = "<https://x.org and>";
        let cache = TokensCache::new(text, 0..text.len());
        let result = AutolinkParser.parse(&cache, &[0..cache.len()]);
        assert!(result.nodes.is_empty());
    }
}
