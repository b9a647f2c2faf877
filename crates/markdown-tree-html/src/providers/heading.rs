use markdown_tree_syntax::{SyntaxElement, SyntaxKind, SyntaxNode};

use super::child_range;
use crate::provider::TagProvider;

fn heading_tag(element: &SyntaxElement) -> usize {
    element.kind().heading_level().unwrap_or(1)
}

/// `<hN>` for ATX headings, without the opening run, the optional closing run
/// and the whitespace next to them.
#[derive(Debug, Clone, Copy)]
pub struct AtxHeadingProvider;

impl TagProvider for AtxHeadingProvider {
    fn open_tag(&self, element: &SyntaxElement) -> String {
        format!("<h{}>", heading_tag(element))
    }

    fn close_tag(&self, element: &SyntaxElement) -> String {
        format!("</h{}>", heading_tag(element))
    }

    fn children_to_render(&self, node: &SyntaxNode) -> Vec<SyntaxElement> {
        let kinds: Vec<SyntaxKind> = node.children_with_tokens().map(|c| c.kind()).collect();
        let len = kinds.len();

        let mut from = 1;
        if len >= 2 && kinds[1] == SyntaxKind::WHITE_SPACE {
            from += 1;
        }

        let mut to = len;
        if len > 1 && kinds[len - 1] == SyntaxKind::ATX_HEADER {
            to -= 1;
            if len > 3 && kinds[len - 2] == SyntaxKind::WHITE_SPACE {
                to -= 1;
            }
        }

        child_range(node, from, to)
    }
}

/// `<h1>` or `<h2>` around the heading content; the underline is dropped.
#[derive(Debug, Clone, Copy)]
pub struct SetextHeadingProvider;

impl TagProvider for SetextHeadingProvider {
    fn open_tag(&self, element: &SyntaxElement) -> String {
        format!("<h{}>", heading_tag(element))
    }

    fn close_tag(&self, element: &SyntaxElement) -> String {
        format!("</h{}>", heading_tag(element))
    }

    fn children_to_render(&self, node: &SyntaxNode) -> Vec<SyntaxElement> {
        node.children_with_tokens()
            .filter(|c| c.kind() == SyntaxKind::SETEXT_CONTENT)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::markdown_to_html;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("# Title #\n", "<h1>Title</h1>")]
    #[case("# #\n", "<h1></h1>")]
    #[case("#\n", "<h1></h1>")]
    #[case("### a\n", "<h3>a</h3>")]
    #[case("## a ##   \n", "<h2>a</h2>")]
    #[case("# a#\n", "<h1>a#</h1>")]
    #[case("#    *a*\n", "<h1><em>a</em></h1>")]
    fn atx_heading_trims_markers(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(markdown_to_html(input), expected);
    }

    #[test]
    fn setext_headings() {
        assert_eq!(markdown_to_html("One\n===\n"), "<h1>One</h1>");
        assert_eq!(markdown_to_html("Two\n---\n"), "<h2>Two</h2>");
    }
}
