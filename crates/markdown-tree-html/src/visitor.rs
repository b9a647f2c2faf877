use log::debug;
use markdown_tree_syntax::{SyntaxElement, SyntaxKind, SyntaxNode};
use rowan::NodeOrToken;

use crate::provider::ProviderRegistry;

/// Walks a syntax tree, dispatching each element to its provider and
/// collecting the emitted HTML.
pub struct HtmlGeneratingVisitor<'r> {
    registry: &'r ProviderRegistry,
    html: String,
}

impl<'r> HtmlGeneratingVisitor<'r> {
    pub fn new(registry: &'r ProviderRegistry) -> Self {
        Self {
            registry,
            html: String::new(),
        }
    }

    pub fn consume_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    /// Render one element with its registered provider.
    ///
    /// Without a provider a node renders its children and a token renders
    /// its escaped text.
    pub fn visit_element(&mut self, element: &SyntaxElement) {
        let registry = self.registry;
        match registry.get(element.kind()) {
            Some(provider) => provider.process_node(self, element),
            None => {
                debug!("no provider for {:?}, using the default", element.kind());
                match element {
                    NodeOrToken::Node(node) => self.visit_children(node),
                    NodeOrToken::Token(token) => self.consume_html(&leaf_text(token.text())),
                }
            }
        }
    }

    pub fn visit_children(&mut self, node: &SyntaxNode) {
        for child in node.children_with_tokens() {
            self.visit_element(&child);
        }
    }

    /// Render the children of a block container, skipping block markup.
    pub fn visit_block_children(&mut self, node: &SyntaxNode) {
        for child in node.children_with_tokens() {
            if !is_block_markup(child.kind()) {
                self.visit_element(&child);
            }
        }
    }

    pub fn visit_all<I>(&mut self, elements: I)
    where
        I: IntoIterator<Item = SyntaxElement>,
    {
        for element in elements {
            self.visit_element(&element);
        }
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

/// Tokens that separate blocks but render nothing inside a container.
pub fn is_block_markup(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::WHITE_SPACE
            | SyntaxKind::EOL
            | SyntaxKind::QUOTE_MARKER
            | SyntaxKind::LIST_BULLET
            | SyntaxKind::LIST_NUMBER
    )
}

/// Token text escaped for HTML content.
pub fn leaf_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Remove up to `indent` columns of leading whitespace from every line.
///
/// Tabs advance to the next multiple of 4.
pub fn trim_indents(text: &str, indent: usize) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            let mut columns = 0;
            let mut cut = 0;
            for b in line.bytes() {
                if columns >= indent {
                    break;
                }
                match b {
                    b' ' => columns += 1,
                    b'\t' => columns += 4 - columns % 4,
                    _ => break,
                }
                cut += 1;
            }
            &line[cut..]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("    x = 1", 4, "x = 1")]
    #[case("  x", 4, "x")]
    #[case("      x", 4, "  x")]
    #[case("\tx", 4, "x")]
    #[case("  \tx", 2, "\tx")]
    #[case("x", 0, "x")]
    fn trims_up_to_indent(#[case] text: &str, #[case] indent: usize, #[case] expected: &str) {
        assert_eq!(trim_indents(text, indent), expected);
    }

    #[test]
    fn trims_every_line() {
        assert_eq!(trim_indents("  a\n   b\nc", 2), "a\n b\nc");
    }

    #[test]
    fn leaf_text_escapes() {
        assert_eq!(leaf_text("a < b & c"), "a &lt; b &amp; c");
    }

    #[test]
    fn missing_providers_fall_back() {
        let tree = markdown_tree_syntax::parse("*a* <b>\n");
        let registry = ProviderRegistry::empty();
        let mut visitor = HtmlGeneratingVisitor::new(&registry);
        visitor.visit_children(&tree);
        assert_eq!(visitor.into_html(), "*a* &lt;b&gt;\n");
    }
}
