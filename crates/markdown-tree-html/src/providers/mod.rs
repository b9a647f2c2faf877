//! The standard generating providers.
//!
//! [`register_defaults`] installs one provider per syntax kind that needs
//! more than the fallback rendering.

mod code;
mod heading;
mod inline;
mod list;

pub use code::{CodeFenceProvider, CodeSpanProvider};
pub use heading::{AtxHeadingProvider, SetextHeadingProvider};
pub use inline::{AutolinkProvider, DelimitedProvider, ImageProvider, InlineLinkProvider};
pub use list::{ListItemProvider, ListProvider};

use markdown_tree_syntax::{SyntaxElement, SyntaxKind, SyntaxNode};
use rowan::NodeOrToken;

use crate::HtmlOptions;
use crate::provider::{GeneratingProvider, ProviderRegistry, TagProvider};
use crate::visitor::{HtmlGeneratingVisitor, is_block_markup, leaf_text};

pub fn register_defaults(registry: &mut ProviderRegistry, options: &HtmlOptions) {
    registry.register(SyntaxKind::MARKDOWN_FILE, BlockChildrenProvider);
    registry.register(SyntaxKind::PARAGRAPH, SimpleTagProvider::inline("p"));
    registry.register(SyntaxKind::BLOCK_QUOTE, SimpleTagProvider::block("blockquote"));
    registry.register(SyntaxKind::UNORDERED_LIST, ListProvider);
    registry.register(SyntaxKind::ORDERED_LIST, ListProvider);
    registry.register(SyntaxKind::LIST_ITEM, ListItemProvider);
    registry.register(SyntaxKind::THEMATIC_BREAK, FixedHtmlProvider("<hr />"));

    for level in 1..=6 {
        if let Some(kind) = SyntaxKind::atx_heading(level) {
            registry.register(kind, AtxHeadingProvider);
        }
    }
    registry.register(SyntaxKind::SETEXT_1, SetextHeadingProvider);
    registry.register(SyntaxKind::SETEXT_2, SetextHeadingProvider);
    registry.register(SyntaxKind::ATX_CONTENT, InlineHolderProvider);
    registry.register(SyntaxKind::SETEXT_CONTENT, InlineHolderProvider);

    registry.register(
        SyntaxKind::CODE_FENCE,
        CodeFenceProvider::new(&options.language_class_prefix, options.fence_indent_cap),
    );
    registry.register(SyntaxKind::CODE_SPAN, CodeSpanProvider);

    registry.register(SyntaxKind::EMPH, DelimitedProvider::new("em", 1));
    registry.register(SyntaxKind::STRONG, DelimitedProvider::new("strong", 2));
    registry.register(SyntaxKind::INLINE_LINK, InlineLinkProvider);
    registry.register(SyntaxKind::IMAGE, ImageProvider);
    registry.register(SyntaxKind::AUTOLINK, AutolinkProvider);

    registry.register(SyntaxKind::EOL, FixedHtmlProvider("\n"));
    registry.register(SyntaxKind::WHITE_SPACE, WhiteSpaceProvider);
    registry.register(SyntaxKind::QUOTE_MARKER, FixedHtmlProvider(""));
    registry.register(SyntaxKind::ESCAPED_CHAR, EscapedCharProvider);
    registry.register(SyntaxKind::ENTITY, VerbatimProvider);

    for kind in [
        SyntaxKind::TEXT,
        SyntaxKind::GT,
        SyntaxKind::LT,
        SyntaxKind::STAR,
        SyntaxKind::UNDERSCORE,
        SyntaxKind::BACKTICK,
        SyntaxKind::TILDE,
        SyntaxKind::HASH,
        SyntaxKind::DASH,
        SyntaxKind::PLUS,
        SyntaxKind::EXCLAMATION_MARK,
        SyntaxKind::LBRACKET,
        SyntaxKind::RBRACKET,
        SyntaxKind::LPAREN,
        SyntaxKind::RPAREN,
        SyntaxKind::DOUBLE_QUOTE,
    ] {
        registry.register(kind, LeafTextProvider);
    }
}

/// `<tag>` around all children, or only the non-markup ones for block
/// containers.
#[derive(Debug, Clone, Copy)]
pub struct SimpleTagProvider {
    tag: &'static str,
    block: bool,
}

impl SimpleTagProvider {
    pub fn inline(tag: &'static str) -> Self {
        Self { tag, block: false }
    }

    pub fn block(tag: &'static str) -> Self {
        Self { tag, block: true }
    }
}

impl TagProvider for SimpleTagProvider {
    fn open_tag(&self, _: &SyntaxElement) -> String {
        format!("<{}>", self.tag)
    }

    fn close_tag(&self, _: &SyntaxElement) -> String {
        format!("</{}>", self.tag)
    }

    fn children_to_render(&self, node: &SyntaxNode) -> Vec<SyntaxElement> {
        node.children_with_tokens()
            .filter(|c| !self.block || !is_block_markup(c.kind()))
            .collect()
    }
}

/// Block children without a surrounding tag.
#[derive(Debug, Clone, Copy)]
pub struct BlockChildrenProvider;

impl GeneratingProvider for BlockChildrenProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement) {
        if let NodeOrToken::Node(node) = element {
            visitor.visit_block_children(node);
        }
    }
}

/// Inline children without a surrounding tag. Also renders the paragraph of
/// a tight list item.
#[derive(Debug, Clone, Copy)]
pub struct InlineHolderProvider;

impl GeneratingProvider for InlineHolderProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement) {
        match element {
            NodeOrToken::Node(node) => visitor.visit_children(node),
            NodeOrToken::Token(token) => visitor.consume_html(&leaf_text(token.text())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LeafTextProvider;

impl GeneratingProvider for LeafTextProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement) {
        match element {
            NodeOrToken::Token(token) => visitor.consume_html(&leaf_text(token.text())),
            NodeOrToken::Node(node) => visitor.visit_children(node),
        }
    }
}

/// Emits the same HTML for every element.
#[derive(Debug, Clone, Copy)]
pub struct FixedHtmlProvider(pub &'static str);

impl GeneratingProvider for FixedHtmlProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, _: &SyntaxElement) {
        visitor.consume_html(self.0);
    }
}

/// Emits the source text unescaped.
#[derive(Debug, Clone, Copy)]
pub struct VerbatimProvider;

impl GeneratingProvider for VerbatimProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement) {
        match element {
            NodeOrToken::Token(token) => visitor.consume_html(token.text()),
            NodeOrToken::Node(node) => visitor.consume_html(&node.text().to_string()),
        }
    }
}

/// `\*` renders as `*`.
#[derive(Debug, Clone, Copy)]
pub struct EscapedCharProvider;

impl GeneratingProvider for EscapedCharProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement) {
        if let NodeOrToken::Token(token) = element {
            let text = token.text();
            visitor.consume_html(&leaf_text(text.strip_prefix('\\').unwrap_or(text)));
        }
    }
}

/// Whitespace inside inline content.
///
/// Indentation after a line break or a quote marker is dropped. Two or more
/// spaces before a line break make a hard break.
#[derive(Debug, Clone, Copy)]
pub struct WhiteSpaceProvider;

impl GeneratingProvider for WhiteSpaceProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement) {
        let NodeOrToken::Token(token) = element else {
            return;
        };
        let after_break = token.prev_sibling_or_token().is_some_and(|prev| {
            matches!(prev.kind(), SyntaxKind::EOL | SyntaxKind::QUOTE_MARKER)
        });
        if after_break {
            return;
        }
        let before_eol = token
            .next_sibling_or_token()
            .is_some_and(|next| next.kind() == SyntaxKind::EOL);
        if before_eol {
            if token.text().len() >= 2 {
                visitor.consume_html("<br />");
            }
            return;
        }
        visitor.consume_html(token.text());
    }
}

/// Child elements of `node` in `[from, to)`, empty when the range is empty,
/// inverted or out of bounds.
pub(crate) fn child_range(node: &SyntaxNode, from: usize, to: usize) -> Vec<SyntaxElement> {
    let children: Vec<SyntaxElement> = node.children_with_tokens().collect();
    if from >= to || to > children.len() {
        return Vec::new();
    }
    children[from..to].to_vec()
}
