//! # markdown-tree-html
//!
//! HTML generation for `markdown-tree-syntax` trees.
//!
//! Rendering is driven by a [`ProviderRegistry`] that maps each
//! [`SyntaxKind`](markdown_tree_syntax::SyntaxKind) to a
//! [`GeneratingProvider`]. The [`HtmlGeneratingVisitor`] walks the tree and
//! asks the provider of every element to emit its HTML. Kinds without a
//! provider fall back to their children (nodes) or their escaped text
//! (tokens), so any tree renders.
//!
//! ```
//! use markdown_tree_html::markdown_to_html;
//!
//! assert_eq!(markdown_to_html("# Title #\n"), "<h1>Title</h1>");
//! assert_eq!(
//!     markdown_to_html("- a\n- b\n"),
//!     "<ul><li>a</li><li>b</li></ul>"
//! );
//! ```
//!
//! ## Custom providers
//!
//! ```
//! use markdown_tree_html::{HtmlGenerator, ProviderRegistry, TagProvider};
//! use markdown_tree_syntax::{SyntaxElement, SyntaxKind, parse};
//!
//! struct Italic;
//!
//! impl TagProvider for Italic {
//!     fn open_tag(&self, _: &SyntaxElement) -> String {
//!         "<i>".into()
//!     }
//!     fn close_tag(&self, _: &SyntaxElement) -> String {
//!         "</i>".into()
//!     }
//! }
//!
//! let mut registry = ProviderRegistry::default();
//! registry.register(SyntaxKind::PARAGRAPH, Italic);
//! let html = HtmlGenerator::new(registry).generate(&parse("hi\n"));
//! assert_eq!(html, "<i>hi</i>");
//! ```

pub mod provider;
pub mod providers;
pub mod visitor;

pub use provider::{GeneratingProvider, ProviderRegistry, TagProvider};
pub use visitor::{HtmlGeneratingVisitor, leaf_text, trim_indents};

use markdown_tree_syntax::SyntaxNode;
use rowan::NodeOrToken;
use serde::{Deserialize, Serialize};

/// Rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlOptions {
    /// Prepended to the info string word in the `class` of fenced code.
    pub language_class_prefix: String,
    /// Most spaces of fence indentation stripped from code lines.
    pub fence_indent_cap: usize,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            language_class_prefix: "language-".to_string(),
            fence_indent_cap: 10,
        }
    }
}

/// Renders syntax trees with a fixed set of providers.
#[derive(Debug, Default)]
pub struct HtmlGenerator {
    registry: ProviderRegistry,
}

impl HtmlGenerator {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn generate(&self, root: &SyntaxNode) -> String {
        let mut visitor = HtmlGeneratingVisitor::new(&self.registry);
        visitor.visit_element(&NodeOrToken::Node(root.clone()));
        visitor.into_html()
    }
}

/// Parse `text` with the default parser and render it with the default
/// providers.
pub fn markdown_to_html(text: &str) -> String {
    HtmlGenerator::default().generate(&markdown_tree_syntax::parse(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_a_document() {
        let input = "# Notes\n\nSome *text*.\n\n> quoted\n\n---\n\n1. one\n2. two\n";
        assert_eq!(
            markdown_to_html(input),
            "<h1>Notes</h1><p>Some <em>text</em>.</p><blockquote><p>quoted</p></blockquote>\
             <hr /><ol><li>one</li><li>two</li></ol>"
        );
    }

    #[test]
    fn rendering_is_repeatable() {
        let tree = markdown_tree_syntax::parse("- a\n- *b*\n");
        let generator = HtmlGenerator::default();
        assert_eq!(generator.generate(&tree), generator.generate(&tree));
    }

    #[test]
    fn unexpanded_paragraphs_render_as_text() {
        let parser = markdown_tree_syntax::MarkdownParser::with_options(
            markdown_tree_syntax::ParserOptions {
                expand_inlines: false,
                ..Default::default()
            },
        );
        let tree = parser.build_markdown_tree("*a* <b>\n");
        assert_eq!(
            HtmlGenerator::default().generate(&tree),
            "<p>*a* &lt;b&gt;</p>"
        );
    }

    #[test]
    fn indented_gt_after_paragraph_is_text() {
        assert_eq!(markdown_to_html("a\n    > b\n"), "<p>a\n&gt; b</p>");
        assert_eq!(
            markdown_to_html("> a\n    > b\n"),
            "<blockquote><p>a\n&gt; b</p></blockquote>"
        );
    }

    #[test]
    fn deep_emphasis_renders_within_the_nesting_limit() {
        let stars = "*".repeat(10_000);
        let html = markdown_to_html(&format!("{stars}a{stars}\n"));
        assert_eq!(html.matches("<strong>").count(), 64);
        assert_eq!(html.matches("</strong>").count(), 64);
        assert!(html.starts_with("<p><strong><strong>"));
        assert!(html.contains("*a*"));
    }

    #[test]
    fn empty_document() {
        assert_eq!(markdown_to_html(""), "");
        assert_eq!(markdown_to_html("\n\n"), "");
    }
}
