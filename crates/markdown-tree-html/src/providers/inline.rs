use html_escape::encode_double_quoted_attribute;
use markdown_tree_syntax::{SyntaxElement, SyntaxKind, SyntaxNode};
use rowan::NodeOrToken;

use super::child_range;
use crate::provider::{GeneratingProvider, TagProvider};
use crate::visitor::HtmlGeneratingVisitor;

/// A tag around the children between `width` delimiter tokens on each side.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedProvider {
    tag: &'static str,
    width: usize,
}

impl DelimitedProvider {
    pub fn new(tag: &'static str, width: usize) -> Self {
        Self { tag, width }
    }
}

impl TagProvider for DelimitedProvider {
    fn open_tag(&self, _: &SyntaxElement) -> String {
        format!("<{}>", self.tag)
    }

    fn close_tag(&self, _: &SyntaxElement) -> String {
        format!("</{}>", self.tag)
    }

    fn children_to_render(&self, node: &SyntaxNode) -> Vec<SyntaxElement> {
        let len = node.children_with_tokens().count();
        child_range(node, self.width, len.saturating_sub(self.width))
    }
}

fn child_of_kind(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
    node.children().find(|c| c.kind() == kind)
}

fn destination(node: &SyntaxNode) -> String {
    child_of_kind(node, SyntaxKind::LINK_DESTINATION)
        .map(|d| {
            let text = d.text().to_string();
            text.strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .map(str::to_string)
                .unwrap_or(text)
        })
        .unwrap_or_default()
}

fn title(node: &SyntaxNode) -> Option<String> {
    child_of_kind(node, SyntaxKind::LINK_TITLE).map(|t| {
        let text = t.text().to_string();
        text.trim_matches('"').to_string()
    })
}

fn title_attribute(node: &SyntaxNode) -> String {
    title(node)
        .map(|t| format!(" title=\"{}\"", encode_double_quoted_attribute(&t)))
        .unwrap_or_default()
}

/// `<a href="..." title="...">` around the rendered link text.
#[derive(Debug, Clone, Copy)]
pub struct InlineLinkProvider;

impl GeneratingProvider for InlineLinkProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement) {
        let NodeOrToken::Node(node) = element else {
            return;
        };
        visitor.consume_html(&format!(
            "<a href=\"{}\"{}>",
            encode_double_quoted_attribute(&destination(node)),
            title_attribute(node)
        ));
        if let Some(text) = child_of_kind(node, SyntaxKind::LINK_TEXT) {
            let len = text.children_with_tokens().count();
            visitor.visit_all(child_range(&text, 1, len.saturating_sub(1)));
        }
        visitor.consume_html("</a>");
    }
}

/// `<img src="..." alt="..." />`, with the alt text rendered as plain text.
#[derive(Debug, Clone, Copy)]
pub struct ImageProvider;

impl GeneratingProvider for ImageProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement) {
        let NodeOrToken::Node(node) = element else {
            return;
        };
        let alt = child_of_kind(node, SyntaxKind::LINK_TEXT)
            .map(|text| {
                let len = text.children_with_tokens().count();
                let mut alt = String::new();
                for child in child_range(&text, 1, len.saturating_sub(1)) {
                    plain_text(&child, &mut alt);
                }
                alt
            })
            .unwrap_or_default();
        visitor.consume_html(&format!(
            "<img src=\"{}\" alt=\"{}\"{} />",
            encode_double_quoted_attribute(&destination(node)),
            encode_double_quoted_attribute(&alt),
            title_attribute(node)
        ));
    }
}

/// Text content of inline markup, without delimiters.
fn plain_text(element: &SyntaxElement, out: &mut String) {
    match element {
        NodeOrToken::Token(token) => match token.kind() {
            SyntaxKind::ESCAPED_CHAR => out.push_str(&token.text()[1..]),
            SyntaxKind::QUOTE_MARKER => {}
            _ => out.push_str(token.text()),
        },
        NodeOrToken::Node(node) => {
            let len = node.children_with_tokens().count();
            let children = match node.kind() {
                SyntaxKind::EMPH | SyntaxKind::CODE_SPAN => {
                    child_range(node, 1, len.saturating_sub(1))
                }
                SyntaxKind::STRONG => child_range(node, 2, len.saturating_sub(2)),
                SyntaxKind::INLINE_LINK | SyntaxKind::IMAGE => {
                    match child_of_kind(node, SyntaxKind::LINK_TEXT) {
                        Some(text) => {
                            let len = text.children_with_tokens().count();
                            child_range(&text, 1, len.saturating_sub(1))
                        }
                        None => Vec::new(),
                    }
                }
                _ => node.children_with_tokens().collect(),
            };
            for child in &children {
                plain_text(child, out);
            }
        }
    }
}

/// `<a href="...">` for `<scheme:...>` and `<user@host>`.
#[derive(Debug, Clone, Copy)]
pub struct AutolinkProvider;

impl GeneratingProvider for AutolinkProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement) {
        let NodeOrToken::Node(node) = element else {
            return;
        };
        let text = node.text().to_string();
        let target = text
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .unwrap_or(&text);
        // Email autolinks are the only ones without a scheme.
        let href = if target.contains(':') {
            target.to_string()
        } else {
            format!("mailto:{target}")
        };
        visitor.consume_html(&format!(
            "<a href=\"{}\">{}</a>",
            encode_double_quoted_attribute(&href),
            html_escape::encode_text(target)
        ));
    }
}
