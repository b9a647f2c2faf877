use markdown_tree_syntax::ast::{ListItemNode, ListNode};
use markdown_tree_syntax::{SyntaxElement, SyntaxKind, SyntaxNode};
use rowan::NodeOrToken;

use super::InlineHolderProvider;
use crate::provider::{GeneratingProvider, TagProvider};
use crate::visitor::{HtmlGeneratingVisitor, is_block_markup};

/// `<ul>`, `<ol>` or `<ol start="N">`.
#[derive(Debug, Clone, Copy)]
pub struct ListProvider;

impl TagProvider for ListProvider {
    fn open_tag(&self, element: &SyntaxElement) -> String {
        let list = element.as_node().cloned().and_then(ListNode::cast);
        match list {
            Some(list) if list.is_ordered() => match list.start_number() {
                Some(start) if start != 1 => format!("<ol start=\"{start}\">"),
                _ => "<ol>".to_string(),
            },
            Some(_) => "<ul>".to_string(),
            None if element.kind() == SyntaxKind::ORDERED_LIST => "<ol>".to_string(),
            None => "<ul>".to_string(),
        }
    }

    fn close_tag(&self, element: &SyntaxElement) -> String {
        if element.kind() == SyntaxKind::ORDERED_LIST {
            "</ol>".to_string()
        } else {
            "</ul>".to_string()
        }
    }

    fn children_to_render(&self, node: &SyntaxNode) -> Vec<SyntaxElement> {
        node.children_with_tokens()
            .filter(|c| !is_block_markup(c.kind()))
            .collect()
    }
}

/// `<li>`. The paragraph of a single-paragraph item in a tight list is
/// rendered without `<p>`.
#[derive(Debug, Clone, Copy)]
pub struct ListItemProvider;

impl GeneratingProvider for ListItemProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement) {
        let NodeOrToken::Node(node) = element else {
            return;
        };
        visitor.consume_html("<li>");

        let children: Vec<SyntaxElement> = node.children_with_tokens().collect();
        let loose = ListItemNode::cast(node.clone())
            .and_then(|item| item.parent_list())
            .is_some_and(|list| list.is_loose());

        if children.len() == 2 && children[1].kind() == SyntaxKind::PARAGRAPH && !loose {
            InlineHolderProvider.process_node(visitor, &children[1]);
        } else {
            visitor.visit_block_children(node);
        }

        visitor.consume_html("</li>");
    }
}
