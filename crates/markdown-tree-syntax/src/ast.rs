//! Typed views over list nodes.

use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// An `UNORDERED_LIST` or `ORDERED_LIST` node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListNode(SyntaxNode);

impl ListNode {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        node.kind().is_list().then_some(Self(node))
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    pub fn is_ordered(&self) -> bool {
        self.0.kind() == SyntaxKind::ORDERED_LIST
    }

    pub fn items(&self) -> impl Iterator<Item = ListItemNode> + '_ {
        self.0.children().filter_map(ListItemNode::cast)
    }

    /// A list is loose when a blank line separates two of its items, or two
    /// blocks directly inside one of its items.
    pub fn is_loose(&self) -> bool {
        has_blank_line_between_blocks(&self.0)
            || self
                .items()
                .any(|item| has_blank_line_between_blocks(&item.0))
    }

    /// The number of the first item of an ordered list.
    pub fn start_number(&self) -> Option<u64> {
        let marker = self
            .items()
            .next()?
            .0
            .children_with_tokens()
            .find(|e| e.kind() == SyntaxKind::LIST_NUMBER)?;
        let text = marker.as_token()?.text().to_string();
        text.trim_end()
            .trim_end_matches(['.', ')'])
            .parse()
            .ok()
    }
}

/// A `LIST_ITEM` node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListItemNode(SyntaxNode);

impl ListItemNode {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        (node.kind() == SyntaxKind::LIST_ITEM).then_some(Self(node))
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    pub fn parent_list(&self) -> Option<ListNode> {
        self.0.parent().and_then(ListNode::cast)
    }
}

fn has_blank_line_between_blocks(node: &SyntaxNode) -> bool {
    let mut seen_block = false;
    let mut newlines = 0;
    for child in node.children_with_tokens() {
        match child.kind() {
            SyntaxKind::EOL => newlines += 1,
            SyntaxKind::WHITE_SPACE
            | SyntaxKind::QUOTE_MARKER
            | SyntaxKind::LIST_BULLET
            | SyntaxKind::LIST_NUMBER => {}
            _ => {
                if seen_block && newlines >= 2 {
                    return true;
                }
                seen_block = true;
                newlines = 0;
            }
        }
    }
    false
}
