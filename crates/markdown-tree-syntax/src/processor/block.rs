use log::{trace, warn};

use super::line::{
    atx_heading, consume_columns, fence_close, fence_open, indentation, is_blank, list_marker,
    setext_underline, thematic_break, trimmed_len,
};
use crate::parser::lookahead::Position;
use crate::parser::production::{Marker, ProductionHolder};
use crate::parser::{MarkerProcessor, MarkerProcessorFactory, ParserOptions};
use crate::syntax_kind::SyntaxKind;

/// Creates a [`BlockMarkerProcessor`] per parse.
#[derive(Debug, Clone, Default)]
pub struct BlockMarkerProcessorFactory {
    options: ParserOptions,
}

impl BlockMarkerProcessorFactory {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }
}

impl MarkerProcessorFactory for BlockMarkerProcessorFactory {
    fn create_marker_processor(&self) -> Box<dyn MarkerProcessor> {
        Box::new(BlockMarkerProcessor::new(self.options.max_nesting_depth))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    BlockQuote,
    List { ordered: bool, delimiter: char },
    ListItem { content_indent: usize },
}

impl ContainerKind {
    fn syntax_kind(self) -> SyntaxKind {
        match self {
            ContainerKind::BlockQuote => SyntaxKind::BLOCK_QUOTE,
            ContainerKind::List { ordered: true, .. } => SyntaxKind::ORDERED_LIST,
            ContainerKind::List { ordered: false, .. } => SyntaxKind::UNORDERED_LIST,
            ContainerKind::ListItem { .. } => SyntaxKind::LIST_ITEM,
        }
    }
}

#[derive(Debug)]
struct Container {
    kind: ContainerKind,
    marker: Marker,
    /// End of the last content seen inside this container.
    content_end: usize,
}

#[derive(Debug)]
enum Leaf {
    Paragraph {
        marker: Marker,
        end: usize,
    },
    Fence {
        marker: Marker,
        fence_char: char,
        length: usize,
        end: usize,
    },
}

/// Line-oriented block structure recognizer.
///
/// Keeps a stack of open containers (block quotes, lists, list items) and at
/// most one open leaf (a paragraph or a code fence). Each line is matched
/// against the open containers first; whatever the line does not continue is
/// closed, then new containers and the leaf content of the line are opened.
///
/// Containers end at their last content, so trailing blank lines belong to
/// the parent as `EOL` tokens.
#[derive(Debug)]
pub struct BlockMarkerProcessor {
    containers: Vec<Container>,
    leaf: Option<Leaf>,
    max_nesting_depth: usize,
    depth_warned: bool,
}

impl BlockMarkerProcessor {
    pub fn new(max_nesting_depth: usize) -> Self {
        Self {
            containers: Vec::new(),
            leaf: None,
            max_nesting_depth,
            depth_warned: false,
        }
    }

    fn process_line(&mut self, holder: &mut ProductionHolder, line_start: usize, line: &str) {
        let abs = |i: usize| line_start + i;

        // Continue the open containers.
        let mut col = 0;
        let mut matched = 0;
        let mut quotes: Vec<(usize, usize)> = Vec::new();
        while matched < self.containers.len() {
            let rest = &line[col..];
            match self.containers[matched].kind {
                ContainerKind::BlockQuote => {
                    let (columns, bytes) = indentation(rest);
                    if columns > 3 || !rest[bytes..].starts_with('>') {
                        break;
                    }
                    quotes.push((matched, col + bytes));
                    col += bytes + 1;
                    if line[col..].starts_with([' ', '\t']) {
                        col += 1;
                    }
                }
                ContainerKind::List { .. } => {}
                ContainerKind::ListItem { content_indent } => {
                    if !is_blank(rest) {
                        match consume_columns(rest, content_indent) {
                            Some(bytes) => col += bytes,
                            None => break,
                        }
                    }
                }
            }
            matched += 1;
        }
        let all_matched = matched == self.containers.len();

        if all_matched && matches!(self.leaf, Some(Leaf::Fence { .. })) {
            self.continue_fence(holder, line_start, line, col, &quotes);
            return;
        }

        let rest = &line[col..];
        let paragraph_open = matches!(self.leaf, Some(Leaf::Paragraph { .. }));
        if !all_matched && paragraph_open && !is_blank(rest) && !self.interrupts_paragraph(rest) {
            // Lazy continuation: the paragraph swallows the unmatched prefix.
            let end = abs(col + trimmed_len(rest));
            self.add_quote_markers(holder, line_start, &quotes);
            self.extend_paragraph(end);
            self.extend_containers(self.containers.len(), end);
            return;
        }

        if !all_matched {
            self.close_leaf(holder);
            while self.containers.len() > matched {
                self.close_top(holder);
            }
        }

        col = self.open_containers(holder, line_start, line, col);
        self.close_dangling_list(holder);

        self.process_leaf(holder, line_start, line, col, &quotes);
    }

    /// Open the block quotes and list items that start at `col`.
    fn open_containers(
        &mut self,
        holder: &mut ProductionHolder,
        line_start: usize,
        line: &str,
        mut col: usize,
    ) -> usize {
        let abs = |i: usize| line_start + i;
        loop {
            let rest = &line[col..];
            let paragraph_open = matches!(self.leaf, Some(Leaf::Paragraph { .. }));
            if paragraph_open && setext_underline(rest).is_some() {
                break;
            }
            if thematic_break(rest).is_some() {
                break;
            }

            let (columns, bytes) = indentation(rest);
            let is_quote = columns <= 3 && rest[bytes..].starts_with('>');
            let item = if is_quote { None } else { list_marker(rest) };
            if !is_quote && item.is_none() {
                break;
            }
            if let Some(item) = &item {
                if paragraph_open && !item.can_interrupt_paragraph() {
                    break;
                }
            }
            if self.containers.len() >= self.max_nesting_depth {
                if !self.depth_warned {
                    warn!(
                        "block nesting deeper than {} at offset {}, treating the rest as text",
                        self.max_nesting_depth,
                        abs(col)
                    );
                    self.depth_warned = true;
                }
                break;
            }

            self.close_leaf(holder);

            if let Some(item) = item {
                let start = abs(col + item.marker.start);
                let kind = ContainerKind::List {
                    ordered: item.ordered,
                    delimiter: item.delimiter,
                };
                let reuse = self.containers.last().is_some_and(|c| c.kind == kind);
                if !reuse {
                    self.close_dangling_list(holder);
                    let marker = mark_at(holder, start);
                    self.containers.push(Container {
                        kind,
                        marker,
                        content_end: start,
                    });
                }
                let marker = mark_at(holder, start);
                let token_end = abs(col + item.token_end);
                let token = if item.ordered {
                    SyntaxKind::LIST_NUMBER
                } else {
                    SyntaxKind::LIST_BULLET
                };
                holder.add_production(start..token_end, token);
                self.containers.push(Container {
                    kind: ContainerKind::ListItem {
                        content_indent: item.content_indent,
                    },
                    marker,
                    content_end: token_end,
                });
                self.extend_containers(self.containers.len(), token_end);
                trace!("list item at {start}, content indent {}", item.content_indent);
                col += item.token_end;
            } else {
                self.close_dangling_list(holder);
                let at = col + bytes;
                let marker = mark_at(holder, abs(at));
                holder.add_production(abs(at)..abs(at) + 1, SyntaxKind::QUOTE_MARKER);
                self.containers.push(Container {
                    kind: ContainerKind::BlockQuote,
                    marker,
                    content_end: abs(at) + 1,
                });
                self.extend_containers(self.containers.len(), abs(at) + 1);
                col = at + 1;
                if line[col..].starts_with([' ', '\t']) {
                    col += 1;
                }
            }
        }
        col
    }

    fn process_leaf(
        &mut self,
        holder: &mut ProductionHolder,
        line_start: usize,
        line: &str,
        col: usize,
        quotes: &[(usize, usize)],
    ) {
        let abs = |i: usize| line_start + i;
        let rest = &line[col..];

        if is_blank(rest) {
            self.close_leaf(holder);
            self.add_quote_markers(holder, line_start, quotes);
            return;
        }

        if let Some((level, underline)) = setext_underline(rest) {
            if let Some(Leaf::Paragraph { marker, end }) = self.leaf.take() {
                let content = marker.done_at(holder, SyntaxKind::SETEXT_CONTENT, end);
                self.add_quote_markers(holder, line_start, quotes);
                let underline_end = abs(col + underline.end);
                holder.add_production(
                    abs(col + underline.start)..underline_end,
                    SyntaxKind::SETEXT_UNDERLINE,
                );
                let kind = if level == 1 {
                    SyntaxKind::SETEXT_1
                } else {
                    SyntaxKind::SETEXT_2
                };
                content.precede().done_at(holder, kind, underline_end);
                self.extend_containers(self.containers.len(), underline_end);
                return;
            }
        }

        if let Some(heading) = atx_heading(rest) {
            self.close_leaf(holder);
            self.add_quote_markers(holder, line_start, quotes);
            let range = heading.range();
            let marker = mark_at(holder, abs(col + range.start));
            holder.add_production(
                abs(col + heading.open.start)..abs(col + heading.open.end),
                SyntaxKind::ATX_HEADER,
            );
            if let Some(content) = &heading.content {
                holder.add_production(
                    abs(col + content.start)..abs(col + content.end),
                    SyntaxKind::ATX_CONTENT,
                );
            }
            if let Some(close) = &heading.close {
                holder.add_production(
                    abs(col + close.start)..abs(col + close.end),
                    SyntaxKind::ATX_HEADER,
                );
            }
            let kind = SyntaxKind::atx_heading(heading.level).unwrap_or(SyntaxKind::ATX_6);
            let end = abs(col + range.end);
            marker.done_at(holder, kind, end);
            self.extend_containers(self.containers.len(), end);
            return;
        }

        if let Some(range) = thematic_break(rest) {
            self.close_leaf(holder);
            self.add_quote_markers(holder, line_start, quotes);
            let end = abs(col + range.end);
            holder.add_production(abs(col + range.start)..end, SyntaxKind::THEMATIC_BREAK);
            self.extend_containers(self.containers.len(), end);
            return;
        }

        let paragraph_open = matches!(self.leaf, Some(Leaf::Paragraph { .. }));
        if let Some(fence) = fence_open(rest) {
            if !paragraph_open || fence.indent <= 3 {
                self.close_leaf(holder);
                self.add_quote_markers(holder, line_start, quotes);
                let marker = mark_at(holder, abs(col));
                let mut end = abs(col + fence.run.end);
                holder.add_production(
                    abs(col + fence.run.start)..end,
                    SyntaxKind::CODE_FENCE_START,
                );
                if let Some(info) = &fence.info {
                    end = abs(col + info.end);
                    holder.add_production(abs(col + info.start)..end, SyntaxKind::FENCE_LANG);
                }
                self.leaf = Some(Leaf::Fence {
                    marker,
                    fence_char: fence.fence_char,
                    length: fence.length,
                    end,
                });
                self.extend_containers(self.containers.len(), end);
                return;
            }
        }

        let end = abs(col + trimmed_len(rest));
        self.add_quote_markers(holder, line_start, quotes);
        if paragraph_open {
            self.extend_paragraph(end);
        } else {
            let (_, bytes) = indentation(rest);
            let marker = mark_at(holder, abs(col + bytes));
            self.leaf = Some(Leaf::Paragraph { marker, end });
        }
        self.extend_containers(self.containers.len(), end);
    }

    fn continue_fence(
        &mut self,
        holder: &mut ProductionHolder,
        line_start: usize,
        line: &str,
        col: usize,
        quotes: &[(usize, usize)],
    ) {
        let Some(Leaf::Fence {
            fence_char, length, ..
        }) = self.leaf
        else {
            return;
        };
        self.add_quote_markers(holder, line_start, quotes);
        let rest = &line[col..];

        if let Some(close) = fence_close(rest, fence_char, length) {
            let end = line_start + col + close.end;
            holder.add_production(
                line_start + col + close.start..end,
                SyntaxKind::CODE_FENCE_END,
            );
            if let Some(Leaf::Fence { marker, .. }) = self.leaf.take() {
                marker.done_at(holder, SyntaxKind::CODE_FENCE, end);
            }
            self.extend_containers(self.containers.len(), end);
            return;
        }

        if !rest.is_empty() {
            let end = line_start + line.len();
            holder.add_production(line_start + col..end, SyntaxKind::CODE_FENCE_CONTENT);
            if let Some(Leaf::Fence { end: fence_end, .. }) = &mut self.leaf {
                *fence_end = end;
            }
            self.extend_containers(self.containers.len(), end);
        }
    }

    /// Whether `rest` starts a block that ends an open paragraph.
    fn interrupts_paragraph(&self, rest: &str) -> bool {
        let (columns, bytes) = indentation(rest);
        if columns > 3 {
            return false;
        }
        let in_list = self
            .containers
            .iter()
            .any(|c| matches!(c.kind, ContainerKind::List { .. }));
        atx_heading(rest).is_some()
            || thematic_break(rest).is_some()
            || fence_open(rest).is_some()
            || rest[bytes..].starts_with('>')
            || list_marker(rest).is_some_and(|m| in_list || m.can_interrupt_paragraph())
    }

    fn add_quote_markers(
        &mut self,
        holder: &mut ProductionHolder,
        line_start: usize,
        quotes: &[(usize, usize)],
    ) {
        for &(container, at) in quotes {
            let start = line_start + at;
            holder.add_production(start..start + 1, SyntaxKind::QUOTE_MARKER);
            self.extend_containers(container + 1, start + 1);
        }
    }

    fn extend_paragraph(&mut self, new_end: usize) {
        if let Some(Leaf::Paragraph { end, .. }) = &mut self.leaf {
            *end = (*end).max(new_end);
        }
    }

    /// Record content up to `end` in the outermost `count` containers.
    fn extend_containers(&mut self, count: usize, end: usize) {
        for container in self.containers.iter_mut().take(count) {
            container.content_end = container.content_end.max(end);
        }
    }

    fn close_leaf(&mut self, holder: &mut ProductionHolder) {
        match self.leaf.take() {
            Some(Leaf::Paragraph { marker, end }) => {
                marker.done_at(holder, SyntaxKind::PARAGRAPH, end);
            }
            Some(Leaf::Fence { marker, end, .. }) => {
                marker.done_at(holder, SyntaxKind::CODE_FENCE, end);
            }
            None => {}
        }
    }

    fn close_top(&mut self, holder: &mut ProductionHolder) {
        if let Some(container) = self.containers.pop() {
            let end = container.content_end;
            container
                .marker
                .done_at(holder, container.kind.syntax_kind(), end);
            if let Some(parent) = self.containers.last_mut() {
                parent.content_end = parent.content_end.max(end);
            }
        }
    }

    /// Close a list left on top of the stack without an open item.
    fn close_dangling_list(&mut self, holder: &mut ProductionHolder) {
        if self
            .containers
            .last()
            .is_some_and(|c| matches!(c.kind, ContainerKind::List { .. }))
        {
            self.close_top(holder);
        }
    }
}

impl MarkerProcessor for BlockMarkerProcessor {
    fn process_position<'a>(
        &mut self,
        holder: &mut ProductionHolder,
        position: Position<'a>,
    ) -> Option<Position<'a>> {
        self.process_line(holder, position.offset(), position.current_line());
        position.next_line_position()
    }

    fn flush_markers(&mut self, holder: &mut ProductionHolder) {
        self.close_leaf(holder);
        while !self.containers.is_empty() {
            self.close_top(holder);
        }
    }
}

fn mark_at(holder: &mut ProductionHolder, offset: usize) -> Marker {
    holder.update_position(offset);
    holder.mark()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lookahead::LookaheadText;
    use crate::parser::production::ProductionNode;
    use pretty_assertions::assert_eq;

    fn productions(text: &str) -> Vec<(SyntaxKind, &str)> {
        let mut holder = ProductionHolder::new();
        let mut processor = BlockMarkerProcessor::new(64);
        let mut position = LookaheadText::new(text).start_position();
        while let Some(pos) = position {
            holder.update_position(pos.offset());
            position = processor.process_position(&mut holder, pos);
        }
        holder.update_position(text.len());
        processor.flush_markers(&mut holder);
        let mut nodes: Vec<ProductionNode> = holder.into_production();
        nodes.sort_by_key(|n| (n.range.start, std::cmp::Reverse(n.range.end)));
        nodes
            .into_iter()
            .map(|n| (n.kind, &text[n.range]))
            .collect()
    }

    #[test]
    fn atx_heading_parts() {
        assert_eq!(
            productions("# Title #"),
            vec![
                (SyntaxKind::ATX_1, "# Title #"),
                (SyntaxKind::ATX_HEADER, "#"),
                (SyntaxKind::ATX_CONTENT, "Title"),
                (SyntaxKind::ATX_HEADER, "#"),
            ]
        );
    }

    #[test]
    fn paragraph_spans_lines() {
        assert_eq!(
            productions("a\nb  \n\nc"),
            vec![(SyntaxKind::PARAGRAPH, "a\nb"), (SyntaxKind::PARAGRAPH, "c")]
        );
    }

    #[test]
    fn setext_wraps_paragraph() {
        assert_eq!(
            productions("Title\n---"),
            vec![
                (SyntaxKind::SETEXT_2, "Title\n---"),
                (SyntaxKind::SETEXT_CONTENT, "Title"),
                (SyntaxKind::SETEXT_UNDERLINE, "---"),
            ]
        );
    }

    #[test]
    fn thematic_break_without_paragraph() {
        assert_eq!(productions("---"), vec![(SyntaxKind::THEMATIC_BREAK, "---")]);
    }

    #[test]
    fn tight_list_items() {
        assert_eq!(
            productions("- a\n- b\n"),
            vec![
                (SyntaxKind::UNORDERED_LIST, "- a\n- b"),
                (SyntaxKind::LIST_ITEM, "- a"),
                (SyntaxKind::LIST_BULLET, "- "),
                (SyntaxKind::PARAGRAPH, "a"),
                (SyntaxKind::LIST_ITEM, "- b"),
                (SyntaxKind::LIST_BULLET, "- "),
                (SyntaxKind::PARAGRAPH, "b"),
            ]
        );
    }

    #[test]
    fn list_kind_change_starts_new_list() {
        let kinds: Vec<SyntaxKind> = productions("- a\n1. b")
            .into_iter()
            .map(|(k, _)| k)
            .filter(|k| k.is_list())
            .collect();
        assert_eq!(kinds, vec![SyntaxKind::UNORDERED_LIST, SyntaxKind::ORDERED_LIST]);
    }

    #[test]
    fn nested_list_by_indentation() {
        let nodes = productions("- a\n  - b");
        assert!(nodes.contains(&(SyntaxKind::UNORDERED_LIST, "- b")));
        assert!(nodes.contains(&(SyntaxKind::LIST_ITEM, "- a\n  - b")));
    }

    #[test]
    fn ordered_list_needs_one_to_interrupt_paragraph() {
        assert_eq!(productions("a\n2. b"), vec![(SyntaxKind::PARAGRAPH, "a\n2. b")]);
        assert_eq!(productions("a\n1. b")[0], (SyntaxKind::PARAGRAPH, "a"));
    }

    #[test]
    fn block_quote_lazy_continuation() {
        assert_eq!(
            productions("> a\nb"),
            vec![
                (SyntaxKind::BLOCK_QUOTE, "> a\nb"),
                (SyntaxKind::QUOTE_MARKER, ">"),
                (SyntaxKind::PARAGRAPH, "a\nb"),
            ]
        );
    }

    #[test]
    fn continuation_quote_markers_are_recorded() {
        assert_eq!(
            productions("> a\n> b"),
            vec![
                (SyntaxKind::BLOCK_QUOTE, "> a\n> b"),
                (SyntaxKind::QUOTE_MARKER, ">"),
                (SyntaxKind::PARAGRAPH, "a\n> b"),
                (SyntaxKind::QUOTE_MARKER, ">"),
            ]
        );
    }

    #[test]
    fn lazy_line_keeps_markers_it_matched() {
        assert_eq!(
            productions("> > a\n> b"),
            vec![
                (SyntaxKind::BLOCK_QUOTE, "> > a\n> b"),
                (SyntaxKind::QUOTE_MARKER, ">"),
                (SyntaxKind::BLOCK_QUOTE, "> a\n> b"),
                (SyntaxKind::QUOTE_MARKER, ">"),
                (SyntaxKind::PARAGRAPH, "a\n> b"),
                (SyntaxKind::QUOTE_MARKER, ">"),
            ]
        );
    }

    #[test]
    fn indented_gt_is_paragraph_text() {
        assert_eq!(
            productions("a\n    > b"),
            vec![(SyntaxKind::PARAGRAPH, "a\n    > b")]
        );
        assert_eq!(
            productions("> a\n    > b"),
            vec![
                (SyntaxKind::BLOCK_QUOTE, "> a\n    > b"),
                (SyntaxKind::QUOTE_MARKER, ">"),
                (SyntaxKind::PARAGRAPH, "a\n    > b"),
            ]
        );
    }

    #[test]
    fn quote_ends_at_blank_line() {
        let nodes = productions("> a\n\nb");
        assert_eq!(nodes[0], (SyntaxKind::BLOCK_QUOTE, "> a"));
        assert_eq!(nodes.last(), Some(&(SyntaxKind::PARAGRAPH, "b")));
    }

    #[test]
    fn fenced_code_lines() {
        assert_eq!(
            productions("```rust\nlet x;\n```\n"),
            vec![
                (SyntaxKind::CODE_FENCE, "```rust\nlet x;\n```"),
                (SyntaxKind::CODE_FENCE_START, "```"),
                (SyntaxKind::FENCE_LANG, "rust"),
                (SyntaxKind::CODE_FENCE_CONTENT, "let x;"),
                (SyntaxKind::CODE_FENCE_END, "```"),
            ]
        );
    }

    #[test]
    fn unterminated_fence_ends_at_last_content() {
        assert_eq!(
            productions("~~~\na\n"),
            vec![
                (SyntaxKind::CODE_FENCE, "~~~\na"),
                (SyntaxKind::CODE_FENCE_START, "~~~"),
                (SyntaxKind::CODE_FENCE_CONTENT, "a"),
            ]
        );
    }

    #[test]
    fn indented_fence_includes_indentation() {
        let nodes = productions("    ```python\n    x = 1\n    ```\n");
        assert_eq!(
            nodes[0],
            (SyntaxKind::CODE_FENCE, "    ```python\n    x = 1\n    ```")
        );
        assert_eq!(nodes[3], (SyntaxKind::CODE_FENCE_CONTENT, "    x = 1"));
    }

    #[test]
    fn nesting_limit_turns_markers_into_text() {
        let mut holder = ProductionHolder::new();
        let mut processor = BlockMarkerProcessor::new(2);
        let text = "> > > a";
        processor.process_line(&mut holder, 0, text);
        processor.flush_markers(&mut holder);
        let quotes = holder
            .production()
            .iter()
            .filter(|n| n.kind == SyntaxKind::BLOCK_QUOTE)
            .count();
        assert_eq!(quotes, 2);
        let paragraph = holder
            .production()
            .iter()
            .find(|n| n.kind == SyntaxKind::PARAGRAPH)
            .map(|n| &text[n.range.clone()]);
        assert_eq!(paragraph, Some("> a"));
    }
}
