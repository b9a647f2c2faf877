//! # markdown-tree-syntax
//!
//! A lossless Markdown syntax tree built on [Rowan] + [Logos].
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//!
//! ## Lossless trees
//!
//! Every byte of the source ends up in exactly one token of the tree, so
//! `tree.text()` always reproduces the input. Nodes cover contiguous source
//! ranges and nest strictly.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → MarkerProcessor → Production log → TreeAssembler → Rowan Tree
//!               (line by line)    (range, kind)     (sorted events)
//!                                                         │
//!                              paragraph / heading leaves ▼
//!                              TokensCache → SequentialParsers → inline subtree
//! ```
//!
//! ### 1. Block phase ([`processor`] module)
//!
//! The [`BlockMarkerProcessor`](processor::BlockMarkerProcessor) walks the
//! text one line at a time and records productions for block quotes, lists,
//! headings, code fences, thematic breaks and paragraphs.
//!
//! ### 2. Assembly ([`parser::builder`] module)
//!
//! The production log is sorted into start and end events and turned into a
//! green tree. Bytes no production covers become raw [`lexer`] tokens.
//!
//! ### 3. Inline expansion ([`sequential`] module)
//!
//! Leaves of inline-bearing kinds are re-parsed: their tokens are fed through
//! the code span, autolink, link and emphasis recognizers, and the result is
//! assembled into a subtree that replaces the leaf.
//!
//! ## Module Structure
//!
//! ```text
//! markdown-tree-syntax/
//! ├── lib.rs            # This file - public API and tree tests
//! ├── syntax_kind.rs    # SyntaxKind enum (tokens + nodes) and Rowan integration
//! ├── lexer.rs          # Logos-based tokenizer
//! ├── ast.rs            # Typed list views (looseness, start number)
//! ├── parser/
//! │   ├── mod.rs        # MarkdownParser, MarkerProcessor traits, parse_inline
//! │   ├── lookahead.rs  # Line cursor
//! │   ├── production.rs # Production log and the Marker system
//! │   └── builder.rs    # Production log to green tree
//! ├── processor/
//! │   ├── block.rs      # Block structure recognizer
//! │   └── line.rs       # Per-line construct recognizers
//! └── sequential/       # Inline recognizers over token ranges
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use markdown_tree_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("# Hello\n");
//!
//! // The tree preserves all text
//! assert_eq!(tree.text().to_string(), "# Hello\n");
//!
//! assert_eq!(tree.kind(), SyntaxKind::MARKDOWN_FILE);
//! let heading = tree.children().next().unwrap();
//! assert_eq!(heading.kind(), SyntaxKind::ATX_1);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod processor;
pub mod sequential;
pub mod syntax_kind;

pub use parser::{MarkdownParser, ParserOptions, parse, parse_inline};
pub use syntax_kind::{MarkdownLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    fn format_tree(node: &SyntaxNode, indent: usize) -> String {
        let mut result = String::new();
        let prefix = "  ".repeat(indent);

        result.push_str(&format!(
            "{}{:?}@{:?}\n",
            prefix,
            node.kind(),
            node.text_range()
        ));

        for child in node.children_with_tokens() {
            match child {
                rowan::NodeOrToken::Node(n) => {
                    result.push_str(&format_tree(&n, indent + 1));
                }
                rowan::NodeOrToken::Token(t) => {
                    result.push_str(&format!(
                        "{}  {:?}@{:?} {:?}\n",
                        prefix,
                        t.kind(),
                        t.text_range(),
                        t.text()
                    ));
                }
            }
        }

        result
    }

    fn kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
        node.children_with_tokens().map(|e| e.kind()).collect()
    }

    #[test]
    fn snapshot_heading() {
        let tree = parse("# Title #\n");
        assert_snapshot!(format_tree(&tree, 0), @r##"
        MARKDOWN_FILE@0..10
          ATX_1@0..9
            ATX_HEADER@0..1 "#"
            WHITE_SPACE@1..2 " "
            ATX_CONTENT@2..7
              TEXT@2..7 "Title"
            WHITE_SPACE@7..8 " "
            ATX_HEADER@8..9 "#"
          EOL@9..10 "\n"
        "##);
    }

    #[test]
    fn snapshot_inline_elements() {
        let tree = parse("Text with `code` and *emphasis*.\n");
        assert_snapshot!(format_tree(&tree, 0), @r#"
        MARKDOWN_FILE@0..33
          PARAGRAPH@0..32
            TEXT@0..4 "Text"
            WHITE_SPACE@4..5 " "
            TEXT@5..9 "with"
            WHITE_SPACE@9..10 " "
            CODE_SPAN@10..16
              BACKTICK@10..11 "`"
              TEXT@11..15 "code"
              BACKTICK@15..16 "`"
            WHITE_SPACE@16..17 " "
            TEXT@17..20 "and"
            WHITE_SPACE@20..21 " "
            EMPH@21..31
              STAR@21..22 "*"
              TEXT@22..30 "emphasis"
              STAR@30..31 "*"
            TEXT@31..32 "."
          EOL@32..33 "\n"
        "#);
    }

    #[test]
    fn snapshot_fenced_code() {
        let tree = parse("```rust\nfn main() {}\n```\n");
        assert_snapshot!(format_tree(&tree, 0), @r#"
        MARKDOWN_FILE@0..25
          CODE_FENCE@0..24
            CODE_FENCE_START@0..3 "```"
            FENCE_LANG@3..7 "rust"
            EOL@7..8 "\n"
            CODE_FENCE_CONTENT@8..20 "fn main() {}"
            EOL@20..21 "\n"
            CODE_FENCE_END@21..24 "```"
          EOL@24..25 "\n"
        "#);
    }

    #[test]
    fn list_items_hold_bullet_and_paragraph() {
        let tree = parse("- a\n- b\n");
        let list = tree.first_child().unwrap();
        assert_eq!(list.kind(), SyntaxKind::UNORDERED_LIST);
        assert_eq!(
            kinds(&list),
            vec![SyntaxKind::LIST_ITEM, SyntaxKind::EOL, SyntaxKind::LIST_ITEM]
        );
        let item = list.first_child().unwrap();
        assert_eq!(
            kinds(&item),
            vec![SyntaxKind::LIST_BULLET, SyntaxKind::PARAGRAPH]
        );
    }

    #[test]
    fn containers_end_before_trailing_blank_lines() {
        let tree = parse("> a\n\n\nb\n");
        assert_eq!(
            kinds(&tree),
            vec![
                SyntaxKind::BLOCK_QUOTE,
                SyntaxKind::EOL,
                SyntaxKind::EOL,
                SyntaxKind::EOL,
                SyntaxKind::PARAGRAPH,
                SyntaxKind::EOL,
            ]
        );
    }

    #[test]
    fn inline_quote_markers_inside_paragraph() {
        let tree = parse("> *a\n> b*\n");
        let quote = tree.first_child().unwrap();
        let paragraph = quote
            .children()
            .find(|n| n.kind() == SyntaxKind::PARAGRAPH)
            .unwrap();
        let emph = paragraph.first_child().unwrap();
        assert_eq!(emph.kind(), SyntaxKind::EMPH);
        assert!(
            emph.children_with_tokens()
                .any(|e| e.kind() == SyntaxKind::QUOTE_MARKER)
        );
    }

    #[test]
    fn links_are_structured() {
        let tree = parse("[a *b*](/u \"t\")\n");
        let link = tree.first_child().unwrap().first_child().unwrap();
        assert_eq!(link.kind(), SyntaxKind::INLINE_LINK);
        assert_eq!(
            link.children().map(|n| n.kind()).collect::<Vec<_>>(),
            vec![
                SyntaxKind::LINK_TEXT,
                SyntaxKind::LINK_DESTINATION,
                SyntaxKind::LINK_TITLE
            ]
        );
        let text = link.first_child().unwrap();
        assert!(text.children().any(|n| n.kind() == SyntaxKind::EMPH));
    }

    #[test]
    fn setext_heading_content_is_expanded() {
        let tree = parse("**Big**\n===\n");
        let heading = tree.first_child().unwrap();
        assert_eq!(heading.kind(), SyntaxKind::SETEXT_1);
        let content = heading.first_child().unwrap();
        assert_eq!(content.kind(), SyntaxKind::SETEXT_CONTENT);
        assert_eq!(
            content.first_child().map(|n| n.kind()),
            Some(SyntaxKind::STRONG)
        );
    }

    // === Error tolerance / messy input tests ===

    #[test]
    fn messy_input_is_preserved() {
        let input = r#"#Not a heading
##Nor this

- [ ] task with [broken link
* mixed bullet
+ another
  - nested

> quote
that continues lazily

Some <b>html and *unclosed emphasis

```python
def broken():
    # fence never closed
"#;
        let tree = parse(input);
        assert_eq!(tree.text().to_string(), input);
        assert!(
            tree.descendants()
                .any(|n| n.kind() == SyntaxKind::CODE_FENCE)
        );
    }

    #[test]
    fn roundtrip_preserves_text() {
        let inputs = [
            "",
            "\n\n",
            "Hello, world!\n",
            "# Heading\n",
            "Setext\n---\n",
            "> Quote\n> more\n",
            "- Item\n  - nested\n",
            "1. one\n2. two\n",
            "```\ncode\n```\n",
            "    ~~~\n    indented\n",
            "[link](url \"title\")\n",
            "![img](src)\n",
            "*emphasis* and _under_\n",
            "**strong** ***both***\n",
            "`code span`\n",
            "<https://example.com>\n",
            "a\\*b &amp; c\r\nd\r\n",
            "***\n",
        ];

        for input in inputs {
            let tree = parse(input);
            assert_eq!(
                tree.text().to_string(),
                input,
                "Roundtrip failed for: {:?}",
                input
            );
        }
    }

    #[test]
    fn inline_bearing_kinds_are_always_nodes() {
        let inputs = [
            "abc",
            "# Title\n",
            "Setext\n===\n",
            "> a\n    > b\n",
            "> > a\n> b\n",
            "- *x*\n\n  y\n",
            "a\n    > b\n",
        ];
        for input in inputs {
            let tree = parse(input);
            let leaked: Vec<_> = tree
                .descendants_with_tokens()
                .filter_map(|e| e.into_token())
                .filter(|t| t.kind().is_inline_bearing())
                .collect();
            assert!(leaked.is_empty(), "{input:?} has tokens {leaked:?}");
        }

        let tree = parse("abc");
        let paragraph = tree.first_child().expect("paragraph");
        assert_eq!(paragraph.kind(), SyntaxKind::PARAGRAPH);
        let children: Vec<_> = paragraph
            .children_with_tokens()
            .map(|e| (e.kind(), e.as_token().map(|t| t.text().to_string())))
            .collect();
        assert_eq!(children, vec![(SyntaxKind::TEXT, Some("abc".to_string()))]);
    }

    #[test]
    fn deep_nesting_is_capped() {
        let input = format!("{}a\n", "> ".repeat(200));
        let tree = parse(&input);
        assert_eq!(tree.text().to_string(), input);
        let quotes = tree
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::BLOCK_QUOTE)
            .count();
        assert_eq!(quotes, ParserOptions::default().max_nesting_depth);
    }
}
