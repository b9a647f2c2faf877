use markdown_tree_syntax::{SyntaxElement, SyntaxKind};
use rowan::NodeOrToken;

use crate::provider::GeneratingProvider;
use crate::visitor::{HtmlGeneratingVisitor, leaf_text, trim_indents};

/// `<pre><code class="language-X">` for fenced code blocks.
///
/// The fence's own indentation, capped at `indent_cap` spaces, is removed
/// from every content line.
#[derive(Debug, Clone)]
pub struct CodeFenceProvider {
    class_prefix: String,
    indent_cap: usize,
}

impl CodeFenceProvider {
    pub fn new(class_prefix: &str, indent_cap: usize) -> Self {
        Self {
            class_prefix: class_prefix.to_string(),
            indent_cap,
        }
    }
}

impl Default for CodeFenceProvider {
    fn default() -> Self {
        Self::new("language-", 10)
    }
}

impl GeneratingProvider for CodeFenceProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement) {
        let NodeOrToken::Node(node) = element else {
            return;
        };
        let text = node.text().to_string();
        let indent_before = text
            .bytes()
            .take(self.indent_cap)
            .take_while(|&b| b == b' ')
            .count();

        visitor.consume_html("<pre><code");

        let mut children: Vec<SyntaxElement> = node.children_with_tokens().collect();
        if children
            .last()
            .is_some_and(|c| c.kind() == SyntaxKind::CODE_FENCE_END)
        {
            children.pop();
        }

        let mut in_body = false;
        let mut last_was_eol = false;
        for child in &children {
            let Some(token) = child.as_token() else {
                continue;
            };
            match (in_body, token.kind()) {
                (true, SyntaxKind::CODE_FENCE_CONTENT | SyntaxKind::EOL) => {
                    visitor.consume_html(&trim_indents(&leaf_text(token.text()), indent_before));
                    last_was_eol = token.kind() == SyntaxKind::EOL;
                }
                (false, SyntaxKind::FENCE_LANG) => {
                    let language = token.text().split_whitespace().next().unwrap_or_default();
                    visitor.consume_html(&format!(
                        " class=\"{}{}\"",
                        self.class_prefix,
                        html_escape::encode_double_quoted_attribute(language)
                    ));
                }
                (false, SyntaxKind::EOL) => {
                    in_body = true;
                    visitor.consume_html(">");
                }
                _ => {}
            }
        }

        if !in_body {
            visitor.consume_html(">");
        }
        if !last_was_eol {
            visitor.consume_html("\n");
        }
        visitor.consume_html("</code></pre>");
    }
}

/// `<code>` for code spans.
///
/// Line endings become spaces. One space is stripped from each side when
/// both sides have one and the content is not all spaces.
#[derive(Debug, Clone, Copy)]
pub struct CodeSpanProvider;

impl GeneratingProvider for CodeSpanProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement) {
        let NodeOrToken::Node(node) = element else {
            return;
        };
        let children: Vec<SyntaxElement> = node.children_with_tokens().collect();
        let inner = children.get(1..children.len().saturating_sub(1)).unwrap_or_default();

        let mut content = String::new();
        let mut after_break = false;
        for child in inner {
            match child.kind() {
                SyntaxKind::EOL => {
                    content.push(' ');
                    after_break = true;
                }
                SyntaxKind::QUOTE_MARKER => after_break = true,
                SyntaxKind::WHITE_SPACE if after_break => {}
                _ => {
                    match child {
                        NodeOrToken::Token(token) => content.push_str(token.text()),
                        NodeOrToken::Node(node) => content.push_str(&node.text().to_string()),
                    }
                    after_break = false;
                }
            }
        }

        let stripped = if content.len() >= 2
            && content.starts_with(' ')
            && content.ends_with(' ')
            && !content.bytes().all(|b| b == b' ')
        {
            &content[1..content.len() - 1]
        } else {
            content.as_str()
        };

        visitor.consume_html("<code>");
        visitor.consume_html(&leaf_text(stripped));
        visitor.consume_html("</code>");
    }
}

#[cfg(test)]
mod tests {
    use crate::{HtmlGenerator, HtmlOptions, ProviderRegistry, markdown_to_html};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn indented_fence_strips_its_indentation() {
        assert_eq!(
            markdown_to_html("    ```python\n    x = 1\n    ```\n"),
            "<pre><code class=\"language-python\">x = 1\n</code></pre>"
        );
    }

    #[rstest]
    #[case("```\nfn a() {}\n```\n", "<pre><code>fn a() {}\n</code></pre>")]
    #[case("```rust extra words\nx\n```\n", "<pre><code class=\"language-rust\">x\n</code></pre>")]
    #[case("```rust\tfoo\nx\n```\n", "<pre><code class=\"language-rust\">x\n</code></pre>")]
    #[case("```\n<&>\n```\n", "<pre><code>&lt;&amp;&gt;\n</code></pre>")]
    #[case("```\n```\n", "<pre><code>\n</code></pre>")]
    #[case("```", "<pre><code>\n</code></pre>")]
    #[case("~~~\na\n\nb\n", "<pre><code>a\n\nb\n</code></pre>")]
    fn fenced_code(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(markdown_to_html(input), expected);
    }

    #[test]
    fn language_class_is_configurable() {
        let options = HtmlOptions {
            language_class_prefix: "lang-".to_string(),
            ..HtmlOptions::default()
        };
        let generator = HtmlGenerator::new(ProviderRegistry::with_options(&options));
        let tree = markdown_tree_syntax::parse("```sh\nls\n```\n");
        assert_eq!(
            generator.generate(&tree),
            "<pre><code class=\"lang-sh\">ls\n</code></pre>"
        );
    }

    #[test]
    fn indent_cap_limits_stripping() {
        let options = HtmlOptions {
            fence_indent_cap: 2,
            ..HtmlOptions::default()
        };
        let generator = HtmlGenerator::new(ProviderRegistry::with_options(&options));
        let tree = markdown_tree_syntax::parse("    ```\n    x\n    ```\n");
        assert_eq!(generator.generate(&tree), "<pre><code>  x\n</code></pre>");
    }

    #[rstest]
    #[case("`a`", "<p><code>a</code></p>")]
    #[case("`` a`b ``", "<p><code>a`b</code></p>")]
    #[case("`  `", "<p><code>  </code></p>")]
    #[case("`a\nb`", "<p><code>a b</code></p>")]
    #[case("`<x>`", "<p><code>&lt;x&gt;</code></p>")]
    fn code_spans(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(markdown_to_html(input), expected);
    }
}
