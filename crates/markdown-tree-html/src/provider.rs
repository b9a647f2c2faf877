use std::collections::HashMap;

use markdown_tree_syntax::{SyntaxElement, SyntaxKind, SyntaxNode};
use rowan::NodeOrToken;

use crate::HtmlOptions;
use crate::providers;
use crate::visitor::{HtmlGeneratingVisitor, leaf_text};

/// Renders the elements of one kind.
pub trait GeneratingProvider {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement);
}

/// A provider that wraps a selection of children in an opening and a
/// closing tag.
///
/// A token rendered by a tag provider gets its escaped text between the
/// tags.
pub trait TagProvider {
    fn open_tag(&self, element: &SyntaxElement) -> String;

    fn close_tag(&self, element: &SyntaxElement) -> String;

    fn children_to_render(&self, node: &SyntaxNode) -> Vec<SyntaxElement> {
        node.children_with_tokens().collect()
    }
}

impl<T: TagProvider> GeneratingProvider for T {
    fn process_node(&self, visitor: &mut HtmlGeneratingVisitor<'_>, element: &SyntaxElement) {
        visitor.consume_html(&self.open_tag(element));
        match element {
            NodeOrToken::Node(node) => visitor.visit_all(self.children_to_render(node)),
            NodeOrToken::Token(token) => visitor.consume_html(&leaf_text(token.text())),
        }
        visitor.consume_html(&self.close_tag(element));
    }
}

/// Providers by syntax kind.
pub struct ProviderRegistry {
    providers: HashMap<SyntaxKind, Box<dyn GeneratingProvider>>,
}

impl ProviderRegistry {
    /// A registry with no providers; everything renders through the
    /// fallbacks.
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// The standard providers, configured by `options`.
    pub fn with_options(options: &HtmlOptions) -> Self {
        let mut registry = Self::empty();
        providers::register_defaults(&mut registry, options);
        registry
    }

    /// Set the provider for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: SyntaxKind, provider: impl GeneratingProvider + 'static) {
        self.providers.insert(kind, Box::new(provider));
    }

    pub fn get(&self, kind: SyntaxKind) -> Option<&dyn GeneratingProvider> {
        self.providers.get(&kind).map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_options(&HtmlOptions::default())
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&SyntaxKind> = self.providers.keys().collect();
        kinds.sort();
        f.debug_struct("ProviderRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}
