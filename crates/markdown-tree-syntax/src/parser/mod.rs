//! # Parser - Production Log to Syntax Tree
//!
//! Parsing happens in two phases over the same source text.
//!
//! ## Block phase
//!
//! A [`MarkerProcessor`] is driven over the text one line [`Position`] at a
//! time. It records *productions*, `(range, kind)` entries, into a
//! [`ProductionHolder`] using the marker system in [`production`]. The
//! processor is created fresh for every parse by a
//! [`MarkerProcessorFactory`], so it can keep state across lines.
//!
//! ```text
//! "# Title\n\ntext\n"
//!   line 0: ATX_HEADER 0..1, ATX_CONTENT 2..7, ATX_1 0..7
//!   line 1: (blank)
//!   line 2: PARAGRAPH 9..13
//!   end:    MARKDOWN_FILE 0..14
//! ```
//!
//! ## Assembly phase
//!
//! The [`TreeAssembler`](builder::TreeAssembler) sorts the log into a bracket
//! sequence and builds a rowan green tree, filling uncovered bytes with raw
//! tokens. Leaves of inline-bearing kinds (paragraphs, heading contents) are
//! expanded by [`parse_inline`], which runs the
//! [sequential parsers](crate::sequential) over the leaf's tokens and
//! assembles their productions the same way.
//!
//! ## Module Structure
//!
//! - [`lookahead`] - Forward-only line cursor
//! - [`production`] - Production log and the Marker system
//! - [`builder`] - Production log to rowan green tree

pub mod builder;
pub mod lookahead;
pub mod production;

use rowan::GreenNode;
use serde::{Deserialize, Serialize};

use crate::processor::BlockMarkerProcessorFactory;
use crate::sequential::{
    TokensCache, default_parsers, filter_block_quotes, limit_nesting, run_parsing_sequence,
};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use builder::{LexingTokenSource, TreeAssembler};
use lookahead::{LookaheadText, Position};
use production::{ProductionHolder, ProductionNode};

/// Recognizes block structure, one position at a time.
pub trait MarkerProcessor {
    /// Process the line starting at `position` and return where to continue,
    /// or `None` when the text is exhausted.
    fn process_position<'a>(
        &mut self,
        holder: &mut ProductionHolder,
        position: Position<'a>,
    ) -> Option<Position<'a>>;

    /// Complete every marker still open at the end of the text.
    fn flush_markers(&mut self, holder: &mut ProductionHolder);
}

/// Creates the marker processor for each parse.
pub trait MarkerProcessorFactory {
    fn create_marker_processor(&self) -> Box<dyn MarkerProcessor>;
}

/// Default for [`ParserOptions::max_nesting_depth`].
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Tuning knobs for [`MarkdownParser`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Block containers, and inline constructs within one inline range,
    /// nested deeper than this are read as text.
    pub max_nesting_depth: usize,
    /// Expand paragraphs and heading contents into inline subtrees.
    pub expand_inlines: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            expand_inlines: true,
        }
    }
}

/// Builds Markdown syntax trees.
///
/// ```
/// use markdown_tree_syntax::{MarkdownParser, SyntaxKind};
///
/// let parser = MarkdownParser::default();
/// let tree = parser.build_markdown_tree("# Title\n");
/// assert_eq!(tree.kind(), SyntaxKind::MARKDOWN_FILE);
/// assert_eq!(tree.text().to_string(), "# Title\n");
/// ```
#[derive(Debug, Clone)]
pub struct MarkdownParser<F = BlockMarkerProcessorFactory> {
    factory: F,
    options: ParserOptions,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::with_options(ParserOptions::default())
    }
}

impl MarkdownParser {
    /// A parser using the block processor configured by `options`.
    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            factory: BlockMarkerProcessorFactory::new(options.clone()),
            options,
        }
    }
}

impl<F: MarkerProcessorFactory> MarkdownParser<F> {
    /// A parser driven by a custom marker processor.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            options: ParserOptions::default(),
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse a whole document into a `MARKDOWN_FILE` tree.
    pub fn build_markdown_tree(&self, text: &str) -> SyntaxNode {
        self.parse(SyntaxKind::MARKDOWN_FILE, text, self.options.expand_inlines)
    }

    /// Parse `text` into a tree rooted at `root`.
    ///
    /// The root always spans the whole text. With `expand_inlines` off,
    /// inline-bearing leaves stay single tokens.
    pub fn parse(&self, root: SyntaxKind, text: &str, expand_inlines: bool) -> SyntaxNode {
        let mut holder = ProductionHolder::new();
        let root_marker = holder.mark();
        let mut processor = self.factory.create_marker_processor();

        let mut position = LookaheadText::new(text).start_position();
        while let Some(current) = position {
            holder.update_position(current.offset());
            position = processor.process_position(&mut holder, current);
        }
        holder.update_position(text.len());
        processor.flush_markers(&mut holder);
        root_marker.done(&mut holder, root);

        let production = holder.into_production();
        log::trace!("{} productions for {} bytes", production.len(), text.len());

        let assembler = TreeAssembler::new(text, LexingTokenSource::new(text), expand_inlines)
            .with_max_nesting_depth(self.options.max_nesting_depth);
        SyntaxNode::new_root(assembler.build(&production))
    }
}

/// Parse the inline content of `text[start..end]` into a tree rooted at
/// `root`.
///
/// Offsets in the returned tree are relative to `start`. Every `>` that
/// begins a line of the range is read as a block quote marker.
///
/// ```
/// use markdown_tree_syntax::{SyntaxKind, parser::parse_inline};
///
/// let tree = parse_inline(SyntaxKind::PARAGRAPH, "> *hi*", 2, 6);
/// let emph = tree.first_child().unwrap();
/// assert_eq!(emph.kind(), SyntaxKind::EMPH);
/// ```
pub fn parse_inline(root: SyntaxKind, text: &str, start: usize, end: usize) -> SyntaxNode {
    let cache = TokensCache::new(text, start..end);
    SyntaxNode::new_root(parse_inline_green(root, &cache, DEFAULT_MAX_NESTING_DEPTH))
}

pub(crate) fn parse_inline_green(
    root: SyntaxKind,
    cache: &TokensCache<'_>,
    max_nesting_depth: usize,
) -> GreenNode {
    let text = cache.text();
    let range = cache.range();
    let ranges = filter_block_quotes(cache, 0..cache.len());
    let nodes = run_parsing_sequence(cache, ranges, &default_parsers());
    let nodes = limit_nesting(nodes, max_nesting_depth);

    let mut production: Vec<ProductionNode> = nodes
        .into_iter()
        .filter(|n| !n.range.is_empty())
        .map(|n| ProductionNode::new(cache.byte_range(n.range), n.kind))
        .collect();
    production.push(ProductionNode::new(range, root));

    TreeAssembler::new(text, cache, false).build(&production)
}

/// Parse a document with the default parser.
pub fn parse(text: &str) -> SyntaxNode {
    MarkdownParser::default().build_markdown_tree(text)
}
