//! # Tree Assembler - Productions to Rowan Tree
//!
//! Turns a production log into a rowan green tree. The log is a flat list of
//! `(range, kind)` entries in completion order. Each entry is split into a
//! start and an end event (or a single empty event for zero-width ranges),
//! the events are sorted by position, and the sorted sequence is read like
//! the `Start`/`Finish` events of an event-based parser.
//!
//! ## Event ordering
//!
//! At a shared offset:
//!
//! - ends come before empty entries, which come before starts
//! - among ends, the later start closes first, then the earlier log entry
//! - among starts, the later end opens first, then the later log entry
//!
//! Markers complete inner-first, so a parent always follows its children in
//! the log. With these ties a well-nested log yields a well-formed bracket
//! sequence. An ill-nested log is a contract violation and panics.
//!
//! ## Leaves and gaps
//!
//! Bytes inside a node that no nested production covers are filled with raw
//! tokens from a [`TokenSource`]. A production with no nested productions is
//! a leaf: a token when its kind is a token kind, an inline subtree when its
//! kind is inline-bearing and inline expansion is on, otherwise a token (for
//! inline-bearing kinds) or a node of raw tokens.
//!
//! Inline-bearing productions may contain `QUOTE_MARKER` tokens, the `>` of
//! continuation lines. They are still leaves; the marker offsets tell the
//! inline lexer which `>` to reclassify.

use std::cmp::{Ordering, Reverse};
use std::ops::Range;

use rowan::{GreenNode, GreenToken, NodeOrToken};

use crate::lexer::{LexedToken, lex_range};
use crate::parser::DEFAULT_MAX_NESTING_DEPTH;
use crate::parser::production::ProductionNode;
use crate::sequential::TokensCache;
use crate::syntax_kind::SyntaxKind;

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Supplies the raw tokens for ranges that no production covers.
pub trait TokenSource {
    fn tokens_in(&self, range: Range<usize>) -> Vec<LexedToken>;
}

/// Lexes each gap on demand.
#[derive(Debug, Clone, Copy)]
pub struct LexingTokenSource<'a> {
    text: &'a str,
}

impl<'a> LexingTokenSource<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }
}

impl TokenSource for LexingTokenSource<'_> {
    fn tokens_in(&self, range: Range<usize>) -> Vec<LexedToken> {
        lex_range(self.text, range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventClass {
    End,
    Empty,
    Start,
}

#[derive(Debug, Clone, Copy)]
struct Event {
    position: usize,
    class: EventClass,
    index: usize,
}

enum Child {
    Gap(Range<usize>),
    Built(Range<usize>, GreenElement),
}

struct Frame {
    index: usize,
    children: Vec<Child>,
}

/// Builds green trees from production logs.
pub struct TreeAssembler<'a, S> {
    text: &'a str,
    source: S,
    expand_inlines: bool,
    max_nesting_depth: usize,
}

impl<'a, S: TokenSource> TreeAssembler<'a, S> {
    pub fn new(text: &'a str, source: S, expand_inlines: bool) -> Self {
        Self {
            text,
            source,
            expand_inlines,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Limit the nesting of inline constructs in expanded subtrees.
    pub fn with_max_nesting_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }

    /// Build the tree. The last production of a well-formed log is the root.
    pub fn build(&self, production: &[ProductionNode]) -> GreenNode {
        let events = sort_events(production);
        let mut stack: Vec<Frame> = Vec::new();
        let mut root = None;
        let mut cursor = events.first().map_or(0, |e| e.position);

        for event in events {
            if event.position > cursor {
                if let Some(top) = stack.last_mut() {
                    top.children.push(Child::Gap(cursor..event.position));
                }
            }
            cursor = event.position;

            match event.class {
                EventClass::Start => stack.push(Frame {
                    index: event.index,
                    children: Vec::new(),
                }),
                EventClass::End => {
                    let frame = stack
                        .pop()
                        .unwrap_or_else(|| panic!("production {} ends with no open node", event.index));
                    assert_eq!(
                        frame.index, event.index,
                        "production log is not well nested: {:?} closes while {:?} is open",
                        production[event.index], production[frame.index]
                    );
                    let node = &production[frame.index];
                    let element = self.finish(node, frame.children, stack.is_empty());
                    match stack.last_mut() {
                        Some(parent) => parent
                            .children
                            .push(Child::Built(node.range.clone(), element)),
                        None => root = Some(element),
                    }
                }
                EventClass::Empty => {
                    let node = &production[event.index];
                    let element = self.finish(node, Vec::new(), stack.is_empty());
                    match stack.last_mut() {
                        Some(parent) => parent
                            .children
                            .push(Child::Built(node.range.clone(), element)),
                        None => root = Some(element),
                    }
                }
            }
        }

        assert!(stack.is_empty(), "{} productions left open", stack.len());
        match root {
            Some(NodeOrToken::Node(node)) => node,
            Some(NodeOrToken::Token(token)) => {
                GreenNode::new(token.kind(), vec![NodeOrToken::Token(token)])
            }
            None => GreenNode::new(SyntaxKind::MARKDOWN_FILE.into(), Vec::new()),
        }
    }

    fn finish(&self, node: &ProductionNode, children: Vec<Child>, is_root: bool) -> GreenElement {
        if !is_root && node.kind.is_inline_bearing() {
            if let Some(quote_markers) = quote_markers_only(&children) {
                return self.leaf(node, &quote_markers);
            }
        }
        let has_nested = children.iter().any(|c| matches!(c, Child::Built(..)));
        if has_nested || is_root {
            let mut elements = Vec::new();
            for child in children {
                match child {
                    Child::Gap(range) => elements.extend(self.raw_tokens(range)),
                    Child::Built(_, element) => elements.push(element),
                }
            }
            return NodeOrToken::Node(GreenNode::new(node.kind.into(), elements));
        }
        self.leaf(node, &[])
    }

    fn leaf(&self, node: &ProductionNode, quote_markers: &[usize]) -> GreenElement {
        let kind = node.kind;
        let range = node.range.clone();
        if kind.is_token() {
            return NodeOrToken::Token(GreenToken::new(kind.into(), &self.text[range]));
        }
        if kind.is_inline_bearing() {
            if self.expand_inlines {
                log::trace!("expanding inlines of {kind:?} at {range:?}");
                let cache = TokensCache::with_quote_markers(self.text, range, quote_markers);
                return NodeOrToken::Node(super::parse_inline_green(
                    kind,
                    &cache,
                    self.max_nesting_depth,
                ));
            }
            return NodeOrToken::Token(GreenToken::new(kind.into(), &self.text[range]));
        }
        NodeOrToken::Node(GreenNode::new(kind.into(), self.raw_tokens(range)))
    }

    fn raw_tokens(&self, range: Range<usize>) -> Vec<GreenElement> {
        self.source
            .tokens_in(range)
            .into_iter()
            .map(|t| NodeOrToken::Token(GreenToken::new(t.kind.into(), t.text(self.text))))
            .collect()
    }
}

/// Start offsets of the nested productions when all of them are
/// `QUOTE_MARKER` tokens.
fn quote_markers_only(children: &[Child]) -> Option<Vec<usize>> {
    let mut markers = Vec::new();
    for child in children {
        if let Child::Built(range, element) = child {
            if element.kind() != rowan::SyntaxKind::from(SyntaxKind::QUOTE_MARKER) {
                return None;
            }
            markers.push(range.start);
        }
    }
    Some(markers)
}

fn sort_events(production: &[ProductionNode]) -> Vec<Event> {
    let mut events = Vec::with_capacity(production.len() * 2);
    for (index, node) in production.iter().enumerate() {
        if node.range.is_empty() {
            events.push(Event {
                position: node.range.start,
                class: EventClass::Empty,
                index,
            });
        } else {
            events.push(Event {
                position: node.range.start,
                class: EventClass::Start,
                index,
            });
            events.push(Event {
                position: node.range.end,
                class: EventClass::End,
                index,
            });
        }
    }

    events.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then(a.class.cmp(&b.class))
            .then_with(|| tie_break(production, a, b))
    });
    events
}

fn tie_break(production: &[ProductionNode], a: &Event, b: &Event) -> Ordering {
    let (ra, rb) = (&production[a.index].range, &production[b.index].range);
    match a.class {
        EventClass::End => Reverse(ra.start)
            .cmp(&Reverse(rb.start))
            .then(a.index.cmp(&b.index)),
        EventClass::Start => Reverse(ra.end)
            .cmp(&Reverse(rb.end))
            .then(Reverse(a.index).cmp(&Reverse(b.index))),
        EventClass::Empty => a.index.cmp(&b.index),
    }
}
