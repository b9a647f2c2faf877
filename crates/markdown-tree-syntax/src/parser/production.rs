//! The production log and the marker API used to fill it.
//!
//! Block parsing never builds tree nodes directly. It records
//! [`ProductionNode`]s: a kind plus the byte range it covers. The
//! [`TreeAssembler`](super::builder::TreeAssembler) later turns the log into
//! a rowan tree.
//!
//! Nodes whose end is not known yet are tracked with a [`Marker`]:
//!
//! ```
//! use markdown_tree_syntax::parser::production::ProductionHolder;
//! use markdown_tree_syntax::SyntaxKind;
//!
//! let mut holder = ProductionHolder::new();
//! let m = holder.mark();
//! holder.update_position(5);
//! m.done(&mut holder, SyntaxKind::PARAGRAPH);
//!
//! assert_eq!(holder.production()[0].range, 0..5);
//! ```
//!
//! A [`Marker`] must be completed or abandoned. Dropping one is a bug and
//! panics.

use std::ops::Range;

use crate::syntax_kind::SyntaxKind;

/// One entry of the production log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionNode {
    pub range: Range<usize>,
    pub kind: SyntaxKind,
}

impl ProductionNode {
    pub fn new(range: Range<usize>, kind: SyntaxKind) -> Self {
        Self { range, kind }
    }
}

/// Append-only record of completed markers and raw token productions.
#[derive(Debug, Default)]
pub struct ProductionHolder {
    production: Vec<ProductionNode>,
    position: usize,
}

impl ProductionHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current byte offset. New markers open here.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Advance the current position. Positions never move backwards.
    pub fn update_position(&mut self, position: usize) {
        assert!(
            position >= self.position,
            "production position moved backwards: {} -> {}",
            self.position,
            position
        );
        self.position = position;
    }

    /// Open a marker at the current position.
    pub fn mark(&self) -> Marker {
        Marker {
            start: self.position,
            completed: false,
        }
    }

    /// Record a node or token whose range is already known.
    pub fn add_production(&mut self, range: Range<usize>, kind: SyntaxKind) {
        assert!(range.start <= range.end, "inverted production range {range:?}");
        self.production.push(ProductionNode { range, kind });
    }

    pub fn production(&self) -> &[ProductionNode] {
        &self.production
    }

    pub fn into_production(self) -> Vec<ProductionNode> {
        self.production
    }
}

/// A node whose start is known but whose end is not.
///
/// The `#[must_use]` attribute and the `Drop` impl together enforce that
/// every marker is either:
///
/// - **Completed** via [`Marker::done`] or [`Marker::done_at`], which
///   appends a production to the log
/// - **Abandoned** via [`Marker::abandon`], which records nothing
#[must_use = "Markers must be completed or abandoned, dropping them is a bug"]
#[derive(Debug)]
pub struct Marker {
    start: usize,
    completed: bool,
}

impl Marker {
    pub fn start(&self) -> usize {
        self.start
    }

    /// Complete the marker at the holder's current position.
    pub fn done(self, holder: &mut ProductionHolder, kind: SyntaxKind) -> CompletedMarker {
        let end = holder.position();
        self.done_at(holder, kind, end)
    }

    /// Complete the marker at an explicit end offset.
    ///
    /// Containers use this to end before trailing blank lines, which are
    /// then left to the parent as plain `EOL` tokens.
    pub fn done_at(
        mut self,
        holder: &mut ProductionHolder,
        kind: SyntaxKind,
        end: usize,
    ) -> CompletedMarker {
        self.completed = true;
        assert!(
            self.start <= end,
            "marker for {kind:?} ends at {end} before its start {}",
            self.start
        );
        holder.add_production(self.start..end, kind);
        CompletedMarker {
            start: self.start,
            end,
            kind,
        }
    }

    /// Drop the marker without producing a node.
    pub fn abandon(mut self) {
        self.completed = true;
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("Marker must be either completed or abandoned");
        }
    }
}

/// A marker that has been committed to the log.
///
/// A completed marker can [`precede`](CompletedMarker::precede) to open a
/// new marker at the same start. When that marker completes later, its
/// production is the later entry in the log and therefore wraps this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedMarker {
    start: usize,
    end: usize,
    kind: SyntaxKind,
}

impl CompletedMarker {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Open a new parent marker starting where this node starts.
    pub fn precede(self) -> Marker {
        Marker {
            start: self.start,
            completed: false,
        }
    }
}
