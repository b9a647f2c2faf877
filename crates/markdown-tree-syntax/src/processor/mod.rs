//! Block structure recognition.
//!
//! The [`BlockMarkerProcessor`] is the default [`MarkerProcessor`]: it reads
//! the document line by line and records block productions (quotes, lists,
//! headings, code fences, paragraphs) in a
//! [`ProductionHolder`](crate::parser::production::ProductionHolder).
//!
//! [`MarkerProcessor`]: crate::parser::MarkerProcessor

mod block;
pub mod line;

pub use block::{BlockMarkerProcessor, BlockMarkerProcessorFactory};
