//! Forward-only cursor over the source text.
//!
//! The block processor is driven one [`Position`] at a time. A position only
//! ever moves forward, either to the start of the next line or by a number of
//! bytes within the text.

/// Read-only lookahead view of the source text.
#[derive(Debug, Clone, Copy)]
pub struct LookaheadText<'a> {
    text: &'a str,
}

impl<'a> LookaheadText<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// The first position, or `None` for empty text.
    pub fn start_position(&self) -> Option<Position<'a>> {
        (!self.text.is_empty()).then_some(Position {
            text: self.text,
            offset: 0,
        })
    }
}

/// A byte offset into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Position<'a> {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// The rest of the current line, without its line ending.
    pub fn current_line(&self) -> &'a str {
        let line = &self.text[self.offset..self.line_end()];
        line.strip_suffix('\r').unwrap_or(line)
    }

    /// Offset of the `\n` ending the current line, or the text length.
    pub fn line_end(&self) -> usize {
        self.text[self.offset..]
            .find('\n')
            .map_or(self.text.len(), |i| self.offset + i)
    }

    /// Start of the next line, or `None` when this is the last line.
    pub fn next_line_position(&self) -> Option<Position<'a>> {
        let end = self.line_end();
        self.at(end + 1)
    }

    /// The position `delta` bytes ahead, or `None` past the end of the text.
    pub fn next_position(&self, delta: usize) -> Option<Position<'a>> {
        self.at(self.offset + delta)
    }

    fn at(&self, offset: usize) -> Option<Position<'a>> {
        (offset < self.text.len() && self.text.is_char_boundary(offset)).then_some(Position {
            text: self.text,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_text_has_no_start() {
        assert_eq!(LookaheadText::new("").start_position(), None);
    }

    #[test]
    fn walks_lines() {
        let text = LookaheadText::new("one\r\ntwo\n\nthree");
        let mut lines = Vec::new();
        let mut pos = text.start_position();
        while let Some(p) = pos {
            lines.push((p.offset(), p.current_line()));
            pos = p.next_line_position();
        }
        assert_eq!(lines, vec![(0, "one"), (5, "two"), (9, ""), (10, "three")]);
    }

    #[test]
    fn trailing_newline_ends_iteration() {
        let pos = LookaheadText::new("a\n").start_position().unwrap();
        assert_eq!(pos.next_line_position(), None);
    }

    #[test]
    fn next_position_stays_in_bounds() {
        let pos = LookaheadText::new("abc").start_position().unwrap();
        assert_eq!(pos.next_position(2).map(|p| p.offset()), Some(2));
        assert_eq!(pos.next_position(3), None);
    }
}
