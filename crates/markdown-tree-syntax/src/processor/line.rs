//! Recognizers for the block constructs that can start on a line.
//!
//! Every function takes the remainder of a line (after the prefixes of the
//! containers it continues) and reports byte ranges relative to it.

use std::ops::Range;

const TAB_STOP: usize = 4;

/// Leading spaces and tabs as `(columns, bytes)`.
pub fn indentation(s: &str) -> (usize, usize) {
    let mut columns = 0;
    let mut bytes = 0;
    for b in s.bytes() {
        match b {
            b' ' => columns += 1,
            b'\t' => columns += TAB_STOP - columns % TAB_STOP,
            _ => break,
        }
        bytes += 1;
    }
    (columns, bytes)
}

/// Bytes to skip to consume `columns` columns of indentation, or `None` when
/// the line is indented less.
pub fn consume_columns(s: &str, columns: usize) -> Option<usize> {
    let mut seen = 0;
    for (i, b) in s.bytes().enumerate() {
        if seen >= columns {
            return Some(i);
        }
        match b {
            b' ' => seen += 1,
            b'\t' => seen += TAB_STOP - seen % TAB_STOP,
            _ => return None,
        }
    }
    (seen >= columns).then_some(s.len())
}

pub fn is_blank(s: &str) -> bool {
    s.bytes().all(|b| b == b' ' || b == b'\t')
}

/// Length of `s` without trailing spaces and tabs.
pub fn trimmed_len(s: &str) -> usize {
    s.trim_end_matches([' ', '\t']).len()
}

fn run_length(s: &str, c: u8) -> usize {
    s.bytes().take_while(|&b| b == c).count()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtxHeading {
    pub level: usize,
    pub open: Range<usize>,
    pub content: Option<Range<usize>>,
    pub close: Option<Range<usize>>,
}

impl AtxHeading {
    pub fn range(&self) -> Range<usize> {
        let end = self
            .close
            .as_ref()
            .or(self.content.as_ref())
            .map_or(self.open.end, |r| r.end);
        self.open.start..end
    }
}

/// `# Heading #`: one to six `#`, then whitespace or the end of the line.
pub fn atx_heading(s: &str) -> Option<AtxHeading> {
    let (columns, start) = indentation(s);
    if columns > 3 {
        return None;
    }
    let level = run_length(&s[start..], b'#');
    if !(1..=6).contains(&level) {
        return None;
    }
    let after = start + level;
    if !matches!(s.as_bytes().get(after), None | Some(b' ') | Some(b'\t')) {
        return None;
    }

    let open = start..after;
    let end = trimmed_len(s);
    if end <= after {
        return Some(AtxHeading {
            level,
            open,
            content: None,
            close: None,
        });
    }

    let content_start = after + indentation(&s[after..]).1;
    let body = &s[content_start..end];
    let hashes = body.len() - body.trim_end_matches('#').len();
    let run_start = end - hashes;

    let (content, close) = if hashes == 0 {
        (Some(content_start..end), None)
    } else if run_start == content_start {
        (None, Some(run_start..end))
    } else if s[..run_start].ends_with([' ', '\t']) {
        let content_end = trimmed_len(&s[..run_start]);
        (Some(content_start..content_end), Some(run_start..end))
    } else {
        (Some(content_start..end), None)
    };

    Some(AtxHeading {
        level,
        open,
        content,
        close,
    })
}

/// Level and range of a setext underline (`===` or `---`).
pub fn setext_underline(s: &str) -> Option<(usize, Range<usize>)> {
    let (columns, start) = indentation(s);
    if columns > 3 {
        return None;
    }
    let (c, level) = match s.as_bytes().get(start) {
        Some(b'=') => (b'=', 1),
        Some(b'-') => (b'-', 2),
        _ => return None,
    };
    let end = start + run_length(&s[start..], c);
    is_blank(&s[end..]).then_some((level, start..end))
}

/// `***`, `---` or `___`, optionally with spaces between the characters.
pub fn thematic_break(s: &str) -> Option<Range<usize>> {
    let (columns, start) = indentation(s);
    if columns > 3 {
        return None;
    }
    let c = *s.as_bytes().get(start)?;
    if !matches!(c, b'*' | b'-' | b'_') {
        return None;
    }
    let mut count = 0;
    for b in s[start..].bytes() {
        match b {
            b' ' | b'\t' => {}
            b if b == c => count += 1,
            _ => return None,
        }
    }
    (count >= 3).then_some(start..trimmed_len(s))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceOpen {
    pub fence_char: char,
    pub length: usize,
    pub indent: usize,
    pub run: Range<usize>,
    pub info: Option<Range<usize>>,
}

/// Opening code fence: three or more backticks or tildes.
///
/// Any indentation is accepted, the renderer strips it from the content.
pub fn fence_open(s: &str) -> Option<FenceOpen> {
    let (indent, start) = indentation(s);
    let c = *s.as_bytes().get(start)?;
    if !matches!(c, b'`' | b'~') {
        return None;
    }
    let length = run_length(&s[start..], c);
    if length < 3 {
        return None;
    }
    let run = start..start + length;
    let info_start = run.end + indentation(&s[run.end..]).1;
    let info_end = trimmed_len(s).max(info_start);
    let info = &s[info_start..info_end];
    if c == b'`' && info.contains('`') {
        return None;
    }
    Some(FenceOpen {
        fence_char: c as char,
        length,
        indent,
        run,
        info: (!info.is_empty()).then_some(info_start..info_end),
    })
}

/// Closing fence: a run of `fence_char` at least `min_length` long followed
/// only by whitespace.
pub fn fence_close(s: &str, fence_char: char, min_length: usize) -> Option<Range<usize>> {
    let (_, start) = indentation(s);
    let length = run_length(&s[start..], fence_char as u8);
    if length < min_length {
        return None;
    }
    let end = start + length;
    is_blank(&s[end..]).then_some(start..end)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker {
    pub ordered: bool,
    /// Bullet character, or `.`/`)` for ordered lists.
    pub delimiter: char,
    pub number: Option<u64>,
    pub marker: Range<usize>,
    /// End of the marker token, trailing spaces included.
    pub token_end: usize,
    /// Columns from the start of `s` to the item content.
    pub content_indent: usize,
    pub has_content: bool,
}

impl ListMarker {
    /// Whether this marker may start a list in the middle of a paragraph.
    pub fn can_interrupt_paragraph(&self) -> bool {
        self.has_content && (!self.ordered || self.number == Some(1))
    }
}

/// `-`, `*`, `+`, or one to nine digits followed by `.` or `)`.
pub fn list_marker(s: &str) -> Option<ListMarker> {
    let (columns, start) = indentation(s);
    if columns > 3 {
        return None;
    }
    let bytes = s.as_bytes();
    let first = *bytes.get(start)?;

    let (ordered, delimiter, number, width) = match first {
        b'-' | b'*' | b'+' => (false, first as char, None, 1),
        b'0'..=b'9' => {
            let digits = s[start..].bytes().take_while(u8::is_ascii_digit).count();
            if digits > 9 {
                return None;
            }
            match bytes.get(start + digits) {
                Some(&d @ (b'.' | b')')) => {
                    let number = s[start..start + digits].parse().ok();
                    (true, d as char, number, digits + 1)
                }
                _ => return None,
            }
        }
        _ => return None,
    };

    let after = start + width;
    if !matches!(bytes.get(after), None | Some(b' ') | Some(b'\t')) {
        return None;
    }

    let tail = &s[after..];
    let has_content = !is_blank(tail);
    let (spaces, space_bytes) = indentation(tail);
    let (token_end, content_indent) = if !has_content {
        (after, columns + width + 1)
    } else if spaces <= 4 {
        (after + space_bytes, columns + width + spaces)
    } else {
        (after + space_bytes, columns + width + 1)
    };

    Some(ListMarker {
        ordered,
        delimiter,
        number,
        marker: start..after,
        token_end,
        content_indent,
        has_content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("# Title #", Some(2..7), Some(8..9))]
    #[case("# #", None, Some(2..3))]
    #[case("#", None, None)]
    #[case("## a ##  ", Some(3..4), Some(5..7))]
    #[case("# foo#", Some(2..6), None)]
    #[case("# foo \\#", Some(2..8), None)]
    fn atx_parts(
        #[case] line: &str,
        #[case] content: Option<Range<usize>>,
        #[case] close: Option<Range<usize>>,
    ) {
        let heading = atx_heading(line).unwrap();
        assert_eq!((heading.content, heading.close), (content, close));
    }

    #[rstest]
    #[case("#hashtag")]
    #[case("####### seven")]
    #[case("    # indented")]
    fn not_atx(#[case] line: &str) {
        assert_eq!(atx_heading(line), None);
    }

    #[test]
    fn atx_range_ends_at_last_marker() {
        assert_eq!(atx_heading("  ### x ###   ").unwrap().range(), 2..11);
    }

    #[rstest]
    #[case("***", true)]
    #[case(" - - -", true)]
    #[case("_____", true)]
    #[case("--", false)]
    #[case("*-*", false)]
    #[case("    ***", false)]
    fn thematic_breaks(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(thematic_break(line).is_some(), expected);
    }

    #[test]
    fn setext_levels() {
        assert_eq!(setext_underline("===  "), Some((1, 0..3)));
        assert_eq!(setext_underline("  -"), Some((2, 2..3)));
        assert_eq!(setext_underline("= ="), None);
    }

    #[test]
    fn indented_fence_keeps_indent() {
        let fence = fence_open("    ```python ").unwrap();
        assert_eq!(fence.indent, 4);
        assert_eq!(fence.run, 4..7);
        assert_eq!(fence.info, Some(7..13));
    }

    #[test]
    fn backtick_info_may_not_contain_backticks() {
        assert_eq!(fence_open("``` a`b"), None);
        assert!(fence_open("~~~ a`b").is_some());
    }

    #[test]
    fn fence_close_needs_enough_characters() {
        assert_eq!(fence_close("  ````  ", '`', 4), Some(2..6));
        assert_eq!(fence_close("```", '`', 4), None);
        assert_eq!(fence_close("~~~", '`', 3), None);
        assert_eq!(fence_close("``` x", '`', 3), None);
    }

    #[test]
    fn bullet_marker() {
        let marker = list_marker("-  item").unwrap();
        assert_eq!(marker.marker, 0..1);
        assert_eq!(marker.token_end, 3);
        assert_eq!(marker.content_indent, 3);
        assert!(marker.can_interrupt_paragraph());
    }

    #[test]
    fn ordered_marker() {
        let marker = list_marker(" 12) x").unwrap();
        assert!(marker.ordered);
        assert_eq!(marker.delimiter, ')');
        assert_eq!(marker.number, Some(12));
        assert_eq!(marker.content_indent, 5);
        assert!(!marker.can_interrupt_paragraph());
    }

    #[test]
    fn empty_item_content_indent() {
        let marker = list_marker("-").unwrap();
        assert!(!marker.has_content);
        assert_eq!(marker.token_end, 1);
        assert_eq!(marker.content_indent, 2);
    }

    #[rstest]
    #[case("-item")]
    #[case("1234567890. x")]
    #[case("a. x")]
    fn not_list_markers(#[case] line: &str) {
        assert_eq!(list_marker(line), None);
    }

    #[test]
    fn consume_columns_with_tabs() {
        assert_eq!(consume_columns("  x", 2), Some(2));
        assert_eq!(consume_columns("\tx", 2), Some(1));
        assert_eq!(consume_columns(" x", 2), None);
        assert_eq!(consume_columns("   ", 2), Some(2));
    }
}
