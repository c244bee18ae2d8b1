//! Paging of the recipient's message.

// non-blank lines per page
pub const LINES_PER_CHUNK: usize = 2;

/// Splits a message into pages of up to two non-blank lines each, in order.
///
/// A message with no non-blank lines becomes a single page holding the raw
/// message, so the result is never empty.
pub fn chunk_message(message: &str) -> Vec<String> {
    let lines: Vec<&str> = message.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return vec![message.to_string()];
    }
    lines
        .chunks(LINES_PER_CHUNK)
        .map(|pair| pair.join("\n"))
        .collect()
}

/// Cursor over the pages of a message. Moving past either end is a no-op.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pager {
    chunks: Vec<String>,
    index: usize,
}

impl Pager {
    pub fn new(message: &str) -> Self {
        Self {
            chunks: chunk_message(message),
            index: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.chunks[self.index]
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.chunks.len()
    }

    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    pub fn next_chunk(&mut self) -> bool {
        if self.has_next() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_chunk(&mut self) -> bool {
        if self.has_prev() {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_lines_make_three_pages() {
        let chunks = chunk_message("a\nb\nc\nd\ne");
        assert_eq!(chunks, vec!["a\nb", "c\nd", "e"]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let chunks = chunk_message("first\n\n   \nsecond\n\nthird\n");
        assert_eq!(chunks, vec!["first\nsecond", "third"]);
    }

    #[test]
    fn empty_message_is_one_empty_page() {
        assert_eq!(chunk_message(""), vec![String::new()]);
    }

    #[test]
    fn whitespace_only_message_is_kept_raw() {
        assert_eq!(chunk_message(" \n\t"), vec![" \n\t".to_string()]);
    }

    #[test]
    fn windows_line_endings() {
        assert_eq!(chunk_message("one\r\ntwo\r\nthree"), vec!["one\ntwo", "three"]);
    }

    #[test]
    fn pager_stops_at_both_ends() {
        let mut pager = Pager::new("Line1\nLine2\nLine3");
        assert_eq!(pager.len(), 2);
        assert_eq!(pager.current(), "Line1\nLine2");
        assert!(!pager.has_prev());
        assert!(!pager.prev_chunk());

        assert!(pager.next_chunk());
        assert_eq!(pager.current(), "Line3");
        assert!(!pager.has_next());
        assert!(!pager.next_chunk());
        assert_eq!(pager.index(), 1);

        pager.reset();
        assert_eq!(pager.index(), 0);
    }
}
