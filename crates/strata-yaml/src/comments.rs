//! Comment attribution.
//!
//! yaml-rust2 discards comments, so they are recovered from the raw source
//! text after the token tree is built. A monotonically advancing cursor
//! guarantees that no comment line is ever attributed to two nodes.

/// Collects `#` comment runs from the source, line by line.
pub struct CommentSink {
    lines: Vec<String>,
    /// Index of the first line that has not been consumed yet (0-based).
    cursor: usize,
}

impl CommentSink {
    pub fn new(source: &str) -> Self {
        Self {
            lines: source.lines().map(|l| l.to_string()).collect(),
            cursor: 0,
        }
    }

    /// Detach the document-level comment block, if one exists: a run of
    /// comment lines at the very top of the source followed by a blank line.
    /// Advances the cursor past the block so it cannot also be claimed by
    /// the first node.
    pub fn take_document_comments(&mut self) -> Vec<String> {
        let mut end = 0;
        while end < self.lines.len() && is_comment(&self.lines[end]) {
            end += 1;
        }
        if end == 0 || end >= self.lines.len() || !self.lines[end].trim().is_empty() {
            return Vec::new();
        }
        let block = self.lines[..end].iter().map(|l| comment_text(l)).collect();
        self.cursor = end + 1;
        block
    }

    /// Take the contiguous run of comment lines immediately above `line`
    /// (1-based), stopping at the cursor so already-consumed lines are never
    /// handed out twice. Advances the cursor to `line`.
    pub fn take_before(&mut self, line: usize) -> Vec<String> {
        let target = line.saturating_sub(1).min(self.lines.len());
        let mut start = target;
        while start > self.cursor && is_comment(&self.lines[start - 1]) {
            start -= 1;
        }
        let run: Vec<String> = self.lines[start..target].iter().map(|l| comment_text(l)).collect();
        if target > self.cursor {
            self.cursor = target;
        }
        run
    }
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Strip the leading `#` and at most one following space.
fn comment_text(line: &str) -> String {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix('#').unwrap_or(trimmed);
    rest.strip_prefix(' ').unwrap_or(rest).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_before_collects_run() {
        let mut sink = CommentSink::new("# one\n# two\nkey: value\n");
        assert_eq!(sink.take_before(3), vec!["one", "two"]);
        // The run is consumed; a second claim gets nothing.
        assert_eq!(sink.take_before(3), Vec::<String>::new());
    }

    #[test]
    fn test_run_stops_at_non_comment() {
        let mut sink = CommentSink::new("a: 1\n# about b\nb: 2\n");
        assert_eq!(sink.take_before(1), Vec::<String>::new());
        assert_eq!(sink.take_before(3), vec!["about b"]);
    }

    #[test]
    fn test_document_comments_need_blank_separator() {
        let mut sink = CommentSink::new("# doc header\n\nkey: value\n");
        assert_eq!(sink.take_document_comments(), vec!["doc header"]);
        // Already consumed by the document block.
        assert_eq!(sink.take_before(3), Vec::<String>::new());

        let mut sink = CommentSink::new("# belongs to key\nkey: value\n");
        assert!(sink.take_document_comments().is_empty());
        assert_eq!(sink.take_before(2), vec!["belongs to key"]);
    }

    #[test]
    fn test_marker_stripping() {
        assert_eq!(comment_text("#no space"), "no space");
        assert_eq!(comment_text("#  indented text"), " indented text");
        assert_eq!(comment_text("  # leading ws"), "leading ws");
    }
}
