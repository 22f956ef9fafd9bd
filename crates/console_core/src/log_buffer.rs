//! Bounded local copy of the remote job log.
//!
//! Every poll carries the complete remote list, so reconciliation is a
//! replacement. What changes between snapshots is computed separately so the
//! console can print only lines it has not shown yet.

pub const DEFAULT_MAX_LOG_LINES: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBuffer {
    /// Oldest first.
    lines: Vec<String>,
    capacity: usize,
    /// Tail of `lines` not yet handed to the renderer.
    unrendered: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_LOG_LINES)
    }
}

impl LogBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: Vec::new(),
            capacity: capacity.max(1),
            unrendered: 0,
        }
    }

    /// Replace the buffer with a fresh remote snapshot.
    ///
    /// Returns the number of lines that are new relative to the previous
    /// snapshot. Returns `None` when the snapshot is identical.
    pub fn replace(&mut self, mut snapshot: Vec<String>) -> Option<usize> {
        if snapshot.len() > self.capacity {
            snapshot.drain(..snapshot.len() - self.capacity);
        }
        if snapshot == self.lines {
            return None;
        }

        let appended = appended_since(&self.lines, &snapshot).len();
        self.unrendered = if appended == snapshot.len() {
            appended
        } else {
            (self.unrendered + appended).min(snapshot.len())
        };
        self.lines = snapshot;
        Some(appended)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Most recent first. Storage order is never changed.
    pub fn display_order(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().rev().map(String::as_str)
    }

    /// Lines appended since the last [`LogBuffer::mark_rendered`], oldest first.
    pub fn unrendered(&self) -> &[String] {
        &self.lines[self.lines.len() - self.unrendered..]
    }

    pub fn mark_rendered(&mut self) {
        self.unrendered = 0;
    }
}

/// Lines of `next` that follow the longest overlap between the end of
/// `previous` and the start of `next`.
///
/// Growth (`[a, b]` to `[a, b, c]`) and a sliding remote window
/// (`[a, b, c]` to `[b, c, d]`) both yield only the genuinely new tail. A list
/// with no overlap is new in its entirety.
pub fn appended_since<'a>(previous: &[String], next: &'a [String]) -> &'a [String] {
    let max_overlap = previous.len().min(next.len());
    let overlap = (1..=max_overlap)
        .rev()
        .find(|&k| previous[previous.len() - k..] == next[..k])
        .unwrap_or(0);
    &next[overlap..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn appended_on_growth() {
        let prev = lines(&["a", "b"]);
        let next = lines(&["a", "b", "c"]);
        assert_eq!(appended_since(&prev, &next), &lines(&["c"])[..]);
    }

    #[test]
    fn appended_on_sliding_window() {
        let prev = lines(&["a", "b", "c"]);
        let next = lines(&["b", "c", "d", "e"]);
        assert_eq!(appended_since(&prev, &next), &lines(&["d", "e"])[..]);
    }

    #[test]
    fn appended_with_repeated_lines() {
        let prev = lines(&["x", "x"]);
        let next = lines(&["x", "x", "x"]);
        assert_eq!(appended_since(&prev, &next), &lines(&["x"])[..]);
    }

    #[test]
    fn unrelated_snapshot_is_all_new() {
        let prev = lines(&["a", "b"]);
        let next = lines(&["c"]);
        assert_eq!(appended_since(&prev, &next), &next[..]);
        assert!(appended_since(&prev, &[]).is_empty());
    }

    #[test]
    fn replace_keeps_most_recent_within_capacity() {
        let mut buffer = LogBuffer::with_capacity(2);
        buffer.replace(lines(&["a", "b", "c"]));
        assert_eq!(buffer.lines(), &lines(&["b", "c"])[..]);
        assert_eq!(buffer.display_order().collect::<Vec<_>>(), vec!["c", "b"]);
    }

    #[test]
    fn unrendered_accumulates_until_marked() {
        let mut buffer = LogBuffer::default();
        assert_eq!(buffer.replace(lines(&["a"])), Some(1));
        assert_eq!(buffer.replace(lines(&["a", "b"])), Some(1));
        assert_eq!(buffer.unrendered(), &lines(&["a", "b"])[..]);

        buffer.mark_rendered();
        assert!(buffer.unrendered().is_empty());
        assert_eq!(buffer.replace(lines(&["a", "b"])), None);
        assert!(buffer.unrendered().is_empty());

        assert_eq!(buffer.replace(Vec::new()), Some(0));
        assert!(buffer.lines().is_empty());
        assert!(buffer.unrendered().is_empty());
    }
}
