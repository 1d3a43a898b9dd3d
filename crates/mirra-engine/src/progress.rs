//! Parsers that turn raw transfer-tool output into completion percentages.
//!
//! Both parsers are total over arbitrary input: a malformed line never
//! errors, it simply yields no percentage. Values are not clamped here;
//! clamping happens where events are published.

/// Scan an rsync `--progress` line for a percentage token.
///
/// Returns the first whitespace-delimited token that ends in `%` and is
/// longer than the `%` itself, parsed as an integer. A matching token that
/// fails to parse suppresses the whole line.
#[must_use]
pub fn scan_rsync_percent(line: &str) -> Option<i64> {
    let token = line
        .split_whitespace()
        .find(|token| token.len() > 1 && token.ends_with('%'))?;
    token[..token.len() - 1].parse().ok()
}

/// Substring of debmirror output that marks the bulk package-download
/// sub-phase.
const POOL_MARKER: &str = "pool/";

/// Phase-aware parser for debmirror output.
///
/// Percentages are suppressed until the pool-directory path appears in a
/// line, so early negotiation noise is not reported as progress. The first
/// marker sighting emits an initial 1%; from then on, any line containing
/// `%` yields the token immediately preceding the `%`, floored to an
/// integer.
#[derive(Debug, Default)]
pub struct DebmirrorProgress {
    started: bool,
}

impl DebmirrorProgress {
    /// Create a parser in its pre-marker state.
    #[must_use]
    pub const fn new() -> Self {
        Self { started: false }
    }

    /// Whether the pool marker has been seen.
    #[must_use]
    pub const fn started(&self) -> bool {
        self.started
    }

    /// Feed one output line, collecting zero, one, or two percentages.
    ///
    /// A line that both flips the marker and carries a `%` yields the
    /// initial 1 followed by the parsed value.
    pub fn observe(&mut self, line: &str) -> Vec<i64> {
        let mut values = Vec::new();
        if !self.started && line.contains(POOL_MARKER) {
            self.started = true;
            values.push(1);
        }
        if self.started && line.contains('%') {
            if let Some(value) = parse_token_before_percent(line) {
                values.push(value);
            }
        }
        values
    }
}

/// Extract the whitespace-delimited token immediately preceding the first
/// `%`, floored to an integer. Parse failures are swallowed.
fn parse_token_before_percent(line: &str) -> Option<i64> {
    let prefix = line.split('%').next()?;
    let token = prefix.split_whitespace().next_back()?;
    let value: f64 = token.parse().ok()?;
    #[allow(clippy::cast_possible_truncation)]
    Some(value.floor() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsync_scanner_finds_percentage_among_counters() {
        let line = "sent 1,024 bytes  received 42 bytes  37%  2.1MB/s";
        assert_eq!(scan_rsync_percent(line), Some(37));
    }

    #[test]
    fn rsync_scanner_is_idempotent() {
        let line = "  1,404,342  12%  643.66kB/s    0:00:14";
        assert_eq!(scan_rsync_percent(line), Some(12));
        assert_eq!(scan_rsync_percent(line), Some(12));
    }

    #[test]
    fn rsync_scanner_ignores_bare_and_malformed_tokens() {
        assert_eq!(scan_rsync_percent("receiving file list ..."), None);
        assert_eq!(scan_rsync_percent("strange % output"), None);
        assert_eq!(scan_rsync_percent("garbage abc% trailing"), None);
    }

    #[test]
    fn debmirror_parser_suppresses_percent_before_marker() {
        let mut parser = DebmirrorProgress::new();
        assert!(parser.observe("[ 0%] Getting meta files ...").is_empty());
        assert!(parser.observe("Getting: dists/bookworm/Release 80%").is_empty());
        assert!(!parser.started());
    }

    #[test]
    fn marker_line_emits_initial_percent() {
        let mut parser = DebmirrorProgress::new();
        assert_eq!(parser.observe("Receiving pool/main/a/apt..."), vec![1]);
        assert!(parser.started());
        assert_eq!(parser.observe("  45%  120KB/s"), vec![45]);
    }

    #[test]
    fn marker_line_with_percent_emits_both() {
        let mut parser = DebmirrorProgress::new();
        assert_eq!(parser.observe("[ 12%] pool/main/a/apt_2.6.1.deb"), vec![1, 12]);
    }

    #[test]
    fn fractional_percentages_floor() {
        let mut parser = DebmirrorProgress::new();
        parser.observe("pool/");
        assert_eq!(parser.observe("downloaded 45.9% of archive"), vec![45]);
    }

    #[test]
    fn parse_failures_after_marker_are_swallowed() {
        let mut parser = DebmirrorProgress::new();
        parser.observe("pool/");
        assert!(parser.observe("odd line with % but no number").is_empty());
        assert!(parser.started());
    }
}
