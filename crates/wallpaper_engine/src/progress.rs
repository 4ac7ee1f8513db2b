/// Progress derived from the free-text prediction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// No log output yet; the model is still booting.
    Booting,
    /// Log output exists but the last line carries no percentage.
    Running,
    Percent(u8),
    /// The log contains a content-moderation marker.
    Flagged,
}

/// Multiplier applied to the raw percentage token. Raw values are reported as-is.
pub const PERCENT_SCALE: u32 = 1;

const MODERATION_MARKER: &str = "nsfw";

pub fn parse_progress(logs: Option<&str>) -> Progress {
    let Some(logs) = logs else {
        return Progress::Booting;
    };
    if logs.to_ascii_lowercase().contains(MODERATION_MARKER) {
        return Progress::Flagged;
    }
    let Some(last_line) = logs.lines().rev().map(str::trim).find(|l| !l.is_empty()) else {
        return Progress::Booting;
    };
    match percent_token(last_line) {
        Some(raw) => Progress::Percent(raw.saturating_mul(PERCENT_SCALE).min(100) as u8),
        None => Progress::Running,
    }
}

// First run of ASCII digits directly followed by '%'.
fn percent_token(line: &str) -> Option<u32> {
    let bytes = line.as_bytes();
    let mut start = None;
    for (idx, byte) in bytes.iter().enumerate() {
        if byte.is_ascii_digit() {
            start.get_or_insert(idx);
            continue;
        }
        if let Some(begin) = start.take() {
            if *byte == b'%' {
                return line[begin..idx].parse().ok().or(Some(u32::MAX));
            }
        }
    }
    None
}
