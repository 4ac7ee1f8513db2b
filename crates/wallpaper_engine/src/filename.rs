pub const MAX_STEM_LEN: usize = 50;
const FALLBACK_STEM: &str = "wallpaper";

/// Windows-safe download name: `{sanitized_prompt}[--{job_id}].png`
pub fn download_filename(prompt: &str, job_id: Option<&str>) -> String {
    let mut stem = sanitize(prompt, MAX_STEM_LEN);
    if stem.is_empty() {
        stem = FALLBACK_STEM.to_string();
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    match job_id.map(|id| sanitize(id, MAX_STEM_LEN)).filter(|id| !id.is_empty()) {
        Some(id) => format!("{stem}--{id}.png"),
        None => format!("{stem}.png"),
    }
}

// Non-alphanumerics become single '-' separators; result is trimmed and truncated.
fn sanitize(input: &str, max_len: usize) -> String {
    let mut cleaned = String::with_capacity(input.len().min(max_len));
    let mut pending_separator = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !cleaned.is_empty() {
                cleaned.push('-');
            }
            pending_separator = false;
            cleaned.push(c);
        } else {
            pending_separator = true;
        }
        if cleaned.len() >= max_len {
            break;
        }
    }
    cleaned.truncate(max_len);
    cleaned.trim_end_matches('-').to_string()
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
