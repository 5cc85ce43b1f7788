//! Display helpers shared by the upload summary and the review step

/// Human-readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`
pub fn format_file_size(bytes: u64) -> String {
    const K: f64 = 1024.0;
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    while exponent + 1 < UNITS.len() && bytes >= 1u64 << (10 * (exponent + 1)) {
        exponent += 1;
    }
    let value = (bytes as f64 / K.powi(exponent as i32) * 100.0).round() / 100.0;
    format!("{} {}", value, UNITS[exponent])
}

/// Title derived from a file name: the name without its last extension.
/// A dotfile such as `.pdf` is all extension and yields an empty title.
pub fn default_title(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && !ext.contains('/') => stem.to_string(),
        _ => file_name.to_string(),
    }
}

/// Cut `text` to `max_chars` characters, adding an ellipsis when shortened
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Display value for a possibly blank field
pub fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
