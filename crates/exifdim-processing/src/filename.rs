//! Output file name normalization

/// Name used when the client does not send `outName`
pub const DEFAULT_OUTPUT_NAME: &str = "out.jpg";

/// Normalize the requested download name.
///
/// The name is otherwise taken as sent, surrounding whitespace included.
/// Directory components are dropped and characters that cannot live inside a
/// quoted `Content-Disposition` filename are replaced with `_`. A name left
/// blank or dot-only falls back to the default. The result
/// always carries a JPEG extension: a name ending in `.jpg`/`.jpeg` (any case)
/// is kept, otherwise a trailing `.<word>` extension is replaced by `.jpg`.
pub fn normalize_output_name(requested: Option<&str>) -> String {
    let requested = requested
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_OUTPUT_NAME);

    let base = requested.rsplit(['/', '\\']).next().unwrap_or(requested);

    let sanitized: String = base
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();

    if sanitized.trim_matches('.').trim().is_empty() {
        return DEFAULT_OUTPUT_NAME.to_string();
    }

    if has_jpeg_extension(&sanitized) {
        return sanitized;
    }

    format!("{}.jpg", strip_word_extension(&sanitized))
}

/// Case-insensitive check for a `.jpg` or `.jpeg` suffix
pub fn has_jpeg_extension(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".jpg") || lower.ends_with(".jpeg")
}

fn strip_word_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => {
            let ext = &name[idx + 1..];
            if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                &name[..idx]
            } else {
                name
            }
        }
        None => name,
    }
}
