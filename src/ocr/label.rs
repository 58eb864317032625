//! Label filtering for filename-safe output.

/// Punctuation allowed in a label besides ASCII alphanumerics.
const ALLOWED_PUNCTUATION: [char; 4] = ['.', '_', '-', ' '];

/// Reduces raw recognized text to the allowed character set.
///
/// Characters outside `{A-Z, a-z, 0-9, '.', '_', '-', ' '}` are dropped,
/// not replaced; relative order of survivors is preserved.
pub fn filter_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || ALLOWED_PUNCTUATION.contains(c))
        .collect()
}
