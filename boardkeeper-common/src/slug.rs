//! Slug derivation

/// Convert a display string into a filesystem-safe slug
///
/// Lowercases ASCII, collapses every run of characters outside `[a-z0-9]` into
/// a single hyphen and trims hyphens from both ends. Returns an empty string
/// when nothing alphanumeric survives; callers pick their own fallback.
///
/// ```rust
/// use boardkeeper_common::slugify;
///
/// assert_eq!(slugify("  Q3 Roadmap -- Draft! "), "q3-roadmap-draft");
/// assert_eq!(slugify("???"), "");
/// ```
pub fn slugify(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !result.is_empty() {
                result.push('-');
            }
            pending_dash = false;
            result.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    result
}
