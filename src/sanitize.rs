//! Name Sanitizer - display names to safe output file names

/// Characters that may not appear in an output file name.
pub const DISALLOWED_CHARS: &str = "\\<>=,!#$&'()*+/:;=?@[]%";

/// Used when every candidate name sanitizes to nothing.
pub const DEFAULT_OUTPUT_NAME: &str = "Untitled";

/// Delete every disallowed character; the remaining fragments are joined
/// with no separator. Idempotent.
pub fn sanitize(name: &str) -> String {
    name.split(|c: char| DISALLOWED_CHARS.contains(c))
        .collect()
}

/// First candidate that is still non-empty after sanitizing, else
/// [`DEFAULT_OUTPUT_NAME`].
pub fn usable_name<'a>(candidates: impl IntoIterator<Item = &'a str>) -> String {
    candidates
        .into_iter()
        .map(sanitize)
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_OUTPUT_NAME.to_string())
}
