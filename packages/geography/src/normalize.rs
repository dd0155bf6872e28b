//! District label canonicalization.

/// Canonical join key for a free-text district label: surrounding
/// whitespace removed, case folded.
#[must_use]
pub fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}
