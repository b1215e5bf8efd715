//! Name normalization for comparing free-text clinical terms.

/// Canonicalize a medication name: lowercase, then keep the first
/// whitespace-delimited token, so "Lisinopril 10mg" becomes "lisinopril".
///
/// This assumes the generic name is always the first word. "Vitamin D3" and
/// "Insulin glargine" both collapse to a prefix that matches too broadly, and
/// brand-first names miss entirely.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Case-fold a whole phrase: lowercase, trimmed, inner whitespace collapsed.
///
/// Used for conditions, allergies and curated knowledge-base names, where
/// truncating to the first word ("severe", "chronic") would match unrelated
/// entries.
pub fn fold(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
