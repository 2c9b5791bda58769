//! Text normalization for search and header matching.
//!
//! All free-text comparison in the catalog goes through one folding function
//! so that indexed text, query text and filter text agree on what "equal"
//! means: diacritics transliterated to ASCII, lowercased, trimmed.

/// Fold a string for search comparison: transliterate Unicode to ASCII
/// (e.g. `Santo Domingo de los Tsáchilas` → `santo domingo de los tsachilas`),
/// lowercase, and trim surrounding whitespace.
pub fn fold(s: &str) -> String {
    deunicode::deunicode(s.trim()).to_lowercase()
}

/// Fold a string into a header/alias key: [`fold`] plus removal of all
/// interior whitespace, so `" Cod_Distri "` and `COD_DISTRI` collide.
pub fn fold_key(s: &str) -> String {
    fold(s).chars().filter(|c| !c.is_whitespace()).collect()
}
