//! Sigil normalization.
//!
//! Source templates mark variables with `$` and loop metadata with `@`
//! (`$row@index`). The target syntax has no sigils: `$` is dropped and `@`
//! becomes a property access under a reserved prefix (`row.__index`), which
//! keeps injected metadata from colliding with user fields.

/// Strips every `$` and expands every `@` to `.` followed by `meta_prefix`.
pub fn normalize_sigils(raw: &str, meta_prefix: &str) -> String {
    let mut out = String::with_capacity(raw.len() + meta_prefix.len());
    for c in raw.chars() {
        match c {
            '$' => {}
            '@' => {
                out.push('.');
                out.push_str(meta_prefix);
            }
            other => out.push(other),
        }
    }
    out
}

/// Removes every `$` sigil.
pub fn strip_dollars(raw: &str) -> String {
    raw.replace('$', "")
}
