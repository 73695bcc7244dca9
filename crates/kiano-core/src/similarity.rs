//! String similarity used by the last-chance fallback of the rule cascade.

/// Similarity in `[0, 1]`: normalized Levenshtein over characters.
///
/// Deterministic and symmetric. Extending a shared prefix/substring never lowers the score,
/// which is what the fallback relies on.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    strsim::normalized_levenshtein(a, b).clamp(0.0, 1.0)
}
