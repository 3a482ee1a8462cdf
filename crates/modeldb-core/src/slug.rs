//! Filesystem-safe identifiers derived from free text.
//!
//! [`slug`] is the single source of truth for folder and file names in the
//! record tree. Its output contains only Unicode letters, Unicode digits and
//! single interior dashes.

use std::sync::LazyLock;

use regex::Regex;

/// Unicode punctuation (dashes, quotes, brackets, `!`, `_`, ...).
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{P}").unwrap());

/// Runs of whitespace.
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Anything that is not a letter, a digit or a dash.
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}-]").unwrap());

/// Runs of dashes.
static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

/// Converts arbitrary text to a slug.
///
/// # Rules Applied
/// 1. Replace punctuation with a space
/// 2. Lowercase and trim
/// 3. Replace whitespace runs with a single dash
/// 4. Drop every character that is not a letter, digit or dash (symbols such as
///    `™`, and combining marks left over from decomposed accents)
/// 5. Collapse repeated dashes and strip leading/trailing dashes
///
/// Empty or all-punctuation input yields an empty string. Callers decide
/// whether that is acceptable.
///
/// # Examples
///
/// ```
/// use modeldb_core::slug;
///
/// assert_eq!(slug("Metal Earth"), "metal-earth");
/// assert_eq!(slug("Wolf!"), "wolf");
/// assert_eq!(slug("R2-D2 (Deluxe)"), "r2-d2-deluxe");
/// assert_eq!(slug("!!!"), "");
/// ```
pub fn slug(text: &str) -> String {
    let spaced = PUNCTUATION.replace_all(text, " ");
    let lowered = spaced.to_lowercase();
    let dashed = WHITESPACE.replace_all(lowered.trim(), "-");
    let kept = DISALLOWED.replace_all(&dashed, "");
    let collapsed = DASHES.replace_all(&kept, "-");
    collapsed.trim_matches('-').to_string()
}
