//! Free-text cleanup for CSV fields and chart labels.

use regex::Regex;
use std::sync::LazyLock;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<.*?>").expect("Invalid tag regex"));

static HYPHEN_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+").expect("Invalid hyphen regex"));

/// Removes `<...>` tags, collapses whitespace runs to a single space and trims the ends.
///
/// Total and idempotent: a string without tags or extra spaces comes back unchanged.
pub fn clean_text(s: &str) -> String {
    let stripped = TAG_REGEX.replace_all(s, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Breaks a label into lines at whitespace and after hyphens, for narrow chart axes.
pub fn wrap_label(label: &str) -> String {
    let lines = label.split_whitespace().collect::<Vec<_>>().join("\n");
    HYPHEN_RUN_REGEX.replace_all(&lines, "-\n").into_owned()
}
