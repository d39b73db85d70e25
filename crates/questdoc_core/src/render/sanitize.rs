//! Fragment identifier sanitizer.
//!
//! # Invariants
//! - Output only contains `[a-z0-9_-]`, never starts/ends with `-`, and
//!   never contains `--`.
//! - Output is never empty (`FALLBACK_ID`).
//! - `sanitize_id(sanitize_id(x)) == sanitize_id(x)`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Identifier used when nothing usable survives sanitization.
pub const FALLBACK_ID: &str = "node";

static UNSAFE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_\-]+").expect("valid unsafe-char regex"));
static DASH_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("valid dash regex"));

/// Maps arbitrary input to a stable HTML `id` / URL fragment.
///
/// German umlauts and `ß` are transliterated before the unsafe-character
/// pass, so `"Über Brücke"` becomes `ueber-bruecke` rather than `ber-br-cke`.
pub fn sanitize_id(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let transliterated = transliterate(&lowered);
    let replaced = UNSAFE_RUN_RE.replace_all(&transliterated, "-");
    let collapsed = DASH_RUN_RE.replace_all(&replaced, "-");
    let trimmed = collapsed.trim_matches('-');

    if trimmed.is_empty() {
        FALLBACK_ID.to_string()
    } else {
        trimmed.to_string()
    }
}

fn transliterate(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            'ä' => out.push_str("ae"),
            'ö' => out.push_str("oe"),
            'ü' => out.push_str("ue"),
            'ß' => out.push_str("ss"),
            other => out.push(other),
        }
    }
    out
}
