//! HTML escaping for element content and double-quoted attributes.

/// Escapes `&`, `<`, `>`, `"` and `'`.
///
/// `&` is replaced first so entities produced by later steps are not
/// escaped again.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::escape_html;

    fn unescape(text: &str) -> String {
        text.replace("&#39;", "'")
            .replace("&quot;", "\"")
            .replace("&gt;", ">")
            .replace("&lt;", "<")
            .replace("&amp;", "&")
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#"say "hi""#), "say &quot;hi&quot;");
        assert_eq!(escape_html("it's"), "it&#39;s");
    }

    #[test]
    fn existing_entities_are_escaped_once() {
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }

    #[test]
    fn decoding_restores_original_text() {
        let original = r#"<a href="x">Tom & 'Jerry'</a> &amp;"#;
        let escaped = escape_html(original);
        for c in ['<', '>', '"', '\''] {
            assert!(!escaped.contains(c), "found {c:?} in {escaped}");
        }
        assert_eq!(unescape(&escaped), original);
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape_html("Die Höhle im Norden"), "Die Höhle im Norden");
    }
}
