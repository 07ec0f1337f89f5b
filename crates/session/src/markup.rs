//! Markup-safety transform for the welcome banner.
//!
//! Model configs may declare arbitrary banner text; before it reaches the
//! UI the text is passed through [`sanitize_markup`] so embedded markup
//! renders inertly. The transform is idempotent: text that has already been
//! sanitized passes through unchanged, so it is safe to apply at every
//! boundary without tracking whether a value is "raw" or "clean".

/// Escape embedded markup so the text can be rendered as banner content.
///
/// Escapes `<`, `>` and `"`, escapes `&` unless it already begins an
/// entity, and normalizes CR/CRLF line endings to `\n`.
pub fn sanitize_markup(input: &str) -> String {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(normalized.len());
    for (i, ch) in normalized.char_indices() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '&' if !is_entity_start(&normalized[i..]) => out.push_str("&amp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// True if `s` begins with a complete character entity.
///
/// Recognizes the named entities this module emits plus numeric references
/// (`&#38;`, `&#x26;`). Anything else gets its ampersand escaped.
fn is_entity_start(s: &str) -> bool {
    const NAMED: [&str; 4] = ["&amp;", "&lt;", "&gt;", "&quot;"];
    if NAMED.iter().any(|e| s.starts_with(e)) {
        return true;
    }

    let Some(rest) = s.strip_prefix("&#") else {
        return false;
    };
    let digits = rest.strip_prefix(['x', 'X']).unwrap_or(rest);
    let hex = digits.len() < rest.len();
    match digits.find(';') {
        Some(0) | None => false,
        Some(end) => digits[..end]
            .chars()
            .all(|c| if hex { c.is_ascii_hexdigit() } else { c.is_ascii_digit() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn escapes_angle_brackets_and_quotes() {
        assert_eq!(
            sanitize_markup(r#"<b>hi</b> "there""#),
            "&lt;b&gt;hi&lt;/b&gt; &quot;there&quot;"
        );
    }

    #[test]
    fn escapes_bare_ampersands_only() {
        assert_eq!(sanitize_markup("fish & chips"), "fish &amp; chips");
        assert_eq!(sanitize_markup("&amp; stays"), "&amp; stays");
        assert_eq!(sanitize_markup("&#38; stays"), "&#38; stays");
        assert_eq!(sanitize_markup("&#x26; stays"), "&#x26; stays");
        assert_eq!(sanitize_markup("&#nope"), "&amp;#nope");
        assert_eq!(sanitize_markup("&#;"), "&amp;#;");
    }

    #[test]
    fn normalizes_line_endings() {
        assert_eq!(sanitize_markup("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn sanitizing_twice_is_a_no_op() {
        let once = sanitize_markup(r#"<i>fish & chips</i> "daily""#);
        assert_eq!(sanitize_markup(&once), once);
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(input in ".*") {
            let once = sanitize_markup(&input);
            prop_assert_eq!(sanitize_markup(&once), once);
        }

        #[test]
        fn sanitized_output_has_no_raw_markup(input in ".*") {
            let out = sanitize_markup(&input);
            prop_assert!(!out.contains('<'));
            prop_assert!(!out.contains('>'));
            prop_assert!(!out.contains('"'));
        }
    }
}
