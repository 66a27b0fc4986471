//! HTML helpers shared by the renderer, the page template and the
//! inclusion expander.

use std::borrow::Cow;

/// Escape HTML special characters in text content.
///
/// Borrowed when nothing needs escaping.
///
/// ```ignore
/// assert_eq!(escape("<b>"), "&lt;b&gt;");
/// ```
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape a value placed inside a double-quoted attribute.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape(s)
}

/// Parse an attribute list such as `href="a.md#b" open`.
///
/// Values may be double quoted, single quoted or bare. Attributes without a
/// value map to the empty string.
pub fn parse_attributes(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = s.trim_start();

    while !rest.is_empty() {
        let name_end = rest
            .find(|c: char| c == '=' || c.is_whitespace() || c == '/')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        if name.is_empty() {
            // Stray `/` of a self-closing tag
            rest = rest.get(1..).unwrap_or("").trim_start();
            continue;
        }

        let mut value = String::new();
        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    let end = body.find(quote).unwrap_or(body.len());
                    value.push_str(&body[..end]);
                    rest = body.get(end + 1..).unwrap_or("");
                }
                _ => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    value.push_str(&after_eq[..end]);
                    rest = &after_eq[end..];
                }
            }
        }

        attrs.push((name.to_string(), value));
        rest = rest.trim_start();
    }

    attrs
}

/// Look up one attribute value by name.
pub fn attribute(s: &str, name: &str) -> Option<String> {
    parse_attributes(s)
        .into_iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert!(matches!(escape("plain text"), Cow::Borrowed(_)));
        assert_eq!(escape("<script>"), "&lt;script&gt;");
        assert_eq!(escape("a & \"b\" it's"), "a &amp; &quot;b&quot; it&#39;s");
        assert_eq!(escape_attr("x\"y"), "x&quot;y");
    }

    #[test]
    fn test_parse_attributes() {
        let attrs = parse_attributes(r#"a="1" b='2' c=3 disabled"#);
        assert_eq!(
            attrs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "3".to_string()),
                ("disabled".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_attribute_in_self_closing_tag() {
        let inner = r#"href="folder/note.md#intro" /"#;
        assert_eq!(
            attribute(inner, "href").as_deref(),
            Some("folder/note.md#intro")
        );
        assert_eq!(attribute(inner, "missing"), None);
    }
}
