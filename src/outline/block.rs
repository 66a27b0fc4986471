//! Block anchors (`^id`).
//!
//! A block id either ends the last line of a paragraph (`text ^id`) or
//! stands on its own line right after it. Either way the block is that
//! paragraph, with the marker removed.

use std::sync::LazyLock;

use regex::Regex;

/// A trailing block marker: ` ^id` at the end of a line, or a bare `^id` line.
pub static BLOCK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|\s)\^([A-Za-z0-9][A-Za-z0-9-]*)[ \t]*$").expect("valid block regex"));

/// Find the paragraph carrying block id `id` (without `^`).
pub fn find_block(body: &str, id: &str) -> Option<String> {
    let lines: Vec<&str> = body.lines().collect();
    let marker = format!("^{id}");

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim_end();

        let (last, end) = if trimmed.trim_start() == marker {
            // Marker on its own line: skip blanks back to the paragraph
            let mut end = i;
            while end > 0 && lines[end - 1].trim().is_empty() {
                end -= 1;
            }
            if end == 0 {
                return None;
            }
            (lines[end - 1].to_string(), end - 1)
        } else if let Some(text) = trimmed.strip_suffix(&marker)
            && (text.is_empty() || text.ends_with(char::is_whitespace))
        {
            (text.trim_end().to_string(), i)
        } else {
            continue;
        };

        let mut start = end;
        while start > 0 && !lines[start - 1].trim().is_empty() {
            start -= 1;
        }

        let mut paragraph: Vec<String> = lines[start..end].iter().map(|s| s.to_string()).collect();
        paragraph.push(last);
        return Some(paragraph.join("\n"));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_marker() {
        let body = "intro\n\nfirst line\nsecond line ^quote\n\nafter";
        assert_eq!(
            find_block(body, "quote").as_deref(),
            Some("first line\nsecond line")
        );
    }

    #[test]
    fn test_marker_on_own_line() {
        let body = "a\n\n> quoted\n> text\n\n^q1\nnext";
        assert_eq!(find_block(body, "q1").as_deref(), Some("> quoted\n> text"));
    }

    #[test]
    fn test_missing_or_partial_ids() {
        let body = "text ^abc\n";
        assert_eq!(find_block(body, "ab"), None);
        assert_eq!(find_block(body, "nope"), None);
        assert_eq!(find_block("^lonely", "lonely"), None);
        assert_eq!(find_block("text^abc", "abc"), None);
    }

    #[test]
    fn test_block_id_regex() {
        let caps = BLOCK_ID.captures("some text ^id-1").unwrap();
        assert_eq!(&caps[2], "id-1");
        assert!(BLOCK_ID.captures("x^y").is_none());
    }
}
