//! Code region excision.
//!
//! Link rewriting, tag extraction and heading parsing must never look inside
//! code. Before each stage the fenced blocks and inline spans are replaced
//! by private-use markers and restored verbatim afterwards.

/// Opens a code marker. Private-use codepoint, never produced by the stages.
const MARK_OPEN: char = '\u{E000}';
/// Closes a code marker.
const MARK_CLOSE: char = '\u{E001}';

/// Code regions removed from a text, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeRegions {
    regions: Vec<String>,
}

impl CodeRegions {
    /// Replace fenced blocks and inline code spans with markers.
    pub fn strip(text: &str) -> (String, Self) {
        let mut regions = Self::default();
        let mut out = String::with_capacity(text.len());
        let mut fence: Option<(char, usize)> = None;
        let mut block = String::new();

        for line in text.split_inclusive('\n') {
            if let Some((ch, len)) = fence {
                block.push_str(line);
                if closes_fence(line, ch, len) {
                    out.push_str(&regions.push_block(&mut block));
                    fence = None;
                }
                continue;
            }

            if let Some(open) = opening_fence(line) {
                fence = Some(open);
                block.push_str(line);
                if !line.ends_with('\n') {
                    // Unclosed fence on the last line
                    out.push_str(&regions.push_block(&mut block));
                    fence = None;
                }
                continue;
            }

            regions.strip_inline(line, &mut out);
        }

        // A fence left open runs to the end of the document
        if fence.is_some() {
            out.push_str(&regions.push_block(&mut block));
        }

        (out, regions)
    }

    /// Put the excised regions back.
    ///
    /// Markers with an unknown index are left untouched.
    pub fn restore(&self, text: &str) -> String {
        if !text.contains(MARK_OPEN) {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(MARK_OPEN) {
            out.push_str(&rest[..start]);
            let after = &rest[start + MARK_OPEN.len_utf8()..];
            let region = after.find(MARK_CLOSE).and_then(|end| {
                let index: usize = after[..end].parse().ok()?;
                Some((self.regions.get(index)?, end))
            });
            match region {
                Some((code, end)) => {
                    out.push_str(code);
                    rest = &after[end + MARK_CLOSE.len_utf8()..];
                }
                None => {
                    out.push(MARK_OPEN);
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Store a fenced block; the marker keeps the block's trailing newline
    /// outside so it stays on a line of its own.
    fn push_block(&mut self, block: &mut String) -> String {
        let mut code = std::mem::take(block);
        let newline = if code.ends_with('\n') {
            code.pop();
            "\n"
        } else {
            ""
        };
        format!("{}{newline}", self.push(code))
    }

    fn push(&mut self, code: String) -> String {
        let marker = format!("{MARK_OPEN}{}{MARK_CLOSE}", self.regions.len());
        self.regions.push(code);
        marker
    }

    /// Replace backtick spans within one line.
    fn strip_inline(&mut self, line: &str, out: &mut String) {
        let mut rest = line;
        while let Some(start) = rest.find('`') {
            let run = rest[start..].chars().take_while(|&c| c == '`').count();
            let after = &rest[start + run..];
            match find_closing_run(after, run) {
                Some(end) => {
                    out.push_str(&rest[..start]);
                    let code = &rest[start..start + run + end + run];
                    out.push_str(&self.push(code.to_string()));
                    rest = &after[end + run..];
                }
                None => {
                    out.push_str(&rest[..start + run]);
                    rest = after;
                }
            }
        }
        out.push_str(rest);
    }
}

/// Offset of a backtick run of exactly `len` in `text`.
fn find_closing_run(text: &str, len: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
            if run == len {
                return Some(i);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

/// Recognize an opening fence: up to three spaces, then three or more
/// backticks or tildes.
fn opening_fence(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let ch = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.chars().take_while(|&c| c == ch).count();
    // Backtick fences may not carry backticks in their info string
    if len < 3 || (ch == '`' && trimmed[len..].contains('`')) {
        return None;
    }
    Some((ch, len))
}

fn closes_fence(line: &str, ch: char, len: usize) -> bool {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return false;
    }
    let run = trimmed.chars().take_while(|&c| c == ch).count();
    run >= len && trimmed[run..].trim().is_empty()
}
