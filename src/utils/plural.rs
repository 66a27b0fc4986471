//! Pluralization for log lines.

/// `"s"` unless the count is exactly one.
#[inline]
fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// `"1 note"`, `"3 notes"`, `"0 warnings"`.
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    format!("{count} {noun}{}", plural_s(count))
}
