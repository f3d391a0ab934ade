//! Keeps player-supplied text single-line when it lands in the logs.

/// Replace control characters with visible escapes and cap the length so a
/// hostile or accidental multi-line command cannot mangle log output.
pub fn clean_line(s: &str) -> String {
    const MAX_PREVIEW: usize = 160;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 4);
    for ch in s.chars().take(MAX_PREVIEW) {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push('\u{fffd}'),
            c => out.push(c),
        }
    }
    if s.chars().count() > MAX_PREVIEW {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::clean_line;

    #[test]
    fn flattens_newlines() {
        assert_eq!(clean_line("a\nb\r\tc"), "a\\nb\\r\\tc");
    }

    #[test]
    fn truncates_long_input() {
        let long = "x".repeat(500);
        let cleaned = clean_line(&long);
        assert!(cleaned.ends_with('…'));
        assert!(cleaned.chars().count() <= 161);
    }
}
