//! Compact output rendering helpers for CLI surfaces.
//!
//! Keeps per-record result output bounded and readable while preserving signal.

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// First `max_items` messages, compacted, plus an overflow line when truncated.
pub fn bounded_lines(messages: &[String], max_items: usize, max_chars: usize) -> Vec<String> {
    let mut lines: Vec<String> = messages
        .iter()
        .take(max_items)
        .map(|m| compact_line(m, max_chars))
        .collect();
    if messages.len() > max_items {
        lines.push(format!("... and {} more", messages.len() - max_items));
    }
    lines
}

/// Title-case a snake_case key (`groups_fixes` -> `Groups Fixes`).
pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_line_truncates_and_collapses() {
        assert_eq!(compact_line("a\n  b   c", 10), "a b c");
        assert_eq!(compact_line("abcdefgh", 3), "abc...");
    }

    #[test]
    fn bounded_lines_reports_overflow() {
        let msgs: Vec<String> = (0..5).map(|i| format!("error {i}")).collect();
        let lines = bounded_lines(&msgs, 3, 80);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "... and 2 more");
        assert!(bounded_lines(&msgs[..2], 3, 80).len() == 2);
    }

    #[test]
    fn title_case_keys() {
        assert_eq!(title_case("reference_fixes"), "Reference Fixes");
        assert_eq!(title_case("groups"), "Groups");
    }
}
