//! Line splitting shared by both npm report parsers.
//!
//! The tree report and the directory report must be trimmed the same way,
//! otherwise their line counts stop being comparable.

/// Split report text into lines, dropping trailing blank lines.
///
/// `\r\n` endings are accepted. Blank lines before the last non-blank line
/// are kept so callers can decide whether they are an error.
pub fn significant_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_blank_lines_dropped() {
        assert_eq!(significant_lines("a\nb\n\n  \n"), vec!["a", "b"]);
        assert_eq!(significant_lines("a\r\nb\r\n"), vec!["a", "b"]);
    }

    #[test]
    fn test_inner_blank_lines_kept() {
        assert_eq!(significant_lines("a\n\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(significant_lines("").is_empty());
        assert!(significant_lines("\n\n").is_empty());
    }
}
