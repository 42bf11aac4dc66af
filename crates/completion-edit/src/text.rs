pub(crate) fn split_lines<'a>(text: &'a str, linefeed: &str) -> Vec<&'a str> {
    // N linefeeds => N+1 lines, trailing empty segment included.
    text.split(linefeed).collect()
}

pub(crate) fn floor_char_boundary(text: &str, byte: usize) -> usize {
    if byte >= text.len() {
        return text.len();
    }
    let mut idx = byte;
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Text before byte column `col` (floored to a char boundary).
pub(crate) fn before(text: &str, col: usize) -> &str {
    &text[..floor_char_boundary(text, col)]
}

/// Text from byte column `col` (floored to a char boundary).
pub(crate) fn after(text: &str, col: usize) -> &str {
    &text[floor_char_boundary(text, col)..]
}

pub(crate) fn leading_whitespace(text: &str) -> &str {
    let end = text
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_keeps_trailing_segment() {
        assert_eq!(split_lines("a\nb\n", "\n"), vec!["a", "b", ""]);
        assert_eq!(split_lines("", "\n"), vec![""]);
        assert_eq!(split_lines("a\r\nb", "\r\n"), vec!["a", "b"]);
    }

    #[test]
    fn test_before_after_respect_char_boundaries() {
        let text = "x你y";
        assert_eq!(before(text, 2), "x");
        assert_eq!(after(text, 2), "你y");
        assert_eq!(before(text, 99), text);
        assert_eq!(after(text, 99), "");
    }

    #[test]
    fn test_leading_whitespace() {
        assert_eq!(leading_whitespace("\t  foo "), "\t  ");
        assert_eq!(leading_whitespace("   "), "   ");
        assert_eq!(leading_whitespace("foo"), "");
    }
}
