//! Input normalization run before any other pass.

use std::sync::LazyLock;

use regex::Regex;

use crate::TAB_WIDTH;

/// Lines consisting only of spaces.
static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ +$").expect("invalid blank line regex"));

/// Normalize raw markup so the later passes can rely on its shape.
///
/// - `\r\n` and lone `\r` become `\n`
/// - tabs expand to the next multiple of [`TAB_WIDTH`] columns
/// - lines holding only spaces become empty
/// - the text ends with exactly two newlines
///
/// # Examples
///
/// ```
/// use skiff_markdown::normalize;
///
/// assert_eq!(normalize("a\r\n\tb"), "a\n    b\n\n");
/// assert_eq!(normalize(""), "\n\n");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let unix = text.replace("\r\n", "\n").replace('\r', "\n");
    let detabbed = detab(&unix);
    let stripped = BLANK_LINE.replace_all(&detabbed, "");

    let mut out = stripped.trim_end_matches('\n').to_owned();
    out.push_str("\n\n");
    out
}

/// Expand tabs with column awareness.
fn detab(text: &str) -> String {
    if !text.contains('\t') {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut column = 0;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let width = TAB_WIDTH - column % TAB_WIDTH;
                out.extend(std::iter::repeat_n(' ', width));
                column += width;
            }
            '\n' => {
                out.push('\n');
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_endings() {
        assert_eq!(normalize("a\r\nb\rc"), "a\nb\nc\n\n");
    }

    #[test]
    fn test_detab_leading() {
        assert_eq!(detab("\tcode"), "    code");
        assert_eq!(detab("\t\tcode"), "        code");
    }

    #[test]
    fn test_detab_is_column_aware() {
        assert_eq!(detab("ab\tc"), "ab  c");
        assert_eq!(detab("abcd\te"), "abcd    e");
        assert_eq!(detab("  \tx"), "    x");
    }

    #[test]
    fn test_detab_resets_per_line() {
        assert_eq!(detab("abc\n\tx"), "abc\n    x");
    }

    #[test]
    fn test_detab_counts_characters() {
        assert_eq!(detab("é\tx"), "é   x");
    }

    #[test]
    fn test_whitespace_only_lines_emptied() {
        assert_eq!(normalize("a\n   \nb"), "a\n\nb\n\n");
        assert_eq!(normalize("a\n\t\nb"), "a\n\nb\n\n");
    }

    #[test]
    fn test_exactly_two_trailing_newlines() {
        assert_eq!(normalize("a"), "a\n\n");
        assert_eq!(normalize("a\n\n\n\n"), "a\n\n");
        assert_eq!(normalize("a\n   \n"), "a\n\n");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "\n\n");
    }
}
