use std::borrow::Cow;

use unicode_width::UnicodeWidthChar;

/// Ellipsis appended to truncated text
const ELLIPSIS: &str = "...";

/// Display width of a string in columns (CJK and emoji count as 2).
///
/// Summed per character so it always agrees with where `truncate_to_width`
/// cuts; control characters count as zero.
pub fn display_width(s: &str) -> usize {
    s.chars().map(|c| UnicodeWidthChar::width(c).unwrap_or(0)).sum()
}

/// Longest prefix of `s` that fits in `budget` columns.
fn prefix_within(s: &str, budget: usize) -> &str {
    let mut used = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            return &s[..idx];
        }
        used += w;
    }
    s
}

/// Truncate `s` to at most `max_width` columns, marking the cut with "...".
///
/// Text that already fits is borrowed unchanged. Widths too narrow for the
/// ellipsis get a plain prefix.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width <= ELLIPSIS.len() {
        return Cow::Owned(prefix_within(s, max_width).to_string());
    }

    let head = prefix_within(s, max_width - ELLIPSIS.len()).trim_end();
    Cow::Owned(format!("{head}{ELLIPSIS}"))
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(s: &str) -> Cow<'_, str> {
    let clean = !s.starts_with(char::is_whitespace)
        && !s.ends_with(char::is_whitespace)
        && !s
            .as_bytes()
            .windows(2)
            .any(|w| w[0].is_ascii_whitespace() && w[1].is_ascii_whitespace())
        && !s.chars().any(|c| c.is_whitespace() && c != ' ');
    if clean {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Fit text into a block of `lines` rows of `width` columns, the way a card
/// clamps its title and description.
pub fn clamp_lines(s: &str, lines: usize, width: usize) -> String {
    let flat = collapse_whitespace(s);
    truncate_to_width(&flat, lines.saturating_mul(width)).into_owned()
}
