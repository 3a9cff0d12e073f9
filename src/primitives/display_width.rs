//! Terminal cell widths for buffer chars
//!
//! Buffer positions count chars, the screen counts cells. CJK and most emoji
//! take two cells; control chars are drawn as a single `?`.

use unicode_width::UnicodeWidthChar;

/// Number of terminal cells `ch` occupies when rendered.
///
/// Never 0: zero-width chars get a cell of their own so every char in the
/// buffer stays addressable on screen.
pub fn char_width(ch: char) -> usize {
    if ch.is_control() {
        return 1;
    }
    ch.width().unwrap_or(1).max(1)
}

/// Total cell width of a run of chars
pub fn chars_width(chars: impl IntoIterator<Item = char>) -> usize {
    chars.into_iter().map(char_width).sum()
}

/// Cell width of `line` between char columns `from` and `to`
pub fn span_width(line: &str, from: usize, to: usize) -> usize {
    chars_width(line.chars().skip(from).take(to.saturating_sub(from)))
}
