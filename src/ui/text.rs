/// Terminal text measurement and wrapping.
///
/// Widths are in terminal columns. Pictographic emoji take two columns,
/// variation selectors and zero-width joiners take none, everything else
/// one. That covers every glyph the card prints.

/// Columns occupied by one char.
pub fn char_width(c: char) -> usize {
    match c as u32 {
        0x200D | 0xFE0E | 0xFE0F => 0,
        0x1F000..=0x1FAFF => 2,
        0x2728 | 0x2B50 | 0x2705 | 0x231A | 0x231B => 2,
        _ => 1,
    }
}

pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Greedy word wrap to `width` columns. Words longer than a line are
/// split on char boundaries. An empty input yields no lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_w = 0;

    for word in text.split_whitespace() {
        let word_w = display_width(word);

        if line_w > 0 && line_w + 1 + word_w <= width {
            line.push(' ');
            line.push_str(word);
            line_w += 1 + word_w;
            continue;
        }
        if line_w > 0 {
            lines.push(std::mem::take(&mut line));
            line_w = 0;
        }
        if word_w <= width {
            line.push_str(word);
            line_w = word_w;
            continue;
        }

        // Hard split.
        for c in word.chars() {
            let w = char_width(c);
            if line_w + w > width && line_w > 0 {
                lines.push(std::mem::take(&mut line));
                line_w = 0;
            }
            line.push(c);
            line_w += w;
        }
    }

    if line_w > 0 {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emoji_are_double_width() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("🎉"), 2);
        assert_eq!(display_width("New Year 🎆"), 11);
        assert_eq!(display_width("❤\u{FE0F}"), 1);
        assert_eq!(display_width("✨"), 2);
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap("the quick brown fox jumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
        assert!(lines.iter().all(|l| display_width(l) <= 10));
    }

    #[test]
    fn emoji_count_toward_the_limit() {
        assert_eq!(wrap("ab 🌸 cd", 5), vec!["ab 🌸", "cd"]);
    }

    #[test]
    fn long_words_are_split() {
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap("x abcdef", 4), vec!["x", "abcd", "ef"]);
    }

    #[test]
    fn blank_text_has_no_lines() {
        assert!(wrap("", 10).is_empty());
        assert!(wrap("   ", 10).is_empty());
    }
}
