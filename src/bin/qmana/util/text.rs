/// Greedy word wrap. Words longer than `width` (typically paths) are split
/// across lines instead of overflowing the box they are printed in.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let len = current.chars().count();
        if current.is_empty() {
            current = word.into_iter().collect();
        } else if len + 1 + word.len() <= width {
            current.push(' ');
            current.extend(word);
        } else {
            lines.push(std::mem::replace(&mut current, word.into_iter().collect()));
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Shortens `s` to `max_len` characters, marking the cut with `…`.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    match max_len {
        0 => String::new(),
        _ => {
            let mut out: String = s.chars().take(max_len - 1).collect();
            out.push('…');
            out
        }
    }
}

/// `1 frame`, `3 frames`.
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_joins_words_up_to_width() {
        assert_eq!(wrap("hello world", 20), vec!["hello world"]);
        assert_eq!(wrap("the quick brown fox", 10), vec!["the quick", "brown fox"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn wrap_splits_long_words() {
        assert_eq!(
            wrap("see /very/long/path/name", 8),
            vec!["see", "/very/lo", "ng/path/", "name"]
        );
    }

    #[test]
    fn truncate_marks_the_cut() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("hello world", 8), "hello w…");
        assert_eq!(truncate("Å-Å-Å-Å", 4), "Å-Å…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn counts_pluralize() {
        assert_eq!(count(1, "frame"), "1 frame");
        assert_eq!(count(0, "atom"), "0 atoms");
    }
}
