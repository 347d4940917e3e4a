//! Text module - line wrapping

/// Wrap a line at the last space before `wlen` characters.
///
/// The first line holds at most `wlen` characters. Continuation lines are indented with `indent`
/// spaces and hold at most `wlen - 1` characters after the indentation. A word that does not fit
/// on a line of its own is kept whole.
pub fn wrap_line(line: &str, wlen: usize, indent: usize) -> String {
    if line.chars().count() <= wlen {
        return line.to_string();
    }

    let pad = " ".repeat(indent);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut limit = wlen;
    let mut has_word = false;

    for word in line.split(' ') {
        let word_len = word.chars().count();
        if has_word && current_len + 1 + word_len > limit {
            lines.push(std::mem::take(&mut current));
            current.push_str(&pad);
            current_len = 0;
            limit = wlen.saturating_sub(1);
            has_word = false;
        }
        if has_word {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
        has_word = true;
    }
    lines.push(current);
    lines.join("\n")
}
