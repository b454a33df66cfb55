pub struct StringUtils {}

impl StringUtils {
    pub fn maybe_pluralize((singular, plural) : (&str, &str), qty: usize) -> String {
        format!("{}", if qty == 1 { singular } else { plural })
    }

    pub fn maybe_pluralize_count(count: usize, (singular, plural) : (&str, &str)) -> String {
        format!("{} {}", count, Self::maybe_pluralize((singular, plural), count))
    }

    /// First `max_chars` characters, with "..." appended when anything was cut.
    pub fn truncate_chars(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
            None => text.to_string(),
        }
    }

    /// Greedy word wrap to `width` columns. Words longer than a line are split.
    /// Explicit newlines are kept; an empty input yields one empty line.
    pub fn wrap(text: &str, width: usize) -> Vec<String> {
        let width = width.max(1);
        let mut lines = Vec::new();

        for raw_line in text.split('\n') {
            let mut current = String::new();
            let mut current_len = 0;

            for word in raw_line.split_whitespace() {
                let mut word: Vec<char> = word.chars().collect();

                while word.len() > width {
                    if current_len > 0 {
                        lines.push(std::mem::take(&mut current));
                        current_len = 0;
                    }
                    let rest = word.split_off(width);
                    lines.push(word.into_iter().collect());
                    word = rest;
                }

                let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
                if needed > width && current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }

                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current_len += word.len();
                current.extend(word);
            }

            lines.push(current);
        }

        lines
    }
}
