// Output formatting: terminal display.

pub mod terminal;

/// Shorten a group name for a fixed-width column, cutting on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("Groupe de travail é", 7), "Groupe ...");
        assert_eq!(truncate_chars("ééééé", 2), "éé...");
    }
}
