//! Result preview snippets for search hits.

/// Texts at or below this many characters are shown whole.
pub const PREVIEW_MAX_CHARS: usize = 100;
/// Characters kept on each side of the first match.
pub const PREVIEW_CONTEXT_CHARS: usize = 30;

const ELLIPSIS: &str = "...";

/// Builds a display snippet of `text` for search `term`.
///
/// - Short texts are returned unchanged.
/// - Otherwise the window of `PREVIEW_CONTEXT_CHARS` around the first
///   case-insensitive match of `term`, wrapped in `...`.
/// - Without a match, the first `PREVIEW_MAX_CHARS` characters plus `...`.
pub fn search_preview(text: &str, term: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= PREVIEW_MAX_CHARS {
        return text.to_string();
    }

    if let Some((start, len)) = find_ignore_case(&chars, term) {
        let from = start.saturating_sub(PREVIEW_CONTEXT_CHARS);
        let to = (start + len + PREVIEW_CONTEXT_CHARS).min(chars.len());
        let window: String = chars[from..to].iter().collect();
        return format!("{ELLIPSIS}{window}{ELLIPSIS}");
    }

    let head: String = chars[..PREVIEW_MAX_CHARS].iter().collect();
    format!("{head}{ELLIPSIS}")
}

/// Char-indexed position and length of the first case-insensitive match.
fn find_ignore_case(chars: &[char], term: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = term.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }
    (0..chars.len()).find_map(|start| match_len_at(&chars[start..], &needle).map(|len| (start, len)))
}

/// Number of source chars consumed when `needle` matches at the head of
/// `chars`.
fn match_len_at(chars: &[char], needle: &[char]) -> Option<usize> {
    let mut matched = 0usize;
    for (idx, source) in chars.iter().enumerate() {
        for lower in source.to_lowercase() {
            if matched == needle.len() || lower != needle[matched] {
                return None;
            }
            matched += 1;
        }
        if matched == needle.len() {
            return Some(idx + 1);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{search_preview, PREVIEW_MAX_CHARS};

    #[test]
    fn short_text_is_returned_unchanged() {
        assert_eq!(search_preview("Milk, eggs", "zzz"), "Milk, eggs");
    }

    #[test]
    fn long_text_is_windowed_around_match() {
        let text = format!("{}Paris{}", "a".repeat(80), "b".repeat(80));
        let preview = search_preview(&text, "paris");
        assert_eq!(
            preview,
            format!("...{}Paris{}...", "a".repeat(30), "b".repeat(30))
        );
    }

    #[test]
    fn window_is_clamped_at_text_edges() {
        let text = format!("Paris{}", "b".repeat(120));
        let preview = search_preview(&text, "PARIS");
        assert_eq!(preview, format!("...Paris{}...", "b".repeat(30)));
    }

    #[test]
    fn long_text_without_match_is_truncated() {
        let text = "x".repeat(150);
        let preview = search_preview(&text, "paris");
        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS + 3);
        assert!(preview.ends_with("..."));
    }
}
