//! Text matching primitives shared by the filter, the scanner and the renderer
//!
//! Everything here is a pure function: substring search with context
//! extraction, case folding that keeps byte offsets stable, and the escaping
//! used before query text or page text reaches rendered markup.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};

/// Queries shorter than this never produce content matches.
pub const MIN_QUERY_LEN: usize = 2;

/// Lowercase `text` such that byte offsets into the result are valid byte
/// offsets into `text`.
///
/// Full Unicode lowercasing is used when it preserves the byte length (the
/// overwhelmingly common case); otherwise only ASCII letters are folded.
pub fn fold_case(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        if text.bytes().any(|b| b.is_ascii_uppercase()) {
            return Cow::Owned(text.to_ascii_lowercase());
        }
        return Cow::Borrowed(text);
    }
    let lower = text.to_lowercase();
    if lower.len() == text.len() {
        Cow::Owned(lower)
    } else {
        Cow::Owned(text.to_ascii_lowercase())
    }
}

/// Check if haystack contains needle case-insensitively.
/// `needle_lower` must already be lowercase.
///
/// ASCII haystacks are compared byte-by-byte without allocating.
pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    if needle_lower.is_empty() {
        return true;
    }
    if haystack.is_ascii() && needle_lower.is_ascii() {
        let h = haystack.as_bytes();
        let n = needle_lower.as_bytes();
        if n.len() > h.len() {
            return false;
        }
        return h
            .windows(n.len())
            .any(|window| window.iter().zip(n).all(|(a, b)| a.to_ascii_lowercase() == *b));
    }
    haystack.to_lowercase().contains(needle_lower)
}

/// Lazy forward scan over non-overlapping occurrences.
///
/// After each hit the scan resumes at `hit + needle.len()`, so `"abab"`
/// contains `"ab"` twice and `"aaa"` contains `"aa"` once.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    haystack: &'a str,
    needle: &'a str,
    start: usize,
}

impl Iterator for Occurrences<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.needle.is_empty() || self.start > self.haystack.len() {
            return None;
        }
        let found = self.haystack.get(self.start..)?.find(self.needle)?;
        let index = self.start + found;
        self.start = index + self.needle.len();
        Some(index)
    }
}

/// Find every non-overlapping occurrence of `needle_lower` in `haystack_lower`.
///
/// Needles shorter than [`MIN_QUERY_LEN`] characters yield nothing: one-letter
/// content matches are noise.
pub fn find_all_occurrences<'a>(haystack_lower: &'a str, needle_lower: &'a str) -> Occurrences<'a> {
    let needle = if needle_lower.chars().count() < MIN_QUERY_LEN {
        ""
    } else {
        needle_lower
    };
    Occurrences {
        haystack: haystack_lower,
        needle,
        start: 0,
    }
}

/// Text window of `radius` characters either side of a match, trimmed.
///
/// `match_index` and `query_len` are byte offsets; out-of-range or
/// mid-character offsets are snapped to the nearest valid boundary.
pub fn extract_context(text: &str, match_index: usize, query_len: usize, radius: usize) -> String {
    let match_start = floor_char_boundary(text, match_index);
    let match_end = ceil_char_boundary(text, match_index.saturating_add(query_len));

    let start = if radius == 0 {
        match_start
    } else {
        text[..match_start]
            .char_indices()
            .rev()
            .take(radius)
            .last()
            .map_or(match_start, |(i, _)| i)
    };
    let end = text[match_end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| match_end + i);

    text[start..end].trim().to_string()
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// Neutralize markup-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escape regex metacharacters so `text` matches literally.
pub fn escape_regex(text: &str) -> String {
    regex::escape(text)
}

/// Case-insensitive literal pattern for `query`; `None` for an empty query.
fn literal_pattern(query: &str) -> Option<Regex> {
    if query.is_empty() {
        return None;
    }
    RegexBuilder::new(&escape_regex(query))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Wrap case-insensitive occurrences of `query` in `<mark>` tags.
///
/// Both arguments are taken as-is. Use [`highlight_escaped`] for untrusted
/// text.
pub fn highlight(text: &str, query: &str) -> String {
    match literal_pattern(query) {
        Some(pattern) => pattern.replace_all(text, "<mark>$0</mark>").into_owned(),
        None => text.to_string(),
    }
}

/// Highlight `query` in raw `text`, escaping the text around and inside
/// each match. Matches are found before escaping, so a query never lands
/// inside an entity such as `&amp;`.
pub fn highlight_escaped(text: &str, query: &str) -> String {
    let Some(pattern) = literal_pattern(query) else {
        return escape_html(text);
    };
    let mut marked = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for found in pattern.find_iter(text) {
        marked.push_str(&escape_html(&text[last..found.start()]));
        marked.push_str("<mark>");
        marked.push_str(&escape_html(found.as_str()));
        marked.push_str("</mark>");
        last = found.end();
    }
    marked.push_str(&escape_html(&text[last..]));
    marked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_all_occurrences_non_overlapping() {
        let hits: Vec<usize> = find_all_occurrences("abab", "ab").collect();
        assert_eq!(hits, vec![0, 2]);

        let hits: Vec<usize> = find_all_occurrences("aaaa", "aa").collect();
        assert_eq!(hits, vec![0, 2]);

        let hits: Vec<usize> = find_all_occurrences("aaa", "aa").collect();
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn test_find_all_occurrences_rejects_short_needles() {
        assert_eq!(find_all_occurrences("aaaa", "a").count(), 0);
        assert_eq!(find_all_occurrences("aaaa", "").count(), 0);
        assert_eq!(find_all_occurrences("", "ab").count(), 0);
    }

    #[test]
    fn test_find_all_occurrences_multibyte() {
        let hits: Vec<usize> = find_all_occurrences("café café", "fé").collect();
        assert_eq!(hits, vec![2, 8]);
    }

    #[test]
    fn test_extract_context_window_and_trim() {
        let text = "0123456789 error 0123456789";
        let idx = text.find("error").unwrap();
        assert_eq!(extract_context(text, idx, 5, 3), "89 error 01");
        assert_eq!(extract_context(text, idx, 5, 0), "error");
        assert_eq!(extract_context(text, idx, 5, 100), text);
    }

    #[test]
    fn test_extract_context_clamps_out_of_range() {
        assert_eq!(extract_context("short", 3, 10, 40), "short");
        assert_eq!(extract_context("short", 99, 2, 2), "rt");
        assert_eq!(extract_context("", 0, 2, 40), "");
    }

    #[test]
    fn test_extract_context_snaps_to_char_boundaries() {
        let text = "ééééé match ééééé";
        let idx = text.find("match").unwrap();
        let context = extract_context(text, idx, 5, 3);
        assert_eq!(context, "éé match éé");
        // Offset in the middle of a two-byte character must not panic
        let _ = extract_context(text, 1, 2, 2);
    }

    #[test]
    fn test_fold_case_keeps_offsets() {
        assert_eq!(fold_case("Hello World"), "hello world");
        assert!(matches!(fold_case("already lower"), Cow::Borrowed(_)));
        assert_eq!(fold_case("ÉCOLE"), "école");
        // 'İ' lowercases to two code points; offsets must stay aligned
        let folded = fold_case("İstanbul AB");
        assert_eq!(folded.len(), "İstanbul AB".len());
        assert!(folded.ends_with("ab"));
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("GitHub Repo", "github"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Git", "github"));
        assert!(contains_ignore_case("Ünïcödé Title", "ünïcödé"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("a.b*c"), r"a\.b\*c");
        assert_eq!(escape_regex("(x)"), r"\(x\)");
    }

    #[test]
    fn test_highlight_is_case_insensitive_and_literal() {
        assert_eq!(
            highlight("GitHub and github", "github"),
            "<mark>GitHub</mark> and <mark>github</mark>"
        );
        assert_eq!(highlight("a.b axb", "a.b"), "<mark>a.b</mark> axb");
        assert_eq!(highlight("unchanged", ""), "unchanged");
        assert_eq!(highlight("price (usd)", "(usd)"), "price <mark>(usd)</mark>");
    }

    #[test]
    fn test_highlight_escaped_keeps_entities_intact() {
        assert_eq!(highlight_escaped("A & B", "amp"), "A &amp; B");
        assert_eq!(highlight_escaped("x < y", "lt"), "x &lt; y");
        assert_eq!(
            highlight_escaped("Tom & Jerry <3", "& jer"),
            "Tom <mark>&amp; Jer</mark>ry &lt;3"
        );
        assert_eq!(highlight_escaped("<b>", ""), "&lt;b&gt;");
    }
}
