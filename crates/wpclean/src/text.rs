use unicode_segmentation::UnicodeSegmentation;

use crate::dom;

/// Length used for meta descriptions.
pub const DEFAULT_EXCERPT_LENGTH: usize = 160;

const ELLIPSIS: &str = "...";

/// Text content of `html`, tags removed and whitespace left as is.
pub fn strip_tags(html: &str) -> String {
    dom::text_content(&dom::parse_fragment(html))
}

/// Plain-text summary of `html`, at most `max_length` characters plus an
/// ellipsis when cut. Cuts happen at the last space before the limit.
pub fn extract_plain_text(html: &str, max_length: usize) -> String {
    if html.is_empty() {
        return String::new();
    }

    let cleaned = strip_tags(html)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.graphemes(true).count() <= max_length {
        return cleaned;
    }

    let cut = cleaned
        .grapheme_indices(true)
        .nth(max_length)
        .map_or(cleaned.len(), |(idx, _)| idx);
    let truncated = &cleaned[..cut];

    match truncated.rfind(' ') {
        Some(last_space) if last_space > 0 => format!("{}{}", &truncated[..last_space], ELLIPSIS),
        _ => format!("{}{}", truncated, ELLIPSIS),
    }
}

/// `src` of the first image in document order.
pub fn extract_first_image(html: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }

    let nodes = dom::parse_fragment(html);
    dom::find_first(&nodes, "img")
        .and_then(|img| img.attr("src"))
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}
