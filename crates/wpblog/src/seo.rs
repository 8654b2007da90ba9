use serde::{Deserialize, Serialize};

use crate::content::{OgImage, WordPressPage};

const NOT_FOUND_TITLE: &str = "Page Not Found";
const WORDS_PER_MINUTE: usize = 200;

/// Head metadata for a single article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_images: Vec<OgImage>,
}

impl PageMetadata {
    /// Yoast values win; otherwise fall back to the rendered title and a
    /// plain-text cut of the excerpt.
    pub fn from_page(page: &WordPressPage, description_length: usize) -> Self {
        let yoast = page.yoast();
        let title = yoast_value(yoast.and_then(|y| y.title.as_ref()))
            .unwrap_or_else(|| page.title.rendered.clone());
        let description = yoast_value(yoast.and_then(|y| y.description.as_ref()))
            .unwrap_or_else(|| wpclean::extract_plain_text(&page.excerpt.rendered, description_length));
        let og_title = yoast_value(yoast.and_then(|y| y.og_title.as_ref()))
            .unwrap_or_else(|| page.title.rendered.clone());

        Self {
            title,
            description: Some(description),
            og_title: Some(og_title),
            og_description: yoast_value(yoast.and_then(|y| y.og_description.as_ref())),
            og_images: yoast.map(|y| y.og_image.clone()).unwrap_or_default(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            title: NOT_FOUND_TITLE.to_string(),
            description: None,
            og_title: None,
            og_description: None,
            og_images: Vec::new(),
        }
    }
}

/// Yoast sends `""` for fields nobody filled in; those count as missing.
fn yoast_value(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// Estimated minutes to read `content_html`, never less than one.
pub fn reading_time_minutes(content_html: &str) -> usize {
    let words = wpclean::strip_tags(content_html).split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}
