//! WordPress REST content model and the selection rules applied to it before
//! anything is rendered.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Pages with this much rendered content or less are treated as stubs.
pub const MIN_CONTENT_LENGTH: usize = 100;

const PUBLISH_STATUS: &str = "publish";

/// A post or page as returned by `/wp-json/wp/v2/{posts,pages}?_embed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordPressPage {
    pub id: u64,
    pub date: String,
    #[serde(default)]
    pub date_gmt: String,
    #[serde(default)]
    pub modified: String,
    pub slug: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub link: String,
    pub title: Rendered,
    pub content: RenderedContent,
    #[serde(default)]
    pub excerpt: RenderedContent,
    #[serde(default)]
    pub author: u64,
    #[serde(default)]
    pub featured_media: u64,
    #[serde(default)]
    pub parent: u64,
    #[serde(default)]
    pub menu_order: i64,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub yoast_head_json: Option<YoastHead>,
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<Embedded>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rendered {
    pub rendered: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderedContent {
    pub rendered: String,
    #[serde(default)]
    pub protected: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YoastHead {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub og_title: Option<String>,
    #[serde(default)]
    pub og_description: Option<String>,
    #[serde(default)]
    pub og_image: Vec<OgImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OgImage {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// `_embedded` block. Only featured media is read; other relations are kept
/// as raw JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Embedded {
    #[serde(rename = "wp:featuredmedia", default)]
    pub featured_media: Vec<FeaturedMedia>,
    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeaturedMedia {
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub alt_text: String,
}

impl WordPressPage {
    pub fn is_published(&self) -> bool {
        self.status == PUBLISH_STATUS
    }

    /// Parsed `date`. WordPress sends site-local time without an offset.
    pub fn published_at(&self) -> Option<NaiveDateTime> {
        parse_wp_date(&self.date)
    }

    pub fn yoast(&self) -> Option<&YoastHead> {
        self.yoast_head_json.as_ref()
    }
}

pub fn parse_wp_date(date: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(date).ok().map(|d| d.naive_local()))
}

/// Published pages with real content.
pub fn select_pages(pages: Vec<WordPressPage>) -> Vec<WordPressPage> {
    let total = pages.len();
    let selected: Vec<WordPressPage> = pages
        .into_iter()
        .filter(|page| {
            !page.content.rendered.is_empty()
                && page.content.rendered.len() > MIN_CONTENT_LENGTH
                && page.is_published()
        })
        .collect();
    log::debug!("Selected {} of {} pages", selected.len(), total);
    selected
}

/// Pages and posts together, newest first. Undated entries go last.
pub fn merge_by_date(pages: Vec<WordPressPage>, posts: Vec<WordPressPage>) -> Vec<WordPressPage> {
    let mut all = select_pages(pages);
    all.extend(posts);
    // Stable sort keeps source order for equal dates.
    all.sort_by_key(|item| Reverse(item.published_at()));
    all
}

/// Pages take precedence over posts sharing a slug.
pub fn find_by_slug<'a>(
    pages: &'a [WordPressPage],
    posts: &'a [WordPressPage],
    slug: &str,
) -> Option<&'a WordPressPage> {
    pages
        .iter()
        .find(|page| page.slug == slug)
        .or_else(|| posts.iter().find(|post| post.slug == slug))
}

/// Case-insensitive match on title, excerpt or content. A blank query
/// matches everything.
pub fn search<'a>(items: &'a [WordPressPage], query: &str) -> Vec<&'a WordPressPage> {
    if query.trim().is_empty() {
        return items.iter().collect();
    }

    let query = query.to_lowercase();
    items
        .iter()
        .filter(|item| {
            item.title.rendered.to_lowercase().contains(&query)
                || item.excerpt.rendered.to_lowercase().contains(&query)
                || item.content.rendered.to_lowercase().contains(&query)
        })
        .collect()
}

/// Embedded featured media, then the first Yoast Open Graph image.
pub fn featured_image(page: &WordPressPage) -> Option<String> {
    let embedded = page
        .embedded
        .as_ref()
        .and_then(|embedded| embedded.featured_media.first())
        .map(|media| media.source_url.as_str())
        .filter(|url| !url.is_empty());

    embedded
        .or_else(|| {
            page.yoast()
                .and_then(|yoast| yoast.og_image.first())
                .map(|image| image.url.as_str())
                .filter(|url| !url.is_empty())
        })
        .map(str::to_string)
}

/// Replaces the dash and apostrophe entities WordPress puts in titles.
pub fn decode_title(title: &str) -> String {
    title.replace("&#8211;", "–").replace("&#8217;", "'")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn page(id: u64, slug: &str, date: &str, body: &str) -> WordPressPage {
        WordPressPage {
            id,
            date: date.to_string(),
            slug: slug.to_string(),
            status: "publish".to_string(),
            kind: "post".to_string(),
            title: Rendered {
                rendered: format!("Title {}", id),
            },
            content: RenderedContent {
                rendered: body.to_string(),
                protected: false,
            },
            ..Default::default()
        }
    }

    fn long_body() -> String {
        format!("<p>{}</p>", "content ".repeat(20))
    }

    #[test]
    fn test_deserialize_rest_response() {
        let json = r#"{
            "id": 42,
            "date": "2024-03-05T10:00:00",
            "date_gmt": "2024-03-05T09:00:00",
            "slug": "hello-world",
            "status": "publish",
            "type": "post",
            "link": "https://example.com/hello-world/",
            "title": {"rendered": "Hello &#8211; World"},
            "content": {"rendered": "<p>Body</p>", "protected": false},
            "excerpt": {"rendered": "<p>Short</p>", "protected": false},
            "author": 1,
            "categories": [3, 4],
            "yoast_head_json": {
                "title": "Hello | Blog",
                "og_image": [{"url": "https://example.com/og.png", "width": 1200, "height": 630}]
            },
            "_embedded": {
                "author": [{"id": 1}],
                "wp:featuredmedia": [{"source_url": "https://example.com/f.jpg", "alt_text": "F"}]
            }
        }"#;

        let page: WordPressPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.id, 42);
        assert_eq!(page.kind, "post");
        assert_eq!(page.yoast().unwrap().title.as_deref(), Some("Hello | Blog"));
        assert_eq!(page.yoast().unwrap().og_image[0].width, 1200);
        let embedded = page.embedded.as_ref().unwrap();
        assert_eq!(embedded.featured_media[0].alt_text, "F");
        assert!(embedded.other.contains_key("author"));
        assert!(page.published_at().is_some());
    }

    #[test]
    fn test_select_pages() {
        let mut draft = page(1, "draft", "2024-01-01T00:00:00", &long_body());
        draft.status = "draft".to_string();
        let stub = page(2, "stub", "2024-01-01T00:00:00", "<p>short</p>");
        let real = page(3, "real", "2024-01-01T00:00:00", &long_body());

        let selected = select_pages(vec![draft, stub, real]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].slug, "real");
    }

    #[test]
    fn test_merge_sorts_newest_first() {
        let pages = vec![page(1, "about", "2023-06-01T00:00:00", &long_body())];
        let posts = vec![
            page(2, "old", "2022-01-01T00:00:00", "x"),
            page(3, "new", "2024-01-01T00:00:00", "x"),
            page(4, "undated", "not a date", "x"),
        ];

        let merged = merge_by_date(pages, posts);
        let slugs: Vec<&str> = merged.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "about", "old", "undated"]);
    }

    #[test]
    fn test_find_by_slug_prefers_pages() {
        let pages = vec![page(1, "shared", "2024-01-01T00:00:00", "page")];
        let posts = vec![
            page(2, "shared", "2024-01-01T00:00:00", "post"),
            page(3, "only-post", "2024-01-01T00:00:00", "post"),
        ];

        assert_eq!(find_by_slug(&pages, &posts, "shared").unwrap().id, 1);
        assert_eq!(find_by_slug(&pages, &posts, "only-post").unwrap().id, 3);
        assert!(find_by_slug(&pages, &posts, "missing").is_none());
    }

    #[test]
    fn test_search() {
        let mut a = page(1, "a", "2024-01-01T00:00:00", "<p>Campus analytics</p>");
        a.excerpt.rendered = "<p>Data</p>".to_string();
        let b = page(2, "b", "2024-01-01T00:00:00", "<p>Enrollment</p>");
        let items = vec![a, b];

        assert_eq!(search(&items, "").len(), 2);
        assert_eq!(search(&items, "   ").len(), 2);
        assert_eq!(search(&items, "ANALYTICS")[0].id, 1);
        assert_eq!(search(&items, "data")[0].id, 1);
        assert_eq!(search(&items, "title 2")[0].id, 2);
        assert!(search(&items, "nothing").is_empty());
    }

    #[test]
    fn test_featured_image_fallbacks() {
        let mut p = page(1, "a", "2024-01-01T00:00:00", "");
        assert_eq!(featured_image(&p), None);

        p.yoast_head_json = Some(YoastHead {
            og_image: vec![OgImage {
                url: "https://example.com/og.png".to_string(),
                width: 1,
                height: 1,
            }],
            ..Default::default()
        });
        assert_eq!(featured_image(&p).as_deref(), Some("https://example.com/og.png"));

        p.embedded = Some(Embedded {
            featured_media: vec![FeaturedMedia {
                source_url: "https://example.com/f.jpg".to_string(),
                alt_text: String::new(),
            }],
            ..Default::default()
        });
        assert_eq!(featured_image(&p).as_deref(), Some("https://example.com/f.jpg"));
    }

    #[test]
    fn test_decode_title() {
        assert_eq!(decode_title("A &#8211; B&#8217;s"), "A – B's");
    }
}
