use serde::Serialize;

use crate::config::Config;
use crate::content::{self, parse_wp_date, WordPressPage};
use crate::seo::{self, PageMetadata};

/// Summary shown in the post listing.
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub featured_image: Option<String>,
    pub date: String,
    pub formatted_date: String,
}

impl PostCard {
    pub fn from_page(page: &WordPressPage, excerpt_length: usize) -> Self {
        let source = if page.excerpt.rendered.trim().is_empty() {
            &page.content.rendered
        } else {
            &page.excerpt.rendered
        };

        Self {
            id: page.id,
            slug: page.slug.clone(),
            title: content::decode_title(&page.title.rendered),
            excerpt: wpclean::extract_plain_text(source, excerpt_length),
            featured_image: content::featured_image(page),
            date: page.date.clone(),
            formatted_date: format_date(&page.date),
        }
    }
}

/// A single post or page ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub formatted_date: String,
    pub reading_time: usize,
    pub featured_image: Option<String>,
    pub html: String,
    pub metadata: PageMetadata,
}

impl Article {
    pub fn from_page(page: &WordPressPage, config: &Config) -> Self {
        let html = wpclean::sanitize(&page.content.rendered);
        log::debug!(
            "Cleaned '{}': {} -> {} bytes",
            page.slug,
            page.content.rendered.len(),
            html.len()
        );

        Self {
            slug: page.slug.clone(),
            title: content::decode_title(&page.title.rendered),
            date: page.date.clone(),
            formatted_date: format_date(&page.date),
            reading_time: seo::reading_time_minutes(&page.content.rendered),
            featured_image: content::featured_image(page),
            html,
            metadata: PageMetadata::from_page(page, config.render.description_length),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub site_title: String,
    pub total: usize,
    pub query: Option<String>,
    pub results: Vec<PostCard>,
}

impl Listing {
    pub fn build(items: &[WordPressPage], query: Option<&str>, config: &Config) -> Self {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let matches = content::search(items, query.unwrap_or_default());

        Self {
            site_title: config.site_title.clone(),
            total: items.len(),
            query: query.map(str::to_string),
            results: matches
                .into_iter()
                .map(|page| PostCard::from_page(page, config.render.card_excerpt_length))
                .collect(),
        }
    }
}

/// `"March 5, 2024"`, or the raw value when it is not a WordPress date.
pub fn format_date(date: &str) -> String {
    match parse_wp_date(date) {
        Some(parsed) => parsed.format("%B %-d, %Y").to_string(),
        None => date.to_string(),
    }
}
