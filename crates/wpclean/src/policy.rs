//! Fixed cleaning policy for WordPress content.
//!
//! The lists here are compiled into the binary and are not runtime
//! configurable. Everything not listed is removed.

use lazy_static::lazy_static;
use regex::Regex;

pub const ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6",
    "p", "br", "hr",
    "ul", "ol", "li",
    "a", "strong", "b", "em", "i", "u", "s", "strike",
    "blockquote", "pre", "code",
    "img", "figure", "figcaption",
    "table", "thead", "tbody", "tr", "th", "td",
    "div", "span",
    // Video embeds
    "iframe",
];

pub const ALLOWED_ATTRIBUTES: &[&str] = &[
    "href", "target", "rel",
    "src", "alt", "title", "width", "height",
    "loading",
    "class",
    "id",
    "colspan", "rowspan",
    "frameborder", "allowfullscreen",
];

/// Removed together with their content, whatever the allow-lists say.
pub const ALWAYS_REMOVED_TAGS: &[&str] = &["script", "style"];

/// Allowed, but their content is never rendered, so it is discarded.
pub const CHILDLESS_TAGS: &[&str] = &["iframe"];

/// Elements that are dropped when they end up with nothing to show.
pub const PRUNABLE_TAGS: &[&str] = &["p", "span", "div"];

/// Class tokens kept even when a junk pattern matches them.
pub const PRESERVED_CLASSES: &[&str] = &["blog-content"];

pub const FALLBACK_ALT: &str = "Blog image";
pub const LAZY_LOADING: &str = "lazy";
pub const EXTERNAL_LINK_TARGET: &str = "_blank";
pub const EXTERNAL_LINK_REL: &str = "noopener noreferrer";

lazy_static! {
    /// Page-builder and theme class tokens, checked in order.
    pub static ref JUNK_CLASS_PATTERNS: Vec<Regex> = [
        r"^wp-",          // WordPress core
        r"^elementor-",   // Elementor
        r"^et_",          // Divi
        r"^fl-",          // Beaver Builder
        r"^vc_",          // Visual Composer
        r"^fusion-",      // Avada
        r"^ast-",         // Astra
        r"^has-",         // Gutenberg utilities
        r"^is-",          // state classes
        r"^alignwide$",
        r"^alignfull$",
        r"^size-",
        r"^attachment-",
        r"block-",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid JUNK_CLASS_PATTERNS regex pattern"))
    .collect();
}

pub fn is_always_removed(tag: &str) -> bool {
    ALWAYS_REMOVED_TAGS.contains(&tag)
}

pub fn is_childless(tag: &str) -> bool {
    CHILDLESS_TAGS.contains(&tag)
}

pub fn is_allowed_tag(tag: &str) -> bool {
    !is_always_removed(tag) && ALLOWED_TAGS.contains(&tag)
}

/// `style`, inline event handlers and `data-*` never pass, even if listed.
pub fn is_allowed_attribute(name: &str) -> bool {
    if is_forbidden_attribute(name) {
        return false;
    }
    ALLOWED_ATTRIBUTES.contains(&name)
}

pub fn is_forbidden_attribute(name: &str) -> bool {
    name == "style" || name.starts_with("on") || name.starts_with("data-")
}

pub fn is_preserved_class(token: &str) -> bool {
    PRESERVED_CLASSES.contains(&token)
}

pub fn is_junk_class(token: &str) -> bool {
    !is_preserved_class(token) && JUNK_CLASS_PATTERNS.iter().any(|re| re.is_match(token))
}

pub fn is_prunable(tag: &str) -> bool {
    PRUNABLE_TAGS.contains(&tag)
}
