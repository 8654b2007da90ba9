pub mod dom;
pub mod policy;
pub mod sanitize;
pub mod text;

pub use sanitize::{sanitize, Sanitizer};
pub use text::{extract_first_image, extract_plain_text, strip_tags, DEFAULT_EXCERPT_LENGTH};
