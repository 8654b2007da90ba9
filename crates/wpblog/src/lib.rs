// wpblog library exports

pub mod command_processor;
pub mod config;
pub mod content;
pub mod render;
pub mod seo;
pub mod source;

pub use command_processor::{Command, CommandProcessor, Outcome};
pub use config::Config;
pub use content::WordPressPage;
pub use render::{Article, Listing, PostCard};
pub use seo::PageMetadata;
