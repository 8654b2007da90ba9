use anyhow::{Context, Result};
use serde_json::json;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use crate::config::Config;
use crate::content;
use crate::render::{Article, Listing};
use crate::seo::PageMetadata;
use crate::source;

pub const USAGE: &str = "\
Usage:
  wpblog clean <file|->                      Print cleaned HTML
  wpblog list <pages.json> <posts.json> [query]  Print the post listing as JSON
  wpblog show <pages.json> <posts.json> <slug>   Print one article as JSON";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Clean {
        input: Input,
    },
    List {
        pages: PathBuf,
        posts: PathBuf,
        query: Option<String>,
    },
    Show {
        pages: PathBuf,
        posts: PathBuf,
        slug: String,
    },
    Help,
}

impl Command {
    /// Parses the arguments after the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let parts: Vec<&str> = args.iter().map(String::as_str).collect();

        match parts.as_slice() {
            [] | ["help"] | ["-h"] | ["--help"] => Ok(Command::Help),
            ["clean", "-"] => Ok(Command::Clean {
                input: Input::Stdin,
            }),
            ["clean", path] => Ok(Command::Clean {
                input: Input::File(PathBuf::from(path)),
            }),
            ["list", pages, posts, query @ ..] => Ok(Command::List {
                pages: PathBuf::from(pages),
                posts: PathBuf::from(posts),
                query: (!query.is_empty()).then(|| query.join(" ")),
            }),
            ["show", pages, posts, slug] => Ok(Command::Show {
                pages: PathBuf::from(pages),
                posts: PathBuf::from(posts),
                slug: slug.to_string(),
            }),
            [cmd, ..] => Err(anyhow::anyhow!("Unknown or incomplete command: {}\n{}", cmd, USAGE)),
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Output(String),
    /// Printed like normal output, but the process should exit non-zero.
    NotFound(String),
}

pub struct CommandProcessor {
    config: Config,
}

impl CommandProcessor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn execute(&self, command: Command) -> Result<Outcome> {
        match command {
            Command::Help => Ok(Outcome::Output(USAGE.to_string())),
            Command::Clean { input } => {
                let html = read_input(&input).await?;
                Ok(Outcome::Output(wpclean::sanitize(&html)))
            }
            Command::List {
                pages,
                posts,
                query,
            } => {
                let (pages, posts) =
                    source::load_all(&pages, &posts, self.config.source.timeout()).await?;
                let items = content::merge_by_date(pages, posts);
                let listing = Listing::build(&items, query.as_deref(), &self.config);
                log::info!(
                    "Listing {} of {} items",
                    listing.results.len(),
                    listing.total
                );
                Ok(Outcome::Output(serde_json::to_string_pretty(&listing)?))
            }
            Command::Show { pages, posts, slug } => {
                let (pages, posts) =
                    source::load_all(&pages, &posts, self.config.source.timeout()).await?;
                match content::find_by_slug(&pages, &posts, &slug) {
                    Some(page) => {
                        let article = Article::from_page(page, &self.config);
                        Ok(Outcome::Output(serde_json::to_string_pretty(&article)?))
                    }
                    None => {
                        log::warn!("No page or post with slug '{}'", slug);
                        let body = json!({ "metadata": PageMetadata::not_found() });
                        Ok(Outcome::NotFound(serde_json::to_string_pretty(&body)?))
                    }
                }
            }
        }
    }
}

async fn read_input(input: &Input) -> Result<String> {
    match input {
        Input::Stdin => {
            let mut html = String::new();
            tokio::io::stdin()
                .read_to_string(&mut html)
                .await
                .context("Failed to read HTML from stdin")?;
            Ok(html)
        }
        Input::File(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read HTML file: {}", path.display())),
    }
}
