use anyhow::Result;
use log::LevelFilter;
use std::env;

use wpblog::{Command, CommandProcessor, Config, Outcome};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for HTML/JSON output
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("wpblog", LevelFilter::Debug);
        logger.filter_module("wpclean", LevelFilter::Debug);
    }
    logger.init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let config = match Config::load().await {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    };

    let processor = CommandProcessor::new(config);
    match processor.execute(command).await {
        Ok(Outcome::Output(output)) => {
            println!("{}", output);
            Ok(())
        }
        Ok(Outcome::NotFound(output)) => {
            println!("{}", output);
            std::process::exit(1);
        }
        Err(err) => {
            log::error!("Command failed: {:#}", err);
            if let Some(source) = err.source() {
                eprintln!("Cause: {}", source);
            }
            Err(err)
        }
    }
}
