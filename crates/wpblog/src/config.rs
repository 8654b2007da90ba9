use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::try_exists;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site_title: String,
    pub render: RenderConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Meta description length in characters.
    pub description_length: usize,
    /// Listing card excerpt length in characters.
    pub card_excerpt_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Per-file load timeout.
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_title: String::from("Blog"),
            render: RenderConfig {
                description_length: wpclean::DEFAULT_EXCERPT_LENGTH,
                card_excerpt_length: 120,
            },
            source: SourceConfig {
                fetch_timeout_secs: 8,
            },
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Config {
    pub async fn load() -> Result<Self> {
        if let Some(config_path) = Self::config_path() {
            if try_exists(&config_path).await? {
                match tokio::fs::read_to_string(&config_path).await {
                    Ok(content) => {
                        if content.trim().is_empty() {
                            log::warn!("Config file is empty, creating new one");
                            let default_config = Self::default();
                            let _ = default_config.save().await;
                            return Ok(default_config);
                        }

                        match serde_json::from_str::<Self>(&content) {
                            Ok(mut config) => {
                                config.validate()?;
                                log::info!(
                                    "Successfully loaded config from: {}",
                                    config_path.display()
                                );
                                return Ok(config);
                            }
                            Err(json_err) => {
                                log::error!("Failed to parse config file: {}", json_err);

                                let backup_path = config_path.with_extension("bak");
                                if let Err(e) = tokio::fs::copy(&config_path, &backup_path).await {
                                    log::warn!("Failed to backup broken config: {}", e);
                                } else {
                                    log::info!(
                                        "Backed up broken config to: {}",
                                        backup_path.display()
                                    );
                                }

                                let default_config = Self::default();
                                let _ = default_config.save().await;
                                return Ok(default_config);
                            }
                        }
                    }
                    Err(io_err) => {
                        log::error!("Failed to read config file: {}", io_err);
                    }
                }
            } else {
                log::info!("Config file does not exist, creating default");
            }
        }

        let default_config = Self::default();
        let _ = default_config.save().await;
        Ok(default_config)
    }

    pub async fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_path() {
            let mut config_to_save = self.clone();
            config_to_save.validate()?;

            if let Some(parent) = config_path.parent() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    return Err(anyhow::anyhow!(
                        "Failed to create config directory: {} - {}",
                        parent.display(),
                        e
                    ));
                }
                log::debug!("Config directory exists or was created: {}", parent.display());
            }

            let content = serde_json::to_string_pretty(&config_to_save)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            tokio::fs::write(&config_path, content).await.map_err(|e| {
                anyhow::anyhow!(
                    "Failed to write config file: {} - {}",
                    config_path.display(),
                    e
                )
            })?;
            log::info!("Successfully saved config to: {}", config_path.display());
        }
        Ok(())
    }

    /// Validate configuration values and fix invalid ones
    pub fn validate(&mut self) -> Result<()> {
        let defaults = Self::default();
        let mut has_issues = false;

        if !(20..=500).contains(&self.render.description_length) {
            log::warn!(
                "Invalid description length: {}, using default",
                self.render.description_length
            );
            self.render.description_length = defaults.render.description_length;
            has_issues = true;
        }

        if !(20..=500).contains(&self.render.card_excerpt_length) {
            log::warn!(
                "Invalid card excerpt length: {}, using default",
                self.render.card_excerpt_length
            );
            self.render.card_excerpt_length = defaults.render.card_excerpt_length;
            has_issues = true;
        }

        if !(1..=120).contains(&self.source.fetch_timeout_secs) {
            log::warn!(
                "Invalid fetch timeout: {}s, using default",
                self.source.fetch_timeout_secs
            );
            self.source.fetch_timeout_secs = defaults.source.fetch_timeout_secs;
            has_issues = true;
        }

        if self.site_title.trim().is_empty() {
            log::warn!("Empty site title, using default");
            self.site_title = defaults.site_title;
            has_issues = true;
        }

        if has_issues {
            log::info!("Configuration validation completed with corrections");
        }

        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("WPBLOG_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("WPBLOG_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("com", "wpblog", "wpblog")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn config_test_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn set_config_path(path: &std::path::Path) -> (Option<String>, Option<String>) {
        let previous_dir = std::env::var("WPBLOG_CONFIG_DIR").ok();
        let previous_path = std::env::var("WPBLOG_CONFIG_PATH").ok();
        std::env::set_var("WPBLOG_CONFIG_PATH", path);
        std::env::remove_var("WPBLOG_CONFIG_DIR");
        (previous_dir, previous_path)
    }

    fn restore_config_env(previous: (Option<String>, Option<String>)) {
        match previous.0 {
            Some(value) => std::env::set_var("WPBLOG_CONFIG_DIR", value),
            None => std::env::remove_var("WPBLOG_CONFIG_DIR"),
        }

        match previous.1 {
            Some(value) => std::env::set_var("WPBLOG_CONFIG_PATH", value),
            None => std::env::remove_var("WPBLOG_CONFIG_PATH"),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.site_title, "Blog");
        assert_eq!(config.render.description_length, 160);
        assert_eq!(config.render.card_excerpt_length, 120);
        assert_eq!(config.source.fetch_timeout_secs, 8);
        assert_eq!(config.source.timeout(), Duration::from_secs(8));
    }

    #[test]
    fn test_validate_repairs_out_of_range_values() {
        let mut config = Config::default();
        config.render.description_length = 5;
        config.render.card_excerpt_length = 10_000;
        config.source.fetch_timeout_secs = 0;
        config.site_title = "  ".to_string();

        config.validate().unwrap();
        assert_eq!(config.render.description_length, 160);
        assert_eq!(config.render.card_excerpt_length, 120);
        assert_eq!(config.source.fetch_timeout_secs, 8);
        assert_eq!(config.site_title, "Blog");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();

        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"site_title\""));
        assert!(json.contains("\"render\""));
        assert!(json.contains("\"fetch_timeout_secs\""));

        let config_from_json: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.site_title, config_from_json.site_title);
        assert_eq!(
            config.render.description_length,
            config_from_json.render.description_length
        );
    }

    #[tokio::test]
    async fn test_config_load_variants() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.json");
        let previous_env = {
            let _guard = config_test_lock().lock().unwrap();
            set_config_path(&config_file)
        }; // release lock before await

        // Missing file: defaults are written back.
        let config = Config::load().await.unwrap();
        assert_eq!(config.site_title, "Blog");
        assert!(config_file.exists());

        // Valid file with a value out of range.
        tokio::fs::write(
            &config_file,
            r#"{"site_title":"Campus","render":{"description_length":1,"card_excerpt_length":90},"source":{"fetch_timeout_secs":3}}"#,
        )
        .await
        .unwrap();
        let config = Config::load().await.unwrap();
        assert_eq!(config.site_title, "Campus");
        assert_eq!(config.render.description_length, 160);
        assert_eq!(config.render.card_excerpt_length, 90);
        assert_eq!(config.source.fetch_timeout_secs, 3);

        // Broken file: backed up, defaults used.
        tokio::fs::write(&config_file, "{not json").await.unwrap();
        let config = Config::load().await.unwrap();
        assert_eq!(config.site_title, "Blog");
        assert!(config_file.with_extension("bak").exists());

        restore_config_env(previous_env);
    }
}
