//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file
//! (`config.yaml`). Defines the structs for connected services and the bot's
//! own identity and ledger settings.

use serde::Deserialize;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

/// Configuration for various connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub username: String,
    pub password: String,
    pub homeserver: String,
}

/// Identity and ledger settings for the bot itself.
#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    /// Display name the bot answers to, in addition to the trigger word.
    #[serde(default = "default_bot_name")]
    pub name: String,
    /// Word that marks a message as addressed to the bot.
    #[serde(default = "default_trigger_word")]
    pub trigger_word: String,
    /// Room that carries GitHub webhook traffic, if the team uses one.
    #[serde(default)]
    pub github_channel: Option<String>,
    /// Room for the first-run welcome banner. Falls back to the first
    /// joined room when unset.
    #[serde(default)]
    pub home_channel: Option<String>,
    /// Platform system account whose messages are always ignored.
    #[serde(default)]
    pub system_user: Option<String>,
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            trigger_word: default_trigger_word(),
            github_channel: None,
            home_channel: None,
            system_user: None,
            db_path: default_db_path(),
        }
    }
}

fn default_bot_name() -> String {
    "dumbledore".to_string()
}

fn default_trigger_word() -> String {
    "professor".to_string()
}

fn default_db_path() -> String {
    "data/ledger.db".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_bot_defaults() {
        let yaml = r#"
services:
  matrix:
    username: headmaster
    password: secret
    homeserver: https://matrix.example.org
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.bot.name, "dumbledore");
        assert_eq!(config.bot.trigger_word, "professor");
        assert_eq!(config.bot.db_path, "data/ledger.db");
        assert!(config.bot.github_channel.is_none());
    }

    #[test]
    fn bot_section_overrides() {
        let yaml = r#"
services:
  matrix:
    username: headmaster
    password: secret
    homeserver: https://matrix.example.org
bot:
  name: minerva
  trigger_word: headmistress
  github_channel: "!github:example.org"
  db_path: /var/lib/headmaster/ledger.db
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.bot.name, "minerva");
        assert_eq!(config.bot.trigger_word, "headmistress");
        assert_eq!(
            config.bot.github_channel.as_deref(),
            Some("!github:example.org")
        );
    }
}
