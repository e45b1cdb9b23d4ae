//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::MarkdownTheme;

/// Fixed image used for works without a resolvable thumbnail
pub const DEFAULT_THUMBNAIL: &str = "/images/portfolio_icon1.jpg";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,
    pub i18n_dir: String,

    // Rendering
    pub default_thumbnail: String,
    #[serde(default)]
    pub markdown: MarkdownTheme,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Love Beautiful Code".to_string(),
            description: String::new(),
            language: "ja".to_string(),
            timezone: "Asia/Tokyo".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            i18n_dir: "languages".to_string(),

            default_thumbnail: DEFAULT_THUMBNAIL.to_string(),
            markdown: MarkdownTheme::default(),

            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Time zone used when formatting entry dates
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, falling back to UTC", self.timezone);
            chrono_tz::UTC
        })
    }
}

/// When the content store is queried relative to page delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FetchTiming {
    /// Fetch once per incoming request, before responding
    Request,
    /// Fetch once up front and serve the rendered snapshot
    Build,
    /// Deliver an empty shell and fetch after the page is mounted
    Mount,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
    pub timing: FetchTiming,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
            timing: FetchTiming::Request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Love Beautiful Code");
        assert_eq!(config.default_thumbnail, "/images/portfolio_icon1.jpg");
        assert_eq!(config.server.timing, FetchTiming::Request);
        assert_eq!(config.tz(), chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Portfolio
language: en
timezone: Europe/Berlin
server:
  port: 8080
  timing: mount
markdown:
  inline_code: code-tag
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Portfolio");
        assert_eq!(config.language, "en");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.ip, "localhost");
        assert_eq!(config.server.timing, FetchTiming::Mount);
        assert_eq!(config.markdown.inline_code, "code-tag");
        assert_eq!(config.tz(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_utc() {
        let config = SiteConfig {
            timezone: "Mars/Olympus".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(config.tz(), chrono_tz::UTC);
    }
}
