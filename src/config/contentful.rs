//! Content store credentials, read from the environment at startup

use crate::error::{Result, SiteError};

const DEFAULT_HOST: &str = "cdn.contentful.com";
const DEFAULT_ENVIRONMENT: &str = "master";

/// Connection settings for the Contentful Delivery API
#[derive(Debug, Clone)]
pub struct ContentfulConfig {
    pub space_id: String,
    pub access_token: String,
    pub environment: String,
    /// `cdn.contentful.com` for published content, `preview.contentful.com` for drafts
    pub host: String,
}

impl ContentfulConfig {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup; empty values count as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let space_id = get("CONTENTFUL_SPACE_ID").ok_or(SiteError::MissingEnv("CONTENTFUL_SPACE_ID"))?;
        let access_token =
            get("CONTENTFUL_ACCESS_TOKEN").ok_or(SiteError::MissingEnv("CONTENTFUL_ACCESS_TOKEN"))?;

        Ok(Self {
            space_id,
            access_token,
            environment: get("CONTENTFUL_ENVIRONMENT")
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            host: get("CONTENTFUL_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
        })
    }

    /// Base URL for entry and asset requests
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        format!(
            "{}/spaces/{}/environments/{}",
            host, self.space_id, self.environment
        )
    }
}
