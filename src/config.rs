use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::directory::DEFAULT_DIRECTORY_API_URL;
use crate::fetch::paginate::DEFAULT_MAX_PAGES;
use crate::fetch::ProtectedOrigin;
use crate::sources::{mail, repository, wiki, SourceSettings};

/// Default number of requests allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Central configuration loaded from environment variables.
///
/// Credentials come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory API key (W3C_API_KEY), required for `run`.
    pub w3c_api_key: String,
    /// Code-hosting token (GITHUB_TOKEN). Empty means unauthenticated,
    /// which works but hits much lower rate limits.
    pub github_token: String,
    pub directory_api_url: String,
    pub github_api_url: String,
    /// Root for wiki services declared with a relative path.
    pub wiki_site_root: String,
    /// Unix timestamp wiki changes are requested from.
    pub wiki_since: i64,
    /// Only mailing lists under this prefix are fetched.
    pub archive_prefix: String,
    /// Where snapshot files are written.
    pub data_dir: PathBuf,
    /// Global cap on in-flight requests.
    pub max_concurrent: usize,
    /// Pagination cutoff for a single list walk.
    pub max_pages: usize,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            w3c_api_key: String::new(),
            github_token: String::new(),
            directory_api_url: DEFAULT_DIRECTORY_API_URL.to_string(),
            github_api_url: repository::DEFAULT_GITHUB_API_URL.to_string(),
            wiki_site_root: wiki::DEFAULT_SITE_ROOT.to_string(),
            wiki_since: wiki::DEFAULT_SINCE,
            archive_prefix: mail::DEFAULT_ARCHIVE_PREFIX.to_string(),
            data_dir: PathBuf::from("./data"),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            max_pages: DEFAULT_MAX_PAGES,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            w3c_api_key: env::var("W3C_API_KEY").unwrap_or_default(),
            github_token: env::var("GITHUB_TOKEN").unwrap_or_default(),
            directory_api_url: env::var("DIRECTORY_API_URL").unwrap_or(defaults.directory_api_url),
            github_api_url: env::var("GITHUB_API_URL").unwrap_or(defaults.github_api_url),
            wiki_site_root: env::var("WIKI_SITE_ROOT").unwrap_or(defaults.wiki_site_root),
            wiki_since: env_parse("GROUPWATCH_WIKI_SINCE", defaults.wiki_since)?,
            archive_prefix: env::var("MAILING_LIST_ARCHIVE_PREFIX")
                .unwrap_or(defaults.archive_prefix),
            data_dir: env::var("GROUPWATCH_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            max_concurrent: env_parse("GROUPWATCH_MAX_CONCURRENT", defaults.max_concurrent)?,
            max_pages: env_parse("GROUPWATCH_MAX_PAGES", defaults.max_pages)?,
            request_timeout: Duration::from_secs(env_parse(
                "GROUPWATCH_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
        })
    }

    /// Check that the directory API key is configured.
    /// Call this before any operation that lists community groups.
    pub fn require_directory(&self) -> Result<()> {
        if self.w3c_api_key.is_empty() {
            anyhow::bail!(
                "W3C_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }

    /// Hosts that get a credential header attached, one per configured credential.
    pub fn protected_origins(&self) -> Result<Vec<ProtectedOrigin>> {
        let mut origins = Vec::new();
        if !self.w3c_api_key.is_empty() {
            origins.push(ProtectedOrigin::for_base_url(
                &self.directory_api_url,
                "Authorization",
                &format!("W3C-API apikey=\"{}\"", self.w3c_api_key),
            )?);
        }
        if !self.github_token.is_empty() {
            origins.push(ProtectedOrigin::for_base_url(
                &self.github_api_url,
                "Authorization",
                &format!("Bearer {}", self.github_token),
            )?);
        }
        Ok(origins)
    }

    pub fn source_settings(&self) -> SourceSettings {
        SourceSettings {
            github_api_url: self.github_api_url.clone(),
            wiki_site_root: self.wiki_site_root.clone(),
            wiki_since: self.wiki_since,
            archive_prefix: self.archive_prefix.clone(),
        }
    }
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number, got {raw:?}")),
        _ => Ok(default),
    }
}
