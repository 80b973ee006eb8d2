//! Input resolution and loading.
//!
//! Positional inputs become [`Source`]s: directories are expanded to the
//! stylesheets they contain, `-` reads stdin and `http(s)://` inputs are
//! fetched. Loading happens on the tokio runtime; analysis happens later.

use crate::config::Settings;
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};
use url::Url;
use walkdir::WalkDir;

const STDIN_INPUT: &str = "-";
const STYLESHEET_EXTENSION: &str = "css";
const DEFAULT_IGNORES: [&str; 2] = ["**/node_modules/**", "**/.git/**"];
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors while resolving or loading inputs.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read stdin.
    #[error("failed to read stdin: {0}")]
    Stdin(#[source] std::io::Error),

    /// A path that is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    /// Failed to walk a directory.
    #[error("failed to walk {path}: {message}")]
    Walk { path: Utf8PathBuf, message: String },

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// An `http(s)://` input that does not parse as a URL.
    #[error("invalid URL `{input}`: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request failed.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },
}

/// One stylesheet to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(Utf8PathBuf),
    Stdin,
    Url(Url),
    GoogleFont { family: String, url: Url },
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{path}"),
            Source::Stdin => f.write_str("<stdin>"),
            Source::Url(url) => write!(f, "{url}"),
            Source::GoogleFont { family, .. } => write!(f, "google-fonts:{family}"),
        }
    }
}

/// Builds the ignore set from user globs plus the defaults.
pub fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, SourceError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns.iter().map(String::as_str).chain(DEFAULT_IGNORES) {
        let glob = Glob::new(pattern).map_err(|e| SourceError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| SourceError::InvalidGlob(e.to_string()))
}

/// Turns CLI inputs and Google Fonts families into sources, in order.
///
/// Paths that do not exist are kept as files so the failure is reported
/// against that input when it is loaded.
pub fn resolve_sources(
    inputs: &[String],
    google_fonts: &[String],
    settings: &Settings,
    ignore: &GlobSet,
) -> Result<Vec<Source>, SourceError> {
    let mut sources = Vec::new();

    for input in inputs {
        if input == STDIN_INPUT {
            sources.push(Source::Stdin);
        } else if is_http_url(input) {
            let url = Url::parse(input).map_err(|source| SourceError::InvalidUrl {
                input: input.clone(),
                source,
            })?;
            sources.push(Source::Url(url));
        } else {
            let path = Utf8PathBuf::from(input);
            if path.is_dir() {
                let files = collect_stylesheets(&path, ignore)?;
                if files.is_empty() {
                    warn!(dir = %path, "no stylesheets found");
                }
                sources.extend(files.into_iter().map(Source::File));
            } else {
                sources.push(Source::File(path));
            }
        }
    }

    for family in google_fonts {
        sources.push(Source::GoogleFont {
            family: family.clone(),
            url: settings.google_font_url(family),
        });
    }

    Ok(sources)
}

fn is_http_url(input: &str) -> bool {
    let lower = input.get(..8).unwrap_or(input).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Finds `*.css` files under `dir`, sorted, minus ignored paths.
///
/// Ignore globs match against the path relative to `dir`.
pub fn collect_stylesheets(dir: &Utf8Path, ignore: &GlobSet) -> Result<Vec<Utf8PathBuf>, SourceError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| SourceError::Walk {
            path: dir.to_owned(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = Utf8PathBuf::try_from(entry.into_path())
            .map_err(|e| SourceError::NonUtf8Path(e.into_path_buf().display().to_string()))?;
        if path.extension() != Some(STYLESHEET_EXTENSION) {
            continue;
        }
        let relative = path.strip_prefix(dir).unwrap_or(&path);
        if ignore.is_match(relative.as_str()) {
            debug!(path = %path, "ignored");
            continue;
        }
        files.push(path);
    }

    Ok(files)
}

/// Loads source text from files, stdin and the network.
#[derive(Debug, Clone)]
pub struct Loader {
    client: reqwest::Client,
}

impl Loader {
    /// Creates a loader whose HTTP requests send `user_agent`.
    pub fn new(user_agent: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self { client })
    }

    /// Reads the text of one source.
    pub async fn load(&self, source: &Source) -> Result<String, SourceError> {
        match source {
            Source::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SourceError::Read {
                        path: path.clone(),
                        source,
                    })
            }
            Source::Stdin => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .map_err(SourceError::Stdin)?;
                Ok(text)
            }
            Source::Url(url) | Source::GoogleFont { url, .. } => self.fetch(url).await,
        }
    }

    /// Loads every source concurrently, keeping input order.
    pub async fn load_all(&self, sources: Vec<Source>) -> Vec<(Source, Result<String, SourceError>)> {
        let handles: Vec<_> = sources
            .into_iter()
            .map(|source| {
                let loader = self.clone();
                tokio::spawn(async move {
                    let text = loader.load(&source).await;
                    (source, text)
                })
            })
            .collect();

        let mut loaded = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => loaded.push(result),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => warn!("load task cancelled: {e}"),
            }
        }
        loaded
    }

    async fn fetch(&self, url: &Url) -> Result<String, SourceError> {
        debug!(url = %url, "fetching");
        let http_error = |source| SourceError::Http {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(http_error)
    }
}
