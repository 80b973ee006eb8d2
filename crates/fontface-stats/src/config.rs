//! Configuration loading.

use crate::cli::{Args, OutputFormat};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;
use thiserror::Error;
use url::Url;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "fontface-stats.json";

/// Google Fonts CSS2 endpoint.
pub const DEFAULT_GOOGLE_FONTS_URL: &str = "https://fonts.googleapis.com/css2";

/// A desktop Firefox user agent. Google Fonts only splits families into
/// `unicode-range` subsets for browsers it knows support them.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0";

const DEFAULT_DISPLAY: &str = "swap";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("failed to parse {path}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `google_fonts_url` is not a URL.
    #[error("invalid google_fonts_url `{url}`")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// The contents of a `fontface-stats.json` file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Output format.
    pub output: Option<OutputFormat>,
    /// User agent for HTTP requests.
    pub user_agent: Option<String>,
    /// Base URL of the Google Fonts CSS2 API.
    pub google_fonts_url: Option<String>,
    /// `display` parameter sent to Google Fonts.
    pub display: Option<String>,
    /// Extra ignore globs.
    pub ignore: Vec<String>,
}

impl Config {
    /// Loads configuration from a JSON file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Loads `fontface-stats.json` from `dir` if it exists.
    pub fn find(dir: &Utf8Path) -> Result<Option<(Utf8PathBuf, Self)>, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(&path).map(|config| Some((path, config)))
    }
}

/// Settings for one run, after merging the CLI over the configuration file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub output: OutputFormat,
    pub user_agent: String,
    pub google_fonts_url: Url,
    pub display: String,
    pub ignore: Vec<String>,
    pub fail_fast: bool,
}

impl Settings {
    /// Merges `args` over `config`. CLI flags win; ignore globs from both apply.
    pub fn resolve(args: &Args, config: Config) -> Result<Self, ConfigError> {
        let google_fonts_url = config
            .google_fonts_url
            .unwrap_or_else(|| DEFAULT_GOOGLE_FONTS_URL.to_string());
        let google_fonts_url =
            Url::parse(&google_fonts_url).map_err(|source| ConfigError::InvalidUrl {
                url: google_fonts_url.clone(),
                source,
            })?;

        let mut ignore = config.ignore;
        ignore.extend(args.ignore.iter().cloned());

        Ok(Self {
            output: args.output.or(config.output).unwrap_or_default(),
            user_agent: args
                .user_agent
                .clone()
                .or(config.user_agent)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            google_fonts_url,
            display: config
                .display
                .unwrap_or_else(|| DEFAULT_DISPLAY.to_string()),
            ignore,
            fail_fast: args.fail_fast,
        })
    }

    /// Builds the CSS2 API request URL for one family.
    pub fn google_font_url(&self, family: &str) -> Url {
        let mut url = self.google_fonts_url.clone();
        url.query_pairs_mut()
            .append_pair("family", family)
            .append_pair("display", &self.display);
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("fontface-stats").chain(argv.iter().copied()))
    }

    #[test]
    fn test_parse_config() {
        let config: Config = serde_json::from_str(
            r#"{
                "output": "machine",
                "user_agent": "test-agent",
                "display": "block",
                "ignore": ["**/legacy/**"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.output, Some(OutputFormat::Machine));
        assert_eq!(config.user_agent.as_deref(), Some("test-agent"));
        assert_eq!(config.google_fonts_url, None);
        assert_eq!(config.ignore, vec!["**/legacy/**"]);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = serde_json::from_str::<Config>(r#"{ "outptu": "json" }"#).unwrap_err();
        assert!(err.to_string().contains("unknown field `outptu`"));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&args(&["a.css"]), Config::default()).unwrap();
        assert_eq!(settings.output, OutputFormat::Human);
        assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(settings.google_fonts_url.as_str(), DEFAULT_GOOGLE_FONTS_URL);
        assert_eq!(settings.display, "swap");
        assert!(settings.ignore.is_empty());
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = Config {
            output: Some(OutputFormat::Machine),
            user_agent: Some("from-config".to_string()),
            ignore: vec!["a/**".to_string()],
            ..Config::default()
        };
        let settings = Settings::resolve(
            &args(&["--output", "json", "--user-agent", "from-cli", "--ignore", "b/**"]),
            config,
        )
        .unwrap();
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.user_agent, "from-cli");
        assert_eq!(settings.ignore, vec!["a/**", "b/**"]);
    }

    #[test]
    fn test_config_used_without_flags() {
        let config = Config {
            output: Some(OutputFormat::Machine),
            ..Config::default()
        };
        let settings = Settings::resolve(&args(&[]), config).unwrap();
        assert_eq!(settings.output, OutputFormat::Machine);
    }

    #[test]
    fn test_google_font_url() {
        let settings = Settings::resolve(&args(&[]), Config::default()).unwrap();
        assert_eq!(
            settings.google_font_url("Noto Sans JP").as_str(),
            "https://fonts.googleapis.com/css2?family=Noto+Sans+JP&display=swap"
        );
    }

    #[test]
    fn test_invalid_google_fonts_url() {
        let config = Config {
            google_fonts_url: Some("not a url".to_string()),
            ..Config::default()
        };
        let err = Settings::resolve(&args(&[]), config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }
}
