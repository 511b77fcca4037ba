use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::FanoutError;

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_COUNT: usize = 100;

/// Environment variable holding the bearer credential.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

const CONFIG_FILE: &str = "fanout.toml";

pub const DEFAULT_PROMPT: &str = "### Role\n\
You are an expert customs broker\n\
\n\
### Task\n\
Is the vat notice relevant to the item description?\n\
\n\
### Input\n\
\n\
**Item description:**\n\
Organic Extra Virgin Cypriot Olive Oil – 0.5L\n\
\n\
**vat notice:**\n\
vat-on-education-and-vocational-training-notice-70130\n  \n\
\n\
### Output Format\n\
**return in json format with the following fields: **Return true if the vat notice is relevant to the item description, false otherwise.** , confidence score as a NUMBER between 0 and 100 and reason as a string**";

/// Optional overrides read from `fanout.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub seed: Option<u64>,
    pub count: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub prompt: Option<String>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self, FanoutError> {
        toml::from_str(text).map_err(|e| FanoutError::Config(format!("invalid {CONFIG_FILE}: {e}")))
    }

    /// Read `path` if it exists. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Option<Self>, FanoutError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FanoutError::Config(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }
}

pub struct Config {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub seed: u64,
    pub count: usize,
    pub timeout: Option<Duration>,
    pub prompt: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("seed", &self.seed)
            .field("count", &self.count)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Load defaults, then `fanout.toml` (or `$FANOUT_CONFIG`), then the process environment.
    pub fn load() -> Result<Self, FanoutError> {
        let path = env::var("FANOUT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));
        let file = FileConfig::load(&path)?;
        if file.is_some() {
            tracing::info!(path = %path.display(), "loaded config file");
        }
        Self::from_sources(file, |name| env::var(name).ok())
    }

    /// Layer `file` over the defaults and `lookup` (an env reader) over both.
    pub fn from_sources(
        file: Option<FileConfig>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, FanoutError> {
        let file = file.unwrap_or_default();

        let api_key = lookup(API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                FanoutError::Config(format!(
                    "Missing {API_KEY_VAR} env var. Example: {API_KEY_VAR}=... fanout"
                ))
            })?;

        let endpoint = lookup("FANOUT_ENDPOINT")
            .or(file.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let model = lookup("FANOUT_MODEL")
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let seed = parse_var(&lookup, "FANOUT_SEED")?
            .or(file.seed)
            .unwrap_or(DEFAULT_SEED);
        let count = parse_var(&lookup, "FANOUT_COUNT")?
            .or(file.count)
            .unwrap_or(DEFAULT_COUNT);
        let timeout_secs: Option<u64> = parse_var(&lookup, "FANOUT_TIMEOUT_SECS")?.or(file.timeout_secs);
        let prompt = file.prompt.unwrap_or_else(|| DEFAULT_PROMPT.to_string());

        if count == 0 {
            return Err(FanoutError::Config("count must be greater than 0".to_string()));
        }

        Ok(Config {
            endpoint,
            api_key,
            model,
            seed,
            count,
            timeout: timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
            prompt,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, FanoutError>
where
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| FanoutError::Config(format!("{name}={raw:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_with_only_a_key() {
        let config = Config::from_sources(None, env(&[(API_KEY_VAR, "gsk_test")])).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.seed, 42);
        assert_eq!(config.count, 100);
        assert!(config.timeout.is_none());
        assert_eq!(config.prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn missing_or_blank_key_is_config_error() {
        let err = Config::from_sources(None, env(&[])).unwrap_err();
        assert!(matches!(err, FanoutError::Config(ref m) if m.contains(API_KEY_VAR)));

        let err = Config::from_sources(None, env(&[(API_KEY_VAR, "   ")])).unwrap_err();
        assert!(matches!(err, FanoutError::Config(_)));
    }

    #[test]
    fn env_overrides_file_overrides_defaults() {
        let file = FileConfig::parse(
            r#"
            endpoint = "http://file.local/v1/chat/completions"
            model = "file-model"
            count = 5
            timeout_secs = 30
            "#,
        )
        .unwrap();

        let config = Config::from_sources(
            Some(file),
            env(&[(API_KEY_VAR, "k"), ("FANOUT_COUNT", "7")]),
        )
        .unwrap();

        assert_eq!(config.endpoint, "http://file.local/v1/chat/completions");
        assert_eq!(config.model, "file-model");
        assert_eq!(config.count, 7);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let err = FileConfig::parse("retries = 3").unwrap_err();
        assert!(matches!(err, FanoutError::Config(_)));
    }

    #[test]
    fn bad_numbers_and_zero_count_are_rejected() {
        let err = Config::from_sources(None, env(&[(API_KEY_VAR, "k"), ("FANOUT_COUNT", "lots")]))
            .unwrap_err();
        assert!(matches!(err, FanoutError::Config(ref m) if m.contains("FANOUT_COUNT")));

        let err = Config::from_sources(None, env(&[(API_KEY_VAR, "k"), ("FANOUT_COUNT", "0")]))
            .unwrap_err();
        assert!(matches!(err, FanoutError::Config(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = Config::from_sources(None, env(&[(API_KEY_VAR, "gsk_secret")])).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("gsk_secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
