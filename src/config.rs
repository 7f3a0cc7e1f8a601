use crate::model::ScaleStrategy;
use crate::Error;
use std::fmt;
use std::path::PathBuf;

/// Environment variable holding the Tibber API token.
pub const API_KEY_VAR: &str = "TIBBER_API_KEY";

/// Settings of one pipeline run.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    /// Directory the chart images are written to
    pub output_dir: PathBuf,
    pub scale: ScaleStrategy,
}

impl Config {
    /// Reads the API token from the process environment. Charts go to the
    /// working directory unless changed.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`], resolving variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty())
            .ok_or(Error::MissingApiKey)?;

        Ok(Self {
            api_key,
            output_dir: PathBuf::from("."),
            scale: ScaleStrategy::default(),
        })
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_scale(mut self, scale: ScaleStrategy) -> Self {
        self.scale = scale;
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("output_dir", &self.output_dir)
            .field("scale", &self.scale)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key() {
        let result = Config::from_lookup(|_| None);

        assert!(matches!(result, Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_blank_api_key() {
        let result = Config::from_lookup(|_| Some("  ".to_owned()));

        assert!(matches!(result, Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|key| {
            assert_eq!(key, API_KEY_VAR);
            Some("5K4MVS-OjfWhK_4yrjOlFe1F6kJXPVf7eQYggo8ebAE".to_owned())
        })
        .unwrap();

        assert_eq!(config.api_key, "5K4MVS-OjfWhK_4yrjOlFe1F6kJXPVf7eQYggo8ebAE");
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.scale, ScaleStrategy::Combined);
    }

    #[test]
    fn test_builder_and_redacted_debug() {
        let config = Config::from_lookup(|_| Some("secret-token".to_owned()))
            .unwrap()
            .with_output_dir("/var/lib/tibber-prices")
            .with_scale(ScaleStrategy::PerDay);

        assert_eq!(config.output_dir, PathBuf::from("/var/lib/tibber-prices"));
        assert_eq!(config.scale, ScaleStrategy::PerDay);
        assert!(!format!("{config:?}").contains("secret-token"));
    }
}
