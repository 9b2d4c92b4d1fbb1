use std::path::PathBuf;

use crate::error::ConfigError;
use crate::plagiarism::DEFAULT_MIN_SIMILARITY;

#[derive(Debug, Clone)]
pub struct Config {
    pub omegaup_url: String,
    pub moss_host: String,
    pub moss_port: u16,
    pub generated_folder: PathBuf,
    pub submission_folder: PathBuf,
    pub results_folder: PathBuf,
    pub credentials_file: PathBuf,
    pub host: String,
    pub port: u16,
    pub min_similarity: u8,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let folder = |key: &str, default: &str| base_dir.join(var(key, default));

        let min_similarity: u8 = parse(
            "MIN_SIMILARITY",
            var("MIN_SIMILARITY", &DEFAULT_MIN_SIMILARITY.to_string()),
        )?;
        if min_similarity > 100 {
            return Err(ConfigError::Invalid {
                key: "MIN_SIMILARITY".to_string(),
                value: min_similarity.to_string(),
            });
        }

        Ok(Self {
            omegaup_url: var("OMEGAUP_URL", "https://omegaup.com"),
            moss_host: var("MOSS_HOST", "moss.stanford.edu"),
            moss_port: parse("MOSS_PORT", var("MOSS_PORT", "7690"))?,
            generated_folder: folder("GENERATED_FOLDER", "generated"),
            submission_folder: folder("SUBMISSION_FOLDER", "submission"),
            results_folder: folder("RESULTS_FOLDER", "results"),
            credentials_file: folder("CREDENTIALS_FILE", "login.txt"),
            host: var("HOST", "127.0.0.1"),
            port: parse("PORT", var("PORT", "8080"))?,
            min_similarity,
        })
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.omegaup_url, "https://omegaup.com");
        assert_eq!(config.moss_port, 7690);
        assert_eq!(config.port, 8080);
        assert_eq!(config.min_similarity, 30);
        assert!(config.generated_folder.ends_with("generated"));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[("MIN_SIMILARITY", "55"), ("RESULTS_FOLDER", "out")]).unwrap();
        assert_eq!(config.min_similarity, 55);
        assert!(config.results_folder.ends_with("out"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { key, .. }) if key == "PORT"
        ));
        assert!(matches!(
            config(&[("MIN_SIMILARITY", "120")]),
            Err(ConfigError::Invalid { key, .. }) if key == "MIN_SIMILARITY"
        ));
    }
}
