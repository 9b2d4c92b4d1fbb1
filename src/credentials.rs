use dialoguer::{Input, Password};
use std::path::Path;
use tracing::info;

use crate::error::ConfigError;

/// omegaUp login and Moss user id.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub moss_user_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("moss_user_id", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Environment first, then the credentials file, then the terminal.
    ///
    /// Credentials typed in are saved to `path` for the next run.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if let Some(credentials) = Self::from_env() {
            return Ok(credentials);
        }
        if let Some(credentials) = Self::read_file(path)? {
            return Ok(credentials);
        }

        let credentials = Self::prompt()?;
        credentials.write_file(path)?;
        info!("Credentials saved to {}", path.display());
        Ok(credentials)
    }

    fn from_env() -> Option<Self> {
        Some(Self {
            username: std::env::var("OMEGAUP_USERNAME").ok()?,
            password: std::env::var("OMEGAUP_PASSWORD").ok()?,
            moss_user_id: std::env::var("MOSS_USER_ID").ok()?,
        })
    }

    /// Three lines: username, password, Moss user id.
    fn read_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Credentials {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut lines = contents.lines().map(str::trim);
        let mut next = |key: &str| {
            lines
                .next()
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ConfigError::Missing {
                    key: format!("{} in {}", key, path.display()),
                })
        };
        Ok(Some(Self {
            username: next("username")?,
            password: next("password")?,
            moss_user_id: next("Moss user id")?,
        }))
    }

    fn write_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = format!(
            "{}\n{}\n{}\n",
            self.username, self.password, self.moss_user_id
        );
        std::fs::write(path, contents).map_err(|source| ConfigError::Credentials {
            path: path.to_path_buf(),
            source,
        })
    }

    fn prompt() -> Result<Self, ConfigError> {
        let username: String = Input::new().with_prompt("omegaUp username").interact_text()?;
        let password = Password::new().with_prompt("omegaUp password").interact()?;
        let moss_user_id: String = Input::new()
            .with_prompt("Moss user id (request one at https://theory.stanford.edu/~aiken/moss/)")
            .interact_text()?;
        Ok(Self {
            username,
            password,
            moss_user_id,
        })
    }
}
