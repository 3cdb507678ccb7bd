use {
    std::{
        env,
        io,
    },
    tokio::fs,
    crate::{
        pairing::Strategy,
        prelude::*,
        quotes,
    },
};
#[cfg(unix)] use xdg::BaseDirectories;
#[cfg(windows)] use directories::ProjectDirs;

const CONFIG_FILE: &str = "cube-society.json";

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)] Io(#[from] io::Error),
    #[error(transparent)] Json(#[from] serde_json::Error),
    #[error("no Discord bot token configured (set discord.botToken in the config file or the DISCORD_TOKEN environment variable)")]
    MissingToken,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct Config {
    pub(crate) discord: ConfigDiscord,
    pub(crate) data_dir: PathBuf,
    pub(crate) command_prefix: String,
    pub(crate) pairing_strategy: Strategy,
    pub(crate) quotes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord: ConfigDiscord::default(),
            data_dir: PathBuf::from("."),
            command_prefix: format!("!"),
            pairing_strategy: Strategy::default(),
            quotes: quotes::default_quotes(),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ConfigDiscord {
    pub(crate) bot_token: Option<String>,
}

impl Config {
    /// Reads the config from `path` if given, otherwise from the platform config directory.
    /// A missing default config file is not an error.
    pub(crate) async fn load(path: Option<&Path>) -> Result<Self, Error> {
        let path = match path {
            Some(path) => path.to_owned(),
            None => match default_path() {
                Some(path) => path,
                None => {
                    log::info!("no config file found, using defaults");
                    return Ok(Self::default())
                }
            },
        };
        log::debug!("loading config from {}", path.display());
        Ok(serde_json::from_str(&fs::read_to_string(path).await?)?)
    }

    pub(crate) fn bot_token(&self) -> Result<String, Error> {
        self.discord.bot_token.clone()
            .or_else(|| env::var("DISCORD_TOKEN").ok())
            .filter(|token| !token.is_empty())
            .ok_or(Error::MissingToken)
    }
}

#[cfg(unix)]
fn default_path() -> Option<PathBuf> {
    BaseDirectories::new().find_config_file(CONFIG_FILE)
}

#[cfg(windows)]
fn default_path() -> Option<PathBuf> {
    let path = ProjectDirs::from("", "", "cube-society")?.config_dir().join(CONFIG_FILE);
    path.exists().then_some(path)
}

#[cfg(not(any(unix, windows)))]
fn default_path() -> Option<PathBuf> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = serde_json::from_str::<Config>("{}").unwrap();
        assert_eq!(config.data_dir, Path::new("."));
        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.pairing_strategy, Strategy::Greedy);
        assert_eq!(config.quotes.len(), quotes::DEFAULT_QUOTES.len());
        assert!(config.discord.bot_token.is_none());
    }

    #[test]
    fn camel_case_fields() {
        let config = serde_json::from_str::<Config>(r#"{
            "discord": {"botToken": "abc"},
            "dataDir": "/var/lib/cube-society",
            "commandPrefix": "?",
            "pairingStrategy": "backtracking",
            "quotes": ["hi"]
        }"#).unwrap();
        assert_eq!(config.bot_token().unwrap(), "abc");
        assert_eq!(config.data_dir, Path::new("/var/lib/cube-society"));
        assert_eq!(config.command_prefix, "?");
        assert_eq!(config.pairing_strategy, Strategy::Backtracking);
        assert_eq!(config.quotes, ["hi"]);
    }

    #[tokio::test]
    async fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"commandPrefix": "$"}"#).unwrap();
        let config = Config::load(Some(&path)).await.unwrap();
        assert_eq!(config.command_prefix, "$");
    }

    #[tokio::test]
    async fn load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("missing.json"))).await.is_err());
    }
}
