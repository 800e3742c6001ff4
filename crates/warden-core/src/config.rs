use crate::error::ConfigError;
use crate::templates::Templates;
use crate::window::{WindowConfig, DEFAULT_THRESHOLD, DEFAULT_WINDOW_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "./warden.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Guild the slash commands are registered in.
    pub guild_id: Option<u64>,
    pub auto_role: String,
    pub presence: String,
    pub danger_keywords: Vec<String>,
    pub anti_spam: AntiSpamConfig,
    pub messages: Templates,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            guild_id: None,
            auto_role: "Member".into(),
            presence: "4CZ Secure 24/7 🔥".into(),
            danger_keywords: vec!["delete".into()],
            anti_spam: AntiSpamConfig::default(),
            messages: Templates::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiSpamConfig {
    pub window_ms: i64,
    pub threshold: i64,
    pub reset_after_action: bool,
    /// Seconds between idle-subject sweeps; 0 turns sweeping off.
    pub sweep_interval_secs: u64,
}

impl Default for AntiSpamConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            threshold: DEFAULT_THRESHOLD,
            reset_after_action: false,
            sweep_interval_secs: 60,
        }
    }
}

impl AntiSpamConfig {
    pub fn window(&self) -> Result<WindowConfig, ConfigError> {
        WindowConfig::from_raw(self.window_ms, self.threshold)
    }
}

impl BotConfig {
    /// Loads and validates the file at `path`. A missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn validate(&self) -> Result<WindowConfig, ConfigError> {
        self.anti_spam.window()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let cfg = BotConfig::load(&dir.path().join("warden.toml")).unwrap();
        assert_eq!(cfg, BotConfig::default());
        assert_eq!(cfg.anti_spam.window_ms, 5000);
        assert_eq!(cfg.anti_spam.threshold, 5);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(
            &path,
            "guild_id = 42\n\n[anti_spam]\nthreshold = 3\n\n[messages]\nwelcome = \"hey {member}\"\n",
        )
        .unwrap();
        let cfg = BotConfig::load(&path).unwrap();
        assert_eq!(cfg.guild_id, Some(42));
        assert_eq!(cfg.anti_spam.threshold, 3);
        assert_eq!(cfg.anti_spam.window_ms, 5000);
        assert_eq!(cfg.messages.welcome("bob"), "hey bob");
        assert_eq!(cfg.auto_role, "Member");
    }

    #[test]
    fn invalid_window_fails_fast() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(&path, "[anti_spam]\nwindow_ms = -5\n").unwrap();
        let err = BotConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWindow(-5)));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(&path, "guild_id = \"not a number\"\n").unwrap();
        assert!(matches!(
            BotConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
