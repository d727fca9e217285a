use std::{
    collections::HashMap,
    fs::{self, File},
    io::prelude::*,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::logging::MinervaLogger;

/// Server settings, loaded from `settings.toml` and refined by the environment.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Socket address to bind to, e.g. "0.0.0.0:25565".
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Version name advertised in the status response.
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_max_players")]
    pub max_players: u32,

    /// Plain text description shown in the server list.
    #[serde(default = "default_motd")]
    pub motd: String,

    /// PNG served as the server list icon. Missing or unreadable means no icon.
    #[serde(default)]
    pub favicon_path: Option<PathBuf>,

    #[serde(default)]
    pub enforces_secure_chat: bool,

    /// Seconds a connection may stay silent. Zero disables the limit.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,

    #[serde(flatten)]
    pub other_fields: HashMap<String, toml::Value>,
}

fn default_bind() -> String {
    "0.0.0.0:25565".to_string()
}

fn default_version() -> String {
    "1.25.1".to_string()
}

fn default_max_players() -> u32 {
    50
}

fn default_motd() -> String {
    "Hello, world!".to_string()
}

fn default_idle_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            version: default_version(),
            max_players: default_max_players(),
            motd: default_motd(),
            favicon_path: None,
            enforces_secure_chat: false,
            idle_timeout: default_idle_timeout(),
            other_fields: HashMap::new(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let raw = fs::read_to_string(path).map_err(ConfigLoadError::Io)?;
        let config: Self = toml::from_str(&raw).map_err(ConfigLoadError::Parse)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let config_str = toml::to_string(&self)?;
        let mut file = File::create(path)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }

    /// Loads `path`, writing a default file first when it cannot be read.
    pub fn load_or_default(path: &Path) -> Result<Self, toml::de::Error> {
        match Self::load(path) {
            Ok(config) => {
                // Fill in missing fields on disk
                let _ = config.save(path);
                Ok(config)
            }
            Err(ConfigLoadError::Io(_)) => {
                let default_config = Self::default();
                let _ = default_config.save(path);
                Ok(default_config)
            }
            Err(ConfigLoadError::Parse(err)) => Err(err),
        }
    }

    /// Applies `MINERVA_*` and `FAVICON_PATH` overrides. Unparseable values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("MINERVA_BIND") {
            self.bind = bind;
        }
        if let Some(version) = lookup("MINERVA_VERSION") {
            self.version = version;
        }
        if let Some(max) = lookup("MINERVA_MAX_PLAYERS").and_then(|v| v.trim().parse().ok()) {
            self.max_players = max;
        }
        if let Some(motd) = lookup("MINERVA_MOTD") {
            self.motd = motd;
        }
        if let Some(path) = lookup("FAVICON_PATH") {
            self.favicon_path = (!path.is_empty()).then(|| PathBuf::from(path));
        }
        if let Some(secs) = lookup("MINERVA_IDLE_TIMEOUT").and_then(|v| v.trim().parse().ok()) {
            self.idle_timeout = secs;
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| dotenvy::var(key).ok());
    }

    pub fn report_unknown_fields(&self) {
        for (key, value) in &self.other_fields {
            MinervaLogger::unknown_config(key, value);
        }
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.bind.parse()?)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout > 0).then(|| Duration::from_secs(self.idle_timeout))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Could not open config")]
    Io(#[from] std::io::Error),
    #[error("Could not parse")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.max_players, 50);
        assert_eq!(config.version, "1.25.1");
        assert_eq!(config.motd, "Hello, world!");
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn unknown_keys_are_kept_aside() {
        let config: ServerConfig = toml::from_str("max_players = 10\nproxy_procol = true\n").unwrap();
        assert_eq!(config.max_players, 10);
        assert!(config.other_fields.contains_key("proxy_procol"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = ServerConfig::default();
        let env: HashMap<&str, &str> = HashMap::from([
            ("MINERVA_BIND", "127.0.0.1:25570"),
            ("MINERVA_MAX_PLAYERS", "100"),
            ("MINERVA_MOTD", "maintenance"),
            ("FAVICON_PATH", "/srv/icon.png"),
            ("MINERVA_IDLE_TIMEOUT", "0"),
        ]);
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.bind_addr().unwrap().port(), 25570);
        assert_eq!(config.max_players, 100);
        assert_eq!(config.motd, "maintenance");
        assert_eq!(config.favicon_path, Some(PathBuf::from("/srv/icon.png")));
        assert_eq!(config.idle_timeout(), None);
        assert_eq!(config.version, "1.25.1");
    }

    #[test]
    fn malformed_numbers_are_ignored() {
        let mut config = ServerConfig::default();
        config.apply_overrides(|key| (key == "MINERVA_MAX_PLAYERS").then(|| "lots".to_string()));
        assert_eq!(config.max_players, 50);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ServerConfig::load(Path::new("/nonexistent/minerva/settings.toml")).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Io(_)));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let path = std::env::temp_dir().join(format!("minerva-config-{}.toml", std::process::id()));
        let mut config = ServerConfig::default();
        config.motd = "round trip".into();
        config.favicon_path = Some(PathBuf::from("icon.png"));
        config.save(&path).unwrap();

        let loaded = ServerConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
