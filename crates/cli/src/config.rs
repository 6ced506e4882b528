// Runtime configuration for the tokensync CLI.
// Loaded from tokensync.toml or populated with defaults.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tokensync_engine::PlatformConfig;
use tokensync_interchange::chunk::DEFAULT_CHUNK_SIZE;
use tokensync_interchange::ChunkConfig;

/// File picked up from the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "tokensync.toml";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("error reading config '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error parsing config '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub chunking: ChunkingConfig,
    pub migration: MigrationConfig,
}

/// Storage chunking for transported snapshots.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct ChunkingConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Prefix for `<prefix>_chunk_<i>` and `<prefix>_chunk_count` keys.
    pub key_prefix: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        ChunkingConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            key_prefix: "tokensync_baseline".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MigrationConfig {
    /// Platforms by name. Fields left out inherit the built-in platform of
    /// the same name, or the CSS defaults for a new one.
    pub platforms: BTreeMap<String, PlatformOverride>,
}

/// The fields a `[migration.platforms.<name>]` table may set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlatformOverride {
    pub prefix: Option<String>,
    pub separator: Option<String>,
    pub strip_segments: Option<Vec<String>>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

impl PlatformOverride {
    fn apply(&self, name: &str) -> PlatformConfig {
        let base = PlatformConfig::builtin(name).unwrap_or_else(PlatformConfig::css);
        PlatformConfig {
            name: name.to_string(),
            prefix: self.prefix.clone().unwrap_or(base.prefix),
            separator: self.separator.clone().unwrap_or(base.separator),
            strip_segments: self.strip_segments.clone().unwrap_or(base.strip_segments),
            include: self.include.clone().unwrap_or(base.include),
            exclude: self.exclude.clone().unwrap_or(base.exclude),
        }
    }
}

impl Config {
    /// Load from an explicit path, or from `./tokensync.toml` when present.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file is not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            "Loaded config from {} ({} platform(s))",
            path.display(),
            config.migration.platforms.len()
        );
        Ok(config)
    }

    /// A configured platform layered over its built-in namesake, else the
    /// built-in one alone.
    pub fn platform(&self, name: &str) -> Option<PlatformConfig> {
        match self.migration.platforms.get(name) {
            Some(overrides) => Some(overrides.apply(name)),
            None => PlatformConfig::builtin(name),
        }
    }

    pub fn chunk_config(&self, prefix_override: Option<&str>) -> ChunkConfig {
        ChunkConfig {
            chunk_size: self.chunking.chunk_size,
            key_prefix: prefix_override
                .unwrap_or(&self.chunking.key_prefix)
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokensync.toml");
        fs::write(&path, text).unwrap();
        Config::from_file(&path).unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse("");
        assert_eq!(config.chunking.chunk_size, 90_000);
        assert_eq!(config.chunking.key_prefix, "tokensync_baseline");
        assert_eq!(config.platform("css"), Some(PlatformConfig::css()));
        assert!(config.platform("swift").is_none());
    }

    #[test]
    fn configured_platform_inherits_and_overrides() {
        let config = parse(
            r#"
[chunking]
chunk_size = 1000
key_prefix = "figma_tokens"

[migration.platforms.tailwind]
prefix = "--tw-"
include = ["**/*.html"]
"#,
        );
        assert_eq!(config.chunking.chunk_size, 1000);
        let tw = config.platform("tailwind").unwrap();
        assert_eq!(tw.name, "tailwind");
        assert_eq!(tw.prefix, "--tw-");
        assert_eq!(tw.separator, "-");
        assert_eq!(tw.include, vec!["**/*.html".to_string()]);
        assert_eq!(tw.exclude, PlatformConfig::css().exclude);
    }

    #[test]
    fn configured_platform_shadows_builtin() {
        let config = parse("[migration.platforms.css]\nprefix = \"--ds-\"\n");
        assert_eq!(config.platform("css").unwrap().prefix, "--ds-");
    }

    #[test]
    fn partial_override_keeps_builtin_fields() {
        let config = parse("[migration.platforms.scss]\ninclude = [\"**/*.sass\"]\n");
        let scss = config.platform("scss").unwrap();
        assert_eq!(scss.name, "scss");
        assert_eq!(scss.prefix, "$");
        assert_eq!(scss.include, vec!["**/*.sass".to_string()]);
        assert_eq!(scss.exclude, PlatformConfig::scss().exclude);
    }

    #[test]
    fn unknown_platform_field_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokensync.toml");
        fs::write(&path, "[migration.platforms.css]\nprefx = \"--\"\n").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn prefix_override_wins() {
        let config = Config::default();
        assert_eq!(config.chunk_config(None).key_prefix, "tokensync_baseline");
        assert_eq!(config.chunk_config(Some("x")).key_prefix, "x");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/no/such/tokensync.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[chunking\n").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
