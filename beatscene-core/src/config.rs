use std::path::{Path, PathBuf};
use std::time::Duration;

use beatscene_types::{EngineConfig, TempoSource};
use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

const MAX_FLASH_MS: u64 = 5_000;

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    defaults: DefaultsConfig,
    #[serde(default)]
    runtime: RuntimeConfig,
}

#[derive(Deserialize, Default)]
struct DefaultsConfig {
    enabled: Option<bool>,
    beat_division: Option<i32>,
    tempo_source: Option<String>,
    manual_bpm: Option<f64>,
    tap_tempo_bpm: Option<f64>,
}

#[derive(Deserialize, Default)]
struct RuntimeConfig {
    flash_duration_ms: Option<u64>,
}

pub struct Config {
    defaults: DefaultsConfig,
    runtime: RuntimeConfig,
}

impl Config {
    /// Embedded defaults overridden by the user's config file, if any.
    pub fn load() -> Self {
        Self::load_from(user_config_path().as_deref())
    }

    /// Embedded defaults overridden by the file at `path`. A missing path,
    /// unreadable file or malformed TOML leaves the defaults untouched.
    pub fn load_from(path: Option<&Path>) -> Self {
        let mut base: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
            log::warn!(target: "config", "embedded config.toml is invalid: {}", e);
            ConfigFile::default()
        });

        if let Some(path) = path.filter(|p| p.exists()) {
            match std::fs::read_to_string(path) {
                Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                    Ok(user) => {
                        merge_defaults(&mut base.defaults, user.defaults);
                        merge_runtime(&mut base.runtime, user.runtime);
                        log::info!(target: "config", "loaded {}", path.display());
                    }
                    Err(e) => {
                        log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                    }
                },
                Err(e) => {
                    log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                }
            }
        }

        Config {
            defaults: base.defaults,
            runtime: base.runtime,
        }
    }

    /// Initial engine settings.
    pub fn engine_config(&self) -> EngineConfig {
        let fallback = EngineConfig::default();
        EngineConfig {
            enabled: self.defaults.enabled.unwrap_or(fallback.enabled),
            beat_division: self.defaults.beat_division.unwrap_or(fallback.beat_division),
            tempo_source: self
                .defaults
                .tempo_source
                .as_deref()
                .and_then(parse_tempo_source)
                .unwrap_or(fallback.tempo_source),
            manual_bpm: self.defaults.manual_bpm.unwrap_or(fallback.manual_bpm),
            tap_tempo_bpm: self.defaults.tap_tempo_bpm.unwrap_or(fallback.tap_tempo_bpm),
        }
    }

    /// Firing indicator duration (clamped to 0..=5000 ms).
    pub fn flash_duration(&self) -> Duration {
        let ms = self
            .runtime
            .flash_duration_ms
            .unwrap_or(200)
            .min(MAX_FLASH_MS);
        Duration::from_millis(ms)
    }
}

/// `<config_dir>/beatscene/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("beatscene").join("config.toml"))
}

fn merge_defaults(base: &mut DefaultsConfig, user: DefaultsConfig) {
    if user.enabled.is_some() {
        base.enabled = user.enabled;
    }
    if user.beat_division.is_some() {
        base.beat_division = user.beat_division;
    }
    if user.tempo_source.is_some() {
        base.tempo_source = user.tempo_source;
    }
    if user.manual_bpm.is_some() {
        base.manual_bpm = user.manual_bpm;
    }
    if user.tap_tempo_bpm.is_some() {
        base.tap_tempo_bpm = user.tap_tempo_bpm;
    }
}

fn merge_runtime(base: &mut RuntimeConfig, user: RuntimeConfig) {
    if user.flash_duration_ms.is_some() {
        base.flash_duration_ms = user.flash_duration_ms;
    }
}

fn parse_tempo_source(s: &str) -> Option<TempoSource> {
    match s.parse() {
        Ok(source) => Some(source),
        Err(e) => {
            log::warn!(target: "config", "{}; using default tempo source", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    impl Config {
        fn from_toml_str(contents: &str) -> Result<Self, String> {
            let user: ConfigFile = toml::from_str(contents).map_err(|e| e.to_string())?;
            let mut config = Self::load_from(None);
            merge_defaults(&mut config.defaults, user.defaults);
            merge_runtime(&mut config.runtime, user.runtime);
            Ok(config)
        }
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_embedded_config() {
        let config = Config::load_from(None);
        assert_eq!(config.engine_config(), EngineConfig::default());
        assert_eq!(config.flash_duration(), Duration::from_millis(200));
    }

    #[test]
    fn test_user_file_overrides_fields() {
        let file = write_config(
            "[defaults]\nenabled = true\ntempo_source = \"manual\"\nmanual_bpm = 96.0\n",
        );
        let config = Config::load_from(Some(file.path()));
        let engine = config.engine_config();
        assert!(engine.enabled);
        assert_eq!(engine.tempo_source, TempoSource::ManualBpm);
        assert_eq!(engine.manual_bpm, 96.0);
        // Untouched fields keep the embedded values.
        assert_eq!(engine.beat_division, 4);
        assert_eq!(engine.tap_tempo_bpm, 120.0);
    }

    #[test]
    fn test_malformed_file_is_ignored() {
        let file = write_config("[defaults\nenabled = yes");
        let config = Config::load_from(Some(file.path()));
        assert_eq!(config.engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(Some(&dir.path().join("nope.toml")));
        assert_eq!(config.engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_unknown_tempo_source_falls_back() {
        let config = Config::from_toml_str("[defaults]\ntempo_source = \"midi\"").unwrap();
        assert_eq!(config.engine_config().tempo_source, TempoSource::TapTempo);
    }

    #[test]
    fn test_flash_duration_is_clamped() {
        let config = Config::from_toml_str("[runtime]\nflash_duration_ms = 60000").unwrap();
        assert_eq!(config.flash_duration(), Duration::from_millis(5_000));
        let config = Config::from_toml_str("[runtime]\nflash_duration_ms = 0").unwrap();
        assert_eq!(config.flash_duration(), Duration::ZERO);
    }

    #[test]
    fn test_from_toml_str_rejects_bad_types() {
        assert!(Config::from_toml_str("[defaults]\nbeat_division = \"four\"").is_err());
    }
}
