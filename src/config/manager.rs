use super::{
    evolution::EvolutionConfig,
    expression::ExpressionConfig,
    run::RunConfig,
    traits::{ConfigManifest, ConfigSection},
};
use crate::error::MnemonicError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix for environment overrides, e.g. `ACROSTIC_EXPRESSION__API_KEY`.
pub const ENV_PREFIX: &str = "ACROSTIC";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub expression: ExpressionConfig,
    pub run: RunConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), MnemonicError> {
        self.evolution.validate()?;
        self.expression.validate()?;
        self.run.validate()?;
        Ok(())
    }

    pub fn manifests(&self) -> Vec<ConfigManifest> {
        vec![
            self.evolution.to_manifest(),
            self.expression.to_manifest(),
            self.run.to_manifest(),
        ]
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Layer defaults, an optional TOML file and `ACROSTIC_*` environment variables.
    pub fn load(&self, path: Option<&Path>) -> Result<(), MnemonicError> {
        let defaults = config::Config::try_from(&AppConfig::default())
            .map_err(|e| MnemonicError::Configuration(format!("Failed to seed defaults: {}", e)))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            if !path.exists() {
                return Err(MnemonicError::Configuration(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| MnemonicError::Configuration(format!("Failed to load config: {}", e)))?;

        config.validate()?;
        log::debug!("Loaded configuration: {:?}", config);

        *self.write()? = config;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MnemonicError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MnemonicError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| MnemonicError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        *self.write()? = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MnemonicError> {
        let config = self.get()?;
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| MnemonicError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| MnemonicError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> Result<AppConfig, MnemonicError> {
        self.config
            .read()
            .map(|c| c.clone())
            .map_err(|_| MnemonicError::Configuration("Config lock poisoned".to_string()))
    }

    /// Apply `f` and keep the result only if it validates.
    pub fn update<F>(&self, f: F) -> Result<(), MnemonicError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.get()?;
        f(&mut candidate);
        candidate.validate()?;
        *self.write()? = candidate;
        Ok(())
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, AppConfig>, MnemonicError> {
        self.config
            .write()
            .map_err(|_| MnemonicError::Configuration("Config lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("acrostic-ga-{}-{}.toml", name, std::process::id()))
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let manager = ConfigManager::new();
        manager
            .update(|c| {
                c.evolution.population_size = 8;
                c.run.topic = "noble gases".to_string();
            })
            .unwrap();

        let path = temp_path("roundtrip");
        manager.save_to_file(&path).unwrap();

        let reloaded = ConfigManager::new();
        reloaded.load_from_file(&path).unwrap();
        let config = reloaded.get().unwrap();
        assert_eq!(config.evolution.population_size, 8);
        assert_eq!(config.run.topic, "noble gases");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_update_rejects_invalid_change() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.evolution.elite_size = 99);
        assert!(result.is_err());
        assert_eq!(manager.get().unwrap().evolution.elite_size, 1);
    }

    #[test]
    fn test_layered_load_reads_partial_file() {
        let path = temp_path("partial");
        std::fs::write(&path, "[evolution]\nmutation_rate = 0.5\n").unwrap();

        let manager = ConfigManager::new();
        manager.load(Some(&path)).unwrap();
        let config = manager.get().unwrap();
        assert_eq!(config.evolution.mutation_rate, 0.5);
        assert_eq!(config.evolution.population_size, 5);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let manager = ConfigManager::new();
        let missing = temp_path("does-not-exist");
        assert!(matches!(
            manager.load(Some(&missing)),
            Err(MnemonicError::Configuration(_))
        ));
    }
}
