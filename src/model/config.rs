use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::kss::DEFAULT_MASK;

const DEFAULTS: &str = include_str!("../../config/default.toml");

/// Settings for one style guide run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerationConfig {
    /// Directories (or single files) holding KSS-documented stylesheets.
    pub source: Vec<PathBuf>,
    /// Where the generated style guide is written.
    pub destination: PathBuf,
    #[serde(default)]
    pub template: Option<PathBuf>,
    pub mask: String,
    #[serde(default)]
    pub custom: Vec<String>,
    #[serde(default)]
    pub verbose: bool,
    /// Values for options declared by the generator, keyed by option name.
    #[serde(default)]
    pub generator: BTreeMap<String, toml::Value>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            source: Vec::new(),
            destination: PathBuf::from("styleguide"),
            template: None,
            mask: DEFAULT_MASK.to_string(),
            custom: Vec::new(),
            verbose: false,
            generator: BTreeMap::new(),
        }
    }
}

impl GenerationConfig {
    pub fn new(source: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            source: source.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Load configuration with layering: defaults → user config.
    ///
    /// The user file is `path` when given, otherwise `config.toml` in the
    /// platform config directory if it exists. Tables are merged key by key.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut merged: toml::Table = toml::from_str(DEFAULTS)?;

        let user_path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => directories::ProjectDirs::from("", "", "kssgen")
                .map(|dirs| dirs.config_dir().join("config.toml"))
                .filter(|path| path.exists()),
        };

        if let Some(user_path) = user_path {
            let user_str = fs::read_to_string(&user_path)
                .with_context(|| format!("reading config {}", user_path.display()))?;
            let user: toml::Table = toml::from_str(&user_str)
                .with_context(|| format!("parsing config {}", user_path.display()))?;
            tracing::info!("loaded config from {}", user_path.display());
            merge_tables(&mut merged, user);
        }

        let mut config: GenerationConfig = toml::Value::Table(merged).try_into()?;
        config.expand_home()?;
        Ok(config)
    }

    /// Parse a complete configuration layered over the defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut merged: toml::Table = toml::from_str(DEFAULTS)?;
        merge_tables(&mut merged, toml::from_str(text)?);
        let mut config: GenerationConfig = toml::Value::Table(merged).try_into()?;
        config.expand_home()?;
        Ok(config)
    }

    /// String value of a generator option.
    pub fn generator_str(&self, key: &str) -> Option<&str> {
        self.generator.get(key).and_then(toml::Value::as_str)
    }

    /// Values of a repeatable generator option; a lone string counts as one.
    pub fn generator_list(&self, key: &str) -> Vec<String> {
        match self.generator.get(key) {
            Some(toml::Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(toml::Value::String(item)) => vec![item.clone()],
            _ => Vec::new(),
        }
    }

    pub fn generator_flag(&self, key: &str) -> bool {
        self.generator
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(false)
    }

    fn expand_home(&mut self) -> Result<()> {
        for source in &mut self.source {
            *source = expand_tilde(source)?;
        }
        self.destination = expand_tilde(&self.destination)?;
        if let Some(template) = self.template.as_mut() {
            *template = expand_tilde(template)?;
        }
        Ok(())
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let text = path.to_string_lossy();
    if !text.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(PathBuf::from(text.replacen('~', &home.to_string_lossy(), 1)))
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
