//! Configuration file loading and parsing.
//!
//! Settings live in a `.lokeyrc.json` discovered by walking up from the
//! working directory (stopping at a `.git` boundary). Everything has a
//! default, so running without a config file is fully supported.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::core::framework::Framework;
use crate::core::namespace::DEFAULT_FUNCTIONS;

pub const CONFIG_FILE_NAME: &str = ".lokeyrc.json";

/// How a rendering layer presents a resolved translation next to a key:
/// appended after it, or replacing it entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayMode {
    #[default]
    Inline,
    TranslationOnly,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Preferred locale for displayed values; empty means unset, letting
    /// the fallback chain decide.
    #[serde(default)]
    pub display_locale: String,
    #[serde(default)]
    pub display_mode: DisplayMode,
    /// Locale coverage is measured against.
    #[serde(default = "default_reference_locale")]
    pub reference_locale: String,
    /// Overrides framework detection when set.
    #[serde(default)]
    pub framework: Option<Framework>,
    /// Translation function names, separated by commas or CJK
    /// punctuation (`，`, `、`, `；`).
    #[serde(default = "default_functions")]
    pub functions: String,
    /// Extra directory names excluded from scans.
    #[serde(default)]
    pub excludes: Vec<String>,
}

fn default_reference_locale() -> String {
    "en".to_string()
}

fn default_functions() -> String {
    DEFAULT_FUNCTIONS.join(", ")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_locale: String::new(),
            display_mode: DisplayMode::default(),
            reference_locale: default_reference_locale(),
            framework: None,
            functions: default_functions(),
            excludes: Vec::new(),
        }
    }
}

impl Config {
    /// The configured display locale, if any.
    pub fn display_locale(&self) -> Option<&str> {
        let trimmed = self.display_locale.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Split the function list on ASCII and CJK separators.
    pub fn function_names(&self) -> Vec<String> {
        let names: Vec<String> = self
            .functions
            .split([',', '，', '、', ';', '；'])
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(|name| name.to_string())
            .collect();
        if names.is_empty() {
            DEFAULT_FUNCTIONS.iter().map(|s| s.to_string()).collect()
        } else {
            names
        }
    }

    /// Excludes must be plain directory names; path separators or glob
    /// wildcards indicate a misunderstanding of the setting.
    pub fn validate(&self) -> Result<()> {
        for exclude in &self.excludes {
            if exclude.contains(['/', '\\', '*', '?']) || exclude.is_empty() {
                bail!(
                    "Invalid entry in 'excludes': \"{}\" (expected a plain directory name)",
                    exclude
                );
            }
        }
        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
