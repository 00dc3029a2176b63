//! Configuration loading and path resolution
//!
//! Settings priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not fatal: defaults are used and a warning is
//! logged. A config file that exists but cannot be parsed is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const ENV_CONFIG: &str = "WDLABEL_CONFIG";
/// Environment variable overriding `themes_dir`
pub const ENV_THEMES_DIR: &str = "WDLABEL_THEMES_DIR";
/// Environment variable overriding `wikidata_dump`
pub const ENV_DUMP: &str = "WDLABEL_DUMP";

const APP_DIR: &str = "wdlabel";
const CONFIG_FILE: &str = "config.toml";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Directory holding input and output datasets
    #[serde(default)]
    pub themes_dir: Option<PathBuf>,

    /// N-Triples dump scanned by the multilingual pass
    #[serde(default)]
    pub wikidata_dump: Option<PathBuf>,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub provenance: ProvenanceConfig,

    #[serde(default)]
    pub languages: LanguagesConfig,

    #[serde(default)]
    pub themes: ThemeNames,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Drop facts identical to one already written to the same dataset
    #[serde(default = "default_true")]
    pub deduplicate: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { deduplicate: true }
    }
}

/// Provenance stamped on every source fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceConfig {
    #[serde(default = "default_source_url")]
    pub source_url: String,

    #[serde(default = "default_extractor_name")]
    pub extractor_name: String,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            extractor_name: default_extractor_name(),
        }
    }
}

/// Language ranking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguagesConfig {
    /// Codes in decreasing closeness to English
    #[serde(default = "default_language_priority")]
    pub priority: Vec<String>,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            priority: default_language_priority(),
        }
    }
}

/// Dataset names used by the label stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeNames {
    pub transitive_type: String,
    pub language_code_mapping: String,
    pub english_labels: String,
    pub english_label_sources: String,
    pub multilingual_labels: String,
    pub multilingual_label_sources: String,
}

impl Default for ThemeNames {
    fn default() -> Self {
        Self {
            transitive_type: "yagoTransitiveType".to_string(),
            language_code_mapping: "languageCodeMappings".to_string(),
            english_labels: "wikipediaLabels".to_string(),
            english_label_sources: "wikipediaLabelSources".to_string(),
            multilingual_labels: "wikidataMultiLabels".to_string(),
            multilingual_label_sources: "wikidataMultiLabelSources".to_string(),
        }
    }
}

impl ThemeNames {
    fn all(&self) -> [&str; 6] {
        [
            self.transitive_type.as_str(),
            self.language_code_mapping.as_str(),
            self.english_labels.as_str(),
            self.english_label_sources.as_str(),
            self.multilingual_labels.as_str(),
            self.multilingual_label_sources.as_str(),
        ]
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_source_url() -> String {
    "<http://wikidata.org>".to_string()
}

fn default_extractor_name() -> String {
    "WikidataLabelExtractor".to_string()
}

fn default_language_priority() -> Vec<String> {
    ["en", "de", "fr", "nl", "it", "es", "ro", "pl", "ar", "fa"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration
    ///
    /// An explicit path (CLI) must exist. Otherwise `WDLABEL_CONFIG`, then
    /// the platform config locations are tried; if none exists the compiled
    /// defaults are returned.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path = match cli_path {
            Some(path) => Some(path.to_path_buf()),
            None => locate_config_file(),
        };

        let Some(path) = path else {
            warn!("No config file found, using built-in defaults");
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject configurations the label stage cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.provenance.source_url.trim().is_empty() {
            return Err(Error::Config("provenance.source_url must not be empty".to_string()));
        }
        if self.provenance.extractor_name.trim().is_empty() {
            return Err(Error::Config("provenance.extractor_name must not be empty".to_string()));
        }
        if self.languages.priority.is_empty() {
            return Err(Error::Config("languages.priority must list at least one code".to_string()));
        }

        let names = self.themes.all();
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(Error::Config("theme names must not be empty".to_string()));
        }
        for (i, name) in names.iter().enumerate() {
            if names[i + 1..].contains(name) {
                return Err(Error::Config(format!("theme name {} is used twice", name)));
            }
        }
        Ok(())
    }

    /// Datasets directory: CLI > `WDLABEL_THEMES_DIR` > TOML > default
    pub fn resolve_themes_dir(&self, cli_arg: Option<&Path>) -> PathBuf {
        resolve_path(cli_arg, ENV_THEMES_DIR, self.themes_dir.as_deref())
            .unwrap_or_else(default_themes_dir)
    }

    /// Triple dump: CLI > `WDLABEL_DUMP` > TOML > `wikidata.nt` next to the themes directory
    pub fn resolve_dump(&self, cli_arg: Option<&Path>, themes_dir: &Path) -> PathBuf {
        resolve_path(cli_arg, ENV_DUMP, self.wikidata_dump.as_deref()).unwrap_or_else(|| {
            themes_dir
                .parent()
                .unwrap_or(themes_dir)
                .join("wikidata.nt")
        })
    }
}

/// First of CLI argument, environment variable and TOML value that is set
pub fn resolve_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_value: Option<&Path>,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: TOML config file
    toml_value.map(Path::to_path_buf)
}

/// Config file from `WDLABEL_CONFIG` or the platform locations
fn locate_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // ~/.config/wdlabel/config.toml first, then /etc/wdlabel/config.toml
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILE);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default datasets directory
pub fn default_themes_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR).join("themes"))
        .unwrap_or_else(|| PathBuf::from("./wdlabel_data/themes"))
}

/// Write `config` as TOML, via a temporary file renamed into place
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
