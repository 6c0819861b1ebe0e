//! Application configuration for uscdefs.
//!
//! User config lives at `~/.uscdefs/uscdefs.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, UscDefsError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "uscdefs.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".uscdefs";

/// Placeholder substituted with the title number in `identifier_prefix`.
const TITLE_PLACEHOLDER: &str = "{title}";

// ---------------------------------------------------------------------------
// Config structs (matching uscdefs.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Bounds on duplicate-key disambiguation.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// User-facing title code (`usc26`) to document title number (`26`).
    #[serde(default = "default_titles")]
    pub titles: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            limits: LimitsConfig::default(),
            titles: default_titles(),
        }
    }
}

impl AppConfig {
    /// Look up the title number for a user-facing title code.
    pub fn title_number(&self, code: &str) -> Result<&str> {
        self.titles
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| UscDefsError::UnknownTitle {
                code: code.to_string(),
            })
    }

    /// Path of the XML source for a title code (`<xml_dir>/<code>.xml`).
    pub fn title_path(&self, code: &str) -> PathBuf {
        Path::new(&self.defaults.xml_dir).join(format!("{code}.xml"))
    }
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory holding one `<code>.xml` file per title.
    #[serde(default = "default_xml_dir")]
    pub xml_dir: String,

    /// Identifier prefix of every level in a title; `{title}` is replaced
    /// by the title number.
    #[serde(default = "default_identifier_prefix")]
    pub identifier_prefix: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            xml_dir: default_xml_dir(),
            identifier_prefix: default_identifier_prefix(),
        }
    }
}

fn default_xml_dir() -> String {
    "xml_files".into()
}
fn default_identifier_prefix() -> String {
    "/us/usc/t{title}".into()
}

/// `[limits]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum marker characters appended to make a child key (`?`) or a
    /// term key (`#`) unique before giving up.
    #[serde(default = "default_max_key_suffixes")]
    pub max_key_suffixes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_key_suffixes: default_max_key_suffixes(),
        }
    }
}

fn default_max_key_suffixes() -> usize {
    16
}

/// US Code titles published as USLM, including the appendix titles.
fn default_titles() -> BTreeMap<String, String> {
    let mut titles = BTreeMap::new();
    let numbered = (1..=54).filter(|n| *n != 34 && *n != 53);
    for n in numbered {
        titles.insert(format!("usc{n:02}"), n.to_string());
    }
    for n in [5, 11, 18, 28, 50] {
        titles.insert(format!("usc{n:02}A"), format!("{n}a"));
    }
    titles
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime tree-building configuration.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Identifier prefix template (see [`DefaultsConfig::identifier_prefix`]).
    pub identifier_prefix: String,
    /// Bound on `?` suffixes for duplicate child keys.
    pub max_key_suffixes: usize,
}

impl BuildConfig {
    /// Identifier prefix for a concrete title, e.g. `/us/usc/t26`.
    pub fn prefix_for(&self, title_number: &str) -> String {
        self.identifier_prefix
            .replace(TITLE_PLACEHOLDER, title_number)
            .trim_end_matches('/')
            .to_string()
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for BuildConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            identifier_prefix: config.defaults.identifier_prefix.clone(),
            max_key_suffixes: config.limits.max_key_suffixes,
        }
    }
}

/// Runtime definition-extraction configuration.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Bound on `#` suffixes for terms defined more than once.
    pub max_key_suffixes: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ExtractConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_key_suffixes: config.limits.max_key_suffixes,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.uscdefs/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| UscDefsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.uscdefs/uscdefs.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| UscDefsError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| UscDefsError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| UscDefsError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| UscDefsError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| UscDefsError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
