use serde::Deserialize;
use dirs_next::home_dir;
use log::debug;
use std::collections::HashMap;
use std::{env, fs, path::{Path, PathBuf}};
use thiserror::Error;

/// Error type for board property loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only key -> string lookup describing the running device.
///
/// The module locator only ever reads from this; how the values get there
/// (YAML file, firmware blob, test fixture) is up to the implementor.
pub trait PropertyStore {
    /// Look up a property. `None` means the key is not set. Callers decide
    /// how to treat an empty value; this layer reports it as-is.
    fn get(&self, key: &str) -> Option<String>;
}

/// Board identity properties loaded from a flat YAML map, e.g.:
///
/// ```yaml
/// board: trout
/// arch: armv6
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct BoardProperties {
    values: HashMap<String, String>,
}

impl BoardProperties {
    /// Load properties from the first file found in the search order.
    ///
    /// A device with no board file is fine: the store comes back empty and
    /// only the `default` variant will resolve.
    pub fn load() -> Result<Self, ConfigError> {
        match find_board_file() {
            Some(p) => {
                debug!("board properties from {}", p.display());
                Self::from_path(&p)
            }
            None => {
                debug!("no board properties file found, using empty store");
                Ok(Self::default())
            }
        }
    }

    /// Load properties from an explicit file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path)?;
        let props: BoardProperties = serde_yaml::from_str(&s)?;
        Ok(props)
    }

    /// Build an in-memory store, mainly for tests and embedders.
    pub fn from_iter<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PropertyStore for BoardProperties {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Try common locations in order (first hit wins).
fn find_board_file() -> Option<PathBuf> {
    // explicit override
    if let Ok(p) = env::var("BOARDWALK_BOARD_FILE") {
        let p = PathBuf::from(p);
        if p.exists() { return Some(p) }
    }
    // XDG-style: ~/.config/boardwalk/board.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/boardwalk/board.yaml");
        if p.exists() { return Some(p) }
    }
    // system-wide
    let p = PathBuf::from("/etc/boardwalk/board.yaml");
    if p.exists() { return Some(p) }
    None
}
