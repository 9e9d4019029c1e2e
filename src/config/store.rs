use crate::error::{GrepxError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Key/value persistence for settings
///
/// The host owns the real store; this crate only needs load/save by key.
pub trait SettingsStore {
    /// Stored value for `key`, if any
    fn load(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`
    fn save(&mut self, key: &str, value: &str) -> Result<()>;

    /// Make previous saves durable
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// In-memory store, used by embedders and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }
}

/// Flat TOML table on disk, e.g. `~/.config/grepx/settings.toml`
#[derive(Debug, Clone)]
pub struct TomlFileStore {
    path: PathBuf,
    table: toml::Table,
    dirty: bool,
}

impl TomlFileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: &Path) -> Result<Self> {
        let table = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| GrepxError::Io {
                source: e,
                context: format!("Failed to read settings file: {:?}", path),
            })?;
            content.parse::<toml::Table>()?
        } else {
            toml::Table::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            table,
            dirty: false,
        })
    }

    /// Open the store at `path`, failing when the file does not exist
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GrepxError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlFileStore {
    fn load(&self, key: &str) -> Option<String> {
        // hand-edited files may hold bare booleans or integers
        match self.table.get(key)? {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Boolean(b) => Some(if *b { "1" } else { "0" }.to_string()),
            toml::Value::Integer(n) => Some(n.to_string()),
            other => {
                tracing::warn!("Ignoring non-scalar setting {} = {}", key, other);
                None
            }
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.table
            .insert(key.to_string(), toml::Value::String(value.to_string()));
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GrepxError::Io {
                source: e,
                context: format!("Failed to create settings directory: {:?}", parent),
            })?;
        }

        let content = toml::to_string_pretty(&self.table)?;
        std::fs::write(&self.path, content).map_err(|e| GrepxError::Io {
            source: e,
            context: format!("Failed to write settings file: {:?}", self.path),
        })?;
        self.dirty = false;
        tracing::info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
