//! Merged configuration view over the repository's local config file.
//!
//! The engine reads only `<git_dir>/config` plus `-c key=value` overrides
//! supplied by the caller; it never consults system or global config, and
//! never expands `include`/`includeIf` directives. That layering belongs to
//! the command-line front-end, which is outside the engine's scope.

use std::path::{Path, PathBuf};

use bstr::{BStr, BString, ByteSlice};

use crate::error::ConfigError;
use crate::file::ConfigFile;
use crate::types::{self, PushConfig, PushDefault};
use crate::{ConfigEntry, ConfigKey, ConfigScope};

/// Configuration merged from the repository's local config file plus
/// command-line overrides.
pub struct ConfigSet {
    files: Vec<ConfigFile>,
    command_overrides: Vec<ConfigEntry>,
}

impl ConfigSet {
    /// Create an empty config set.
    pub fn new() -> Self {
        ConfigSet {
            files: Vec::new(),
            command_overrides: Vec::new(),
        }
    }

    /// Load `<git_dir>/config` if present. A missing file yields an empty set.
    pub fn load(git_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let mut set = ConfigSet::new();

        if let Some(git_dir) = git_dir {
            let local_path = git_dir.join("config");
            if local_path.exists() {
                match ConfigFile::load(&local_path, ConfigScope::Local) {
                    Ok(file) => set.add_file(file),
                    Err(ConfigError::FileNotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(set)
    }

    /// Add a config file (used for the local scope, and by tests).
    pub fn add_file(&mut self, file: ConfigFile) {
        self.files.push(file);
    }

    /// Add a `-c key=value` override; these win over the local file.
    pub fn add_command_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let config_key = ConfigKey::parse(key)?;
        self.command_overrides.push(ConfigEntry {
            key: config_key,
            value: Some(BString::from(value.as_bytes())),
            scope: ConfigScope::Command,
            source_file: None,
            line_number: None,
        });
        Ok(())
    }

    /// Get the highest-priority value as a string.
    pub fn get_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let config_key = ConfigKey::parse(key)?;

        for entry in self.command_overrides.iter().rev() {
            if entry.key.matches(&config_key) {
                return Ok(entry.value.as_ref().map(|v| v.to_str_lossy().to_string()));
            }
        }

        for file in self.files.iter().rev() {
            if let Some(value) = file.get(&config_key) {
                return Ok(value.map(|v| v.to_str_lossy().to_string()));
            }
        }

        Ok(None)
    }

    /// Get all values for a multi-valued key, across all scopes (low to high).
    pub fn get_all_strings(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        let config_key = ConfigKey::parse(key)?;
        let mut results = Vec::new();

        for file in &self.files {
            for value in file.get_all(&config_key) {
                results.push(
                    value
                        .map(|v| v.to_str_lossy().to_string())
                        .unwrap_or_default(),
                );
            }
        }

        for entry in &self.command_overrides {
            if entry.key.matches(&config_key) {
                results.push(
                    entry
                        .value
                        .as_ref()
                        .map(|v| v.to_str_lossy().to_string())
                        .unwrap_or_default(),
                );
            }
        }

        Ok(results)
    }

    fn get_raw(&self, key: &ConfigKey) -> Option<Option<BString>> {
        for entry in self.command_overrides.iter().rev() {
            if entry.key.matches(key) {
                return Some(entry.value.clone());
            }
        }

        for file in self.files.iter().rev() {
            if let Some(value) = file.get(key) {
                return Some(value.map(|v| BString::from(v.as_bytes())));
            }
        }

        None
    }

    /// Get as boolean.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let config_key = ConfigKey::parse(key)?;
        match self.get_raw(&config_key) {
            Some(value) => {
                let result = types::parse_bool(value.as_deref().map(|v| v.as_bstr()))?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    /// Get as boolean with default.
    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        Ok(self.get_bool(key)?.unwrap_or(default))
    }

    /// Get as integer (with k/m/g suffix support).
    pub fn get_int(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        let config_key = ConfigKey::parse(key)?;
        match self.get_raw(&config_key) {
            Some(Some(value)) => {
                let result = types::parse_int(value.as_bstr())?;
                Ok(Some(result))
            }
            Some(None) => Err(ConfigError::InvalidInt("missing value".into())),
            None => Ok(None),
        }
    }

    /// Get as unsigned integer.
    pub fn get_usize(&self, key: &str) -> Result<Option<usize>, ConfigError> {
        match self.get_int(key)? {
            Some(v) if v >= 0 => Ok(Some(v as usize)),
            Some(v) => Err(ConfigError::InvalidInt(format!(
                "negative value {} for unsigned config",
                v
            ))),
            None => Ok(None),
        }
    }

    /// Get as path (with `~/` expansion).
    pub fn get_path(&self, key: &str) -> Result<Option<PathBuf>, ConfigError> {
        let config_key = ConfigKey::parse(key)?;
        match self.get_raw(&config_key) {
            Some(Some(value)) => {
                let result = types::parse_path(value.as_bstr())?;
                Ok(Some(result))
            }
            Some(None) | None => Ok(None),
        }
    }

    /// Get the scope of the highest-priority value.
    pub fn get_scope(&self, key: &str) -> Option<ConfigScope> {
        let config_key = ConfigKey::parse(key).ok()?;

        for entry in self.command_overrides.iter().rev() {
            if entry.key.matches(&config_key) {
                return Some(ConfigScope::Command);
            }
        }

        for file in self.files.iter().rev() {
            if file.get(&config_key).is_some() {
                return Some(file.scope());
            }
        }

        None
    }

    /// Get all entries matching a section (e.g. all keys in `remote.origin.*`).
    pub fn get_section_entries(
        &self,
        section: &str,
        subsection: Option<&str>,
    ) -> Vec<ConfigEntry> {
        let section_lower = section.to_ascii_lowercase();
        let subsection_owned = subsection.map(|s| BString::from(s.as_bytes()));

        let mut results = Vec::new();
        for file in &self.files {
            for entry in file.entries() {
                if entry.key.section.to_str_lossy() == section_lower
                    && entry.key.subsection == subsection_owned
                {
                    results.push(entry);
                }
            }
        }
        results
    }

    /// Set a value in the config file for the given scope, writing it back
    /// to disk if the file has a path.
    pub fn set(&mut self, key: &str, value: &str, scope: ConfigScope) -> Result<(), ConfigError> {
        let config_key = ConfigKey::parse(key)?;
        let value_bstr = BStr::new(value.as_bytes());

        for file in &mut self.files {
            if file.scope() == scope {
                file.set(&config_key, value_bstr);
                if let Some(path) = file.path() {
                    let path = path.to_path_buf();
                    file.write_to(&path)?;
                }
                return Ok(());
            }
        }

        Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no config file loaded for scope {:?}", scope),
        )))
    }

    /// Load `push.*` configuration from the config set.
    pub fn get_push_config(&self) -> Result<PushConfig, ConfigError> {
        let default = match self.get_string("push.default")? {
            Some(val) => PushDefault::from_config(&val)?,
            None => PushDefault::default(),
        };

        let follow_tags = self.get_bool_or("push.followtags", false)?;
        let auto_setup_remote = self.get_bool_or("push.autosetupremote", false)?;

        Ok(PushConfig {
            default,
            follow_tags,
            auto_setup_remote,
        })
    }

    /// Return all entries across all scopes in precedence order (low to high).
    pub fn all_entries(&self) -> Vec<ConfigEntry> {
        let mut entries = Vec::new();
        for file in &self.files {
            entries.extend(file.entries());
        }
        entries.extend(self.command_overrides.clone());
        entries
    }

    /// Get all loaded files.
    pub fn files(&self) -> &[ConfigFile] {
        &self.files
    }
}

impl Default for ConfigSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSet")
            .field("files_count", &self.files.len())
            .field("command_overrides", &self.command_overrides.len())
            .finish()
    }
}
