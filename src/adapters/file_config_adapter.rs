//! INI file configuration adapter.

use crate::domain::error::CrossoverError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
    source: String,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CrossoverError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| CrossoverError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self {
            config,
            source: path.display().to_string(),
        })
    }

    pub fn from_string(content: &str) -> Result<Self, CrossoverError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| CrossoverError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self {
            config,
            source: "<inline>".to_string(),
        })
    }

    /// An adapter with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self {
            config: Ini::new(),
            source: "<defaults>".to_string(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}
