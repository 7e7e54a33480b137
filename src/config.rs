use crate::memory::MemoryStreamFactory;
use crate::scratch::{ScratchRegistry, ScratchStreamFactory};
use crate::DynStreamFactory;
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
    TomlFormatError(toml::de::Error),
    ConfigFormatError(String),
    IOError(std::io::Error),
}

/// Stream backend named in a [`StreamConfig`](struct.StreamConfig.html).
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Streams backed by a live in-memory buffer.
    Memory,
    /// Streams backed by per-process scratch files.
    Scratch,
}

/// Configuration of a stream backend.
///
/// The backend is selected by configuration rather than at compile time,
/// so one build carries both and call sites pick per deployment. Format:
///
/// ```toml
/// backend = "scratch"
/// # Root of the per-process scratch directory, scratch backend only.
/// # Defaults to the system temporary directory.
/// scratch_root = "/var/tmp"
/// ```
#[derive(Deserialize, Clone)]
pub struct StreamConfig {
    backend: BackendKind,
    scratch_root: Option<PathBuf>,
}

impl StreamConfig {
    /// Build a stream configuration from a string.
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let config: StreamConfig =
            toml::from_str(s).map_err(ConfigError::TomlFormatError)?;
        if config.backend == BackendKind::Memory
            && config.scratch_root.is_some()
        {
            return Err(ConfigError::ConfigFormatError(String::from(
                "scratch_root is only valid with backend = \"scratch\".",
            )));
        }
        Ok(config)
    }

    /// Build a stream configuration from a file.
    pub fn from_file<P: AsRef<std::path::Path> + std::fmt::Debug>(
        path: P,
    ) -> Result<Self, ConfigError> {
        let mut file = match std::fs::File::open(&path) {
            Ok(f) => f,
            Err(e) => return Err(ConfigError::IOError(e)),
        };
        let mut s = String::from("");

        if let Err(e) = file.read_to_string(&mut s) {
            return Err(ConfigError::IOError(e));
        }
        Self::from_str(s.as_str())
    }

    /// Build the configured stream factory.
    pub fn build(self) -> Box<dyn DynStreamFactory> {
        match self.backend {
            BackendKind::Memory => Box::new(MemoryStreamFactory {}),
            BackendKind::Scratch => {
                let registry = match self.scratch_root {
                    Some(root) => ScratchRegistry::new(root),
                    None => ScratchRegistry::default(),
                };
                Box::new(ScratchStreamFactory::new(registry))
            }
        }
    }
}
