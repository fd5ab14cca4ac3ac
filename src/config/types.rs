use ms_core::AnalyzeOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Contents of `mediascope.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    /// Defaults for every analysis; command-line flags override them.
    pub analyze: AnalyzeOptions,
}

/// Where the analysis engine comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the MediaInfoLib shared library. Searched for when unset.
    pub library: Option<PathBuf>,
}
