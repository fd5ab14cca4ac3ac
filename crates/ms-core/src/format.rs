//! Output formats a session can be asked for, and the native report kinds the
//! engine understands.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

// ---------------------------------------------------------------------------
// OutputFormat
// ---------------------------------------------------------------------------

/// Shape of the value delivered to the caller.
///
/// `Object` asks the engine for JSON and parses it; every other variant is
/// passed through as the engine's raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "JSON")]
    Json,
    #[serde(rename = "XML")]
    Xml,
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "text")]
    Text,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Object,
        OutputFormat::Json,
        OutputFormat::Xml,
        OutputFormat::Html,
        OutputFormat::Text,
    ];

    /// The report kind the engine must be constructed with.
    pub fn engine_kind(self) -> EngineOutputKind {
        match self {
            Self::Object | Self::Json => EngineOutputKind::Json,
            Self::Xml => EngineOutputKind::Xml,
            Self::Html => EngineOutputKind::Html,
            Self::Text => EngineOutputKind::Text,
        }
    }

    /// Whether the raw report is parsed before delivery.
    pub fn is_structured(self) -> bool {
        matches!(self, Self::Object)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => write!(f, "object"),
            Self::Json => write!(f, "JSON"),
            Self::Xml => write!(f, "XML"),
            Self::Html => write!(f, "HTML"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "object" => Ok(Self::Object),
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "html" => Ok(Self::Html),
            "text" => Ok(Self::Text),
            other => Err(Error::Config(format!(
                "unknown output format '{other}' (valid: object, JSON, XML, HTML, text)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// EngineOutputKind
// ---------------------------------------------------------------------------

/// Report kinds the engine can natively produce. Fixed for an engine
/// instance's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineOutputKind {
    Json,
    Xml,
    Html,
    Text,
}

impl EngineOutputKind {
    /// Value of the engine's `Inform` option for this kind.
    pub fn as_engine_str(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Xml => "XML",
            Self::Html => "HTML",
            Self::Text => "Text",
        }
    }
}

impl fmt::Display for EngineOutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_engine_str())
    }
}
