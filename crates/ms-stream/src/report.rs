//! Turning the engine's raw report into what the caller asked for.
//!
//! [`format_report`] is the whole contract: parse for `object`, pass the
//! string through untouched for every text format. [`MediaReport`] is an
//! optional typed view over the JSON report for callers that want tracks
//! rather than a `serde_json::Value`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ms_core::{OutputFormat, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The value delivered at the end of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutput {
    /// Parsed report (`object` format).
    Object(Value),
    /// Raw report (`JSON`, `XML`, `HTML`, `text` formats).
    Text(String),
}

impl AnalysisOutput {
    /// Placeholder handed to a completion callback alongside an error.
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Object(v) => v.is_null(),
            Self::Text(s) => s.is_empty(),
        }
    }

    pub fn as_object(&self) -> Option<&Value> {
        match self {
            Self::Object(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Object(_) => None,
            Self::Text(s) => Some(s),
        }
    }

    /// Typed view over an `object` result.
    pub fn to_media_report(&self) -> Option<Result<MediaReport>> {
        self.as_object().map(|v| MediaReport::from_value(v.clone()))
    }
}

impl fmt::Display for AnalysisOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(v) => match serde_json::to_string_pretty(v) {
                Ok(s) => f.write_str(&s),
                Err(_) => write!(f, "{v}"),
            },
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Convert a raw report into the requested shape.
pub fn format_report(raw: String, format: OutputFormat) -> Result<AnalysisOutput> {
    if format.is_structured() {
        let value: Value = serde_json::from_str(&raw)?;
        Ok(AnalysisOutput::Object(value))
    } else {
        Ok(AnalysisOutput::Text(raw))
    }
}

// ---------------------------------------------------------------------------
// Typed view
// ---------------------------------------------------------------------------

/// The engine's JSON report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaReport {
    #[serde(rename = "creatingLibrary", default, skip_serializing_if = "Option::is_none")]
    pub creating_library: Option<CreatingLibrary>,
    #[serde(default)]
    pub media: Option<Media>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatingLibrary {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "@ref", default)]
    pub reference: String,
    #[serde(default)]
    pub track: Vec<Track>,
}

/// One track of the report. Field names are the engine's (`Format`,
/// `Duration`, `Width`, ...); values are kept as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "@type")]
    pub kind: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Track {
    /// A field as a string, if it is one.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// A numeric field. Values like `"1920 pixels"` parse as `1920`.
    pub fn numeric<T: FromStr>(&self, name: &str) -> Option<T> {
        match self.fields.get(name)? {
            Value::String(s) => parse_numeric(s),
            Value::Number(n) => n.to_string().parse().ok(),
            _ => None,
        }
    }
}

impl MediaReport {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn tracks(&self) -> &[Track] {
        self.media.as_ref().map(|m| m.track.as_slice()).unwrap_or(&[])
    }

    /// Tracks whose `@type` matches `kind` (`General`, `Video`, `Audio`,
    /// `Text`, `Image`, `Menu`, ...).
    pub fn tracks_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Track> + 'a {
        self.tracks().iter().filter(move |t| t.kind == kind)
    }

    /// The `General` track, describing the container as a whole.
    pub fn general(&self) -> Option<&Track> {
        self.tracks_of("General").next()
    }
}

fn parse_numeric<T: FromStr>(s: &str) -> Option<T> {
    s.split_whitespace().next().and_then(|n| n.parse().ok())
}
