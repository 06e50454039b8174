//! The persisted subset of a [`Job`], stored as JSON inside a template.
//!
//! The stored object keeps the historical key names so templates saved by
//! older generators still load. A missing key or a JSON `null` falls back to
//! the default value.

use crate::options::{Job, OutputFormat};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Version written into the `_format` key.
pub const SETTINGS_FORMAT_VERSION: u64 = 1;

const COMMENT: &str = "automated placeholder for the default generation settings of this template. modify at your own risk.";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings are not valid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings must be a JSON object")]
    NotAnObject,

    #[error("Settings format version {0} is newer than this generator supports")]
    UnsupportedFormat(u64),
}

/// Everything a [`Job`] carries except the template path and the save flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "csvfile", deserialize_with = "text")]
    pub data_file: String,
    #[serde(rename = "outdir", deserialize_with = "text")]
    pub output_dir: String,
    #[serde(rename = "outname", deserialize_with = "text")]
    pub output_name: String,
    #[serde(rename = "outformat")]
    pub format: OutputFormat,
    #[serde(rename = "keepsla", deserialize_with = "flag")]
    pub keep_intermediate: bool,
    #[serde(rename = "separator", deserialize_with = "text")]
    pub delimiter: String,
    #[serde(rename = "csvencoding", deserialize_with = "text")]
    pub encoding: String,
    #[serde(rename = "single", deserialize_with = "flag")]
    pub single_output: bool,
    #[serde(rename = "from", deserialize_with = "text")]
    pub first_row: String,
    #[serde(rename = "to", deserialize_with = "text")]
    pub last_row: String,
    #[serde(rename = "close", deserialize_with = "flag")]
    pub close_dialog: bool,
}

/// The stored object: bookkeeping keys first, then the settings.
#[derive(Serialize)]
struct Stored<'a> {
    #[serde(rename = "_comment")]
    comment: &'static str,
    #[serde(rename = "_format")]
    format: u64,
    #[serde(flatten)]
    settings: &'a Settings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from_job(&Job::default())
    }
}

impl Settings {
    pub fn from_job(job: &Job) -> Self {
        Self {
            data_file: job.data_file.to_string_lossy().into_owned(),
            output_dir: job.output_dir.to_string_lossy().into_owned(),
            output_name: job.output_name.clone(),
            format: job.format,
            keep_intermediate: job.keep_intermediate,
            delimiter: job.delimiter.to_string(),
            encoding: job.encoding.clone(),
            single_output: job.single_output,
            first_row: job.first_row.clone().unwrap_or_default(),
            last_row: job.last_row.clone().unwrap_or_default(),
            close_dialog: job.close_dialog,
        }
    }

    /// Copies the stored values onto `job`, leaving its template path and save flag alone.
    pub fn apply_to(&self, job: &mut Job) {
        job.data_file = PathBuf::from(&self.data_file);
        job.output_dir = PathBuf::from(&self.output_dir);
        job.output_name = self.output_name.clone();
        job.format = self.format;
        job.keep_intermediate = self.keep_intermediate;
        if let Some(delimiter) = parse_delimiter(&self.delimiter) {
            job.delimiter = delimiter;
        }
        if !self.encoding.is_empty() {
            job.encoding = self.encoding.clone();
        }
        job.single_output = self.single_output;
        job.first_row = non_empty(&self.first_row);
        job.last_row = non_empty(&self.last_row);
        job.close_dialog = self.close_dialog;
    }

    /// Serializes to the stored JSON form.
    pub fn to_json(&self) -> Result<String, SettingsError> {
        let stored = Stored {
            comment: COMMENT,
            format: SETTINGS_FORMAT_VERSION,
            settings: self,
        };
        Ok(serde_json::to_string(&stored)?)
    }

    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let mut value: Value = serde_json::from_str(text)?;
        let map = value.as_object_mut().ok_or(SettingsError::NotAnObject)?;

        if let Some(version) = map.get("_format").and_then(Value::as_u64)
            && version > SETTINGS_FORMAT_VERSION
        {
            return Err(SettingsError::UnsupportedFormat(version));
        }

        map.retain(|_, v| !v.is_null());
        Ok(Settings::deserialize(value)?)
    }
}

impl Serialize for OutputFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OutputFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?.parse().map_err(de::Error::custom)
    }
}

/// Strings are read as-is and numbers are stringified.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextDef {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match TextDef::deserialize(deserializer)? {
        TextDef::Str(s) => s,
        TextDef::Int(n) => n.to_string(),
        TextDef::Float(n) => n.to_string(),
    })
}

/// Flags were historically stored as `0`/`1` as well as booleans.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagDef {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    match FlagDef::deserialize(deserializer)? {
        FlagDef::Bool(b) => Ok(b),
        FlagDef::Int(n) => Ok(n != 0),
        FlagDef::Str(s) => match s.trim() {
            "" | "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            other => Err(de::Error::custom(format!("expected a flag, found '{}'", other))),
        },
    }
}

/// Accepts a single character, or the escaped tab `\t`.
pub fn parse_delimiter(text: &str) -> Option<char> {
    if text == "\\t" {
        return Some('\t');
    }
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
