//! Decoding of raw data-file bytes into text.

use crate::error::SourceError;
use std::str::FromStr;

/// Text encodings understood by the delimited-text reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    Ascii,
}

impl FromStr for TextEncoding {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "" | "utf-8" | "utf8" | "utf-8-sig" => Ok(TextEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Ok(TextEncoding::Latin1),
            "ascii" | "us-ascii" => Ok(TextEncoding::Ascii),
            _ => Err(SourceError::UnsupportedEncoding(s.to_string())),
        }
    }
}

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Ascii => "ascii",
        }
    }

    /// Decodes `bytes`, dropping a leading UTF-8 byte order mark.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, SourceError> {
        match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                String::from_utf8(bytes.to_vec()).map_err(|e| SourceError::Decode {
                    encoding: self.name().to_string(),
                    message: e.to_string(),
                })
            }
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            TextEncoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(SourceError::Decode {
                    encoding: self.name().to_string(),
                    message: format!("non-ASCII byte 0x{:02X} at offset {}", bytes[offset], offset),
                }),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
        }
    }
}
