//! `data:` URL helpers used to move image bytes to and from the model.

use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// A parsed `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    /// Base64 payload, still encoded
    pub data: String,
}

impl DataUrl {
    /// Build from raw bytes.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: BASE64.encode(bytes),
        }
    }

    /// Wrap an already-encoded payload.
    pub fn from_base64(mime_type: &str, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: data.into(),
        }
    }

    /// Parse a `data:` URL. Only the media type and payload are kept.
    pub fn parse(url: &str) -> Result<Self> {
        let (header, payload) = url
            .split_once(',')
            .ok_or_else(|| Error::DecodeError("invalid data URL: missing payload separator".into()))?;

        let mime_type = header
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| Error::DecodeError("invalid data URL: could not determine MIME type".into()))?;

        if payload.is_empty() {
            return Err(Error::DecodeError("invalid data URL: could not extract base64 data".into()));
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: payload.to_string(),
        })
    }

    /// Decode the payload back into bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| Error::DecodeError(format!("invalid base64 payload: {}", e)))
    }
}

impl std::fmt::Display for DataUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Returned images carry no reliable media type; they are treated as PNG.
pub fn png_data_url(base64_payload: &str) -> String {
    format!("data:image/png;base64,{}", base64_payload)
}
