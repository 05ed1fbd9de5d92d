//! Inputs accepted by disk operations: payloads, put options and text encodings.

use crate::error::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::TryStreamExt;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Lazily consumed stream of file bytes.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Payload for `put`: in-memory bytes or a byte stream.
pub enum PutContent {
    Bytes(Bytes),
    Stream(ByteStream),
}

impl PutContent {
    /// Drain the payload into a single buffer.
    pub async fn into_bytes(self) -> Result<Bytes> {
        match self {
            PutContent::Bytes(bytes) => Ok(bytes),
            PutContent::Stream(stream) => {
                let chunks: Vec<Bytes> = stream.try_collect().await?;
                if chunks.len() == 1 {
                    return Ok(chunks.into_iter().next().unwrap_or_default());
                }
                Ok(Bytes::from(chunks.concat()))
            }
        }
    }
}

impl fmt::Debug for PutContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PutContent::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            PutContent::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Bytes> for PutContent {
    fn from(value: Bytes) -> Self {
        PutContent::Bytes(value)
    }
}

impl From<Vec<u8>> for PutContent {
    fn from(value: Vec<u8>) -> Self {
        PutContent::Bytes(Bytes::from(value))
    }
}

impl From<&'static [u8]> for PutContent {
    fn from(value: &'static [u8]) -> Self {
        PutContent::Bytes(Bytes::from_static(value))
    }
}

impl From<String> for PutContent {
    fn from(value: String) -> Self {
        PutContent::Bytes(Bytes::from(value))
    }
}

impl From<&str> for PutContent {
    fn from(value: &str) -> Self {
        PutContent::Bytes(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<ByteStream> for PutContent {
    fn from(value: ByteStream) -> Self {
        PutContent::Stream(value)
    }
}

/// Backend-specific options for `put`. Backends ignore what they cannot store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub content_disposition: Option<String>,
    pub content_encoding: Option<String>,
}

impl PutOptions {
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &PutOptions::default()
    }
}

/// Options for signed URL generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedUrlOptions {
    /// Seconds from now until the URL stops working
    pub expiry: u64,
}

impl SignedUrlOptions {
    pub const DEFAULT_EXPIRY_SECS: u64 = 900;

    pub fn with_expiry(expiry: u64) -> Self {
        Self { expiry }
    }

    pub fn expires_in(&self) -> Duration {
        Duration::from_secs(self.expiry)
    }
}

impl Default for SignedUrlOptions {
    fn default() -> Self {
        Self {
            expiry: Self::DEFAULT_EXPIRY_SECS,
        }
    }
}

/// Text encodings understood by `get_with_encoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Invalid sequences are replaced with U+FFFD
    #[default]
    Utf8,
    /// High bit of every byte is dropped
    Ascii,
    Latin1,
    Base64,
    Hex,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported encoding: {0}")]
pub struct UnsupportedEncoding(pub String);

impl Encoding {
    pub fn decode(&self, data: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(data).into_owned(),
            Encoding::Ascii => data.iter().map(|b| (b & 0x7f) as char).collect(),
            Encoding::Latin1 => data.iter().map(|&b| b as char).collect(),
            Encoding::Base64 => STANDARD.encode(data),
            Encoding::Hex => {
                let mut out = String::with_capacity(data.len() * 2);
                for b in data {
                    out.push_str(&format!("{:02x}", b));
                }
                out
            }
        }
    }
}

impl FromStr for Encoding {
    type Err = UnsupportedEncoding;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "ascii" => Ok(Encoding::Ascii),
            "latin1" | "binary" => Ok(Encoding::Latin1),
            "base64" => Ok(Encoding::Base64),
            "hex" => Ok(Encoding::Hex),
            other => Err(UnsupportedEncoding(other.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Utf8 => write!(f, "utf8"),
            Encoding::Ascii => write!(f, "ascii"),
            Encoding::Latin1 => write!(f, "latin1"),
            Encoding::Base64 => write!(f, "base64"),
            Encoding::Hex => write!(f, "hex"),
        }
    }
}
