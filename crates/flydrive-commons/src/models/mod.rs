//! Shared models for disk operations.

mod content;
mod responses;

pub use content::{
    ByteStream, Encoding, PutContent, PutOptions, SignedUrlOptions, UnsupportedEncoding,
};
pub use responses::{
    ContentResponse, DeleteResponse, ExistsResponse, FileListResponse, RawResponse, Response,
    SignedUrlResponse, StatResponse,
};
