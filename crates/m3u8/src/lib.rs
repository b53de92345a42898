//! Parser and serializer for HTTP Live Streaming playlists.
//!
//! ```text
//!  playlist text ──► M3u8Parser ──► PlaylistData ──► M3u8 ──► dumps() ──► playlist text
//!                    (tags, attributes,             (keys, segments,
//!                     casts, state)                  media, variants)
//! ```
pub mod error;
pub mod model;
pub mod parser;
pub mod serialize;
pub mod uri;

use std::path::Path;

pub use error::{M3u8Error, M3u8Result};
pub use model::*;
pub use parser::{CustomTagParser, M3u8Parser, PlaylistData};
pub use uri::HasBaseUri;

/// Parses playlist text without a base uri.
pub fn loads(content: &str) -> M3u8Result<M3u8> {
    M3u8Parser::new().parse(content)
}

/// Parses playlist text fetched from `uri`. Relative uris in the playlist are resolved
/// against the directory of `uri`.
pub fn loads_with_uri(content: &str, uri: &str) -> M3u8Result<M3u8> {
    let mut parser = M3u8Parser::new();
    if let Some(base_uri) = base_uri_of(uri)? {
        parser = parser.with_base_uri(base_uri);
    }
    parser.parse(content)
}

/// Reads and parses a playlist file. Relative uris are resolved against its directory.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> M3u8Result<M3u8> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let mut parser = M3u8Parser::new();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        parser = parser.with_base_uri(parent.to_string_lossy());
    }
    parser.parse(content.trim())
}

fn base_uri_of(uri: &str) -> M3u8Result<Option<String>> {
    if uri::is_absolute_url(uri) {
        return uri::parsed_url(uri).map(Some);
    }
    match uri::dirname(uri) {
        "" => Ok(None),
        dirname => Ok(Some(dirname.to_string())),
    }
}
