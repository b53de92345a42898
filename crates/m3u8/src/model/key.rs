use serde::Serialize;

use crate::{parser::KeyAttributes, uri::HasBaseUri};

/// Encryption descriptor of an `#EXT-X-KEY` tag.
///
/// Equality is structural and includes the base uri.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Key {
    /// `AES-128`, `SAMPLE-AES` or `NONE`
    pub method: String,
    pub uri: Option<String>,
    /// Hexadecimal initialization vector, e.g. `0X12A`
    pub iv: Option<String>,
    pub keyformat: Option<String>,
    pub keyformatversions: Option<String>,
    pub base_uri: Option<String>,
}

impl Key {
    pub fn new<S: Into<String>>(method: S) -> Self {
        Self {
            method: method.into(),
            uri: None,
            iv: None,
            keyformat: None,
            keyformatversions: None,
            base_uri: None,
        }
    }

    pub fn with_uri<S: Into<String>>(mut self, uri: S) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_iv<S: Into<String>>(mut self, iv: S) -> Self {
        self.iv = Some(iv.into());
        self
    }

    pub(crate) fn from_attributes(attributes: KeyAttributes, base_uri: Option<String>) -> Self {
        Self {
            method: attributes.method.unwrap_or_else(|| "NONE".to_string()),
            uri: attributes.uri,
            iv: attributes.iv,
            keyformat: attributes.keyformat,
            keyformatversions: attributes.keyformatversions,
            base_uri,
        }
    }
}

impl HasBaseUri for Key {
    fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    fn set_uri(&mut self, uri: String) {
        self.uri = Some(uri);
    }

    fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    fn set_base_uri(&mut self, base_uri: Option<String>) {
        self.base_uri = base_uri;
    }
}
