use serde::Serialize;

use crate::{parser::attributes::AttributeList, uri::HasBaseUri};

/// An alternative rendition from `#EXT-X-MEDIA`.
///
/// `DEFAULT`, `AUTOSELECT` and `FORCED` are kept as written (`YES`/`NO`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Media {
    pub uri: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub group_id: Option<String>,
    pub language: Option<String>,
    pub assoc_language: Option<String>,
    pub name: Option<String>,
    pub default: Option<String>,
    pub autoselect: Option<String>,
    pub forced: Option<String>,
    pub instream_id: Option<String>,
    pub characteristics: Option<String>,
    /// Attributes not listed above, such as `CHANNELS`.
    pub extras: AttributeList,
    pub base_uri: Option<String>,
}

impl Media {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_attributes(mut attributes: AttributeList, base_uri: Option<String>) -> Self {
        Self {
            uri: attributes.remove_str("uri"),
            media_type: attributes.remove_str("type"),
            group_id: attributes.remove_str("group_id"),
            language: attributes.remove_str("language"),
            assoc_language: attributes.remove_str("assoc_language"),
            name: attributes.remove_str("name"),
            default: attributes.remove_str("default"),
            autoselect: attributes.remove_str("autoselect"),
            forced: attributes.remove_str("forced"),
            instream_id: attributes.remove_str("instream_id"),
            characteristics: attributes.remove_str("characteristics"),
            extras: attributes,
            base_uri,
        }
    }
}

impl HasBaseUri for Media {
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
