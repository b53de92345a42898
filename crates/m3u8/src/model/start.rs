use serde::Serialize;

use crate::{
    error::{M3u8Error, M3u8Result},
    parser::{attributes::AttributeList, EXT_X_START},
};

/// Preferred point to start playing, from `#EXT-X-START`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Start {
    /// Seconds from the beginning of the playlist, or from its end when negative.
    pub time_offset: f64,
    pub precise: Option<bool>,
}

impl Start {
    pub fn new(time_offset: f64) -> Self {
        Self {
            time_offset,
            precise: None,
        }
    }

    pub(crate) fn from_attributes(attributes: &AttributeList) -> M3u8Result<Self> {
        let time_offset =
            attributes
                .get_float("time_offset")
                .ok_or(M3u8Error::MissingAttribute {
                    tag: EXT_X_START,
                    attribute: "TIME-OFFSET",
                })?;

        let precise = match attributes.get_str("precise") {
            Some("YES") => Some(true),
            Some("NO") => Some(false),
            Some(precise) => {
                log::warn!("Ignored invalid PRECISE value in {EXT_X_START}: {precise}");
                None
            }
            None => None,
        };

        Ok(Self {
            time_offset,
            precise,
        })
    }
}

/// Media initialization section from `#EXT-X-MAP`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentMap {
    pub uri: Option<String>,
    pub byterange: Option<String>,
}

impl From<AttributeList> for SegmentMap {
    fn from(mut attributes: AttributeList) -> Self {
        Self {
            uri: attributes.remove_str("uri"),
            byterange: attributes.remove_str("byterange"),
        }
    }
}
