use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::{parser::SegmentData, uri::HasBaseUri};

/// A media segment, described by `#EXTINF` and the tags preceding its uri line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Segment {
    pub uri: String,
    /// Seconds
    pub duration: f64,
    pub title: String,
    /// Raw `#EXT-X-BYTERANGE` value, `<length>[@<offset>]`
    pub byterange: Option<String>,

    /// Only set when an `#EXT-X-PROGRAM-DATE-TIME` tag directly precedes this segment.
    pub program_date_time: Option<DateTime<FixedOffset>>,
    /// The last program date time seen, advanced by the durations of the segments since.
    pub current_program_date_time: Option<DateTime<FixedOffset>>,

    pub discontinuity: bool,
    pub cue_out: bool,
    /// Base64 encoded SCTE-35 splice info
    pub scte35: Option<String>,
    pub scte35_duration: Option<String>,

    /// Index into [`M3u8::keys`](crate::M3u8::keys), `None` for unencrypted segments.
    pub key: Option<usize>,
    pub base_uri: Option<String>,
}

impl Segment {
    pub fn new<S: Into<String>>(uri: S, duration: f64) -> Self {
        Self {
            uri: uri.into(),
            duration,
            ..Default::default()
        }
    }

    pub(crate) fn from_data(data: SegmentData, key: Option<usize>, base_uri: Option<String>) -> Self {
        Self {
            uri: data.uri,
            duration: data.duration,
            title: data.title,
            byterange: data.byterange,
            program_date_time: data.program_date_time,
            current_program_date_time: data.current_program_date_time,
            discontinuity: data.discontinuity,
            cue_out: data.cue_out,
            scte35: data.scte35,
            scte35_duration: data.scte35_duration,
            key,
            base_uri,
        }
    }
}

impl HasBaseUri for Segment {
    fn uri(&self) -> Option<&str> {
        Some(&self.uri)
    }

    fn set_uri(&mut self, uri: String) {
        self.uri = uri;
    }

    fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    fn set_base_uri(&mut self, base_uri: Option<String>) {
        self.base_uri = base_uri;
    }
}
