use std::{fmt, str::FromStr};

use serde::Serialize;

use super::media::Media;
use crate::{
    error::{M3u8Error, M3u8Result},
    parser::{attributes::AttributeList, IFrameData, VariantData, EXT_X_STREAM_INF},
    uri::HasBaseUri,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub width: u64,
    pub height: u64,
}

impl FromStr for Resolution {
    type Err = M3u8Error;

    /// Parses `<width>x<height>`, e.g. `1280x720`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || M3u8Error::InvalidResolution(s.to_string());
        let (width, height) = s.trim_matches('"').split_once('x').ok_or_else(invalid)?;

        Ok(Self {
            width: width.trim().parse().map_err(|_| invalid())?,
            height: height.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Attributes of `#EXT-X-STREAM-INF` and `#EXT-X-I-FRAME-STREAM-INF`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreamInfo {
    pub bandwidth: Option<u64>,
    pub average_bandwidth: Option<u64>,
    pub program_id: Option<u64>,
    pub codecs: Option<String>,
    /// Group ids of the associated renditions
    pub audio: Option<String>,
    pub video: Option<String>,
    pub subtitles: Option<String>,
    /// Either a group id or `NONE`
    pub closed_captions: Option<String>,
    pub resolution: Option<Resolution>,
    pub frame_rate: Option<f64>,
}

impl StreamInfo {
    fn from_attributes(attributes: &AttributeList) -> M3u8Result<Self> {
        Ok(Self {
            bandwidth: attributes.get_int("bandwidth"),
            average_bandwidth: attributes.get_int("average_bandwidth"),
            program_id: attributes.get_int("program_id"),
            codecs: attributes.get_str("codecs").map(str::to_string),
            audio: attributes.get_str("audio").map(str::to_string),
            video: attributes.get_str("video").map(str::to_string),
            subtitles: attributes.get_str("subtitles").map(str::to_string),
            closed_captions: attributes.get_str("closed_captions").map(str::to_string),
            resolution: attributes
                .get_str("resolution")
                .map(str::parse)
                .transpose()?,
            frame_rate: attributes.get_float("frame_rate"),
        })
    }

    /// Group ids this stream refers to, in `AUDIO`, `VIDEO`, `SUBTITLES` order.
    pub fn group_ids(&self) -> impl Iterator<Item = &str> {
        [&self.audio, &self.video, &self.subtitles]
            .into_iter()
            .filter_map(|group_id| group_id.as_deref())
            .filter(|group_id| !group_id.is_empty())
    }
}

/// A variant stream of a master playlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Playlist {
    pub uri: String,
    pub stream_info: StreamInfo,
    /// Indices into [`M3u8::media`](crate::M3u8::media) of the renditions whose group id
    /// is referenced by the stream info.
    pub media: Vec<usize>,
    pub base_uri: Option<String>,
}

impl Playlist {
    pub fn new<S: Into<String>>(uri: S, stream_info: StreamInfo) -> Self {
        Self {
            uri: uri.into(),
            stream_info,
            media: Vec::new(),
            base_uri: None,
        }
    }

    pub(crate) fn from_data(
        data: VariantData,
        media: &[Media],
        base_uri: Option<String>,
    ) -> M3u8Result<Self> {
        let stream_info = StreamInfo::from_attributes(&data.stream_info)?;
        if stream_info.bandwidth.is_none() {
            return Err(M3u8Error::MissingAttribute {
                tag: EXT_X_STREAM_INF,
                attribute: "BANDWIDTH",
            });
        }

        let mut playlist = Self::new(data.uri, stream_info);
        playlist.media = associated_media(&playlist.stream_info, media);
        playlist.base_uri = base_uri;
        Ok(playlist)
    }
}

/// Indices of the media whose group id is referenced by `stream_info`.
pub(crate) fn associated_media(stream_info: &StreamInfo, media: &[Media]) -> Vec<usize> {
    media
        .iter()
        .enumerate()
        .filter(|(_, media)| {
            media
                .group_id
                .as_deref()
                .is_some_and(|group_id| stream_info.group_ids().any(|id| id == group_id))
        })
        .map(|(index, _)| index)
        .collect()
}

impl HasBaseUri for Playlist {
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

/// An I-frame variant stream. Audio, subtitles, closed captions, frame rate and average
/// bandwidth are never set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IFramePlaylist {
    pub uri: Option<String>,
    pub iframe_stream_info: StreamInfo,
    pub base_uri: Option<String>,
}

impl IFramePlaylist {
    pub fn new<S: Into<String>>(uri: S, iframe_stream_info: StreamInfo) -> Self {
        Self {
            uri: Some(uri.into()),
            iframe_stream_info: StreamInfo {
                audio: None,
                subtitles: None,
                closed_captions: None,
                frame_rate: None,
                average_bandwidth: None,
                ..iframe_stream_info
            },
            base_uri: None,
        }
    }

    pub(crate) fn from_data(data: IFrameData, base_uri: Option<String>) -> M3u8Result<Self> {
        let info = StreamInfo::from_attributes(&data.iframe_stream_info)?;
        Ok(Self {
            uri: data.uri,
            iframe_stream_info: StreamInfo {
                bandwidth: info.bandwidth,
                program_id: info.program_id,
                codecs: info.codecs,
                video: info.video,
                resolution: info.resolution,
                ..Default::default()
            },
            base_uri,
        })
    }
}

impl HasBaseUri for IFramePlaylist {
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
