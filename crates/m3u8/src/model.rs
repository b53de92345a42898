mod key;
mod media;
mod playlist;
mod segment;
mod start;

pub use key::Key;
pub use media::Media;
pub use playlist::{IFramePlaylist, Playlist, Resolution, StreamInfo};
use playlist::associated_media;
pub use segment::Segment;
pub use start::{SegmentMap, Start};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::{
    error::{M3u8Error, M3u8Result},
    parser::{KeyAttributes, PlaylistData},
    uri::HasBaseUri,
};

/// A parsed media or master playlist.
///
/// Entities refer to each other by index: [`Segment::key`] into [`M3u8::keys`] and
/// [`Playlist::media`] into [`M3u8::media`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct M3u8 {
    /// Distinct keys in order of first appearance. `None` marks unencrypted segments and
    /// appears at most once.
    pub keys: Vec<Option<Key>>,
    pub segments: Vec<Segment>,
    pub media: Vec<Media>,
    pub playlists: Vec<Playlist>,
    pub iframe_playlists: Vec<IFramePlaylist>,

    pub target_duration: Option<f64>,
    /// `None` for master playlists.
    pub media_sequence: Option<u64>,
    pub discontinuity_sequence: Option<u64>,
    /// Program date time of the first `#EXT-X-PROGRAM-DATE-TIME` tag.
    pub program_date_time: Option<DateTime<FixedOffset>>,
    pub version: Option<String>,
    pub allow_cache: Option<String>,
    pub playlist_type: Option<String>,

    pub is_variant: bool,
    pub is_endlist: bool,
    pub is_i_frames_only: bool,
    pub is_independent_segments: bool,

    pub start: Option<Start>,
    pub segment_map: Option<SegmentMap>,

    base_uri: Option<String>,
    base_path: Option<String>,
}

impl M3u8 {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_data(
        data: PlaylistData,
        base_uri: Option<String>,
        base_path: Option<String>,
    ) -> M3u8Result<Self> {
        let base_uri = base_uri.map(with_trailing_slash);
        let mut playlist = Self {
            target_duration: data.target_duration,
            media_sequence: data.media_sequence,
            discontinuity_sequence: data.discontinuity_sequence,
            program_date_time: data.program_date_time,
            version: data.version,
            allow_cache: data.allow_cache,
            playlist_type: data.playlist_type,
            is_variant: data.is_variant,
            is_endlist: data.is_endlist,
            is_i_frames_only: data.is_i_frames_only,
            is_independent_segments: data.is_independent_segments,
            base_uri: base_uri.clone(),
            ..Default::default()
        };

        for key in data.keys {
            let key = key
                .filter(|key| !key.is_empty())
                .map(|key| Key::from_attributes(key, base_uri.clone()));
            playlist.insert_key(key);
        }

        for mut segment in data.segments {
            let key = match segment.key.take().filter(|key| !key.is_empty()) {
                Some(attributes) => Some(playlist.find_key(attributes)?),
                None => None,
            };
            playlist
                .segments
                .push(Segment::from_data(segment, key, base_uri.clone()));
        }

        playlist.media = data
            .media
            .into_iter()
            .map(|media| Media::from_attributes(media, base_uri.clone()))
            .collect();

        for variant in data.playlists {
            let variant = Playlist::from_data(variant, &playlist.media, base_uri.clone())?;
            playlist.playlists.push(variant);
        }

        for iframe in data.iframe_playlists {
            let iframe = IFramePlaylist::from_data(iframe, base_uri.clone())?;
            playlist.iframe_playlists.push(iframe);
        }

        playlist.segment_map = data.segment_map.map(SegmentMap::from);
        playlist.start = data.start.as_ref().map(Start::from_attributes).transpose()?;

        if let Some(base_path) = base_path {
            playlist.set_base_path(base_path);
        }

        log::debug!(
            "Loaded playlist with {} segments, {} keys and {} variants",
            playlist.segments.len(),
            playlist.keys.len(),
            playlist.playlists.len()
        );
        Ok(playlist)
    }

    fn find_key(&self, attributes: KeyAttributes) -> M3u8Result<usize> {
        let key = Key::from_attributes(attributes, self.base_uri.clone());
        self.keys
            .iter()
            .position(|k| k.as_ref() == Some(&key))
            .ok_or_else(|| M3u8Error::KeyNotFound(key.uri.unwrap_or(key.method)))
    }

    fn insert_key(&mut self, key: Option<Key>) -> usize {
        match self.keys.iter().position(|k| *k == key) {
            Some(index) => index,
            None => {
                self.keys.push(key);
                self.keys.len() - 1
            }
        }
    }

    /// Adds a key unless an equal one exists, returning the index to use as
    /// [`Segment::key`].
    pub fn add_key(&mut self, key: Key) -> usize {
        self.insert_key(Some(key))
    }

    pub fn key_of(&self, segment: &Segment) -> M3u8Result<Option<&Key>> {
        match segment.key {
            None => Ok(None),
            Some(index) => match self.keys.get(index) {
                Some(Some(key)) => Ok(Some(key)),
                Some(None) => Ok(None),
                None => Err(M3u8Error::KeyNotFound(format!("#{index}"))),
            },
        }
    }

    pub fn add_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Adds a rendition and associates it with the variant playlists referring to its group.
    pub fn add_media(&mut self, media: Media) -> usize {
        self.media.push(media);
        for variant in &mut self.playlists {
            variant.media = associated_media(&variant.stream_info, &self.media);
        }
        self.media.len() - 1
    }

    pub fn add_playlist(&mut self, mut playlist: Playlist) {
        self.is_variant = true;
        playlist.media = associated_media(&playlist.stream_info, &self.media);
        self.playlists.push(playlist);
    }

    pub fn add_iframe_playlist(&mut self, iframe_playlist: IFramePlaylist) {
        self.is_variant = true;
        self.iframe_playlists.push(iframe_playlist);
    }

    /// Renditions associated with a variant playlist of this document.
    pub fn playlist_media<'a>(&'a self, playlist: &'a Playlist) -> impl Iterator<Item = &'a Media> {
        playlist
            .media
            .iter()
            .filter_map(move |&index| self.media.get(index))
    }

    /// Every file a download of this playlist needs: key uris first, then segment uris.
    pub fn files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = Vec::new();
        for uri in self.keys.iter().flatten().filter_map(|key| key.uri.as_deref()) {
            if !files.contains(&uri) {
                files.push(uri);
            }
        }
        files.extend(self.segment_uris());
        files
    }

    pub fn segment_uris(&self) -> Vec<&str> {
        self.segments.iter().map(|segment| segment.uri.as_str()).collect()
    }

    /// Segments encrypted with the key at `key`, or unencrypted segments for `None`.
    pub fn segments_by_key(&self, key: Option<usize>) -> impl Iterator<Item = &Segment> {
        self.segments
            .iter()
            .filter(move |segment| segment.key == key)
    }

    pub fn media_uris(&self) -> Vec<&str> {
        self.media
            .iter()
            .filter_map(|media| media.uri.as_deref())
            .collect()
    }

    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    /// Sets the base uri of the document and every entity it owns.
    pub fn set_base_uri<S: Into<String>>(&mut self, base_uri: S) {
        let base_uri = Some(with_trailing_slash(base_uri.into()));
        self.for_each_entity(|entity| entity.set_base_uri(base_uri.clone()));
        self.base_uri = base_uri;
    }

    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    /// Moves the uri of every entity under `base_path`.
    pub fn set_base_path<S: Into<String>>(&mut self, base_path: S) {
        let base_path = base_path.into();
        self.for_each_entity(|entity| entity.set_base_path(&base_path));
        self.base_path = Some(base_path);
    }

    fn for_each_entity<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut dyn HasBaseUri),
    {
        for key in self.keys.iter_mut().flatten() {
            f(key);
        }
        for segment in &mut self.segments {
            f(segment);
        }
        for media in &mut self.media {
            f(media);
        }
        for playlist in &mut self.playlists {
            f(playlist);
        }
        for iframe_playlist in &mut self.iframe_playlists {
            f(iframe_playlist);
        }
    }
}

fn with_trailing_slash(mut uri: String) -> String {
    if !uri.ends_with('/') {
        uri.push('/');
    }
    uri
}
