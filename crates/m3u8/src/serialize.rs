use std::{fmt, path::Path};

use crate::{
    error::M3u8Result,
    model::{IFramePlaylist, Key, M3u8, Media, Playlist, Segment, SegmentMap, Start},
    parser::{
        attributes::{denormalize_attribute, AttributeValue},
        cast::{format_date_time, int_or_float_to_string, quoted},
        *,
    },
};

impl M3u8 {
    /// Serializes the playlist. Lines are separated by `\n` without a trailing newline.
    pub fn dumps(&self) -> String {
        self.to_string()
    }

    /// Writes [`M3u8::dumps`] to `path`, creating missing parent directories.
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> M3u8Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.dumps())?;
        tracing::info!("Saved playlist to {}", path.display());
        Ok(())
    }

    fn lines(&self) -> Vec<String> {
        let mut output = vec![EXTM3U.to_string()];

        if self.is_independent_segments {
            output.push(EXT_X_INDEPENDENT_SEGMENTS.to_string());
        }
        if let Some(media_sequence) = self.media_sequence.filter(|s| *s != 0) {
            output.push(format!("{EXT_X_MEDIA_SEQUENCE}:{media_sequence}"));
        }
        if let Some(discontinuity_sequence) = self.discontinuity_sequence {
            output.push(format!(
                "{EXT_X_DISCONTINUITY_SEQUENCE}:{discontinuity_sequence}"
            ));
        }
        if let Some(allow_cache) = non_empty(&self.allow_cache) {
            output.push(format!(
                "{EXT_X_ALLOW_CACHE}:{}",
                allow_cache.to_uppercase()
            ));
        }
        if let Some(version) = non_empty(&self.version) {
            output.push(format!("{EXT_X_VERSION}:{version}"));
        }
        if let Some(target_duration) = self.target_duration {
            output.push(format!(
                "{EXT_X_TARGETDURATION}:{}",
                int_or_float_to_string(target_duration)
            ));
        }
        if let Some(playlist_type) = non_empty(&self.playlist_type) {
            output.push(format!(
                "{EXT_X_PLAYLIST_TYPE}:{}",
                playlist_type.to_uppercase()
            ));
        }
        if let Some(start) = &self.start {
            output.push(start.to_string());
        }
        if self.is_i_frames_only {
            output.push(EXT_X_I_FRAMES_ONLY.to_string());
        }
        if let Some(segment_map) = &self.segment_map {
            output.push(segment_map.to_string());
        }

        if self.is_variant {
            output.extend(self.media.iter().map(Media::to_string));
            output.extend(self.playlists.iter().map(Playlist::to_string));
            output.extend(self.iframe_playlists.iter().map(IFramePlaylist::to_string));
        }

        let mut last_key = None;
        for (index, segment) in self.segments.iter().enumerate() {
            let key = self.segment_key(segment);
            // A key applies until the next key tag, so it is only written when it changes.
            if (index == 0 && key.is_some()) || (index > 0 && key != last_key) {
                match key {
                    Some(key) => output.push(key.to_string()),
                    None => output.push(format!("{EXT_X_KEY}:METHOD=NONE")),
                }
            }
            write_segment(segment, &mut output);
            last_key = key;
        }

        if self.is_endlist {
            output.push(EXT_X_ENDLIST.to_string());
        }

        output
    }

    fn segment_key(&self, segment: &Segment) -> Option<&Key> {
        self.key_of(segment).unwrap_or_else(|e| {
            log::warn!("Segment {} written without key: {e}", segment.uri);
            None
        })
    }
}

impl fmt::Display for M3u8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

fn write_segment(segment: &Segment, output: &mut Vec<String>) {
    if segment.discontinuity {
        output.push(EXT_X_DISCONTINUITY.to_string());
    }
    if let Some(program_date_time) = &segment.program_date_time {
        output.push(format!(
            "{EXT_X_PROGRAM_DATE_TIME}:{}",
            format_date_time(program_date_time)
        ));
    }
    match (&segment.scte35_duration, &segment.scte35) {
        (Some(duration), Some(scte35)) => output.push(format!(
            "{EXT_X_CUE_OUT}:DURATION={duration},SCTE35={scte35}"
        )),
        _ if segment.cue_out => output.push(EXT_X_CUE_OUT.to_string()),
        _ => {}
    }

    let mut extinf = format!("{EXTINF}:{},", int_or_float_to_string(segment.duration));
    if !segment.title.is_empty() {
        extinf.push_str(&quoted(&segment.title));
    }
    output.push(extinf);

    if let Some(byterange) = &segment.byterange {
        output.push(format!("{EXT_X_BYTERANGE}:{byterange}"));
    }
    output.push(segment.uri.clone());
}

/// Collects `NAME=VALUE` pairs of an attribute-list tag.
#[derive(Default)]
struct Attributes(Vec<String>);

impl Attributes {
    fn push<V: fmt::Display>(&mut self, name: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.0.push(format!("{name}={value}"));
        }
        self
    }

    fn push_quoted(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        self.push(name, value.map(quoted))
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, tag: &str) -> fmt::Result {
        write!(f, "{tag}:{}", self.0.join(","))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut output = Vec::new();
        write_segment(self, &mut output);
        f.write_str(&output.join("\n"))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Attributes::default()
            .push("METHOD", Some(&self.method))
            .push_quoted("URI", self.uri.as_deref())
            .push("IV", self.iv.as_ref())
            .push_quoted("KEYFORMAT", self.keyformat.as_deref())
            .push_quoted("KEYFORMATVERSIONS", self.keyformatversions.as_deref())
            .write(f, EXT_X_KEY)
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut attributes = Attributes::default();
        attributes
            .push_quoted("URI", self.uri.as_deref())
            .push("TYPE", self.media_type.as_ref())
            .push_quoted("GROUP-ID", self.group_id.as_deref())
            .push_quoted("LANGUAGE", self.language.as_deref())
            .push_quoted("ASSOC-LANGUAGE", self.assoc_language.as_deref())
            .push_quoted("NAME", self.name.as_deref())
            .push("DEFAULT", self.default.as_ref())
            .push("AUTOSELECT", self.autoselect.as_ref())
            .push("FORCED", self.forced.as_ref())
            .push_quoted("INSTREAM-ID", self.instream_id.as_deref())
            .push_quoted("CHARACTERISTICS", self.characteristics.as_deref());

        for (name, value) in self.extras.iter() {
            let name = denormalize_attribute(name);
            match value {
                AttributeValue::String(value) => attributes.push_quoted(&name, Some(value.as_str())),
                AttributeValue::Integer(value) => attributes.push(&name, Some(value)),
                AttributeValue::Float(value) => {
                    attributes.push(&name, Some(int_or_float_to_string(*value)))
                }
            };
        }

        attributes.write(f, EXT_X_MEDIA)
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = &self.stream_info;
        let closed_captions = info
            .closed_captions
            .as_deref()
            .map(|value| match value {
                "NONE" => value.to_string(),
                value => quoted(value),
            });

        Attributes::default()
            .push("PROGRAM-ID", info.program_id)
            .push("CLOSED-CAPTIONS", closed_captions)
            .push("BANDWIDTH", Some(info.bandwidth.unwrap_or_default()))
            .push("AVERAGE-BANDWIDTH", info.average_bandwidth)
            .push("RESOLUTION", info.resolution)
            .push("FRAME-RATE", info.frame_rate.map(int_or_float_to_string))
            .push_quoted("CODECS", info.codecs.as_deref())
            .push_quoted("AUDIO", info.audio.as_deref())
            .push_quoted("VIDEO", info.video.as_deref())
            .push_quoted("SUBTITLES", info.subtitles.as_deref())
            .write(f, EXT_X_STREAM_INF)?;
        write!(f, "\n{}", self.uri)
    }
}

impl fmt::Display for IFramePlaylist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = &self.iframe_stream_info;
        Attributes::default()
            .push("PROGRAM-ID", info.program_id)
            .push("BANDWIDTH", info.bandwidth)
            .push("RESOLUTION", info.resolution)
            .push_quoted("CODECS", info.codecs.as_deref())
            .push_quoted("VIDEO", info.video.as_deref())
            .push_quoted("URI", self.uri.as_deref())
            .write(f, EXT_X_I_FRAME_STREAM_INF)
    }
}

impl fmt::Display for Start {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Attributes::default()
            .push("TIME-OFFSET", Some(int_or_float_to_string(self.time_offset)))
            .push(
                "PRECISE",
                self.precise
                    .map(|precise| if precise { "YES" } else { "NO" }),
            )
            .write(f, EXT_X_START)
    }
}

impl fmt::Display for SegmentMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Attributes::default()
            .push_quoted("URI", self.uri.as_deref())
            .push_quoted("BYTERANGE", self.byterange.as_deref())
            .write(f, EXT_X_MAP)
    }
}
