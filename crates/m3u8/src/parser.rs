pub mod attributes;
pub mod cast;

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, TimeDelta};
use regex::Regex;
use serde::Serialize;

use crate::{
    error::{M3u8Error, M3u8Result},
    model::M3u8,
};
use attributes::{parse_attribute_list, AttributeList, Cast};
use cast::{cast_date_time, cast_float, cast_int, remove_quotes};

pub const EXTM3U: &str = "#EXTM3U";
pub const EXT_X_TARGETDURATION: &str = "#EXT-X-TARGETDURATION";
pub const EXT_X_MEDIA_SEQUENCE: &str = "#EXT-X-MEDIA-SEQUENCE";
pub const EXT_X_DISCONTINUITY_SEQUENCE: &str = "#EXT-X-DISCONTINUITY-SEQUENCE";
pub const EXT_X_PROGRAM_DATE_TIME: &str = "#EXT-X-PROGRAM-DATE-TIME";
pub const EXT_X_MEDIA: &str = "#EXT-X-MEDIA";
pub const EXT_X_PLAYLIST_TYPE: &str = "#EXT-X-PLAYLIST-TYPE";
pub const EXT_X_KEY: &str = "#EXT-X-KEY";
pub const EXT_X_STREAM_INF: &str = "#EXT-X-STREAM-INF";
pub const EXT_X_VERSION: &str = "#EXT-X-VERSION";
pub const EXT_X_ALLOW_CACHE: &str = "#EXT-X-ALLOW-CACHE";
pub const EXT_X_ENDLIST: &str = "#EXT-X-ENDLIST";
pub const EXTINF: &str = "#EXTINF";
pub const EXT_X_I_FRAMES_ONLY: &str = "#EXT-X-I-FRAMES-ONLY";
pub const EXT_X_BYTERANGE: &str = "#EXT-X-BYTERANGE";
pub const EXT_X_I_FRAME_STREAM_INF: &str = "#EXT-X-I-FRAME-STREAM-INF";
pub const EXT_X_DISCONTINUITY: &str = "#EXT-X-DISCONTINUITY";
pub const EXT_X_CUE_OUT_START: &str = "#EXT-X-CUE-OUT";
pub const EXT_X_CUE_OUT: &str = "#EXT-X-CUE-OUT-CONT";
pub const EXT_X_CUE_SPAN: &str = "#EXT-X-CUE-SPAN";
pub const EXT_X_INDEPENDENT_SEGMENTS: &str = "#EXT-X-INDEPENDENT-SEGMENTS";
pub const EXT_X_MAP: &str = "#EXT-X-MAP";
pub const EXT_X_START: &str = "#EXT-X-START";

// Inline form: #EXT-X-CUE-OUT-CONT:ElapsedTime=5,Duration=30,SCTE35=/DAlAAAA...
static CUE_OUT_CONT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)DURATION=(.*),SCTE35=(.*)$").unwrap());
// Elemental form: #EXT-OATCLS-SCTE35:/DAlAAAA... followed by #EXT-X-CUE-OUT:30.000
static CUE_OUT_ELEMENTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"EXT-OATCLS-SCTE35:(.*)$").unwrap());
// Envivio form: #EXT-X-CUE-OUT:DURATION=30,ID=1,CUE="/DAlAAAA..."
static CUE_OUT_ENVIVIO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"DURATION=([^,]*),(?:.*,)?CUE="(.*)""#).unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    ByteRange,
    TargetDuration,
    MediaSequence,
    DiscontinuitySequence,
    ProgramDateTime,
    Discontinuity,
    CueOutCont,
    CueOutStart,
    CueSpan,
    Version,
    AllowCache,
    Key,
    Inf,
    StreamInf,
    IFrameStreamInf,
    Media,
    PlaylistType,
    IFramesOnly,
    IndependentSegments,
    EndList,
    Map,
    Start,
}

/// Known tags, matched by prefix in this order. A tag which is a prefix of another tag
/// must come after it.
const TAGS: &[(&str, Tag)] = &[
    (EXT_X_BYTERANGE, Tag::ByteRange),
    (EXT_X_TARGETDURATION, Tag::TargetDuration),
    (EXT_X_MEDIA_SEQUENCE, Tag::MediaSequence),
    (EXT_X_DISCONTINUITY_SEQUENCE, Tag::DiscontinuitySequence),
    (EXT_X_PROGRAM_DATE_TIME, Tag::ProgramDateTime),
    (EXT_X_DISCONTINUITY, Tag::Discontinuity),
    (EXT_X_CUE_OUT, Tag::CueOutCont),
    (EXT_X_CUE_OUT_START, Tag::CueOutStart),
    (EXT_X_CUE_SPAN, Tag::CueSpan),
    (EXT_X_VERSION, Tag::Version),
    (EXT_X_ALLOW_CACHE, Tag::AllowCache),
    (EXT_X_KEY, Tag::Key),
    (EXTINF, Tag::Inf),
    (EXT_X_STREAM_INF, Tag::StreamInf),
    (EXT_X_I_FRAME_STREAM_INF, Tag::IFrameStreamInf),
    (EXT_X_MEDIA, Tag::Media),
    (EXT_X_PLAYLIST_TYPE, Tag::PlaylistType),
    (EXT_X_I_FRAMES_ONLY, Tag::IFramesOnly),
    (EXT_X_INDEPENDENT_SEGMENTS, Tag::IndependentSegments),
    (EXT_X_ENDLIST, Tag::EndList),
    (EXT_X_MAP, Tag::Map),
    (EXT_X_START, Tag::Start),
];

/// Attributes of an `#EXT-X-KEY` tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyAttributes {
    pub method: Option<String>,
    pub uri: Option<String>,
    pub iv: Option<String>,
    pub keyformat: Option<String>,
    pub keyformatversions: Option<String>,
}

impl KeyAttributes {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl From<AttributeList> for KeyAttributes {
    fn from(mut attributes: AttributeList) -> Self {
        Self {
            method: attributes.remove_str("method"),
            uri: attributes.remove_str("uri"),
            iv: attributes.remove_str("iv"),
            keyformat: attributes.remove_str("keyformat"),
            keyformatversions: attributes.remove_str("keyformatversions"),
        }
    }
}

/// A segment as collected by the parser, before keys are resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentData {
    pub uri: String,
    pub duration: f64,
    pub title: String,
    pub byterange: Option<String>,
    pub program_date_time: Option<DateTime<FixedOffset>>,
    pub current_program_date_time: Option<DateTime<FixedOffset>>,
    pub discontinuity: bool,
    pub cue_out: bool,
    pub scte35: Option<String>,
    pub scte35_duration: Option<String>,
    pub key: Option<KeyAttributes>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariantData {
    pub uri: String,
    pub stream_info: AttributeList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IFrameData {
    pub uri: Option<String>,
    pub iframe_stream_info: AttributeList,
}

/// Everything the parser collected from a playlist.
///
/// This is what a custom tag parser receives and may modify while parsing is in progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistData {
    pub target_duration: Option<f64>,
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

    /// Distinct keys in order of first appearance. `None` stands for unencrypted segments.
    pub keys: Vec<Option<KeyAttributes>>,
    pub segments: Vec<SegmentData>,
    pub media: Vec<AttributeList>,
    pub playlists: Vec<VariantData>,
    pub iframe_playlists: Vec<IFrameData>,
    pub segment_map: Option<AttributeList>,
    pub start: Option<AttributeList>,
}

impl Default for PlaylistData {
    fn default() -> Self {
        Self {
            target_duration: None,
            media_sequence: Some(0),
            discontinuity_sequence: None,
            program_date_time: None,
            version: None,
            allow_cache: None,
            playlist_type: None,
            is_variant: false,
            is_endlist: false,
            is_i_frames_only: false,
            is_independent_segments: false,
            keys: Vec::new(),
            segments: Vec::new(),
            media: Vec::new(),
            playlists: Vec::new(),
            iframe_playlists: Vec::new(),
            segment_map: None,
            start: None,
        }
    }
}

/// Handles `#` lines which are not a known tag.
pub trait CustomTagParser {
    fn parse_tag(&mut self, line: &str, data: &mut PlaylistData, lineno: usize);
}

impl<F> CustomTagParser for F
where
    F: FnMut(&str, &mut PlaylistData, usize),
{
    fn parse_tag(&mut self, line: &str, data: &mut PlaylistData, lineno: usize) {
        self(line, data, lineno)
    }
}

#[derive(Debug, Default)]
struct PendingSegment {
    duration: Option<f64>,
    title: String,
    byterange: Option<String>,
}

/// State carried from one line to the following ones during a single parse.
#[derive(Debug, Default)]
struct ParseState {
    /// The next bare line is a segment uri.
    expect_segment: bool,
    /// The next bare line is a variant playlist uri.
    expect_playlist: bool,

    /// Applies to every following segment until another key tag.
    current_key: Option<KeyAttributes>,
    segment: Option<PendingSegment>,
    discontinuity: bool,
    cue_out: bool,
    cue_out_scte35: Option<String>,
    cue_out_duration: Option<String>,
    stream_info: Option<AttributeList>,

    /// Advances by the duration of every segment once set.
    current_program_date_time: Option<DateTime<FixedOffset>>,
    program_date_time: Option<DateTime<FixedOffset>>,
}

/// Parses playlist text.
///
/// ```
/// use iori_m3u8::M3u8Parser;
///
/// let playlist = M3u8Parser::new()
///     .with_base_uri("http://example.com/path/")
///     .parse("#EXTM3U\n#EXTINF:10,\nseg1.ts\n#EXT-X-ENDLIST")
///     .unwrap();
/// assert_eq!(playlist.segments.len(), 1);
/// ```
#[derive(Default)]
pub struct M3u8Parser<'a> {
    strict: bool,
    base_uri: Option<String>,
    base_path: Option<String>,
    custom_tags_parser: Option<Box<dyn CustomTagParser + 'a>>,
}

impl<'a> M3u8Parser<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on unexpected bare lines and `#EXTINF` tags without a comma.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_base_uri<S: Into<String>>(mut self, base_uri: S) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    pub fn with_base_path<S: Into<String>>(mut self, base_path: S) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn with_custom_tags_parser<P>(mut self, parser: P) -> Self
    where
        P: CustomTagParser + 'a,
    {
        self.custom_tags_parser = Some(Box::new(parser));
        self
    }

    pub fn parse(&mut self, content: &str) -> M3u8Result<M3u8> {
        let data = self.parse_data(content)?;
        M3u8::from_data(data, self.base_uri.clone(), self.base_path.clone())
    }

    pub fn parse_data(&mut self, content: &str) -> M3u8Result<PlaylistData> {
        let mut data = PlaylistData::default();
        let mut state = ParseState::default();
        let mut previous_line = "";

        for (index, line) in content.lines().enumerate() {
            let lineno = index + 1;
            let line = line.trim();

            if line.is_empty() {
                // blank lines are legal
            } else if let Some((prefix, tag)) =
                TAGS.iter().find(|(prefix, _)| line.starts_with(prefix))
            {
                let context = LineContext {
                    prefix,
                    line,
                    previous_line,
                    lineno,
                    strict: self.strict,
                };
                parse_tag(*tag, &context, &mut data, &mut state)?;
            } else if line.starts_with('#') {
                match &mut self.custom_tags_parser {
                    Some(parser) => parser.parse_tag(line, &mut data, lineno),
                    None => log::debug!("Ignored unknown tag on line {lineno}: {line}"),
                }
            } else if state.expect_segment {
                parse_ts_chunk(line, &mut data, &mut state)?;
                state.expect_segment = false;
            } else if state.expect_playlist {
                parse_variant_playlist(line, &mut data, &mut state);
                state.expect_playlist = false;
            } else if self.strict {
                return Err(M3u8Error::Syntax {
                    lineno,
                    line: line.to_string(),
                });
            } else {
                log::warn!("Ignored unexpected line {lineno}: {line}");
            }

            previous_line = line;
        }

        Ok(data)
    }
}

struct LineContext<'a> {
    prefix: &'a str,
    line: &'a str,
    previous_line: &'a str,
    lineno: usize,
    strict: bool,
}

impl LineContext<'_> {
    fn syntax_error(&self) -> M3u8Error {
        M3u8Error::Syntax {
            lineno: self.lineno,
            line: self.line.to_string(),
        }
    }

    /// Value of a `#TAG:VALUE` line.
    ///
    /// A missing value is an error in strict mode and skips the tag otherwise.
    fn value(&self) -> M3u8Result<Option<&str>> {
        match self.line.split_once(':') {
            Some((_, value)) => Ok(Some(value.trim())),
            None if self.strict => Err(self.syntax_error()),
            None => {
                log::warn!("Ignored tag without value on line {}: {}", self.lineno, self.line);
                Ok(None)
            }
        }
    }

    fn attributes(&self, casts: &[(&str, Cast)]) -> M3u8Result<AttributeList> {
        parse_attribute_list(self.prefix, self.line, casts)
    }
}

fn parse_tag(
    tag: Tag,
    context: &LineContext<'_>,
    data: &mut PlaylistData,
    state: &mut ParseState,
) -> M3u8Result<()> {
    match tag {
        Tag::ByteRange => {
            if let Some(value) = context.value()? {
                state.segment.get_or_insert_with(Default::default).byterange =
                    Some(value.to_string());
            }
            state.expect_segment = true;
        }
        Tag::TargetDuration => {
            if let Some(value) = context.value()? {
                data.target_duration = Some(cast_float(value)?);
            }
        }
        Tag::MediaSequence => {
            if let Some(value) = context.value()? {
                data.media_sequence = Some(cast_int(value)?);
            }
        }
        Tag::DiscontinuitySequence => {
            if let Some(value) = context.value()? {
                data.discontinuity_sequence = Some(cast_int(value)?);
            }
        }
        Tag::ProgramDateTime => {
            if let Some(value) = context.value()? {
                let program_date_time = cast_date_time(value)?;
                if data.program_date_time.is_none() {
                    data.program_date_time = Some(program_date_time);
                }
                state.current_program_date_time = Some(program_date_time);
                state.program_date_time = Some(program_date_time);
            }
        }
        Tag::Discontinuity => state.discontinuity = true,
        Tag::CueOutCont => {
            parse_cue_out_cont(context.line, state);
            state.cue_out = true;
        }
        Tag::CueOutStart => {
            parse_cue_out_start(context.line, context.previous_line, state);
            state.cue_out = true;
        }
        Tag::CueSpan => state.cue_out = true,
        Tag::Version => data.version = context.value()?.map(str::to_string),
        Tag::AllowCache => data.allow_cache = context.value()?.map(str::to_string),
        Tag::PlaylistType => data.playlist_type = context.value()?.map(str::to_string),
        Tag::Key => {
            let key = KeyAttributes::from(context.attributes(&[])?);
            let key = Some(key);
            if !data.keys.contains(&key) {
                data.keys.push(key.clone());
            }
            state.current_key = key;
        }
        Tag::Inf => {
            parse_extinf(context, state)?;
            state.expect_segment = true;
        }
        Tag::StreamInf => {
            data.is_variant = true;
            data.media_sequence = None;
            state.stream_info = Some(context.attributes(&[
                ("program_id", Cast::Integer),
                ("bandwidth", Cast::IntegerFromFloat),
                ("average_bandwidth", Cast::Integer),
                ("frame_rate", Cast::Float),
            ])?);
            state.expect_playlist = true;
        }
        Tag::IFrameStreamInf => {
            let mut iframe_stream_info = context.attributes(&[
                ("program_id", Cast::Integer),
                ("bandwidth", Cast::Integer),
            ])?;
            let uri = iframe_stream_info.remove_str("uri");
            data.is_variant = true;
            data.iframe_playlists.push(IFrameData {
                uri,
                iframe_stream_info,
            });
        }
        Tag::Media => data.media.push(context.attributes(&[])?),
        Tag::IFramesOnly => data.is_i_frames_only = true,
        Tag::IndependentSegments => data.is_independent_segments = true,
        Tag::EndList => data.is_endlist = true,
        Tag::Map => data.segment_map = Some(context.attributes(&[])?),
        Tag::Start => data.start = Some(context.attributes(&[("time_offset", Cast::Float)])?),
    }

    Ok(())
}

fn parse_extinf(context: &LineContext<'_>, state: &mut ParseState) -> M3u8Result<()> {
    let Some(value) = context.value()? else {
        return Ok(());
    };
    let (duration, title) = match value.split_once(',') {
        Some((duration, title)) => (duration, title),
        None if context.strict => return Err(context.syntax_error()),
        None => (value, ""),
    };

    let segment = state.segment.get_or_insert_with(Default::default);
    segment.duration = Some(cast_float(duration)?);
    segment.title = remove_quotes(title).to_string();
    Ok(())
}

fn parse_cue_out_cont(line: &str, state: &mut ParseState) {
    let Some((_, value)) = line.split_once(':') else {
        return;
    };
    if let Some(caps) = CUE_OUT_CONT.captures(value) {
        state.cue_out_duration = Some(caps[1].to_string());
        state.cue_out_scte35 = Some(caps[2].to_string());
    }
}

fn parse_cue_out_start(line: &str, previous_line: &str, state: &mut ParseState) {
    let value = line.split_once(':').map(|(_, value)| value);

    // The SCTE-35 payload is either on the preceding proprietary tag or in the CUE attribute.
    let cue_out = if let Some(caps) = CUE_OUT_ELEMENTAL.captures(previous_line) {
        Some((caps[1].to_string(), value.map(str::to_string)))
    } else {
        value
            .and_then(|value| CUE_OUT_ENVIVIO.captures(value))
            .map(|caps| (caps[2].to_string(), Some(caps[1].to_string())))
    };

    if let Some((scte35, duration)) = cue_out {
        state.cue_out_scte35 = Some(scte35);
        state.cue_out_duration = duration;
    }
}

fn parse_ts_chunk(
    line: &str,
    data: &mut PlaylistData,
    state: &mut ParseState,
) -> M3u8Result<()> {
    let segment = state.segment.take().unwrap_or_default();
    let duration = segment.duration.unwrap_or_default();

    let current_program_date_time = state.current_program_date_time;
    if let Some(current) = &mut state.current_program_date_time {
        let next = advance(*current, duration)
            .ok_or_else(|| M3u8Error::InvalidDateTime(format!("{current} + {duration}s")))?;
        *current = next;
    }

    let key = match &state.current_key {
        Some(key) => Some(key.clone()),
        None => {
            if !data.keys.contains(&None) {
                data.keys.push(None);
            }
            None
        }
    };

    data.segments.push(SegmentData {
        uri: line.to_string(),
        duration,
        title: segment.title,
        byterange: segment.byterange,
        program_date_time: state.program_date_time.take(),
        current_program_date_time,
        discontinuity: std::mem::take(&mut state.discontinuity),
        cue_out: std::mem::take(&mut state.cue_out),
        scte35: state.cue_out_scte35.take(),
        scte35_duration: state.cue_out_duration.take(),
        key,
    });
    Ok(())
}

fn advance(time: DateTime<FixedOffset>, seconds: f64) -> Option<DateTime<FixedOffset>> {
    let micros = (seconds * 1_000_000.0).round();
    if !(i64::MIN as f64..i64::MAX as f64).contains(&micros) {
        return None;
    }
    time.checked_add_signed(TimeDelta::microseconds(micros as i64))
}

fn parse_variant_playlist(line: &str, data: &mut PlaylistData, state: &mut ParseState) {
    data.playlists.push(VariantData {
        uri: line.to_string(),
        stream_info: state.stream_info.take().unwrap_or_default(),
    });
}
