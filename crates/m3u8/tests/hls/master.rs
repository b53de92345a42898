use iori_m3u8::{
    loads, loads_with_uri, HasBaseUri, IFramePlaylist, Media, Playlist, Resolution, StreamInfo,
};

use super::*;

#[test]
fn master_playlist() -> anyhow::Result<()> {
    let playlist = loads(MASTER)?;

    assert!(playlist.is_variant);
    assert!(playlist.is_independent_segments);
    assert_eq!(playlist.media_sequence, None);
    assert!(playlist.segments.is_empty());
    assert_eq!(playlist.media.len(), 4);
    assert_eq!(playlist.playlists.len(), 3);
    assert_eq!(playlist.iframe_playlists.len(), 1);

    let low = &playlist.playlists[0].stream_info;
    assert_eq!(low.program_id, Some(1));
    assert_eq!(low.bandwidth, Some(1280000));
    assert_eq!(low.average_bandwidth, Some(1000000));
    assert_eq!(
        low.resolution,
        Some(Resolution {
            width: 640,
            height: 360
        })
    );
    assert_eq!(low.frame_rate, Some(29.97));
    assert_eq!(low.codecs.as_deref(), Some("avc1.4d401e,mp4a.40.2"));
    assert_eq!(low.closed_captions.as_deref(), Some("cc"));

    let hi = &playlist.playlists[1].stream_info;
    assert_eq!(hi.bandwidth, Some(7680000));
    assert_eq!(hi.closed_captions.as_deref(), Some("NONE"));

    let iframe = &playlist.iframe_playlists[0];
    assert_eq!(iframe.uri.as_deref(), Some("low/iframe.m3u8"));
    assert_eq!(iframe.iframe_stream_info.bandwidth, Some(86000));
    assert_eq!(iframe.iframe_stream_info.audio, None);
    Ok(())
}

#[test]
fn media_attributes() -> anyhow::Result<()> {
    let playlist = loads(MASTER)?;

    let english = &playlist.media[0];
    assert_eq!(english.media_type.as_deref(), Some("AUDIO"));
    assert_eq!(english.group_id.as_deref(), Some("aac"));
    assert_eq!(english.language.as_deref(), Some("en"));
    assert_eq!(english.default.as_deref(), Some("YES"));
    assert_eq!(english.uri.as_deref(), Some("audio/en.m3u8"));
    assert_eq!(english.extras.get_str("channels"), Some("2"));

    let captions = &playlist.media[3];
    assert_eq!(captions.instream_id.as_deref(), Some("CC1"));
    assert_eq!(captions.uri, None);

    assert_eq!(
        playlist.media_uris(),
        vec!["audio/en.m3u8", "audio/de.m3u8", "subs/en.m3u8"]
    );
    Ok(())
}

#[test]
fn variant_media_is_filtered_by_group() -> anyhow::Result<()> {
    let playlist = loads(MASTER)?;

    let names = |index: usize| {
        playlist
            .playlist_media(&playlist.playlists[index])
            .filter_map(|media| media.name.as_deref())
            .collect::<Vec<_>>()
    };
    assert_eq!(names(0), vec!["English", "Deutsch", "English"]);
    assert_eq!(names(1), vec!["English", "Deutsch"]);
    assert!(names(2).is_empty());
    Ok(())
}

#[test]
fn master_serialization() -> anyhow::Result<()> {
    let output = loads(MASTER)?.dumps();
    let lines: Vec<_> = output.lines().collect();

    assert_eq!(lines[0], "#EXTM3U");
    assert_eq!(lines[1], "#EXT-X-INDEPENDENT-SEGMENTS");
    assert_eq!(
        lines[2],
        r#"#EXT-X-MEDIA:URI="audio/en.m3u8",TYPE=AUDIO,GROUP-ID="aac",LANGUAGE="en",NAME="English",DEFAULT=YES,AUTOSELECT=YES,CHANNELS="2""#
    );
    assert_eq!(
        lines[5],
        r#"#EXT-X-MEDIA:TYPE=CLOSED-CAPTIONS,GROUP-ID="cc",NAME="CC1",INSTREAM-ID="CC1""#
    );
    assert_eq!(
        lines[6],
        r#"#EXT-X-STREAM-INF:PROGRAM-ID=1,CLOSED-CAPTIONS="cc",BANDWIDTH=1280000,AVERAGE-BANDWIDTH=1000000,RESOLUTION=640x360,FRAME-RATE=29.97,CODECS="avc1.4d401e,mp4a.40.2",AUDIO="aac",SUBTITLES="subs""#
    );
    assert_eq!(lines[7], "low/index.m3u8");
    assert_eq!(
        lines[8],
        r#"#EXT-X-STREAM-INF:PROGRAM-ID=1,CLOSED-CAPTIONS=NONE,BANDWIDTH=7680000,RESOLUTION=1920x1080,CODECS="avc1.640028,mp4a.40.2",AUDIO="aac""#
    );
    assert_eq!(
        lines.last().copied(),
        Some(r#"#EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=86000,RESOLUTION=640x360,CODECS="avc1.4d401e",URI="low/iframe.m3u8""#)
    );
    Ok(())
}

#[test]
fn master_uris_resolve_against_playlist_location() -> anyhow::Result<()> {
    let playlist = loads_with_uri(MASTER, "https://cdn.example.com/vod/master.m3u8?token=1")?;

    assert_eq!(playlist.base_uri(), Some("https://cdn.example.com/vod/"));
    assert_eq!(
        playlist.playlists[0].absolute_uri()?.as_deref(),
        Some("https://cdn.example.com/vod/low/index.m3u8")
    );
    assert_eq!(
        playlist.media[0].absolute_uri()?.as_deref(),
        Some("https://cdn.example.com/vod/audio/en.m3u8")
    );
    assert_eq!(
        playlist.iframe_playlists[0].absolute_uri()?.as_deref(),
        Some("https://cdn.example.com/vod/low/iframe.m3u8")
    );
    assert_eq!(playlist.media[3].absolute_uri()?, None);
    Ok(())
}

#[test]
fn programmatic_master_playlist() -> anyhow::Result<()> {
    let mut playlist = iori_m3u8::M3u8::new();
    playlist.add_media(Media {
        media_type: Some("AUDIO".to_string()),
        group_id: Some("aac".to_string()),
        name: Some("English".to_string()),
        uri: Some("en.m3u8".to_string()),
        ..Default::default()
    });
    playlist.add_playlist(Playlist::new(
        "low.m3u8",
        StreamInfo {
            bandwidth: Some(640000),
            audio: Some("aac".to_string()),
            ..Default::default()
        },
    ));
    playlist.add_iframe_playlist(IFramePlaylist::new(
        "iframe.m3u8",
        StreamInfo {
            bandwidth: Some(86000),
            audio: Some("aac".to_string()),
            ..Default::default()
        },
    ));

    assert!(playlist.is_variant);
    assert_eq!(playlist.playlists[0].media, vec![0]);
    assert_eq!(playlist.iframe_playlists[0].iframe_stream_info.audio, None);

    let reparsed = loads(&playlist.dumps())?;
    assert_eq!(reparsed.playlists[0].stream_info.bandwidth, Some(640000));
    assert_eq!(reparsed.playlists[0].media, vec![0]);
    assert_eq!(
        reparsed.iframe_playlists[0].uri.as_deref(),
        Some("iframe.m3u8")
    );
    Ok(())
}
