use iori_m3u8::{loads, HasBaseUri, M3u8Error, M3u8Parser};

use super::*;

const RELATIVE: &str = "#EXTM3U
#EXT-X-KEY:METHOD=AES-128,URI=\"keys/key.bin\"
#EXTINF:10,
seg1.ts
#EXTINF:10,
videos/seg2.ts
#EXTINF:10,
https://cdn.example.com/seg3.ts";

#[test]
fn resolve_against_network_base() -> anyhow::Result<()> {
    let playlist = M3u8Parser::new()
        .with_base_uri("http://example.com/path/")
        .parse(RELATIVE)?;

    let uris = playlist
        .segments
        .iter()
        .map(|segment| segment.absolute_uri())
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(
        uris,
        vec![
            Some("http://example.com/path/seg1.ts".to_string()),
            Some("http://example.com/path/videos/seg2.ts".to_string()),
            Some("https://cdn.example.com/seg3.ts".to_string()),
        ]
    );

    let key = playlist.keys[0].as_ref().expect("key");
    assert_eq!(
        key.absolute_uri()?.as_deref(),
        Some("http://example.com/path/keys/key.bin")
    );
    Ok(())
}

#[cfg(unix)]
#[test]
fn resolve_against_local_base() -> anyhow::Result<()> {
    let playlist = M3u8Parser::new()
        .with_base_uri("/var/data")
        .parse(RELATIVE)?;

    assert_eq!(playlist.base_uri(), Some("/var/data/"));
    assert_eq!(
        playlist.segments[0].absolute_uri()?.as_deref(),
        Some("/var/data/seg1.ts")
    );
    assert_eq!(
        playlist.segments[1].absolute_uri()?.as_deref(),
        Some("/var/data/videos/seg2.ts")
    );
    Ok(())
}

#[test]
fn relative_uri_without_base_is_an_error() -> anyhow::Result<()> {
    let playlist = loads(RELATIVE)?;
    assert!(matches!(
        playlist.segments[0].absolute_uri(),
        Err(M3u8Error::MissingBaseUri)
    ));
    assert_eq!(
        playlist.segments[2].absolute_uri()?.as_deref(),
        Some("https://cdn.example.com/seg3.ts")
    );
    Ok(())
}

#[test]
fn base_path_replaces_directories() -> anyhow::Result<()> {
    let playlist = M3u8Parser::new()
        .with_base_path("/mnt/cache")
        .parse(RELATIVE)?;

    assert_eq!(playlist.base_path(), Some("/mnt/cache"));
    assert_eq!(
        playlist.segment_uris(),
        vec![
            "/mnt/cache/seg1.ts",
            "/mnt/cache/seg2.ts",
            "/mnt/cache/seg3.ts",
        ]
    );
    assert_eq!(
        playlist.keys[0].as_ref().and_then(|key| key.uri.as_deref()),
        Some("/mnt/cache/key.bin")
    );
    Ok(())
}

#[test]
fn base_path_reaches_variant_media() -> anyhow::Result<()> {
    let mut playlist = loads(MASTER)?;
    playlist.set_base_path("http://mirror.example.com");

    assert_eq!(playlist.playlists[0].uri, "http://mirror.example.com/index.m3u8");
    let media: Vec<_> = playlist
        .playlist_media(&playlist.playlists[0])
        .filter_map(|media| media.uri.as_deref())
        .collect();
    assert_eq!(
        media,
        vec![
            "http://mirror.example.com/en.m3u8",
            "http://mirror.example.com/de.m3u8",
            "http://mirror.example.com/en.m3u8",
        ]
    );
    assert_eq!(
        playlist.iframe_playlists[0].uri.as_deref(),
        Some("http://mirror.example.com/iframe.m3u8")
    );
    Ok(())
}

#[test]
fn set_base_uri_after_parsing() -> anyhow::Result<()> {
    let mut playlist = loads(MASTER)?;
    playlist.set_base_uri("https://cdn.example.com/vod");

    assert_eq!(
        playlist.media[2].absolute_uri()?.as_deref(),
        Some("https://cdn.example.com/vod/subs/en.m3u8")
    );
    assert_eq!(
        playlist.playlists[2].absolute_uri()?.as_deref(),
        Some("https://cdn.example.com/vod/audio-only.m3u8")
    );
    Ok(())
}
