use iori_m3u8::{loads, M3u8};

use super::*;

fn assert_idempotent(content: &str) -> anyhow::Result<M3u8> {
    let playlist = loads(content)?;
    let reparsed = loads(&playlist.dumps())?;
    assert_eq!(playlist, reparsed);
    assert_eq!(playlist.dumps(), reparsed.dumps());
    Ok(playlist)
}

#[test]
fn simple_playlist_round_trip() -> anyhow::Result<()> {
    let playlist = assert_idempotent(SIMPLE)?;
    assert_eq!(playlist.dumps(), SIMPLE.trim());
    Ok(())
}

#[test]
fn all_fixtures_are_idempotent() -> anyhow::Result<()> {
    for content in [
        SIMPLE,
        ENCRYPTED,
        MASTER,
        PROGRAM_DATE_TIME,
        CUE_OUT_INLINE,
        CUE_OUT_ELEMENTAL,
        CUE_OUT_ENVIVIO,
    ] {
        assert_idempotent(content)?;
    }
    Ok(())
}

#[test]
fn media_playlist_serialization() -> anyhow::Result<()> {
    let playlist = loads(PROGRAM_DATE_TIME)?;
    assert_eq!(
        playlist.dumps(),
        r#"#EXTM3U
#EXT-X-MEDIA-SEQUENCE:50
#EXT-X-DISCONTINUITY-SEQUENCE:2
#EXT-X-ALLOW-CACHE:NO
#EXT-X-TARGETDURATION:6
#EXT-X-PLAYLIST-TYPE:EVENT
#EXT-X-START:TIME-OFFSET=-12.5,PRECISE=YES
#EXT-X-MAP:URI="init.mp4",BYTERANGE="720@0"
#EXT-X-PROGRAM-DATE-TIME:2014-08-13T13:36:33.026Z
#EXTINF:6,"Opening"
#EXT-X-BYTERANGE:1000@720
main.mp4
#EXTINF:4.5,
#EXT-X-BYTERANGE:1000@1720
main.mp4
#EXT-X-DISCONTINUITY
#EXT-X-PROGRAM-DATE-TIME:2014-08-13T14:00:00+02:00
#EXTINF:6,
other.mp4"#
    );
    Ok(())
}

#[test]
fn case_of_enumerated_values_is_normalized() -> anyhow::Result<()> {
    let playlist = loads("#EXTM3U\n#EXT-X-PLAYLIST-TYPE:vod\n#EXT-X-ALLOW-CACHE:yes")?;
    assert_eq!(playlist.playlist_type.as_deref(), Some("vod"));
    assert_eq!(
        playlist.dumps(),
        "#EXTM3U\n#EXT-X-ALLOW-CACHE:YES\n#EXT-X-PLAYLIST-TYPE:VOD"
    );
    Ok(())
}
