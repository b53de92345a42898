use iori_m3u8::{loads, Key, M3u8Parser, PlaylistData};

use super::*;
use crate::AssertWrapper;

#[test]
fn unencrypted_then_encrypted() -> anyhow::Result<()> {
    let playlist = loads(ENCRYPTED)?;

    assert_eq!(playlist.keys.len(), 3);
    assert_eq!(playlist.keys[0], None);

    let key = playlist.keys[1].as_ref().assert_success();
    assert_eq!(key.method, "AES-128");
    assert_eq!(key.uri.as_deref(), Some("https://priv.example.com/key.php?r=52"));
    assert_eq!(key.iv.as_deref(), Some("0X10ef8f758ca555115584bb5b3c687f52"));

    let keys: Vec<_> = playlist.segments.iter().map(|s| s.key).collect();
    assert_eq!(keys, vec![None, None, Some(1), Some(1), Some(1), Some(2)]);

    assert_eq!(playlist.segments_by_key(None).count(), 2);
    assert_eq!(playlist.segments_by_key(Some(1)).count(), 3);
    assert_eq!(
        playlist.key_of(&playlist.segments[5])?.and_then(|k| k.uri.as_deref()),
        Some("https://priv.example.com/key.php?r=53")
    );
    Ok(())
}

#[test]
fn repeated_key_is_written_once() -> anyhow::Result<()> {
    let playlist = loads(ENCRYPTED)?;
    let output = playlist.dumps();

    assert_eq!(output.matches("key.php?r=52").count(), 1);
    assert_eq!(output.matches("key.php?r=53").count(), 1);
    assert!(!output.contains("METHOD=NONE"));

    let key_line = output
        .lines()
        .position(|line| line.contains("key.php?r=52"))
        .assert_success();
    assert_eq!(output.lines().nth(key_line + 2), Some("encrypted1.ts"));
    Ok(())
}

#[test]
fn files_lists_keys_before_segments() -> anyhow::Result<()> {
    let playlist = loads(ENCRYPTED)?;
    assert_eq!(
        playlist.files(),
        vec![
            "https://priv.example.com/key.php?r=52",
            "https://priv.example.com/key.php?r=53",
            "plain1.ts",
            "plain2.ts",
            "encrypted1.ts",
            "encrypted2.ts",
            "encrypted3.ts",
            "encrypted4.ts",
        ]
    );
    Ok(())
}

#[test]
fn key_without_method_defaults_to_none() -> anyhow::Result<()> {
    let playlist = loads("#EXTM3U\n#EXT-X-KEY:URI=\"key.bin\"\n#EXTINF:4,\na.ts")?;
    assert_eq!(playlist.keys.len(), 1);
    let key = playlist.keys[0].as_ref().assert_success();
    assert_eq!(key, &Key::new("NONE").with_uri("key.bin"));
    Ok(())
}

#[test]
fn segment_with_unknown_key_is_an_error() {
    // The hook drops every declared key, leaving the segment with a dangling reference.
    let result = M3u8Parser::new()
        .with_custom_tags_parser(|line: &str, data: &mut PlaylistData, _lineno: usize| {
            if line == "#EXT-X-CLEAR-KEYS" {
                data.keys.clear();
            }
        })
        .parse("#EXTM3U\n#EXT-X-KEY:METHOD=AES-128,URI=\"key.bin\"\n#EXTINF:4,\na.ts\n#EXT-X-CLEAR-KEYS");

    assert!(matches!(result, Err(iori_m3u8::M3u8Error::KeyNotFound(_))));
}
