use iori_m3u8::loads;

use super::*;

const SCTE35: &str = "/DAlAAAAAAAAAP/wFAUAAAABf+/+ANgNkv4AFJlwAAEBAQAA5xULLA==";

#[test]
fn cue_out_variants_are_equivalent() -> anyhow::Result<()> {
    for content in [CUE_OUT_INLINE, CUE_OUT_ELEMENTAL, CUE_OUT_ENVIVIO] {
        let playlist = loads(content)?;
        let segments = &playlist.segments;

        assert!(!segments[0].cue_out);
        assert_eq!(segments[0].scte35, None);

        assert!(segments[1].cue_out);
        assert_eq!(segments[1].scte35.as_deref(), Some(SCTE35));
        assert_eq!(segments[1].scte35_duration.as_deref(), Some("30.000"));

        // Only the segment following the cue tag carries the payload.
        assert_eq!(segments[2].scte35, None);
        assert_eq!(segments[2].scte35_duration, None);
    }
    Ok(())
}

#[test]
fn cue_span_marks_segment() -> anyhow::Result<()> {
    let playlist = loads(CUE_OUT_ELEMENTAL)?;
    assert!(playlist.segments[2].cue_out);

    let inline = loads(CUE_OUT_INLINE)?;
    assert!(!inline.segments[2].cue_out);
    Ok(())
}

#[test]
fn scte35_survives_serialization() -> anyhow::Result<()> {
    let output = loads(CUE_OUT_ELEMENTAL)?.dumps();
    assert!(output.contains(&format!(
        "#EXT-X-CUE-OUT-CONT:DURATION=30.000,SCTE35={SCTE35}\n#EXTINF:10,\nsegment2.ts"
    )));
    assert!(output.contains("#EXT-X-CUE-OUT-CONT\n#EXTINF:10,\nsegment3.ts"));
    Ok(())
}
