//! Destructive rewrite of the sequence's clip list from mapped segments.

use xmltree::Element;

use super::document::{element_with_attributes, push_child, FcpxmlDocument};
use super::mapper::MappedSegment;
use super::time::format_seconds;
use super::Result;
use crate::segments::SegmentKind;

/// Replace every asset-clip in the spine with one new clip per mapped segment.
///
/// Segments arrive in ascending output-start order and are appended in that
/// order. Speech clips are tagged with the `dialogue` audio role, silence clips
/// with `Silence`, so both survive into the editor for manual review. All other
/// document structure is left untouched.
pub fn rewrite_timeline(doc: &mut FcpxmlDocument, mapped: &[MappedSegment]) -> Result<()> {
    let spine = doc.spine_mut()?;

    spine
        .children
        .retain(|node| node.as_element().map_or(true, |el| el.name != "asset-clip"));

    for segment in mapped {
        push_child(spine, build_asset_clip(segment));
    }

    Ok(())
}

fn build_asset_clip(segment: &MappedSegment) -> Element {
    let audio_role = match segment.kind {
        SegmentKind::Speech => "dialogue",
        SegmentKind::Silence => "Silence",
    };

    let mut clip = element_with_attributes(
        "asset-clip",
        &[
            ("ref", segment.source_ref.clone()),
            ("offset", format_seconds(segment.output_start)),
            ("duration", format_seconds(segment.output_duration)),
            ("start", format_seconds(segment.source_start)),
            ("name", segment.name.clone()),
            ("audioRole", audio_role.to_string()),
        ],
    );

    push_child(
        &mut clip,
        element_with_attributes(
            "conform-rate",
            &[
                ("scaleEnabled", "0".to_string()),
                ("srcFrameRate", "60".to_string()),
            ],
        ),
    );

    clip
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::SegmentKind;

    const SAMPLE: &str = r#"<fcpxml version="1.10">
        <library>
            <sequence format="r1" duration="60s">
                <spine>
                    <asset-clip ref="r2" offset="0s" start="0s" duration="60s" name="old"/>
                    <gap offset="0s" duration="1s"/>
                </spine>
            </sequence>
        </library>
    </fcpxml>"#;

    fn mapped(start: f64, duration: f64, kind: SegmentKind) -> MappedSegment {
        MappedSegment {
            output_start: start,
            output_duration: duration,
            source_start: start + 10.0,
            source_ref: "r2".to_string(),
            kind,
            name: "vlog".to_string(),
        }
    }

    #[test]
    fn test_original_clips_are_replaced() {
        let mut doc = FcpxmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        let segments = vec![
            mapped(0.0, 2.0, SegmentKind::Silence),
            mapped(2.0, 3.0, SegmentKind::Speech),
        ];

        rewrite_timeline(&mut doc, &segments).unwrap();

        let clips = doc.original_clips().unwrap();
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].offset_in_output, 0.0);
        assert_eq!(clips[1].offset_in_output, 2.0);
        assert_eq!(clips[1].start_in_source, 12.0);
    }

    #[test]
    fn test_non_clip_spine_children_survive() {
        let mut doc = FcpxmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        rewrite_timeline(&mut doc, &[mapped(0.0, 1.0, SegmentKind::Speech)]).unwrap();

        let spine = doc.spine_mut().unwrap();
        assert!(spine.get_child("gap").is_some());

        let mut doc_clips = doc.asset_clips_mut();
        assert_eq!(doc_clips.len(), 1);
        let clip = doc_clips.remove(0);
        assert_eq!(clip.attributes.get("audioRole").unwrap(), "dialogue");
        assert!(clip.get_child("conform-rate").is_some());
    }

    #[test]
    fn test_silence_clips_get_silence_role() {
        let mut doc = FcpxmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        rewrite_timeline(&mut doc, &[mapped(0.0, 1.0, SegmentKind::Silence)]).unwrap();

        let mut clips = doc.asset_clips_mut();
        assert_eq!(clips.remove(0).attributes.get("audioRole").unwrap(), "Silence");
    }

    #[test]
    fn test_rewrite_without_spine_fails() {
        let mut doc =
            FcpxmlDocument::parse(br#"<fcpxml><sequence format="r1"/></fcpxml>"#).unwrap();
        assert!(rewrite_timeline(&mut doc, &[]).is_err());
    }
}
