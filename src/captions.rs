//! Subtitle enrichment of FCPXML projects.
//!
//! Two paths: injecting SRT subtitles as title elements into an existing
//! project, and generating a minimal standalone project from an SRT file.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use xmltree::{Element, XMLNode};

use crate::srt::{SrtEntry, SrtFile};
use crate::timeline::document::{element_with_attributes, push_child};
use crate::timeline::{format_seconds, parse_seconds, FcpxmlDocument};

/// Inject every subtitle as a title element into the asset-clip that contains
/// its start time, and write the result to a new file.
pub async fn add_captions_to_project(
    srt_path: &Path,
    input_project: &Path,
    output_project: &Path,
) -> Result<usize> {
    let subtitles = SrtFile::load(srt_path)
        .await
        .with_context(|| format!("Failed to load subtitles from {}", srt_path.display()))?;
    let mut doc = FcpxmlDocument::load(input_project)
        .await
        .with_context(|| format!("Failed to load project {}", input_project.display()))?;

    // Fail on a missing sequence before touching any clip.
    doc.sequence()?;

    let mut injected = 0usize;
    for clip in doc.asset_clips_mut() {
        let offset = clip_time(clip, "offset")?;
        let duration = clip_time(clip, "duration")?;

        for (i, entry) in subtitles.entries().iter().enumerate() {
            let start = entry.start.as_secs_f64();
            if offset <= start && start <= offset + duration {
                clip.children
                    .push(XMLNode::Element(build_title(i, entry)));
                injected += 1;
            }
        }
    }

    info!("💬 Injected {} captions into {}", injected, output_project.display());
    doc.save(output_project).await?;
    Ok(injected)
}

fn clip_time(clip: &Element, attribute: &str) -> Result<f64> {
    let raw = clip
        .attributes
        .get(attribute)
        .map(String::as_str)
        .unwrap_or("0s");
    Ok(parse_seconds(raw)?)
}

/// Build the title element FCP shows as an overlaid caption.
fn build_title(index: usize, entry: &SrtEntry) -> Element {
    let start = entry.start.as_secs_f64();
    let duration = (entry.end - entry.start).as_secs_f64();
    let style_id = format!("ts{}", index);

    // FCP caps the clip label; the full text lives in the text-style node.
    let label: String = entry.text.chars().take(30).collect();

    let mut title = element_with_attributes(
        "title",
        &[
            ("ref", "title_effect".to_string()),
            ("offset", format_seconds(start)),
            ("duration", format_seconds(duration)),
            ("name", label),
            ("lane", "3".to_string()),
        ],
    );

    push_child(
        &mut title,
        element_with_attributes(
            "param",
            &[
                ("name", "Position".to_string()),
                ("key", "9999/999166631/999166633/1/100/101".to_string()),
                ("value", "0 -450".to_string()),
            ],
        ),
    );

    let mut text = Element::new("text");
    let mut text_style = element_with_attributes("text-style", &[("ref", style_id.clone())]);
    text_style.children.push(XMLNode::Text(entry.text.clone()));
    push_child(&mut text, text_style);
    push_child(&mut title, text);

    let mut style_def = element_with_attributes("text-style-def", &[("id", style_id)]);
    push_child(
        &mut style_def,
        element_with_attributes(
            "text-style",
            &[
                ("font", "Noteworthy".to_string()),
                ("fontSize", "30".to_string()),
                ("fontColor", "1 0.7 0 1".to_string()),
                ("bold", "1".to_string()),
                ("shadowColor", "0 0 0 0.75".to_string()),
                ("shadowOffset", "5 315".to_string()),
                ("alignment", "center".to_string()),
            ],
        ),
    );
    push_child(&mut title, style_def);

    title
}

/// Generate a minimal standalone FCPXML project with one subtitle clip per
/// SRT entry, and write it to `output_project`.
pub async fn generate_project_from_srt(
    srt_path: &Path,
    output_project: &Path,
    project_name: &str,
) -> Result<usize> {
    let subtitles = SrtFile::load(srt_path)
        .await
        .with_context(|| format!("Failed to load subtitles from {}", srt_path.display()))?;

    let doc = FcpxmlDocument::new(build_project(&subtitles, project_name));
    doc.save(output_project).await?;

    info!(
        "📽️ Generated {} with {} subtitle clips",
        output_project.display(),
        subtitles.len()
    );
    Ok(subtitles.len())
}

fn build_project(subtitles: &SrtFile, project_name: &str) -> Element {
    let mut fcpxml = element_with_attributes("fcpxml", &[("version", "1.10".to_string())]);

    let mut resources = Element::new("resources");
    push_child(
        &mut resources,
        element_with_attributes(
            "format",
            &[
                ("id", "r1".to_string()),
                ("name", "FFVideoFormat1080p60".to_string()),
            ],
        ),
    );
    push_child(
        &mut resources,
        element_with_attributes(
            "effect",
            &[
                ("id", "r2".to_string()),
                ("name", "Basic Title".to_string()),
            ],
        ),
    );
    push_child(&mut fcpxml, resources);

    let total = subtitles.total_duration().as_secs_f64();
    let mut sequence = element_with_attributes(
        "sequence",
        &[
            ("format", "r1".to_string()),
            ("duration", format_rational_ms(total)),
            ("tcStart", "0s".to_string()),
            ("tcFormat", "NDF".to_string()),
            ("audioLayout", "stereo".to_string()),
            ("audioRate", "48k".to_string()),
        ],
    );

    let mut spine = Element::new("spine");
    for (i, entry) in subtitles.entries().iter().enumerate() {
        push_child(&mut spine, build_subtitle_clip(i + 1, entry));
    }
    push_child(&mut sequence, spine);

    let mut project = element_with_attributes("project", &[("name", project_name.to_string())]);
    push_child(&mut project, sequence);
    let mut event = element_with_attributes("event", &[("name", project_name.to_string())]);
    push_child(&mut event, project);
    let mut library = Element::new("library");
    push_child(&mut library, event);
    push_child(&mut fcpxml, library);

    fcpxml
}

fn build_subtitle_clip(index: usize, entry: &SrtEntry) -> Element {
    let start = entry.start.as_secs_f64();
    let duration = (entry.end - entry.start).as_secs_f64();
    let style_id = format!("ts{}", index);

    let mut clip = element_with_attributes(
        "asset-clip",
        &[
            ("ref", "r2".to_string()),
            ("offset", "0s".to_string()),
            ("name", format!("Subtitle Clip {}", index)),
            ("start", format_seconds(start)),
            ("duration", format_rational_ms(duration)),
            ("format", "r1".to_string()),
            ("tcFormat", "NDF".to_string()),
            ("audioRole", "dialogue".to_string()),
        ],
    );

    push_child(
        &mut clip,
        element_with_attributes("conform-rate", &[("scaleEnabled", "0".to_string())]),
    );

    let mut caption = element_with_attributes(
        "caption",
        &[
            ("lane", "1".to_string()),
            ("offset", "0s".to_string()),
            ("name", entry.text.clone()),
            ("start", format_seconds(start)),
            ("duration", format_rational_ms(duration)),
            ("role", "SRT?captionFormat=SRT.fr-FR".to_string()),
        ],
    );

    let mut text = element_with_attributes("text", &[("placement", "bottom".to_string())]);
    let mut text_style = element_with_attributes("text-style", &[("ref", style_id.clone())]);
    text_style.children.push(XMLNode::Text(entry.text.clone()));
    push_child(&mut text, text_style);
    push_child(&mut caption, text);

    let mut style_def = element_with_attributes("text-style-def", &[("id", style_id)]);
    push_child(
        &mut style_def,
        element_with_attributes(
            "text-style",
            &[
                ("font", ".AppleSystemUIFont".to_string()),
                ("fontSize", "10".to_string()),
                ("fontFace", "Regular".to_string()),
                ("fontColor", "1 0.843 0 1".to_string()),
                ("backgroundColor", "0 0 0 0".to_string()),
            ],
        ),
    );
    push_child(&mut caption, style_def);

    push_child(&mut clip, caption);
    clip
}

/// Rational seconds at millisecond resolution, e.g. `1500/1000s`.
fn format_rational_ms(seconds: f64) -> String {
    format!("{}/1000s", (seconds * 1000.0).round() as i64)
}
