//! End-to-end recut workflow: audio analysis to rewritten project file.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::audio::{AudioAnalyzer, FfmpegSilenceDetector};
use crate::captions::add_captions_to_project;
use crate::config::Config;
use crate::segments::{detect_speech_intervals, segment_timeline, SegmentKind, SilenceDetector};
use crate::timeline::{map_segments_to_clips, rewrite_timeline, FcpxmlDocument};

/// Summary of a recut run.
#[derive(Debug, Clone)]
pub struct RecutReport {
    pub total_duration: f64,
    pub speech_segments: usize,
    pub silence_segments: usize,
    /// Segments with no enclosing original clip, dropped from the output.
    pub dropped_segments: usize,
    /// Clips written to the rewritten spine.
    pub clips_written: usize,
}

/// Single-run pipeline turning an audio track and an FCPXML project into a
/// re-segmented project.
///
/// Runs start to finish on the calling task; each stage consumes the previous
/// stage's output and nothing reads back. Any I/O failure aborts the run.
pub struct RecutPipeline {
    config: Config,
    analyzer: AudioAnalyzer,
    detector: Box<dyn SilenceDetector>,
}

impl RecutPipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            analyzer: AudioAnalyzer::new(),
            detector: Box::new(FfmpegSilenceDetector),
        }
    }

    /// Swap in a different silence detection backend.
    pub fn with_detector(config: Config, detector: Box<dyn SilenceDetector>) -> Self {
        Self {
            config,
            analyzer: AudioAnalyzer::new(),
            detector,
        }
    }

    /// Re-segment `project` along the speech/silence boundaries of `audio` and
    /// write the rewritten document to `output`.
    pub async fn recut(&self, project: &Path, audio: &Path, output: &Path) -> Result<RecutReport> {
        info!("🎬 Recutting {} using {}", project.display(), audio.display());

        let temp_dir = tempfile::TempDir::new()?;
        let wav = self
            .analyzer
            .extract_for_analysis(audio, temp_dir.path())
            .await
            .context("Audio extraction failed")?;

        let total_duration = self.detector.duration(&wav).await?;
        info!("⏱️ Audio duration: {:.2}s", total_duration);

        let speech = detect_speech_intervals(
            self.detector.as_ref(),
            &wav,
            &self.config.silence,
            total_duration,
        )
        .await
        .context("Silence detection failed")?;
        info!("🗣️ Detected {} speech intervals", speech.len());

        let segments = segment_timeline(&speech, self.config.merge.max_gap_seconds, total_duration);

        let mut doc = FcpxmlDocument::load(project)
            .await
            .with_context(|| format!("Failed to load project {}", project.display()))?;
        let clips = doc.original_clips()?;
        if clips.is_empty() {
            warn!("Project has no asset clips; every segment will be dropped");
        }

        let outcome = map_segments_to_clips(&segments, &clips);
        if !outcome.dropped.is_empty() {
            warn!(
                "⚠️ {} of {} segments had no enclosing clip and were dropped",
                outcome.dropped.len(),
                segments.len()
            );
        }

        rewrite_timeline(&mut doc, &outcome.mapped)?;
        doc.save(output)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;

        let report = RecutReport {
            total_duration,
            speech_segments: segments.iter().filter(|s| s.kind == SegmentKind::Speech).count(),
            silence_segments: segments.iter().filter(|s| s.kind == SegmentKind::Silence).count(),
            dropped_segments: outcome.dropped.len(),
            clips_written: outcome.mapped.len(),
        };

        info!(
            "✅ Wrote {} clips ({} speech, {} silence) to {}",
            report.clips_written,
            report.speech_segments,
            report.silence_segments,
            output.display()
        );

        Ok(report)
    }

    /// Recut and then inject SRT captions, writing only the final document to
    /// `output`. The intermediate recut project lives in a temp directory.
    pub async fn recut_and_caption(
        &self,
        project: &Path,
        audio: &Path,
        srt: &Path,
        output: &Path,
    ) -> Result<RecutReport> {
        let temp_dir = tempfile::TempDir::new()?;
        let intermediate = temp_dir.path().join("recut.fcpxml");

        let report = self.recut(project, audio, &intermediate).await?;
        add_captions_to_project(srt, &intermediate, output)
            .await
            .context("Caption injection failed")?;

        Ok(report)
    }
}
