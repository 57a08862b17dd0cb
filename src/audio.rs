use anyhow::{anyhow, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::SilenceConfig;
use crate::segments::SilenceDetector;

/// Audio extraction and probing via the ffmpeg toolchain
#[derive(Debug, Clone)]
pub struct AudioAnalyzer {
    /// Sample rate for the analysis wav
    pub target_sample_rate: u32,
}

impl AudioAnalyzer {
    pub fn new() -> Self {
        Self {
            target_sample_rate: 16000,
        }
    }

    /// Extract a mono wav suitable for silence analysis from any decodable input.
    pub async fn extract_for_analysis(&self, media_path: &Path, output_dir: &Path) -> Result<PathBuf> {
        let filename = media_path
            .file_stem()
            .ok_or_else(|| anyhow!("Invalid media filename: {}", media_path.display()))?
            .to_string_lossy();
        let wav_path = output_dir.join(format!("{}.wav", filename));

        info!("🎵 Extracting analysis audio: {}", media_path.display());

        tokio::fs::create_dir_all(output_dir).await?;

        let media = media_path
            .to_str()
            .ok_or_else(|| anyhow!("Non-UTF8 media path: {}", media_path.display()))?;
        let wav = wav_path
            .to_str()
            .ok_or_else(|| anyhow!("Non-UTF8 output path: {}", wav_path.display()))?;

        let status = tokio::process::Command::new("ffmpeg")
            .args([
                "-i", media,
                "-vn", // No video stream
                "-acodec", "pcm_s16le",
                "-ar", &self.target_sample_rate.to_string(),
                "-ac", "1", // Mono channel
                "-f", "wav",
                "-y",
                wav,
            ])
            .status()
            .await?;

        if !status.success() {
            return Err(anyhow!("Audio extraction failed for {}", media_path.display()));
        }

        Ok(wav_path)
    }
}

impl Default for AudioAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Total duration of a media file in seconds, via ffprobe.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let file = path
        .to_str()
        .ok_or_else(|| anyhow!("Non-UTF8 media path: {}", path.display()))?;

    let output = tokio::process::Command::new("ffprobe")
        .args([
            "-v", "quiet",
            "-print_format", "json",
            "-show_format",
            file,
        ])
        .output()
        .await?;

    if !output.status.success() {
        return Err(anyhow!("ffprobe failed for {}", path.display()));
    }

    let probe: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    probe["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| anyhow!("ffprobe reported no duration for {}", path.display()))
}

/// Silence detection backed by ffmpeg's `silencedetect` filter.
///
/// The filter logs `silence_start`/`silence_end` pairs on stderr; those are
/// parsed and inverted into the non-silent ranges the detection stage expects.
#[derive(Debug, Clone, Default)]
pub struct FfmpegSilenceDetector;

#[async_trait]
impl SilenceDetector for FfmpegSilenceDetector {
    async fn detect_nonsilent(&self, audio: &Path, config: &SilenceConfig) -> Result<Vec<(u64, u64)>> {
        let total_ms = (probe_duration(audio).await? * 1000.0).round() as u64;

        let file = audio
            .to_str()
            .ok_or_else(|| anyhow!("Non-UTF8 audio path: {}", audio.display()))?;
        let filter = format!(
            "silencedetect=noise={}dB:d={}",
            config.silence_thresh_db,
            config.min_silence_len_ms as f64 / 1000.0
        );

        let output = tokio::process::Command::new("ffmpeg")
            .args([
                "-hide_banner",
                "-nostats",
                "-i", file,
                "-af", &filter,
                "-f", "null",
                "-",
            ])
            .output()
            .await?;

        if !output.status.success() {
            return Err(anyhow!("silencedetect failed for {}", audio.display()));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let silences = parse_silencedetect_log(&stderr, total_ms)?;
        debug!("silencedetect reported {} silent ranges", silences.len());

        Ok(invert_silences(&silences, total_ms))
    }

    async fn duration(&self, audio: &Path) -> Result<f64> {
        probe_duration(audio).await
    }
}

/// Parse `silence_start:`/`silence_end:` pairs out of the filter log.
///
/// A trailing `silence_start` without a matching end means the file ends in
/// silence; it is closed at the total duration.
fn parse_silencedetect_log(log: &str, total_ms: u64) -> Result<Vec<(u64, u64)>> {
    let pattern = Regex::new(r"silence_(start|end): (-?[0-9]+(?:\.[0-9]+)?)")?;

    let mut silences = Vec::new();
    let mut open_start: Option<u64> = None;

    for captures in pattern.captures_iter(log) {
        let seconds: f64 = captures[2].parse()?;
        let at_ms = (seconds.max(0.0) * 1000.0).round() as u64;

        match (&captures[1], open_start) {
            ("start", _) => open_start = Some(at_ms),
            ("end", Some(start)) => {
                if at_ms > start {
                    silences.push((start, at_ms));
                }
                open_start = None;
            }
            ("end", None) => {
                // End without a start means silence from the very beginning.
                silences.push((0, at_ms));
            }
            _ => unreachable!(),
        }
    }

    if let Some(start) = open_start {
        if total_ms > start {
            silences.push((start, total_ms));
        }
    }

    Ok(silences)
}

/// Invert silent ranges into the complementary non-silent ranges over `[0, total_ms]`.
fn invert_silences(silences: &[(u64, u64)], total_ms: u64) -> Vec<(u64, u64)> {
    let mut nonsilent = Vec::new();
    let mut cursor = 0u64;

    for &(start, end) in silences {
        if start > cursor {
            nonsilent.push((cursor, start));
        }
        cursor = cursor.max(end);
    }

    if cursor < total_ms {
        nonsilent.push((cursor, total_ms));
    }

    nonsilent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_silencedetect_log() {
        let log = "\
[silencedetect @ 0x1] silence_start: 1.5\n\
[silencedetect @ 0x1] silence_end: 2.75 | silence_duration: 1.25\n\
[silencedetect @ 0x1] silence_start: 8.0\n";
        let silences = parse_silencedetect_log(log, 10_000).unwrap();
        assert_eq!(silences, vec![(1500, 2750), (8000, 10_000)]);
    }

    #[test]
    fn test_parse_handles_end_without_start() {
        let log = "silence_end: 3.0 | silence_duration: 3.0\n";
        let silences = parse_silencedetect_log(log, 10_000).unwrap();
        assert_eq!(silences, vec![(0, 3000)]);
    }

    #[test]
    fn test_invert_silences() {
        let nonsilent = invert_silences(&[(1500, 2750), (8000, 10_000)], 10_000);
        assert_eq!(nonsilent, vec![(0, 1500), (2750, 8000)]);
    }

    #[test]
    fn test_invert_with_no_silence_is_whole_file() {
        assert_eq!(invert_silences(&[], 5000), vec![(0, 5000)]);
    }

    #[test]
    fn test_invert_fully_silent_file_is_empty() {
        assert!(invert_silences(&[(0, 5000)], 5000).is_empty());
    }
}
