use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// SRT (SubRip Subtitle) entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrtEntry {
    /// Sequential number
    pub index: u32,
    /// Start timestamp
    pub start: Duration,
    /// End timestamp
    pub end: Duration,
    /// Subtitle text
    pub text: String,
}

impl SrtEntry {
    pub fn new(index: u32, start: Duration, end: Duration, text: String) -> Self {
        Self {
            index,
            start,
            end,
            text: text.trim().to_string(),
        }
    }
}

impl fmt::Display for SrtEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{} --> {}\n{}\n",
            self.index,
            format_timestamp(self.start),
            format_timestamp(self.end),
            self.text
        )
    }
}

/// A timestamped text segment as produced by a speech-to-text engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub text: String,
}

/// In-memory SRT document: parser, generator, and formatter
#[derive(Debug, Clone, Default)]
pub struct SrtFile {
    entries: Vec<SrtEntry>,
}

impl SrtFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse SRT content.
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = Vec::new();

        for block in content.replace("\r\n", "\n").split("\n\n") {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }

            let mut lines = block.lines();
            let index: u32 = lines
                .next()
                .ok_or_else(|| anyhow!("Empty subtitle block"))?
                .trim()
                .parse()
                .map_err(|_| anyhow!("Invalid subtitle index in block: {:?}", block))?;

            let timing = lines
                .next()
                .ok_or_else(|| anyhow!("Subtitle {} has no timing line", index))?;
            let (raw_start, raw_end) = timing
                .split_once("-->")
                .ok_or_else(|| anyhow!("Subtitle {} has a malformed timing line: {:?}", index, timing))?;

            let text = lines.collect::<Vec<_>>().join("\n");
            entries.push(SrtEntry::new(
                index,
                parse_timestamp(raw_start.trim())?,
                parse_timestamp(raw_end.trim())?,
                text,
            ));
        }

        Ok(Self { entries })
    }

    /// Load and parse an SRT file from disk.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::parse(&content)
    }

    /// Build an SRT document from speech-to-text segments.
    pub fn from_segments(segments: &[TranscriptSegment]) -> Self {
        let entries = segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                SrtEntry::new(
                    (i + 1) as u32,
                    Duration::from_secs_f64(segment.start.max(0.0)),
                    Duration::from_secs_f64(segment.end.max(0.0)),
                    segment.text.clone(),
                )
            })
            .collect();
        Self { entries }
    }

    pub fn add_entry(&mut self, entry: SrtEntry) {
        self.entries.push(entry);
    }

    /// Sort entries by start time and re-index from 1.
    pub fn sort_entries(&mut self) {
        self.entries.sort_by(|a, b| a.start.cmp(&b.start));
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.index = (i + 1) as u32;
        }
    }

    /// Generate SRT content as string
    pub fn generate(&self) -> String {
        let mut content = String::new();
        for entry in &self.entries {
            content.push_str(&entry.to_string());
            content.push('\n');
        }
        content
    }

    /// Save SRT to file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        tokio::fs::write(path.as_ref(), self.generate()).await?;
        Ok(())
    }

    pub fn entries(&self) -> &[SrtEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// End of the last subtitle.
    pub fn total_duration(&self) -> Duration {
        self.entries
            .iter()
            .map(|entry| entry.end)
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

/// Parse an SRT timestamp: `HH:MM:SS,mmm`.
pub fn parse_timestamp(raw: &str) -> Result<Duration> {
    let (clock, millis) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("Invalid SRT timestamp: {:?}", raw))?;

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 {
        return Err(anyhow!("Invalid SRT timestamp: {:?}", raw));
    }

    let hours: u64 = parts[0].parse()?;
    let minutes: u64 = parts[1].parse()?;
    let seconds: u64 = parts[2].parse()?;
    let millis: u64 = millis.trim().parse()?;

    Ok(Duration::from_millis(
        ((hours * 3600 + minutes * 60 + seconds) * 1000) + millis,
    ))
}

/// Format a duration as an SRT timestamp: `HH:MM:SS,mmm`.
pub fn format_timestamp(duration: Duration) -> String {
    let total_millis = duration.as_millis();
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let seconds = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:01,500 --> 00:00:03,000\nHello there\n\n2\n00:00:04,000 --> 00:00:06,250\nSecond line\nwith a wrap\n";

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(
            parse_timestamp("01:02:03,456").unwrap(),
            Duration::from_millis(3_723_456)
        );
        assert!(parse_timestamp("01:02:03").is_err());
        assert!(parse_timestamp("1:2,3").is_err());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(Duration::from_millis(3_723_456)), "01:02:03,456");
        assert_eq!(format_timestamp(Duration::ZERO), "00:00:00,000");
    }

    #[test]
    fn test_parse_srt_content() {
        let srt = SrtFile::parse(SAMPLE).unwrap();
        assert_eq!(srt.len(), 2);
        assert_eq!(srt.entries()[0].text, "Hello there");
        assert_eq!(srt.entries()[0].start, Duration::from_millis(1500));
        assert_eq!(srt.entries()[1].text, "Second line\nwith a wrap");
        assert_eq!(srt.total_duration(), Duration::from_millis(6250));
    }

    #[test]
    fn test_parse_generate_round_trip() {
        let srt = SrtFile::parse(SAMPLE).unwrap();
        let regenerated = SrtFile::parse(&srt.generate()).unwrap();
        assert_eq!(regenerated.len(), srt.len());
        assert_eq!(regenerated.entries()[1].end, srt.entries()[1].end);
    }

    #[test]
    fn test_from_segments_indexes_from_one() {
        let segments = vec![
            TranscriptSegment {
                start: 0.0,
                end: 1.5,
                text: "first".to_string(),
            },
            TranscriptSegment {
                start: 1.5,
                end: 2.0,
                text: "second".to_string(),
            },
        ];
        let srt = SrtFile::from_segments(&segments);
        assert_eq!(srt.entries()[0].index, 1);
        assert_eq!(srt.entries()[1].index, 2);
        assert!(srt.generate().contains("00:00:01,500 --> 00:00:02,000"));
    }

    #[test]
    fn test_malformed_block_is_an_error() {
        assert!(SrtFile::parse("not a subtitle").is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        tokio_test::block_on(async {
            let temp_dir = tempfile::TempDir::new().unwrap();
            let path = temp_dir.path().join("subs.srt");

            let srt = SrtFile::parse(SAMPLE).unwrap();
            srt.save_to_file(&path).await.unwrap();

            let loaded = SrtFile::load(&path).await.unwrap();
            assert_eq!(loaded.len(), 2);
            assert_eq!(loaded.entries()[0].start, Duration::from_millis(1500));
        });
    }
}
