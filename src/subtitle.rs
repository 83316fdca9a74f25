use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

use crate::error::{Result, TaidanError};

/// A timed subtitle entry with speaker attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Speaker id, e.g. "S1"
    pub speaker: String,
    /// Dialogue text without the speaker tag
    pub text: String,
}

impl Cue {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Parse SRT content into cues ordered by start time.
///
/// Each block is an index line, a time range line, and one or more text
/// lines. A leading `[Sx]` tag on the text carries the speaker; untagged
/// text defaults to "S1".
pub fn parse_srt(srt_content: &str) -> Result<Vec<Cue>> {
    let mut cues = Vec::new();

    for block in srt_content.split("\n\n") {
        let mut lines = block.lines().filter(|l| !l.trim().is_empty());

        let Some(index_line) = lines.next() else {
            continue;
        };
        if index_line.trim().parse::<u64>().is_err() {
            return Err(TaidanError::Dialogue(format!(
                "Invalid subtitle index line: '{}'",
                index_line.trim()
            )));
        }

        let time_line = lines.next().ok_or_else(|| {
            TaidanError::Dialogue(format!("Subtitle block {} has no time range", index_line.trim()))
        })?;
        let (start, end) = parse_time_range(time_line)?;

        let text = lines.collect::<Vec<_>>().join("\n");
        if text.trim().is_empty() {
            return Err(TaidanError::Dialogue(format!(
                "Subtitle block {} has no text",
                index_line.trim()
            )));
        }

        let (speaker, clean_text) = split_speaker_tag(text.trim());
        cues.push(Cue {
            start,
            end,
            speaker,
            text: clean_text,
        });
    }

    cues.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));

    info!("Parsed {} subtitle cues", cues.len());
    Ok(cues)
}

/// Warn about cues of the same speaker whose time ranges overlap.
///
/// Overlap is surfaced but not rejected, so imperfect synthesizer timing
/// still produces a video.
pub fn check_overlaps(cues: &[Cue]) -> usize {
    let mut overlaps = 0;

    for (i, cue) in cues.iter().enumerate() {
        for other in cues.iter().skip(i + 1) {
            if other.start >= cue.end {
                break;
            }
            if other.speaker == cue.speaker {
                warn!(
                    "Overlapping cues for speaker {}: {:.3}s-{:.3}s and {:.3}s-{:.3}s",
                    cue.speaker, cue.start, cue.end, other.start, other.end
                );
                overlaps += 1;
            }
        }
    }

    overlaps
}

/// Generate SRT subtitle content from cues, re-applying speaker tags.
pub fn render_srt(cues: &[Cue]) -> String {
    let mut srt_content = String::new();

    for (index, cue) in cues.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n[{}]{}\n\n",
            index + 1,
            format_srt_time(cue.start),
            format_srt_time(cue.end),
            cue.speaker,
            cue.text.trim()
        ));
    }

    srt_content
}

/// Write cues to an SRT file.
pub async fn generate_srt<P: AsRef<Path>>(cues: &[Cue], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating SRT file: {}", output_path.display());

    fs::write(output_path, render_srt(cues)).await.map_err(TaidanError::Io)?;

    info!("SRT file generated successfully");
    Ok(())
}

fn split_speaker_tag(text: &str) -> (String, String) {
    if let Some(rest) = text.strip_prefix('[') {
        if let Some(close) = rest.find(']') {
            let tag = &rest[..close];
            if !tag.is_empty() && !tag.contains('[') {
                return (tag.to_string(), rest[close + 1..].trim().to_string());
            }
        }
    }
    ("S1".to_string(), text.to_string())
}

fn parse_time_range(line: &str) -> Result<(f64, f64)> {
    let mut parts = line.split("-->");
    let start = parts
        .next()
        .ok_or_else(|| TaidanError::Dialogue(format!("Invalid time range: '{}'", line)))?;
    let end = parts
        .next()
        .ok_or_else(|| TaidanError::Dialogue(format!("Invalid time range: '{}'", line)))?;

    Ok((parse_srt_time(start.trim())?, parse_srt_time(end.trim())?))
}

/// Parse SRT time format (HH:MM:SS,mmm) to seconds.
pub fn parse_srt_time(time_str: &str) -> Result<f64> {
    let normalized = time_str.replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() != 3 {
        return Err(TaidanError::Dialogue(format!("Invalid SRT time: '{}'", time_str)));
    }

    let hours: f64 = parts[0]
        .parse()
        .map_err(|_| TaidanError::Dialogue(format!("Invalid SRT time: '{}'", time_str)))?;
    let minutes: f64 = parts[1]
        .parse()
        .map_err(|_| TaidanError::Dialogue(format!("Invalid SRT time: '{}'", time_str)))?;
    let seconds: f64 = parts[2]
        .parse()
        .map_err(|_| TaidanError::Dialogue(format!("Invalid SRT time: '{}'", time_str)))?;

    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
pub fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0) as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(65.123), "00:01:05,123");
        assert_eq!(format_srt_time(3661.500), "01:01:01,500");
    }

    #[test]
    fn test_parse_srt_time() {
        assert_eq!(parse_srt_time("00:00:00,000").unwrap(), 0.0);
        assert_eq!(parse_srt_time("00:01:05,123").unwrap(), 65.123);
        assert_eq!(parse_srt_time("01:01:01,500").unwrap(), 3661.5);
        assert!(parse_srt_time("1:2").is_err());
    }

    #[test]
    fn test_parse_srt_with_speakers() {
        let srt = "1\n00:00:00,000 --> 00:00:02,500\n[S1]Hello there\n\n\
                   2\n00:00:02,500 --> 00:00:04,000\n[S2]Hi!\n\n";
        let cues = parse_srt(srt).unwrap();

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].speaker, "S1");
        assert_eq!(cues[0].text, "Hello there");
        assert_eq!(cues[0].start, 0.0);
        assert_eq!(cues[0].end, 2.5);
        assert_eq!(cues[1].speaker, "S2");
        assert!((cues[1].duration() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_srt_untagged_defaults_to_s1() {
        let srt = "1\n00:00:00,000 --> 00:00:01,000\nNo tag here\n\n";
        let cues = parse_srt(srt).unwrap();

        assert_eq!(cues[0].speaker, "S1");
        assert_eq!(cues[0].text, "No tag here");
    }

    #[test]
    fn test_parse_srt_orders_by_start() {
        let srt = "1\n00:00:05,000 --> 00:00:06,000\n[S1]Later\n\n\
                   2\n00:00:01,000 --> 00:00:02,000\n[S2]Earlier\n\n";
        let cues = parse_srt(srt).unwrap();

        assert_eq!(cues[0].text, "Earlier");
        assert_eq!(cues[1].text, "Later");
    }

    #[test]
    fn test_parse_srt_rejects_malformed_block() {
        assert!(parse_srt("not-an-index\n00:00:00,000 --> 00:00:01,000\nHi\n\n").is_err());
        assert!(parse_srt("1\nmissing arrow\nHi\n\n").is_err());
        assert!(parse_srt("1\n00:00:00,000 --> 00:00:01,000\n\n").is_err());
    }

    #[test]
    fn test_check_overlaps_same_speaker_only() {
        let cues = vec![
            Cue { start: 0.0, end: 2.0, speaker: "S1".to_string(), text: "a".to_string() },
            Cue { start: 1.0, end: 3.0, speaker: "S2".to_string(), text: "b".to_string() },
            Cue { start: 1.5, end: 4.0, speaker: "S1".to_string(), text: "c".to_string() },
        ];

        // S1/S2 overlap does not count, S1/S1 does
        assert_eq!(check_overlaps(&cues), 1);
    }

    #[tokio::test]
    async fn test_generate_srt_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subtitles.srt");
        let cues = vec![Cue {
            start: 0.0,
            end: 1.0,
            speaker: "S1".to_string(),
            text: "Hello".to_string(),
        }];

        generate_srt(&cues, &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("1\n00:00:00,000 --> 00:00:01,000\n[S1]Hello"));
    }

    #[test]
    fn test_render_srt_round_trip() {
        let cues = vec![
            Cue { start: 0.0, end: 2.5, speaker: "S1".to_string(), text: "Hello".to_string() },
            Cue { start: 2.5, end: 4.0, speaker: "S2".to_string(), text: "World".to_string() },
        ];

        let rendered = render_srt(&cues);
        let parsed = parse_srt(&rendered).unwrap();
        assert_eq!(parsed, cues);
    }
}
