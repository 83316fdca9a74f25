use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{Result, TaidanError};

/// Maximum characters per segment for stable synthesis output.
const MAX_SEGMENT_CHARS: usize = 300;

/// One speaker turn in a dialogue script.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueSegment {
    pub speaker: String,
    pub text: String,
}

impl DialogueSegment {
    /// Render back to the `[Sx]text` script line format.
    pub fn to_line(&self) -> String {
        format!("[{}]{}", self.speaker, self.text)
    }
}

/// An ordered dialogue script of speaker-tagged segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogueScript {
    pub segments: Vec<DialogueSegment>,
}

impl DialogueScript {
    /// Parse script text: one `[Sx]text` line per segment.
    ///
    /// Lines without a tag are attributed by alternating from the previous
    /// speaker; a leading untagged line starts with S1. Comment lines
    /// (`#`, `*`) and blank lines are skipped.
    pub fn parse(content: &str) -> Self {
        let mut segments: Vec<DialogueSegment> = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('*') {
                continue;
            }

            if let Some((speaker, text)) = split_tagged_line(line) {
                segments.push(DialogueSegment { speaker, text });
            } else {
                let speaker = match segments.last() {
                    Some(prev) if prev.speaker == "S1" => "S2".to_string(),
                    Some(_) => "S1".to_string(),
                    None => "S1".to_string(),
                };
                segments.push(DialogueSegment {
                    speaker,
                    text: line.to_string(),
                });
            }
        }

        debug!("Parsed {} dialogue segments", segments.len());
        DialogueScript { segments }
    }

    /// Validate the script for synthesis: at least two segments, well-formed
    /// speaker ids, and per-segment length within bounds.
    pub fn validate(&self) -> Result<()> {
        if self.segments.len() < 2 {
            return Err(TaidanError::Dialogue(format!(
                "Dialogue needs at least 2 segments, found {}",
                self.segments.len()
            )));
        }

        for (i, segment) in self.segments.iter().enumerate() {
            if !is_valid_speaker_id(&segment.speaker) {
                return Err(TaidanError::Dialogue(format!(
                    "Segment {} has invalid speaker id '{}'",
                    i + 1,
                    segment.speaker
                )));
            }

            let text = segment.text.trim();
            if text.is_empty() {
                return Err(TaidanError::Dialogue(format!("Segment {} is empty", i + 1)));
            }
            if text.chars().count() > MAX_SEGMENT_CHARS {
                return Err(TaidanError::Dialogue(format!(
                    "Segment {} too long for synthesis: {} chars (max {})",
                    i + 1,
                    text.chars().count(),
                    MAX_SEGMENT_CHARS
                )));
            }
        }

        Ok(())
    }

    /// Distinct speaker ids in order of first appearance.
    pub fn speakers(&self) -> Vec<String> {
        let mut speakers = Vec::new();
        for segment in &self.segments {
            if !speakers.contains(&segment.speaker) {
                speakers.push(segment.speaker.clone());
            }
        }
        speakers
    }

    /// Render to script text, one tagged line per segment.
    pub fn to_text(&self) -> String {
        let mut text = self
            .segments
            .iter()
            .map(|s| s.to_line())
            .collect::<Vec<_>>()
            .join("\n");
        text.push('\n');
        text
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TaidanError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path).await?;
        let script = Self::parse(&content);
        info!("Loaded dialogue script: {} ({} segments)", path.display(), script.segments.len());
        Ok(script)
    }

    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_text()).await?;
        info!("Saved dialogue script: {}", path.display());
        Ok(())
    }

    /// Truncate to the configured segment cap, warning when content is lost.
    pub fn truncate(&mut self, max_segments: usize) {
        if self.segments.len() > max_segments {
            warn!(
                "Truncating dialogue from {} to {} segments",
                self.segments.len(),
                max_segments
            );
            self.segments.truncate(max_segments);
        }
    }
}

fn split_tagged_line(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix('[')?;
    let close = rest.find(']')?;
    let tag = &rest[..close];
    if !is_valid_speaker_id(tag) {
        return None;
    }
    Some((tag.to_string(), rest[close + 1..].trim().to_string()))
}

fn is_valid_speaker_id(id: &str) -> bool {
    let mut chars = id.chars();
    matches!(chars.next(), Some('S')) && {
        let digits: String = chars.collect();
        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
    }
}
