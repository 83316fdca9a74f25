use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, TaidanError};
use crate::files::is_usable_file;
use super::{MediaCommand, MediaCommandBuilder, MediaProcessorTrait};

/// Concrete media processor driving ffmpeg and ffprobe.
pub struct FfmpegProcessor {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl FfmpegProcessor {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }

    fn validate_combine_input(path: &Path, role: &str) -> Result<()> {
        if !path.exists() {
            return Err(TaidanError::Combine(format!(
                "{} input missing: {}",
                role,
                path.display()
            )));
        }
        if !is_usable_file(path) {
            return Err(TaidanError::Combine(format!(
                "{} input is zero-length: {}",
                role,
                path.display()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaProcessorTrait for FfmpegProcessor {
    /// Merge one silent video with one audio track. The video stream is
    /// copied, so the output preserves the video's duration; the audio is
    /// muxed from t=0. Re-running with the same inputs overwrites the same
    /// output path.
    async fn combine_audio_video(
        &self,
        video_path: &Path,
        audio_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        Self::validate_combine_input(video_path, "Video")?;
        Self::validate_combine_input(audio_path, "Audio")?;

        info!(
            "Combining audio {} with video {} -> {}",
            audio_path.display(),
            video_path.display(),
            output_path.display()
        );

        let command = self.command_builder.combine_audio_video(
            video_path,
            audio_path,
            output_path,
            &self.config.combine_options,
        );

        command
            .execute()
            .await
            .map_err(|e| TaidanError::Combine(e.to_string()))?;

        if !is_usable_file(output_path) {
            return Err(TaidanError::Combine(format!(
                "Combine produced no output: {}",
                output_path.display()
            )));
        }

        info!("Successfully created combined video: {}", output_path.display());
        Ok(())
    }

    /// Concatenate partial fragments listed in a concat demuxer file.
    async fn concat_fragments(&self, list_file: &Path, output_path: &Path) -> Result<()> {
        info!(
            "Concatenating fragments from {} -> {}",
            list_file.display(),
            output_path.display()
        );

        let command = self.command_builder.concat_fragments(list_file, output_path);
        command.execute().await?;

        info!("Fragment concatenation completed");
        Ok(())
    }

    /// Probe a media file's duration in seconds via ffprobe.
    async fn probe_duration(&self, path: &Path) -> Result<f64> {
        debug!("Probing duration of {}", path.display());

        if !path.exists() {
            return Err(TaidanError::FileNotFound(path.display().to_string()));
        }

        let command = MediaCommand::new(&self.config.probe_binary_path, "Duration probe")
            .arg("-v").arg("error")
            .arg("-show_entries").arg("format=duration")
            .arg("-of").arg("default=noprint_wrappers=1:nokey=1")
            .output(path);

        let stdout = command.execute_capture().await?;
        let duration: f64 = stdout.trim().parse().map_err(|_| {
            TaidanError::Media(format!("Unparseable duration '{}' for {}", stdout.trim(), path.display()))
        })?;

        debug!("Duration of {}: {:.2}s", path.display(), duration);
        Ok(duration)
    }

    /// Check if the media tool is available
    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| TaidanError::Media(format!("Media processor not found: {}", e)))?;

        if output.status.success() {
            info!("Media processor is available");
            Ok(())
        } else {
            Err(TaidanError::Media("Media processor version check failed".to_string()))
        }
    }

    /// Get media tool version information
    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| TaidanError::Media(format!("Failed to execute media processor: {}", e)))?;

        if output.status.success() {
            let version_info = String::from_utf8_lossy(&output.stdout);
            let first_line = version_info.lines().next().unwrap_or("Unknown version");
            Ok(first_line.to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(TaidanError::Media(format!("Media processor version check failed: {}", stderr)))
        }
    }

    /// Execute custom media processing command
    async fn execute_command(&self, command: MediaCommand) -> Result<()> {
        info!("Executing custom media processing command: {}", command.description);
        command.execute().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn test_processor() -> FfmpegProcessor {
        FfmpegProcessor::new(MediaConfig {
            binary_path: "ffmpeg".to_string(),
            probe_binary_path: "ffprobe".to_string(),
            combine_options: vec![],
        })
    }

    #[tokio::test]
    async fn test_combine_rejects_missing_video() {
        let temp = assert_fs::TempDir::new().unwrap();
        let audio = temp.child("audio.wav");
        audio.write_str("samples").unwrap();

        let result = test_processor()
            .combine_audio_video(
                &temp.path().join("missing.mp4"),
                audio.path(),
                &temp.path().join("out.mp4"),
            )
            .await;

        assert!(matches!(result, Err(TaidanError::Combine(_))));
    }

    #[tokio::test]
    async fn test_combine_rejects_zero_length_audio() {
        let temp = assert_fs::TempDir::new().unwrap();
        let video = temp.child("video_silent.mp4");
        video.write_str("frames").unwrap();
        let audio = temp.child("audio.wav");
        audio.touch().unwrap();

        let result = test_processor()
            .combine_audio_video(video.path(), audio.path(), &temp.path().join("out.mp4"))
            .await;

        assert!(matches!(result, Err(TaidanError::Combine(_))));
    }

    #[tokio::test]
    async fn test_probe_duration_missing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = test_processor().probe_duration(&temp.path().join("none.wav")).await;
        assert!(matches!(result, Err(TaidanError::FileNotFound(_))));
    }
}
