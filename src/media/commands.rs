use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{Result, TaidanError};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set input container format
    pub fn format<S: Into<String>>(self, format: S) -> Self {
        self.arg("-f").arg(format)
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy video stream
    pub fn copy_video(self) -> Self {
        self.video_codec("copy")
    }

    /// Copy all streams without re-encoding
    pub fn copy_streams(self) -> Self {
        self.arg("-c").arg("copy")
    }

    /// Limit tool log output
    pub fn quiet(self) -> Self {
        self.arg("-loglevel").arg("warning")
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);

        let output = cmd.output()
            .map_err(|e| TaidanError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TaidanError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr
            )));
        }

        Ok(())
    }

    /// Execute the command and capture stdout
    pub async fn execute_capture(&self) -> Result<String> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);

        let output = cmd.output()
            .map_err(|e| TaidanError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TaidanError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Builder for the media operations the pipeline needs
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build the audio/video combine command: copies the video stream and
    /// encodes the narration to AAC, so the output duration follows the
    /// video track and audio starts at t=0.
    pub fn combine_audio_video<P: AsRef<Path>>(
        &self,
        video_path: P,
        audio_path: P,
        output_path: P,
        additional_options: &[String],
    ) -> MediaCommand {
        let mut cmd = MediaCommand::new(&self.binary_path, "Audio/video combine")
            .overwrite()
            .input(&video_path)
            .input(&audio_path)
            .copy_video()
            .audio_codec("aac")
            .arg("-strict").arg("experimental")
            .quiet();

        for option in additional_options {
            cmd = cmd.arg(option);
        }

        cmd.output(output_path)
    }

    /// Build the fragment concatenation command over a concat demuxer file
    /// list, copying streams without re-encoding.
    pub fn concat_fragments<P: AsRef<Path>>(
        &self,
        list_file: P,
        output_path: P,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Fragment concatenation")
            .overwrite()
            .format("concat")
            .arg("-safe").arg("0")
            .input(list_file)
            .copy_streams()
            .quiet()
            .output(output_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check")
            .arg("-version")
    }

    /// Build custom command
    pub fn custom<S: Into<String>>(&self, description: S) -> MediaCommand {
        MediaCommand::new(&self.binary_path, description.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_combine_command_shape() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let cmd = builder.combine_audio_video(
            &PathBuf::from("video_silent.mp4"),
            &PathBuf::from("audio.wav"),
            &PathBuf::from("final.mp4"),
            &[],
        );

        assert_eq!(cmd.binary_path, "ffmpeg");
        let joined = cmd.args.join(" ");
        assert!(joined.starts_with("-y -i video_silent.mp4 -i audio.wav"));
        assert!(joined.contains("-c:v copy"));
        assert!(joined.contains("-c:a aac"));
        assert_eq!(cmd.args.last().unwrap(), "final.mp4");
    }

    #[test]
    fn test_combine_command_is_deterministic() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let a = builder.combine_audio_video(
            &PathBuf::from("v.mp4"),
            &PathBuf::from("a.wav"),
            &PathBuf::from("out.mp4"),
            &["-preset".to_string(), "medium".to_string()],
        );
        let b = builder.combine_audio_video(
            &PathBuf::from("v.mp4"),
            &PathBuf::from("a.wav"),
            &PathBuf::from("out.mp4"),
            &["-preset".to_string(), "medium".to_string()],
        );

        assert_eq!(a.args, b.args);
        // Overwrite flag makes re-runs land on the same output path
        assert!(a.args.contains(&"-y".to_string()));
    }

    #[test]
    fn test_concat_command_shape() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let cmd = builder.concat_fragments(
            &PathBuf::from("filelist.txt"),
            &PathBuf::from("video_silent.mp4"),
        );

        let joined = cmd.args.join(" ");
        assert!(joined.contains("-f concat -safe 0 -i filelist.txt"));
        assert!(joined.contains("-c copy"));
        assert_eq!(cmd.args.last().unwrap(), "video_silent.mp4");
    }
}
