// Modular media processing architecture
//
// This module provides a clean abstraction over the external media tool:
// - Processor: ffmpeg/ffprobe implementation
// - Commands: command builders and abstractions

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Merge a silent video with an audio track into the final deliverable
    async fn combine_audio_video(
        &self,
        video_path: &Path,
        audio_path: &Path,
        output_path: &Path,
    ) -> Result<()>;

    /// Concatenate fragments listed in a concat demuxer file
    async fn concat_fragments(
        &self,
        list_file: &Path,
        output_path: &Path,
    ) -> Result<()>;

    /// Duration of a media file in seconds
    async fn probe_duration(&self, path: &Path) -> Result<f64>;

    /// Check if the media tool is available
    fn check_availability(&self) -> Result<()>;

    /// Get media tool version information
    async fn get_version_info(&self) -> Result<String>;

    /// Execute custom media processing command
    async fn execute_command(&self, command: MediaCommand) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (ffmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::FfmpegProcessor::new(config))
    }
}
