use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use crate::error::{Result, TaidanError};

// Default values for optional synthesis tuning fields
fn default_temperature() -> f32 {
    0.9
}

fn default_topk() -> u32 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub synth: SynthConfig,
    pub render: RenderConfig,
    pub media: MediaConfig,
    pub content: ContentConfig,
    pub files: FileConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Path to the dialogue TTS binary
    pub binary_path: String,
    /// Directory containing pretrained model files
    pub model_dir: String,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Sampling temperature passed to the synthesizer
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Top-k sampling passed to the synthesizer
    #[serde(default = "default_topk")]
    pub topk: u32,
    /// Voice prompt audio files, one per speaker in order (S1, S2, ...)
    pub voice_prompts: Vec<VoicePrompt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoicePrompt {
    /// Speaker id the prompt belongs to (e.g. "S1")
    pub speaker: String,
    /// Reference audio file for voice cloning
    pub audio_path: String,
    /// Transcript of the reference audio
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Path to the scene renderer binary
    pub binary_path: String,
    /// Render quality preset understood by the renderer
    pub quality: String,
    /// Output container format
    pub format: String,
    /// Resolution label used in the renderer's output layout (e.g. "720p30")
    pub resolution: String,
    /// Frames per second
    pub frame_rate: u32,
    /// Per-speaker text colors, hex RGB
    pub speaker_colors: HashMap<String, String>,
    /// Font size for the speaker label
    pub speaker_font_size: u32,
    /// Font size for the dialogue text
    pub text_font_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary
    pub probe_binary_path: String,
    /// Additional encoding options appended to the combine command
    pub combine_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// GitHub API base URL
    pub api_base: String,
    /// Optional GitHub token for authenticated requests
    pub github_token: Option<String>,
    /// Cache expiry for fetched repository content, in hours
    pub cache_hours: u64,
    /// Maximum README length forwarded to the converter, in characters
    pub max_readme_length: usize,
    /// Path to the LLM CLI used for dialogue conversion
    pub converter_binary: String,
    /// Timeout for a single conversion run, in seconds
    pub converter_timeout_secs: u64,
    /// Dialogue style: educational, casual, technical, marketing
    pub style: String,
    /// Dialogue length: short, medium, long
    pub length: String,
    /// Upper bound on generated dialogue segments
    pub max_segments: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// Base directory for run output folders
    pub output_base: String,
    /// Name of the temp subdirectory inside each run folder
    pub temp_subdir: String,
    /// Keep intermediate render files after a successful run
    pub keep_temp_files: bool,
    pub audio_filename: String,
    pub srt_filename: String,
    pub script_filename: String,
    pub silent_video_filename: String,
    pub final_video_filename: String,
}

impl Default for Config {
    fn default() -> Self {
        let mut speaker_colors = HashMap::new();
        speaker_colors.insert("S1".to_string(), "#3498db".to_string());
        speaker_colors.insert("S2".to_string(), "#2ecc71".to_string());
        speaker_colors.insert("S3".to_string(), "#f1c40f".to_string());
        speaker_colors.insert("S4".to_string(), "#9b59b6".to_string());

        Self {
            synth: SynthConfig {
                binary_path: "firered-tts".to_string(),
                model_dir: "./pretrained_models".to_string(),
                sample_rate: 24000,
                temperature: 0.9,
                topk: 30,
                voice_prompts: Vec::new(),
            },
            render: RenderConfig {
                binary_path: "manim-render".to_string(),
                quality: "medium_quality".to_string(),
                format: "mp4".to_string(),
                resolution: "720p30".to_string(),
                frame_rate: 30,
                speaker_colors,
                speaker_font_size: 24,
                text_font_size: 20,
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                probe_binary_path: "ffprobe".to_string(),
                combine_options: vec![
                    // Example encoding options users can customize:
                    // "-preset".to_string(), "medium".to_string(),
                    // "-crf".to_string(), "23".to_string(),
                ],
            },
            content: ContentConfig {
                api_base: "https://api.github.com".to_string(),
                github_token: None,
                cache_hours: 1,
                max_readme_length: 5000,
                converter_binary: "claude".to_string(),
                converter_timeout_secs: 120,
                style: "educational".to_string(),
                length: "medium".to_string(),
                max_segments: 24,
            },
            files: FileConfig {
                output_base: "output".to_string(),
                temp_subdir: "temp".to_string(),
                keep_temp_files: true,
                audio_filename: "audio.wav".to_string(),
                srt_filename: "subtitles.srt".to_string(),
                script_filename: "script.txt".to_string(),
                silent_video_filename: "video_silent.mp4".to_string(),
                final_video_filename: "final_video_with_audio.mp4".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TaidanError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| TaidanError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TaidanError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TaidanError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
