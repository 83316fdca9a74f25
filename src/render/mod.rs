// Modular scene rendering architecture
//
// The animation engine is an external tool: the pipeline hands it a scene
// spec file describing the timed dialogue and expects a silent video in
// return. Rendering internals stay inside the engine.

pub mod manim;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::RenderConfig;
use crate::error::Result;
use crate::subtitle::Cue;

const DEFAULT_TEXT_COLOR: &str = "#ffffff";

/// One timed text entry of the scene, with its resolved speaker color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneCue {
    pub start: f64,
    pub end: f64,
    pub speaker: String,
    pub text: String,
    pub color: String,
}

/// Declarative scene description consumed by the renderer binary.
///
/// Serialized as JSON into the temp dir; the renderer owns layout and
/// animation, this spec only pins timings and styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSpec {
    /// Total narration length; the scene holds until this time
    pub audio_duration: f64,
    pub frame_rate: u32,
    pub quality: String,
    pub format: String,
    pub resolution: String,
    pub speaker_font_size: u32,
    pub text_font_size: u32,
    pub speaker_colors: HashMap<String, String>,
    pub cues: Vec<SceneCue>,
}

impl SceneSpec {
    pub fn from_cues(cues: &[Cue], audio_duration: f64, config: &RenderConfig) -> Self {
        let scene_cues = cues
            .iter()
            .map(|cue| SceneCue {
                start: cue.start,
                end: cue.end,
                speaker: cue.speaker.clone(),
                text: cue.text.clone(),
                color: config
                    .speaker_colors
                    .get(&cue.speaker)
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
            })
            .collect();

        Self {
            audio_duration,
            frame_rate: config.frame_rate,
            quality: config.quality.clone(),
            format: config.format.clone(),
            resolution: config.resolution.clone(),
            speaker_font_size: config.speaker_font_size,
            text_font_size: config.text_font_size,
            speaker_colors: config.speaker_colors.clone(),
            cues: scene_cues,
        }
    }
}

/// Main trait for scene rendering operations
#[async_trait]
pub trait SceneRendererTrait: Send + Sync {
    /// Render the scene into a silent video somewhere under the temp dir
    /// and return its path. An engine failure or missing output is a
    /// rendering error; partial fragments are left in place for salvage.
    async fn render(&self, spec: &SceneSpec, temp_dir: &Path) -> Result<PathBuf>;

    /// Check if the renderer is available
    fn check_availability(&self) -> Result<()>;
}

/// Factory for creating scene renderer instances
pub struct SceneRendererFactory;

impl SceneRendererFactory {
    /// Create the default scene renderer implementation
    pub fn create_renderer(config: RenderConfig) -> Box<dyn SceneRendererTrait> {
        Box::new(manim::ManimRenderer::new(config))
    }
}
