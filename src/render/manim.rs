use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::RenderConfig;
use crate::error::{Result, TaidanError};
use crate::files::is_usable_file;
use super::{SceneRendererTrait, SceneSpec};

/// Directory component the engine uses for per-animation fragments.
pub const PARTIAL_DIR_COMPONENT: &str = "partial_movie_files";

const SCENE_SPEC_FILENAME: &str = "scene.json";

/// Manim-based scene renderer adapter.
///
/// Writes the scene spec into the temp dir, invokes the renderer binary,
/// and locates the produced silent video under the engine's media layout.
pub struct ManimRenderer {
    config: RenderConfig,
}

impl ManimRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, spec_path: &Path, temp_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg("--spec").arg(spec_path)
            .arg("--media-dir").arg(temp_dir)
            .arg("--format").arg(&self.config.format)
            .arg("--quality").arg(&self.config.quality)
            .arg("--fps").arg(self.config.frame_rate.to_string())
            .arg("--disable-caching");
        cmd
    }

    /// Locate the rendered video: a non-empty video file under the temp
    /// dir that is not an animation fragment.
    fn find_rendered_video(&self, temp_dir: &Path) -> Option<PathBuf> {
        let extension = self.config.format.as_str();
        let mut candidates: Vec<PathBuf> = WalkDir::new(temp_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.path().to_path_buf())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(extension))
            .filter(|p| !p.components().any(|c| c.as_os_str() == PARTIAL_DIR_COMPONENT))
            .filter(|p| is_usable_file(p))
            .collect();

        candidates.sort();
        candidates.into_iter().next()
    }
}

#[async_trait]
impl SceneRendererTrait for ManimRenderer {
    async fn render(&self, spec: &SceneSpec, temp_dir: &Path) -> Result<PathBuf> {
        info!(
            "Rendering scene: {} cues, {:.2}s, quality {}",
            spec.cues.len(),
            spec.audio_duration,
            spec.quality
        );

        let spec_path = temp_dir.join(SCENE_SPEC_FILENAME);
        let spec_json = serde_json::to_string_pretty(spec)?;
        tokio::fs::write(&spec_path, spec_json).await?;
        debug!("Wrote scene spec: {}", spec_path.display());

        let mut cmd = self.build_command(&spec_path, temp_dir);
        debug!("Executing renderer: {:?}", cmd);

        let output = cmd.output()
            .map_err(|e| TaidanError::Render(format!("Failed to execute renderer: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Renderer exited abnormally: {}", output.status);
            return Err(TaidanError::Render(format!(
                "Renderer failed ({}): {}",
                output.status, stderr
            )));
        }

        match self.find_rendered_video(temp_dir) {
            Some(video) => {
                info!("Renderer produced: {}", video.display());
                Ok(video)
            }
            None => Err(TaidanError::Render(
                "Renderer reported success but produced no video".to_string(),
            )),
        }
    }

    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("--version")
            .output()
            .map_err(|e| TaidanError::Render(format!("Renderer not found: {}", e)))?;

        if output.status.success() {
            info!("Scene renderer is available");
            Ok(())
        } else {
            Err(TaidanError::Render("Renderer version check failed".to_string()))
        }
    }
}
