use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use crate::config::SynthConfig;
use crate::dialogue::DialogueScript;
use crate::error::{Result, TaidanError};
use crate::files::is_usable_file;
use super::SynthesizerTrait;

/// FireRedTTS2 dialogue CLI adapter.
///
/// The engine reads a speaker-tagged script and per-speaker voice prompts,
/// and writes the narration WAV plus an SRT whose cue timings follow the
/// generated speech.
pub struct FireRedSynthesizer {
    config: SynthConfig,
}

impl FireRedSynthesizer {
    pub fn new(config: SynthConfig) -> Self {
        Self { config }
    }

    fn build_command(
        &self,
        script_path: &Path,
        audio_path: &Path,
        srt_path: &Path,
    ) -> Command {
        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg("--gen-type").arg("dialogue")
            .arg("--pretrained-dir").arg(&self.config.model_dir)
            .arg("--script").arg(script_path)
            .arg("--sample-rate").arg(self.config.sample_rate.to_string())
            .arg("--temperature").arg(self.config.temperature.to_string())
            .arg("--topk").arg(self.config.topk.to_string());

        for prompt in &self.config.voice_prompts {
            cmd.arg("--prompt-wav").arg(&prompt.audio_path);
            cmd.arg("--prompt-text").arg(format!("[{}]{}", prompt.speaker, prompt.text));
        }

        cmd.arg("--output-audio").arg(audio_path)
            .arg("--output-srt").arg(srt_path);
        cmd
    }

    fn validate_voice_prompts(&self) -> Result<()> {
        for prompt in &self.config.voice_prompts {
            let path = Path::new(&prompt.audio_path);
            if !path.exists() {
                return Err(TaidanError::FileNotFound(prompt.audio_path.clone()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SynthesizerTrait for FireRedSynthesizer {
    async fn synthesize(
        &self,
        script: &DialogueScript,
        audio_path: &Path,
        srt_path: &Path,
    ) -> Result<()> {
        script.validate()?;
        self.validate_voice_prompts()?;

        info!(
            "Synthesizing dialogue: {} segments, {} voice prompts",
            script.segments.len(),
            self.config.voice_prompts.len()
        );

        // The engine consumes the script from a file, not stdin
        let temp_dir = tempfile::tempdir()
            .map_err(|e| TaidanError::Synth(format!("Failed to create temp directory: {}", e)))?;
        let script_path = temp_dir.path().join("script.txt");
        tokio::fs::write(&script_path, script.to_text()).await?;

        let mut cmd = self.build_command(&script_path, audio_path, srt_path);
        debug!("Executing synthesizer: {:?}", cmd);

        let output = cmd.output()
            .map_err(|e| TaidanError::Synth(format!("Failed to execute synthesizer: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TaidanError::Synth(format!("Synthesizer failed: {}", stderr)));
        }

        if !is_usable_file(audio_path) {
            return Err(TaidanError::Synth(format!(
                "Synthesizer produced no audio: {}",
                audio_path.display()
            )));
        }
        if !is_usable_file(srt_path) {
            return Err(TaidanError::Synth(format!(
                "Synthesizer produced no subtitles: {}",
                srt_path.display()
            )));
        }

        info!("Synthesis completed: {} / {}", audio_path.display(), srt_path.display());
        Ok(())
    }

    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("--version")
            .output()
            .map_err(|e| TaidanError::Synth(format!("Synthesizer not found: {}", e)))?;

        if output.status.success() {
            info!("Synthesizer is available");
            Ok(())
        } else {
            Err(TaidanError::Synth("Synthesizer version check failed".to_string()))
        }
    }

    async fn get_version_info(&self) -> Result<String> {
        let output = Command::new(&self.config.binary_path)
            .arg("--version")
            .output()
            .map_err(|e| TaidanError::Synth(format!("Failed to execute synthesizer: {}", e)))?;

        if output.status.success() {
            let version_info = String::from_utf8_lossy(&output.stdout);
            let first_line = version_info.lines().next().unwrap_or("Unknown version");
            Ok(first_line.to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(TaidanError::Synth(format!("Synthesizer version check failed: {}", stderr)))
        }
    }
}
