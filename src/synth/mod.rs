// Modular speech synthesis architecture
//
// This module drives the external dialogue TTS engine through a trait so
// the pipeline never depends on a specific synthesizer:
// - FireRed: FireRedTTS2 dialogue CLI implementation
//
// To add a new synthesis engine, implement SynthesizerTrait for it, add it
// to SynthesizerImplementation, and extend the factory.

pub mod firered;

use async_trait::async_trait;
use std::path::Path;

use crate::config::SynthConfig;
use crate::dialogue::DialogueScript;
use crate::error::Result;

/// Main trait for speech synthesis operations
#[async_trait]
pub trait SynthesizerTrait: Send + Sync {
    /// Synthesize a dialogue script into a narration WAV and a timed SRT.
    ///
    /// Both artifacts are written to the given paths; a missing or empty
    /// artifact is a synthesis error.
    async fn synthesize(
        &self,
        script: &DialogueScript,
        audio_path: &Path,
        srt_path: &Path,
    ) -> Result<()>;

    /// Check if the synthesizer is available
    fn check_availability(&self) -> Result<()>;

    /// Get synthesizer version information
    async fn get_version_info(&self) -> Result<String>;
}

/// Synthesizer implementation type
#[derive(Debug, Clone)]
pub enum SynthesizerImplementation {
    FireRed,
    // Future implementations can be added here:
    // Piper,
    // Coqui,
}

/// Factory for creating synthesizer instances
pub struct SynthesizerFactory;

impl SynthesizerFactory {
    /// Create a synthesizer based on implementation type
    pub fn create_synthesizer(
        implementation: SynthesizerImplementation,
        config: SynthConfig,
    ) -> Box<dyn SynthesizerTrait> {
        match implementation {
            SynthesizerImplementation::FireRed => {
                Box::new(firered::FireRedSynthesizer::new(config))
            }
        }
    }

    /// Create with default implementation
    pub fn create_default(config: SynthConfig) -> Box<dyn SynthesizerTrait> {
        Self::create_synthesizer(SynthesizerImplementation::FireRed, config)
    }
}
