use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::dialogue::DialogueScript;
use crate::error::{Result, TaidanError};
use crate::files::{cleanup_temp, create_output_structure};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::recovery::{ensure_silent_video, RenderOutcome};
use crate::render::{SceneRendererFactory, SceneRendererTrait, SceneSpec};
use crate::report::{log_file_info, log_run_summary, StepTimer};
use crate::subtitle::{check_overlaps, parse_srt};
use crate::synth::{SynthesizerFactory, SynthesizerTrait};

const SALVAGE_LOG_FILENAME: &str = "salvage.log";

/// Artifacts of one completed pipeline run. The combined output is
/// produced exactly once per run and references one audio and one visual
/// artifact.
#[derive(Debug, Clone)]
pub struct PipelineArtifacts {
    pub output_dir: PathBuf,
    pub audio: PathBuf,
    pub subtitles: PathBuf,
    pub silent_video: PathBuf,
    pub final_video: PathBuf,
}

/// Sequential dialogue-to-video pipeline: synthesize narration, render the
/// scene, recover from partial render failures, and combine audio with
/// video. One run at a time; a failed step aborts the rest of the run.
pub struct Pipeline {
    config: Config,
    synth: Box<dyn SynthesizerTrait>,
    renderer: Box<dyn SceneRendererTrait>,
    media: Box<dyn MediaProcessorTrait>,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let synth = SynthesizerFactory::create_default(config.synth.clone());
        let renderer = SceneRendererFactory::create_renderer(config.render.clone());
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        // Check dependencies
        media.check_availability()?;

        Ok(Self {
            config,
            synth,
            renderer,
            media,
        })
    }

    /// Build a pipeline from explicit component implementations.
    pub fn with_components(
        config: Config,
        synth: Box<dyn SynthesizerTrait>,
        renderer: Box<dyn SceneRendererTrait>,
        media: Box<dyn MediaProcessorTrait>,
    ) -> Self {
        Self {
            config,
            synth,
            renderer,
            media,
        }
    }

    /// Run the full pipeline for a dialogue script file.
    pub async fn run(&self, script_path: &Path, base_name: &str) -> Result<PipelineArtifacts> {
        let run_id = Uuid::new_v4();
        let pipeline_start = Instant::now();
        info!("Starting pipeline run {} for {}", run_id, script_path.display());

        let script = DialogueScript::load(script_path).await?;
        script.validate()?;

        let dirs = create_output_structure(
            &self.config.files.output_base,
            base_name,
            &self.config.files.temp_subdir,
        )
        .await?;

        let script_copy = dirs.output_dir.join(&self.config.files.script_filename);
        script.save(&script_copy).await?;

        let audio_path = dirs.output_dir.join(&self.config.files.audio_filename);
        let srt_path = dirs.output_dir.join(&self.config.files.srt_filename);
        let silent_path = dirs.output_dir.join(&self.config.files.silent_video_filename);
        let final_path = dirs.output_dir.join(&self.config.files.final_video_filename);
        let salvage_log = dirs.output_dir.join(SALVAGE_LOG_FILENAME);

        timed("Generate dialogue audio and subtitles", {
            self.synth.synthesize(&script, &audio_path, &srt_path)
        })
        .await?;
        log_file_info(&audio_path);
        log_file_info(&srt_path);

        let silent_video = timed("Generate video animation from subtitles", async {
            self.render_silent_video(
                &srt_path,
                &audio_path,
                &dirs.temp_dir,
                &silent_path,
                &salvage_log,
                &run_id.to_string(),
            )
            .await
        })
        .await?;
        log_file_info(&silent_video);

        timed("Combine audio and video", {
            self.media.combine_audio_video(&silent_video, &audio_path, &final_path)
        })
        .await?;

        cleanup_temp(&dirs.temp_dir, self.config.files.keep_temp_files).await?;
        log_run_summary(&dirs.output_dir, &final_path, pipeline_start.elapsed().as_secs_f64());

        Ok(PipelineArtifacts {
            output_dir: dirs.output_dir,
            audio: audio_path,
            subtitles: srt_path,
            silent_video,
            final_video: final_path,
        })
    }

    /// Render the scene for an SRT file and ensure a usable silent video,
    /// salvaging fragments when the engine fails.
    async fn render_silent_video(
        &self,
        srt_path: &Path,
        audio_path: &Path,
        temp_dir: &Path,
        silent_path: &Path,
        salvage_log: &Path,
        run_id: &str,
    ) -> Result<PathBuf> {
        let srt_content = fs::read_to_string(srt_path).await?;
        let cues = parse_srt(&srt_content)?;
        if cues.is_empty() {
            return Err(TaidanError::Render("Subtitle file contains no cues".to_string()));
        }

        let overlaps = check_overlaps(&cues);
        if overlaps > 0 {
            warn!("Proceeding with {} overlapping same-speaker cues", overlaps);
        }

        let audio_duration = self.media.probe_duration(audio_path).await?;
        info!("Audio duration: {:.2} seconds", audio_duration);

        let spec = SceneSpec::from_cues(&cues, audio_duration, &self.config.render);

        let outcome = match self.renderer.render(&spec, temp_dir).await {
            Ok(video) => RenderOutcome::Complete(video),
            Err(e) => RenderOutcome::Failed { error: e.to_string() },
        };

        let produced = ensure_silent_video(
            outcome,
            temp_dir,
            silent_path,
            self.media.as_ref(),
            salvage_log,
            run_id,
        )
        .await?;

        // A complete render lands in temp; publish it next to the other
        // run artifacts. Salvaged video is already at the target path.
        if produced != silent_path {
            fs::copy(&produced, silent_path).await?;
        }

        Ok(silent_path.to_path_buf())
    }

    /// Synthesize narration and subtitles for a script without rendering.
    pub async fn synthesize(
        &self,
        script_path: &Path,
        audio_path: &Path,
        srt_path: &Path,
    ) -> Result<()> {
        let script = DialogueScript::load(script_path).await?;
        self.synth.synthesize(&script, audio_path, srt_path).await
    }

    /// Render a silent video for an existing SRT and audio pair.
    pub async fn render_from_srt(
        &self,
        srt_path: &Path,
        audio_path: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let temp_dir = output_dir.join(&self.config.files.temp_subdir);
        fs::create_dir_all(&temp_dir).await?;

        let silent_path = output_dir.join(&self.config.files.silent_video_filename);
        let salvage_log = output_dir.join(SALVAGE_LOG_FILENAME);
        let run_id = Uuid::new_v4().to_string();

        self.render_silent_video(
            srt_path,
            audio_path,
            &temp_dir,
            &silent_path,
            &salvage_log,
            &run_id,
        )
        .await
    }

    /// Combine a silent video with an audio track.
    pub async fn combine(
        &self,
        video_path: &Path,
        audio_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        self.media.combine_audio_video(video_path, audio_path, output_path).await
    }

    /// Salvage a silent video from the fragments of a failed render.
    pub async fn salvage(&self, temp_dir: &Path, output_path: &Path) -> Result<PathBuf> {
        let salvage_log = output_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(SALVAGE_LOG_FILENAME);
        let run_id = Uuid::new_v4().to_string();

        ensure_silent_video(
            RenderOutcome::Failed { error: "manual salvage requested".to_string() },
            temp_dir,
            output_path,
            self.media.as_ref(),
            &salvage_log,
            &run_id,
        )
        .await
    }
}

/// Run a pipeline step with start/finish logging and timing.
async fn timed<T, F>(step_name: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let timer = StepTimer::start(step_name);
    match fut.await {
        Ok(value) => {
            timer.finish();
            Ok(value)
        }
        Err(e) => {
            timer.fail(&e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaCommand;
    use crate::subtitle::Cue;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn test_config(output_base: &Path) -> Config {
        let mut config = Config::default();
        config.files.output_base = output_base.to_string_lossy().to_string();
        config.files.keep_temp_files = true;
        config
    }

    struct FakeSynth;

    #[async_trait]
    impl SynthesizerTrait for FakeSynth {
        async fn synthesize(
            &self,
            _script: &DialogueScript,
            audio_path: &Path,
            srt_path: &Path,
        ) -> Result<()> {
            std::fs::write(audio_path, "samples")?;
            let cues = vec![
                Cue { start: 0.0, end: 2.0, speaker: "S1".to_string(), text: "Hello".to_string() },
                Cue { start: 2.0, end: 4.0, speaker: "S2".to_string(), text: "Hi".to_string() },
            ];
            std::fs::write(srt_path, crate::subtitle::render_srt(&cues))?;
            Ok(())
        }

        fn check_availability(&self) -> Result<()> {
            Ok(())
        }

        async fn get_version_info(&self) -> Result<String> {
            Ok("fake-synth".to_string())
        }
    }

    /// Renderer that either completes with a video in temp or fails,
    /// optionally leaving fragments behind.
    struct FakeRenderer {
        complete: bool,
        leave_fragments: bool,
    }

    #[async_trait]
    impl SceneRendererTrait for FakeRenderer {
        async fn render(&self, _spec: &SceneSpec, temp_dir: &Path) -> Result<PathBuf> {
            if self.complete {
                let video = temp_dir.join("dialogue_video.mp4");
                std::fs::write(&video, "full-frames")?;
                return Ok(video);
            }
            if self.leave_fragments {
                let partial = temp_dir.join("partial_movie_files");
                std::fs::create_dir_all(&partial)?;
                std::fs::write(partial.join("0001.mp4"), "aa")?;
                std::fs::write(partial.join("0002.mp4"), "bb")?;
            }
            Err(TaidanError::Render("engine crashed".to_string()))
        }

        fn check_availability(&self) -> Result<()> {
            Ok(())
        }
    }

    struct FakeMedia {
        combines: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl MediaProcessorTrait for FakeMedia {
        async fn combine_audio_video(
            &self,
            video_path: &Path,
            audio_path: &Path,
            output_path: &Path,
        ) -> Result<()> {
            assert!(video_path.exists(), "combine must never run without a video");
            assert!(audio_path.exists(), "combine must never run without audio");
            self.combines.fetch_add(1, Ordering::SeqCst);
            std::fs::write(output_path, "combined")?;
            Ok(())
        }

        async fn concat_fragments(&self, list_file: &Path, output_path: &Path) -> Result<()> {
            let list = std::fs::read_to_string(list_file)?;
            let mut data = Vec::new();
            for line in list.lines() {
                let path = line.trim_start_matches("file '").trim_end_matches('\'');
                data.extend(std::fs::read(path)?);
            }
            std::fs::write(output_path, data)?;
            Ok(())
        }

        async fn probe_duration(&self, _path: &Path) -> Result<f64> {
            Ok(4.0)
        }

        fn check_availability(&self) -> Result<()> {
            Ok(())
        }

        async fn get_version_info(&self) -> Result<String> {
            Ok("fake-media".to_string())
        }

        async fn execute_command(&self, _command: MediaCommand) -> Result<()> {
            Ok(())
        }
    }

    async fn run_pipeline(
        complete: bool,
        leave_fragments: bool,
    ) -> (tempfile::TempDir, Arc<AtomicUsize>, Result<PipelineArtifacts>) {
        let base = tempfile::tempdir().unwrap();
        let combines = Arc::new(AtomicUsize::new(0));

        let pipeline = Pipeline::with_components(
            test_config(base.path()),
            Box::new(FakeSynth),
            Box::new(FakeRenderer { complete, leave_fragments }),
            Box::new(FakeMedia { combines: combines.clone() }),
        );

        let script_path = base.path().join("script.txt");
        std::fs::write(&script_path, "[S1]Hello\n[S2]Hi\n").unwrap();

        let result = pipeline.run(&script_path, "dialogue").await;
        (base, combines, result)
    }

    #[tokio::test]
    async fn test_run_with_complete_render() {
        let (_base, combines, result) = run_pipeline(true, false).await;
        let artifacts = result.unwrap();

        assert!(artifacts.final_video.exists());
        assert!(artifacts.silent_video.exists());
        assert!(artifacts.audio.exists());
        assert!(artifacts.subtitles.exists());
        assert_eq!(combines.load(Ordering::SeqCst), 1);
        // Complete render passed through: silent video holds the full frames
        assert_eq!(std::fs::read_to_string(&artifacts.silent_video).unwrap(), "full-frames");
        assert!(!artifacts.output_dir.join("salvage.log").exists());
    }

    #[tokio::test]
    async fn test_run_recovers_from_partial_render() {
        let (_base, combines, result) = run_pipeline(false, true).await;
        let artifacts = result.unwrap();

        assert!(artifacts.final_video.exists());
        assert_eq!(std::fs::read_to_string(&artifacts.silent_video).unwrap(), "aabb");
        assert_eq!(combines.load(Ordering::SeqCst), 1);

        let log = std::fs::read_to_string(artifacts.output_dir.join("salvage.log")).unwrap();
        assert!(log.contains("outcome=recovered"));
    }

    #[tokio::test]
    async fn test_run_aborts_when_unrecoverable() {
        let (_base, combines, result) = run_pipeline(false, false).await;

        assert!(matches!(result, Err(TaidanError::RenderUnrecoverable(_))));
        // Combine never ran, so no partial output was produced
        assert_eq!(combines.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_script() {
        let base = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::with_components(
            test_config(base.path()),
            Box::new(FakeSynth),
            Box::new(FakeRenderer { complete: true, leave_fragments: false }),
            Box::new(FakeMedia { combines: Arc::new(AtomicUsize::new(0)) }),
        );

        let script_path = base.path().join("script.txt");
        std::fs::write(&script_path, "[S1]only one segment\n").unwrap();

        let result = pipeline.run(&script_path, "dialogue").await;
        assert!(matches!(result, Err(TaidanError::Dialogue(_))));
    }

    #[tokio::test]
    async fn test_salvage_entry_point() {
        let base = tempfile::tempdir().unwrap();
        let temp_dir = base.path().join("temp");
        std::fs::create_dir_all(&temp_dir).unwrap();
        std::fs::write(temp_dir.join("0001.mp4"), "frag").unwrap();

        let pipeline = Pipeline::with_components(
            test_config(base.path()),
            Box::new(FakeSynth),
            Box::new(FakeRenderer { complete: false, leave_fragments: false }),
            Box::new(FakeMedia { combines: Arc::new(AtomicUsize::new(0)) }),
        );

        let output = base.path().join("video_silent.mp4");
        let produced = pipeline.salvage(&temp_dir, &output).await.unwrap();

        assert_eq!(produced, output);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "frag");
    }
}
