use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: synthesize, render, and combine
    Run {
        /// Dialogue script file with [S1]/[S2] tagged lines
        #[arg(short, long)]
        script: PathBuf,

        /// Base name for the timestamped output folder
        #[arg(short, long, default_value = "dialogue")]
        base_name: String,
    },

    /// Fetch a GitHub repository and convert it to a dialogue script
    Fetch {
        /// Repository URL (https://github.com/owner/repo)
        #[arg(short, long)]
        repo: String,

        /// Output dialogue script file
        #[arg(short, long, default_value = "script.txt")]
        output: PathBuf,

        /// Use the static fallback dialogue when conversion fails
        #[arg(long)]
        allow_fallback: bool,
    },

    /// List trending repositories for a language
    Trending {
        /// Repository language filter
        #[arg(short, long, default_value = "python")]
        language: String,

        /// Number of repositories to list
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Prefetch README content for each listed repository
        #[arg(long)]
        prefetch: bool,
    },

    /// Synthesize narration audio and subtitles from a dialogue script
    Synth {
        /// Dialogue script file
        #[arg(short, long)]
        script: PathBuf,

        /// Output narration audio file
        #[arg(short, long)]
        audio: PathBuf,

        /// Output subtitle file
        #[arg(long)]
        srt: PathBuf,
    },

    /// Render a silent video from a subtitle file and its narration audio
    Render {
        /// Subtitle file carrying the cue timings
        #[arg(long)]
        srt: PathBuf,

        /// Narration audio file (used for total duration)
        #[arg(short, long)]
        audio: PathBuf,

        /// Output directory for the silent video and render temp files
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// Combine a silent video with a narration audio track
    Combine {
        /// Silent video file
        #[arg(long)]
        video: PathBuf,

        /// Narration audio file
        #[arg(short, long)]
        audio: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Salvage a silent video from the fragments of a failed render
    Salvage {
        /// Temp directory holding render fragments
        #[arg(short, long)]
        temp_dir: PathBuf,

        /// Output silent video file
        #[arg(short, long)]
        output: PathBuf,
    },
}
