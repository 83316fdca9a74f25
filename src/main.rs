//! Taidan - Automated Dialogue-to-Video Workflow
//!
//! This is the main entry point for the Taidan application, which turns
//! speaker-tagged dialogue scripts into narrated, subtitled videos using a
//! speech synthesis engine, a scene renderer, and ffmpeg.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use taidan::cli::{Args, Commands};
use taidan::config::Config;
use taidan::content::{DialogueConverter, GitHubContentFetcher};
use taidan::pipeline::Pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    info!("Starting Taidan - Automated Dialogue-to-Video Workflow");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load taidan.toml from current directory first
            if std::path::Path::new("taidan.toml").exists() {
                info!("Found taidan.toml in current directory, loading...");
                Config::from_file("taidan.toml")?
            } else {
                Config::default()
            }
        }
    };

    // Execute command
    match args.command {
        Commands::Run { script, base_name } => {
            info!("Running pipeline for script: {}", script.display());

            let pipeline = Pipeline::new(config)?;
            let artifacts = pipeline.run(&script, &base_name).await?;

            println!("\nFinal video: {}", artifacts.final_video.display());
            println!("All files: {}", artifacts.output_dir.display());
        }
        Commands::Fetch { repo, output, allow_fallback } => {
            info!("Fetching repository content: {}", repo);

            let fetcher = GitHubContentFetcher::new(config.content.clone())?;
            let converter = DialogueConverter::new(config.content.clone());

            let content = fetcher.fetch_repository_content(&repo).await?;

            let script = match converter.convert(&content).await {
                Ok(script) => script,
                Err(e) if allow_fallback => {
                    info!("Conversion failed ({}), using fallback dialogue", e);
                    converter.fallback_dialogue(&content)
                }
                Err(e) => return Err(e.into()),
            };

            script.save(&output).await?;
            println!(
                "Wrote {} dialogue segments to {}",
                script.segments.len(),
                output.display()
            );
        }
        Commands::Trending { language, limit, prefetch } => {
            info!("Listing trending {} repositories...", language);

            let fetcher = GitHubContentFetcher::new(config.content.clone())?;

            if prefetch {
                let contents = fetcher.fetch_trending_content(&language, limit).await?;
                println!("\nTrending {} repositories (content cached):", language);
                println!("{:<40} {:<10} {:<50}", "Repository", "Stars", "Description");
                println!("{}", "-".repeat(100));
                for content in contents {
                    println!(
                        "{:<40} {:<10} {:<50}",
                        format!("{}/{}", content.owner, content.repo),
                        content.stars,
                        truncate(&content.description, 47)
                    );
                }
            } else {
                let repos = fetcher.trending_repos(&language, limit).await?;
                println!("\nTrending {} repositories:", language);
                println!("{:<40} {:<10} {:<50}", "Repository", "Stars", "Description");
                println!("{}", "-".repeat(100));
                for repo in repos {
                    println!(
                        "{:<40} {:<10} {:<50}",
                        repo.full_name,
                        repo.stargazers_count,
                        truncate(repo.description.as_deref().unwrap_or(""), 47)
                    );
                }
            }
        }
        Commands::Synth { script, audio, srt } => {
            info!("Synthesizing narration for: {}", script.display());

            let pipeline = Pipeline::new(config)?;
            pipeline.synthesize(&script, &audio, &srt).await?;

            println!("Narration: {}", audio.display());
            println!("Subtitles: {}", srt.display());
        }
        Commands::Render { srt, audio, output_dir } => {
            info!("Rendering silent video for: {}", srt.display());

            tokio::fs::create_dir_all(&output_dir).await?;
            let pipeline = Pipeline::new(config)?;
            let silent = pipeline.render_from_srt(&srt, &audio, &output_dir).await?;

            println!("Silent video: {}", silent.display());
        }
        Commands::Combine { video, audio, output } => {
            info!("Combining {} with {}", video.display(), audio.display());

            let pipeline = Pipeline::new(config)?;
            pipeline.combine(&video, &audio, &output).await?;

            println!("Combined video: {}", output.display());
        }
        Commands::Salvage { temp_dir, output } => {
            info!("Salvaging render fragments from: {}", temp_dir.display());

            let pipeline = Pipeline::new(config)?;
            let salvaged = pipeline.salvage(&temp_dir, &output).await?;

            println!("Salvaged silent video: {}", salvaged.display());
        }
    }

    info!("Taidan workflow completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let taidan_dir = std::env::current_dir()?.join(".taidan");
    let log_dir = taidan_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "taidan.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("taidan.log").display()
    );

    Ok(())
}

/// Truncate a string for table display
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
