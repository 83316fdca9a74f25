use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, TaidanError};
use crate::files::is_usable_file;
use crate::media::MediaProcessorTrait;

const FRAGMENT_LIST_FILENAME: &str = "filelist.txt";

/// Result of a rendering attempt, as seen by the recovery step.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// The engine produced a complete silent video at this path.
    Complete(PathBuf),
    /// The engine terminated abnormally; fragments may remain in temp.
    Failed { error: String },
}

/// Produce a best-effort silent video from a rendering attempt.
///
/// A complete render passes through unchanged. A failed render is salvaged
/// by concatenating the usable fragments left in the temp dir into
/// `silent_path`; when nothing is salvageable the pipeline must abort, so
/// audio is never combined with a missing video. Either salvage outcome is
/// appended to the salvage log.
pub async fn ensure_silent_video(
    outcome: RenderOutcome,
    temp_dir: &Path,
    silent_path: &Path,
    media: &dyn MediaProcessorTrait,
    salvage_log: &Path,
    run_id: &str,
) -> Result<PathBuf> {
    match outcome {
        RenderOutcome::Complete(video) => Ok(video),
        RenderOutcome::Failed { error: render_error } => {
            warn!("Rendering failed: {}", render_error);
            info!("Attempting to recover using partial video files");

            let fragments = find_fragments(temp_dir, silent_path);
            if fragments.is_empty() {
                error!("No partial video files found");
                log_salvage(salvage_log, run_id, "unrecoverable", 0, Some(&render_error)).await?;
                return Err(TaidanError::RenderUnrecoverable(render_error));
            }

            info!("Found {} partial video files, combining", fragments.len());
            let list_file = temp_dir.join(FRAGMENT_LIST_FILENAME);
            write_fragment_list(&list_file, &fragments).await?;

            let concat_result = media.concat_fragments(&list_file, silent_path).await;
            let recovered = concat_result.is_ok() && is_usable_file(silent_path);

            if !recovered {
                let reason = match concat_result {
                    Err(e) => e.to_string(),
                    Ok(()) => "concatenation produced no output".to_string(),
                };
                error!("Failed to combine partial video files: {}", reason);
                log_salvage(salvage_log, run_id, "unrecoverable", fragments.len(), Some(&reason))
                    .await?;
                return Err(TaidanError::RenderUnrecoverable(reason));
            }

            info!("Successfully combined partial files into: {}", silent_path.display());
            log_salvage(salvage_log, run_id, "recovered", fragments.len(), None).await?;
            Ok(silent_path.to_path_buf())
        }
    }
}

/// Usable video fragments under the temp dir, ordered by path.
///
/// The engine numbers fragment files sequentially, so path order is play
/// order. Zero-length files and the target artifact itself are skipped.
pub fn find_fragments(temp_dir: &Path, silent_path: &Path) -> Vec<PathBuf> {
    let silent_name = silent_path.file_name();

    let mut fragments: Vec<PathBuf> = WalkDir::new(temp_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.path().to_path_buf())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("mp4"))
        .filter(|p| p != silent_path && p.file_name() != silent_name)
        .filter(|p| is_usable_file(p))
        .collect();

    fragments.sort();
    fragments
}

/// Write the ffmpeg concat demuxer file list.
async fn write_fragment_list(list_file: &Path, fragments: &[PathBuf]) -> Result<()> {
    let mut content = String::new();
    for fragment in fragments {
        let absolute = std::fs::canonicalize(fragment).unwrap_or_else(|_| fragment.clone());
        content.push_str(&format!("file '{}'\n", absolute.display()));
    }

    tokio::fs::write(list_file, content).await?;
    Ok(())
}

/// Append one salvage log entry.
async fn log_salvage(
    salvage_log: &Path,
    run_id: &str,
    outcome: &str,
    fragments: usize,
    reason: Option<&str>,
) -> Result<()> {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut entry = format!(
        "{} run={} outcome={} fragments={}",
        timestamp, run_id, outcome, fragments
    );
    if let Some(reason) = reason {
        entry.push_str(&format!(" reason={}", reason.replace('\n', " ")));
    }
    entry.push('\n');

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(salvage_log)
        .await?;
    file.write_all(entry.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
