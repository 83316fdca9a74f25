use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::error::Result;

/// Paths of one pipeline run: a timestamped output directory with a temp
/// subdirectory for intermediate render files.
#[derive(Debug, Clone)]
pub struct RunDirs {
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
}

/// Create the organized output folder structure for a run.
pub async fn create_output_structure(
    output_base: &str,
    base_name: &str,
    temp_subdir: &str,
) -> Result<RunDirs> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let output_dir = PathBuf::from(output_base).join(format!("{}_{}", base_name, timestamp));
    let temp_dir = output_dir.join(temp_subdir);

    info!("Creating output structure: {}", output_dir.display());

    fs::create_dir_all(&output_dir).await?;
    fs::create_dir_all(&temp_dir).await?;

    Ok(RunDirs { output_dir, temp_dir })
}

/// Remove the temp directory unless intermediates are being kept.
pub async fn cleanup_temp(temp_dir: &Path, keep_temp_files: bool) -> Result<()> {
    if !temp_dir.exists() {
        warn!("Temp directory does not exist: {}", temp_dir.display());
        return Ok(());
    }

    if keep_temp_files {
        info!("Keeping temp files in: {}", temp_dir.display());
        return Ok(());
    }

    info!("Removing temp directory: {}", temp_dir.display());
    fs::remove_dir_all(temp_dir).await?;
    Ok(())
}

/// Basic file information for logging: name and size in MB.
pub fn file_info(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    match path.metadata() {
        Ok(meta) => {
            let size_mb = meta.len() as f64 / (1024.0 * 1024.0);
            format!("{} ({:.2} MB)", name, size_mb)
        }
        Err(_) => format!("{} (not found)", name),
    }
}

/// True when the file exists and has non-zero length.
pub fn is_usable_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[tokio::test]
    async fn test_create_output_structure() {
        let base = tempfile::tempdir().unwrap();
        let base_str = base.path().to_string_lossy().to_string();

        let dirs = create_output_structure(&base_str, "dialogue", "temp").await.unwrap();

        assert!(dirs.output_dir.is_dir());
        assert!(dirs.temp_dir.is_dir());
        assert!(dirs
            .output_dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("dialogue_"));
        assert_eq!(dirs.temp_dir.parent().unwrap(), dirs.output_dir);
    }

    #[tokio::test]
    async fn test_cleanup_temp_removes_when_not_keeping() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("fragment.mp4").write_str("data").unwrap();

        cleanup_temp(temp.path(), false).await.unwrap();
        assert!(!temp.path().exists());

        // Deleted out from under assert_fs, so skip its own cleanup
        let _persist = temp.into_persistent();
    }

    #[tokio::test]
    async fn test_cleanup_temp_keeps_when_requested() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("fragment.mp4").write_str("data").unwrap();

        cleanup_temp(temp.path(), true).await.unwrap();
        assert!(temp.path().exists());
    }

    #[test]
    fn test_file_info() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("audio.wav");
        file.write_binary(&[0u8; 2048]).unwrap();

        let info = file_info(file.path());
        assert!(info.starts_with("audio.wav ("));
        assert!(info.ends_with("MB)"));

        let missing = file_info(&temp.path().join("nope.wav"));
        assert_eq!(missing, "nope.wav (not found)");
    }

    #[test]
    fn test_is_usable_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let empty = temp.child("empty.mp4");
        empty.touch().unwrap();
        let full = temp.child("full.mp4");
        full.write_str("frames").unwrap();

        assert!(!is_usable_file(empty.path()));
        assert!(is_usable_file(full.path()));
        assert!(!is_usable_file(&temp.path().join("missing.mp4")));
    }
}
