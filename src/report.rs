use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::files::file_info;

/// Timer for one pipeline step: logs the start on creation and the elapsed
/// time when finished.
pub struct StepTimer {
    step_name: String,
    start: Instant,
}

impl StepTimer {
    pub fn start<S: Into<String>>(step_name: S) -> Self {
        let step_name = step_name.into();
        info!("Starting: {}", step_name);
        Self {
            step_name,
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn finish(self) {
        info!("Completed: {} ({:.2}s)", self.step_name, self.elapsed_secs());
    }

    pub fn fail(self, err: &dyn std::fmt::Display) {
        error!("Failed: {} ({:.2}s) - {}", self.step_name, self.elapsed_secs(), err);
    }
}

/// Log file name and size at info level, warning when the file is missing.
pub fn log_file_info(path: &Path) {
    if path.exists() {
        info!("{}", file_info(path));
    } else {
        warn!("{}", file_info(path));
    }
}

/// Log the final run summary: output location, final artifact, total time,
/// and the produced files.
pub fn log_run_summary(output_dir: &Path, final_file: &Path, total_secs: f64) {
    info!("{}", "=".repeat(60));
    info!("Pipeline completed successfully");
    info!("Output directory: {}", output_dir.display());
    info!("Final video: {}", file_info(final_file));
    info!("Total processing time: {:.2} seconds", total_secs);
    info!("{}", "=".repeat(60));

    info!("Generated files:");
    if let Ok(entries) = std::fs::read_dir(output_dir) {
        let mut files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        for path in files {
            info!("  - {}", file_info(&path));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_timer_elapsed() {
        let timer = StepTimer::start("test step");
        assert!(timer.elapsed_secs() >= 0.0);
        timer.finish();
    }
}
