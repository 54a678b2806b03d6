//! Single simulation runs with timeout supervision.

use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Engines signal a clean run with this line on stdout.
const COMPLETION_MARKER: &str = "EnergyPlus Completed Successfully";
/// Marker of an unrecoverable error in the engine's error log.
const FATAL_MARKER: &str = "** Fatal";
/// A results database smaller than this is a truncated run.
const MIN_SQL_BYTES: u64 = 10 * 1024;

const ERR_LOG_NAME: &str = "eplusout.err";
const SQL_NAME: &str = "eplusout.sql";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Configuration for launching the external simulation engine.
#[derive(Debug, Clone)]
pub struct SimulationRunner {
    pub engine_path: PathBuf,
    /// Template preprocessor executable; looked up next to the engine
    /// when not set explicitly.
    pub expand_objects_path: Option<PathBuf>,
    pub timeout: Duration,
}

/// What one simulation run produced. Engine-side failures are reported
/// here, never as `Err` — only environment problems (missing files,
/// unwritable directories) abort with an error.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub success: bool,
    pub duration: Duration,
    pub output_dir: PathBuf,
    pub sql_path: Option<PathBuf>,
    pub err_log_path: Option<PathBuf>,
    pub message: String,
}

impl SimulationRunner {
    pub fn new(engine_path: impl Into<PathBuf>) -> Self {
        Self {
            engine_path: engine_path.into(),
            expand_objects_path: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs one model against one weather file, writing engine output
    /// into `out_dir` (created if absent).
    pub fn run(&self, model: &Path, weather: &Path, out_dir: &Path) -> Result<RunOutcome> {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output dir: {}", out_dir.display()))?;

        let model = self.preprocess(model, out_dir)?;
        let start = Instant::now();
        info!(
            model = %model.display(),
            weather = %weather.display(),
            "starting simulation"
        );

        let spawned = Command::new(&self.engine_path)
            .arg("-w")
            .arg(weather)
            .arg("-d")
            .arg(out_dir)
            .arg(&model)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                // A missing engine is a run failure, not a crash.
                warn!(engine = %self.engine_path.display(), error = %e, "engine spawn failed");
                return Ok(self.outcome(out_dir, start, false, format!("spawn failed: {e}")));
            }
        };

        let stdout = drain_pipe(child.stdout.take());
        let stderr = drain_pipe(child.stderr.take());

        let status = match self.supervise(&mut child)? {
            Some(status) => status,
            None => {
                warn!(timeout = ?self.timeout, "simulation timed out, killing engine");
                let _ = child.kill();
                let _ = child.wait();
                return Ok(self.outcome(
                    out_dir,
                    start,
                    false,
                    format!("timed out after {:?}", self.timeout),
                ));
            }
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();
        debug!(exit = ?status.code(), "engine exited");

        let (success, message) = self.classify(out_dir, &stdout, &stderr);
        Ok(self.outcome(out_dir, start, success, message))
    }

    /// Polls the child until it exits or the timeout elapses.
    /// `None` means the deadline passed with the child still running.
    fn supervise(&self, child: &mut Child) -> Result<Option<std::process::ExitStatus>> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait().context("Failed to poll engine process")? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Expands HVAC template records through the engine's preprocessor.
    ///
    /// The preprocessor only reads `in.idf` in its working directory, so the
    /// model is copied there and the expanded file is used when it appears.
    fn preprocess(&self, model: &Path, out_dir: &Path) -> Result<PathBuf> {
        let text = fs::read_to_string(model)
            .with_context(|| format!("Failed to read model file: {}", model.display()))?;
        if !text.contains("HVACTemplate:") {
            return Ok(model.to_path_buf());
        }

        let expander = match &self.expand_objects_path {
            Some(path) => path.clone(),
            None => self
                .engine_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("ExpandObjects"),
        };
        let staged = out_dir.join("in.idf");
        fs::copy(model, &staged)
            .with_context(|| format!("Failed to stage model for expansion: {}", staged.display()))?;

        let status = Command::new(&expander)
            .current_dir(out_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        let expanded = out_dir.join("expanded.idf");
        match status {
            Ok(s) if s.success() && expanded.is_file() => {
                info!(path = %expanded.display(), "expanded HVAC templates");
                Ok(expanded)
            }
            Ok(_) | Err(_) => {
                warn!(expander = %expander.display(), "template expansion failed, using raw model");
                Ok(model.to_path_buf())
            }
        }
    }

    /// Decides whether a finished run succeeded.
    ///
    /// Primary signal is the completion marker on stdout combined with the
    /// absence of fatal errors in the log; when stdout is unavailable a
    /// plausibly sized results database counts as success.
    fn classify(&self, out_dir: &Path, stdout: &str, stderr: &str) -> (bool, String) {
        let err_log = fs::read_to_string(out_dir.join(ERR_LOG_NAME)).unwrap_or_default();
        if err_log.contains(FATAL_MARKER) {
            return (false, "fatal error reported in engine log".to_string());
        }
        if stdout.contains(COMPLETION_MARKER) {
            return (true, "completed".to_string());
        }
        let sql_size = fs::metadata(out_dir.join(SQL_NAME)).map(|m| m.len());
        if let Ok(size) = sql_size {
            if size >= MIN_SQL_BYTES {
                return (true, "completed (results database present)".to_string());
            }
        }
        let detail = stderr.lines().last().unwrap_or("no completion marker");
        (false, format!("run did not complete: {detail}"))
    }

    fn outcome(
        &self,
        out_dir: &Path,
        start: Instant,
        success: bool,
        message: String,
    ) -> RunOutcome {
        let existing = |name: &str| {
            let path = out_dir.join(name);
            path.is_file().then_some(path)
        };
        RunOutcome {
            success,
            duration: start.elapsed(),
            output_dir: out_dir.to_path_buf(),
            sql_path: existing(SQL_NAME),
            err_log_path: existing(ERR_LOG_NAME),
            message,
        }
    }
}

/// Drains a child pipe on a background thread so the engine never blocks
/// on a full pipe buffer.
fn drain_pipe<R: Read + Send + 'static>(
    pipe: Option<R>,
) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut out = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut out);
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_engine_is_a_failed_outcome() {
        let dir = tempdir().unwrap();
        let model = dir.path().join("model.idf");
        fs::write(&model, "Version,\n  9.4;\n").unwrap();
        let weather = dir.path().join("site.epw");
        fs::write(&weather, "").unwrap();

        let runner = SimulationRunner::new("/nonexistent/engine-binary")
            .with_timeout(Duration::from_secs(1));
        let outcome = runner
            .run(&model, &weather, &dir.path().join("out"))
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.message.contains("spawn failed"));
    }

    #[test]
    fn test_classify_fatal_log_beats_completion_marker() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(ERR_LOG_NAME),
            "** Fatal ** Errors occurred\n",
        )
        .unwrap();
        let runner = SimulationRunner::new("engine");
        let (success, message) =
            runner.classify(dir.path(), "EnergyPlus Completed Successfully", "");
        assert!(!success);
        assert!(message.contains("fatal"));
    }

    #[test]
    fn test_classify_falls_back_to_results_database() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SQL_NAME), vec![0u8; 20 * 1024]).unwrap();
        let runner = SimulationRunner::new("engine");
        let (success, _) = runner.classify(dir.path(), "", "");
        assert!(success);
    }

    #[test]
    fn test_classify_rejects_truncated_database() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SQL_NAME), b"stub").unwrap();
        let runner = SimulationRunner::new("engine");
        let (success, _) = runner.classify(dir.path(), "", "");
        assert!(!success);
    }

    #[test]
    fn test_preprocess_passthrough_without_templates() {
        let dir = tempdir().unwrap();
        let model = dir.path().join("model.idf");
        fs::write(&model, "Version,\n  9.4;\n").unwrap();
        let runner = SimulationRunner::new("engine");
        let resolved = runner.preprocess(&model, dir.path()).unwrap();
        assert_eq!(resolved, model);
    }

    #[test]
    fn test_preprocess_survives_missing_expander() {
        let dir = tempdir().unwrap();
        let model = dir.path().join("model.idf");
        fs::write(&model, "HVACTemplate:Thermostat,\n  T1;\n").unwrap();
        let runner = SimulationRunner::new("/nonexistent/engine-binary");
        // Expander cannot be spawned; the raw model must still be usable.
        let resolved = runner.preprocess(&model, dir.path()).unwrap();
        assert_eq!(resolved, model);
        assert!(dir.path().join("in.idf").is_file());
    }
}
