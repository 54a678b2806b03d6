//! Parallel batches of simulation runs.

use crate::run::runner::{RunOutcome, SimulationRunner};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// One entry of a batch manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchJob {
    pub name: String,
    pub model: PathBuf,
    pub weather: PathBuf,
}

/// Outcomes of a whole batch, in manifest order.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<(String, RunOutcome)>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|(_, o)| o.success)
    }

    pub fn failed_jobs(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.success)
            .map(|(name, _)| name.as_str())
    }
}

/// Loads a batch manifest from a JSON array of jobs.
pub fn load_jobs(path: &Path) -> Result<Vec<BatchJob>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch manifest: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse batch manifest: {}", path.display()))
}

/// Runs all jobs against the same runner configuration.
///
/// Each job gets its own output directory under `base_dir`, suffixed with a
/// random tag so repeated batches never clobber earlier results. A single
/// job runs inline; larger batches go through a dedicated worker pool sized
/// to `workers`, capped at the job count.
pub fn run_batch(
    runner: &SimulationRunner,
    jobs: &[BatchJob],
    base_dir: &Path,
    workers: usize,
) -> Result<BatchReport> {
    let dirs: Vec<PathBuf> = jobs.iter().map(|j| job_dir(base_dir, &j.name)).collect();

    let outcomes: Vec<(String, RunOutcome)> = if jobs.len() <= 1 {
        jobs.iter()
            .zip(&dirs)
            .map(|(job, dir)| Ok((job.name.clone(), runner.run(&job.model, &job.weather, dir)?)))
            .collect::<Result<_>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1).min(jobs.len()))
            .build()
            .context("Failed to build simulation worker pool")?;
        pool.install(|| {
            jobs.par_iter()
                .zip(&dirs)
                .map(|(job, dir)| {
                    Ok((job.name.clone(), runner.run(&job.model, &job.weather, dir)?))
                })
                .collect::<Result<_>>()
        })?
    };

    let failed = outcomes.iter().filter(|(_, o)| !o.success).count();
    info!(total = outcomes.len(), failed, "batch finished");
    Ok(BatchReport { outcomes })
}

fn job_dir(base_dir: &Path, name: &str) -> PathBuf {
    let tag = Uuid::new_v4().simple().to_string();
    base_dir.join(format!("{name}-{}", &tag[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn stub_jobs(dir: &Path, count: usize) -> Vec<BatchJob> {
        (0..count)
            .map(|i| {
                let model = dir.join(format!("model_{i}.idf"));
                std::fs::write(&model, "Version,\n  9.4;\n").unwrap();
                let weather = dir.join("site.epw");
                std::fs::write(&weather, "").unwrap();
                BatchJob {
                    name: format!("job_{i}"),
                    model,
                    weather,
                }
            })
            .collect()
    }

    #[test]
    fn test_load_jobs_manifest() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("jobs.json");
        std::fs::write(
            &manifest,
            r#"[{"name": "base", "model": "a.idf", "weather": "a.epw"}]"#,
        )
        .unwrap();
        let jobs = load_jobs(&manifest).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "base");
        assert_eq!(jobs[0].model, PathBuf::from("a.idf"));
    }

    #[test]
    fn test_job_dirs_are_unique() {
        let base = Path::new("/tmp/batches");
        let a = job_dir(base, "base");
        let b = job_dir(base, "base");
        assert_ne!(a, b);
        assert!(a.file_name().unwrap().to_string_lossy().starts_with("base-"));
    }

    #[test]
    fn test_batch_collects_failures_in_order() {
        let dir = tempdir().unwrap();
        let jobs = stub_jobs(dir.path(), 3);
        let runner = SimulationRunner::new("/nonexistent/engine-binary")
            .with_timeout(Duration::from_secs(1));

        let report = run_batch(&runner, &jobs, dir.path(), 2).unwrap();
        assert_eq!(report.outcomes.len(), 3);
        assert!(!report.all_succeeded());
        assert_eq!(report.failed_jobs().count(), 3);
        let names: Vec<_> = report.outcomes.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["job_0", "job_1", "job_2"]);
    }
}
