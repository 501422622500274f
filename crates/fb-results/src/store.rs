//! Run storage API.
//!
//! Layout: `<root>/<run_id>/manifest.json` and `<root>/<run_id>/timeseries.jsonl`,
//! one [`Sample`] per line.

use crate::types::RunManifest;
use crate::{ResultsError, ResultsResult};
use fb_controls::{Sample, SimulationResult};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store under the system temp directory.
    pub fn default_location() -> ResultsResult<Self> {
        Self::new(std::env::temp_dir().join("feedback-runs"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    /// The manifest is written last: a run only counts as stored once its
    /// samples are on disk.
    pub fn save_run(&self, manifest: &RunManifest, result: &SimulationResult) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let timeseries_path = run_dir.join("timeseries.jsonl");
        let mut timeseries_content = String::new();
        for sample in result {
            let line = serde_json::to_string(sample)?;
            timeseries_content.push_str(&line);
            timeseries_content.push('\n');
        }
        fs::write(timeseries_path, timeseries_content)?;

        let manifest_path = run_dir.join("manifest.json");
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(manifest_path, manifest_json)?;

        tracing::debug!(run_id = %manifest.run_id, samples = result.len(), "run saved");
        Ok(())
    }

    /// Manifest and samples of a run, checked against each other.
    pub fn load_run(&self, run_id: &str) -> ResultsResult<(RunManifest, SimulationResult)> {
        let manifest = self.load_manifest(run_id)?;
        let result = self.load_timeseries(run_id)?;
        check_complete(&manifest, &result)?;
        Ok((manifest, result))
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join("manifest.json");

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_timeseries(&self, run_id: &str) -> ResultsResult<SimulationResult> {
        let timeseries_path = self.run_dir(run_id).join("timeseries.jsonl");

        if !timeseries_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(timeseries_path)?;
        let mut samples = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                let sample: Sample = serde_json::from_str(line)?;
                samples.push(sample);
            }
        }

        Ok(SimulationResult { samples })
    }

    /// All stored runs, oldest first.
    pub fn list_runs(&self) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                match self.load_manifest(&run_id) {
                    Ok(manifest) => runs.push(manifest),
                    Err(e) => tracing::warn!(%run_id, error = %e, "skipping unreadable run"),
                }
            }
        }

        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

/// A stored run must hold `sample_count` samples running from 0 to the
/// requested horizon.
fn check_complete(manifest: &RunManifest, result: &SimulationResult) -> ResultsResult<()> {
    let incomplete = |what: String| ResultsError::Incomplete {
        run_id: manifest.run_id.clone(),
        what,
    };

    if result.len() != manifest.sample_count || result.len() != manifest.request.sample_count {
        return Err(incomplete(format!(
            "{} samples stored, {} expected",
            result.len(),
            manifest.request.sample_count
        )));
    }
    let (Some(first), Some(last)) = (result.first(), result.last()) else {
        return Err(incomplete("no samples stored".to_string()));
    };
    if first.time != 0.0 || last.time != manifest.request.horizon {
        return Err(incomplete(format!(
            "samples span [{}, {}], expected [0, {}]",
            first.time, last.time, manifest.request.horizon
        )));
    }
    Ok(())
}
