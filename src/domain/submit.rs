//! Submission seam
//!
//! Running `sbatch` is left to the caller. A [`Submitter`] receives the
//! rendered script text and reports back a [`JobHandle`].

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Acknowledgement printed by `sbatch` on success
const SUBMITTED_PREFIX: &str = "Submitted batch job";

/// Something that can queue a rendered batch script
pub trait Submitter {
    /// Submits the script text and returns a handle to the queued job
    fn submit(&self, script: &str) -> anyhow::Result<JobHandle>;
}

/// A submitted job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub job_id: String,
    pub submitted_at: DateTime<Utc>,
}

impl JobHandle {
    /// Creates a handle stamped with the current time
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            submitted_at: Utc::now(),
        }
    }

    /// Reads the job ID from `sbatch` output (`Submitted batch job 1234`)
    pub fn from_sbatch_output(stdout: &str) -> Option<Self> {
        stdout.lines().find_map(|line| {
            let rest = line.trim().strip_prefix(SUBMITTED_PREFIX)?;
            // `--clusters` appends " on cluster <name>"
            let id = rest.split_whitespace().next()?;
            id.chars().all(|c| c.is_ascii_digit()).then(|| Self::new(id))
        })
    }

    /// Default output file written by the scheduler for this job
    pub fn output_file(&self) -> PathBuf {
        PathBuf::from(format!("slurm-{}.out", self.job_id))
    }
}
