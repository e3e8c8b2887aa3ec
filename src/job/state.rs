//! The job entity and its snapshots

use crate::extractor::Credential;
use crate::job::types::{JobId, Progress, VehicleRecord};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

/// Number of trailing errors included in a snapshot
pub const RECENT_ERRORS: usize = 10;

/// Mutable part of a job, written only by its runner
#[derive(Debug)]
struct JobState {
    status: String,
    progress: Progress,
    results: Vec<VehicleRecord>,
    errors: Vec<String>,
    completed: bool,
    export_path: Option<PathBuf>,
    finished_at: Option<Instant>,
}

/// One competitive-analysis run
///
/// Identity, sources and credential are fixed at creation. Everything else
/// sits behind a single lock: the runner takes it briefly for each stage
/// transition and pollers take it once per [`Job::snapshot`]. The lock is
/// never held across an `.await`.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    sources: Vec<String>,
    credential: Credential,
    state: RwLock<JobState>,
}

/// Point-in-time view of a job, as reported to pollers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub status: String,
    pub progress: Progress,
    pub completed: bool,
    pub total_results: usize,
    pub total_errors: usize,
    /// The most recent errors, oldest first
    pub errors: Vec<String>,
    pub has_artifact: bool,
}

impl Job {
    /// Creates a job in its initial `starting` state
    pub fn new(id: JobId, sources: Vec<String>, credential: Credential) -> Self {
        let progress = Progress::new(sources.len());
        Self {
            id,
            sources,
            credential,
            state: RwLock::new(JobState {
                status: "starting".to_string(),
                progress,
                results: Vec::new(),
                errors: Vec::new(),
                completed: false,
                export_path: None,
                finished_at: None,
            }),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub(crate) fn credential(&self) -> &Credential {
        &self.credential
    }

    fn read(&self) -> RwLockReadGuard<'_, JobState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, JobState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Captures a consistent view of the job under one read lock
    pub fn snapshot(&self) -> JobSnapshot {
        let state = self.read();
        let tail_start = state.errors.len().saturating_sub(RECENT_ERRORS);

        JobSnapshot {
            job_id: self.id,
            status: state.status.clone(),
            progress: state.progress.clone(),
            completed: state.completed,
            total_results: state.results.len(),
            total_errors: state.errors.len(),
            errors: state.errors[tail_start..].to_vec(),
            has_artifact: state.export_path.is_some(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.read().completed
    }

    /// Location of the export artifact, set once the run finished successfully
    pub fn export_path(&self) -> Option<PathBuf> {
        self.read().export_path.clone()
    }

    pub fn results(&self) -> Vec<VehicleRecord> {
        self.read().results.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.read().errors.clone()
    }

    /// Returns true if the job reached a terminal state before `cutoff`
    pub(crate) fn finished_before(&self, cutoff: Instant) -> bool {
        self.read()
            .finished_at
            .map(|finished| finished < cutoff)
            .unwrap_or(false)
    }

    pub(crate) fn set_status(&self, status: impl Into<String>) {
        self.write().status = status.into();
    }

    /// Moves to source `index` (1-based), resetting the per-competitor counters
    pub(crate) fn begin_competitor(&self, label: &str, index: usize) {
        let mut state = self.write();
        state.progress = Progress {
            current_competitor: label.to_string(),
            completed_competitors: index.saturating_sub(1),
            current_vdp: 0,
            total_vdps: 0,
            ..state.progress.clone()
        };
        state.status = format!("Parsing sitemap for {}", label);
    }

    pub(crate) fn set_total_vdps(&self, total: usize) {
        self.write().progress.total_vdps = total;
    }

    /// Moves to page `index` (1-based) of the current competitor
    pub(crate) fn begin_vdp(&self, index: usize) {
        let mut state = self.write();
        state.progress.current_vdp = index;
        state.status = format!(
            "Processing {} - VDP {}/{}",
            state.progress.current_competitor, index, state.progress.total_vdps
        );
    }

    /// Appends a result and counts its page as processed
    pub(crate) fn record_result(&self, record: VehicleRecord) {
        let mut state = self.write();
        state.results.push(record);
        state.progress.processed_vdps += 1;
    }

    /// Appends a page error and counts the page as processed
    pub(crate) fn record_page_error(&self, message: String) {
        let mut state = self.write();
        state.errors.push(message);
        state.progress.processed_vdps += 1;
    }

    pub(crate) fn record_error(&self, message: String) {
        self.write().errors.push(message);
    }

    pub(crate) fn finish_competitor(&self, index: usize) {
        self.write().progress.completed_competitors = index;
    }

    /// Marks the run successful with its export artifact
    pub(crate) fn complete(&self, export_path: PathBuf) {
        let mut state = self.write();
        state.export_path = Some(export_path);
        state.status = "completed".to_string();
        state.completed = true;
        state.finished_at = Some(Instant::now());
    }

    /// Marks the run failed; it still counts as completed but has no artifact
    pub(crate) fn fail(&self, reason: &str) {
        let mut state = self.write();
        state.status = format!("error: {}", reason);
        state.errors.push(format!("Critical error: {}", reason));
        state.completed = true;
        state.finished_at = Some(Instant::now());
    }
}
