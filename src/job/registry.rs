//! Job registry - process-wide store of jobs
//!
//! Constructed once at startup and shared with every request handler.
//! Creating a job spawns its runner on the tokio runtime; afterwards the
//! registry only hands out read access.

use crate::config::Config;
use crate::crawler::HttpFetcher;
use crate::extractor::{Credential, OpenAiProvider};
use crate::job::{Job, JobError, JobId, JobRunner};
use crate::output::CsvExportWriter;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Store of all jobs known to this process
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Arc<Job>>>,
    runner: Arc<JobRunner>,
    retention: Option<Duration>,
}

impl JobRegistry {
    /// Creates an empty registry
    ///
    /// # Arguments
    ///
    /// * `runner` - Runner shared by every job
    /// * `retention` - How long finished jobs are kept; `None` keeps them
    ///   for the lifetime of the process
    pub fn new(runner: JobRunner, retention: Option<Duration>) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            runner: Arc::new(runner),
            retention,
        }
    }

    /// Creates a registry backed by the HTTP fetcher, the chat-completions
    /// extractor and the CSV exporter described by `config`
    ///
    /// # Returns
    ///
    /// * `Ok(JobRegistry)` - Ready to accept jobs
    /// * `Err(ScoutError)` - An HTTP client could not be built
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let runner = JobRunner::new(
            Arc::new(HttpFetcher::new(config)?),
            Arc::new(OpenAiProvider::new(config)?),
            Arc::new(CsvExportWriter::new(&config.output.export_dir)),
            config.competitor.clone(),
            Duration::from_millis(config.scraper.page_delay_ms),
        );
        let retention = config.registry.job_retention_secs.map(Duration::from_secs);

        Ok(Self::new(runner, retention))
    }

    /// Creates a job and starts running it in the background
    ///
    /// Sources are trimmed and empty entries dropped before validation.
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(JobId)` - The job is registered and visible to [`JobRegistry::get`]
    /// * `Err(JobError::EmptySources)` - No non-empty source was given
    /// * `Err(JobError::MissingCredential)` - The credential is blank
    pub fn create(&self, sources: Vec<String>, credential: Credential) -> Result<JobId, JobError> {
        let sources: Vec<String> = sources
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if sources.is_empty() {
            return Err(JobError::EmptySources);
        }
        if credential.is_blank() {
            return Err(JobError::MissingCredential);
        }

        self.evict_expired();

        let job = Arc::new(Job::new(JobId::new(), sources, credential));
        let id = job.id();
        self.jobs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id, Arc::clone(&job));

        tracing::info!("Created job {} for {} source(s)", id, job.sources().len());
        self.spawn(job);

        Ok(id)
    }

    /// Runs the job on its own task
    ///
    /// The runner is awaited through a second task so a panic inside it is
    /// still turned into a terminal error state.
    fn spawn(&self, job: Arc<Job>) {
        let runner = Arc::clone(&self.runner);

        tokio::spawn(async move {
            let task = tokio::spawn({
                let job = Arc::clone(&job);
                async move { runner.run(job).await }
            });

            if let Err(e) = task.await {
                tracing::error!("Runner for job {} aborted: {}", job.id(), e);
                if !job.is_completed() {
                    job.fail("job runner aborted unexpectedly");
                }
            }
        });
    }

    /// Looks up a job by identifier
    pub fn get(&self, id: JobId) -> Result<Arc<Job>, JobError> {
        self.jobs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&id)
            .cloned()
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    /// Returns the export artifact of a finished job
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Location of the artifact
    /// * `Err(JobError::NotFound)` - Unknown job
    /// * `Err(JobError::NotCompleted)` - The job is still running
    /// * `Err(JobError::NoArtifact)` - The job failed before exporting
    pub fn artifact(&self, id: JobId) -> Result<PathBuf, JobError> {
        let job = self.get(id)?;
        if !job.is_completed() {
            return Err(JobError::NotCompleted(id));
        }
        job.export_path().ok_or(JobError::NoArtifact(id))
    }

    /// Number of jobs currently held
    pub fn len(&self) -> usize {
        self.jobs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops finished jobs older than the retention window, if one is set
    fn evict_expired(&self) {
        let Some(retention) = self.retention else {
            return;
        };
        let Some(cutoff) = Instant::now().checked_sub(retention) else {
            return;
        };

        let mut jobs = self
            .jobs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = jobs.len();
        jobs.retain(|_, job| !job.finished_before(cutoff));

        let evicted = before - jobs.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} finished job(s)", evicted);
        }
    }
}
