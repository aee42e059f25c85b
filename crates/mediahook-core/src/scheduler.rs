use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info};
use uuid::Uuid;

/// Callback run by a scheduled job. Cloned into every run.
pub type JobFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },
    #[error("scheduler error: {0}")]
    Scheduler(String),
}

/// Convert a five-field cron expression into the six-field form the scheduler
/// expects by pinning seconds to 0. Six and seven field expressions pass through.
pub fn normalize_cron(expression: &str) -> Result<String, SchedulerError> {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    match fields.len() {
        5 => Ok(format!("0 {}", fields.join(" "))),
        6 | 7 => Ok(fields.join(" ")),
        n => Err(SchedulerError::InvalidCron {
            expression: expression.to_string(),
            reason: format!("expected 5 fields, found {}", n),
        }),
    }
}

/// The one background scheduler a plugin owns.
///
/// The scheduler is created lazily by the first job. [`PluginScheduler::shutdown`]
/// removes every job, stops the scheduler and drops it, so calling it before
/// registering jobs again makes re-initialization idempotent.
pub struct PluginScheduler {
    name: String,
    scheduler: Option<JobScheduler>,
    jobs: Vec<Uuid>,
    running: bool,
    recurring: usize,
    /// One-shot jobs that have not finished yet
    pending: Arc<AtomicUsize>,
}

impl PluginScheduler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scheduler: None,
            jobs: Vec::new(),
            running: false,
            recurring: 0,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    async fn ensure_scheduler(&mut self) -> Result<&JobScheduler, SchedulerError> {
        if self.scheduler.is_none() {
            let sched = JobScheduler::new()
                .await
                .map_err(|e| SchedulerError::Scheduler(e.to_string()))?;
            self.scheduler = Some(sched);
        }
        self.scheduler
            .as_ref()
            .ok_or_else(|| SchedulerError::Scheduler("scheduler unavailable".to_string()))
    }

    async fn add_job(&mut self, job: Job) -> Result<Uuid, SchedulerError> {
        let sched = self.ensure_scheduler().await?;
        let id = sched
            .add(job)
            .await
            .map_err(|e| SchedulerError::Scheduler(e.to_string()))?;
        self.jobs.push(id);
        Ok(id)
    }

    /// Run `job` once after `delay`.
    pub async fn add_one_shot(&mut self, delay: Duration, job: JobFn) -> Result<Uuid, SchedulerError> {
        let pending = self.pending.clone();
        let scheduled = Job::new_one_shot_async(delay, move |_uuid, _lock| {
            let job = job.clone();
            let pending = pending.clone();
            Box::pin(async move {
                job().await;
                pending.fetch_sub(1, Ordering::SeqCst);
            })
        })
        .map_err(|e| SchedulerError::Scheduler(e.to_string()))?;

        let id = self.add_job(scheduled).await?;
        self.pending.fetch_add(1, Ordering::SeqCst);
        info!(
            operation = "job_scheduled",
            scheduler = %self.name,
            delay_secs = delay.as_secs(),
            "One-shot job scheduled"
        );
        Ok(id)
    }

    /// Run `job` on every tick of `expression` (UTC).
    pub async fn add_cron(&mut self, expression: &str, job: JobFn) -> Result<Uuid, SchedulerError> {
        let schedule = normalize_cron(expression)?;
        let scheduled = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
            let job = job.clone();
            Box::pin(async move {
                job().await;
            })
        })
        .map_err(|e| SchedulerError::InvalidCron {
            expression: expression.to_string(),
            reason: e.to_string(),
        })?;

        let id = self.add_job(scheduled).await?;
        self.recurring += 1;
        info!(
            operation = "job_scheduled",
            scheduler = %self.name,
            cron = expression,
            "Recurring job scheduled"
        );
        Ok(id)
    }

    /// Start the scheduler if at least one job is registered.
    /// Returns whether the scheduler is running afterwards.
    pub async fn start_if_jobs(&mut self) -> Result<bool, SchedulerError> {
        if self.jobs.is_empty() {
            debug!(scheduler = %self.name, "No jobs registered, scheduler not started");
            return Ok(false);
        }
        if self.running {
            return Ok(true);
        }
        if let Some(ref sched) = self.scheduler {
            sched
                .start()
                .await
                .map_err(|e| SchedulerError::Scheduler(e.to_string()))?;
            self.running = true;
            info!(operation = "scheduler_started", scheduler = %self.name, jobs = self.jobs.len(), "Scheduler started");
        }
        Ok(self.running)
    }

    /// Remove all jobs, stop the scheduler and release it. Errors are logged.
    pub async fn shutdown(&mut self) {
        self.recurring = 0;
        // removed one-shots never fire, so their count starts over
        self.pending = Arc::new(AtomicUsize::new(0));

        let Some(mut sched) = self.scheduler.take() else {
            self.jobs.clear();
            self.running = false;
            return;
        };

        for id in self.jobs.drain(..) {
            if let Err(e) = sched.remove(&id).await {
                error!(scheduler = %self.name, job = %id, error = %e, "Failed to remove job");
            }
        }

        if self.running {
            if let Err(e) = sched.shutdown().await {
                error!(scheduler = %self.name, error = %e, "Failed to stop scheduler");
            }
        }
        self.running = false;
        debug!(operation = "scheduler_stopped", scheduler = %self.name, "Scheduler released");
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Running with a recurring job or a one-shot that has not fired yet.
    pub fn is_active(&self) -> bool {
        self.scheduler.is_some()
            && self.running
            && (self.recurring > 0 || self.pending.load(Ordering::SeqCst) > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn counting_job(counter: Arc<AtomicUsize>) -> JobFn {
        Arc::new(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        })
    }

    #[test]
    fn test_normalize_cron() {
        assert_eq!(normalize_cron("0 3 * * *").unwrap(), "0 0 3 * * *");
        assert_eq!(normalize_cron("  */5  * * * *").unwrap(), "0 */5 * * * *");
        assert_eq!(normalize_cron("30 0 3 * * *").unwrap(), "30 0 3 * * *");
        assert!(normalize_cron("every day").is_err());
        assert!(normalize_cron("").is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_malformed_cron_is_rejected() {
        let mut sched = PluginScheduler::new("test");
        let result = sched
            .add_cron("61 25 * * *", counting_job(Arc::new(AtomicUsize::new(0))))
            .await;
        assert!(matches!(result, Err(SchedulerError::InvalidCron { .. })));
        assert_eq!(sched.job_count(), 0);
        assert!(!sched.start_if_jobs().await.unwrap());
        assert!(!sched.is_active());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reinitialize_keeps_single_job() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut sched = PluginScheduler::new("test");

        for _ in 0..2 {
            sched.shutdown().await;
            sched.add_cron("0 3 * * *", counting_job(counter.clone())).await.unwrap();
            assert!(sched.start_if_jobs().await.unwrap());
        }

        assert_eq!(sched.job_count(), 1);
        assert!(sched.is_active());

        sched.shutdown().await;
        assert_eq!(sched.job_count(), 0);
        assert!(!sched.is_active());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_one_shot_runs() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut sched = PluginScheduler::new("test");
        sched
            .add_one_shot(Duration::from_millis(100), counting_job(counter.clone()))
            .await
            .unwrap();
        assert!(sched.start_if_jobs().await.unwrap());
        assert!(sched.is_active());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        // nothing left to run once the one-shot finished
        assert!(!sched.is_active());
        sched.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_without_scheduler_is_noop() {
        let mut sched = PluginScheduler::new("test");
        sched.shutdown().await;
        sched.shutdown().await;
        assert!(!sched.is_active());
    }
}
