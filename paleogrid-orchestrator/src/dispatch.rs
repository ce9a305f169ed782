//! Worker dispatcher
//!
//! Executes a batch of jobs across a bounded pool of worker tasks. Each
//! worker pulls one job at a time from a shared queue (chunk size one, so
//! slow jobs never strand a pile of fast ones behind them), runs its
//! external process to completion, then post-processes that job's artifact.
//!
//! Cancellation is cooperative: the token is checked between queue pops,
//! so a cancel stops admission of new jobs while every already-started
//! process is allowed to finish and have its outcome recorded. Jobs still
//! queued when the workers drain out are reported Cancelled, never started.

use crate::postprocess::PostProcessor;
use crate::process;
use paleogrid_core::domain::{BatchSummary, Job, JobOutcome, JobStatus};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Bounded worker pool executing one external process per job
pub struct Dispatcher {
    workers: usize,
    lower_priority: bool,
}

impl Dispatcher {
    /// Creates a dispatcher with `workers` concurrent slots
    pub fn new(workers: usize, lower_priority: bool) -> Self {
        Self {
            workers: workers.max(1),
            lower_priority,
        }
    }

    /// Runs the batch to quiescence and returns one outcome per job.
    ///
    /// One job's failure never aborts the batch; the failure is recorded
    /// and the worker moves on. Returns promptly after cancellation once
    /// all in-flight processes have exited.
    pub async fn run(
        &self,
        jobs: Vec<Job>,
        post: PostProcessor,
        cancel: CancellationToken,
    ) -> BatchSummary {
        let total = jobs.len();
        info!(jobs = total, workers = self.workers, "dispatching batch");

        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let outcomes = Arc::new(Mutex::new(Vec::with_capacity(total)));
        let post = Arc::new(post);

        let mut handles = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            let queue = Arc::clone(&queue);
            let outcomes = Arc::clone(&outcomes);
            let post = Arc::clone(&post);
            let cancel = cancel.clone();
            let lower_priority = self.lower_priority;

            handles.push(tokio::spawn(async move {
                loop {
                    if cancel.is_cancelled() {
                        debug!(worker_id, "cancellation observed, worker stopping");
                        break;
                    }
                    let job = queue.lock().expect("job queue poisoned").pop_front();
                    let Some(job) = job else {
                        debug!(worker_id, "queue drained, worker stopping");
                        break;
                    };

                    debug!(worker_id, time = job.time, "job started");
                    let outcome = execute_job(&job, lower_priority, &post).await;
                    match &outcome.status {
                        JobStatus::Succeeded => {
                            info!(worker_id, time = job.time, "job succeeded");
                        }
                        _ => {
                            error!(
                                worker_id,
                                time = job.time,
                                error = outcome.error.as_deref().unwrap_or(""),
                                "job failed"
                            );
                        }
                    }
                    outcomes.lock().expect("outcomes poisoned").push(outcome);
                }
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("worker task panicked: {e}");
            }
        }

        let cancellation_requested = cancel.is_cancelled();
        let mut outcomes = Arc::try_unwrap(outcomes)
            .expect("workers joined")
            .into_inner()
            .expect("outcomes poisoned");

        // Anything still queued was abandoned before starting.
        let abandoned = Arc::try_unwrap(queue)
            .expect("workers joined")
            .into_inner()
            .expect("job queue poisoned");
        for job in abandoned {
            outcomes.push(JobOutcome::cancelled(job.time));
        }

        let summary = BatchSummary {
            outcomes,
            cancellation_requested,
        };
        info!(summary = %summary.describe(), "batch complete");
        summary
    }
}

/// Runs one job: external process, then (only after it exits) the job's
/// post-processing plan
async fn execute_job(job: &Job, lower_priority: bool, post: &PostProcessor) -> JobOutcome {
    if let Err(e) = process::run(&job.command, lower_priority).await {
        return JobOutcome::failed(job.time, format!("{e:#}"));
    }
    if let Some(plan) = &job.artifact {
        if let Err(e) = post.run(plan).await {
            return JobOutcome::failed(job.time, e.to_string());
        }
    }
    JobOutcome::succeeded(job.time)
}
