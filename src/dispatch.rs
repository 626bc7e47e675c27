//! Batch dispatch: execute conversion jobs on a bounded worker pool.
//!
//! ## Failure isolation
//!
//! The dispatcher's central contract is that one job's failure never
//! touches its siblings. Every job produces exactly one [`JobResult`]:
//! collaborator errors become `Failure` outcomes, and a panic inside the
//! collaborator is caught and converted too, so the result count always
//! equals the job count and partial batch failure is a normal, fully
//! supported outcome rather than an aggregate error.
//!
//! ## Pool ownership
//!
//! The rayon `ThreadPool` is constructed inside the dispatch call, sized
//! to `min(workers, jobs)`, and dropped (joined) before the call returns
//! on every exit path. No process-global executor is involved, so
//! repeated batches in one process cannot leak pool state into each
//! other.
//!
//! Results are streamed to the caller's `on_result` callback in
//! completion order — not submission order — via an mpsc channel drained
//! on the calling thread while the workers run.

use crate::convert;
use crate::error::Pdf2CbzError;
use crate::jobs::ConversionJob;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Terminal state of one conversion job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    /// The job converted its input; `message` is the per-job report line.
    Success { message: String },
    /// The job failed; `message` describes the specific error. Sibling
    /// jobs are unaffected.
    Failure { message: String },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success { .. })
    }

    /// The report line, success or failure.
    pub fn message(&self) -> &str {
        match self {
            JobOutcome::Success { message } | JobOutcome::Failure { message } => message,
        }
    }
}

/// Result of one conversion job, produced exactly once per job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub outcome: JobOutcome,
}

/// Execute a batch of jobs with the built-in per-file converter.
///
/// See [`run_batch_with`] for the dispatch contract; this wrapper binds
/// the collaborator to [`crate::convert::convert_file`].
pub fn run_batch(
    jobs: Vec<ConversionJob>,
    workers: usize,
    on_result: impl FnMut(&JobResult),
) -> Result<Vec<JobResult>, Pdf2CbzError> {
    run_batch_with(jobs, workers, convert::convert_file, on_result)
}

/// Execute a batch of jobs via an arbitrary conversion collaborator.
///
/// Each job runs exactly once. A single job is executed synchronously in
/// the calling thread; larger batches run on a pool of at most `workers`
/// threads (capped at the job count — no job waits for a worker that will
/// never be needed). `on_result` is invoked on the calling thread for
/// each result as it completes, in completion order; the returned `Vec`
/// holds the same results in the same order.
///
/// # Errors
/// Only pool construction can fail. Conversion failures are captured in
/// the corresponding [`JobResult`] and never abort the batch.
pub fn run_batch_with<F>(
    mut jobs: Vec<ConversionJob>,
    workers: usize,
    convert: F,
    mut on_result: impl FnMut(&JobResult),
) -> Result<Vec<JobResult>, Pdf2CbzError>
where
    F: Fn(&ConversionJob) -> Result<String, crate::error::ConversionError>
        + Send
        + Sync
        + 'static,
{
    if jobs.is_empty() {
        return Ok(Vec::new());
    }

    if jobs.len() == 1 {
        // No pool overhead for a lone job.
        let job = jobs.remove(0);
        let result = execute_job(&convert, job);
        on_result(&result);
        return Ok(vec![result]);
    }

    let total = jobs.len();
    let workers = workers.clamp(1, total);
    info!("dispatching {total} job(s) across {workers} worker(s)");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| Pdf2CbzError::Internal(format!("failed to build worker pool: {e}")))?;

    let convert = Arc::new(convert);
    let (tx, rx) = mpsc::channel::<JobResult>();

    for job in jobs {
        let tx = tx.clone();
        let convert = Arc::clone(&convert);
        pool.spawn(move || {
            let result = execute_job(convert.as_ref(), job);
            // The receiver outlives every sender; a send can only fail if
            // the dispatcher itself unwound, in which case there is no one
            // left to report to.
            let _ = tx.send(result);
        });
    }
    drop(tx);

    let mut results = Vec::with_capacity(total);
    for result in rx {
        on_result(&result);
        results.push(result);
    }

    let failed = results.iter().filter(|r| !r.outcome.is_success()).count();
    info!(
        "batch complete: {}/{} succeeded",
        results.len() - failed,
        results.len()
    );

    // Every sender is gone, so every spawned task has finished; dropping
    // the pool here joins its threads.
    Ok(results)
}

/// Run one job to completion, converting errors and panics into outcomes.
fn execute_job<F>(convert: &F, job: ConversionJob) -> JobResult
where
    F: Fn(&ConversionJob) -> Result<String, crate::error::ConversionError>,
{
    debug!("job start: {}", job.input_path.display());

    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| convert(&job))) {
        Ok(Ok(message)) => JobOutcome::Success { message },
        Ok(Err(e)) => {
            warn!("job failed: {}: {e}", job.input_path.display());
            JobOutcome::Failure {
                message: e.to_string(),
            }
        }
        Err(payload) => {
            let message = panic_message(payload);
            warn!("job panicked: {}: {message}", job.input_path.display());
            JobOutcome::Failure { message }
        }
    };

    JobResult {
        input_path: job.input_path,
        output_path: job.output_path,
        outcome,
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "conversion worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use crate::error::ConversionError;
    use crate::jobs::Direction;
    use std::collections::BTreeSet;

    fn job(name: &str) -> ConversionJob {
        ConversionJob {
            input_path: PathBuf::from(format!("{name}.pdf")),
            output_path: PathBuf::from(format!("{name}.cbz")),
            direction: Direction::PdfToCbz,
            options: ConversionOptions::default(),
        }
    }

    fn fail_on_b(j: &ConversionJob) -> Result<String, ConversionError> {
        if j.input_path.to_string_lossy().contains('b') {
            Err(ConversionError::RenderFailed {
                page: 1,
                detail: "synthetic".into(),
            })
        } else {
            Ok(format!("converted {}", j.input_path.display()))
        }
    }

    #[test]
    fn empty_batch_yields_no_results() {
        let results = run_batch_with(Vec::new(), 4, fail_on_b, |_| {}).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn single_job_runs_synchronously() {
        let mut streamed = 0;
        let results = run_batch_with(vec![job("a")], 8, fail_on_b, |_| streamed += 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(streamed, 1);
        assert!(results[0].outcome.is_success());
    }

    #[test]
    fn one_result_per_job_despite_failures() {
        let jobs: Vec<_> = ["a", "b", "c", "d", "e"].iter().map(|n| job(n)).collect();
        let results = run_batch_with(jobs, 3, fail_on_b, |_| {}).unwrap();
        assert_eq!(results.len(), 5, "exactly one result per job");

        let failures: Vec<_> = results
            .iter()
            .filter(|r| !r.outcome.is_success())
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].input_path, PathBuf::from("b.pdf"));
    }

    #[test]
    fn failure_does_not_prevent_sibling_success() {
        let jobs: Vec<_> = ["a", "b", "c"].iter().map(|n| job(n)).collect();
        let results = run_batch_with(jobs, 2, fail_on_b, |_| {}).unwrap();
        let successes = results.iter().filter(|r| r.outcome.is_success()).count();
        assert_eq!(successes, 2);
    }

    #[test]
    fn worker_count_does_not_change_outcomes() {
        let inputs = ["a", "b", "c", "d", "e", "f", "g"];

        let outcomes = |workers: usize| -> BTreeSet<(String, bool)> {
            let jobs: Vec<_> = inputs.iter().map(|n| job(n)).collect();
            run_batch_with(jobs, workers, fail_on_b, |_| {})
                .unwrap()
                .into_iter()
                .map(|r| {
                    (
                        r.input_path.to_string_lossy().into_owned(),
                        r.outcome.is_success(),
                    )
                })
                .collect()
        };

        assert_eq!(outcomes(1), outcomes(4));
    }

    #[test]
    fn streamed_results_match_returned_results() {
        let jobs: Vec<_> = ["a", "b", "c", "d"].iter().map(|n| job(n)).collect();
        let mut streamed = Vec::new();
        let results = run_batch_with(jobs, 4, fail_on_b, |r| {
            streamed.push(r.input_path.clone());
        })
        .unwrap();

        let returned: Vec<_> = results.iter().map(|r| r.input_path.clone()).collect();
        assert_eq!(streamed, returned, "callback order matches returned order");
    }

    #[test]
    fn panicking_job_becomes_failure() {
        fn panic_on_b(j: &ConversionJob) -> Result<String, ConversionError> {
            if j.input_path.to_string_lossy().contains('b') {
                panic!("boom");
            }
            Ok("ok".into())
        }

        let jobs: Vec<_> = ["a", "b", "c"].iter().map(|n| job(n)).collect();
        let results = run_batch_with(jobs, 2, panic_on_b, |_| {}).unwrap();

        assert_eq!(results.len(), 3, "panic must not lose a result");
        let failure = results
            .iter()
            .find(|r| !r.outcome.is_success())
            .expect("one failure");
        assert!(failure.outcome.message().contains("boom"));
    }

    #[test]
    fn excess_workers_are_harmless() {
        let jobs: Vec<_> = ["a", "c"].iter().map(|n| job(n)).collect();
        let results = run_batch_with(jobs, 64, fail_on_b, |_| {}).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.outcome.is_success()));
    }

    #[test]
    fn job_result_serialises() {
        let r = JobResult {
            input_path: PathBuf::from("a.pdf"),
            output_path: PathBuf::from("a.cbz"),
            outcome: JobOutcome::Success {
                message: "done".into(),
            },
        };
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("a.cbz"));
        assert!(json.contains("success"));
    }
}
