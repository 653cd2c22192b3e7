//! Multi-pass retry scheduler
//!
//! This module handles:
//! - Sweeping the work set one URL at a time, in order
//! - Routing successful fetches to the persister
//! - Collecting failures into the next pass's work set
//! - Throttling with a per-pass delay that grows linearly with the pass number
//!
//! The delay is shared by every URL of a pass and applied after each attempt,
//! whatever its outcome. It is not per-URL backoff.

use crate::config::RetryConfig;
use crate::crawler::fetcher::{FetchOutcome, PageFetcher};
use crate::output::{PagePersister, SavedPage};
use crate::state::{WorkItem, WorkState};
use crate::ScribeError;
use std::time::Duration;

/// Pass budget and delay schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_passes: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy; at least one pass is always made
    pub fn new(max_passes: u32, base_delay: Duration) -> Self {
        Self {
            max_passes: max_passes.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_passes, config.base_delay())
    }

    pub fn max_passes(&self) -> u32 {
        self.max_passes
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay after each request in `pass` (1-indexed): `base_delay * pass`
    pub fn delay_for_pass(&self, pass: u32) -> Duration {
        self.base_delay * pass
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// One sweep over the pending URLs
#[derive(Debug)]
pub struct PassState {
    /// Pass number, starting at 1
    pub number: u32,

    /// Wait after each attempt in this pass
    pub delay: Duration,

    /// URLs to attempt, in order
    pub work_set: Vec<WorkItem>,
}

impl PassState {
    /// Opens a pass, putting last pass's failures back into the pending state
    pub fn new(
        number: u32,
        policy: &RetryPolicy,
        mut work_set: Vec<WorkItem>,
    ) -> Result<Self, ScribeError> {
        for item in &mut work_set {
            if item.state() == WorkState::FailedThisPass {
                item.requeue()?;
            }
        }

        Ok(Self {
            number,
            delay: policy.delay_for_pass(number),
            work_set,
        })
    }
}

/// Accumulated results of a scheduler run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Pages archived, in the order they succeeded
    pub saved: Vec<SavedPage>,

    /// URLs still failing after the last pass
    pub permanently_failed: Vec<WorkItem>,

    /// Number of passes actually started
    pub passes_run: u32,

    /// Total fetch attempts across all passes
    pub attempts: u32,
}

impl RunReport {
    pub fn success_count(&self) -> usize {
        self.saved.len()
    }

    pub fn failure_count(&self) -> usize {
        self.permanently_failed.len()
    }
}

/// Drives fetch attempts over a shrinking URL list
///
/// Exactly one URL is in flight at any time; the only suspension points are
/// the fetch, the persist and the inter-request delay.
pub struct RetryScheduler<'a, F: ?Sized, P: ?Sized> {
    policy: RetryPolicy,
    fetcher: &'a F,
    persister: &'a P,
}

impl<'a, F, P> RetryScheduler<'a, F, P>
where
    F: PageFetcher + ?Sized,
    P: PagePersister + ?Sized,
{
    pub fn new(policy: RetryPolicy, fetcher: &'a F, persister: &'a P) -> Self {
        Self {
            policy,
            fetcher,
            persister,
        }
    }

    /// Runs passes until nothing is pending or the pass budget is spent
    ///
    /// Per-URL failures never escape this method; the only error is an
    /// illegal work item transition.
    pub async fn run(&self, urls: Vec<String>) -> Result<RunReport, ScribeError> {
        let mut report = RunReport::default();
        let mut pending: Vec<WorkItem> = urls.into_iter().map(WorkItem::new).collect();
        let mut pass_number = 1;

        while !pending.is_empty() && pass_number <= self.policy.max_passes() {
            let pass = PassState::new(pass_number, &self.policy, pending)?;
            tracing::info!(
                "--- Starting Pass {}/{} | URLs to process: {} | Delay: {:.1}s ---",
                pass.number,
                self.policy.max_passes(),
                pass.work_set.len(),
                pass.delay.as_secs_f64()
            );

            pending = self.run_pass(pass, &mut report).await?;
            report.passes_run = pass_number;
            pass_number += 1;
        }

        for mut item in pending {
            item.abandon()?;
            tracing::debug!(
                "Giving up on {} after {} attempts",
                item.url,
                item.attempts()
            );
            report.permanently_failed.push(item);
        }

        Ok(report)
    }

    /// Attempts every URL of a pass and returns the ones that failed
    async fn run_pass(
        &self,
        pass: PassState,
        report: &mut RunReport,
    ) -> Result<Vec<WorkItem>, ScribeError> {
        let total = pass.work_set.len();
        let mut failed = Vec::new();

        for (index, mut item) in pass.work_set.into_iter().enumerate() {
            tracing::info!(
                "[Pass {} | {}/{}] Processing: {}",
                pass.number,
                index + 1,
                total,
                item.url
            );
            report.attempts += 1;

            let result = self.fetcher.fetch(&item.url).await;
            match FetchOutcome::classify(&item.url, result) {
                FetchOutcome::Success(record) => match self.persister.persist(record).await {
                    Ok(saved) => {
                        item.succeed()?;
                        report.saved.push(saved);
                    }
                    Err(e) => {
                        tracing::error!("  - Failed to save {}: {}. Adding to retry list.", item.url, e);
                        item.fail(e.to_string())?;
                        failed.push(item);
                    }
                },
                FetchOutcome::NoContent => {
                    tracing::warn!("  - Scrape failed or returned no content. Adding to retry list.");
                    item.fail("scrape failed or returned no content")?;
                    failed.push(item);
                }
                FetchOutcome::Failed(message) => {
                    tracing::error!("  - Error: {}. Adding to retry list.", message);
                    item.fail(message)?;
                    failed.push(item);
                }
            }

            tokio::time::sleep(pass.delay).await;
        }

        Ok(failed)
    }
}
