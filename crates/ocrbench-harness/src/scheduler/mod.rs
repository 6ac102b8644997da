//! Bounded-concurrency dispatch of page recognition calls.
//!
//! All calls of a run are multiplexed on the calling task; nothing is
//! spawned. A counting semaphore admits at most `concurrency` calls at once
//! and each permit is released when its call finishes, fails, or is dropped.

mod config;
mod discipline;
mod outcome;
mod progress;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::future::join_all;
use futures::stream::FuturesUnordered;
use ocrbench_core::{OcrProvider, OcrResult, PreparedPage};
use tokio::sync::Semaphore;
use tokio::time::Instant;

pub use self::config::{SchedulerBuilder, SchedulerConfig};
pub use self::discipline::Discipline;
pub use self::outcome::{PageFailure, RunOutcome};
pub use self::progress::{Progress, ProgressFn};
use crate::TRACING_TARGET_SCHEDULER;
use crate::error::{Error, Result};

type Completion = (usize, ocrbench_core::Result<OcrResult>);

/// Drives an [`OcrProvider`] over many pages under a concurrency limit.
///
/// # Examples
///
/// ```rust,ignore
/// use ocrbench_harness::{Discipline, Scheduler, SchedulerConfig};
///
/// let config = SchedulerConfig::builder()
///     .with_concurrency(8usize)
///     .with_discipline(Discipline::Windowed)
///     .build()?;
///
/// let scheduler = Scheduler::new(client, config)
///     .with_progress(|p| println!("{}/{} pages", p.completed, p.total));
/// let outcome = scheduler.run(&pages).await?;
/// ```
pub struct Scheduler<P> {
    provider: P,
    config: SchedulerConfig,
    semaphore: Arc<Semaphore>,
    progress: Option<ProgressFn>,
}

impl<P> std::fmt::Debug for Scheduler<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .field("available_permits", &self.semaphore.available_permits())
            .finish_non_exhaustive()
    }
}

impl<P: OcrProvider> Scheduler<P> {
    /// Creates a scheduler over `provider`.
    pub fn new(provider: P, config: SchedulerConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));

        tracing::debug!(
            target: TRACING_TARGET_SCHEDULER,
            concurrency = config.concurrency,
            discipline = %config.discipline,
            fail_fast = config.fail_fast,
            "Scheduler initialized"
        );

        Self {
            provider,
            config,
            semaphore,
            progress: None,
        }
    }

    /// Registers a callback for progress events.
    pub fn with_progress(mut self, callback: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Returns the scheduler configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Returns the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Recognizes every page and returns the outcome in submission order.
    ///
    /// Page failures are collected into [`RunOutcome::failures`] unless the
    /// scheduler is configured to fail fast, in which case the first failure
    /// is returned as [`Error::PageFailed`] and calls still in flight are
    /// dropped.
    pub async fn run(&self, pages: &[PreparedPage]) -> Result<RunOutcome> {
        tracing::info!(
            target: TRACING_TARGET_SCHEDULER,
            pages = pages.len(),
            concurrency = self.config.concurrency,
            discipline = %self.config.discipline,
            "Starting run"
        );

        let mut state = RunState::new(pages.len());
        match self.config.discipline {
            Discipline::Windowed => self.run_windowed(pages, &mut state).await?,
            Discipline::Batched => self.run_batched(pages, &mut state).await?,
        }

        let outcome = state.finish(pages);

        tracing::info!(
            target: TRACING_TARGET_SCHEDULER,
            succeeded = outcome.results.len(),
            failed = outcome.failures.len(),
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Run finished"
        );

        Ok(outcome)
    }

    async fn run_windowed(&self, pages: &[PreparedPage], state: &mut RunState) -> Result<()> {
        let mut in_flight: FuturesUnordered<_> = pages
            .iter()
            .enumerate()
            .map(|(index, page)| self.dispatch(index, page))
            .collect();

        while let Some(completion) = in_flight.next().await {
            let (index, result) = completion?;
            let page_number = pages[index].page_number;
            let page_duration = result.as_ref().ok().map(|r| r.duration);

            self.settle(state, index, page_number, result)?;
            self.emit(state.progress(Some(page_number), page_duration));
        }

        Ok(())
    }

    async fn run_batched(&self, pages: &[PreparedPage], state: &mut RunState) -> Result<()> {
        let group_size = self.config.concurrency.max(1);

        for (group, chunk) in pages.chunks(group_size).enumerate() {
            let offset = group * group_size;
            let completions = join_all(
                chunk
                    .iter()
                    .enumerate()
                    .map(|(i, page)| self.dispatch(offset + i, page)),
            )
            .await;

            for completion in completions {
                let (index, result) = completion?;
                self.settle(state, index, pages[index].page_number, result)?;
            }

            tracing::debug!(
                target: TRACING_TARGET_SCHEDULER,
                group,
                size = chunk.len(),
                "Group finished"
            );
            self.emit(state.progress(None, None));
        }

        Ok(())
    }

    async fn dispatch(&self, index: usize, page: &PreparedPage) -> Result<Completion> {
        let _permit = self.semaphore.acquire().await?;
        tracing::trace!(
            target: TRACING_TARGET_SCHEDULER,
            page = page.page_number,
            available_permits = self.semaphore.available_permits(),
            "Page admitted"
        );

        Ok((index, self.provider.recognize(page).await))
    }

    fn settle(
        &self,
        state: &mut RunState,
        index: usize,
        page_number: u32,
        result: ocrbench_core::Result<OcrResult>,
    ) -> Result<()> {
        match &result {
            Ok(ocr) => tracing::info!(
                target: TRACING_TARGET_SCHEDULER,
                page = page_number,
                completed = state.completed + 1,
                total = state.slots.len(),
                elapsed_ms = state.started.elapsed().as_millis() as u64,
                duration_ms = ocr.duration.as_millis() as u64,
                "Page completed"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET_SCHEDULER,
                page = page_number,
                kind = error.kind_str(),
                error = %error,
                "Page failed"
            ),
        }

        if self.config.fail_fast {
            if let Err(error) = result {
                return Err(Error::page_failed(page_number, error));
            }
        }

        state.slots[index] = Some(result);
        state.completed += 1;
        Ok(())
    }

    fn emit(&self, progress: Progress) {
        if let Some(callback) = &self.progress {
            callback(&progress);
        }
    }
}

/// Per-run bookkeeping: one slot per submitted page, indexed by position.
struct RunState {
    started: Instant,
    completed: usize,
    slots: Vec<Option<ocrbench_core::Result<OcrResult>>>,
}

impl RunState {
    fn new(total: usize) -> Self {
        Self {
            started: Instant::now(),
            completed: 0,
            slots: (0..total).map(|_| None).collect(),
        }
    }

    fn progress(&self, page_number: Option<u32>, page_duration: Option<Duration>) -> Progress {
        Progress {
            completed: self.completed,
            total: self.slots.len(),
            elapsed: self.started.elapsed(),
            page_number,
            page_duration,
        }
    }

    fn finish(self, pages: &[PreparedPage]) -> RunOutcome {
        let elapsed = self.started.elapsed();
        let mut results = Vec::with_capacity(self.completed);
        let mut failures = Vec::new();

        for (page, slot) in pages.iter().zip(self.slots) {
            match slot {
                Some(Ok(result)) => results.push(result),
                Some(Err(error)) => failures.push(PageFailure {
                    page_number: page.page_number,
                    error,
                }),
                None => {}
            }
        }

        RunOutcome {
            results,
            failures,
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use ocrbench_core::mock::MockProvider;
    use ocrbench_core::{EncodedPayload, ErrorKind};

    use super::*;

    fn pages(count: u32) -> Vec<PreparedPage> {
        (1..=count)
            .map(|n| PreparedPage::new(n, 1, 1, EncodedPayload::png(vec![0u8])))
            .collect()
    }

    fn config(concurrency: usize, discipline: Discipline) -> SchedulerConfig {
        SchedulerConfig::builder()
            .with_concurrency(concurrency)
            .with_discipline(discipline)
            .build()
            .unwrap()
    }

    fn recorder() -> (Arc<Mutex<Vec<Progress>>>, impl Fn(&Progress) + Send + Sync + 'static) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        (events, move |p: &Progress| sink.lock().unwrap().push(*p))
    }

    fn page_numbers(results: &[OcrResult]) -> Vec<u32> {
        results.iter().map(|r| r.page_number).collect()
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_the_limit() {
        for discipline in [Discipline::Windowed, Discipline::Batched] {
            let provider = MockProvider::new().with_default_delay(secs(1));
            let scheduler = Scheduler::new(provider, config(3, discipline));

            let outcome = scheduler.run(&pages(10)).await.unwrap();

            assert_eq!(outcome.results.len(), 10);
            assert_eq!(scheduler.provider().peak_in_flight(), 3);
            assert_eq!(scheduler.provider().in_flight(), 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn results_follow_submission_order() {
        let provider = (1..=6u32).fold(MockProvider::new(), |p, n| {
            p.with_delay(n, secs(7 - u64::from(n)))
        });
        let scheduler = Scheduler::new(provider, config(6, Discipline::Windowed));

        let outcome = scheduler.run(&pages(6)).await.unwrap();

        assert_eq!(page_numbers(&outcome.results), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(scheduler.provider().completion_order(), vec![6, 5, 4, 3, 2, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn windowed_refills_as_soon_as_a_slot_frees() {
        let provider = MockProvider::new()
            .with_default_delay(secs(1))
            .with_delay(1, secs(3));
        let scheduler = Scheduler::new(provider, config(2, Discipline::Windowed));

        let outcome = scheduler.run(&pages(4)).await.unwrap();

        assert!(outcome.elapsed >= secs(3));
        assert!(outcome.elapsed < Duration::from_millis(3500));
        assert_eq!(scheduler.provider().completion_order()[..2], [2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn batched_waits_for_the_whole_group() {
        let provider = MockProvider::new()
            .with_default_delay(secs(1))
            .with_delay(1, secs(3));
        let (events, sink) = recorder();
        let scheduler =
            Scheduler::new(provider, config(2, Discipline::Batched)).with_progress(sink);

        let outcome = scheduler.run(&pages(4)).await.unwrap();

        assert!(outcome.elapsed >= secs(4));
        assert!(outcome.elapsed < Duration::from_millis(4500));
        assert_eq!(page_numbers(&outcome.results), vec![1, 2, 3, 4]);

        let events = events.lock().unwrap();
        let completed: Vec<_> = events.iter().map(|p| p.completed).collect();
        assert_eq!(completed, vec![2, 4]);
        assert!(events.iter().all(|p| p.page_number.is_none()));
    }

    #[tokio::test(start_paused = true)]
    async fn windowed_reports_every_completion() {
        let provider = MockProvider::new().with_default_delay(secs(1));
        let (events, sink) = recorder();
        let scheduler =
            Scheduler::new(provider, config(2, Discipline::Windowed)).with_progress(sink);

        scheduler.run(&pages(5)).await.unwrap();

        let events = events.lock().unwrap();
        let completed: Vec<_> = events.iter().map(|p| p.completed).collect();
        assert_eq!(completed, vec![1, 2, 3, 4, 5]);
        assert!(events.windows(2).all(|w| w[0].elapsed <= w[1].elapsed));
        assert!(events.iter().all(|p| p.total == 5 && p.page_number.is_some()));
        assert!(events.last().unwrap().is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_collected_by_default() {
        let provider = MockProvider::new()
            .with_default_delay(secs(1))
            .with_failure(2);
        let scheduler = Scheduler::new(provider, config(2, Discipline::Windowed));

        let outcome = scheduler.run(&pages(4)).await.unwrap();

        assert_eq!(page_numbers(&outcome.results), vec![1, 3, 4]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].page_number, 2);
        assert_eq!(outcome.failures[0].error.kind(), ErrorKind::Transport);
        assert!(!outcome.is_complete());
        assert_eq!(outcome.attempted(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn fail_fast_stops_at_the_first_failure() {
        let provider = MockProvider::new()
            .with_default_delay(secs(1))
            .with_failure(2);
        let config = SchedulerConfig::builder()
            .with_concurrency(1usize)
            .with_fail_fast(true)
            .build()
            .unwrap();
        let scheduler = Scheduler::new(provider, config);

        let err = scheduler.run(&pages(4)).await.unwrap_err();

        assert!(matches!(err, Error::PageFailed { page: 2, .. }));
        assert_eq!(scheduler.provider().completion_order(), vec![1, 2]);
        assert_eq!(scheduler.provider().in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_runs_finish_immediately() {
        let (events, sink) = recorder();
        let scheduler = Scheduler::new(MockProvider::new(), SchedulerConfig::default())
            .with_progress(sink);

        let outcome = scheduler.run(&[]).await.unwrap();

        assert!(outcome.results.is_empty());
        assert!(outcome.is_complete());
        assert!(events.lock().unwrap().is_empty());
    }
}
