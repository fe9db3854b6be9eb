//! The session finalizer: a periodic sweep that writes auto-absences for every
//! ended, unfinalized session occurring today and then finalizes it.
//!
//! A session only leaves the candidate set through `mark_finalized`, which is
//! insert-if-absent, so re-running a sweep never reprocesses a session. Absence
//! writes go through the recorder's upsert, which absorbs races with concurrent
//! presence recordings without downgrading a present student.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use rollcall_core::clock::Clock;
use rollcall_core::config::FinalizerSettings;

use crate::error::{ServiceError, ServiceResult};
use crate::recorder::AttendanceRecorder;
use crate::session::ClassSession;
use crate::store::AttendanceStore;

mod report;


pub use report::{SessionOutcome, SessionReport, SweepOutcome, SweepReport};

/// Runtime knobs for the finalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizerConfig {
    pub interval: Duration,
    /// Upper bound on any single store call.
    pub call_timeout: Duration,
    /// Maximum number of in-flight absence writes per session.
    pub write_concurrency: usize,
}

impl Default for FinalizerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(120),
            call_timeout: Duration::from_secs(10),
            write_concurrency: 8,
        }
    }
}

impl From<&FinalizerSettings> for FinalizerConfig {
    fn from(settings: &FinalizerSettings) -> Self {
        Self {
            interval: settings.interval(),
            call_timeout: settings.call_timeout(),
            write_concurrency: settings.write_concurrency.max(1),
        }
    }
}

/// Releases the single-flight flag when a sweep ends, including on panic.
struct SweepGuard<'a>(&'a AtomicBool);

impl<'a> SweepGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self(flag))
    }
}

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Applies `limit` to a store call, mapping an elapsed timer to `ServiceError::Timeout`.
async fn bounded<T, E, F>(operation: &'static str, limit: Duration, call: F) -> ServiceResult<T>
where
    F: Future<Output = Result<T, E>>,
    ServiceError: From<E>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => Ok(result?),
        Err(_elapsed) => Err(ServiceError::Timeout {
            operation,
            after: limit,
        }),
    }
}

pub struct SessionFinalizer<S> {
    store: Arc<S>,
    recorder: AttendanceRecorder<S>,
    clock: Arc<dyn Clock>,
    config: FinalizerConfig,
    running: AtomicBool,
}

impl<S> std::fmt::Debug for SessionFinalizer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFinalizer")
            .field("clock", &self.clock)
            .field("config", &self.config)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl<S: AttendanceStore> SessionFinalizer<S> {
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: FinalizerConfig) -> Self {
        Self {
            recorder: AttendanceRecorder::new(Arc::clone(&store)),
            store,
            clock,
            config,
            running: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &FinalizerConfig {
        &self.config
    }

    /// True while a sweep holds the single-flight guard.
    #[must_use]
    pub fn is_sweeping(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// ## Summary
    /// Runs one sweep over every finalization candidate.
    ///
    /// Returns `SweepOutcome::Skipped` without touching the store if another
    /// sweep is still in flight. Each candidate is processed independently; a
    /// failure on one session is recorded as `Deferred` and does not stop the sweep.
    ///
    /// ## Errors
    /// Returns an error only if the candidate query itself fails or times out.
    pub async fn sweep(&self) -> ServiceResult<SweepOutcome> {
        let Some(_guard) = SweepGuard::acquire(&self.running) else {
            tracing::info!("Previous sweep still running, skipping");
            return Ok(SweepOutcome::Skipped);
        };

        let now = self.clock.now();
        let (today, time_of_day) = (now.date(), now.time());

        let candidates = bounded(
            "finalization_candidates",
            self.config.call_timeout,
            self.store.finalization_candidates(today, time_of_day),
        )
        .await
        .inspect_err(|e| tracing::error!(error = %e, %today, "Failed to select finalization candidates"))?;

        tracing::debug!(count = candidates.len(), %today, %time_of_day, "Selected finalization candidates");

        let mut report = SweepReport::new(now);
        for session in candidates {
            let outcome = self.process_session(&session).await;
            report.push(session, outcome);
        }

        tracing::info!(
            candidates = report.candidates,
            finalized = report.finalized,
            holiday_skipped = report.holiday_skipped,
            deferred = report.deferred,
            absences_written = report.absences_written,
            absence_failures = report.absence_failures,
            "Sweep completed"
        );

        Ok(SweepOutcome::Completed(report))
    }

    #[tracing::instrument(skip_all, fields(
        session_id = session.schedule_id,
        class_id = session.class_id,
        session_date = %session.session_date,
    ))]
    async fn process_session(&self, session: &ClassSession) -> SessionOutcome {
        match self.finalize_session(session).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "Deferring session to the next sweep");
                SessionOutcome::Deferred {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn finalize_session(&self, session: &ClassSession) -> ServiceResult<SessionOutcome> {
        let limit = self.config.call_timeout;
        let date = session.session_date;

        if bounded("is_holiday", limit, self.store.is_holiday(date)).await? {
            self.mark_finalized(session).await?;
            tracing::info!("Session falls on a holiday, finalized without absences");
            return Ok(SessionOutcome::HolidaySkipped);
        }

        let roster = bounded("roster", limit, self.store.roster(session.class_id)).await?;
        let present = bounded(
            "present_students",
            limit,
            self.store.present_students(session.class_id, date),
        )
        .await?;

        let absent: Vec<i32> = roster.difference(&present).copied().collect();
        tracing::debug!(
            roster = roster.len(),
            present = present.len(),
            absent = absent.len(),
            "Computed absence set"
        );

        let (absences_written, absence_failures) = self.write_absences(session, absent).await;

        self.mark_finalized(session).await?;
        tracing::info!(absences_written, absence_failures, "Session finalized");

        Ok(SessionOutcome::Finalized {
            absences_written,
            absence_failures,
        })
    }

    /// Writes auto-absences with bounded concurrency. Returns `(written, failed)`.
    async fn write_absences(&self, session: &ClassSession, absent: Vec<i32>) -> (usize, usize) {
        let limit = self.config.call_timeout;
        let (class_id, date) = (session.class_id, session.session_date);
        let recorder = self.recorder.clone();

        let results: Vec<(i32, ServiceResult<()>)> = futures::stream::iter(absent)
            .map(move |student_id| {
                let recorder = recorder.clone();
                async move {
                    let result = bounded(
                        "upsert_attendance",
                        limit,
                        recorder.record_auto_absence(class_id, student_id, date),
                    )
                    .await
                    .map(|_| ());
                    (student_id, result)
                }
            })
            .buffer_unordered(self.config.write_concurrency.max(1))
            .collect()
            .await;

        let mut written = 0;
        let mut failed = 0;
        for (student_id, result) in results {
            match result {
                Ok(()) => written += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!(student_id, error = %e, "Failed to write auto-absence");
                }
            }
        }
        (written, failed)
    }

    async fn mark_finalized(&self, session: &ClassSession) -> ServiceResult<()> {
        bounded(
            "mark_finalized",
            self.config.call_timeout,
            self.store
                .mark_finalized(session.schedule_id, session.session_date),
        )
        .await
    }

    async fn run_tick(&self) {
        match self.sweep().await {
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Sweep failed; candidates retried next tick"),
        }
    }
}

impl<S: AttendanceStore + 'static> SessionFinalizer<S> {
    /// ## Summary
    /// Spawns the periodic sweep loop on the current runtime.
    ///
    /// The first sweep runs immediately. Missed ticks are skipped rather than
    /// bunched, and ticks never overlap because the loop awaits each sweep.
    #[must_use]
    pub fn start(self: Arc<Self>) -> FinalizerHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let period = self.config.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(interval_secs = period.as_secs(), "Session finalizer started");

            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => self.run_tick().await,
                }
            }

            tracing::info!("Session finalizer stopped");
        });

        FinalizerHandle { shutdown, task }
    }
}

/// Owner of a running finalizer loop.
#[derive(Debug)]
pub struct FinalizerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl FinalizerHandle {
    /// ## Summary
    /// Signals the loop to stop and waits for any in-flight sweep to finish.
    pub async fn stop(self) {
        if self.shutdown.send(true).is_err() {
            tracing::debug!("Finalizer loop already exited");
        }
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Finalizer task ended abnormally");
        }
    }
}
