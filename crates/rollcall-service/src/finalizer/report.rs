//! Per-sweep accounting, so a failed sweep is distinguishable from one with
//! nothing to do.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::session::ClassSession;

/// What happened to one candidate session during a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Absences were synthesized and the session is finalized. Failed absence
    /// writes do not hold finalization back.
    Finalized {
        absences_written: usize,
        absence_failures: usize,
    },
    /// The session date is a holiday; finalized with no attendance writes.
    HolidaySkipped,
    /// A read or the finalization write failed; the session stays unfinalized
    /// and is picked up again by the next sweep.
    Deferred { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    #[serde(flatten)]
    pub session: ClassSession,
    #[serde(flatten)]
    pub outcome: SessionOutcome,
}

/// Summary of one completed sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Local wall-clock time the sweep resolved "today" and "now" from.
    pub started_at: NaiveDateTime,
    pub candidates: usize,
    pub finalized: usize,
    pub holiday_skipped: usize,
    pub deferred: usize,
    pub absences_written: usize,
    pub absence_failures: usize,
    pub sessions: Vec<SessionReport>,
}

impl SweepReport {
    #[must_use]
    pub const fn new(started_at: NaiveDateTime) -> Self {
        Self {
            started_at,
            candidates: 0,
            finalized: 0,
            holiday_skipped: 0,
            deferred: 0,
            absences_written: 0,
            absence_failures: 0,
            sessions: Vec::new(),
        }
    }

    pub fn push(&mut self, session: ClassSession, outcome: SessionOutcome) {
        self.candidates += 1;
        match &outcome {
            SessionOutcome::Finalized {
                absences_written,
                absence_failures,
            } => {
                self.finalized += 1;
                self.absences_written += absences_written;
                self.absence_failures += absence_failures;
            }
            SessionOutcome::HolidaySkipped => self.holiday_skipped += 1,
            SessionOutcome::Deferred { .. } => self.deferred += 1,
        }
        self.sessions.push(SessionReport { session, outcome });
    }

    /// Outcome recorded for a schedule in this sweep, if it was a candidate.
    #[must_use]
    pub fn outcome_for(&self, schedule_id: i32) -> Option<&SessionOutcome> {
        self.sessions
            .iter()
            .find(|report| report.session.schedule_id == schedule_id)
            .map(|report| &report.outcome)
    }
}

/// Result of asking the finalizer to sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SweepOutcome {
    Completed(SweepReport),
    /// Another sweep held the single-flight guard; nothing was read or written.
    Skipped,
}
