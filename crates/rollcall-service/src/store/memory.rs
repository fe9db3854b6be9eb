//! In-memory `AttendanceStore` with failure injection, for exercising the
//! recorder and finalizer without a database.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, Utc};

use rollcall_db::db::enums::{AttendanceMethod, AttendanceStatus};
use rollcall_db::error::{DbError, DbResult};
use rollcall_db::model::attendance::{AttendanceRecord, NewAttendance};
use rollcall_db::model::schedule::ClassSchedule;

use super::AttendanceStore;
use crate::session::ClassSession;

type AttendanceKey = (i32, i32, NaiveDate);

#[derive(Debug, Default)]
struct State {
    schedules: Vec<ClassSchedule>,
    enrollments: BTreeSet<(i32, i32)>,
    attendance: BTreeMap<AttendanceKey, AttendanceRecord>,
    holidays: BTreeSet<NaiveDate>,
    finalized: BTreeSet<(i32, NaiveDate)>,
    next_id: i32,
    /// Writes applied right after the next `present_students` read, standing in
    /// for a recorder call that lands between the sweep's read and its writes.
    interleaved: Vec<NewAttendance>,
}

#[derive(Debug, Default)]
struct Faults {
    candidates: bool,
    roster: HashSet<i32>,
    present: HashSet<i32>,
    writes: HashSet<(i32, i32)>,
    mark: HashSet<i32>,
    roster_delay: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    faults: Mutex<Faults>,
    upserts: AtomicUsize,
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn injected(what: &str) -> DbError {
    DbError::Unavailable(format!("injected failure: {what}"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_schedule(
        &self,
        id: i32,
        class_id: i32,
        scheduled_date: Option<NaiveDate>,
        day_of_week: Option<i16>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) {
        lock(&self.state).schedules.push(ClassSchedule {
            id,
            class_id,
            day_of_week,
            scheduled_date,
            start_time,
            end_time,
            room_number: None,
            created_at: Utc::now(),
        });
    }

    pub fn enroll(&self, class_id: i32, students: &[i32]) {
        let mut state = lock(&self.state);
        for student in students {
            state.enrollments.insert((class_id, *student));
        }
    }

    pub fn add_holiday(&self, date: NaiveDate) {
        lock(&self.state).holidays.insert(date);
    }

    pub fn interleave_after_present_read(&self, write: NewAttendance) {
        lock(&self.state).interleaved.push(write);
    }

    pub fn fail_candidates(&self) {
        lock(&self.faults).candidates = true;
    }

    pub fn fail_roster_for(&self, class_id: i32) {
        lock(&self.faults).roster.insert(class_id);
    }

    pub fn fail_present_for(&self, class_id: i32) {
        lock(&self.faults).present.insert(class_id);
    }

    pub fn fail_write_for(&self, class_id: i32, student_id: i32) {
        lock(&self.faults).writes.insert((class_id, student_id));
    }

    pub fn fail_mark_for(&self, schedule_id: i32) {
        lock(&self.faults).mark.insert(schedule_id);
    }

    pub fn delay_roster(&self, delay: Duration) {
        lock(&self.faults).roster_delay = Some(delay);
    }

    pub fn clear_faults(&self) {
        *lock(&self.faults) = Faults::default();
    }

    pub fn record(&self, class_id: i32, student_id: i32, date: NaiveDate) -> Option<AttendanceRecord> {
        lock(&self.state)
            .attendance
            .get(&(class_id, student_id, date))
            .cloned()
    }

    pub fn records(&self) -> Vec<AttendanceRecord> {
        lock(&self.state).attendance.values().cloned().collect()
    }

    pub fn is_finalized(&self, schedule_id: i32, date: NaiveDate) -> bool {
        lock(&self.state).finalized.contains(&(schedule_id, date))
    }

    pub fn upsert_calls(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    fn apply(state: &mut State, write: &NewAttendance) -> AttendanceRecord {
        let key = (write.class_id, write.student_id, write.session_date);
        state.next_id += 1;
        let next_id = state.next_id;
        let record = state
            .attendance
            .entry(key)
            .and_modify(|existing| {
                let keeps_provenance = existing.present && !write.present;
                existing.present = existing.present || write.present;
                existing.confidence = existing.confidence.max(write.confidence);
                if !keeps_provenance {
                    existing.method = write.method;
                    existing.recorded_at = write.recorded_at;
                }
            })
            .or_insert_with(|| AttendanceRecord {
                id: next_id,
                class_id: write.class_id,
                student_id: write.student_id,
                session_date: write.session_date,
                present: write.present,
                status: String::new(),
                method: write.method,
                confidence: write.confidence,
                recorded_at: write.recorded_at,
            });
        record.status = AttendanceStatus::from_present(record.present).as_str().to_string();
        record.clone()
    }
}

impl AttendanceStore for MemoryStore {
    async fn finalization_candidates(
        &self,
        today: NaiveDate,
        now: NaiveTime,
    ) -> DbResult<Vec<ClassSession>> {
        if lock(&self.faults).candidates {
            return Err(injected("finalization_candidates"));
        }
        let state = lock(&self.state);
        Ok(state
            .schedules
            .iter()
            .filter_map(|row| ClassSession::resolve(row, today))
            .filter(|session| session.has_ended_by(now))
            .filter(|session| !state.finalized.contains(&(session.schedule_id, today)))
            .collect())
    }

    async fn is_holiday(&self, date: NaiveDate) -> DbResult<bool> {
        Ok(lock(&self.state).holidays.contains(&date))
    }

    async fn roster(&self, class_id: i32) -> DbResult<BTreeSet<i32>> {
        let delay = {
            let faults = lock(&self.faults);
            if faults.roster.contains(&class_id) {
                return Err(injected("roster"));
            }
            faults.roster_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(lock(&self.state)
            .enrollments
            .iter()
            .filter(|(class, _)| *class == class_id)
            .map(|(_, student)| *student)
            .collect())
    }

    async fn present_students(&self, class_id: i32, date: NaiveDate) -> DbResult<BTreeSet<i32>> {
        if lock(&self.faults).present.contains(&class_id) {
            return Err(injected("present_students"));
        }
        let mut state = lock(&self.state);
        let present = state
            .attendance
            .values()
            .filter(|r| r.class_id == class_id && r.session_date == date && r.present)
            .map(|r| r.student_id)
            .collect();
        let interleaved = std::mem::take(&mut state.interleaved);
        for write in &interleaved {
            Self::apply(&mut state, write);
        }
        Ok(present)
    }

    async fn is_enrolled(&self, class_id: i32, student_id: i32) -> DbResult<bool> {
        Ok(lock(&self.state).enrollments.contains(&(class_id, student_id)))
    }

    async fn upsert_attendance(&self, write: NewAttendance) -> DbResult<AttendanceRecord> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if lock(&self.faults)
            .writes
            .contains(&(write.class_id, write.student_id))
        {
            return Err(injected("upsert_attendance"));
        }
        Ok(Self::apply(&mut lock(&self.state), &write))
    }

    async fn mark_finalized(&self, schedule_id: i32, date: NaiveDate) -> DbResult<()> {
        if lock(&self.faults).mark.contains(&schedule_id) {
            return Err(injected("mark_finalized"));
        }
        lock(&self.state).finalized.insert((schedule_id, date));
        Ok(())
    }
}

/// Shorthand for an attendance write in tests.
pub fn write(
    class_id: i32,
    student_id: i32,
    session_date: NaiveDate,
    present: bool,
    method: AttendanceMethod,
) -> NewAttendance {
    NewAttendance {
        class_id,
        student_id,
        session_date,
        present,
        method,
        confidence: 1.0,
        recorded_at: Utc::now(),
    }
}
