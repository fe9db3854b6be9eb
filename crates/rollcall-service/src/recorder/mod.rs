//! The single entry point for writing an attendance fact.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use rollcall_db::db::enums::AttendanceMethod;
use rollcall_db::model::attendance::{AttendanceRecord, NewAttendance};

use crate::error::{ServiceError, ServiceResult};
use crate::store::AttendanceStore;


/// Confidence recorded when the caller supplies none.
pub const DEFAULT_CONFIDENCE: f64 = 1.0;

/// Confidence stored with finalizer absences, which carry no recognition score.
pub const AUTO_ABSENCE_CONFIDENCE: f64 = 0.0;

/// One attendance recording request, already resolved to internal IDs.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RecordAttendance {
    pub class_id: i32,
    pub student_id: i32,
    pub session_date: NaiveDate,
    pub present: bool,
    pub method: AttendanceMethod,
    pub confidence: Option<f64>,
}

impl RecordAttendance {
    /// ## Summary
    /// Returns the confidence to store, defaulting to 1.0.
    ///
    /// ## Errors
    /// Returns `ValidationError` if the confidence is NaN or outside `[0, 1]`.
    pub fn effective_confidence(&self) -> ServiceResult<f64> {
        validate_confidence(self.confidence)
    }
}

/// ## Summary
/// Resolves an optional confidence to the stored value, defaulting to 1.0.
///
/// ## Errors
/// Returns `ValidationError` if the confidence is NaN or outside `[0, 1]`.
pub fn validate_confidence(confidence: Option<f64>) -> ServiceResult<f64> {
    let confidence = confidence.unwrap_or(DEFAULT_CONFIDENCE);
    if (0.0..=1.0).contains(&confidence) {
        Ok(confidence)
    } else {
        Err(ServiceError::ValidationError(format!(
            "confidence must be between 0 and 1, got {confidence}"
        )))
    }
}

/// Writes attendance through the store's insert-or-merge upsert.
///
/// Repeated calls for the same `(class, student, date)` never create a second row:
/// `present` only moves from false to true and `confidence` only grows.
#[derive(Debug)]
pub struct AttendanceRecorder<S> {
    store: Arc<S>,
}

impl<S> Clone for AttendanceRecorder<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: AttendanceStore> AttendanceRecorder<S> {
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// ## Summary
    /// Records an attendance fact for an enrolled student.
    ///
    /// ## Errors
    /// - `ValidationError` for an out-of-range confidence.
    /// - `NotEnrolled` if the student is not on the class roster.
    /// - `StoreUnavailable` if the store cannot be reached.
    #[tracing::instrument(skip(self), fields(
        class_id = request.class_id,
        student_id = request.student_id,
        session_date = %request.session_date,
        method = %request.method,
    ))]
    pub async fn record(&self, request: RecordAttendance) -> ServiceResult<AttendanceRecord> {
        let confidence = request.effective_confidence()?;

        if !self
            .store
            .is_enrolled(request.class_id, request.student_id)
            .await?
        {
            tracing::debug!("Rejecting attendance for unenrolled student");
            return Err(ServiceError::NotEnrolled {
                class_id: request.class_id,
                student_id: request.student_id,
            });
        }

        let record = self.write(NewAttendance {
            class_id: request.class_id,
            student_id: request.student_id,
            session_date: request.session_date,
            present: request.present,
            method: request.method,
            confidence,
            recorded_at: Utc::now(),
        })
        .await?;

        tracing::debug!(present = record.present, "Attendance recorded");
        Ok(record)
    }

    /// ## Summary
    /// Writes an auto-absence for a student taken from the class roster.
    /// The roster is the enrollment check, so it is not repeated here.
    ///
    /// ## Errors
    /// Returns `StoreUnavailable` if the upsert fails.
    pub async fn record_auto_absence(
        &self,
        class_id: i32,
        student_id: i32,
        session_date: NaiveDate,
    ) -> ServiceResult<AttendanceRecord> {
        self.write(NewAttendance {
            class_id,
            student_id,
            session_date,
            present: false,
            method: AttendanceMethod::Auto,
            confidence: AUTO_ABSENCE_CONFIDENCE,
            recorded_at: Utc::now(),
        })
        .await
    }

    async fn write(&self, write: NewAttendance) -> ServiceResult<AttendanceRecord> {
        Ok(self.store.upsert_attendance(write).await?)
    }
}
