#![allow(clippy::unwrap_used, clippy::expect_used)]
//! The finalization sweep end to end on Postgres.

use std::sync::Arc;

use rollcall_test::component::clock::FixedClock;
use rollcall_test::component::db::enums::AttendanceMethod;
use rollcall_test::component::db::query::attendance;
use rollcall_test::component::finalizer::{SessionOutcome, SweepOutcome};
use rollcall_test::component::holiday::{CreateHoliday, add_holiday};
use rollcall_test::component::recorder::{AttendanceRecorder, RecordAttendance};
use rollcall_test::component::store::PgAttendanceStore;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn sweep_marks_missing_students_absent_once() {
    let db = require_db!();
    let mut conn = db.conn().await;
    let class_id = seed_class(&mut conn, "CS101").await;
    let ids = seed_enrolled(&mut conn, class_id, &["STU001", "STU002", "STU003"]).await;
    let session = seed_schedule(&mut conn, class_id, Some(monday()), None, hm(9, 0), hm(10, 0)).await;
    drop(conn);

    let recorder = AttendanceRecorder::new(Arc::new(PgAttendanceStore::new(db.pool.clone())));
    recorder
        .record(RecordAttendance {
            class_id,
            student_id: ids[0],
            session_date: monday(),
            present: true,
            method: AttendanceMethod::Qr,
            confidence: None,
        })
        .await
        .unwrap();

    let clock = Arc::new(FixedClock::new(at(monday(), 10, 2)));
    let finalizer = finalizer_for(&db.pool, clock);

    let SweepOutcome::Completed(report) = finalizer.sweep().await.unwrap() else {
        panic!("sweep should not be skipped");
    };
    assert_eq!(report.candidates, 1);
    assert_eq!(report.finalized, 1);
    assert_eq!(report.absences_written, 2);
    assert!(matches!(
        report.outcome_for(session.id),
        Some(SessionOutcome::Finalized {
            absences_written: 2,
            absence_failures: 0
        })
    ));

    let mut conn = db.conn().await;
    let rows = attendance::for_class_on(&mut conn, class_id, monday()).await.unwrap();
    assert_eq!(rows.len(), 3);
    for row in &rows {
        if row.student_id == ids[0] {
            assert!(row.present);
            assert_eq!(row.method, AttendanceMethod::Qr);
        } else {
            assert!(!row.present);
            assert_eq!(row.status, "absent");
            assert_eq!(row.method, AttendanceMethod::Auto);
        }
    }
    drop(conn);

    let SweepOutcome::Completed(second) = finalizer.sweep().await.unwrap() else {
        panic!("sweep should not be skipped");
    };
    assert_eq!(second.candidates, 0);

    let mut conn = db.conn().await;
    assert_eq!(
        attendance::for_class_on(&mut conn, class_id, monday()).await.unwrap().len(),
        3
    );
    drop(conn);
    db.cleanup().await;
}

#[test_log::test(tokio::test)]
async fn late_presence_overlays_auto_absence() {
    let db = require_db!();
    let mut conn = db.conn().await;
    let class_id = seed_class(&mut conn, "CS102").await;
    let ids = seed_enrolled(&mut conn, class_id, &["STU001"]).await;
    seed_schedule(&mut conn, class_id, Some(monday()), None, hm(9, 0), hm(10, 0)).await;
    drop(conn);

    let clock = Arc::new(FixedClock::new(at(monday(), 10, 2)));
    finalizer_for(&db.pool, clock).sweep().await.unwrap();

    let recorder = AttendanceRecorder::new(Arc::new(PgAttendanceStore::new(db.pool.clone())));
    let record = recorder
        .record(RecordAttendance {
            class_id,
            student_id: ids[0],
            session_date: monday(),
            present: true,
            method: AttendanceMethod::Face,
            confidence: Some(0.7),
        })
        .await
        .unwrap();

    assert!(record.present);
    assert_eq!(record.method, AttendanceMethod::Face);
    // Auto absences carry no score, so the face confidence survives the merge.
    assert!((record.confidence - 0.7).abs() < f64::EPSILON);

    db.cleanup().await;
}

#[test_log::test(tokio::test)]
async fn holiday_sessions_are_finalized_without_writes() {
    let db = require_db!();
    let mut conn = db.conn().await;
    let class_id = seed_class(&mut conn, "CS103").await;
    seed_enrolled(&mut conn, class_id, &["STU001", "STU002"]).await;
    let session = seed_schedule(&mut conn, class_id, None, Some(1), hm(9, 0), hm(10, 0)).await;
    add_holiday(
        &mut conn,
        CreateHoliday {
            holiday_date: monday(),
            description: Some("Founders day".to_string()),
        },
    )
    .await
    .unwrap();
    drop(conn);

    let clock = Arc::new(FixedClock::new(at(monday(), 12, 0)));
    let finalizer = finalizer_for(&db.pool, Arc::clone(&clock));
    let SweepOutcome::Completed(report) = finalizer.sweep().await.unwrap() else {
        panic!("sweep should not be skipped");
    };
    assert_eq!(report.holiday_skipped, 1);
    assert!(matches!(
        report.outcome_for(session.id),
        Some(SessionOutcome::HolidaySkipped)
    ));

    let mut conn = db.conn().await;
    assert!(
        attendance::for_class_on(&mut conn, class_id, monday())
            .await
            .unwrap()
            .is_empty()
    );
    drop(conn);

    // The weekly slot is still due on the following Monday.
    clock.set(at(monday() + chrono::Duration::days(7), 12, 0));
    let SweepOutcome::Completed(next) = finalizer.sweep().await.unwrap() else {
        panic!("sweep should not be skipped");
    };
    assert_eq!(next.finalized, 1);
    assert_eq!(next.absences_written, 2);

    db.cleanup().await;
}
