//! Class management: creation, listing, deletion and enrollment.

use serde::{Deserialize, Serialize};

use rollcall_db::db::connection::DbConnection;
use rollcall_db::db::query::{class, enrollment, student};
use rollcall_db::model::class::{Class, NewClass};
use rollcall_db::model::enrollment::NewEnrollment;
use rollcall_db::model::student::Student;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClass {
    pub code: String,
    pub name: String,
    pub instructor: Option<String>,
}

/// A class with the size of its roster.
#[derive(Debug, Clone, Serialize)]
pub struct ClassSummary {
    #[serde(flatten)]
    pub class: Class,
    pub student_count: i64,
}

/// An enrolled student with the time they joined the class.
#[derive(Debug, Clone, Serialize)]
pub struct EnrolledStudent {
    #[serde(flatten)]
    pub student: Student,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}

/// ## Errors
/// Returns `StoreUnavailable` if the query fails.
pub async fn list_classes(conn: &mut DbConnection<'_>) -> ServiceResult<Vec<ClassSummary>> {
    let rows = class::list_with_counts(conn).await?;
    Ok(rows
        .into_iter()
        .map(|(class, student_count)| ClassSummary {
            class,
            student_count,
        })
        .collect())
}

/// ## Summary
/// Creates a class with a unique code.
///
/// ## Errors
/// - `ValidationError` if code or name is blank, or the code already exists.
/// - `StoreUnavailable` if the insert fails for another reason.
#[tracing::instrument(skip(conn, request), fields(code = %request.code))]
pub async fn create_class(conn: &mut DbConnection<'_>, request: &CreateClass) -> ServiceResult<Class> {
    let code = request.code.trim();
    let name = request.name.trim();
    if code.is_empty() || name.is_empty() {
        return Err(ServiceError::ValidationError(
            "code and name are required".to_string(),
        ));
    }

    let new_class = NewClass {
        code,
        name,
        instructor: request.instructor.as_deref(),
    };
    let created = class::create_class(conn, &new_class)
        .await
        .map_err(|e| ServiceError::from_insert(e, "Class code already exists"))?;

    tracing::info!(class_id = created.id, "Class created");
    Ok(created)
}

/// ## Errors
/// Returns `NotFound` if no class has this ID.
pub async fn get_class(conn: &mut DbConnection<'_>, class_id: i32) -> ServiceResult<Class> {
    class::get_class(conn, class_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Class {class_id} not found")))
}

/// ## Summary
/// Deletes a class together with its roster, schedules and attendance.
///
/// ## Errors
/// Returns `NotFound` if no class has this ID.
#[tracing::instrument(skip(conn))]
pub async fn delete_class(conn: &mut DbConnection<'_>, class_id: i32) -> ServiceResult<()> {
    if class::delete_class(conn, class_id).await? == 0 {
        return Err(ServiceError::NotFound(format!("Class {class_id} not found")));
    }
    tracing::info!("Class deleted");
    Ok(())
}

/// ## Summary
/// Enrolls a student in a class. Returns `false` if the student was already enrolled.
///
/// ## Errors
/// Returns `NotFound` if the class or the student does not exist.
#[tracing::instrument(skip(conn))]
pub async fn enroll_student(
    conn: &mut DbConnection<'_>,
    class_id: i32,
    student_id: i32,
) -> ServiceResult<bool> {
    get_class(conn, class_id).await?;
    if student::get_student(conn, student_id).await?.is_none() {
        return Err(ServiceError::NotFound("Student not found".to_string()));
    }

    let inserted = enrollment::enroll(
        conn,
        NewEnrollment {
            class_id,
            student_id,
        },
    )
    .await?;

    tracing::info!(newly_enrolled = inserted > 0, "Student enrolled");
    Ok(inserted > 0)
}

/// ## Errors
/// Returns `NotFound` if the class does not exist.
pub async fn class_students(
    conn: &mut DbConnection<'_>,
    class_id: i32,
) -> ServiceResult<Vec<EnrolledStudent>> {
    get_class(conn, class_id).await?;
    let rows = enrollment::roster_students(conn, class_id).await?;
    Ok(rows
        .into_iter()
        .map(|(student, enrolled_at)| EnrolledStudent {
            student,
            enrolled_at,
        })
        .collect())
}
