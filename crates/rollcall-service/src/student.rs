//! Student management and resolution of the identifiers recognition clients send.

use serde::Deserialize;

use rollcall_db::db::connection::DbConnection;
use rollcall_db::db::query::student;
use rollcall_db::model::student::{NewStudent, Student};

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudent {
    /// External display code, e.g. `STU001`.
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
}

/// A student reference as sent by clients: the internal numeric ID or the
/// display code (`"STU001"`). Numeric strings are treated as internal IDs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StudentRef {
    Id(i32),
    Code(String),
}

impl StudentRef {
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Code(code) => match code.trim().parse::<i32>() {
                Ok(id) => Self::Id(id),
                Err(_) => Self::Code(code),
            },
            id @ Self::Id(_) => id,
        }
    }
}

impl std::fmt::Display for StudentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Code(code) => f.write_str(code),
        }
    }
}

/// ## Errors
/// Returns `StoreUnavailable` if the query fails.
pub async fn list_students(conn: &mut DbConnection<'_>) -> ServiceResult<Vec<Student>> {
    Ok(student::list_students(conn).await?)
}

/// ## Summary
/// Registers a student under a unique display code.
///
/// ## Errors
/// - `ValidationError` if the code or name is blank, or the code already exists.
/// - `StoreUnavailable` if the insert fails for another reason.
#[tracing::instrument(skip(conn, request), fields(student_code = %request.student_id))]
pub async fn create_student(
    conn: &mut DbConnection<'_>,
    request: &CreateStudent,
) -> ServiceResult<Student> {
    let student_code = request.student_id.trim();
    let name = request.name.trim();
    if student_code.is_empty() || name.is_empty() {
        return Err(ServiceError::ValidationError(
            "student_id and name are required".to_string(),
        ));
    }

    let new_student = NewStudent {
        student_code,
        name,
        email: request.email.as_deref(),
    };
    let created = student::create_student(conn, &new_student)
        .await
        .map_err(|e| ServiceError::from_insert(e, "Student ID already exists"))?;

    tracing::info!(student_id = created.id, "Student created");
    Ok(created)
}

/// ## Errors
/// Returns `NotFound` if no student has this ID.
pub async fn get_student(conn: &mut DbConnection<'_>, student_id: i32) -> ServiceResult<Student> {
    student::get_student(conn, student_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Student not found".to_string()))
}

/// ## Summary
/// Resolves a client-supplied reference to a stored student.
///
/// ## Errors
/// Returns `NotFound` if no student matches.
pub async fn resolve_student(conn: &mut DbConnection<'_>, reference: &StudentRef) -> ServiceResult<Student> {
    let found = match reference {
        StudentRef::Id(id) => student::get_student(conn, *id).await?,
        StudentRef::Code(code) => student::get_student_by_code(conn, code.trim()).await?,
    };
    found.ok_or_else(|| ServiceError::NotFound(format!("Student {reference} not found")))
}

/// ## Summary
/// Deletes a student and returns the removed row, so callers can clean up
/// external state keyed by the display code.
///
/// ## Errors
/// Returns `NotFound` if no student has this ID.
#[tracing::instrument(skip(conn))]
pub async fn delete_student(conn: &mut DbConnection<'_>, student_id: i32) -> ServiceResult<Student> {
    let deleted = student::delete_student(conn, student_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Student not found".to_string()))?;
    tracing::info!(student_code = %deleted.student_code, "Student deleted");
    Ok(deleted)
}
