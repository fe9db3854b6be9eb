use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = schema::students)]
#[diesel(check_for_backend(Pg))]
pub struct Student {
    pub id: i32,
    /// External display identifier (e.g. `STU001`), as used by recognition clients.
    pub student_code: String,
    pub name: String,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::students)]
pub struct NewStudent<'a> {
    pub student_code: &'a str,
    pub name: &'a str,
    pub email: Option<&'a str>,
}
