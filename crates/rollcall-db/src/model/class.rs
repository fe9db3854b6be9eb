use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;

/// A course offering that students enroll in.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = schema::classes)]
#[diesel(check_for_backend(Pg))]
pub struct Class {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub instructor: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::classes)]
pub struct NewClass<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub instructor: Option<&'a str>,
}
