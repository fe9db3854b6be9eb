use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;

/// A non-instructional calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = schema::holidays)]
#[diesel(check_for_backend(Pg))]
pub struct Holiday {
    pub holiday_date: chrono::NaiveDate,
    pub description: Option<String>,
}
