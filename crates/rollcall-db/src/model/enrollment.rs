use crate::{db::schema, model};
use diesel::{pg::Pg, prelude::*};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = schema::enrollments)]
#[diesel(check_for_backend(Pg))]
#[diesel(primary_key(class_id, student_id))]
#[diesel(belongs_to(model::class::Class, foreign_key = class_id))]
#[diesel(belongs_to(model::student::Student, foreign_key = student_id))]
pub struct Enrollment {
    pub class_id: i32,
    pub student_id: i32,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Insertable)]
#[diesel(table_name = schema::enrollments)]
pub struct NewEnrollment {
    pub class_id: i32,
    pub student_id: i32,
}
