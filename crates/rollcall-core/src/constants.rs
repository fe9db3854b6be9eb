/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const CLASSES_ROUTE_COMPONENT: &str = "classes";
pub const CLASSES_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", CLASSES_ROUTE_COMPONENT);

pub const STUDENTS_ROUTE_COMPONENT: &str = "students";
pub const STUDENTS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", STUDENTS_ROUTE_COMPONENT);

pub const ATTENDANCE_ROUTE_COMPONENT: &str = "attendance";
pub const ATTENDANCE_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", ATTENDANCE_ROUTE_COMPONENT);

pub const SCHEDULE_ROUTE_COMPONENT: &str = "schedule";
pub const SCHEDULE_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", SCHEDULE_ROUTE_COMPONENT);

pub const HOLIDAYS_ROUTE_COMPONENT: &str = "holidays";
pub const HOLIDAYS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", HOLIDAYS_ROUTE_COMPONENT);

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "attendance-backend";
