pub mod attendance;
pub mod class;
pub mod enrollment;
pub mod holiday;
pub mod schedule;
pub mod student;
