pub mod analytics;
pub mod assignments;
pub mod attendance;
pub mod core;
pub mod courses;
pub mod students;
