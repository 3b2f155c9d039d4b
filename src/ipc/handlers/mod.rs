pub mod announcements;
pub mod attendance;
pub mod core;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod grades;
pub mod students;
