//! Data-access layer. Handlers depend on [`Store`] only; the backend is chosen at startup.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::AppError;
use crate::model::{Course, CourseChanges, ListFilter, NewCourse, NewStudent, Student, StudentChanges};
use async_trait::async_trait;

/// Persistence for courses, students and enrollments.
///
/// Each method is atomic with respect to the records it touches. Contract shared by all backends:
/// - `create_*` with an `id` that already exists fails with [`AppError::Conflict`];
/// - enrolling a student id that does not exist fails with [`AppError::Validation`];
/// - `get_*` / `update_*` return `Ok(None)` and `delete_*` returns `Ok(false)` for a missing id;
/// - lists are ordered by id, and a course's `students` are ascending.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap liveness check for readiness probes.
    async fn ping(&self) -> Result<(), AppError>;

    async fn list_courses(&self, filter: &ListFilter) -> Result<Vec<Course>, AppError>;
    async fn get_course(&self, id: i64) -> Result<Option<Course>, AppError>;
    async fn create_course(&self, course: NewCourse) -> Result<Course, AppError>;
    async fn update_course(&self, id: i64, changes: CourseChanges) -> Result<Option<Course>, AppError>;
    async fn delete_course(&self, id: i64) -> Result<bool, AppError>;

    async fn list_students(&self, filter: &ListFilter) -> Result<Vec<Student>, AppError>;
    async fn get_student(&self, id: i64) -> Result<Option<Student>, AppError>;
    async fn create_student(&self, student: NewStudent) -> Result<Student, AppError>;
    async fn update_student(&self, id: i64, changes: StudentChanges) -> Result<Option<Student>, AppError>;
    /// Also removes the student from every course it was enrolled in.
    async fn delete_student(&self, id: i64) -> Result<bool, AppError>;
}
