//! Resource services and request validation.

mod crud;
mod validation;
pub use crud::{CourseService, StudentService};
pub use validation::{FieldKind, FieldRule, RequestValidator, COURSE_FIELDS, ID_MAXIMUM, NAME_MAX_LENGTH, STUDENT_FIELDS};
