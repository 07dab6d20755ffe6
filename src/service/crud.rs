//! Resource operations on top of a [`Store`]: validation of typed input, not-found mapping, enrollment limits.

use crate::error::AppError;
use crate::model::{Course, CourseChanges, ListFilter, NewCourse, NewStudent, Student, StudentChanges};
use crate::store::Store;

/// Sort and dedupe enrolled ids, then enforce the per-course cap.
fn normalize_students(mut students: Vec<i64>, max_students: usize) -> Result<Vec<i64>, AppError> {
    students.sort_unstable();
    students.dedup();
    if students.len() > max_students {
        return Err(AppError::Validation(format!(
            "a course may have at most {} students (got {})",
            max_students,
            students.len()
        )));
    }
    Ok(students)
}

fn course_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("course {}", id))
}

fn student_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("student {}", id))
}

pub struct CourseService;

impl CourseService {
    pub async fn list(store: &dyn Store, filter: &ListFilter) -> Result<Vec<Course>, AppError> {
        store.list_courses(filter).await
    }

    pub async fn read(store: &dyn Store, id: i64) -> Result<Course, AppError> {
        store.get_course(id).await?.ok_or_else(|| course_not_found(id))
    }

    pub async fn create(store: &dyn Store, mut course: NewCourse, max_students: usize) -> Result<Course, AppError> {
        course.students = normalize_students(course.students, max_students)?;
        let created = store.create_course(course).await?;
        tracing::info!(id = created.id, students = created.students.len(), "course created");
        Ok(created)
    }

    pub async fn update(
        store: &dyn Store,
        id: i64,
        mut changes: CourseChanges,
        max_students: usize,
    ) -> Result<Course, AppError> {
        changes.students = changes
            .students
            .map(|s| normalize_students(s, max_students))
            .transpose()?;
        let updated = store.update_course(id, changes).await?.ok_or_else(|| course_not_found(id))?;
        tracing::info!(id, "course updated");
        Ok(updated)
    }

    pub async fn delete(store: &dyn Store, id: i64) -> Result<(), AppError> {
        if !store.delete_course(id).await? {
            return Err(course_not_found(id));
        }
        tracing::info!(id, "course deleted");
        Ok(())
    }
}

pub struct StudentService;

impl StudentService {
    pub async fn list(store: &dyn Store, filter: &ListFilter) -> Result<Vec<Student>, AppError> {
        store.list_students(filter).await
    }

    pub async fn read(store: &dyn Store, id: i64) -> Result<Student, AppError> {
        store.get_student(id).await?.ok_or_else(|| student_not_found(id))
    }

    pub async fn create(store: &dyn Store, student: NewStudent) -> Result<Student, AppError> {
        let created = store.create_student(student).await?;
        tracing::info!(id = created.id, "student created");
        Ok(created)
    }

    pub async fn update(store: &dyn Store, id: i64, changes: StudentChanges) -> Result<Student, AppError> {
        let updated = store
            .update_student(id, changes)
            .await?
            .ok_or_else(|| student_not_found(id))?;
        tracing::info!(id, "student updated");
        Ok(updated)
    }

    pub async fn delete(store: &dyn Store, id: i64) -> Result<(), AppError> {
        if !store.delete_student(id).await? {
            return Err(student_not_found(id));
        }
        tracing::info!(id, "student deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn students_are_deduped_before_the_cap() {
        assert_eq!(normalize_students(vec![3, 1, 3, 2, 1], 3).unwrap(), vec![1, 2, 3]);
        assert!(matches!(normalize_students(vec![1, 2, 3], 2), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let store = MemoryStore::new();
        let course = NewCourse {
            name: "Logic".into(),
            ..Default::default()
        };
        let created = CourseService::create(&store, course, 20).await.unwrap();
        CourseService::delete(&store, created.id).await.unwrap();
        let err = CourseService::delete(&store, created.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn enrollment_cap_applies_on_update() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for name in ["a", "b", "c"] {
            let s = StudentService::create(
                &store,
                NewStudent {
                    name: name.into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
            ids.push(s.id);
        }
        let course = CourseService::create(
            &store,
            NewCourse {
                name: "Chem".into(),
                ..Default::default()
            },
            2,
        )
        .await
        .unwrap();
        let changes = CourseChanges {
            name: None,
            students: Some(ids),
        };
        let err = CourseService::update(&store, course.id, changes, 2).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(CourseService::read(&store, course.id).await.unwrap().students.is_empty());
    }
}
