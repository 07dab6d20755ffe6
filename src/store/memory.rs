//! In-process store. Used by the test suite and by `COURSES_STORAGE=memory`.

use super::Store;
use crate::error::AppError;
use crate::model::{Course, CourseChanges, ListFilter, NewCourse, NewStudent, Student, StudentChanges};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

struct CourseRow {
    name: String,
    students: BTreeSet<i64>,
}

struct Tables {
    courses: BTreeMap<i64, CourseRow>,
    students: BTreeMap<i64, Student>,
    next_course_id: i64,
    next_student_id: i64,
}

impl Tables {
    fn course(&self, id: i64) -> Option<Course> {
        self.courses.get(&id).map(|row| Course {
            id,
            name: row.name.clone(),
            students: row.students.iter().copied().collect(),
        })
    }

    fn check_students(&self, ids: &[i64]) -> Result<(), AppError> {
        match ids.iter().find(|id| !self.students.contains_key(id)) {
            Some(missing) => Err(AppError::Validation(format!("student {} does not exist", missing))),
            None => Ok(()),
        }
    }
}

/// Picks the id for a new row and advances the counter past it.
fn assign_id<T>(rows: &BTreeMap<i64, T>, next: &mut i64, requested: Option<i64>, kind: &str) -> Result<i64, AppError> {
    let id = match requested {
        Some(id) if rows.contains_key(&id) => {
            return Err(AppError::Conflict(format!("{} with id {} already exists", kind, id)));
        }
        Some(id) => id,
        None => {
            let mut id = *next;
            while rows.contains_key(&id) {
                id = id.checked_add(1).ok_or_else(|| exhausted(kind))?;
            }
            id
        }
    };
    *next = (*next).max(id.checked_add(1).ok_or_else(|| exhausted(kind))?);
    Ok(id)
}

fn exhausted(kind: &str) -> AppError {
    AppError::Validation(format!("no {} ids left to assign", kind))
}

fn page<T>(items: impl Iterator<Item = T>, filter: &ListFilter) -> Vec<T> {
    let skipped = items.skip(filter.offset.unwrap_or(0) as usize);
    match filter.effective_limit() {
        Some(n) => skipped.take(n as usize).collect(),
        None => skipped.collect(),
    }
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            tables: RwLock::new(Tables {
                courses: BTreeMap::new(),
                students: BTreeMap::new(),
                next_course_id: 1,
                next_student_id: 1,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_courses(&self, filter: &ListFilter) -> Result<Vec<Course>, AppError> {
        let t = self.tables.read().await;
        let matching = t
            .courses
            .iter()
            .filter(|(id, row)| filter.matches(**id, &row.name))
            .filter_map(|(id, _)| t.course(*id));
        Ok(page(matching, filter))
    }

    async fn get_course(&self, id: i64) -> Result<Option<Course>, AppError> {
        Ok(self.tables.read().await.course(id))
    }

    async fn create_course(&self, course: NewCourse) -> Result<Course, AppError> {
        let mut guard = self.tables.write().await;
        let t = &mut *guard;
        t.check_students(&course.students)?;
        let id = assign_id(&t.courses, &mut t.next_course_id, course.id, "course")?;
        t.courses.insert(
            id,
            CourseRow {
                name: course.name,
                students: course.students.into_iter().collect(),
            },
        );
        t.course(id).ok_or_else(|| AppError::NotFound(format!("course {}", id)))
    }

    async fn update_course(&self, id: i64, changes: CourseChanges) -> Result<Option<Course>, AppError> {
        let mut t = self.tables.write().await;
        if !t.courses.contains_key(&id) {
            return Ok(None);
        }
        if let Some(students) = changes.students.as_deref() {
            t.check_students(students)?;
        }
        if let Some(row) = t.courses.get_mut(&id) {
            if let Some(name) = changes.name {
                row.name = name;
            }
            if let Some(students) = changes.students {
                row.students = students.into_iter().collect();
            }
        }
        Ok(t.course(id))
    }

    async fn delete_course(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.write().await.courses.remove(&id).is_some())
    }

    async fn list_students(&self, filter: &ListFilter) -> Result<Vec<Student>, AppError> {
        let t = self.tables.read().await;
        let matching = t
            .students
            .values()
            .filter(|s| filter.matches(s.id, &s.name))
            .cloned();
        Ok(page(matching, filter))
    }

    async fn get_student(&self, id: i64) -> Result<Option<Student>, AppError> {
        Ok(self.tables.read().await.students.get(&id).cloned())
    }

    async fn create_student(&self, student: NewStudent) -> Result<Student, AppError> {
        let mut guard = self.tables.write().await;
        let t = &mut *guard;
        let id = assign_id(&t.students, &mut t.next_student_id, student.id, "student")?;
        let row = Student {
            id,
            name: student.name,
            birth_date: student.birth_date,
        };
        t.students.insert(id, row.clone());
        Ok(row)
    }

    async fn update_student(&self, id: i64, changes: StudentChanges) -> Result<Option<Student>, AppError> {
        let mut t = self.tables.write().await;
        let Some(row) = t.students.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(birth_date) = changes.birth_date {
            row.birth_date = birth_date;
        }
        Ok(Some(row.clone()))
    }

    async fn delete_student(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.tables.write().await;
        if t.students.remove(&id).is_none() {
            return Ok(false);
        }
        for row in t.courses.values_mut() {
            row.students.remove(&id);
        }
        Ok(true)
    }
}
