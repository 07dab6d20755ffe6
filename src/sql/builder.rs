//! Builds parameterized DDL, SELECT, INSERT, UPDATE and DELETE for the course and student tables.

use super::params::PgBindValue;
use crate::model::{ListFilter, NewCourse, NewStudent, StudentChanges};

pub const COURSES: &str = "courses";
pub const STUDENTS: &str = "students";
pub const ENROLLMENTS: &str = "course_students";

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: impl Into<PgBindValue>) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v.into());
        n
    }
}

/// CREATE SCHEMA / TABLE statements, in dependency order. All are idempotent.
pub fn create_tables(schema: &str) -> Vec<String> {
    let courses = qualified_table(schema, COURSES);
    let students = qualified_table(schema, STUDENTS);
    let enrollments = qualified_table(schema, ENROLLMENTS);
    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                "id" BIGSERIAL PRIMARY KEY,
                "name" TEXT NOT NULL,
                "birth_date" DATE
            )
            "#,
            students
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                "id" BIGSERIAL PRIMARY KEY,
                "name" TEXT NOT NULL
            )
            "#,
            courses
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                "course_id" BIGINT NOT NULL REFERENCES {} ("id") ON DELETE CASCADE,
                "student_id" BIGINT NOT NULL REFERENCES {} ("id") ON DELETE CASCADE,
                PRIMARY KEY ("course_id", "student_id")
            )
            "#,
            enrollments, courses, students
        ),
    ]
}

/// WHERE / LIMIT / OFFSET for list filters. `alias` prefixes the id and name columns.
fn filter_clauses(q: &mut QueryBuf, alias: &str, filter: &ListFilter) -> (String, String) {
    let mut where_parts = Vec::new();
    if let Some(id) = filter.id {
        let n = q.push_param(id);
        where_parts.push(format!("{}.{} = ${}::bigint", alias, quoted("id"), n));
    }
    if let Some(name) = filter.name.as_deref() {
        let n = q.push_param(name);
        where_parts.push(format!("{}.{} = ${}::text", alias, quoted("name"), n));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let limit_clause = filter
        .effective_limit()
        .map(|n| format!(" LIMIT {}", n))
        .unwrap_or_default();
    let offset_clause = filter.offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();
    (where_clause, format!("{}{}", limit_clause, offset_clause))
}

/// SELECT courses with their enrolled student ids aggregated into an ascending BIGINT[].
pub fn select_courses(schema: &str, filter: &ListFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let (where_clause, page_clause) = filter_clauses(&mut q, "c", filter);
    q.sql = format!(
        "SELECT c.\"id\", c.\"name\", \
         COALESCE(ARRAY_AGG(e.\"student_id\" ORDER BY e.\"student_id\") FILTER (WHERE e.\"student_id\" IS NOT NULL), ARRAY[]::BIGINT[]) AS \"students\" \
         FROM {} c LEFT JOIN {} e ON e.\"course_id\" = c.\"id\"{} \
         GROUP BY c.\"id\", c.\"name\" ORDER BY c.\"id\"{}",
        qualified_table(schema, COURSES),
        qualified_table(schema, ENROLLMENTS),
        where_clause,
        page_clause
    );
    q
}

pub fn select_students(schema: &str, filter: &ListFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let (where_clause, page_clause) = filter_clauses(&mut q, "s", filter);
    q.sql = format!(
        "SELECT s.\"id\", s.\"name\", s.\"birth_date\" FROM {} s{} ORDER BY s.\"id\"{}",
        qualified_table(schema, STUDENTS),
        where_clause,
        page_clause
    );
    q
}

/// INSERT a course row. The id column is included only when the caller supplied one.
pub fn insert_course(schema: &str, course: &NewCourse) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    if let Some(id) = course.id {
        let n = q.push_param(id);
        cols.push(quoted("id"));
        placeholders.push(format!("${}::bigint", n));
    }
    let n = q.push_param(course.name.as_str());
    cols.push(quoted("name"));
    placeholders.push(format!("${}::text", n));
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING \"id\"",
        qualified_table(schema, COURSES),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

pub fn insert_student(schema: &str, student: &NewStudent) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    if let Some(id) = student.id {
        let n = q.push_param(id);
        cols.push(quoted("id"));
        placeholders.push(format!("${}::bigint", n));
    }
    let n = q.push_param(student.name.as_str());
    cols.push(quoted("name"));
    placeholders.push(format!("${}::text", n));
    let n = q.push_param(student.birth_date);
    cols.push(quoted("birth_date"));
    placeholders.push(format!("${}::date", n));
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING \"id\", \"name\", \"birth_date\"",
        qualified_table(schema, STUDENTS),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE course name by id. Returns the id so a missing row yields no result.
pub fn update_course_name(schema: &str, id: i64, name: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let name_param = q.push_param(name);
    let id_param = q.push_param(id);
    q.sql = format!(
        "UPDATE {} SET \"name\" = ${}::text WHERE \"id\" = ${}::bigint RETURNING \"id\"",
        qualified_table(schema, COURSES),
        name_param,
        id_param
    );
    q
}

/// UPDATE student by id: SET only the fields present in `changes`.
/// With nothing to change it degrades to a SELECT so existence is still checked.
pub fn update_student(schema: &str, id: i64, changes: &StudentChanges) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, STUDENTS);
    let mut sets = Vec::new();
    if let Some(name) = changes.name.as_deref() {
        let n = q.push_param(name);
        sets.push(format!("\"name\" = ${}::text", n));
    }
    if let Some(birth_date) = changes.birth_date {
        let n = q.push_param(birth_date);
        sets.push(format!("\"birth_date\" = ${}::date", n));
    }
    let id_param = q.push_param(id);
    q.sql = if sets.is_empty() {
        format!(
            "SELECT \"id\", \"name\", \"birth_date\" FROM {} WHERE \"id\" = ${}::bigint",
            table, id_param
        )
    } else {
        format!(
            "UPDATE {} SET {} WHERE \"id\" = ${}::bigint RETURNING \"id\", \"name\", \"birth_date\"",
            table,
            sets.join(", "),
            id_param
        )
    };
    q
}

/// DELETE by id from `table`, returning the id.
pub fn delete_by_id(schema: &str, table: &str) -> String {
    format!(
        "DELETE FROM {} WHERE \"id\" = $1::bigint RETURNING \"id\"",
        qualified_table(schema, table)
    )
}

pub fn exists_by_id(schema: &str, table: &str) -> String {
    format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE \"id\" = $1::bigint)",
        qualified_table(schema, table)
    )
}

pub fn delete_enrollments(schema: &str) -> String {
    format!(
        "DELETE FROM {} WHERE \"course_id\" = $1::bigint",
        qualified_table(schema, ENROLLMENTS)
    )
}

pub fn insert_enrollment(schema: &str) -> String {
    format!(
        "INSERT INTO {} (\"course_id\", \"student_id\") VALUES ($1::bigint, $2::bigint) ON CONFLICT DO NOTHING",
        qualified_table(schema, ENROLLMENTS)
    )
}

/// Move the id sequence past MAX(id) so rows inserted with an explicit id do not collide with later defaults.
pub fn sync_id_sequence(schema: &str, table: &str) -> String {
    let t = qualified_table(schema, table);
    format!(
        "SELECT setval(pg_get_serial_sequence('{}', 'id'), COALESCE(MAX(\"id\"), 0) + 1, false) FROM {}",
        t.replace('\'', "''"),
        t
    )
}
