//! PostgreSQL store: table DDL, database bootstrap, and CRUD through the SQL builder.

use super::Store;
use crate::error::{AppError, ConfigError};
use crate::model::{Course, CourseChanges, ListFilter, NewCourse, NewStudent, Student, StudentChanges};
use crate::sql::{self, QueryBuf, COURSES, STUDENTS};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::{ConnectOptions, FromRow, PgConnection, PgPool, Postgres};
use std::str::FromStr;

fn bind_all(q: &QueryBuf) -> sqlx::query::Query<'_, Postgres, PgArguments> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

fn bind_all_as<T>(q: &QueryBuf) -> sqlx::query::QueryAs<'_, Postgres, T, PgArguments>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    let mut query = sqlx::query_as::<_, T>(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStore {
            pool,
            schema: schema.into(),
        }
    }

    /// Create the database if missing, open a pool, and create the tables.
    pub async fn connect(database_url: &str, schema: &str, max_connections: u32) -> Result<Self, AppError> {
        ensure_database_exists(database_url).await?;
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = PgStore::new(pool, schema);
        store.ensure_tables().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_tables(&self) -> Result<(), AppError> {
        for ddl in sql::create_tables(&self.schema) {
            sqlx::query(&ddl).execute(&self.pool).await?;
        }
        tracing::info!(schema = %self.schema, "course tables ready");
        Ok(())
    }

    async fn fetch_course(&self, conn: &mut PgConnection, id: i64) -> Result<Option<Course>, AppError> {
        let q = sql::select_courses(&self.schema, &ListFilter::by_id(id));
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        Ok(bind_all_as::<Course>(&q).fetch_optional(&mut *conn).await?)
    }

    async fn ensure_students_exist(&self, conn: &mut PgConnection, students: &[i64]) -> Result<(), AppError> {
        let sql = sql::exists_by_id(&self.schema, STUDENTS);
        for sid in students {
            let (exists,): (bool,) = sqlx::query_as(&sql).bind(*sid).fetch_one(&mut *conn).await?;
            if !exists {
                return Err(AppError::Validation(format!("student {} does not exist", sid)));
            }
        }
        Ok(())
    }

    /// Replace all enrollment rows of a course. Call within a transaction.
    async fn replace_enrollments(&self, conn: &mut PgConnection, course_id: i64, students: &[i64]) -> Result<(), AppError> {
        self.ensure_students_exist(conn, students).await?;
        sqlx::query(&sql::delete_enrollments(&self.schema))
            .bind(course_id)
            .execute(&mut *conn)
            .await?;
        let insert = sql::insert_enrollment(&self.schema);
        for sid in students {
            sqlx::query(&insert).bind(course_id).bind(*sid).execute(&mut *conn).await?;
        }
        Ok(())
    }

    async fn sync_sequence(&self, conn: &mut PgConnection, table: &str) -> Result<(), AppError> {
        sqlx::query(&sql::sync_id_sequence(&self.schema, table))
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn delete_row(&self, table: &str, id: i64) -> Result<bool, AppError> {
        let deleted: Option<(i64,)> = sqlx::query_as(&sql::delete_by_id(&self.schema, table))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(deleted.is_some())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn list_courses(&self, filter: &ListFilter) -> Result<Vec<Course>, AppError> {
        let q = sql::select_courses(&self.schema, filter);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        Ok(bind_all_as::<Course>(&q).fetch_all(&self.pool).await?)
    }

    async fn get_course(&self, id: i64) -> Result<Option<Course>, AppError> {
        let mut conn = self.pool.acquire().await?;
        self.fetch_course(&mut conn, id).await
    }

    async fn create_course(&self, course: NewCourse) -> Result<Course, AppError> {
        let mut tx = self.pool.begin().await?;
        let q = sql::insert_course(&self.schema, &course);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        let (id,): (i64,) = bind_all_as(&q).fetch_one(&mut *tx).await?;
        if course.id.is_some() {
            self.sync_sequence(&mut tx, COURSES).await?;
        }
        if !course.students.is_empty() {
            self.replace_enrollments(&mut tx, id, &course.students).await?;
        }
        let created = self
            .fetch_course(&mut tx, id)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update_course(&self, id: i64, changes: CourseChanges) -> Result<Option<Course>, AppError> {
        let mut tx = self.pool.begin().await?;
        let (exists,): (bool,) = sqlx::query_as(&sql::exists_by_id(&self.schema, COURSES))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Ok(None);
        }
        if let Some(name) = changes.name.as_deref() {
            let q = sql::update_course_name(&self.schema, id, name);
            tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
            bind_all(&q).execute(&mut *tx).await?;
        }
        if let Some(students) = changes.students.as_deref() {
            self.replace_enrollments(&mut tx, id, students).await?;
        }
        let updated = self.fetch_course(&mut tx, id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_course(&self, id: i64) -> Result<bool, AppError> {
        self.delete_row(COURSES, id).await
    }

    async fn list_students(&self, filter: &ListFilter) -> Result<Vec<Student>, AppError> {
        let q = sql::select_students(&self.schema, filter);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        Ok(bind_all_as::<Student>(&q).fetch_all(&self.pool).await?)
    }

    async fn get_student(&self, id: i64) -> Result<Option<Student>, AppError> {
        let q = sql::select_students(&self.schema, &ListFilter::by_id(id));
        Ok(bind_all_as::<Student>(&q).fetch_optional(&self.pool).await?)
    }

    async fn create_student(&self, student: NewStudent) -> Result<Student, AppError> {
        let mut tx = self.pool.begin().await?;
        let q = sql::insert_student(&self.schema, &student);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        let created: Student = bind_all_as(&q).fetch_one(&mut *tx).await?;
        if student.id.is_some() {
            self.sync_sequence(&mut tx, STUDENTS).await?;
        }
        tx.commit().await?;
        Ok(created)
    }

    async fn update_student(&self, id: i64, changes: StudentChanges) -> Result<Option<Student>, AppError> {
        let q = sql::update_student(&self.schema, id, &changes);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        Ok(bind_all_as::<Student>(&q).fetch_optional(&self.pool).await?)
    }

    async fn delete_student(&self, id: i64) -> Result<bool, AppError> {
        // Enrollment rows go with it via ON DELETE CASCADE.
        self.delete_row(STUDENTS, id).await
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| invalid_database_url(e.to_string()))?;
    let mut conn: PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn invalid_database_url(reason: String) -> AppError {
    ConfigError::InvalidValue {
        key: "DATABASE_URL",
        reason,
    }
    .into()
}

/// Split a connection URL into (url of the `postgres` admin database, target database name).
fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = url
        .get(scheme_end..)
        .and_then(|rest| rest.find('/'))
        .map(|i| scheme_end + i + 1)
        .ok_or_else(|| invalid_database_url("no database path".into()))?;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let mut parts = path_and_query.splitn(2, '?');
    let db_name = parts.next().unwrap_or("").trim();
    let query = parts.next().map(|q| format!("?{}", q)).unwrap_or_default();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres{}", base, query), db_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::PgBindValue;

    #[test]
    fn admin_url_keeps_host_and_query() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@db:5432/courses?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@db:5432/postgres?sslmode=disable");
        assert_eq!(db, "courses");
    }

    #[test]
    fn url_without_path_is_rejected() {
        assert!(matches!(
            parse_db_name_from_url("postgres://localhost"),
            Err(AppError::Config(ConfigError::InvalidValue { key: "DATABASE_URL", .. }))
        ));
    }

    #[test]
    fn bind_values_follow_builder_order() {
        let q = sql::select_courses("public", &ListFilter::by_name("Math"));
        assert_eq!(q.params, vec![PgBindValue::Text("Math".into())]);
    }
}
