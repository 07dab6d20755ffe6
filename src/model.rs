//! Resource records and the typed inputs produced by request validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: i64,
    pub name: String,
    /// Enrolled student ids, ascending.
    pub students: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewCourse {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub students: Vec<i64>,
}

/// Fields to change on an existing course. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CourseChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub students: Option<Vec<i64>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewStudent {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StudentChanges {
    #[serde(default)]
    pub name: Option<String>,
    /// Outer `None`: untouched. `Some(None)`: cleared.
    #[serde(default, deserialize_with = "present")]
    pub birth_date: Option<Option<NaiveDate>>,
}

/// Distinguishes an explicit `null` from an absent key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query-string filters accepted by list endpoints. Filters are exact match.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListFilter {
    pub const MAX_LIMIT: u32 = 1000;

    pub fn by_id(id: i64) -> Self {
        ListFilter {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        ListFilter {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn effective_limit(&self) -> Option<u32> {
        self.limit.map(|n| n.min(Self::MAX_LIMIT))
    }

    pub fn matches(&self, id: i64, name: &str) -> bool {
        self.id.map_or(true, |want| want == id) && self.name.as_deref().map_or(true, |want| want == name)
    }
}
