//! Values that can be bound to a PostgreSQL query built by [`super::builder`].

use chrono::NaiveDate;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    I64(i64),
    Text(String),
    Date(NaiveDate),
}

impl From<i64> for PgBindValue {
    fn from(n: i64) -> Self {
        PgBindValue::I64(n)
    }
}

impl From<&str> for PgBindValue {
    fn from(s: &str) -> Self {
        PgBindValue::Text(s.to_string())
    }
}

impl From<Option<NaiveDate>> for PgBindValue {
    fn from(d: Option<NaiveDate>) -> Self {
        d.map_or(PgBindValue::Null, PgBindValue::Date)
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null => IsNull::Yes,
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::Text(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
            PgBindValue::Date(d) => <NaiveDate as Encode<Postgres>>::encode_by_ref(d, buf)?,
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBindValue::Null | PgBindValue::Text(_) => PgTypeInfo::with_name("TEXT"),
            PgBindValue::I64(_) => PgTypeInfo::with_name("INT8"),
            PgBindValue::Date(_) => PgTypeInfo::with_name("DATE"),
        })
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}
