//! Positional parameter values that sqlx can bind.

use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

/// A value bound to a `$n` placeholder. Both variants declare `text`, so ids
/// reach PostgreSQL as written and `::integer` casts them server-side.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    Text(String),
}

impl From<Option<String>> for PgBindValue {
    fn from(v: Option<String>) -> Self {
        v.map(PgBindValue::Text).unwrap_or(PgBindValue::Null)
    }
}

impl From<&str> for PgBindValue {
    fn from(v: &str) -> Self {
        PgBindValue::Text(v.to_string())
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null => <Option<String> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            PgBindValue::Text(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(<String as Type<Postgres>>::type_info())
    }
}

impl Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }
}
