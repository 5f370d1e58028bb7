//! Typed bind values: request JSON coerced to the declared scalar type of the field it filters.

use crate::error::AppError;
use crate::schema::ScalarType;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;
use uuid::Uuid;

/// A value that can be bound to a PostgreSQL query; reports its own type so no SQL casts are needed.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    Bool(bool),
    I64(i64),
    String(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Json(Value),
}

fn mismatch(field: &str, expected: &str, v: &Value) -> AppError {
    AppError::BadRequest(format!("{} expects {}, got {}", field, expected, v))
}

impl PgBindValue {
    /// Coerce `v` to the column type of `field`.
    pub fn for_type(field: &str, ty: ScalarType, v: &Value) -> Result<Self, AppError> {
        if v.is_null() {
            return Ok(PgBindValue::Null);
        }
        Ok(match ty {
            ScalarType::Uuid => {
                let s = v.as_str().ok_or_else(|| mismatch(field, "a uuid", v))?;
                PgBindValue::Uuid(Uuid::parse_str(s).map_err(|_| mismatch(field, "a uuid", v))?)
            }
            ScalarType::Bool => match v {
                Value::Bool(b) => PgBindValue::Bool(*b),
                Value::String(s) if s.eq_ignore_ascii_case("true") || s == "1" => PgBindValue::Bool(true),
                Value::String(s) if s.eq_ignore_ascii_case("false") || s == "0" => PgBindValue::Bool(false),
                Value::Number(n) if n.as_i64() == Some(1) => PgBindValue::Bool(true),
                Value::Number(n) if n.as_i64() == Some(0) => PgBindValue::Bool(false),
                _ => return Err(mismatch(field, "a boolean", v)),
            },
            ScalarType::Int => match v {
                Value::Number(n) => PgBindValue::I64(n.as_i64().ok_or_else(|| mismatch(field, "an integer", v))?),
                Value::String(s) => PgBindValue::I64(s.parse().map_err(|_| mismatch(field, "an integer", v))?),
                _ => return Err(mismatch(field, "an integer", v)),
            },
            ScalarType::Timestamp => {
                let s = v.as_str().ok_or_else(|| mismatch(field, "a timestamp", v))?;
                let parsed = DateTime::parse_from_rfc3339(s).map_err(|_| mismatch(field, "a timestamp", v))?;
                PgBindValue::Timestamp(parsed.with_timezone(&Utc))
            }
            ScalarType::Text => match v {
                Value::String(s) => PgBindValue::String(s.clone()),
                Value::Number(_) | Value::Bool(_) => PgBindValue::String(v.to_string()),
                _ => return Err(mismatch(field, "a string", v)),
            },
            ScalarType::Json => PgBindValue::Json(v.clone()),
        })
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null => IsNull::Yes,
            PgBindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::String(s) => <String as Encode<Postgres>>::encode_by_ref(s, buf)?,
            PgBindValue::Uuid(u) => <Uuid as Encode<Postgres>>::encode_by_ref(u, buf)?,
            PgBindValue::Timestamp(t) => <DateTime<Utc> as Encode<Postgres>>::encode_by_ref(t, buf)?,
            PgBindValue::Json(v) => <Value as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBindValue::Null | PgBindValue::String(_) => <String as sqlx::Type<Postgres>>::type_info(),
            PgBindValue::Bool(_) => <bool as sqlx::Type<Postgres>>::type_info(),
            PgBindValue::I64(_) => <i64 as sqlx::Type<Postgres>>::type_info(),
            PgBindValue::Uuid(_) => <Uuid as sqlx::Type<Postgres>>::type_info(),
            PgBindValue::Timestamp(_) => <DateTime<Utc> as sqlx::Type<Postgres>>::type_info(),
            PgBindValue::Json(_) => <Value as sqlx::Type<Postgres>>::type_info(),
        })
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_by_declared_type() {
        let id = Uuid::new_v4();
        assert_eq!(
            PgBindValue::for_type("id", ScalarType::Uuid, &json!(id.to_string())).unwrap(),
            PgBindValue::Uuid(id)
        );
        assert_eq!(
            PgBindValue::for_type("isCanonical", ScalarType::Bool, &json!("true")).unwrap(),
            PgBindValue::Bool(true)
        );
        assert_eq!(
            PgBindValue::for_type("position", ScalarType::Int, &json!("3")).unwrap(),
            PgBindValue::I64(3)
        );
        assert_eq!(
            PgBindValue::for_type("slug", ScalarType::Text, &json!(id.to_string())).unwrap(),
            PgBindValue::String(id.to_string())
        );
        assert_eq!(PgBindValue::for_type("slug", ScalarType::Text, &Value::Null).unwrap(), PgBindValue::Null);
    }

    #[test]
    fn rejects_values_of_the_wrong_shape() {
        assert!(PgBindValue::for_type("id", ScalarType::Uuid, &json!("my-post")).is_err());
        assert!(PgBindValue::for_type("active", ScalarType::Bool, &json!("yes")).is_err());
        assert!(PgBindValue::for_type("publishedAt", ScalarType::Timestamp, &json!(12)).is_err());
    }
}
