//! Dynamic bind values.
//!
//! [`Value`] is what condition maps and payloads carry. It binds to Postgres through
//! [`ToSql`], adapting to the parameter type the server inferred for each placeholder,
//! and decodes back out of result rows by column type.

use crate::error::{OrmError, OrmResult};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use tokio_postgres::Row;
use tokio_postgres::types::{IsNull, ToSql, Type};
use uuid::Uuid;

/// A single dynamically typed SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
}

/// A value coerced to a number, as required by `BETWEEN` bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }

    pub(crate) fn into_value(self) -> Value {
        match self {
            Numeric::Int(i) => Value::Int(i),
            Numeric::Float(f) => Value::Float(f),
        }
    }
}

impl Value {
    /// Returns `true` for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Coerce to a number. Integers stay integers; text is trimmed and parsed as an
    /// integer first, then as a float. NULL, booleans, empty text, NaN and non-scalar
    /// values are not numeric.
    pub(crate) fn to_numeric(&self) -> Option<Numeric> {
        match self {
            Value::Int(i) => Some(Numeric::Int(*i)),
            Value::Float(f) if !f.is_nan() => Some(Numeric::Float(*f)),
            Value::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                if let Ok(i) = s.parse::<i64>() {
                    return Some(Numeric::Int(i));
                }
                s.parse::<f64>()
                    .ok()
                    .filter(|f| !f.is_nan())
                    .map(Numeric::Float)
            }
            Value::Json(serde_json::Value::Number(n)) => match n.as_i64() {
                Some(i) => Some(Numeric::Int(i)),
                None => n.as_f64().map(Numeric::Float),
            },
            _ => None,
        }
    }

    /// Decode column `idx` of a result row.
    pub fn from_row(row: &Row, idx: usize) -> OrmResult<Value> {
        let column = &row.columns()[idx];
        let ty = column.type_();
        let name = column.name();
        let err = |e: tokio_postgres::Error| OrmError::decode(name, e.to_string());

        let value = if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(idx).map_err(err)?.map(Value::Bool)
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(idx)
                .map_err(err)?
                .map(|v| Value::Int(v.into()))
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(idx)
                .map_err(err)?
                .map(|v| Value::Int(v.into()))
        } else if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(idx).map_err(err)?.map(Value::Int)
        } else if *ty == Type::FLOAT4 {
            row.try_get::<_, Option<f32>>(idx)
                .map_err(err)?
                .map(|v| Value::Float(v.into()))
        } else if *ty == Type::FLOAT8 {
            row.try_get::<_, Option<f64>>(idx).map_err(err)?.map(Value::Float)
        } else if is_text(ty) {
            row.try_get::<_, Option<String>>(idx).map_err(err)?.map(Value::Text)
        } else if *ty == Type::TIMESTAMPTZ {
            row.try_get::<_, Option<DateTime<Utc>>>(idx)
                .map_err(err)?
                .map(Value::Timestamp)
        } else if *ty == Type::TIMESTAMP {
            row.try_get::<_, Option<NaiveDateTime>>(idx)
                .map_err(err)?
                .map(|v| Value::Timestamp(v.and_utc()))
        } else if *ty == Type::DATE {
            row.try_get::<_, Option<NaiveDate>>(idx)
                .map_err(err)?
                .map(|v| Value::Text(v.to_string()))
        } else if *ty == Type::UUID {
            row.try_get::<_, Option<Uuid>>(idx).map_err(err)?.map(Value::Uuid)
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            row.try_get::<_, Option<serde_json::Value>>(idx)
                .map_err(err)?
                .map(Value::Json)
        } else if *ty == Type::BYTEA {
            row.try_get::<_, Option<Vec<u8>>>(idx).map_err(err)?.map(Value::Bytes)
        } else {
            return Err(OrmError::decode(name, format!("unsupported column type {ty}")));
        };

        Ok(value.unwrap_or(Value::Null))
    }
}

fn is_text(ty: &Type) -> bool {
    *ty == Type::TEXT
        || *ty == Type::VARCHAR
        || *ty == Type::BPCHAR
        || *ty == Type::NAME
        || *ty == Type::UNKNOWN
}

type BindResult = Result<IsNull, Box<dyn Error + Sync + Send>>;

fn mismatch(value: &Value, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("cannot bind {value:?} to a parameter of type {ty}").into()
}

fn bind_int(i: i64, ty: &Type, out: &mut BytesMut) -> Option<BindResult> {
    let res = if *ty == Type::INT2 {
        match i16::try_from(i) {
            Ok(v) => v.to_sql(ty, out),
            Err(e) => Err(e.into()),
        }
    } else if *ty == Type::INT4 {
        match i32::try_from(i) {
            Ok(v) => v.to_sql(ty, out),
            Err(e) => Err(e.into()),
        }
    } else if *ty == Type::INT8 {
        i.to_sql(ty, out)
    } else if *ty == Type::FLOAT4 {
        (i as f32).to_sql(ty, out)
    } else if *ty == Type::FLOAT8 {
        (i as f64).to_sql(ty, out)
    } else {
        return None;
    };
    Some(res)
}

/// `None` for fractional, non-finite or out-of-range floats.
fn integral_i64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

fn bind_text(s: &str, value: &Value, ty: &Type, out: &mut BytesMut) -> BindResult {
    if is_text(ty) {
        return s.to_sql(ty, out);
    }
    if *ty == Type::INT2 || *ty == Type::INT4 || *ty == Type::INT8 {
        let i: i64 = s.trim().parse()?;
        return bind_int(i, ty, out).unwrap_or_else(|| Err(mismatch(value, ty)));
    }
    if *ty == Type::FLOAT4 {
        return s.trim().parse::<f32>()?.to_sql(ty, out);
    }
    if *ty == Type::FLOAT8 {
        return s.trim().parse::<f64>()?.to_sql(ty, out);
    }
    if *ty == Type::BOOL {
        let b = match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => true,
            "false" | "f" | "0" => false,
            _ => return Err(mismatch(value, ty)),
        };
        return b.to_sql(ty, out);
    }
    if *ty == Type::UUID {
        return Uuid::parse_str(s.trim())?.to_sql(ty, out);
    }
    if *ty == Type::TIMESTAMPTZ {
        return DateTime::parse_from_rfc3339(s.trim())?
            .with_timezone(&Utc)
            .to_sql(ty, out);
    }
    if *ty == Type::TIMESTAMP {
        let s = s.trim();
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))?;
        return naive.to_sql(ty, out);
    }
    if *ty == Type::DATE {
        return NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?.to_sql(ty, out);
    }
    if *ty == Type::JSON || *ty == Type::JSONB {
        return serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out);
    }
    if *ty == Type::BYTEA {
        return s.as_bytes().to_sql(ty, out);
    }
    Err(mismatch(value, ty))
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> BindResult {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => {
                if *ty == Type::BOOL {
                    b.to_sql(ty, out)
                } else if is_text(ty) {
                    b.to_string().as_str().to_sql(ty, out)
                } else {
                    Err(mismatch(self, ty))
                }
            }
            Value::Int(i) => match bind_int(*i, ty, out) {
                Some(res) => res,
                None if is_text(ty) => i.to_string().as_str().to_sql(ty, out),
                None => Err(mismatch(self, ty)),
            },
            Value::Float(f) => {
                if *ty == Type::FLOAT8 {
                    f.to_sql(ty, out)
                } else if *ty == Type::FLOAT4 {
                    (*f as f32).to_sql(ty, out)
                } else if let Some(i) = integral_i64(*f) {
                    // Integral floats (JSON numbers like `5.0`) may target integer columns.
                    match bind_int(i, ty, out) {
                        Some(res) => res,
                        None if is_text(ty) => f.to_string().as_str().to_sql(ty, out),
                        None => Err(mismatch(self, ty)),
                    }
                } else if is_text(ty) {
                    f.to_string().as_str().to_sql(ty, out)
                } else {
                    Err(mismatch(self, ty))
                }
            }
            Value::Text(s) => bind_text(s, self, ty, out),
            Value::Timestamp(ts) => {
                if *ty == Type::TIMESTAMPTZ {
                    ts.to_sql(ty, out)
                } else if *ty == Type::TIMESTAMP {
                    ts.naive_utc().to_sql(ty, out)
                } else if *ty == Type::DATE {
                    ts.date_naive().to_sql(ty, out)
                } else if is_text(ty) {
                    ts.to_rfc3339().as_str().to_sql(ty, out)
                } else {
                    Err(mismatch(self, ty))
                }
            }
            Value::Uuid(u) => {
                if *ty == Type::UUID {
                    u.to_sql(ty, out)
                } else if is_text(ty) {
                    u.to_string().as_str().to_sql(ty, out)
                } else {
                    Err(mismatch(self, ty))
                }
            }
            Value::Json(j) => {
                if *ty == Type::JSON || *ty == Type::JSONB {
                    j.to_sql(ty, out)
                } else if is_text(ty) {
                    j.to_string().as_str().to_sql(ty, out)
                } else {
                    Err(mismatch(self, ty))
                }
            }
            Value::Bytes(b) => {
                if *ty == Type::BYTEA {
                    b.as_slice().to_sql(ty, out)
                } else {
                    Err(mismatch(self, ty))
                }
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

// ===== conversions =====

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(v.into())
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// JSON scalars map onto the matching variant; arrays and objects stay JSON.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Json(other),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            Value::Uuid(u) => serializer.serialize_str(&u.to_string()),
            Value::Json(j) => j.serialize(serializer),
            Value::Bytes(b) => b.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests;
