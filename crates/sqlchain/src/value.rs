//! Typed values and their two renderings: inlined SQL literal or bound parameter.

use crate::driver::Statement;
use crate::error::SqlResult;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Format used when a temporal value is inlined as a literal.
pub const DATE_LITERAL_FORMAT: &str = "%Y-%m-%d";

/// A value that can be written into a statement.
///
/// The set of kinds is closed: every variant has exactly one literal form and
/// one bind path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Text, inlined as `'...'`
    Text(String),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// Double precision float
    Double(f64),
    /// Single precision float
    Float(f32),
    /// Boolean, inlined as `true` / `false`
    Bool(bool),
    /// Timestamp; the literal form keeps only the date part
    Timestamp(NaiveDateTime),
    /// Calendar date
    Date(NaiveDate),
    /// Pre-rendered SQL, inlined verbatim
    Raw(String),
}

impl Value {
    /// Wrap pre-rendered SQL text (e.g. `NOW()`) that is inlined as-is.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Render as literal SQL text.
    ///
    /// Text is wrapped in single quotes without escaping, so embedded quotes
    /// reach the SQL unchanged. Only pass trusted text through literal mode.
    ///
    /// `Null` renders as an empty string rather than `NULL`; a literal-mode
    /// statement containing it is malformed at the value position.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => format!("'{s}'"),
            Value::Int(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Timestamp(ts) => format!("'{}'", ts.format(DATE_LITERAL_FORMAT)),
            Value::Date(d) => format!("'{}'", d.format(DATE_LITERAL_FORMAT)),
            Value::Raw(sql) => sql.clone(),
        }
    }

    /// Bind into a prepared statement slot (1-based).
    pub fn bind_to<S: Statement + ?Sized>(&self, stmt: &mut S, index: usize) -> SqlResult<()> {
        match self {
            Value::Null => stmt.bind_null(index),
            Value::Text(s) => stmt.bind_text(index, s),
            Value::Int(v) => stmt.bind_int(index, *v),
            Value::Long(v) => stmt.bind_long(index, *v),
            Value::Double(v) => stmt.bind_double(index, *v),
            Value::Float(v) => stmt.bind_float(index, *v),
            Value::Bool(v) => stmt.bind_bool(index, *v),
            Value::Timestamp(ts) => stmt.bind_timestamp(index, *ts),
            Value::Date(d) => stmt.bind_date(index, *d),
            Value::Raw(_) => stmt.bind_object(index, self),
        }
    }

    /// Whether this is `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view for `Int` and `Long`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view for `Text` and `Raw`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Raw(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    String => Text,
    i32 => Int,
    i64 => Long,
    f64 => Double,
    f32 => Float,
    bool => Bool,
    NaiveDateTime => Timestamp,
    NaiveDate => Date,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
