//! Database enum types with Diesel serialization.
//!
//! Each enum maps a `CHECK` constrained text column and implements `ToSql` and
//! `FromSql` for automatic conversion between Rust and `PostgreSQL`.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;

/// How an attendance fact was captured.
///
/// Maps to `attendance.method` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceMethod {
    Manual,
    Qr,
    /// Face-recognition match; older clients send `facial_recognition`.
    #[serde(alias = "facial_recognition")]
    Face,
    /// Synthesized by the session finalizer.
    Auto,
}

impl ToSql<Text, Pg> for AttendanceMethod {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for AttendanceMethod {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"manual" => Ok(Self::Manual),
            b"qr" => Ok(Self::Qr),
            b"face" => Ok(Self::Face),
            b"auto" => Ok(Self::Auto),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl AttendanceMethod {
    /// Returns the database string representation of this method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Qr => "qr",
            Self::Face => "face",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for AttendanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived attendance label, stored as a generated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    #[must_use]
    pub const fn from_present(present: bool) -> Self {
        if present { Self::Present } else { Self::Absent }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
