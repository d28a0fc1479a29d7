//! SQLite serialization for typed enums
//!
//! Requirement states are stored as their single-character codes.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::core::lifecycle::RequirementState;

// =========================================================================
// RequirementState - ToSql/FromSql
// =========================================================================

impl ToSql for RequirementState {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for RequirementState {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        RequirementState::from_code(s).ok_or_else(|| {
            FromSqlError::Other(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Unknown requirement state code: {}", s),
            )))
        })
    }
}
