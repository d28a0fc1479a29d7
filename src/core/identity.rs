//! Entity identity - prefixed numeric identifiers
//!
//! Every record in the store gets a positive integer id. For display the id
//! carries its entity prefix (`REQ-7`, `QUOT-3`), and parsing accepts either
//! the prefixed form (case-insensitive) or the bare number.

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Entity type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityPrefix {
    /// Purchase requirement
    Req,
    /// Requirement line (one product and quantity)
    Line,
    /// Provider quotation
    Quot,
    /// Quotation detail (one priced line)
    Det,
    /// Catalog product
    Prod,
    /// Provider
    Prov,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Req => "REQ",
            EntityPrefix::Line => "LINE",
            EntityPrefix::Quot => "QUOT",
            EntityPrefix::Det => "DET",
            EntityPrefix::Prod => "PROD",
            EntityPrefix::Prov => "PROV",
        }
    }

    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Req,
            EntityPrefix::Line,
            EntityPrefix::Quot,
            EntityPrefix::Det,
            EntityPrefix::Prod,
            EntityPrefix::Prov,
        ]
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityPrefix::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| IdParseError::UnknownPrefix(s.to_string()))
    }
}

/// Errors from parsing an entity id
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("Empty entity ID")]
    Empty,

    #[error("Unknown entity prefix: {0}")]
    UnknownPrefix(String),

    #[error("Expected a {expected} ID, got '{input}'")]
    WrongPrefix {
        expected: EntityPrefix,
        input: String,
    },

    #[error("Invalid entity ID '{0}': expected a positive number")]
    InvalidNumber(String),
}

/// Parse `PREFIX-N` or `N` into the numeric part, checking the prefix
pub fn parse_id(input: &str, expected: EntityPrefix) -> Result<i64, IdParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(IdParseError::Empty);
    }

    let number = match input.split_once('-') {
        Some((prefix, number)) => {
            let prefix: EntityPrefix = prefix.parse()?;
            if prefix != expected {
                return Err(IdParseError::WrongPrefix {
                    expected,
                    input: input.to_string(),
                });
            }
            number
        }
        None => input,
    };

    match number.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(IdParseError::InvalidNumber(input.to_string())),
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub const PREFIX: EntityPrefix = $prefix;

            /// Raw store key
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_id(s, Self::PREFIX).map($name)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map($name)
            }
        }
    };
}

entity_id!(
    /// Identifier of a purchase requirement
    RequirementId => EntityPrefix::Req
);
entity_id!(
    /// Identifier of a requirement line
    LineId => EntityPrefix::Line
);
entity_id!(
    /// Identifier of a provider quotation
    QuotationId => EntityPrefix::Quot
);
entity_id!(
    /// Identifier of a quotation detail
    DetailId => EntityPrefix::Det
);
entity_id!(
    /// Identifier of a catalog product
    ProductId => EntityPrefix::Prod
);
entity_id!(
    /// Identifier of a provider
    ProviderId => EntityPrefix::Prov
);
