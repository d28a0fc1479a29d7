//! Table definitions
//!
//! Applied idempotently every time a database is opened.

use rusqlite::Connection;

/// Stored in `PRAGMA user_version` after the schema is applied
pub const SCHEMA_VERSION: i32 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    description     TEXT,
    product_type    TEXT,
    active          INTEGER NOT NULL DEFAULT 1,
    created         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS providers (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    ruc             TEXT UNIQUE CHECK (ruc IS NULL OR length(ruc) <= 15),
    manager         TEXT,
    email           TEXT,
    phone           TEXT,
    address         TEXT,
    observation     TEXT,
    active          INTEGER NOT NULL DEFAULT 1,
    created         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS requirements (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    place           TEXT,
    destination     TEXT,
    emission_date   TEXT,
    expiration_date TEXT,
    claimant        TEXT,
    author          TEXT NOT NULL,
    state           TEXT NOT NULL DEFAULT '0',
    created         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS requires (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    requirement_id  INTEGER NOT NULL REFERENCES requirements(id),
    product_id      INTEGER NOT NULL REFERENCES products(id),
    amount          REAL NOT NULL CHECK (amount > 0),
    unit_measure    TEXT,
    suggested_price REAL CHECK (suggested_price IS NULL OR suggested_price >= 0),
    observation     TEXT
);

CREATE TABLE IF NOT EXISTS quotations (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    requirement_id  INTEGER NOT NULL REFERENCES requirements(id),
    provider_id     INTEGER NOT NULL REFERENCES providers(id),
    author          TEXT NOT NULL,
    emission_date   TEXT,
    deliver_date    TEXT,
    observation     TEXT,
    suggest_winner  INTEGER NOT NULL DEFAULT 0,
    winner          INTEGER NOT NULL DEFAULT 0,
    winner_level    INTEGER NOT NULL DEFAULT 0,
    created         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS quotation_details (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    quotation_id          INTEGER NOT NULL REFERENCES quotations(id),
    require_id            INTEGER NOT NULL REFERENCES requires(id),
    unit_price            REAL NOT NULL CHECK (unit_price >= 0),
    winner_level_provider INTEGER,
    winner_provider_id    INTEGER REFERENCES providers(id),
    UNIQUE (quotation_id, require_id)
);

CREATE INDEX IF NOT EXISTS idx_requires_requirement ON requires(requirement_id);
CREATE INDEX IF NOT EXISTS idx_quotations_requirement ON quotations(requirement_id);
CREATE INDEX IF NOT EXISTS idx_details_quotation ON quotation_details(quotation_id);
CREATE INDEX IF NOT EXISTS idx_details_require ON quotation_details(require_id);
CREATE INDEX IF NOT EXISTS idx_requirements_state ON requirements(state);
"#;

/// Enable foreign keys and create any missing tables
pub fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.execute_batch(SCHEMA)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}
