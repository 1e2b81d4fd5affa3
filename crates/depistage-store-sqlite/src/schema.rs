//! SQL schema for the screening store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Rows are inserted once and deleted individually; never updated.
CREATE TABLE IF NOT EXISTS screenings (
    id                   TEXT PRIMARY KEY,
    screening_number     TEXT NOT NULL,
    date                 TEXT NOT NULL,    -- YYYY-MM-DD
    last_name            TEXT NOT NULL,
    first_name           TEXT NOT NULL,
    age                  INTEGER NOT NULL CHECK (age > 0),
    phone                TEXT NOT NULL,
    address              TEXT NOT NULL,
    vaccination          INTEGER NOT NULL DEFAULT 0,
    mammography          TEXT,             -- 'oui' | 'non' | NULL
    mammography_date     TEXT,
    gyneco_consultation  INTEGER NOT NULL DEFAULT 0,
    gyneco_date          TEXT,
    has_additional_exams TEXT,             -- 'oui' | 'non' | NULL
    fcu                  INTEGER NOT NULL DEFAULT 0,
    fcu_location         TEXT,             -- 'SAR' | 'Ailleurs' | NULL
    hpv                  INTEGER NOT NULL DEFAULT 0,
    mammary_ultrasound   INTEGER NOT NULL DEFAULT 0,
    thermo_ablation      INTEGER NOT NULL DEFAULT 0,
    anapath              INTEGER NOT NULL DEFAULT 0,
    created_at           TEXT NOT NULL     -- RFC 3339 UTC, microseconds
);

-- A lost read-then-insert race fails here instead of storing a duplicate.
CREATE UNIQUE INDEX IF NOT EXISTS screenings_number_idx  ON screenings(screening_number);
CREATE INDEX        IF NOT EXISTS screenings_created_idx ON screenings(created_at);

PRAGMA user_version = 1;
";

/// Column list shared by every `SELECT`, in [`RawScreening`] order.
///
/// [`RawScreening`]: crate::encode::RawScreening
pub const COLUMNS: &str = "id, screening_number, date, last_name, first_name, age, phone, \
                           address, vaccination, mammography, mammography_date, \
                           gyneco_consultation, gyneco_date, has_additional_exams, fcu, \
                           fcu_location, hpv, mammary_ultrasound, thermo_ablation, anapath, \
                           created_at";
