//! SQL schema for the Gather SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS events (
    event_id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT NOT NULL,
    description      TEXT NOT NULL,
    date             TEXT NOT NULL,    -- ISO 8601 UTC
    location         TEXT NOT NULL,
    category         TEXT NOT NULL,
    max_participants INTEGER NOT NULL CHECK (max_participants > 0),
    image            BLOB              -- only ever read via event_image()
);

CREATE TABLE IF NOT EXISTS participants (
    participant_id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name     TEXT NOT NULL,
    last_name      TEXT NOT NULL,
    date_of_birth  TEXT NOT NULL,     -- ISO 8601 calendar date
    email          TEXT NOT NULL,
    account_id     TEXT NOT NULL,     -- external user-account reference
    UNIQUE (account_id)
);

-- One enrollment per (participant, event). The unique index is the
-- authoritative guard under concurrent admission attempts; the service-level
-- duplicate check is only a fast path.
CREATE TABLE IF NOT EXISTS enrollments (
    enrollment_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id       INTEGER NOT NULL REFERENCES events(event_id) ON DELETE CASCADE,
    participant_id INTEGER NOT NULL REFERENCES participants(participant_id),
    registered_at  TEXT NOT NULL,
    UNIQUE (participant_id, event_id)
);

CREATE INDEX IF NOT EXISTS events_date_idx     ON events(date);
CREATE INDEX IF NOT EXISTS events_category_idx ON events(category);
CREATE INDEX IF NOT EXISTS events_name_idx     ON events(name);
CREATE INDEX IF NOT EXISTS enrollments_event_idx       ON enrollments(event_id);
CREATE INDEX IF NOT EXISTS enrollments_participant_idx ON enrollments(participant_id);

PRAGMA user_version = 1;
";
