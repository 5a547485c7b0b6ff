//! Database schema.
//!
//! Dates are TEXT (`YYYY-MM-DD`, lexicographically ordered the same as the
//! `Date` type), times are INTEGER minutes since midnight.  Derived tables
//! (`staff_shifts`, `vehicle_runs`, `cards`) carry natural-key primary keys
//! so every processing pass can upsert rather than insert, and `cards`
//! duplicates the date/window columns the directories filter on.

pub(crate) const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS occurrences (
        id                INTEGER PRIMARY KEY,
        program_id        INTEGER NOT NULL,
        date              TEXT    NOT NULL,
        start_min         INTEGER NOT NULL,
        end_min           INTEGER NOT NULL,
        venue_lat         REAL,
        venue_lon         REAL,
        participant_count INTEGER NOT NULL DEFAULT 0,
        staff_count       INTEGER NOT NULL DEFAULT 0,
        revenue           REAL    NOT NULL DEFAULT 0,
        staff_cost        REAL    NOT NULL DEFAULT 0,
        admin_cost        REAL    NOT NULL DEFAULT 0,
        profit            REAL    NOT NULL DEFAULT 0,
        margin            REAL    NOT NULL DEFAULT 0,
        processed_unix    INTEGER
    );
    CREATE INDEX IF NOT EXISTS idx_occurrences_date ON occurrences(date);

    CREATE TABLE IF NOT EXISTS allocations (
        participant_id         INTEGER NOT NULL,
        occurrence_id          INTEGER NOT NULL REFERENCES occurrences(id),
        status                 TEXT    NOT NULL DEFAULT 'CONFIRMED',
        supervision_multiplier REAL,
        pickup_required        INTEGER NOT NULL DEFAULT 0,
        dropoff_required       INTEGER NOT NULL DEFAULT 0,
        wheelchair_required    INTEGER NOT NULL DEFAULT 0,
        home_lat               REAL,
        home_lon               REAL,
        PRIMARY KEY (participant_id, occurrence_id)
    );

    CREATE TABLE IF NOT EXISTS billing_lines (
        participant_id INTEGER NOT NULL,
        occurrence_id  INTEGER NOT NULL REFERENCES occurrences(id),
        rate           REAL    NOT NULL DEFAULT 0,
        hours          REAL    NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS staff (
        id                     INTEGER PRIMARY KEY,
        level                  INTEGER NOT NULL DEFAULT 1,
        high_support_qualified INTEGER NOT NULL DEFAULT 0,
        employment             TEXT    NOT NULL DEFAULT 'CASUAL',
        hourly_rate            REAL    NOT NULL DEFAULT 0,
        active                 INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS staff_shifts (
        occurrence_id INTEGER NOT NULL REFERENCES occurrences(id),
        staff_id      INTEGER NOT NULL REFERENCES staff(id),
        role          TEXT    NOT NULL,
        date          TEXT    NOT NULL,
        start_min     INTEGER NOT NULL,
        end_min       INTEGER NOT NULL,
        PRIMARY KEY (occurrence_id, staff_id)
    );
    CREATE INDEX IF NOT EXISTS idx_shifts_staff_date ON staff_shifts(staff_id, date);

    CREATE TABLE IF NOT EXISTS vehicles (
        id                  INTEGER PRIMARY KEY,
        seats               INTEGER NOT NULL,
        wheelchair_capacity INTEGER NOT NULL DEFAULT 0,
        active              INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS vehicle_runs (
        occurrence_id INTEGER NOT NULL REFERENCES occurrences(id),
        vehicle_id    INTEGER NOT NULL REFERENCES vehicles(id),
        pickups       INTEGER NOT NULL DEFAULT 0,
        dropoffs      INTEGER NOT NULL DEFAULT 0,
        wheelchairs   INTEGER NOT NULL DEFAULT 0,
        date          TEXT    NOT NULL,
        start_min     INTEGER NOT NULL,
        end_min       INTEGER NOT NULL,
        PRIMARY KEY (occurrence_id, vehicle_id)
    );
    CREATE INDEX IF NOT EXISTS idx_runs_vehicle_date ON vehicle_runs(vehicle_id, date);

    CREATE TABLE IF NOT EXISTS cards (
        kind              TEXT    NOT NULL,
        date              TEXT    NOT NULL,
        program_id        INTEGER NOT NULL,
        occurrence_id     INTEGER NOT NULL REFERENCES occurrences(id),
        staff_id          INTEGER NOT NULL DEFAULT 0,
        vehicle_id        INTEGER NOT NULL DEFAULT 0,
        start_min         INTEGER NOT NULL,
        end_min           INTEGER NOT NULL,
        participant_count INTEGER NOT NULL DEFAULT 0,
        staff_count       INTEGER NOT NULL DEFAULT 0,
        financial         TEXT,
        stops             TEXT    NOT NULL DEFAULT '[]',
        PRIMARY KEY (kind, date, program_id, occurrence_id, staff_id, vehicle_id)
    );

    CREATE TABLE IF NOT EXISTS exceptions (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        kind          TEXT    NOT NULL,
        subject_id    INTEGER NOT NULL,
        date          TEXT    NOT NULL,
        reason        TEXT    NOT NULL,
        recorded_unix INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS staff_absences (
        staff_id      INTEGER NOT NULL REFERENCES staff(id),
        date          TEXT    NOT NULL,
        reason        TEXT    NOT NULL,
        recorded_unix INTEGER NOT NULL,
        PRIMARY KEY (staff_id, date)
    );

    CREATE TABLE IF NOT EXISTS audit_log (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        action        TEXT    NOT NULL,
        detail        TEXT    NOT NULL,
        recorded_unix INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS config_overrides (
        category   TEXT NOT NULL,
        key        TEXT NOT NULL,
        value_type TEXT NOT NULL DEFAULT 'string',
        value      TEXT NOT NULL,
        PRIMARY KEY (category, key)
    );
";
