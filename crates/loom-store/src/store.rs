//! The `SqliteStore` type: connection handling, seeding, and row mapping.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use loom_core::{
    AllocationStatus, ClockTime, Date, EmploymentType, GeoPoint, Occurrence, OccurrenceId,
    ParticipantAllocation, ProgramId, StaffId, StaffMember, TimeWindow, Vehicle,
};
use rusqlite::{params, Connection, Row};

use crate::error::StoreResult;
use crate::schema::SCHEMA;

/// SQLite-backed implementation of the engine's directory and store
/// contracts.
///
/// One connection, WAL journal mode, foreign keys enforced.  The engine's
/// write methods each run inside a single transaction.
pub struct SqliteStore {
    pub(crate) conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialise the schema.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::init(Connection::open(path)?)
    }

    /// An in-memory store, used by tests and dry runs.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             PRAGMA foreign_keys = ON;",
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection (service-layer escape hatch).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ── Seeding ───────────────────────────────────────────────────────────
    //
    // The enrollment/scheduling processes that normally populate these
    // tables live outside the engine; these helpers stand in for them.

    pub fn insert_occurrence(&self, occurrence: &Occurrence) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO occurrences (id, program_id, date, start_min, end_min, venue_lat, venue_lon) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                occurrence.id.0,
                occurrence.program.0,
                occurrence.date.to_string(),
                occurrence.window.start.minutes(),
                occurrence.window.end.minutes(),
                occurrence.venue.map(|v| v.lat),
                occurrence.venue.map(|v| v.lon),
            ],
        )?;
        Ok(())
    }

    pub fn insert_staff(&self, member: &StaffMember) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO staff (id, level, high_support_qualified, employment, hourly_rate) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                member.id.0,
                member.level,
                member.high_support_qualified,
                member.employment.as_str(),
                member.hourly_rate,
            ],
        )?;
        Ok(())
    }

    pub fn insert_vehicle(&self, vehicle: &Vehicle) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO vehicles (id, seats, wheelchair_capacity) VALUES (?1, ?2, ?3)",
            params![vehicle.id.0, vehicle.seats, vehicle.wheelchair_capacity],
        )?;
        Ok(())
    }

    pub fn insert_allocation(&self, allocation: &ParticipantAllocation) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO allocations (participant_id, occurrence_id, status, \
             supervision_multiplier, pickup_required, dropoff_required, wheelchair_required, \
             home_lat, home_lon) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                allocation.participant.0,
                allocation.occurrence.0,
                allocation.status.as_str(),
                allocation.supervision_multiplier,
                allocation.pickup_required,
                allocation.dropoff_required,
                allocation.wheelchair_required,
                allocation.home.map(|h| h.lat),
                allocation.home.map(|h| h.lon),
            ],
        )?;
        for line in &allocation.billing_lines {
            self.conn.execute(
                "INSERT INTO billing_lines (participant_id, occurrence_id, rate, hours) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![allocation.participant.0, allocation.occurrence.0, line.rate, line.hours],
            )?;
        }
        Ok(())
    }

    /// Set one typed configuration override in category `loom_logic`.
    pub fn set_override(&self, key: &str, value_type: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO config_overrides (category, key, value_type, value) \
             VALUES ('loom_logic', ?1, ?2, ?3) \
             ON CONFLICT (category, key) DO UPDATE SET value_type = ?2, value = ?3",
            params![key, value_type, value],
        )?;
        Ok(())
    }

    pub fn set_staff_active(&self, staff: StaffId, active: bool) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE staff SET active = ?2 WHERE id = ?1",
            params![staff.0, active],
        )?;
        Ok(())
    }

    // ── Row mapping ───────────────────────────────────────────────────────

    pub(crate) fn occurrence_from_row(row: &Row<'_>) -> rusqlite::Result<Occurrence> {
        let date: String = row.get("date")?;
        let venue_lat: Option<f64> = row.get("venue_lat")?;
        let venue_lon: Option<f64> = row.get("venue_lon")?;
        Ok(Occurrence {
            id: OccurrenceId(row.get::<_, u32>("id")?),
            program: ProgramId(row.get::<_, u32>("program_id")?),
            date: parse_date(&date)?,
            window: window_from_row(row)?,
            venue: match (venue_lat, venue_lon) {
                (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
                _ => None,
            },
        })
    }
}

pub(crate) fn window_from_row(row: &Row<'_>) -> rusqlite::Result<TimeWindow> {
    Ok(TimeWindow::new(
        ClockTime::from_minutes(row.get::<_, u32>("start_min")?),
        ClockTime::from_minutes(row.get::<_, u32>("end_min")?),
    ))
}

pub(crate) fn parse_date(s: &str) -> rusqlite::Result<Date> {
    s.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn parse_employment(s: &str) -> EmploymentType {
    match s {
        "PERMANENT" => EmploymentType::Permanent,
        _ => EmploymentType::Casual,
    }
}

pub(crate) fn parse_status(s: &str) -> AllocationStatus {
    match s {
        "CANCELLED" => AllocationStatus::Cancelled,
        _ => AllocationStatus::Confirmed,
    }
}

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
