//! SQL-backed staff and vehicle directories.
//!
//! Both queries exclude the occurrence being processed from the usage
//! counts and the double-booking check, so re-running a pass sees the same
//! pool it saw the first time.

use loom_core::{Date, OccurrenceId, StaffId, StaffMember, TimeWindow, Vehicle, VehicleId};
use loom_staffing::{StaffDirectory, StaffingError, StaffingResult};
use loom_transport::{TransportError, TransportResult, VehicleDirectory};
use rusqlite::params;

use crate::store::{parse_employment, SqliteStore};

/// Sentinel bound for "exclude nothing"; real occurrence IDs are unsigned.
fn exclude_param(exclude: Option<OccurrenceId>) -> i64 {
    exclude.map_or(-1, |id| id.raw() as i64)
}

impl SqliteStore {
    fn query_active_staff(
        &self,
        date: Date,
        exclude: Option<OccurrenceId>,
    ) -> rusqlite::Result<Vec<StaffMember>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT s.id, s.level, s.high_support_qualified, s.employment, s.hourly_rate, \
                    (SELECT COUNT(*) FROM staff_shifts sh \
                      WHERE sh.staff_id = s.id AND sh.date = ?1 AND sh.occurrence_id <> ?2) \
             FROM staff s \
             WHERE s.active = 1 \
               AND NOT EXISTS (SELECT 1 FROM staff_absences a \
                                WHERE a.staff_id = s.id AND a.date = ?1) \
             ORDER BY s.id",
        )?;
        let rows = stmt.query_map(params![date.to_string(), exclude_param(exclude)], |row| {
            let employment: String = row.get(3)?;
            Ok(StaffMember {
                id:                     StaffId(row.get(0)?),
                level:                  row.get(1)?,
                high_support_qualified: row.get(2)?,
                employment:             parse_employment(&employment),
                hourly_rate:            row.get(4)?,
                shifts_today:           row.get(5)?,
            })
        })?;
        rows.collect()
    }

    fn query_available_vehicles(
        &self,
        date: Date,
        window: &TimeWindow,
        exclude: Option<OccurrenceId>,
    ) -> rusqlite::Result<Vec<Vehicle>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT v.id, v.seats, v.wheelchair_capacity, \
                    (SELECT COUNT(*) FROM vehicle_runs r \
                      WHERE r.vehicle_id = v.id AND r.date = ?1 AND r.occurrence_id <> ?2) \
             FROM vehicles v \
             WHERE v.active = 1 \
               AND NOT EXISTS (SELECT 1 FROM vehicle_runs r \
                                WHERE r.vehicle_id = v.id AND r.date = ?1 \
                                  AND r.occurrence_id <> ?2 \
                                  AND r.start_min <= ?4 AND ?3 <= r.end_min) \
             ORDER BY v.id",
        )?;
        let rows = stmt.query_map(
            params![
                date.to_string(),
                exclude_param(exclude),
                window.start.minutes(),
                window.end.minutes(),
            ],
            |row| {
                Ok(Vehicle {
                    id:                  VehicleId(row.get(0)?),
                    seats:               row.get(1)?,
                    wheelchair_capacity: row.get(2)?,
                    runs_today:          row.get(3)?,
                })
            },
        )?;
        rows.collect()
    }
}

impl StaffDirectory for SqliteStore {
    fn active_staff(
        &self,
        date: Date,
        exclude: Option<OccurrenceId>,
    ) -> StaffingResult<Vec<StaffMember>> {
        self.query_active_staff(date, exclude)
            .map_err(|e| StaffingError::Directory(e.to_string()))
    }
}

impl VehicleDirectory for SqliteStore {
    fn available_vehicles(
        &self,
        date: Date,
        window: &TimeWindow,
        exclude: Option<OccurrenceId>,
    ) -> TransportResult<Vec<Vehicle>> {
        self.query_available_vehicles(date, window, exclude)
            .map_err(|e| TransportError::Directory(e.to_string()))
    }
}
