//! `EngineStore` implementation: reads, and the transactional writes.
//!
//! Every write method is one `unchecked_transaction`.  Derived rows are
//! replaced by natural-key upsert plus deletion of rows the pass no longer
//! produces, so re-persisting identical state is a no-op row-wise and a
//! failed transaction leaves the previous pass's rows intact.

use std::fmt;

use loom_cards::Card;
use loom_core::{
    BillingLine, ConfigValue, Date, GeoPoint, Occurrence, OccurrenceId, ParticipantAllocation,
    ParticipantId, StaffId,
};
use loom_engine::store::{DerivedState, EngineStore};
use loom_engine::{AuditEntry, EngineError, EngineResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row, Transaction};
use tracing::warn;

use crate::store::{parse_status, unix_now, SqliteStore};

fn store_err(e: impl fmt::Display) -> EngineError {
    EngineError::Store(e.to_string())
}

// ── Reads ────────────────────────────────────────────────────────────────────

const ALLOCATION_COLUMNS: &str = "participant_id, occurrence_id, status, \
    supervision_multiplier, pickup_required, dropoff_required, wheelchair_required, \
    home_lat, home_lon";

fn allocation_from_row(row: &Row<'_>) -> rusqlite::Result<ParticipantAllocation> {
    let status: String = row.get(2)?;
    let home_lat: Option<f64> = row.get(7)?;
    let home_lon: Option<f64> = row.get(8)?;
    Ok(ParticipantAllocation {
        participant:            ParticipantId(row.get(0)?),
        occurrence:             OccurrenceId(row.get(1)?),
        status:                 parse_status(&status),
        supervision_multiplier: row.get(3)?,
        pickup_required:        row.get(4)?,
        dropoff_required:       row.get(5)?,
        wheelchair_required:    row.get(6)?,
        home:                   match (home_lat, home_lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        },
        billing_lines:          Vec::new(),
    })
}

impl SqliteStore {
    fn attach_billing_lines(
        &self,
        allocations: &mut [ParticipantAllocation],
    ) -> rusqlite::Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT rate, hours FROM billing_lines \
             WHERE participant_id = ?1 AND occurrence_id = ?2",
        )?;
        for allocation in allocations {
            allocation.billing_lines = stmt
                .query_map(
                    params![allocation.participant.raw(), allocation.occurrence.raw()],
                    |row| Ok(BillingLine { rate: row.get(0)?, hours: row.get(1)? }),
                )?
                .collect::<rusqlite::Result<_>>()?;
        }
        Ok(())
    }
}

// ── Write helpers ────────────────────────────────────────────────────────────

/// Delete this occurrence's rows in `table` whose `key_expr` value is not in
/// `keep` (all of them when `keep` is empty).
fn delete_stale(
    tx: &Transaction<'_>,
    table: &str,
    key_expr: &str,
    occurrence: OccurrenceId,
    keep: Vec<Value>,
) -> rusqlite::Result<()> {
    if keep.is_empty() {
        tx.execute(
            &format!("DELETE FROM {table} WHERE occurrence_id = ?1"),
            params![occurrence.raw()],
        )?;
        return Ok(());
    }
    let placeholders = vec!["?"; keep.len()].join(", ");
    let sql = format!(
        "DELETE FROM {table} WHERE occurrence_id = ? AND {key_expr} NOT IN ({placeholders})"
    );
    let mut bound = Vec::with_capacity(keep.len() + 1);
    bound.push(Value::Integer(occurrence.raw() as i64));
    bound.extend(keep);
    tx.execute(&sql, params_from_iter(bound))?;
    Ok(())
}

/// Natural key for a card row, matching the SQL expression used to detect
/// stale cards.
fn card_key(card: &Card) -> String {
    format!(
        "{}:{}:{}:{}",
        card.kind.as_str(),
        card.date,
        card.staff.map_or(0, StaffId::raw),
        card.vehicle.map_or(0, |v| v.raw()),
    )
}

fn insert_audit(tx: &Transaction<'_>, audit: &AuditEntry) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO audit_log (action, detail, recorded_unix) VALUES (?1, ?2, ?3)",
        params![audit.action, audit.detail.to_string(), audit.recorded_unix],
    )?;
    Ok(())
}

fn insert_exception(
    tx: &Transaction<'_>,
    kind: &str,
    subject: u32,
    date: Date,
    reason: &str,
) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO exceptions (kind, subject_id, date, reason, recorded_unix) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![kind, subject, date.to_string(), reason, unix_now()],
    )?;
    Ok(())
}

impl SqliteStore {
    fn persist_derived(&self, derived: &DerivedState, audit: &AuditEntry) -> rusqlite::Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let occ = derived.occurrence;
        let date = derived.date.to_string();
        let (start, end) = (derived.window.start.minutes(), derived.window.end.minutes());

        {
            let mut upsert = tx.prepare_cached(
                "INSERT INTO staff_shifts \
                 (occurrence_id, staff_id, role, date, start_min, end_min) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT (occurrence_id, staff_id) DO UPDATE SET \
                 role = excluded.role, date = excluded.date, \
                 start_min = excluded.start_min, end_min = excluded.end_min",
            )?;
            for shift in &derived.shifts {
                upsert.execute(params![
                    occ.raw(),
                    shift.staff.raw(),
                    shift.role.as_str(),
                    shift.date.to_string(),
                    shift.window.start.minutes(),
                    shift.window.end.minutes(),
                ])?;
            }
        }
        delete_stale(
            &tx,
            "staff_shifts",
            "staff_id",
            occ,
            derived.shifts.iter().map(|s| Value::Integer(s.staff.raw() as i64)).collect(),
        )?;

        {
            let mut upsert = tx.prepare_cached(
                "INSERT INTO vehicle_runs \
                 (occurrence_id, vehicle_id, pickups, dropoffs, wheelchairs, date, start_min, end_min) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
                 ON CONFLICT (occurrence_id, vehicle_id) DO UPDATE SET \
                 pickups = excluded.pickups, dropoffs = excluded.dropoffs, \
                 wheelchairs = excluded.wheelchairs, date = excluded.date, \
                 start_min = excluded.start_min, end_min = excluded.end_min",
            )?;
            for run in &derived.runs {
                upsert.execute(params![
                    occ.raw(),
                    run.vehicle.raw(),
                    run.pickups,
                    run.dropoffs,
                    run.wheelchairs,
                    date,
                    start,
                    end,
                ])?;
            }
        }
        delete_stale(
            &tx,
            "vehicle_runs",
            "vehicle_id",
            occ,
            derived.runs.iter().map(|r| Value::Integer(r.vehicle.raw() as i64)).collect(),
        )?;

        {
            let mut upsert = tx.prepare_cached(
                "INSERT INTO cards \
                 (kind, date, program_id, occurrence_id, staff_id, vehicle_id, \
                  start_min, end_min, participant_count, staff_count, financial, stops) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12) \
                 ON CONFLICT (kind, date, program_id, occurrence_id, staff_id, vehicle_id) \
                 DO UPDATE SET \
                 start_min = excluded.start_min, end_min = excluded.end_min, \
                 participant_count = excluded.participant_count, \
                 staff_count = excluded.staff_count, \
                 financial = excluded.financial, stops = excluded.stops",
            )?;
            for card in &derived.cards {
                let financial = card
                    .financial
                    .as_ref()
                    .map(|f| serde_json::to_string(f).unwrap_or_default());
                let stops = serde_json::to_string(&card.stops).unwrap_or_else(|_| "[]".into());
                upsert.execute(params![
                    card.kind.as_str(),
                    card.date.to_string(),
                    card.program.raw(),
                    occ.raw(),
                    card.staff.map_or(0, StaffId::raw),
                    card.vehicle.map_or(0, |v| v.raw()),
                    card.window.start.minutes(),
                    card.window.end.minutes(),
                    card.participant_count,
                    card.staff_count,
                    financial,
                    stops,
                ])?;
            }
        }
        delete_stale(
            &tx,
            "cards",
            "kind || ':' || date || ':' || staff_id || ':' || vehicle_id",
            occ,
            derived.cards.iter().map(|c| Value::Text(card_key(c))).collect(),
        )?;

        let s = &derived.summary;
        tx.execute(
            "UPDATE occurrences SET \
             participant_count = ?2, staff_count = ?3, revenue = ?4, staff_cost = ?5, \
             admin_cost = ?6, profit = ?7, margin = ?8, processed_unix = ?9 \
             WHERE id = ?1",
            params![
                occ.raw(),
                s.participant_count,
                s.staff_count,
                s.revenue,
                s.staff_cost,
                s.admin_cost,
                s.profit,
                s.margin,
                s.processed_unix,
            ],
        )?;

        insert_audit(&tx, audit)?;
        tx.commit()
    }
}

// ── EngineStore ──────────────────────────────────────────────────────────────

impl EngineStore for SqliteStore {
    fn config_overrides(&self) -> EngineResult<Vec<(String, ConfigValue)>> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT key, value_type, value FROM config_overrides \
                 WHERE category = 'loom_logic' ORDER BY key",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(store_err)?;

        let mut overrides = Vec::new();
        for row in rows {
            let (key, value_type, raw) = row.map_err(store_err)?;
            match ConfigValue::parse(&value_type, &raw) {
                Ok(value) => overrides.push((key, value)),
                Err(e) => warn!(key, %e, "skipping malformed config override"),
            }
        }
        Ok(overrides)
    }

    fn occurrence(&self, id: OccurrenceId) -> EngineResult<Option<Occurrence>> {
        self.conn
            .query_row(
                "SELECT id, program_id, date, start_min, end_min, venue_lat, venue_lon \
                 FROM occurrences WHERE id = ?1",
                params![id.raw()],
                Self::occurrence_from_row,
            )
            .optional()
            .map_err(store_err)
    }

    fn occurrences_on(&self, date: Date) -> EngineResult<Vec<Occurrence>> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT id, program_id, date, start_min, end_min, venue_lat, venue_lon \
                 FROM occurrences WHERE date = ?1 ORDER BY id",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map(params![date.to_string()], Self::occurrence_from_row)
            .map_err(store_err)?;
        rows.collect::<rusqlite::Result<_>>().map_err(store_err)
    }

    fn confirmed_allocations(
        &self,
        occurrence: OccurrenceId,
    ) -> EngineResult<Vec<ParticipantAllocation>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!(
                "SELECT {ALLOCATION_COLUMNS} FROM allocations \
                 WHERE occurrence_id = ?1 AND status = 'CONFIRMED' \
                 ORDER BY participant_id",
            ))
            .map_err(store_err)?;
        let mut allocations: Vec<_> = stmt
            .query_map(params![occurrence.raw()], allocation_from_row)
            .map_err(store_err)?
            .collect::<rusqlite::Result<_>>()
            .map_err(store_err)?;
        self.attach_billing_lines(&mut allocations).map_err(store_err)?;
        Ok(allocations)
    }

    fn confirmed_allocations_on(
        &self,
        participant: ParticipantId,
        date: Date,
    ) -> EngineResult<Vec<ParticipantAllocation>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!(
                "SELECT {ALLOCATION_COLUMNS} FROM allocations \
                 WHERE participant_id = ?1 AND status = 'CONFIRMED' \
                   AND occurrence_id IN (SELECT id FROM occurrences WHERE date = ?2) \
                 ORDER BY occurrence_id",
            ))
            .map_err(store_err)?;
        let mut allocations: Vec<_> = stmt
            .query_map(params![participant.raw(), date.to_string()], allocation_from_row)
            .map_err(store_err)?
            .collect::<rusqlite::Result<_>>()
            .map_err(store_err)?;
        self.attach_billing_lines(&mut allocations).map_err(store_err)?;
        Ok(allocations)
    }

    fn shift_occurrences_on(&self, staff: StaffId, date: Date) -> EngineResult<Vec<OccurrenceId>> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT occurrence_id FROM staff_shifts \
                 WHERE staff_id = ?1 AND date = ?2 ORDER BY occurrence_id",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map(params![staff.raw(), date.to_string()], |row| {
                Ok(OccurrenceId(row.get(0)?))
            })
            .map_err(store_err)?;
        rows.collect::<rusqlite::Result<_>>().map_err(store_err)
    }

    fn persist_outcome(&mut self, derived: &DerivedState, audit: &AuditEntry) -> EngineResult<()> {
        // The failed transaction rolls back when dropped; the processor
        // wraps this into `EngineError::Persist`.
        self.persist_derived(derived, audit).map_err(store_err)
    }

    fn cancel_allocations(
        &mut self,
        participant: ParticipantId,
        date: Date,
        reason: &str,
        audit: &AuditEntry,
    ) -> EngineResult<Vec<OccurrenceId>> {
        let tx = self.conn.unchecked_transaction().map_err(store_err)?;
        let date_s = date.to_string();

        let affected: Vec<OccurrenceId> = {
            let mut stmt = tx
                .prepare_cached(
                    "SELECT a.occurrence_id FROM allocations a \
                     JOIN occurrences o ON o.id = a.occurrence_id \
                     WHERE a.participant_id = ?1 AND a.status = 'CONFIRMED' AND o.date = ?2 \
                     ORDER BY a.occurrence_id",
                )
                .map_err(store_err)?;
            stmt.query_map(params![participant.raw(), date_s], |row| {
                Ok(OccurrenceId(row.get(0)?))
            })
            .map_err(store_err)?
            .collect::<rusqlite::Result<_>>()
            .map_err(store_err)?
        };

        tx.execute(
            "UPDATE allocations SET status = 'CANCELLED' \
             WHERE participant_id = ?1 AND status = 'CONFIRMED' \
               AND occurrence_id IN (SELECT id FROM occurrences WHERE date = ?2)",
            params![participant.raw(), date_s],
        )
        .map_err(store_err)?;
        insert_exception(&tx, "PARTICIPANT_CANCELLATION", participant.raw(), date, reason)
            .map_err(store_err)?;
        insert_audit(&tx, audit).map_err(store_err)?;
        tx.commit().map_err(store_err)?;
        Ok(affected)
    }

    fn record_absence(
        &mut self,
        staff: StaffId,
        date: Date,
        reason: &str,
        audit: &AuditEntry,
    ) -> EngineResult<Vec<OccurrenceId>> {
        let tx = self.conn.unchecked_transaction().map_err(store_err)?;
        let date_s = date.to_string();

        let affected: Vec<OccurrenceId> = {
            let mut stmt = tx
                .prepare_cached(
                    "SELECT occurrence_id FROM staff_shifts \
                     WHERE staff_id = ?1 AND date = ?2 ORDER BY occurrence_id",
                )
                .map_err(store_err)?;
            stmt.query_map(params![staff.raw(), date_s], |row| Ok(OccurrenceId(row.get(0)?)))
                .map_err(store_err)?
                .collect::<rusqlite::Result<_>>()
                .map_err(store_err)?
        };

        tx.execute(
            "INSERT INTO staff_absences (staff_id, date, reason, recorded_unix) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT (staff_id, date) DO UPDATE SET \
             reason = excluded.reason, recorded_unix = excluded.recorded_unix",
            params![staff.raw(), date_s, reason, unix_now()],
        )
        .map_err(store_err)?;
        tx.execute(
            "DELETE FROM staff_shifts WHERE staff_id = ?1 AND date = ?2",
            params![staff.raw(), date_s],
        )
        .map_err(store_err)?;
        insert_exception(&tx, "STAFF_ABSENCE", staff.raw(), date, reason).map_err(store_err)?;
        insert_audit(&tx, audit).map_err(store_err)?;
        tx.commit().map_err(store_err)?;
        Ok(affected)
    }

    fn append_audit(&mut self, audit: &AuditEntry) -> EngineResult<()> {
        self.conn
            .execute(
                "INSERT INTO audit_log (action, detail, recorded_unix) VALUES (?1, ?2, ?3)",
                params![audit.action, audit.detail.to_string(), audit.recorded_unix],
            )
            .map_err(store_err)?;
        Ok(())
    }
}
