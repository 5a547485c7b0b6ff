//! Integration tests: the engine's entry points driven through a real
//! SQLite database, asserting on the rows left behind.

use loom_core::{
    AllocationStatus, BillingLine, ClockTime, ConfigValue, Date, EmploymentType, GeoPoint,
    Occurrence, OccurrenceId, OccurrenceSummary, ParticipantAllocation, ParticipantId, ProgramId,
    StaffId, StaffMember, TimeWindow, Vehicle, VehicleId,
};
use loom_engine::{
    cancel_participant, process_occurrence, rebalance_day, record_staff_absence, AuditEntry,
    DerivedState, EngineError, EngineStore,
};
use loom_staffing::StaffDirectory;
use loom_transport::{VehicleDirectory, VehicleRun};
use serde_json::json;

use crate::SqliteStore;

const DAY: Date = Date { year: 2025, month: 6, day: 2 };
const OCC: OccurrenceId = OccurrenceId(7);

fn occurrence(id: u32, start_h: u8, end_h: u8) -> Occurrence {
    Occurrence {
        id:      OccurrenceId(id),
        program: ProgramId(1),
        date:    DAY,
        window:  TimeWindow::new(ClockTime::from_hm(start_h, 0), ClockTime::from_hm(end_h, 0)),
        venue:   Some(GeoPoint::new(-37.8136, 144.9631)),
    }
}

fn rider(id: u32, occurrence: u32) -> ParticipantAllocation {
    ParticipantAllocation {
        participant:            ParticipantId(id),
        occurrence:             OccurrenceId(occurrence),
        status:                 AllocationStatus::Confirmed,
        supervision_multiplier: None,
        pickup_required:        true,
        dropoff_required:       true,
        wheelchair_required:    false,
        home:                   Some(GeoPoint::new(-37.80 - id as f64 * 0.01, 144.95)),
        billing_lines:          vec![BillingLine { rate: 50.0, hours: 6.0 }],
    }
}

fn member(id: u32, level: u8) -> StaffMember {
    StaffMember {
        id: StaffId(id),
        level,
        high_support_qualified: true,
        employment: EmploymentType::Casual,
        hourly_rate: 40.0,
        shifts_today: 0,
    }
}

/// Occurrence 7 (09:00–15:00), `rider_count` confirmed participants, three
/// staff (member 2 is lead-capable), one ten-seat vehicle.
fn seed_into(store: &SqliteStore, rider_count: u32) {
    store.insert_occurrence(&occurrence(OCC.0, 9, 15)).unwrap();
    for id in 1..=rider_count {
        store.insert_allocation(&rider(id, OCC.0)).unwrap();
    }
    store.insert_staff(&member(1, 2)).unwrap();
    store.insert_staff(&member(2, 3)).unwrap();
    store.insert_staff(&member(3, 2)).unwrap();
    store
        .insert_vehicle(&Vehicle {
            id: VehicleId(1),
            seats: 10,
            wheelchair_capacity: 0,
            runs_today: 0,
        })
        .unwrap();
}

fn seeded(rider_count: u32) -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    seed_into(&store, rider_count);
    store
}

fn count(store: &SqliteStore, sql: &str) -> i64 {
    store.connection().query_row(sql, [], |row| row.get(0)).unwrap()
}

// ── Directories ──────────────────────────────────────────────────────────────

mod directories {
    use super::*;

    #[test]
    fn absent_staff_are_excluded() {
        let store = seeded(3);
        store
            .connection()
            .execute(
                "INSERT INTO staff_absences (staff_id, date, reason, recorded_unix) \
                 VALUES (1, '2025-06-02', 'flu', 0)",
                [],
            )
            .unwrap();

        let staff = store.active_staff(DAY, None).unwrap();
        let ids: Vec<u32> = staff.iter().map(|s| s.id.raw()).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn inactive_staff_are_excluded() {
        let store = seeded(3);
        store.set_staff_active(StaffId(3), false).unwrap();

        let staff = store.active_staff(DAY, None).unwrap();
        let ids: Vec<u32> = staff.iter().map(|s| s.id.raw()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn shift_counts_skip_the_excluded_occurrence() {
        let mut store = seeded(3);
        process_occurrence(&mut store, OCC).unwrap();

        let staff = store.active_staff(DAY, None).unwrap();
        let assigned = staff.iter().find(|s| s.id == StaffId(1)).unwrap();
        assert_eq!(assigned.shifts_today, 1);

        let staff = store.active_staff(DAY, Some(OCC)).unwrap();
        let assigned = staff.iter().find(|s| s.id == StaffId(1)).unwrap();
        assert_eq!(assigned.shifts_today, 0);
    }

    #[test]
    fn overlapping_run_blocks_a_vehicle() {
        let mut store = seeded(3);
        process_occurrence(&mut store, OCC).unwrap();

        let overlap = TimeWindow::new(ClockTime::from_hm(10, 0), ClockTime::from_hm(12, 0));
        assert!(store.available_vehicles(DAY, &overlap, None).unwrap().is_empty());

        // The occurrence holding the run still sees its own vehicle.
        let own = store.available_vehicles(DAY, &overlap, Some(OCC)).unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].runs_today, 0);

        let evening = TimeWindow::new(ClockTime::from_hm(16, 0), ClockTime::from_hm(17, 0));
        let free = store.available_vehicles(DAY, &evening, None).unwrap();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].runs_today, 1);
    }
}

// ── Configuration overrides ──────────────────────────────────────────────────

mod config {
    use super::*;

    #[test]
    fn typed_overrides_come_back_parsed() {
        let store = seeded(0);
        store.set_override("participants_per_lead", "number", "2").unwrap();
        store.set_override("strict_mode", "boolean", "true").unwrap();

        let overrides = store.config_overrides().unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides[0], ("participants_per_lead".into(), ConfigValue::Number(2.0)));
        assert_eq!(overrides[1], ("strict_mode".into(), ConfigValue::Bool(true)));
    }

    #[test]
    fn malformed_override_is_skipped() {
        let store = seeded(0);
        store.set_override("participants_per_lead", "number", "banana").unwrap();
        assert!(store.config_overrides().unwrap().is_empty());
    }

    #[test]
    fn set_override_replaces_by_key() {
        let store = seeded(0);
        store.set_override("admin_cost_percentage", "number", "0.18").unwrap();
        store.set_override("admin_cost_percentage", "number", "0.25").unwrap();

        let overrides = store.config_overrides().unwrap();
        assert_eq!(overrides, vec![("admin_cost_percentage".into(), ConfigValue::Number(0.25))]);
    }

    #[test]
    fn lead_override_changes_the_next_pass() {
        let mut store = seeded(3);
        store.set_override("participants_per_lead", "number", "2").unwrap();
        process_occurrence(&mut store, OCC).unwrap();

        assert_eq!(count(&store, "SELECT COUNT(*) FROM staff_shifts"), 2);
        // Member 2 is the only one at lead level.
        assert_eq!(
            count(&store, "SELECT staff_id FROM staff_shifts WHERE role = 'LEAD'"),
            2
        );
    }
}

// ── Persistence ──────────────────────────────────────────────────────────────

mod persistence {
    use super::*;

    #[test]
    fn a_pass_writes_shifts_runs_cards_and_summary() {
        let mut store = seeded(3);
        process_occurrence(&mut store, OCC).unwrap();

        assert_eq!(count(&store, "SELECT COUNT(*) FROM staff_shifts"), 1);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM vehicle_runs"), 1);
        // Activity, one pickup, one dropoff, one roster.
        assert_eq!(count(&store, "SELECT COUNT(*) FROM cards"), 4);

        let (revenue, participants): (f64, i64) = store
            .connection()
            .query_row(
                "SELECT revenue, participant_count FROM occurrences WHERE id = 7",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!((revenue - 900.0).abs() < 1e-9);
        assert_eq!(participants, 3);
    }

    #[test]
    fn reprocessing_is_idempotent_row_for_row() {
        let mut store = seeded(3);
        process_occurrence(&mut store, OCC).unwrap();
        let first: i64 = count(&store, "SELECT staff_id FROM staff_shifts");

        process_occurrence(&mut store, OCC).unwrap();
        assert_eq!(count(&store, "SELECT COUNT(*) FROM staff_shifts"), 1);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM vehicle_runs"), 1);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM cards"), 4);
        assert_eq!(count(&store, "SELECT staff_id FROM staff_shifts"), first);
        assert_eq!(
            count(&store, "SELECT COUNT(*) FROM audit_log WHERE action = 'PROCESS_OCCURRENCE'"),
            2
        );
    }

    #[test]
    fn shrinking_demand_deletes_stale_rows() {
        let mut store = seeded(6);
        process_occurrence(&mut store, OCC).unwrap();
        assert_eq!(count(&store, "SELECT COUNT(*) FROM staff_shifts"), 3);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM cards"), 6);

        store
            .connection()
            .execute("UPDATE allocations SET status = 'CANCELLED' WHERE participant_id > 3", [])
            .unwrap();
        process_occurrence(&mut store, OCC).unwrap();

        assert_eq!(count(&store, "SELECT COUNT(*) FROM staff_shifts"), 1);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM cards"), 4);
        assert_eq!(count(&store, "SELECT participant_count FROM occurrences WHERE id = 7"), 3);
    }

    #[test]
    fn failed_persist_rolls_everything_back() {
        let mut store = seeded(3);
        process_occurrence(&mut store, OCC).unwrap();

        // A run for an unknown vehicle violates the foreign key mid-way
        // through the transaction.
        let derived = DerivedState {
            occurrence: OCC,
            date:       DAY,
            window:     occurrence(OCC.0, 9, 15).window,
            shifts:     Vec::new(),
            runs:       vec![VehicleRun {
                vehicle: VehicleId(99),
                pickups: 1,
                dropoffs: 0,
                wheelchairs: 0,
            }],
            cards:      Vec::new(),
            summary:    OccurrenceSummary {
                participant_count: 0,
                staff_count: 0,
                revenue: 0.0,
                staff_cost: 0.0,
                admin_cost: 0.0,
                profit: 0.0,
                margin: 0.0,
                processed_unix: 1,
            },
        };
        let err = store
            .persist_outcome(&derived, &AuditEntry::new("PROCESS_OCCURRENCE", json!({})))
            .unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));

        // The earlier pass's rows are untouched.
        assert_eq!(count(&store, "SELECT COUNT(*) FROM staff_shifts"), 1);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM vehicle_runs WHERE vehicle_id = 1"), 1);
        let revenue: f64 = store
            .connection()
            .query_row("SELECT revenue FROM occurrences WHERE id = 7", [], |row| row.get(0))
            .unwrap();
        assert!((revenue - 900.0).abs() < 1e-9);
    }

    #[test]
    fn a_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loom.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            seed_into(&store, 3);
            process_occurrence(&mut store, OCC).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(count(&store, "SELECT COUNT(*) FROM staff_shifts"), 1);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM cards"), 4);
    }
}

// ── Exceptions ───────────────────────────────────────────────────────────────

mod exceptions {
    use super::*;

    #[test]
    fn cancellation_marks_rows_and_reprocesses() {
        let mut store = seeded(6);
        process_occurrence(&mut store, OCC).unwrap();

        let outcome = cancel_participant(&mut store, ParticipantId(6), DAY, "sick").unwrap();
        assert_eq!(outcome.affected, vec![OCC]);
        assert_eq!(outcome.reprocessed.len(), 1);

        let status: String = store
            .connection()
            .query_row("SELECT status FROM allocations WHERE participant_id = 6", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(status, "CANCELLED");
        assert_eq!(
            count(&store, "SELECT COUNT(*) FROM exceptions WHERE kind = 'PARTICIPANT_CANCELLATION'"),
            1
        );
        // Five participants no longer need a lead or extra supports.
        assert_eq!(count(&store, "SELECT COUNT(*) FROM staff_shifts"), 1);
        assert_eq!(count(&store, "SELECT participant_count FROM occurrences WHERE id = 7"), 5);
    }

    #[test]
    fn second_cancellation_is_a_noop() {
        let mut store = seeded(6);
        process_occurrence(&mut store, OCC).unwrap();
        cancel_participant(&mut store, ParticipantId(6), DAY, "sick").unwrap();

        let again = cancel_participant(&mut store, ParticipantId(6), DAY, "sick").unwrap();
        assert!(again.is_noop());
        assert_eq!(count(&store, "SELECT COUNT(*) FROM exceptions"), 1);
    }

    #[test]
    fn absence_releases_shifts_and_reassigns() {
        let mut store = seeded(3);
        process_occurrence(&mut store, OCC).unwrap();
        assert_eq!(count(&store, "SELECT staff_id FROM staff_shifts"), 1);

        let outcome = record_staff_absence(&mut store, StaffId(1), DAY, "flu").unwrap();
        assert_eq!(outcome.affected, vec![OCC]);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM staff_absences"), 1);
        // The least-loaded remaining member picks up the shift.
        assert_eq!(count(&store, "SELECT staff_id FROM staff_shifts"), 2);
    }

    #[test]
    fn absence_without_shifts_is_a_noop() {
        let mut store = seeded(3);
        let outcome = record_staff_absence(&mut store, StaffId(2), DAY, "flu").unwrap();
        assert!(outcome.is_noop());
        assert_eq!(count(&store, "SELECT COUNT(*) FROM staff_absences"), 0);
    }
}

// ── Rebalancing ──────────────────────────────────────────────────────────────

mod rebalance {
    use super::*;

    #[test]
    fn a_day_rebalances_in_start_order_without_double_booking() {
        let mut store = seeded(3);
        store.insert_occurrence(&occurrence(8, 10, 12)).unwrap();
        store.insert_allocation(&rider(4, 8)).unwrap();
        store.insert_allocation(&rider(5, 8)).unwrap();

        let report = rebalance_day(&mut store, DAY).unwrap();
        assert_eq!(report.processed.len(), 2);
        assert!(report.failures.is_empty());
        assert_eq!(report.processed[0].occurrence, OCC);

        // The single vehicle went to the earlier occurrence; the later,
        // overlapping one records unmet transport demand.
        assert_eq!(
            count(&store, "SELECT occurrence_id FROM vehicle_runs WHERE vehicle_id = 1"),
            7
        );
        assert_eq!(report.processed[1].warnings.unmet_pickups, 2);

        // Distinct staff across the overlapping occurrences.
        assert_eq!(count(&store, "SELECT COUNT(DISTINCT staff_id) FROM staff_shifts"), 2);
        assert_eq!(
            count(&store, "SELECT COUNT(*) FROM audit_log WHERE action = 'REBALANCE_DAY'"),
            1
        );
    }

    #[test]
    fn an_empty_day_is_still_audited() {
        let mut store = seeded(3);
        let report = rebalance_day(&mut store, Date::new(2025, 6, 3)).unwrap();
        assert!(report.processed.is_empty());
        assert_eq!(
            count(&store, "SELECT COUNT(*) FROM audit_log WHERE action = 'REBALANCE_DAY'"),
            1
        );
    }
}
