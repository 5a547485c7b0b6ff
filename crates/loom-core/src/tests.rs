//! Unit tests for loom-core.

use crate::{ClockTime, ConfigValue, Date, EngineConfig, GeoPoint, TimeWindow};

// ── time ─────────────────────────────────────────────────────────────────────

mod time {
    use super::*;

    #[test]
    fn date_roundtrips_through_display() {
        let date = Date::new(2025, 3, 7);
        assert_eq!(date.to_string(), "2025-03-07");
        assert_eq!("2025-03-07".parse::<Date>().unwrap(), date);
    }

    #[test]
    fn date_rejects_garbage() {
        assert!("2025-13-01".parse::<Date>().is_err());
        assert!("2025-00-10".parse::<Date>().is_err());
        assert!("notadate".parse::<Date>().is_err());
        assert!("2025-03".parse::<Date>().is_err());
    }

    #[test]
    fn date_order_matches_string_order() {
        let a = Date::new(2025, 9, 30);
        let b = Date::new(2025, 10, 1);
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn clock_time_clamps_to_day() {
        assert_eq!(ClockTime::from_hm(8, 15).earlier_by(600), ClockTime::MIDNIGHT);
        assert_eq!(ClockTime::from_hm(23, 0).later_by(90), ClockTime::END_OF_DAY);
        assert_eq!(ClockTime::from_minutes(5_000), ClockTime::END_OF_DAY);
    }

    #[test]
    fn clock_time_arithmetic() {
        let t = ClockTime::from_hm(9, 0);
        assert_eq!(t.earlier_by(15), ClockTime::from_hm(8, 45));
        assert_eq!(t.later_by(75), ClockTime::from_hm(10, 15));
        assert_eq!(t.to_string(), "09:00");
    }

    #[test]
    fn window_duration_and_overlap() {
        let w = TimeWindow::new(ClockTime::from_hm(9, 0), ClockTime::from_hm(15, 0));
        assert_eq!(w.duration_minutes(), 360);
        assert!((w.duration_hours() - 6.0).abs() < f64::EPSILON);

        let before = TimeWindow::new(ClockTime::from_hm(7, 0), ClockTime::from_hm(8, 59));
        let touching = TimeWindow::new(ClockTime::from_hm(14, 0), ClockTime::from_hm(16, 0));
        assert!(!w.overlaps(&before));
        assert!(w.overlaps(&touching));
        assert!(touching.overlaps(&w));
    }

    #[test]
    fn inverted_window_has_zero_duration() {
        let w = TimeWindow::new(ClockTime::from_hm(15, 0), ClockTime::from_hm(9, 0));
        assert_eq!(w.duration_minutes(), 0);
    }
}

// ── geo ──────────────────────────────────────────────────────────────────────

mod geo {
    use super::*;

    #[test]
    fn haversine_zero_for_same_point() {
        let p = GeoPoint::new(-33.8688, 151.2093);
        assert!(p.distance_km(p) < 1e-9);
    }

    #[test]
    fn haversine_sydney_to_melbourne() {
        // Great-circle distance is ~713 km.
        let sydney = GeoPoint::new(-33.8688, 151.2093);
        let melbourne = GeoPoint::new(-37.8136, 144.9631);
        let d = sydney.distance_km(melbourne);
        assert!((700.0..730.0).contains(&d), "got {d}");
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = GeoPoint::new(-33.9, 151.1);
        let b = GeoPoint::new(-34.0, 150.8);
        assert!((a.distance_km(b) - b.distance_km(a)).abs() < 1e-9);
    }
}

// ── config ───────────────────────────────────────────────────────────────────

mod config {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = EngineConfig::default();
        assert_eq!(c.participants_per_lead, 5);
        assert!((c.vehicle_capacity_buffer - 0.8).abs() < f64::EPSILON);
        assert!((c.admin_cost_percentage - 0.18).abs() < f64::EPSILON);
        assert_eq!(c.min_pickup_duration, 30);
    }

    #[test]
    fn numeric_override_applies() {
        let c = EngineConfig::with_overrides([
            ("participants_per_lead".to_owned(), ConfigValue::Number(8.0)),
            ("admin_cost_percentage".to_owned(), ConfigValue::Number(0.25)),
        ]);
        assert_eq!(c.participants_per_lead, 8);
        assert!((c.admin_cost_percentage - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_key_and_type_mismatch_are_ignored() {
        let c = EngineConfig::with_overrides([
            ("no_such_key".to_owned(), ConfigValue::Number(1.0)),
            ("min_pickup_duration".to_owned(), ConfigValue::Bool(true)),
        ]);
        assert_eq!(c, EngineConfig::default());
    }

    #[test]
    fn parse_typed_values() {
        assert_eq!(
            ConfigValue::parse("number", " 2.5 ").unwrap(),
            ConfigValue::Number(2.5)
        );
        assert_eq!(ConfigValue::parse("boolean", "true").unwrap(), ConfigValue::Bool(true));
        assert_eq!(ConfigValue::parse("boolean", "0").unwrap(), ConfigValue::Bool(false));
        assert_eq!(
            ConfigValue::parse("json", r#"{"a":1}"#).unwrap(),
            ConfigValue::Json(serde_json::json!({"a": 1}))
        );
        // Unknown tags degrade to text rather than failing.
        assert_eq!(
            ConfigValue::parse("color", "teal").unwrap(),
            ConfigValue::Text("teal".to_owned())
        );
    }

    #[test]
    fn parse_rejects_malformed_values() {
        assert!(ConfigValue::parse("number", "abc").is_err());
        assert!(ConfigValue::parse("boolean", "maybe").is_err());
        assert!(ConfigValue::parse("json", "{").is_err());
    }
}

// ── model ────────────────────────────────────────────────────────────────────

mod model {
    use crate::{AllocationStatus, BillingLine, OccurrenceId, ParticipantAllocation, ParticipantId};

    fn allocation(multiplier: Option<f64>) -> ParticipantAllocation {
        ParticipantAllocation {
            participant: ParticipantId(1),
            occurrence: OccurrenceId(1),
            status: AllocationStatus::Confirmed,
            supervision_multiplier: multiplier,
            pickup_required: false,
            dropoff_required: false,
            wheelchair_required: false,
            home: None,
            billing_lines: Vec::new(),
        }
    }

    #[test]
    fn missing_multiplier_defaults_to_minimum() {
        assert!((allocation(None).multiplier_or(1.0) - 1.0).abs() < f64::EPSILON);
        assert!((allocation(Some(1.5)).multiplier_or(1.0) - 1.5).abs() < f64::EPSILON);
        // A stored value below the floor is raised to it.
        assert!((allocation(Some(0.2)).multiplier_or(1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn billing_line_amount_is_total() {
        assert!((BillingLine { rate: 95.0, hours: 6.0 }.amount() - 570.0).abs() < 1e-9);
        assert_eq!(BillingLine { rate: -5.0, hours: 6.0 }.amount(), 0.0);
        assert_eq!(BillingLine { rate: 95.0, hours: -1.0 }.amount(), 0.0);
    }
}
