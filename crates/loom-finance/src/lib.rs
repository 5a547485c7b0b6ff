//! `loom-finance` — per-occurrence financial outcome calculation.
//!
//! One pure function over the occurrence window, the confirmed participants'
//! billing lines, and the assigned roster.  The arithmetic is total:
//! malformed or missing numeric inputs read as zero, and a zero-revenue
//! occurrence has margin 0 rather than a division by zero.

use loom_core::{EngineConfig, Occurrence, ParticipantAllocation};
use loom_staffing::StaffAssignment;


/// Revenue, cost, and margin for one occurrence.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct FinancialSummary {
    /// Sum of participant billing lines (`rate × hours`).
    pub revenue: f64,
    /// Every assigned staff member costed for the full occurrence duration,
    /// regardless of transport-shift stretching.
    pub staff_cost: f64,
    /// Revenue × the configured admin percentage.
    pub admin_cost: f64,
    /// `revenue − staff_cost − admin_cost`.
    pub profit: f64,
    /// `profit / revenue`, 0 when revenue is 0.
    pub margin: f64,
}

/// Compute the financial summary for one occurrence.
pub fn financial_summary(
    occurrence: &Occurrence,
    participants: &[ParticipantAllocation],
    staff: &[StaffAssignment],
    config: &EngineConfig,
) -> FinancialSummary {
    let duration_hours = occurrence.window.duration_hours();

    let revenue: f64 = participants
        .iter()
        .flat_map(|p| p.billing_lines.iter())
        .map(|line| line.amount())
        .sum();

    let staff_cost: f64 = staff
        .iter()
        .map(|a| a.hourly_rate.max(0.0) * duration_hours)
        .sum();

    let admin_cost = revenue * config.admin_cost_percentage;
    let profit = revenue - staff_cost - admin_cost;
    let margin = if revenue == 0.0 { 0.0 } else { profit / revenue };

    FinancialSummary { revenue, staff_cost, admin_cost, profit, margin }
}
