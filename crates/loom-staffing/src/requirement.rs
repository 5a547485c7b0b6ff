//! Staff requirement calculation.
//!
//! Pure arithmetic over the confirmed participant list: no directory access,
//! no failure modes.  A missing supervision multiplier reads as the
//! configured minimum, so the sums are total.

use loom_core::{EngineConfig, ParticipantAllocation};

/// How many staff an occurrence needs, and why.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct StaffRequirement {
    /// A lead role is required (participant count exceeds the per-lead cap).
    pub needs_lead: bool,
    /// Support slots to fill, after the high-support floor.
    pub support_staff_count: u32,
    /// Sum of all supervision multipliers.
    pub total_supervision_load: f64,
    /// Participants whose multiplier meets the high-support threshold.
    pub high_support_participants: u32,
    /// Lead (0 or 1) plus support slots.
    pub total_staff_needed: u32,
}

impl StaffRequirement {
    /// The all-zero requirement for an empty participant list.
    pub fn empty() -> Self {
        Self {
            needs_lead: false,
            support_staff_count: 0,
            total_supervision_load: 0.0,
            high_support_participants: 0,
            total_staff_needed: 0,
        }
    }
}

/// Compute the staffing requirement for one occurrence's participants.
///
/// Support count is `ceil(load / participants_per_support)`, raised to at
/// least `ceil(high_support / 2)`; a non-empty occurrence always needs at
/// least one staff member, so a zero result with no lead forces one support
/// slot.
pub fn staff_requirement(
    participants: &[ParticipantAllocation],
    config: &EngineConfig,
) -> StaffRequirement {
    if participants.is_empty() {
        return StaffRequirement::empty();
    }

    let minimum = config.min_supervision_multiplier;
    let total_supervision_load: f64 = participants
        .iter()
        .map(|p| p.multiplier_or(minimum))
        .sum();

    let high_support_participants = participants
        .iter()
        .filter(|p| p.multiplier_or(minimum) >= config.high_support_threshold)
        .count() as u32;

    let needs_lead = participants.len() as u32 > config.participants_per_lead;

    let per_support = config.participants_per_support.max(1.0);
    let mut support_staff_count = (total_supervision_load / per_support).ceil() as u32;
    support_staff_count = support_staff_count.max(high_support_participants.div_ceil(2));

    if support_staff_count == 0 && !needs_lead {
        support_staff_count = 1;
    }

    StaffRequirement {
        needs_lead,
        support_staff_count,
        total_supervision_load,
        high_support_participants,
        total_staff_needed: support_staff_count + u32::from(needs_lead),
    }
}
