//! Manual (fixed-duration, target-driven) expeditions.
//!
//! A manual run names a target quantity per resource and a duration. Its
//! progress is elapsed time over duration rather than random steps, and it
//! returns early once every target is met. The hunger and thirst it will
//! drain over the full duration must be available up front.

use std::collections::BTreeMap;

use outpost_types::{Expedition, ExpeditionMode, ItemId, ManualEstimate};

use crate::config::ExpeditionConfig;
use crate::error::ExpeditionError;

const MS_PER_MINUTE: u64 = 60_000;

/// Check `minutes` against the configured range.
///
/// # Errors
///
/// Returns [`ExpeditionError::InvalidDuration`] outside the range.
pub const fn validate_duration(minutes: u32, config: &ExpeditionConfig) -> Result<(), ExpeditionError> {
    if minutes < config.manual_min_minutes || minutes > config.manual_max_minutes {
        return Err(ExpeditionError::InvalidDuration {
            minutes,
            min: config.manual_min_minutes,
            max: config.manual_max_minutes,
        });
    }
    Ok(())
}

/// Check that every target is at least 1.
///
/// # Errors
///
/// Returns [`ExpeditionError::InvalidTarget`] for the first zero target.
pub fn validate_targets(targets: &BTreeMap<ItemId, u32>) -> Result<(), ExpeditionError> {
    if let Some((id, _)) = targets.iter().find(|(_, qty)| **qty == 0) {
        return Err(ExpeditionError::InvalidTarget(id.clone()));
    }
    Ok(())
}

/// Vitals drained over `minutes` at `per_hour`, floored.
pub fn drain_over_minutes(minutes: u32, per_hour: u32) -> u32 {
    let total = u64::from(minutes)
        .saturating_mul(u64::from(per_hour))
        .checked_div(60)
        .unwrap_or(0);
    u32::try_from(total).unwrap_or(u32::MAX)
}

/// Estimated reward and cost of a manual run.
///
/// `estimated_xp = total_targets * 2 + floor(duration / 2)`; the costs are
/// the full-duration drains at the configured hourly rates (0.8 and 0.6 per
/// minute by default).
pub fn estimate(
    targets: &BTreeMap<ItemId, u32>,
    duration_minutes: u32,
    config: &ExpeditionConfig,
) -> ManualEstimate {
    let total_targets = targets
        .values()
        .fold(0_u32, |acc, qty| acc.saturating_add(*qty));
    ManualEstimate {
        estimated_xp: total_targets
            .saturating_mul(2)
            .saturating_add(duration_minutes.checked_div(2).unwrap_or(0)),
        hunger_cost: drain_over_minutes(duration_minutes, config.hunger_drain_per_hour),
        thirst_cost: drain_over_minutes(duration_minutes, config.thirst_drain_per_hour),
    }
}

/// Progress (0--100) after `elapsed_ms` of a `duration_minutes` run.
pub fn time_progress(elapsed_ms: u64, duration_minutes: u32) -> u32 {
    let total_ms = u64::from(duration_minutes).saturating_mul(MS_PER_MINUTE);
    let pct = elapsed_ms
        .saturating_mul(100)
        .checked_div(total_ms)
        .unwrap_or(100)
        .min(100);
    u32::try_from(pct).unwrap_or(100)
}

/// Seconds left in a `duration_minutes` run after `elapsed_ms`.
pub fn seconds_remaining(elapsed_ms: u64, duration_minutes: u32) -> u64 {
    let total_ms = u64::from(duration_minutes).saturating_mul(MS_PER_MINUTE);
    total_ms.saturating_sub(elapsed_ms).checked_div(1000).unwrap_or(0)
}

/// Whether `resource` still needs collecting in a manual run.
///
/// Always true for open runs.
pub fn needs_more(expedition: &Expedition, resource: &ItemId) -> bool {
    match &expedition.mode {
        ExpeditionMode::Open => true,
        ExpeditionMode::Manual { targets, .. } => {
            let have = expedition.collected_resources.get(resource).copied().unwrap_or(0);
            targets.get(resource).is_some_and(|want| have < *want)
        }
    }
}

/// Whether a manual run has met every target. Always false for open runs.
pub fn targets_met(expedition: &Expedition) -> bool {
    match &expedition.mode {
        ExpeditionMode::Open => false,
        ExpeditionMode::Manual { targets, .. } => targets.iter().all(|(id, want)| {
            expedition.collected_resources.get(id).copied().unwrap_or(0) >= *want
        }),
    }
}
