//! Hunger, thirst, and health adjustments on a player.
//!
//! Hunger and thirst are fullness meters. Draining saturates at zero and
//! restoring saturates at the ceiling, so `0 <= value <= max` holds after
//! every call. Functions return the delta actually applied.

use outpost_types::Player;
use serde::Deserialize;

/// Restore hunger, capped at `max_hunger`. Returns the amount applied.
pub fn restore_hunger(player: &mut Player, amount: u32) -> u32 {
    let before = player.hunger;
    player.hunger = player.hunger.saturating_add(amount).min(player.max_hunger);
    player.hunger.saturating_sub(before)
}

/// Restore thirst, capped at `max_thirst`. Returns the amount applied.
pub fn restore_thirst(player: &mut Player, amount: u32) -> u32 {
    let before = player.thirst;
    player.thirst = player.thirst.saturating_add(amount).min(player.max_thirst);
    player.thirst.saturating_sub(before)
}

/// Drain hunger, never below zero. Returns the amount applied.
pub const fn drain_hunger(player: &mut Player, amount: u32) -> u32 {
    let before = player.hunger;
    player.hunger = player.hunger.saturating_sub(amount);
    before.saturating_sub(player.hunger)
}

/// Drain thirst, never below zero. Returns the amount applied.
pub const fn drain_thirst(player: &mut Player, amount: u32) -> u32 {
    let before = player.thirst;
    player.thirst = player.thirst.saturating_sub(amount);
    before.saturating_sub(player.thirst)
}

/// Whether `current` is at or below `pct` percent of `max`.
pub fn is_at_or_below_pct(current: u32, max: u32, pct: u32) -> bool {
    u64::from(current).saturating_mul(100) <= u64::from(max).saturating_mul(u64::from(pct))
}

/// Signed adjustments to a player's stats, each clamped to its range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlayerPatch {
    /// Hunger delta.
    #[serde(default)]
    pub hunger: Option<i64>,
    /// Thirst delta.
    #[serde(default)]
    pub thirst: Option<i64>,
    /// Health delta.
    #[serde(default)]
    pub health: Option<i64>,
    /// Coins delta.
    #[serde(default)]
    pub coins: Option<i64>,
    /// New auto-storage preference.
    #[serde(default)]
    pub auto_storage: Option<bool>,
}

impl PlayerPatch {
    /// Whether the patch changes nothing.
    pub const fn is_empty(&self) -> bool {
        self.hunger.is_none()
            && self.thirst.is_none()
            && self.health.is_none()
            && self.coins.is_none()
            && self.auto_storage.is_none()
    }
}

/// Apply a patch with clamping. Coins are clamped to `0..=u32::MAX`.
pub fn apply_patch(player: &mut Player, patch: &PlayerPatch) {
    if let Some(delta) = patch.hunger {
        player.hunger = shift(player.hunger, delta, player.max_hunger);
    }
    if let Some(delta) = patch.thirst {
        player.thirst = shift(player.thirst, delta, player.max_thirst);
    }
    if let Some(delta) = patch.health {
        player.health = shift(player.health, delta, player.max_health);
    }
    if let Some(delta) = patch.coins {
        player.coins = shift(player.coins, delta, u32::MAX);
    }
    if let Some(auto_storage) = patch.auto_storage {
        player.auto_storage = auto_storage;
    }
}

fn shift(value: u32, delta: i64, max: u32) -> u32 {
    let shifted = i64::from(value).saturating_add(delta).clamp(0, i64::from(max));
    u32::try_from(shifted).unwrap_or(max)
}
