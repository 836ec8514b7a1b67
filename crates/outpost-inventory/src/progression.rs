//! Player experience and level-ups.
//!
//! XP required to advance from level N to level N+1 is `N * 100`. A single
//! large gain can cross several levels. Each level-up recomputes the
//! player's weight ceiling from [`max_weight_for_level`].

use outpost_types::Player;
use tracing::info;

use crate::capacity::max_weight_for_level;
use crate::error::InventoryError;

/// Highest level a player can reach.
pub const MAX_LEVEL: u32 = 100;

/// XP needed to advance from `level` to the next one.
///
/// Returns `None` at [`MAX_LEVEL`] or on overflow.
pub fn xp_for_next_level(level: u32) -> Option<u32> {
    if level >= MAX_LEVEL {
        return None;
    }
    level.max(1).checked_mul(100)
}

/// Grant experience, applying any level-ups.
///
/// Returns `Some(new_level)` if the player leveled up.
///
/// # Errors
///
/// Returns [`InventoryError::ArithmeticOverflow`] if XP overflows.
pub fn grant_experience(player: &mut Player, amount: u32) -> Result<Option<u32>, InventoryError> {
    if amount == 0 || player.level >= MAX_LEVEL {
        return Ok(None);
    }

    player.experience =
        player
            .experience
            .checked_add(amount)
            .ok_or_else(|| InventoryError::ArithmeticOverflow {
                context: String::from("experience overflow"),
            })?;

    let original_level = player.level;
    while let Some(threshold) = xp_for_next_level(player.level) {
        if player.experience < threshold {
            break;
        }
        player.experience = player.experience.saturating_sub(threshold);
        player.level = player.level.saturating_add(1);
    }
    if player.level >= MAX_LEVEL {
        player.experience = 0;
    }

    if player.level > original_level {
        player.max_inventory_weight = max_weight_for_level(player.level);
        info!(
            player_id = %player.id,
            level = player.level,
            max_weight = %player.max_inventory_weight,
            "player leveled up"
        );
        Ok(Some(player.level))
    } else {
        Ok(None)
    }
}
