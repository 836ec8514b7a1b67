//! Auto-repeat countdowns per (player, biome).
//!
//! The scheduler owns every countdown, so there is at most one per key and
//! re-arming replaces the previous one. It only counts; deciding whether a
//! due entry launches, holds, or gets disabled is up to
//! [`Game::advance_auto_repeat`](crate::game::Game::advance_auto_repeat).

use std::collections::{BTreeMap, BTreeSet};

use outpost_types::{AutoRepeatSetting, BiomeId, ItemId, PlayerId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AutoRepeatError;

/// Countdown table plus the last resource selection per biome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoRepeatScheduler {
    settings: BTreeMap<PlayerId, BTreeMap<BiomeId, AutoRepeatSetting>>,
    remembered: BTreeMap<PlayerId, BTreeMap<BiomeId, BTreeSet<ItemId>>>,
}

impl AutoRepeatScheduler {
    /// Create an empty scheduler.
    pub const fn new() -> Self {
        Self {
            settings: BTreeMap::new(),
            remembered: BTreeMap::new(),
        }
    }

    /// Record the selection of the latest expedition into `biome`.
    pub fn remember(&mut self, player: PlayerId, biome: &BiomeId, resources: &BTreeSet<ItemId>) {
        self.remembered
            .entry(player)
            .or_default()
            .insert(biome.clone(), resources.clone());
    }

    /// The last selection used in `biome`, if any.
    pub fn remembered(&self, player: PlayerId, biome: &BiomeId) -> Option<&BTreeSet<ItemId>> {
        self.remembered.get(&player).and_then(|m| m.get(biome))
    }

    /// The setting for one key.
    pub fn setting(&self, player: PlayerId, biome: &BiomeId) -> Option<&AutoRepeatSetting> {
        self.settings.get(&player).and_then(|m| m.get(biome))
    }

    /// Every setting a player has, in biome order.
    pub fn settings_for(&self, player: PlayerId) -> Vec<AutoRepeatSetting> {
        self.settings
            .get(&player)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Flip auto-repeat for a key.
    ///
    /// A new record needs a remembered selection and starts enabled.
    /// Switching on sets the countdown to `countdown`; switching off zeroes
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`AutoRepeatError::NoRememberedSelection`] when creating a
    /// record without a remembered selection.
    pub fn toggle(
        &mut self,
        player: PlayerId,
        biome: &BiomeId,
        countdown: u32,
    ) -> Result<AutoRepeatSetting, AutoRepeatError> {
        let remembered = self.remembered(player, biome).cloned();
        let per_player = self.settings.entry(player).or_default();

        let setting = match per_player.get_mut(biome) {
            Some(setting) => {
                setting.enabled = !setting.enabled;
                setting.countdown = if setting.enabled { countdown } else { 0 };
                if let Some(resources) = remembered {
                    setting.resources = resources;
                }
                setting.clone()
            }
            None => {
                let resources = remembered.ok_or_else(|| AutoRepeatError::NoRememberedSelection {
                    player,
                    biome: biome.clone(),
                })?;
                let setting = AutoRepeatSetting {
                    player_id: player,
                    biome_id: biome.clone(),
                    enabled: true,
                    resources,
                    countdown,
                };
                per_player.insert(biome.clone(), setting.clone());
                setting
            }
        };

        debug!(
            player_id = %player,
            biome = %biome,
            enabled = setting.enabled,
            "auto-repeat toggled"
        );
        Ok(setting)
    }

    /// Count every enabled entry down by `seconds`.
    ///
    /// Returns the keys that are due: those that reached zero this call and
    /// those already held at zero.
    pub fn advance(&mut self, seconds: u32) -> Vec<(PlayerId, BiomeId)> {
        let mut due = Vec::new();
        for (player, per_player) in &mut self.settings {
            for (biome, setting) in per_player.iter_mut().filter(|(_, s)| s.enabled) {
                setting.countdown = setting.countdown.saturating_sub(seconds);
                if setting.countdown == 0 {
                    due.push((*player, biome.clone()));
                }
            }
        }
        due
    }

    /// Restart the countdown for a key. No-op for unknown or disabled keys.
    pub fn re_arm(&mut self, player: PlayerId, biome: &BiomeId, countdown: u32) {
        if let Some(setting) = self.setting_mut(player, biome)
            && setting.enabled
        {
            setting.countdown = countdown;
        }
    }

    /// Switch a key off. Other keys are untouched.
    pub fn disable(&mut self, player: PlayerId, biome: &BiomeId) {
        if let Some(setting) = self.setting_mut(player, biome) {
            setting.enabled = false;
            setting.countdown = 0;
        }
    }

    fn setting_mut(&mut self, player: PlayerId, biome: &BiomeId) -> Option<&mut AutoRepeatSetting> {
        self.settings.get_mut(&player).and_then(|m| m.get_mut(biome))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn selection(ids: &[&str]) -> BTreeSet<ItemId> {
        ids.iter().map(|id| ItemId::from(*id)).collect()
    }

    #[test]
    fn toggle_requires_memory_for_new_record() {
        let mut s = AutoRepeatScheduler::new();
        let p = PlayerId::new();
        let forest = BiomeId::from("forest");
        assert_eq!(
            s.toggle(p, &forest, 10).unwrap_err(),
            AutoRepeatError::NoRememberedSelection {
                player: p,
                biome: forest.clone(),
            }
        );

        s.remember(p, &forest, &selection(&["fiber"]));
        let on = s.toggle(p, &forest, 10).unwrap();
        assert!(on.enabled);
        assert_eq!(on.countdown, 10);
        assert_eq!(on.resources, selection(&["fiber"]));
    }

    #[test]
    fn toggle_flips_existing_record() {
        let mut s = AutoRepeatScheduler::new();
        let p = PlayerId::new();
        let forest = BiomeId::from("forest");
        s.remember(p, &forest, &selection(&["fiber"]));
        s.toggle(p, &forest, 10).unwrap();

        let off = s.toggle(p, &forest, 10).unwrap();
        assert!(!off.enabled);
        assert_eq!(off.countdown, 0);

        let on = s.toggle(p, &forest, 10).unwrap();
        assert!(on.enabled);
        assert_eq!(on.countdown, 10);
    }

    #[test]
    fn advance_reports_due_and_held_entries() {
        let mut s = AutoRepeatScheduler::new();
        let p = PlayerId::new();
        let forest = BiomeId::from("forest");
        let lake = BiomeId::from("lakeside");
        s.remember(p, &forest, &selection(&["fiber"]));
        s.remember(p, &lake, &selection(&["clay"]));
        s.toggle(p, &forest, 3).unwrap();
        s.toggle(p, &lake, 10).unwrap();

        assert!(s.advance(1).is_empty());
        assert!(s.advance(1).is_empty());
        assert_eq!(s.advance(1), vec![(p, forest.clone())]);
        // Not re-armed: still due next second.
        assert_eq!(s.advance(1), vec![(p, forest.clone())]);

        s.re_arm(p, &forest, 10);
        assert_eq!(s.setting(p, &forest).unwrap().countdown, 10);
        assert_eq!(s.setting(p, &lake).unwrap().countdown, 6);
    }

    #[test]
    fn disable_touches_one_key() {
        let mut s = AutoRepeatScheduler::new();
        let p = PlayerId::new();
        let forest = BiomeId::from("forest");
        let lake = BiomeId::from("lakeside");
        s.remember(p, &forest, &selection(&["fiber"]));
        s.remember(p, &lake, &selection(&["clay"]));
        s.toggle(p, &forest, 10).unwrap();
        s.toggle(p, &lake, 10).unwrap();

        s.disable(p, &forest);
        assert!(!s.setting(p, &forest).unwrap().enabled);
        assert!(s.setting(p, &lake).unwrap().enabled);
        assert_eq!(s.settings_for(p).len(), 2);

        // Disabled keys are not re-armed and never come due.
        s.re_arm(p, &forest, 10);
        assert_eq!(s.setting(p, &forest).unwrap().countdown, 0);
        assert!(s.advance(20).iter().all(|(_, b)| *b == lake));
    }
}
