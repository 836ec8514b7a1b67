//! One simulation step of an in-progress expedition.
//!
//! Each tick runs these phases in order:
//!
//! 1. **Progress** -- open runs advance by a random step in
//!    `progress_min..=progress_max`; manual runs track elapsed time over
//!    duration. Clamped at 100.
//! 2. **Collection** -- with `collection_chance_pct` probability, one unit
//!    of one eligible resource (selected, in range, collectible with the
//!    player's gear, target not yet met) is picked uniformly.
//! 3. **Drain** -- hunger and thirst drop by the floor of elapsed time
//!    times the hourly rate, applied as a delta from the previous tick.
//! 4. **Auto-return** -- the first matching condition wins: carried weight,
//!    hunger, thirst, distance, manual targets.
//! 5. **Experience** -- XP for the collected unit is credited last, after
//!    any completion, so a failed tick grants nothing.
//!
//! Elapsed time is `ticks * tick_interval_ms`, not wall-clock time, so a
//! given seed and tick count always produce the same run. When a return
//! condition fires the expedition is completed within the same call.

use outpost_catalog::{Catalog, can_collect};
use outpost_inventory::{CapacityModel, PlayerStore, grant_experience, vitals};
use outpost_types::{
    Expedition, ExpeditionId, ExpeditionMode, ExpeditionStatus, ItemId, Player, ReturnReason,
    TickOutcome,
};
use rand::Rng;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::ExpeditionConfig;
use crate::error::ExpeditionError;
use crate::expedition::{ExpeditionBook, ExpeditionEngine};
use crate::manual;

const MS_PER_HOUR: u64 = 3_600_000;

/// Total drained after `elapsed_ms` at `per_hour`, floored.
pub fn drained_after(elapsed_ms: u64, per_hour: u32) -> u32 {
    let total = elapsed_ms
        .saturating_mul(u64::from(per_hour))
        .checked_div(MS_PER_HOUR)
        .unwrap_or(0);
    u32::try_from(total).unwrap_or(u32::MAX)
}

/// Resources that may be rolled this tick, in selection order.
pub fn eligible_resources(
    expedition: &Expedition,
    player: &Player,
    catalog: &Catalog,
) -> Vec<ItemId> {
    let Some(biome) = catalog.biome(&expedition.biome_id) else {
        return Vec::new();
    };
    expedition
        .selected_resources
        .iter()
        .filter(|id| Catalog::biome_offers(biome, id))
        .filter_map(|id| catalog.resource(id))
        .filter(|r| r.distance_from_camp <= expedition.progress)
        .filter(|r| can_collect(r, player, catalog))
        .filter(|r| manual::needs_more(expedition, &r.id))
        .map(|r| r.id.clone())
        .collect()
}

/// Check the auto-return conditions in priority order.
pub fn return_reason(
    expedition: &Expedition,
    player: &Player,
    carried: Decimal,
    config: &ExpeditionConfig,
) -> Option<ReturnReason> {
    let limit = player
        .max_inventory_weight
        .saturating_mul(Decimal::from(config.auto_return_weight_pct));
    if carried.saturating_mul(Decimal::ONE_HUNDRED) >= limit {
        return Some(ReturnReason::InventoryFull);
    }
    if vitals::is_at_or_below_pct(player.hunger, player.max_hunger, config.low_vitals_pct) {
        return Some(ReturnReason::HungerLow);
    }
    if vitals::is_at_or_below_pct(player.thirst, player.max_thirst, config.low_vitals_pct) {
        return Some(ReturnReason::ThirstLow);
    }
    if expedition.progress >= 100 {
        return Some(ReturnReason::MaxDistanceReached);
    }
    if manual::targets_met(expedition) {
        return Some(ReturnReason::TargetsReached);
    }
    None
}

impl ExpeditionEngine<'_> {
    /// Advance an expedition by one tick.
    ///
    /// A failure inside the step (as opposed to a rejected request)
    /// cancels the expedition so it cannot stay stuck in progress.
    ///
    /// # Errors
    ///
    /// `ExpeditionNotFound`, `ExpeditionNotActive`, or the internal error
    /// that caused the cancellation.
    pub fn tick<R: Rng + ?Sized>(
        &self,
        store: &mut PlayerStore,
        book: &mut ExpeditionBook,
        id: ExpeditionId,
        rng: &mut R,
    ) -> Result<TickOutcome, ExpeditionError> {
        let status = book.get(id)?.status;
        if status != ExpeditionStatus::InProgress {
            return Err(ExpeditionError::ExpeditionNotActive(id));
        }

        match self.step(store, book, id, rng) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(expedition_id = %id, error = %err, "tick failed, cancelling expedition");
                self.cancel(book, id)?;
                Err(err)
            }
        }
    }

    fn step<R: Rng + ?Sized>(
        &self,
        store: &mut PlayerStore,
        book: &mut ExpeditionBook,
        id: ExpeditionId,
        rng: &mut R,
    ) -> Result<TickOutcome, ExpeditionError> {
        let capacity = CapacityModel::new(self.catalog, self.inventory);
        let expedition = book.get_mut(id)?;
        let player_id = expedition.player_id;

        expedition.ticks_elapsed =
            expedition
                .ticks_elapsed
                .checked_add(1)
                .ok_or_else(|| ExpeditionError::ArithmeticOverflow {
                    context: String::from("tick counter overflow"),
                })?;
        let elapsed_ms = expedition
            .ticks_elapsed
            .saturating_mul(self.config.tick_interval_ms);

        // --- Progress ---
        expedition.progress = match &expedition.mode {
            ExpeditionMode::Open => {
                let step = rng.random_range(self.config.progress_min..=self.config.progress_max);
                expedition.progress.saturating_add(step).min(100)
            }
            ExpeditionMode::Manual {
                duration_minutes, ..
            } => manual::time_progress(elapsed_ms, *duration_minutes),
        };

        // --- Collection roll ---
        let mut collected = None;
        if rng.random_range(0..100_u32) < self.config.collection_chance_pct {
            let eligible = eligible_resources(expedition, store.player(player_id)?, self.catalog);
            if !eligible.is_empty()
                && let Some(item) = eligible.get(rng.random_range(0..eligible.len()))
            {
                collected = Some(item.clone());
            }
        }
        if let Some(item) = &collected {
            let entry = expedition
                .collected_resources
                .entry(item.clone())
                .or_insert(0);
            *entry = entry
                .checked_add(1)
                .ok_or_else(|| ExpeditionError::ArithmeticOverflow {
                    context: format!("collected count overflow for {item}"),
                })?;
            expedition.last_collected = Some(item.clone());
        }
        let xp = collected
            .as_ref()
            .and_then(|item| self.catalog.resource(item))
            .map_or(0, |r| r.experience_value);

        // --- Drain ---
        let hunger_total = drained_after(elapsed_ms, self.config.hunger_drain_per_hour);
        let thirst_total = drained_after(elapsed_ms, self.config.thirst_drain_per_hour);
        let player = store.player_mut(player_id)?;
        vitals::drain_hunger(player, hunger_total.saturating_sub(expedition.hunger_drained));
        vitals::drain_thirst(player, thirst_total.saturating_sub(expedition.thirst_drained));
        expedition.hunger_drained = hunger_total;
        expedition.thirst_drained = thirst_total;

        // --- Auto-return ---
        store.refresh_weight(player_id, &capacity)?;
        let player = store.player(player_id)?;
        let carried = player.inventory_weight.saturating_add(
            capacity.compute_weight(
                expedition
                    .collected_resources
                    .iter()
                    .map(|(id, qty)| (id, *qty)),
            ),
        );
        let reason = return_reason(expedition, player, carried, self.config);

        let remaining = match &expedition.mode {
            ExpeditionMode::Open => self.open_seconds_remaining(expedition.progress),
            ExpeditionMode::Manual {
                duration_minutes, ..
            } => manual::seconds_remaining(elapsed_ms, *duration_minutes),
        };
        let outcome = TickOutcome {
            expedition_id: id,
            resource_collected: collected,
            should_return: reason.is_some(),
            return_reason: reason,
            collection_time_remaining: remaining,
            progress: expedition.progress,
        };

        debug!(
            expedition_id = %id,
            tick = expedition.ticks_elapsed,
            progress = outcome.progress,
            collected = ?outcome.resource_collected,
            reason = ?outcome.return_reason,
            "expedition tick"
        );

        // --- Experience ---
        let mut progressed = store.player(player_id)?.clone();
        grant_experience(&mut progressed, xp)?;
        if outcome.should_return {
            self.complete(store, book, id, reason)?;
        }
        let player = store.player_mut(player_id)?;
        player.experience = progressed.experience;
        player.level = progressed.level;
        player.max_inventory_weight = progressed.max_inventory_weight;
        let expedition = book.get_mut(id)?;
        expedition.experience_gained = expedition.experience_gained.saturating_add(xp);
        Ok(outcome)
    }

    /// Estimated seconds until an open run reaches full distance at the
    /// average progress step.
    fn open_seconds_remaining(&self, progress: u32) -> u64 {
        let avg_step = self
            .config
            .progress_min
            .saturating_add(self.config.progress_max)
            .checked_div(2)
            .unwrap_or(1)
            .max(1);
        let ticks_left = 100_u32.saturating_sub(progress).div_ceil(avg_step);
        u64::from(ticks_left)
            .saturating_mul(self.config.tick_interval_ms)
            .checked_div(1000)
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::expedition::tests::Fixture;

    fn tick(f: &mut Fixture, id: ExpeditionId, rng: &mut SmallRng) -> TickOutcome {
        let engine = ExpeditionEngine::new(&f.catalog, &f.config, &f.inventory);
        engine.tick(&mut f.store, &mut f.book, id, rng).unwrap()
    }

    #[test]
    fn drain_is_floored_cumulative() {
        // 2 s ticks at 48/h: 0.0266.. per tick, first whole point at 38 ticks.
        assert_eq!(drained_after(2_000, 48), 0);
        assert_eq!(drained_after(74_000, 48), 0);
        assert_eq!(drained_after(76_000, 48), 1);
        assert_eq!(drained_after(60_000 * 30, 48), 24);
        assert_eq!(drained_after(60_000 * 30, 36), 18);
    }

    #[test]
    fn open_run_progresses_and_returns_at_full_distance() {
        let mut f = Fixture::new();
        let plan = f.plan("forest", &["fiber", "sticks"]);
        let exp = f.start(&plan).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);

        let mut last = 0;
        let mut final_outcome = None;
        for _ in 0..20 {
            let outcome = tick(&mut f, exp.id, &mut rng);
            assert!(outcome.progress >= last);
            assert!(outcome.progress <= 100);
            last = outcome.progress;
            if outcome.should_return {
                final_outcome = Some(outcome);
                break;
            }
        }
        let outcome = final_outcome.unwrap();
        assert_eq!(outcome.return_reason, Some(ReturnReason::MaxDistanceReached));
        let done = f.book.get(exp.id).unwrap();
        assert_eq!(done.status, ExpeditionStatus::Completed);
        assert!(done.deposit.is_some());
        assert!(f.book.active_for(f.player).is_none());
    }

    #[test]
    fn ticking_a_finished_expedition_fails() {
        let mut f = Fixture::new();
        let plan = f.plan("forest", &["fiber"]);
        let exp = f.start(&plan).unwrap();
        let engine = ExpeditionEngine::new(&f.catalog, &f.config, &f.inventory);
        engine.cancel(&mut f.book, exp.id).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let err = engine
            .tick(&mut f.store, &mut f.book, exp.id, &mut rng)
            .unwrap_err();
        assert_eq!(err, ExpeditionError::ExpeditionNotActive(exp.id));
    }

    #[test]
    fn fish_without_rod_is_never_collected() {
        let mut f = Fixture::new();
        f.config.collection_chance_pct = 100;
        let plan = f.plan("lakeside", &["salmon", "trout"]);
        let exp = f.start(&plan).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..10 {
            let outcome = tick(&mut f, exp.id, &mut rng);
            assert_eq!(outcome.resource_collected, None);
            if outcome.should_return {
                break;
            }
        }
        assert_eq!(f.book.get(exp.id).unwrap().collected_total(), 0);
    }

    #[test]
    fn resources_beyond_progress_are_not_rolled() {
        let mut f = Fixture::new();
        let plan = f.plan("forest", &["fiber", "mushrooms"]);
        let exp = f.start(&plan).unwrap();
        let p = f.store.player(f.player).unwrap().clone();
        let mut e = f.book.get(exp.id).unwrap().clone();
        e.progress = 5;
        assert_eq!(eligible_resources(&e, &p, &f.catalog), vec![ItemId::from("fiber")]);
        e.progress = 10;
        assert_eq!(eligible_resources(&e, &p, &f.catalog).len(), 2);
    }

    #[test]
    fn collection_grants_experience() {
        let mut f = Fixture::new();
        f.config.collection_chance_pct = 100;
        let plan = f.plan("forest", &["fiber"]);
        let exp = f.start(&plan).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let outcome = tick(&mut f, exp.id, &mut rng);
        assert_eq!(outcome.resource_collected, Some(ItemId::from("fiber")));
        assert_eq!(f.store.player(f.player).unwrap().experience, 1);
    }

    #[test]
    fn failed_tick_grants_no_experience() {
        let mut f = Fixture::new();
        f.config.collection_chance_pct = 100;
        let fiber = ItemId::from("fiber");
        // 20 kg of fiber fills the pack; storage is one unit from overflow.
        f.store.add_inventory(f.player, &fiber, 200).unwrap();
        f.store.add_storage(f.player, &fiber, u32::MAX).unwrap();
        f.store.player_mut(f.player).unwrap().auto_storage = true;
        let plan = f.plan("forest", &["fiber"]);
        let exp = f.start(&plan).unwrap();

        let mut rng = SmallRng::seed_from_u64(5);
        let engine = ExpeditionEngine::new(&f.catalog, &f.config, &f.inventory);
        let err = engine
            .tick(&mut f.store, &mut f.book, exp.id, &mut rng)
            .unwrap_err();
        assert_eq!(err.code(), "ArithmeticOverflow");

        let cancelled = f.book.get(exp.id).unwrap();
        assert_eq!(cancelled.status, ExpeditionStatus::Cancelled);
        assert_eq!(cancelled.experience_gained, 0);
        let p = f.store.player(f.player).unwrap();
        assert_eq!(p.experience, 0);
        assert_eq!(p.level, 1);
    }

    #[test]
    fn low_hunger_forces_return() {
        let mut f = Fixture::new();
        f.config.collection_chance_pct = 0;
        let plan = f.plan("forest", &["fiber"]);
        let exp = f.start(&plan).unwrap();
        f.store.player_mut(f.player).unwrap().hunger = 10;
        let mut rng = SmallRng::seed_from_u64(9);
        let outcome = tick(&mut f, exp.id, &mut rng);
        assert!(outcome.should_return);
        assert_eq!(outcome.return_reason, Some(ReturnReason::HungerLow));
        let done = f.book.get(exp.id).unwrap();
        assert_eq!(done.auto_return_trigger, Some(ReturnReason::HungerLow));
    }

    #[test]
    fn heavy_pack_returns_before_low_vitals() {
        let mut f = Fixture::new();
        f.config.collection_chance_pct = 0;
        f.store.add_inventory(f.player, &ItemId::from("clay"), 18).unwrap();
        let plan = f.plan("forest", &["fiber"]);
        let exp = f.start(&plan).unwrap();
        f.store.player_mut(f.player).unwrap().hunger = 0;
        let mut rng = SmallRng::seed_from_u64(9);
        let outcome = tick(&mut f, exp.id, &mut rng);
        assert_eq!(outcome.return_reason, Some(ReturnReason::InventoryFull));
    }

    #[test]
    fn manual_run_returns_when_targets_met() {
        let mut f = Fixture::new();
        f.config.collection_chance_pct = 100;
        let mut plan = f.plan("forest", &[]);
        plan.mode = ExpeditionMode::Manual {
            targets: [(ItemId::from("fiber"), 2)].into_iter().collect(),
            duration_minutes: 10,
        };
        let exp = f.start(&plan).unwrap();
        let mut rng = SmallRng::seed_from_u64(11);

        let first = tick(&mut f, exp.id, &mut rng);
        assert!(!first.should_return);
        // 2 s of a 10 min run.
        assert_eq!(first.progress, 0);
        assert_eq!(first.collection_time_remaining, 598);

        let second = tick(&mut f, exp.id, &mut rng);
        assert_eq!(second.return_reason, Some(ReturnReason::TargetsReached));
        assert_eq!(f.store.inventory_quantity(f.player, &ItemId::from("fiber")), 2);
    }

    #[test]
    fn same_seed_same_run() {
        let run = |seed: u64| {
            let mut f = Fixture::new();
            let plan = f.plan("forest", &["fiber", "sticks", "berries"]);
            let exp = f.start(&plan).unwrap();
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut trace = Vec::new();
            for _ in 0..5 {
                let o = tick(&mut f, exp.id, &mut rng);
                trace.push((o.progress, o.resource_collected.clone()));
                if o.should_return {
                    break;
                }
            }
            trace
        };
        assert_eq!(run(99), run(99));
    }
}
