//! Completing an expedition and depositing what it collected.
//!
//! Items are deposited one resource at a time in item-id order:
//!
//! 1. Water-category resources fill the player's water counter up to its
//!    ceiling.
//! 2. Everything else goes into inventory up to what still fits by weight
//!    and slots.
//! 3. Overflow goes to storage when the player has auto-storage on (and the
//!    storage cap allows); otherwise it is dropped.
//!
//! Every unit ends up in exactly one bucket of the [`DepositReport`].

use std::collections::BTreeMap;

use chrono::Utc;
use outpost_inventory::{PlayerStore, TransferEngine};
use outpost_types::{
    DepositReport, Expedition, ExpeditionId, ExpeditionStatus, ItemId, PlayerId,
    ResourceCategory, ReturnReason,
};
use tracing::{info, warn};

use crate::error::ExpeditionError;
use crate::expedition::{ExpeditionBook, ExpeditionEngine, transition};

impl ExpeditionEngine<'_> {
    /// Finish an in-progress expedition and deposit its haul.
    ///
    /// `reason` is the auto-return trigger, or `None` for an explicit
    /// finalize.
    ///
    /// # Errors
    ///
    /// `ExpeditionNotFound`, `InvalidTransition` if not in progress, or a
    /// wrapped inventory error if the player vanished.
    pub fn complete(
        &self,
        store: &mut PlayerStore,
        book: &mut ExpeditionBook,
        id: ExpeditionId,
        reason: Option<ReturnReason>,
    ) -> Result<Expedition, ExpeditionError> {
        let expedition = book.get(id)?;
        if !expedition
            .status
            .can_transition_to(ExpeditionStatus::Completed)
        {
            return Err(ExpeditionError::InvalidTransition {
                from: expedition.status,
                to: ExpeditionStatus::Completed,
            });
        }
        let player = expedition.player_id;
        let collected = expedition.collected_resources.clone();

        let report = self.deposit(store, player, &collected)?;

        let expedition = book.get_mut(id)?;
        transition(expedition, ExpeditionStatus::Completed)?;
        expedition.end_time = Some(Utc::now());
        expedition.auto_return_trigger = reason;
        expedition.deposit = Some(report);
        let snapshot = expedition.clone();
        book.release(player, id);

        info!(
            expedition_id = %id,
            player_id = %player,
            collected = snapshot.collected_total(),
            dropped = snapshot.deposit.as_ref().map_or(0, DepositReport::dropped_total),
            reason = ?reason,
            "expedition completed"
        );
        Ok(snapshot)
    }

    /// Place `collected` into water, inventory, and storage.
    ///
    /// # Errors
    ///
    /// Returns a wrapped inventory error if the player does not exist or a
    /// stack overflows.
    pub fn deposit(
        &self,
        store: &mut PlayerStore,
        player: PlayerId,
        collected: &BTreeMap<ItemId, u32>,
    ) -> Result<DepositReport, ExpeditionError> {
        let transfers = TransferEngine::new(self.catalog, self.inventory);
        let capacity = transfers.capacity();
        let mut report = DepositReport::default();

        for (item, &quantity) in collected {
            if quantity == 0 {
                continue;
            }
            let is_water = self
                .catalog
                .resource(item)
                .is_some_and(|r| r.category == ResourceCategory::Water);

            if is_water {
                let p = store.player_mut(player)?;
                let room = p.max_water_storage.saturating_sub(p.water_storage);
                let added = quantity.min(room);
                p.water_storage = p.water_storage.saturating_add(added);
                report.water_added = report.water_added.saturating_add(added);
                record(&mut report.dropped, item, quantity.saturating_sub(added));
                continue;
            }

            let fit = capacity
                .max_fit(store.inventory(player), item, store.player(player)?)
                .min(quantity);
            store.add_inventory(player, item, fit)?;
            record(&mut report.deposited, item, fit);

            let mut overflow = quantity.saturating_sub(fit);
            if overflow > 0 && store.player(player)?.auto_storage {
                let room = transfers.storage_max_fit(store.storage(player), item);
                let stored = overflow.min(room);
                store.add_storage(player, item, stored)?;
                record(&mut report.stored, item, stored);
                overflow = overflow.saturating_sub(stored);
            }
            if overflow > 0 {
                warn!(player_id = %player, item = %item, quantity = overflow, "deposit overflow dropped");
                record(&mut report.dropped, item, overflow);
            }
        }

        store.refresh_weight(player, &capacity)?;
        Ok(report)
    }
}

fn record(bucket: &mut BTreeMap<ItemId, u32>, item: &ItemId, quantity: u32) {
    if quantity > 0 {
        let entry = bucket.entry(item.clone()).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }
}
