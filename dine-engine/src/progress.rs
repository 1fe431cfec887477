//! Meal progress aggregation
//!
//! Groups active items by wave, computes each wave's display status and the
//! next wave that can be fired.

use crate::store::SessionStore;
use serde::Serialize;
use shared::{ItemStatus, OrderItem, WaveNumber, WaveStatus};
use std::collections::BTreeMap;

/// Aggregate status of one wave's items.
///
/// Void items are ignored. Priority: empty → held, all served → served,
/// any ready → ready, any cooking → preparing, any sent → fired, else held.
/// Independent of item order.
pub fn compute_wave_status<'a>(items: impl IntoIterator<Item = &'a OrderItem>) -> WaveStatus {
    let mut total = 0usize;
    let mut served = 0usize;
    let (mut ready, mut cooking, mut sent) = (false, false, false);
    for item in items.into_iter().filter(|i| i.is_active()) {
        total += 1;
        match item.status {
            ItemStatus::Served => served += 1,
            ItemStatus::Ready => ready = true,
            ItemStatus::Cooking => cooking = true,
            ItemStatus::Sent => sent = true,
            ItemStatus::Held | ItemStatus::Void => {}
        }
    }

    if total == 0 {
        WaveStatus::Held
    } else if served == total {
        WaveStatus::Served
    } else if ready {
        WaveStatus::Ready
    } else if cooking {
        WaveStatus::Preparing
    } else if sent {
        WaveStatus::Fired
    } else {
        WaveStatus::Held
    }
}

/// Lowest wave that still has held items
pub fn compute_next_fireable_wave<'a>(
    items: impl IntoIterator<Item = &'a OrderItem>,
) -> Option<WaveNumber> {
    items
        .into_iter()
        .filter(|i| i.status == ItemStatus::Held)
        .map(|i| i.wave)
        .min()
}

/// Progress of one wave
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveProgress {
    pub number: WaveNumber,
    pub status: WaveStatus,
    pub item_count: usize,
    /// Max ETA hint across the wave's cooking items
    pub eta_minutes: Option<u32>,
}

/// Progress of the whole meal
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealProgress {
    pub waves: Vec<WaveProgress>,
    pub items_by_wave: BTreeMap<WaveNumber, Vec<OrderItem>>,
    pub next_fireable: Option<WaveNumber>,
}

impl MealProgress {
    /// Empty until at least one item has left `held`
    pub fn is_started(&self) -> bool {
        !self.waves.is_empty()
    }

    pub fn wave(&self, number: WaveNumber) -> Option<&WaveProgress> {
        self.waves.iter().find(|w| w.number == number)
    }
}

/// Build progress over waves `1..=max(wave_count, highest wave in use)`
pub fn build_progress(store: &SessionStore, wave_count: WaveNumber) -> MealProgress {
    let started = store
        .active_items()
        .any(|i| i.status != ItemStatus::Held);
    if !started {
        return MealProgress::default();
    }

    let last_wave = wave_count.max(store.highest_wave_in_use().unwrap_or(1)).max(1);
    let mut items_by_wave: BTreeMap<WaveNumber, Vec<OrderItem>> = BTreeMap::new();
    for item in store.active_items() {
        items_by_wave.entry(item.wave).or_default().push(item.clone());
    }

    let waves = (1..=last_wave)
        .map(|number| {
            let items = items_by_wave.get(&number).map(Vec::as_slice).unwrap_or(&[]);
            let eta_minutes = items
                .iter()
                .filter(|i| i.status == ItemStatus::Cooking)
                .filter_map(|i| i.eta_minutes)
                .max();
            WaveProgress {
                number,
                status: compute_wave_status(items),
                item_count: items.len(),
                eta_minutes,
            }
        })
        .collect();

    MealProgress {
        waves,
        next_fireable: compute_next_fireable_wave(store.active_items()),
        items_by_wave,
    }
}
