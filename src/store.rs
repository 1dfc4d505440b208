//! Rest stop restocking and the driver/addon storefront.
//!
//! Rest stop items are paid from in-game cash. Driver and addon
//! unlocks model app-store purchases: the money moves through a saved
//! payment method, so unlocking never touches the wallet.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    CASH_PACK_CENTS, LOG_ADDON_UNLOCKED_PREFIX, LOG_CASH_PACK, LOG_DRIVER_UNLOCKED_PREFIX,
    LOG_RESTOCK_PREFIX, RESOURCE_MAX,
};
use crate::data::GameData;
use crate::state::GameState;

/// Which gauge a rest stop purchase tops up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Gas,
    Energy,
    Food,
    Sleep,
}

/// One shelf item at the rest stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestStopItem {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub price_cents: i64,
    pub resource: ResourceKind,
    pub restore: i32,
}

impl RestStopItem {
    fn new(id: &str, name: &str, desc: &str, price_cents: i64, resource: ResourceKind, restore: i32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            desc: desc.to_string(),
            price_cents,
            resource,
            restore,
        }
    }
}

/// Failures from the store surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("need {needed_cents} cents but only {have_cents} on hand")]
    InsufficientFunds { needed_cents: i64, have_cents: i64 },
    #[error("no rest stop item with id {0:?}")]
    UnknownItem(String),
    #[error("no driver with id {0:?}")]
    UnknownDriver(String),
    #[error("no addon with id {0:?}")]
    UnknownAddon(String),
}

/// The fixed rest stop shelf.
#[must_use]
pub fn rest_stop_catalog() -> Vec<RestStopItem> {
    use ResourceKind::{Energy, Food, Gas, Sleep};
    vec![
        RestStopItem::new("gas", "Refuel", "Fill up the tank.", 2_000, Gas, 30),
        RestStopItem::new("coffee", "Coffee", "Boost your energy.", 100, Energy, 30),
        RestStopItem::new("meal", "Meal Deal", "Don't drive hungry.", 200, Food, 30),
        RestStopItem::new("motel", "Motel Nap", "Recover from fatigue.", 1_000, Sleep, 30),
        RestStopItem::new("water", "Water For You", "Hydrate (+Energy).", 50, Energy, 10),
        RestStopItem::new("candy", "Candy Bar", "Quick sugar rush.", 50, Food, 10),
        RestStopItem::new("allergy", "Allergy Meds", "Clear head (+Sleep).", 100, Sleep, 20),
        RestStopItem::new("bathroom", "Bathroom", "Nature calls.", 0, Energy, 5),
        RestStopItem::new("cigarettes", "Cigarettes", "Take the edge off.", 200, Energy, 15),
        RestStopItem::new("aspirin", "Aspirin", "Kill the headache.", 100, Sleep, 15),
    ]
}

/// Buy one rest stop item, topping the gauge up to its cap.
///
/// # Errors
///
/// [`StoreError::UnknownItem`] for a bad id,
/// [`StoreError::InsufficientFunds`] when the wallet cannot cover it.
pub fn buy_rest_stop_item(
    state: &mut GameState,
    catalog: &[RestStopItem],
    item_id: &str,
) -> Result<(), StoreError> {
    let item = catalog
        .iter()
        .find(|i| i.id == item_id)
        .ok_or_else(|| StoreError::UnknownItem(item_id.to_string()))?;
    if state.cash_cents < item.price_cents {
        return Err(StoreError::InsufficientFunds {
            needed_cents: item.price_cents,
            have_cents: state.cash_cents,
        });
    }

    state.cash_cents -= item.price_cents;
    let gauge = match item.resource {
        ResourceKind::Gas => &mut state.gauges.gas,
        ResourceKind::Energy => &mut state.gauges.energy,
        ResourceKind::Food => &mut state.gauges.food,
        ResourceKind::Sleep => &mut state.gauges.sleep,
    };
    *gauge = (*gauge + item.restore).min(RESOURCE_MAX);
    state.push_log(format!("{LOG_RESTOCK_PREFIX}{}", item.id));
    Ok(())
}

/// Unlock a driver and slide into their seat. Idempotent for drivers
/// already on the payroll.
///
/// # Errors
///
/// [`StoreError::UnknownDriver`] when the roster has no such id.
pub fn unlock_driver(state: &mut GameState, data: &GameData, driver_id: &str) -> Result<(), StoreError> {
    if data.driver(driver_id).is_none() {
        return Err(StoreError::UnknownDriver(driver_id.to_string()));
    }
    if !state.owns_driver(driver_id) {
        state.owned_driver_ids.push(driver_id.to_string());
        state.push_log(format!("{LOG_DRIVER_UNLOCKED_PREFIX}{driver_id}"));
    }
    state.current_driver_id = driver_id.to_string();
    Ok(())
}

/// Unlock an addon. Idempotent for addons already owned.
///
/// # Errors
///
/// [`StoreError::UnknownAddon`] when the catalog has no such id.
pub fn unlock_addon(state: &mut GameState, data: &GameData, addon_id: &str) -> Result<(), StoreError> {
    if data.addon(addon_id).is_none() {
        return Err(StoreError::UnknownAddon(addon_id.to_string()));
    }
    if !state.owns_addon(addon_id) {
        state.owned_addon_ids.push(addon_id.to_string());
        state.push_log(format!("{LOG_ADDON_UNLOCKED_PREFIX}{addon_id}"));
    }
    Ok(())
}

/// Credit a purchased cash pack to the wallet.
pub fn buy_cash_pack(state: &mut GameState) {
    state.cash_cents += CASH_PACK_CENTS;
    state.push_log(LOG_CASH_PACK);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_a_free_bathroom_break() {
        let catalog = rest_stop_catalog();
        let bathroom = catalog.iter().find(|i| i.id == "bathroom").unwrap();
        assert_eq!(bathroom.price_cents, 0);
        assert_eq!(bathroom.restore, 5);
    }

    #[test]
    fn buying_gas_tops_up_and_charges() {
        let catalog = rest_stop_catalog();
        let mut state = GameState::default();
        state.gauges.gas = 40;
        buy_rest_stop_item(&mut state, &catalog, "gas").unwrap();
        assert_eq!(state.gauges.gas, 70);
        assert_eq!(state.cash_cents, 3_000);
        assert!(state.logs.iter().any(|l| l == "log.restock.gas"));
    }

    #[test]
    fn restock_caps_at_the_gauge_maximum() {
        let catalog = rest_stop_catalog();
        let mut state = GameState::default();
        state.gauges.energy = 95;
        buy_rest_stop_item(&mut state, &catalog, "coffee").unwrap();
        assert_eq!(state.gauges.energy, 100);
    }

    #[test]
    fn broke_players_are_turned_away() {
        let catalog = rest_stop_catalog();
        let mut state = GameState::default();
        state.cash_cents = 150;
        let err = buy_rest_stop_item(&mut state, &catalog, "gas").unwrap_err();
        assert_eq!(
            err,
            StoreError::InsufficientFunds {
                needed_cents: 2_000,
                have_cents: 150
            }
        );
        assert_eq!(state.cash_cents, 150);

        // The free option still works with an empty wallet.
        state.cash_cents = 0;
        buy_rest_stop_item(&mut state, &catalog, "bathroom").unwrap();
    }

    #[test]
    fn unknown_item_is_rejected() {
        let mut state = GameState::default();
        assert!(matches!(
            buy_rest_stop_item(&mut state, &rest_stop_catalog(), "lobster"),
            Err(StoreError::UnknownItem(_))
        ));
    }

    #[test]
    fn unlocking_a_driver_selects_them() {
        let data = GameData::default_content();
        let mut state = GameState::default();
        unlock_driver(&mut state, &data, "skyler").unwrap();
        assert!(state.owns_driver("skyler"));
        assert_eq!(state.current_driver_id, "skyler");
        assert!(state.logs.iter().any(|l| l == "log.driver.unlocked.skyler"));

        // A second unlock re-selects without duplicating ownership.
        state.current_driver_id = "randy".into();
        unlock_driver(&mut state, &data, "skyler").unwrap();
        assert_eq!(state.current_driver_id, "skyler");
        assert_eq!(
            state.owned_driver_ids.iter().filter(|id| *id == "skyler").count(),
            1
        );
    }

    #[test]
    fn unlocking_an_addon_is_append_only_and_idempotent() {
        let data = GameData::default_content();
        let mut state = GameState::default();
        unlock_addon(&mut state, &data, "dashcam").unwrap();
        unlock_addon(&mut state, &data, "dashcam").unwrap();
        assert_eq!(state.owned_addon_ids, vec!["dashcam".to_string()]);
        assert!(matches!(
            unlock_addon(&mut state, &data, "jetpack"),
            Err(StoreError::UnknownAddon(_))
        ));
    }

    #[test]
    fn cash_pack_credits_fifty_dollars() {
        let mut state = GameState::default();
        buy_cash_pack(&mut state);
        assert_eq!(state.cash_cents, 10_000);
        assert!(state.logs.iter().any(|l| l == "log.cash-pack"));
    }
}
