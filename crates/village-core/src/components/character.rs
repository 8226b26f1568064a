//! Character Components
//!
//! Economic and behavioral state of decision-making agents. Physical state
//! (position, hp, hunger) belongs to the embodied Thing, never to the
//! character.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::goods::{Activity, Commodity, CommodityMap, Skill};
use crate::error::SimError;

/// Marker component identifying an entity as a character
#[derive(Component, Debug, Clone, Default)]
pub struct Character;

/// Human-readable name for a character
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct CharacterName(pub String);

/// Which behavior program drives a character
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    Hunter,
    Alchemist,
    Herbalist,
    Innkeeper,
    Shopkeeper,
    WeaponMaster,
}

impl Personality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::Hunter => "hunter",
            Personality::Alchemist => "alchemist",
            Personality::Herbalist => "herbalist",
            Personality::Innkeeper => "innkeeper",
            Personality::Shopkeeper => "shopkeeper",
            Personality::WeaponMaster => "weapon_master",
        }
    }

    /// Hunters and alchemists only trade in person, inside the shop.
    pub fn trades_in_person(&self) -> bool {
        matches!(self, Personality::Hunter | Personality::Alchemist)
    }
}

/// Commodity holdings. Quantities never go negative.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Inventory(CommodityMap<f32>);

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style initial holding
    pub fn with(mut self, commodity: Commodity, amount: f32) -> Self {
        self.0.set(commodity, amount.max(0.0));
        self
    }

    pub fn get(&self, commodity: Commodity) -> f32 {
        self.0.get(commodity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Commodity, f32)> + '_ {
        self.0.iter()
    }

    pub fn deposit(&mut self, commodity: Commodity, amount: f32) -> Result<(), SimError> {
        check_amount(commodity, amount)?;
        self.0[commodity] += amount;
        Ok(())
    }

    pub fn withdraw(&mut self, commodity: Commodity, amount: f32) -> Result<(), SimError> {
        check_amount(commodity, amount)?;
        let available = self.0.get(commodity);
        if available < amount {
            return Err(SimError::InsufficientFunds {
                commodity,
                available,
                requested: amount,
            });
        }
        self.0.set(commodity, available - amount);
        Ok(())
    }
}

/// Rejects negative and non-finite quantities.
pub fn check_amount(commodity: Commodity, amount: f32) -> Result<(), SimError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidAmount { commodity, amount })
    }
}

/// Private buy/sell price estimates, one pair per commodity.
///
/// Setters clamp to the floor and ignore non-finite input, so beliefs stay
/// strictly positive whatever the update rule computes.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PriceBeliefs {
    buy: CommodityMap<f32>,
    sell: CommodityMap<f32>,
    floor: f32,
}

impl PriceBeliefs {
    pub fn new(initial: f32, floor: f32) -> Self {
        let floor = floor.max(f32::MIN_POSITIVE);
        let initial = initial.max(floor);
        Self {
            buy: CommodityMap::filled(initial),
            sell: CommodityMap::filled(initial),
            floor,
        }
    }

    pub fn buy(&self, commodity: Commodity) -> f32 {
        self.buy.get(commodity)
    }

    pub fn sell(&self, commodity: Commodity) -> f32 {
        self.sell.get(commodity)
    }

    pub fn floor(&self) -> f32 {
        self.floor
    }

    pub fn set_buy(&mut self, commodity: Commodity, value: f32) {
        if value.is_finite() {
            self.buy.set(commodity, value.max(self.floor));
        }
    }

    pub fn set_sell(&mut self, commodity: Commodity, value: f32) {
        if value.is_finite() {
            self.sell.set(commodity, value.max(self.floor));
        }
    }
}

/// Current activity and how many ticks it has been progressing.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentActivity {
    pub activity: Option<Activity>,
    pub timer: u32,
}

impl CurrentActivity {
    pub fn is_idle(&self) -> bool {
        self.activity.is_none()
    }

    pub fn start(&mut self, activity: Activity) {
        self.activity = Some(activity);
        self.timer = 0;
    }

    pub fn advance(&mut self) {
        self.timer = self.timer.saturating_add(1);
    }

    /// Back to idle with a cleared timer
    pub fn reset(&mut self) {
        self.activity = None;
        self.timer = 0;
    }
}

/// Weapon condition; multiplies hunting damage.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    pub quality: f32,
}

impl Default for Weapon {
    fn default() -> Self {
        Self { quality: 0.0 }
    }
}

/// Skill levels (missing skills read as 0)
#[derive(Component, Debug, Clone, Default)]
pub struct Skills(HashMap<Skill, f32>);

impl Skills {
    pub fn with(mut self, skill: Skill, level: f32) -> Self {
        self.0.insert(skill, level);
        self
    }

    pub fn get(&self, skill: Skill) -> f32 {
        self.0.get(&skill).copied().unwrap_or(0.0)
    }
}

/// Buildings a character visits for each errand.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Favourites {
    pub shop: Option<Entity>,
    pub inn: Option<Entity>,
    pub weapon_shop: Option<Entity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdraw_rejects_overdraft() {
        let mut inventory = Inventory::new().with(Commodity::Coins, 5.0);

        let err = inventory.withdraw(Commodity::Coins, 6.0).unwrap_err();
        assert_eq!(
            err,
            SimError::InsufficientFunds {
                commodity: Commodity::Coins,
                available: 5.0,
                requested: 6.0,
            }
        );
        assert_eq!(inventory.get(Commodity::Coins), 5.0);
    }

    #[test]
    fn test_negative_and_nan_amounts_rejected() {
        let mut inventory = Inventory::new();
        assert!(matches!(
            inventory.deposit(Commodity::Potion, -1.0),
            Err(SimError::InvalidAmount { .. })
        ));
        assert!(matches!(
            inventory.withdraw(Commodity::Potion, f32::NAN),
            Err(SimError::InvalidAmount { .. })
        ));
        assert_eq!(inventory.get(Commodity::Potion), 0.0);
    }

    #[test]
    fn test_price_beliefs_clamp_to_floor() {
        let mut beliefs = PriceBeliefs::new(1.0, 1e-5);
        beliefs.set_buy(Commodity::Potion, -3.0);
        beliefs.set_sell(Commodity::Potion, f32::INFINITY);

        assert_eq!(beliefs.buy(Commodity::Potion), 1e-5);
        assert_eq!(beliefs.sell(Commodity::Potion), 1.0);
    }

    #[test]
    fn test_activity_lifecycle() {
        let mut current = CurrentActivity::default();
        assert!(current.is_idle());

        current.start(Activity::Working);
        current.advance();
        current.advance();
        assert_eq!(current.activity, Some(Activity::Working));
        assert_eq!(current.timer, 2);

        current.reset();
        assert!(current.is_idle());
        assert_eq!(current.timer, 0);
    }

    #[test]
    fn test_missing_skill_reads_zero() {
        let skills = Skills::default().with(Skill::Cooking, 0.3);
        assert_eq!(skills.get(Skill::Cooking), 0.3);
        assert_eq!(Skills::default().get(Skill::Cooking), 0.0);
    }
}
