//! Goods and Activities
//!
//! The closed sets of tradeable commodities and behavior states shared by
//! the simulation and everything that displays it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of commodity variants.
pub const COMMODITY_COUNT: usize = 6;

/// A tradeable good.
///
/// Declaration order is the iteration order used everywhere a pass walks
/// over commodities, so it must not be reshuffled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Commodity {
    Coins,
    PotionMaterial,
    Potion,
    RawFood,
    PreparedFood,
    WeaponService,
}

impl Commodity {
    /// All commodities in declaration order.
    pub const ALL: [Commodity; COMMODITY_COUNT] = [
        Commodity::Coins,
        Commodity::PotionMaterial,
        Commodity::Potion,
        Commodity::RawFood,
        Commodity::PreparedFood,
        Commodity::WeaponService,
    ];

    /// Dense index into per-commodity arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Coins are the medium of exchange and weapon service is sold as a
    /// repair job, so neither goes through shop trading or stockpile repricing.
    pub fn is_tradeable(self) -> bool {
        !matches!(self, Commodity::Coins | Commodity::WeaponService)
    }

    /// Commodities that take part in trading rounds and stockpile repricing.
    pub fn tradeable() -> impl Iterator<Item = Commodity> {
        Self::ALL.into_iter().filter(|c| c.is_tradeable())
    }

    /// Presentation name.
    pub fn display_name(self) -> &'static str {
        match self {
            Commodity::Coins => "Coins",
            Commodity::PotionMaterial => "Potion material",
            Commodity::Potion => "Potion",
            Commodity::RawFood => "Food ingredients",
            Commodity::PreparedFood => "Food",
            Commodity::WeaponService => "Weapon service",
        }
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A named behavior state. Idle is the absence of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Shopping,
    WeaponRepair,
    PrepareFood,
    GettingFood,
    Working,
}

impl Activity {
    /// Presentation name for an optional activity (`None` is idle).
    pub fn display_name(activity: Option<Activity>) -> &'static str {
        match activity {
            None => "Idle",
            Some(Activity::GettingFood) => "Looking for food",
            Some(Activity::PrepareFood) => "Preparing food",
            Some(Activity::Shopping) => "Trading",
            Some(Activity::WeaponRepair) => "Repair weapon",
            Some(Activity::Working) => "Working",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Activity::display_name(Some(*self)))
    }
}
