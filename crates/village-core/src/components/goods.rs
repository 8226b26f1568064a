//! Goods Components
//!
//! Dense per-commodity storage and character skills.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

pub use village_events::{Activity, Commodity, COMMODITY_COUNT};

/// One value per commodity, stored in a fixed array indexed by the
/// commodity's declaration order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommodityMap<T>([T; COMMODITY_COUNT]);

impl<T: Copy> CommodityMap<T> {
    /// Map with every commodity set to `value`.
    pub fn filled(value: T) -> Self {
        Self([value; COMMODITY_COUNT])
    }

    pub fn get(&self, commodity: Commodity) -> T {
        self.0[commodity.index()]
    }

    pub fn set(&mut self, commodity: Commodity, value: T) {
        self.0[commodity.index()] = value;
    }

    /// Iterates `(commodity, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Commodity, T)> + '_ {
        Commodity::ALL.iter().map(move |&c| (c, self.0[c.index()]))
    }
}

impl<T: Copy + Default> Default for CommodityMap<T> {
    fn default() -> Self {
        Self::filled(T::default())
    }
}

impl<T> Index<Commodity> for CommodityMap<T> {
    type Output = T;

    fn index(&self, commodity: Commodity) -> &T {
        &self.0[commodity.index()]
    }
}

impl<T> IndexMut<Commodity> for CommodityMap<T> {
    fn index_mut(&mut self, commodity: Commodity) -> &mut T {
        &mut self.0[commodity.index()]
    }
}

/// A trained ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Cooking,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commodity_map_get_set() {
        let mut map = CommodityMap::filled(0.0_f32);
        map.set(Commodity::Potion, 3.0);
        map[Commodity::RawFood] += 2.0;

        assert_eq!(map.get(Commodity::Potion), 3.0);
        assert_eq!(map[Commodity::RawFood], 2.0);
        assert_eq!(map.get(Commodity::Coins), 0.0);
    }

    #[test]
    fn test_commodity_map_iterates_in_order() {
        let map = CommodityMap::filled(1_u8);
        let order: Vec<_> = map.iter().map(|(c, _)| c).collect();
        assert_eq!(order, Commodity::ALL.to_vec());
    }
}
