//! Market
//!
//! Price belief adaptation: convergence toward a counterparty's quote during
//! trades, and the periodic maintenance pass (stockpile decay, spoilage,
//! scarcity pressure, repair price decay).

use bevy_ecs::prelude::*;

use crate::components::{
    AiModelRegistry, Character, Commodity, CommodityMap, Inventory, Personality, PriceBeliefs,
};
use crate::config::{MarketConfig, SimConfig};
use crate::output::{CommodityFlows, TickEvents};
use crate::systems::clock::SimClock;
use village_events::SimEvent;

/// One learning step from `belief` toward an observed `quote`.
pub fn converge(belief: f32, quote: f32, alpha: f32) -> f32 {
    belief + (quote - belief) * alpha
}

/// Moves a character's beliefs about `commodity` toward a counterparty:
/// the buy belief toward their sell quote and the sell belief toward their
/// buy quote.
pub fn converge_beliefs(
    beliefs: &mut PriceBeliefs,
    commodity: Commodity,
    counterparty_sell: f32,
    counterparty_buy: f32,
    alpha: f32,
) {
    let buy = converge(beliefs.buy(commodity), counterparty_sell, alpha);
    let sell = converge(beliefs.sell(commodity), counterparty_buy, alpha);
    beliefs.set_buy(commodity, buy);
    beliefs.set_sell(commodity, sell);
}

/// Reprices one character's stock against its personality's targets.
///
/// For each tradeable commodity, in order:
/// - overstock (more than `overstock_factor` times target) decays both
///   beliefs by `exp(-inventory/target * rate)`; skipped for zero targets
/// - every full `spoilage_batch` held spoils one unit, with an extra
///   haircut on both beliefs proportional to the spoiled amount
/// - shortfall below target raises the buy belief by `exp(lack * rate)`,
///   capped at coins on hand plus a margin. Shopkeepers set their sell
///   belief to the uncapped raise; everyone else bumps sell the same way,
///   capped.
///
/// Returns the spoiled amount per commodity.
pub fn maintain_prices(
    personality: Personality,
    inventory: &mut Inventory,
    beliefs: &mut PriceBeliefs,
    targets: &CommodityMap<f32>,
    config: &MarketConfig,
) -> CommodityMap<f32> {
    let mut spoiled = CommodityMap::filled(0.0_f32);
    let floor = beliefs.floor();

    for commodity in Commodity::tradeable() {
        let held = inventory.get(commodity);
        let target = targets.get(commodity);

        if target > 0.0 && held > target * config.overstock_factor {
            let ratio = held / target;
            beliefs.set_sell(
                commodity,
                beliefs.sell(commodity) * (-ratio * config.sell_decay_rate).exp(),
            );
            beliefs.set_buy(
                commodity,
                beliefs.buy(commodity) * (-ratio * config.buy_decay_rate).exp(),
            );
        }

        let spoilage = if config.spoilage_batch > 0.0 {
            (held / config.spoilage_batch).floor()
        } else {
            0.0
        };
        if spoilage > 0.0 && inventory.withdraw(commodity, spoilage).is_ok() {
            spoiled.set(commodity, spoilage);
            beliefs.set_sell(
                commodity,
                floor + beliefs.sell(commodity) * (-spoilage * config.sell_decay_rate).exp(),
            );
            beliefs.set_buy(
                commodity,
                floor + beliefs.buy(commodity) * (-spoilage * config.buy_decay_rate).exp(),
            );
        }

        // Shortfall is judged on the stock held before spoilage
        if held < target {
            let lack = (target - held) / target;
            let multiplier = (lack * config.scarcity_rate).exp();
            let ceiling = inventory.get(Commodity::Coins) + config.price_ceiling_margin;

            let raised = beliefs.buy(commodity) * multiplier;
            beliefs.set_buy(commodity, raised.min(ceiling));
            if personality == Personality::Shopkeeper {
                // asking price follows the raise before the coin ceiling
                beliefs.set_sell(commodity, raised);
            } else {
                beliefs.set_sell(commodity, (beliefs.sell(commodity) * multiplier).min(ceiling));
            }
        }
    }

    spoiled
}

/// Weapon masters discount their repair service a little each cycle.
pub fn decay_weapon_service(beliefs: &mut PriceBeliefs, config: &MarketConfig) {
    let price = beliefs.sell(Commodity::WeaponService) * config.weapon_service_decay;
    beliefs.set_sell(Commodity::WeaponService, price);
}

/// Whether `tick` is a maintenance tick
pub fn is_maintenance_tick(tick: u64, config: &MarketConfig) -> bool {
    config.maintenance_interval > 0 && tick % config.maintenance_interval == 0
}

/// System: periodic price maintenance
pub fn maintain_markets(
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    models: Res<AiModelRegistry>,
    mut flows: ResMut<CommodityFlows>,
    mut events: ResMut<TickEvents>,
    mut characters: Query<
        (Entity, &Personality, &mut Inventory, &mut PriceBeliefs),
        With<Character>,
    >,
) {
    if !is_maintenance_tick(clock.tick, &config.market) {
        return;
    }

    for (entity, personality, mut inventory, mut beliefs) in characters.iter_mut() {
        if *personality == Personality::WeaponMaster {
            decay_weapon_service(&mut beliefs, &config.market);
        }

        let targets = models.targets(*personality);
        let spoiled = maintain_prices(
            *personality,
            &mut inventory,
            &mut beliefs,
            &targets,
            &config.market,
        );

        for (commodity, amount) in spoiled.iter() {
            if amount > 0.0 {
                flows.record_destroyed(commodity, amount);
                events.push(SimEvent::Spoilage {
                    character: entity.to_bits(),
                    commodity,
                    amount,
                });
                tracing::debug!(character = ?entity, %commodity, amount, "stock spoiled");
            }
        }
    }
}
