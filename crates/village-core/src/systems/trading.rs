//! Trading Rounds
//!
//! Every character deals with the owner of its favourite shop (or inn, for
//! prepared food) one unit at a time. A buyer short on coins takes the goods
//! on credit, and a shop short on stock or coins settles later through the
//! credit book. Either way the character's beliefs drift toward the shop's
//! quotes.

use bevy_ecs::prelude::*;

use crate::components::{Activity, Commodity, PriceBeliefs};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::ledger::{transfer, CreditBook};
use crate::market::converge_beliefs;
use crate::output::TickEvents;
use crate::queries::{
    activity_of, body_of, buy_belief, favourites_of, inventory_of, owner_of, personality_of,
    sell_belief, sorted_characters, stockpile_target,
};
use crate::relations::Relations;
use village_events::{SimEvent, TradeKind};

/// Everything a character and its shop know about one commodity before a
/// trade.
#[derive(Debug, Clone, Copy)]
struct Quote {
    character: Entity,
    shop_owner: Entity,
    commodity: Commodity,
    held: f32,
    target: f32,
    coins: f32,
    desired_buy: f32,
    desired_sell: f32,
    bottom: f32,
    in_stock: f32,
    shop_coins: f32,
    shop_buy: f32,
    shop_sell: f32,
}

/// System: the configured number of trading rounds over every character and
/// tradeable commodity.
pub fn run_trading_rounds(world: &mut World) {
    let config = world.get_resource::<SimConfig>().cloned().unwrap_or_default();
    let characters = sorted_characters(world);

    let mut trades = 0usize;
    for _ in 0..config.trading.rounds {
        for &character in &characters {
            for commodity in Commodity::tradeable() {
                match trade_with_shop(world, character, commodity, &config) {
                    Ok(Some(_)) => trades += 1,
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(?character, %commodity, error = %e, "trade failed");
                    }
                }
            }
        }
    }
    if trades > 0 {
        tracing::debug!(trades, "trading rounds complete");
    }
}

/// One trade opportunity between a character and its shop for one
/// commodity. Returns the kind of trade made, if any.
///
/// Characters who trade in person (hunters and alchemists) must be inside the
/// shop on the matching errand. Beliefs converge toward the shop's quotes
/// whenever the opportunity is evaluated, trade or not.
pub fn trade_with_shop(
    world: &mut World,
    character: Entity,
    commodity: Commodity,
    config: &SimConfig,
) -> Result<Option<TradeKind>, SimError> {
    let Some(quote) = gather_quote(world, character, commodity, config) else {
        return Ok(None);
    };

    let made = if quote.target > quote.held {
        buy(world, &quote)?
    } else if quote.target < quote.held {
        sell(world, &quote)?
    } else {
        None
    };

    if let Some(mut beliefs) = world.get_mut::<PriceBeliefs>(character) {
        converge_beliefs(
            &mut beliefs,
            commodity,
            quote.shop_sell,
            quote.shop_buy,
            config.market.learning_rate,
        );
    }
    Ok(made)
}

fn gather_quote(
    world: &World,
    character: Entity,
    commodity: Commodity,
    config: &SimConfig,
) -> Option<Quote> {
    let personality = personality_of(world, character)?;
    let favourites = favourites_of(world, character);
    let (shop, errand) = if commodity == Commodity::PreparedFood {
        (favourites.inn?, Activity::GettingFood)
    } else {
        (favourites.shop?, Activity::Shopping)
    };

    if personality.trades_in_person() {
        if activity_of(world, character).activity != Some(errand) {
            return None;
        }
        let body = body_of(world, character)?;
        if world.get_resource::<Relations>()?.guest_location(body) != Some(shop) {
            return None;
        }
    }

    let shop_owner = owner_of(world, shop)?;
    if shop_owner == character {
        return None;
    }

    Some(Quote {
        character,
        shop_owner,
        commodity,
        held: inventory_of(world, character, commodity),
        target: stockpile_target(world, character, commodity),
        coins: inventory_of(world, character, Commodity::Coins),
        desired_buy: buy_belief(world, character, commodity)?,
        desired_sell: sell_belief(world, character, commodity)?,
        bottom: buy_belief(world, character, Commodity::PreparedFood)?
            / config.trading.bottom_price_divisor,
        in_stock: inventory_of(world, shop_owner, commodity),
        shop_coins: inventory_of(world, shop_owner, Commodity::Coins),
        shop_buy: buy_belief(world, shop_owner, commodity)?,
        shop_sell: sell_belief(world, shop_owner, commodity)?,
    })
}

/// Character below target buys one unit if it values it at least at the
/// shop's asking price.
fn buy(world: &mut World, quote: &Quote) -> Result<Option<TradeKind>, SimError> {
    if quote.desired_buy < quote.shop_sell {
        return Ok(None);
    }
    let price = quote.shop_sell;
    let can_pay = quote.coins >= price;
    let can_deliver = quote.in_stock >= 1.0;

    let kind = if can_deliver && can_pay {
        transfer(world, quote.shop_owner, quote.character, quote.commodity, 1.0)?;
        transfer(world, quote.character, quote.shop_owner, Commodity::Coins, price)?;
        TradeKind::Instant
    } else if can_pay {
        // paid up front, delivered by settlement once the shop restocks
        book(world)?.extend_credit(quote.shop_owner, quote.character, quote.commodity, 1.0)?;
        transfer(world, quote.character, quote.shop_owner, Commodity::Coins, price)?;
        TradeKind::Order
    } else if can_deliver {
        book(world)?.extend_credit(quote.character, quote.shop_owner, Commodity::Coins, price)?;
        transfer(world, quote.shop_owner, quote.character, quote.commodity, 1.0)?;
        TradeKind::Loan
    } else {
        return Ok(None);
    };

    record_trade(world, kind, quote.character, quote.shop_owner, quote.commodity, price);
    Ok(Some(kind))
}

/// Character above target sells one unit if the shop pays above both the
/// character's bottom price and its own asking price.
fn sell(world: &mut World, quote: &Quote) -> Result<Option<TradeKind>, SimError> {
    let price = quote.shop_buy;
    if price <= quote.bottom || price < quote.desired_sell || quote.held < 1.0 {
        return Ok(None);
    }

    let kind = if quote.shop_coins >= price {
        transfer(world, quote.character, quote.shop_owner, quote.commodity, 1.0)?;
        transfer(world, quote.shop_owner, quote.character, Commodity::Coins, price)?;
        TradeKind::Instant
    } else {
        book(world)?.extend_credit(quote.shop_owner, quote.character, Commodity::Coins, price)?;
        transfer(world, quote.character, quote.shop_owner, quote.commodity, 1.0)?;
        TradeKind::CreditSale
    };

    record_trade(world, kind, quote.shop_owner, quote.character, quote.commodity, price);
    Ok(Some(kind))
}

fn record_trade(
    world: &mut World,
    kind: TradeKind,
    buyer: Entity,
    seller: Entity,
    commodity: Commodity,
    price: f32,
) {
    if let Some(mut events) = world.get_resource_mut::<TickEvents>() {
        events.push(SimEvent::Trade {
            kind,
            buyer: buyer.to_bits(),
            seller: seller.to_bits(),
            commodity,
            price,
        });
    }
    tracing::debug!(?buyer, ?seller, %commodity, ?kind, price, "trade");
}

fn book(world: &mut World) -> Result<Mut<'_, CreditBook>, SimError> {
    world
        .get_resource_mut::<CreditBook>()
        .ok_or(SimError::MissingResource("CreditBook"))
}
