//! Ledger
//!
//! Instant transfers between character inventories, production that creates
//! or destroys units, and the credit book of delayed transactions.

use bevy_ecs::prelude::*;
use std::collections::BTreeMap;

use crate::components::{check_amount, Commodity, CommodityMap, Inventory};
use crate::error::SimError;
use crate::output::{CommodityFlows, TickEvents};
use village_events::{DebtSnapshot, SimEvent};

/// Balances smaller than this are treated as settled.
pub const BALANCE_EPSILON: f32 = 1e-6;

/// Most that one settlement pass moves per pair and commodity.
pub const SETTLEMENT_STEP: f32 = 1.0;

/// Moves `amount` of `commodity` from one character to another.
///
/// Fails without touching either inventory when the amount is negative or
/// not finite, when `from` holds less than `amount`, or when either side
/// has no inventory.
pub fn transfer(
    world: &mut World,
    from: Entity,
    to: Entity,
    commodity: Commodity,
    amount: f32,
) -> Result<(), SimError> {
    check_amount(commodity, amount)?;
    if world.get::<Inventory>(to).is_none() {
        return Err(SimError::UnknownEntity(to));
    }
    world
        .get_mut::<Inventory>(from)
        .ok_or(SimError::UnknownEntity(from))?
        .withdraw(commodity, amount)?;
    world
        .get_mut::<Inventory>(to)
        .ok_or(SimError::UnknownEntity(to))?
        .deposit(commodity, amount)
}

/// Adds newly produced units to a character's inventory.
pub fn mint(
    world: &mut World,
    holder: Entity,
    commodity: Commodity,
    amount: f32,
) -> Result<(), SimError> {
    world
        .get_mut::<Inventory>(holder)
        .ok_or(SimError::UnknownEntity(holder))?
        .deposit(commodity, amount)?;
    if let Some(mut flows) = world.get_resource_mut::<CommodityFlows>() {
        flows.record_created(commodity, amount);
    }
    Ok(())
}

/// Removes units from existence (eaten, used up as material).
pub fn consume(
    world: &mut World,
    holder: Entity,
    commodity: Commodity,
    amount: f32,
) -> Result<(), SimError> {
    world
        .get_mut::<Inventory>(holder)
        .ok_or(SimError::UnknownEntity(holder))?
        .withdraw(commodity, amount)?;
    if let Some(mut flows) = world.get_resource_mut::<CommodityFlows>() {
        flows.record_destroyed(commodity, amount);
    }
    Ok(())
}

/// Turns `input_amount` of one commodity into `output_amount` of another.
///
/// Fails with [`SimError::MissingMaterial`] when the input is not on hand.
pub fn produce(
    world: &mut World,
    holder: Entity,
    input: Commodity,
    input_amount: f32,
    output: Commodity,
    output_amount: f32,
) -> Result<(), SimError> {
    match consume(world, holder, input, input_amount) {
        Err(SimError::InsufficientFunds { .. }) => {
            return Err(SimError::MissingMaterial {
                character: holder,
                commodity: input,
            })
        }
        other => other?,
    }
    mint(world, holder, output, output_amount)
}

/// Canonically ordered pair of characters, `first < second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreditPair {
    pub first: Entity,
    pub second: Entity,
}

impl CreditPair {
    pub fn new(a: Entity, b: Entity) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// +1 when `debtor` is the second member (positive balance means the
    /// second member owes the first), -1 otherwise.
    fn sign_for_debtor(&self, debtor: Entity) -> f32 {
        if debtor == self.second {
            1.0
        } else {
            -1.0
        }
    }
}

/// One outstanding obligation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Debt {
    pub debtor: Entity,
    pub creditor: Entity,
    pub commodity: Commodity,
    pub amount: f32,
}

impl Debt {
    pub fn to_snapshot(&self) -> DebtSnapshot {
        DebtSnapshot {
            debtor: self.debtor.to_bits(),
            creditor: self.creditor.to_bits(),
            commodity: self.commodity,
            amount: self.amount,
        }
    }
}

/// Delayed transactions, one record per unordered character pair.
///
/// A positive balance for a commodity means the pair's second member owes
/// the first that many units; negative means the first owes the second.
#[derive(Resource, Debug, Clone, Default)]
pub struct CreditBook {
    records: BTreeMap<CreditPair, CommodityMap<f32>>,
}

impl CreditBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `debtor` owes `creditor` `amount` more units.
    ///
    /// A negative `amount` reduces the debt (or grows the reverse one). The
    /// record for the pair is created on first use and updated afterwards.
    pub fn extend_credit(
        &mut self,
        debtor: Entity,
        creditor: Entity,
        commodity: Commodity,
        amount: f32,
    ) -> Result<(), SimError> {
        if debtor == creditor {
            return Err(SimError::SelfCredit(debtor));
        }
        if !amount.is_finite() {
            return Err(SimError::InvalidAmount { commodity, amount });
        }
        let pair = CreditPair::new(debtor, creditor);
        let balance = &mut self.records.entry(pair).or_default()[commodity];
        *balance += pair.sign_for_debtor(debtor) * amount;
        if balance.abs() < BALANCE_EPSILON {
            *balance = 0.0;
        }
        Ok(())
    }

    /// Raw signed balance of a pair
    pub fn balance(&self, pair: CreditPair, commodity: Commodity) -> f32 {
        self.records
            .get(&pair)
            .map_or(0.0, |balances| balances.get(commodity))
    }

    /// How much `debtor` owes `creditor`; negative when the debt runs the
    /// other way.
    pub fn owed_by(&self, debtor: Entity, creditor: Entity, commodity: Commodity) -> f32 {
        let pair = CreditPair::new(debtor, creditor);
        self.balance(pair, commodity) * pair.sign_for_debtor(debtor)
    }

    /// Number of pair records (settled ones included)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every nonzero obligation, oriented debtor -> creditor.
    pub fn debts(&self) -> Vec<Debt> {
        let mut debts = Vec::new();
        for (pair, balances) in &self.records {
            for (commodity, balance) in balances.iter() {
                if balance == 0.0 {
                    continue;
                }
                let (debtor, creditor) = if balance > 0.0 {
                    (pair.second, pair.first)
                } else {
                    (pair.first, pair.second)
                };
                debts.push(Debt {
                    debtor,
                    creditor,
                    commodity,
                    amount: balance.abs(),
                });
            }
        }
        debts
    }

    /// Sum of absolute balances for one commodity
    pub fn outstanding(&self, commodity: Commodity) -> f32 {
        self.records
            .values()
            .map(|balances| balances.get(commodity).abs())
            .sum()
    }
}

/// Settles one step of every outstanding debt.
///
/// For each pair and commodity with a nonzero balance, the debtor hands over
/// `min(1, |balance|)` units if it holds that much, and the balance shrinks
/// by the same amount, so it never overshoots past zero. Returns the number
/// of settlements made.
pub fn settle_all(world: &mut World) -> usize {
    if !world.contains_resource::<CreditBook>() {
        return 0;
    }
    world.resource_scope(|world, mut book: Mut<CreditBook>| {
        let mut settled = 0;
        for debt in book.debts() {
            let step = debt.amount.min(SETTLEMENT_STEP);
            let held = world
                .get::<Inventory>(debt.debtor)
                .map_or(0.0, |inventory| inventory.get(debt.commodity));
            if held < step {
                continue;
            }

            if let Err(e) = transfer(world, debt.debtor, debt.creditor, debt.commodity, step) {
                tracing::warn!(debtor = ?debt.debtor, error = %e, "settlement transfer failed");
                continue;
            }
            if let Err(e) = book.extend_credit(debt.debtor, debt.creditor, debt.commodity, -step) {
                tracing::warn!(debtor = ?debt.debtor, error = %e, "could not reduce settled debt");
                continue;
            }

            if let Some(mut events) = world.get_resource_mut::<TickEvents>() {
                events.push(SimEvent::Settlement {
                    debtor: debt.debtor.to_bits(),
                    creditor: debt.creditor.to_bits(),
                    commodity: debt.commodity,
                    amount: step,
                });
            }
            settled += 1;
        }
        settled
    })
}

/// System: credit settlement phase
pub fn settle_credit(world: &mut World) {
    let settled = settle_all(world);
    if settled > 0 {
        tracing::debug!(settled, "settled delayed transactions");
    }
}
