//! Event Types
//!
//! Everything notable that happens during a tick: trades, credit
//! settlements, kills, births and spoilage. Entity handles are carried as
//! their raw `u64` bits so this crate stays independent of the ECS.

use serde::{Deserialize, Serialize};

use crate::goods::Commodity;

/// How a trade was financed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeKind {
    /// Goods and coins change hands immediately.
    Instant,
    /// Coins paid now, goods owed by the shop.
    Order,
    /// Goods delivered now, coins owed by the buyer.
    Loan,
    /// Goods delivered to the shop, coins owed by the shop.
    CreditSale,
}

/// A single simulation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    Trade {
        kind: TradeKind,
        buyer: u64,
        seller: u64,
        commodity: Commodity,
        price: f32,
    },
    Settlement {
        debtor: u64,
        creditor: u64,
        commodity: Commodity,
        amount: f32,
    },
    Kill {
        hunter: u64,
        prey: u64,
        /// Character credited with the kill, if the hunter was embodied
        character: Option<u64>,
    },
    Birth {
        mother: u64,
        child: u64,
    },
    Spoilage {
        character: u64,
        commodity: Commodity,
        amount: f32,
    },
}

impl SimEvent {
    /// Short machine-readable label, used for counting events by type.
    pub fn label(&self) -> &'static str {
        match self {
            SimEvent::Trade { .. } => "trade",
            SimEvent::Settlement { .. } => "settlement",
            SimEvent::Kill { .. } => "kill",
            SimEvent::Birth { .. } => "birth",
            SimEvent::Spoilage { .. } => "spoilage",
        }
    }
}

/// An event stamped with its tick and sequence id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: String,
    pub tick: u64,
    #[serde(flatten)]
    pub event: SimEvent,
}

impl EventRecord {
    pub fn new(sequence: u64, tick: u64, event: SimEvent) -> Self {
        Self {
            event_id: generate_event_id(sequence),
            tick,
            event,
        }
    }

    /// Serializes the record to a JSON line (for JSONL format).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a record from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}
