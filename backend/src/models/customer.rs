//! Customer agents
//!
//! Every customer owns exactly one card. Genuine customers shop mostly at a
//! small personal set of merchants; fraudulent customers use a compromised
//! card anywhere until they stop using it.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Class of a customer, which is also the log reporter its records go to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CustomerKind {
    Genuine,
    Fraudulent,
}

impl CustomerKind {
    /// Reporter name under which this class's transactions are logged
    pub fn reporter(&self) -> &'static str {
        match self {
            CustomerKind::Genuine => "genuine",
            CustomerKind::Fraudulent => "fraudulent",
        }
    }

    /// Value written to the `Target` column
    pub fn target(&self) -> i64 {
        match self {
            CustomerKind::Genuine => 0,
            CustomerKind::Fraudulent => 1,
        }
    }
}

/// A cardholder (or card thief) taking part in the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    card_id: u64,
    kind: CustomerKind,
    country: String,
    currency: String,
    utc_offset_hours: i32,

    /// Indices of merchants this customer prefers
    favourite_merchants: Vec<usize>,

    /// Inactive customers no longer transact
    active: bool,
}

impl Customer {
    pub fn new(
        card_id: u64,
        kind: CustomerKind,
        country: String,
        currency: String,
        utc_offset_hours: i32,
    ) -> Self {
        Self {
            card_id,
            kind,
            country,
            currency,
            utc_offset_hours,
            favourite_merchants: Vec::new(),
            active: true,
        }
    }

    pub fn with_favourite_merchants(mut self, merchants: Vec<usize>) -> Self {
        self.favourite_merchants = merchants;
        self
    }

    pub fn card_id(&self) -> u64 {
        self.card_id
    }

    pub fn kind(&self) -> CustomerKind {
        self.kind
    }

    pub fn is_fraudulent(&self) -> bool {
        self.kind == CustomerKind::Fraudulent
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn utc_offset_hours(&self) -> i32 {
        self.utc_offset_hours
    }

    pub fn favourite_merchants(&self) -> &[usize] {
        &self.favourite_merchants
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stop transacting for the rest of the simulation
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Convert a global timestamp to this customer's local time
    pub fn local_time(&self, global: NaiveDateTime) -> NaiveDateTime {
        global + Duration::hours(self.utc_offset_hours as i64)
    }
}
