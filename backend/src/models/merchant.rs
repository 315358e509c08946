//! Merchants accepting card payments

use serde::{Deserialize, Serialize};

/// A merchant; `amount_scale` shifts the typical basket size at this shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    merchant_id: u64,
    amount_scale: f64,
}

impl Merchant {
    pub fn new(merchant_id: u64, amount_scale: f64) -> Self {
        Self {
            merchant_id,
            amount_scale,
        }
    }

    pub fn merchant_id(&self) -> u64 {
        self.merchant_id
    }

    pub fn amount_scale(&self) -> f64 {
        self.amount_scale
    }
}
