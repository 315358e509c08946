//! Transaction records emitted by the generative model
//!
//! A `TransactionRecord` is one row of the transaction log. Its field names
//! map one-to-one onto the dataset columns listed in [`columns`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Column names of the raw transaction log
pub mod columns {
    pub const GLOBAL_DATE: &str = "Global_Date";
    pub const LOCAL_DATE: &str = "Local_Date";
    pub const CARD_ID: &str = "CardID";
    pub const MERCHANT_ID: &str = "MerchantID";
    pub const AMOUNT: &str = "Amount";
    pub const CURRENCY: &str = "Currency";
    pub const COUNTRY: &str = "Country";
    pub const TARGET: &str = "Target";

    /// Column order of a drained log
    pub const RAW: [&str; 8] = [
        GLOBAL_DATE,
        LOCAL_DATE,
        CARD_ID,
        MERCHANT_ID,
        AMOUNT,
        CURRENCY,
        COUNTRY,
        TARGET,
    ];
}

/// One simulated card transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "Global_Date")]
    pub global_date: NaiveDateTime,

    #[serde(rename = "Local_Date")]
    pub local_date: NaiveDateTime,

    #[serde(rename = "CardID")]
    pub card_id: u64,

    #[serde(rename = "MerchantID")]
    pub merchant_id: u64,

    #[serde(rename = "Amount")]
    pub amount: f64,

    #[serde(rename = "Currency")]
    pub currency: String,

    #[serde(rename = "Country")]
    pub country: String,

    /// 1 for fraud, 0 for genuine
    #[serde(rename = "Target")]
    pub target: i64,
}
