//! Transaction aggregation features
//!
//! For every row the constructor looks at the history of the same card
//! strictly before the row's `Global_Date` and summarises it over three
//! windows (1, 7 and 30 days):
//!
//! | Column               | Meaning                                          |
//! |----------------------|--------------------------------------------------|
//! | `TxnCount_<w>`       | earlier transactions of the card in the window   |
//! | `AvgAmount_<w>`      | their mean amount (0 when there are none)        |
//! | `SameMerchant_<w>`   | how many were at the row's merchant              |
//! | `SameCountry_<w>`    | how many were in the row's country               |
//! | `SameCurrency_<w>`   | how many were in the row's currency              |
//! | `HoursSinceLastTxn`  | hours since the card's previous transaction, -1 if none |
//!
//! Only fitted and `update_unlabeled` data enter the history; adding features
//! to a dataset never changes it. Labels are not used at all.

use super::{FeatureConstructor, FeatureError, IncrementalFeatures};
use crate::data::{ColumnData, Dataset};
use crate::models::columns;
use chrono::{Duration, NaiveDateTime};
use std::collections::HashMap;

/// Aggregation windows: column suffix and length in hours
pub const WINDOWS: [(&str, i64); 3] = [("1d", 24), ("7d", 24 * 7), ("30d", 24 * 30)];

pub const HOURS_SINCE_LAST: &str = "HoursSinceLastTxn";

#[derive(Debug, Clone)]
struct HistoryEntry {
    time: NaiveDateTime,
    amount: f64,
    merchant_id: i64,
    country: String,
    currency: String,
}

/// Columns read from an input dataset
struct RawColumns<'a> {
    times: &'a [NaiveDateTime],
    cards: &'a [i64],
    merchants: &'a [i64],
    amounts: &'a [f64],
    countries: &'a [String],
    currencies: &'a [String],
}

impl<'a> RawColumns<'a> {
    fn read(data: &'a Dataset) -> Result<Self, FeatureError> {
        Ok(Self {
            times: data.datetime_column(columns::GLOBAL_DATE)?,
            cards: data.int_column(columns::CARD_ID)?,
            merchants: data.int_column(columns::MERCHANT_ID)?,
            amounts: data.float_column(columns::AMOUNT)?,
            countries: data.text_column(columns::COUNTRY)?,
            currencies: data.text_column(columns::CURRENCY)?,
        })
    }
}

/// Per-card windowed statistics, incrementally updatable
#[derive(Debug, Clone, Default)]
pub struct AggregateFeatures {
    /// Card ID → history sorted by time
    histories: HashMap<i64, Vec<HistoryEntry>>,
    num_records: usize,
}

impl AggregateFeatures {
    /// Fit on a training batch
    pub fn new(training: &Dataset) -> Result<Self, FeatureError> {
        let mut features = Self::default();
        features.absorb(training)?;
        Ok(features)
    }

    /// Number of records the history holds
    pub fn num_records(&self) -> usize {
        self.num_records
    }

    /// Number of distinct cards seen
    pub fn num_cards(&self) -> usize {
        self.histories.len()
    }

    /// Add every row of `data` to the card histories
    fn absorb(&mut self, data: &Dataset) -> Result<(), FeatureError> {
        let raw = RawColumns::read(data)?;

        for row in 0..data.num_rows() {
            let entry = HistoryEntry {
                time: raw.times[row],
                amount: raw.amounts[row],
                merchant_id: raw.merchants[row],
                country: raw.countries[row].clone(),
                currency: raw.currencies[row].clone(),
            };
            let history = self.histories.entry(raw.cards[row]).or_default();
            // Entries with equal timestamps keep arrival order
            let pos = history.partition_point(|e| e.time <= entry.time);
            history.insert(pos, entry);
        }

        self.num_records += data.num_rows();
        Ok(())
    }

    /// Append the aggregate columns to `data`
    pub fn add_aggregate_features(&self, data: &mut Dataset) -> Result<(), FeatureError> {
        let rows = data.num_rows();
        let mut window_columns: Vec<[Vec<f64>; 5]> = WINDOWS
            .iter()
            .map(|_| std::array::from_fn(|_| Vec::with_capacity(rows)))
            .collect();
        let mut hours_since_last = Vec::with_capacity(rows);

        {
            let raw = RawColumns::read(data)?;
            let empty = Vec::new();

            for row in 0..rows {
                let now = raw.times[row];
                let history = self.histories.get(&raw.cards[row]).unwrap_or(&empty);
                let before = history.partition_point(|e| e.time < now);

                hours_since_last.push(match before {
                    0 => -1.0,
                    n => (now - history[n - 1].time).num_minutes() as f64 / 60.0,
                });

                for ((_, hours), out) in WINDOWS.iter().zip(window_columns.iter_mut()) {
                    let from = now - Duration::hours(*hours);
                    let start = history[..before].partition_point(|e| e.time < from);
                    let window = &history[start..before];

                    let count = window.len();
                    let avg = if count == 0 {
                        0.0
                    } else {
                        window.iter().map(|e| e.amount).sum::<f64>() / count as f64
                    };
                    let same_merchant = window
                        .iter()
                        .filter(|e| e.merchant_id == raw.merchants[row])
                        .count();
                    let same_country = window
                        .iter()
                        .filter(|e| e.country == raw.countries[row])
                        .count();
                    let same_currency = window
                        .iter()
                        .filter(|e| e.currency == raw.currencies[row])
                        .count();

                    out[0].push(count as f64);
                    out[1].push(avg);
                    out[2].push(same_merchant as f64);
                    out[3].push(same_country as f64);
                    out[4].push(same_currency as f64);
                }
            }
        }

        for ((suffix, _), values) in WINDOWS.iter().zip(window_columns) {
            for (stat, column) in STATS.iter().zip(values) {
                data.set_column(&format!("{}_{}", stat, suffix), ColumnData::Float(column))?;
            }
        }
        data.set_column(HOURS_SINCE_LAST, ColumnData::Float(hours_since_last))?;

        Ok(())
    }

    /// Extend the histories with new, unlabeled records
    ///
    /// `data` must not overlap anything passed in before; the constructor
    /// cannot detect duplicates.
    pub fn update_unlabeled(&mut self, data: &Dataset) -> Result<(), FeatureError> {
        self.absorb(data)
    }
}

const STATS: [&str; 5] = [
    "TxnCount",
    "AvgAmount",
    "SameMerchant",
    "SameCountry",
    "SameCurrency",
];

impl FeatureConstructor for AggregateFeatures {
    fn fit(training: &Dataset) -> Result<Self, FeatureError> {
        Self::new(training)
    }

    fn add_features(&self, data: &mut Dataset) -> Result<(), FeatureError> {
        self.add_aggregate_features(data)
    }

    fn feature_names(&self) -> Vec<String> {
        WINDOWS
            .iter()
            .flat_map(|(suffix, _)| STATS.iter().map(move |stat| format!("{}_{}", stat, suffix)))
            .chain(std::iter::once(HOURS_SINCE_LAST.to_string()))
            .collect()
    }
}

impl IncrementalFeatures for AggregateFeatures {
    fn update_unlabeled(&mut self, data: &Dataset) -> Result<(), FeatureError> {
        AggregateFeatures::update_unlabeled(self, data)
    }
}
