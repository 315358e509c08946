//! Transaction log buffer
//!
//! Records produced by the generative model accumulate here, grouped by
//! reporter, until the caller drains them. Draining takes a snapshot; only an
//! explicit clear discards records, and cleared records cannot be recovered.
//!
//! # Invariants
//!
//! 1. Records of one reporter keep their emission order
//! 2. Ordinals are assigned once, increase strictly, and survive clears
//! 3. A flattened snapshot lists rows in emission order across reporters
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use txn_simulator_core_rs::models::{LogBuffer, TransactionRecord};
//!
//! let when = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let record = TransactionRecord {
//!     global_date: when,
//!     local_date: when,
//!     card_id: 1,
//!     merchant_id: 4,
//!     amount: 25.0,
//!     currency: "EUR".to_string(),
//!     country: "NL".to_string(),
//!     target: 0,
//! };
//!
//! let mut log = LogBuffer::new();
//! log.record("genuine", 0, record);
//!
//! let snapshot = log.drain(true);
//! assert_eq!(snapshot.num_rows(), 1);
//! assert!(log.is_empty());
//! ```

use crate::data::{ColumnData, Dataset};
use crate::models::record::{columns, TransactionRecord};
use std::collections::BTreeMap;

/// A record tagged with the reporter it was logged under
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Logical channel of the observation
    pub reporter: String,

    /// Position in the global emission order
    pub ordinal: u64,

    /// Simulation step that produced the record
    pub step: usize,

    pub record: TransactionRecord,
}

/// Per-reporter, explicitly cleared record store
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    /// Reporter name → records in emission order
    reporters: BTreeMap<String, Vec<LogRecord>>,

    next_ordinal: u64,
}

impl LogBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record under `reporter`, returning its ordinal
    pub fn record(&mut self, reporter: &str, step: usize, record: TransactionRecord) -> u64 {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;

        self.reporters
            .entry(reporter.to_string())
            .or_default()
            .push(LogRecord {
                reporter: reporter.to_string(),
                ordinal,
                step,
                record,
            });

        ordinal
    }

    /// Total records held across reporters
    pub fn len(&self) -> usize {
        self.reporters.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.values().all(Vec::is_empty)
    }

    /// Reporters seen so far, sorted
    pub fn reporter_names(&self) -> Vec<&str> {
        self.reporters.keys().map(String::as_str).collect()
    }

    /// Records of one reporter in emission order
    pub fn records(&self, reporter: &str) -> &[LogRecord] {
        self.reporters
            .get(reporter)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ordinal the next record will receive
    pub fn next_ordinal(&self) -> u64 {
        self.next_ordinal
    }

    /// Empty every reporter's sequence
    ///
    /// Reporter names stay registered; only their records are dropped.
    pub fn clear(&mut self) {
        for records in self.reporters.values_mut() {
            records.clear();
        }
    }

    /// Flatten all reporters into one dataset
    ///
    /// Rows are ordered by ordinal and indexed by the step that produced them.
    /// The reporter is not part of the output; every row already carries the
    /// columns that identify it.
    pub fn to_dataset(&self) -> Dataset {
        let mut all: Vec<&LogRecord> = self.reporters.values().flatten().collect();
        all.sort_by_key(|r| r.ordinal);

        let rows = all.len();
        let mut global_date = Vec::with_capacity(rows);
        let mut local_date = Vec::with_capacity(rows);
        let mut card_id = Vec::with_capacity(rows);
        let mut merchant_id = Vec::with_capacity(rows);
        let mut amount = Vec::with_capacity(rows);
        let mut currency = Vec::with_capacity(rows);
        let mut country = Vec::with_capacity(rows);
        let mut target = Vec::with_capacity(rows);
        let mut index = Vec::with_capacity(rows);

        for entry in all {
            let r = &entry.record;
            global_date.push(r.global_date);
            local_date.push(r.local_date);
            card_id.push(r.card_id as i64);
            merchant_id.push(r.merchant_id as i64);
            amount.push(r.amount);
            currency.push(r.currency.clone());
            country.push(r.country.clone());
            target.push(r.target);
            index.push(entry.step as u64);
        }

        let built = Dataset::from_columns(vec![
            (columns::GLOBAL_DATE.to_string(), ColumnData::DateTime(global_date)),
            (columns::LOCAL_DATE.to_string(), ColumnData::DateTime(local_date)),
            (columns::CARD_ID.to_string(), ColumnData::Int(card_id)),
            (columns::MERCHANT_ID.to_string(), ColumnData::Int(merchant_id)),
            (columns::AMOUNT.to_string(), ColumnData::Float(amount)),
            (columns::CURRENCY.to_string(), ColumnData::Text(currency)),
            (columns::COUNTRY.to_string(), ColumnData::Text(country)),
            (columns::TARGET.to_string(), ColumnData::Int(target)),
        ])
        .and_then(|mut data| data.set_index(index).map(|_| data));

        // Columns are built together from the same records, so lengths agree
        built.unwrap_or_default()
    }

    /// Snapshot the buffer, optionally clearing it afterwards
    pub fn drain(&mut self, clear_after: bool) -> Dataset {
        let snapshot = self.to_dataset();
        if clear_after {
            self.clear();
        }
        snapshot
    }
}
