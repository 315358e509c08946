//! Card–merchant graph risk features
//!
//! The labeled training batch is turned into a bipartite graph: cards on one
//! side, merchants on the other, one edge per (card, merchant) pair that
//! transacted. Edge weights decay with the age of the underlying transactions
//! relative to the most recent training timestamp, once per half-life:
//!
//! | Suffix | Half-life |
//! |--------|-----------|
//! | `ST`   | 1 day     |
//! | `MT`   | 7 days    |
//! | `LT`   | 30 days   |
//!
//! Fraudulent transactions seed both of their endpoints with risk. The seed
//! is spread over the graph by a random walk with restart, and the resulting
//! scores are scaled so the riskiest node of each side scores 1.
//!
//! Added columns: `CardRisk_<s>` and `MerchantRisk_<s>` for every suffix.
//! Cards and merchants that did not appear in training score 0.
//!
//! # Determinism
//!
//! - Vertices indexed in sorted ID order
//! - BTreeMap adjacency for sorted iteration

use super::{FeatureConstructor, FeatureError};
use crate::data::{ColumnData, Dataset};
use crate::models::columns;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Decay horizons: column suffix and half-life in hours
pub const HALF_LIVES: [(&str, f64); 3] = [("ST", 24.0), ("MT", 24.0 * 7.0), ("LT", 24.0 * 30.0)];

/// Probability the walk jumps back to the fraud seed at each iteration
const RESTART_PROB: f64 = 0.15;

/// Propagation iterations
const ITERATIONS: usize = 30;

// ============================================================================
// Bipartite Graph
// ============================================================================

/// Aggregated card–merchant graph
///
/// Vertices `0..num_cards` are cards, the remaining ones merchants.
/// Each edge stores the age (hours before the reference time) and label of
/// every transaction between its endpoints.
#[derive(Debug, Clone, Default)]
pub struct BipartiteGraph {
    card_to_index: BTreeMap<i64, usize>,
    merchant_to_index: BTreeMap<i64, usize>,

    /// card_idx → merchant_idx → [(age_hours, is_fraud)]
    adj: BTreeMap<usize, BTreeMap<usize, Vec<(f64, bool)>>>,
}

impl BipartiteGraph {
    /// Build the graph from labeled transactions
    pub fn from_transactions(
        cards: &[i64],
        merchants: &[i64],
        times: &[NaiveDateTime],
        targets: &[i64],
        reference: NaiveDateTime,
    ) -> Self {
        let mut graph = Self::default();

        let card_set: BTreeSet<i64> = cards.iter().copied().collect();
        let merchant_set: BTreeSet<i64> = merchants.iter().copied().collect();
        for (idx, card) in card_set.into_iter().enumerate() {
            graph.card_to_index.insert(card, idx);
        }
        let offset = graph.card_to_index.len();
        for (idx, merchant) in merchant_set.into_iter().enumerate() {
            graph.merchant_to_index.insert(merchant, offset + idx);
        }

        for row in 0..cards.len() {
            let card_idx = graph.card_to_index[&cards[row]];
            let merchant_idx = graph.merchant_to_index[&merchants[row]];
            let age = (reference - times[row]).num_minutes().max(0) as f64 / 60.0;

            graph
                .adj
                .entry(card_idx)
                .or_default()
                .entry(merchant_idx)
                .or_default()
                .push((age, targets[row] != 0));
        }

        graph
    }

    pub fn num_cards(&self) -> usize {
        self.card_to_index.len()
    }

    pub fn num_merchants(&self) -> usize {
        self.merchant_to_index.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.num_cards() + self.num_merchants()
    }

    pub fn edge_count(&self) -> usize {
        self.adj.values().map(BTreeMap::len).sum()
    }

    pub fn has_edge(&self, card: i64, merchant: i64) -> bool {
        match (self.card_to_index.get(&card), self.merchant_to_index.get(&merchant)) {
            (Some(c), Some(m)) => self.adj.get(c).is_some_and(|n| n.contains_key(m)),
            _ => false,
        }
    }

    /// Propagate fraud risk for one half-life
    ///
    /// Returns one score per vertex, scaled per side into [0, 1].
    fn propagate(&self, half_life: f64) -> Vec<f64> {
        let n = self.vertex_count();
        let decay = |age: f64| (-std::f64::consts::LN_2 * age / half_life).exp();

        // Undirected weighted adjacency plus fraud seed
        let mut neighbours: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        let mut seed = vec![0.0; n];

        for (&card, merchants) in &self.adj {
            for (&merchant, txns) in merchants {
                let weight: f64 = txns.iter().map(|(age, _)| decay(*age)).sum();
                let fraud: f64 = txns
                    .iter()
                    .filter(|(_, fraud)| *fraud)
                    .map(|(age, _)| decay(*age))
                    .sum();

                neighbours[card].push((merchant, weight));
                neighbours[merchant].push((card, weight));
                seed[card] += fraud;
                seed[merchant] += fraud;
            }
        }

        let seed_total: f64 = seed.iter().sum();
        if seed_total <= 0.0 {
            return vec![0.0; n];
        }
        for s in seed.iter_mut() {
            *s /= seed_total;
        }

        let out_weight: Vec<f64> = neighbours
            .iter()
            .map(|edges| edges.iter().map(|(_, w)| w).sum::<f64>())
            .collect();

        let mut scores = seed.clone();
        for _ in 0..ITERATIONS {
            let mut next: Vec<f64> = seed.iter().map(|s| RESTART_PROB * s).collect();
            for (from, edges) in neighbours.iter().enumerate() {
                if out_weight[from] <= 0.0 {
                    continue;
                }
                let mass = (1.0 - RESTART_PROB) * scores[from] / out_weight[from];
                for &(to, weight) in edges {
                    next[to] += mass * weight;
                }
            }
            scores = next;
        }

        let cards = self.num_cards();
        scale_to_unit(&mut scores[..cards]);
        scale_to_unit(&mut scores[cards..]);
        scores
    }
}

fn scale_to_unit(values: &mut [f64]) {
    let max = values.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        for v in values.iter_mut() {
            *v /= max;
        }
    }
}

// ============================================================================
// Feature Constructor
// ============================================================================

/// Fraud-risk scores of cards and merchants, fit once from labeled data
#[derive(Debug, Clone, Default)]
pub struct GraphFeatures {
    /// Per half-life: card ID → score
    card_scores: [HashMap<i64, f64>; 3],

    /// Per half-life: merchant ID → score
    merchant_scores: [HashMap<i64, f64>; 3],

    num_edges: usize,
}

impl GraphFeatures {
    /// Fit on a labeled training batch
    ///
    /// Needs `Global_Date`, `CardID`, `MerchantID` and `Target`.
    pub fn new(training: &Dataset) -> Result<Self, FeatureError> {
        let times = training.datetime_column(columns::GLOBAL_DATE)?;
        let cards = training.int_column(columns::CARD_ID)?;
        let merchants = training.int_column(columns::MERCHANT_ID)?;
        let targets = training.int_column(columns::TARGET)?;

        let Some(reference) = times.iter().max().copied() else {
            return Ok(Self::default());
        };

        let graph = BipartiteGraph::from_transactions(cards, merchants, times, targets, reference);
        let mut features = Self {
            num_edges: graph.edge_count(),
            ..Self::default()
        };

        for (slot, (_, half_life)) in HALF_LIVES.iter().enumerate() {
            let scores = graph.propagate(*half_life);
            features.card_scores[slot] = graph
                .card_to_index
                .iter()
                .map(|(&card, &idx)| (card, scores[idx]))
                .collect();
            features.merchant_scores[slot] = graph
                .merchant_to_index
                .iter()
                .map(|(&merchant, &idx)| (merchant, scores[idx]))
                .collect();
        }

        Ok(features)
    }

    /// Risk score of a card for one half-life slot; 0 when unseen
    pub fn card_risk(&self, slot: usize, card: i64) -> f64 {
        self.card_scores
            .get(slot)
            .and_then(|scores| scores.get(&card))
            .copied()
            .unwrap_or(0.0)
    }

    /// Risk score of a merchant for one half-life slot; 0 when unseen
    pub fn merchant_risk(&self, slot: usize, merchant: i64) -> f64 {
        self.merchant_scores
            .get(slot)
            .and_then(|scores| scores.get(&merchant))
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of card–merchant edges in the fitted graph
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Append the graph risk columns to `data`
    pub fn add_graph_features(&self, data: &mut Dataset) -> Result<(), FeatureError> {
        let (card_columns, merchant_columns) = {
            let cards = data.int_column(columns::CARD_ID)?;
            let merchants = data.int_column(columns::MERCHANT_ID)?;

            let card_columns: Vec<Vec<f64>> = (0..HALF_LIVES.len())
                .map(|slot| cards.iter().map(|c| self.card_risk(slot, *c)).collect())
                .collect();
            let merchant_columns: Vec<Vec<f64>> = (0..HALF_LIVES.len())
                .map(|slot| merchants.iter().map(|m| self.merchant_risk(slot, *m)).collect())
                .collect();
            (card_columns, merchant_columns)
        };

        for ((suffix, _), values) in HALF_LIVES.iter().zip(card_columns) {
            data.set_column(&format!("CardRisk_{}", suffix), ColumnData::Float(values))?;
        }
        for ((suffix, _), values) in HALF_LIVES.iter().zip(merchant_columns) {
            data.set_column(&format!("MerchantRisk_{}", suffix), ColumnData::Float(values))?;
        }

        Ok(())
    }
}

impl FeatureConstructor for GraphFeatures {
    fn fit(training: &Dataset) -> Result<Self, FeatureError> {
        Self::new(training)
    }

    fn add_features(&self, data: &mut Dataset) -> Result<(), FeatureError> {
        self.add_graph_features(data)
    }

    fn feature_names(&self) -> Vec<String> {
        let cards = HALF_LIVES.iter().map(|(s, _)| format!("CardRisk_{}", s));
        let merchants = HALF_LIVES.iter().map(|(s, _)| format!("MerchantRisk_{}", s));
        cards.chain(merchants).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    /// rows: (card, merchant, hours before reference, target)
    fn labeled(rows: &[(i64, i64, i64, i64)]) -> Dataset {
        Dataset::from_columns(vec![
            (
                columns::GLOBAL_DATE.to_string(),
                ColumnData::DateTime(
                    rows.iter()
                        .map(|r| reference() - Duration::hours(r.2))
                        .collect(),
                ),
            ),
            (columns::CARD_ID.to_string(), ColumnData::Int(rows.iter().map(|r| r.0).collect())),
            (
                columns::MERCHANT_ID.to_string(),
                ColumnData::Int(rows.iter().map(|r| r.1).collect()),
            ),
            (columns::TARGET.to_string(), ColumnData::Int(rows.iter().map(|r| r.3).collect())),
        ])
        .unwrap()
    }

    #[test]
    fn test_graph_structure() {
        let data = labeled(&[(1, 10, 0, 0), (1, 10, 5, 0), (1, 11, 0, 1), (2, 11, 0, 0)]);
        let graph = BipartiteGraph::from_transactions(
            data.int_column(columns::CARD_ID).unwrap(),
            data.int_column(columns::MERCHANT_ID).unwrap(),
            data.datetime_column(columns::GLOBAL_DATE).unwrap(),
            data.int_column(columns::TARGET).unwrap(),
            reference(),
        );

        assert_eq!(graph.num_cards(), 2);
        assert_eq!(graph.num_merchants(), 2);
        assert_eq!(graph.edge_count(), 3, "repeated pairs aggregate into one edge");
        assert!(graph.has_edge(1, 10));
        assert!(!graph.has_edge(2, 10));
    }

    #[test]
    fn test_fraud_card_is_riskiest() {
        let data = labeled(&[
            (1, 10, 2, 1),
            (1, 11, 3, 1),
            (2, 11, 1, 0),
            (3, 12, 1, 0),
            (4, 12, 2, 0),
        ]);
        let features = GraphFeatures::new(&data).unwrap();

        for slot in 0..HALF_LIVES.len() {
            assert_eq!(features.card_risk(slot, 1), 1.0);
            assert!(features.card_risk(slot, 2) > 0.0, "neighbour of a fraud merchant");
            assert!(features.card_risk(slot, 2) < 1.0);
            assert_eq!(features.card_risk(slot, 3), 0.0, "disconnected from fraud");
            assert_eq!(features.merchant_risk(slot, 12), 0.0);
        }
    }

    #[test]
    fn test_no_fraud_means_zero_risk() {
        let features = GraphFeatures::new(&labeled(&[(1, 10, 0, 0), (2, 10, 1, 0)])).unwrap();
        assert_eq!(features.card_risk(0, 1), 0.0);
        assert_eq!(features.merchant_risk(2, 10), 0.0);
        assert_eq!(features.num_edges(), 2);
    }

    #[test]
    fn test_unseen_nodes_score_zero_and_columns_added() {
        let features = GraphFeatures::new(&labeled(&[(1, 10, 0, 1)])).unwrap();

        let mut data = labeled(&[(1, 10, 0, 0), (99, 98, 0, 0)]);
        features.add_graph_features(&mut data).unwrap();

        assert_eq!(data.float_column("CardRisk_ST").unwrap(), &[1.0, 0.0]);
        assert_eq!(data.float_column("MerchantRisk_LT").unwrap(), &[1.0, 0.0]);
        let added: Vec<&str> = data.column_names()[4..].to_vec();
        assert_eq!(added, features.feature_names());
    }

    #[test]
    fn test_fit_requires_target() {
        let mut data = labeled(&[(1, 10, 0, 1)]);
        data.drop_columns(&[columns::TARGET]).unwrap();
        assert!(matches!(GraphFeatures::new(&data), Err(FeatureError::Dataset(_))));
    }

    #[test]
    fn test_empty_training_batch() {
        let features = GraphFeatures::new(&labeled(&[])).unwrap();
        assert_eq!(features.num_edges(), 0);
        assert_eq!(features.card_risk(0, 1), 0.0);
    }
}
