//! Equity curve derived from appended holdings snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::snapshot::HoldingsSnapshot;
use crate::domain::{Symbol, Timestamp};

/// One row of the equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityRow {
    pub timestamp: Timestamp,
    pub values: BTreeMap<Symbol, f64>,
    pub cash: f64,
    pub commission: f64,
    pub total: f64,
    /// Period return of `total`. The seed row is 0.
    pub returns: f64,
    /// Cumulative product of `1 + returns`, starting at 1.
    pub equity_curve: f64,
}

/// Time-ordered equity curve, one row per appended snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquityCurve {
    pub symbols: Vec<Symbol>,
    pub rows: Vec<EquityRow>,
}

impl EquityCurve {
    /// Build from snapshots in append order.
    ///
    /// A zero previous total gives a 0 return rather than a division by zero.
    pub fn from_snapshots(symbols: &[Symbol], snapshots: &[HoldingsSnapshot]) -> Self {
        let mut rows = Vec::with_capacity(snapshots.len());
        let mut previous_total: Option<f64> = None;
        let mut index = 1.0;

        for snap in snapshots {
            let returns = match previous_total {
                Some(prev) if prev != 0.0 => snap.total / prev - 1.0,
                _ => 0.0,
            };
            index *= 1.0 + returns;
            rows.push(EquityRow {
                timestamp: snap.timestamp,
                values: snap.values.clone(),
                cash: snap.cash,
                commission: snap.commission,
                total: snap.total,
                returns,
                equity_curve: index,
            });
            previous_total = Some(snap.total);
        }

        Self {
            symbols: symbols.to_vec(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Period returns, excluding the seed row.
    pub fn returns(&self) -> Vec<f64> {
        self.rows.iter().skip(1).map(|r| r.returns).collect()
    }

    /// Cumulative equity index, including the seed row.
    pub fn equity(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.equity_curve).collect()
    }

    pub fn totals(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.total).collect()
    }

    pub fn final_equity(&self) -> Option<f64> {
        self.rows.last().map(|r| r.equity_curve)
    }
}
