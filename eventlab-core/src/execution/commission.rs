//! Commission models: per-fill brokerage fees.

use serde::{Deserialize, Serialize};

/// Commission charged for a fill of `quantity` shares at `price`.
pub trait CommissionModel: Send + Sync {
    fn commission(&self, quantity: u64, price: Option<f64>) -> f64;

    fn name(&self) -> &str;
}

/// Tiered per-share pricing with a per-order minimum.
///
/// `max(minimum, rate × quantity)` where the rate drops once the order
/// exceeds `tier_threshold` shares. Defaults follow a common US retail
/// broker schedule: $0.013/share up to 500, $0.008 above, $1.30 minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TieredPerShare {
    pub minimum: f64,
    pub tier_threshold: u64,
    pub small_rate: f64,
    pub large_rate: f64,
}

impl Default for TieredPerShare {
    fn default() -> Self {
        Self {
            minimum: 1.30,
            tier_threshold: 500,
            small_rate: 0.013,
            large_rate: 0.008,
        }
    }
}

impl CommissionModel for TieredPerShare {
    fn commission(&self, quantity: u64, _price: Option<f64>) -> f64 {
        let rate = if quantity <= self.tier_threshold {
            self.small_rate
        } else {
            self.large_rate
        };
        self.minimum.max(rate * quantity as f64)
    }

    fn name(&self) -> &str {
        "TieredPerShare"
    }
}

/// Frictionless: no commission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroCommission;

impl CommissionModel for ZeroCommission {
    fn commission(&self, _quantity: u64, _price: Option<f64>) -> f64 {
        0.0
    }

    fn name(&self) -> &str {
        "ZeroCommission"
    }
}
