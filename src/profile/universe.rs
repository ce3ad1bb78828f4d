//! Asset universes described in percentage terms.
//!
//! Retail planning tools quote expected return and risk as annual
//! percentages with a separate correlation matrix. [`AssetUniverse`] holds
//! that form and converts it into fractional [`MarketStats`].

use serde::{Deserialize, Serialize};

use crate::core::error::{AllocError, Result};
use crate::core::linalg::SYMMETRY_TOLERANCE;
use crate::core::types::{Asset, MarketStats};

/// Broad bucket used for profile-driven biasing and horizon bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    /// Listed equity and equity index funds.
    Equity,
    /// Government-backed small savings schemes (PPF and similar).
    SmallSavings,
    /// Bonds and debt funds.
    FixedIncome,
    /// Gold and other commodities.
    Commodity,
}

/// One asset class with annualized statistics in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetClass {
    pub id: String,
    pub name: String,
    pub category: AssetCategory,
    /// Expected annual return, percent.
    pub expected_return_pct: f64,
    /// Annual volatility, percent.
    pub risk_pct: f64,
}

impl AssetClass {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: AssetCategory,
        expected_return_pct: f64,
        risk_pct: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            expected_return_pct,
            risk_pct,
        }
    }
}

/// Asset classes plus their correlation matrix and a risk-free rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetUniverse {
    pub classes: Vec<AssetClass>,
    pub correlation: Vec<Vec<f64>>,
    /// Annual risk-free rate, percent.
    pub risk_free_rate_pct: f64,
}

impl Default for AssetUniverse {
    fn default() -> Self {
        Self::india_retail()
    }
}

impl AssetUniverse {
    /// Build and validate a universe.
    pub fn new(
        classes: Vec<AssetClass>,
        correlation: Vec<Vec<f64>>,
        risk_free_rate_pct: f64,
    ) -> Result<Self> {
        let universe = Self {
            classes,
            correlation,
            risk_free_rate_pct,
        };
        universe.validate()?;
        Ok(universe)
    }

    /// Five-class Indian retail universe; risk-free rate is the 10Y G-Sec
    /// yield (6.5%).
    pub fn india_retail() -> Self {
        Self {
            classes: vec![
                AssetClass::new("index_funds", "Index Funds", AssetCategory::Equity, 12.8, 15.2),
                AssetClass::new("ppf", "PPF", AssetCategory::SmallSavings, 7.1, 0.1),
                AssetClass::new("stocks", "Stocks", AssetCategory::Equity, 15.6, 22.4),
                AssetClass::new("bonds", "Bonds", AssetCategory::FixedIncome, 6.8, 4.2),
                AssetClass::new("gold_etf", "Gold ETF", AssetCategory::Commodity, 8.2, 18.5),
            ],
            correlation: vec![
                vec![1.0, 0.3, 0.7, 0.1, -0.2],
                vec![0.3, 1.0, 0.1, 0.8, 0.2],
                vec![0.7, 0.1, 1.0, 0.2, -0.1],
                vec![0.1, 0.8, 0.2, 1.0, 0.1],
                vec![-0.2, 0.2, -0.1, 0.1, 1.0],
            ],
            risk_free_rate_pct: 6.5,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Check dimensions, unit diagonal, symmetry and range of correlations.
    pub fn validate(&self) -> Result<()> {
        let n = self.classes.len();
        if n == 0 {
            return Err(AllocError::empty_data("asset universe"));
        }
        if self.correlation.len() != n {
            return Err(AllocError::length_mismatch(
                "correlation rows",
                n,
                self.correlation.len(),
            ));
        }
        for (i, row) in self.correlation.iter().enumerate() {
            if row.len() != n {
                return Err(AllocError::NonSquareMatrix {
                    row: i,
                    expected: n,
                    actual: row.len(),
                });
            }
            if (row[i] - 1.0).abs() > SYMMETRY_TOLERANCE {
                return Err(AllocError::invalid_config(format!(
                    "correlation diagonal at {} must be 1, got {}",
                    i, row[i]
                )));
            }
            if row.iter().any(|c| !(-1.0..=1.0).contains(c)) {
                return Err(AllocError::invalid_config(format!(
                    "correlation row {} has entries outside [-1, 1]",
                    i
                )));
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if (self.correlation[i][j] - self.correlation[j][i]).abs() > SYMMETRY_TOLERANCE {
                    return Err(AllocError::NonSymmetricMatrix {
                        row: i,
                        col: j,
                        upper: self.correlation[i][j],
                        lower: self.correlation[j][i],
                    });
                }
            }
        }
        for class in &self.classes {
            if class.risk_pct < 0.0 || !class.risk_pct.is_finite() {
                return Err(AllocError::invalid_config(format!(
                    "risk of '{}' must be a non-negative number",
                    class.id
                )));
            }
        }
        Ok(())
    }

    /// Assets in universe order.
    pub fn assets(&self) -> Vec<Asset> {
        self.classes
            .iter()
            .map(|c| Asset::new(c.id.clone()).with_name(c.name.clone()))
            .collect()
    }

    /// Indices of classes in `category`.
    pub fn indices_of(&self, category: AssetCategory) -> Vec<usize> {
        self.classes
            .iter()
            .enumerate()
            .filter(|(_, c)| c.category == category)
            .map(|(i, _)| i)
            .collect()
    }

    /// Risk-free rate as a fraction.
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate_pct / 100.0
    }

    /// Fractional means and covariance `corr_ij * sigma_i * sigma_j`.
    pub fn market_stats(&self) -> MarketStats {
        let n = self.classes.len();
        let means = self
            .classes
            .iter()
            .map(|c| c.expected_return_pct / 100.0)
            .collect();
        let sigma: Vec<f64> = self.classes.iter().map(|c| c.risk_pct / 100.0).collect();

        let mut cov = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                let rho = if i == j { 1.0 } else { self.correlation[i][j] };
                cov[i][j] = rho * sigma[i] * sigma[j];
            }
        }

        MarketStats::new(means, cov)
    }
}
