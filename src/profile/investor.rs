//! Investor profile: risk tolerance and horizon on top of the core search.
//!
//! The profile never changes the annealing loop. It contributes:
//! - a per-asset bias on initial sampling
//! - custom objective terms (horizon bonus, risk-tolerance penalty,
//!   diversification bonus) next to a Sharpe term with a risk-free rate

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{AllocError, Result};
use crate::core::linalg::{covariance_to_correlation, quadratic_form};
use crate::core::types::{ConstraintSpec, HyperparamOverrides, ModelSpec, ObjectiveSpec};
use crate::metrics::portfolio::{
    correlated_pair_entropy, diversification_entropy, effective_holdings, PortfolioMetrics,
};
use crate::optimizer::{AllocationResult, Translator};
use crate::profile::universe::{AssetCategory, AssetUniverse};

/// Weight of the Shannon-entropy diversification bonus.
pub const DIVERSIFICATION_WEIGHT: f64 = 0.1;

/// Default iteration count for profile runs.
pub const PROFILE_ITERATIONS: usize = 1500;

/// Risk tolerance on a 1-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RiskTolerance(u8);

impl RiskTolerance {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(level: u8) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&level) {
            return Err(AllocError::invalid_parameter(format!(
                "risk tolerance must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                level
            )));
        }
        Ok(Self(level))
    }

    #[inline]
    pub fn level(self) -> u8 {
        self.0
    }

    /// Portfolio volatility (percent) this tolerance is comfortable with.
    pub fn target_risk_pct(self) -> f64 {
        self.0 as f64 * 2.0
    }
}

impl Default for RiskTolerance {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for RiskTolerance {
    type Error = AllocError;

    fn try_from(level: u8) -> Result<Self> {
        Self::new(level)
    }
}

impl From<RiskTolerance> for u8 {
    fn from(tolerance: RiskTolerance) -> u8 {
        tolerance.0
    }
}

/// Investment horizon bucket in years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InvestmentHorizon {
    #[serde(rename = "1-3")]
    OneToThree,
    #[serde(rename = "3-5")]
    ThreeToFive,
    #[default]
    #[serde(rename = "5-10")]
    FiveToTen,
    #[serde(rename = "10+")]
    TenPlus,
}

impl InvestmentHorizon {
    pub fn as_str(self) -> &'static str {
        match self {
            InvestmentHorizon::OneToThree => "1-3",
            InvestmentHorizon::ThreeToFive => "3-5",
            InvestmentHorizon::FiveToTen => "5-10",
            InvestmentHorizon::TenPlus => "10+",
        }
    }

    /// Additive score for a given equity share of the portfolio.
    ///
    /// Short horizons punish heavy equity; long horizons reward it.
    pub fn equity_bonus(self, equity_share: f64) -> f64 {
        match self {
            InvestmentHorizon::OneToThree => {
                if equity_share > 0.6 {
                    -0.2
                } else {
                    0.1
                }
            }
            InvestmentHorizon::ThreeToFive => {
                if equity_share > 0.7 {
                    0.1
                } else {
                    -0.1
                }
            }
            InvestmentHorizon::FiveToTen => {
                if equity_share > 0.6 {
                    0.2
                } else {
                    0.0
                }
            }
            InvestmentHorizon::TenPlus => {
                if equity_share > 0.7 {
                    0.3
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for InvestmentHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestmentHorizon {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1-3" => Ok(InvestmentHorizon::OneToThree),
            "3-5" => Ok(InvestmentHorizon::ThreeToFive),
            "5-10" => Ok(InvestmentHorizon::FiveToTen),
            "10+" => Ok(InvestmentHorizon::TenPlus),
            other => Err(AllocError::invalid_parameter(format!(
                "unknown investment horizon '{}' (expected 1-3, 3-5, 5-10 or 10+)",
                other
            ))),
        }
    }
}

/// One weight of a profile allocation, labelled for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationWeight {
    pub id: String,
    pub name: String,
    pub weight: f64,
}

/// Profile run output: labelled weights, display metrics and the raw result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileAllocation {
    pub weights: Vec<AllocationWeight>,
    /// Metrics in fractional units, Sharpe against the universe risk-free rate.
    pub metrics: PortfolioMetrics,
    /// Shannon entropy of the weights, bits.
    pub diversification_entropy: f64,
    pub effective_holdings: f64,
    /// Entropy of exposure to correlated pairs, bits.
    pub correlated_pair_entropy: f64,
    pub result: AllocationResult,
}

impl ProfileAllocation {
    /// Expected annual return in percent.
    pub fn expected_return_pct(&self) -> f64 {
        self.metrics.expected_return * 100.0
    }

    /// Annual volatility in percent.
    pub fn risk_pct(&self) -> f64 {
        self.metrics.volatility * 100.0
    }

    /// Weight of the class with the given id.
    pub fn weight_of(&self, id: &str) -> Option<f64> {
        self.weights.iter().find(|w| w.id == id).map(|w| w.weight)
    }
}

/// Investor risk tolerance and horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvestorProfile {
    pub risk_tolerance: RiskTolerance,
    pub horizon: InvestmentHorizon,
}

impl InvestorProfile {
    pub fn new(risk_tolerance: RiskTolerance, horizon: InvestmentHorizon) -> Self {
        Self {
            risk_tolerance,
            horizon,
        }
    }

    /// Multiplicative bias on initial sampling for each class.
    ///
    /// Conservative investors start heavier in small savings, aggressive
    /// ones in equity, and short horizons in bonds.
    pub fn sampling_bias(&self, universe: &AssetUniverse) -> Vec<f64> {
        let level = self.risk_tolerance.level();
        universe
            .classes
            .iter()
            .map(|class| match class.category {
                AssetCategory::SmallSavings if level < 5 => 1.5,
                AssetCategory::Equity if level > 6 => 1.3,
                AssetCategory::FixedIncome if self.horizon == InvestmentHorizon::OneToThree => 1.4,
                _ => 1.0,
            })
            .collect()
    }

    /// Model spec for this profile over `universe`.
    pub fn model_spec(&self, universe: &AssetUniverse, hyperparams: HyperparamOverrides) -> ModelSpec {
        let equity = universe.indices_of(AssetCategory::Equity);
        let horizon = self.horizon;
        let target_risk_pct = self.risk_tolerance.target_risk_pct();

        let hyperparams = HyperparamOverrides {
            iterations: hyperparams.iterations.or(Some(PROFILE_ITERATIONS)),
            ..hyperparams
        };

        ModelSpec::new(universe.assets())
            .with_objective(
                ObjectiveSpec::sharpe(1.0).with_param("risk_free", universe.risk_free_rate()),
            )
            .with_objective(
                ObjectiveSpec::custom(1.0, move |w, market| {
                    let risk_pct = quadratic_form(&market.cov, w).max(0.0).sqrt() * 100.0;
                    -(risk_pct - target_risk_pct).abs() / 20.0
                })
                .with_label("risk_tolerance_penalty"),
            )
            .with_objective(
                ObjectiveSpec::custom(1.0, move |w, _| {
                    let equity_share: f64 = equity.iter().map(|&i| w[i]).sum();
                    horizon.equity_bonus(equity_share)
                })
                .with_label("horizon_bonus"),
            )
            .with_objective(
                ObjectiveSpec::custom(DIVERSIFICATION_WEIGHT, |w, _| diversification_entropy(w))
                    .with_label("diversification_bonus"),
            )
            .with_constraint(ConstraintSpec::budget())
            .with_constraint(ConstraintSpec::LongOnly)
            .with_hyperparams(hyperparams)
            .with_initial_bias(self.sampling_bias(universe))
    }

    /// Optimize an allocation for this profile.
    pub fn allocate(
        &self,
        universe: &AssetUniverse,
        hyperparams: HyperparamOverrides,
    ) -> Result<ProfileAllocation> {
        universe.validate()?;
        let market = universe.market_stats();
        let translator = Translator::new(self.model_spec(universe, hyperparams))?;
        let result = translator.translate(&market)?;

        let weights = universe
            .classes
            .iter()
            .zip(result.allocation.iter())
            .map(|(class, &weight)| AllocationWeight {
                id: class.id.clone(),
                name: class.name.clone(),
                weight,
            })
            .collect();

        Ok(ProfileAllocation {
            weights,
            metrics: PortfolioMetrics::compute(
                &result.allocation,
                &market,
                universe.risk_free_rate(),
            ),
            diversification_entropy: diversification_entropy(&result.allocation),
            effective_holdings: effective_holdings(&result.allocation),
            correlated_pair_entropy: correlated_pair_entropy(
                &result.allocation,
                &covariance_to_correlation(&market.cov),
            ),
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_tolerance_range() {
        assert!(RiskTolerance::new(0).is_err());
        assert!(RiskTolerance::new(11).is_err());
        assert_eq!(RiskTolerance::new(7).unwrap().level(), 7);
        assert!((RiskTolerance::new(4).unwrap().target_risk_pct() - 8.0).abs() < 1e-12);

        let parsed: std::result::Result<RiskTolerance, _> = serde_json::from_str("12");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_horizon_parsing() {
        assert_eq!(
            "10+".parse::<InvestmentHorizon>().unwrap(),
            InvestmentHorizon::TenPlus
        );
        assert!("2-4".parse::<InvestmentHorizon>().is_err());
        assert_eq!(InvestmentHorizon::default().as_str(), "5-10");

        let h: InvestmentHorizon = serde_json::from_str("\"1-3\"").unwrap();
        assert_eq!(h, InvestmentHorizon::OneToThree);
    }

    #[test]
    fn test_equity_bonus_table() {
        assert_eq!(InvestmentHorizon::OneToThree.equity_bonus(0.8), -0.2);
        assert_eq!(InvestmentHorizon::OneToThree.equity_bonus(0.3), 0.1);
        assert_eq!(InvestmentHorizon::ThreeToFive.equity_bonus(0.65), -0.1);
        assert_eq!(InvestmentHorizon::FiveToTen.equity_bonus(0.65), 0.2);
        assert_eq!(InvestmentHorizon::TenPlus.equity_bonus(0.75), 0.3);
        assert_eq!(InvestmentHorizon::TenPlus.equity_bonus(0.7), 0.0);
    }

    #[test]
    fn test_sampling_bias() {
        let universe = AssetUniverse::india_retail();

        let conservative = InvestorProfile::new(
            RiskTolerance::new(3).unwrap(),
            InvestmentHorizon::OneToThree,
        );
        assert_eq!(
            conservative.sampling_bias(&universe),
            vec![1.0, 1.5, 1.0, 1.4, 1.0]
        );

        let aggressive =
            InvestorProfile::new(RiskTolerance::new(8).unwrap(), InvestmentHorizon::TenPlus);
        assert_eq!(
            aggressive.sampling_bias(&universe),
            vec![1.3, 1.0, 1.3, 1.0, 1.0]
        );
    }

    #[test]
    fn test_model_spec_shape() {
        let universe = AssetUniverse::india_retail();
        let spec = InvestorProfile::default().model_spec(&universe, HyperparamOverrides::default());
        assert!(spec.validate().is_ok());
        assert_eq!(spec.objectives.len(), 4);
        assert_eq!(spec.hyperparams.iterations, Some(PROFILE_ITERATIONS));
        assert_eq!(spec.initial_bias.as_ref().map(|b| b.len()), Some(5));
        assert_eq!(spec.objectives[2].display_name(), "horizon_bonus");
    }
}
