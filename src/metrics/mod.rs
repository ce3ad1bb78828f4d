//! Performance metrics for RaptorAlloc allocations.

pub mod portfolio;

pub use portfolio::{
    correlated_pair_entropy, diversification_entropy, effective_holdings, PortfolioMetrics,
};
