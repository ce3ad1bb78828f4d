//! Investor-profile configuration layer.
//!
//! Expresses a concrete asset universe and per-investor preferences as a
//! `ModelSpec` for the generic allocator.

pub mod investor;
pub mod universe;

pub use investor::{
    AllocationWeight, InvestmentHorizon, InvestorProfile, ProfileAllocation, RiskTolerance,
};
pub use universe::{AssetCategory, AssetClass, AssetUniverse};
