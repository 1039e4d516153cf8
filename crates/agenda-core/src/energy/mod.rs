//! Energy tiers and the curve that turns them into effort multipliers.

mod curve;

pub use curve::{EnergyCurve, EnergyLevel, TieredEnergyCurve};
