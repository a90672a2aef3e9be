//! Rule-based classifiers
//!
//! Each classifier is a deterministic decision table over one day's
//! [`DaySummary`](crate::types::DaySummary). Rules are evaluated in a fixed
//! priority order and the first match wins. Missing inputs never fail a
//! classifier; they produce an `Unknown` verdict or contribute nothing.

mod energy;
mod gardening;
mod photography;

pub use energy::{EnergyClassifier, EnergyLabel, EnergyVerdict};
pub use gardening::{
    GardeningClassifier, GardeningVerdict, PlantingStatus, PlantingVerdict, WateringStatus,
    WateringVerdict,
};
pub use photography::{
    golden_hour_rating, night_rating, transparency, PhotographyClassifier, PhotographyVerdict,
    ShootingRating, Transparency,
};
