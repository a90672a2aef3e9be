//! Gardening planting and watering suitability

use crate::types::DaySummary;
use serde::{Deserialize, Serialize};

/// Planting suitability states, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantingStatus {
    Unknown,
    TooCold,
    Cold,
    TooHot,
    TooDry,
    TooWet,
    Rainy,
    Ideal,
    Ok,
    Watch,
}

/// Watering need states, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WateringStatus {
    Unknown,
    Skip,
    Needs,
    Light,
    Monitor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantingVerdict {
    pub status: PlantingStatus,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WateringVerdict {
    pub status: WateringStatus,
    pub reason: String,
}

/// Both gardening verdicts for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardeningVerdict {
    pub planting: PlantingVerdict,
    pub watering: WateringVerdict,
}

/// Gardening classifier over soil temperature, soil moisture and rain
pub struct GardeningClassifier;

impl GardeningClassifier {
    pub fn classify(summary: &DaySummary) -> GardeningVerdict {
        GardeningVerdict {
            planting: Self::planting(summary),
            watering: Self::watering(summary),
        }
    }

    /// Planting suitability; first matching rule wins
    pub fn planting(summary: &DaySummary) -> PlantingVerdict {
        let verdict = |status, reason: String| PlantingVerdict { status, reason };

        let Some(soil_temp) = summary.soil_temp_avg else {
            return verdict(PlantingStatus::Unknown, "no soil temperature data".to_string());
        };
        let moisture = summary.soil_moisture_avg;
        let rain = summary.precipitation_sum;
        let probability = summary.precipitation_probability_max;

        if soil_temp < 8.0 {
            return verdict(
                PlantingStatus::TooCold,
                format!("soil at {soil_temp:.1}°C is below 8°C"),
            );
        }
        if soil_temp < 10.0 {
            return verdict(
                PlantingStatus::Cold,
                format!("soil at {soil_temp:.1}°C is below 10°C"),
            );
        }
        if soil_temp > 27.0 {
            return verdict(
                PlantingStatus::TooHot,
                format!("soil at {soil_temp:.1}°C is above 27°C"),
            );
        }
        if let Some(m) = moisture.filter(|m| *m < 0.16) {
            return verdict(PlantingStatus::TooDry, format!("soil moisture {m:.2} is below 0.16"));
        }
        if let Some(m) = moisture.filter(|m| *m > 0.42) {
            return verdict(PlantingStatus::TooWet, format!("soil moisture {m:.2} is above 0.42"));
        }

        let likely_heavy = matches!((probability, rain), (Some(p), Some(r)) if p > 70.0 && r > 4.0);
        let very_wet = rain.is_some_and(|r| r > 8.0);
        if likely_heavy || very_wet {
            return verdict(
                PlantingStatus::Rainy,
                format!("{:.1} mm of rain expected", rain.unwrap_or_default()),
            );
        }

        let moisture_ok = moisture.map_or(true, |m| (0.18..=0.34).contains(&m));
        if (12.0..=23.0).contains(&soil_temp) && moisture_ok && rain.unwrap_or(0.0) <= 4.0 {
            return verdict(
                PlantingStatus::Ideal,
                format!("soil at {soil_temp:.1}°C with workable moisture"),
            );
        }
        if (10.0..=25.0).contains(&soil_temp) {
            return verdict(
                PlantingStatus::Ok,
                format!("soil at {soil_temp:.1}°C is acceptable"),
            );
        }

        verdict(
            PlantingStatus::Watch,
            format!("soil at {soil_temp:.1}°C is marginal"),
        )
    }

    /// Watering need; first matching rule wins
    pub fn watering(summary: &DaySummary) -> WateringVerdict {
        let verdict = |status, reason: String| WateringVerdict { status, reason };

        let Some(moisture) = summary.soil_moisture_avg else {
            return verdict(WateringStatus::Unknown, "no soil moisture data".to_string());
        };
        let rain = summary.precipitation_sum.unwrap_or(0.0);

        if rain >= 5.0 {
            return verdict(WateringStatus::Skip, format!("{rain:.1} mm of rain expected"));
        }
        if moisture > 0.34 {
            return verdict(WateringStatus::Skip, format!("soil moisture {moisture:.2} is high"));
        }
        if moisture < 0.18 && rain < 2.0 {
            return verdict(
                WateringStatus::Needs,
                format!("soil moisture {moisture:.2} with little rain"),
            );
        }
        if moisture < 0.24 && rain < 4.0 {
            return verdict(
                WateringStatus::Light,
                format!("soil moisture {moisture:.2} is on the dry side"),
            );
        }

        verdict(
            WateringStatus::Monitor,
            format!("soil moisture {moisture:.2} is adequate"),
        )
    }
}
