//! Biometeorological energy score
//!
//! A heuristic weighted sum: a baseline minus penalties for uncomfortable
//! apparent temperature, humidity outside a comfort band, pressure away from
//! a reference, a large day-over-day pressure swing and strong UV. The
//! coefficients come from [`EnergyWeights`].

use crate::config::EnergyWeights;
use crate::types::DaySummary;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyLabel {
    High,
    Balanced,
    Low,
    Drained,
    Unknown,
}

/// Energy score and label for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyVerdict {
    pub label: EnergyLabel,
    /// Score in [0, 100]; `None` when no driving input was available
    pub score: Option<f64>,
    pub reason: String,
}

/// Energy classifier parameterized by its weights
#[derive(Debug, Clone, Default)]
pub struct EnergyClassifier {
    weights: EnergyWeights,
}

impl EnergyClassifier {
    pub fn new(weights: EnergyWeights) -> Self {
        Self { weights }
    }

    pub fn classify(&self, summary: &DaySummary) -> EnergyVerdict {
        let apparent = summary.apparent_temperature();
        let humidity = summary.humidity_avg;
        let pressure = summary.pressure_avg;

        let Some(score) = self.score(apparent, humidity, pressure, summary) else {
            return EnergyVerdict {
                label: EnergyLabel::Unknown,
                score: None,
                reason: "no temperature, humidity or pressure data".to_string(),
            };
        };

        let label = self.label(score);
        let reason = match apparent {
            Some(t) => format!("score {score:.0} at {t:.1}°C apparent"),
            None => format!("score {score:.0}"),
        };
        EnergyVerdict {
            label,
            score: Some(score),
            reason,
        }
    }

    fn score(
        &self,
        apparent: Option<f64>,
        humidity: Option<f64>,
        pressure: Option<f64>,
        summary: &DaySummary,
    ) -> Option<f64> {
        if apparent.is_none() && humidity.is_none() && pressure.is_none() {
            return None;
        }
        let w = &self.weights;
        let mut score = w.baseline;

        if let Some(t) = apparent {
            score -= (t - w.comfort_temp).abs() * w.temp_weight;
        }
        if let Some(h) = humidity {
            if h > w.humidity_high {
                score -= (h - w.humidity_high) * w.humidity_high_weight;
            } else if h < w.humidity_low {
                score -= (w.humidity_low - h) * w.humidity_low_weight;
            }
        }
        if let Some(p) = pressure {
            score -= (p - w.reference_pressure).abs() * w.pressure_weight;
        }
        if let Some(trend) = summary.pressure_trend {
            score -= trend.abs().min(w.trend_cap);
        }
        if summary.uv_index_max.is_some_and(|uv| uv > w.uv_threshold) {
            score -= w.uv_penalty;
        }

        Some(score.clamp(0.0, 100.0))
    }

    fn label(&self, score: f64) -> EnergyLabel {
        let w = &self.weights;
        if score >= w.high_threshold {
            EnergyLabel::High
        } else if score >= w.balanced_threshold {
            EnergyLabel::Balanced
        } else if score >= w.low_threshold {
            EnergyLabel::Low
        } else {
            EnergyLabel::Drained
        }
    }
}
