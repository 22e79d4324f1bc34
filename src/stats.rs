use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Training progress of the prediction model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub samples_processed: u64,
    /// RFC 3339 timestamp of the last training run.
    pub last_training_time: String,
    pub model_version: u32,
    /// Accuracy per training iteration, 0..=1. Index-aligned with `error_history`.
    pub accuracy_history: Vec<f64>,
    pub error_history: Vec<f64>,
    pub buffer_size: u64,
    pub is_training: bool,
}

/// Counters of the upstream collection process.
///
/// `successful_predictions + failed_predictions <= total_samples` is expected
/// but not enforced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub total_samples: u64,
    pub successful_predictions: u64,
    pub failed_predictions: u64,
    pub buffer_size: u64,
    pub symbols_count: u32,
    pub is_running: bool,
}

/// Predicted or observed price direction.
///
/// Only the exact labels `UP`, `DOWN` and `NEUTRAL` map to the named variants.
/// Anything else is kept verbatim, so two directions are equal exactly when
/// their labels are.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Direction {
    Up,
    Down,
    Neutral,
    Other(String),
}

impl Direction {
    pub fn as_label(&self) -> &str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Neutral => "NEUTRAL",
            Direction::Other(label) => label,
        }
    }
}

impl From<&str> for Direction {
    fn from(label: &str) -> Self {
        match label {
            "UP" => Direction::Up,
            "DOWN" => Direction::Down,
            "NEUTRAL" => Direction::Neutral,
            other => Direction::Other(other.to_string()),
        }
    }
}

impl From<String> for Direction {
    fn from(label: String) -> Self {
        match label.as_str() {
            "UP" | "DOWN" | "NEUTRAL" => Direction::from(label.as_str()),
            _ => Direction::Other(label),
        }
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Other(label) => label,
            named => named.as_label().to_string(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One historical inference with its later-observed outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub symbol: String,
    pub prediction: Direction,
    pub confidence: f64,
    pub timestamp: String,
    pub actual: Direction,
}

impl PredictionRecord {
    fn new(symbol: &str, prediction: &str, confidence: f64, timestamp: &str, actual: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            prediction: Direction::from(prediction),
            confidence,
            timestamp: timestamp.to_string(),
            actual: Direction::from(actual),
        }
    }
}

/// Named chart colors, resolved per front-end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    Primary,
    Secondary,
    Accent,
    Muted,
    Destructive,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolPerformance {
    pub symbol: String,
    /// Accuracy in percent.
    pub accuracy: u32,
    pub predictions: u32,
    pub color: Palette,
}

// ──────────────────────────────────────────────────────────────────────────────
// Sample data
// ──────────────────────────────────────────────────────────────────────────────

impl ModelStats {
    pub fn sample() -> Self {
        Self {
            samples_processed: 1250,
            last_training_time: Utc::now().to_rfc3339(),
            model_version: 3,
            accuracy_history: vec![0.65, 0.68, 0.72, 0.75, 0.78, 0.76, 0.82, 0.85, 0.83, 0.87],
            error_history: vec![0.15, 0.12, 0.10, 0.08, 0.07, 0.09, 0.06, 0.05, 0.07, 0.04],
            buffer_size: 150,
            is_training: true,
        }
    }
}

impl CollectionStats {
    pub fn sample() -> Self {
        Self {
            total_samples: 5420,
            successful_predictions: 4895,
            failed_predictions: 525,
            buffer_size: 150,
            symbols_count: 5,
            is_running: true,
        }
    }
}

pub fn sample_predictions() -> Vec<PredictionRecord> {
    vec![
        PredictionRecord::new("BTCUSDT", "UP", 0.85, "2025-01-25 14:30:15", "UP"),
        PredictionRecord::new("ETHUSDT", "DOWN", 0.72, "2025-01-25 14:29:45", "DOWN"),
        PredictionRecord::new("SOLUSDT", "NEUTRAL", 0.68, "2025-01-25 14:29:20", "NEUTRAL"),
        PredictionRecord::new("ADAUSDT", "UP", 0.91, "2025-01-25 14:28:55", "UP"),
        PredictionRecord::new("XRPUSDT", "DOWN", 0.79, "2025-01-25 14:28:30", "UP"),
    ]
}

pub fn sample_symbol_performance() -> Vec<SymbolPerformance> {
    [
        ("BTCUSDT", 87, 890, Palette::Primary),
        ("ETHUSDT", 82, 765, Palette::Secondary),
        ("SOLUSDT", 79, 654, Palette::Accent),
        ("ADAUSDT", 85, 543, Palette::Muted),
        ("XRPUSDT", 81, 432, Palette::Destructive),
    ]
    .into_iter()
    .map(|(symbol, accuracy, predictions, color)| SymbolPerformance {
        symbol: symbol.to_string(),
        accuracy,
        predictions,
        color,
    })
    .collect()
}

/// Static notes shown on the Analysis tab: (title, detail).
pub const KEY_IMPROVEMENTS: &[(&str, &str)] = &[
    (
        "Normalization across price scales",
        "Log scaling for prices from 0.00001 to 100K",
    ),
    (
        "Incremental learning",
        "SGD models trained on streaming data",
    ),
    (
        "Persistent storage",
        "Automatic save and restore across restarts",
    ),
    (
        "Improved feature engineering",
        "Technical indicators, volatility, time features",
    ),
];

pub const RECOMMENDATIONS: &[(&str, &str)] = &[
    (
        "Increase collection frequency",
        "Reduce the interval to 15 seconds for crypto pairs",
    ),
    (
        "Add cross-validation",
        "Time-based validation for a more accurate estimate",
    ),
    (
        "Monitor model drift",
        "Track performance degradation over time",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing_is_exact() {
        assert_eq!(Direction::from("UP"), Direction::Up);
        assert_eq!(Direction::from("DOWN"), Direction::Down);
        assert_eq!(Direction::from("NEUTRAL"), Direction::Neutral);
        assert_eq!(Direction::from("up"), Direction::Other("up".to_string()));
        assert_ne!(Direction::from("up"), Direction::Up);
        assert_eq!(Direction::from(String::from("DOWN")), Direction::Down);
    }

    #[test]
    fn test_direction_serializes_as_label() {
        let json = serde_json::to_string(&Direction::Neutral).unwrap();
        assert_eq!(json, "\"NEUTRAL\"");

        let parsed: Direction = serde_json::from_str("\"SIDEWAYS\"").unwrap();
        assert_eq!(parsed, Direction::Other("SIDEWAYS".to_string()));
        assert_eq!(parsed.to_string(), "SIDEWAYS");
    }

    #[test]
    fn test_sample_data_shapes() {
        let model = ModelStats::sample();
        assert_eq!(model.accuracy_history.len(), model.error_history.len());
        assert!(model.accuracy_history.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(chrono::DateTime::parse_from_rfc3339(&model.last_training_time).is_ok());

        let collection = CollectionStats::sample();
        assert!(collection.successful_predictions + collection.failed_predictions <= collection.total_samples);

        let predictions = sample_predictions();
        assert_eq!(predictions.len(), 5);
        let misses = predictions.iter().filter(|p| p.prediction != p.actual).count();
        assert_eq!(misses, 1, "only XRPUSDT misses in the sample set");

        let symbols = sample_symbol_performance();
        assert_eq!(symbols.len() as u32, collection.symbols_count);
    }
}
