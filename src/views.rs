//! Chart-ready and display-ready views derived from the dashboard state.
//!
//! Everything here is pure and recomputed on every frame.

use crate::stats::{CollectionStats, Direction, ModelStats, PredictionRecord, SymbolPerformance};
use chrono::{DateTime, Local};
use serde::Serialize;

/// Number of trailing iterations averaged for "mean accuracy".
pub const RECENT_ACCURACY_WINDOW: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AccuracyPoint {
    /// 1-based training iteration.
    pub iteration: usize,
    pub accuracy: f64,
    pub error: f64,
}

/// One point per accuracy entry. Lengths are not validated: a missing error
/// entry yields `NaN`.
pub fn accuracy_series(model: &ModelStats) -> Vec<AccuracyPoint> {
    model
        .accuracy_history
        .iter()
        .enumerate()
        .map(|(idx, acc)| AccuracyPoint {
            iteration: idx + 1,
            accuracy: acc * 100.0,
            error: model.error_history.get(idx).map_or(f64::NAN, |e| e * 100.0),
        })
        .collect()
}

/// successful / total * 100. Not finite when `total_samples` is zero.
pub fn success_rate(collection: &CollectionStats) -> f64 {
    collection.successful_predictions as f64 / collection.total_samples as f64 * 100.0
}

/// Sum of the last `RECENT_ACCURACY_WINDOW` entries over the full window size,
/// so a shorter history reads lower and an empty one reads 0.
pub fn mean_recent_accuracy(model: &ModelStats) -> f64 {
    let len = model.accuracy_history.len();
    let recent = &model.accuracy_history[len.saturating_sub(RECENT_ACCURACY_WINDOW)..];
    recent.iter().sum::<f64>() / RECENT_ACCURACY_WINDOW as f64 * 100.0
}

pub fn current_error(model: &ModelStats) -> Option<f64> {
    model.error_history.last().map(|e| e * 100.0)
}

pub fn symbol_chart(symbols: &[SymbolPerformance]) -> Vec<(&str, u64)> {
    symbols
        .iter()
        .map(|s| (s.symbol.as_str(), s.accuracy as u64))
        .collect()
}

// ──────────────────────────────────────────────────────────────────────────────
// Presentation rules
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionIcon {
    TrendingUp,
    TrendingDown,
    Activity,
}

impl PredictionIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            PredictionIcon::TrendingUp => "▲",
            PredictionIcon::TrendingDown => "▼",
            PredictionIcon::Activity => "◆",
        }
    }
}

pub fn prediction_icon(prediction: &Direction) -> PredictionIcon {
    match prediction {
        Direction::Up => PredictionIcon::TrendingUp,
        Direction::Down => PredictionIcon::TrendingDown,
        _ => PredictionIcon::Activity,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBadge {
    Correct,
    Wrong,
}

impl StatusBadge {
    pub fn label(self) -> &'static str {
        match self {
            StatusBadge::Correct => "Correct",
            StatusBadge::Wrong => "Miss",
        }
    }

    pub fn is_positive(self) -> bool {
        self == StatusBadge::Correct
    }
}

pub fn status_badge(prediction: &Direction, actual: &Direction) -> StatusBadge {
    if prediction == actual {
        StatusBadge::Correct
    } else {
        StatusBadge::Wrong
    }
}

/// One decimal with a percent sign; `--` for NaN or infinity.
pub fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{:.1}%", value)
    } else {
        "--".to_string()
    }
}

/// Gauge ratio in 0..=1; non-finite input maps to 0.
pub fn gauge_ratio(percent: f64) -> f64 {
    if percent.is_finite() {
        (percent / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_confidence(confidence: f64) -> String {
    format!("{:.0}% confidence", confidence * 100.0)
}

/// RFC 3339 rendered in local time; unparseable input is shown as-is.
pub fn format_training_time(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

// ──────────────────────────────────────────────────────────────────────────────
// Snapshot
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize)]
pub struct PredictionView {
    #[serde(flatten)]
    pub record: PredictionRecord,
    pub icon: PredictionIcon,
    pub badge: StatusBadge,
}

/// Everything the dashboard shows, in one serializable value.
#[derive(Clone, Debug, Serialize)]
pub struct DashboardSnapshot {
    pub ticks: u64,
    pub model: ModelStats,
    pub collection: CollectionStats,
    pub accuracy_series: Vec<AccuracyPoint>,
    pub success_rate: String,
    pub mean_recent_accuracy: f64,
    pub current_error: Option<f64>,
    pub predictions: Vec<PredictionView>,
    pub symbols: Vec<SymbolPerformance>,
}

impl DashboardSnapshot {
    pub fn build(
        ticks: u64,
        model: &ModelStats,
        collection: &CollectionStats,
        predictions: &[PredictionRecord],
        symbols: &[SymbolPerformance],
    ) -> Self {
        Self {
            ticks,
            model: model.clone(),
            collection: collection.clone(),
            accuracy_series: accuracy_series(model),
            success_rate: format_percent(success_rate(collection)),
            mean_recent_accuracy: mean_recent_accuracy(model),
            current_error: current_error(model),
            predictions: predictions
                .iter()
                .map(|p| PredictionView {
                    record: p.clone(),
                    icon: prediction_icon(&p.prediction),
                    badge: status_badge(&p.prediction, &p.actual),
                })
                .collect(),
            symbols: symbols.to_vec(),
        }
    }
}
